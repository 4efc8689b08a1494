/// Rigid pose of a tracked instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Translation in millimeters [x, y, z].
    pub translation: [f64; 3],
    /// Quaternion [qx, qy, qz, qw]. Stored poses are always unit-renormalized.
    pub rotation: [f64; 4],
}

impl Pose {
    /// Zero translation, identity rotation.
    pub const IDENTITY: Pose = Pose {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn new(translation: [f64; 3], rotation: [f64; 4]) -> Pose {
        Pose {
            translation,
            rotation,
        }
    }

    /// Pure-translation pose with identity rotation.
    pub fn from_translation(translation: [f64; 3]) -> Pose {
        Pose {
            translation,
            rotation: Pose::IDENTITY.rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Pose {
        Pose::IDENTITY
    }
}

/// Tolerances below which pose writes are treated as sensor noise.
///
/// Two poses compare equal when every translation component differs by
/// less than `position` and every quaternion component differs by less
/// than `orientation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Per-component translation tolerance in millimeters.
    pub position: f64,
    /// Per-component quaternion tolerance.
    pub orientation: f64,
}

impl Default for Tolerance {
    fn default() -> Tolerance {
        Tolerance {
            position: crate::transform::POSITION_EPSILON,
            orientation: crate::transform::ORIENTATION_EPSILON,
        }
    }
}

/// Consistent view of a tool's full state, taken under a single lock
/// acquisition: the effective pose always matches the counter.
#[derive(Debug, Clone)]
pub struct ToolSnapshot {
    pub raw_pose: Pose,
    pub tip_offset: Pose,
    pub effective_pose: Pose,
    pub modification_count: u64,
    pub visible: bool,
    pub calibrated: bool,
}

/// One report from a pose source.
///
/// `pose` is `None` when the device lost the tool (line of sight, signal)
/// and only has a visibility transition to report.
#[derive(Debug, Clone)]
pub struct ToolUpdate {
    pub tool: String,
    pub pose: Option<Pose>,
    pub visible: bool,
}

/// Emitted on the acquisition event channel whenever a write actually
/// advanced a tool's modification counter.
#[derive(Debug, Clone)]
pub struct TrackingEvent {
    pub tool: String,
    pub modification_count: u64,
    pub visible: bool,
    /// Host steady-clock timestamp in seconds since the loop started.
    pub host_timestamp_s: f64,
}
