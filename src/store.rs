//! Change-tracked pose store: the single source of truth for one tool's
//! pose state and the counter consumers use to skip redundant work.

use crate::transform::{approx_eq, compose, normalize_quaternion};
use crate::types::{Pose, Tolerance, ToolSnapshot};
use crate::{Result, TrackingError};
use parking_lot::RwLock;

#[derive(Debug)]
struct StoreInner {
    raw_pose: Pose,
    tip_offset: Pose,
    effective_pose: Pose,
    modification_count: u64,
    visible: bool,
    calibrated: bool,
    tracking_error: Option<String>,
    detached: bool,
}

/// Holds the raw sensor pose, the tip-offset calibration and the derived
/// effective (tip) pose behind one lock region, so a reader can never
/// observe an effective pose that disagrees with the modification counter
/// or a torn half-written pose.
///
/// Writers (the acquisition thread, rare calibration calls) serialize on
/// the write lock; readers share the read lock concurrently. The counter
/// advances by exactly 1 when a write changes state beyond the configured
/// [`Tolerance`], and never otherwise, so sub-tolerance sensor noise is
/// idempotent from a consumer's point of view.
#[derive(Debug)]
pub struct PoseStore {
    name: String,
    tolerance: Tolerance,
    inner: RwLock<StoreInner>,
}

impl PoseStore {
    pub(crate) fn new(name: impl Into<String>, tolerance: Tolerance) -> PoseStore {
        PoseStore {
            name: name.into(),
            tolerance,
            inner: RwLock::new(StoreInner {
                raw_pose: Pose::IDENTITY,
                tip_offset: Pose::IDENTITY,
                effective_pose: Pose::IDENTITY,
                modification_count: 0,
                visible: false,
                calibrated: false,
                tracking_error: None,
                detached: false,
            }),
        }
    }

    /// Validate and renormalize an incoming pose. Degenerate rotations are
    /// rejected before any state is touched.
    fn sanitize(pose: Pose) -> Result<Pose> {
        let rotation = normalize_quaternion(pose.rotation)
            .ok_or(TrackingError::InvalidPose(pose.rotation))?;
        Ok(Pose {
            translation: pose.translation,
            rotation,
        })
    }

    /// Store the latest sensor report and recompute the effective pose.
    ///
    /// Returns whether the modification counter advanced, i.e. whether the
    /// new pose differs from the previous one beyond tolerance.
    pub fn set_raw_pose(&self, pose: Pose) -> Result<bool> {
        let pose = Self::sanitize(pose)?;
        let mut inner = self.write()?;
        let changed = !approx_eq(&pose, &inner.raw_pose, self.tolerance);
        inner.raw_pose = pose;
        inner.effective_pose = compose(&pose, &inner.tip_offset);
        if changed {
            inner.modification_count += 1;
        }
        Ok(changed)
    }

    /// Store a tool-tip calibration offset, expressed in the sensor frame.
    ///
    /// Marks the store calibrated; the counter advances iff the offset
    /// differs from the previous one beyond tolerance. Re-calibration is
    /// an ordinary later call.
    pub fn set_tip_offset(&self, pose: Pose) -> Result<bool> {
        let pose = Self::sanitize(pose)?;
        let mut inner = self.write()?;
        let changed = !approx_eq(&pose, &inner.tip_offset, self.tolerance);
        inner.tip_offset = pose;
        inner.effective_pose = compose(&inner.raw_pose, &pose);
        inner.calibrated = true;
        if changed {
            inner.modification_count += 1;
        }
        Ok(changed)
    }

    /// Set the tracking-quality flag. Visibility transitions are binary
    /// and always advance the counter; rewriting the stored value does not.
    pub fn set_visible(&self, visible: bool) -> Result<bool> {
        let mut inner = self.write()?;
        let changed = inner.visible != visible;
        inner.visible = visible;
        if changed {
            inner.modification_count += 1;
        }
        Ok(changed)
    }

    /// Record (or clear) a device-fault message for this tool. The counter
    /// advances iff the message actually changed.
    pub fn set_tracking_error(&self, message: Option<&str>) -> Result<bool> {
        let mut inner = self.write()?;
        let changed = inner.tracking_error.as_deref() != message;
        inner.tracking_error = message.map(str::to_owned);
        if changed {
            inner.modification_count += 1;
        }
        Ok(changed)
    }

    fn write(&self) -> Result<parking_lot::RwLockWriteGuard<'_, StoreInner>> {
        let inner = self.inner.write();
        if inner.detached {
            return Err(TrackingError::UnknownTool(self.name.clone()));
        }
        Ok(inner)
    }

    pub fn raw_pose(&self) -> Pose {
        self.inner.read().raw_pose
    }

    pub fn tip_offset(&self) -> Pose {
        self.inner.read().tip_offset
    }

    /// The composition `raw_pose ∘ tip_offset`, recomputed eagerly on every
    /// write so it is never stale relative to the latest committed state.
    pub fn effective_pose(&self) -> Pose {
        self.inner.read().effective_pose
    }

    pub fn modification_count(&self) -> u64 {
        self.inner.read().modification_count
    }

    pub fn is_visible(&self) -> bool {
        self.inner.read().visible
    }

    /// True once a tip offset has been set at least once; the tool is then
    /// considered ready for navigation.
    pub fn is_calibrated(&self) -> bool {
        self.inner.read().calibrated
    }

    pub fn tracking_error(&self) -> Option<String> {
        self.inner.read().tracking_error.clone()
    }

    /// A consistent view of the whole store under one read lock.
    pub fn snapshot(&self) -> ToolSnapshot {
        let inner = self.inner.read();
        ToolSnapshot {
            raw_pose: inner.raw_pose,
            tip_offset: inner.tip_offset,
            effective_pose: inner.effective_pose,
            modification_count: inner.modification_count,
            visible: inner.visible,
            calibrated: inner.calibrated,
        }
    }

    /// Permanently disable writes. Called by the registry on unregister;
    /// there is no way back, surviving handles keep the last state
    /// read-only.
    pub(crate) fn detach(&self) {
        self.inner.write().detached = true;
    }
}
