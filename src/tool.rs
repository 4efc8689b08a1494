//! A tracked instrument: immutable identity plus its pose store.

use crate::store::PoseStore;
use crate::types::{Pose, Tolerance, ToolSnapshot};
use crate::Result;

/// One physical instrument reported by the tracking device.
///
/// Identity is fixed at registration; everything mutable lives in the
/// [`PoseStore`] and is reached through delegation. Tools are only
/// constructed by the [`ToolRegistry`](crate::ToolRegistry), which holds
/// the lifecycle capability.
#[derive(Debug)]
pub struct TrackedTool {
    name: String,
    serial: Option<String>,
    store: PoseStore,
}

impl TrackedTool {
    pub(crate) fn new(name: &str, serial: Option<&str>, tolerance: Tolerance) -> TrackedTool {
        TrackedTool {
            name: name.to_owned(),
            serial: serial.map(str::to_owned),
            store: PoseStore::new(name, tolerance),
        }
    }

    /// Tool name, unique among live tools.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device serial number, when the tracker reports one.
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    pub fn set_raw_pose(&self, pose: Pose) -> Result<bool> {
        self.store.set_raw_pose(pose)
    }

    pub fn set_tip_offset(&self, pose: Pose) -> Result<bool> {
        self.store.set_tip_offset(pose)
    }

    pub fn set_visible(&self, visible: bool) -> Result<bool> {
        self.store.set_visible(visible)
    }

    pub fn set_tracking_error(&self, message: Option<&str>) -> Result<bool> {
        self.store.set_tracking_error(message)
    }

    pub fn raw_pose(&self) -> Pose {
        self.store.raw_pose()
    }

    pub fn tip_offset(&self) -> Pose {
        self.store.tip_offset()
    }

    /// The calibrated tip pose, `raw_pose ∘ tip_offset`.
    pub fn effective_pose(&self) -> Pose {
        self.store.effective_pose()
    }

    pub fn modification_count(&self) -> u64 {
        self.store.modification_count()
    }

    pub fn is_visible(&self) -> bool {
        self.store.is_visible()
    }

    pub fn is_calibrated(&self) -> bool {
        self.store.is_calibrated()
    }

    pub fn tracking_error(&self) -> Option<String> {
        self.store.tracking_error()
    }

    pub fn snapshot(&self) -> ToolSnapshot {
        self.store.snapshot()
    }

    pub(crate) fn detach(&self) {
        self.store.detach()
    }
}
