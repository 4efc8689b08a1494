//! Tool lifecycle manager.
//!
//! The registry is the only holder of the construction capability for
//! [`TrackedTool`]: acquisition code registers a tool when the device
//! enumerates it and unregisters it on disconnect. Unregistration detaches
//! the store permanently, so a stale handle can read the last state but
//! can never be revived as a different physical instrument.

use crate::tool::TrackedTool;
use crate::types::Tolerance;
use crate::{Result, TrackingError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ToolRegistry {
    tolerance: Tolerance,
    tools: RwLock<HashMap<String, Arc<TrackedTool>>>,
}

impl ToolRegistry {
    /// Registry with the default change-detection tolerances.
    pub fn new() -> ToolRegistry {
        ToolRegistry::with_tolerance(Tolerance::default())
    }

    /// Registry whose tools use the given tolerances.
    pub fn with_tolerance(tolerance: Tolerance) -> ToolRegistry {
        ToolRegistry {
            tolerance,
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new tool under a unique name.
    ///
    /// A name stays taken until [`unregister`](Self::unregister); reusing
    /// an identity for a different physical instrument requires that
    /// explicit step first.
    pub fn register(&self, name: &str) -> Result<Arc<TrackedTool>> {
        self.register_with_serial(name, None)
    }

    /// Register a new tool with a device serial number.
    pub fn register_with_serial(
        &self,
        name: &str,
        serial: Option<&str>,
    ) -> Result<Arc<TrackedTool>> {
        let mut tools = self.tools.write();
        if tools.contains_key(name) {
            return Err(TrackingError::DuplicateTool(name.to_owned()));
        }
        let tool = Arc::new(TrackedTool::new(name, serial, self.tolerance));
        tools.insert(name.to_owned(), tool.clone());
        log::info!("Registered tool '{}' (serial={:?})", name, serial);
        Ok(tool)
    }

    /// Look up a live tool by name.
    pub fn get(&self, name: &str) -> Result<Arc<TrackedTool>> {
        self.tools
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TrackingError::UnknownTool(name.to_owned()))
    }

    /// Remove a tool and detach its store. Outstanding handles keep the
    /// last committed state but all further writes fail.
    pub fn unregister(&self, name: &str) -> Result<()> {
        let tool = self
            .tools
            .write()
            .remove(name)
            .ok_or_else(|| TrackingError::UnknownTool(name.to_owned()))?;
        tool.detach();
        log::info!("Unregistered tool '{}'", name);
        Ok(())
    }

    /// Names of all live tools.
    pub fn names(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}
