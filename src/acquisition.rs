//! Producer side: a background thread pulls `(pose, visible)` updates from
//! a [`PoseSource`] and commits them to the registered tools.

use crate::registry::ToolRegistry;
use crate::types::{ToolUpdate, TrackingEvent};
use crate::{Result, TrackingError};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Poll interval for the acquisition loop; bounds how long a stop request
/// can go unnoticed.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Supplier of tracking updates, typically backed by a device driver.
///
/// `poll` returns `Ok(None)` when no update arrived within the timeout;
/// errors are logged by the loop and do not stop acquisition. The unit
/// conversion to this crate's millimeter convention is the source's job.
pub trait PoseSource: Send {
    fn poll(&mut self, timeout: Duration) -> Result<Option<ToolUpdate>>;
}

/// Handle to a running acquisition loop.
///
/// A dedicated thread owns the source and writes updates into the
/// registry's tools. Whenever a write actually advances a tool's
/// modification counter, a [`TrackingEvent`] is published on a bounded
/// channel for consumers that prefer waiting over polling counters.
pub struct AcquisitionLoop {
    events: Receiver<TrackingEvent>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl AcquisitionLoop {
    /// Spawn the acquisition thread over a source and a tool registry.
    pub fn start<S>(source: S, registry: Arc<ToolRegistry>) -> Result<AcquisitionLoop>
    where
        S: PoseSource + 'static,
    {
        let (sender, events) = crossbeam_channel::bounded(256);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let thread = std::thread::Builder::new()
            .name("tooltrack-acquisition".into())
            .spawn(move || {
                acquisition_loop(source, registry, sender, stop_clone);
            })
            .map_err(|e| {
                TrackingError::Source(format!("failed to spawn acquisition thread: {}", e))
            })?;

        Ok(AcquisitionLoop {
            events,
            stop_flag,
            thread: Some(thread),
        })
    }

    /// Receive the next tracking event (blocks until available).
    pub fn recv(&self) -> Result<TrackingEvent> {
        self.events.recv().map_err(|_| TrackingError::LoopStopped)
    }

    /// Try to receive a tracking event without blocking.
    pub fn try_recv(&self) -> Option<TrackingEvent> {
        self.events.try_recv().ok()
    }

    /// Receive a tracking event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<TrackingEvent> {
        self.events.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => TrackingError::Timeout,
            crossbeam_channel::RecvTimeoutError::Disconnected => TrackingError::LoopStopped,
        })
    }

    /// Check if the loop is still running.
    pub fn is_active(&self) -> bool {
        !self.stop_flag.load(Ordering::Relaxed)
    }

    /// Stop the loop and wait for the acquisition thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AcquisitionLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The acquisition loop runs in a dedicated thread.
///
/// Per update: visibility first, then the pose, so a tool reported lost
/// never keeps a fresh pose paired with `visible == true`. Unknown tools
/// and degenerate poses are logged and skipped; the failure stays local
/// to that single update.
fn acquisition_loop<S: PoseSource>(
    mut source: S,
    registry: Arc<ToolRegistry>,
    sender: Sender<TrackingEvent>,
    stop_flag: Arc<AtomicBool>,
) {
    let epoch = Instant::now();

    log::info!("Acquisition loop started");

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            log::info!("Acquisition loop stopping (stop flag set)");
            break;
        }

        let update = match source.poll(POLL_TIMEOUT) {
            Ok(Some(update)) => update,
            Ok(None) => continue, // timeout, no data
            Err(e) => {
                log::warn!("Pose source error: {}", e);
                continue;
            }
        };

        let tool = match registry.get(&update.tool) {
            Ok(tool) => tool,
            Err(e) => {
                log::warn!("Dropping update for unregistered tool: {}", e);
                continue;
            }
        };

        let mut changed = match tool.set_visible(update.visible) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("Visibility write for '{}' failed: {}", update.tool, e);
                continue;
            }
        };

        if let Some(pose) = update.pose {
            match tool.set_raw_pose(pose) {
                Ok(pose_changed) => changed |= pose_changed,
                Err(e) => {
                    log::warn!("Pose write for '{}' rejected: {}", update.tool, e);
                    continue;
                }
            }
        }

        if !changed {
            continue;
        }

        let event = TrackingEvent {
            tool: update.tool,
            modification_count: tool.modification_count(),
            visible: tool.is_visible(),
            host_timestamp_s: epoch.elapsed().as_secs_f64(),
        };
        if let Err(e) = sender.try_send(event) {
            match e {
                crossbeam_channel::TrySendError::Full(_) => {
                    log::trace!("Event channel full, dropping event");
                }
                crossbeam_channel::TrySendError::Disconnected(_) => {
                    log::info!("Event channel disconnected, stopping loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pose;
    use std::collections::VecDeque;

    /// Scripted source: yields queued updates, then reports no data.
    struct ScriptedSource {
        updates: VecDeque<ToolUpdate>,
    }

    impl ScriptedSource {
        fn new(updates: Vec<ToolUpdate>) -> ScriptedSource {
            ScriptedSource {
                updates: updates.into(),
            }
        }
    }

    impl PoseSource for ScriptedSource {
        fn poll(&mut self, timeout: Duration) -> Result<Option<ToolUpdate>> {
            match self.updates.pop_front() {
                Some(update) => Ok(Some(update)),
                None => {
                    // Honor the timeout like a real device would.
                    std::thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    fn update(tool: &str, translation: [f64; 3]) -> ToolUpdate {
        ToolUpdate {
            tool: tool.to_owned(),
            pose: Some(Pose::from_translation(translation)),
            visible: true,
        }
    }

    #[test]
    fn updates_land_in_the_store_and_emit_events() {
        let registry = Arc::new(ToolRegistry::new());
        let tool = registry.register("pointer").unwrap();

        let source = ScriptedSource::new(vec![
            update("pointer", [1.0, 0.0, 0.0]),
            update("pointer", [2.0, 0.0, 0.0]),
        ]);
        let acquisition = AcquisitionLoop::start(source, registry).unwrap();

        let first = acquisition.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = acquisition.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.tool, "pointer");
        assert!(first.visible);
        assert!(first.modification_count < second.modification_count);

        assert_eq!(tool.raw_pose().translation, [2.0, 0.0, 0.0]);
        assert!(tool.is_visible());
        acquisition.stop();
    }

    #[test]
    fn sub_tolerance_updates_produce_no_events() {
        let registry = Arc::new(ToolRegistry::new());
        registry.register("pointer").unwrap();

        let source = ScriptedSource::new(vec![
            update("pointer", [1.0, 0.0, 0.0]),
            update("pointer", [1.0 + 1e-9, 0.0, 0.0]),
        ]);
        let acquisition = AcquisitionLoop::start(source, registry.clone()).unwrap();

        // First update changes visibility and pose; the noisy repeat is silent.
        acquisition.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            acquisition.recv_timeout(Duration::from_millis(300)),
            Err(TrackingError::Timeout)
        ));
        assert_eq!(
            registry.get("pointer").unwrap().raw_pose().translation[0],
            1.0 + 1e-9
        );
    }

    #[test]
    fn unknown_tool_updates_are_skipped() {
        let registry = Arc::new(ToolRegistry::new());
        let tool = registry.register("pointer").unwrap();

        let source = ScriptedSource::new(vec![
            update("ghost", [9.0, 9.0, 9.0]),
            update("pointer", [1.0, 2.0, 3.0]),
        ]);
        let acquisition = AcquisitionLoop::start(source, registry).unwrap();

        let event = acquisition.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.tool, "pointer");
        assert_eq!(tool.raw_pose().translation, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn loss_of_visibility_without_pose_is_reported() {
        let registry = Arc::new(ToolRegistry::new());
        let tool = registry.register("pointer").unwrap();
        tool.set_visible(true).unwrap();

        let source = ScriptedSource::new(vec![ToolUpdate {
            tool: "pointer".to_owned(),
            pose: None,
            visible: false,
        }]);
        let acquisition = AcquisitionLoop::start(source, registry).unwrap();

        let event = acquisition.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!event.visible);
        assert!(!tool.is_visible());
    }

    #[test]
    fn stop_joins_the_thread() {
        let registry = Arc::new(ToolRegistry::new());
        let acquisition =
            AcquisitionLoop::start(ScriptedSource::new(Vec::new()), registry).unwrap();
        assert!(acquisition.is_active());
        acquisition.stop();
    }
}
