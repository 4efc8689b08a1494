/// Errors that can occur when operating on tracked tools.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("invalid pose: orientation quaternion {0:?} has zero norm")]
    InvalidPose([f64; 4]),

    #[error("unknown tool '{0}' (never registered, or already unregistered)")]
    UnknownTool(String),

    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("acquisition source failed: {0}")]
    Source(String),

    #[error("acquisition loop stopped")]
    LoopStopped,

    #[error("timeout waiting for tracking event")]
    Timeout,
}
