//! # tooltrack - Tracked-Tool Pose Engine
//!
//! Maintains the live pose of instruments reported by an external
//! tracking device for image-guided navigation. Provides:
//! - Rigid poses (translation + unit quaternion) with tolerance-aware equality
//! - Tool-tip calibration: `effective = raw ∘ tip_offset`
//! - A per-tool modification counter that advances only on real motion,
//!   so consumers can skip redundant re-derivation
//! - A background acquisition loop feeding tools from a [`PoseSource`]
//!
//! ## Quick Start
//! ```
//! use tooltrack::{Pose, ToolRegistry};
//!
//! let registry = ToolRegistry::new();
//! let tool = registry.register("pointer").unwrap();
//!
//! tool.set_tip_offset(Pose::from_translation([1.0, 1.0, 1.0])).unwrap();
//! tool.set_raw_pose(Pose::from_translation([5.0, 6.0, 7.0])).unwrap();
//!
//! assert_eq!(tool.effective_pose().translation, [6.0, 7.0, 8.0]);
//! assert_eq!(tool.modification_count(), 2);
//! ```

pub mod acquisition;
pub mod error;
pub mod registry;
pub mod store;
pub mod tool;
pub mod transform;
pub mod types;

pub use acquisition::{AcquisitionLoop, PoseSource};
pub use error::TrackingError;
pub use registry::ToolRegistry;
pub use store::PoseStore;
pub use tool::TrackedTool;
pub use types::*;

/// Result type alias for tooltrack operations.
pub type Result<T> = std::result::Result<T, TrackingError>;
