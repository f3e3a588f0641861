//! Shared data models for the herdwatch backend.
//!
//! This crate provides Serde-serializable types for:
//! - Detections and bounding boxes
//! - Posture labels derived from box geometry
//! - Aggregate count summaries returned per request

pub mod detection;
pub mod posture;
pub mod summary;

// Re-export common types
pub use detection::{BoundingBox, Detection, COCO_CLASSES, COW_CLASS_ID};
pub use posture::Posture;
pub use summary::CountSummary;
