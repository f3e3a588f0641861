//! Cow detection and posture-counting pipeline.
//!
//! The core flow is: decode image bytes, run the object detector once,
//! keep only cow-class detections, classify each one's posture from
//! its bounding-box aspect ratio, and fold the results into a
//! [`CountSummary`](herdwatch_models::CountSummary).
//!
//! The detector is abstracted behind the [`Detector`] trait so the
//! pipeline can be exercised with a fake backend in tests; the
//! production backend is [`YoloDetector`], a YOLOv8 ONNX model run
//! through ONNX Runtime.

pub mod decode;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod yolo;

pub use decode::decode_image;
pub use detector::{Detector, InferenceParams};
pub use error::{DetectError, DetectResult};
pub use pipeline::count_cows;
pub use yolo::{YoloConfig, YoloDetector};
