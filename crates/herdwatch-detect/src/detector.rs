//! Detector contract.

use image::DynamicImage;

use herdwatch_models::Detection;

use crate::error::DetectResult;

/// Inference parameters passed to the detector on every invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    /// Square input resolution the image is resized to
    pub input_size: u32,
    /// Whether to apply test-time augmentation (horizontal flip pass)
    pub augment: bool,
    /// Minimum confidence for a candidate to be reported
    pub confidence_threshold: f32,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            input_size: 1024,
            augment: true,
            confidence_threshold: 0.25,
        }
    }
}

/// A pretrained object detector.
///
/// Implementations return detections for every class the model
/// recognizes; class filtering is the pipeline's job. An empty result
/// is a valid outcome, not an error. The detector is shared read-only
/// across concurrent requests, hence `Send + Sync`.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &DynamicImage, params: &InferenceParams) -> DetectResult<Vec<Detection>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = InferenceParams::default();
        assert_eq!(params.input_size, 1024);
        assert!(params.augment);
        assert!((params.confidence_threshold - 0.25).abs() < f32::EPSILON);
    }
}
