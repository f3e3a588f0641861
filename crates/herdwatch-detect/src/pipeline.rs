//! End-to-end counting pipeline.
//!
//! Straight-line flow per request: decode the uploaded bytes, invoke
//! the detector exactly once, filter to the cow class, classify each
//! posture, and fold into a summary. Fully synchronous; the only
//! shared state is the read-only detector handle.

use tracing::{info, warn};

use herdwatch_models::{CountSummary, Posture};

use crate::decode::decode_image;
use crate::detector::{Detector, InferenceParams};
use crate::error::DetectResult;

/// Count cows and their postures in one uploaded image.
///
/// Any failure before aggregation aborts the whole request; there is
/// no partial-result path. The one local recovery is a detection with
/// an incomplete box, which is skipped with a warning while the rest
/// of the detections are still counted.
pub fn count_cows(
    detector: &dyn Detector,
    image_bytes: &[u8],
    params: &InferenceParams,
) -> DetectResult<CountSummary> {
    let image = decode_image(image_bytes)?;
    let detections = detector.detect(&image, params)?;

    let mut summary = CountSummary::new();
    for detection in detections.iter().filter(|d| d.is_cow()) {
        let Some(bbox) = detection.bbox else {
            warn!(
                confidence = detection.confidence,
                "Skipping cow detection with incomplete bounding box"
            );
            continue;
        };
        summary.record(Posture::from_box(&bbox));
    }

    info!(
        total = summary.total(),
        standing = summary.standing(),
        laying = summary.laying(),
        "Detected cows"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use herdwatch_models::{BoundingBox, Detection, COW_CLASS_ID};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    /// Detector double returning a canned detection list.
    struct StaticDetector {
        detections: Vec<Detection>,
    }

    impl Detector for StaticDetector {
        fn detect(
            &self,
            _image: &DynamicImage,
            _params: &InferenceParams,
        ) -> DetectResult<Vec<Detection>> {
            Ok(self.detections.clone())
        }
    }

    /// Detector double that always fails.
    struct FailingDetector;

    impl Detector for FailingDetector {
        fn detect(
            &self,
            _image: &DynamicImage,
            _params: &InferenceParams,
        ) -> DetectResult<Vec<Detection>> {
            Err(DetectError::inference("backend unavailable"))
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(64, 48));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn cow(confidence: f32, x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Detection {
        Detection::new(
            COW_CLASS_ID,
            confidence,
            Some(BoundingBox::new(x_min, y_min, x_max, y_max).unwrap()),
        )
    }

    #[test]
    fn test_empty_detections_yield_zero_counts() {
        let detector = StaticDetector { detections: vec![] };
        let summary = count_cows(&detector, &png_bytes(), &InferenceParams::default()).unwrap();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.standing(), 0);
        assert_eq!(summary.laying(), 0);
    }

    #[test]
    fn test_standing_and_laying_mix() {
        let detector = StaticDetector {
            detections: vec![
                // Taller than wide: standing
                cow(0.9, 0.0, 0.0, 40.0, 100.0),
                // Wider than tall: laying
                cow(0.8, 50.0, 50.0, 150.0, 90.0),
            ],
        };
        let summary = count_cows(&detector, &png_bytes(), &InferenceParams::default()).unwrap();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.standing(), 1);
        assert_eq!(summary.laying(), 1);
    }

    #[test]
    fn test_non_cow_classes_ignored() {
        let detector = StaticDetector {
            detections: vec![
                Detection::new(0, 0.99, Some(BoundingBox::new(0.0, 0.0, 40.0, 100.0).unwrap())),
                Detection::new(17, 0.95, Some(BoundingBox::new(0.0, 0.0, 40.0, 100.0).unwrap())),
                cow(0.5, 0.0, 0.0, 40.0, 100.0),
            ],
        };
        let summary = count_cows(&detector, &png_bytes(), &InferenceParams::default()).unwrap();
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.standing(), 1);
    }

    #[test]
    fn test_incomplete_box_skipped_without_aborting() {
        let detector = StaticDetector {
            detections: vec![
                cow(0.9, 0.0, 0.0, 40.0, 100.0),
                Detection::new(COW_CLASS_ID, 0.7, None),
                cow(0.6, 0.0, 0.0, 100.0, 40.0),
            ],
        };
        let summary = count_cows(&detector, &png_bytes(), &InferenceParams::default()).unwrap();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.standing(), 1);
        assert_eq!(summary.laying(), 1);
    }

    #[test]
    fn test_invariant_holds_for_any_mix() {
        let detector = StaticDetector {
            detections: vec![
                cow(0.9, 0.0, 0.0, 40.0, 100.0),
                cow(0.8, 0.0, 0.0, 100.0, 40.0),
                cow(0.7, 0.0, 0.0, 60.0, 60.0),
                Detection::new(2, 0.9, Some(BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap())),
            ],
        };
        let summary = count_cows(&detector, &png_bytes(), &InferenceParams::default()).unwrap();
        assert_eq!(summary.total(), summary.standing() + summary.laying());
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_decode_failure_skips_detector() {
        let detector = FailingDetector;
        // Garbage bytes fail at decode; the failing detector is never
        // reached, so the error is a decode error.
        let err = count_cows(&detector, &[0xde, 0xad, 0xbe, 0xef], &InferenceParams::default())
            .unwrap_err();
        assert!(matches!(err, DetectError::Decode(_)));
    }

    #[test]
    fn test_empty_bytes_are_empty_input() {
        let detector = FailingDetector;
        let err = count_cows(&detector, &[], &InferenceParams::default()).unwrap_err();
        assert!(matches!(err, DetectError::EmptyInput));
    }

    #[test]
    fn test_detector_fault_propagates() {
        let detector = FailingDetector;
        let err = count_cows(&detector, &png_bytes(), &InferenceParams::default()).unwrap_err();
        assert!(matches!(err, DetectError::Inference(_)));
    }
}
