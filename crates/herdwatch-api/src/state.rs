//! Application state.

use std::sync::Arc;

use herdwatch_detect::{Detector, InferenceParams, YoloConfig, YoloDetector};

use crate::config::ApiConfig;

/// Shared application state.
///
/// The detector is loaded once at startup and shared read-only across
/// all concurrent request executions.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub detector: Arc<dyn Detector>,
    pub inference_params: InferenceParams,
}

impl AppState {
    /// Create new application state, loading the detection model.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let detector = YoloDetector::new(YoloConfig {
            model_path: config.model_path.clone(),
            ..YoloConfig::default()
        })?;

        Ok(Self::with_detector(config, Arc::new(detector)))
    }

    /// Create application state around an existing detector.
    ///
    /// Used by tests to inject a fake backend.
    pub fn with_detector(config: ApiConfig, detector: Arc<dyn Detector>) -> Self {
        Self {
            config,
            detector,
            inference_params: InferenceParams::default(),
        }
    }
}
