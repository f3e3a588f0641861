//! YOLOv8 ONNX detection backend.
//!
//! Runs a pretrained YOLOv8 model through ONNX Runtime with automatic
//! execution provider selection:
//! - CUDA on Linux with NVIDIA GPU (when `cuda` feature enabled)
//! - CoreML on macOS with Apple Silicon
//! - CPU fallback on all platforms

use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, GenericImageView};
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use herdwatch_models::{BoundingBox, Detection};

use crate::detector::{Detector, InferenceParams};
use crate::error::{DetectError, DetectResult};

/// Configuration for the YOLOv8 backend.
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// IoU threshold for non-maximum suppression
    pub nms_threshold: f32,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: "models/yolov8x.onnx".to_string(),
            nms_threshold: 0.45,
        }
    }
}

/// A detector candidate with a complete box, prior to NMS.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    class_id: usize,
    confidence: f32,
    bbox: BoundingBox,
}

impl Candidate {
    fn into_detection(self) -> Detection {
        Detection::new(self.class_id, self.confidence, Some(self.bbox))
    }
}

/// Object detector backed by a YOLOv8 ONNX model.
///
/// The session is loaded once and shared; `run` needs `&mut Session`,
/// so it sits behind a `Mutex`. Nothing about the model itself is
/// mutated after load.
pub struct YoloDetector {
    session: Mutex<Session>,
    config: YoloConfig,
}

impl YoloDetector {
    /// Load the model from `config.model_path`.
    pub fn new(config: YoloConfig) -> DetectResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(DetectError::ModelNotFound(model_path.to_path_buf()));
        }

        let session = Mutex::new(create_session(model_path)?);
        info!(model_path = %config.model_path, "YOLOv8 detector initialized");

        Ok(Self { session, config })
    }

    /// One full forward pass: preprocess, inference, postprocess.
    fn run_pass(
        &self,
        img: &DynamicImage,
        params: &InferenceParams,
    ) -> DetectResult<(Vec<Candidate>, Vec<Detection>)> {
        let (orig_width, orig_height) = img.dimensions();
        let input = preprocess(img, params.input_size)?;
        let (dims, data) = self.run_inference(input)?;
        postprocess(&dims, &data, params, orig_width, orig_height)
    }

    /// Run ONNX inference, returning the output tensor shape and data.
    fn run_inference(&self, input: Value) -> DetectResult<(Vec<usize>, Vec<f32>)> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| DetectError::inference(format!("ONNX inference failed: {}", e)))?;

        // YOLOv8 output is [1, 4 + classes, boxes]
        let output = outputs
            .get("output0")
            .ok_or_else(|| DetectError::inference("Missing output0 tensor"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectError::inference(format!("Failed to extract tensor: {}", e)))?;

        let dims: Vec<usize> = tensor.0.iter().map(|d| *d as usize).collect();
        let data: Vec<f32> = tensor.1.iter().copied().collect();
        Ok((dims, data))
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage, params: &InferenceParams) -> DetectResult<Vec<Detection>> {
        let (mut candidates, mut incomplete) = self.run_pass(image, params)?;

        // Test-time augmentation: second pass over the horizontally
        // flipped image, boxes mapped back into source coordinates,
        // merged through the shared NMS below.
        if params.augment {
            let flipped = image.fliph();
            let (flipped_candidates, flipped_incomplete) = self.run_pass(&flipped, params)?;
            let width = image.width() as f32;
            candidates.extend(
                flipped_candidates
                    .into_iter()
                    .filter_map(|c| unflip_candidate(c, width)),
            );
            incomplete.extend(flipped_incomplete);
        }

        let kept = non_maximum_suppression(candidates, self.config.nms_threshold);
        debug!(
            count = kept.len(),
            skipped = incomplete.len(),
            augment = params.augment,
            "Object detection completed"
        );

        let mut detections: Vec<Detection> = kept.into_iter().map(Candidate::into_detection).collect();
        // Incomplete detections are reported as-is; the pipeline skips
        // them individually instead of failing the request.
        detections.append(&mut incomplete);
        Ok(detections)
    }
}

/// Preprocess an image for YOLOv8 inference.
///
/// Resizes to a square `input_size`, normalizes pixels to [0, 1], and
/// lays the data out as NCHW.
fn preprocess(img: &DynamicImage, input_size: u32) -> DetectResult<Value> {
    let resized = img.resize_exact(input_size, input_size, image::imageops::FilterType::Triangle);

    let rgb = resized.to_rgb8();
    let (w, h) = (input_size as usize, input_size as usize);

    // HWC -> CHW with normalization
    let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);
    for c in 0..3 {
        for y in 0..h {
            for x in 0..w {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                chw_data.push(pixel[c] as f32 / 255.0);
            }
        }
    }

    let shape = vec![1usize, 3, h, w];
    Tensor::from_array((shape, chw_data.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| DetectError::internal(format!("Failed to create tensor: {}", e)))
}

/// Decode the raw YOLOv8 output into detection candidates.
///
/// The output layout is `[1, 4 + classes, boxes]`: four center-format
/// box values followed by per-class scores, one column per candidate.
/// The box count is taken from the tensor shape so 640 and 1024 inputs
/// decode identically. Candidates whose coordinates do not form a
/// valid box are returned separately as incomplete detections.
fn postprocess(
    dims: &[usize],
    data: &[f32],
    params: &InferenceParams,
    orig_width: u32,
    orig_height: u32,
) -> DetectResult<(Vec<Candidate>, Vec<Detection>)> {
    if dims.len() != 3 || dims[0] != 1 || dims[1] <= 4 {
        return Err(DetectError::inference(format!(
            "Unexpected output shape: {:?}",
            dims
        )));
    }
    let num_features = dims[1];
    let num_boxes = dims[2];
    let num_classes = num_features - 4;

    if data.len() != num_features * num_boxes {
        return Err(DetectError::inference(format!(
            "Output size mismatch: expected {}, got {}",
            num_features * num_boxes,
            data.len()
        )));
    }

    // [1, F, B] -> [B, F]
    let output_array = Array::from_shape_vec((num_features, num_boxes), data.to_vec())
        .map_err(|e| DetectError::inference(format!("Failed to reshape output: {}", e)))?;
    let transposed = output_array.t();

    let input_size = params.input_size as f32;
    let scale_w = orig_width as f32 / input_size;
    let scale_h = orig_height as f32 / input_size;

    let mut candidates = Vec::new();
    let mut incomplete = Vec::new();

    for i in 0..num_boxes {
        // Center-format box
        let cx = transposed[[i, 0]];
        let cy = transposed[[i, 1]];
        let w = transposed[[i, 2]];
        let h = transposed[[i, 3]];

        let mut best_class = 0;
        let mut best_score = 0.0f32;
        for c in 0..num_classes {
            let score = transposed[[i, 4 + c]];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }

        if best_score < params.confidence_threshold {
            continue;
        }

        // Center format -> corner format, scaled into source pixels
        // and clamped to the frame.
        let x_min = ((cx - w / 2.0) * scale_w).clamp(0.0, orig_width as f32);
        let y_min = ((cy - h / 2.0) * scale_h).clamp(0.0, orig_height as f32);
        let x_max = ((cx + w / 2.0) * scale_w).clamp(0.0, orig_width as f32);
        let y_max = ((cy + h / 2.0) * scale_h).clamp(0.0, orig_height as f32);

        match BoundingBox::new(x_min, y_min, x_max, y_max) {
            Some(bbox) => candidates.push(Candidate {
                class_id: best_class,
                confidence: best_score,
                bbox,
            }),
            None => incomplete.push(Detection::new(best_class, best_score, None)),
        }
    }

    Ok((candidates, incomplete))
}

/// Map a candidate detected on the horizontally flipped image back
/// into source coordinates.
fn unflip_candidate(c: Candidate, image_width: f32) -> Option<Candidate> {
    let bbox = BoundingBox::new(
        image_width - c.bbox.x_max,
        c.bbox.y_min,
        image_width - c.bbox.x_min,
        c.bbox.y_max,
    )?;
    Some(Candidate { bbox, ..c })
}

/// Class-aware non-maximum suppression.
fn non_maximum_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(candidates[i]);

        for j in (i + 1)..candidates.len() {
            if suppressed[j] || candidates[i].class_id != candidates[j].class_id {
                continue;
            }
            if candidates[i].bbox.iou(&candidates[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Create an ONNX Runtime session with automatic execution provider
/// selection.
fn create_session(model_path: &Path) -> DetectResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| DetectError::internal(format!("Failed to read model file: {}", e)))?;

    let mut builder = Session::builder()
        .map_err(|e| DetectError::internal(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| DetectError::internal(format!("Failed to set optimization level: {}", e)))?;

    // Try CUDA on Linux with cuda feature
    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider for detection");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, trying alternatives");
    }

    // Try CoreML on macOS
    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!("Using CoreML execution provider for detection");
                return Ok(session);
            }
        }
        debug!("CoreML execution provider not available, using CPU");
    }

    info!("Using CPU execution provider for detection");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| DetectError::internal(format!("Failed to load ONNX model: {}", e)))
}
