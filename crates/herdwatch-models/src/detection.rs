//! Detections and bounding boxes produced by the object detector.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// COCO class names (80 classes), in the contiguous ordering used by
/// YOLOv8 exports.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

/// Class index of "cow" in [`COCO_CLASSES`].
pub const COW_CLASS_ID: usize = 19;

/// Axis-aligned bounding box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x_min: f32,
    /// Top edge y-coordinate
    pub y_min: f32,
    /// Right edge x-coordinate
    pub x_max: f32,
    /// Bottom edge y-coordinate
    pub y_max: f32,
}

impl BoundingBox {
    /// Create a bounding box, rejecting non-finite or inverted coordinates.
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Option<Self> {
        let coords = [x_min, y_min, x_max, y_max];
        if coords.iter().any(|c| !c.is_finite()) {
            return None;
        }
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some(Self { x_min, y_min, x_max, y_max })
    }

    /// Box width in pixels.
    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Box height in pixels.
    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Compute Intersection over Union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x_min.max(other.x_min);
        let y1 = self.y_min.max(other.y_min);
        let x2 = self.x_max.min(other.x_max);
        let y2 = self.y_max.min(other.y_max);

        let inter_w = (x2 - x1).max(0.0);
        let inter_h = (y2 - y1).max(0.0);
        let intersection = inter_w * inter_h;

        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// One detected object: class, confidence, and (when complete) its box.
///
/// A detection whose box could not be fully recovered from the backend
/// carries `bbox: None`; consumers skip it rather than failing the
/// surrounding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// COCO class index (0 = person, 19 = cow, ...)
    pub class_id: usize,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
    /// Bounding box in source-image pixels, if complete
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    /// Create a new detection.
    pub fn new(class_id: usize, confidence: f32, bbox: Option<BoundingBox>) -> Self {
        Self { class_id, confidence, bbox }
    }

    /// Check if this detection is of the target cow class.
    pub fn is_cow(&self) -> bool {
        self.class_id == COW_CLASS_ID
    }

    /// Human-readable class name, if the class index is known.
    pub fn class_name(&self) -> Option<&'static str> {
        COCO_CLASSES.get(self.class_id).copied()
    }
}
