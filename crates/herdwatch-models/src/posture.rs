//! Posture labels derived from bounding-box geometry.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detection::BoundingBox;

/// Posture of a detected cow.
///
/// Derived purely from box aspect ratio: a box taller than it is wide
/// is assumed to be a standing animal, anything else a laying one.
/// This is a geometric proxy, not a learned classifier; it is known to
/// mislabel wide standing poses and resolves square boxes to `Laying`
/// by construction. Changing the rule requires product sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    Standing,
    Laying,
}

impl Posture {
    /// Classify one bounding box.
    ///
    /// The same comparison handles degenerate boxes (zero width or
    /// height): `height > width` is evaluated as-is, so a zero-area
    /// box still resolves deterministically.
    pub fn from_box(bbox: &BoundingBox) -> Self {
        if bbox.height() > bbox.width() {
            Posture::Standing
        } else {
            Posture::Laying
        }
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Posture::Standing => write!(f, "standing"),
            Posture::Laying => write!(f, "laying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> BoundingBox {
        BoundingBox::new(x_min, y_min, x_max, y_max).unwrap()
    }

    #[test]
    fn test_taller_than_wide_is_standing() {
        assert_eq!(Posture::from_box(&bbox(0.0, 0.0, 50.0, 120.0)), Posture::Standing);
    }

    #[test]
    fn test_wider_than_tall_is_laying() {
        assert_eq!(Posture::from_box(&bbox(0.0, 0.0, 120.0, 50.0)), Posture::Laying);
    }

    #[test]
    fn test_square_box_ties_to_laying() {
        // Tie-break policy: height == width resolves to Laying.
        let square = bbox(10.0, 10.0, 60.0, 60.0);
        for _ in 0..10 {
            assert_eq!(Posture::from_box(&square), Posture::Laying);
        }
    }

    #[test]
    fn test_degenerate_boxes_resolve_deterministically() {
        // Zero width, positive height: 10 > 0 -> Standing.
        assert_eq!(Posture::from_box(&bbox(5.0, 0.0, 5.0, 10.0)), Posture::Standing);
        // Zero height, positive width: 0 > 10 is false -> Laying.
        assert_eq!(Posture::from_box(&bbox(0.0, 5.0, 10.0, 5.0)), Posture::Laying);
        // Zero area point box: 0 > 0 is false -> Laying.
        assert_eq!(Posture::from_box(&bbox(5.0, 5.0, 5.0, 5.0)), Posture::Laying);
    }

    #[test]
    fn test_display() {
        assert_eq!(Posture::Standing.to_string(), "standing");
        assert_eq!(Posture::Laying.to_string(), "laying");
    }
}
