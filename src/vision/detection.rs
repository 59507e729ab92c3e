//! Vision detection contract
//!
//! Field names follow the detection service's JSON (`name`, `score`,
//! `boundingPoly.normalizedVertices`) so recorded responses deserialize
//! directly.

use crate::simulation::{SimulationError, SimulationResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An image submitted for object detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRequest {
    /// Base64 encoded image, without a `data:` prefix
    pub image: String,
    /// Frame width in pixels, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Frame height in pixels, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl DetectionRequest {
    /// Request for an encoded image of unknown size
    pub fn new(image: impl Into<String>) -> Self {
        Self { image: image.into(), width: None, height: None }
    }

    /// Attach the frame size
    pub fn with_frame(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Reject empty payloads and anything that does not decode as standard base64
    pub fn validate(&self) -> SimulationResult<()> {
        let image = self.image.trim();
        if image.is_empty() {
            return Err(SimulationError::vision_error("Image data required"));
        }
        BASE64
            .decode(image)
            .map_err(|e| SimulationError::vision_error(format!("Image data is not base64 encoded: {}", e)))?;
        Ok(())
    }
}

/// A corner in image-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedVertex {
    /// Horizontal position in [0, 1]
    #[serde(default)]
    pub x: f64,
    /// Vertical position in [0, 1]
    #[serde(default)]
    pub y: f64,
}

impl NormalizedVertex {
    /// Create a vertex, clamping both coordinates into the image
    pub fn new(x: f64, y: f64) -> Self {
        Self { x: x.clamp(0.0, 1.0), y: y.clamp(0.0, 1.0) }
    }
}

/// Quadrilateral around a detected object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    /// Corners clockwise from top-left
    #[serde(default)]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

impl BoundingPoly {
    /// Axis-aligned box from its top-left corner and size
    pub fn from_box(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            normalized_vertices: vec![
                NormalizedVertex::new(x, y),
                NormalizedVertex::new(x + width, y),
                NormalizedVertex::new(x + width, y + height),
                NormalizedVertex::new(x, y + height),
            ],
        }
    }

    /// Whether the polygon has four corners inside the unit square
    pub fn is_valid(&self) -> bool {
        self.normalized_vertices.len() == 4
            && self
                .normalized_vertices
                .iter()
                .all(|v| (0.0..=1.0).contains(&v.x) && (0.0..=1.0).contains(&v.y))
    }

    fn corner(&self, index: usize) -> NormalizedVertex {
        self.normalized_vertices.get(index).copied().unwrap_or_default()
    }
}

/// Pixel rectangle on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

/// One object found in the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    /// Generic object label, e.g. `Bottle`
    #[serde(rename = "name")]
    pub label: String,
    /// Detection confidence in [0, 1]
    #[serde(rename = "score")]
    pub confidence: f64,
    /// Region of the object
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

impl DetectedObject {
    /// Create a detection; confidence is clamped into [0, 1]
    pub fn new(label: impl Into<String>, confidence: f64, bounding_poly: BoundingPoly) -> Self {
        Self { label: label.into(), confidence: confidence.clamp(0.0, 1.0), bounding_poly }
    }

    /// Product family for the detection label
    pub fn product_family(&self) -> &str {
        product_family(&self.label)
    }

    /// Box on a `frame_width` x `frame_height` frame
    ///
    /// Uses the top-left and bottom-right corners; missing corners count as
    /// the origin.
    pub fn to_pixel_rect(&self, frame_width: u32, frame_height: u32) -> PixelRect {
        let top_left = self.bounding_poly.corner(0);
        let bottom_right = self.bounding_poly.corner(2);
        let scale = |fraction: f64, extent: u32| (fraction * f64::from(extent)).round().max(0.0) as u32;
        PixelRect {
            x: scale(top_left.x, frame_width),
            y: scale(top_left.y, frame_height),
            width: scale(bottom_right.x - top_left.x, frame_width),
            height: scale(bottom_right.y - top_left.y, frame_height),
        }
    }
}

impl fmt::Display for DetectedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0}%)", self.label, self.confidence * 100.0)
    }
}

/// Objects found in one image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    /// Detections, most confident first when the detector ranks them
    pub objects: Vec<DetectedObject>,
}

impl DetectionResponse {
    /// Detections at or above `threshold`
    pub fn confident(&self, threshold: f64) -> impl Iterator<Item = &DetectedObject> {
        self.objects.iter().filter(move |object| object.confidence >= threshold)
    }
}

/// Something that can find objects in an image
pub trait VisionDetector: fmt::Debug {
    /// Detect objects in the request image
    fn detect(&mut self, request: &DetectionRequest) -> SimulationResult<DetectionResponse>;
}

/// Map a generic detection label to the product family shown to the cashier
///
/// Unknown labels pass through unchanged.
pub fn product_family(label: &str) -> &str {
    match label {
        "Bottle" => "Drink",
        "Food" => "Snack",
        "Fruit" => "Fruit",
        "Vegetable" => "Vegetable",
        "Package" => "Packaged Item",
        "Container" => "Canned Item",
        "Box" => "Boxed Item",
        other => other,
    }
}
