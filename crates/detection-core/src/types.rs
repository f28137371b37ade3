//! Detection records and response payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Biodegradability;

/// Detection domain selected by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Waste classification (ground and drone imagery)
    Waste,
    /// Astronomical objects and anomalies
    Space,
}

impl Mode {
    /// Parse the wire name of a mode
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "waste" => Some(Mode::Waste),
            "space" => Some(Mode::Space),
            _ => None,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Waste => "waste",
            Mode::Space => "space",
        }
    }
}

/// Kind of uploaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Parse the wire name of a media type
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// One detection as produced by a model, in corner-pair form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Detection confidence (0.0 to 1.0)
    pub confidence: f32,
    /// Index into the model's class names
    pub class_index: usize,
}

/// Normalized detection returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Bounding box [x, y, width, height], top-left origin
    #[serde(rename = "box")]
    pub bbox: [f32; 4],

    /// Class name reported by the model
    pub class_name: String,

    /// Detection confidence
    pub confidence: f32,

    /// Source frame index (video only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,

    /// Waste biodegradability, omitted when the class is not in the table
    #[serde(skip_serializing_if = "Biodegradability::is_unknown")]
    pub biodegradable: Biodegradability,
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.bbox[2]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3]
    }

    /// Box area in pixels
    pub fn area(&self) -> f64 {
        self.width() as f64 * self.height() as f64
    }
}

/// Summary of one detection request
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResponse {
    /// Detections in discovery order
    pub detections: Vec<Detection>,

    /// Inference wall time (seconds)
    pub processing_time: f64,

    /// Number of detections per class name
    pub class_counts: BTreeMap<String, usize>,

    /// Percentage of the image (or average frame) covered by boxes, waste mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waste_density: Option<f64>,

    /// Total frames in the video container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,

    /// Video frame rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
}
