//! Raw detection normalization

use crate::{Biodegradability, Detection, Mode, RawDetection};

/// Converts raw model detections into client-facing detections
pub struct DetectionNormalizer<'a> {
    /// Class names indexed by model class id
    names: &'a [String],
    /// Active detection domain
    mode: Mode,
}

impl<'a> DetectionNormalizer<'a> {
    /// Create a normalizer for one model and mode
    pub fn new(names: &'a [String], mode: Mode) -> Self {
        Self { names, mode }
    }

    /// Resolve a class index, falling back to `class_<index>`
    pub fn class_name(&self, class_index: usize) -> String {
        self.names
            .get(class_index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_index))
    }

    /// Normalize one raw detection
    pub fn normalize(&self, raw: &RawDetection, frame: Option<u64>) -> Detection {
        let class_name = self.class_name(raw.class_index);

        let biodegradable = match self.mode {
            Mode::Waste => Biodegradability::classify(&class_name),
            Mode::Space => Biodegradability::Unknown,
        };

        Detection {
            bbox: [
                raw.x1,
                raw.y1,
                (raw.x2 - raw.x1).max(0.0),
                (raw.y2 - raw.y1).max(0.0),
            ],
            class_name,
            confidence: raw.confidence,
            frame,
            biodegradable,
        }
    }
}
