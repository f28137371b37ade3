//! YOLO detector backed by tract-onnx

use crate::{Detector, InferenceError};
use detection_core::RawDetection;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

type YoloPlan = TypedRunnableModel<TypedModel>;

/// YOLO preprocessing and postprocessing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoloConfig {
    /// Square model input size (pixels)
    pub input_size: u32,
    /// IoU above which overlapping boxes of one class are suppressed
    pub iou_threshold: f32,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            iou_threshold: 0.45,
        }
    }
}

/// YOLOv8-style detector (output `[1, 4 + classes, anchors]`)
pub struct YoloDetector {
    name: String,
    plan: YoloPlan,
    names: Vec<String>,
    config: YoloConfig,
}

impl YoloDetector {
    /// Load an ONNX model and its optional `.names` sidecar
    pub fn load(path: &Path, config: &YoloConfig) -> Result<Self, InferenceError> {
        info!("Loading detection model from {}", path.display());

        let size = config.input_size as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        let names = load_names(path)?;
        if names.is_empty() {
            warn!(
                "No class names found for {}; classes will be reported by index",
                path.display()
            );
        }

        Ok(Self {
            name: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "yolo".to_string()),
            plan,
            names,
            config: config.clone(),
        })
    }

    fn to_input(&self, image: &DynamicImage) -> Tensor {
        let size = self.config.input_size;
        let rgb = image
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb8();

        tract_ndarray::Array4::from_shape_fn(
            (1, 3, size as usize, size as usize),
            |(_, c, y, x)| rgb.get_pixel(x as u32, y as u32).0[c] as f32 / 255.0,
        )
        .into()
    }
}

impl Detector for YoloDetector {
    fn infer(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, InferenceError> {
        let (width, height) = image.dimensions();
        let input = self.to_input(image);

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".into()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into_dimensionality::<tract_ndarray::Ix3>()
            .map_err(|e| {
                InferenceError::InferenceFailed(format!("unexpected output rank: {}", e))
            })?;

        let (batch, rows, anchors) = view.dim();
        if batch != 1 || rows < 5 {
            return Err(InferenceError::InferenceFailed(format!(
                "unexpected output shape [{}, {}, {}]",
                batch, rows, anchors
            )));
        }

        let classes = rows - 4;
        let scale_x = width as f32 / self.config.input_size as f32;
        let scale_y = height as f32 / self.config.input_size as f32;

        let mut candidates = Vec::new();
        for a in 0..anchors {
            let (class_index, confidence) = (0..classes)
                .map(|c| (c, view[[0, 4 + c, a]]))
                .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

            if confidence < confidence_threshold {
                continue;
            }

            let cx = view[[0, 0, a]];
            let cy = view[[0, 1, a]];
            let w = view[[0, 2, a]];
            let h = view[[0, 3, a]];

            candidates.push(RawDetection {
                x1: ((cx - w / 2.0) * scale_x).clamp(0.0, width as f32),
                y1: ((cy - h / 2.0) * scale_y).clamp(0.0, height as f32),
                x2: ((cx + w / 2.0) * scale_x).clamp(0.0, width as f32),
                y2: ((cy + h / 2.0) * scale_y).clamp(0.0, height as f32),
                confidence,
                class_index,
            });
        }

        let kept = non_max_suppression(candidates, self.config.iou_threshold);
        debug!("{} kept {} detections", self.name, kept.len());
        Ok(kept)
    }

    fn names(&self) -> &[String] {
        &self.names
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read class names from `<model>.names`, one per line
fn load_names(model_path: &Path) -> Result<Vec<String>, InferenceError> {
    let names_path = model_path.with_extension("names");
    if !names_path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(&names_path).map_err(|e| {
        InferenceError::ModelLoadError(format!("{}: {}", names_path.display(), e))
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Intersection over union of two corner-pair boxes
fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = ix * iy;

    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - intersection;

    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Per-class greedy NMS, highest confidence first
fn non_max_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f32,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<RawDetection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept.iter().any(|k| {
            k.class_index == candidate.class_index && iou(k, &candidate) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
