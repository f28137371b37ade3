//! Process-wide model registry
//!
//! Built once at startup. Slots whose model is missing or fails to load stay
//! empty for the lifetime of the process; there is no reload path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{Detector, InferenceError, YoloConfig, YoloDetector};

/// Named model slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKey {
    /// Ground-level waste classifier
    Waste,
    /// Drone-captured waste classifier
    Drone,
    /// Generic space objects
    Space,
    /// Space anomalies
    SpaceAnomaly,
}

impl ModelKey {
    pub const ALL: [ModelKey; 4] = [
        ModelKey::Waste,
        ModelKey::Drone,
        ModelKey::Space,
        ModelKey::SpaceAnomaly,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::Waste => "waste",
            ModelKey::Drone => "drone",
            ModelKey::Space => "space",
            ModelKey::SpaceAnomaly => "space_anomaly",
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub waste: PathBuf,
    pub drone: PathBuf,
    pub space: PathBuf,
    pub space_anomaly: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            waste: PathBuf::from("best.onnx"),
            drone: PathBuf::from("best2.onnx"),
            space: PathBuf::from("space.onnx"),
            space_anomaly: PathBuf::from("anomaly.onnx"),
        }
    }
}

impl ModelPaths {
    pub fn get(&self, key: ModelKey) -> &Path {
        match key {
            ModelKey::Waste => &self.waste,
            ModelKey::Drone => &self.drone,
            ModelKey::Space => &self.space,
            ModelKey::SpaceAnomaly => &self.space_anomaly,
        }
    }
}

/// Availability of one model slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    /// Model is loaded and ready
    pub loaded: bool,
    /// Configured model path
    pub path: String,
    /// Model file exists on disk
    pub exists: bool,
}

struct ModelSlot {
    path: PathBuf,
    exists: bool,
    detector: Option<Arc<dyn Detector>>,
}

/// Immutable mapping from model key to loaded detector
pub struct ModelRegistry {
    slots: BTreeMap<ModelKey, ModelSlot>,
}

impl ModelRegistry {
    /// Load every configured model with the YOLO backend
    pub fn load(paths: &ModelPaths, config: &YoloConfig) -> Self {
        Self::load_with(paths, |_, path| {
            YoloDetector::load(path, config).map(|d| Arc::new(d) as Arc<dyn Detector>)
        })
    }

    /// Load every configured model with a custom loader
    ///
    /// The loader is only called for paths that exist.
    pub fn load_with<F>(paths: &ModelPaths, mut loader: F) -> Self
    where
        F: FnMut(ModelKey, &Path) -> Result<Arc<dyn Detector>, InferenceError>,
    {
        let mut slots = BTreeMap::new();

        for key in ModelKey::ALL {
            let path = paths.get(key).to_path_buf();
            let exists = path.exists();

            let detector = if exists {
                match loader(key, &path) {
                    Ok(detector) => {
                        info!("{} model loaded successfully from {}", key, path.display());
                        Some(detector)
                    }
                    Err(e) => {
                        error!("Error loading {} model: {}", key, e);
                        None
                    }
                }
            } else {
                warn!("{} model file not found at {}", key, path.display());
                None
            };

            slots.insert(
                key,
                ModelSlot {
                    path,
                    exists,
                    detector,
                },
            );
        }

        Self { slots }
    }

    /// Build a registry from detectors that are already loaded
    ///
    /// Keys without a detector are reported as missing files.
    pub fn with_detectors<I>(paths: &ModelPaths, detectors: I) -> Self
    where
        I: IntoIterator<Item = (ModelKey, Arc<dyn Detector>)>,
    {
        let mut loaded: BTreeMap<ModelKey, Arc<dyn Detector>> = detectors.into_iter().collect();

        let slots = ModelKey::ALL
            .into_iter()
            .map(|key| {
                let detector = loaded.remove(&key);
                let slot = ModelSlot {
                    path: paths.get(key).to_path_buf(),
                    exists: detector.is_some(),
                    detector,
                };
                (key, slot)
            })
            .collect();

        Self { slots }
    }

    /// Loaded detector for a key
    pub fn get(&self, key: ModelKey) -> Option<Arc<dyn Detector>> {
        self.slots.get(&key).and_then(|slot| slot.detector.clone())
    }

    /// Configured path for a key
    pub fn path(&self, key: ModelKey) -> Option<&Path> {
        self.slots.get(&key).map(|slot| slot.path.as_path())
    }

    pub fn status(&self, key: ModelKey) -> ModelStatus {
        match self.slots.get(&key) {
            Some(slot) => ModelStatus {
                loaded: slot.detector.is_some(),
                path: slot.path.display().to_string(),
                exists: slot.exists,
            },
            None => ModelStatus {
                loaded: false,
                path: String::new(),
                exists: false,
            },
        }
    }

    /// Status of every slot keyed by slot name
    pub fn statuses(&self) -> BTreeMap<&'static str, ModelStatus> {
        ModelKey::ALL
            .into_iter()
            .map(|key| (key.as_str(), self.status(key)))
            .collect()
    }
}
