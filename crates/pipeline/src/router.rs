//! Model routing

use detection_core::Mode;
use inference_engine::{Detector, ModelKey, ModelRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::DetectError;

/// Client-facing model ids per mode
const MODEL_IDS: &[(Mode, &str, ModelKey)] = &[
    (Mode::Waste, "yolo", ModelKey::Waste),
    (Mode::Waste, "best2", ModelKey::Drone),
    (Mode::Space, "space-objects", ModelKey::Space),
    (Mode::Space, "space-anomalies", ModelKey::SpaceAnomaly),
];

/// Where a request's inference runs
#[derive(Clone)]
pub enum Route {
    /// A loaded model
    Model {
        key: ModelKey,
        detector: Arc<dyn Detector>,
    },
    /// Synthetic space detections, model slot is empty
    Mock { key: ModelKey },
}

/// Maps (mode, model id) to a registry slot
pub struct ModelRouter {
    registry: Arc<ModelRegistry>,
}

impl ModelRouter {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Registry key for a model id within a mode
    pub fn model_key(mode: Mode, model_id: &str) -> Result<ModelKey, DetectError> {
        MODEL_IDS
            .iter()
            .find(|(m, id, _)| *m == mode && *id == model_id)
            .map(|&(_, _, key)| key)
            .ok_or_else(|| {
                DetectError::invalid(
                    "model_id",
                    model_id,
                    format!("Unknown {} model", mode.as_str()),
                )
            })
    }

    /// Model ids accepted for a mode
    pub fn model_ids(mode: Mode) -> impl Iterator<Item = &'static str> {
        MODEL_IDS
            .iter()
            .filter(move |(m, _, _)| *m == mode)
            .map(|&(_, id, _)| id)
    }

    /// Resolve a request to a loaded model, the mock, or an error
    ///
    /// Waste requests never fall back to the mock.
    pub fn resolve(&self, mode: Mode, model_id: &str) -> Result<Route, DetectError> {
        let key = Self::model_key(mode, model_id)?;

        match (self.registry.get(key), mode) {
            (Some(detector), _) => {
                debug!("Routing {} request to {} model", mode.as_str(), key);
                Ok(Route::Model { key, detector })
            }
            (None, Mode::Space) => {
                warn!("{} model not available, using mock data", key);
                Ok(Route::Mock { key })
            }
            (None, Mode::Waste) => Err(DetectError::ModelUnavailable {
                model: key,
                path: self
                    .registry
                    .path(key)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;
    use detection_core::RawDetection;
    use image::DynamicImage;
    use inference_engine::{InferenceError, ModelPaths};

    struct NullDetector;

    impl Detector for NullDetector {
        fn infer(&self, _: &DynamicImage, _: f32) -> Result<Vec<RawDetection>, InferenceError> {
            Ok(Vec::new())
        }

        fn names(&self) -> &[String] {
            &[]
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    fn router_with(keys: &[ModelKey]) -> ModelRouter {
        let detectors = keys
            .iter()
            .map(|&key| (key, Arc::new(NullDetector) as Arc<dyn Detector>));
        ModelRouter::new(Arc::new(ModelRegistry::with_detectors(
            &ModelPaths::default(),
            detectors,
        )))
    }

    #[test]
    fn test_model_ids() {
        assert_eq!(ModelRouter::model_key(Mode::Waste, "yolo").unwrap(), ModelKey::Waste);
        assert_eq!(ModelRouter::model_key(Mode::Waste, "best2").unwrap(), ModelKey::Drone);
        assert_eq!(
            ModelRouter::model_key(Mode::Space, "space-anomalies").unwrap(),
            ModelKey::SpaceAnomaly
        );
        assert_eq!(
            ModelRouter::model_ids(Mode::Space).collect::<Vec<_>>(),
            vec!["space-objects", "space-anomalies"]
        );
    }

    #[test]
    fn test_model_id_in_wrong_mode() {
        let err = ModelRouter::model_key(Mode::Space, "yolo").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Client);
        assert!(err.to_string().contains("Unknown space model"));
    }

    #[test]
    fn test_loaded_model() {
        let router = router_with(&[ModelKey::Drone]);
        assert!(matches!(
            router.resolve(Mode::Waste, "best2"),
            Ok(Route::Model {
                key: ModelKey::Drone,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_waste_model_is_server_error() {
        let router = router_with(&[]);
        let err = router.resolve(Mode::Waste, "yolo").err().unwrap();
        assert_eq!(err.class(), ErrorClass::Server);
        assert!(err.to_string().contains("best.onnx"));
    }

    #[test]
    fn test_missing_space_model_falls_back_to_mock() {
        let router = router_with(&[ModelKey::Waste]);
        assert!(matches!(
            router.resolve(Mode::Space, "space-objects"),
            Ok(Route::Mock {
                key: ModelKey::Space
            })
        ));
    }
}
