//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use api::{create_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use detection_core::RawDetection;
use image::{DynamicImage, ImageFormat};
use inference_engine::{Detector, InferenceError, ModelKey, ModelPaths, ModelRegistry};
use pipeline::DetectionService;
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "astrovision-test-boundary";

/// Upload limit used by test routers
pub const UPLOAD_LIMIT: usize = 16 * 1024 * 1024;

pub struct BottleDetector;

impl Detector for BottleDetector {
    fn infer(&self, _: &DynamicImage, _: f32) -> Result<Vec<RawDetection>, InferenceError> {
        Ok(vec![RawDetection {
            x1: 10.0,
            y1: 10.0,
            x2: 60.0,
            y2: 60.0,
            confidence: 0.9,
            class_index: 0,
        }])
    }

    fn names(&self) -> &[String] {
        &[]
    }

    fn name(&self) -> &str {
        "bottle"
    }
}

pub struct PanickingDetector;

impl Detector for PanickingDetector {
    fn infer(&self, _: &DynamicImage, _: f32) -> Result<Vec<RawDetection>, InferenceError> {
        panic!("tensor shape exploded");
    }

    fn names(&self) -> &[String] {
        &[]
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

pub fn state_with(detectors: Vec<(ModelKey, Arc<dyn Detector>)>) -> AppState {
    let registry = ModelRegistry::with_detectors(&ModelPaths::default(), detectors);
    AppState::new(DetectionService::new(Arc::new(registry)))
}

pub fn app_with(detectors: Vec<(ModelKey, Arc<dyn Detector>)>) -> Router {
    create_router(Arc::new(state_with(detectors)), UPLOAD_LIMIT)
}

pub fn empty_app() -> Router {
    app_with(Vec::new())
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Multipart form builder for detect requests
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, bytes: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\n",
        );
        self.body
            .extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn request(mut self) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Request::builder()
            .method("POST")
            .uri("/detect")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}
