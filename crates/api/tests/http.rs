//! In-process HTTP tests against the axum router

mod common;

use api::{create_router, ErrorBody};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    app_with, empty_app, png, send, send_json, state_with, BottleDetector, Form, PanickingDetector,
};
use inference_engine::{Detector, ModelKey};
use std::sync::Arc;

fn health_request() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_is_idempotent() {
    let app = app_with(vec![(ModelKey::Drone, Arc::new(BottleDetector) as Arc<dyn Detector>)]);

    let (status, first) = send_json(app.clone(), health_request()).await;
    let (_, second) = send_json(app, health_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["status"], "ok");

    let models = first["models"].as_object().unwrap();
    assert_eq!(models.len(), 4);
    assert_eq!(models["drone"]["loaded"], true);
    assert_eq!(models["waste"]["loaded"], false);
    assert_eq!(models["space_anomaly"]["path"], "anomaly.onnx");
}

#[tokio::test]
async fn test_waste_without_model_is_server_error() {
    let image = png(200, 200);
    let (status, body) = send_json(
        empty_app(),
        Form::new().file(&image).text("mode", "waste").request(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(body.error, "Model unavailable");
    assert!(body.details.contains("best.onnx"));
}

#[tokio::test]
async fn test_waste_image_with_model() {
    let app = app_with(vec![(ModelKey::Waste, Arc::new(BottleDetector) as Arc<dyn Detector>)]);
    let image = png(100, 100);
    let (status, body) = send_json(app, Form::new().file(&image).request()).await;

    assert_eq!(status, StatusCode::OK);
    let detection = &body["detections"][0];
    assert_eq!(detection["box"], serde_json::json!([10.0, 10.0, 50.0, 50.0]));
    assert_eq!(detection["class_name"], "class_0");
    assert!(detection.get("biodegradable").is_none());
    assert_eq!(body["class_counts"]["class_0"], 1);
    assert!((body["waste_density"].as_f64().unwrap() - 25.0).abs() < 1e-6);
    assert!(body.get("frame_count").is_none());
    assert!(body["processing_time"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_space_mock_image() {
    let image = png(640, 480);
    let (status, body) = send_json(
        empty_app(),
        Form::new()
            .file(&image)
            .text("mode", "space")
            .text("model_id", "space-objects")
            .request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let detections = body["detections"].as_array().unwrap();
    assert!((3..=7).contains(&detections.len()));
    for detection in detections {
        let confidence = detection["confidence"].as_f64().unwrap();
        assert!((0.6..0.98).contains(&confidence));
        assert!(detection.get("biodegradable").is_none());
    }
    assert!(body.get("waste_density").is_none());

    let total: u64 = body["class_counts"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total as usize, detections.len());
}

#[tokio::test]
async fn test_space_mock_video_is_rejected() {
    let (status, body) = send_json(
        empty_app(),
        Form::new()
            .file(b"GIF89a")
            .text("mode", "space")
            .text("model_id", "space-anomalies")
            .text("media_type", "video")
            .request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
}

#[tokio::test]
async fn test_invalid_parameters() {
    let image = png(50, 50);
    let cases = [
        ("mode", "ocean"),
        ("media_type", "audio"),
        ("confidence_threshold", "1.5"),
        ("confidence_threshold", "NaN"),
        ("model_id", "space-objects"),
    ];

    for (name, value) in cases {
        let request = Form::new().file(&image).text(name, value).request();
        let (status, body) = send_json(empty_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input");
    }
}

#[tokio::test]
async fn test_missing_file() {
    let (status, body) = send_json(empty_app(), Form::new().text("mode", "waste").request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_str().unwrap().contains("No file provided"));
}

#[tokio::test]
async fn test_aliases_and_extra_fields() {
    let app = app_with(vec![(ModelKey::Drone, Arc::new(BottleDetector) as Arc<dyn Detector>)]);
    let image = png(100, 100);
    let (status, body) = send_json(
        app,
        Form::new()
            .file(&image)
            .text("model", "best2")
            .text("confidence", "0.5")
            .text("camera", "north-gate")
            .request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detections"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_detector_panic_is_server_error() {
    let app = app_with(vec![(ModelKey::Waste, Arc::new(PanickingDetector) as Arc<dyn Detector>)]);
    let image = png(100, 100);
    let (status, body) = send_json(app, Form::new().file(&image).request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Inference failed");
    assert!(!body["details"].as_str().unwrap().contains("tensor shape exploded"));
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, _) = send(empty_app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/detect")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"mode":"waste"}"#))
        .unwrap();
    let (status, body) = send_json(empty_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(body.error, "Invalid input");
}

#[tokio::test]
async fn test_oversized_upload_is_bad_request() {
    let app = create_router(Arc::new(state_with(Vec::new())), 1024);
    let image = vec![0u8; 8 * 1024];
    let (status, body) = send_json(app, Form::new().file(&image).request()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
}
