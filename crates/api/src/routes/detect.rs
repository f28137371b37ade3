//! Detection Route

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use detection_core::DetectionResponse;
use pipeline::{DetectError, DetectParams, ErrorClass, DEFAULT_CONFIDENCE_THRESHOLD};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span};
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Raw multipart form of a detect request
#[derive(Debug, Default)]
struct DetectForm {
    file: Option<Bytes>,
    model_id: Option<String>,
    model: Option<String>,
    media_type: Option<String>,
    mode: Option<String>,
    confidence_threshold: Option<String>,
    confidence: Option<String>,
}

impl DetectForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => form.file = Some(field.bytes().await?),
                "model_id" => form.model_id = Some(field.text().await?),
                "model" => form.model = Some(field.text().await?),
                "media_type" => form.media_type = Some(field.text().await?),
                "mode" => form.mode = Some(field.text().await?),
                "confidence_threshold" => form.confidence_threshold = Some(field.text().await?),
                "confidence" => form.confidence = Some(field.text().await?),
                other => debug!("Ignoring form field {:?}", other),
            }
        }

        Ok(form)
    }

    /// Validate parameters, falling back to aliases then defaults
    fn params(&self) -> Result<DetectParams, DetectError> {
        let threshold = DEFAULT_CONFIDENCE_THRESHOLD.to_string();
        DetectParams::parse(
            self.mode.as_deref().unwrap_or("waste"),
            self.model_id
                .as_deref()
                .or(self.model.as_deref())
                .unwrap_or("yolo"),
            self.media_type.as_deref().unwrap_or("image"),
            self.confidence_threshold
                .as_deref()
                .or(self.confidence.as_deref())
                .unwrap_or(&threshold),
        )
    }
}

/// Run detection on an uploaded image or video
pub async fn detect(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let mut form = DetectForm::read(&mut multipart?).await?;
    let params = form.params()?;
    let upload = form
        .file
        .take()
        .ok_or_else(|| DetectError::invalid("file", "", "No file provided"))?;

    let request_id = Uuid::new_v4();
    let span = info_span!(
        "detect",
        %request_id,
        mode = params.mode.as_str(),
        model_id = %params.model_id,
        media_type = params.media_type.as_str()
    );

    let start = Instant::now();
    let service = state.service.clone();
    let task_params = params.clone();
    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| service.detect(&task_params, &upload))
    })
    .await
    .unwrap_or_else(|e| {
        // panic payloads stay in the logs
        error!("Detection task failed: {}", e);
        let reason = if e.is_panic() {
            "Detection task panicked"
        } else {
            "Detection task was cancelled"
        };
        Err(DetectError::InferenceFailure(reason.to_string()))
    });

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => match e.class() {
            ErrorClass::Client => "client_error",
            ErrorClass::Server => "server_error",
        },
    };
    metrics::counter!(
        "astrovision_detect_requests_total",
        "mode" => params.mode.as_str(),
        "media_type" => params.media_type.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "astrovision_detect_duration_seconds",
        "mode" => params.mode.as_str(),
        "media_type" => params.media_type.as_str()
    )
    .record(start.elapsed().as_secs_f64());

    Ok(Json(result?))
}
