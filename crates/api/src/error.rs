//! HTTP error mapping

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pipeline::{DetectError, ErrorClass};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// JSON body of every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short error kind
    pub error: String,
    /// Human readable message
    pub details: String,
}

/// Failure of one HTTP request
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// Malformed or oversized multipart body
    #[error("{0}")]
    Multipart(#[from] MultipartError),

    /// Body is not a multipart form
    #[error("{0}")]
    Rejected(#[from] MultipartRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Detect(e) => match e.class() {
                ErrorClass::Client => StatusCode::BAD_REQUEST,
                ErrorClass::Server => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Multipart(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Detect(e) => ErrorBody {
                error: e.kind().to_string(),
                details: e.to_string(),
            },
            ApiError::Multipart(e) => ErrorBody {
                error: "Invalid input".to_string(),
                details: e.body_text(),
            },
            ApiError::Rejected(e) => ErrorBody {
                error: "Invalid input".to_string(),
                details: e.body_text(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();

        if status.is_server_error() {
            error!("Request failed: {}", body.details);
        } else {
            warn!("Rejected request: {}", body.details);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::ModelKey;

    #[test]
    fn test_status_mapping() {
        let client = ApiError::from(DetectError::invalid("mode", "ocean", "Unknown mode"));
        assert_eq!(client.status(), StatusCode::BAD_REQUEST);
        assert_eq!(client.body().error, "Invalid input");

        let server = ApiError::from(DetectError::ModelUnavailable {
            model: ModelKey::Waste,
            path: "best.onnx".into(),
        });
        assert_eq!(server.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = server.body();
        assert_eq!(body.error, "Model unavailable");
        assert!(body.details.contains("best.onnx"));
    }

    #[tokio::test]
    async fn test_upload_rejections_are_bad_request() {
        use axum::body::Body;
        use axum::extract::{FromRequest, Multipart};
        use axum::http::Request;

        let plain = Request::builder()
            .method("POST")
            .header("content-type", "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let rejection = Multipart::from_request(plain, &()).await.unwrap_err();
        let rejected = ApiError::from(rejection);
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejected.body().error, "Invalid input");

        let truncated = Request::builder()
            .method("POST")
            .header("content-type", "multipart/form-data; boundary=X")
            .body(Body::from("--X\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nabc"))
            .unwrap();
        let mut multipart = Multipart::from_request(truncated, &()).await.unwrap();
        let failure = async {
            while let Some(field) = multipart.next_field().await? {
                field.bytes().await?;
            }
            Ok::<_, MultipartError>(())
        }
        .await
        .unwrap_err();
        let malformed = ApiError::from(failure);
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(malformed.body().error, "Invalid input");
    }
}
