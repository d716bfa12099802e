//! HTTP error responses.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use captioner_core::PipelineError;
use serde_json::json;

/// An error rendered as `{"error": "<message>"}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::EmptyUpload { .. } => StatusCode::BAD_REQUEST,
            PipelineError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PipelineError::Decode { .. } | PipelineError::ImageTooLarge { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Model { .. }
            | PipelineError::Vocabulary { .. }
            | PipelineError::Extract { .. }
            | PipelineError::Predict { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// Body-limit overruns surface here with 413.
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_status_codes() {
        let cases = [
            (
                PipelineError::EmptyUpload {
                    name: "a.jpg".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::FileTooLarge {
                    name: "a.jpg".into(),
                    size_mb: 30,
                    max_mb: 20,
                },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                PipelineError::UnsupportedFormat {
                    name: "a.pdf".into(),
                    format: "pdf".into(),
                },
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                PipelineError::Decode {
                    name: "a.png".into(),
                    message: "truncated".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PipelineError::ImageTooLarge {
                    name: "a.png".into(),
                    width: 20000,
                    height: 10,
                    max_dim: 10000,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PipelineError::Timeout {
                    name: "a.png".into(),
                    stage: "caption".into(),
                    timeout_ms: 30000,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                PipelineError::Predict {
                    message: "session failed".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
