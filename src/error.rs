use axum::{Json, http::StatusCode, response::IntoResponse};
use axum::extract::multipart::MultipartError;
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum MedError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Inference API returned an empty result")]
    EmptyInference,
}

impl MedError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl IntoResponse for MedError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            MedError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".to_string(),
                    message,
                },
            ),
            // 413 when the upload exceeds the body limit, 400 otherwise
            MedError::Multipart(e) => (
                e.status(),
                ApiErrorBody {
                    code: "BAD_UPLOAD".to_string(),
                    message: e.body_text(),
                },
            ),
            MedError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found."),
                },
            ),
            e @ (MedError::DatabaseError(_) | MedError::Io(_) | MedError::Csv(_)) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred.".to_string(),
                    },
                )
            }
            e @ (MedError::Reqwest(_)
            | MedError::UrlParse(_)
            | MedError::Json(_)
            | MedError::UpstreamStatus(_)
            | MedError::EmptyInference) => {
                error!(error = %e, "upstream failure reached a handler");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorBody {
                        code: "BAD_GATEWAY".to_string(),
                        message: "Upstream service is unavailable.".to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
