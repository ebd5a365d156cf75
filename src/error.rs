use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::provider::Provider;

/// Shown with a 503 when the inference server cannot be reached.
pub const INFERENCE_REMEDIATION_HINT: &str = "Run: python3 inference_server_mock.py";

/// Failure body shared by every route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File must be an image")]
    NotAnImage,

    #[error("Invalid form data")]
    InvalidForm(String),

    #[error("File too large")]
    PayloadTooLarge(String),

    #[error("confidence_threshold must be a number between 0 and 1")]
    InvalidThreshold(String),

    #[error("Invalid detection data")]
    InvalidDetections(Option<String>),

    #[error("Unsupported model '{0}'")]
    UnsupportedModel(String),

    #[error("{} API key not configured", .0.name())]
    MissingCredential(Provider),

    #[error("Cannot connect to inference server at {0}. Please make sure the server is running.")]
    InferenceUnavailable(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to process image")]
    DetectionFailed(String),

    #[error("Failed to analyze detection results")]
    AnalysisFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::NotAnImage
            | ApiError::InvalidForm(_)
            | ApiError::InvalidThreshold(_)
            | ApiError::InvalidDetections(_)
            | ApiError::UnsupportedModel(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InferenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::MissingCredential(_)
            | ApiError::DetectionFailed(_)
            | ApiError::AnalysisFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::InvalidForm(details)
            | ApiError::PayloadTooLarge(details)
            | ApiError::InvalidThreshold(details)
            | ApiError::DetectionFailed(details) => Some(details.clone()),
            ApiError::InvalidDetections(details) => details.clone(),
            ApiError::UnsupportedModel(_) => Some(format!(
                "Supported models: {}",
                crate::provider::ChatModel::supported_ids().join(", ")
            )),
            ApiError::InferenceUnavailable(_) => Some(INFERENCE_REMEDIATION_HINT.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotAnImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MissingCredential(Provider::OpenAi).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::InferenceUnavailable("http://localhost:8000".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Upstream { status: 422, message: "bad".into() }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::PayloadTooLarge("length limit exceeded".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn credential_message_names_provider() {
        assert_eq!(
            ApiError::MissingCredential(Provider::OpenAi).to_string(),
            "OpenAI API key not configured"
        );
        assert_eq!(
            ApiError::MissingCredential(Provider::Gemini).to_string(),
            "Google API key not configured"
        );
    }

    #[test]
    fn unavailable_carries_hint() {
        let err = ApiError::InferenceUnavailable("http://localhost:8000".into());
        assert_eq!(err.details().as_deref(), Some(INFERENCE_REMEDIATION_HINT));
    }
}
