//! Relays uploaded photos to the external inference server.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;

/// An image file received from the browser, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct DetectForm {
    file: Option<UploadedImage>,
    confidence_threshold: Option<String>,
}

/// `/detect` on the inference server, with the threshold appended only when given.
pub fn detect_url(base_url: &str, confidence_threshold: Option<&str>) -> String {
    let mut url = format!("{}/detect", base_url.trim_end_matches('/'));
    if let Some(threshold) = confidence_threshold {
        url.push_str("?confidence_threshold=");
        url.push_str(threshold);
    }
    url
}

/// Validates the optional threshold field. Blank counts as absent.
pub fn parse_threshold(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(Some(raw.to_string())),
        _ => Err(ApiError::InvalidThreshold(format!("got '{raw}'"))),
    }
}

/// Pulls the error message out of an inference server failure body.
fn reported_message(body: &Value) -> Option<&str> {
    body.get("detail")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
}

fn upstream_message(body: Option<&Value>) -> String {
    body.and_then(reported_message)
        .unwrap_or("Detection failed")
        .to_string()
}

#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl InferenceClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_connect() {
            ApiError::InferenceUnavailable(self.base_url.clone())
        } else {
            ApiError::DetectionFailed(err.to_string())
        }
    }

    pub async fn detect(
        &self,
        image: UploadedImage,
        confidence_threshold: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = detect_url(&self.base_url, confidence_threshold);
        tracing::info!(%url, bytes = image.bytes.len(), "calling inference server");

        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|_| ApiError::NotAnImage)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            let message = upstream_message(body.as_ref());
            tracing::warn!(status = status.as_u16(), %message, "inference server rejected image");
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::DetectionFailed(err.to_string()))
    }

    /// Forwards a GET and returns the upstream status with its JSON body.
    async fn relay_get(&self, path: &str) -> Result<(u16, Value), reqwest::Error> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await?;
        Ok((status, body))
    }

    pub async fn health(&self) -> Result<(u16, Value), reqwest::Error> {
        self.relay_get("/health").await
    }

    pub async fn info(&self) -> Result<(u16, Value), reqwest::Error> {
        self.relay_get("/info").await
    }
}

/// Keeps the body-limit status instead of flattening every form error to 400.
fn form_error(status: StatusCode, details: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(details)
    } else {
        ApiError::InvalidForm(details)
    }
}

async fn read_form(mut multipart: Multipart) -> Result<DetectForm, ApiError> {
    let mut form = DetectForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e.status(), e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| form_error(e.status(), e.body_text()))?;
                form.file = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("confidence_threshold") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| form_error(e.status(), e.body_text()))?;
                form.confidence_threshold = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/detect-acne
#[tracing::instrument(skip_all)]
pub async fn detect_acne(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let multipart =
        multipart.map_err(|rejection| form_error(rejection.status(), rejection.body_text()))?;
    let form = read_form(multipart).await?;

    let image = form.file.ok_or(ApiError::MissingFile)?;
    if !image.content_type.starts_with("image/") {
        return Err(ApiError::NotAnImage);
    }
    let threshold = parse_threshold(form.confidence_threshold.as_deref())?;

    let result = state.inference.detect(image, threshold.as_deref()).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "detection error");
    }
    result.map(Json)
}

/// GET /api/detect-acne
///
/// 200 with the upstream body when the inference server reports success,
/// otherwise 503 `{status: "unhealthy", error}`.
#[tracing::instrument(skip_all)]
pub async fn health(State(state): State<AppState>) -> Response {
    let error = match state.inference.health().await {
        Ok((status, body)) if (200..300).contains(&status) => {
            return (StatusCode::OK, Json(body)).into_response();
        }
        Ok((status, body)) => {
            tracing::warn!(status, "inference server reported unhealthy");
            reported_message(&body)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Inference server returned status {status}"))
        }
        Err(err) => {
            tracing::warn!(error = %err, "inference server health check failed");
            "Cannot connect to inference server".to_string()
        }
    };
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unhealthy", "error": error })),
    )
        .into_response()
}

/// GET /api/detect-acne/info
#[tracing::instrument(skip_all)]
pub async fn model_info(State(state): State<AppState>) -> Response {
    match state.inference.info().await {
        Ok((status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            Json(body),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "inference server info request failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Cannot connect to inference server" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_only_appended_when_supplied() {
        assert_eq!(
            detect_url("http://localhost:8000", Some("0.3")),
            "http://localhost:8000/detect?confidence_threshold=0.3"
        );
        assert_eq!(
            detect_url("http://localhost:8000/", None),
            "http://localhost:8000/detect"
        );
    }

    #[test]
    fn threshold_parsing() {
        assert_eq!(parse_threshold(None).unwrap(), None);
        assert_eq!(parse_threshold(Some("")).unwrap(), None);
        assert_eq!(parse_threshold(Some("  ")).unwrap(), None);
        assert_eq!(parse_threshold(Some("0.3")).unwrap().as_deref(), Some("0.3"));
        assert_eq!(parse_threshold(Some(" 1 ")).unwrap().as_deref(), Some("1"));
        assert!(parse_threshold(Some("high")).is_err());
        assert!(parse_threshold(Some("1.5")).is_err());
        assert!(parse_threshold(Some("NaN")).is_err());
    }

    #[test]
    fn body_limit_errors_keep_their_status() {
        let err = form_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let err = form_error(StatusCode::BAD_REQUEST, "malformed".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid form data");
    }

    #[test]
    fn upstream_message_prefers_detail() {
        let body = json!({ "detail": "File must be an image" });
        assert_eq!(upstream_message(Some(&body)), "File must be an image");

        let body = json!({ "error": "model not loaded" });
        assert_eq!(upstream_message(Some(&body)), "model not loaded");

        let body = json!({ "detail": [{ "loc": ["query"], "msg": "bad" }] });
        assert_eq!(upstream_message(Some(&body)), "Detection failed");
        assert_eq!(upstream_message(None), "Detection failed");
    }
}
