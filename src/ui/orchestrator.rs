use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use image::ImageFormat;
use std::path::Path;

use super::state::{DETECTION_IN_PROGRESS, NO_FILE_SELECTED, SelectedImage, UiEvent, UiState};
use crate::provider::ChatModel;
use crate::types::{AnalysisRequest, AnalysisResult, DetectionResult};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("การตรวจจับล้มเหลว")]
    DetectionRejected { status: u16, message: Option<String> },

    #[error("การวิเคราะห์ล้มเหลว")]
    AnalysisRejected { status: u16, message: Option<String> },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// The two server routes the page drives.
#[async_trait]
pub trait AcneApi: Send + Sync {
    async fn detect(
        &self,
        image: &SelectedImage,
        confidence_threshold: f64,
    ) -> Result<DetectionResult, ClientError>;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError>;
}

/// Talks to a running `acne-scan serve` instance.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

async fn error_message(response: reqwest::Response) -> Option<String> {
    let body = response.json::<serde_json::Value>().await.ok()?;
    body["error"].as_str().map(str::to_string)
}

#[async_trait]
impl AcneApi for HttpApi {
    async fn detect(
        &self,
        image: &SelectedImage,
        confidence_threshold: f64,
    ) -> Result<DetectionResult, ClientError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("confidence_threshold", confidence_threshold.to_string());

        let response = self
            .http
            .post(format!("{}/api/detect-acne", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::DetectionRejected {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }
        Ok(response.json().await?)
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/analyze-acne", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::AnalysisRejected {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }
        Ok(response.json().await?)
    }
}

/// MIME type from the file's magic bytes, for formats the detector reads.
pub fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    let mime = match image::guess_format(bytes).ok()? {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}

/// Drives detection then analysis, one state transition at a time.
pub struct Orchestrator<A> {
    api: A,
    model: ChatModel,
    state: UiState,
}

impl<A: AcneApi> Orchestrator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            model: ChatModel::default(),
            state: UiState::default(),
        }
    }

    pub fn with_model(mut self, model: ChatModel) -> Self {
        self.model = model;
        self
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    fn dispatch(&mut self, event: UiEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
    }

    /// Returns whether the file was accepted as an image.
    pub fn select_file(&mut self, file_name: &str, bytes: Vec<u8>) -> bool {
        let Some(content_type) = sniff_image_type(&bytes) else {
            tracing::debug!(file_name, "rejected non-image file");
            self.dispatch(UiEvent::FileRejected);
            return false;
        };

        let preview_url = format!(
            "data:{};base64,{}",
            content_type,
            general_purpose::STANDARD.encode(&bytes)
        );
        self.dispatch(UiEvent::FileSelected(SelectedImage {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
            preview_url,
        }));
        true
    }

    pub async fn select_path(&mut self, path: &Path) -> Result<bool, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(self.select_file(&file_name, bytes))
    }

    pub fn set_confidence_threshold(&mut self, value: f64) {
        self.dispatch(UiEvent::ThresholdChanged(value));
    }

    /// Detect, then analyze the fresh result. Errors land in the state.
    ///
    /// Returns whether the detection request was sent.
    pub async fn detect(&mut self) -> bool {
        let Some(image) = self.state.selected.clone() else {
            self.dispatch(UiEvent::Failed(NO_FILE_SELECTED.to_string()));
            return false;
        };
        if self.state.is_detecting {
            self.dispatch(UiEvent::Failed(DETECTION_IN_PROGRESS.to_string()));
            return false;
        }

        let model = self.model;
        let threshold = self.state.confidence_threshold;
        let api = &self.api;
        let mut flight = InFlight::start(&mut self.state);

        match api.detect(&image, threshold).await {
            Ok(result) => {
                flight.dispatch(UiEvent::DetectionSucceeded(result.clone()));
                flight.dispatch(UiEvent::AnalysisStarted);
                match api.analyze(&analysis_request(&result, model)).await {
                    Ok(analysis) => flight.dispatch(UiEvent::AnalysisSucceeded(analysis)),
                    Err(err) => {
                        tracing::warn!(error = ?err, "analysis request failed");
                        flight.dispatch(UiEvent::Failed(err.to_string()));
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = ?err, "detection request failed");
                flight.dispatch(UiEvent::Failed(err.to_string()));
            }
        }
        true
    }
}

fn analysis_request(result: &DetectionResult, model: ChatModel) -> AnalysisRequest {
    AnalysisRequest {
        detections: result.detections.clone(),
        detections_count: result.detections_count,
        image_size: result.image_size,
        model: model.id().to_string(),
    }
}

/// Holds the session while requests are outstanding. Both loading flags
/// are cleared on drop, including when the `detect` future is dropped.
struct InFlight<'a> {
    state: &'a mut UiState,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a mut UiState) -> Self {
        let mut flight = Self { state };
        flight.dispatch(UiEvent::DetectionStarted);
        flight
    }

    fn dispatch(&mut self, event: UiEvent) {
        let state = std::mem::take(&mut *self.state);
        *self.state = state.apply(event);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.dispatch(UiEvent::AnalysisFinished);
        self.dispatch(UiEvent::DetectionFinished);
    }
}
