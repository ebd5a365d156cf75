use crate::types::{AnalysisResult, DetectionResult};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.25;
pub const MIN_CONFIDENCE_THRESHOLD: f64 = 0.1;
pub const MAX_CONFIDENCE_THRESHOLD: f64 = 0.9;

pub const FILE_NOT_IMAGE: &str = "กรุณาเลือกไฟล์รูปภาพ";
pub const NO_FILE_SELECTED: &str = "กรุณาเลือกรูปภาพก่อน";
pub const DETECTION_IN_PROGRESS: &str = "กำลังตรวจจับอยู่ กรุณารอสักครู่";

/// A photo the user picked, with its inline preview.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    FileSelected(SelectedImage),
    FileRejected,
    ThresholdChanged(f64),
    DetectionStarted,
    DetectionSucceeded(DetectionResult),
    DetectionFinished,
    AnalysisStarted,
    AnalysisSucceeded(AnalysisResult),
    AnalysisFinished,
    Failed(String),
}

/// Where the session is, derived from the flags and result slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Detecting,
    DetectionDone,
    Analyzing,
    AnalysisDone,
    Error,
}

/// Everything the page shows. Each event produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub selected: Option<SelectedImage>,
    pub confidence_threshold: f64,
    pub is_detecting: bool,
    pub is_analyzing: bool,
    pub detection_result: Option<DetectionResult>,
    pub analysis_result: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            is_detecting: false,
            is_analyzing: false,
            detection_result: None,
            analysis_result: None,
            error: None,
        }
    }
}

impl UiState {
    pub fn apply(self, event: UiEvent) -> Self {
        match event {
            // the file input and slider are disabled while detecting
            UiEvent::FileSelected(_) | UiEvent::FileRejected | UiEvent::ThresholdChanged(_)
                if self.is_detecting =>
            {
                self
            }
            UiEvent::FileSelected(image) => Self {
                selected: Some(image),
                error: None,
                detection_result: None,
                analysis_result: None,
                ..self
            },
            UiEvent::FileRejected => Self {
                error: Some(FILE_NOT_IMAGE.to_string()),
                ..self
            },
            UiEvent::ThresholdChanged(value) => Self {
                confidence_threshold: value
                    .clamp(MIN_CONFIDENCE_THRESHOLD, MAX_CONFIDENCE_THRESHOLD),
                ..self
            },
            UiEvent::DetectionStarted => Self {
                is_detecting: true,
                error: None,
                ..self
            },
            UiEvent::DetectionSucceeded(result) => Self {
                detection_result: Some(result),
                ..self
            },
            UiEvent::DetectionFinished => Self {
                is_detecting: false,
                ..self
            },
            UiEvent::AnalysisStarted => Self {
                is_analyzing: true,
                ..self
            },
            UiEvent::AnalysisSucceeded(result) => Self {
                analysis_result: Some(result),
                ..self
            },
            UiEvent::AnalysisFinished => Self {
                is_analyzing: false,
                ..self
            },
            UiEvent::Failed(message) => Self {
                error: Some(message),
                ..self
            },
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_analyzing {
            Phase::Analyzing
        } else if self.is_detecting {
            Phase::Detecting
        } else if self.error.is_some() {
            Phase::Error
        } else if self.analysis_result.is_some() {
            Phase::AnalysisDone
        } else if self.detection_result.is_some() {
            Phase::DetectionDone
        } else if self.selected.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        }
    }

    pub fn can_detect(&self) -> bool {
        self.selected.is_some() && !self.is_detecting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageSize, ModelInfo};

    fn image() -> SelectedImage {
        SelectedImage {
            file_name: "face.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
            preview_url: "data:image/png;base64,AQID".to_string(),
        }
    }

    fn detection() -> DetectionResult {
        DetectionResult {
            success: true,
            image_size: ImageSize { width: 10, height: 10 },
            detections_count: 0,
            detections: vec![],
            model_info: ModelInfo {
                name: "YOLOv7".to_string(),
                version: "v1.0".to_string(),
                classes: vec!["acne".to_string()],
            },
            confidence_threshold: 0.25,
        }
    }

    #[test]
    fn rejected_file_sets_error_only() {
        let state = UiState::default().apply(UiEvent::FileRejected);
        assert_eq!(state.error.as_deref(), Some(FILE_NOT_IMAGE));
        assert!(state.detection_result.is_none());
        assert!(state.analysis_result.is_none());
        assert!(state.selected.is_none());
        assert_eq!(state.phase(), Phase::Error);
    }

    #[test]
    fn selecting_image_clears_previous_session() {
        let state = UiState::default()
            .apply(UiEvent::FileSelected(image()))
            .apply(UiEvent::DetectionSucceeded(detection()))
            .apply(UiEvent::Failed("boom".to_string()))
            .apply(UiEvent::FileSelected(image()));
        assert!(state.error.is_none());
        assert!(state.detection_result.is_none());
        assert!(state.analysis_result.is_none());
        assert_eq!(state.phase(), Phase::FileSelected);
    }

    #[test]
    fn inputs_ignored_while_detecting() {
        let state = UiState::default()
            .apply(UiEvent::FileSelected(image()))
            .apply(UiEvent::DetectionStarted)
            .apply(UiEvent::ThresholdChanged(0.5))
            .apply(UiEvent::FileRejected);
        assert_eq!(state.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
        assert!(state.error.is_none());
        assert_eq!(state.phase(), Phase::Detecting);
        assert!(!state.can_detect());
    }

    #[test]
    fn threshold_is_clamped_to_slider_range() {
        let state = UiState::default().apply(UiEvent::ThresholdChanged(0.02));
        assert_eq!(state.confidence_threshold, MIN_CONFIDENCE_THRESHOLD);
        let state = state.apply(UiEvent::ThresholdChanged(0.45));
        assert_eq!(state.confidence_threshold, 0.45);
    }

    #[test]
    fn phases_follow_flags() {
        let state = UiState::default();
        assert_eq!(state.phase(), Phase::Idle);
        let state = state
            .apply(UiEvent::FileSelected(image()))
            .apply(UiEvent::DetectionStarted)
            .apply(UiEvent::DetectionSucceeded(detection()));
        assert_eq!(state.phase(), Phase::Detecting);
        let state = state.apply(UiEvent::AnalysisStarted);
        assert_eq!(state.phase(), Phase::Analyzing);
        let state = state
            .apply(UiEvent::AnalysisFinished)
            .apply(UiEvent::DetectionFinished);
        assert_eq!(state.phase(), Phase::DetectionDone);
    }
}
