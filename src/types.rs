use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One object predicted by the inference server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f64,
    #[serde(rename = "class")]
    pub class_id: i64,
    pub class_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Body returned by the inference server's `/detect` route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub success: bool,
    pub image_size: ImageSize,
    pub detections_count: usize,
    pub detections: Vec<Detection>,
    pub model_info: ModelInfo,
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub detections: Vec<Detection>,
    pub detections_count: usize,
    pub image_size: ImageSize,
    pub model: String,
}

/// One formatted row of the detection table sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSummaryItem {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: String,
    pub location: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total_detections: usize,
    pub detections: Vec<DetectionSummaryItem>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub analysis: String,
    pub detection_summary: DetectionSummary,
    pub model_used: String,
}

/// Coarse bucket derived from the detection count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Severity::None,
            1..=5 => Severity::Mild,
            6..=15 => Severity::Moderate,
            _ => Severity::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    /// Label shown to the user next to the detection count.
    pub fn thai_label(&self) -> &'static str {
        match self {
            Severity::None => "ไม่พบสิว",
            Severity::Mild => "เล็กน้อย",
            Severity::Moderate => "ปานกลาง",
            Severity::Severe => "มาก",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_buckets() {
        assert_eq!(Severity::from_count(0), Severity::None);
        for count in 1..=5 {
            assert_eq!(Severity::from_count(count), Severity::Mild);
        }
        for count in 6..=15 {
            assert_eq!(Severity::from_count(count), Severity::Moderate);
        }
        assert_eq!(Severity::from_count(16), Severity::Severe);
        assert_eq!(Severity::from_count(500), Severity::Severe);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
        assert_eq!(Severity::Severe.as_str(), "severe");
    }

    #[test]
    fn detection_uses_wire_field_names() {
        let json = serde_json::json!({
            "bbox": {"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0},
            "confidence": 0.5,
            "class": 0,
            "class_name": "acne"
        });
        let detection: Detection = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(detection.class_id, 0);
        assert_eq!(serde_json::to_value(&detection).unwrap(), json);
    }
}
