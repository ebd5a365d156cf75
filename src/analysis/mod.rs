//! Turns detection results into a written skincare recommendation.

pub mod prompt;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::provider::ChatModel;
use crate::types::{
    AnalysisResult, Detection, DetectionSummary, DetectionSummaryItem, ImageSize, Severity,
};

/// A request body that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub detections: Vec<Detection>,
    pub detections_count: usize,
    pub image_size: ImageSize,
    pub model: ChatModel,
}

pub fn validate(body: Value) -> Result<ValidatedRequest, ApiError> {
    let detections = match body.get("detections") {
        Some(value @ Value::Array(_)) => value.clone(),
        _ => return Err(ApiError::InvalidDetections(None)),
    };
    let detections: Vec<Detection> = serde_json::from_value(detections)
        .map_err(|e| ApiError::InvalidDetections(Some(e.to_string())))?;

    let detections_count = match body.get("detections_count") {
        None | Some(Value::Null) => detections.len(),
        Some(value) => value.as_u64().map(|count| count as usize).ok_or_else(|| {
            ApiError::InvalidDetections(Some(
                "detections_count must be a non-negative integer".to_string(),
            ))
        })?,
    };

    let image_size = body
        .get("image_size")
        .cloned()
        .ok_or_else(|| ApiError::InvalidDetections(Some("image_size is required".to_string())))
        .and_then(|value| {
            serde_json::from_value::<ImageSize>(value)
                .map_err(|e| ApiError::InvalidDetections(Some(e.to_string())))
        })?;

    let model = match body.get("model").and_then(Value::as_str) {
        Some(model) => model
            .parse()
            .map_err(|_| ApiError::UnsupportedModel(model.to_string()))?,
        None => ChatModel::default(),
    };

    Ok(ValidatedRequest {
        detections,
        detections_count,
        image_size,
        model,
    })
}

fn pixels(value: f64) -> i64 {
    value.round() as i64
}

/// Formats each detection as a 1-based table row.
pub fn summarize(detections: &[Detection]) -> Vec<DetectionSummaryItem> {
    detections
        .iter()
        .enumerate()
        .map(|(idx, det)| DetectionSummaryItem {
            id: idx + 1,
            kind: det.class_name.clone(),
            confidence: format!("{:.1}%", det.confidence * 100.0),
            location: format!("({}, {})", pixels(det.bbox.x), pixels(det.bbox.y)),
            size: format!("{}x{}px", pixels(det.bbox.width), pixels(det.bbox.height)),
        })
        .collect()
}

/// POST /api/analyze-acne
#[tracing::instrument(skip_all)]
pub async fn analyze_acne(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(body) =
        body.map_err(|rejection| ApiError::InvalidDetections(Some(rejection.body_text())))?;
    let request = validate(body)?;

    let provider = request.model.provider();
    let api_key = state
        .credentials
        .get(provider.credential_env())
        .ok_or_else(|| {
            tracing::error!(env = provider.credential_env(), "provider API key missing");
            ApiError::MissingCredential(provider)
        })?;

    let rows = summarize(&request.detections);
    let prompt = prompt::build_prompt(request.image_size, request.detections_count, &rows);

    tracing::info!(
        model = %request.model,
        detections = request.detections_count,
        "generating analysis"
    );

    let backend = state.chat.connect(provider, api_key);
    let content = backend
        .complete(request.model, &prompt)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "analysis error");
            ApiError::AnalysisFailed
        })?;

    Ok(Json(AnalysisResult {
        success: true,
        analysis: content.into_text(),
        detection_summary: DetectionSummary {
            total_detections: request.detections_count,
            detections: rows,
            severity: Severity::from_count(request.detections_count),
        },
        model_used: request.model.id().to_string(),
    }))
}

/// GET /api/analyze-acne
pub async fn describe() -> Json<Value> {
    Json(json!({
        "message": "Acne Analysis API",
        "endpoints": {
            "POST": "/api/analyze-acne",
            "description": "Analyze acne detection results with LLM"
        },
        "supported_models": ChatModel::supported_ids()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn comedone() -> Detection {
        Detection {
            bbox: BoundingBox {
                x: 12.4,
                y: 8.9,
                width: 30.2,
                height: 25.7,
            },
            confidence: 0.876,
            class_id: 1,
            class_name: "comedone".to_string(),
        }
    }

    #[test]
    fn summary_row_formatting() {
        let rows = summarize(&[comedone()]);
        assert_eq!(
            rows,
            vec![DetectionSummaryItem {
                id: 1,
                kind: "comedone".to_string(),
                confidence: "87.6%".to_string(),
                location: "(12, 9)".to_string(),
                size: "30x26px".to_string(),
            }]
        );
    }

    #[test]
    fn pixel_rounding_goes_half_up() {
        assert_eq!(pixels(2.5), 3);
        assert_eq!(pixels(0.49), 0);
        assert_eq!(pixels(-0.2), 0);
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let rows = summarize(&[comedone(), comedone(), comedone()]);
        let ids: Vec<_> = rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn validate_defaults_model_and_count() {
        let request = validate(json!({
            "detections": [],
            "image_size": { "width": 640, "height": 480 }
        }))
        .unwrap();
        assert_eq!(request.model, ChatModel::GeminiPro);
        assert_eq!(request.detections_count, 0);
    }

    #[test]
    fn malformed_detections_count_is_rejected() {
        for count in [json!("3"), json!(-1), json!(2.5), json!(true)] {
            let result = validate(json!({
                "detections": [],
                "detections_count": count,
                "image_size": { "width": 640, "height": 480 }
            }));
            assert!(
                matches!(result, Err(ApiError::InvalidDetections(Some(_)))),
                "accepted detections_count {count}"
            );
        }
    }

    #[test]
    fn explicit_detections_count_wins_over_list_length() {
        let request = validate(json!({
            "detections": [],
            "detections_count": 7,
            "image_size": { "width": 640, "height": 480 }
        }))
        .unwrap();
        assert_eq!(request.detections_count, 7);

        let request = validate(json!({
            "detections": [],
            "detections_count": null,
            "image_size": { "width": 640, "height": 480 }
        }))
        .unwrap();
        assert_eq!(request.detections_count, 0);
    }

    #[test]
    fn validate_keeps_requested_model() {
        let request = validate(json!({
            "detections": [],
            "detections_count": 0,
            "image_size": { "width": 1, "height": 1 },
            "model": "gpt-3.5-turbo"
        }))
        .unwrap();
        assert_eq!(request.model, ChatModel::Gpt35Turbo);
    }

    #[test]
    fn validate_rejects_bad_payloads() {
        assert!(matches!(
            validate(json!({ "image_size": { "width": 1, "height": 1 } })),
            Err(ApiError::InvalidDetections(None))
        ));
        assert!(matches!(
            validate(json!({ "detections": "many", "image_size": { "width": 1, "height": 1 } })),
            Err(ApiError::InvalidDetections(None))
        ));
        assert!(matches!(
            validate(json!({ "detections": [], "image_size": { "width": 1, "height": 1 }, "model": "claude" })),
            Err(ApiError::UnsupportedModel(model)) if model == "claude"
        ));
    }
}
