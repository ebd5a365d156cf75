use super::{ChatBackend, ChatModel, Prompt, ResponseContent, TEMPERATURE};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Google Generative Language `generateContent` client.
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn extract_parts(result: &serde_json::Value) -> Result<ResponseContent> {
    let parts = result["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("no content parts in Gemini response"))?;

    Ok(ResponseContent::FragmentList(
        parts
            .iter()
            .map(|part| part["text"].as_str().unwrap_or_default().to_string())
            .collect(),
    ))
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn complete(&self, model: ChatModel, prompt: &Prompt) -> Result<ResponseContent> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            model.id()
        );

        let payload = serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": prompt.system }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt.user }]
            }],
            "generationConfig": {
                "temperature": TEMPERATURE
            }
        });

        tracing::debug!(model = %model, "sending request to Google Gemini");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(anyhow!(
                "Gemini error {}: {}",
                status,
                response_text.chars().take(500).collect::<String>()
            ));
        }

        let result: serde_json::Value = serde_json::from_str(&response_text)?;
        extract_parts(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_candidate_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "ล้างหน้า" }, { "text": "วันละสองครั้ง" }]
                }
            }]
        });
        assert_eq!(
            extract_parts(&body).unwrap().into_text(),
            "ล้างหน้าวันละสองครั้ง"
        );
    }

    #[test]
    fn missing_candidates_is_an_error() {
        let body = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(extract_parts(&body).is_err());
    }
}
