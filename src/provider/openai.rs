use super::{ChatBackend, ChatModel, Prompt, ResponseContent, TEMPERATURE};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;

/// OpenAI-compatible `/v1/chat/completions` client.
pub struct OpenAiBackend {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            http,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<Content>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Content {
    Text(String),
    Parts(Vec<Part>),
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl From<Content> for ResponseContent {
    fn from(content: Content) -> Self {
        match content {
            Content::Text(text) => ResponseContent::PlainText(text),
            Content::Parts(parts) => ResponseContent::FragmentList(
                parts.into_iter().map(|part| part.text.unwrap_or_default()).collect(),
            ),
        }
    }
}

fn parse_completion(body: &str) -> Result<ResponseContent> {
    let completion: Completion =
        serde_json::from_str(body).context("malformed chat completion body")?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("chat completion has no choices"))?;
    Ok(choice
        .message
        .content
        .map(ResponseContent::from)
        .unwrap_or(ResponseContent::PlainText(String::new())))
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, model: ChatModel, prompt: &Prompt) -> Result<ResponseContent> {
        let payload = serde_json::json!({
            "model": model.id(),
            "temperature": TEMPERATURE,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ]
        });

        tracing::debug!(url = %self.url, model = %model, "sending chat completion request");

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!(
                "OpenAI error {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            ));
        }

        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"ผิวดีมาก"}}]}"#;
        assert_eq!(
            parse_completion(body).unwrap(),
            ResponseContent::PlainText("ผิวดีมาก".to_string())
        );
    }

    #[test]
    fn parses_part_list_content() {
        let body = r#"{"choices":[{"message":{"content":[
            {"type":"text","text":"a"},
            {"type":"image_url"},
            {"type":"text","text":"b"}
        ]}}]}"#;
        assert_eq!(
            parse_completion(body).unwrap().into_text(),
            "ab"
        );
    }

    #[test]
    fn rejects_empty_choices() {
        assert!(parse_completion(r#"{"choices":[]}"#).is_err());
        assert!(parse_completion("not json").is_err());
    }
}
