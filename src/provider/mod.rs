//! Chat-completion providers used to turn a detection table into advice.
//!
//! Models form a closed set; each one belongs to exactly one [`Provider`],
//! which knows the credential it needs and how to build a backend for it.

mod gemini;
mod openai;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Google",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatModel {
    Gpt4,
    Gpt35Turbo,
    #[default]
    GeminiPro,
}

impl ChatModel {
    pub const ALL: [ChatModel; 3] = [ChatModel::Gpt4, ChatModel::Gpt35Turbo, ChatModel::GeminiPro];

    pub fn id(&self) -> &'static str {
        match self {
            ChatModel::Gpt4 => "gpt-4",
            ChatModel::Gpt35Turbo => "gpt-3.5-turbo",
            ChatModel::GeminiPro => "gemini-pro",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ChatModel::Gpt4 | ChatModel::Gpt35Turbo => Provider::OpenAi,
            ChatModel::GeminiPro => Provider::Gemini,
        }
    }

    pub fn supported_ids() -> Vec<&'static str> {
        Self::ALL.iter().map(|model| model.id()).collect()
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported model '{0}'")]
pub struct UnknownModel(pub String);

impl FromStr for ChatModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatModel::ALL
            .into_iter()
            .find(|model| model.id() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// A two-turn conversation: persona instruction, then the user's request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Text content as returned by a provider, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseContent {
    PlainText(String),
    FragmentList(Vec<String>),
}

impl ResponseContent {
    pub fn into_text(self) -> String {
        match self {
            ResponseContent::PlainText(text) => text,
            ResponseContent::FragmentList(fragments) => fragments.concat(),
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, model: ChatModel, prompt: &Prompt) -> Result<ResponseContent>;
}

/// Builds a backend for a provider once its credential has been resolved.
pub trait ChatConnector: Send + Sync {
    fn connect(&self, provider: Provider, api_key: String) -> Arc<dyn ChatBackend>;
}

/// Connects to the real provider APIs over HTTP.
#[derive(Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    openai_base_url: String,
    gemini_base_url: String,
}

impl HttpConnector {
    pub fn new(http: reqwest::Client, openai_base_url: String, gemini_base_url: String) -> Self {
        Self {
            http,
            openai_base_url,
            gemini_base_url,
        }
    }
}

impl ChatConnector for HttpConnector {
    fn connect(&self, provider: Provider, api_key: String) -> Arc<dyn ChatBackend> {
        match provider {
            Provider::OpenAi => Arc::new(OpenAiBackend::new(
                self.http.clone(),
                &self.openai_base_url,
                api_key,
            )),
            Provider::Gemini => Arc::new(GeminiBackend::new(
                self.http.clone(),
                &self.gemini_base_url,
                api_key,
            )),
        }
    }
}

/// Where provider API keys are looked up, once per request.
pub trait CredentialSource: Send + Sync {
    fn get(&self, var: &str) -> Option<String>;
}

/// Reads keys from the process environment; empty values count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn get(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|value| !value.trim().is_empty())
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, var: &str) -> Option<String> {
        HashMap::get(self, var)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
