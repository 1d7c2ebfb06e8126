//! Completion-service client over the OpenAI-compatible chat-completions API

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::NarrativeError;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one single-turn prompt and returns the model's reply
pub trait CompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, NarrativeError>;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub api_key: String,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.4,
            timeout: DEFAULT_TIMEOUT,
            api_key: api_key.into(),
        }
    }

    /// Defaults plus the API key read from `env_var`
    pub fn from_env(env_var: &str) -> Result<Self, NarrativeError> {
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(NarrativeError::MissingApiKey {
                env_var: env_var.to_string(),
            }),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug)]
pub struct ChatCompletionsClient {
    config: LlmConfig,
    http: reqwest::Client,
    /// Used only when the caller is outside any Tokio runtime. Pooled
    /// connections stay bound to the runtime that opened them, so every
    /// call goes through the same one.
    runtime: OnceLock<Runtime>,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig) -> Result<Self, NarrativeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NarrativeError::Client(e.to_string()))?;
        Ok(Self {
            config,
            http,
            runtime: OnceLock::new(),
        })
    }

    fn runtime(&self) -> Result<&Runtime, NarrativeError> {
        if let Some(rt) = self.runtime.get() {
            return Ok(rt);
        }
        let rt = Runtime::new()
            .map_err(|e| NarrativeError::Client(format!("create tokio runtime: {e}")))?;
        Ok(self.runtime.get_or_init(|| rt))
    }

    async fn complete_async(&self, prompt: &str) -> Result<String, NarrativeError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

        let body = Req {
            model: &self.config.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending completion request");
        let resp = self
            .http
            .post(self.config.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| NarrativeError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(NarrativeError::from_status(status.as_u16(), txt));
        }

        let txt = resp
            .text()
            .await
            .map_err(|e| NarrativeError::Network(e.to_string()))?;
        parse_completion(&txt)
    }
}

impl CompletionClient for ChatCompletionsClient {
    fn complete(&self, prompt: &str) -> Result<String, NarrativeError> {
        // Callers may already be inside a runtime; nesting block_on there panics.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete_async(prompt)))
        } else {
            self.runtime()?.block_on(self.complete_async(prompt))
        }
    }
}

/// Pull the first choice's message text out of a chat-completions body
pub fn parse_completion(body: &str) -> Result<String, NarrativeError> {
    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let out: Resp =
        serde_json::from_str(body).map_err(|e| NarrativeError::Parse(e.to_string()))?;
    let content = out
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| NarrativeError::Parse("response has no message content".to_string()))?;
    Ok(content.trim().to_string())
}
