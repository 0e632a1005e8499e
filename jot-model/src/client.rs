use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio::runtime::RuntimeFlavor;

use crate::error::{sanitize_error_body, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-3-5-haiku-latest",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => f.write_str("anthropic"),
            Provider::OpenAI => f.write_str("openai"),
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAI),
            other => anyhow::bail!("unknown provider: {other} (expected openai or anthropic)"),
        }
    }
}

/// Everything needed to reach the completion service. Built once at startup.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key: None,
            temperature: 0.1,
            max_tokens: 500,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// One system + user completion round trip.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String, ModelError>;
}

/// HTTP client for OpenAI-compatible chat completions and Anthropic messages.
pub struct HttpCompletionClient {
    config: ModelConfig,
    api_key: String,
    http: reqwest::Client,
}

impl HttpCompletionClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return Err(ModelError::MissingCredential(config.provider)),
        };
        // no idle pooling: each blocking call may run on a fresh runtime
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { config, api_key, http })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn complete_async(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let text = match self.config.provider {
            Provider::Anthropic => self.anthropic_complete(system, user).await?,
            Provider::OpenAI => self.openai_complete(system, user).await?,
        };
        if text.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }

    async fn anthropic_complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system,
            messages: vec![Msg { role: "user", content: user }],
        };

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| ModelError::MissingCredential(Provider::Anthropic))?;
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(self.endpoint("/v1/messages"))
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let text = check_status(resp).await?;
        let out: Resp =
            serde_json::from_str(&text).map_err(|e| ModelError::Malformed(e.to_string()))?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }

    async fn openai_complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
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
            max_tokens: u32,
        }

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

        let body = Req {
            model: &self.config.model,
            messages: vec![
                Msg { role: "system", content: system },
                Msg { role: "user", content: user },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let resp = self
            .http
            .post(self.endpoint("/v1/chat/completions"))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let text = check_status(resp).await?;
        let out: Resp =
            serde_json::from_str(&text).map_err(|e| ModelError::Malformed(e.to_string()))?;
        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        // Callers may already be inside a tokio runtime (the CLI is
        // #[tokio::main]); nesting block_on there would panic.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.complete_async(system, user)))
            }
            Ok(_) => std::thread::scope(|s| {
                s.spawn(|| self.complete_on_fresh_runtime(system, user))
                    .join()
                    .unwrap_or(Err(ModelError::WorkerPanicked))
            }),
            Err(_) => self.complete_on_fresh_runtime(system, user),
        }
    }
}

impl HttpCompletionClient {
    fn complete_on_fresh_runtime(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.complete_async(system, user))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<String, ModelError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(ModelError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_error_body(&body),
        });
    }
    Ok(body)
}
