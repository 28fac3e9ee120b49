//! Generative model clients

use crate::error::ModelError;
use crate::params::GenerationParams;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// Model used when none is configured
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text-in, text-out model seam
///
/// Implement this trait to plug in another model provider or a scripted
/// fake.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt and return the reply text
    ///
    /// # Errors
    /// Any failure to reach the model or to obtain text from its reply.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError>;
}

/// Gemini API settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; absent keys surface on the first call
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl GeminiConfig {
    /// Set API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set model name
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set API root
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// `generateContent` endpoint for the configured model
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

/// Gemini `generateContent` client
///
/// Construction never fails. A missing key is reported by the first
/// `complete` call, before any network traffic.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create client
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        if config.credential().is_none() {
            tracing::warn!("No model API key configured; narrative analyses will fail");
        }
        Self { http, config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, ModelError> {
        let key = self.config.credential().ok_or(ModelError::MissingCredential)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": params,
        });

        tracing::debug!(
            "Calling {} with {} prompt bytes",
            self.config.model,
            prompt.len()
        );
        let response = self
            .http
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Model API answered {}: {}", status, body);
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Value = response.json().await?;
        extract_text(&reply).ok_or(ModelError::EmptyResponse)
    }
}

/// Pull reply text out of a `generateContent` response
///
/// Looks at `candidates[0].content.parts[0].text`, then the older
/// `candidates[0].text` and `candidates[0].output` shapes.
#[must_use]
pub fn extract_text(reply: &Value) -> Option<String> {
    let candidate = reply.pointer("/candidates/0")?;
    [
        candidate.pointer("/content/parts/0/text"),
        candidate.get("text"),
        candidate.get("output"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .find(|text| !text.trim().is_empty())
    .map(str::to_string)
}
