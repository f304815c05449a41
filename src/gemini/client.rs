//! Gemini REST client — model catalog listing and multimodal invocation.
//!
//! `ApiClient` talks to the Google Generative Language API
//! (`https://generativelanguage.googleapis.com/v1beta` by default; the base
//! URL is configurable for proxies and test servers). All connection details
//! come from [`GeminiConfig`]; nothing is hardcoded.
//!
//! The two collaborator traits, [`ModelCatalog`] and [`ModelInvoker`], are
//! the seams the orchestrator is built against, so it can be tested with
//! in-memory doubles instead of a live API.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::analysis::selector::ModelDescriptor;
use crate::config::GeminiConfig;

// ---------------------------------------------------------------------------
// GeminiError
// ---------------------------------------------------------------------------

/// Errors from talking to the Gemini API.
#[derive(Debug, Clone, Error)]
pub enum GeminiError {
    /// HTTP transport, connection, or non-success status error.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The HTTP response body could not be decoded as the expected JSON.
    #[error("failed to decode API response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeminiError::Timeout
        } else {
            GeminiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ImagePayload
// ---------------------------------------------------------------------------

/// An uploaded photo ready to be attached to a generate request.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw image bytes exactly as read from the file.
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `"image/jpeg"`.
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Lists the models currently offered by the provider.
///
/// An empty Vec is a *successful* answer ("connected, nothing offered") and
/// must stay distinguishable from an `Err` ("could not ask"); the selector
/// handles the empty case explicitly.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, GeminiError>;
}

/// Invokes one model with a prompt and an image, returning its raw text.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, GeminiError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// reqwest-backed implementation of both collaborator traits.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl ApiClient {
    /// Build an `ApiClient` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`. A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[async_trait]
impl ModelCatalog for ApiClient {
    /// `GET {base}/models?key=…` — map each catalog entry into a
    /// [`ModelDescriptor`].
    ///
    /// The `models/` name prefix is stripped so ids compare cleanly against
    /// the selector's substring tiers. A response without a `models` array is
    /// treated as an empty catalog, not an error.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, GeminiError> {
        let url = format!("{}/models", self.base_url());
        let key = self.config.resolve_api_key().unwrap_or_default();

        let response = self
            .client
            .get(&url)
            .query(&[("key", key.as_str()), ("pageSize", "100")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiError::Request(format!(
                "model catalog returned HTTP {status}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let descriptors = json["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| {
                        let id = m["name"].as_str()?;
                        let id = id.strip_prefix("models/").unwrap_or(id).to_string();
                        let capabilities = m["supportedGenerationMethods"]
                            .as_array()
                            .map(|methods| {
                                methods
                                    .iter()
                                    .filter_map(|v| v.as_str().map(str::to_string))
                                    .collect()
                            })
                            .unwrap_or_default();
                        Some(ModelDescriptor { id, capabilities })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(descriptors)
    }
}

#[async_trait]
impl ModelInvoker for ApiClient {
    /// `POST {base}/models/{id}:generateContent?key=…` with a text part and
    /// an `inline_data` image part, returning the first candidate's text.
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, GeminiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url(), model_id);
        let key = self.config.resolve_api_key().unwrap_or_default();

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": BASE64.encode(&image.bytes),
                        }
                    }
                ]
            }],
            "generationConfig": {
                "temperature": self.config.temperature,
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeminiError::Request(format!(
                "generateContent returned HTTP {status}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(GeminiError::EmptyResponse)?
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(GeminiError::EmptyResponse);
        }

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
