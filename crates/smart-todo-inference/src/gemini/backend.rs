//! Gemini generation backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use smart_todo_core::defaults;
use smart_todo_core::{Error, GenerationBackend, Result};

use super::types::*;
use crate::provider_error::{to_core_error, ProviderErrorCode};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL including the API version, e.g. `.../v1beta`.
    pub base_url: String,
    /// API key. Required by the hosted API.
    pub api_key: Option<String>,
    /// Generation model, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: None,
            model: defaults::GEMINI_MODEL.to_string(),
            timeout_seconds: defaults::GEN_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Read `GEMINI_BASE_URL`, `GEMINI_API_KEY`, `GEMINI_MODEL` and
    /// `GEMINI_TIMEOUT`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| defaults::GEMINI_URL.to_string()),
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| defaults::GEMINI_MODEL.to_string()),
            timeout_seconds: std::env::var("GEMINI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::GEN_TIMEOUT_SECS),
        }
    }
}

/// Google Generative Language API backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            warn!(
                subsystem = "inference",
                component = "gemini",
                "GEMINI_API_KEY is not set; requests will be rejected and AI operations will fall back to defaults"
            );
        }

        info!(
            subsystem = "inference",
            component = "gemini",
            model = %config.model,
            "Initializing Gemini backend: url={}",
            config.base_url
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    #[instrument(skip(self, system, prompt), fields(subsystem = "inference", component = "gemini", op = "generate", model = %self.config.model, prompt_len = prompt.len()))]
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: (!system.is_empty()).then(|| Content::text(None, system)),
            generation_config: None,
        };

        let response = self
            .with_key(
                self.client
                    .post(format!("{}:generateContent", self.model_url()))
                    .header("Content-Type", "application/json"),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: GeminiErrorResponse = response.json().await.unwrap_or(GeminiErrorResponse {
                error: GeminiError {
                    code: status.as_u16(),
                    message: "Unknown error".to_string(),
                    status: "UNKNOWN".to_string(),
                },
            });
            let code = ProviderErrorCode::from_response(status.as_u16(), &body.error.status);
            return Err(to_core_error(
                code,
                &format!("Gemini returned {}: {}", status, body.error.message),
            ));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result.text();
        if content.is_empty() {
            let reason = result
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(Error::Inference(format!(
                "Gemini returned no text ({})",
                reason
            )));
        }

        debug!(
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .with_key(self.client.get(self.model_url()))
            .timeout(Duration::from_secs(defaults::HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("Gemini health check passed");
                    Ok(true)
                } else {
                    warn!("Gemini health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("Gemini health check error: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, defaults::GEMINI_URL);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout_seconds, defaults::GEN_TIMEOUT_SECS);
    }

    #[test]
    fn test_model_url() {
        let backend = GeminiBackend::new(GeminiConfig {
            base_url: "http://localhost:9000/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            backend.model_url(),
            "http://localhost:9000/v1beta/models/gemini-test"
        );
        assert_eq!(backend.model_name(), "gemini-test");
    }
}
