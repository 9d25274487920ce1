//! Backend selection from the environment.

use std::sync::Arc;

use tracing::info;

use smart_todo_core::{Error, GenerationBackend, Result};

use crate::gemini::GeminiBackend;
use crate::openai::OpenAIBackend;

/// Which generation provider to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiProvider {
    #[default]
    Gemini,
    /// Any OpenAI-compatible endpoint.
    OpenAI,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
        }
    }

    /// Read `AI_PROVIDER`. Unset or empty means Gemini.
    pub fn from_env() -> Result<Self> {
        match std::env::var("AI_PROVIDER") {
            Ok(v) if !v.trim().is_empty() => v.parse().map_err(Error::Config),
            _ => Ok(Self::default()),
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AiProvider {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "openai-compatible" | "ollama" => Ok(Self::OpenAI),
            _ => Err(format!("Unknown AI provider: {}", s)),
        }
    }
}

/// Build the configured generation backend.
pub fn backend_from_env() -> Result<Arc<dyn GenerationBackend>> {
    let provider = AiProvider::from_env()?;
    let backend: Arc<dyn GenerationBackend> = match provider {
        AiProvider::Gemini => Arc::new(GeminiBackend::from_env()?),
        AiProvider::OpenAI => Arc::new(OpenAIBackend::from_env()?),
    };
    info!(
        subsystem = "inference",
        provider = %provider,
        model = backend.model_name(),
        "Generation backend selected"
    );
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<AiProvider>().unwrap(), AiProvider::Gemini);
        assert_eq!("openai".parse::<AiProvider>().unwrap(), AiProvider::OpenAI);
        assert_eq!("ollama".parse::<AiProvider>().unwrap(), AiProvider::OpenAI);
        assert!("cohere".parse::<AiProvider>().is_err());
    }

    #[test]
    fn test_provider_default_is_gemini() {
        assert_eq!(AiProvider::default(), AiProvider::Gemini);
        assert_eq!(AiProvider::Gemini.to_string(), "gemini");
    }
}
