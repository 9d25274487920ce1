//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smart_todo_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response(r#"{"suggested_category": "Work"}"#)
//!     .with_response_mapping("Daily summary", r#"{"summary": "Quiet day"}"#);
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use smart_todo_core::{Error, GenerationBackend, Result};

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// (needle, reply) pairs; the first needle found in the prompt wins.
    mappings: Vec<(String, String)>,
    default_response: String,
    latency_ms: u64,
    failure_rate: f64,
    healthy: bool,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mappings: Vec::new(),
            default_response: "Mock response".to_string(),
            latency_ms: 0,
            failure_rate: 0.0,
            healthy: true,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply used when no mapping matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Reply with `output` to any prompt containing `needle`.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mappings
            .push((needle.into(), output.into()));
        self
    }

    /// Set simulated latency for generation calls.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Result reported by `health_check`.
    pub fn with_health(mut self, healthy: bool) -> Self {
        Arc::make_mut(&mut self.config).healthy = healthy;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Get number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "generate")
            .count()
    }

    fn log_call(&self, operation: &str, input: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
            timestamp: std::time::Instant::now(),
        });
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.log_call("generate", prompt);
        self.simulate_latency().await;

        if self.should_fail() {
            return Err(Error::Inference("Simulated failure for testing".to_string()));
        }

        let reply = self
            .config
            .mappings
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.config.default_response.clone());
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_generate() {
        let backend = MockGenerationBackend::new().with_fixed_response("Custom response");
        let response = backend.generate("test prompt").await.unwrap();
        assert_eq!(response, "Custom response");
    }

    #[tokio::test]
    async fn test_mock_backend_response_mapping() {
        let backend = MockGenerationBackend::new()
            .with_response_mapping("hello", "world")
            .with_response_mapping("foo", "bar");

        assert_eq!(backend.generate("say hello").await.unwrap(), "world");
        assert_eq!(backend.generate("foo?").await.unwrap(), "bar");
        assert_eq!(backend.generate("other").await.unwrap(), "Mock response");
    }

    #[tokio::test]
    async fn test_mock_backend_call_logging() {
        let backend = MockGenerationBackend::new();
        backend.generate("one").await.unwrap();
        backend.generate("two").await.unwrap();

        assert_eq!(backend.generate_call_count(), 2);
        assert_eq!(backend.get_calls()[1].input, "two");

        backend.clear_calls();
        assert_eq!(backend.generate_call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_backend_always_fails() {
        let backend = MockGenerationBackend::new().with_failure_rate(1.0);
        assert!(matches!(
            backend.generate("x").await,
            Err(Error::Inference(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_backend_latency() {
        let backend = MockGenerationBackend::new().with_latency_ms(50);
        let start = std::time::Instant::now();
        backend.generate("x").await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }
}
