//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that implements `/chat/completions`: the OpenAI
//! cloud API, Ollama in compatibility mode, vLLM, LM Studio.
//!
//! # Example
//!
//! ```rust,no_run
//! use smart_todo_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use smart_todo_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::new(OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         api_key: None,
//!         gen_model: "llama3".to_string(),
//!         timeout_seconds: 120,
//!     })
//!     .unwrap();
//!     let reply = backend.generate("Say hi").await.unwrap();
//! }
//! ```

mod backend;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use types::*;
