//! Google Gemini generation backend.
//!
//! Talks to the Generative Language REST API
//! (`POST {base}/models/{model}:generateContent`) with the API key in the
//! `x-goog-api-key` header.

mod backend;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use types::*;
