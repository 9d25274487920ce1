//! # smart-todo-inference
//!
//! Generative-AI layer for smart-todo.
//!
//! This crate provides:
//! - Generation backends for Gemini and any OpenAI-compatible endpoint
//! - Backend selection from `AI_PROVIDER`
//! - Prompt templates for the eight AI operations
//! - Best-effort JSON extraction from free-text replies
//! - Typed payloads with fallback defaults
//! - [`AiClient`], which ties these together and never fails
//!
//! # Feature Flags
//!
//! - `mock`: expose [`mock::MockGenerationBackend`] to downstream tests
//!
//! # Example
//!
//! ```rust,no_run
//! use smart_todo_inference::{backend_from_env, AiClient};
//! use smart_todo_core::SourceType;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AiClient::new(backend_from_env().unwrap());
//!     let analysis = client
//!         .analyze_context("Report due Friday", SourceType::Email)
//!         .await;
//!     println!("relevance {}", analysis.relevance_score());
//! }
//! ```

pub mod client;
pub mod config;
pub mod extract;
pub mod gemini;
pub mod openai;
pub mod prompts;
pub mod provider_error;
pub mod responses;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use smart_todo_core::*;

pub use client::AiClient;
pub use config::{backend_from_env, AiProvider};
pub use extract::extract_json;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use prompts::{ContextSnippet, TaskBrief};
pub use provider_error::{to_core_error, ProviderErrorCode};
pub use responses::{
    Categorization, ContextAnalysis, DailySummary, DeadlineSuggestion, Enhancement,
    Prioritization, ScheduleSuggestions, TimeBlocks,
};
