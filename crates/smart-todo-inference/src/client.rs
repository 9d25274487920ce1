//! Fallback-aware AI client.
//!
//! Every operation follows the same steps: build a prompt, call the
//! generation backend once, extract a JSON object from the reply and
//! deserialize it. Any failure along the way is logged and replaced by the
//! operation's fallback payload, so callers never see an error.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use smart_todo_core::{GenerationBackend, SourceType};

use crate::extract::extract_json;
use crate::prompts::{self, ContextSnippet, TaskBrief};
use crate::responses::*;

/// System instruction sent with every prompt.
pub const SYSTEM_PROMPT: &str = "You are the planning assistant of a personal task manager. \
    Answer with one JSON object that follows the requested structure and nothing else.";

/// AI operations over a shared generation backend.
#[derive(Clone)]
pub struct AiClient {
    backend: Arc<dyn GenerationBackend>,
}

impl AiClient {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn GenerationBackend> {
        &self.backend
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// True if the backend answered its health probe.
    pub async fn health_check(&self) -> bool {
        match self.backend.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                warn!(subsystem = "inference", error = %e, "Backend health check errored");
                false
            }
        }
    }

    /// Generate, extract and parse; fall back on any failure.
    async fn run<T, F>(&self, op: &'static str, prompt: String, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let reply = match self.backend.generate_with_system(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "ai_client",
                    op,
                    model = self.backend.model_name(),
                    fallback = true,
                    error = %e,
                    "Generation failed, using default payload"
                );
                return fallback();
            }
        };
        trace!(op, reply = %reply, "Raw model reply");

        match extract_json::<T>(&reply) {
            Some(parsed) => {
                debug!(
                    subsystem = "inference",
                    component = "ai_client",
                    op,
                    prompt_len = prompt.len(),
                    response_len = reply.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    fallback = false,
                    "AI operation complete"
                );
                parsed
            }
            None => {
                warn!(
                    subsystem = "inference",
                    component = "ai_client",
                    op,
                    model = self.backend.model_name(),
                    response_len = reply.len(),
                    fallback = true,
                    "No usable JSON in model reply, using default payload"
                );
                fallback()
            }
        }
    }

    /// Extract keywords, sentiment, urgency, insights and task suggestions
    /// from a piece of captured context.
    pub async fn analyze_context(&self, content: &str, source_type: SourceType) -> ContextAnalysis {
        let prompt = prompts::analyze_context(Utc::now(), content, source_type);
        self.run("analyze_context", prompt, ContextAnalysis::fallback)
            .await
    }

    /// Score open tasks in light of recent context.
    pub async fn prioritize_tasks(
        &self,
        tasks: &[TaskBrief],
        context: &[ContextSnippet],
    ) -> Prioritization {
        let prompt = prompts::prioritize_tasks(Utc::now(), tasks, context);
        self.run("prioritize_tasks", prompt, || Prioritization::fallback(tasks))
            .await
    }

    pub async fn suggest_deadline(
        &self,
        title: &str,
        description: &str,
        context: &[ContextSnippet],
    ) -> DeadlineSuggestion {
        let now = Utc::now();
        let prompt = prompts::suggest_deadline(now, title, description, context);
        self.run("suggest_deadline", prompt, || DeadlineSuggestion::fallback(now))
            .await
    }

    pub async fn categorize_task(
        &self,
        title: &str,
        description: &str,
        existing_categories: &[String],
    ) -> Categorization {
        let prompt = prompts::categorize_task(title, description, existing_categories);
        self.run("categorize_task", prompt, Categorization::fallback)
            .await
    }

    pub async fn enhance_task_description(
        &self,
        title: &str,
        description: &str,
        context: &[ContextSnippet],
    ) -> Enhancement {
        let prompt = prompts::enhance_task(Utc::now(), title, description, context);
        self.run("enhance_task_description", prompt, || {
            Enhancement::fallback(description)
        })
        .await
    }

    pub async fn generate_daily_summary(
        &self,
        context: &[ContextSnippet],
        tasks: &[TaskBrief],
    ) -> DailySummary {
        let prompt = prompts::daily_summary(context, tasks);
        self.run("generate_daily_summary", prompt, DailySummary::fallback)
            .await
    }

    pub async fn generate_schedule_suggestions(
        &self,
        tasks: &[TaskBrief],
        context: &[ContextSnippet],
    ) -> ScheduleSuggestions {
        let prompt = prompts::schedule_suggestions(tasks, context);
        self.run("generate_schedule_suggestions", prompt, || {
            ScheduleSuggestions::fallback(tasks)
        })
        .await
    }

    pub async fn generate_time_blocks(&self, tasks: &[TaskBrief], available_hours: u32) -> TimeBlocks {
        let prompt = prompts::time_blocks(tasks, available_hours);
        self.run("generate_time_blocks", prompt, || {
            TimeBlocks::fallback(tasks, available_hours)
        })
        .await
    }
}
