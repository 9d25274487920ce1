//! Analyse a context entry and fan its analysis out into insights and
//! suggested tasks.
//!
//! ## Steps
//!
//! 1. Ask the model for a [`ContextAnalysis`] (falls back to a neutral one)
//! 2. Store keywords, sentiment, urgency and relevance; mark processed
//! 3. Store each suggested insight
//! 4. Create each suggested task, tagged with its source entry, and link it
//! 5. Re-read the entry so the caller sees what was stored

use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use smart_todo_core::defaults::{CATEGORY_NAME_MAX_LENGTH, TASK_TITLE_MAX_LENGTH};
use smart_todo_core::{
    CategoryRepository, ContextAnalysisUpdate, ContextEntry, ContextEntryRepository,
    ContextInsightRepository, CreateInsightRequest, CreateTaskRequest, Error, Result,
    TaskRepository,
};
use smart_todo_db::Database;
use smart_todo_inference::responses::TaskSuggestion;
use smart_todo_inference::{AiClient, ContextAnalysis};

use crate::state::AppState;

#[derive(Clone)]
pub struct ContextProcessor {
    db: Database,
    ai: AiClient,
}

/// What a processing run produced.
#[derive(Debug)]
pub struct ProcessedEntry {
    pub entry: ContextEntry,
    pub insights_created: usize,
    pub tasks_created: usize,
}

impl ContextProcessor {
    pub fn new(db: Database, ai: AiClient) -> Self {
        Self { db, ai }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.ai.clone())
    }

    #[instrument(
        skip(self, entry),
        fields(subsystem = "api", component = "context_processing", op = "process",
               context_entry_id = %entry.id, user_id = %user_id)
    )]
    pub async fn process(&self, user_id: Uuid, entry: &ContextEntry) -> Result<ProcessedEntry> {
        let analysis = self
            .ai
            .analyze_context(&entry.content, entry.source_type)
            .await;

        self.db
            .context
            .apply_analysis(user_id, entry.id, analysis_update(&analysis)?)
            .await?;

        // Each insight and suggestion stands alone; one bad item never drops the rest.
        let mut insights_created = 0;
        for insight in &analysis.insights {
            let stored = self
                .db
                .insights
                .insert(CreateInsightRequest {
                    context_entry_id: entry.id,
                    insight_type: insight.insight_type,
                    title: insight.title.clone(),
                    description: insight.description.clone(),
                    confidence_score: insight.confidence(),
                    suggested_action: if insight.suggested_action.is_null() {
                        json!({})
                    } else {
                        insight.suggested_action.clone()
                    },
                })
                .await;
            match stored {
                Ok(_) => insights_created += 1,
                Err(e) => warn!(error = %e, title = %insight.title, "Skipping insight"),
            }
        }

        let mut tasks_created = 0;
        for suggestion in &analysis.task_suggestions {
            if suggestion.title.trim().is_empty() {
                debug!("Skipping task suggestion without a title");
                continue;
            }
            match self.create_suggested_task(user_id, entry.id, suggestion).await {
                Ok(()) => tasks_created += 1,
                Err(e) => warn!(error = %e, title = %suggestion.title, "Skipping task suggestion"),
            }
        }

        let entry = self
            .db
            .context
            .get(user_id, entry.id)
            .await?
            .ok_or(Error::ContextEntryNotFound(entry.id))?;

        info!(
            insights_created,
            tasks_created,
            relevance_score = entry.relevance_score,
            "Context entry processed"
        );

        Ok(ProcessedEntry {
            entry,
            insights_created,
            tasks_created,
        })
    }

    /// Refresh only the stored analysis. Insights and suggested tasks from
    /// earlier runs are left as they are.
    #[instrument(
        skip(self, entry),
        fields(subsystem = "api", component = "context_processing", op = "reanalyze",
               context_entry_id = %entry.id, user_id = %user_id)
    )]
    pub async fn reanalyze(&self, user_id: Uuid, entry: &ContextEntry) -> Result<ContextEntry> {
        let analysis = self
            .ai
            .analyze_context(&entry.content, entry.source_type)
            .await;
        self.db
            .context
            .apply_analysis(user_id, entry.id, analysis_update(&analysis)?)
            .await
    }

    /// Process, falling back to whatever is stored if processing fails part way.
    pub async fn process_or_keep(&self, user_id: Uuid, entry: ContextEntry) -> ContextEntry {
        match self.process(user_id, &entry).await {
            Ok(processed) => processed.entry,
            Err(e) => {
                warn!(
                    context_entry_id = %entry.id,
                    error = %e,
                    "AI processing failed, returning stored entry"
                );
                match self.db.context.get(user_id, entry.id).await {
                    Ok(Some(stored)) => stored,
                    _ => entry,
                }
            }
        }
    }

    /// Create the task, link it to its entry and bump the category.
    async fn create_suggested_task(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        suggestion: &TaskSuggestion,
    ) -> Result<()> {
        let category_id = match suggestion.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let name = clip(name, CATEGORY_NAME_MAX_LENGTH);
                Some(self.db.categories.get_or_create(&name).await?.id)
            }
            _ => None,
        };

        let task = self
            .db
            .tasks
            .insert(user_id, suggested_task(entry_id, suggestion, category_id))
            .await?;
        self.db.context.link_task(entry_id, task.id).await
    }
}

/// Task request for a model suggestion. Over-long titles are clipped to fit.
fn suggested_task(
    entry_id: Uuid,
    suggestion: &TaskSuggestion,
    category_id: Option<Uuid>,
) -> CreateTaskRequest {
    CreateTaskRequest {
        title: clip(suggestion.title.trim(), TASK_TITLE_MAX_LENGTH),
        description: suggestion.description.clone(),
        priority: suggestion.priority(),
        category_id,
        context_used: Some(json!({ "source_context_id": entry_id })),
        ai_insights: Some(json!({
            "created_from_context": true,
            "suggestion_data": suggestion,
        })),
        ..Default::default()
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Flatten an analysis into the columns stored on the entry.
pub fn analysis_update(analysis: &ContextAnalysis) -> Result<ContextAnalysisUpdate> {
    Ok(ContextAnalysisUpdate {
        processed_insights: serde_json::to_value(analysis)?,
        keywords: analysis.keywords.clone(),
        sentiment_score: analysis.sentiment_score(),
        urgency_indicators: analysis.urgency_indicators(),
        relevance_score: analysis.relevance_score(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_analysis_update_is_neutral() {
        let update = analysis_update(&ContextAnalysis::fallback()).unwrap();
        assert!(update.keywords.is_empty());
        assert!(update.urgency_indicators.is_empty());
        assert_eq!(update.sentiment_score, 0.5);
        assert_eq!(update.relevance_score, 0.5);
        assert!(update.processed_insights.is_object());
    }

    #[test]
    fn test_suggested_task_clips_long_title() {
        let analysis: ContextAnalysis = serde_json::from_value(json!({
            "keywords": [],
            "task_suggestions": [
                {"title": "x".repeat(250), "priority": "urgent"},
                {"title": "  Valid follow-up ", "description": "Reply to Sam"}
            ]
        }))
        .unwrap();
        let entry_id = Uuid::now_v7();

        let long = suggested_task(entry_id, &analysis.task_suggestions[0], None);
        assert_eq!(long.title.chars().count(), TASK_TITLE_MAX_LENGTH);
        assert_eq!(long.priority, smart_todo_core::TaskPriority::Urgent);

        let valid = suggested_task(entry_id, &analysis.task_suggestions[1], None);
        assert_eq!(valid.title, "Valid follow-up");
        assert_eq!(
            valid.context_used,
            Some(json!({ "source_context_id": entry_id }))
        );
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("caf\u{e9} au lait", 4), "caf\u{e9}");
        assert_eq!(clip("short", 100), "short");
        assert_eq!(clip("two words", 4), "two");
    }

    #[test]
    fn test_nested_analysis_wins_over_flat_fields() {
        let analysis: ContextAnalysis = serde_json::from_value(json!({
            "keywords": ["invoice"],
            "sentiment_score": 0.1,
            "sentiment_analysis": {"sentiment_score": 0.9},
            "urgency_analysis": {"urgency_indicators": ["today"]},
            "context_classification": {"relevance_score": 0.75}
        }))
        .unwrap();
        let update = analysis_update(&analysis).unwrap();
        assert_eq!(update.keywords, vec!["invoice"]);
        assert_eq!(update.sentiment_score, 0.9);
        assert_eq!(update.urgency_indicators, vec!["today"]);
        assert_eq!(update.relevance_score, 0.75);
    }
}
