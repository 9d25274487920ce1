//! AI enrichment of individual tasks: enhanced description, deadline
//! suggestion and category suggestion.

use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};
use uuid::Uuid;

use smart_todo_core::defaults::TASK_CONTEXT_ENTRIES;
use smart_todo_core::{
    CategoryRepository, HistoryAction, Result, Task, TaskAiUpdate, TaskRepository,
};
use smart_todo_db::Database;
use smart_todo_inference::{AiClient, ContextSnippet};

use crate::services::recent_snippets;
use crate::state::AppState;

#[derive(Clone)]
pub struct TaskEnricher {
    db: Database,
    ai: AiClient,
}

impl TaskEnricher {
    pub fn new(db: Database, ai: AiClient) -> Self {
        Self { db, ai }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.ai.clone())
    }

    async fn context_for(&self, user_id: Uuid) -> Result<Vec<ContextSnippet>> {
        recent_snippets(&self.db, user_id, TASK_CONTEXT_ENTRIES).await
    }

    /// Enrich a freshly created task. A deadline is only suggested when the
    /// caller gave none, and a category only when the task has none; a
    /// suggested category is created if it does not exist yet.
    #[instrument(
        skip(self, task),
        fields(subsystem = "api", component = "task_enrichment", op = "enrich_new",
               task_id = %task.id, user_id = %user_id)
    )]
    pub async fn enrich_new(&self, user_id: Uuid, task: &Task) -> Result<Task> {
        let context = self.context_for(user_id).await?;

        let enhancement = self
            .ai
            .enhance_task_description(&task.title, &task.description, &context)
            .await;

        let deadline_suggestion = match task.deadline {
            None => Some(
                self.ai
                    .suggest_deadline(&task.title, &task.description, &context)
                    .await,
            ),
            Some(_) => None,
        };

        let categorization = match task.category_id {
            None => {
                let names = self.db.categories.names().await?;
                Some(
                    self.ai
                        .categorize_task(&task.title, &task.description, &names)
                        .await,
                )
            }
            Some(_) => None,
        };

        let category_id = match categorization
            .as_ref()
            .map(|c| c.suggested_category.trim())
        {
            Some(name) if !name.is_empty() => {
                Some(self.db.categories.get_or_create(name).await?.id)
            }
            _ => None,
        };

        let insights = json!({
            "enhancement": enhancement,
            "deadline_suggestion": deadline_suggestion.as_ref().map_or(json!({}), |d| json!(d)),
            "categorization": categorization.as_ref().map_or(json!({}), |c| json!(c)),
        });

        let update = TaskAiUpdate {
            ai_enhanced_description: Some(enhancement.enhanced_description.clone()),
            ai_suggested_deadline: deadline_suggestion.as_ref().and_then(|d| d.deadline()),
            category_id,
            ai_insights: Some(insights.clone()),
            ..Default::default()
        };

        let enriched = self
            .db
            .tasks
            .apply_ai_update(user_id, task.id, update, HistoryAction::AiAnalyzed, insights)
            .await?;

        info!(
            suggested_deadline = enriched.ai_suggested_deadline.is_some(),
            categorized = category_id.is_some(),
            "Task enriched on create"
        );
        Ok(enriched)
    }

    /// Re-run all three suggestions for an existing task. The stored
    /// category is left alone; the suggestion is kept in `ai_insights`.
    #[instrument(
        skip(self, task),
        fields(subsystem = "api", component = "task_enrichment", op = "analyze",
               task_id = %task.id, user_id = %user_id)
    )]
    pub async fn analyze(&self, user_id: Uuid, task: &Task) -> Result<Task> {
        let context = self.context_for(user_id).await?;
        let names = self.db.categories.names().await?;

        let enhancement = self
            .ai
            .enhance_task_description(&task.title, &task.description, &context)
            .await;
        let deadline_suggestion = self
            .ai
            .suggest_deadline(&task.title, &task.description, &context)
            .await;
        let categorization = self
            .ai
            .categorize_task(&task.title, &task.description, &names)
            .await;

        let suggestions = json!({
            "enhancement": enhancement,
            "deadline_suggestion": deadline_suggestion,
            "categorization": categorization,
        });
        let insights = with_analyzed_at(suggestions.clone());

        let update = TaskAiUpdate {
            ai_enhanced_description: Some(enhancement.enhanced_description.clone()),
            ai_suggested_deadline: deadline_suggestion.deadline(),
            ai_insights: Some(insights),
            ..Default::default()
        };

        let analyzed = self
            .db
            .tasks
            .apply_ai_update(user_id, task.id, update, HistoryAction::AiAnalyzed, suggestions)
            .await?;

        info!("Task analyzed");
        Ok(analyzed)
    }
}

fn with_analyzed_at(mut value: JsonValue) -> JsonValue {
    if let Some(map) = value.as_object_mut() {
        map.insert("analyzed_at".to_string(), json!(Utc::now().to_rfc3339()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_analyzed_at_stamps_objects_only() {
        let stamped = with_analyzed_at(json!({"enhancement": {}}));
        assert!(stamped["analyzed_at"].is_string());
        assert!(stamped.get("enhancement").is_some());

        assert_eq!(with_analyzed_at(json!([1, 2])), json!([1, 2]));
    }
}
