//! Core traits for smart-todo abstractions.
//!
//! Repository traits are implemented by `smart-todo-db`; the generation
//! backend trait by `smart-todo-inference`. Handlers depend only on these
//! interfaces.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Request for creating an account.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Accounts and opaque bearer tokens.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user. Fails with `Conflict` if the username is taken.
    async fn create(&self, req: RegisterUserRequest) -> Result<User>;

    /// Check a username/password pair. Returns `None` on any mismatch.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>>;

    /// Fetch a user by id.
    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    /// Update first/last name.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User>;

    /// Issue a new bearer token for the user. Only its hash is stored.
    async fn issue_token(&self, user_id: Uuid) -> Result<String>;

    /// Resolve a bearer token to an active user.
    async fn validate_token(&self, token: &str) -> Result<Option<User>>;

    /// Delete a token. Returns true if it existed.
    async fn revoke_token(&self, token: &str) -> Result<bool>;
}

// =============================================================================
// TASK REPOSITORY
// =============================================================================

/// Request for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimated_duration_minutes: Option<i32>,
    /// Provenance stored in `context_used` (e.g. source context entry).
    #[serde(default)]
    pub context_used: Option<JsonValue>,
    /// Initial AI metadata.
    #[serde(default)]
    pub ai_insights: Option<JsonValue>,
}

/// Reads a nullable field of a partial update: absent is `None`, an
/// explicit `null` is `Some(None)`. Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial task update. `None` leaves a field unchanged; `Some(None)`
/// clears a nullable column.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub estimated_duration_minutes: Option<Option<i32>>,
}

/// Filters and paging for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct ListTasksRequest {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category_id: Option<Uuid>,
    /// Case-insensitive match on title or description.
    pub search: Option<String>,
    /// `created_at`, `deadline`, `ai_priority_score` or `priority`,
    /// optionally prefixed with `-` for descending.
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A page of tasks plus the unpaged total.
#[derive(Debug, Clone)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    pub total: i64,
}

/// AI output written back to a task.
#[derive(Debug, Clone, Default)]
pub struct TaskAiUpdate {
    pub ai_enhanced_description: Option<String>,
    pub ai_suggested_deadline: Option<DateTime<Utc>>,
    /// Only applied when the task has no category yet.
    pub category_id: Option<Uuid>,
    pub ai_insights: Option<JsonValue>,
    pub ai_priority_score: Option<f64>,
    pub ai_priority_reasoning: Option<String>,
}

/// Tasks owned by a user.
///
/// Every method is scoped by `user_id`; a task owned by someone else is
/// reported as not found.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a task and record a `created` history entry.
    async fn insert(&self, user_id: Uuid, req: CreateTaskRequest) -> Result<Task>;

    /// Insert a task and record an `imported` history entry.
    async fn import(&self, user_id: Uuid, req: CreateTaskRequest) -> Result<Task>;

    /// Fetch one task.
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>>;

    /// List with filters, search and ordering.
    async fn list(&self, user_id: Uuid, req: ListTasksRequest) -> Result<ListTasksResponse>;

    /// Pending and in-progress tasks, highest AI priority first.
    async fn list_open(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Task>>;

    /// Apply a partial update and record an `updated` history entry.
    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateTaskRequest) -> Result<Task>;

    /// Delete a task. Returns true if it existed.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;

    /// Set status to completed and record a `completed` history entry.
    async fn mark_completed(&self, user_id: Uuid, id: Uuid) -> Result<Task>;

    /// Write AI output to a task and record a history entry with the
    /// raw suggestions.
    async fn apply_ai_update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: TaskAiUpdate,
        action: HistoryAction,
        ai_suggestions: JsonValue,
    ) -> Result<Task>;

    /// Dashboard counters as of `now`.
    async fn dashboard_stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DashboardStats>;

    /// Open task counts per priority.
    async fn priority_distribution(&self, user_id: Uuid) -> Result<PriorityDistribution>;

    /// Open tasks with a deadline in `[from, until]`, soonest first.
    async fn upcoming_deadlines(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Task>>;
}

// =============================================================================
// CATEGORY & TAG REPOSITORIES
// =============================================================================

/// Request for creating or replacing a category or tag.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct LabelRequest {
    pub name: String,
    pub color: Option<String>,
}

/// Partial category or tag update.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateLabelRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Shared task categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, req: LabelRequest) -> Result<Category>;
    async fn get(&self, id: Uuid) -> Result<Option<Category>>;
    /// All categories, most used first.
    async fn list(&self) -> Result<Vec<Category>>;
    async fn update(&self, id: Uuid, req: UpdateLabelRequest) -> Result<Category>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Categories with non-zero usage, most used first.
    async fn popular(&self, limit: i64) -> Result<Vec<Category>>;
    /// Look up a category by exact name, creating it with the default color.
    async fn get_or_create(&self, name: &str) -> Result<Category>;
    /// All category names, for categorization prompts.
    async fn names(&self) -> Result<Vec<String>>;
}

/// Shared task tags.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, req: LabelRequest) -> Result<Tag>;
    async fn get(&self, id: Uuid) -> Result<Option<Tag>>;
    /// All tags, most used first.
    async fn list(&self) -> Result<Vec<Tag>>;
    async fn update(&self, id: Uuid, req: UpdateLabelRequest) -> Result<Tag>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Tags with non-zero usage, most used first.
    async fn popular(&self, limit: i64) -> Result<Vec<Tag>>;
}

// =============================================================================
// TASK HISTORY REPOSITORY
// =============================================================================

/// Read access to task audit trails.
#[async_trait]
pub trait TaskHistoryRepository: Send + Sync {
    /// History for the user's tasks, newest first, optionally for one task.
    async fn list(
        &self,
        user_id: Uuid,
        task_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TaskHistory>, i64)>;

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<TaskHistory>>;
}

// =============================================================================
// CONTEXT REPOSITORIES
// =============================================================================

/// Request for capturing a context entry.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateContextEntryRequest {
    #[serde(default)]
    pub source_type: SourceType,
    pub content: String,
    pub original_timestamp: Option<DateTime<Utc>>,
}

/// Partial context entry update.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateContextEntryRequest {
    pub source_type: Option<SourceType>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub original_timestamp: Option<Option<DateTime<Utc>>>,
}

/// Filters and paging for listing context entries.
#[derive(Debug, Clone, Default)]
pub struct ListContextEntriesRequest {
    pub source_type: Option<SourceType>,
    pub is_processed: Option<bool>,
    /// Case-insensitive match on content or keywords.
    pub search: Option<String>,
    /// `created_at`, `relevance_score` or `sentiment_score`, optionally
    /// prefixed with `-` for descending. Defaults to `-created_at`.
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// AI analysis written back to a context entry. Marks it processed.
#[derive(Debug, Clone, Default)]
pub struct ContextAnalysisUpdate {
    pub processed_insights: JsonValue,
    pub keywords: Vec<String>,
    pub sentiment_score: f64,
    pub urgency_indicators: Vec<String>,
    pub relevance_score: f64,
}

/// Context entries owned by a user.
#[async_trait]
pub trait ContextEntryRepository: Send + Sync {
    async fn insert(&self, user_id: Uuid, req: CreateContextEntryRequest) -> Result<ContextEntry>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ContextEntry>>;
    async fn list(
        &self,
        user_id: Uuid,
        req: ListContextEntriesRequest,
    ) -> Result<(Vec<ContextEntry>, i64)>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateContextEntryRequest,
    ) -> Result<ContextEntry>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;

    /// Most recent entries, newest first.
    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<ContextEntry>>;

    /// Entries created in `[start, end)`, newest first.
    async fn created_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ContextEntry>>;

    /// Entries with relevance at or above `threshold`, newest first.
    async fn high_relevance(&self, user_id: Uuid, threshold: f64) -> Result<Vec<ContextEntry>>;

    /// Entry count per source type, largest first.
    async fn source_stats(&self, user_id: Uuid) -> Result<Vec<SourceStat>>;

    /// Oldest unprocessed entries first.
    async fn unprocessed(&self, user_id: Uuid, limit: i64) -> Result<Vec<ContextEntry>>;

    /// Store an analysis and mark the entry processed.
    async fn apply_analysis(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ContextAnalysisUpdate,
    ) -> Result<ContextEntry>;

    /// Link a task created from this entry.
    async fn link_task(&self, entry_id: Uuid, task_id: Uuid) -> Result<()>;
}

/// Request for storing an insight.
#[derive(Debug, Clone)]
pub struct CreateInsightRequest {
    pub context_entry_id: Uuid,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub confidence_score: f64,
    pub suggested_action: JsonValue,
}

/// Partial insight update.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateInsightRequest {
    pub insight_type: Option<InsightType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub confidence_score: Option<f64>,
    pub suggested_action: Option<JsonValue>,
    pub is_applied: Option<bool>,
}

/// Filters and paging for listing insights.
#[derive(Debug, Clone, Default)]
pub struct ListInsightsRequest {
    pub insight_type: Option<InsightType>,
    pub is_applied: Option<bool>,
    /// Only insights at or above this confidence.
    pub min_confidence: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Insights on the user's context entries, highest confidence first.
#[async_trait]
pub trait ContextInsightRepository: Send + Sync {
    async fn insert(&self, req: CreateInsightRequest) -> Result<ContextInsight>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ContextInsight>>;
    async fn list(
        &self,
        user_id: Uuid,
        req: ListInsightsRequest,
    ) -> Result<(Vec<ContextInsight>, i64)>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateInsightRequest,
    ) -> Result<ContextInsight>;
    /// Set `is_applied` and stamp `applied_at`.
    async fn mark_applied(&self, user_id: Uuid, id: Uuid) -> Result<ContextInsight>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

/// Request for storing a daily summary.
#[derive(Debug, Clone)]
pub struct CreateDailySummaryRequest {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub total_entries: i32,
    pub high_priority_indicators: i32,
    pub new_task_suggestions: i32,
    pub deadline_mentions: i32,
    pub summary_text: String,
    pub key_themes: Vec<String>,
    pub priority_areas: Vec<String>,
    pub recommended_actions: JsonValue,
    pub schedule_suggestions: JsonValue,
}

/// Daily summaries, newest date first.
#[async_trait]
pub trait DailySummaryRepository: Send + Sync {
    /// Store a summary. If one already exists for the user and date, the
    /// existing row is returned unchanged.
    async fn insert(&self, req: CreateDailySummaryRequest) -> Result<DailyContextSummary>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<DailyContextSummary>>;
    async fn get_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyContextSummary>>;
    async fn list(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DailyContextSummary>, i64)>;
    /// Summaries dated on or after `since`.
    async fn since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<DailyContextSummary>>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Check if the backend is reachable and the credentials are accepted.
    async fn health_check(&self) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_task_request_null_clears() {
        let req: UpdateTaskRequest =
            serde_json::from_value(json!({"deadline": null, "category_id": null})).unwrap();
        assert_eq!(req.deadline, Some(None));
        assert_eq!(req.category_id, Some(None));
        assert_eq!(req.estimated_duration_minutes, None);
    }

    #[test]
    fn test_update_task_request_value_sets() {
        let req: UpdateTaskRequest =
            serde_json::from_value(json!({"estimated_duration_minutes": 45})).unwrap();
        assert_eq!(req.estimated_duration_minutes, Some(Some(45)));
        assert_eq!(req.deadline, None);
    }

    #[test]
    fn test_update_context_entry_timestamp_null_clears() {
        let req: UpdateContextEntryRequest =
            serde_json::from_value(json!({"original_timestamp": null})).unwrap();
        assert_eq!(req.original_timestamp, Some(None));

        let req: UpdateContextEntryRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.original_timestamp, None);
    }
}
