//! Core data models for smart-todo.
//!
//! These types are shared across all smart-todo crates and represent the
//! domain entities persisted by the database layer and returned by the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// ENUMS
// =============================================================================

/// User-assigned task priority.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("Invalid task priority: {}", s)),
        }
    }
}

/// Task lifecycle status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Pending and in-progress tasks are "open" for stats and AI planning.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

/// Where a context entry was captured from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Whatsapp,
    Email,
    Notes,
    Calendar,
    #[default]
    Manual,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Email => "email",
            Self::Notes => "notes",
            Self::Calendar => "calendar",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whatsapp" => Ok(Self::Whatsapp),
            "email" => Ok(Self::Email),
            "notes" => Ok(Self::Notes),
            "calendar" => Ok(Self::Calendar),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("Invalid source type: {}", s)),
        }
    }
}

/// Kind of suggestion extracted from a context entry.
///
/// Unknown kinds reported by the model collapse to `General`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Deadline,
    Priority,
    Category,
    TaskCreation,
    Schedule,
    Reminder,
    Pattern,
    #[default]
    #[serde(other)]
    General,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deadline => "deadline",
            Self::Priority => "priority",
            Self::Category => "category",
            Self::TaskCreation => "task_creation",
            Self::Schedule => "schedule",
            Self::Reminder => "reminder",
            Self::Pattern => "pattern",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InsightType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deadline" => Ok(Self::Deadline),
            "priority" => Ok(Self::Priority),
            "category" => Ok(Self::Category),
            "task_creation" => Ok(Self::TaskCreation),
            "schedule" => Ok(Self::Schedule),
            "reminder" => Ok(Self::Reminder),
            "pattern" => Ok(Self::Pattern),
            "general" => Ok(Self::General),
            _ => Err(format!("Invalid insight type: {}", s)),
        }
    }
}

/// Action recorded in a task's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Completed,
    AiAnalyzed,
    AiPrioritized,
    Imported,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Completed => "completed",
            Self::AiAnalyzed => "ai_analyzed",
            Self::AiPrioritized => "ai_prioritized",
            Self::Imported => "imported",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HistoryAction {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "completed" => Ok(Self::Completed),
            "ai_analyzed" => Ok(Self::AiAnalyzed),
            "ai_prioritized" => Ok(Self::AiPrioritized),
            "imported" => Ok(Self::Imported),
            _ => Err(format!("Invalid history action: {}", s)),
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

/// An account that owns tasks and context entries.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

// =============================================================================
// TASKS
// =============================================================================

/// A task category. Categories are shared by all users.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub usage_frequency: i32,
    pub created_at: DateTime<Utc>,
}

/// A task label. Tags are shared by all users.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A task with its AI metadata.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub ai_enhanced_description: String,
    pub priority: TaskPriority,
    pub ai_priority_score: f64,
    pub ai_priority_reasoning: String,
    pub status: TaskStatus,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub tags: Vec<Tag>,
    pub deadline: Option<DateTime<Utc>>,
    pub ai_suggested_deadline: Option<DateTime<Utc>>,
    pub estimated_duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub context_used: JsonValue,
    pub ai_insights: JsonValue,
}

/// One entry in a task's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskHistory {
    pub id: Uuid,
    pub task_id: Uuid,
    pub action: HistoryAction,
    pub changes: JsonValue,
    pub ai_suggestions: JsonValue,
    pub timestamp: DateTime<Utc>,
}

/// Counters for the dashboard view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub overdue_tasks: i64,
    pub high_priority_tasks: i64,
    pub tasks_due_today: i64,
}

/// Open task counts per priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PriorityDistribution {
    pub urgent: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

// =============================================================================
// CONTEXT
// =============================================================================

/// A captured message or note used as input for AI prompts.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContextEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source_type: SourceType,
    pub content: String,
    pub processed_insights: JsonValue,
    pub keywords: Vec<String>,
    pub sentiment_score: Option<f64>,
    pub urgency_indicators: Vec<String>,
    pub original_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_processed: bool,
    pub relevance_score: f64,
    pub related_task_ids: Vec<Uuid>,
}

/// A structured suggestion extracted from a context entry.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContextInsight {
    pub id: Uuid,
    pub context_entry_id: Uuid,
    pub context_entry_content: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub confidence_score: f64,
    pub suggested_action: JsonValue,
    pub is_applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Per-user, per-day digest of context entries and open tasks.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DailyContextSummary {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry count for one source type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SourceStat {
    pub source_type: SourceType,
    pub count: i64,
}
