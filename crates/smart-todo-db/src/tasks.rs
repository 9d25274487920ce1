//! Task repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value as JsonValue};
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use smart_todo_core::{
    defaults, CreateTaskRequest, DashboardStats, Error, HistoryAction, ListTasksRequest,
    ListTasksResponse, PriorityDistribution, Result, Tag, Task, TaskAiUpdate, TaskPriority,
    TaskRepository, TaskStatus, UpdateTaskRequest,
};

use crate::categories::{bump_category_usage, ensure_category_exists};
use crate::escape_like;
use crate::history::record_history;
use crate::tags::{link_tags, map_row_to_tag};

const TASK_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.title, t.description, t.ai_enhanced_description,
           t.priority, t.ai_priority_score, t.ai_priority_reasoning, t.status,
           t.category_id, c.name AS category_name, t.deadline, t.ai_suggested_deadline,
           t.estimated_duration_minutes, t.created_at, t.updated_at, t.completed_at,
           t.context_used, t.ai_insights
    FROM task t
    LEFT JOIN category c ON c.id = t.category_id
"#;

const DEFAULT_ORDER: &str = "t.ai_priority_score DESC, t.created_at DESC";

/// Rank expression so `priority` sorts low < medium < high < urgent.
const PRIORITY_RANK: &str =
    "CASE t.priority WHEN 'low' THEN 1 WHEN 'medium' THEN 2 WHEN 'high' THEN 3 WHEN 'urgent' THEN 4 ELSE 0 END";

/// Build an ORDER BY clause from a `field` / `-field` ordering parameter.
///
/// Fields outside the whitelist fall back to the default ordering.
fn build_order_clause(ordering: Option<&str>) -> String {
    let Some(ordering) = ordering.map(str::trim).filter(|o| !o.is_empty()) else {
        return DEFAULT_ORDER.to_string();
    };
    let (field, direction) = match ordering.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (ordering, "ASC"),
    };
    let expr = match field {
        "created_at" => "t.created_at",
        "deadline" => "t.deadline",
        "ai_priority_score" => "t.ai_priority_score",
        "priority" => PRIORITY_RANK,
        _ => return DEFAULT_ORDER.to_string(),
    };
    format!("{} {} NULLS LAST, t.created_at DESC", expr, direction)
}

/// Clamp a requested page to `[1, PAGE_LIMIT_MAX]` / `>= 0`.
pub(crate) fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .unwrap_or(defaults::PAGE_LIMIT)
        .clamp(1, defaults::PAGE_LIMIT_MAX);
    let offset = offset.unwrap_or(defaults::PAGE_OFFSET).max(0);
    (limit, offset)
}

/// Build the WHERE clause for a task listing. `$1` is always the user id.
fn build_filter_clause(req: &ListTasksRequest) -> (String, usize) {
    let mut clause = String::from("WHERE t.user_id = $1");
    let mut param_idx = 2;

    if req.status.is_some() {
        clause.push_str(&format!(" AND t.status = ${}", param_idx));
        param_idx += 1;
    }
    if req.priority.is_some() {
        clause.push_str(&format!(" AND t.priority = ${}", param_idx));
        param_idx += 1;
    }
    if req.category_id.is_some() {
        clause.push_str(&format!(" AND t.category_id = ${}", param_idx));
        param_idx += 1;
    }
    if search_pattern(req).is_some() {
        clause.push_str(&format!(
            " AND (t.title ILIKE ${0} ESCAPE '\\' OR t.description ILIKE ${0} ESCAPE '\\')",
            param_idx
        ));
        param_idx += 1;
    }

    (clause, param_idx)
}

fn search_pattern(req: &ListTasksRequest) -> Option<String> {
    req.search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}

macro_rules! bind_task_filters {
    ($query:expr, $user_id:expr, $req:expr, $pattern:expr) => {{
        let mut q = $query.bind($user_id);
        if let Some(status) = &$req.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = &$req.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(category_id) = &$req.category_id {
            q = q.bind(*category_id);
        }
        if let Some(pattern) = &$pattern {
            q = q.bind(pattern.clone());
        }
        q
    }};
}

fn map_row_to_task(row: &sqlx::postgres::PgRow) -> Task {
    let priority: String = row.get("priority");
    let status: String = row.get("status");
    Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        ai_enhanced_description: row.get("ai_enhanced_description"),
        priority: priority.parse().unwrap_or_default(),
        ai_priority_score: row.get("ai_priority_score"),
        ai_priority_reasoning: row.get("ai_priority_reasoning"),
        status: status.parse().unwrap_or_default(),
        category_id: row.get("category_id"),
        category_name: row.get("category_name"),
        tags: Vec::new(),
        deadline: row.get("deadline"),
        ai_suggested_deadline: row.get("ai_suggested_deadline"),
        estimated_duration_minutes: row.get("estimated_duration_minutes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        completed_at: row.get("completed_at"),
        context_used: row.get("context_used"),
        ai_insights: row.get("ai_insights"),
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("Task title is required".to_string()));
    }
    if title.chars().count() > defaults::TASK_TITLE_MAX_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Task title must be {} characters or less",
            defaults::TASK_TITLE_MAX_LENGTH
        )));
    }
    Ok(title.to_string())
}

/// `completed_at` after a save: stamped once when the task becomes completed.
fn next_completed_at(
    status: TaskStatus,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, current) {
        (TaskStatus::Completed, None) => Some(now),
        (_, existing) => existing,
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        defaults::AI_PRIORITY_SCORE
    }
}

/// PostgreSQL implementation of TaskRepository.
pub struct PgTaskRepository {
    pool: Pool<Postgres>,
}

impl PgTaskRepository {
    /// Create a new PgTaskRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load tags for a batch of tasks with one query.
    async fn attach_tags(&self, tasks: &mut [Task]) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let rows = sqlx::query(
            "SELECT tt.task_id, g.id, g.name, g.color, g.usage_count, g.created_at
             FROM task_tag tt
             JOIN tag g ON g.id = tt.tag_id
             WHERE tt.task_id = ANY($1)
             ORDER BY g.name",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_task: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in &rows {
            let task_id: Uuid = row.get("task_id");
            by_task.entry(task_id).or_default().push(map_row_to_tag(row));
        }
        for task in tasks.iter_mut() {
            if let Some(tags) = by_task.remove(&task.id) {
                task.tags = tags;
            }
        }
        Ok(())
    }

    async fn fetch_many(&self, sql: &str, user_id: Uuid) -> Result<Vec<Task>> {
        let rows = sqlx::query(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        let mut tasks: Vec<Task> = rows.iter().map(map_row_to_task).collect();
        self.attach_tags(&mut tasks).await?;
        Ok(tasks)
    }

    async fn get_required(&self, user_id: Uuid, id: Uuid) -> Result<Task> {
        self.get(user_id, id).await?.ok_or(Error::TaskNotFound(id))
    }

    /// Insert a task and record `action` as its first history entry.
    async fn insert_recorded(
        &self,
        user_id: Uuid,
        req: CreateTaskRequest,
        action: HistoryAction,
    ) -> Result<Task> {
        let title = validate_title(&req.title)?;
        let id = Uuid::now_v7();
        let now = Utc::now();
        let completed_at = next_completed_at(req.status, None, now);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if let Some(category_id) = req.category_id {
            ensure_category_exists(&mut *tx, category_id).await?;
        }

        sqlx::query(
            "INSERT INTO task (id, user_id, title, description, priority, ai_priority_score,
                               status, category_id, deadline, estimated_duration_minutes,
                               created_at, updated_at, completed_at, context_used, ai_insights)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11, $12, $13, $14)",
        )
        .bind(id)
        .bind(user_id)
        .bind(&title)
        .bind(&req.description)
        .bind(req.priority.as_str())
        .bind(defaults::AI_PRIORITY_SCORE)
        .bind(req.status.as_str())
        .bind(req.category_id)
        .bind(req.deadline)
        .bind(req.estimated_duration_minutes)
        .bind(now)
        .bind(completed_at)
        .bind(req.context_used.clone().unwrap_or_else(|| json!({})))
        .bind(req.ai_insights.clone().unwrap_or_else(|| json!({})))
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        link_tags(&mut *tx, id, &req.tag_ids).await?;
        bump_category_usage(&mut *tx, req.category_id).await?;
        record_history(
            &mut *tx,
            id,
            action,
            json!({
                "title": title,
                "priority": req.priority,
                "status": req.status,
            }),
            json!({}),
        )
        .await?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "tasks",
            op = "insert",
            action = %action,
            task_id = %id,
            user_id = %user_id,
            "Task created"
        );
        self.get_required(user_id, id).await
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, user_id: Uuid, req: CreateTaskRequest) -> Result<Task> {
        self.insert_recorded(user_id, req, HistoryAction::Created).await
    }

    async fn import(&self, user_id: Uuid, req: CreateTaskRequest) -> Result<Task> {
        self.insert_recorded(user_id, req, HistoryAction::Imported).await
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>> {
        let row = sqlx::query(&format!("{} WHERE t.id = $1 AND t.user_id = $2", TASK_SELECT))
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut tasks = vec![map_row_to_task(&row)];
        self.attach_tags(&mut tasks).await?;
        Ok(tasks.pop())
    }

    async fn list(&self, user_id: Uuid, req: ListTasksRequest) -> Result<ListTasksResponse> {
        let (where_clause, param_idx) = build_filter_clause(&req);
        let order_clause = build_order_clause(req.ordering.as_deref());
        let pattern = search_pattern(&req);
        let (limit, offset) = clamp_page(req.limit, req.offset);

        let count_sql = format!("SELECT COUNT(*) FROM task t {}", where_clause);
        let total: i64 = bind_task_filters!(sqlx::query_scalar(&count_sql), user_id, req, pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let list_sql = format!(
            "{} {} ORDER BY {} LIMIT ${} OFFSET ${}",
            TASK_SELECT,
            where_clause,
            order_clause,
            param_idx,
            param_idx + 1
        );
        let rows = bind_task_filters!(sqlx::query(&list_sql), user_id, req, pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut tasks: Vec<Task> = rows.iter().map(map_row_to_task).collect();
        self.attach_tags(&mut tasks).await?;

        debug!(
            subsystem = "database",
            component = "tasks",
            op = "list",
            result_count = tasks.len(),
            total,
            "Listed tasks"
        );
        Ok(ListTasksResponse { tasks, total })
    }

    async fn list_open(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Task>> {
        let limit_clause = limit
            .map(|l| format!(" LIMIT {}", l.max(0)))
            .unwrap_or_default();
        let sql = format!(
            "{} WHERE t.user_id = $1 AND t.status IN ('pending', 'in_progress')
             ORDER BY {}{}",
            TASK_SELECT, DEFAULT_ORDER, limit_clause
        );
        self.fetch_many(&sql, user_id).await
    }

    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateTaskRequest) -> Result<Task> {
        let title = req.title.as_deref().map(validate_title).transpose()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let current = sqlx::query(
            "SELECT status, completed_at FROM task WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::TaskNotFound(id))?;

        let current_status: String = current.get("status");
        let current_status: TaskStatus = current_status.parse().unwrap_or_default();
        let status = req.status.unwrap_or(current_status);
        let completed_at = next_completed_at(status, current.get("completed_at"), now);

        if let Some(Some(category_id)) = req.category_id {
            ensure_category_exists(&mut *tx, category_id).await?;
        }

        // Nullable columns take a "touched" flag so an explicit null clears them.
        let category_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE task SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                priority = COALESCE($5, priority),
                status = $6,
                category_id = CASE WHEN $7 THEN $8 ELSE category_id END,
                deadline = CASE WHEN $9 THEN $10 ELSE deadline END,
                estimated_duration_minutes =
                    CASE WHEN $11 THEN $12 ELSE estimated_duration_minutes END,
                completed_at = $13,
                updated_at = $14
             WHERE id = $1 AND user_id = $2
             RETURNING category_id",
        )
        .bind(id)
        .bind(user_id)
        .bind(&title)
        .bind(&req.description)
        .bind(req.priority.map(|p| p.as_str()))
        .bind(status.as_str())
        .bind(req.category_id.is_some())
        .bind(req.category_id.flatten())
        .bind(req.deadline.is_some())
        .bind(req.deadline.flatten())
        .bind(req.estimated_duration_minutes.is_some())
        .bind(req.estimated_duration_minutes.flatten())
        .bind(completed_at)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if let Some(tag_ids) = &req.tag_ids {
            sqlx::query("DELETE FROM task_tag WHERE task_id = $1 AND NOT (tag_id = ANY($2))")
                .bind(id)
                .bind(tag_ids)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            link_tags(&mut *tx, id, tag_ids).await?;
        }

        bump_category_usage(&mut *tx, category_id).await?;
        record_history(
            &mut *tx,
            id,
            HistoryAction::Updated,
            update_changes(&req, title.as_deref()),
            json!({}),
        )
        .await?;

        tx.commit().await.map_err(Error::Database)?;
        self.get_required(user_id, id).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM task WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_completed(&self, user_id: Uuid, id: Uuid) -> Result<Task> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(
            "UPDATE task SET status = 'completed',
                             completed_at = COALESCE(completed_at, $3),
                             updated_at = $3
             WHERE id = $1 AND user_id = $2
             RETURNING completed_at, category_id",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::TaskNotFound(id))?;

        let completed_at: Option<DateTime<Utc>> = row.get("completed_at");
        bump_category_usage(&mut *tx, row.get("category_id")).await?;
        record_history(
            &mut *tx,
            id,
            HistoryAction::Completed,
            json!({
                "status": TaskStatus::Completed,
                "completed_at": completed_at,
            }),
            json!({}),
        )
        .await?;

        tx.commit().await.map_err(Error::Database)?;
        self.get_required(user_id, id).await
    }

    async fn apply_ai_update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: TaskAiUpdate,
        action: HistoryAction,
        ai_suggestions: JsonValue,
    ) -> Result<Task> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let category_id: Option<Uuid> = sqlx::query_scalar(
            "UPDATE task SET
                ai_enhanced_description = COALESCE($3, ai_enhanced_description),
                ai_suggested_deadline = COALESCE($4, ai_suggested_deadline),
                category_id = COALESCE(category_id, $5),
                ai_insights = COALESCE($6, ai_insights),
                ai_priority_score = COALESCE($7, ai_priority_score),
                ai_priority_reasoning = COALESCE($8, ai_priority_reasoning),
                updated_at = $9
             WHERE id = $1 AND user_id = $2
             RETURNING category_id",
        )
        .bind(id)
        .bind(user_id)
        .bind(&update.ai_enhanced_description)
        .bind(update.ai_suggested_deadline)
        .bind(update.category_id)
        .bind(&update.ai_insights)
        .bind(update.ai_priority_score.map(clamp_score))
        .bind(&update.ai_priority_reasoning)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::TaskNotFound(id))?;

        bump_category_usage(&mut *tx, category_id).await?;
        record_history(&mut *tx, id, action, json!({}), ai_suggestions).await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "tasks",
            op = "apply_ai_update",
            task_id = %id,
            action = %action,
            "Stored AI output on task"
        );
        self.get_required(user_id, id).await
    }

    async fn dashboard_stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DashboardStats> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or(now);
        let day_end = day_start + Duration::days(1);

        let row = sqlx::query(
            "SELECT
                COUNT(*) AS total_tasks,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_tasks,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress_tasks,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_tasks,
                COUNT(*) FILTER (WHERE status IN ('pending', 'in_progress')
                                   AND deadline < $2) AS overdue_tasks,
                COUNT(*) FILTER (WHERE status IN ('pending', 'in_progress')
                                   AND priority IN ('high', 'urgent')) AS high_priority_tasks,
                COUNT(*) FILTER (WHERE status IN ('pending', 'in_progress')
                                   AND deadline >= $3 AND deadline < $4) AS tasks_due_today
             FROM task WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(now)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(DashboardStats {
            total_tasks: row.get("total_tasks"),
            pending_tasks: row.get("pending_tasks"),
            in_progress_tasks: row.get("in_progress_tasks"),
            completed_tasks: row.get("completed_tasks"),
            overdue_tasks: row.get("overdue_tasks"),
            high_priority_tasks: row.get("high_priority_tasks"),
            tasks_due_today: row.get("tasks_due_today"),
        })
    }

    async fn priority_distribution(&self, user_id: Uuid) -> Result<PriorityDistribution> {
        let rows = sqlx::query(
            "SELECT priority, COUNT(*) AS count FROM task
             WHERE user_id = $1 AND status IN ('pending', 'in_progress')
             GROUP BY priority",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut dist = PriorityDistribution::default();
        for row in &rows {
            let priority: String = row.get("priority");
            let count: i64 = row.get("count");
            match priority.parse::<TaskPriority>() {
                Ok(TaskPriority::Urgent) => dist.urgent = count,
                Ok(TaskPriority::High) => dist.high = count,
                Ok(TaskPriority::Medium) => dist.medium = count,
                Ok(TaskPriority::Low) => dist.low = count,
                Err(_) => {}
            }
        }
        Ok(dist)
    }

    async fn upcoming_deadlines(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "{} WHERE t.user_id = $1 AND t.status IN ('pending', 'in_progress')
                 AND t.deadline >= $2 AND t.deadline <= $3
             ORDER BY t.deadline ASC",
            TASK_SELECT
        ))
        .bind(user_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut tasks: Vec<Task> = rows.iter().map(map_row_to_task).collect();
        self.attach_tags(&mut tasks).await?;
        Ok(tasks)
    }
}

/// JSON record of the fields a partial update touched.
fn update_changes(req: &UpdateTaskRequest, title: Option<&str>) -> JsonValue {
    let mut changes = Map::new();
    if let Some(title) = title {
        changes.insert("title".into(), json!(title));
    }
    if let Some(description) = &req.description {
        changes.insert("description".into(), json!(description));
    }
    if let Some(priority) = req.priority {
        changes.insert("priority".into(), json!(priority));
    }
    if let Some(status) = req.status {
        changes.insert("status".into(), json!(status));
    }
    if let Some(category_id) = req.category_id {
        changes.insert("category_id".into(), json!(category_id));
    }
    if let Some(tag_ids) = &req.tag_ids {
        changes.insert("tag_ids".into(), json!(tag_ids));
    }
    if let Some(deadline) = req.deadline {
        changes.insert("deadline".into(), json!(deadline));
    }
    if let Some(minutes) = req.estimated_duration_minutes {
        changes.insert("estimated_duration_minutes".into(), json!(minutes));
    }
    JsonValue::Object(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_clause_default() {
        assert_eq!(build_order_clause(None), DEFAULT_ORDER);
        assert_eq!(build_order_clause(Some("  ")), DEFAULT_ORDER);
    }

    #[test]
    fn test_order_clause_descending_prefix() {
        let clause = build_order_clause(Some("-deadline"));
        assert!(clause.starts_with("t.deadline DESC"));
    }

    #[test]
    fn test_order_clause_ascending() {
        let clause = build_order_clause(Some("created_at"));
        assert!(clause.starts_with("t.created_at ASC"));
    }

    #[test]
    fn test_order_clause_priority_uses_rank() {
        let clause = build_order_clause(Some("-priority"));
        assert!(clause.contains("WHEN 'urgent' THEN 4"));
        assert!(clause.contains("DESC"));
    }

    #[test]
    fn test_order_clause_rejects_unknown_field() {
        assert_eq!(build_order_clause(Some("title; DROP TABLE task")), DEFAULT_ORDER);
        assert_eq!(build_order_clause(Some("-user_id")), DEFAULT_ORDER);
    }

    #[test]
    fn test_filter_clause_param_numbering() {
        let req = ListTasksRequest {
            status: Some(TaskStatus::Pending),
            category_id: Some(Uuid::nil()),
            search: Some("report".to_string()),
            ..Default::default()
        };
        let (clause, next) = build_filter_clause(&req);
        assert!(clause.contains("t.status = $2"));
        assert!(clause.contains("t.category_id = $3"));
        assert!(clause.contains("t.title ILIKE $4"));
        assert!(!clause.contains("t.priority"));
        assert_eq!(next, 5);
    }

    #[test]
    fn test_filter_clause_ignores_blank_search() {
        let req = ListTasksRequest {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let (clause, next) = build_filter_clause(&req);
        assert_eq!(clause, "WHERE t.user_id = $1");
        assert_eq!(next, 2);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let req = ListTasksRequest {
            search: Some("50%_off".to_string()),
            ..Default::default()
        };
        assert_eq!(search_pattern(&req).unwrap(), "%50\\%\\_off%");
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(None, None), (defaults::PAGE_LIMIT, 0));
        assert_eq!(clamp_page(Some(0), Some(-5)), (1, 0));
        assert_eq!(
            clamp_page(Some(10_000), Some(20)),
            (defaults::PAGE_LIMIT_MAX, 20)
        );
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("  Write report ").unwrap(), "Write report");
        assert!(matches!(validate_title(""), Err(Error::InvalidInput(_))));
        assert!(validate_title(&"x".repeat(200)).is_ok());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_completed_at_stamped_once() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(next_completed_at(TaskStatus::Completed, None, now), Some(now));
        assert_eq!(
            next_completed_at(TaskStatus::Completed, Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(next_completed_at(TaskStatus::Pending, None, now), None);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(-0.2), 0.0);
        assert_eq!(clamp_score(f64::NAN), defaults::AI_PRIORITY_SCORE);
        assert_eq!(clamp_score(0.42), 0.42);
    }

    #[test]
    fn test_update_changes_only_touched_fields() {
        let req = UpdateTaskRequest {
            priority: Some(TaskPriority::High),
            ..Default::default()
        };
        let changes = update_changes(&req, None);
        assert_eq!(changes, json!({"priority": "high"}));
    }

    #[test]
    fn test_update_changes_records_cleared_fields() {
        let req = UpdateTaskRequest {
            deadline: Some(None),
            category_id: Some(None),
            ..Default::default()
        };
        let changes = update_changes(&req, None);
        assert_eq!(changes, json!({"deadline": null, "category_id": null}));
    }
}
