//! Task history (audit trail) repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use smart_todo_core::{Error, HistoryAction, Result, TaskHistory, TaskHistoryRepository};

/// Append a history row. Runs on the caller's transaction.
pub(crate) async fn record_history(
    conn: &mut PgConnection,
    task_id: Uuid,
    action: HistoryAction,
    changes: JsonValue,
    ai_suggestions: JsonValue,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO task_history (id, task_id, action, changes, ai_suggestions, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::now_v7())
    .bind(task_id)
    .bind(action.as_str())
    .bind(changes)
    .bind(ai_suggestions)
    .bind(Utc::now())
    .execute(conn)
    .await
    .map_err(Error::Database)?;
    Ok(())
}

fn map_row_to_history(row: &sqlx::postgres::PgRow) -> TaskHistory {
    let action: String = row.get("action");
    TaskHistory {
        id: row.get("id"),
        task_id: row.get("task_id"),
        action: action.parse().unwrap_or(HistoryAction::Updated),
        changes: row.get("changes"),
        ai_suggestions: row.get("ai_suggestions"),
        timestamp: row.get("timestamp"),
    }
}

/// PostgreSQL implementation of TaskHistoryRepository.
pub struct PgTaskHistoryRepository {
    pool: Pool<Postgres>,
}

impl PgTaskHistoryRepository {
    /// Create a new PgTaskHistoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskHistoryRepository for PgTaskHistoryRepository {
    async fn list(
        &self,
        user_id: Uuid,
        task_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TaskHistory>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM task_history h
             JOIN task t ON t.id = h.task_id
             WHERE t.user_id = $1 AND ($2::uuid IS NULL OR h.task_id = $2)",
        )
        .bind(user_id)
        .bind(task_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(
            "SELECT h.id, h.task_id, h.action, h.changes, h.ai_suggestions, h.timestamp
             FROM task_history h
             JOIN task t ON t.id = h.task_id
             WHERE t.user_id = $1 AND ($2::uuid IS NULL OR h.task_id = $2)
             ORDER BY h.timestamp DESC, h.id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(task_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((rows.iter().map(map_row_to_history).collect(), total))
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<TaskHistory>> {
        let row = sqlx::query(
            "SELECT h.id, h.task_id, h.action, h.changes, h.ai_suggestions, h.timestamp
             FROM task_history h
             JOIN task t ON t.id = h.task_id
             WHERE h.id = $1 AND t.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_history))
    }
}
