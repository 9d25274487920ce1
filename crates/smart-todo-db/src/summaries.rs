//! Daily context summary repository implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use smart_todo_core::{
    CreateDailySummaryRequest, DailyContextSummary, DailySummaryRepository, Error, Result,
};

const SUMMARY_COLUMNS: &str = "id, user_id, date, total_entries, high_priority_indicators, \
    new_task_suggestions, deadline_mentions, summary_text, key_themes, priority_areas, \
    recommended_actions, schedule_suggestions, created_at, updated_at";

fn map_row_to_summary(row: &sqlx::postgres::PgRow) -> DailyContextSummary {
    DailyContextSummary {
        id: row.get("id"),
        user_id: row.get("user_id"),
        date: row.get("date"),
        total_entries: row.get("total_entries"),
        high_priority_indicators: row.get("high_priority_indicators"),
        new_task_suggestions: row.get("new_task_suggestions"),
        deadline_mentions: row.get("deadline_mentions"),
        summary_text: row.get("summary_text"),
        key_themes: row.get("key_themes"),
        priority_areas: row.get("priority_areas"),
        recommended_actions: row.get("recommended_actions"),
        schedule_suggestions: row.get("schedule_suggestions"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL implementation of DailySummaryRepository.
pub struct PgDailySummaryRepository {
    pool: Pool<Postgres>,
}

impl PgDailySummaryRepository {
    /// Create a new PgDailySummaryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailySummaryRepository for PgDailySummaryRepository {
    async fn insert(&self, req: CreateDailySummaryRequest) -> Result<DailyContextSummary> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO daily_context_summary (
                 id, user_id, date, total_entries, high_priority_indicators,
                 new_task_suggestions, deadline_mentions, summary_text, key_themes,
                 priority_areas, recommended_actions, schedule_suggestions,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
             ON CONFLICT (user_id, date) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(req.user_id)
        .bind(req.date)
        .bind(req.total_entries)
        .bind(req.high_priority_indicators)
        .bind(req.new_task_suggestions)
        .bind(req.deadline_mentions)
        .bind(&req.summary_text)
        .bind(&req.key_themes)
        .bind(&req.priority_areas)
        .bind(&req.recommended_actions)
        .bind(&req.schedule_suggestions)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        // A concurrent insert for the same day wins; return whichever row exists.
        self.get_for_date(req.user_id, req.date)
            .await?
            .ok_or_else(|| Error::Internal(format!("summary for {} vanished", req.date)))
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<DailyContextSummary>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_context_summary WHERE id = $1 AND user_id = $2",
            SUMMARY_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_summary))
    }

    async fn get_for_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailyContextSummary>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_context_summary WHERE user_id = $1 AND date = $2",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_summary))
    }

    async fn list(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DailyContextSummary>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM daily_context_summary WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM daily_context_summary WHERE user_id = $1
             ORDER BY date DESC LIMIT $2 OFFSET $3",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((rows.iter().map(map_row_to_summary).collect(), total))
    }

    async fn since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<DailyContextSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM daily_context_summary WHERE user_id = $1 AND date >= $2
             ORDER BY date DESC",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_summary).collect())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM daily_context_summary WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
