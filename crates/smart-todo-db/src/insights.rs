//! Context insight repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use smart_todo_core::{
    ContextInsight, ContextInsightRepository, CreateInsightRequest, Error, InsightType,
    ListInsightsRequest, Result, UpdateInsightRequest,
};

use crate::tasks::clamp_page;

const INSIGHT_SELECT: &str = r#"
    SELECT i.id, i.context_entry_id, e.content AS context_entry_content, i.insight_type,
           i.title, i.description, i.confidence_score, i.suggested_action, i.is_applied,
           i.applied_at, i.created_at
    FROM context_insight i
    JOIN context_entry e ON e.id = i.context_entry_id
"#;

const INSIGHT_ORDER: &str = "i.confidence_score DESC, i.created_at DESC";

fn map_row_to_insight(row: &sqlx::postgres::PgRow) -> ContextInsight {
    let insight_type: String = row.get("insight_type");
    ContextInsight {
        id: row.get("id"),
        context_entry_id: row.get("context_entry_id"),
        context_entry_content: row.get("context_entry_content"),
        insight_type: insight_type.parse().unwrap_or_default(),
        title: row.get("title"),
        description: row.get("description"),
        confidence_score: row.get("confidence_score"),
        suggested_action: row.get("suggested_action"),
        is_applied: row.get("is_applied"),
        applied_at: row.get("applied_at"),
        created_at: row.get("created_at"),
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        smart_todo_core::defaults::NEUTRAL_SCORE
    }
}

/// PostgreSQL implementation of ContextInsightRepository.
pub struct PgContextInsightRepository {
    pool: Pool<Postgres>,
}

impl PgContextInsightRepository {
    /// Create a new PgContextInsightRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn get_required(&self, user_id: Uuid, id: Uuid) -> Result<ContextInsight> {
        self.get(user_id, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("insight {}", id)))
    }
}

#[async_trait]
impl ContextInsightRepository for PgContextInsightRepository {
    async fn insert(&self, req: CreateInsightRequest) -> Result<ContextInsight> {
        let id = Uuid::now_v7();
        let row = sqlx::query(
            "WITH inserted AS (
                 INSERT INTO context_insight (id, context_entry_id, insight_type, title,
                                              description, confidence_score, suggested_action,
                                              created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING *
             )
             SELECT i.id, i.context_entry_id, e.content AS context_entry_content,
                    i.insight_type, i.title, i.description, i.confidence_score,
                    i.suggested_action, i.is_applied, i.applied_at, i.created_at
             FROM inserted i
             JOIN context_entry e ON e.id = i.context_entry_id",
        )
        .bind(id)
        .bind(req.context_entry_id)
        .bind(req.insight_type.as_str())
        .bind(&req.title)
        .bind(&req.description)
        .bind(clamp_confidence(req.confidence_score))
        .bind(&req.suggested_action)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_row_to_insight(&row))
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ContextInsight>> {
        let row = sqlx::query(&format!(
            "{} WHERE i.id = $1 AND e.user_id = $2",
            INSIGHT_SELECT
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_insight))
    }

    async fn list(
        &self,
        user_id: Uuid,
        req: ListInsightsRequest,
    ) -> Result<(Vec<ContextInsight>, i64)> {
        let (limit, offset) = clamp_page(req.limit, req.offset);
        let insight_type: Option<&str> = req.insight_type.as_ref().map(InsightType::as_str);

        let filter = "WHERE e.user_id = $1
                        AND ($2::text IS NULL OR i.insight_type = $2)
                        AND ($3::boolean IS NULL OR i.is_applied = $3)
                        AND ($4::double precision IS NULL OR i.confidence_score >= $4)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM context_insight i
             JOIN context_entry e ON e.id = i.context_entry_id {}",
            filter
        ))
        .bind(user_id)
        .bind(insight_type)
        .bind(req.is_applied)
        .bind(req.min_confidence)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "{} {} ORDER BY {} LIMIT $5 OFFSET $6",
            INSIGHT_SELECT, filter, INSIGHT_ORDER
        ))
        .bind(user_id)
        .bind(insight_type)
        .bind(req.is_applied)
        .bind(req.min_confidence)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((rows.iter().map(map_row_to_insight).collect(), total))
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateInsightRequest,
    ) -> Result<ContextInsight> {
        let result = sqlx::query(
            "UPDATE context_insight i SET
                insight_type = COALESCE($3, i.insight_type),
                title = COALESCE($4, i.title),
                description = COALESCE($5, i.description),
                confidence_score = COALESCE($6, i.confidence_score),
                suggested_action = COALESCE($7, i.suggested_action),
                is_applied = COALESCE($8, i.is_applied),
                applied_at = CASE
                    WHEN $8 IS TRUE AND i.applied_at IS NULL THEN NOW()
                    WHEN $8 IS FALSE THEN NULL
                    ELSE i.applied_at
                END
             FROM context_entry e
             WHERE i.id = $1 AND e.id = i.context_entry_id AND e.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(req.insight_type.as_ref().map(InsightType::as_str))
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.confidence_score.map(clamp_confidence))
        .bind(&req.suggested_action)
        .bind(req.is_applied)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("insight {}", id)));
        }
        self.get_required(user_id, id).await
    }

    async fn mark_applied(&self, user_id: Uuid, id: Uuid) -> Result<ContextInsight> {
        let result = sqlx::query(
            "UPDATE context_insight i SET is_applied = TRUE, applied_at = $3
             FROM context_entry e
             WHERE i.id = $1 AND e.id = i.context_entry_id AND e.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("insight {}", id)));
        }
        self.get_required(user_id, id).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM context_insight i USING context_entry e
             WHERE i.id = $1 AND e.id = i.context_entry_id AND e.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(0.95), 0.95);
        assert_eq!(clamp_confidence(95.0), 1.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.5);
    }
}
