//! Context entry repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use smart_todo_core::{
    ContextAnalysisUpdate, ContextEntry, ContextEntryRepository, CreateContextEntryRequest, Error,
    ListContextEntriesRequest, Result, SourceStat, SourceType, UpdateContextEntryRequest,
};

use crate::escape_like;
use crate::tasks::clamp_page;

const ENTRY_SELECT: &str = r#"
    SELECT e.id, e.user_id, e.source_type, e.content, e.processed_insights, e.keywords,
           e.sentiment_score, e.urgency_indicators, e.original_timestamp, e.created_at,
           e.updated_at, e.is_processed, e.relevance_score,
           ARRAY(SELECT ct.task_id FROM context_entry_task ct
                 WHERE ct.context_entry_id = e.id ORDER BY ct.task_id) AS related_task_ids
    FROM context_entry e
"#;

const DEFAULT_ORDER: &str = "e.created_at DESC";

fn build_order_clause(ordering: Option<&str>) -> String {
    let Some(ordering) = ordering.map(str::trim).filter(|o| !o.is_empty()) else {
        return DEFAULT_ORDER.to_string();
    };
    let (field, direction) = match ordering.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (ordering, "ASC"),
    };
    let column = match field {
        "created_at" => "e.created_at",
        "relevance_score" => "e.relevance_score",
        "sentiment_score" => "e.sentiment_score",
        _ => return DEFAULT_ORDER.to_string(),
    };
    format!("{} {} NULLS LAST, e.created_at DESC", column, direction)
}

fn search_pattern(req: &ListContextEntriesRequest) -> Option<String> {
    req.search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}

fn build_filter_clause(req: &ListContextEntriesRequest) -> (String, usize) {
    let mut clause = String::from("WHERE e.user_id = $1");
    let mut param_idx = 2;

    if req.source_type.is_some() {
        clause.push_str(&format!(" AND e.source_type = ${}", param_idx));
        param_idx += 1;
    }
    if req.is_processed.is_some() {
        clause.push_str(&format!(" AND e.is_processed = ${}", param_idx));
        param_idx += 1;
    }
    if search_pattern(req).is_some() {
        clause.push_str(&format!(
            " AND (e.content ILIKE ${0} ESCAPE '\\' \
             OR EXISTS (SELECT 1 FROM unnest(e.keywords) k WHERE k ILIKE ${0} ESCAPE '\\'))",
            param_idx
        ));
        param_idx += 1;
    }

    (clause, param_idx)
}

macro_rules! bind_entry_filters {
    ($query:expr, $user_id:expr, $req:expr, $pattern:expr) => {{
        let mut q = $query.bind($user_id);
        if let Some(source_type) = &$req.source_type {
            q = q.bind(source_type.as_str());
        }
        if let Some(is_processed) = $req.is_processed {
            q = q.bind(is_processed);
        }
        if let Some(pattern) = &$pattern {
            q = q.bind(pattern.clone());
        }
        q
    }};
}

fn map_row_to_entry(row: &sqlx::postgres::PgRow) -> ContextEntry {
    let source_type: String = row.get("source_type");
    ContextEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        source_type: source_type.parse().unwrap_or_default(),
        content: row.get("content"),
        processed_insights: row.get("processed_insights"),
        keywords: row.get("keywords"),
        sentiment_score: row.get("sentiment_score"),
        urgency_indicators: row.get("urgency_indicators"),
        original_timestamp: row.get("original_timestamp"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        is_processed: row.get("is_processed"),
        relevance_score: row.get("relevance_score"),
        related_task_ids: row.get("related_task_ids"),
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("Content is required".to_string()));
    }
    Ok(())
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// PostgreSQL implementation of ContextEntryRepository.
pub struct PgContextEntryRepository {
    pool: Pool<Postgres>,
}

impl PgContextEntryRepository {
    /// Create a new PgContextEntryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn get_required(&self, user_id: Uuid, id: Uuid) -> Result<ContextEntry> {
        self.get(user_id, id)
            .await?
            .ok_or(Error::ContextEntryNotFound(id))
    }
}

#[async_trait]
impl ContextEntryRepository for PgContextEntryRepository {
    async fn insert(&self, user_id: Uuid, req: CreateContextEntryRequest) -> Result<ContextEntry> {
        validate_content(&req.content)?;
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO context_entry (id, user_id, source_type, content, original_timestamp,
                                        created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)",
        )
        .bind(id)
        .bind(user_id)
        .bind(req.source_type.as_str())
        .bind(&req.content)
        .bind(req.original_timestamp)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "context",
            op = "insert",
            context_entry_id = %id,
            source_type = %req.source_type,
            "Context entry stored"
        );
        self.get_required(user_id, id).await
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<ContextEntry>> {
        let row = sqlx::query(&format!(
            "{} WHERE e.id = $1 AND e.user_id = $2",
            ENTRY_SELECT
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_entry))
    }

    async fn list(
        &self,
        user_id: Uuid,
        req: ListContextEntriesRequest,
    ) -> Result<(Vec<ContextEntry>, i64)> {
        let (where_clause, param_idx) = build_filter_clause(&req);
        let order_clause = build_order_clause(req.ordering.as_deref());
        let pattern = search_pattern(&req);
        let (limit, offset) = clamp_page(req.limit, req.offset);

        let count_sql = format!("SELECT COUNT(*) FROM context_entry e {}", where_clause);
        let total: i64 =
            bind_entry_filters!(sqlx::query_scalar(&count_sql), user_id, req, pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        let list_sql = format!(
            "{} {} ORDER BY {} LIMIT ${} OFFSET ${}",
            ENTRY_SELECT,
            where_clause,
            order_clause,
            param_idx,
            param_idx + 1
        );
        let rows = bind_entry_filters!(sqlx::query(&list_sql), user_id, req, pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok((rows.iter().map(map_row_to_entry).collect(), total))
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateContextEntryRequest,
    ) -> Result<ContextEntry> {
        if let Some(content) = &req.content {
            validate_content(content)?;
        }

        let result = sqlx::query(
            "UPDATE context_entry SET
                source_type = COALESCE($3, source_type),
                content = COALESCE($4, content),
                original_timestamp = CASE WHEN $5 THEN $6 ELSE original_timestamp END,
                updated_at = $7
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(req.source_type.map(|s| s.as_str()))
        .bind(&req.content)
        .bind(req.original_timestamp.is_some())
        .bind(req.original_timestamp.flatten())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ContextEntryNotFound(id));
        }
        self.get_required(user_id, id).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM context_entry WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<ContextEntry>> {
        let rows = sqlx::query(&format!(
            "{} WHERE e.user_id = $1 ORDER BY e.created_at DESC LIMIT $2",
            ENTRY_SELECT
        ))
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_entry).collect())
    }

    async fn created_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ContextEntry>> {
        let rows = sqlx::query(&format!(
            "{} WHERE e.user_id = $1 AND e.created_at >= $2 AND e.created_at < $3
             ORDER BY e.created_at DESC",
            ENTRY_SELECT
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_entry).collect())
    }

    async fn high_relevance(&self, user_id: Uuid, threshold: f64) -> Result<Vec<ContextEntry>> {
        let rows = sqlx::query(&format!(
            "{} WHERE e.user_id = $1 AND e.relevance_score >= $2 ORDER BY e.created_at DESC",
            ENTRY_SELECT
        ))
        .bind(user_id)
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_entry).collect())
    }

    async fn source_stats(&self, user_id: Uuid) -> Result<Vec<SourceStat>> {
        let rows = sqlx::query(
            "SELECT source_type, COUNT(*) AS count FROM context_entry
             WHERE user_id = $1
             GROUP BY source_type
             ORDER BY count DESC, source_type ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| {
                let source_type: String = row.get("source_type");
                SourceStat {
                    source_type: source_type.parse().unwrap_or(SourceType::Manual),
                    count: row.get("count"),
                }
            })
            .collect())
    }

    async fn unprocessed(&self, user_id: Uuid, limit: i64) -> Result<Vec<ContextEntry>> {
        let rows = sqlx::query(&format!(
            "{} WHERE e.user_id = $1 AND NOT e.is_processed ORDER BY e.created_at ASC LIMIT $2",
            ENTRY_SELECT
        ))
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_entry).collect())
    }

    async fn apply_analysis(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: ContextAnalysisUpdate,
    ) -> Result<ContextEntry> {
        let processed_insights = if update.processed_insights.is_null() {
            json!({})
        } else {
            update.processed_insights
        };

        let result = sqlx::query(
            "UPDATE context_entry SET
                processed_insights = $3,
                keywords = $4,
                sentiment_score = $5,
                urgency_indicators = $6,
                relevance_score = $7,
                is_processed = TRUE,
                updated_at = $8
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(processed_insights)
        .bind(&update.keywords)
        .bind(update.sentiment_score)
        .bind(&update.urgency_indicators)
        .bind(clamp_unit(update.relevance_score, 0.0))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ContextEntryNotFound(id));
        }
        self.get_required(user_id, id).await
    }

    async fn link_task(&self, entry_id: Uuid, task_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO context_entry_task (context_entry_id, task_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(entry_id)
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_defaults_newest_first() {
        assert_eq!(build_order_clause(None), "e.created_at DESC");
        assert_eq!(build_order_clause(Some("content")), "e.created_at DESC");
    }

    #[test]
    fn test_order_clause_whitelisted_fields() {
        assert!(build_order_clause(Some("-relevance_score")).starts_with("e.relevance_score DESC"));
        assert!(build_order_clause(Some("sentiment_score")).starts_with("e.sentiment_score ASC"));
    }

    #[test]
    fn test_filter_clause_with_all_filters() {
        let req = ListContextEntriesRequest {
            source_type: Some(SourceType::Email),
            is_processed: Some(false),
            search: Some("invoice".to_string()),
            ..Default::default()
        };
        let (clause, next) = build_filter_clause(&req);
        assert!(clause.contains("e.source_type = $2"));
        assert!(clause.contains("e.is_processed = $3"));
        assert!(clause.contains("e.content ILIKE $4"));
        assert!(clause.contains("unnest(e.keywords)"));
        assert_eq!(next, 5);
    }

    #[test]
    fn test_validate_content() {
        assert!(validate_content("call the bank").is_ok());
        assert!(matches!(
            validate_content("  \n"),
            Err(Error::InvalidInput(msg)) if msg == "Content is required"
        ));
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(2.0, 0.0), 1.0);
        assert_eq!(clamp_unit(f64::INFINITY, 0.3), 0.3);
    }
}
