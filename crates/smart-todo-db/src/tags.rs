//! Tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use smart_todo_core::{
    defaults, Error, LabelRequest, Result, Tag, TagRepository, UpdateLabelRequest,
};

/// Validate a label (category or tag) name.
///
/// Rules:
/// - Not blank after trimming
/// - At most `max_len` characters
pub fn validate_label_name(name: &str, max_len: usize) -> std::result::Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("Name must be {} characters or less", max_len));
    }
    Ok(trimmed.to_string())
}

/// Validate a `#RRGGBB` color.
pub fn validate_color(color: &str) -> std::result::Result<(), String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid color '{}': expected #RRGGBB", color))
    }
}

pub(crate) fn map_row_to_tag(row: &sqlx::postgres::PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
        usage_count: row.get("usage_count"),
        created_at: row.get("created_at"),
    }
}

/// Link tags to a task and bump `usage_count` for each new link.
///
/// Unknown tag ids are ignored. Runs on the caller's transaction.
pub(crate) async fn link_tags(
    conn: &mut PgConnection,
    task_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "WITH linked AS (
             INSERT INTO task_tag (task_id, tag_id)
             SELECT $1, id FROM tag WHERE id = ANY($2)
             ON CONFLICT DO NOTHING
             RETURNING tag_id
         )
         UPDATE tag SET usage_count = usage_count + 1
         WHERE id IN (SELECT tag_id FROM linked)",
    )
    .bind(task_id)
    .bind(tag_ids)
    .execute(conn)
    .await
    .map_err(Error::Database)?;
    Ok(())
}

/// PostgreSQL implementation of TagRepository.
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_label_error(e: sqlx::Error, name: &str) -> Error {
    let err = Error::Database(e);
    if err.is_unique_violation() {
        Error::Conflict(format!("Tag '{}' already exists", name))
    } else {
        err
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn create(&self, req: LabelRequest) -> Result<Tag> {
        let name =
            validate_label_name(&req.name, defaults::TAG_NAME_MAX_LENGTH).map_err(Error::InvalidInput)?;
        let color = req.color.unwrap_or_else(|| defaults::TAG_COLOR.to_string());
        validate_color(&color).map_err(Error::InvalidInput)?;

        let row = sqlx::query(
            "INSERT INTO tag (id, name, color, created_at) VALUES ($1, $2, $3, $4)
             RETURNING id, name, color, usage_count, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(&name)
        .bind(&color)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_label_error(e, &name))?;

        Ok(map_row_to_tag(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, name, color, usage_count, created_at FROM tag WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_tag))
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, name, color, usage_count, created_at FROM tag
             ORDER BY usage_count DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_tag).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateLabelRequest) -> Result<Tag> {
        let name = req
            .name
            .as_deref()
            .map(|n| validate_label_name(n, defaults::TAG_NAME_MAX_LENGTH))
            .transpose()
            .map_err(Error::InvalidInput)?;
        if let Some(color) = &req.color {
            validate_color(color).map_err(Error::InvalidInput)?;
        }

        let row = sqlx::query(
            "UPDATE tag SET name = COALESCE($2, name), color = COALESCE($3, color)
             WHERE id = $1
             RETURNING id, name, color, usage_count, created_at",
        )
        .bind(id)
        .bind(&name)
        .bind(&req.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_label_error(e, name.as_deref().unwrap_or_default()))?;

        row.as_ref()
            .map(map_row_to_tag)
            .ok_or_else(|| Error::NotFound(format!("tag {}", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tag WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn popular(&self, limit: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, name, color, usage_count, created_at FROM tag
             WHERE usage_count > 0
             ORDER BY usage_count DESC, name ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_tag).collect())
    }
}
