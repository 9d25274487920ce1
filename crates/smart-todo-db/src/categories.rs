//! Category repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use smart_todo_core::{
    defaults, Category, CategoryRepository, Error, LabelRequest, Result, UpdateLabelRequest,
};

use crate::tags::{validate_color, validate_label_name};

const CATEGORY_COLUMNS: &str = "id, name, color, usage_frequency, created_at";

fn map_row_to_category(row: &sqlx::postgres::PgRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
        usage_frequency: row.get("usage_frequency"),
        created_at: row.get("created_at"),
    }
}

/// Bump `usage_frequency` after a task referencing the category is saved.
pub(crate) async fn bump_category_usage(
    conn: &mut PgConnection,
    category_id: Option<Uuid>,
) -> Result<()> {
    if let Some(id) = category_id {
        sqlx::query("UPDATE category SET usage_frequency = usage_frequency + 1 WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(Error::Database)?;
    }
    Ok(())
}

/// Fail with `InvalidInput` unless the category exists.
pub(crate) async fn ensure_category_exists(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM category WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(Error::Database)?;
    if exists {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Unknown category: {}", id)))
    }
}

/// Look up a category by exact name or create it with the default color.
pub(crate) async fn get_or_create_category(conn: &mut PgConnection, name: &str) -> Result<Category> {
    let name = validate_label_name(name, defaults::CATEGORY_NAME_MAX_LENGTH)
        .map_err(Error::InvalidInput)?;

    // Insert-or-touch so concurrent callers all get the row back.
    let row = sqlx::query(&format!(
        "INSERT INTO category (id, name, color, created_at) VALUES ($1, $2, $3, $4)
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
         RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(Uuid::now_v7())
    .bind(&name)
    .bind(defaults::CATEGORY_COLOR)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(Error::Database)?;

    debug!(
        subsystem = "database",
        component = "categories",
        op = "get_or_create",
        name = %name,
        "Resolved category"
    );
    Ok(map_row_to_category(&row))
}

fn map_label_error(e: sqlx::Error, name: &str) -> Error {
    let err = Error::Database(e);
    if err.is_unique_violation() {
        Error::Conflict(format!("Category '{}' already exists", name))
    } else {
        err
    }
}

/// PostgreSQL implementation of CategoryRepository.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, req: LabelRequest) -> Result<Category> {
        let name = validate_label_name(&req.name, defaults::CATEGORY_NAME_MAX_LENGTH)
            .map_err(Error::InvalidInput)?;
        let color = req
            .color
            .unwrap_or_else(|| defaults::CATEGORY_COLOR.to_string());
        validate_color(&color).map_err(Error::InvalidInput)?;

        let row = sqlx::query(&format!(
            "INSERT INTO category (id, name, color, created_at) VALUES ($1, $2, $3, $4)
             RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(&name)
        .bind(&color)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_label_error(e, &name))?;

        Ok(map_row_to_category(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM category WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_row_to_category))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM category ORDER BY usage_frequency DESC, name ASC",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_category).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateLabelRequest) -> Result<Category> {
        let name = req
            .name
            .as_deref()
            .map(|n| validate_label_name(n, defaults::CATEGORY_NAME_MAX_LENGTH))
            .transpose()
            .map_err(Error::InvalidInput)?;
        if let Some(color) = &req.color {
            validate_color(color).map_err(Error::InvalidInput)?;
        }

        let row = sqlx::query(&format!(
            "UPDATE category SET name = COALESCE($2, name), color = COALESCE($3, color)
             WHERE id = $1
             RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(&name)
        .bind(&req.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_label_error(e, name.as_deref().unwrap_or_default()))?;

        row.as_ref()
            .map(map_row_to_category)
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn popular(&self, limit: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM category
             WHERE usage_frequency > 0
             ORDER BY usage_frequency DESC, name ASC
             LIMIT $1",
            CATEGORY_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_row_to_category).collect())
    }

    async fn get_or_create(&self, name: &str) -> Result<Category> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        get_or_create_category(&mut *conn, name).await
    }

    async fn names(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM category ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(names)
    }
}
