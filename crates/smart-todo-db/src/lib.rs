//! # smart-todo-db
//!
//! PostgreSQL database layer for smart-todo.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, tasks, labels, history,
//!   context entries, insights and daily summaries
//! - Argon2id password hashing and opaque bearer tokens
//! - Embedded schema migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use smart_todo_db::{Database, TaskRepository, CreateTaskRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/smart_todo").await?;
//!
//!     let task = db.tasks.insert(user_id, CreateTaskRequest {
//!         title: "Renew passport".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created task: {}", task.id);
//!     Ok(())
//! }
//! ```
pub mod categories;
pub mod context;
pub mod history;
pub mod insights;
pub mod password;
pub mod pool;
pub mod summaries;
pub mod tags;
pub mod tasks;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use smart_todo_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use categories::PgCategoryRepository;
pub use context::PgContextEntryRepository;
pub use history::PgTaskHistoryRepository;
pub use insights::PgContextInsightRepository;
pub use password::{hash_password, verify_password};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig, PoolStats};
pub use summaries::PgDailySummaryRepository;
pub use tags::PgTagRepository;
pub use tasks::PgTaskRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Accounts and bearer tokens.
    pub users: PgUserRepository,
    /// Tasks, scoped per user.
    pub tasks: PgTaskRepository,
    /// Shared categories.
    pub categories: PgCategoryRepository,
    /// Shared tags.
    pub tags: PgTagRepository,
    /// Task audit trail.
    pub history: PgTaskHistoryRepository,
    /// Captured context entries.
    pub context: PgContextEntryRepository,
    /// Insights extracted from context entries.
    pub insights: PgContextInsightRepository,
    /// Daily context summaries.
    pub summaries: PgDailySummaryRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            tasks: PgTaskRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            history: PgTaskHistoryRepository::new(pool.clone()),
            context: PgContextEntryRepository::new(pool.clone()),
            insights: PgContextInsightRepository::new(pool.clone()),
            summaries: PgDailySummaryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
