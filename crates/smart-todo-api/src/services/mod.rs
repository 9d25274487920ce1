//! Service layer for AI-backed workflows shared by several handlers.

pub mod context_processing;
pub mod task_enrichment;

pub use context_processing::ContextProcessor;
pub use task_enrichment::TaskEnricher;

use smart_todo_core::{ContextEntry, ContextEntryRepository, Result};
use smart_todo_db::Database;
use smart_todo_inference::ContextSnippet;
use uuid::Uuid;

/// The user's most recent context entries as prompt snippets.
pub async fn recent_snippets(db: &Database, user_id: Uuid, limit: i64) -> Result<Vec<ContextSnippet>> {
    let entries = db.context.recent(user_id, limit).await?;
    Ok(snippets(&entries))
}

pub fn snippets(entries: &[ContextEntry]) -> Vec<ContextSnippet> {
    entries.iter().map(ContextSnippet::from).collect()
}
