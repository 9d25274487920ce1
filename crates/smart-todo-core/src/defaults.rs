//! Centralized default constants for smart-todo.
//!
//! Shared default values live here so the API, repositories and the AI
//! client agree on thresholds, limits and fallbacks. Organized by domain
//! area.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const PAGE_LIMIT: i64 = 50;

/// Hard upper bound on a requested page size.
pub const PAGE_LIMIT_MAX: i64 = 500;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes (10 MB, enough for JSON imports).
pub const MAX_BODY_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Default allowed CORS origins (local frontend dev servers).
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

// =============================================================================
// AUTH
// =============================================================================

/// Prefix of issued bearer tokens.
pub const TOKEN_PREFIX: &str = "st_tok_";

/// Number of random characters after the token prefix.
pub const TOKEN_RANDOM_LEN: usize = 48;

// =============================================================================
// TASKS
// =============================================================================

/// Maximum task title length.
pub const TASK_TITLE_MAX_LENGTH: usize = 200;

/// Neutral AI priority score given to new tasks.
pub const AI_PRIORITY_SCORE: f64 = 0.5;

/// Window for the upcoming-deadlines view, in days.
pub const UPCOMING_DEADLINE_DAYS: i64 = 7;

/// Number of recent context entries fed to task-level AI operations.
pub const TASK_CONTEXT_ENTRIES: i64 = 5;

/// Number of recent context entries fed to prioritization and scheduling.
pub const SCHEDULING_CONTEXT_ENTRIES: i64 = 10;

/// Number of open tasks considered for time blocking.
pub const TIME_BLOCK_TASK_LIMIT: i64 = 10;

/// Default available hours for time blocking.
pub const AVAILABLE_HOURS: u32 = 8;

// =============================================================================
// CATEGORIES & TAGS
// =============================================================================

/// Default category color.
pub const CATEGORY_COLOR: &str = "#3B82F6";

/// Default tag color.
pub const TAG_COLOR: &str = "#6B7280";

/// Maximum category name length.
pub const CATEGORY_NAME_MAX_LENGTH: usize = 100;

/// Maximum tag name length.
pub const TAG_NAME_MAX_LENGTH: usize = 50;

/// Number of categories returned by the popular view.
pub const POPULAR_CATEGORIES_LIMIT: i64 = 10;

/// Number of tags returned by the popular view.
pub const POPULAR_TAGS_LIMIT: i64 = 20;

// =============================================================================
// CONTEXT
// =============================================================================

/// Relevance threshold for the high-relevance view.
pub const HIGH_RELEVANCE_THRESHOLD: f64 = 0.7;

/// Confidence threshold for the high-confidence insights view.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Maximum entries analysed per bulk-process call.
pub const BULK_PROCESS_LIMIT: i64 = 10;

/// Window for the recent-summaries view, in days.
pub const RECENT_SUMMARY_DAYS: i64 = 7;

/// Words whose presence in an entry counts as a deadline mention.
pub const DEADLINE_KEYWORDS: &[&str] = &["deadline", "due", "by"];

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini REST endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini generation model.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default OpenAI-compatible endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI-compatible generation model.
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Timeout for backend health checks in seconds.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Characters of each context entry quoted in prompts.
pub const PROMPT_SNIPPET_CHARS: usize = 100;

/// Context entries quoted in the prioritization prompt.
pub const PRIORITIZE_CONTEXT_ENTRIES: usize = 5;

/// Context entries quoted in the deadline and enhancement prompts.
pub const TASK_PROMPT_CONTEXT_ENTRIES: usize = 3;

/// Score used wherever the model gave no usable number.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Maximum tasks placed in a fallback schedule.
pub const FALLBACK_SCHEDULE_TASKS: usize = 8;

/// First hour of the working day used by fallback schedules.
pub const WORKDAY_START_HOUR: u32 = 9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_probabilities() {
        for v in [
            AI_PRIORITY_SCORE,
            HIGH_RELEVANCE_THRESHOLD,
            HIGH_CONFIDENCE_THRESHOLD,
            NEUTRAL_SCORE,
        ] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn page_limits_are_ordered() {
        assert!(PAGE_LIMIT > 0);
        assert!(PAGE_LIMIT <= PAGE_LIMIT_MAX);
    }

    #[test]
    fn default_colors_are_hex() {
        for color in [CATEGORY_COLOR, TAG_COLOR] {
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
