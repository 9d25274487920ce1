//! Structured logging schema and field name constants for smart-todo.
//!
//! All crates use these field names for structured `tracing` events so log
//! aggregation can query the same keys across the API, database and
//! inference layers.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, raw model output |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "database", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "gemini", "openai", "ai_client", "tasks"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "analyze_context", "suggest_deadline", "generate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Authenticated user id.
pub const USER_ID: &str = "user_id";

/// Task UUID being operated on.
pub const TASK_ID: &str = "task_id";

/// Context entry UUID being operated on.
pub const CONTEXT_ENTRY_ID: &str = "context_entry_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned or affected.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Whether the default payload was substituted for the model output.
pub const FALLBACK: &str = "fallback";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_unique() {
        let fields = [
            REQUEST_ID,
            SUBSYSTEM,
            COMPONENT,
            OPERATION,
            USER_ID,
            TASK_ID,
            CONTEXT_ENTRY_ID,
            DURATION_MS,
            RESULT_COUNT,
            PROMPT_LEN,
            RESPONSE_LEN,
            POOL_SIZE,
            POOL_IDLE,
            MODEL,
            FALLBACK,
            SUCCESS,
            ERROR_MSG,
        ];
        let unique: std::collections::HashSet<_> = fields.iter().collect();
        assert_eq!(unique.len(), fields.len());
    }

    #[test]
    fn field_names_are_snake_case() {
        for field in [REQUEST_ID, DURATION_MS, CONTEXT_ENTRY_ID, RESPONSE_LEN] {
            assert!(field
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
