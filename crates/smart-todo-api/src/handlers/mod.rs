//! HTTP handlers for smart-todo-api.

pub mod ai;
pub mod auth;
pub mod context;
pub mod health;
pub mod history;
pub mod insights;
pub mod labels;
pub mod summaries;
pub mod tasks;

use std::str::FromStr;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse an optional enum query value; blank counts as absent.
pub(crate) fn parse_filter<T>(raw: Option<&str>, field: &str) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", field, e))),
    }
}

/// Parse an optional UUID query value; blank counts as absent.
pub(crate) fn parse_uuid_filter(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", field, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_todo_core::TaskStatus;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter::<TaskStatus>(Some("in_progress"), "status").unwrap(),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(parse_filter::<TaskStatus>(Some(" "), "status").unwrap(), None);
        assert_eq!(parse_filter::<TaskStatus>(None, "status").unwrap(), None);

        let err = parse_filter::<TaskStatus>(Some("done"), "status").unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: Invalid task status: done");
    }

    #[test]
    fn test_parse_uuid_filter() {
        let id = Uuid::now_v7();
        assert_eq!(
            parse_uuid_filter(Some(&id.to_string()), "category").unwrap(),
            Some(id)
        );
        assert!(parse_uuid_filter(Some("not-a-uuid"), "category").is_err());
    }
}
