//! Task export as CSV or JSON attachments.

use axum::http::header;
use axum::response::{IntoResponse, Response};

use smart_todo_core::{Error, Task};

use crate::error::ApiError;

pub const CSV_HEADER: [&str; 7] = [
    "Title",
    "Description",
    "Status",
    "Priority",
    "Category",
    "Deadline",
    "Created",
];

/// Output formats accepted by `export_tasks?format=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    #[default]
    Json,
}

impl ExportFormat {
    /// Anything other than `csv` exports JSON.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

fn csv_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(Error::Serialization(format!("CSV export failed: {}", e)))
}

/// Header row plus one CRLF-terminated row per task.
pub fn tasks_to_csv(tasks: &[Task]) -> Result<String, ApiError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for task in tasks {
        let deadline = task
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let created = task.created_at.format("%Y-%m-%d %H:%M").to_string();
        writer
            .write_record([
                task.title.as_str(),
                task.description.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.category_name.as_deref().unwrap_or_default(),
                deadline.as_str(),
                created.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

fn attachment(body: String, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Render tasks as a downloadable attachment.
pub fn export_response(tasks: &[Task], format: ExportFormat) -> Result<Response, ApiError> {
    match format {
        ExportFormat::Csv => Ok(attachment(
            tasks_to_csv(tasks)?,
            "text/csv; charset=utf-8",
            "tasks.csv",
        )),
        ExportFormat::Json => {
            let body = serde_json::to_string_pretty(tasks)
                .map_err(|e| ApiError::Internal(e.into()))?;
            Ok(attachment(body, "application/json", "tasks.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use smart_todo_core::{TaskPriority, TaskStatus};
    use uuid::Uuid;

    fn sample_task() -> Task {
        let created = Utc.with_ymd_and_hms(2026, 3, 4, 9, 30, 0).unwrap();
        Task {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            title: "Write report, part 1".to_string(),
            description: "Say \"hello\"\nthen leave".to_string(),
            ai_enhanced_description: String::new(),
            priority: TaskPriority::High,
            ai_priority_score: 0.5,
            ai_priority_reasoning: String::new(),
            status: TaskStatus::InProgress,
            category_id: None,
            category_name: Some("Work".to_string()),
            tags: vec![],
            deadline: Some(Utc.with_ymd_and_hms(2026, 3, 10, 17, 0, 0).unwrap()),
            ai_suggested_deadline: None,
            estimated_duration_minutes: None,
            created_at: created,
            updated_at: created,
            completed_at: None,
            context_used: json!({}),
            ai_insights: json!({}),
        }
    }

    #[test]
    fn test_tasks_to_csv() {
        let csv = tasks_to_csv(&[sample_task()]).unwrap();
        let mut lines = csv.split("\r\n");
        assert_eq!(
            lines.next().unwrap(),
            "Title,Description,Status,Priority,Category,Deadline,Created"
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"Write report, part 1\",\"Say \"\"hello\"\"\nthen leave\",in_progress,high,Work,2026-03-10,2026-03-04 09:30"
        );
    }

    #[test]
    fn test_empty_optional_columns() {
        let mut task = sample_task();
        task.category_name = None;
        task.deadline = None;
        task.title = "T".to_string();
        task.description = String::new();
        let csv = tasks_to_csv(&[task]).unwrap();
        assert!(csv.ends_with("T,,in_progress,high,,,2026-03-04 09:30\r\n"));
    }

    #[test]
    fn test_csv_quotes_leading_quote_and_carriage_return() {
        let mut task = sample_task();
        task.title = "\"Quoted\" start".to_string();
        task.description = "line\rbreak".to_string();
        task.category_name = None;
        task.deadline = None;
        let csv = tasks_to_csv(&[task]).unwrap();
        assert!(csv.contains("\"\"\"Quoted\"\" start\",\"line\rbreak\",in_progress"));
    }

    #[test]
    fn test_no_tasks_yields_header_only() {
        let csv = tasks_to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "Title,Description,Status,Priority,Category,Deadline,Created\r\n"
        );
    }

    #[test]
    fn test_format_from_query() {
        assert_eq!(ExportFormat::from_query(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_query(Some("json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_query(Some("xml")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_query(None), ExportFormat::Json);
    }

    #[test]
    fn test_export_response_headers() {
        let response = export_response(&[sample_task()], ExportFormat::Csv).unwrap();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"tasks.csv\"");

        let response = export_response(&[], ExportFormat::Json).unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
