//! OpenAPI document served to Swagger UI at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use smart_todo_core::{
    Category, ContextEntry, ContextInsight, CreateTaskRequest, DailyContextSummary,
    DashboardStats, HistoryAction, InsightType, LabelRequest, PriorityDistribution,
    SourceStat, SourceType, Tag, Task, TaskHistory, TaskPriority, TaskStatus,
    UpdateContextEntryRequest, UpdateInsightRequest, UpdateLabelRequest, UpdateProfileRequest,
    UpdateTaskRequest, User,
};

use crate::handlers::{ai, auth, context, health, history, insights, labels, summaries, tasks};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Smart Todo API",
        description = "Task management with AI prioritization, deadline suggestions and context analysis"
    ),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags(
        (name = "Auth", description = "Accounts and bearer tokens"),
        (name = "Tasks", description = "Task CRUD, statistics, export and import"),
        (name = "Categories", description = "Shared task categories"),
        (name = "Tags", description = "Shared task tags"),
        (name = "History", description = "Task audit trail"),
        (name = "Context", description = "Captured messages, notes and emails"),
        (name = "Insights", description = "Suggestions extracted from context"),
        (name = "Summaries", description = "Daily context digests"),
        (name = "AI", description = "Direct AI operations"),
        (name = "Health", description = "Dependency reachability")
    ),
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::logout,
        auth::get_profile,
        auth::update_profile,
        tasks::list_tasks,
        tasks::create_task,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::dashboard_stats,
        tasks::priority_distribution,
        tasks::upcoming_deadlines,
        tasks::mark_completed,
        tasks::ai_analyze,
        tasks::export_tasks,
        tasks::import_tasks,
        labels::list_categories,
        labels::create_category,
        labels::get_category,
        labels::update_category,
        labels::delete_category,
        labels::popular_categories,
        labels::list_tags,
        labels::create_tag,
        labels::get_tag,
        labels::update_tag,
        labels::delete_tag,
        labels::popular_tags,
        history::list_history,
        history::get_history,
        context::list_entries,
        context::create_entry,
        context::get_entry,
        context::update_entry,
        context::delete_entry,
        context::today_entries,
        context::high_relevance,
        context::source_stats,
        context::bulk_process,
        context::reprocess,
        insights::list_insights,
        insights::get_insight,
        insights::update_insight,
        insights::delete_insight,
        insights::high_confidence,
        insights::unapplied,
        insights::mark_applied,
        summaries::list_summaries,
        summaries::get_summary,
        summaries::delete_summary,
        summaries::recent_summaries,
        summaries::generate_today_summary,
        ai::analyze_context,
        ai::prioritize_tasks,
        ai::suggest_deadline,
        ai::categorize_task,
        ai::enhance_task,
        ai::daily_summary,
        ai::schedule_suggestions,
        ai::time_blocking,
    ),
    components(schemas(
        User,
        UpdateProfileRequest,
        auth::CredentialsBody,
        auth::TokenResponse,
        Task,
        TaskPriority,
        TaskStatus,
        CreateTaskRequest,
        UpdateTaskRequest,
        tasks::CreateTaskBody,
        tasks::ImportBody,
        tasks::ImportResult,
        DashboardStats,
        PriorityDistribution,
        Category,
        Tag,
        LabelRequest,
        UpdateLabelRequest,
        TaskHistory,
        HistoryAction,
        ContextEntry,
        SourceType,
        SourceStat,
        UpdateContextEntryRequest,
        context::CreateEntryBody,
        context::BulkProcessResult,
        ContextInsight,
        InsightType,
        UpdateInsightRequest,
        DailyContextSummary,
        ai::AnalyzeContextBody,
        ai::TaskTextBody,
        ai::TimeBlockingBody,
        health::HealthStatus,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for prefix in [
            "/health",
            "/api/auth/login",
            "/api/tasks/tasks/{id}",
            "/api/tasks/categories/popular",
            "/api/tasks/history",
            "/api/context/entries/{id}/reprocess",
            "/api/context/insights/high_confidence",
            "/api/context/summaries/generate_today_summary",
            "/api/ai/time-blocking",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == prefix),
                "missing path {prefix}"
            );
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
