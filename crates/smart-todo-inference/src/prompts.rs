//! Prompt templates for the AI operations.
//!
//! Every template that deals with time embeds the current UTC timestamp so
//! the model can reason about deadlines. Each template ends with the JSON
//! shape the matching payload in [`crate::responses`] deserializes.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use smart_todo_core::defaults::{
    PRIORITIZE_CONTEXT_ENTRIES, PROMPT_SNIPPET_CHARS, TASK_PROMPT_CONTEXT_ENTRIES,
};
use smart_todo_core::{ContextEntry, SourceType, Task, TaskPriority, TaskStatus};

// =============================================================================
// PROMPT INPUTS
// =============================================================================

/// The parts of a context entry quoted in prompts.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnippet {
    pub content: String,
    pub source_type: SourceType,
    pub created_at: DateTime<Utc>,
}

impl From<&ContextEntry> for ContextSnippet {
    fn from(entry: &ContextEntry) -> Self {
        Self {
            content: entry.content.clone(),
            source_type: entry.source_type,
            created_at: entry.created_at,
        }
    }
}

/// The parts of a task quoted in prompts.
#[derive(Debug, Clone, Serialize)]
pub struct TaskBrief {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    /// Estimated effort in hours; 1 when unknown.
    pub estimated_duration: f64,
    pub ai_priority_score: f64,
}

impl From<&Task> for TaskBrief {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            status: task.status,
            category: task.category_name.clone(),
            deadline: task.deadline,
            estimated_duration: task
                .estimated_duration_minutes
                .map(|m| f64::from(m) / 60.0)
                .unwrap_or(1.0),
            ai_priority_score: task.ai_priority_score,
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn iso_z(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// First `PROMPT_SNIPPET_CHARS` characters, on a char boundary.
fn snippet(text: &str) -> String {
    text.chars().take(PROMPT_SNIPPET_CHARS).collect()
}

/// Bullet list of the last `n` entries, each cut to a snippet.
fn context_lines(context: &[ContextSnippet], n: usize) -> String {
    let skip = context.len().saturating_sub(n);
    context[skip..]
        .iter()
        .map(|c| format!("- {}", snippet(&c.content)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// Context analysis: keywords, sentiment, urgency, classification,
/// insights and suggested tasks.
pub fn analyze_context(now: DateTime<Utc>, content: &str, source_type: SourceType) -> String {
    let shape = json!({
        "keywords": ["relevant", "keywords"],
        "sentiment_analysis": {
            "overall_sentiment": "positive|negative|neutral",
            "sentiment_score": 0.5,
            "emotional_indicators": ["stressed", "excited", "calm"],
            "confidence": 0.9
        },
        "urgency_analysis": {
            "urgency_level": "low|medium|high|critical",
            "urgency_score": 0.7,
            "urgency_indicators": ["asap", "deadline", "today"],
            "time_sensitivity": "immediate|today|this_week|flexible"
        },
        "context_classification": {
            "primary_category": "work|personal|health|finance|social|education",
            "subcategories": ["meeting", "project", "appointment"],
            "relevance_score": 0.8
        },
        "task_extraction": {
            "potential_tasks": [{
                "title": "Extracted task title",
                "description": "Task description",
                "priority": "low|medium|high|urgent",
                "category": "suggested category",
                "deadline": iso_z(now + Duration::days(1)),
                "confidence": 0.8
            }]
        },
        "insights": [{
            "type": "deadline|priority|category|task_creation|schedule|reminder|pattern",
            "title": "Short insight title",
            "description": "What was noticed and why it matters",
            "confidence": 0.9,
            "impact": "high|medium|low",
            "suggested_action": {
                "action_type": "create_task|update_priority|set_deadline|schedule_reminder",
                "details": "Concrete next step",
                "parameters": {}
            }
        }],
        "task_suggestions": [{
            "title": "Suggested task title",
            "description": "Task description",
            "priority": "high|medium|low",
            "category": "suggested category",
            "deadline": "ISO 8601 timestamp or null"
        }]
    });

    format!(
        "CURRENT DATE AND TIME: {now} UTC (reference point for anything time-sensitive)\n\n\
         Analyse the following {source} content for task management.\n\n\
         Content: \"{content}\"\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}\n\n\
         Focus on:\n\
         1. Deadlines, meetings and appointments\n\
         2. Urgency and priority signals\n\
         3. Actionable tasks\n\
         4. Overall context and sentiment\n\
         5. Fitting categories",
        now = timestamp(now),
        source = source_type,
        content = content,
        shape = shape,
    )
}

/// Rank open tasks in light of recent context.
pub fn prioritize_tasks(
    now: DateTime<Utc>,
    tasks: &[TaskBrief],
    context: &[ContextSnippet],
) -> String {
    let task_lines = tasks
        .iter()
        .map(|t| format!("- [{}] {}: {}", t.id, t.title, snippet(&t.description)))
        .collect::<Vec<_>>()
        .join("\n");

    let shape = json!({
        "prioritized_tasks": [{
            "task_id": "id shown in brackets",
            "priority_score": 0.95,
            "priority_level": "urgent|high|medium|low",
            "reasoning": "Why this priority was assigned",
            "suggested_deadline": "ISO 8601 timestamp or null",
            "estimated_duration": "2 hours",
            "dependencies": ["titles of tasks this depends on"]
        }],
        "overall_insights": "Observations about the workload as a whole"
    });

    format!(
        "CURRENT DATE AND TIME: {now} UTC (use it to judge deadline urgency)\n\n\
         Prioritise the following tasks using the recent context.\n\n\
         Recent Context:\n{context}\n\n\
         Tasks to prioritise:\n{tasks}\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}\n\n\
         Consider:\n\
         1. Deadlines mentioned in the context\n\
         2. Urgency signals\n\
         3. Dependencies between tasks\n\
         4. Workload balance\n\
         5. Relevance to the context",
        now = timestamp(now),
        context = context_lines(context, PRIORITIZE_CONTEXT_ENTRIES),
        tasks = task_lines,
        shape = shape,
    )
}

/// Propose a realistic deadline for one task.
pub fn suggest_deadline(
    now: DateTime<Utc>,
    title: &str,
    description: &str,
    context: &[ContextSnippet],
) -> String {
    let shape = json!({
        "suggested_deadline": iso_z(now + Duration::hours(2)),
        "reasoning": "Why this deadline makes sense from the current time",
        "estimated_duration": "2 hours",
        "complexity_score": 0.7,
        "alternative_deadlines": [{
            "deadline": iso_z(now + Duration::days(1)),
            "scenario": "If more time is needed"
        }]
    });

    format!(
        "CURRENT DATE AND TIME: {now} UTC (reference point for every suggestion)\n\n\
         Suggest a realistic deadline for this task.\n\n\
         Task: {title}\n\
         Description: {description}\n\n\
         Recent Context:\n{context}\n\n\
         Respond with a single JSON object shaped like this, using dates after {today}:\n{shape:#}\n\n\
         Every suggested deadline must be later than {now} UTC.\n\n\
         Consider:\n\
         1. The current date and time\n\
         2. How complex the task is\n\
         3. Deadlines mentioned in the context\n\
         4. Realistic effort estimates\n\
         5. Buffer for surprises",
        now = timestamp(now),
        today = now.format("%Y-%m-%d"),
        title = title,
        description = description,
        context = context_lines(context, TASK_PROMPT_CONTEXT_ENTRIES),
        shape = shape,
    )
}

/// Pick a category and tags, preferring existing categories.
pub fn categorize_task(title: &str, description: &str, existing_categories: &[String]) -> String {
    let shape = json!({
        "suggested_category": "Work|Personal|Health|Finance|Learning|Shopping|...",
        "confidence": 0.9,
        "alternative_categories": ["category1", "category2"],
        "suggested_tags": ["tag1", "tag2", "tag3"],
        "reasoning": "Why these were chosen"
    });

    format!(
        "Categorise the following task and suggest tags.\n\n\
         Task: {title}\n\
         Description: {description}\n\n\
         Existing Categories: {existing}\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}\n\n\
         Prefer an existing category when the task fits one; otherwise propose a new one.",
        title = title,
        description = description,
        existing = existing_categories.join(", "),
        shape = shape,
    )
}

/// Rewrite a task description to be specific and actionable.
pub fn enhance_task(
    now: DateTime<Utc>,
    title: &str,
    description: &str,
    context: &[ContextSnippet],
) -> String {
    let shape = json!({
        "enhanced_description": "Sharper description that reflects the context and timing",
        "added_details": ["detail1", "detail2"],
        "suggested_subtasks": [{
            "title": "Subtask title",
            "description": "Subtask description"
        }],
        "resources_needed": ["resource1"],
        "potential_blockers": ["blocker1"]
    });

    format!(
        "CURRENT DATE AND TIME: {now} UTC\n\n\
         Improve the following task description using the relevant context.\n\n\
         Task: {title}\n\
         Current Description: {description}\n\n\
         Relevant Context:\n{context}\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}\n\n\
         Keep it concise but make it actionable and specific to the current time.",
        now = timestamp(now),
        title = title,
        description = description,
        context = context_lines(context, TASK_PROMPT_CONTEXT_ENTRIES),
        shape = shape,
    )
}

/// Summarise today's context and open tasks.
pub fn daily_summary(context: &[ContextSnippet], tasks: &[TaskBrief]) -> String {
    let shape = json!({
        "summary": "Short summary of the day's context and tasks",
        "key_themes": ["theme1", "theme2"],
        "priority_areas": ["area1", "area2"],
        "recommendations": [{
            "type": "task_creation|priority_adjustment|schedule_change",
            "title": "Recommendation title",
            "description": "What to do and why",
            "urgency": "high|medium|low"
        }],
        "schedule_suggestions": [{
            "time_slot": "09:00-10:00",
            "activity": "Suggested activity",
            "reasoning": "Why this slot"
        }]
    });

    format!(
        "Write a daily summary with recommendations.\n\n\
         Today's Context:\n{context}\n\n\
         Current Tasks:\n{tasks}\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}",
        context = context_lines(context, context.len()),
        tasks = tasks
            .iter()
            .map(|t| format!("- {}", t.title))
            .collect::<Vec<_>>()
            .join("\n"),
        shape = shape,
    )
}

/// Lay open tasks out over a working day.
pub fn schedule_suggestions(tasks: &[TaskBrief], context: &[ContextSnippet]) -> String {
    let shape = json!({
        "schedule": [{
            "time_slot": "09:00-10:30",
            "task_id": "task id",
            "task_title": "Task title",
            "duration": 90,
            "priority": "high",
            "reasoning": "Why this slot suits the task",
            "energy_level": "high|medium|low",
            "focus_required": "high|medium|low"
        }],
        "schedule_insights": {
            "total_scheduled_hours": 6.5,
            "high_priority_tasks": 3,
            "optimal_productivity_windows": ["09:00-11:00", "14:00-16:00"],
            "break_suggestions": ["11:00-11:15", "15:00-15:15"]
        },
        "recommendations": [{
            "type": "scheduling|productivity|break",
            "title": "Recommendation title",
            "description": "What to do and why"
        }]
    });

    format!(
        "Build an effective daily schedule from these tasks and context.\n\n\
         Tasks: {tasks}\n\
         Context: {context}\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}",
        tasks = pretty(&tasks),
        context = pretty(&context),
        shape = shape,
    )
}

/// Group tasks into time blocks that fit the available hours.
pub fn time_blocks(tasks: &[TaskBrief], available_hours: u32) -> String {
    let shape = json!({
        "time_blocks": [{
            "block_name": "Deep Work Block 1",
            "start_time": "09:00",
            "end_time": "11:00",
            "duration": 120,
            "tasks": [{
                "task_id": "task id",
                "task_title": "Task title",
                "allocated_time": 90,
                "priority": "high"
            }],
            "block_type": "deep_work|admin|creative|communication",
            "energy_requirement": "high|medium|low",
            "break_after": 15
        }],
        "blocking_strategy": {
            "total_blocks": 4,
            "deep_work_blocks": 2,
            "admin_blocks": 1,
            "buffer_time": 30,
            "break_time": 45
        },
        "productivity_tips": [
            "Schedule high-priority tasks during peak energy hours",
            "Group similar tasks together",
            "Leave buffer time between blocks"
        ]
    });

    format!(
        "Create a time-blocking plan for these tasks within {hours} hours.\n\n\
         Tasks: {tasks}\n\
         Available Hours: {hours}\n\n\
         Respond with a single JSON object shaped like this:\n{shape:#}",
        hours = available_hours,
        tasks = pretty(&tasks),
        shape = shape,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn snippet_at(content: &str) -> ContextSnippet {
        ContextSnippet {
            content: content.to_string(),
            source_type: SourceType::Email,
            created_at: now(),
        }
    }

    fn brief(title: &str) -> TaskBrief {
        TaskBrief {
            id: Uuid::nil(),
            title: title.to_string(),
            description: "desc".to_string(),
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            category: None,
            deadline: None,
            estimated_duration: 1.0,
            ai_priority_score: 0.5,
        }
    }

    #[test]
    fn test_analyze_context_embeds_timestamp_source_and_content() {
        let prompt = analyze_context(now(), "Dentist at 3pm", SourceType::Whatsapp);
        assert!(prompt.starts_with("CURRENT DATE AND TIME: 2026-03-14 09:30:00 UTC"));
        assert!(prompt.contains("following whatsapp content"));
        assert!(prompt.contains("Content: \"Dentist at 3pm\""));
        assert!(prompt.contains("\"sentiment_analysis\""));
        assert!(prompt.contains("\"task_suggestions\""));
    }

    #[test]
    fn test_prioritize_uses_last_five_snippets_and_task_ids() {
        let context: Vec<_> = (0..7).map(|i| snippet_at(&format!("note {}", i))).collect();
        let prompt = prioritize_tasks(now(), &[brief("Pay rent")], &context);
        assert!(!prompt.contains("- note 1\n"));
        assert!(prompt.contains("- note 2"));
        assert!(prompt.contains("- note 6"));
        assert!(prompt.contains(&format!("- [{}] Pay rent: desc", Uuid::nil())));
    }

    #[test]
    fn test_suggest_deadline_examples_are_in_the_future() {
        let prompt = suggest_deadline(now(), "Ship release", "", &[]);
        assert!(prompt.contains("2026-03-14T11:30:00Z"));
        assert!(prompt.contains("2026-03-15T09:30:00Z"));
        assert!(prompt.contains("dates after 2026-03-14"));
    }

    #[test]
    fn test_snippets_are_cut_on_char_boundary() {
        let long = "é".repeat(150);
        let lines = context_lines(&[snippet_at(&long)], 3);
        assert_eq!(lines.chars().count(), 2 + PROMPT_SNIPPET_CHARS);
    }

    #[test]
    fn test_categorize_lists_existing_categories() {
        let prompt = categorize_task(
            "Buy milk",
            "",
            &["Shopping".to_string(), "Work".to_string()],
        );
        assert!(prompt.contains("Existing Categories: Shopping, Work"));
        assert!(prompt.contains("\"suggested_category\""));
    }

    #[test]
    fn test_schedule_and_time_blocks_embed_task_json() {
        let tasks = vec![brief("Write report")];
        let schedule = schedule_suggestions(&tasks, &[snippet_at("standup at 10")]);
        assert!(schedule.contains("\"title\": \"Write report\""));
        assert!(schedule.contains("\"content\": \"standup at 10\""));

        let blocks = time_blocks(&tasks, 6);
        assert!(blocks.contains("within 6 hours"));
        assert!(blocks.contains("\"priority\": \"high\""));
    }

    #[test]
    fn test_task_brief_from_task_duration_in_hours() {
        let task = Task {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            title: "t".to_string(),
            description: String::new(),
            ai_enhanced_description: String::new(),
            priority: TaskPriority::Low,
            ai_priority_score: 0.2,
            ai_priority_reasoning: String::new(),
            status: TaskStatus::InProgress,
            category_id: None,
            category_name: Some("Work".to_string()),
            tags: Vec::new(),
            deadline: None,
            ai_suggested_deadline: None,
            estimated_duration_minutes: Some(90),
            created_at: now(),
            updated_at: now(),
            completed_at: None,
            context_used: json!({}),
            ai_insights: json!({}),
        };
        let brief = TaskBrief::from(&task);
        assert_eq!(brief.estimated_duration, 1.5);
        assert_eq!(brief.category.as_deref(), Some("Work"));
    }
}
