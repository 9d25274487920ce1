//! Typed AI payloads and their fallback defaults.
//!
//! Each top-level payload has exactly one required field; everything else
//! defaults when the model leaves it out. A reply that lacks the required
//! field is treated as unusable and the operation's `fallback` is returned
//! instead.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use smart_todo_core::defaults::{
    FALLBACK_SCHEDULE_TASKS, NEUTRAL_SCORE, WORKDAY_START_HOUR,
};
use smart_todo_core::{InsightType, TaskPriority};

use crate::prompts::TaskBrief;

fn neutral() -> f64 {
    NEUTRAL_SCORE
}

/// Parse a model-supplied timestamp. Accepts RFC 3339 and naive
/// `YYYY-MM-DDTHH:MM:SS` (read as UTC).
pub fn parse_model_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Map a model priority label onto the task enum, defaulting to medium.
pub fn parse_priority(raw: &str) -> TaskPriority {
    raw.parse().unwrap_or_default()
}

// =============================================================================
// CONTEXT ANALYSIS
// =============================================================================

/// Result of analysing one context entry.
///
/// The model answers with nested analysis objects; the fallback uses the
/// flat keys. Use the accessor methods rather than the raw fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<SentimentAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_analysis: Option<UrgencyAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_classification: Option<ContextClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_extraction: Option<TaskExtraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_indicators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub insights: Vec<SuggestedInsight>,
    #[serde(default)]
    pub task_suggestions: Vec<TaskSuggestion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentAnalysis {
    pub overall_sentiment: String,
    pub sentiment_score: Option<f64>,
    pub emotional_indicators: Vec<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyAnalysis {
    pub urgency_level: String,
    pub urgency_score: Option<f64>,
    pub urgency_indicators: Vec<String>,
    pub time_sensitivity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextClassification {
    pub primary_category: String,
    pub subcategories: Vec<String>,
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskExtraction {
    pub potential_tasks: Vec<TaskSuggestion>,
}

/// An insight the model drew from a context entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedInsight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub confidence: Option<f64>,
    pub impact: String,
    pub suggested_action: JsonValue,
}

impl SuggestedInsight {
    pub fn confidence(&self) -> f64 {
        self.confidence.unwrap_or(NEUTRAL_SCORE)
    }
}

/// A task the model suggests creating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSuggestion {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub category: Option<String>,
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl TaskSuggestion {
    pub fn priority(&self) -> TaskPriority {
        parse_priority(&self.priority)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline.as_deref().and_then(parse_model_datetime)
    }
}

impl ContextAnalysis {
    /// Neutral analysis used when the model is unavailable or unparsable.
    pub fn fallback() -> Self {
        Self {
            keywords: Vec::new(),
            sentiment_score: Some(NEUTRAL_SCORE),
            urgency_indicators: Some(Vec::new()),
            relevance_score: Some(NEUTRAL_SCORE),
            ..Default::default()
        }
    }

    pub fn sentiment_score(&self) -> f64 {
        self.sentiment_analysis
            .as_ref()
            .and_then(|s| s.sentiment_score)
            .or(self.sentiment_score)
            .unwrap_or(NEUTRAL_SCORE)
    }

    pub fn urgency_indicators(&self) -> Vec<String> {
        match self.urgency_analysis {
            Some(ref u) => u.urgency_indicators.clone(),
            None => self.urgency_indicators.clone().unwrap_or_default(),
        }
    }

    pub fn relevance_score(&self) -> f64 {
        self.context_classification
            .as_ref()
            .and_then(|c| c.relevance_score)
            .or(self.relevance_score)
            .unwrap_or(NEUTRAL_SCORE)
    }
}

// =============================================================================
// PRIORITIZATION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prioritization {
    pub prioritized_tasks: Vec<TaskPriorityAssessment>,
    #[serde(default)]
    pub overall_insights: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPriorityAssessment {
    /// Task id as echoed by the model. Not guaranteed to be a valid UUID.
    pub task_id: String,
    pub priority_score: f64,
    pub priority_level: String,
    pub reasoning: String,
    pub suggested_deadline: Option<String>,
    pub estimated_duration: String,
    pub dependencies: Vec<String>,
}

impl Default for TaskPriorityAssessment {
    fn default() -> Self {
        Self {
            task_id: String::new(),
            priority_score: NEUTRAL_SCORE,
            priority_level: "medium".to_string(),
            reasoning: "Default prioritization".to_string(),
            suggested_deadline: None,
            estimated_duration: "1 hour".to_string(),
            dependencies: Vec::new(),
        }
    }
}

impl Prioritization {
    /// Every task at the neutral score.
    pub fn fallback(tasks: &[TaskBrief]) -> Self {
        Self {
            prioritized_tasks: tasks
                .iter()
                .map(|t| TaskPriorityAssessment {
                    task_id: t.id.to_string(),
                    ..Default::default()
                })
                .collect(),
            overall_insights: "Tasks prioritized with default settings".to_string(),
        }
    }
}

// =============================================================================
// DEADLINE SUGGESTION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineSuggestion {
    pub suggested_deadline: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub estimated_duration: String,
    #[serde(default = "neutral")]
    pub complexity_score: f64,
    #[serde(default)]
    pub alternative_deadlines: Vec<AlternativeDeadline>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternativeDeadline {
    pub deadline: String,
    pub scenario: String,
}

impl DeadlineSuggestion {
    /// One day from `now`.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            suggested_deadline: (now + Duration::days(1)).to_rfc3339(),
            reasoning: "Default 1-day deadline".to_string(),
            estimated_duration: "1 hour".to_string(),
            complexity_score: NEUTRAL_SCORE,
            alternative_deadlines: Vec::new(),
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        parse_model_datetime(&self.suggested_deadline)
    }
}

// =============================================================================
// CATEGORIZATION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Categorization {
    pub suggested_category: String,
    #[serde(default = "neutral")]
    pub confidence: f64,
    #[serde(default)]
    pub alternative_categories: Vec<String>,
    #[serde(default)]
    pub suggested_tags: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl Categorization {
    pub fn fallback() -> Self {
        Self {
            suggested_category: "General".to_string(),
            confidence: NEUTRAL_SCORE,
            alternative_categories: vec!["Work".to_string(), "Personal".to_string()],
            suggested_tags: vec!["general".to_string()],
            reasoning: "Default categorization".to_string(),
        }
    }
}

// =============================================================================
// DESCRIPTION ENHANCEMENT
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enhancement {
    pub enhanced_description: String,
    #[serde(default)]
    pub added_details: Vec<String>,
    #[serde(default)]
    pub suggested_subtasks: Vec<Subtask>,
    #[serde(default)]
    pub resources_needed: Vec<String>,
    #[serde(default)]
    pub potential_blockers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subtask {
    pub title: String,
    pub description: String,
}

impl Enhancement {
    /// The original description, unchanged.
    pub fn fallback(description: &str) -> Self {
        Self {
            enhanced_description: description.to_string(),
            added_details: Vec::new(),
            suggested_subtasks: Vec::new(),
            resources_needed: Vec::new(),
            potential_blockers: Vec::new(),
        }
    }
}

// =============================================================================
// DAILY SUMMARY
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub summary: String,
    #[serde(default)]
    pub key_themes: Vec<String>,
    #[serde(default)]
    pub priority_areas: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub schedule_suggestions: Vec<SlotSuggestion>,
}

/// A recommendation attached to a summary or schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub recommendation_type: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotSuggestion {
    pub time_slot: String,
    pub activity: String,
    pub reasoning: String,
}

impl DailySummary {
    pub fn fallback() -> Self {
        Self {
            summary: "Daily summary not available".to_string(),
            key_themes: Vec::new(),
            priority_areas: Vec::new(),
            recommendations: Vec::new(),
            schedule_suggestions: Vec::new(),
        }
    }
}

// =============================================================================
// SCHEDULING
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSuggestions {
    pub schedule: Vec<ScheduledTask>,
    #[serde(default)]
    pub schedule_insights: ScheduleInsights,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduledTask {
    pub time_slot: String,
    pub task_id: String,
    pub task_title: String,
    /// Minutes.
    pub duration: f64,
    pub priority: String,
    pub reasoning: String,
    pub energy_level: String,
    pub focus_required: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleInsights {
    pub total_scheduled_hours: f64,
    pub high_priority_tasks: u32,
    pub optimal_productivity_windows: Vec<String>,
    pub break_suggestions: Vec<String>,
}

fn is_high_priority(p: TaskPriority) -> bool {
    matches!(p, TaskPriority::High | TaskPriority::Urgent)
}

impl ScheduleSuggestions {
    /// The first tasks in back-to-back one-hour slots from the start of the
    /// working day.
    pub fn fallback(tasks: &[TaskBrief]) -> Self {
        let schedule = tasks
            .iter()
            .take(FALLBACK_SCHEDULE_TASKS)
            .enumerate()
            .map(|(i, t)| {
                let start = WORKDAY_START_HOUR + i as u32;
                ScheduledTask {
                    time_slot: format!("{:02}:00-{:02}:00", start, start + 1),
                    task_id: t.id.to_string(),
                    task_title: t.title.clone(),
                    duration: 60.0,
                    priority: t.priority.to_string(),
                    reasoning: "Default scheduling".to_string(),
                    energy_level: "medium".to_string(),
                    focus_required: "medium".to_string(),
                }
            })
            .collect::<Vec<_>>();

        Self {
            schedule_insights: ScheduleInsights {
                total_scheduled_hours: schedule.len() as f64,
                high_priority_tasks: tasks.iter().filter(|t| is_high_priority(t.priority)).count()
                    as u32,
                optimal_productivity_windows: vec![
                    "09:00-11:00".to_string(),
                    "14:00-16:00".to_string(),
                ],
                break_suggestions: vec!["11:00-11:15".to_string(), "15:00-15:15".to_string()],
            },
            schedule,
            recommendations: vec![Recommendation {
                recommendation_type: "scheduling".to_string(),
                title: "Default Schedule".to_string(),
                description: "Basic task scheduling applied".to_string(),
                urgency: None,
            }],
        }
    }
}

// =============================================================================
// TIME BLOCKING
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBlocks {
    pub time_blocks: Vec<TimeBlock>,
    #[serde(default)]
    pub blocking_strategy: BlockingStrategy,
    #[serde(default)]
    pub productivity_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeBlock {
    pub block_name: String,
    pub start_time: String,
    pub end_time: String,
    /// Minutes.
    pub duration: f64,
    pub tasks: Vec<BlockTask>,
    pub block_type: String,
    pub energy_requirement: String,
    /// Minutes of break after the block.
    pub break_after: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockTask {
    pub task_id: String,
    pub task_title: String,
    /// Minutes.
    pub allocated_time: f64,
    pub priority: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingStrategy {
    pub total_blocks: u32,
    pub deep_work_blocks: u32,
    pub admin_blocks: u32,
    /// Minutes.
    pub buffer_time: f64,
    /// Minutes.
    pub break_time: f64,
}

impl TimeBlocks {
    /// One two-hour deep-work block per task, for as many tasks as
    /// `available_hours / 2` allows.
    pub fn fallback(tasks: &[TaskBrief], available_hours: u32) -> Self {
        let max_blocks = (available_hours / 2) as usize;
        let time_blocks = tasks
            .iter()
            .take(max_blocks)
            .enumerate()
            .map(|(i, t)| {
                let start = WORKDAY_START_HOUR + 2 * i as u32;
                TimeBlock {
                    block_name: format!("Work Block {}", i + 1),
                    start_time: format!("{:02}:00", start),
                    end_time: format!("{:02}:00", start + 2),
                    duration: 120.0,
                    tasks: vec![BlockTask {
                        task_id: t.id.to_string(),
                        task_title: t.title.clone(),
                        allocated_time: 90.0,
                        priority: t.priority.to_string(),
                    }],
                    block_type: "deep_work".to_string(),
                    energy_requirement: "medium".to_string(),
                    break_after: 15.0,
                }
            })
            .collect::<Vec<_>>();

        let blocks = time_blocks.len() as u32;
        Self {
            time_blocks,
            blocking_strategy: BlockingStrategy {
                total_blocks: blocks,
                deep_work_blocks: blocks,
                admin_blocks: 0,
                buffer_time: 30.0,
                break_time: 45.0,
            },
            productivity_tips: vec![
                "Default time blocking applied".to_string(),
                "Consider adjusting based on your energy levels".to_string(),
                "Include regular breaks between blocks".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use smart_todo_core::TaskStatus;
    use uuid::Uuid;

    fn brief(title: &str, priority: TaskPriority) -> TaskBrief {
        TaskBrief {
            id: Uuid::now_v7(),
            title: title.to_string(),
            description: String::new(),
            priority,
            status: TaskStatus::Pending,
            category: None,
            deadline: None,
            estimated_duration: 1.0,
            ai_priority_score: 0.5,
        }
    }

    #[test]
    fn test_context_analysis_prefers_nested_values() {
        let analysis: ContextAnalysis = serde_json::from_value(json!({
            "keywords": ["report"],
            "sentiment_analysis": {"sentiment_score": 0.2},
            "urgency_analysis": {"urgency_indicators": ["friday"]},
            "context_classification": {"relevance_score": 0.9},
            "sentiment_score": 0.7,
            "relevance_score": 0.1
        }))
        .unwrap();
        assert_eq!(analysis.sentiment_score(), 0.2);
        assert_eq!(analysis.urgency_indicators(), vec!["friday"]);
        assert_eq!(analysis.relevance_score(), 0.9);
    }

    #[test]
    fn test_context_analysis_flat_then_neutral() {
        let flat: ContextAnalysis =
            serde_json::from_value(json!({"keywords": [], "sentiment_score": 0.8})).unwrap();
        assert_eq!(flat.sentiment_score(), 0.8);
        assert_eq!(flat.relevance_score(), 0.5);
        assert!(flat.urgency_indicators().is_empty());
    }

    #[test]
    fn test_context_analysis_requires_keywords() {
        let parsed = serde_json::from_value::<ContextAnalysis>(json!({"insights": []}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_context_analysis_fallback() {
        let analysis = ContextAnalysis::fallback();
        assert!(analysis.keywords.is_empty());
        assert_eq!(analysis.sentiment_score(), 0.5);
        assert_eq!(analysis.relevance_score(), 0.5);
        assert!(analysis.insights.is_empty());
        assert!(analysis.task_suggestions.is_empty());
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["sentiment_score"], 0.5);
        assert_eq!(value["urgency_indicators"], json!([]));
    }

    #[test]
    fn test_insight_defaults_and_unknown_type() {
        let insight: SuggestedInsight =
            serde_json::from_value(json!({"type": "mystery", "title": "Call back"})).unwrap();
        assert_eq!(insight.insight_type, InsightType::General);
        assert_eq!(insight.confidence(), 0.5);
        assert!(insight.suggested_action.is_null());
    }

    #[test]
    fn test_task_suggestion_parses_priority_and_deadline() {
        let s: TaskSuggestion = serde_json::from_value(json!({
            "title": "Book flights",
            "priority": "HIGH",
            "deadline": "2026-03-20T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(s.priority(), TaskPriority::High);
        assert_eq!(
            s.deadline(),
            Some(Utc.with_ymd_and_hms(2026, 3, 20, 10, 0, 0).unwrap())
        );

        let vague: TaskSuggestion =
            serde_json::from_value(json!({"title": "x", "priority": "asap", "deadline": "soon"}))
                .unwrap();
        assert_eq!(vague.priority(), TaskPriority::Medium);
        assert_eq!(vague.deadline(), None);
    }

    #[test]
    fn test_parse_model_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(parse_model_datetime("2026-01-15T10:00:00Z"), Some(expected));
        assert_eq!(parse_model_datetime("2026-01-15T10:00:00"), Some(expected));
        assert_eq!(
            parse_model_datetime("2026-01-15T12:00:00+02:00"),
            Some(expected)
        );
        assert_eq!(parse_model_datetime("null"), None);
        assert_eq!(parse_model_datetime(""), None);
    }

    #[test]
    fn test_prioritization_fallback_covers_every_task() {
        let tasks = vec![brief("a", TaskPriority::Low), brief("b", TaskPriority::High)];
        let p = Prioritization::fallback(&tasks);
        assert_eq!(p.prioritized_tasks.len(), 2);
        assert_eq!(p.prioritized_tasks[1].task_id, tasks[1].id.to_string());
        assert!(p
            .prioritized_tasks
            .iter()
            .all(|t| t.priority_score == 0.5 && t.priority_level == "medium"));
        assert_eq!(p.overall_insights, "Tasks prioritized with default settings");
    }

    #[test]
    fn test_prioritization_item_defaults() {
        let p: Prioritization =
            serde_json::from_value(json!({"prioritized_tasks": [{"task_id": "abc"}]})).unwrap();
        assert_eq!(p.prioritized_tasks[0].priority_score, 0.5);
        assert!(p.overall_insights.is_empty());
    }

    #[test]
    fn test_deadline_fallback_is_one_day_out() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let d = DeadlineSuggestion::fallback(now);
        assert_eq!(d.deadline(), Some(now + Duration::days(1)));
        assert_eq!(d.reasoning, "Default 1-day deadline");
        assert_eq!(d.complexity_score, 0.5);
    }

    #[test]
    fn test_categorization_fallback() {
        let c = Categorization::fallback();
        assert_eq!(c.suggested_category, "General");
        assert_eq!(c.alternative_categories, vec!["Work", "Personal"]);
        assert_eq!(c.suggested_tags, vec!["general"]);
    }

    #[test]
    fn test_enhancement_fallback_keeps_description() {
        let e = Enhancement::fallback("Buy milk");
        assert_eq!(e.enhanced_description, "Buy milk");
        assert!(e.suggested_subtasks.is_empty());
    }

    #[test]
    fn test_schedule_fallback_sequential_slots() {
        let tasks: Vec<_> = (0..10)
            .map(|i| {
                brief(
                    &format!("t{}", i),
                    if i < 3 { TaskPriority::High } else { TaskPriority::Low },
                )
            })
            .collect();
        let s = ScheduleSuggestions::fallback(&tasks);
        assert_eq!(s.schedule.len(), 8);
        assert_eq!(s.schedule[0].time_slot, "09:00-10:00");
        assert_eq!(s.schedule[7].time_slot, "16:00-17:00");
        assert_eq!(s.schedule[0].priority, "high");
        assert_eq!(s.schedule_insights.total_scheduled_hours, 8.0);
        assert_eq!(s.schedule_insights.high_priority_tasks, 3);
        assert_eq!(s.recommendations[0].title, "Default Schedule");
    }

    #[test]
    fn test_time_blocks_fallback() {
        let tasks: Vec<_> = (0..5)
            .map(|i| brief(&format!("t{}", i), TaskPriority::Medium))
            .collect();
        let b = TimeBlocks::fallback(&tasks, 6);
        assert_eq!(b.time_blocks.len(), 3);
        assert_eq!(b.time_blocks[1].block_name, "Work Block 2");
        assert_eq!(b.time_blocks[1].start_time, "11:00");
        assert_eq!(b.time_blocks[1].end_time, "13:00");
        assert_eq!(b.blocking_strategy.total_blocks, 3);
        assert_eq!(b.blocking_strategy.deep_work_blocks, 3);
        assert_eq!(b.productivity_tips.len(), 3);

        let few = TimeBlocks::fallback(&tasks[..1], 8);
        assert_eq!(few.blocking_strategy.total_blocks, 1);
    }

    #[test]
    fn test_required_fields() {
        assert!(serde_json::from_value::<Categorization>(json!({"confidence": 0.9})).is_err());
        assert!(serde_json::from_value::<Enhancement>(json!({})).is_err());
        assert!(serde_json::from_value::<DailySummary>(json!({"key_themes": []})).is_err());
        assert!(serde_json::from_value::<ScheduleSuggestions>(json!({})).is_err());
        assert!(serde_json::from_value::<TimeBlocks>(json!({})).is_err());
        assert!(serde_json::from_value::<DeadlineSuggestion>(json!({})).is_err());
    }
}
