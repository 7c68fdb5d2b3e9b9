//! Record domain models.
//!
//! Records are created at the end of a successful flow and never
//! mutated afterwards; progress reporting queries them.

use crate::user::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum stored length of a plan description, in characters.
pub(crate) const PLAN_DESCRIPTION_LIMIT: usize = 200;

/// Outcome of a completed skills assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: String,
    pub user_id: String,
    /// The raw skills description the user provided
    pub skills_text: String,
    /// Derived level label (e.g. "junior", "middle")
    pub level: String,
    /// Confidence score in [0, 1]
    pub score: f32,
    /// Free-text feedback shown to the user
    pub feedback: String,
    /// Structured detail payload (strengths, recommendations, ...)
    pub details: serde_json::Value,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn new(
        user_id: impl Into<String>,
        skills_text: impl Into<String>,
        level: impl Into<String>,
        score: f32,
        feedback: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            skills_text: skills_text.into(),
            level: level.into(),
            score,
            feedback: feedback.into(),
            details,
            assessed_at: Utc::now(),
        }
    }
}

/// A saved learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Narrative description, truncated to 200 characters on creation
    pub description: String,
    pub track: Track,
    /// Level label the plan targets (beginner/intermediate/advanced)
    pub level: String,
    pub duration_weeks: u32,
    /// Structured plan payload (the confirmed plan summary)
    pub plan_data: serde_json::Value,
    /// Completion progress in [0, 1]
    pub progress: f32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        description: &str,
        track: Track,
        level: impl Into<String>,
        duration_weeks: u32,
        plan_data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: truncate_chars(description, PLAN_DESCRIPTION_LIMIT),
            track,
            level: level.into(),
            duration_weeks,
            plan_data,
            progress: 0.0,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a single-question interview round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub level: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Overall score in [0, 100]
    pub score: f32,
    pub feedback: String,
    pub completed_at: DateTime<Utc>,
}

impl InterviewRecord {
    pub fn new(
        user_id: impl Into<String>,
        topic: impl Into<String>,
        level: impl Into<String>,
        score: f32,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            topic: topic.into(),
            level: level.into(),
            total_questions: 1,
            correct_answers: 0,
            score,
            feedback: feedback.into(),
            completed_at: Utc::now(),
        }
    }
}

/// Outcome of a code review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub user_id: String,
    /// Detected source language of the snippet
    pub language: String,
    pub code_snippet: String,
    /// Quality score in [0, 100]
    pub score: f32,
    pub issues_found: u32,
    pub feedback: String,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(
        user_id: impl Into<String>,
        language: impl Into<String>,
        code_snippet: impl Into<String>,
        score: f32,
        issues_found: u32,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            language: language.into(),
            code_snippet: code_snippet.into(),
            score,
            issues_found,
            feedback: feedback.into(),
            reviewed_at: Utc::now(),
        }
    }
}

/// Truncates on a character boundary, not a byte boundary, so
/// multi-byte (e.g. Cyrillic) descriptions cannot split a codepoint.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_description_is_truncated_to_200_chars() {
        let long = "я".repeat(300);
        let plan = PlanRecord::new(
            "u1",
            "Plan: Docker",
            &long,
            Track::Backend,
            "intermediate",
            6,
            serde_json::json!({}),
        );
        assert_eq!(plan.description.chars().count(), 200);
    }

    #[test]
    fn short_plan_description_is_kept_verbatim() {
        let plan = PlanRecord::new(
            "u1",
            "Plan: Docker",
            "six weeks of containers",
            Track::Backend,
            "intermediate",
            6,
            serde_json::json!({}),
        );
        assert_eq!(plan.description, "six weeks of containers");
        assert!(plan.is_active);
        assert_eq!(plan.progress, 0.0);
    }

    #[test]
    fn records_get_unique_ids() {
        let a = InterviewRecord::new("u1", "backend", "junior", 70.0, "ok");
        let b = InterviewRecord::new("u1", "backend", "junior", 70.0, "ok");
        assert_ne!(a.id, b.id);
    }
}
