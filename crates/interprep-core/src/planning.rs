//! Planning-flow heuristics: level classification, weekly-time
//! buckets, and the plan summary model with its fallback.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Skill level collected during the planning flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for SkillLevel {
    fn default() -> Self {
        SkillLevel::Intermediate
    }
}

/// Classifies free text into a skill level by case-insensitive
/// substring match, defaulting to intermediate when nothing matches.
pub fn classify_level(text: &str) -> SkillLevel {
    let text_lower = text.to_lowercase();
    if text_lower.contains("начин") || text_lower.contains("begin") || text_lower.contains("novice")
    {
        SkillLevel::Beginner
    } else if text_lower.contains("продви") || text_lower.contains("advanc") {
        SkillLevel::Advanced
    } else if text_lower.contains("сред") || text_lower.contains("intermediate") {
        SkillLevel::Intermediate
    } else {
        SkillLevel::default()
    }
}

/// Maps weekly-time text onto a plan duration. Fewer hours per week
/// stretch the plan over more weeks: 2-3h -> 8 weeks, 5-7h -> 6 weeks,
/// anything else (the 10+h bucket and unrecognized input) -> 4 weeks.
pub fn weeks_for_time(text: &str) -> u32 {
    if text.contains("2-3") {
        8
    } else if text.contains("5-7") {
        6
    } else {
        4
    }
}

/// Structured plan summary shown to the user for confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Total plan duration in weeks (always taken from the time bucket)
    pub total_weeks: u32,
    /// Main focus areas of the plan
    pub focus_areas: Vec<String>,
    /// Narrative summary of the plan
    pub summary: String,
}

impl PlanSummary {
    /// Builds a summary from a raw generation response.
    ///
    /// The response is expected to be the JSON shape of `PlanSummary`;
    /// anything that does not parse is kept verbatim as the narrative.
    /// `total_weeks` is forced to the already-computed time bucket in
    /// both cases so the duration never depends on generation output.
    pub fn from_response(raw: &str, weeks: u32, topic: &str) -> Self {
        match serde_json::from_str::<PlanSummary>(extract_json(raw)) {
            Ok(mut summary) => {
                summary.total_weeks = weeks;
                if summary.focus_areas.is_empty() {
                    summary.focus_areas = vec![topic.to_string()];
                }
                summary
            }
            Err(_) => Self {
                total_weeks: weeks,
                focus_areas: vec![topic.to_string()],
                summary: raw.trim().to_string(),
            },
        }
    }

    /// Canned plan used when generation fails; the flow must still
    /// reach confirmation with a non-empty, bucket-consistent summary.
    pub fn fallback(topic: &str, level: SkillLevel, weeks: u32) -> Self {
        Self {
            total_weeks: weeks,
            focus_areas: vec![
                topic.to_string(),
                "hands-on practice".to_string(),
                "fundamentals".to_string(),
            ],
            summary: format!(
                "A {weeks}-week study plan for {topic} at the {level} level: \
                 start with the fundamentals, build small projects every week, \
                 and finish with a capstone exercise."
            ),
        }
    }
}

/// Returns the JSON object embedded in `raw`, tolerating surrounding
/// prose or markdown fences in the model output.
pub fn extract_json(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_classification_is_case_insensitive() {
        assert_eq!(classify_level("СРЕДНИЙ УРОВЕНЬ"), SkillLevel::Intermediate);
        assert_eq!(classify_level("начинающий"), SkillLevel::Beginner);
        assert_eq!(classify_level("Продвинутый"), SkillLevel::Advanced);
        assert_eq!(classify_level("I am a BEGINNER"), SkillLevel::Beginner);
        assert_eq!(classify_level("advanced user"), SkillLevel::Advanced);
    }

    #[test]
    fn level_classification_defaults_to_intermediate() {
        assert_eq!(classify_level("zzz"), SkillLevel::Intermediate);
        assert_eq!(classify_level(""), SkillLevel::Intermediate);
    }

    #[test]
    fn time_buckets_are_deterministic() {
        assert_eq!(weeks_for_time("5-7 часов"), 6);
        assert_eq!(weeks_for_time("⏰ 5-7 hours/week"), 6);
        assert_eq!(weeks_for_time("2-3 часа в неделю"), 8);
        assert_eq!(weeks_for_time("10+ hours"), 4);
        assert_eq!(weeks_for_time("whenever I can"), 4);
    }

    #[test]
    fn summary_parses_structured_response_but_keeps_bucket_weeks() {
        let raw = r#"{"total_weeks": 12, "focus_areas": ["Docker", "Compose"], "summary": "Containers from scratch."}"#;
        let summary = PlanSummary::from_response(raw, 6, "Docker");
        assert_eq!(summary.total_weeks, 6);
        assert_eq!(summary.focus_areas, vec!["Docker", "Compose"]);
        assert_eq!(summary.summary, "Containers from scratch.");
    }

    #[test]
    fn summary_wraps_plain_text_responses() {
        let summary = PlanSummary::from_response("Week 1: basics. Week 2: practice.", 8, "Docker");
        assert_eq!(summary.total_weeks, 8);
        assert_eq!(summary.focus_areas, vec!["Docker"]);
        assert!(summary.summary.starts_with("Week 1"));
    }

    #[test]
    fn summary_tolerates_fenced_json() {
        let raw = "```json\n{\"total_weeks\": 6, \"focus_areas\": [\"K8s\"], \"summary\": \"ok\"}\n```";
        let summary = PlanSummary::from_response(raw, 6, "K8s");
        assert_eq!(summary.summary, "ok");
    }

    #[test]
    fn fallback_plan_is_non_empty_and_bucket_consistent() {
        let plan = PlanSummary::fallback("Docker", SkillLevel::Intermediate, 6);
        assert_eq!(plan.total_weeks, 6);
        assert!(!plan.summary.is_empty());
        assert!(!plan.focus_areas.is_empty());
    }
}
