//! Structured generation requests and their prompt rendering.

use interprep_core::planning::SkillLevel;
use interprep_core::user::{Level, Track};

/// A structured request to the generation service, one variant per
/// capability. The adapter renders these into prompts; flow
/// controllers never build prompt strings themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Assess a free-text skills description
    Assessment {
        skills: String,
        level: Level,
        track: Track,
    },
    /// Create a learning plan
    LearningPlan {
        topic: String,
        level: SkillLevel,
        weeks: u32,
        goal: String,
    },
    /// Evaluate an interview answer
    InterviewFeedback {
        question: String,
        answer: String,
        level: Level,
        track: Track,
    },
    /// Review a code snippet
    CodeReview { language: String, code: String },
}

impl GenerationRequest {
    /// System prompt establishing the mentor persona and, where the
    /// caller parses the output, the expected JSON shape.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            GenerationRequest::Assessment { .. } => {
                "You are an experienced IT interview-preparation mentor. \
                 Assess the candidate's self-described skills. Respond with a JSON object: \
                 {\"level\": \"junior|middle|senior\", \"confidence\": 0.0-1.0, \
                 \"strengths\": [...], \"weaknesses\": [...], \"recommendations\": [...]}"
            }
            GenerationRequest::LearningPlan { .. } => {
                "You are an experienced IT interview-preparation mentor. \
                 Create a weekly learning plan. Respond with a JSON object: \
                 {\"total_weeks\": N, \"focus_areas\": [...], \"summary\": \"...\"}"
            }
            GenerationRequest::InterviewFeedback { .. } => {
                "You are an experienced technical interviewer. \
                 Evaluate the candidate's answer. Respond with a JSON object: \
                 {\"score\": 0-100, \"feedback\": \"...\"}"
            }
            GenerationRequest::CodeReview { .. } => {
                "You are a senior engineer doing a code review. \
                 Respond with a JSON object: \
                 {\"score\": 0-100, \"issues_found\": N, \"feedback\": \"...\"}"
            }
        }
    }

    /// User-message prompt carrying the request payload.
    pub fn to_prompt(&self) -> String {
        match self {
            GenerationRequest::Assessment {
                skills,
                level,
                track,
            } => format!(
                "Candidate profile: level {level}, track {track}.\nSkills description:\n{skills}"
            ),
            GenerationRequest::LearningPlan {
                topic,
                level,
                weeks,
                goal,
            } => format!(
                "Topic: {topic}\nCurrent level: {level}\nPlan duration: {weeks} weeks\nGoal: {goal}"
            ),
            GenerationRequest::InterviewFeedback {
                question,
                answer,
                level,
                track,
            } => format!(
                "Candidate profile: level {level}, track {track}.\nQuestion: {question}\nAnswer:\n{answer}"
            ),
            GenerationRequest::CodeReview { language, code } => {
                format!("Language: {language}\nCode:\n{code}")
            }
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::Assessment { .. } => "assessment",
            GenerationRequest::LearningPlan { .. } => "learning_plan",
            GenerationRequest::InterviewFeedback { .. } => "interview_feedback",
            GenerationRequest::CodeReview { .. } => "code_review",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_prompt_carries_all_slots() {
        let request = GenerationRequest::LearningPlan {
            topic: "Docker".to_string(),
            level: SkillLevel::Intermediate,
            weeks: 6,
            goal: "Хочу изучать Docker".to_string(),
        };
        let prompt = request.to_prompt();
        assert!(prompt.contains("Docker"));
        assert!(prompt.contains("intermediate"));
        assert!(prompt.contains("6 weeks"));
        assert_eq!(request.kind(), "learning_plan");
    }

    #[test]
    fn system_prompts_request_json_where_parsed() {
        let request = GenerationRequest::Assessment {
            skills: "Python".to_string(),
            level: Level::Junior,
            track: Track::Backend,
        };
        assert!(request.system_prompt().contains("JSON"));
    }
}
