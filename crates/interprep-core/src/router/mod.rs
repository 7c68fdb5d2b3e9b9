//! Intent router.
//!
//! A greedy, order-sensitive keyword classifier: rules are evaluated
//! sequentially and the first satisfied rule short-circuits the rest.
//! Confidence values are fixed constants per rule, not computed from
//! the input. The router is a pure function of (text, session); mode
//! transitions are applied by the dispatcher, never in here.

mod decision;
mod keywords;

pub use decision::{Capability, RouteDecision};

use crate::session::{Mode, UserSession};
use keywords::{CODE_KEYWORDS, INTERVIEW_KEYWORDS, PLAN_KEYWORDS, SKILL_KEYWORDS};
use tracing::debug;

/// Confidence when the session is already waiting for a skills description.
const CONFIDENCE_SKILLS_FLOW: f32 = 0.95;
/// Confidence when free text looks like a spontaneous skills description.
const CONFIDENCE_SKILLS_HEURISTIC: f32 = 0.85;
/// Confidence for a plain keyword match.
const CONFIDENCE_KEYWORD: f32 = 0.8;
/// Confidence of the helper fallback when no rule matches.
const CONFIDENCE_FALLBACK: f32 = 0.3;

/// Minimum number of skill-keyword hits for the heuristic rule.
const MIN_SKILL_HITS: usize = 2;
/// Minimum word count for the heuristic rule when no comma is present.
const MIN_WORD_COUNT: usize = 4;

/// Decides which capability should handle `text` given the current session.
pub fn route(text: &str, session: &UserSession) -> RouteDecision {
    let text_lower = text.to_lowercase();

    // 1. Mid-assessment: whatever the user sent is the skills payload.
    if session.mode == Mode::AwaitingSkills {
        let mut decision = RouteDecision::new(
            Capability::Assessor,
            "session is awaiting a skills description",
            CONFIDENCE_SKILLS_FLOW,
        )
        .with_metadata("action", "process_skills")
        .with_metadata("skills_text", text);
        decision.suggested_topics = Some(vec![
            "Python".to_string(),
            "Django".to_string(),
            "Backend".to_string(),
        ]);
        debug!(capability = %decision.capability, "routed via assessment flow state");
        return decision;
    }

    // 2. Spontaneous skills description: several skill indicators plus
    //    enough structure (a comma or at least a short sentence).
    let skill_hits = SKILL_KEYWORDS
        .iter()
        .filter(|keyword| text_lower.contains(*keyword))
        .count();
    let has_comma = text.contains(',');
    let word_count = text.split_whitespace().count();

    if skill_hits >= MIN_SKILL_HITS && (has_comma || word_count >= MIN_WORD_COUNT) {
        let decision = RouteDecision::new(
            Capability::Assessor,
            "message looks like a skills description",
            CONFIDENCE_SKILLS_HEURISTIC,
        )
        .with_metadata("action", "assess_skills")
        .with_metadata("skill_hits", skill_hits.to_string())
        .with_metadata("word_count", word_count.to_string());
        debug!(skill_hits, word_count, "routed via skills heuristic");
        return decision;
    }

    // 3. Keyword sets, in fixed priority order: planning precedes
    //    interview precedes code review.
    if contains_any(&text_lower, PLAN_KEYWORDS) {
        return RouteDecision::new(
            Capability::Planner,
            "user wants a learning plan",
            CONFIDENCE_KEYWORD,
        )
        .with_metadata("intent", "learning_plan");
    }
    if contains_any(&text_lower, INTERVIEW_KEYWORDS) {
        return RouteDecision::new(
            Capability::Interviewer,
            "user asked for interview practice",
            CONFIDENCE_KEYWORD,
        )
        .with_metadata("intent", "interview");
    }
    if contains_any(&text_lower, CODE_KEYWORDS) {
        return RouteDecision::new(
            Capability::Reviewer,
            "user asked for a code review",
            CONFIDENCE_KEYWORD,
        )
        .with_metadata("intent", "code_review");
    }

    // 4. Nothing matched: generic helper.
    RouteDecision::new(
        Capability::Helper,
        "no clear intent detected",
        CONFIDENCE_FALLBACK,
    )
    .with_metadata("fallback", "true")
}

fn contains_any(text_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text_lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserSession;
    use std::collections::HashMap;

    fn idle_session() -> UserSession {
        UserSession::idle("u1")
    }

    fn awaiting_skills_session() -> UserSession {
        let mut session = UserSession::idle("u1");
        session.mode = Mode::AwaitingSkills;
        session
    }

    #[test]
    fn awaiting_skills_always_routes_to_assessor() {
        for text in ["hello", "zzz", "Хочу изучать Docker", "1"] {
            let decision = route(text, &awaiting_skills_session());
            assert_eq!(decision.capability, Capability::Assessor);
            assert_eq!(decision.confidence, 0.95);
            assert_eq!(decision.metadata.get("skills_text").map(String::as_str), Some(text));
        }
    }

    #[test]
    fn skills_heuristic_requires_two_hits_and_structure() {
        let decision = route(
            "знаю Python, Django, опыт 2 года в backend",
            &idle_session(),
        );
        assert_eq!(decision.capability, Capability::Assessor);
        assert_eq!(decision.confidence, 0.85);

        let decision = route("I know python and django from my project work", &idle_session());
        assert_eq!(decision.capability, Capability::Assessor);
        assert_eq!(decision.confidence, 0.85);
    }

    #[test]
    fn single_skill_keyword_is_not_enough() {
        // One hit, one word: neither condition of the heuristic holds.
        let decision = route("Python", &idle_session());
        assert_ne!(decision.confidence, 0.85);
        assert_eq!(decision.capability, Capability::Helper);
    }

    #[test]
    fn two_hits_without_comma_or_length_do_not_trigger() {
        // Two skill keywords but only two words and no comma.
        let decision = route("python django", &idle_session());
        assert_ne!(decision.confidence, 0.85);
    }

    #[test]
    fn planning_keywords_route_to_planner() {
        let decision = route("Хочу изучать Docker", &idle_session());
        assert_eq!(decision.capability, Capability::Planner);
        assert_eq!(decision.confidence, 0.8);

        let decision = route("help me learn kubernetes", &idle_session());
        assert_eq!(decision.capability, Capability::Planner);
    }

    #[test]
    fn planning_preempts_interview() {
        // Contains both a planning keyword and an interview keyword;
        // the planning rule is evaluated first and wins.
        let decision = route("хочу план подготовки к собеседованию", &idle_session());
        assert_eq!(decision.capability, Capability::Planner);
    }

    #[test]
    fn interview_keywords_route_to_interviewer() {
        let decision = route("давай mock интервью", &idle_session());
        assert_eq!(decision.capability, Capability::Interviewer);
        assert_eq!(decision.confidence, 0.8);
    }

    #[test]
    fn code_keywords_route_to_reviewer() {
        let decision = route("посмотри мой код", &idle_session());
        assert_eq!(decision.capability, Capability::Reviewer);
        assert_eq!(decision.confidence, 0.8);
    }

    #[test]
    fn unmatched_text_falls_back_to_helper() {
        let decision = route("zzz", &idle_session());
        assert_eq!(decision.capability, Capability::Helper);
        assert_eq!(decision.confidence, 0.3);
        assert!(decision.suggested_topics.is_none());
    }

    #[test]
    fn decision_is_stateless_with_respect_to_slots() {
        let mut session = idle_session();
        session.slots = HashMap::from([("topic".to_string(), "Docker".to_string())]);
        let decision = route("zzz", &session);
        assert_eq!(decision.capability, Capability::Helper);
    }
}
