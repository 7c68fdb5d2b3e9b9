//! Learning-plan flow.
//!
//! The longest flow in the system: topic, level and weekly time are
//! collected over three turns, a plan is generated, and the user
//! confirms or discards it. The plan duration always comes from the
//! time bucket; even a well-formed generation response cannot override
//! it. A generation failure substitutes the canned fallback plan so
//! the flow still reaches confirmation.

use crate::flows::generate_with_timeout;
use crate::reply::Reply;
use interprep_core::planning::{PlanSummary, SkillLevel, classify_level, weeks_for_time};
use interprep_core::record::{PlanRecord, PlanRepository};
use interprep_core::session::{Mode, SessionStore, UserSession, slot};
use interprep_core::user::UserProfile;
use interprep_interaction::{GenerationAgent, GenerationRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

const LEVEL_CHOICES: [&str; 3] = ["beginner", "intermediate", "advanced"];
const TIME_CHOICES: [&str; 3] = ["2-3 hours", "5-7 hours", "10+ hours"];
const CONFIRM_CHOICES: [&str; 2] = ["yes, save it", "no"];

/// Words that count as a confirmation at the save prompt. Matched
/// against whole words; "сохран" is a stem covering its inflections.
const AFFIRMATIVE: [&str; 6] = ["yes", "да", "save", "ok", "ок", "давай"];

fn is_affirmative(text: &str) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| AFFIRMATIVE.contains(&word) || word.starts_with("сохран"))
}

pub struct PlanningFlow {
    agent: Arc<dyn GenerationAgent>,
    plans: Arc<dyn PlanRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl PlanningFlow {
    pub fn new(
        agent: Arc<dyn GenerationAgent>,
        plans: Arc<dyn PlanRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            agent,
            plans,
            sessions,
        }
    }

    /// Starts the flow from scratch, asking for the topic first.
    pub async fn start(&self, user_id: &str) -> Reply {
        self.sessions
            .set(user_id, Mode::CollectingPlanGoal, HashMap::new())
            .await;
        Reply::text("What would you like to learn? Name a topic or technology.")
    }

    /// Starts the flow with the topic already known, e.g. when the
    /// router classified a free-text message like "I want to learn
    /// Docker" — the message itself is the topic.
    pub async fn start_with_topic(&self, user_id: &str, topic: &str) -> Reply {
        let slots = HashMap::from([(slot::TOPIC.to_string(), topic.trim().to_string())]);
        self.sessions
            .set(user_id, Mode::CollectingPlanLevel, slots)
            .await;
        Reply::text("Got it. What is your current level in this area?")
            .with_quick_replies(LEVEL_CHOICES)
    }

    /// Advances the flow by one turn based on the current mode.
    pub async fn handle(&self, profile: &UserProfile, session: &UserSession, text: &str) -> Reply {
        match session.mode {
            Mode::CollectingPlanGoal => self.start_with_topic(&profile.user_id, text).await,
            Mode::CollectingPlanLevel => self.collect_level(&profile.user_id, session, text).await,
            Mode::CollectingPlanTime => self.build_plan(profile, session, text).await,
            Mode::ConfirmingPlan => self.confirm(profile, session, text).await,
            _ => self.start(&profile.user_id).await,
        }
    }

    async fn collect_level(&self, user_id: &str, session: &UserSession, text: &str) -> Reply {
        let level = classify_level(text);
        let mut slots = session.slots.clone();
        slots.insert(slot::LEVEL.to_string(), level.to_string());
        self.sessions
            .set(user_id, Mode::CollectingPlanTime, slots)
            .await;
        Reply::text("How many hours per week can you spend on it?")
            .with_quick_replies(TIME_CHOICES)
    }

    async fn build_plan(&self, profile: &UserProfile, session: &UserSession, text: &str) -> Reply {
        let weeks = weeks_for_time(text);
        let topic = session.slot(slot::TOPIC).unwrap_or("your topic").to_string();
        let level: SkillLevel = session
            .slot(slot::LEVEL)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        let request = GenerationRequest::LearningPlan {
            topic: topic.clone(),
            level,
            weeks,
            goal: topic.clone(),
        };
        let summary = match generate_with_timeout(self.agent.as_ref(), request).await {
            Ok(raw) => PlanSummary::from_response(&raw, weeks, &topic),
            Err(err) => {
                warn!(user_id = %profile.user_id, error = %err, "plan generation failed, using fallback");
                PlanSummary::fallback(&topic, level, weeks)
            }
        };

        let mut slots = session.slots.clone();
        slots.insert(slot::LEVEL.to_string(), level.to_string());
        slots.insert(slot::WEEKS.to_string(), weeks.to_string());
        slots.insert(
            slot::PLAN.to_string(),
            serde_json::to_string(&summary).unwrap_or_default(),
        );
        self.sessions
            .set(&profile.user_id, Mode::ConfirmingPlan, slots)
            .await;

        Reply::text(format!(
            "Here is a {weeks}-week plan for {topic}:\n\n{}\n\nFocus areas: {}.\n\nSave this plan?",
            summary.summary,
            summary.focus_areas.join(", ")
        ))
        .with_quick_replies(CONFIRM_CHOICES)
    }

    async fn confirm(&self, profile: &UserProfile, session: &UserSession, text: &str) -> Reply {
        if !is_affirmative(text) {
            self.sessions.clear(&profile.user_id).await;
            return Reply::text(
                "Plan discarded. You can start over with /plan whenever you like.",
            );
        }

        let topic = session.slot(slot::TOPIC).unwrap_or("learning plan");
        let level = session.slot(slot::LEVEL).unwrap_or("intermediate");
        let weeks: u32 = session
            .slot(slot::WEEKS)
            .and_then(|value| value.parse().ok())
            .unwrap_or(4);
        let plan_data: serde_json::Value = session
            .slot(slot::PLAN)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or(serde_json::Value::Null);
        let description = plan_data
            .get("summary")
            .and_then(|value| value.as_str())
            .unwrap_or(topic)
            .to_owned();

        let record = PlanRecord::new(
            &profile.user_id,
            format!("Plan: {topic}"),
            &description,
            profile.track,
            level,
            weeks,
            plan_data,
        );

        let reply = match self.plans.save(&record).await {
            Ok(()) => {
                info!(user_id = %profile.user_id, weeks, "learning plan saved");
                Reply::text(format!(
                    "Saved! Your {weeks}-week plan for {topic} is now active. \
                     Check it anytime with /progress."
                ))
            }
            Err(err) => {
                warn!(user_id = %profile.user_id, error = %err, "failed to save plan");
                Reply::text(
                    "I could not save the plan to your history, but here it is above \
                     so you can keep a copy. Try /plan again later.",
                )
            }
        };

        self.sessions.clear(&profile.user_id).await;
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::is_affirmative;

    #[test]
    fn affirmatives_match_whole_words_only() {
        assert!(is_affirmative("да"));
        assert!(is_affirmative("Да, сохранить"));
        assert!(is_affirmative("yes, save it"));
        assert!(is_affirmative("OK"));
        assert!(is_affirmative("сохраняй"));
    }

    #[test]
    fn embedded_affirmative_substrings_do_not_confirm() {
        // "booking" contains "ok" and "покажи" contains "ок"; neither
        // is a confirmation on its own.
        assert!(!is_affirmative("booking"));
        assert!(!is_affirmative("покажи ещё раз"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("нет"));
    }
}
