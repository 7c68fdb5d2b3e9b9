//! End-to-end conversation tests over the full dispatcher with
//! in-memory stores and a scripted generation agent.

use interprep_application::{MessageHandler, Repositories};
use interprep_core::error::{PrepError, Result};
use interprep_core::record::{
    AssessmentRecord, AssessmentRepository, InterviewRepository, PlanRecord, PlanRepository,
};
use interprep_core::session::{InMemorySessionStore, SessionStore};
use interprep_infrastructure::memory::{
    InMemoryAssessmentRepository, InMemoryInterviewRepository, InMemoryPlanRepository,
    InMemoryReviewRepository, InMemoryUserRepository,
};
use interprep_interaction::{GenerationError, ScriptedAgent};
use std::sync::Arc;

struct Fixture {
    handler: MessageHandler,
    agent: Arc<ScriptedAgent>,
    sessions: Arc<InMemorySessionStore>,
    assessments: Arc<InMemoryAssessmentRepository>,
    plans: Arc<InMemoryPlanRepository>,
    interviews: Arc<InMemoryInterviewRepository>,
}

fn fixture() -> Fixture {
    let agent = Arc::new(ScriptedAgent::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let assessments = Arc::new(InMemoryAssessmentRepository::new());
    let plans = Arc::new(InMemoryPlanRepository::new());
    let interviews = Arc::new(InMemoryInterviewRepository::new());

    let handler = MessageHandler::new(
        agent.clone(),
        sessions.clone(),
        Repositories {
            users: Arc::new(InMemoryUserRepository::new()),
            assessments: assessments.clone(),
            plans: plans.clone(),
            interviews: interviews.clone(),
            reviews: Arc::new(InMemoryReviewRepository::new()),
        },
    );

    Fixture {
        handler,
        agent,
        sessions,
        assessments,
        plans,
        interviews,
    }
}

/// Plan repository whose writes always fail.
struct FailingPlanRepository;

#[async_trait::async_trait]
impl PlanRepository for FailingPlanRepository {
    async fn save(&self, _record: &PlanRecord) -> Result<()> {
        Err(PrepError::storage("disk full"))
    }

    async fn active_plan(&self, _user_id: &str) -> Result<Option<PlanRecord>> {
        Ok(None)
    }

    async fn list_recent(&self, _user_id: &str, _limit: usize) -> Result<Vec<PlanRecord>> {
        Ok(Vec::new())
    }
}

/// Assessment repository whose writes always fail.
struct FailingAssessmentRepository;

#[async_trait::async_trait]
impl AssessmentRepository for FailingAssessmentRepository {
    async fn save(&self, _record: &AssessmentRecord) -> Result<()> {
        Err(PrepError::storage("disk full"))
    }

    async fn list_recent(&self, _user_id: &str, _limit: usize) -> Result<Vec<AssessmentRecord>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn planning_conversation_end_to_end() {
    let fx = fixture();

    // Free text with a planning keyword starts the flow; the message
    // itself becomes the topic.
    let reply = fx.handler.handle_message("u1", "Хочу изучать Docker").await;
    assert!(reply.text.to_lowercase().contains("level"));
    assert!(reply.quick_replies.contains(&"intermediate".to_string()));

    let reply = fx.handler.handle_message("u1", "средний").await;
    assert!(reply.text.to_lowercase().contains("hours"));

    // 5-7 hours per week stretches the plan to 6 weeks.
    let reply = fx.handler.handle_message("u1", "5-7 часов в неделю").await;
    assert!(reply.text.contains("6-week"));
    assert!(reply.text.contains("Save this plan?"));

    let reply = fx.handler.handle_message("u1", "да").await;
    assert!(reply.text.contains("Saved"));

    let plans = fx.plans.list_recent("u1", 10).await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].duration_weeks, 6);
    assert_eq!(plans[0].level, "intermediate");
    assert!(plans[0].title.contains("Docker"));
    assert!(plans[0].is_active);

    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn plan_generation_failure_still_reaches_confirmation() {
    let fx = fixture();

    fx.handler.handle_message("u1", "I want to learn Kubernetes").await;
    fx.handler.handle_message("u1", "beginner").await;

    // The generation call fails; the fallback plan keeps the flow
    // alive with the bucket-derived duration.
    fx.agent.push_failure(GenerationError::Timeout);
    let reply = fx.handler.handle_message("u1", "2-3 hours").await;
    assert!(reply.text.contains("8-week"));
    assert!(reply.text.contains("Kubernetes"));
    assert!(reply.text.contains("Save this plan?"));

    let reply = fx.handler.handle_message("u1", "yes").await;
    assert!(reply.text.contains("Saved"));
    let plans = fx.plans.list_recent("u1", 10).await.unwrap();
    assert_eq!(plans[0].duration_weeks, 8);
    assert_eq!(plans[0].level, "beginner");
}

#[tokio::test]
async fn declining_a_plan_persists_nothing() {
    let fx = fixture();

    fx.handler.handle_message("u1", "/plan").await;
    fx.handler.handle_message("u1", "Rust").await;
    fx.handler.handle_message("u1", "advanced").await;
    fx.handler.handle_message("u1", "10+ hours").await;
    let reply = fx.handler.handle_message("u1", "no").await;

    assert!(reply.text.contains("discarded"));
    assert!(fx.plans.list_recent("u1", 10).await.unwrap().is_empty());
    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn assessment_failure_replies_but_persists_no_record() {
    let fx = fixture();

    fx.handler.handle_message("u1", "/assess").await;
    fx.agent.push_failure(GenerationError::EmptyResponse);
    let reply = fx
        .handler
        .handle_message("u1", "Python, Django, 2 years")
        .await;

    assert!(reply.text.contains("could not assess"));
    assert!(fx.assessments.list_recent("u1", 10).await.unwrap().is_empty());
    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn begin_sets_profile_and_awaits_skills() {
    let fx = fixture();

    let reply = fx.handler.handle_message("u1", "/begin middle python").await;
    assert!(reply.text.contains("middle"));
    assert!(reply.text.contains("python"));

    // The next message is assessed and recorded.
    let reply = fx
        .handler
        .handle_message("u1", "Pandas, asyncio, 3 years of services")
        .await;
    assert!(reply.text.contains("Assessment result"));

    let records = fx.assessments.list_recent("u1", 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, "junior"); // from the canned response
    assert_eq!(records[0].skills_text, "Pandas, asyncio, 3 years of services");
}

#[tokio::test]
async fn begin_rejects_unknown_level_without_state_change() {
    let fx = fixture();

    let reply = fx.handler.handle_message("u1", "/begin principal python").await;
    assert!(reply.text.contains("principal"));
    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn interview_round_is_scored_and_recorded() {
    let fx = fixture();

    let reply = fx.handler.handle_message("u1", "давай mock интервью").await;
    assert!(reply.text.contains("Question:"));

    // Canned evaluation scores 70, which counts as a pass.
    let reply = fx
        .handler
        .handle_message("u1", "An index lets the database skip scanning every row.")
        .await;
    assert!(reply.text.contains("Score: 70/100"));

    let rounds = fx.interviews.list_recent("u1", 10).await.unwrap();
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].total_questions, 1);
    assert_eq!(rounds[0].correct_answers, 1);
    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn cancel_abandons_a_flow_midway() {
    let fx = fixture();

    fx.handler.handle_message("u1", "/plan").await;
    fx.handler.handle_message("u1", "Docker").await;
    assert!(!fx.sessions.get("u1").await.is_idle());

    let reply = fx.handler.handle_message("u1", "/cancel").await;
    assert!(reply.text.contains("Cancelled"));
    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn unknown_command_lists_alternatives() {
    let fx = fixture();
    let reply = fx.handler.handle_message("u1", "/frobnicate").await;
    assert!(reply.text.contains("/assess"));
}

#[tokio::test]
async fn unmatched_text_gets_helper_suggestions() {
    let fx = fixture();
    let reply = fx.handler.handle_message("u1", "zzz").await;
    assert!(reply.quick_replies.contains(&"/help".to_string()));
}

#[tokio::test]
async fn progress_reflects_completed_flows() {
    let fx = fixture();

    // One full assessment with the canned response.
    fx.handler.handle_message("u1", "/assess").await;
    fx.handler
        .handle_message("u1", "Python, Django, 2 years")
        .await;

    let reply = fx.handler.handle_message("u1", "/progress").await;
    assert!(reply.text.contains("Assessments: 1"));
    assert!(reply.text.contains("Latest assessment: junior"));

    // Another user sees an empty report.
    let reply = fx.handler.handle_message("u2", "/progress").await;
    assert!(reply.text.contains("Nothing here yet"));
}

#[tokio::test]
async fn code_review_flow_records_language() {
    let fx = fixture();

    fx.handler.handle_message("u1", "/review").await;
    let reply = fx
        .handler
        .handle_message("u1", "def add(a, b):\n    return a + b")
        .await;

    assert!(reply.text.contains("python"));
    assert!(reply.text.contains("/100"));
    assert!(fx.sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn plan_save_failure_is_reported_and_session_still_clears() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let handler = MessageHandler::new(
        Arc::new(ScriptedAgent::new()),
        sessions.clone(),
        Repositories {
            users: Arc::new(InMemoryUserRepository::new()),
            assessments: Arc::new(InMemoryAssessmentRepository::new()),
            plans: Arc::new(FailingPlanRepository),
            interviews: Arc::new(InMemoryInterviewRepository::new()),
            reviews: Arc::new(InMemoryReviewRepository::new()),
        },
    );

    handler.handle_message("u1", "/plan").await;
    handler.handle_message("u1", "Docker").await;
    handler.handle_message("u1", "intermediate").await;
    let reply = handler.handle_message("u1", "5-7 hours").await;
    assert!(reply.text.contains("Save this plan?"));

    // The write fails; the user is told so and the flow still ends.
    let reply = handler.handle_message("u1", "yes").await;
    assert!(reply.text.contains("could not save"));
    assert!(sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn assessment_save_failure_keeps_the_report_in_the_reply() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let handler = MessageHandler::new(
        Arc::new(ScriptedAgent::new()),
        sessions.clone(),
        Repositories {
            users: Arc::new(InMemoryUserRepository::new()),
            assessments: Arc::new(FailingAssessmentRepository),
            plans: Arc::new(InMemoryPlanRepository::new()),
            interviews: Arc::new(InMemoryInterviewRepository::new()),
            reviews: Arc::new(InMemoryReviewRepository::new()),
        },
    );

    handler.handle_message("u1", "/assess").await;
    let reply = handler
        .handle_message("u1", "Python, Django, 2 years")
        .await;

    // The generated report survives the failed write.
    assert!(reply.text.contains("Assessment result"));
    assert!(reply.text.contains("could not save"));
    assert!(sessions.get("u1").await.is_idle());
}

#[tokio::test]
async fn confirmation_requires_a_standalone_affirmative_word() {
    let fx = fixture();

    fx.handler.handle_message("u1", "/plan").await;
    fx.handler.handle_message("u1", "Docker").await;
    fx.handler.handle_message("u1", "intermediate").await;
    fx.handler.handle_message("u1", "5-7 hours").await;

    // "booking" contains "ok" but is not a confirmation.
    let reply = fx.handler.handle_message("u1", "booking").await;
    assert!(reply.text.contains("discarded"));
    assert!(fx.plans.list_recent("u1", 10).await.unwrap().is_empty());
    assert!(fx.sessions.get("u1").await.is_idle());
}
