//! Message dispatcher.
//!
//! `MessageHandler` is the single entry point a front end calls per
//! inbound message. Dispatch order: slash commands first, then an
//! active flow (by session mode), then the intent router. The handler
//! never fails outward; storage and generation problems degrade the
//! reply and are logged.

use crate::flows::{AssessmentFlow, InterviewFlow, PlanningFlow, ReviewFlow};
use crate::reply::Reply;
use interprep_core::command::Command;
use interprep_core::record::{
    AssessmentRepository, InterviewRepository, PlanRepository, ReviewRepository,
};
use interprep_core::router::{Capability, route};
use interprep_core::session::{Mode, SessionStore};
use interprep_core::user::{Level, Track, UserProfile, UserRepository};
use interprep_interaction::GenerationAgent;
use std::sync::Arc;
use tracing::{info, warn};

const WELCOME: &str = "Hi! I help you prepare for IT interviews.\n\n\
    /assess — evaluate your current skills\n\
    /plan — build a weekly learning plan\n\
    /interview — practice an interview question\n\
    /review — get a code review\n\
    /progress — see your history\n\
    /begin <level> <track> — set your profile\n\
    /cancel — abandon the current flow\n\n\
    Or just tell me what you want, e.g. \"I want to learn Docker\".";

/// History shown and aggregated by `/progress`.
const PROGRESS_WINDOW: usize = 50;

/// All persistence the handler needs, bundled for construction.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub assessments: Arc<dyn AssessmentRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub interviews: Arc<dyn InterviewRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

pub struct MessageHandler {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    assessments: Arc<dyn AssessmentRepository>,
    plans: Arc<dyn PlanRepository>,
    interviews: Arc<dyn InterviewRepository>,
    reviews: Arc<dyn ReviewRepository>,
    assessment_flow: AssessmentFlow,
    planning_flow: PlanningFlow,
    interview_flow: InterviewFlow,
    review_flow: ReviewFlow,
}

impl MessageHandler {
    pub fn new(
        agent: Arc<dyn GenerationAgent>,
        sessions: Arc<dyn SessionStore>,
        repositories: Repositories,
    ) -> Self {
        let assessment_flow = AssessmentFlow::new(
            agent.clone(),
            repositories.assessments.clone(),
            sessions.clone(),
        );
        let planning_flow =
            PlanningFlow::new(agent.clone(), repositories.plans.clone(), sessions.clone());
        let interview_flow = InterviewFlow::new(
            agent.clone(),
            repositories.interviews.clone(),
            sessions.clone(),
        );
        let review_flow = ReviewFlow::new(agent, repositories.reviews.clone(), sessions.clone());

        Self {
            users: repositories.users,
            sessions,
            assessments: repositories.assessments,
            plans: repositories.plans,
            interviews: repositories.interviews,
            reviews: repositories.reviews,
            assessment_flow,
            planning_flow,
            interview_flow,
            review_flow,
        }
    }

    /// Handles one inbound message and produces the reply.
    pub async fn handle_message(&self, user_id: &str, text: &str) -> Reply {
        let text = text.trim();
        if text.is_empty() {
            return Reply::text("Send me a message, or /help for an overview.");
        }

        // Profile lookup degrades to an in-memory default; the message
        // is still handled even when the user store is down.
        let profile = match self.users.get_or_create(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user_id, error = %err, "user profile lookup failed, using defaults");
                UserProfile::new(user_id)
            }
        };

        // 1. Slash commands bypass everything else.
        if let Some(parsed) = Command::parse(text) {
            return match parsed {
                Ok(command) => self.dispatch_command(&profile, command).await,
                Err(err) => Reply::text(err.to_string()),
            };
        }

        // 2. An active flow owns every non-command message.
        let session = self.sessions.get(user_id).await;
        if !session.is_idle() {
            return match session.mode {
                Mode::AwaitingSkills => {
                    self.assessment_flow.process_skills(&profile, text).await
                }
                Mode::CollectingPlanGoal
                | Mode::CollectingPlanLevel
                | Mode::CollectingPlanTime
                | Mode::ConfirmingPlan => self.planning_flow.handle(&profile, &session, text).await,
                Mode::AwaitingInterviewAnswer => {
                    self.interview_flow
                        .handle_answer(&profile, &session, text)
                        .await
                }
                Mode::AwaitingCode => self.review_flow.handle_code(&profile, text).await,
                Mode::Idle => unreachable!("is_idle checked above"),
            };
        }

        // 3. Idle: let the router decide.
        let decision = route(text, &session);
        info!(
            user_id,
            capability = %decision.capability,
            confidence = decision.confidence,
            rationale = %decision.rationale,
            "message routed"
        );

        match decision.capability {
            Capability::Assessor => self.assessment_flow.process_skills(&profile, text).await,
            // The triggering message names what the user wants to
            // learn, so it doubles as the plan topic.
            Capability::Planner => self.planning_flow.start_with_topic(user_id, text).await,
            Capability::Interviewer => self.interview_flow.start(&profile).await,
            Capability::Reviewer => self.review_flow.start(user_id).await,
            Capability::Helper => Reply::text(
                "I am not sure what you want to do. Try one of the commands below.",
            )
            .with_quick_replies(["/assess", "/plan", "/interview", "/review", "/help"]),
        }
    }

    async fn dispatch_command(&self, profile: &UserProfile, command: Command) -> Reply {
        match command {
            Command::Start | Command::Help => Reply::text(WELCOME),
            Command::Assess => self.assessment_flow.start(&profile.user_id).await,
            Command::Plan => self.planning_flow.start(&profile.user_id).await,
            Command::Interview => self.interview_flow.start(profile).await,
            Command::Review => self.review_flow.start(&profile.user_id).await,
            Command::Progress => self.progress_report(profile).await,
            Command::Cancel => {
                self.sessions.clear(&profile.user_id).await;
                Reply::text("Cancelled. What would you like to do next?")
                    .with_quick_replies(["/assess", "/plan", "/interview", "/review"])
            }
            Command::Begin { level, track } => self.begin(profile, level, track).await,
        }
    }

    async fn begin(&self, profile: &UserProfile, level: Level, track: Track) -> Reply {
        if let Err(err) = self
            .users
            .update_level_track(&profile.user_id, level, track)
            .await
        {
            warn!(user_id = %profile.user_id, error = %err, "failed to update profile");
            return Reply::text(
                "I could not update your profile right now. Please try /begin again later.",
            );
        }

        info!(user_id = %profile.user_id, %level, %track, "profile updated");
        let mut reply = self.assessment_flow.start(&profile.user_id).await;
        reply.text = format!(
            "Profile set: {level} {track}.\n\n{}",
            reply.text
        );
        reply
    }

    async fn progress_report(&self, profile: &UserProfile) -> Reply {
        let user_id = &profile.user_id;

        let assessments = self.assessments.list_recent(user_id, PROGRESS_WINDOW).await;
        let plans = self.plans.list_recent(user_id, PROGRESS_WINDOW).await;
        let interviews = self.interviews.list_recent(user_id, PROGRESS_WINDOW).await;
        let reviews = self.reviews.list_recent(user_id, PROGRESS_WINDOW).await;
        let active_plan = self.plans.active_plan(user_id).await;

        let (Ok(assessments), Ok(plans), Ok(interviews), Ok(reviews), Ok(active_plan)) =
            (assessments, plans, interviews, reviews, active_plan)
        else {
            warn!(user_id, "failed to load progress history");
            return Reply::text("I could not load your history right now. Try again later.");
        };

        let mut out = format!(
            "Your progress ({} {} track):\n",
            profile.level, profile.track
        );
        out.push_str(&format!(
            "- Assessments: {}\n- Plans: {}\n- Interview rounds: {}\n- Code reviews: {}\n",
            assessments.len(),
            plans.len(),
            interviews.len(),
            reviews.len()
        ));

        if let Some(latest) = assessments.first() {
            out.push_str(&format!(
                "\nLatest assessment: {} (confidence {:.0}%).\n",
                latest.level,
                latest.score * 100.0
            ));
        }
        if let Some(plan) = active_plan {
            out.push_str(&format!(
                "Active plan: {} — {} weeks, {:.0}% done.\n",
                plan.title,
                plan.duration_weeks,
                plan.progress * 100.0
            ));
        }
        if !interviews.is_empty() {
            let average: f32 =
                interviews.iter().map(|round| round.score).sum::<f32>() / interviews.len() as f32;
            out.push_str(&format!("Average interview score: {average:.0}/100.\n"));
        }
        if assessments.is_empty() && plans.is_empty() && interviews.is_empty() && reviews.is_empty()
        {
            out.push_str("\nNothing here yet. Start with /assess or /plan.");
        }

        Reply::text(out)
    }
}
