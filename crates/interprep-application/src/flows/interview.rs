//! Interview-practice flow.
//!
//! One round per flow run: a question from the track's bank is asked,
//! the answer is scored by the generation service, and the outcome is
//! recorded. Questions rotate through the bank with a per-process
//! counter so repeated runs see different questions.

use crate::flows::{extract_json, generate_with_timeout};
use crate::reply::Reply;
use interprep_core::record::{InterviewRecord, InterviewRepository};
use interprep_core::session::{Mode, SessionStore, UserSession, slot};
use interprep_core::user::{Track, UserProfile};
use interprep_interaction::{GenerationAgent, GenerationRequest};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// Score at or above which the answer counts as correct.
const PASS_SCORE: f32 = 70.0;

#[derive(Debug, Deserialize)]
struct AnswerEvaluation {
    #[serde(default = "default_score")]
    score: f32,
    #[serde(default)]
    feedback: String,
}

fn default_score() -> f32 {
    50.0
}

pub struct InterviewFlow {
    agent: Arc<dyn GenerationAgent>,
    interviews: Arc<dyn InterviewRepository>,
    sessions: Arc<dyn SessionStore>,
    next_question: AtomicUsize,
}

impl InterviewFlow {
    pub fn new(
        agent: Arc<dyn GenerationAgent>,
        interviews: Arc<dyn InterviewRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            agent,
            interviews,
            sessions,
            next_question: AtomicUsize::new(0),
        }
    }

    /// Asks a question from the user's track and waits for the answer.
    pub async fn start(&self, profile: &UserProfile) -> Reply {
        let bank = question_bank(profile.track);
        let index = self.next_question.fetch_add(1, Ordering::Relaxed) % bank.len();
        let question = bank[index];

        let slots = HashMap::from([(slot::QUESTION.to_string(), question.to_string())]);
        self.sessions
            .set(&profile.user_id, Mode::AwaitingInterviewAnswer, slots)
            .await;

        Reply::text(format!(
            "Interview practice ({} track, {} level).\n\nQuestion: {question}\n\n\
             Answer in your own words; I will score it and give feedback.",
            profile.track, profile.level
        ))
    }

    /// Scores the answer and records the round.
    pub async fn handle_answer(
        &self,
        profile: &UserProfile,
        session: &UserSession,
        answer: &str,
    ) -> Reply {
        let question = session
            .slot(slot::QUESTION)
            .unwrap_or("the interview question")
            .to_string();

        let request = GenerationRequest::InterviewFeedback {
            question: question.clone(),
            answer: answer.to_string(),
            level: profile.level,
            track: profile.track,
        };

        let raw = match generate_with_timeout(self.agent.as_ref(), request).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(user_id = %profile.user_id, error = %err, "interview evaluation failed");
                self.sessions.clear(&profile.user_id).await;
                return Reply::text(
                    "I could not evaluate your answer right now. \
                     The round was not recorded; try /interview again in a minute.",
                );
            }
        };

        let evaluation: AnswerEvaluation = match serde_json::from_str(extract_json(&raw)) {
            Ok(evaluation) => evaluation,
            Err(_) => AnswerEvaluation {
                score: default_score(),
                feedback: raw.trim().to_string(),
            },
        };

        let mut record = InterviewRecord::new(
            &profile.user_id,
            profile.track.to_string(),
            profile.level.to_string(),
            evaluation.score,
            &evaluation.feedback,
        );
        record.correct_answers = u32::from(evaluation.score >= PASS_SCORE);

        let mut reply_text = format!(
            "Score: {:.0}/100.\n\n{}",
            evaluation.score, evaluation.feedback
        );
        if let Err(err) = self.interviews.save(&record).await {
            warn!(user_id = %profile.user_id, error = %err, "failed to save interview result");
            reply_text.push_str("\n\n(Note: I could not save this round to your history.)");
        } else {
            info!(user_id = %profile.user_id, score = evaluation.score, "interview round saved");
        }

        self.sessions.clear(&profile.user_id).await;
        Reply::text(reply_text).with_quick_replies(["/interview", "/progress"])
    }
}

/// Fixed question bank per track.
fn question_bank(track: Track) -> &'static [&'static str] {
    match track {
        Track::Backend => &[
            "How does an index speed up a database query, and when can it hurt?",
            "Walk me through what happens when a client sends an HTTP request to your API.",
            "How would you design idempotent retry handling for a payment endpoint?",
        ],
        Track::Frontend => &[
            "What causes layout thrashing in a browser and how do you avoid it?",
            "Explain the difference between debouncing and throttling with a use case for each.",
            "How does the virtual DOM reconciliation work at a high level?",
        ],
        Track::Python => &[
            "What is the GIL and how does it affect multithreaded Python programs?",
            "Explain the difference between a list comprehension and a generator expression.",
            "How do context managers work, and when would you write your own?",
        ],
        Track::Java => &[
            "Compare ArrayList and LinkedList: memory layout and operation costs.",
            "What guarantees does the volatile keyword give you, and what does it not?",
            "How does the JVM garbage collector decide what to collect?",
        ],
        Track::Data => &[
            "When would you choose a columnar storage format over a row-oriented one?",
            "Explain the bias-variance trade-off in your own words.",
            "How would you detect and handle data drift in a production pipeline?",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_track_has_a_question_bank() {
        for track in [
            Track::Backend,
            Track::Frontend,
            Track::Python,
            Track::Java,
            Track::Data,
        ] {
            assert!(!question_bank(track).is_empty());
        }
    }

    #[test]
    fn evaluation_parse_defaults_on_partial_json() {
        let evaluation: AnswerEvaluation =
            serde_json::from_str(r#"{"feedback": "decent"}"#).unwrap();
        assert_eq!(evaluation.score, 50.0);
        assert_eq!(evaluation.feedback, "decent");
    }
}
