//! Code-review flow.
//!
//! Two turns: a prompt for a snippet, then the generated review. The
//! source language is detected with a keyword heuristic before the
//! snippet is sent off, so the record carries a language even when
//! generation output is unusable.

use crate::flows::{extract_json, generate_with_timeout};
use crate::reply::Reply;
use interprep_core::record::{ReviewRecord, ReviewRepository};
use interprep_core::session::{Mode, SessionStore};
use interprep_core::user::UserProfile;
use interprep_interaction::{GenerationAgent, GenerationRequest};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct ReviewEvaluation {
    #[serde(default = "default_score")]
    score: f32,
    #[serde(default)]
    issues_found: u32,
    #[serde(default)]
    feedback: String,
}

fn default_score() -> f32 {
    50.0
}

pub struct ReviewFlow {
    agent: Arc<dyn GenerationAgent>,
    reviews: Arc<dyn ReviewRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl ReviewFlow {
    pub fn new(
        agent: Arc<dyn GenerationAgent>,
        reviews: Arc<dyn ReviewRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            agent,
            reviews,
            sessions,
        }
    }

    /// Starts the flow: the next message is the code snippet.
    pub async fn start(&self, user_id: &str) -> Reply {
        self.sessions
            .set(user_id, Mode::AwaitingCode, HashMap::new())
            .await;
        Reply::text("Paste the code you want reviewed, all in one message.")
    }

    /// Reviews a snippet and persists the outcome.
    pub async fn handle_code(&self, profile: &UserProfile, code: &str) -> Reply {
        let language = detect_language(code);

        let request = GenerationRequest::CodeReview {
            language: language.to_string(),
            code: code.to_string(),
        };
        let raw = match generate_with_timeout(self.agent.as_ref(), request).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(user_id = %profile.user_id, error = %err, "code review generation failed");
                self.sessions.clear(&profile.user_id).await;
                return Reply::text(
                    "I could not review the code right now. \
                     Nothing was recorded; try /review again in a minute.",
                );
            }
        };

        let evaluation: ReviewEvaluation = match serde_json::from_str(extract_json(&raw)) {
            Ok(evaluation) => evaluation,
            Err(_) => ReviewEvaluation {
                score: default_score(),
                issues_found: 0,
                feedback: raw.trim().to_string(),
            },
        };

        let record = ReviewRecord::new(
            &profile.user_id,
            language,
            code,
            evaluation.score,
            evaluation.issues_found,
            &evaluation.feedback,
        );

        let mut reply_text = format!(
            "Review ({language}): score {:.0}/100, {} issue(s) found.\n\n{}",
            evaluation.score, evaluation.issues_found, evaluation.feedback
        );
        if let Err(err) = self.reviews.save(&record).await {
            warn!(user_id = %profile.user_id, error = %err, "failed to save code review");
            reply_text.push_str("\n\n(Note: I could not save this review to your history.)");
        } else {
            info!(user_id = %profile.user_id, language, "code review saved");
        }

        self.sessions.clear(&profile.user_id).await;
        Reply::text(reply_text).with_quick_replies(["/review", "/progress"])
    }
}

/// Best-effort language detection from snippet keywords.
fn detect_language(code: &str) -> &'static str {
    if code.contains("def ") || (code.contains("import ") && code.contains(':')) {
        "python"
    } else if code.contains("fn ") || code.contains("let mut ") {
        "rust"
    } else if code.contains("function ") || code.contains("const ") || code.contains("=>") {
        "javascript"
    } else if code.contains("public class ") || code.contains("void ") {
        "java"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_languages() {
        assert_eq!(detect_language("def main():\n    pass"), "python");
        assert_eq!(detect_language("fn main() {}"), "rust");
        assert_eq!(detect_language("const add = (a, b) => a + b;"), "javascript");
        assert_eq!(
            detect_language("public class Main { void run() {} }"),
            "java"
        );
        assert_eq!(detect_language("SELECT 1"), "unknown");
    }

    #[test]
    fn evaluation_parse_defaults_on_partial_json() {
        let evaluation: ReviewEvaluation = serde_json::from_str(r#"{"score": 80}"#).unwrap();
        assert_eq!(evaluation.score, 80.0);
        assert_eq!(evaluation.issues_found, 0);
    }
}
