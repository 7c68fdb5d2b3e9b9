//! Skills-assessment flow.
//!
//! Two turns: a prompt for a free-text skills description, then the
//! generated assessment. A generation failure produces a canned reply
//! and persists nothing; a storage failure still shows the assessment
//! but tells the user it was not saved.

use crate::flows::{extract_json, generate_with_timeout};
use crate::reply::Reply;
use interprep_core::record::{AssessmentRecord, AssessmentRepository};
use interprep_core::session::{Mode, SessionStore};
use interprep_core::user::UserProfile;
use interprep_interaction::{GenerationAgent, GenerationRequest};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Parsed shape of a generated assessment. Every field is defaulted so
/// a partially well-formed response still yields a usable report.
#[derive(Debug, Deserialize)]
struct AssessmentReport {
    #[serde(default = "default_level")]
    level: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

fn default_level() -> String {
    "junior".to_string()
}

fn default_confidence() -> f32 {
    0.5
}

pub struct AssessmentFlow {
    agent: Arc<dyn GenerationAgent>,
    assessments: Arc<dyn AssessmentRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl AssessmentFlow {
    pub fn new(
        agent: Arc<dyn GenerationAgent>,
        assessments: Arc<dyn AssessmentRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            agent,
            assessments,
            sessions,
        }
    }

    /// Starts the flow: the next message is the skills payload.
    pub async fn start(&self, user_id: &str) -> Reply {
        self.sessions
            .set(user_id, Mode::AwaitingSkills, HashMap::new())
            .await;
        Reply::text(
            "Describe your skills and experience in one message.\n\
             For example: \"Python, Django, 2 years of backend work, \
             some SQL and Docker\".",
        )
    }

    /// Assesses a skills description and persists the outcome.
    pub async fn process_skills(&self, profile: &UserProfile, skills_text: &str) -> Reply {
        let request = GenerationRequest::Assessment {
            skills: skills_text.to_string(),
            level: profile.level,
            track: profile.track,
        };

        let raw = match generate_with_timeout(self.agent.as_ref(), request).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(user_id = %profile.user_id, error = %err, "assessment generation failed");
                self.sessions.clear(&profile.user_id).await;
                return Reply::text(
                    "I could not assess your skills right now. \
                     Please try /assess again in a minute.",
                );
            }
        };

        let details: serde_json::Value =
            serde_json::from_str(extract_json(&raw)).unwrap_or(serde_json::Value::Null);
        let report: AssessmentReport = match serde_json::from_str(extract_json(&raw)) {
            Ok(report) => report,
            Err(_) => AssessmentReport {
                level: default_level(),
                confidence: default_confidence(),
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                recommendations: vec![raw.trim().to_string()],
            },
        };

        let feedback = render_report(&report);
        let record = AssessmentRecord::new(
            &profile.user_id,
            skills_text,
            &report.level,
            report.confidence,
            &feedback,
            details,
        );

        let mut reply_text = feedback;
        if let Err(err) = self.assessments.save(&record).await {
            warn!(user_id = %profile.user_id, error = %err, "failed to save assessment");
            reply_text.push_str("\n\n(Note: I could not save this assessment to your history.)");
        } else {
            info!(user_id = %profile.user_id, level = %report.level, "assessment saved");
        }

        self.sessions.clear(&profile.user_id).await;
        Reply::text(reply_text)
            .with_quick_replies(["/plan", "/interview", "/progress"])
    }
}

fn render_report(report: &AssessmentReport) -> String {
    let mut out = format!(
        "Assessment result: {} level (confidence {:.0}%).",
        report.level,
        report.confidence * 100.0
    );
    if !report.strengths.is_empty() {
        out.push_str(&format!("\nStrengths: {}.", report.strengths.join(", ")));
    }
    if !report.weaknesses.is_empty() {
        out.push_str(&format!(
            "\nAreas to improve: {}.",
            report.weaknesses.join(", ")
        ));
    }
    if !report.recommendations.is_empty() {
        out.push_str(&format!(
            "\nRecommendations: {}.",
            report.recommendations.join("; ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use interprep_core::session::InMemorySessionStore;

    struct NoopAssessments;

    #[async_trait::async_trait]
    impl AssessmentRepository for NoopAssessments {
        async fn save(&self, _record: &AssessmentRecord) -> interprep_core::error::Result<()> {
            Ok(())
        }

        async fn list_recent(
            &self,
            _user_id: &str,
            _limit: usize,
        ) -> interprep_core::error::Result<Vec<AssessmentRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn report_renders_all_sections() {
        let report = AssessmentReport {
            level: "middle".to_string(),
            confidence: 0.8,
            strengths: vec!["python".to_string()],
            weaknesses: vec!["system design".to_string()],
            recommendations: vec!["practice".to_string()],
        };
        let text = render_report(&report);
        assert!(text.contains("middle"));
        assert!(text.contains("80%"));
        assert!(text.contains("python"));
        assert!(text.contains("system design"));
    }

    #[tokio::test]
    async fn start_sets_awaiting_skills() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let flow = AssessmentFlow::new(
            Arc::new(interprep_interaction::ScriptedAgent::new()),
            Arc::new(NoopAssessments),
            sessions.clone(),
        );
        let reply = flow.start("u1").await;
        assert!(reply.text.contains("skills"));
        assert_eq!(sessions.get("u1").await.mode, Mode::AwaitingSkills);
    }
}
