//! Record repository traits.
//!
//! Each capability owns one append-only record type; these traits
//! define the persistence contract the flow controllers rely on. All
//! failures surface as `PrepError::Storage` and are handled locally by
//! the flows.

use super::model::{AssessmentRecord, InterviewRecord, PlanRecord, ReviewRecord};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for skills-assessment outcomes.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Appends a new assessment record.
    async fn save(&self, record: &AssessmentRecord) -> Result<()>;

    /// Lists the most recent assessments for a user, newest first.
    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<AssessmentRecord>>;
}

/// Persistence for learning plans.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Appends a new plan record.
    async fn save(&self, record: &PlanRecord) -> Result<()>;

    /// Returns the newest active plan for a user, if any.
    async fn active_plan(&self, user_id: &str) -> Result<Option<PlanRecord>>;

    /// Lists the most recent plans for a user, newest first.
    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<PlanRecord>>;
}

/// Persistence for interview outcomes.
#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Appends a new interview record.
    async fn save(&self, record: &InterviewRecord) -> Result<()>;

    /// Lists the most recent interview results for a user, newest first.
    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<InterviewRecord>>;
}

/// Persistence for code-review outcomes.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Appends a new review record.
    async fn save(&self, record: &ReviewRecord) -> Result<()>;

    /// Lists the most recent reviews for a user, newest first.
    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<ReviewRecord>>;
}
