//! In-memory repository implementations.
//!
//! Used by tests and by the REPL when no database URL is configured.
//! Records are kept newest-last and sliced newest-first on query, the
//! same ordering contract the SQLite backend provides.

use async_trait::async_trait;
use chrono::Utc;
use interprep_core::error::Result;
use interprep_core::record::{
    AssessmentRecord, AssessmentRepository, InterviewRecord, InterviewRepository, PlanRecord,
    PlanRepository, ReviewRecord, ReviewRepository,
};
use interprep_core::user::{Level, Track, UserProfile, UserRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory user profiles.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_or_create(&self, user_id: &str) -> Result<UserProfile> {
        let mut users = self.users.write().await;
        let profile = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        profile.last_active = Utc::now();
        Ok(profile.clone())
    }

    async fn update_level_track(&self, user_id: &str, level: Level, track: Track) -> Result<()> {
        let mut users = self.users.write().await;
        let profile = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        profile.level = level;
        profile.track = track;
        profile.last_active = Utc::now();
        Ok(())
    }
}

fn recent<T: Clone>(items: &[T], user_matches: impl Fn(&T) -> bool, limit: usize) -> Vec<T> {
    items
        .iter()
        .rev()
        .filter(|item| user_matches(item))
        .take(limit)
        .cloned()
        .collect()
}

/// In-memory assessment history.
#[derive(Default)]
pub struct InMemoryAssessmentRepository {
    records: RwLock<Vec<AssessmentRecord>>,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryAssessmentRepository {
    async fn save(&self, record: &AssessmentRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<AssessmentRecord>> {
        let records = self.records.read().await;
        Ok(recent(&records, |r| r.user_id == user_id, limit))
    }
}

/// In-memory plan history.
#[derive(Default)]
pub struct InMemoryPlanRepository {
    records: RwLock<Vec<PlanRecord>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn save(&self, record: &PlanRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn active_plan(&self, user_id: &str) -> Result<Option<PlanRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .find(|r| r.user_id == user_id && r.is_active)
            .cloned())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<PlanRecord>> {
        let records = self.records.read().await;
        Ok(recent(&records, |r| r.user_id == user_id, limit))
    }
}

/// In-memory interview history.
#[derive(Default)]
pub struct InMemoryInterviewRepository {
    records: RwLock<Vec<InterviewRecord>>,
}

impl InMemoryInterviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewRepository for InMemoryInterviewRepository {
    async fn save(&self, record: &InterviewRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<InterviewRecord>> {
        let records = self.records.read().await;
        Ok(recent(&records, |r| r.user_id == user_id, limit))
    }
}

/// In-memory review history.
#[derive(Default)]
pub struct InMemoryReviewRepository {
    records: RwLock<Vec<ReviewRecord>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn save(&self, record: &ReviewRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<ReviewRecord>> {
        let records = self.records.read().await;
        Ok(recent(&records, |r| r.user_id == user_id, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_returns_same_profile() {
        let repo = InMemoryUserRepository::new();
        let first = repo.get_or_create("u1").await.unwrap();
        let second = repo.get_or_create("u1").await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn update_level_track_persists() {
        let repo = InMemoryUserRepository::new();
        repo.update_level_track("u1", Level::Senior, Track::Data)
            .await
            .unwrap();
        let profile = repo.get_or_create("u1").await.unwrap();
        assert_eq!(profile.level, Level::Senior);
        assert_eq!(profile.track, Track::Data);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_per_user() {
        let repo = InMemoryAssessmentRepository::new();
        for (user, feedback) in [("u1", "old"), ("u2", "other"), ("u1", "new")] {
            let record = AssessmentRecord::new(
                user,
                "skills",
                "junior",
                0.7,
                feedback,
                serde_json::json!({}),
            );
            repo.save(&record).await.unwrap();
        }

        let recent = repo.list_recent("u1", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].feedback, "new");
        assert_eq!(recent[1].feedback, "old");
    }

    #[tokio::test]
    async fn active_plan_returns_newest_active() {
        let repo = InMemoryPlanRepository::new();
        let first = PlanRecord::new(
            "u1",
            "Plan: Docker",
            "containers",
            Track::Backend,
            "intermediate",
            6,
            serde_json::json!({}),
        );
        let second = PlanRecord::new(
            "u1",
            "Plan: Kubernetes",
            "orchestration",
            Track::Backend,
            "advanced",
            8,
            serde_json::json!({}),
        );
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let active = repo.active_plan("u1").await.unwrap().unwrap();
        assert_eq!(active.title, "Plan: Kubernetes");
        assert!(repo.active_plan("u2").await.unwrap().is_none());
    }
}
