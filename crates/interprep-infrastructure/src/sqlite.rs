//! SQLite-backed repositories.
//!
//! Schema mirrors the conventional relational layout: one users table
//! plus one append-only table per record type. All queries are runtime
//! sqlx queries so no database is needed at build time.

use async_trait::async_trait;
use chrono::Utc;
use interprep_core::error::{PrepError, Result};
use interprep_core::record::{
    AssessmentRecord, AssessmentRepository, InterviewRecord, InterviewRepository, PlanRecord,
    PlanRepository, ReviewRecord, ReviewRepository,
};
use interprep_core::user::{Level, Track, UserProfile, UserRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

/// Opens (and creates if missing) the SQLite database at `url`,
/// e.g. `sqlite://data/interprep.db`.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(storage_err)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(storage_err)?;
    Ok(pool)
}

/// Creates all tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            username TEXT,
            level TEXT NOT NULL,
            track TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_active TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS assessments (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            skills_text TEXT NOT NULL,
            level TEXT NOT NULL,
            score REAL NOT NULL,
            feedback TEXT NOT NULL,
            details TEXT NOT NULL,
            assessed_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_assessments_user ON assessments (user_id, assessed_at)",
        "CREATE TABLE IF NOT EXISTS learning_plans (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            track TEXT NOT NULL,
            level TEXT NOT NULL,
            duration_weeks INTEGER NOT NULL,
            plan_data TEXT NOT NULL,
            progress REAL NOT NULL,
            is_active INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_plans_user ON learning_plans (user_id, created_at)",
        "CREATE TABLE IF NOT EXISTS interview_results (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            topic TEXT NOT NULL,
            level TEXT NOT NULL,
            total_questions INTEGER NOT NULL,
            correct_answers INTEGER NOT NULL,
            score REAL NOT NULL,
            feedback TEXT NOT NULL,
            completed_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_interviews_user ON interview_results (user_id, completed_at)",
        "CREATE TABLE IF NOT EXISTS code_reviews (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            language TEXT NOT NULL,
            code_snippet TEXT NOT NULL,
            score REAL NOT NULL,
            issues_found INTEGER NOT NULL,
            feedback TEXT NOT NULL,
            reviewed_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_reviews_user ON code_reviews (user_id, reviewed_at)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(storage_err)?;
    }
    info!("database schema initialized");
    Ok(())
}

fn storage_err(err: impl std::fmt::Display) -> PrepError {
    PrepError::storage(err.to_string())
}

fn json_column(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null)
}

/// SQLite user profiles.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_or_create(&self, user_id: &str) -> Result<UserProfile> {
        let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        if let Some(row) = row {
            let now = Utc::now();
            sqlx::query("UPDATE users SET last_active = ? WHERE user_id = ?")
                .bind(now)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;

            let level: String = row.try_get("level").map_err(storage_err)?;
            let track: String = row.try_get("track").map_err(storage_err)?;
            return Ok(UserProfile {
                user_id: row.try_get("user_id").map_err(storage_err)?,
                username: row.try_get("username").map_err(storage_err)?,
                // A corrupted row degrades to defaults instead of
                // breaking the conversation.
                level: level.parse().unwrap_or_default(),
                track: track.parse().unwrap_or_default(),
                created_at: row.try_get("created_at").map_err(storage_err)?,
                last_active: now,
            });
        }

        let profile = UserProfile::new(user_id);
        sqlx::query(
            "INSERT INTO users (user_id, username, level, track, created_at, last_active)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.user_id)
        .bind(&profile.username)
        .bind(profile.level.to_string())
        .bind(profile.track.to_string())
        .bind(profile.created_at)
        .bind(profile.last_active)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(profile)
    }

    async fn update_level_track(&self, user_id: &str, level: Level, track: Track) -> Result<()> {
        // Ensure the row exists before updating it.
        self.get_or_create(user_id).await?;
        sqlx::query("UPDATE users SET level = ?, track = ?, last_active = ? WHERE user_id = ?")
            .bind(level.to_string())
            .bind(track.to_string())
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

/// SQLite assessment history.
pub struct SqliteAssessmentRepository {
    pool: SqlitePool,
}

impl SqliteAssessmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentRepository for SqliteAssessmentRepository {
    async fn save(&self, record: &AssessmentRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO assessments
             (id, user_id, skills_text, level, score, feedback, details, assessed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.skills_text)
        .bind(&record.level)
        .bind(record.score as f64)
        .bind(&record.feedback)
        .bind(record.details.to_string())
        .bind(record.assessed_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<AssessmentRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM assessments WHERE user_id = ? ORDER BY assessed_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter()
            .map(|row| {
                let details: String = row.try_get("details").map_err(storage_err)?;
                let score: f64 = row.try_get("score").map_err(storage_err)?;
                Ok(AssessmentRecord {
                    id: row.try_get("id").map_err(storage_err)?,
                    user_id: row.try_get("user_id").map_err(storage_err)?,
                    skills_text: row.try_get("skills_text").map_err(storage_err)?,
                    level: row.try_get("level").map_err(storage_err)?,
                    score: score as f32,
                    feedback: row.try_get("feedback").map_err(storage_err)?,
                    details: json_column(details),
                    assessed_at: row.try_get("assessed_at").map_err(storage_err)?,
                })
            })
            .collect()
    }
}

/// SQLite plan history.
pub struct SqlitePlanRepository {
    pool: SqlitePool,
}

impl SqlitePlanRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_plan(row: &sqlx::sqlite::SqliteRow) -> Result<PlanRecord> {
        let track: String = row.try_get("track").map_err(storage_err)?;
        let plan_data: String = row.try_get("plan_data").map_err(storage_err)?;
        let duration_weeks: i64 = row.try_get("duration_weeks").map_err(storage_err)?;
        let progress: f64 = row.try_get("progress").map_err(storage_err)?;
        Ok(PlanRecord {
            id: row.try_get("id").map_err(storage_err)?,
            user_id: row.try_get("user_id").map_err(storage_err)?,
            title: row.try_get("title").map_err(storage_err)?,
            description: row.try_get("description").map_err(storage_err)?,
            track: track.parse().unwrap_or_default(),
            level: row.try_get("level").map_err(storage_err)?,
            duration_weeks: duration_weeks as u32,
            plan_data: json_column(plan_data),
            progress: progress as f32,
            is_active: row.try_get("is_active").map_err(storage_err)?,
            created_at: row.try_get("created_at").map_err(storage_err)?,
        })
    }
}

#[async_trait]
impl PlanRepository for SqlitePlanRepository {
    async fn save(&self, record: &PlanRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO learning_plans
             (id, user_id, title, description, track, level, duration_weeks,
              plan_data, progress, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.track.to_string())
        .bind(&record.level)
        .bind(record.duration_weeks as i64)
        .bind(record.plan_data.to_string())
        .bind(record.progress as f64)
        .bind(record.is_active)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn active_plan(&self, user_id: &str) -> Result<Option<PlanRecord>> {
        let row = sqlx::query(
            "SELECT * FROM learning_plans WHERE user_id = ? AND is_active = 1
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.as_ref().map(Self::row_to_plan).transpose()
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<PlanRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM learning_plans WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter().map(Self::row_to_plan).collect()
    }
}

/// SQLite interview history.
pub struct SqliteInterviewRepository {
    pool: SqlitePool,
}

impl SqliteInterviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewRepository for SqliteInterviewRepository {
    async fn save(&self, record: &InterviewRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO interview_results
             (id, user_id, topic, level, total_questions, correct_answers,
              score, feedback, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.topic)
        .bind(&record.level)
        .bind(record.total_questions as i64)
        .bind(record.correct_answers as i64)
        .bind(record.score as f64)
        .bind(&record.feedback)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<InterviewRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM interview_results WHERE user_id = ? ORDER BY completed_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter()
            .map(|row| {
                let total_questions: i64 = row.try_get("total_questions").map_err(storage_err)?;
                let correct_answers: i64 = row.try_get("correct_answers").map_err(storage_err)?;
                let score: f64 = row.try_get("score").map_err(storage_err)?;
                Ok(InterviewRecord {
                    id: row.try_get("id").map_err(storage_err)?,
                    user_id: row.try_get("user_id").map_err(storage_err)?,
                    topic: row.try_get("topic").map_err(storage_err)?,
                    level: row.try_get("level").map_err(storage_err)?,
                    total_questions: total_questions as u32,
                    correct_answers: correct_answers as u32,
                    score: score as f32,
                    feedback: row.try_get("feedback").map_err(storage_err)?,
                    completed_at: row.try_get("completed_at").map_err(storage_err)?,
                })
            })
            .collect()
    }
}

/// SQLite review history.
pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn save(&self, record: &ReviewRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO code_reviews
             (id, user_id, language, code_snippet, score, issues_found, feedback, reviewed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.language)
        .bind(&record.code_snippet)
        .bind(record.score as f64)
        .bind(record.issues_found as i64)
        .bind(&record.feedback)
        .bind(record.reviewed_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<ReviewRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM code_reviews WHERE user_id = ? ORDER BY reviewed_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter()
            .map(|row| {
                let issues_found: i64 = row.try_get("issues_found").map_err(storage_err)?;
                let score: f64 = row.try_get("score").map_err(storage_err)?;
                Ok(ReviewRecord {
                    id: row.try_get("id").map_err(storage_err)?,
                    user_id: row.try_get("user_id").map_err(storage_err)?,
                    language: row.try_get("language").map_err(storage_err)?,
                    code_snippet: row.try_get("code_snippet").map_err(storage_err)?,
                    score: score as f32,
                    issues_found: issues_found as u32,
                    feedback: row.try_get("feedback").map_err(storage_err)?,
                    reviewed_at: row.try_get("reviewed_at").map_err(storage_err)?,
                })
            })
            .collect()
    }
}
