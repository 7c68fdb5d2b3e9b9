//! Durable capability outputs: one append-only record per completed
//! flow, plus the repository traits that persist and query them.

mod model;
mod repository;

pub use model::{AssessmentRecord, InterviewRecord, PlanRecord, ReviewRecord};
pub use repository::{
    AssessmentRepository, InterviewRepository, PlanRepository, ReviewRepository,
};
