//! Flow controllers, one per capability.
//!
//! Each controller owns the multi-turn choreography of its flow:
//! prompting, slot collection, calling the generation adapter, and
//! persisting the final record. Controllers handle their own failures;
//! a generation or storage error degrades the reply, it never
//! propagates to the dispatcher.

pub mod assessment;
pub mod interview;
pub mod planning;
pub mod review;

pub use assessment::AssessmentFlow;
pub use interview::InterviewFlow;
pub use planning::PlanningFlow;
pub use review::ReviewFlow;

pub(crate) use interprep_core::planning::extract_json;

use interprep_interaction::{GenerationAgent, GenerationError, GenerationRequest};
use std::time::Duration;
use tracing::warn;

/// Upper bound on a single generation call.
pub(crate) const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Calls the agent with the flow-wide deadline applied.
pub(crate) async fn generate_with_timeout(
    agent: &dyn GenerationAgent,
    request: GenerationRequest,
) -> Result<String, GenerationError> {
    let kind = request.kind();
    match tokio::time::timeout(GENERATION_TIMEOUT, agent.generate(request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(kind, "generation call exceeded deadline");
            Err(GenerationError::Timeout)
        }
    }
}
