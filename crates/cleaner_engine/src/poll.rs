use std::time::Duration;

use thiserror::Error;

use crate::companion::{CompanionApi, CompanionError, JobStatus};

/// Polling cadence and bound. The companion service is the source of truth
/// for terminal state; the cap only protects against a job that never
/// reports `done`.
#[derive(Debug, Clone)]
pub struct PollPlan {
    pub interval: Duration,
    pub max_attempts: usize,
}

impl Default for PollPlan {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 600,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Companion(#[from] CompanionError),
    #[error("job {job_id} not done after {attempts} polls")]
    AttemptsExhausted { job_id: String, attempts: usize },
}

/// Polls at a fixed interval until the service reports `done`, invoking
/// `on_status` with every payload along the way.
pub async fn poll_until_done(
    companion: &dyn CompanionApi,
    job_id: &str,
    plan: &PollPlan,
    mut on_status: impl FnMut(&JobStatus),
) -> Result<JobStatus, PollError> {
    for attempt in 0..plan.max_attempts {
        let status = companion.poll_status(job_id).await?;
        on_status(&status);
        if status.done {
            return Ok(status);
        }
        if attempt + 1 < plan.max_attempts {
            tokio::time::sleep(plan.interval).await;
        }
    }
    Err(PollError::AttemptsExhausted {
        job_id: job_id.to_string(),
        attempts: plan.max_attempts,
    })
}
