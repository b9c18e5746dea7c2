use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cleaner_core::Stage;
use cleaner_engine::{
    poll_until_done, CleanConfig, CleanOutcome, CompanionApi, CompanionError, JobStatus, PollError,
    PollPlan, StartedJob, UploadTestResult,
};

fn status(success: u64, upload_total: u64, done: bool) -> JobStatus {
    JobStatus {
        job_id: "j1".to_string(),
        total: 3,
        success,
        failed: 0,
        upload_total,
        upload_success: 0,
        upload_failed: 0,
        done,
        error: None,
    }
}

/// Replays a fixed sequence of status payloads.
struct ScriptedCompanion {
    statuses: Mutex<VecDeque<JobStatus>>,
}

impl ScriptedCompanion {
    fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
        }
    }
}

#[async_trait]
impl CompanionApi for ScriptedCompanion {
    async fn start_job(&self, _config: &CleanConfig) -> Result<StartedJob, CompanionError> {
        unimplemented!("not used by polling tests")
    }

    async fn poll_status(&self, _job_id: &str) -> Result<JobStatus, CompanionError> {
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CompanionError::Transport("script exhausted".to_string()))
    }

    async fn health_check(&self) -> Result<(), CompanionError> {
        unimplemented!("not used by polling tests")
    }

    async fn upload_test(&self, _upload_url: &str) -> Result<UploadTestResult, CompanionError> {
        unimplemented!("not used by polling tests")
    }

    async fn run_clean(&self, _config: &CleanConfig) -> Result<CleanOutcome, CompanionError> {
        unimplemented!("not used by polling tests")
    }
}

fn fast_plan(max_attempts: usize) -> PollPlan {
    PollPlan {
        interval: Duration::ZERO,
        max_attempts,
    }
}

#[tokio::test]
async fn polls_until_done_and_reports_each_payload() {
    let companion = ScriptedCompanion::new(vec![
        status(1, 0, false),
        status(3, 0, false),
        status(3, 2, true),
    ]);

    let mut stages = Vec::new();
    let final_status = poll_until_done(&companion, "j1", &fast_plan(10), |s| {
        stages.push(s.stage());
    })
    .await
    .expect("poll completes");

    assert!(final_status.done);
    assert_eq!(stages, vec![Stage::Clean, Stage::Clean, Stage::Upload]);
}

#[tokio::test]
async fn attempt_cap_stops_a_job_that_never_finishes() {
    let companion = ScriptedCompanion::new(vec![status(0, 0, false), status(1, 0, false)]);

    let err = poll_until_done(&companion, "j1", &fast_plan(2), |_| {})
        .await
        .unwrap_err();
    match err {
        PollError::AttemptsExhausted { job_id, attempts } => {
            assert_eq!(job_id, "j1");
            assert_eq!(attempts, 2);
        }
        other => panic!("expected AttemptsExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn companion_errors_propagate() {
    let companion = ScriptedCompanion::new(Vec::new());
    let err = poll_until_done(&companion, "j1", &fast_plan(3), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, PollError::Companion(_)), "got {err:?}");
}
