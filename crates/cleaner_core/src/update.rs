use crate::path::path_contains_segment;
use crate::{ActiveJob, AgentState, Effect, JobSource, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AgentState, msg: Msg) -> (AgentState, Vec<Effect>) {
    let effects = match msg {
        Msg::DownloadCompleted { path, policy } => {
            // Only downloads that landed in the configured input folder count.
            if !policy.auto_clean || !path_contains_segment(&path, &policy.input_subdir) {
                Vec::new()
            } else {
                let generation = state.arm_debounce();
                vec![Effect::ScheduleDebounce {
                    generation,
                    delay_ms: policy.debounce_ms,
                }]
            }
        }
        Msg::DebounceElapsed { generation } => {
            if state.disarm_if_current(generation) {
                vec![Effect::StartJob {
                    source: JobSource::Auto,
                }]
            } else {
                // Stale timer from a superseded burst.
                Vec::new()
            }
        }
        Msg::CleanRequested { ctx } => {
            state.set_owner(ctx);
            vec![Effect::StartJob {
                source: JobSource::Manual,
            }]
        }
        Msg::JobStarted {
            job_id,
            upload_enabled,
        } => {
            // Last write wins: the previous job keeps running server-side,
            // this slot simply stops referring to it.
            state.track_job(ActiveJob {
                job_id: job_id.clone(),
                upload_enabled,
            });
            match state.owner() {
                Some(ctx) => vec![Effect::NotifyJobStarted {
                    ctx,
                    job_id,
                    upload_enabled,
                }],
                None => Vec::new(),
            }
        }
        Msg::JobStartFailed { source, error } => match (source, state.owner()) {
            (JobSource::Manual, Some(ctx)) => vec![Effect::ReportError { ctx, error }],
            // Auto triggers are fire-and-forget; the driver logs the failure.
            _ => Vec::new(),
        },
    };

    (state, effects)
}
