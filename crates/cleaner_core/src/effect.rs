use crate::{ContextId, Generation, JobSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// (Re)arm the single debounce timer. Only the latest generation is ever
    /// current; a timer that fires for an older generation dies in `update`.
    ScheduleDebounce { generation: Generation, delay_ms: u64 },
    /// Ask the companion service to start a clean job.
    StartJob { source: JobSource },
    /// Best-effort push to the owning context; delivery failure is ignored.
    NotifyJobStarted {
        ctx: ContextId,
        job_id: String,
        upload_enabled: bool,
    },
    /// Surface a manual-trigger failure to the owning context.
    ReportError { ctx: ContextId, error: String },
}
