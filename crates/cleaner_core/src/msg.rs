use crate::{ContextId, Generation, JobSource};

/// Settings snapshot relevant to auto-clean triggering, captured by the
/// driver at the moment the download event was observed. Keeping the
/// snapshot in the message keeps the update function pure while still
/// honouring read-through settings semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoCleanPolicy {
    pub auto_clean: bool,
    pub debounce_ms: u64,
    pub input_subdir: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A platform download reached `complete`; `path` is the resolved file path.
    DownloadCompleted { path: String, policy: AutoCleanPolicy },
    /// A previously scheduled debounce timer fired.
    DebounceElapsed { generation: Generation },
    /// A context asked for a clean job right now.
    CleanRequested { ctx: ContextId },
    /// The companion service accepted a start request.
    JobStarted { job_id: String, upload_enabled: bool },
    /// The companion service rejected a start request or was unreachable.
    JobStartFailed { source: JobSource, error: String },
}
