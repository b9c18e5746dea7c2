/// Opaque identity of the context (page/tab) that initiated a clean request.
pub type ContextId = u64;

/// Monotonic counter distinguishing debounce timer rounds. A timer whose
/// generation is no longer current has been superseded and must not fire.
pub type Generation = u64;

/// Who asked for a clean job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSource {
    /// A user-visible request relayed from a page context.
    Manual,
    /// The trailing edge of the download-completion debounce.
    Auto,
}

/// The single tracked job. There is never more than one; starting a new job
/// overwrites this slot without cancelling the previous job server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub job_id: String,
    pub upload_enabled: bool,
}

/// Coordinator + debouncer state.
///
/// Deliberately small: one pending debounce generation, one owner context,
/// one active-job slot. Terminal job state lives in the companion service,
/// not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentState {
    pending_debounce: Option<Generation>,
    next_generation: Generation,
    owner: Option<ContextId>,
    active_job: Option<ActiveJob>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_job(&self) -> Option<&ActiveJob> {
        self.active_job.as_ref()
    }

    pub fn owner(&self) -> Option<ContextId> {
        self.owner
    }

    pub fn pending_debounce(&self) -> Option<Generation> {
        self.pending_debounce
    }

    /// Cancel-and-reschedule: any earlier generation becomes stale.
    pub(crate) fn arm_debounce(&mut self) -> Generation {
        self.next_generation += 1;
        self.pending_debounce = Some(self.next_generation);
        self.next_generation
    }

    /// Returns true only for the currently armed generation.
    pub(crate) fn disarm_if_current(&mut self, generation: Generation) -> bool {
        if self.pending_debounce == Some(generation) {
            self.pending_debounce = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_owner(&mut self, ctx: ContextId) {
        self.owner = Some(ctx);
    }

    pub(crate) fn track_job(&mut self, job: ActiveJob) {
        self.active_job = Some(job);
    }
}
