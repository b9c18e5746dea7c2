use std::fmt;

/// Coarse phase of a clean job, derived from a status payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Clean => write!(f, "clean"),
            Stage::Upload => write!(f, "upload"),
        }
    }
}

/// A job is in the upload phase exactly when the service has queued uploads.
/// The `done` flag plays no part in this.
pub fn stage_for_upload_total(upload_total: u64) -> Stage {
    if upload_total > 0 {
        Stage::Upload
    } else {
        Stage::Clean
    }
}
