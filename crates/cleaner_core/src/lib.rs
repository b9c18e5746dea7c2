//! Cleaner core: pure job-coordination state machine and string helpers.
mod effect;
mod msg;
mod normalize;
mod path;
mod stage;
mod state;
mod update;

pub use effect::Effect;
pub use msg::{AutoCleanPolicy, Msg};
pub use normalize::{normalize_to_s0, IMAGE_HOST_MARKER};
pub use path::{path_contains_segment, resolve_download_subdir, DEFAULT_INPUT_SUBDIR};
pub use stage::{stage_for_upload_total, Stage};
pub use state::{ActiveJob, AgentState, ContextId, Generation, JobSource};
pub use update::update;
