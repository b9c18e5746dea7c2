//! Cleaner engine: companion client, download gateway, and effect execution.
mod agent;
mod batch;
mod companion;
mod discover;
mod filename;
mod gateway;
mod page;
mod poll;
mod settings;

pub use agent::{AgentCommand, AgentEvent, AgentHandle};
pub use batch::{download_all, download_one, BatchReport, DOWNLOAD_DELAY, MAX_BATCH_COUNT};
pub use companion::{
    CleanConfig, CleanOutcome, CompanionApi, CompanionError, HttpCompanionClient, JobStatus,
    StartedJob, UploadTestResult,
};
pub use discover::{discover_images, DiscoverySnapshot};
pub use filename::original_filename;
pub use gateway::{
    ChannelDownloadSink, DownloadEvent, DownloadGateway, DownloadId, DownloadSink, GatewayError,
    HttpDownloadGateway, NullDownloadSink,
};
pub use page::fetch_html;
pub use poll::{poll_until_done, PollError, PollPlan};
pub use settings::{RonSettingsStore, Settings, SettingsStore, UiLanguage, DEFAULT_OUTPUT_SUBDIR};
