use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Downloads original-size generated images from a chat page and drives the
/// local clean service that post-processes them.
#[derive(Debug, Parser)]
#[command(name = "gemini-cleaner", version, about)]
pub struct Cli {
    /// Path to the RON settings file; missing file means defaults.
    #[arg(long, global = true, default_value = "cleaner.ron")]
    pub settings: PathBuf,

    /// Root directory standing in for the platform download folder.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Also write logs to ./cleaner.log.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Count generated images on a page (local HTML file or URL).
    Scan {
        /// Page to inspect.
        page: String,
    },
    /// Download all generated images from a page, then auto-clean if enabled.
    Download {
        /// Page to harvest.
        page: String,
    },
    /// Download a single image by URL at original size.
    DownloadOne {
        /// Image URL; the size directive is rewritten to `=s0`.
        url: String,
    },
    /// Start a clean job on the companion service.
    CleanNow {
        /// Poll the job to completion and print progress.
        #[arg(long)]
        wait: bool,
        /// Use the one-shot blocking endpoint instead of a job.
        #[arg(long, conflicts_with = "wait")]
        blocking: bool,
    },
    /// Poll a job's status.
    Status {
        job_id: String,
        /// Keep polling until the job reports done.
        #[arg(long)]
        follow: bool,
    },
    /// Check that the companion service is reachable.
    Health,
    /// Validate an upload target without running a job.
    UploadTest {
        /// Upload endpoint to probe.
        upload_url: String,
    },
    /// Watch the input folder and auto-clean newly downloaded files.
    Watch,
}
