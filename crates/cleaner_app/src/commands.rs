use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use cleaner_core::{ContextId, Stage};
use cleaner_engine::{
    discover_images, download_all, download_one, fetch_html, poll_until_done, AgentCommand,
    AgentEvent, AgentHandle, ChannelDownloadSink, CleanConfig, CompanionApi, DownloadEvent,
    HttpCompanionClient, HttpDownloadGateway, NullDownloadSink, PollPlan, RonSettingsStore,
    Settings, SettingsStore, DOWNLOAD_DELAY, MAX_BATCH_COUNT,
};
use cleaner_logging::clean_info;
use tokio::runtime::Runtime;

use crate::cli::{Cli, Command};

/// The CLI is the only page context here; any fixed id will do.
const CLI_CONTEXT: ContextId = 1;

/// Folder scan cadence for `watch`, matching the page widget's check interval.
const WATCH_INTERVAL: Duration = Duration::from_secs(2);

pub fn run(args: Cli) -> anyhow::Result<()> {
    let runtime = Runtime::new().context("starting async runtime")?;
    let store = Arc::new(RonSettingsStore::new(args.settings.clone()));
    let settings = runtime.block_on(store.get());
    let companion = Arc::new(HttpCompanionClient::new(&settings.service_url)?);

    match args.command {
        Command::Scan { page } => runtime.block_on(scan(&page)),
        Command::Download { page } => {
            download(&runtime, &page, &args.root, store, companion, &settings)
        }
        Command::DownloadOne { url } => {
            runtime.block_on(download_single(&url, &args.root, &settings))
        }
        Command::CleanNow { wait, blocking } => {
            clean_now(&runtime, store, companion, wait, blocking)
        }
        Command::Status { job_id, follow } => status(&runtime, companion.as_ref(), &job_id, follow),
        Command::Health => runtime.block_on(health(companion.as_ref(), &settings)),
        Command::UploadTest { upload_url } => {
            runtime.block_on(upload_test(companion.as_ref(), &upload_url))
        }
        Command::Watch => watch(&runtime, &args.root, store, companion),
    }
}

async fn load_page(page: &str) -> anyhow::Result<String> {
    if page.starts_with("http://") || page.starts_with("https://") {
        Ok(fetch_html(page).await?)
    } else {
        std::fs::read_to_string(page).with_context(|| format!("reading page file {page}"))
    }
}

async fn scan(page: &str) -> anyhow::Result<()> {
    let html = load_page(page).await?;
    let images = discover_images(&html);
    println!("{} image(s) found", images.len());
    for (i, url) in images.iter().enumerate() {
        println!("{:3}. {url}", i + 1);
    }
    Ok(())
}

fn download(
    runtime: &Runtime,
    page: &str,
    root: &Path,
    store: Arc<RonSettingsStore>,
    companion: Arc<HttpCompanionClient>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let subdir = settings.resolved_input_subdir();
    let (event_tx, event_rx) = mpsc::channel();
    let gateway = HttpDownloadGateway::new(
        root.to_path_buf(),
        Arc::new(ChannelDownloadSink::new(event_tx)),
    )?;

    let report = runtime.block_on(async {
        let html = load_page(page).await?;
        let images = discover_images(&html);
        if images.is_empty() {
            return Err(anyhow!("no generated images found on the page"));
        }
        println!("Downloading {} images...", images.len().min(MAX_BATCH_COUNT));
        Ok(download_all(&gateway, &images, &subdir, DOWNLOAD_DELAY).await)
    })?;
    println!("{}", report.summary());

    // Completed downloads feed the coordinator exactly like platform
    // download events would; the debounced start shows up in the log.
    if settings.auto_clean && report.succeeded > 0 {
        let agent = AgentHandle::new(store, companion);
        while let Ok(DownloadEvent::Completed { path, .. }) = event_rx.try_recv() {
            agent.send(AgentCommand::DownloadCompleted {
                path: path.display().to_string(),
            });
        }
        thread::sleep(Duration::from_millis(settings.debounce_ms) + Duration::from_secs(3));
    }
    Ok(())
}

async fn download_single(url: &str, root: &Path, settings: &Settings) -> anyhow::Result<()> {
    let subdir = settings.resolved_input_subdir();
    // One-off download, nobody waits on a completion event.
    let gateway = HttpDownloadGateway::new(root.to_path_buf(), Arc::new(NullDownloadSink))?;
    download_one(&gateway, url, &subdir).await?;
    println!("Downloaded 1 image into {subdir}/");
    Ok(())
}

fn clean_now(
    runtime: &Runtime,
    store: Arc<RonSettingsStore>,
    companion: Arc<HttpCompanionClient>,
    wait: bool,
    blocking: bool,
) -> anyhow::Result<()> {
    if blocking {
        let settings = runtime.block_on(store.get());
        let config = CleanConfig::from_settings(&settings);
        let outcome = runtime.block_on(companion.run_clean(&config))?;
        println!(
            "Cleaned {}/{} images into {} ({} failed)",
            outcome.success, outcome.total, outcome.output_dir, outcome.failed
        );
        if outcome.upload_total > 0 {
            println!(
                "Uploaded {}/{} ({} failed)",
                outcome.upload_success, outcome.upload_total, outcome.upload_failed
            );
        }
        return Ok(());
    }

    let agent = AgentHandle::new(store, companion.clone());
    agent.send(AgentCommand::CleanNow { ctx: CLI_CONTEXT });

    match agent.recv_timeout(Duration::from_secs(45)) {
        Some(AgentEvent::JobStarted {
            job_id,
            upload_enabled,
            ..
        }) => {
            println!(
                "Clean job {job_id} started (upload {})",
                if upload_enabled { "enabled" } else { "disabled" }
            );
            if wait {
                runtime.block_on(follow_job(companion.as_ref(), &job_id))?;
            }
            Ok(())
        }
        Some(AgentEvent::CleanFailed { error, .. }) => Err(anyhow!(error)),
        _ => Err(anyhow!("no response from the coordinator")),
    }
}

async fn follow_job(companion: &dyn CompanionApi, job_id: &str) -> anyhow::Result<()> {
    let plan = PollPlan::default();
    let final_status = poll_until_done(companion, job_id, &plan, |status| match status.stage() {
        Stage::Clean => println!(
            "[clean] {}/{} done, {} failed",
            status.success, status.total, status.failed
        ),
        Stage::Upload => println!(
            "[upload] {}/{} uploaded, {} failed",
            status.upload_success, status.upload_total, status.upload_failed
        ),
    })
    .await?;

    match &final_status.error {
        Some(error) => println!("Job {} finished with error: {error}", final_status.job_id),
        None => println!("Job {} finished", final_status.job_id),
    }
    Ok(())
}

fn status(
    runtime: &Runtime,
    companion: &dyn CompanionApi,
    job_id: &str,
    follow: bool,
) -> anyhow::Result<()> {
    if follow {
        return runtime.block_on(follow_job(companion, job_id));
    }
    let status = runtime.block_on(companion.poll_status(job_id))?;
    println!(
        "job {}: stage {}, clean {}/{} ({} failed), upload {}/{} ({} failed), done: {}",
        status.job_id,
        status.stage(),
        status.success,
        status.total,
        status.failed,
        status.upload_success,
        status.upload_total,
        status.upload_failed,
        status.done,
    );
    Ok(())
}

async fn health(companion: &dyn CompanionApi, settings: &Settings) -> anyhow::Result<()> {
    companion.health_check().await?;
    println!("Companion service at {} is reachable", settings.service_url);
    Ok(())
}

async fn upload_test(companion: &dyn CompanionApi, upload_url: &str) -> anyhow::Result<()> {
    let result = companion.upload_test(upload_url).await?;
    println!("Upload target ok; test image at {}", result.url);
    Ok(())
}

fn watch(
    runtime: &Runtime,
    root: &Path,
    store: Arc<RonSettingsStore>,
    companion: Arc<HttpCompanionClient>,
) -> anyhow::Result<()> {
    let settings = runtime.block_on(store.get());
    let dir = root.join(settings.resolved_input_subdir());
    println!(
        "Watching {:?} (auto clean {})",
        dir,
        if settings.auto_clean { "on" } else { "off" }
    );

    let agent = AgentHandle::new(store, companion);
    // Files already present never trigger; only new arrivals do.
    let mut seen = scan_dir(&dir);

    loop {
        thread::sleep(WATCH_INTERVAL);
        for path in scan_dir(&dir) {
            if seen.insert(path.clone()) {
                clean_info!("new download observed: {:?}", path);
                agent.send(AgentCommand::DownloadCompleted {
                    path: path.display().to_string(),
                });
            }
        }
        while let Some(event) = agent.try_recv() {
            report_event(event);
        }
    }
}

fn scan_dir(dir: &Path) -> HashSet<PathBuf> {
    let mut files = HashSet::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            files.insert(path);
        }
    }
    files
}

fn report_event(event: AgentEvent) {
    match event {
        AgentEvent::JobStarted {
            job_id,
            upload_enabled,
            ..
        } => println!(
            "Clean job {job_id} started (upload {})",
            if upload_enabled { "enabled" } else { "disabled" }
        ),
        AgentEvent::CleanFailed { error, .. } => eprintln!("Clean failed: {error}"),
        AgentEvent::Status { job_id, result } => match result {
            Ok(status) => println!("job {job_id}: stage {}, done: {}", status.stage(), status.done),
            Err(error) => eprintln!("status for {job_id} failed: {error}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::scan_dir;

    #[test]
    fn scan_dir_lists_files_and_skips_subdirectories() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.png"), b"x").expect("write");
        std::fs::write(dir.path().join("b.png"), b"x").expect("write");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");

        let files = scan_dir(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.contains(&dir.path().join("a.png")));
        assert!(files.contains(&dir.path().join("b.png")));
        assert!(!files.contains(&dir.path().join("nested")));
    }

    #[test]
    fn missing_directory_scans_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(scan_dir(&dir.path().join("not-there")).is_empty());
    }

    #[test]
    fn only_new_arrivals_pass_the_seen_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("old.png"), b"x").expect("write");
        let mut seen = scan_dir(dir.path());

        std::fs::write(dir.path().join("new.png"), b"x").expect("write");
        let fresh: Vec<_> = scan_dir(dir.path())
            .into_iter()
            .filter(|path| seen.insert(path.clone()))
            .collect();
        assert_eq!(fresh, vec![dir.path().join("new.png")]);
    }
}
