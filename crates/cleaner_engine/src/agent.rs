use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cleaner_core::{update, AgentState, ContextId, JobSource, Msg};
use cleaner_logging::{clean_info, clean_warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::companion::{CleanConfig, CompanionApi, JobStatus};
use crate::settings::SettingsStore;

/// Requests crossing into the coordinator.
#[derive(Debug, Clone)]
pub enum AgentCommand {
    /// A download resolved to `path` reached the complete state.
    DownloadCompleted { path: String },
    /// Manual clean request from `ctx`.
    CleanNow { ctx: ContextId },
    /// Status passthrough. Any id is forwarded verbatim, stale ones included;
    /// the coordinator holds no per-job state beyond the current slot.
    PollStatus { job_id: String },
}

/// Notifications pushed back out of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Unsolicited push to the context that owns the latest clean request.
    JobStarted {
        ctx: ContextId,
        job_id: String,
        upload_enabled: bool,
    },
    /// A manual start failed; auto failures are only logged.
    CleanFailed { ctx: ContextId, error: String },
    /// Response to a `PollStatus` passthrough.
    Status {
        job_id: String,
        result: Result<JobStatus, String>,
    },
}

/// Owns the coordinator loop on a background thread with its own runtime.
/// Commands go in over a channel; events come back out the same way, so the
/// caller side stays free of async plumbing.
pub struct AgentHandle {
    cmd_tx: UnboundedSender<AgentCommand>,
    event_rx: std_mpsc::Receiver<AgentEvent>,
}

impl AgentHandle {
    pub fn new(settings: Arc<dyn SettingsStore>, companion: Arc<dyn CompanionApi>) -> Self {
        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (event_tx, event_rx) = std_mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            runtime.block_on(run_loop(cmd_rx, event_tx, settings, companion));
        });

        Self { cmd_tx, event_rx }
    }

    pub fn send(&self, command: AgentCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<AgentEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocking receive with a deadline; the pull side of the push protocol.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AgentEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn run_loop(
    mut cmd_rx: UnboundedReceiver<AgentCommand>,
    event_tx: std_mpsc::Sender<AgentEvent>,
    settings: Arc<dyn SettingsStore>,
    companion: Arc<dyn CompanionApi>,
) {
    let mut state = AgentState::new();
    let (msg_tx, mut msg_rx) = unbounded_channel::<Msg>();

    loop {
        tokio::select! {
            command = cmd_rx.recv() => {
                let Some(command) = command else { break };
                handle_command(command, &settings, &companion, &msg_tx, &event_tx).await;
            }
            Some(msg) = msg_rx.recv() => {
                if let Msg::JobStartFailed { source: JobSource::Auto, ref error } = msg {
                    clean_warn!("auto clean start failed: {error}");
                }
                let (next, effects) = update(state, msg);
                state = next;
                for effect in effects {
                    run_effect(effect, &settings, &companion, &msg_tx, &event_tx);
                }
            }
        }
    }
}

async fn handle_command(
    command: AgentCommand,
    settings: &Arc<dyn SettingsStore>,
    companion: &Arc<dyn CompanionApi>,
    msg_tx: &UnboundedSender<Msg>,
    event_tx: &std_mpsc::Sender<AgentEvent>,
) {
    match command {
        AgentCommand::DownloadCompleted { path } => {
            // Read-through: every completion observes the settings of its
            // own moment, tolerating concurrent external writers.
            let snapshot = settings.get().await;
            let _ = msg_tx.send(Msg::DownloadCompleted {
                path,
                policy: snapshot.auto_clean_policy(),
            });
        }
        AgentCommand::CleanNow { ctx } => {
            let _ = msg_tx.send(Msg::CleanRequested { ctx });
        }
        AgentCommand::PollStatus { job_id } => {
            let companion = companion.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let result = companion
                    .poll_status(&job_id)
                    .await
                    .map_err(|err| err.to_string());
                let _ = event_tx.send(AgentEvent::Status { job_id, result });
            });
        }
    }
}

fn run_effect(
    effect: cleaner_core::Effect,
    settings: &Arc<dyn SettingsStore>,
    companion: &Arc<dyn CompanionApi>,
    msg_tx: &UnboundedSender<Msg>,
    event_tx: &std_mpsc::Sender<AgentEvent>,
) {
    use cleaner_core::Effect;

    match effect {
        Effect::ScheduleDebounce {
            generation,
            delay_ms,
        } => {
            let msg_tx = msg_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                // Stale generations are rejected by the pure core, so an
                // outdated timer firing here is harmless.
                let _ = msg_tx.send(Msg::DebounceElapsed { generation });
            });
        }
        Effect::StartJob { source } => {
            let settings = settings.clone();
            let companion = companion.clone();
            let msg_tx = msg_tx.clone();
            tokio::spawn(async move {
                let snapshot = settings.get().await;
                let config = CleanConfig::from_settings(&snapshot);
                let upload_enabled = config.upload_enabled;
                match companion.start_job(&config).await {
                    Ok(started) => {
                        clean_info!("clean job {} started ({:?})", started.job_id, source);
                        let _ = msg_tx.send(Msg::JobStarted {
                            job_id: started.job_id,
                            upload_enabled,
                        });
                    }
                    Err(err) => {
                        let _ = msg_tx.send(Msg::JobStartFailed {
                            source,
                            error: err.to_string(),
                        });
                    }
                }
            });
        }
        Effect::NotifyJobStarted {
            ctx,
            job_id,
            upload_enabled,
        } => {
            // Fire and forget: the owning context may already be gone.
            let _ = event_tx.send(AgentEvent::JobStarted {
                ctx,
                job_id,
                upload_enabled,
            });
        }
        Effect::ReportError { ctx, error } => {
            let _ = event_tx.send(AgentEvent::CleanFailed { ctx, error });
        }
    }
}
