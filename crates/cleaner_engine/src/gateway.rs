use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cleaner_logging::clean_debug;
use futures_util::StreamExt;
use thiserror::Error;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opaque id assigned at schedule time; completion arrives through the sink.
pub type DownloadId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// The file is fully written at `path`.
    Completed { id: DownloadId, path: PathBuf },
}

/// Observer for asynchronous download state changes.
pub trait DownloadSink: Send + Sync {
    fn emit(&self, event: DownloadEvent);
}

pub struct ChannelDownloadSink {
    tx: std::sync::mpsc::Sender<DownloadEvent>,
}

impl ChannelDownloadSink {
    pub fn new(tx: std::sync::mpsc::Sender<DownloadEvent>) -> Self {
        Self { tx }
    }
}

impl DownloadSink for ChannelDownloadSink {
    fn emit(&self, event: DownloadEvent) {
        let _ = self.tx.send(event);
    }
}

/// Discards completion events, for one-off downloads nobody observes.
pub struct NullDownloadSink;

impl DownloadSink for NullDownloadSink {
    fn emit(&self, _event: DownloadEvent) {}
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The privileged file-download capability: schedule a write to a path under
/// a known root, observe completion asynchronously by id.
#[async_trait]
pub trait DownloadGateway: Send + Sync {
    /// Errors are reported synchronously; completion (with the resolved
    /// path) flows through the gateway's sink. No retry at this layer.
    async fn download(&self, url: &str, relative_path: &str) -> Result<DownloadId, GatewayError>;
}

/// Fetches the response body into memory, writes it to
/// `{root}/{relative_path}` via a temp file, then renames into place so
/// observers never see a partial file.
pub struct HttpDownloadGateway {
    root: PathBuf,
    client: reqwest::Client,
    sink: Arc<dyn DownloadSink>,
    next_id: AtomicU64,
}

impl HttpDownloadGateway {
    pub fn new(root: PathBuf, sink: Arc<dyn DownloadSink>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| GatewayError::Network(err.to_string()))?;
        Ok(Self {
            root,
            client,
            sink,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl DownloadGateway for HttpDownloadGateway {
    async fn download(&self, url: &str, relative_path: &str) -> Result<DownloadId, GatewayError> {
        let parsed = Url::parse(url).map_err(|err| GatewayError::InvalidUrl(err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| GatewayError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| GatewayError::Network(err.to_string()))?;
            bytes.extend_from_slice(&chunk);
        }

        let target = self.root.join(relative_path);
        let dir = target.parent().map(PathBuf::from).unwrap_or_else(|| self.root.clone());
        tokio::fs::create_dir_all(&dir).await?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        if target.exists() {
            std::fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|err| GatewayError::Io(err.error))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        clean_debug!("download {} complete: {:?}", id, target);
        self.sink.emit(DownloadEvent::Completed { id, path: target });
        Ok(id)
    }
}
