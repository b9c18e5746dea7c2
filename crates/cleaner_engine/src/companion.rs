use std::time::Duration;

use async_trait::async_trait;
use cleaner_core::{stage_for_upload_total, Stage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::settings::Settings;

// The service is local, so generous fixed timeouts cover slow disk work
// without letting a hung connection pin a caller forever.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uniform failure shape for all companion calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompanionError {
    /// No response at all: service not running, connection refused, timeout.
    #[error("companion service unreachable: {0}")]
    Transport(String),
    /// The service answered with a non-2xx status or an undecodable body.
    /// The raw body text is kept for diagnostics.
    #[error("companion service error (status {status}): {body}")]
    Service { status: u16, body: String },
}

/// Wire config for `POST /clean/start` and `POST /clean`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanConfig {
    pub input_subdir: String,
    pub output_subdir: String,
    pub delete_originals: bool,
    pub upload_enabled: bool,
    pub upload_url: Option<String>,
    pub delete_cleaned: bool,
}

impl CleanConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let upload_url = if settings.upload_api_url.trim().is_empty() {
            None
        } else {
            Some(settings.upload_api_url.trim().to_string())
        };
        Self {
            input_subdir: settings.resolved_input_subdir(),
            output_subdir: settings.resolved_output_subdir(),
            delete_originals: settings.delete_originals,
            upload_enabled: settings.upload_enabled && upload_url.is_some(),
            upload_url,
            delete_cleaned: settings.delete_cleaned_after_upload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartedJob {
    pub job_id: String,
}

/// Status payload as reported by the service; forwarded verbatim to callers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    #[serde(default)]
    pub upload_total: u64,
    #[serde(default)]
    pub upload_success: u64,
    #[serde(default)]
    pub upload_failed: u64,
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatus {
    /// Derived coarse phase; independent of `done`.
    pub fn stage(&self) -> Stage {
        stage_for_upload_total(self.upload_total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadTestResult {
    pub ok: bool,
    pub url: String,
}

/// Outcome of the one-shot blocking clean endpoint (`POST /clean`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CleanOutcome {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub output_dir: String,
    #[serde(default)]
    pub upload_total: u64,
    #[serde(default)]
    pub upload_success: u64,
    #[serde(default)]
    pub upload_failed: u64,
    #[serde(default)]
    pub uploaded_urls: Vec<String>,
}

/// Request layer over the local clean service.
#[async_trait]
pub trait CompanionApi: Send + Sync {
    async fn start_job(&self, config: &CleanConfig) -> Result<StartedJob, CompanionError>;
    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, CompanionError>;
    async fn health_check(&self) -> Result<(), CompanionError>;
    async fn upload_test(&self, upload_url: &str) -> Result<UploadTestResult, CompanionError>;
    async fn run_clean(&self, config: &CleanConfig) -> Result<CleanOutcome, CompanionError>;
}

#[derive(Debug, Clone)]
pub struct HttpCompanionClient {
    base: String,
    client: reqwest::Client,
}

impl HttpCompanionClient {
    pub fn new(base_url: &str) -> Result<Self, CompanionError> {
        // Validate once; a broken base URL should fail loudly, not per call.
        Url::parse(base_url).map_err(|err| CompanionError::Transport(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| CompanionError::Transport(err.to_string()))?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CompanionError> {
    let status = response.status();
    let body = response.text().await.map_err(map_transport)?;
    if !status.is_success() {
        return Err(CompanionError::Service {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|_| CompanionError::Service {
        status: status.as_u16(),
        body,
    })
}

fn map_transport(err: reqwest::Error) -> CompanionError {
    CompanionError::Transport(err.to_string())
}

#[derive(Serialize)]
struct UploadTestRequest<'a> {
    upload_url: &'a str,
}

#[async_trait]
impl CompanionApi for HttpCompanionClient {
    async fn start_job(&self, config: &CleanConfig) -> Result<StartedJob, CompanionError> {
        let response = self
            .client
            .post(self.endpoint("clean/start"))
            .json(config)
            .send()
            .await
            .map_err(map_transport)?;
        decode(response).await
    }

    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, CompanionError> {
        let response = self
            .client
            .get(self.endpoint("clean/status"))
            .query(&[("job_id", job_id)])
            .send()
            .await
            .map_err(map_transport)?;
        decode(response).await
    }

    async fn health_check(&self) -> Result<(), CompanionError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(map_transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CompanionError::Service {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn upload_test(&self, upload_url: &str) -> Result<UploadTestResult, CompanionError> {
        let response = self
            .client
            .post(self.endpoint("upload-test"))
            .json(&UploadTestRequest { upload_url })
            .send()
            .await
            .map_err(map_transport)?;
        decode(response).await
    }

    async fn run_clean(&self, config: &CleanConfig) -> Result<CleanOutcome, CompanionError> {
        let response = self
            .client
            .post(self.endpoint("clean"))
            .json(config)
            .send()
            .await
            .map_err(map_transport)?;
        decode(response).await
    }
}
