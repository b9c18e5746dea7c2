use std::time::Duration;

use chrono::Local;
use cleaner_core::normalize_to_s0;
use cleaner_logging::{clean_info, clean_warn};

use crate::filename::original_filename;
use crate::gateway::{DownloadGateway, DownloadId, GatewayError};

/// Hard cap on one batch; mirrors the page widget's limit.
pub const MAX_BATCH_COUNT: usize = 500;

/// Pause between successful downloads so the image host is not hammered.
pub const DOWNLOAD_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// User-facing summary; wording distinguishes clean runs from partial ones.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            format!("Downloaded {} images", self.succeeded)
        } else {
            format!("Downloaded {}, failed {}", self.succeeded, self.failed)
        }
    }
}

/// Downloads every URL sequentially into `{subdir}/...` under the gateway
/// root, capped at [`MAX_BATCH_COUNT`].
///
/// Strictly sequential: item i+1 starts only after item i resolved and, on
/// success, the pacing delay elapsed. One failed item never aborts the batch;
/// it is counted and the batch moves on.
pub async fn download_all(
    gateway: &dyn DownloadGateway,
    urls: &[String],
    subdir: &str,
    pacing: Duration,
) -> BatchReport {
    let total = urls.len().min(MAX_BATCH_COUNT);
    let mut report = BatchReport {
        attempted: total,
        ..BatchReport::default()
    };

    for (index, url) in urls.iter().take(total).enumerate() {
        let filename = original_filename(index, total, &Local::now());
        let relative = format!("{subdir}/{filename}");
        match gateway.download(&normalize_to_s0(url), &relative).await {
            Ok(id) => {
                report.succeeded += 1;
                clean_info!("downloaded {}/{} (id {})", index + 1, total, id);
                tokio::time::sleep(pacing).await;
            }
            Err(err) => {
                report.failed += 1;
                clean_warn!("download {}/{} failed: {}", index + 1, total, err);
            }
        }
    }

    report
}

/// Single-image path used when one download gesture is intercepted.
pub async fn download_one(
    gateway: &dyn DownloadGateway,
    url: &str,
    subdir: &str,
) -> Result<DownloadId, GatewayError> {
    let filename = original_filename(0, 1, &Local::now());
    gateway
        .download(&normalize_to_s0(url), &format!("{subdir}/{filename}"))
        .await
}
