use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cleaner_engine::{
    download_all, download_one, DownloadGateway, DownloadId, GatewayError, MAX_BATCH_COUNT,
};
use pretty_assertions::assert_eq;

/// Gateway double that records call order and fails on chosen slots.
struct ScriptedGateway {
    fail_on: Vec<usize>, // 1-based call numbers that fail
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    fn new(fail_on: Vec<usize>) -> Self {
        Self {
            fail_on,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadGateway for ScriptedGateway {
    async fn download(&self, url: &str, relative_path: &str) -> Result<DownloadId, GatewayError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((url.to_string(), relative_path.to_string()));
        let call_number = calls.len();
        if self.fail_on.contains(&call_number) {
            Err(GatewayError::Network("injected failure".to_string()))
        } else {
            Ok(call_number as DownloadId)
        }
    }
}

#[tokio::test]
async fn one_failure_does_not_abort_the_batch() {
    let gateway = ScriptedGateway::new(vec![2]);
    let urls = vec![
        "https://lh3.googleusercontent.com/a=s512".to_string(),
        "https://lh3.googleusercontent.com/b=s512".to_string(),
        "https://lh3.googleusercontent.com/c=s512".to_string(),
    ];

    let report = download_all(&gateway, &urls, "Gemini-Originals", Duration::ZERO).await;
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.all_succeeded());
    assert_eq!(report.summary(), "Downloaded 2, failed 1");

    // All three were attempted, strictly in order, each normalized to =s0.
    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].0, "https://lh3.googleusercontent.com/a=s0");
    assert_eq!(calls[1].0, "https://lh3.googleusercontent.com/b=s0");
    assert_eq!(calls[2].0, "https://lh3.googleusercontent.com/c=s0");

    // Batch filenames carry the 1-based, zero-padded slot index.
    assert!(calls[0].1.starts_with("Gemini-Originals/gemini-original-"));
    assert!(calls[0].1.ends_with("-001.png"));
    assert!(calls[1].1.ends_with("-002.png"));
    assert!(calls[2].1.ends_with("-003.png"));
}

#[tokio::test]
async fn all_successes_report_clean_wording() {
    let gateway = ScriptedGateway::new(Vec::new());
    let urls = vec![
        "https://lh3.googleusercontent.com/a=s512".to_string(),
        "https://lh3.googleusercontent.com/b=s512".to_string(),
    ];

    let report = download_all(&gateway, &urls, "Gemini-Originals", Duration::ZERO).await;
    assert!(report.all_succeeded());
    assert_eq!(report.summary(), "Downloaded 2 images");
}

#[tokio::test]
async fn batch_is_capped() {
    let gateway = ScriptedGateway::new(Vec::new());
    let urls: Vec<String> = (0..MAX_BATCH_COUNT + 20)
        .map(|i| format!("https://lh3.googleusercontent.com/{i}=s512"))
        .collect();

    let report = download_all(&gateway, &urls, "Gemini-Originals", Duration::ZERO).await;
    assert_eq!(report.attempted, MAX_BATCH_COUNT);
    assert_eq!(gateway.calls().len(), MAX_BATCH_COUNT);
}

#[tokio::test]
async fn single_download_normalizes_and_skips_the_index_suffix() {
    let gateway = ScriptedGateway::new(Vec::new());
    let id = download_one(
        &gateway,
        "https://lh3.googleusercontent.com/solo=w1024-h768",
        "Gemini-Originals",
    )
    .await
    .expect("download ok");
    assert_eq!(id, 1);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "https://lh3.googleusercontent.com/solo=s0");
    assert!(calls[0].1.starts_with("Gemini-Originals/gemini-original-"));
    assert!(calls[0].1.ends_with(".png"));
    // A lone download never carries the batch index suffix, so the relative
    // path has the exact fixed-width single-image shape.
    let single_shape = "Gemini-Originals/gemini-original-20240101-000000.png";
    assert_eq!(calls[0].1.len(), single_shape.len(), "got: {}", calls[0].1);
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    let gateway = ScriptedGateway::new(Vec::new());
    let report = download_all(&gateway, &[], "Gemini-Originals", Duration::ZERO).await;
    assert_eq!(report.attempted, 0);
    assert!(gateway.calls().is_empty());
}
