use std::time::Duration;

use url::Url;

use crate::gateway::GatewayError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches page HTML so discovery can run against a live conversation URL
/// as well as a saved document.
pub async fn fetch_html(url: &str) -> Result<String, GatewayError> {
    let parsed = Url::parse(url).map_err(|err| GatewayError::InvalidUrl(err.to_string()))?;
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|err| GatewayError::Network(err.to_string()))?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|err| GatewayError::Network(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::HttpStatus(status.as_u16()));
    }
    response
        .text()
        .await
        .map_err(|err| GatewayError::Network(err.to_string()))
}
