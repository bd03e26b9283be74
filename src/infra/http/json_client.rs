use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::core::content::{ContentError, ContentSource};

const USER_AGENT: &str = "ForUS-Bot/0.3 (+https://discord.gg/forus)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared reqwest client for every outbound JSON API the bot calls.
pub struct HttpContentSource {
    client: Client,
}

impl HttpContentSource {
    pub fn new() -> Result<Self, ContentError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ContentError::Http(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_json(&self, url: &str) -> Result<Value, ContentError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            ContentError::Http(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} answered with status {}", url, status);
            return Err(ContentError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ContentError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds() {
        assert!(HttpContentSource::new().is_ok());
    }
}
