///! Upstream OEM feed fetcher
///!
///! Every call downloads and parses the whole document; nothing is cached.

use async_trait::async_trait;
use reqwest::Client;

use super::parser::parse_oem_xml;
use super::types::OemDocument;
use crate::error::TrackerError;

/// Where handlers get the current trajectory document from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<OemDocument, TrackerError>;
}

/// Fetches the feed over HTTP.
pub struct HttpFeedSource {
    client: Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<OemDocument, TrackerError> {
        tracing::debug!("Fetching OEM feed from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "FAILURE TO GET DATA FROM {} - error code {}",
                self.url,
                status.as_u16()
            );
            return Err(TrackerError::UpstreamStatus(status.as_u16()));
        }

        let xml = response.text().await?;
        parse_oem_xml(&xml)
    }
}
