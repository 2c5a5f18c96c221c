use async_trait::async_trait;
use nai_core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{ContentSource, RawContent};
use crate::ExtractorConfig;

#[derive(Deserialize)]
struct ExtractorResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Hosted article extraction (`GET endpoint?apikey=..&url=..`).
pub struct ExtractorApiSource {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ExtractorApiSource {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Extraction API key is required".to_string()))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl std::fmt::Debug for ExtractorApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorApiSource")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl ContentSource for ExtractorApiSource {
    fn name(&self) -> &str {
        "extractorapi"
    }

    async fn fetch(&self, url: &Url) -> Result<RawContent> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("apikey", self.api_key.as_str()), ("url", url.as_str())])
            .send()
            .await
            .map_err(|e| Error::UpstreamExtraction(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamExtraction(format!(
                "Extraction API returned {}",
                status
            )));
        }

        let body: ExtractorResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamExtraction(e.to_string()))?;
        let text = body
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::UpstreamExtraction("Failed to extract content from URL".to_string()))?;

        Ok(RawContent {
            title: body.title.filter(|t| !t.trim().is_empty()),
            text,
        })
    }
}
