use std::sync::Arc;

use async_trait::async_trait;
use nai_core::Result;
use url::Url;

use crate::ExtractorConfig;

pub mod extractor_api;
pub mod html;

pub use extractor_api::ExtractorApiSource;
pub use html::HtmlSource;

/// Uncleaned page text as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub title: Option<String>,
    pub text: String,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, url: &Url) -> Result<RawContent>;
}

/// The hosted extraction API when a key is configured, direct page
/// scraping otherwise.
pub fn create_source(config: &ExtractorConfig) -> Result<Arc<dyn ContentSource>> {
    let source: Arc<dyn ContentSource> = match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Arc::new(ExtractorApiSource::new(config)?),
        _ => {
            tracing::warn!("⚠️ No extraction API key configured, fetching pages directly");
            Arc::new(HtmlSource::new(config)?)
        }
    };
    Ok(source)
}
