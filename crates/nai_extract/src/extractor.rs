use std::sync::Arc;

use nai_core::{Article, Error, InferenceModel, Result};
use url::Url;

use crate::cleaning::{clean_with_model, fallback_clean};
use crate::sources::ContentSource;

/// Parses `input` as an absolute http(s) URL.
pub fn validate_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidInput("URL is required".to_string()));
    }
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(Error::InvalidInput("Invalid URL format".to_string())),
    }
}

/// Fetches, cleans and validates an article from a URL.
#[derive(Clone)]
pub struct ContentExtractor {
    source: Arc<dyn ContentSource>,
    model: Arc<dyn InferenceModel>,
}

impl ContentExtractor {
    pub fn new(source: Arc<dyn ContentSource>, model: Arc<dyn InferenceModel>) -> Self {
        Self { source, model }
    }

    pub async fn extract(&self, url: &str) -> Result<Article> {
        let url = validate_url(url)?;
        tracing::info!("🌐 Fetching {} via {}", url, self.source.name());
        let raw = self.source.fetch(&url).await?;

        let cleaned = match clean_with_model(self.model.as_ref(), &raw).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Model cleaning failed, using regex cleanup: {}", e);
                fallback_clean(&raw)
            }
        };

        let article = Article::parse(cleaned)?;
        tracing::info!("✅ Extracted {} words from {}", article.word_count(), url);
        Ok(article)
    }
}

impl std::fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentExtractor")
            .field("source", &self.source.name())
            .field("model", &self.model.name())
            .finish()
    }
}
