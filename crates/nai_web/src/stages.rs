use std::sync::Arc;

use async_trait::async_trait;
use nai_core::{InferenceModel, KeyInfo, PipelineStages, Result, SentenceMatch};
use nai_extract::ContentExtractor;
use nai_inference::stages;

/// Runs every stage in this process against the configured model.
#[derive(Debug, Clone)]
pub struct LocalStages {
    extractor: ContentExtractor,
    model: Arc<dyn InferenceModel>,
}

impl LocalStages {
    pub fn new(extractor: ContentExtractor, model: Arc<dyn InferenceModel>) -> Self {
        Self { extractor, model }
    }
}

#[async_trait]
impl PipelineStages for LocalStages {
    async fn extract_content(&self, url: &str) -> Result<String> {
        Ok(self.extractor.extract(url).await?.into_text())
    }

    async fn extract_key_info(&self, article: &str) -> Result<KeyInfo> {
        stages::extract_key_info(self.model.as_ref(), article).await
    }

    async fn generate_summary(&self, article: &str, key_info: &KeyInfo) -> Result<String> {
        stages::generate_summary(self.model.as_ref(), article, key_info).await
    }

    async fn translate(&self, summary: &str) -> Result<String> {
        stages::translate_to_arabic(self.model.as_ref(), summary).await
    }

    async fn match_sentences(&self, article: &str, summary: &str) -> Result<Vec<SentenceMatch>> {
        stages::match_sentences(self.model.as_ref(), article, summary).await
    }
}
