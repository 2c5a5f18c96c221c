use nai_core::{Error, InferenceModel, Result};

/// Inputs per embeddings request.
pub const EMBEDDING_BATCH_SIZE: usize = 64;

pub struct EmbeddingGenerator<'a> {
    model: &'a dyn InferenceModel,
    batch_size: usize,
}

impl<'a> EmbeddingGenerator<'a> {
    pub fn new(model: &'a dyn InferenceModel) -> Self {
        Self {
            model,
            batch_size: EMBEDDING_BATCH_SIZE,
        }
    }

    /// Embeds `texts` in batches, returning one vector per input in order.
    pub async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = self.model.generate_embeddings(batch).await?;
            if embedded.len() != batch.len() {
                return Err(Error::Inference(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.model
            .generate_embeddings(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("No embedding returned".to_string()))
    }
}
