use std::cmp::Ordering;

use nai_core::{Error, InferenceModel, Result};

use super::splitter::RecursiveTextSplitter;
use crate::embeddings::EmbeddingGenerator;

#[derive(Debug, Clone)]
struct IndexedChunk {
    text: String,
    vector: Vec<f32>,
    norm: f32,
}

/// Request-scoped in-memory vector index over one article.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
}

pub fn vector_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>();
    dot / (a_norm * b_norm)
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine(a, vector_norm(a), b, vector_norm(b))
}

fn by_score_desc(a: &f32, b: &f32) -> Ordering {
    b.partial_cmp(a).unwrap_or(Ordering::Equal)
}

impl VectorIndex {
    /// Chunks `text` with the default splitter and embeds every chunk.
    pub async fn build(model: &dyn InferenceModel, text: &str) -> Result<Self> {
        let chunks = RecursiveTextSplitter::default().split_text(text);
        let vectors = EmbeddingGenerator::new(model).embed_all(&chunks).await?;
        tracing::debug!("🧩 Indexed {} chunks", chunks.len());
        Self::from_embeddings(chunks, vectors)
    }

    pub fn from_embeddings(chunks: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(Error::Inference(format!(
                "Got {} embeddings for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        let chunks = chunks
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| IndexedChunk {
                norm: vector_norm(&vector),
                text,
                vector,
            })
            .collect();
        Ok(Self { chunks })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn ranked(&self, query: &[f32]) -> Vec<(usize, f32)> {
        let query_norm = vector_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (i, cosine(query, query_norm, &c.vector, c.norm)))
            .collect();
        scored.sort_by(|a, b| by_score_desc(&a.1, &b.1));
        scored
    }

    /// Maximal marginal relevance: from the `fetch_k` most similar chunks,
    /// greedily picks `k` that balance relevance to the query against
    /// similarity to chunks already picked. `lambda` = 1 is pure relevance.
    pub fn max_marginal_relevance_search(
        &self,
        query: &[f32],
        k: usize,
        fetch_k: usize,
        lambda: f32,
    ) -> Vec<&str> {
        let mut candidates: Vec<(usize, f32)> = self.ranked(query).into_iter().take(fetch_k).collect();
        let mut selected: Vec<usize> = Vec::with_capacity(k);

        while selected.len() < k && !candidates.is_empty() {
            let mut best: Option<(usize, f32)> = None;
            for (position, &(index, relevance)) in candidates.iter().enumerate() {
                let chunk = &self.chunks[index];
                let redundancy = selected
                    .iter()
                    .map(|&s| {
                        let other = &self.chunks[s];
                        cosine(&chunk.vector, chunk.norm, &other.vector, other.norm)
                    })
                    .fold(f32::NEG_INFINITY, f32::max);
                let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
                let score = lambda * relevance - (1.0 - lambda) * redundancy;
                if best.map_or(true, |(_, b)| score > b) {
                    best = Some((position, score));
                }
            }
            match best {
                Some((position, _)) => selected.push(candidates.remove(position).0),
                None => break,
            }
        }

        selected
            .into_iter()
            .map(|i| self.chunks[i].text.as_str())
            .collect()
    }
}
