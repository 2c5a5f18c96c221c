use std::fmt;

use nai_core::text::split_sentences;
use nai_core::{Article, Completion, Error, InferenceModel, ModelRole, Result, SentenceMatch};

pub const EMBEDDING_DIMENSIONS: usize = 256;

/// Offline backend. Answers are extracted from the prompt itself so the
/// whole pipeline can run without network access. It reads the input
/// sections laid out by the prompts in [`crate::stages`].
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let (_, rest) = text.split_once(start)?;
    let body = match rest.find(end) {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    Some(body.trim())
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(|w| w.to_lowercase())
        .collect()
}

fn summarize(article: &str) -> String {
    let article = Article::new(article);
    let title = article.title().unwrap_or("Untitled");
    let sentences: Vec<&str> = split_sentences(article.body()).into_iter().take(4).collect();
    format!("{}\n\n{}", title, sentences.join(" "))
}

fn match_by_overlap(article: &str, summary: &str) -> Result<String> {
    let candidates = split_sentences(article);
    let matches: Vec<SentenceMatch> = split_sentences(nai_core::Summary::parse(summary).body.as_str())
        .into_iter()
        .map(|sentence| {
            let wanted = words(sentence);
            let best = candidates
                .iter()
                .map(|c| (c, words(c).iter().filter(|w| wanted.contains(w)).count()))
                .filter(|(_, overlap)| *overlap > 0)
                .max_by_key(|(_, overlap)| *overlap);
            SentenceMatch {
                summary_sentence: sentence.to_string(),
                article_sentences: best.map(|(c, _)| vec![c.to_string()]).unwrap_or_default(),
            }
        })
        .collect();
    Ok(serde_json::to_string(&matches)?)
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, completion: &Completion) -> Result<String> {
        let prompt = completion.prompt.as_str();
        match completion.role {
            // Forces callers onto their non-model cleaning path.
            ModelRole::Cleaning => Err(Error::Inference(
                "Dummy backend does not clean content".to_string(),
            )),
            ModelRole::KeyInfo => {
                let context = between(prompt, "\n\n", "\n\nQuestion:").unwrap_or(prompt);
                Ok(split_sentences(context)
                    .first()
                    .map(|s| s.to_string())
                    .unwrap_or_default())
            }
            ModelRole::Summary => {
                let article = between(prompt, "Article: ", "\n\nKey Information:").unwrap_or(prompt);
                Ok(summarize(article))
            }
            ModelRole::Translation => Ok(prompt.to_string()),
            ModelRole::Matching => {
                let article = between(prompt, "Article:\n", "\n\nSummary:\n").unwrap_or(prompt);
                let summary = between(prompt, "\n\nSummary:\n", "\n\nProvide the JSON").unwrap_or("");
                match_by_overlap(article, summary)
            }
        }
    }

    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| embed(text)).collect())
    }
}

/// Hashed bag of words, L2-normalized.
fn embed(text: &str) -> Vec<f32> {
    let mut embedding = vec![0.0f32; EMBEDDING_DIMENSIONS];
    for word in words(text) {
        // FNV-1a keeps buckets stable across runs.
        let mut hash: u32 = 0x811c9dc5;
        for byte in word.bytes() {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(0x01000193);
        }
        embedding[hash as usize % EMBEDDING_DIMENSIONS] += 1.0;
    }
    let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        embedding.iter_mut().for_each(|v| *v /= norm);
    }
    embedding
}
