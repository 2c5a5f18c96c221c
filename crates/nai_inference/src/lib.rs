use std::str::FromStr;

use nai_core::{Error, ModelRole, Result};

pub mod embeddings;
pub mod models;
pub mod retrieval;
pub mod stages;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model id used for each pipeline role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    pub cleaning: String,
    pub key_info: String,
    pub summary: String,
    pub translation: String,
    pub matching: String,
    pub embeddings: String,
}

impl ModelSet {
    pub fn for_role(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Cleaning => &self.cleaning,
            ModelRole::KeyInfo => &self.key_info,
            ModelRole::Summary => &self.summary,
            ModelRole::Translation => &self.translation,
            ModelRole::Matching => &self.matching,
        }
    }
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            cleaning: "gpt-4o-mini".to_string(),
            key_info: "gpt-4o-mini".to_string(),
            summary: "gpt-4o-mini".to_string(),
            translation: "ft:gpt-4o-mini-2024-07-18:personal:arabic-translator-musaed:AEATefJ7"
                .to_string(),
            matching: "gpt-4o".to_string(),
            embeddings: "text-embedding-ada-002".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    OpenAi,
    Dummy,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Backend::OpenAi),
            "dummy" => Ok(Backend::Dummy),
            other => Err(Error::Config(format!("Unknown inference backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: ModelSet,
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            models: ModelSet::default(),
            backend: Backend::default(),
        }
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::stages::{extract_key_info, generate_summary, match_sentences, translate_to_arabic};
    pub use super::{Backend, Config, ModelSet};
    pub use nai_core::{Error, InferenceModel, KeyInfo, Result, SentenceMatch};
}

pub use models::create_model;
