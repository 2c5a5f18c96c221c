use thiserror::Error;

use crate::types::MIN_ARTICLE_WORDS;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Article is too short. Minimum {} words required, got {} words.", MIN_ARTICLE_WORDS, .words)]
    ArticleTooShort { words: usize },

    #[error("Failed to extract content: {0}")]
    UpstreamExtraction(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Failed to extract key information: {0}")]
    KeyInfoExtractionFailed(String),

    #[error("Failed to generate summary: {0}")]
    SummaryGenerationFailed(String),

    #[error("Failed to translate to Arabic: {0}")]
    TranslationFailed(String),

    #[error("Failed to match sentences: {0}")]
    MatchingFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Errors caused by the caller's input rather than by an upstream
    /// service; surfaced as HTTP 400.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::InvalidInput(_) | Error::ArticleTooShort { .. } => true,
            Error::Api { status, .. } => (400..500).contains(status) && *status != 408,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
