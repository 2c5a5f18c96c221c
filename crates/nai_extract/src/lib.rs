use std::time::Duration;

pub mod cleaning;
pub mod extractor;
pub mod sources;

pub use extractor::{validate_url, ContentExtractor};
pub use sources::{create_source, ContentSource, RawContent};

pub const DEFAULT_EXTRACTOR_ENDPOINT: &str = "https://extractorapi.com/api/v1/extractor/";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Hosted extraction API key. Without one, pages are fetched and parsed
    /// directly.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_EXTRACTOR_ENDPOINT.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

pub mod prelude {
    pub use super::{ContentExtractor, ContentSource, ExtractorConfig, RawContent};
    pub use nai_core::{Article, Error, Result};
}
