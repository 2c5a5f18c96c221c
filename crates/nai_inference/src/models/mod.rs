use std::sync::Arc;

use nai_core::{InferenceModel, Result};

use crate::{Backend, Config};

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Builds the model backend selected in `config`.
pub fn create_model(config: &Config) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match config.backend {
        Backend::OpenAi => Arc::new(OpenAiModel::new(config)?),
        Backend::Dummy => Arc::new(DummyModel::new()),
    };
    tracing::info!("🤖 Using {} inference backend", model.name());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model_selects_backend() {
        let config = Config {
            backend: Backend::Dummy,
            ..Default::default()
        };
        assert_eq!(create_model(&config).unwrap().name(), "Dummy");

        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        assert_eq!(create_model(&config).unwrap().name(), "OpenAI");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let err = create_model(&Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: OpenAI API key is required");
    }
}
