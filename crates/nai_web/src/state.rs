use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nai_core::{ArticleStorage, ContactNotifier, InferenceModel, Result};
use nai_extract::{create_source, ContentExtractor, ExtractorConfig};

use crate::notify::{NotificationConfig, ResendNotifier};
use crate::stages::LocalStages;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub request_timeout: Duration,
    pub notification: Option<NotificationConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notification: None,
        }
    }
}

pub struct AppState {
    pub stages: LocalStages,
    pub storage: Arc<dyn ArticleStorage>,
    pub notifier: Option<Arc<dyn ContactNotifier>>,
}

impl AppState {
    pub fn new(
        stages: LocalStages,
        storage: Arc<dyn ArticleStorage>,
        notifier: Option<Arc<dyn ContactNotifier>>,
    ) -> Self {
        Self {
            stages,
            storage,
            notifier,
        }
    }

    /// Wires the extraction source, the notifier and the shared model.
    pub fn build(
        model: Arc<dyn InferenceModel>,
        extractor: &ExtractorConfig,
        storage: Arc<dyn ArticleStorage>,
        notification: Option<&NotificationConfig>,
    ) -> Result<Self> {
        let source = create_source(extractor)?;
        let stages = LocalStages::new(ContentExtractor::new(source, model.clone()), model);

        let notifier: Option<Arc<dyn ContactNotifier>> = match notification {
            Some(config) => Some(Arc::new(ResendNotifier::new(config.clone())?)),
            None => {
                tracing::warn!("⚠️ Contact notifications disabled, messages are only stored");
                None
            }
        };

        Ok(Self::new(stages, storage, notifier))
    }
}
