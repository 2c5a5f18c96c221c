use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use nai_extract::ExtractorConfig;
use nai_inference::{Backend, Config, DEFAULT_BASE_URL};
use nai_storage::StorageKind;
use nai_web::state::DEFAULT_BIND;
use nai_web::{NotificationConfig, ServerConfig};

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub extractor_api_key: Option<String>,
    pub resend_api_key: Option<String>,
    pub notification_email: Option<String>,
    pub database_url: Option<String>,
    pub bind: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            extractor_api_key: get("EXTRACTOR_API_KEY"),
            resend_api_key: get("RESEND_API_KEY"),
            notification_email: get("NOTIFICATION_EMAIL"),
            database_url: get("DATABASE_URL"),
            bind: get("NAI_BIND"),
        }
    }

    /// Falls back to the offline backend when no API key is configured and
    /// no backend was asked for.
    pub fn inference_config(&self, backend: Option<&str>) -> Result<Config> {
        let backend = match backend {
            Some(name) => name.parse::<Backend>()?,
            None if self.openai_api_key.is_some() => Backend::OpenAi,
            None => {
                tracing::warn!("⚠️ OPENAI_API_KEY not set, using the offline dummy backend");
                Backend::Dummy
            }
        };
        Ok(Config {
            api_key: self.openai_api_key.clone(),
            base_url: self
                .openai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            backend,
            ..Default::default()
        })
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            api_key: self.extractor_api_key.clone(),
            ..Default::default()
        }
    }

    pub fn storage_kind(&self, storage: Option<&str>) -> Result<StorageKind> {
        match storage {
            Some(name) => Ok(name.parse()?),
            None => Ok(StorageKind::for_url(self.database_url.as_deref())),
        }
    }

    pub fn notification(&self) -> Option<NotificationConfig> {
        NotificationConfig::from_parts(
            self.resend_api_key.clone(),
            self.notification_email.clone(),
        )
    }

    pub fn server_config(&self, bind: Option<&str>, timeout: Duration) -> Result<ServerConfig> {
        let bind = bind
            .or(self.bind.as_deref())
            .unwrap_or(DEFAULT_BIND);
        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind))?;
        Ok(ServerConfig {
            bind,
            request_timeout: timeout,
            notification: self.notification(),
        })
    }
}
