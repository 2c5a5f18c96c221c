use async_trait::async_trait;
use nai_core::{
    ArticleRecord, ArticleStats, Error, KeyInfo, NewArticleRecord, PipelineStages, Result,
    SentenceMatch,
};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

/// Client for a running `nai serve` instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| Error::Config(format!("Invalid server URL {}: {}", base, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Calls an endpoint and unwraps its `{ <field>, error }` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        field: &str,
    ) -> Result<T> {
        let url = self
            .base
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", path, e)))?;
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let mut envelope: Value = serde_json::from_str(&text).map_err(|_| Error::Api {
            status: status.as_u16(),
            message: text.clone(),
        })?;
        if let Some(message) = envelope.get("error").and_then(Value::as_str) {
            return Err(Error::Api {
                status: status.as_u16(),
                message: message.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("Request to {} failed", path),
            });
        }
        Ok(serde_json::from_value(envelope[field].take())?)
    }

    pub async fn save_article(&self, article: &NewArticleRecord) -> Result<ArticleRecord> {
        let body = serde_json::to_value(article)?;
        self.call(Method::POST, "api/save-article", Some(body), "data")
            .await
    }

    pub async fn article_stats(&self) -> Result<ArticleStats> {
        self.call(Method::GET, "api/article-stats", None, "data").await
    }
}

/// Runs each stage as a request against the server.
#[derive(Debug, Clone)]
pub struct HttpStages {
    client: ApiClient,
}

impl HttpStages {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelineStages for HttpStages {
    async fn extract_content(&self, url: &str) -> Result<String> {
        self.client
            .call(Method::POST, "api/extract-content", Some(json!({ "url": url })), "content")
            .await
    }

    async fn extract_key_info(&self, article: &str) -> Result<KeyInfo> {
        self.client
            .call(Method::POST, "api/extract-key-info", Some(json!({ "article": article })), "keyInfo")
            .await
    }

    async fn generate_summary(&self, article: &str, key_info: &KeyInfo) -> Result<String> {
        let body = json!({ "article": article, "keyInfo": key_info });
        self.client
            .call(Method::POST, "api/generate-summary", Some(body), "summary")
            .await
    }

    async fn translate(&self, summary: &str) -> Result<String> {
        self.client
            .call(Method::POST, "api/translate-arabic", Some(json!({ "summary": summary })), "arabicSummary")
            .await
    }

    async fn match_sentences(&self, article: &str, summary: &str) -> Result<Vec<SentenceMatch>> {
        let body = json!({ "article": article, "summary": summary });
        self.client
            .call(Method::POST, "api/match-sentences", Some(body), "matches")
            .await
    }
}
