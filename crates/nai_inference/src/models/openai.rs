use std::fmt;

use async_trait::async_trait;
use nai_core::{Completion, Error, InferenceModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Config, ModelSet};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-compatible chat completions and embeddings over HTTP.
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    base_url: String,
    models: ModelSet,
}

impl OpenAiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("OpenAI API key is required".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("OpenAI API error {}: {}", status, body)));
        }
        Ok(response)
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OpenAiModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, completion: &Completion) -> Result<String> {
        let model = self.models.for_role(completion.role);
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &completion.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &completion.prompt,
        });

        tracing::debug!(
            model,
            role = %completion.role,
            prompt_length = completion.prompt.len(),
            "Calling chat completions"
        );

        let response: ChatResponse = self
            .post(
                "chat/completions",
                &ChatRequest {
                    model,
                    messages,
                    temperature: completion.temperature,
                },
            )
            .await?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference("No completion returned".to_string()))
    }

    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response: EmbeddingResponse = self
            .post(
                "embeddings",
                &EmbeddingRequest {
                    input: texts,
                    model: &self.models.embeddings,
                },
            )
            .await?
            .json()
            .await?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(Error::Inference(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use nai_core::ModelRole;
    use serde_json::{json, Value};

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer test-key")
    }

    async fn chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
        }
        let messages = body["messages"].as_array().cloned().unwrap_or_default();
        let roles: Vec<String> = messages
            .iter()
            .map(|m| m["role"].as_str().unwrap_or_default().to_string())
            .collect();
        let content = format!(
            "{}|{}|{}|{}",
            body["model"].as_str().unwrap_or_default(),
            body["temperature"],
            roles.join(","),
            messages.last().and_then(|m| m["content"].as_str()).unwrap_or_default()
        );
        (
            StatusCode::OK,
            Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})),
        )
    }

    async fn embeddings(Json(body): Json<Value>) -> Json<Value> {
        let inputs = body["input"].as_array().cloned().unwrap_or_default();
        // Reverse order on the wire; the client must sort by index.
        let data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .rev()
            .map(|(i, text)| {
                let len = text.as_str().unwrap_or_default().len() as f32;
                json!({"index": i, "embedding": [len, 1.0]})
            })
            .collect();
        Json(json!({"data": data, "model": body["model"]}))
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/v1/chat/completions", post(chat))
            .route("/v1/embeddings", post(embeddings));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn model(base_url: String, key: &str) -> OpenAiModel {
        OpenAiModel::new(&Config {
            api_key: Some(key.to_string()),
            base_url,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_uses_role_model() {
        let model = model(spawn_stub().await, "test-key");

        let completion = Completion::new(ModelRole::Matching, "match these").with_system("be exact");
        let text = model.complete(&completion).await.unwrap();
        assert_eq!(text, "gpt-4o|0.0|system,user|match these");

        let completion = Completion::new(ModelRole::Summary, "summarize");
        let text = model.complete(&completion).await.unwrap();
        assert_eq!(text, "gpt-4o-mini|0.0|user|summarize");
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let model = model(spawn_stub().await, "wrong-key");
        let err = model
            .complete(&Completion::new(ModelRole::Summary, "summarize"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_embeddings_keep_input_order() {
        let model = model(spawn_stub().await, "test-key");
        let texts = vec!["a".to_string(), "bbb".to_string(), "cc".to_string()];
        let vectors = model.generate_embeddings(&texts).await.unwrap();
        let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lengths, vec![1.0, 3.0, 2.0]);

        assert!(model.generate_embeddings(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = model(crate::DEFAULT_BASE_URL.to_string(), "secret");
        assert!(!format!("{:?}", model).contains("secret"));
    }
}
