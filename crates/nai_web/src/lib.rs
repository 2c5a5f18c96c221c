use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::Uri,
    response::Response,
    routing::{get, patch, post},
    BoxError, Router,
};
use nai_core::{Error, Result};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod notify;
pub mod response;
pub mod stages;
pub mod state;

pub use notify::{NotificationConfig, ResendNotifier};
pub use stages::LocalStages;
pub use state::{AppState, ServerConfig};

/// Envelope field of the endpoint serving `path`.
fn field_for_path(path: &str) -> &'static str {
    match path.rsplit('/').next().unwrap_or_default() {
        "extract-content" => "content",
        "extract-key-info" => "keyInfo",
        "generate-summary" => "summary",
        "translate-arabic" => "arabicSummary",
        "match-sentences" => "matches",
        _ => "data",
    }
}

fn middleware_failure(uri: &Uri, err: BoxError, request_timeout: Duration) -> Response {
    let error = if err.is::<tower::timeout::error::Elapsed>() {
        Error::Timeout(request_timeout)
    } else {
        Error::Api {
            status: 500,
            message: format!("Unhandled internal error: {}", err),
        }
    };
    response::failure(field_for_path(uri.path()), error)
}

pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::permissive();

    let api = Router::new()
        .route("/extract-content", post(handlers::extract_content))
        .route("/extract-key-info", post(handlers::extract_key_info))
        .route("/generate-summary", post(handlers::generate_summary))
        .route("/translate-arabic", post(handlers::translate_arabic))
        .route("/match-sentences", post(handlers::match_sentences))
        .route("/save-article", post(handlers::save_article))
        .route("/update-article", patch(handlers::update_article))
        .route("/article-count", get(handlers::article_count))
        .route("/article-stats", get(handlers::article_stats))
        .route("/contact", post(handlers::contact));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |uri: Uri, err: BoxError| async move {
                    middleware_failure(&uri, err, request_timeout)
                }))
                .timeout(request_timeout),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("🚀 News AI server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state, config.request_timeout)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState, LocalStages, ServerConfig};
    pub use nai_core::{Error, Result};
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use nai_core::{
        ArticleStorage, Completion, ContactMessage, ContactNotifier, Error, InferenceModel,
        Result,
    };
    use nai_extract::{ContentExtractor, ContentSource, RawContent};
    use nai_inference::models::DummyModel;
    use nai_storage::MemoryStorage;
    use tokio::sync::mpsc;
    use url::Url;

    use crate::{AppState, LocalStages};

    pub fn article_text() -> String {
        let topics = [
            "photonic chips", "optical interconnects", "waveguide arrays", "laser sources",
            "silicon nitride", "thermal tuning", "packaging methods", "datacenter links",
        ];
        let body: Vec<String> = (0..20)
            .map(|i| {
                format!(
                    "Acme engineers reported that {} improved results in trial number {} this spring.",
                    topics[i % topics.len()],
                    i + 1
                )
            })
            .collect();
        format!("Lumen\n\n{}", body.join(" "))
    }

    /// Serves the same page for every URL.
    pub struct FixedSource;

    #[async_trait]
    impl ContentSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, _url: &Url) -> Result<RawContent> {
            let text = article_text();
            let body = text.trim_start_matches("Lumen").trim();
            Ok(RawContent {
                title: Some("Lumen".to_string()),
                text: format!("<p>{}</p>\n\n\n<p>Read more at https://news.example.com</p>", body),
            })
        }
    }

    /// Fails every call, as an unreachable provider would.
    #[derive(Debug)]
    pub struct DownModel;

    #[async_trait]
    impl InferenceModel for DownModel {
        fn name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _completion: &Completion) -> Result<String> {
            Err(Error::Inference("provider unavailable".to_string()))
        }

        async fn generate_embeddings(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Inference("provider unavailable".to_string()))
        }
    }

    /// Takes longer than any request limit used in the tests.
    #[derive(Debug)]
    pub struct SlowModel;

    #[async_trait]
    impl InferenceModel for SlowModel {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _completion: &Completion) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(String::new())
        }

        async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![Vec::new(); texts.len()])
        }
    }

    pub struct RecordingNotifier(pub mpsc::UnboundedSender<ContactMessage>);

    #[async_trait]
    impl ContactNotifier for RecordingNotifier {
        async fn notify(&self, contact: &ContactMessage) -> Result<()> {
            let _ = self.0.send(contact.clone());
            Ok(())
        }
    }

    pub struct FailingNotifier(pub mpsc::UnboundedSender<ContactMessage>);

    #[async_trait]
    impl ContactNotifier for FailingNotifier {
        async fn notify(&self, contact: &ContactMessage) -> Result<()> {
            let _ = self.0.send(contact.clone());
            Err(Error::Api {
                status: 503,
                message: "mail relay down".to_string(),
            })
        }
    }

    fn stages_with(model: Arc<dyn InferenceModel>) -> LocalStages {
        let extractor = ContentExtractor::new(Arc::new(FixedSource), model.clone());
        LocalStages::new(extractor, model)
    }

    pub fn local_stages() -> LocalStages {
        stages_with(Arc::new(DummyModel::new()))
    }

    pub fn state_with(
        model: Arc<dyn InferenceModel>,
        storage: MemoryStorage,
        notifier: Option<Arc<dyn ContactNotifier>>,
    ) -> AppState {
        let storage: Arc<dyn ArticleStorage> = Arc::new(storage);
        AppState::new(stages_with(model), storage, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use nai_core::KeyInfo;
    use nai_inference::models::DummyModel;
    use nai_storage::MemoryStorage;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        create_app(state, Duration::from_secs(5))
    }

    fn dummy_app() -> Router {
        app(state_with(Arc::new(DummyModel::new()), MemoryStorage::new(), None))
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(dummy_app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_extract_content() {
        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/extract-content",
            Some(json!({ "url": "https://news.example.com/lumen" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_null());
        let content = body["content"].as_str().unwrap();
        assert!(content.starts_with("Lumen\n\n"));
        assert!(!content.contains("<p>"));
        assert!(!content.contains("https://"));
    }

    #[tokio::test]
    async fn test_extract_content_validation() {
        let (status, body) = call(dummy_app(), "POST", "/api/extract-content", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "content": null, "error": "URL is required" }));

        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/extract-content",
            Some(json!({ "url": "news dot com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid URL format");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/translate-arabic")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = dummy_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["arabicSummary"].is_null());
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_stage_endpoints() {
        let article = article_text();
        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/extract-key-info",
            Some(json!({ "article": article })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let key_info: KeyInfo = serde_json::from_value(body["keyInfo"].clone()).unwrap();
        assert!(!key_info.answer1.is_empty());

        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/generate-summary",
            Some(json!({ "article": article, "keyInfo": key_info })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let summary = body["summary"].as_str().unwrap().to_string();
        assert!(summary.starts_with("Lumen\n\n"));

        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/translate-arabic",
            Some(json!({ "summary": summary })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["arabicSummary"], summary.as_str());

        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/match-sentences",
            Some(json!({ "article": article, "summary": summary })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 4);
        for m in matches {
            for sentence in m["article_sentences"].as_array().unwrap() {
                assert!(article.contains(sentence.as_str().unwrap()));
            }
        }
    }

    #[tokio::test]
    async fn test_stage_endpoint_validation() {
        let cases = [
            ("/api/extract-key-info", json!({ "article": "" }), "keyInfo", "Article text is required"),
            ("/api/generate-summary", json!({ "article": "text" }), "summary", "Key information is required"),
            ("/api/generate-summary", json!({}), "summary", "Article text is required"),
            ("/api/translate-arabic", json!({}), "arabicSummary", "Summary text is required"),
            ("/api/match-sentences", json!({ "article": "text" }), "matches", "Summary text is required"),
        ];
        for (uri, request, field, message) in cases {
            let (status, body) = call(dummy_app(), "POST", uri, Some(request)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body[field].is_null());
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500() {
        let app = app(state_with(Arc::new(DownModel), MemoryStorage::new(), None));
        let (status, body) = call(
            app,
            "POST",
            "/api/translate-arabic",
            Some(json!({ "summary": "Lumen\n\nAcme built Lumen." })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["arabicSummary"].is_null());
        assert!(body["error"].as_str().unwrap().starts_with("Failed to translate to Arabic"));
    }

    #[tokio::test]
    async fn test_slow_stage_times_out_with_envelope() {
        let state = state_with(Arc::new(SlowModel), MemoryStorage::new(), None);
        let app = create_app(state, Duration::from_millis(50));
        let (status, body) = call(
            app,
            "POST",
            "/api/translate-arabic",
            Some(json!({ "summary": "Lumen\n\nAcme built Lumen." })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["arabicSummary"].is_null());
        assert_eq!(body["error"], "Request timed out after 50ms");
    }

    #[test]
    fn test_field_for_path() {
        assert_eq!(field_for_path("/api/extract-key-info"), "keyInfo");
        assert_eq!(field_for_path("/match-sentences"), "matches");
        assert_eq!(field_for_path("/api/article-stats"), "data");
    }

    #[tokio::test]
    async fn test_article_records() {
        let app = dummy_app();
        let (status, body) = call(app.clone(), "POST", "/api/save-article", Some(json!({
            "original_article": "Lumen\n\nAcme unveiled Lumen.",
            "english_summary": "Lumen\n\nAcme built Lumen.",
            "arabic_summary": "لومن",
        })))
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["copied"], false);

        let (status, body) = call(
            app.clone(),
            "PATCH",
            "/api/update-article",
            Some(json!({ "id": id, "action": "copied" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": { "success": true }, "error": null }));

        let (_, body) = call(
            app.clone(),
            "PATCH",
            "/api/update-article",
            Some(json!({ "id": 999, "action": "discarded" })),
        )
        .await;
        assert_eq!(body["data"]["success"], false);

        let (_, body) = call(app.clone(), "GET", "/api/article-count", None).await;
        assert_eq!(body, json!({ "data": { "count": 1 }, "error": null }));

        let (_, body) = call(app, "GET", "/api/article-stats", None).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["copied"], 1);
        assert_eq!(body["data"]["rate"], 100.0);
    }

    #[tokio::test]
    async fn test_article_record_validation() {
        let (status, body) = call(
            dummy_app(),
            "POST",
            "/api/save-article",
            Some(json!({ "original_article": "text", "english_summary": "summary" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, body) = call(
            dummy_app(),
            "PATCH",
            "/api/update-article",
            Some(json!({ "action": "copied" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields (id and action)");

        let (status, body) = call(
            dummy_app(),
            "PATCH",
            "/api/update-article",
            Some(json!({ "id": 1, "action": "archived" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action. Must be \"copied\" or \"discarded\"");
    }

    fn contact_body(name: &str, message: &str) -> Value {
        json!({ "name": name, "email": "ana@example.com", "message": message })
    }

    #[tokio::test]
    async fn test_contact_validation() {
        let storage = MemoryStorage::new();
        let app = app(state_with(Arc::new(DummyModel::new()), storage.clone(), None));

        let (status, body) = call(
            app.clone(),
            "POST",
            "/api/contact",
            Some(contact_body("Ana", "Too short")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message must be between 10 and 5000 characters");

        let long_name = "a".repeat(256);
        let (status, body) = call(
            app.clone(),
            "POST",
            "/api/contact",
            Some(contact_body(&long_name, "Hello from the tests")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name must be between 2 and 255 characters");

        let (status, body) = call(
            app.clone(),
            "POST",
            "/api/contact",
            Some(json!({ "name": "Ana", "email": "ana@", "message": "Hello from the tests" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email address");

        let (status, body) = call(app, "POST", "/api/contact", Some(json!({ "name": "Ana" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required");

        assert!(storage.contacts().await.is_empty());
    }

    #[tokio::test]
    async fn test_contact_persists_and_notifies() {
        let storage = MemoryStorage::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier: Arc<dyn nai_core::ContactNotifier> = Arc::new(RecordingNotifier(tx));
        let app = app(state_with(Arc::new(DummyModel::new()), storage.clone(), Some(notifier)));

        let (status, body) = call(
            app,
            "POST",
            "/api/contact",
            Some(contact_body("  Ana  ", "Hello from the tests")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_null());
        assert_eq!(body["data"]["name"], "Ana");
        assert_eq!(body["data"]["read"], false);

        let notified = rx.recv().await.unwrap();
        assert_eq!(notified.email, "ana@example.com");
        assert_eq!(storage.contacts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_contact_survives_notifier_failure() {
        let storage = MemoryStorage::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier: Arc<dyn nai_core::ContactNotifier> = Arc::new(FailingNotifier(tx));
        let app = app(state_with(Arc::new(DummyModel::new()), storage.clone(), Some(notifier)));

        let (status, body) = call(
            app,
            "POST",
            "/api/contact",
            Some(contact_body("Ana", "Hello from the tests")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], 1);
        assert!(rx.recv().await.is_some());
        assert_eq!(storage.contacts().await.len(), 1);
    }
}
