use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nai_core::{
    ArticleAction, ArticleRecord, ContactMessage, ContactNotifier, Error, KeyInfo,
    NewArticleRecord, NewContact, PipelineStages, Result,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::response::{envelope, json_body};
use crate::AppState;

macro_rules! body_or_return {
    ($field:expr, $payload:expr) => {
        match json_body($field, $payload) {
            Ok(request) => request,
            Err(response) => return response,
        }
    };
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::InvalidInput(message.to_string())),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExtractContentRequest {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KeyInfoRequest {
    pub article: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryRequest {
    pub article: Option<String>,
    pub key_info: Option<KeyInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TranslateRequest {
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MatchRequest {
    pub article: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveArticleRequest {
    pub original_article: Option<String>,
    pub english_summary: Option<String>,
    pub arabic_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateArticleRequest {
    /// Accepted as a number or a numeric string.
    pub id: Option<Value>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn extract_content(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ExtractContentRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("content", payload);
    let result = match request.url {
        Some(url) => state.stages.extract_content(&url).await,
        None => Err(Error::InvalidInput("URL is required".to_string())),
    };
    envelope("content", result)
}

pub async fn extract_key_info(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<KeyInfoRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("keyInfo", payload);
    let result = match required(request.article, "Article text is required") {
        Ok(article) => state.stages.extract_key_info(&article).await,
        Err(e) => Err(e),
    };
    envelope("keyInfo", result)
}

async fn summarize(state: &AppState, request: SummaryRequest) -> Result<String> {
    let article = required(request.article, "Article text is required")?;
    let key_info = request
        .key_info
        .ok_or_else(|| Error::InvalidInput("Key information is required".to_string()))?;
    state.stages.generate_summary(&article, &key_info).await
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SummaryRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("summary", payload);
    envelope("summary", summarize(&state, request).await)
}

pub async fn translate_arabic(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TranslateRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("arabicSummary", payload);
    let result = match required(request.summary, "Summary text is required") {
        Ok(summary) => state.stages.translate(&summary).await,
        Err(e) => Err(e),
    };
    envelope("arabicSummary", result)
}

async fn match_request(state: &AppState, request: MatchRequest) -> Result<Vec<nai_core::SentenceMatch>> {
    let article = required(request.article, "Article text is required")?;
    let summary = required(request.summary, "Summary text is required")?;
    state.stages.match_sentences(&article, &summary).await
}

pub async fn match_sentences(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<MatchRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("matches", payload);
    envelope("matches", match_request(&state, request).await)
}

async fn save(state: &AppState, request: SaveArticleRequest) -> Result<ArticleRecord> {
    let record = NewArticleRecord {
        original_article: request.original_article.unwrap_or_default(),
        english_summary: request.english_summary.unwrap_or_default(),
        arabic_summary: request.arabic_summary.unwrap_or_default(),
    };
    let saved = state.storage.save_article(&record).await?;
    tracing::info!("💾 Saved article {}", saved.id);
    Ok(saved)
}

pub async fn save_article(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SaveArticleRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("data", payload);
    envelope("data", save(&state, request).await)
}

fn parse_id(id: Option<Value>) -> Option<i64> {
    let id = match id? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id != 0)
}

async fn update(state: &AppState, request: UpdateArticleRequest) -> Result<Value> {
    let missing = || Error::InvalidInput("Missing required fields (id and action)".to_string());
    let id = parse_id(request.id).ok_or_else(missing)?;
    let action: ArticleAction = required(request.action, "")
        .map_err(|_| missing())?
        .parse()?;

    let updated = state.storage.mark_article(id, action).await?;
    if updated {
        tracing::info!("📝 Marked article {} as {:?}", id, action);
    } else {
        tracing::warn!("⚠️ No article with id {} to mark as {:?}", id, action);
    }
    Ok(json!({ "success": updated }))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("data", payload);
    envelope("data", update(&state, request).await)
}

pub async fn article_count(State(state): State<Arc<AppState>>) -> Response {
    let result = state
        .storage
        .article_count()
        .await
        .map(|count| json!({ "count": count }));
    envelope("data", result)
}

pub async fn article_stats(State(state): State<Arc<AppState>>) -> Response {
    envelope("data", state.storage.article_stats().await)
}

/// Delivery happens off the request path; failures are only logged.
fn spawn_notification(notifier: Arc<dyn ContactNotifier>, contact: ContactMessage) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&contact).await {
            tracing::error!("❌ Failed to send notification for contact {}: {}", contact.id, e);
        }
    });
}

async fn submit_contact(state: &AppState, request: ContactRequest) -> Result<ContactMessage> {
    let contact = NewContact::parse(
        request.name.as_deref().unwrap_or_default(),
        request.email.as_deref().unwrap_or_default(),
        request.message.as_deref().unwrap_or_default(),
    )?;
    let saved = state.storage.save_contact(&contact).await?;
    tracing::info!("📬 Stored contact message {} from {}", saved.id, saved.email);

    if let Some(notifier) = &state.notifier {
        spawn_notification(notifier.clone(), saved.clone());
    }
    Ok(saved)
}

pub async fn contact(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Response {
    let request = body_or_return!("data", payload);
    envelope("data", submit_contact(&state, request).await)
}
