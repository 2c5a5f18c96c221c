use async_trait::async_trait;
use nai_core::{Error, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::{ContentSource, RawContent};
use crate::ExtractorConfig;

const USER_AGENT: &str = concat!("nai/", env!("CARGO_PKG_VERSION"));

/// Fetches the page itself and pulls the article out of the markup.
#[derive(Debug)]
pub struct HtmlSource {
    client: Client,
}

impl HtmlSource {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

/// Headline and body from JSON-LD `NewsArticle`/`Article` metadata.
fn jsonld_article(document: &Html) -> Option<(Option<String>, String)> {
    let selector = selector("script[type='application/ld+json']")?;
    for script in document.select(&selector) {
        let Ok(json) = serde_json::from_str::<serde_json::Value>(script.text().collect::<String>().trim()) else {
            continue;
        };
        let candidates = match json {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };
        for item in candidates {
            if let Some(body) = item.get("articleBody").and_then(|b| b.as_str()) {
                if !body.trim().is_empty() {
                    let headline = item
                        .get("headline")
                        .and_then(|h| h.as_str())
                        .map(|h| h.trim().to_string());
                    return Some((headline, body.trim().to_string()));
                }
            }
        }
    }
    None
}

fn paragraphs(document: &Html) -> String {
    for css in ["article p", "main p", "p"] {
        let Some(selector) = selector(css) else {
            continue;
        };
        let text = document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

/// Extracts the title and paragraph text of an article page.
pub fn parse_article(html: &str) -> RawContent {
    let document = Html::parse_document(html);
    let title = element_text(&document, "h1").or_else(|| element_text(&document, "title"));

    match jsonld_article(&document) {
        Some((headline, body)) => RawContent {
            title: headline.or(title),
            text: body,
        },
        None => RawContent {
            title,
            text: paragraphs(&document),
        },
    }
}

#[async_trait]
impl ContentSource for HtmlSource {
    fn name(&self) -> &str {
        "html"
    }

    async fn fetch(&self, url: &Url) -> Result<RawContent> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::UpstreamExtraction(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamExtraction(format!("{} returned {}", url, status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::UpstreamExtraction(e.to_string()))?;
        let raw = parse_article(&html);
        if raw.text.trim().is_empty() {
            return Err(Error::UpstreamExtraction(
                "Failed to extract content from URL".to_string(),
            ));
        }
        Ok(raw)
    }
}
