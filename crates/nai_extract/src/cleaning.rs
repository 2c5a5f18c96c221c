use lazy_static::lazy_static;
use nai_core::{Completion, InferenceModel, ModelRole, Result};
use regex::Regex;

use crate::sources::RawContent;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref URL_RE: Regex = Regex::new(r"https?://[^\s]+").unwrap();
}

pub fn cleaning_prompt(raw: &RawContent) -> String {
    let title = raw
        .title
        .as_deref()
        .map(|t| format!("Title: {}\n\n", t))
        .unwrap_or_default();
    format!(
        "Clean the following article content by:
1. Excluding all hyperlinks, URLs, and references
2. Excluding any HTML tags, metadata, or formatting styles
3. Maintaining the original paragraph structure
4. Keeping only the main article text
5. Removing advertisements, navigation elements, and headers/footers
6. Preserving technical terms and numbers exactly as they appear
7. Putting the article title alone on the first line, followed by a blank line

{}Content:
{}

Return only the cleaned article text with proper paragraph breaks.",
        title, raw.text
    )
}

/// Model-based cleaning. Empty output counts as a failure.
pub async fn clean_with_model(model: &dyn InferenceModel, raw: &RawContent) -> Result<String> {
    let text = model
        .complete(&Completion::new(ModelRole::Cleaning, cleaning_prompt(raw)))
        .await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(nai_core::Error::Inference(
            "Cleaning model returned no text".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Regex cleaning used when the model is unavailable: strips tags and URLs,
/// drops runs of blank lines and puts the title first.
pub fn fallback_clean(raw: &RawContent) -> String {
    let stripped = TAG_RE.replace_all(&raw.text, "");
    let stripped = URL_RE.replace_all(&stripped, "");

    let mut lines: Vec<&str> = Vec::new();
    for line in stripped.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(if blank { "" } else { line });
    }
    let body = lines.join("\n");
    let body = body.trim();

    match raw.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) if !body.starts_with(title) => format!("{}\n\n{}", title, body),
        _ => body.to_string(),
    }
}
