use lazy_static::lazy_static;
use nai_core::{Completion, Error, InferenceModel, ModelRole, Result, SentenceMatch, Summary};
use regex::Regex;

pub const MATCHING_SYSTEM_PROMPT: &str = r#"You are tasked with analyzing an article and its summary to identify which sentences in the article correspond to each sentence in the summary.

Your goal is to create a mapping that will be used for highlighting. For each sentence in the summary, identify the relevant sentences in the article that contain the information or support that summary sentence.

Return your response as a JSON array where each element has:
- "summary_sentence": the exact sentence from the summary
- "article_sentences": an array of exact sentences from the article that support or relate to this summary sentence

**Important:**
1. Return ONLY valid JSON, no additional text or explanation
2. Extract exact sentences from the article (don't paraphrase)
3. Each summary sentence should map to 1-3 article sentences
4. If a summary sentence doesn't have a clear match, provide an empty array
5. Preserve exact punctuation and formatting

Example format (replace with actual content):
[
  {
    "summary_sentence": "First sentence from summary.",
    "article_sentences": ["Matching sentence from article.", "Another matching sentence."]
  },
  {
    "summary_sentence": "Second sentence from summary.",
    "article_sentences": ["Corresponding article sentence."]
  }
]"#;

lazy_static! {
    static ref JSON_ARRAY_RE: Regex = Regex::new(r"\[[\s\S]*\]").unwrap();
    static ref CODE_FENCE_RE: Regex = Regex::new(r"```(?:json)?\s*").unwrap();
}

pub fn matching_prompt(article: &str, summary: &str) -> String {
    format!(
        "Article:\n{}\n\nSummary:\n{}\n\nProvide the JSON mapping now.",
        article, summary
    )
}

type MatchParser = fn(&str) -> Option<Vec<SentenceMatch>>;

fn parse_direct(text: &str) -> Option<Vec<SentenceMatch>> {
    serde_json::from_str(text).ok()
}

fn parse_bracketed(text: &str) -> Option<Vec<SentenceMatch>> {
    let found = JSON_ARRAY_RE.find(text)?;
    serde_json::from_str(found.as_str()).ok()
}

fn parse_unfenced(text: &str) -> Option<Vec<SentenceMatch>> {
    let cleaned = CODE_FENCE_RE.replace_all(text, "");
    serde_json::from_str(cleaned.trim()).ok()
}

/// Recovery strategies for model output, tried in order.
const PARSERS: [MatchParser; 3] = [parse_direct, parse_bracketed, parse_unfenced];

/// Parses the model's match list, tolerating surrounding prose and code
/// fences.
pub fn parse_matches(text: &str) -> Option<Vec<SentenceMatch>> {
    PARSERS.iter().find_map(|parse| parse(text))
}

/// Maps each summary sentence to the article sentences supporting it. The
/// result is expected in summary order; this is not verified beyond a
/// length check.
pub async fn match_sentences(
    model: &dyn InferenceModel,
    article: &str,
    summary: &str,
) -> Result<Vec<SentenceMatch>> {
    tracing::info!("🔗 Matching summary sentences to the article");
    let completion =
        Completion::new(ModelRole::Matching, matching_prompt(article, summary)).with_system(MATCHING_SYSTEM_PROMPT);
    let text = model
        .complete(&completion)
        .await
        .map_err(|e| Error::MatchingFailed(e.to_string()))?;

    let matches = parse_matches(&text).ok_or_else(|| {
        tracing::error!("❌ Could not parse matches from model output: {}", text);
        Error::MatchingFailed("Failed to parse JSON response from model".to_string())
    })?;

    let expected = Summary::parse(summary).sentences().len();
    if matches.len() != expected {
        tracing::warn!(
            "⚠️ Got {} matches for {} summary sentences",
            matches.len(),
            expected
        );
    }
    Ok(matches)
}
