use nai_core::{Completion, Error, InferenceModel, KeyInfo, ModelRole, Result, Summary};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert in summarizing technical news articles with a focus on accuracy and clarity.

Your task is to write a concise, 4-sentence summary that captures the essence of the provided article. Follow these instructions strictly:

1. Start with a **title** that is a proper noun or entity name, not a sentence.
2. **Sentence 1 (What was developed):** Clearly state what was created, introduced, or developed. Mention the developer or organization if relevant.
3. **Sentence 2 (Functionality):** Explain how it works or what technology it uses. Be specific about the mechanism or process.
4. **Sentence 3 (Key results):** Highlight the main outcomes, improvements, or capabilities. Include specific numbers or metrics if available.
5. **Sentence 4 (Future plans):** Describe future directions, research plans, or potential applications. Indicate if there are any next steps.

**Important:**
- The summary should be **no more than 110 words** (excluding the title).
- Write in a professional, neutral tone suitable for a technical newsletter.
- Preserve technical terms exactly as they appear in the article.
- Emphasize important numbers, percentages, and specific measurements.
- Do not add information not present in the article.
- Structure your response as:
  Title

  Sentence 1. Sentence 2. Sentence 3. Sentence 4.";

pub fn summary_prompt(article: &str, key_info: &KeyInfo) -> String {
    let mut prompt = format!("Article: {}\n\nKey Information:\n", article);
    for (question, answer) in key_info.iter() {
        prompt.push_str(&format!("- {}: {}\n", question.label(), answer));
    }
    prompt.push_str("\nGenerate the summary now.");
    prompt
}

/// One completion producing a title line and a four-sentence body. The
/// shape is checked but never enforced.
pub async fn generate_summary(
    model: &dyn InferenceModel,
    article: &str,
    key_info: &KeyInfo,
) -> Result<String> {
    tracing::info!("📝 Generating summary");
    let completion =
        Completion::new(ModelRole::Summary, summary_prompt(article, key_info)).with_system(SUMMARY_SYSTEM_PROMPT);
    let text = model
        .complete(&completion)
        .await
        .map_err(|e| Error::SummaryGenerationFailed(e.to_string()))?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(Error::SummaryGenerationFailed(
            "Model returned an empty summary".to_string(),
        ));
    }

    let violations = Summary::parse(&text).shape_violations();
    if !violations.is_empty() {
        tracing::warn!("⚠️ Summary does not have the requested shape: {:?}", violations);
    }
    Ok(text)
}
