use nai_core::{Completion, Error, InferenceModel, ModelRole, Result};

pub const TRANSLATION_SYSTEM_PROMPT: &str = "You are an expert translator specializing in technical translations from English to Arabic.

Your task is to translate the provided English summary into Arabic while:
1. Preserving all technical terms accurately
2. Maintaining the structure and formatting
3. Using proper Arabic grammar and syntax
4. Keeping the professional tone
5. Preserving any numbers, metrics, or specific measurements exactly as they appear

Provide only the Arabic translation without any additional commentary.";

/// Translates the English summary with the translation model. There is no
/// fallback model.
pub async fn translate_to_arabic(model: &dyn InferenceModel, summary: &str) -> Result<String> {
    tracing::info!("🌍 Translating summary to Arabic");
    let completion = Completion::new(ModelRole::Translation, summary).with_system(TRANSLATION_SYSTEM_PROMPT);
    let text = model
        .complete(&completion)
        .await
        .map_err(|e| Error::TranslationFailed(e.to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::TranslationFailed(
            "Model returned an empty translation".to_string(),
        ));
    }
    Ok(text.to_string())
}
