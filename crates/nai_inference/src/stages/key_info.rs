use futures::future::join_all;
use nai_core::{Completion, Error, InferenceModel, KeyInfo, KeyQuestion, ModelRole, Result};

use crate::embeddings::EmbeddingGenerator;
use crate::retrieval::{VectorIndex, MMR_LAMBDA, RETRIEVAL_FETCH_K, RETRIEVAL_K};

fn qa_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {}\n\nQuestion: {}\nHelpful Answer:",
        context, question
    )
}

async fn answer(
    model: &dyn InferenceModel,
    index: &VectorIndex,
    question: KeyQuestion,
    query: &[f32],
) -> Result<String> {
    let context = index
        .max_marginal_relevance_search(query, RETRIEVAL_K, RETRIEVAL_FETCH_K, MMR_LAMBDA)
        .join("\n\n");
    let completion = Completion::new(ModelRole::KeyInfo, qa_prompt(&context, question.question()));
    let text = model.complete(&completion).await?;
    Ok(text.trim().to_string())
}

async fn run(model: &dyn InferenceModel, article: &str) -> Result<KeyInfo> {
    let index = VectorIndex::build(model, article).await?;

    let questions: Vec<String> = KeyQuestion::ALL
        .iter()
        .map(|q| q.question().to_string())
        .collect();
    let queries = EmbeddingGenerator::new(model).embed_all(&questions).await?;

    let chains = KeyQuestion::ALL
        .iter()
        .zip(queries.iter())
        .map(|(question, query)| answer(model, &index, *question, query));
    let answers = join_all(chains)
        .await
        .into_iter()
        .collect::<Result<Vec<String>>>()?;

    let answers: [String; 3] = answers
        .try_into()
        .map_err(|_| Error::Inference("Expected one answer per question".to_string()))?;
    Ok(KeyInfo::from_answers(answers))
}

/// Answers the three fixed questions over a retrieval index of `article`.
/// The questions run concurrently; the answers come back in question order.
/// Any failing question fails the whole extraction.
pub async fn extract_key_info(model: &dyn InferenceModel, article: &str) -> Result<KeyInfo> {
    tracing::info!("🔎 Extracting key information");
    run(model, article).await.map_err(|e| {
        tracing::error!("❌ Key information extraction failed: {}", e);
        Error::KeyInfoExtractionFailed(e.to_string())
    })
}
