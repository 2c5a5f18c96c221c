pub mod index;
pub mod splitter;

pub use index::{cosine_similarity, VectorIndex};
pub use splitter::RecursiveTextSplitter;

/// Chunks retrieved per question.
pub const RETRIEVAL_K: usize = 4;
/// Candidates considered by the MMR re-ranking.
pub const RETRIEVAL_FETCH_K: usize = 20;
pub const MMR_LAMBDA: f32 = 0.5;
