//! The model-backed pipeline stages. Each takes the model explicitly and
//! maps any failure onto its stage's error variant.

pub mod key_info;
pub mod matching;
pub mod summary;
pub mod translate;

pub use key_info::extract_key_info;
pub use matching::{match_sentences, parse_matches};
pub use summary::generate_summary;
pub use translate::translate_to_arabic;
