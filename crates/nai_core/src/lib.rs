pub mod error;
pub mod highlight;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use models::{Completion, InferenceModel, ModelRole};
pub use pipeline::{ArticleInput, Phase, Pipeline, PipelineOutput, PipelineStages, PipelineState, Stage};
pub use storage::{ArticleStorage, ContactNotifier};
pub use types::*;
