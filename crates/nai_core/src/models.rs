use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// Pipeline stage a model call belongs to. Backends map each role to a
/// concrete model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRole {
    Cleaning,
    KeyInfo,
    Summary,
    Translation,
    Matching,
}

impl ModelRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelRole::Cleaning => "cleaning",
            ModelRole::KeyInfo => "key-info",
            ModelRole::Summary => "summary",
            ModelRole::Translation => "translation",
            ModelRole::Matching => "matching",
        }
    }
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat completion: optional system prompt plus one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub role: ModelRole,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
}

impl Completion {
    /// Deterministic completion (temperature 0), which is what every stage
    /// uses.
    pub fn new(role: ModelRole, prompt: impl Into<String>) -> Self {
        Self {
            role,
            system: None,
            prompt: prompt.into(),
            temperature: 0.0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Run a chat completion and return the assistant text.
    async fn complete(&self, completion: &Completion) -> Result<String>;

    /// Generate one embedding per input text, in input order.
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
