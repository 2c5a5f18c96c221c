//! Client-side orchestration of the summarization stages.
//!
//! [`PipelineState`] is the pure state machine: each variant carries the
//! results of the stages completed so far. [`Phase`] is the presentation
//! mapping used for progress reporting. [`Pipeline`] drives a
//! [`PipelineStages`] implementation strictly sequentially; the first failing
//! stage moves the machine to [`PipelineState::Error`] and ends the run.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::logging::Logger;
use crate::types::{Article, KeyInfo, SentenceMatch};
use crate::{Error, Result};

/// What the user submitted. Text is never treated as a URL, even when it
/// contains one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleInput {
    Text(String),
    Url(String),
}

#[async_trait]
pub trait PipelineStages: Send + Sync {
    async fn extract_content(&self, url: &str) -> Result<String>;

    async fn extract_key_info(&self, article: &str) -> Result<KeyInfo>;

    async fn generate_summary(&self, article: &str, key_info: &KeyInfo) -> Result<String>;

    async fn translate(&self, summary: &str) -> Result<String>;

    async fn match_sentences(&self, article: &str, summary: &str) -> Result<Vec<SentenceMatch>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Validation,
    ContentExtraction,
    KeyInfoExtraction,
    SummaryGeneration,
    Translation,
    SentenceMatching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::ContentExtraction => "content extraction",
            Stage::KeyInfoExtraction => "key information extraction",
            Stage::SummaryGeneration => "summary generation",
            Stage::Translation => "translation",
            Stage::SentenceMatching => "sentence matching",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub article: Article,
    pub key_info: KeyInfo,
    pub summary: String,
    pub arabic_summary: String,
    pub matches: Vec<SentenceMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Initializing,
    ExtractingUrl {
        url: String,
    },
    KeyInfoExtraction {
        article: Article,
    },
    SummaryGeneration {
        article: Article,
        key_info: KeyInfo,
    },
    Translation {
        article: Article,
        key_info: KeyInfo,
        summary: String,
    },
    SentenceMatching {
        article: Article,
        key_info: KeyInfo,
        summary: String,
        arabic_summary: String,
    },
    Complete(PipelineOutput),
    Error {
        stage: Stage,
        message: String,
    },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete(_) | PipelineState::Error { .. })
    }

    /// The stage currently running, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Idle | PipelineState::Complete(_) | PipelineState::Error { .. } => None,
            PipelineState::Initializing => Some(Stage::Validation),
            PipelineState::ExtractingUrl { .. } => Some(Stage::ContentExtraction),
            PipelineState::KeyInfoExtraction { .. } => Some(Stage::KeyInfoExtraction),
            PipelineState::SummaryGeneration { .. } => Some(Stage::SummaryGeneration),
            PipelineState::Translation { .. } => Some(Stage::Translation),
            PipelineState::SentenceMatching { .. } => Some(Stage::SentenceMatching),
        }
    }

    /// Moves a running state to `Error`. Terminal states are left as-is.
    pub fn fail(self, message: impl Into<String>) -> PipelineState {
        match self.stage() {
            Some(stage) => PipelineState::Error {
                stage,
                message: message.into(),
            },
            None => self,
        }
    }
}

/// Progress checkpoints reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Initializing,
    ExtractingUrl,
    ArticleLoaded,
    ExtractingKeyInfo,
    KeyInfoExtracted,
    GeneratingSummary,
    SummaryGenerated,
    Translating,
    TranslationComplete,
    MatchingSentences,
    Complete,
    Error,
}

impl Phase {
    pub fn progress(&self) -> u8 {
        match self {
            Phase::Initializing => 0,
            Phase::ExtractingUrl => 5,
            Phase::ArticleLoaded => 10,
            Phase::ExtractingKeyInfo => 20,
            Phase::KeyInfoExtracted => 40,
            Phase::GeneratingSummary => 50,
            Phase::SummaryGenerated => 65,
            Phase::Translating => 70,
            Phase::TranslationComplete => 85,
            Phase::MatchingSentences => 90,
            Phase::Complete => 100,
            Phase::Error => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Initializing => "Initializing...",
            Phase::ExtractingUrl => "Extracting article from URL...",
            Phase::ArticleLoaded => "Article loaded",
            Phase::ExtractingKeyInfo => "Extracting key information...",
            Phase::KeyInfoExtracted => "Key information extracted",
            Phase::GeneratingSummary => "Generating summary...",
            Phase::SummaryGenerated => "Summary generated",
            Phase::Translating => "Translating to Arabic...",
            Phase::TranslationComplete => "Translation complete",
            Phase::MatchingSentences => "Matching sentences for highlighting...",
            Phase::Complete => "Complete!",
            Phase::Error => "Error",
        }
    }
}

pub trait PipelineObserver: Send {
    fn on_phase(&mut self, phase: Phase);
}

impl<F> PipelineObserver for F
where
    F: FnMut(Phase) + Send,
{
    fn on_phase(&mut self, phase: Phase) {
        self(phase)
    }
}

pub struct Pipeline<S> {
    stages: S,
    state: PipelineState,
    phase: Option<Phase>,
    logger: Logger,
}

impl<S: PipelineStages> Pipeline<S> {
    pub fn new(stages: S) -> Self {
        Self {
            stages,
            state: PipelineState::Idle,
            phase: None,
            logger: Logger::new().with_prefix("[pipeline]"),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn progress(&self) -> u8 {
        self.phase.map(|p| p.progress()).unwrap_or(0)
    }

    fn enter(&mut self, state: PipelineState) {
        self.state = state;
    }

    fn emit(&mut self, phase: Phase, observer: &mut dyn PipelineObserver) {
        self.logger.debug(&format!("{} ({}%)", phase.label(), phase.progress()));
        self.phase = Some(phase);
        observer.on_phase(phase);
    }

    fn fail(&mut self, error: Error, observer: &mut dyn PipelineObserver) -> Error {
        let state = std::mem::replace(&mut self.state, PipelineState::Idle);
        self.state = state.fail(error.to_string());
        if let PipelineState::Error { stage, message } = &self.state {
            self.logger.error(&format!("❌ {} failed: {}", stage, message));
        }
        self.emit(Phase::Error, observer);
        error
    }

    /// Runs every stage for `input`. Any stage error halts the run; the
    /// caller has to resubmit from scratch.
    pub async fn run(
        &mut self,
        input: ArticleInput,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineOutput> {
        self.phase = None;
        self.enter(PipelineState::Initializing);
        self.emit(Phase::Initializing, observer);

        let article = match input {
            ArticleInput::Url(url) => {
                self.enter(PipelineState::ExtractingUrl { url: url.clone() });
                self.emit(Phase::ExtractingUrl, observer);
                self.logger.info(&format!("🌐 Extracting article from {}", url));
                match self.stages.extract_content(&url).await {
                    Ok(content) => Article::new(content),
                    Err(e) => return Err(self.fail(e, observer)),
                }
            }
            ArticleInput::Text(text) => Article::new(text),
        };

        if let Err(e) = article.validate() {
            self.enter(PipelineState::Initializing);
            return Err(self.fail(e, observer));
        }
        self.emit(Phase::ArticleLoaded, observer);
        self.logger.info(&format!("📰 Article loaded ({} words)", article.word_count()));

        self.enter(PipelineState::KeyInfoExtraction {
            article: article.clone(),
        });
        self.emit(Phase::ExtractingKeyInfo, observer);
        let key_info = match self.stages.extract_key_info(article.text()).await {
            Ok(key_info) => key_info,
            Err(e) => return Err(self.fail(e, observer)),
        };
        self.emit(Phase::KeyInfoExtracted, observer);

        self.enter(PipelineState::SummaryGeneration {
            article: article.clone(),
            key_info: key_info.clone(),
        });
        self.emit(Phase::GeneratingSummary, observer);
        let summary = match self.stages.generate_summary(article.text(), &key_info).await {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail(e, observer)),
        };
        self.emit(Phase::SummaryGenerated, observer);

        self.enter(PipelineState::Translation {
            article: article.clone(),
            key_info: key_info.clone(),
            summary: summary.clone(),
        });
        self.emit(Phase::Translating, observer);
        let arabic_summary = match self.stages.translate(&summary).await {
            Ok(arabic) => arabic,
            Err(e) => return Err(self.fail(e, observer)),
        };
        self.emit(Phase::TranslationComplete, observer);

        self.enter(PipelineState::SentenceMatching {
            article: article.clone(),
            key_info: key_info.clone(),
            summary: summary.clone(),
            arabic_summary: arabic_summary.clone(),
        });
        self.emit(Phase::MatchingSentences, observer);
        let matches = match self.stages.match_sentences(article.text(), &summary).await {
            Ok(matches) => matches,
            Err(e) => return Err(self.fail(e, observer)),
        };

        let output = PipelineOutput {
            article,
            key_info,
            summary,
            arabic_summary,
            matches,
        };
        self.enter(PipelineState::Complete(output.clone()));
        self.emit(Phase::Complete, observer);
        self.logger.info("✅ Pipeline complete");
        Ok(output)
    }
}
