use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{split_sentences, word_count};
use crate::{Error, Result};

/// Articles shorter than this are rejected before any model call.
pub const MIN_ARTICLE_WORDS: usize = 130;

/// Number of body sentences a summary is expected to contain.
pub const SUMMARY_SENTENCES: usize = 4;

/// Soft word budget for the summary body (title excluded).
pub const SUMMARY_WORD_BUDGET: usize = 110;

/// Request-scoped article text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    text: String,
    word_count: usize,
}

impl Article {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = word_count(&text);
        Self { text, word_count }
    }

    /// Builds an article and rejects it when it is under
    /// [`MIN_ARTICLE_WORDS`].
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let article = Self::new(text);
        article.validate()?;
        Ok(article)
    }

    pub fn validate(&self) -> Result<()> {
        if self.word_count < MIN_ARTICLE_WORDS {
            return Err(Error::ArticleTooShort { words: self.word_count });
        }
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// First non-empty line.
    pub fn title(&self) -> Option<&str> {
        self.text.lines().map(str::trim).find(|line| !line.is_empty())
    }

    /// Everything after the title line.
    pub fn body(&self) -> &str {
        let trimmed = self.text.trim_start();
        match trimmed.find('\n') {
            Some(idx) => trimmed[idx..].trim(),
            None => "",
        }
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// The three fixed retrieval questions, in answer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyQuestion {
    TechnicalConcepts,
    KeyFindings,
    Impacts,
}

impl KeyQuestion {
    pub const ALL: [KeyQuestion; 3] = [
        KeyQuestion::TechnicalConcepts,
        KeyQuestion::KeyFindings,
        KeyQuestion::Impacts,
    ];

    pub fn question(&self) -> &'static str {
        match self {
            KeyQuestion::TechnicalConcepts => {
                "What are the main technical concepts discussed in this article?"
            }
            KeyQuestion::KeyFindings => "What are the key findings or advancements mentioned?",
            KeyQuestion::Impacts => "What potential impacts or applications are discussed?",
        }
    }

    /// Label used when the answer is fed to the summary prompt.
    pub fn label(&self) -> &'static str {
        match self {
            KeyQuestion::TechnicalConcepts => "Main technical concepts",
            KeyQuestion::KeyFindings => "Key findings/advancements",
            KeyQuestion::Impacts => "Potential impacts/applications",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
}

impl KeyInfo {
    pub fn from_answers(answers: [String; 3]) -> Self {
        let [answer1, answer2, answer3] = answers;
        Self { answer1, answer2, answer3 }
    }

    pub fn answer(&self, question: KeyQuestion) -> &str {
        match question {
            KeyQuestion::TechnicalConcepts => &self.answer1,
            KeyQuestion::KeyFindings => &self.answer2,
            KeyQuestion::Impacts => &self.answer3,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyQuestion, &str)> {
        KeyQuestion::ALL.into_iter().map(move |q| (q, self.answer(q)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolation {
    MissingTitle,
    SentenceCount { found: usize },
    WordBudget { words: usize },
}

/// A parsed English summary: title line plus body sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: Option<String>,
    pub body: String,
}

impl Summary {
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();

        if rest.is_empty() {
            return Self { title: None, body: first.to_string() };
        }

        let title = first.trim_matches(|c| c == '*' || c == '#').trim().to_string();
        Self {
            title: (!title.is_empty()).then_some(title),
            body: rest.join(" "),
        }
    }

    pub fn sentences(&self) -> Vec<&str> {
        split_sentences(&self.body)
    }

    pub fn body_words(&self) -> usize {
        word_count(&self.body)
    }

    /// Structural checks the summary prompt asks for. The generator does not
    /// enforce these.
    pub fn shape_violations(&self) -> Vec<ShapeViolation> {
        let mut violations = Vec::new();
        if self.title.is_none() {
            violations.push(ShapeViolation::MissingTitle);
        }
        let found = self.sentences().len();
        if found != SUMMARY_SENTENCES {
            violations.push(ShapeViolation::SentenceCount { found });
        }
        let words = self.body_words();
        if words > SUMMARY_WORD_BUDGET {
            violations.push(ShapeViolation::WordBudget { words });
        }
        violations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceMatch {
    pub summary_sentence: String,
    #[serde(default)]
    pub article_sentences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticleRecord {
    pub original_article: String,
    pub english_summary: String,
    pub arabic_summary: String,
}

impl NewArticleRecord {
    pub fn validate(&self) -> Result<()> {
        let missing = [&self.original_article, &self.english_summary, &self.arabic_summary]
            .iter()
            .any(|field| field.trim().is_empty());
        if missing {
            return Err(Error::InvalidInput("Missing required fields".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub original_article: String,
    pub english_summary: String,
    pub arabic_summary: String,
    pub copied: bool,
    pub discarded: bool,
    pub created_at: DateTime<Utc>,
}

/// Post-hoc user action on a saved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleAction {
    Copied,
    Discarded,
}

impl std::str::FromStr for ArticleAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "copied" => Ok(ArticleAction::Copied),
            "discarded" => Ok(ArticleAction::Discarded),
            _ => Err(Error::InvalidInput(
                "Invalid action. Must be \"copied\" or \"discarded\"".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArticleStats {
    pub total: i64,
    pub copied: i64,
    pub rate: f64,
}

impl ArticleStats {
    pub fn new(total: i64, copied: i64) -> Self {
        let rate = if total > 0 {
            copied as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self { total, copied, rate }
    }
}

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContact {
    /// Validates the raw form fields and returns the trimmed contact.
    pub fn parse(name: &str, email: &str, message: &str) -> Result<Self> {
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(Error::InvalidInput("All fields are required".to_string()));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(Error::InvalidInput("Invalid email address".to_string()));
        }

        let name = name.trim();
        let email = email.trim();
        let message = message.trim();

        let name_len = name.chars().count();
        if !(2..=255).contains(&name_len) {
            return Err(Error::InvalidInput(
                "Name must be between 2 and 255 characters".to_string(),
            ));
        }
        let message_len = message.chars().count();
        if !(10..=5000).contains(&message_len) {
            return Err(Error::InvalidInput(
                "Message must be between 10 and 5000 characters".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
