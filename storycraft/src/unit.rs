//! Story units: the source material a story is generated from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoryError};

/// Priority assumed for units that carry no rank.
pub const UNRANKED_PRIORITY: u32 = 999;

/// Highest value on the client's 1..=5 importance scale.
pub const MAX_IMPORTANCE: u32 = 5;

/// Kind of source material.
///
/// Unknown kinds are kept verbatim so clients may send their own labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnitKind {
    Interview,
    Quote,
    Note,
    Background,
    Data,
    Snippet,
    Research,
    Other(String),
}

impl UnitKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Interview => "interview",
            Self::Quote => "quote",
            Self::Note => "note",
            Self::Background => "background",
            Self::Data => "data",
            Self::Snippet => "snippet",
            Self::Research => "research",
            Self::Other(s) => s.as_str(),
        }
    }

    /// How the writer should treat material of this kind, if there is a
    /// specific rule for it.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::Interview => Some("Interview transcripts should be quoted appropriately"),
            Self::Data => Some("Data/statistics should be presented clearly with context"),
            Self::Quote => Some("Quotes should be attributed properly"),
            Self::Snippet => Some("Writing snippets should be integrated smoothly"),
            Self::Research => Some("Research notes should be synthesized into the narrative"),
            Self::Note | Self::Background => {
                Some("Notes and background material should inform the narrative without dominating it")
            }
            Self::Other(_) => None,
        }
    }
}

impl From<String> for UnitKind {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "interview" => Self::Interview,
            "quote" => Self::Quote,
            "note" | "notes" => Self::Note,
            "background" => Self::Background,
            "data" | "statistics" => Self::Data,
            "snippet" | "writing" => Self::Snippet,
            "research" => Self::Research,
            _ => Self::Other(s),
        }
    }
}

impl From<UnitKind> for String {
    fn from(kind: UnitKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question and its answer, split out of an interview transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// One piece of user supplied source material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUnit {
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Rank, lower is more important.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Client importance scale, higher is more important. Only consulted
    /// when `priority` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<u32>,
    #[serde(
        default,
        alias = "processedUnits",
        skip_serializing_if = "Option::is_none"
    )]
    pub qa_pairs: Option<Vec<QaPair>>,
    /// Text before summarization, kept when the content was condensed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
}

impl StoryUnit {
    pub fn new(kind: UnitKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            title: None,
            priority: None,
            importance: None,
            qa_pairs: None,
            original_content: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_importance(mut self, importance: u32) -> Self {
        self.importance = Some(importance);
        self
    }

    /// The rank used for ordering and emphasis.
    pub fn effective_priority(&self) -> u32 {
        match (self.priority, self.importance) {
            (Some(p), _) => p,
            (None, Some(i)) if (1..=MAX_IMPORTANCE).contains(&i) => MAX_IMPORTANCE + 1 - i,
            _ => UNRANKED_PRIORITY,
        }
    }

    /// Whether the unit carries an explicit rank of either kind.
    pub fn is_ranked(&self) -> bool {
        self.priority.is_some()
            || self
                .importance
                .is_some_and(|i| (1..=MAX_IMPORTANCE).contains(&i))
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(StoryError::validation(format!(
                "{} unit has no content",
                self.kind
            )));
        }
        if self.priority == Some(0) {
            return Err(StoryError::validation("priority must be a positive integer"));
        }
        if let Some(i) = self.importance {
            if !(1..=MAX_IMPORTANCE).contains(&i) {
                return Err(StoryError::validation(format!(
                    "importance must be between 1 and {MAX_IMPORTANCE}"
                )));
            }
        }
        Ok(())
    }
}

/// How strongly a unit should be featured, derived from its rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Critical,
    High,
    Medium,
    Low,
    Background,
}

impl Emphasis {
    pub fn for_priority(priority: u32) -> Self {
        match priority {
            0 | 1 => Self::Critical,
            2 => Self::High,
            3 => Self::Medium,
            4 => Self::Low,
            _ => Self::Background,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL: build the piece around this detail",
            Self::High => "HIGH: feature this detail prominently",
            Self::Medium => "MEDIUM: include this detail",
            Self::Low => "LOW: mention briefly if space allows",
            Self::Background => "BACKGROUND: use only for context",
        }
    }
}

/// Whitespace separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Order units by rank, most important first. Units of equal rank keep their
/// submitted order.
pub fn sort_by_priority(units: &[StoryUnit]) -> Vec<StoryUnit> {
    let mut sorted = units.to_vec();
    sorted.sort_by_key(StoryUnit::effective_priority);
    sorted
}

pub fn validate_units(units: &[StoryUnit]) -> Result<()> {
    units.iter().try_for_each(StoryUnit::validate)
}
