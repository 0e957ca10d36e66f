use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoryError};
use crate::unit::{StoryUnit, validate_units};

/// Format of the narrative to produce.
///
/// Serialized in lowercase; deserialization accepts every label
/// [`FromStr`] understands, such as `"Blog Post"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StoryType {
    #[default]
    Article,
    Blog,
    Social,
}

impl StoryType {
    /// Human readable name used inside prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Blog => "blog post",
            Self::Social => "Instagram caption",
        }
    }
}

impl FromStr for StoryType {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "article" => Ok(Self::Article),
            "blog" | "blog post" | "blogpost" => Ok(Self::Blog),
            "social" | "social media post" | "caption" => Ok(Self::Social),
            other => Err(StoryError::Validation(format!("unknown story type `{other}`"))),
        }
    }
}

impl TryFrom<String> for StoryType {
    type Error = StoryError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<StoryType> for String {
    fn from(t: StoryType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Article => "article",
            Self::Blog => "blog",
            Self::Social => "social",
        };
        f.write_str(name)
    }
}

/// Optional knobs a user may set before generating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
}

impl GenerationOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_length == Some(0) || self.max_length == Some(0) {
            return Err(StoryError::Validation(
                "story length must be a positive number of words".into(),
            ));
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(StoryError::Validation(
                    "Minimum length cannot be greater than maximum length".into(),
                ));
            }
        }
        Ok(())
    }

    /// Additional instructions with surrounding whitespace removed, if any
    /// remain.
    pub fn instructions(&self) -> Option<&str> {
        self.additional_instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A generated narrative and the units it was written from.
///
/// `units` are in priority order, most important first, with any condensed
/// content already applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story: String,
    pub story_type: StoryType,
    pub units: Vec<StoryUnit>,
}

/// Result of an edit pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedStory {
    pub original_story: String,
    pub edited_story: String,
    pub edit_instructions: String,
}

/// A story as kept by a [`StoryStore`](crate::store::StoryStore).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub id: String,
    pub title: String,
    pub story: String,
    #[serde(default)]
    pub story_type: StoryType,
    #[serde(default, rename = "storyUnits")]
    pub units: Vec<StoryUnit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when saving a story for the first time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStory {
    pub title: String,
    pub story: String,
    #[serde(default)]
    pub story_type: StoryType,
    #[serde(default, rename = "storyUnits", alias = "units", alias = "inputs")]
    pub units: Vec<StoryUnit>,
}

impl NewStory {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(StoryError::Validation("a story needs a title".into()));
        }
        if self.story.trim().is_empty() {
            return Err(StoryError::Validation("story text is empty".into()));
        }
        validate_units(&self.units)
    }

    pub(crate) fn into_record(self, now: DateTime<Utc>) -> StoryRecord {
        StoryRecord {
            id: Uuid::new_v4().simple().to_string(),
            title: self.title.trim().to_string(),
            story: self.story,
            story_type: self.story_type,
            units: self.units,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a saved story.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(
        default,
        rename = "storyUnits",
        alias = "units",
        alias = "inputs",
        skip_serializing_if = "Option::is_none"
    )]
    pub units: Option<Vec<StoryUnit>>,
}

impl StoryUpdate {
    /// Apply the same checks as [`NewStory::validate`] to the fields present.
    pub fn validate(&self) -> Result<()> {
        if self.story.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(StoryError::Validation("story text is empty".into()));
        }
        match &self.units {
            Some(units) => validate_units(units),
            None => Ok(()),
        }
    }

    pub(crate) fn apply(self, record: &mut StoryRecord, now: DateTime<Utc>) {
        if let Some(story) = self.story {
            record.story = story;
        }
        if let Some(units) = self.units {
            record.units = units;
        }
        record.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_story_types() {
        assert_eq!("Article".parse::<StoryType>().unwrap(), StoryType::Article);
        assert_eq!("Blog Post".parse::<StoryType>().unwrap(), StoryType::Blog);
        assert_eq!(
            "social media post".parse::<StoryType>().unwrap(),
            StoryType::Social
        );
        assert!("poem".parse::<StoryType>().is_err());
    }

    #[test]
    fn story_type_reads_client_labels_and_writes_lowercase() {
        let t: StoryType = serde_json::from_str("\"Blog Post\"").unwrap();
        assert_eq!(t, StoryType::Blog);
        let t: StoryType = serde_json::from_str("\"Article\"").unwrap();
        assert_eq!(t, StoryType::Article);
        assert_eq!(serde_json::to_string(&StoryType::Blog).unwrap(), "\"blog\"");
        assert!(serde_json::from_str::<StoryType>("\"poem\"").is_err());
    }

    #[test]
    fn new_story_accepts_generation_response_shape() {
        let story: NewStory = serde_json::from_value(serde_json::json!({
            "title": "Flood",
            "story": "Waters rose.",
            "storyType": "blog",
            "inputs": [{ "type": "quote", "content": "We will rebuild.", "priority": 1 }]
        }))
        .unwrap();
        assert_eq!(story.units.len(), 1);
        assert_eq!(story.story_type, StoryType::Blog);
    }

    #[test]
    fn blank_updates_are_rejected() {
        let blank = StoryUpdate {
            story: Some("  ".into()),
            units: None,
        };
        assert!(blank.validate().is_err());
        let bad_units = StoryUpdate {
            story: None,
            units: Some(vec![StoryUnit::new(crate::unit::UnitKind::Note, " ")]),
        };
        assert!(bad_units.validate().is_err());
        assert!(StoryUpdate::default().validate().is_ok());
    }

    #[test]
    fn min_above_max_is_rejected() {
        let opts = GenerationOptions {
            min_length: Some(800),
            max_length: Some(300),
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn blank_instructions_are_ignored() {
        let opts = GenerationOptions {
            additional_instructions: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(opts.instructions(), None);
    }
}
