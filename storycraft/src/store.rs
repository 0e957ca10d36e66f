//! Persistence of saved stories.
//!
//! Stories live in a per-user collection, mirroring a document database
//! laid out as `users/{user}/stories/{id}`. [`MemoryStore`] keeps them in a
//! map; [`FileStore`](crate::file_store::FileStore) writes one JSON document
//! per story.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{Result, StoryError};
use crate::story::{NewStory, StoryRecord, StoryUpdate};

/// Storage of saved stories keyed by user and story id.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Save a new story. Titles are unique per user.
    async fn save(&self, user: &str, story: NewStory) -> Result<StoryRecord>;

    async fn get(&self, user: &str, id: &str) -> Result<Option<StoryRecord>>;

    /// All stories of `user`, oldest first.
    async fn list(&self, user: &str) -> Result<Vec<StoryRecord>>;

    async fn update(&self, user: &str, id: &str, update: StoryUpdate) -> Result<StoryRecord>;

    /// Remove a story. Deleting a missing story is not an error.
    async fn delete(&self, user: &str, id: &str) -> Result<()>;
}

/// Reject ids that could escape a user's collection.
pub fn validate_id(kind: &str, id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoryError::Validation(format!("invalid {kind} id `{id}`")))
    }
}

pub(crate) fn title_taken(records: &[StoryRecord], title: &str) -> bool {
    let title = title.trim();
    records.iter().any(|r| r.title == title)
}

/// Story store kept in process memory.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, Vec<StoryRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoryStore for MemoryStore {
    async fn save(&self, user: &str, story: NewStory) -> Result<StoryRecord> {
        validate_id("user", user)?;
        story.validate()?;
        let mut users = self.users.write().await;
        let stories = users.entry(user.to_string()).or_default();
        if title_taken(stories, &story.title) {
            return Err(StoryError::Duplicate);
        }
        let record = story.into_record(Utc::now());
        info!(user, id = %record.id, "story saved");
        stories.push(record.clone());
        Ok(record)
    }

    async fn get(&self, user: &str, id: &str) -> Result<Option<StoryRecord>> {
        validate_id("user", user)?;
        validate_id("story", id)?;
        let users = self.users.read().await;
        Ok(users
            .get(user)
            .and_then(|s| s.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn list(&self, user: &str) -> Result<Vec<StoryRecord>> {
        validate_id("user", user)?;
        let users = self.users.read().await;
        Ok(users.get(user).cloned().unwrap_or_default())
    }

    async fn update(&self, user: &str, id: &str, update: StoryUpdate) -> Result<StoryRecord> {
        validate_id("user", user)?;
        validate_id("story", id)?;
        update.validate()?;
        let mut users = self.users.write().await;
        let record = users
            .get_mut(user)
            .and_then(|s| s.iter_mut().find(|r| r.id == id))
            .ok_or(StoryError::NotFound)?;
        update.apply(record, Utc::now());
        info!(user, id, "story updated");
        Ok(record.clone())
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        validate_id("user", user)?;
        validate_id("story", id)?;
        let mut users = self.users.write().await;
        if let Some(stories) = users.get_mut(user) {
            stories.retain(|r| r.id != id);
        }
        info!(user, id, "story deleted");
        Ok(())
    }
}
