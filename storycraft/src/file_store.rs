use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

use crate::error::{Result, StoryError};
use crate::store::{StoryStore, title_taken, validate_id};
use crate::story::{NewStory, StoryRecord, StoryUpdate};

/// Story store writing one JSON document per story under
/// `root/users/{user}/stories/{id}.json`.
pub struct FileStore {
    root: PathBuf,
    /// Serializes the read-check-write of saves and updates.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection(&self, user: &str) -> PathBuf {
        self.root.join("users").join(user).join("stories")
    }

    fn document(&self, user: &str, id: &str) -> PathBuf {
        self.collection(user).join(format!("{id}.json"))
    }

    async fn read(path: &Path) -> Result<Option<StoryRecord>> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoryError::Storage(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, user: &str, record: &StoryRecord) -> Result<()> {
        fs::create_dir_all(self.collection(user)).await?;
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| StoryError::Storage(e.to_string()))?;
        fs::write(self.document(user, &record.id), bytes).await?;
        Ok(())
    }

    async fn read_all(&self, user: &str) -> Result<Vec<StoryRecord>> {
        let dir = self.collection(user);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "skipping unreadable story"),
            }
        }
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}

#[async_trait]
impl StoryStore for FileStore {
    async fn save(&self, user: &str, story: NewStory) -> Result<StoryRecord> {
        validate_id("user", user)?;
        story.validate()?;
        let _guard = self.write_lock.lock().await;
        if title_taken(&self.read_all(user).await?, &story.title) {
            return Err(StoryError::Duplicate);
        }
        let record = story.into_record(Utc::now());
        self.write(user, &record).await?;
        info!(user, id = %record.id, "story saved");
        Ok(record)
    }

    async fn get(&self, user: &str, id: &str) -> Result<Option<StoryRecord>> {
        validate_id("user", user)?;
        validate_id("story", id)?;
        Self::read(&self.document(user, id)).await
    }

    async fn list(&self, user: &str) -> Result<Vec<StoryRecord>> {
        validate_id("user", user)?;
        self.read_all(user).await
    }

    async fn update(&self, user: &str, id: &str, update: StoryUpdate) -> Result<StoryRecord> {
        validate_id("user", user)?;
        validate_id("story", id)?;
        update.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut record = Self::read(&self.document(user, id))
            .await?
            .ok_or(StoryError::NotFound)?;
        update.apply(&mut record, Utc::now());
        self.write(user, &record).await?;
        info!(user, id, "story updated");
        Ok(record)
    }

    async fn delete(&self, user: &str, id: &str) -> Result<()> {
        validate_id("user", user)?;
        validate_id("story", id)?;
        match fs::remove_file(self.document(user, id)).await {
            Ok(()) => {
                info!(user, id, "story deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
