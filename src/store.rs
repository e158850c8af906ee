//! File-backed record store.
//!
//! Each logical collection is one JSON array at `<root>/<collection>.json`.
//! Every write replaces the whole collection, so the last writer wins.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single item in a named collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection<T: Record>(&self) -> Collection<'_, T> {
        Collection {
            store: self,
            _record: PhantomData,
        }
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    fn load<T: Record>(&self) -> Result<Vec<T>> {
        let path = self.path_for(T::COLLECTION);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save<T: Record>(&self, records: &[T]) -> Result<()> {
        let path = self.path_for(T::COLLECTION);
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(
            collection = T::COLLECTION,
            records = records.len(),
            "collection saved"
        );
        Ok(())
    }
}

/// Typed view over one collection of a [`RecordStore`].
pub struct Collection<'a, T: Record> {
    store: &'a RecordStore,
    _record: PhantomData<T>,
}

impl<T: Record> Collection<'_, T> {
    pub fn list(&self) -> Result<Vec<T>> {
        self.store.load()
    }

    pub fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self.list()?.into_iter().find(|r| r.id() == id))
    }

    /// Insert at the front, so listings are newest first.
    pub fn create(&self, record: T) -> Result<T> {
        let mut records = self.list()?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(Error::DuplicateRecord {
                collection: T::COLLECTION.to_string(),
                id: record.id().to_string(),
            });
        }
        records.insert(0, record.clone());
        self.store.save(&records)?;
        Ok(record)
    }

    pub fn update<F>(&self, id: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let mut records = self.list()?;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Error::RecordNotFound {
                collection: T::COLLECTION.to_string(),
                id: id.to_string(),
            })?;
        apply(record);
        let updated = record.clone();
        self.store.save(&records)?;
        Ok(updated)
    }

    /// Returns whether a record was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.store.save(&records)?;
        Ok(true)
    }

    pub fn replace_all(&self, records: &[T]) -> Result<()> {
        self.store.save(records)
    }
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Review,
    Approved,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub status: ArticleStatus,
    /// RFC 3339 timestamps; lexical order is chronological.
    pub created_at: String,
    pub updated_at: String,
    pub cost: f64,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Path of the published copy in the remote repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Record for Article {
    const COLLECTION: &'static str = "articles";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<String>,
    pub created_at: String,
}

impl Record for Prompt {
    const COLLECTION: &'static str = "prompts";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One billed call to the generation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub id: String,
    pub provider: String,
    pub model: String,
    pub cost: f64,
    pub tokens: u64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
}

impl Record for UsageEntry {
    const COLLECTION: &'static str = "api-usage";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection<'_, Prompt> {
    /// Bump the usage counter and stamp `last_used`.
    pub fn record_use(&self, id: &str, now: &str) -> Result<Prompt> {
        self.update(id, |p| {
            p.usage_count = p.usage_count.saturating_add(1);
            p.last_used = Some(now.to_string());
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Ideas,
    Research,
    Draft,
    Review,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// A card on the editorial task board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    #[serde(default)]
    pub research_count: usize,
    #[serde(default)]
    pub prompts_used: Vec<String>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSource {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_title: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub quotes: Vec<String>,
}

impl Record for ResearchSource {
    const COLLECTION: &'static str = "research";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection<'_, ResearchSource> {
    pub fn toggle_archive(&self, id: &str) -> Result<ResearchSource> {
        self.update(id, |s| s.is_archived = !s.is_archived)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Article,
    Research,
    Review,
    Publish,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    Planned,
    InProgress,
    Completed,
    Overdue,
}

impl EventStatus {
    /// Planned -> in progress -> completed -> planned. Overdue events restart
    /// at planned.
    pub fn next(self) -> Self {
        match self {
            EventStatus::Planned => EventStatus::InProgress,
            EventStatus::InProgress => EventStatus::Completed,
            EventStatus::Completed | EventStatus::Overdue => EventStatus::Planned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
}

impl Record for CalendarEvent {
    const COLLECTION: &'static str = "calendar";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Collection<'_, CalendarEvent> {
    pub fn cycle_status(&self, id: &str) -> Result<CalendarEvent> {
        self.update(id, |e| e.status = e.status.next())
    }
}
