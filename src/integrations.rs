//! Outbound collaborators: a text-generation API and a source-repository API.
//!
//! Only the call shapes live here; transports are supplied by the host. The
//! glue below treats any collaborator failure as "no result": it logs a
//! warning, keeps local state, and never retries.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::{
    Article, ArticleStatus, CalendarEvent, Collection, EventType, Record, ResearchSource, Task,
    TaskPriority, TaskStatus, UsageEntry,
};

/// Directory of the remote repository that holds published articles.
pub const PUBLISHED_DIR: &str = "docs";

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Price per 1000 tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt: f64,
    pub completion: f64,
}

impl Generation {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    pub fn cost(&self, pricing: &ModelPricing) -> f64 {
        self.prompt_tokens as f64 / 1000.0 * pricing.prompt
            + self.completion_tokens as f64 / 1000.0 * pricing.completion
    }
}

pub trait TextGenerator {
    fn generate(
        &self,
        model: &str,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Generation>;
}

// ---------------------------------------------------------------------------
// Repository content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedEntry {
    pub id: String,
    pub title: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    pub content: String,
    /// Opaque revision token; required to overwrite an existing file.
    pub revision: String,
}

pub trait RepositoryContent {
    fn list_published(&self) -> Result<Vec<PublishedEntry>>;

    fn read_file(&self, path: &str) -> Result<RemoteFile>;

    fn write_file(
        &self,
        path: &str,
        content: &str,
        commit_message: &str,
        revision: Option<&str>,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Published-article reconciliation
// ---------------------------------------------------------------------------

/// Join local articles with the remote published listing.
///
/// Remote entries whose path is already claimed by a local article are
/// dropped. The result is ordered by `updated_at`, newest first.
pub fn merge_published(local: Vec<Article>, remote: Vec<PublishedEntry>, now: &str) -> Vec<Article> {
    let claimed: Vec<String> = local.iter().filter_map(|a| a.path.clone()).collect();
    let mut merged = local;
    merged.extend(
        remote
            .into_iter()
            .filter(|entry| !claimed.contains(&entry.path))
            .map(|entry| Article {
                id: entry.id,
                topic: entry.title.clone(),
                title: entry.title,
                status: ArticleStatus::Published,
                created_at: now.to_string(),
                updated_at: now.to_string(),
                cost: 0.0,
                models: Vec::new(),
                url: Some(entry.url),
                path: Some(entry.path),
            }),
    );
    merged.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    merged
}

/// Local articles merged with the remote listing, or the local articles
/// alone when the repository is unavailable.
pub fn sync_published(
    articles: &Collection<'_, Article>,
    repo: &dyn RepositoryContent,
    now: &str,
) -> Result<Vec<Article>> {
    let local = articles.list()?;
    match repo.list_published() {
        Ok(remote) => {
            tracing::debug!(local = local.len(), remote = remote.len(), "merging published");
            Ok(merge_published(local, remote, now))
        }
        Err(e) => {
            tracing::warn!(error = %e, "repository unavailable, showing local articles only");
            Ok(local)
        }
    }
}

/// Lowercase, hyphen-separated file stem for a title.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Write `content` to the article's remote path and mark it published.
///
/// Returns `Ok(None)` when the repository rejected the write; the local
/// record is then left untouched.
pub fn publish_article(
    articles: &Collection<'_, Article>,
    repo: &dyn RepositoryContent,
    id: &str,
    content: &str,
    now: &str,
) -> Result<Option<Article>> {
    let Some(article) = articles.get(id)? else {
        return Err(Error::RecordNotFound {
            collection: Article::COLLECTION.to_string(),
            id: id.to_string(),
        });
    };
    let path = article
        .path
        .clone()
        .unwrap_or_else(|| format!("{PUBLISHED_DIR}/{}.html", slugify(&article.title)));

    let revision = match repo.read_file(&path) {
        Ok(file) => Some(file.revision),
        Err(e) => {
            tracing::debug!(error = %e, path = %path, "no existing remote file, publishing fresh");
            None
        }
    };
    let message = format!("Publish: {}", article.title);
    if let Err(e) = repo.write_file(&path, content, &message, revision.as_deref()) {
        tracing::warn!(error = %e, path = %path, "publish failed");
        return Ok(None);
    }

    let updated = articles.update(id, |a| {
        a.status = ArticleStatus::Published;
        a.path = Some(path.clone());
        a.updated_at = now.to_string();
    })?;
    Ok(Some(updated))
}

// ---------------------------------------------------------------------------
// Task board reconciliation
// ---------------------------------------------------------------------------

fn task_status_for_article(status: ArticleStatus) -> TaskStatus {
    match status {
        ArticleStatus::Published => TaskStatus::Published,
        ArticleStatus::Approved | ArticleStatus::Review => TaskStatus::Review,
        ArticleStatus::Draft => TaskStatus::Draft,
    }
}

fn task_status_for_event(event_type: EventType) -> TaskStatus {
    match event_type {
        EventType::Publish => TaskStatus::Published,
        EventType::Review => TaskStatus::Review,
        EventType::Article => TaskStatus::Draft,
        EventType::Research => TaskStatus::Research,
        EventType::Other => TaskStatus::Ideas,
    }
}

fn event_tag(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Article => "article",
        EventType::Research => "research",
        EventType::Review => "review",
        EventType::Publish => "publish",
        EventType::Other => "other",
    }
}

/// The task board as displayed: stored tasks, then a derived task for every
/// article no task points at, then one for every calendar event whose title
/// matches neither a task nor an article.
///
/// Derived tasks are not persisted. Their ids are `article-<id>` and
/// `event-<id>`.
pub fn merge_tasks(
    tasks: Vec<Task>,
    articles: &[Article],
    sources: &[ResearchSource],
    events: &[CalendarEvent],
    now: &str,
) -> Vec<Task> {
    let linked: HashSet<&str> = tasks.iter().filter_map(|t| t.article_id.as_deref()).collect();
    let article_tasks: Vec<Task> = articles
        .iter()
        .filter(|a| !linked.contains(a.id.as_str()))
        .map(|a| Task {
            id: format!("article-{}", a.id),
            title: a.title.clone(),
            status: task_status_for_article(a.status),
            priority: TaskPriority::Medium,
            created_at: a.created_at.clone(),
            updated_at: a.updated_at.clone(),
            article_id: Some(a.id.clone()),
            research_count: sources
                .iter()
                .filter(|s| s.article_id.as_deref() == Some(a.id.as_str()))
                .count(),
            prompts_used: Vec::new(),
            cost: a.cost,
            due_date: None,
            tags: a.models.clone(),
        })
        .collect();

    let taken: HashSet<&str> = tasks
        .iter()
        .map(|t| t.title.as_str())
        .chain(articles.iter().map(|a| a.title.as_str()))
        .collect();
    let event_tasks: Vec<Task> = events
        .iter()
        .filter(|e| !taken.contains(e.title.as_str()))
        .map(|e| Task {
            id: format!("event-{}", e.id),
            title: e.title.clone(),
            status: task_status_for_event(e.event_type),
            priority: TaskPriority::Medium,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            article_id: e.article_id.clone(),
            research_count: 0,
            prompts_used: Vec::new(),
            cost: 0.0,
            due_date: Some(e.date.clone()),
            tags: vec![event_tag(e.event_type).to_string()],
        })
        .collect();

    let mut merged = tasks;
    merged.extend(article_tasks);
    merged.extend(event_tasks);
    merged
}

// ---------------------------------------------------------------------------
// Draft generation
// ---------------------------------------------------------------------------

pub struct DraftRequest<'a> {
    pub id: &'a str,
    pub topic: &'a str,
    pub model: &'a str,
    pub provider: &'a str,
    pub pricing: ModelPricing,
    pub now: &'a str,
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub article: Article,
    /// `None` when the generator produced no result.
    pub generation: Option<Generation>,
}

pub fn article_messages(topic: &str) -> Vec<Message> {
    vec![
        Message::new(
            Role::System,
            "You write long-form articles in an academic but accessible voice.",
        ),
        Message::new(
            Role::User,
            format!(
                "Write an article about: {topic}\n\n\
                 Requirements:\n\
                 - 1500-2000 words\n\
                 - Cite relevant references\n\
                 - Close with open questions for the reader\n\
                 - Format with markdown headings"
            ),
        ),
    ]
}

/// Create a draft article for `request.topic` and ask the generator for its
/// body. A successful generation is billed to the usage collection and to
/// the article's running cost.
pub fn generate_draft(
    articles: &Collection<'_, Article>,
    usage: &Collection<'_, UsageEntry>,
    generator: &dyn TextGenerator,
    request: &DraftRequest<'_>,
) -> Result<Draft> {
    let article = articles.create(Article {
        id: request.id.to_string(),
        title: request.topic.to_string(),
        topic: request.topic.to_string(),
        status: ArticleStatus::Draft,
        created_at: request.now.to_string(),
        updated_at: request.now.to_string(),
        cost: 0.0,
        models: Vec::new(),
        url: None,
        path: None,
    })?;

    let messages = article_messages(request.topic);
    let generation = match generator.generate(request.model, &messages, &GenerationOptions::default()) {
        Ok(generation) => generation,
        Err(e) => {
            tracing::warn!(error = %e, model = request.model, "generation unavailable");
            return Ok(Draft {
                article,
                generation: None,
            });
        }
    };

    let cost = generation.cost(&request.pricing);
    usage.create(UsageEntry {
        id: format!("{}-usage", request.id),
        provider: request.provider.to_string(),
        model: request.model.to_string(),
        cost,
        tokens: generation.total_tokens(),
        timestamp: request.now.to_string(),
        article_id: Some(request.id.to_string()),
    })?;
    let article = articles.update(request.id, |a| {
        a.cost += cost;
        if !a.models.iter().any(|m| m == request.model) {
            a.models.push(request.model.to_string());
        }
        a.updated_at = request.now.to_string();
    })?;

    Ok(Draft {
        article,
        generation: Some(generation),
    })
}

// ---------------------------------------------------------------------------
// Usage totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_cost: f64,
    pub total_tokens: u64,
    pub total_calls: usize,
    pub avg_cost: f64,
}

impl UsageSummary {
    pub fn from_entries(entries: &[UsageEntry]) -> Self {
        let total_cost: f64 = entries.iter().map(|e| e.cost).sum();
        let total_calls = entries.len();
        Self {
            total_cost,
            total_tokens: entries.iter().map(|e| e.tokens).sum(),
            total_calls,
            avg_cost: if total_calls > 0 {
                total_cost / total_calls as f64
            } else {
                0.0
            },
        }
    }
    /// Spend per model, most expensive first. Ties keep model-name order.
    pub fn cost_by_model(entries: &[UsageEntry]) -> Vec<ModelCost> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in entries {
            *totals.entry(entry.model.as_str()).or_default() += entry.cost;
        }
        let mut costs: Vec<ModelCost> = totals
            .into_iter()
            .map(|(model, cost)| ModelCost {
                model: model.to_string(),
                cost,
            })
            .collect();
        costs.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        costs
    }

    /// Spend per calendar day (the `YYYY-MM-DD` prefix of the timestamp),
    /// oldest first, keeping only the most recent `limit` days.
    pub fn daily_costs(entries: &[UsageEntry], limit: usize) -> Vec<DailyCost> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in entries {
            let date = entry.timestamp.get(..10).unwrap_or(entry.timestamp.as_str());
            *totals.entry(date).or_default() += entry.cost;
        }
        let skip = totals.len().saturating_sub(limit);
        totals
            .into_iter()
            .skip(skip)
            .map(|(date, cost)| DailyCost {
                date: date.to_string(),
                cost,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCost {
    pub model: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCost {
    pub date: String,
    pub cost: f64,
}
