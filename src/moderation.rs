// ABOUTME: Story submission and moderation
// ABOUTME: Validates submissions, tracks story status and defines the store and upload seams

use crate::config::SUBMISSION_SUMMARY_LENGTH;
use crate::errors::{MemoriaError, Result};
use crate::media::is_supported_media_link;
use crate::source::StorySource;
use crate::story::{normalize_stories, ApiStory, Story};
use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Category value that asks the author for a custom category.
pub const OTHER_CATEGORY: &str = "Otra";
pub const SUBMISSION_CATEGORIES: [&str; 4] = ["Comunidad", "Familia", "Aprendizaje", "Naturaleza"];

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 100;
const CONTENT_MIN: usize = 50;
const CUSTOM_CATEGORY_MIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Hidden,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Pending => "pending",
            StoryStatus::Approved => "approved",
            StoryStatus::Rejected => "rejected",
            StoryStatus::Hidden => "hidden",
        }
    }

    /// Badge text shown in the admin console.
    pub fn label(&self) -> &'static str {
        match self {
            StoryStatus::Pending => "Pendiente",
            StoryStatus::Approved => "Aprobada",
            StoryStatus::Rejected => "Rechazada",
            StoryStatus::Hidden => "Oculta",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryStatus {
    type Err = MemoriaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "pending" => Ok(StoryStatus::Pending),
            "approved" => Ok(StoryStatus::Approved),
            "rejected" => Ok(StoryStatus::Rejected),
            "hidden" => Ok(StoryStatus::Hidden),
            other => Err(MemoriaError::ValidationError(format!(
                "Unknown story status: {}",
                other
            ))),
        }
    }
}

/// A row in the moderation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    #[serde(default)]
    pub status: StoryStatus,
    pub category: String,
    pub image: Option<String>,
    pub summary: Option<String>,
    pub media_url: Option<String>,
}

impl StoryRecord {
    pub fn to_api_story(&self) -> ApiStory {
        ApiStory {
            title: self.title.clone(),
            date: self.created_at.to_rfc3339(),
            content: self.content.clone(),
            images: self.image.iter().cloned().collect(),
            slug: self.slug.clone(),
            category: Some(self.category.clone()),
            media_url: self.media_url.clone(),
        }
    }
}

/// Field edits made from the admin detail page. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryEdit {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(StoryStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: StoryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// A story as filled in on the public submission form.
#[derive(Debug, Clone, Default)]
pub struct StorySubmission {
    pub title: String,
    pub category: String,
    pub custom_category: Option<String>,
    pub content: String,
    pub media_link: Option<String>,
}

impl StorySubmission {
    /// Check every form rule and report all failures at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let title_len = self.title.chars().count();
        if title_len < TITLE_MIN {
            problems.push("El título debe tener al menos 3 caracteres");
        } else if title_len > TITLE_MAX {
            problems.push("El título debe tener menos de 100 caracteres");
        }

        if self.category.is_empty() {
            problems.push("Selecciona una categoría");
        } else if self.category == OTHER_CATEGORY {
            let custom_len = self
                .custom_category
                .as_deref()
                .map(|c| c.chars().count())
                .unwrap_or(0);
            if custom_len < CUSTOM_CATEGORY_MIN {
                problems.push("Escribe una categoría válida (mínimo 3 letras)");
            }
        }

        if self.content.chars().count() < CONTENT_MIN {
            problems.push("La historia debe tener al menos 50 caracteres");
        }

        if let Some(link) = self.media_link.as_deref().filter(|l| !l.is_empty()) {
            if url::Url::parse(link).is_err() || !is_supported_media_link(link) {
                problems.push(
                    "El enlace debe ser de YouTube, Vimeo o una imagen directa (jpg, png, webp)",
                );
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MemoriaError::ValidationError(problems.join("; ")))
        }
    }

    /// Category as stored: the custom one when "Otra" was picked.
    pub fn final_category(&self) -> String {
        if self.category == OTHER_CATEGORY {
            self.custom_category.clone().unwrap_or_default()
        } else {
            self.category.clone()
        }
    }
}

fn non_slug_regex() -> &'static Regex {
    static NON_SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    NON_SLUG_REGEX.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("Invalid slug regex"))
}

/// Lowercase, spaces to dashes, everything outside `[A-Za-z0-9_-]` dropped.
pub fn slugify(title: &str) -> String {
    let dashed = title.to_lowercase().replace(' ', "-");
    non_slug_regex().replace_all(&dashed, "").into_owned()
}

/// Stored slug: the title slug plus a millisecond timestamp so resubmissions never collide.
pub fn unique_slug(title: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", slugify(title), now.timestamp_millis())
}

pub fn submission_summary(content: &str) -> String {
    let head: String = content.chars().take(SUBMISSION_SUMMARY_LENGTH).collect();
    format!("{}...", head)
}

/// A row to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
    pub summary: Option<String>,
    pub media_url: Option<String>,
}

/// Create/read/update access to moderated story rows.
pub trait ModerationStore {
    fn insert(&self, story: NewStory) -> Result<StoryRecord>;
    fn get_by_slug(&self, slug: &str) -> Result<StoryRecord>;
    fn list(&self, filter: StatusFilter) -> Result<Vec<StoryRecord>>;
    fn set_status(&self, id: &str, status: StoryStatus) -> Result<StoryRecord>;
    fn apply_edit(&self, id: &str, edit: &StoryEdit) -> Result<StoryRecord>;
}

#[derive(Debug, Default)]
pub struct InMemoryModerationStore {
    rows: Mutex<Vec<StoryRecord>>,
}

impl InMemoryModerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: &str, apply: F) -> Result<StoryRecord>
    where
        F: FnOnce(&mut StoryRecord),
    {
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MemoriaError::StoryNotFound(id.to_string()))?;
        apply(row);
        Ok(row.clone())
    }
}

impl ModerationStore for InMemoryModerationStore {
    fn insert(&self, story: NewStory) -> Result<StoryRecord> {
        let mut rows = self.rows.lock();
        if rows.iter().any(|r| r.slug == story.slug) {
            return Err(MemoriaError::StoreError(format!(
                "Duplicate slug: {}",
                story.slug
            )));
        }

        let record = StoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: story.title,
            slug: story.slug,
            created_at: story.created_at,
            content: story.content,
            status: StoryStatus::Pending,
            category: story.category,
            image: story.image,
            summary: story.summary,
            media_url: story.media_url,
        };
        rows.push(record.clone());
        Ok(record)
    }

    fn get_by_slug(&self, slug: &str) -> Result<StoryRecord> {
        self.rows
            .lock()
            .iter()
            .find(|r| r.slug == slug)
            .cloned()
            .ok_or_else(|| MemoriaError::StoryNotFound(slug.to_string()))
    }

    fn list(&self, filter: StatusFilter) -> Result<Vec<StoryRecord>> {
        let mut rows: Vec<StoryRecord> = self
            .rows
            .lock()
            .iter()
            .filter(|r| filter.matches(r.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn set_status(&self, id: &str, status: StoryStatus) -> Result<StoryRecord> {
        self.update(id, |row| row.status = status)
    }

    fn apply_edit(&self, id: &str, edit: &StoryEdit) -> Result<StoryRecord> {
        self.update(id, |row| {
            if let Some(title) = &edit.title {
                row.title = title.clone();
            }
            if let Some(summary) = &edit.summary {
                row.summary = Some(summary.clone());
            }
            if let Some(content) = &edit.content {
                row.content = content.clone();
            }
            if let Some(category) = &edit.category {
                row.category = category.clone();
            }
        })
    }
}

/// An image picked on the submission form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Object storage for story images. Returns a publicly retrievable URL.
pub trait ImageStore {
    fn upload(&self, image: &ImageUpload) -> Result<String>;
}

#[derive(Debug)]
pub struct InMemoryImageStore {
    public_base: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn new(public_base: &str) -> Self {
        Self {
            public_base: public_base.trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

impl ImageStore for InMemoryImageStore {
    fn upload(&self, image: &ImageUpload) -> Result<String> {
        if image.bytes.is_empty() {
            return Err(MemoriaError::UploadError(format!(
                "Empty image file: {}",
                image.file_name
            )));
        }

        let name = match image.extension() {
            Some(ext) => format!("{}.{}", uuid::Uuid::new_v4(), ext),
            None => uuid::Uuid::new_v4().to_string(),
        };
        self.objects.lock().insert(name.clone(), image.bytes.clone());

        Ok(format!("{}/{}", self.public_base, name))
    }
}

/// Validate a submission, upload its image and insert it as pending.
pub fn submit_story(
    submission: &StorySubmission,
    image: Option<&ImageUpload>,
    store: &dyn ModerationStore,
    images: &dyn ImageStore,
    now: DateTime<Utc>,
) -> Result<StoryRecord> {
    submission.validate()?;

    let image_url = match image {
        Some(upload) => Some(images.upload(upload)?),
        None => None,
    };

    let record = store.insert(NewStory {
        title: submission.title.clone(),
        slug: unique_slug(&submission.title, now),
        created_at: now,
        content: submission.content.clone(),
        category: submission.final_category(),
        image: image_url,
        summary: Some(submission_summary(&submission.content)),
        media_url: submission.media_link.clone().filter(|l| !l.is_empty()),
    })?;

    info!("Story submitted for review: {}", record.slug);
    Ok(record)
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub hidden: usize,
}

impl StatusCounts {
    pub fn tally<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a StoryStatus>,
    {
        statuses.into_iter().fold(Self::default(), |mut acc, status| {
            acc.total += 1;
            match status {
                StoryStatus::Pending => acc.pending += 1,
                StoryStatus::Approved => acc.approved += 1,
                StoryStatus::Rejected => acc.rejected += 1,
                StoryStatus::Hidden => acc.hidden += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub is_admin: bool,
}

/// Opaque session provider backed by the external auth service.
pub trait SessionProvider {
    fn current_session(&self) -> Option<Session>;
}

/// Fixed session, for the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<Session>);

impl SessionProvider for StaticSession {
    fn current_session(&self) -> Option<Session> {
        self.0.clone()
    }
}

pub fn require_admin(provider: &dyn SessionProvider) -> Result<Session> {
    match provider.current_session() {
        Some(session) if session.is_admin => Ok(session),
        Some(session) => Err(MemoriaError::Unauthorized(format!(
            "User {} is not an administrator",
            session.user_id
        ))),
        None => Err(MemoriaError::Unauthorized("No active session".to_string())),
    }
}

/// Admin operations, each gated on an administrator session.
pub struct ModerationConsole<'a> {
    store: &'a dyn ModerationStore,
    sessions: &'a dyn SessionProvider,
}

impl<'a> ModerationConsole<'a> {
    pub fn new(store: &'a dyn ModerationStore, sessions: &'a dyn SessionProvider) -> Self {
        Self { store, sessions }
    }

    pub fn stories(&self, filter: StatusFilter, search: &str) -> Result<Vec<StoryRecord>> {
        require_admin(self.sessions)?;
        let needle = search.trim().to_lowercase();
        Ok(self
            .store
            .list(filter)?
            .into_iter()
            .filter(|r| needle.is_empty() || r.title.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn story(&self, slug: &str) -> Result<StoryRecord> {
        require_admin(self.sessions)?;
        self.store.get_by_slug(slug)
    }

    pub fn set_status(&self, id: &str, status: StoryStatus) -> Result<StoryRecord> {
        let session = require_admin(self.sessions)?;
        let record = self.store.set_status(id, status)?;
        info!(
            "{} set story {} to {}",
            session.user_id, record.slug, status
        );
        Ok(record)
    }

    pub fn save_edit(&self, id: &str, edit: &StoryEdit) -> Result<StoryRecord> {
        require_admin(self.sessions)?;
        self.store.apply_edit(id, edit)
    }

    pub fn counts(&self) -> Result<StatusCounts> {
        require_admin(self.sessions)?;
        let rows = self.store.list(StatusFilter::All)?;
        Ok(StatusCounts::tally(rows.iter().map(|r| &r.status)))
    }
}

/// Approved rows from the moderation store, exposed as a public story source.
pub struct PublishedStories<'a> {
    store: &'a dyn ModerationStore,
}

impl<'a> PublishedStories<'a> {
    pub fn new(store: &'a dyn ModerationStore) -> Self {
        Self { store }
    }
}

impl StorySource for PublishedStories<'_> {
    fn list_stories(&self) -> Result<Vec<Story>> {
        let rows = self.store.list(StatusFilter::Only(StoryStatus::Approved))?;
        let payload = serde_json::to_value(
            rows.iter().map(StoryRecord::to_api_story).collect::<Vec<_>>(),
        )?;
        let stories = normalize_stories(&payload, &[]);
        if stories.len() < rows.len() {
            warn!(
                "{} approved stories had no readable content",
                rows.len() - stories.len()
            );
        }
        Ok(stories)
    }
}
