// ABOUTME: Story records and feed shaping
// ABOUTME: Maps remote story payloads into display stories with excerpts, ordering and estimates

use crate::blocks::{parse_blocks_with, ContentBlock, ParserConfig};
use crate::config::{EXCERPT_MAX_LENGTH, FALLBACK_IMAGE};
use crate::media::MediaEmbed;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

pub const DEFAULT_CATEGORY: &str = "Historias";
pub const ALL_CATEGORIES: &str = "Todas";

const MIN_READ_MINUTES: usize = 3;
const WORDS_PER_MINUTE: f64 = 180.0;
const MIN_VIEWS: usize = 120;
const VIEWS_PER_WORD: f64 = 2.4;
const RELATED_LIMIT: usize = 3;

/// A story as returned by the remote story store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiStory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
}

/// Database-backed APIs send `null` for empty columns; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A story ready to show on cards and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image: String,
    pub images: Vec<String>,
    pub published_at: String,
    pub slug: String,
    pub category: String,
    pub media_url: Option<String>,
    /// Content exactly as received, before sanitizing. Used for block parsing.
    #[serde(skip)]
    pub raw_content: String,
}

impl Story {
    /// Build a display story. Stories without a title, slug or any readable
    /// text are dropped.
    pub fn from_api(item: &ApiStory) -> Option<Self> {
        if item.title.is_empty() || item.slug.is_empty() {
            return None;
        }

        let content = sanitize_content(&item.content);
        let summary = create_excerpt(&item.content);
        if summary.is_empty() {
            return None;
        }

        Some(Self {
            title: item.title.clone(),
            summary,
            content,
            image: item
                .images
                .first()
                .cloned()
                .unwrap_or_else(|| FALLBACK_IMAGE.to_string()),
            images: item.images.clone(),
            published_at: item.date.clone(),
            slug: item.slug.clone(),
            category: item
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            media_url: item.media_url.clone().filter(|u| !u.trim().is_empty()),
            raw_content: item.content.clone(),
        })
    }

    /// Render blocks for the detail page, with the media link embedded last.
    pub fn blocks(&self, config: &ParserConfig) -> Vec<ContentBlock> {
        let mut blocks = parse_blocks_with(&self.raw_content, &self.images, config);
        if let Some(media) = self.media_url.as_deref().and_then(MediaEmbed::classify) {
            blocks.push(ContentBlock::Embed { media });
        }
        blocks
    }

    pub fn read_time_minutes(&self) -> usize {
        estimate_read_time(&self.content)
    }

    pub fn estimated_views(&self) -> usize {
        estimate_views(&self.content)
    }
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"))
}

fn nbsp_regex() -> &'static Regex {
    static NBSP_REGEX: OnceLock<Regex> = OnceLock::new();
    NBSP_REGEX.get_or_init(|| Regex::new(r"(?i)&nbsp;").expect("Invalid nbsp regex"))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup and collapse whitespace.
pub fn sanitize_content(value: &str) -> String {
    let without_tags = tag_regex().replace_all(value, " ");
    let without_nbsp = nbsp_regex().replace_all(&without_tags, " ");
    collapse_whitespace(&without_nbsp)
}

/// Card excerpt: sanitized text clipped at a word boundary.
pub fn create_excerpt(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let clean = sanitize_content(content);
    if clean.chars().count() <= EXCERPT_MAX_LENGTH {
        return clean;
    }

    let clipped: String = clean.chars().take(EXCERPT_MAX_LENGTH).collect();
    let excerpt = match clipped.rfind(' ') {
        Some(last_space) if last_space > 0 => &clipped[..last_space],
        _ => clipped.as_str(),
    };

    format!("{}...", excerpt.trim_end())
}

/// Keep the first story seen for each slug.
pub fn dedupe_by_slug(stories: Vec<Story>) -> Vec<Story> {
    let mut seen = HashSet::new();
    stories
        .into_iter()
        .filter(|story| seen.insert(story.slug.clone()))
        .collect()
}

/// Milliseconds since the epoch for a publication date; unparseable dates are 0.
pub fn published_timestamp(value: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Newest first. Ties keep their relative order.
pub fn sort_newest_first(stories: &mut [Story]) {
    stories.sort_by_key(|story| std::cmp::Reverse(published_timestamp(&story.published_at)));
}

/// Accept a bare array, `{"data": [...]}` or `{"posts": [...]}`.
pub fn extract_api_stories(payload: &serde_json::Value) -> Vec<ApiStory> {
    let items = match payload {
        serde_json::Value::Array(items) => Some(items),
        serde_json::Value::Object(map) => ["data", "posts"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_array())),
        _ => None,
    };

    items
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<ApiStory>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Merge remote stories with the seed stories, dedupe and order them.
pub fn normalize_stories(payload: &serde_json::Value, seed: &[Story]) -> Vec<Story> {
    let mut stories: Vec<Story> = extract_api_stories(payload)
        .iter()
        .filter_map(Story::from_api)
        .collect();
    stories.extend(seed.iter().cloned());

    let mut stories = dedupe_by_slug(stories);
    sort_newest_first(&mut stories);
    stories
}

/// Filter labels: the catch-all label, then the distinct categories sorted.
pub fn categories(stories: &[Story]) -> Vec<String> {
    let distinct: BTreeSet<&str> = stories
        .iter()
        .map(|s| s.category.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(distinct.into_iter().map(str::to_string))
        .collect()
}

pub fn filter_by_category<'a>(stories: &'a [Story], category: &str) -> Vec<&'a Story> {
    stories
        .iter()
        .filter(|s| category == ALL_CATEGORIES || s.category == category)
        .collect()
}

pub fn find_by_slug<'a>(stories: &'a [Story], slug: &str) -> Option<&'a Story> {
    stories.iter().find(|s| s.slug == slug)
}

/// Stories to suggest under a detail page.
pub fn related_stories<'a>(stories: &'a [Story], slug: &str) -> Vec<&'a Story> {
    stories
        .iter()
        .filter(|s| s.slug != slug)
        .take(RELATED_LIMIT)
        .collect()
}

fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

pub fn estimate_read_time(content: &str) -> usize {
    let words = word_count(content);
    if words == 0 {
        return MIN_READ_MINUTES;
    }
    let minutes = (words as f64 / WORDS_PER_MINUTE).round() as usize;
    minutes.max(MIN_READ_MINUTES)
}

pub fn estimate_views(content: &str) -> usize {
    let views = (word_count(content) as f64 * VIEWS_PER_WORD).round() as usize;
    views.max(MIN_VIEWS)
}

fn is_sentence_start(c: char) -> bool {
    c.is_ascii_uppercase() || matches!(c, 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'Ñ')
}

/// Split flattened prose into paragraphs at sentence boundaries followed by a capital letter.
pub fn split_into_paragraphs(content: &str) -> Vec<String> {
    let normalized = collapse_whitespace(content);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut paragraphs = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = normalized.char_indices().collect();

    for window in chars.windows(3) {
        let [(_, end_mark), (space_at, space), (_, next)] = [window[0], window[1], window[2]];
        if matches!(end_mark, '.' | '!' | '?') && space == ' ' && is_sentence_start(next) {
            paragraphs.push(normalized[start..space_at].to_string());
            start = space_at + 1;
        }
    }
    paragraphs.push(normalized[start..].to_string());

    paragraphs
}
