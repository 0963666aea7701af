// ABOUTME: Media link classification for story embeds
// ABOUTME: Recognises YouTube, Vimeo and direct image links and builds their embed URLs

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn youtube_regex() -> &'static Regex {
    static YOUTUBE_REGEX: OnceLock<Regex> = OnceLock::new();
    YOUTUBE_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
        )
        .expect("Invalid YouTube regex")
    })
}

fn vimeo_regex() -> &'static Regex {
    static VIMEO_REGEX: OnceLock<Regex> = OnceLock::new();
    VIMEO_REGEX.get_or_init(|| Regex::new(r"vimeo\.com/(\d+)").expect("Invalid Vimeo regex"))
}

fn image_regex() -> &'static Regex {
    static IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    IMAGE_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\.(jpeg|jpg|gif|png|webp)($|\?)").expect("Invalid image regex")
    })
}

/// An embeddable media link attached to a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaEmbed {
    YouTube { video_id: String },
    Vimeo { video_id: String },
    Image { url: String },
}

impl MediaEmbed {
    /// Classify a link. Returns `None` for anything that cannot be embedded.
    pub fn classify(url: &str) -> Option<Self> {
        if url.is_empty() {
            return None;
        }

        if let Some(caps) = youtube_regex().captures(url) {
            return Some(MediaEmbed::YouTube {
                video_id: caps[1].to_string(),
            });
        }

        if let Some(caps) = vimeo_regex().captures(url) {
            return Some(MediaEmbed::Vimeo {
                video_id: caps[1].to_string(),
            });
        }

        if image_regex().is_match(url) {
            return Some(MediaEmbed::Image {
                url: url.to_string(),
            });
        }

        None
    }

    /// URL to put in the `src` of the rendered iframe or image.
    pub fn embed_url(&self) -> String {
        match self {
            MediaEmbed::YouTube { video_id } => format!("https://www.youtube.com/embed/{}", video_id),
            MediaEmbed::Vimeo { video_id } => format!("https://player.vimeo.com/video/{}", video_id),
            MediaEmbed::Image { url } => url.clone(),
        }
    }

    pub fn is_video(&self) -> bool {
        !matches!(self, MediaEmbed::Image { .. })
    }

    pub fn player_title(&self) -> &'static str {
        match self {
            MediaEmbed::YouTube { .. } => "YouTube video player",
            MediaEmbed::Vimeo { .. } => "Vimeo video player",
            MediaEmbed::Image { .. } => "Media content",
        }
    }
}

/// Loose host check used by submission validation before a link is classified.
pub fn is_supported_media_link(url: &str) -> bool {
    url.contains("youtube.com")
        || url.contains("youtu.be")
        || url.contains("vimeo.com")
        || image_regex().is_match(url)
}
