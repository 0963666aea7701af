// ABOUTME: Configuration module for the memoria application
// ABOUTME: Holds the named layout constants and environment variable handling

use crate::blocks::ParserConfig;
use crate::carousel::CarouselConfig;
use std::env;
use std::time::Duration;

/// Quote lines without a leading quote mark must be longer than this to count as quotes.
pub const QUOTE_MIN_LENGTH: usize = 50;

/// The inline body image is placed after the heading with this ordinal.
pub const INLINE_IMAGE_HEADING: usize = 2;

/// Clone padding on each side of a looping carousel.
pub const CAROUSEL_PADDING: usize = 3;

/// Matches the visual transition duration of the carousel strip.
pub const CAROUSEL_SETTLE_MS: u64 = 1000;

/// Maximum length of a story card excerpt before clipping.
pub const EXCERPT_MAX_LENGTH: usize = 480;

/// Length of the summary stored alongside a new submission.
pub const SUBMISSION_SUMMARY_LENGTH: usize = 200;

/// Cover used when a story has no images of its own.
pub const FALLBACK_IMAGE: &str = "/assets/hero-image.jpg";

const DEFAULT_TIMEOUT_MS: u64 = 10000;
const DEFAULT_PUBLIC_IMAGE_BASE: &str = "/storage/story-images";

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub story_api_endpoint: Option<String>,
    pub fetch_timeout_ms: u64,
    pub embed_resources: bool,
    pub default_css: Option<String>,
    pub default_js: Option<String>,
    pub carousel_settle_ms: u64,
    pub public_image_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            story_api_endpoint: None,
            fetch_timeout_ms: DEFAULT_TIMEOUT_MS,
            embed_resources: true,
            default_css: None,
            default_js: None,
            carousel_settle_ms: CAROUSEL_SETTLE_MS,
            public_image_base: DEFAULT_PUBLIC_IMAGE_BASE.to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let story_api_endpoint = env::var("STORY_API_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let fetch_timeout_ms = env::var("FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let embed_resources = env::var("EMBED_RESOURCES")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);
        let carousel_settle_ms = env::var("CAROUSEL_SETTLE_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(CAROUSEL_SETTLE_MS);
        let public_image_base = env::var("PUBLIC_IMAGE_BASE")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_IMAGE_BASE.to_string());

        Self {
            story_api_endpoint,
            fetch_timeout_ms,
            embed_resources,
            default_css: env::var("DEFAULT_CSS").ok(),
            default_js: env::var("DEFAULT_JS").ok(),
            carousel_settle_ms,
            public_image_base,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Get a parser configuration with the stock layout constants
    pub fn get_parser_config(&self) -> ParserConfig {
        ParserConfig::default()
    }

    /// Get a carousel configuration using the configured settle delay
    pub fn get_carousel_config(&self) -> CarouselConfig {
        CarouselConfig {
            padding: CAROUSEL_PADDING,
            settle_delay: Duration::from_millis(self.carousel_settle_ms),
        }
    }
}
