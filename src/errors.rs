// ABOUTME: Error types for the memoria application
// ABOUTME: Provides structured error handling for the feed, moderation and preview layers

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoriaError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Invalid story payload: {0}")]
    PayloadError(#[from] serde_json::Error),

    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),

    #[error("HTML generation error: {0}")]
    HtmlError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Story not found: {0}")]
    StoryNotFound(String),

    #[error("No stories found matching pattern: {0}")]
    NoStoriesFoundError(String),

    #[error("Story store error: {0}")]
    StoreError(String),

    #[error("Image upload failed: {0}")]
    UploadError(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl From<anyhow::Error> for MemoriaError {
    fn from(err: anyhow::Error) -> Self {
        MemoriaError::UnknownError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MemoriaError>;
