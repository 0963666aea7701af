// ABOUTME: Stylesheet and script resources for rendered pages
// ABOUTME: Handles local and remote CSS/JS files, embedded inline or linked

use crate::errors::{MemoriaError, Result};
use html_escape::encode_double_quoted_attribute;
use log::info;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Css,
    Js,
}

/// A stylesheet or script referenced by a rendered page, local or remote.
#[derive(Debug, Clone)]
pub struct ResourceFile {
    pub path: String,
    pub kind: ResourceKind,
    pub is_remote: bool,
}

impl ResourceFile {
    pub fn new(path: &str, kind: ResourceKind) -> Self {
        let is_remote = path.starts_with("http://") || path.starts_with("https://");
        Self {
            path: path.to_string(),
            kind,
            is_remote,
        }
    }

    pub fn css(path: &str) -> Self {
        Self::new(path, ResourceKind::Css)
    }

    pub fn js(path: &str) -> Self {
        Self::new(path, ResourceKind::Js)
    }

    pub fn content(&self) -> Result<String> {
        if self.is_remote {
            self.fetch_remote_content()
        } else {
            self.read_local_content()
        }
    }

    fn fetch_remote_content(&self) -> Result<String> {
        info!("Fetching remote resource: {}", self.path);

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        let response = client.get(&self.path).send()?;
        if !response.status().is_success() {
            return Err(MemoriaError::InvalidResourcePath(format!(
                "{} returned HTTP {}",
                self.path,
                response.status()
            )));
        }
        Ok(response.text()?)
    }

    fn read_local_content(&self) -> Result<String> {
        info!("Reading local resource: {}", self.path);
        let path = Path::new(&self.path);
        if !path.exists() {
            return Err(MemoriaError::PathNotFoundError(path.to_path_buf()));
        }
        Ok(fs::read_to_string(path)?)
    }

    /// HTML tag for the resource. Remote resources are always linked; local
    /// ones are inlined when `embed` is set.
    pub fn tag(&self, embed: bool) -> Result<String> {
        if self.is_remote || !embed {
            let href = encode_double_quoted_attribute(&self.path);
            return Ok(match self.kind {
                ResourceKind::Css => format!(r#"<link rel="stylesheet" href="{}">"#, href),
                ResourceKind::Js => format!(r#"<script src="{}"></script>"#, href),
            });
        }

        let content = self.content()?;
        Ok(match self.kind {
            ResourceKind::Css => format!("<style>{}</style>", content),
            ResourceKind::Js => format!("<script>{}</script>", content),
        })
    }
}
