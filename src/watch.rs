// ABOUTME: Preview mode for story files
// ABOUTME: Watches a story file, re-renders its page on change and optionally serves it over HTTP

use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;
use tiny_http::{Header, Response, Server, StatusCode};

use crate::errors::{MemoriaError, Result};
use crate::html;
use crate::resources::ResourceFile;
use crate::utils;

const VERSION_PATH: &str = "/__version";

/// Polls the preview server and reloads the page when a new render lands.
const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var seen = null;
  setInterval(function () {
    fetch("/__version", { cache: "no-store" })
      .then(function (r) { return r.text(); })
      .then(function (v) {
        if (seen !== null && v !== seen) { location.reload(); }
        seen = v;
      })
      .catch(function () {});
  }, 1000);
})();
</script>"#;

/// Configuration for preview mode
pub struct WatchConfig {
    /// Story file to watch
    pub story_path: PathBuf,

    /// Image URLs for the story, cover first
    pub images: Vec<String>,

    /// Output HTML file path
    pub html_output: PathBuf,

    pub css_files: Vec<ResourceFile>,
    pub js_files: Vec<ResourceFile>,
    pub embed_resources: bool,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,

    /// Whether to serve the output directory over HTTP
    pub serve: bool,

    pub port: u16,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            story_path: PathBuf::new(),
            images: Vec::new(),
            html_output: PathBuf::new(),
            css_files: Vec::new(),
            js_files: Vec::new(),
            embed_resources: true,
            debounce_ms: 500,
            serve: false,
            port: 8080,
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Resolve a request path inside the served directory. Paths that try to
/// climb out of it resolve to nothing.
fn resolve_request_path(root: &Path, index_file: &str, url_path: &str) -> Option<PathBuf> {
    let clean_path = url_path.split('?').next().unwrap_or("").trim_start_matches('/');
    if clean_path.is_empty() {
        return Some(root.join(index_file));
    }
    if clean_path.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(root.join(clean_path))
}

/// Start a simple HTTP server for the rendered page and its neighbours
fn start_server(html_path: PathBuf, port: u16, version: Arc<AtomicU64>) -> Result<()> {
    let server = Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| MemoriaError::WatchError(format!("Failed to start HTTP server: {}", e)))?;

    let html_dir = html_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let html_file_name = html_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    thread::spawn(move || {
        info!("Preview server listening on http://localhost:{}", port);

        for request in server.incoming_requests() {
            let url_path = request.url().to_string();

            if url_path == VERSION_PATH {
                let response = Response::from_string(version.load(Ordering::SeqCst).to_string());
                if let Err(e) = request.respond(response) {
                    error!("Failed to send response: {}", e);
                }
                continue;
            }

            let file_path = match resolve_request_path(&html_dir, &html_file_name, &url_path) {
                Some(path) if path.is_file() => path,
                _ => {
                    let response =
                        Response::from_string("404 Not Found").with_status_code(StatusCode(404));
                    let _ = request.respond(response);
                    continue;
                }
            };

            debug!("Request for {:?} -> {:?}", url_path, file_path);

            match fs::read(&file_path) {
                Ok(content) => {
                    let mut response = Response::from_data(content);
                    if let Ok(header) =
                        Header::from_bytes("Content-Type", content_type(&file_path))
                    {
                        response = response.with_header(header);
                    }
                    if let Err(e) = request.respond(response) {
                        error!("Failed to send response: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to read file {:?}: {}", file_path, e);
                    let response = Response::from_string(format!("Failed to read file: {}", e))
                        .with_status_code(StatusCode(500));
                    let _ = request.respond(response);
                }
            }
        }
    });

    Ok(())
}

/// Watch a story file and re-render its page whenever it or a local resource changes
pub fn watch_story(config: WatchConfig) -> Result<()> {
    utils::validate_file_exists(&config.story_path)?;
    utils::ensure_parent_directory_exists(&config.html_output)?;

    let version = Arc::new(AtomicU64::new(0));

    regenerate_output(&config)?;

    if config.serve {
        start_server(config.html_output.clone(), config.port, version.clone())?;
    }

    let (tx, rx) = mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), None, tx)
        .map_err(|e| MemoriaError::WatchError(format!("Failed to create file watcher: {}", e)))?;

    let watch_path = match config.story_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let abs_watch_path = if watch_path.is_absolute() {
        watch_path.to_path_buf()
    } else {
        utils::get_absolute_path(watch_path)?
    };

    debouncer
        .watcher()
        .watch(&abs_watch_path, RecursiveMode::Recursive)
        .map_err(|e| {
            MemoriaError::WatchError(format!(
                "Failed to start watching {:?}: {}",
                abs_watch_path, e
            ))
        })?;

    info!("Watching for changes in {:?}", abs_watch_path);

    let mut last_processed = Instant::now();

    for result in rx {
        match result {
            Ok(events) => {
                let relevant_changes = events
                    .iter()
                    .any(|event| event.paths.iter().any(|path| is_relevant_path(path, &config)));

                let now = Instant::now();
                if relevant_changes
                    && now.duration_since(last_processed)
                        > Duration::from_millis(config.debounce_ms)
                {
                    match regenerate_output(&config) {
                        Ok(()) => {
                            version.fetch_add(1, Ordering::SeqCst);
                            info!("Regenerated {:?}", config.html_output);
                            last_processed = now;
                        }
                        Err(e) => error!("Failed to regenerate story page: {}", e),
                    }
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// The story file itself and any local CSS/JS it embeds are relevant.
pub fn is_relevant_path(path: &Path, config: &WatchConfig) -> bool {
    let path_abs = match utils::get_absolute_path(path) {
        Ok(p) => p,
        Err(_) => return false,
    };

    let story_abs =
        utils::get_absolute_path(&config.story_path).unwrap_or_else(|_| config.story_path.clone());
    if path_abs == story_abs || path == config.story_path {
        return true;
    }

    config
        .css_files
        .iter()
        .chain(config.js_files.iter())
        .filter(|resource| !resource.is_remote)
        .any(|resource| {
            utils::get_absolute_path(Path::new(&resource.path))
                .map(|p| p == path_abs)
                .unwrap_or(false)
        })
}

fn regenerate_output(config: &WatchConfig) -> Result<()> {
    let reload = config.serve.then_some(RELOAD_SCRIPT);
    let html_content = html::generate_story_html(
        &config.story_path,
        &config.images,
        &config.css_files,
        &config.js_files,
        config.embed_resources,
        reload,
    )?;
    html::write_html_to_file(&html_content, &config.html_output)
}
