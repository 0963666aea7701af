use memoria::source::FEED_UNAVAILABLE_MESSAGE;
use memoria::{load_feed, HttpStorySource, MemoriaError, SeedCatalog, StorySource};
use std::thread;
use std::time::Duration;
use tiny_http::{Response, Server, StatusCode};

struct BrokenSource;

impl StorySource for BrokenSource {
    fn list_stories(&self) -> memoria::Result<Vec<memoria::Story>> {
        Err(MemoriaError::StoreError("connection reset".to_string()))
    }
}

/// Serve `body` for a single request and return the endpoint URL.
fn serve_once(body: &'static str, status: u16) -> String {
    let server = Server::http("127.0.0.1:0").expect("Failed to start test server");
    let port = server
        .server_addr()
        .to_ip()
        .expect("Test server should listen on TCP")
        .port();

    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body).with_status_code(StatusCode(status));
            let _ = request.respond(response);
        }
    });

    format!("http://127.0.0.1:{}/stories", port)
}

#[test]
fn test_feed_without_source_uses_seed() {
    let seed = SeedCatalog::default();
    let feed = load_feed(None, &seed);

    assert_eq!(feed.stories.len(), 3);
    assert!(feed.error_message.is_none());
}

#[test]
fn test_feed_falls_back_when_source_fails() {
    let seed = SeedCatalog::default();
    let feed = load_feed(Some(&BrokenSource as &dyn StorySource), &seed);

    assert_eq!(feed.stories, seed.stories().to_vec());
    assert_eq!(feed.error_message.as_deref(), Some(FEED_UNAVAILABLE_MESSAGE));
}

#[test]
fn test_story_by_slug_reports_missing_story() {
    let seed = SeedCatalog::default();

    assert!(seed.story_by_slug("marcavalle-en-el-mapa").is_ok());
    assert!(matches!(
        seed.story_by_slug("no-existe"),
        Err(MemoriaError::StoryNotFound(_))
    ));
}

#[test]
fn test_http_source_reads_remote_payload() {
    let endpoint = serve_once(
        r#"{"posts": [{"title": "Desde el API", "slug": "desde-el-api", "date": "2025-02-02", "content": "<p>Contenido remoto</p>", "images": ["/img/remoto.jpg"], "category": "Cultura"}]}"#,
        200,
    );

    let seed = SeedCatalog::default();
    let source = HttpStorySource::new(&endpoint, Duration::from_secs(5), seed.clone())
        .expect("Failed to build source");
    let feed = load_feed(Some(&source as &dyn StorySource), &seed);

    assert!(feed.error_message.is_none());
    assert_eq!(feed.stories.len(), 4);
    assert_eq!(feed.stories[0].slug, "desde-el-api");
    assert_eq!(feed.stories[0].content, "Contenido remoto");
    assert_eq!(feed.stories[0].image, "/img/remoto.jpg");
}

#[test]
fn test_http_source_failure_falls_back() {
    // Only the first attempt is answered; the retries find nothing listening.
    let endpoint = serve_once("oops", 500);

    let seed = SeedCatalog::default();
    let source = HttpStorySource::new(&endpoint, Duration::from_secs(2), seed.clone())
        .expect("Failed to build source");
    let feed = load_feed(Some(&source as &dyn StorySource), &seed);

    assert_eq!(feed.stories.len(), 3);
    assert!(feed.error_message.is_some());
}
