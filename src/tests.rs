use super::*;
use crate::blocks::DEFAULT_INLINE_CAPTION;
use crate::carousel::{effective_padding, extended_indices};
use crate::moderation::{
    slugify, InMemoryImageStore, InMemoryModerationStore, ImageUpload, PublishedStories, Session,
    StaticSession, StatusFilter, StoryEdit,
};
use crate::story::{
    categories, create_excerpt, estimate_read_time, estimate_views, normalize_stories,
    related_stories, sanitize_content, split_into_paragraphs,
};
use chrono::{TimeZone, Utc};
use std::time::{Duration, Instant};

fn images(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}

fn slides(n: usize) -> Vec<Slide> {
    (0..n)
        .map(|i| Slide::new(&format!("Slide {}", i), &format!("/img/{}.jpg", i), ""))
        .collect()
}

fn heading_texts(blocks: &[ContentBlock]) -> Vec<&str> {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Heading { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn image_urls(blocks: &[ContentBlock]) -> Vec<&str> {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Image { url, .. } => Some(url.as_str()),
            _ => None,
        })
        .collect()
}

// Parser

#[test]
fn test_plain_lines_form_one_paragraph_group() {
    let blocks = parse_blocks("First line\n  Second line  \nThird line\n", &[]);

    assert_eq!(
        blocks,
        vec![ContentBlock::ParagraphGroup {
            paragraphs: vec![
                "First line".to_string(),
                "Second line".to_string(),
                "Third line".to_string(),
            ]
        }]
    );
}

#[test]
fn test_blank_input_yields_no_blocks() {
    assert!(parse_blocks("", &[]).is_empty());
    assert!(parse_blocks("   \n\n\t\n", &images(&["cover.jpg"])).is_empty());
}

#[test]
fn test_blank_lines_split_paragraph_groups() {
    let blocks = parse_blocks("One\nTwo\n\n\nThree", &[]);

    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[1],
        ContentBlock::ParagraphGroup {
            paragraphs: vec!["Three".to_string()]
        }
    );
}

#[test]
fn test_headings_keep_order() {
    let text = "## Uno\ntexto\n## Dos\n## Tres\nmás texto";
    let blocks = parse_blocks(text, &[]);

    assert_eq!(heading_texts(&blocks), vec!["Uno", "Dos", "Tres"]);
}

#[test]
fn test_inline_image_after_second_heading_and_closing_image() {
    let text = "Intro\n## One\nBody one\n## Two\nBody two";
    let blocks = parse_blocks(text, &images(&["cover.jpg", "a.jpg", "b.jpg"]));

    assert_eq!(blocks.len(), 7);
    assert_eq!(blocks[3], ContentBlock::Heading { text: "Two".to_string() });
    assert_eq!(
        blocks[4],
        ContentBlock::Image {
            url: "a.jpg".to_string(),
            alt_text: "Ilustración para Two".to_string(),
            caption: Some(DEFAULT_INLINE_CAPTION.to_string()),
        }
    );
    assert!(matches!(
        &blocks[6],
        ContentBlock::Image { url, .. } if url == "b.jpg"
    ));
    assert_eq!(image_urls(&blocks), vec!["a.jpg", "b.jpg"]);
}

#[test]
fn test_cover_image_never_placed_in_body() {
    let text = "## One\n## Two\n## Three";
    assert!(image_urls(&parse_blocks(text, &images(&["cover.jpg"]))).is_empty());
}

#[test]
fn test_single_heading_uses_closing_image_only() {
    let blocks = parse_blocks("## Only\nText", &images(&["cover.jpg", "a.jpg", "b.jpg"]));

    assert_eq!(image_urls(&blocks), vec!["a.jpg"]);
    assert!(matches!(blocks.last(), Some(ContentBlock::Image { url, .. }) if url == "a.jpg"));
}

#[test]
fn test_no_images_means_no_image_blocks() {
    let text = "## One\nA\n## Two\nB\n## Three\nC";
    let blocks = parse_blocks(text, &[]);

    assert!(image_urls(&blocks).is_empty());
    assert_eq!(heading_texts(&blocks).len(), 3);
}

#[test]
fn test_quote_with_attribution() {
    let line =
        "\"Hello world, this is a long enough quote to pass the length threshold.\" - Jane";
    let blocks = parse_blocks(line, &[]);

    assert_eq!(
        blocks,
        vec![ContentBlock::Quote {
            text: "Hello world, this is a long enough quote to pass the length threshold."
                .to_string(),
            author: Some("Jane".to_string()),
        }]
    );
}

#[test]
fn test_quote_without_attribution_strips_marks() {
    let blocks = parse_blocks("\"Somos memoria\"", &[]);

    assert_eq!(
        blocks,
        vec![ContentBlock::Quote {
            text: "Somos memoria".to_string(),
            author: None,
        }]
    );
}

#[test]
fn test_empty_attribution_is_absent() {
    let config = ParserConfig::default();
    assert_eq!(
        classify_line("\"Quote.\" -", &config),
        LineKind::Quote {
            text: "Quote.",
            author: None
        }
    );
}

#[test]
fn test_short_dashed_text_is_not_a_quote() {
    let config = ParserConfig::default();
    assert_eq!(
        classify_line("He said \"no\" - twice", &config),
        LineKind::Text("He said \"no\" - twice")
    );
}

#[test]
fn test_long_dashed_text_is_treated_as_quote() {
    let line = "Ella nos dijo \"el río era otro color antes de la fundición\" - Rosa";
    let blocks = parse_blocks(line, &[]);

    assert_eq!(
        blocks,
        vec![ContentBlock::Quote {
            text: "Ella nos dijo \"el río era otro color antes de la fundición".to_string(),
            author: Some("Rosa".to_string()),
        }]
    );
}

#[test]
fn test_quote_flushes_pending_paragraphs() {
    let blocks = parse_blocks("Antes\n\"Una cita\"\nDespués", &[]);

    assert_eq!(blocks.len(), 3);
    assert!(matches!(blocks[0], ContentBlock::ParagraphGroup { .. }));
    assert!(matches!(blocks[1], ContentBlock::Quote { .. }));
    assert!(matches!(blocks[2], ContentBlock::ParagraphGroup { .. }));
}

#[test]
fn test_heading_takes_precedence_over_quote() {
    let config = ParserConfig::default();
    assert_eq!(
        classify_line("  ## \"Título\"  ", &config),
        LineKind::Heading("\"Título\"")
    );
    assert_eq!(classify_line("   ", &config), LineKind::Blank);
    assert_eq!(classify_line("#### Deep", &config), LineKind::Text("#### Deep"));
}

#[test]
fn test_custom_inline_heading_ordinal() {
    let config = ParserConfig {
        inline_image_heading: 1,
        inline_caption: None,
        ..ParserConfig::default()
    };
    let blocks = parse_blocks_with("## First\ntext", &images(&["c.jpg", "a.jpg"]), &config);

    assert_eq!(
        blocks[1],
        ContentBlock::Image {
            url: "a.jpg".to_string(),
            alt_text: "Ilustración para First".to_string(),
            caption: None,
        }
    );
    assert_eq!(image_urls(&blocks).len(), 1);
}

#[test]
fn test_parsing_is_deterministic() {
    let text = "Intro\n## A\n\"Una cita larga que sirve para comprobar la detección\" - Ana\n## B\nFin";
    let imgs = images(&["c.jpg", "1.jpg", "2.jpg", "3.jpg"]);

    assert_eq!(parse_blocks(text, &imgs), parse_blocks(text, &imgs));
}

// Carousel

#[test]
fn test_logical_index_mapping() {
    assert_eq!(logical_index(3, 3, 5), 0);
    assert_eq!(logical_index(2, 3, 5), 4);
    assert_eq!(logical_index(8, 3, 5), 0);
    assert_eq!(logical_index(0, 3, 5), 2);
}

#[test]
fn test_extended_indices_pad_both_ends() {
    assert_eq!(
        extended_indices(5, 3),
        vec![2, 3, 4, 0, 1, 2, 3, 4, 0, 1, 2]
    );
    assert_eq!(extended_indices(2, 3), vec![0, 1, 0, 1, 0, 1]);
    assert_eq!(extended_indices(1, 3), vec![0]);
    assert!(extended_indices(0, 3).is_empty());
    assert_eq!(effective_padding(2, 3), 2);
    assert_eq!(effective_padding(1, 3), 0);
}

#[test]
fn test_empty_carousel_ignores_everything() {
    let mut carousel = LoopingCarousel::new(Vec::new());

    assert!(!carousel.next());
    assert!(!carousel.previous());
    assert!(!carousel.select_slide(0));
    assert!(!carousel.select_dot(0));
    assert!(carousel.active_slide().is_none());
    assert_eq!(render_carousel(&carousel), "");
}

#[test]
fn test_single_slide_does_not_loop() {
    let mut carousel = LoopingCarousel::new(slides(1));

    assert!(!carousel.is_looping());
    assert_eq!(carousel.extended_len(), 1);
    assert!(!carousel.next());
    assert!(!carousel.previous());
    assert_eq!(carousel.active_logical_index(), 0);
    assert!(!render_carousel(&carousel).contains("carousel-dots"));
}

#[test]
fn test_initial_state_shows_first_slide() {
    let carousel = LoopingCarousel::new(slides(5));

    assert_eq!(carousel.current_index(), 3);
    assert_eq!(carousel.active_logical_index(), 0);
    assert_eq!(carousel.extended_len(), 11);
    assert!(!carousel.is_transitioning());
    assert_eq!(
        carousel.extended_slides().next().map(|s| s.title.as_str()),
        Some("Slide 2")
    );
    assert!((carousel.translate_percent() - 300.0 / 11.0).abs() < 1e-9);
    assert_eq!(LoopingCarousel::new(Vec::new()).translate_percent(), 0.0);
}

#[test]
fn test_translate_follows_current_index() {
    let mut carousel = LoopingCarousel::new(slides(5));
    assert!(carousel.next());
    assert!((carousel.translate_percent() - 400.0 / 11.0).abs() < 1e-9);
}

#[test]
fn test_next_while_transitioning_is_dropped() {
    let mut carousel = LoopingCarousel::new(slides(4));

    assert!(carousel.next());
    let index = carousel.current_index();
    assert!(carousel.is_transitioning());
    assert!(!carousel.next());
    assert!(!carousel.previous());
    assert!(!carousel.select_dot(2));
    assert_eq!(carousel.current_index(), index);
}

#[test]
fn test_full_cycle_returns_to_start() {
    for n in 2..=7 {
        let mut carousel = LoopingCarousel::new(slides(n));
        let start = carousel.current_index();

        for _ in 0..n {
            assert!(carousel.next());
            carousel.settle();
        }

        assert_eq!(carousel.active_logical_index(), 0, "n = {}", n);
        assert_eq!(carousel.current_index(), start, "n = {}", n);
    }
}

#[test]
fn test_previous_wraps_through_clone_region() {
    let mut carousel = LoopingCarousel::new(slides(5));

    assert!(carousel.previous());
    assert_eq!(carousel.current_index(), 2);
    let shown = carousel.active_logical_index();
    assert_eq!(shown, 4);

    carousel.settle();
    assert_eq!(carousel.current_index(), 7);
    assert_eq!(carousel.active_logical_index(), shown);
    assert!(!carousel.is_animating());

    assert!(carousel.next());
    assert!(carousel.is_animating());
}

#[test]
fn test_select_slide_into_head_clones_normalizes() {
    let mut carousel = LoopingCarousel::new(slides(5));

    assert!(carousel.select_slide(9));
    let shown = carousel.active_logical_index();
    carousel.settle();

    assert_eq!(carousel.current_index(), 4);
    assert_eq!(carousel.active_logical_index(), shown);
}

#[test]
fn test_select_slide_out_of_range_is_rejected() {
    let mut carousel = LoopingCarousel::new(slides(3));

    assert!(!carousel.select_slide(carousel.extended_len()));
    assert!(!carousel.is_transitioning());
}

#[test]
fn test_select_dot_lands_on_slide() {
    for n in [2, 3, 5, 8] {
        for i in 0..n {
            let mut carousel = LoopingCarousel::new(slides(n));
            assert!(carousel.select_dot(i));
            carousel.settle();
            assert_eq!(carousel.active_logical_index(), i);
        }
    }
}

#[test]
fn test_poll_respects_settle_delay() {
    let mut carousel = LoopingCarousel::new(slides(3));
    assert!(carousel.next());

    let now = Instant::now();
    assert!(!carousel.poll(now));
    assert!(carousel.is_transitioning());

    assert!(carousel.poll(now + Duration::from_millis(1500)));
    assert!(!carousel.is_transitioning());
    assert!(carousel.settle_deadline().is_none());
}

#[test]
fn test_poll_with_zero_delay_settles_immediately() {
    let config = CarouselConfig {
        padding: 3,
        settle_delay: Duration::ZERO,
    };
    let mut carousel = LoopingCarousel::with_config(slides(3), config);

    assert!(carousel.previous());
    assert!(carousel.poll(Instant::now()));
    assert_eq!(carousel.active_logical_index(), 2);
    assert_eq!(carousel.current_index(), 5);
}

#[test]
fn test_set_slides_reinitializes() {
    let mut carousel = LoopingCarousel::new(slides(5));
    assert!(carousel.next());

    carousel.set_slides(slides(2));

    assert!(!carousel.is_transitioning());
    assert_eq!(carousel.padding(), 2);
    assert_eq!(carousel.current_index(), 2);
    assert_eq!(carousel.active_logical_index(), 0);
}

#[test]
fn test_render_carousel_marks_active_dot() {
    let mut carousel = LoopingCarousel::new(slides(3));
    carousel.select_dot(1);
    carousel.settle();

    let html = render_carousel(&carousel);
    assert!(html.contains("<button class=\"dot active\" data-slide=\"1\""));
    assert!(html.contains("<li class=\"slide current\" data-index=\"4\">"));
    assert_eq!(html.matches("<li ").count(), 9);
}

// Media

#[test]
fn test_media_classification() {
    assert_eq!(
        MediaEmbed::classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        Some(MediaEmbed::YouTube {
            video_id: "dQw4w9WgXcQ".to_string()
        })
    );
    assert_eq!(
        MediaEmbed::classify("https://youtu.be/dQw4w9WgXcQ")
            .map(|m| m.embed_url()),
        Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string())
    );
    assert_eq!(
        MediaEmbed::classify("https://vimeo.com/76979871").map(|m| m.embed_url()),
        Some("https://player.vimeo.com/video/76979871".to_string())
    );
    assert!(matches!(
        MediaEmbed::classify("https://cdn.example.com/foto.JPG?w=800"),
        Some(MediaEmbed::Image { .. })
    ));
    assert_eq!(MediaEmbed::classify("https://example.com/page"), None);
    assert_eq!(MediaEmbed::classify(""), None);
}

// Stories

fn api_story(slug: &str, date: &str, content: &str) -> ApiStory {
    ApiStory {
        title: format!("Story {}", slug),
        date: date.to_string(),
        content: content.to_string(),
        images: Vec::new(),
        slug: slug.to_string(),
        category: None,
        media_url: None,
    }
}

#[test]
fn test_sanitize_content() {
    assert_eq!(
        sanitize_content("<p>Hola&nbsp;mundo</p>\n\n   <b>fin</b>"),
        "Hola mundo fin"
    );
}

#[test]
fn test_excerpt_clips_on_word_boundary() {
    let content = "palabra ".repeat(100);
    let excerpt = create_excerpt(&content);

    assert!(excerpt.ends_with("palabra..."));
    assert!(excerpt.chars().count() <= 483);

    assert_eq!(create_excerpt("Corto."), "Corto.");
    assert_eq!(create_excerpt(""), "");
}

#[test]
fn test_story_from_api_defaults() {
    let story = Story::from_api(&api_story("uno", "2024-01-01", "Texto")).unwrap();

    assert_eq!(story.image, config::FALLBACK_IMAGE);
    assert_eq!(story.category, story::DEFAULT_CATEGORY);
    assert!(Story::from_api(&api_story("", "2024-01-01", "Texto")).is_none());
    assert!(Story::from_api(&api_story("dos", "2024-01-01", "<br/>")).is_none());
}

#[test]
fn test_normalize_merges_seed_and_sorts() {
    let seed = SeedCatalog::default();
    let payload = serde_json::json!({
        "data": [
            { "title": "Nueva", "slug": "nueva", "date": "2025-01-01", "content": "Hola" },
            { "title": "Duplicada", "slug": "mirar-para-transformar", "date": "2023-01-01", "content": "Remota" }
        ]
    });

    let stories = normalize_stories(&payload, seed.stories());

    assert_eq!(stories.len(), 4);
    assert_eq!(stories[0].slug, "nueva");
    let duplicate = stories
        .iter()
        .find(|s| s.slug == "mirar-para-transformar")
        .unwrap();
    assert_eq!(duplicate.title, "Duplicada");
    assert_eq!(stories.last().map(|s| s.slug.as_str()), Some("mirar-para-transformar"));
}

#[test]
fn test_normalize_accepts_posts_and_arrays() {
    let posts = serde_json::json!({ "posts": [{ "title": "A", "slug": "a", "content": "x" }] });
    let array = serde_json::json!([{ "title": "B", "slug": "b", "content": "y" }]);
    let other = serde_json::json!({ "items": [] });

    assert_eq!(normalize_stories(&posts, &[]).len(), 1);
    assert_eq!(normalize_stories(&array, &[]).len(), 1);
    assert!(normalize_stories(&other, &[]).is_empty());
}

#[test]
fn test_normalize_keeps_rows_with_null_columns() {
    let payload = serde_json::json!([{
        "title": "Con nulos",
        "slug": "con-nulos",
        "content": "Texto de una historia con columnas vacías.",
        "images": null,
        "category": null,
        "date": null,
        "media_url": null
    }]);

    let stories = normalize_stories(&payload, &[]);
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].image, config::FALLBACK_IMAGE);
    assert_eq!(stories[0].category, story::DEFAULT_CATEGORY);
    assert_eq!(stories[0].published_at, "");
}

#[test]
fn test_normalize_drops_rows_with_null_content() {
    let payload = serde_json::json!([
        {"title": "Vacía", "slug": "vacia", "content": null},
        {"title": "Llena", "slug": "llena", "content": "Algo que contar.", "date": "2024-01-01"}
    ]);

    let stories = normalize_stories(&payload, &[]);
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].slug, "llena");
}

#[test]
fn test_categories_and_related() {
    let seed = SeedCatalog::default();

    assert_eq!(
        categories(seed.stories()),
        vec!["Todas", "Cartografías", "Comunidad", "Cultura"]
    );
    let related = related_stories(seed.stories(), "marcavalle-en-el-mapa");
    assert_eq!(related.len(), 2);
    assert!(related.iter().all(|s| s.slug != "marcavalle-en-el-mapa"));
}

#[test]
fn test_estimates() {
    assert_eq!(estimate_read_time(""), 3);
    assert_eq!(estimate_read_time(&"word ".repeat(900)), 5);
    assert_eq!(estimate_views("a few words"), 120);
    assert_eq!(estimate_views(&"word ".repeat(100)), 240);
}

#[test]
fn test_split_into_paragraphs() {
    assert_eq!(
        split_into_paragraphs("Hola mundo.  Adiós amigo! ¿Qué tal? Él vino."),
        vec!["Hola mundo.", "Adiós amigo! ¿Qué tal?", "Él vino."]
    );
    assert!(split_into_paragraphs("   ").is_empty());
}

#[test]
fn test_story_blocks_append_media_embed() {
    let mut item = api_story("video", "2024-05-05", "Texto de la historia");
    item.media_url = Some("https://youtu.be/dQw4w9WgXcQ".to_string());
    let story = Story::from_api(&item).unwrap();

    let blocks = story.blocks(&ParserConfig::default());
    assert!(matches!(blocks.last(), Some(ContentBlock::Embed { .. })));
}

// Moderation

fn valid_submission() -> StorySubmission {
    StorySubmission {
        title: "Hola Mundo! Día 1".to_string(),
        category: "Comunidad".to_string(),
        custom_category: None,
        content: "Una historia que tiene más de cincuenta caracteres de largo, seguro."
            .to_string(),
        media_link: None,
    }
}

fn admin() -> StaticSession {
    StaticSession(Some(Session {
        user_id: "admin".to_string(),
        is_admin: true,
    }))
}

#[test]
fn test_submission_validation() {
    assert!(valid_submission().validate().is_ok());

    let short_title = StorySubmission {
        title: "Ho".to_string(),
        ..valid_submission()
    };
    assert!(matches!(
        short_title.validate(),
        Err(MemoriaError::ValidationError(_))
    ));

    let other_without_custom = StorySubmission {
        category: "Otra".to_string(),
        custom_category: Some("ab".to_string()),
        ..valid_submission()
    };
    assert!(other_without_custom.validate().is_err());

    let bad_link = StorySubmission {
        media_link: Some("https://example.com/page".to_string()),
        ..valid_submission()
    };
    assert!(bad_link.validate().is_err());

    let video = StorySubmission {
        media_link: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
        ..valid_submission()
    };
    assert!(video.validate().is_ok());
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Hola Mundo! Día 1"), "hola-mundo-da-1");
}

#[test]
fn test_submit_story_inserts_pending_row() {
    let store = InMemoryModerationStore::new();
    let uploads = InMemoryImageStore::new("https://cdn.example.com/story-images/");
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let image = ImageUpload {
        file_name: "foto.png".to_string(),
        bytes: vec![1, 2, 3],
    };

    let record = submit_story(&valid_submission(), Some(&image), &store, &uploads, now).unwrap();

    assert_eq!(record.status, StoryStatus::Pending);
    assert_eq!(
        record.slug,
        format!("hola-mundo-da-1-{}", now.timestamp_millis())
    );
    assert!(record.summary.as_deref().unwrap().ends_with("..."));
    let url = record.image.unwrap();
    assert!(url.starts_with("https://cdn.example.com/story-images/"));
    assert!(url.ends_with(".png"));
    assert_eq!(uploads.len(), 1);
}

#[test]
fn test_invalid_submission_uploads_nothing() {
    let store = InMemoryModerationStore::new();
    let uploads = InMemoryImageStore::new("/img");
    let submission = StorySubmission {
        content: "corta".to_string(),
        ..valid_submission()
    };
    let image = ImageUpload {
        file_name: "foto.png".to_string(),
        bytes: vec![1],
    };

    assert!(submit_story(&submission, Some(&image), &store, &uploads, Utc::now()).is_err());
    assert!(uploads.is_empty());
    assert!(store.list(StatusFilter::All).unwrap().is_empty());
}

#[test]
fn test_console_requires_admin() {
    let store = InMemoryModerationStore::new();
    let anonymous = StaticSession(None);
    let visitor = StaticSession(Some(Session {
        user_id: "visitor".to_string(),
        is_admin: false,
    }));

    for sessions in [&anonymous, &visitor] {
        let console = ModerationConsole::new(&store, sessions);
        assert!(matches!(
            console.counts(),
            Err(MemoriaError::Unauthorized(_))
        ));
    }
}

#[test]
fn test_console_status_changes_and_counts() {
    let store = InMemoryModerationStore::new();
    let uploads = InMemoryImageStore::new("/img");
    let sessions = admin();
    let console = ModerationConsole::new(&store, &sessions);

    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut ids = Vec::new();
    for day in 0..4 {
        let submission = StorySubmission {
            title: format!("Historia número {}", day),
            ..valid_submission()
        };
        let now = base + chrono::Duration::days(day);
        ids.push(submit_story(&submission, None, &store, &uploads, now).unwrap().id);
    }

    console.set_status(&ids[0], StoryStatus::Approved).unwrap();
    console.set_status(&ids[1], StoryStatus::Rejected).unwrap();
    console.set_status(&ids[2], StoryStatus::Hidden).unwrap();

    assert_eq!(
        console.counts().unwrap(),
        StatusCounts {
            total: 4,
            pending: 1,
            approved: 1,
            rejected: 1,
            hidden: 1,
        }
    );

    let approved = console
        .stories(StatusFilter::Only(StoryStatus::Approved), "")
        .unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(console.stories(StatusFilter::All, "NÚMERO 3").unwrap().len(), 1);

    let edited = console
        .save_edit(
            &ids[0],
            &StoryEdit {
                title: Some("Título editado".to_string()),
                ..StoryEdit::default()
            },
        )
        .unwrap();
    assert_eq!(edited.title, "Título editado");
    assert_eq!(edited.category, "Comunidad");

    let published = PublishedStories::new(&store).list_stories().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].title, "Título editado");
}

#[test]
fn test_status_parsing() {
    assert_eq!("".parse::<StoryStatus>().unwrap(), StoryStatus::Pending);
    assert_eq!("Approved".parse::<StoryStatus>().unwrap(), StoryStatus::Approved);
    assert!("archived".parse::<StoryStatus>().is_err());
    assert_eq!(StoryStatus::Hidden.label(), "Oculta");
}

// HTML

#[test]
fn test_render_blocks_escapes_text() {
    let blocks = vec![
        ContentBlock::Heading {
            text: "<script>alert(1)</script>".to_string(),
        },
        ContentBlock::Quote {
            text: "Somos memoria".to_string(),
            author: Some("Ana & Luis".to_string()),
        },
    ];

    let html = render_blocks(&blocks);
    assert!(html.contains("<h2>&lt;script&gt;alert(1)&lt;/script&gt;</h2>"));
    assert!(html.contains("<footer>— Ana &amp; Luis</footer>"));
}

#[test]
fn test_resource_file_remote_tags() {
    let css = ResourceFile::css("https://example.com/style.css");
    assert!(css.is_remote);
    assert_eq!(
        css.tag(true).unwrap(),
        r#"<link rel="stylesheet" href="https://example.com/style.css">"#
    );

    let js = ResourceFile::js("https://example.com/script.js");
    assert_eq!(
        js.tag(true).unwrap(),
        r#"<script src="https://example.com/script.js"></script>"#
    );
}

#[test]
fn test_linked_resource_path_is_escaped() {
    let css = ResourceFile::css("https://example.com/theme.css?v=1&dark=\"yes\"");
    assert_eq!(
        css.tag(false).unwrap(),
        r#"<link rel="stylesheet" href="https://example.com/theme.css?v=1&amp;dark=&quot;yes&quot;">"#
    );

    let js = ResourceFile::js("scripts/a<b>.js");
    assert_eq!(
        js.tag(false).unwrap(),
        r#"<script src="scripts/a&lt;b&gt;.js"></script>"#
    );
}

#[test]
fn test_story_page_lists_related_stories_and_views() {
    let seed = SeedCatalog::default();
    let story = &seed.stories()[0];
    let related = related_stories(seed.stories(), &story.slug);
    let blocks = story.blocks(&ParserConfig::default());

    let page = html::render_story_page(story, &blocks, &related, &[], &[], true, None);
    assert!(page.contains(&format!(
        "<span class=\"views\">{} lecturas</span>",
        story.estimated_views()
    )));
    assert!(page.contains("<aside class=\"related\">"));
    assert!(page.contains("<a href=\"marcavalle-en-el-mapa.html\">"));
    assert!(!page.contains(&format!("<a href=\"{}.html\">", story.slug)));

    let alone = html::render_story_page(story, &blocks, &[], &[], &[], true, None);
    assert!(!alone.contains("<aside"));
}
