// ABOUTME: HTML generation module for the memoria application
// ABOUTME: Renders content blocks, story pages and photo carousels to HTML documents

use crate::blocks::{ContentBlock, ParserConfig};
use crate::carousel::LoopingCarousel;
use crate::errors::{MemoriaError, Result};
use crate::media::MediaEmbed;
use crate::moderation::slugify;
use crate::resources::ResourceFile;
use crate::story::{ApiStory, Story};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use log::{info, warn};
use std::fs;
use std::path::Path;

const DEFAULT_TITLE: &str = "Historia";

/// Parse frontmatter in the format: % Title\n% Date\n% Category
///
/// Each line is optional but they must appear in that order. Returns the
/// values found and the remaining body.
fn parse_frontmatter(content: &str) -> (Option<String>, Option<String>, Option<String>, String) {
    let lines: Vec<&str> = content.lines().collect();
    let mut values: Vec<String> = Vec::new();

    while values.len() < 3 {
        match lines.get(values.len()).and_then(|l| l.strip_prefix("% ")) {
            Some(value) => values.push(value.trim().to_string()),
            None => break,
        }
    }

    if values.is_empty() {
        return (None, None, None, content.to_string());
    }

    // Skip optional blank lines after the frontmatter
    let mut start_idx = values.len();
    while start_idx < lines.len() && lines[start_idx].trim().is_empty() {
        start_idx += 1;
    }

    let mut values = values.into_iter();
    (
        values.next(),
        values.next(),
        values.next(),
        lines[start_idx..].join("\n"),
    )
}

/// Read a story file (optional frontmatter, then raw text) into a story record.
pub fn read_story_file(path: &Path, images: &[String]) -> Result<ApiStory> {
    if !path.exists() {
        return Err(MemoriaError::PathNotFoundError(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path)?;
    let (title, date, category, body) = parse_frontmatter(&raw);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let title = title.unwrap_or_else(|| stem.clone());

    // Titles with no ASCII word characters slugify to nothing
    let slug = [title.as_str(), stem.as_str(), DEFAULT_TITLE]
        .iter()
        .map(|candidate| slugify(candidate))
        .find(|slug| slug.chars().any(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_default();

    Ok(ApiStory {
        slug,
        title,
        date: date.unwrap_or_default(),
        content: body,
        images: images.to_vec(),
        category,
        media_url: None,
    })
}

fn render_media(media: &MediaEmbed) -> String {
    if media.is_video() {
        format!(
            "<div class=\"media-embed\"><iframe src=\"{}\" title=\"{}\" allowfullscreen></iframe></div>",
            attr(&media.embed_url()),
            media.player_title()
        )
    } else {
        format!(
            "<div class=\"media-embed\"><img src=\"{}\" alt=\"{}\"></div>",
            attr(&media.embed_url()),
            media.player_title()
        )
    }
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::ParagraphGroup { paragraphs } => {
            let mut html = String::from("<div class=\"prose\">");
            for para in paragraphs {
                html.push_str(&format!("<p>{}</p>", text(para)));
            }
            html.push_str("</div>");
            html
        }
        ContentBlock::Heading { text: heading } => format!("<h2>{}</h2>", text(heading)),
        ContentBlock::Quote { text: quote, author } => {
            let mut html = format!("<blockquote><p>\"{}\"</p>", text(quote));
            if let Some(author) = author {
                html.push_str(&format!("<footer>— {}</footer>", text(author)));
            }
            html.push_str("</blockquote>");
            html
        }
        ContentBlock::Image {
            url,
            alt_text,
            caption,
        } => {
            let mut html = format!(
                "<figure><img src=\"{}\" alt=\"{}\">",
                attr(url),
                attr(alt_text)
            );
            if let Some(caption) = caption {
                html.push_str(&format!("<figcaption>{}</figcaption>", text(caption)));
            }
            html.push_str("</figure>");
            html
        }
        ContentBlock::Embed { media } => render_media(media),
    }
}

/// Render blocks as an HTML fragment, one element per line.
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_resources(html_doc: &mut String, resources: &[ResourceFile], embed: bool) {
    for resource in resources {
        match resource.tag(embed) {
            Ok(tag) => {
                html_doc.push_str(&tag);
                html_doc.push('\n');
            }
            Err(e) => {
                // Keep rendering with the remaining resources
                warn!("Failed to include resource {}: {}", resource.path, e);
            }
        }
    }
}

fn document(
    title: &str,
    body: &str,
    css_files: &[ResourceFile],
    js_files: &[ResourceFile],
    embed_resources: bool,
    reload_script: Option<&str>,
) -> String {
    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html_doc.push_str(&format!("<title>{}</title>\n", text(title)));
    push_resources(&mut html_doc, css_files, embed_resources);
    html_doc.push_str("</head>\n<body>\n");
    html_doc.push_str(body);
    html_doc.push('\n');
    push_resources(&mut html_doc, js_files, embed_resources);
    if let Some(script) = reload_script {
        html_doc.push_str(script);
        html_doc.push('\n');
    }
    html_doc.push_str("</body>\n</html>");
    html_doc
}

/// Cards linking to other stories. Nothing when the list is empty.
fn render_related(related: &[&Story]) -> String {
    if related.is_empty() {
        return String::new();
    }

    let mut html = String::from("\n<aside class=\"related\">\n<h2>Otras historias</h2>\n<ul>\n");
    for story in related {
        html.push_str(&format!(
            "<li><a href=\"{}.html\"><img src=\"{}\" alt=\"{}\"><span>{}</span></a></li>\n",
            attr(&story.slug),
            attr(&story.image),
            attr(&story.title),
            text(&story.title)
        ));
    }
    html.push_str("</ul>\n</aside>");
    html
}

/// Full detail page for one story.
pub fn render_story_page(
    story: &Story,
    blocks: &[ContentBlock],
    related: &[&Story],
    css_files: &[ResourceFile],
    js_files: &[ResourceFile],
    embed_resources: bool,
    reload_script: Option<&str>,
) -> String {
    let mut body = String::from("<article class=\"story\">\n<header>\n");
    body.push_str(&format!(
        "<span class=\"category\">{}</span>\n",
        text(&story.category)
    ));
    body.push_str(&format!("<h1>{}</h1>\n", text(&story.title)));
    if !story.published_at.is_empty() {
        body.push_str(&format!(
            "<time datetime=\"{}\">{}</time>\n",
            attr(&story.published_at),
            text(&story.published_at)
        ));
    }
    body.push_str(&format!(
        "<span class=\"read-time\">{} min</span>\n",
        story.read_time_minutes()
    ));
    body.push_str(&format!(
        "<span class=\"views\">{} lecturas</span>\n",
        story.estimated_views()
    ));
    body.push_str(&format!(
        "<img class=\"cover\" src=\"{}\" alt=\"{}\">\n",
        attr(&story.image),
        attr(&story.title)
    ));
    body.push_str("</header>\n<div class=\"story-body\">\n");
    body.push_str(&render_blocks(blocks));
    body.push_str("\n</div>\n</article>");
    body.push_str(&render_related(related));

    document(
        &story.title,
        &body,
        css_files,
        js_files,
        embed_resources,
        reload_script,
    )
}

/// Read a story file into a display story.
pub fn load_story_file(story_path: &Path, images: &[String]) -> Result<Story> {
    let api_story = read_story_file(story_path, images)?;
    Story::from_api(&api_story).ok_or_else(|| {
        MemoriaError::HtmlError(format!("Story has no readable content: {:?}", story_path))
    })
}

/// Read a story file and render its detail page.
pub fn generate_story_html(
    story_path: &Path,
    images: &[String],
    css_files: &[ResourceFile],
    js_files: &[ResourceFile],
    embed_resources: bool,
    reload_script: Option<&str>,
) -> Result<String> {
    info!("Generating HTML from story: {:?}", story_path);

    let story = load_story_file(story_path, images)?;
    let blocks = story.blocks(&ParserConfig::default());

    Ok(render_story_page(
        &story,
        &blocks,
        &[],
        css_files,
        js_files,
        embed_resources,
        reload_script,
    ))
}

/// Carousel markup: the padded strip, the active slide marked, and dot
/// indicators for the real slides. Empty carousels render nothing.
pub fn render_carousel(carousel: &LoopingCarousel) -> String {
    if carousel.is_empty() {
        return String::new();
    }

    let transition = if carousel.is_animating() {
        " animating"
    } else {
        ""
    };
    let mut html = format!(
        "<div class=\"carousel\">\n<ul class=\"carousel-strip{}\" style=\"transform: translateX(-{:.4}%)\">\n",
        transition,
        carousel.translate_percent()
    );

    for (index, slide) in carousel.extended_slides().enumerate() {
        let class = if index == carousel.current_index() {
            "slide current"
        } else {
            "slide"
        };
        html.push_str(&format!(
            "<li class=\"{}\" data-index=\"{}\"><img src=\"{}\" alt=\"{}\"><h2>{}</h2><p>{}</p></li>\n",
            class,
            index,
            attr(&slide.image_url),
            attr(&slide.title),
            text(&slide.title),
            text(&slide.description)
        ));
    }
    html.push_str("</ul>\n");

    if carousel.is_looping() {
        html.push_str("<div class=\"carousel-dots\">\n");
        let active = carousel.active_logical_index();
        for index in 0..carousel.slides().len() {
            let class = if index == active { "dot active" } else { "dot" };
            html.push_str(&format!(
                "<button class=\"{}\" data-slide=\"{}\" aria-label=\"Go to slide {}\"></button>\n",
                class,
                index,
                index + 1
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>");
    html
}

/// Photo exhibition page wrapping a carousel.
pub fn render_exhibition_page(
    title: &str,
    carousel: &LoopingCarousel,
    css_files: &[ResourceFile],
    js_files: &[ResourceFile],
    embed_resources: bool,
) -> String {
    let body = format!(
        "<section id=\"exposicion\">\n<h1>{}</h1>\n{}\n</section>",
        text(title),
        render_carousel(carousel)
    );
    document(title, &body, css_files, js_files, embed_resources, None)
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(output_path, html_content)?;
    Ok(())
}
