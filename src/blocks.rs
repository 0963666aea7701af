// ABOUTME: Content block parser for story text
// ABOUTME: Turns loosely marked-up raw text plus an image list into typed render blocks

use crate::config::{INLINE_IMAGE_HEADING, QUOTE_MIN_LENGTH};
use crate::media::MediaEmbed;
use log::debug;
use serde::Serialize;

const HEADING_MARKER: &str = "## ";
const QUOTE_MARK: char = '"';
const ATTRIBUTION_DELIMITER: &str = "\" -";

pub const DEFAULT_INLINE_ALT_PREFIX: &str = "Ilustración para";
pub const DEFAULT_INLINE_CAPTION: &str = "Taller comunitario en La Oroya";
pub const DEFAULT_CLOSING_ALT: &str = "Proyecto comunitario";
pub const DEFAULT_CLOSING_CAPTION: &str = "Mapa colaborativo creado por la comunidad";

/// One renderable unit of a parsed story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    ParagraphGroup {
        paragraphs: Vec<String>,
    },
    Heading {
        text: String,
    },
    Quote {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
    Image {
        url: String,
        alt_text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Embed {
        media: MediaEmbed,
    },
}

/// Tuning for the parser's heuristics and the text attached to auto-placed images.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub quote_min_length: usize,
    pub inline_image_heading: usize,
    pub inline_alt_prefix: String,
    pub inline_caption: Option<String>,
    pub closing_alt: String,
    pub closing_caption: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            quote_min_length: QUOTE_MIN_LENGTH,
            inline_image_heading: INLINE_IMAGE_HEADING,
            inline_alt_prefix: DEFAULT_INLINE_ALT_PREFIX.to_string(),
            inline_caption: Some(DEFAULT_INLINE_CAPTION.to_string()),
            closing_alt: DEFAULT_CLOSING_ALT.to_string(),
            closing_caption: Some(DEFAULT_CLOSING_CAPTION.to_string()),
        }
    }
}

/// How a single trimmed line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Heading(&'a str),
    Quote {
        text: &'a str,
        author: Option<&'a str>,
    },
    Blank,
    Text(&'a str),
}

/// Classify one line. Precedence is heading, quote, blank, then plain text.
pub fn classify_line<'a>(line: &'a str, config: &ParserConfig) -> LineKind<'a> {
    let trimmed = line.trim();

    if let Some(text) = trimmed.strip_prefix(HEADING_MARKER) {
        return LineKind::Heading(text);
    }

    if is_quote_line(trimmed, config.quote_min_length) {
        return split_quote(trimmed);
    }

    if trimmed.is_empty() {
        LineKind::Blank
    } else {
        LineKind::Text(trimmed)
    }
}

fn is_quote_line(trimmed: &str, min_length: usize) -> bool {
    trimmed.starts_with(QUOTE_MARK)
        || (trimmed.contains(ATTRIBUTION_DELIMITER) && trimmed.chars().count() > min_length)
}

fn split_quote(trimmed: &str) -> LineKind<'_> {
    match trimmed.split_once(ATTRIBUTION_DELIMITER) {
        Some((body, attribution)) => {
            let author = attribution.trim();
            LineKind::Quote {
                text: body.strip_prefix(QUOTE_MARK).unwrap_or(body),
                author: (!author.is_empty()).then_some(author),
            }
        }
        None => {
            let body = trimmed.strip_prefix(QUOTE_MARK).unwrap_or(trimmed);
            LineKind::Quote {
                text: body.strip_suffix(QUOTE_MARK).unwrap_or(body),
                author: None,
            }
        }
    }
}

/// Parse with the stock configuration.
pub fn parse_blocks(raw_text: &str, images: &[String]) -> Vec<ContentBlock> {
    parse_blocks_with(raw_text, images, &ParserConfig::default())
}

/// Parse raw story text into render blocks.
///
/// `images[0]` is the cover and never lands in the body. The next image is
/// placed right after the configured heading, and one more unused image (if
/// any) closes the story.
pub fn parse_blocks_with(
    raw_text: &str,
    images: &[String],
    config: &ParserConfig,
) -> Vec<ContentBlock> {
    let mut builder = BlockBuilder::new(images, config);

    for line in raw_text.lines() {
        builder.push_line(line);
    }

    builder.finish()
}

struct BlockBuilder<'a> {
    config: &'a ParserConfig,
    images: &'a [String],
    next_image: usize,
    heading_count: usize,
    pending: Vec<String>,
    blocks: Vec<ContentBlock>,
}

impl<'a> BlockBuilder<'a> {
    fn new(images: &'a [String], config: &'a ParserConfig) -> Self {
        Self {
            config,
            images,
            // index 0 is the cover
            next_image: 1,
            heading_count: 0,
            pending: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str) {
        match classify_line(line, self.config) {
            LineKind::Heading(text) => {
                self.flush();
                self.heading_count += 1;
                self.blocks.push(ContentBlock::Heading {
                    text: text.to_string(),
                });

                if self.heading_count == self.config.inline_image_heading {
                    self.place_inline_image(text);
                }
            }
            LineKind::Quote { text, author } => {
                self.flush();
                self.blocks.push(ContentBlock::Quote {
                    text: text.to_string(),
                    author: author.map(str::to_string),
                });
            }
            LineKind::Blank => self.flush(),
            LineKind::Text(text) => self.pending.push(text.to_string()),
        }
    }

    fn place_inline_image(&mut self, heading: &str) {
        if let Some(url) = self.take_image() {
            debug!("Placing inline image {} after heading {:?}", url, heading);
            self.blocks.push(ContentBlock::Image {
                url,
                alt_text: format!("{} {}", self.config.inline_alt_prefix, heading),
                caption: self.config.inline_caption.clone(),
            });
        }
    }

    fn take_image(&mut self) -> Option<String> {
        let url = self.images.get(self.next_image)?.clone();
        self.next_image += 1;
        Some(url)
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let paragraphs = std::mem::take(&mut self.pending);
            self.blocks.push(ContentBlock::ParagraphGroup { paragraphs });
        }
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush();

        if let Some(url) = self.take_image() {
            debug!("Appending closing image {}", url);
            self.blocks.push(ContentBlock::Image {
                url,
                alt_text: self.config.closing_alt.clone(),
                caption: self.config.closing_caption.clone(),
            });
        }

        self.blocks
    }
}
