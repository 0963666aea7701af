// ABOUTME: Library module for the memoria program.
// ABOUTME: Story block parsing, the looping carousel, the story feed and moderation tools.

pub mod blocks;
pub mod carousel;
pub mod config;
pub mod errors;
pub mod html;
pub mod media;
pub mod moderation;
pub mod resources;
pub mod source;
pub mod story;
pub mod utils;
pub mod watch;

// Reexport common types and functions
pub use blocks::{classify_line, parse_blocks, parse_blocks_with, ContentBlock, LineKind, ParserConfig};
pub use carousel::{logical_index, CarouselConfig, LoopingCarousel, Slide};
pub use config::Config;
pub use errors::{MemoriaError, Result};
pub use html::{generate_story_html, render_blocks, render_carousel, write_html_to_file};
pub use media::MediaEmbed;
pub use moderation::{
    submit_story, ModerationConsole, ModerationStore, StatusCounts, StoryStatus, StorySubmission,
};
pub use resources::{ResourceFile, ResourceKind};
pub use source::{load_feed, HttpStorySource, SeedCatalog, StoryFeed, StorySource};
pub use story::{ApiStory, Story};
pub use watch::{watch_story, WatchConfig};

#[cfg(test)]
mod tests;
