// ABOUTME: Main entry point for the memoria program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use memoria::{
    html, load_feed, parse_blocks_with, story, utils, Config, HttpStorySource, LoopingCarousel,
    ResourceFile, SeedCatalog, Slide, Story, StorySource, WatchConfig,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a story file to an HTML page
    Render(RenderArgs),

    /// Print the parsed content blocks of a story file as JSON
    Blocks(BlocksArgs),

    /// Render every story file matching a glob pattern
    RenderAll(RenderAllArgs),

    /// List the story feed, falling back to the bundled stories
    Stories(StoriesArgs),

    /// Render a photo exhibition carousel from a JSON slide list
    Exhibition(ExhibitionArgs),

    /// Watch a story file and re-render it on change
    Preview(PreviewArgs),
}

#[derive(Args)]
struct ResourceArgs {
    /// CSS files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    css: Option<Vec<String>>,

    /// JavaScript files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    js: Option<Vec<String>>,

    /// Mode for CSS/JS: 'embed' to embed content or 'link' to reference
    #[arg(long, default_value = "embed")]
    mode: String,
}

impl ResourceArgs {
    fn css_files(&self, config: &Config) -> Vec<ResourceFile> {
        match &self.css {
            Some(files) => files.iter().map(|p| ResourceFile::css(p)).collect(),
            None => config.default_css.iter().map(|p| ResourceFile::css(p)).collect(),
        }
    }

    fn js_files(&self, config: &Config) -> Vec<ResourceFile> {
        match &self.js {
            Some(files) => files.iter().map(|p| ResourceFile::js(p)).collect(),
            None => config.default_js.iter().map(|p| ResourceFile::js(p)).collect(),
        }
    }

    fn embed(&self, config: &Config) -> bool {
        match self.mode.as_str() {
            "link" => false,
            "embed" => config.embed_resources,
            other => {
                warn!("Unknown resource mode {:?}, embedding", other);
                config.embed_resources
            }
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Path to the story file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to output HTML file
    #[arg(short, long)]
    output: PathBuf,

    /// Image URLs, cover first
    #[arg(long, value_delimiter = ',')]
    images: Option<Vec<String>>,

    #[command(flatten)]
    resources: ResourceArgs,
}

#[derive(Args)]
struct BlocksArgs {
    /// Path to the story file
    #[arg(short, long)]
    input: PathBuf,

    /// Image URLs, cover first
    #[arg(long, value_delimiter = ',')]
    images: Option<Vec<String>>,
}

#[derive(Args)]
struct RenderAllArgs {
    /// Glob pattern selecting story files
    #[arg(short, long)]
    pattern: String,

    /// Directory for the rendered pages
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    resources: ResourceArgs,
}

#[derive(Args)]
struct StoriesArgs {
    /// Story API endpoint; overrides STORY_API_ENDPOINT
    #[arg(long)]
    endpoint: Option<String>,

    /// Only show stories in this category
    #[arg(long)]
    category: Option<String>,

    /// Show the full text of one story instead of the list
    #[arg(long)]
    slug: Option<String>,
}

#[derive(Args)]
struct ExhibitionArgs {
    /// JSON file with a list of {title, imageUrl, description} slides
    #[arg(short, long)]
    input: PathBuf,

    /// Path to output HTML file
    #[arg(short, long)]
    output: PathBuf,

    /// Page title
    #[arg(long, default_value = "Exposición Fotográfica")]
    title: String,

    #[command(flatten)]
    resources: ResourceArgs,
}

#[derive(Args)]
struct PreviewArgs {
    /// Path to the story file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to output HTML file
    #[arg(short, long)]
    output: PathBuf,

    /// Image URLs, cover first
    #[arg(long, value_delimiter = ',')]
    images: Option<Vec<String>>,

    /// Serve the rendered page over HTTP
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[command(flatten)]
    resources: ResourceArgs,
}

fn print_story(entry: &Story, related: &[&Story]) {
    println!("{}", entry.title);
    println!(
        "{} · {} · {} min · {} lecturas\n",
        entry.category,
        entry.published_at,
        entry.read_time_minutes(),
        entry.estimated_views()
    );
    for paragraph in story::split_into_paragraphs(&entry.content) {
        println!("{}\n", paragraph);
    }
    if let Some(media) = &entry.media_url {
        println!("Video: {}\n", media);
    }
    if !related.is_empty() {
        println!("Otras historias:");
        for other in related {
            println!("  {}\t{}", other.slug, other.title);
        }
    }
}

fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Render(args) => {
            let images = args.images.unwrap_or_default();
            let html_content = html::generate_story_html(
                &args.input,
                &images,
                &args.resources.css_files(config),
                &args.resources.js_files(config),
                args.resources.embed(config),
                None,
            )?;
            html::write_html_to_file(&html_content, &args.output)?;
            println!("HTML generated successfully: {:?}", args.output);
        }
        Commands::Blocks(args) => {
            let images = args.images.unwrap_or_default();
            let story = html::read_story_file(&args.input, &images)?;
            let blocks =
                parse_blocks_with(&story.content, &story.images, &config.get_parser_config());
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Commands::RenderAll(args) => {
            utils::ensure_directory_exists(&args.out_dir)?;
            let css = args.resources.css_files(config);
            let js = args.resources.js_files(config);
            let embed = args.resources.embed(config);

            let mut stories = Vec::new();
            for entry in glob::glob(&args.pattern)? {
                let path = entry?;
                stories.push(html::load_story_file(&path, &[])?);
            }
            if stories.is_empty() {
                return Err(memoria::MemoriaError::NoStoriesFoundError(args.pattern).into());
            }

            let stories = story::dedupe_by_slug(stories);
            let parser_config = config.get_parser_config();
            for page in &stories {
                let related = story::related_stories(&stories, &page.slug);
                let html_content = html::render_story_page(
                    page,
                    &page.blocks(&parser_config),
                    &related,
                    &css,
                    &js,
                    embed,
                    None,
                );
                let output = utils::story_page_path(&args.out_dir, &page.slug);
                html::write_html_to_file(&html_content, &output)?;
                info!("Rendered {} -> {:?}", page.slug, output);
            }
            println!("Rendered {} stories into {:?}", stories.len(), args.out_dir);
        }
        Commands::Stories(args) => {
            let mut config = config.clone();
            if args.endpoint.is_some() {
                config.story_api_endpoint = args.endpoint;
            }

            let seed = SeedCatalog::default();
            let remote = HttpStorySource::from_config(&config, seed.clone())?;
            let feed = load_feed(remote.as_ref().map(|s| s as &dyn StorySource), &seed);

            if let Some(message) = &feed.error_message {
                eprintln!("{}", message);
            }

            if let Some(slug) = &args.slug {
                let found = story::find_by_slug(&feed.stories, slug)
                    .ok_or_else(|| memoria::MemoriaError::StoryNotFound(slug.clone()))?;
                print_story(found, &story::related_stories(&feed.stories, slug));
                return Ok(());
            }

            let category = args
                .category
                .unwrap_or_else(|| story::ALL_CATEGORIES.to_string());
            for entry in story::filter_by_category(&feed.stories, &category) {
                println!(
                    "{}\t{}\t{}\t{} min",
                    entry.published_at,
                    entry.category,
                    entry.title,
                    entry.read_time_minutes()
                );
            }
        }
        Commands::Exhibition(args) => {
            let raw = fs::read_to_string(&args.input)
                .with_context(|| format!("Failed to read slides file {:?}", args.input))?;
            let slides: Vec<Slide> = serde_json::from_str(&raw)?;
            let carousel = LoopingCarousel::with_config(slides, config.get_carousel_config());
            let html_content = html::render_exhibition_page(
                &args.title,
                &carousel,
                &args.resources.css_files(config),
                &args.resources.js_files(config),
                args.resources.embed(config),
            );
            html::write_html_to_file(&html_content, &args.output)?;
            println!(
                "Exhibition with {} slides generated: {:?}",
                carousel.slides().len(),
                args.output
            );
        }
        Commands::Preview(args) => {
            let watch_config = WatchConfig {
                story_path: args.input,
                images: args.images.unwrap_or_default(),
                html_output: args.output,
                css_files: args.resources.css_files(config),
                js_files: args.resources.js_files(config),
                embed_resources: args.resources.embed(config),
                serve: args.serve,
                port: args.port,
                ..WatchConfig::default()
            };
            memoria::watch_story(watch_config)?;
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let Some(command) = cli.command else {
        println!("No command specified. Use --help for usage information.");
        return;
    };

    if let Err(e) = run(command, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
