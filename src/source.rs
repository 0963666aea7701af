// ABOUTME: Story sources for the public site
// ABOUTME: Remote story store over HTTP, the bundled seed catalog and best-effort feed loading

use crate::config::Config;
use crate::errors::{MemoriaError, Result};
use crate::story::{dedupe_by_slug, find_by_slug, normalize_stories, ApiStory, Story};
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

pub const FEED_UNAVAILABLE_MESSAGE: &str = "No pudimos conectar con el blog en este momento. Estamos mostrando las historias destacadas más recientes.";

const FETCH_ATTEMPTS: u32 = 3;
const INITIAL_RETRY_DELAY_MS: u64 = 500;

/// Read side of the remote story store.
pub trait StorySource {
    fn list_stories(&self) -> Result<Vec<Story>>;

    fn story_by_slug(&self, slug: &str) -> Result<Story> {
        let stories = self.list_stories()?;
        find_by_slug(&stories, slug)
            .cloned()
            .ok_or_else(|| MemoriaError::StoryNotFound(slug.to_string()))
    }
}

/// Bundled stories shown when the remote store is absent or unreachable.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    stories: Vec<Story>,
}

impl SeedCatalog {
    pub fn new(posts: &[ApiStory]) -> Self {
        let stories = posts.iter().filter_map(Story::from_api).collect();
        Self {
            stories: dedupe_by_slug(stories),
        }
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }
}

impl Default for SeedCatalog {
    fn default() -> Self {
        Self::new(&seed_posts())
    }
}

impl StorySource for SeedCatalog {
    fn list_stories(&self) -> Result<Vec<Story>> {
        Ok(self.stories.clone())
    }
}

fn seed_post(title: &str, content: &str, image: &str, date: &str, slug: &str, category: &str) -> ApiStory {
    ApiStory {
        title: title.to_string(),
        date: date.to_string(),
        content: content.to_string(),
        images: vec![image.to_string()],
        slug: slug.to_string(),
        category: Some(category.to_string()),
        media_url: None,
    }
}

pub fn seed_posts() -> Vec<ApiStory> {
    vec![
        seed_post(
            "Respirar Futuro en La Oroya",
            "Nuestro proyecto en La Oroya reconstruye el vínculo entre comunidad y territorio. Conversamos con vecinas y vecinos sobre memorias, miedos y esperanzas, y mapeamos caminatas barriales para reconocer puntos críticos y oportunidades.",
            "/assets/blog-1.jpg",
            "2024-11-03",
            "respirar-futuro-en-la-oroya",
            "Comunidad",
        ),
        seed_post(
            "Marcavalle en el Mapa: Cartografías de lo Cotidiano",
            "La sesión de mapeo comunitario en Marcavalle mostró cómo se habita realmente el barrio. Las y los participantes marcaron rutas seguras, zonas de encuentro y espacios que requieren reactivación, integrando saberes locales con información técnica.",
            "/assets/blog-2.jpg",
            "2024-10-20",
            "marcavalle-en-el-mapa",
            "Cartografías",
        ),
        seed_post(
            "Mirar para Transformar: Fotovoz y Teatro Comunitario",
            "El ejercicio de fotovoz invitó a capturar imágenes de injusticias, resiliencias y deseos de cambio. Esas fotografías impulsaron un laboratorio de teatro comunitario donde las historias cobraron vida y abrieron diálogos sobre convivencia y bienestar.",
            "/assets/blog-3.jpg",
            "2024-10-01",
            "mirar-para-transformar",
            "Cultura",
        ),
    ]
}

/// Remote story store reached over HTTP.
pub struct HttpStorySource {
    endpoint: String,
    client: Client,
    seed: SeedCatalog,
}

impl HttpStorySource {
    pub fn new(endpoint: &str, timeout: Duration, seed: SeedCatalog) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            seed,
        })
    }

    /// Build from configuration. Returns `None` when no endpoint is configured.
    pub fn from_config(config: &Config, seed: SeedCatalog) -> Result<Option<Self>> {
        match &config.story_api_endpoint {
            Some(endpoint) => Ok(Some(Self::new(endpoint, config.fetch_timeout(), seed)?)),
            None => Ok(None),
        }
    }

    fn fetch_payload(&self) -> Result<serde_json::Value> {
        info!("Fetching stories from {}", self.endpoint);

        let mut retry_delay = INITIAL_RETRY_DELAY_MS;
        let mut last_error = None;

        for attempt in 1..=FETCH_ATTEMPTS {
            match self
                .client
                .get(&self.endpoint)
                .header(ACCEPT, "application/json")
                .send()
            {
                Ok(response) if response.status().is_success() => {
                    let body = response.text()?;
                    return Ok(serde_json::from_str(&body)?);
                }
                Ok(response) => {
                    last_error = Some(MemoriaError::ValidationError(format!(
                        "HTTP error: {}",
                        response.status()
                    )));
                }
                Err(e) => last_error = Some(MemoriaError::FetchError(e)),
            }

            if attempt < FETCH_ATTEMPTS {
                info!(
                    "Fetch attempt {} failed, retrying in {} ms",
                    attempt, retry_delay
                );
                std::thread::sleep(Duration::from_millis(retry_delay));
                retry_delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            MemoriaError::UnknownError("Unknown error fetching stories".to_string())
        }))
    }
}

impl StorySource for HttpStorySource {
    fn list_stories(&self) -> Result<Vec<Story>> {
        let payload = self.fetch_payload()?;
        Ok(normalize_stories(&payload, self.seed.stories()))
    }
}

/// What the story pages display, plus a notice when the remote store failed.
#[derive(Debug, Clone)]
pub struct StoryFeed {
    pub stories: Vec<Story>,
    pub error_message: Option<String>,
}

/// Load stories, falling back to the seed catalog if the source is missing or fails.
pub fn load_feed(source: Option<&dyn StorySource>, seed: &SeedCatalog) -> StoryFeed {
    let Some(source) = source else {
        return StoryFeed {
            stories: seed.stories().to_vec(),
            error_message: None,
        };
    };

    match source.list_stories() {
        Ok(stories) => StoryFeed {
            stories,
            error_message: None,
        },
        Err(e) => {
            warn!("Story source unavailable, using seed catalog: {}", e);
            StoryFeed {
                stories: seed.stories().to_vec(),
                error_message: Some(FEED_UNAVAILABLE_MESSAGE.to_string()),
            }
        }
    }
}
