//! Generation orchestration
//!
//! The top-level state machine: existing-favicon detection → cache
//! lookup → generation → apply → cache store, with a bounded retry loop
//! and a fixed fallback icon when every attempt fails. Public operations
//! resolve with the artifact (or `None`) and never propagate an error
//! past this boundary.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheInfo, FaviconCache};
use crate::config::{ConfigUpdate, FaviconConfig};
use crate::dom::{IconLink, PageDom};
use crate::errors::FaviconError;
use crate::extract;
use crate::fetch::ImageFetcher;
use crate::models::IconArtifact;
use crate::render;
use crate::signature;
use crate::store::KeyValueStore;
use crate::title;

/// Pause between failed generation attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Title used when the page has none.
const DEFAULT_TITLE: &str = "Website";

/// `rel` values that mark a link element as a favicon.
const ICON_RELS: &[&str] = &[
    "icon",
    "shortcut icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
];

/// `type` values that mark a link element as a favicon.
const ICON_TYPES: &[&str] = &[
    "image/x-icon",
    "image/vnd.microsoft.icon",
    "image/png",
    "image/gif",
    "image/jpeg",
];

/// How a generation pass concluded. Only `Generated` artifacts reflect
/// the page state and are eligible for caching; a `Fallback` is applied
/// to the page but must never be stored.
enum Generation {
    Generated(IconArtifact),
    Fallback(IconArtifact),
    Failed,
}

/// Mutable orchestrator state, guarded by one async mutex so generation
/// is single-flight per instance: concurrent callers queue on the lock
/// and the stragglers resolve from cache instead of racing.
struct GeneratorState {
    config: FaviconConfig,
    initialized: bool,
    page_signature: Option<String>,
}

/// The favicon generator.
///
/// Construct one per page with its collaborators, then drive it through
/// [`init`](Self::init) or [`regenerate`](Self::regenerate).
pub struct FaviconGenerator {
    dom: Arc<dyn PageDom>,
    fetcher: Arc<dyn ImageFetcher>,
    cache: FaviconCache,
    state: Mutex<GeneratorState>,
}

impl FaviconGenerator {
    pub fn new(
        config: FaviconConfig,
        dom: Arc<dyn PageDom>,
        fetcher: Arc<dyn ImageFetcher>,
        store: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        debug!("FaviconGenerator created with config: {:?}", config);
        Self {
            dom,
            fetcher,
            cache: FaviconCache::new(store),
            state: Mutex::new(GeneratorState {
                config,
                initialized: false,
                page_signature: None,
            }),
        }
    }

    /// Run the full check-and-generate pass once. Idempotent: a second
    /// call on an initialized instance returns immediately without
    /// re-deriving or re-caching anything.
    pub async fn init(&self) -> Option<IconArtifact> {
        let mut state = self.state.lock().await;
        if state.initialized {
            debug!("Already initialized, skipping");
            return None;
        }
        self.check_and_generate(&mut state).await
    }

    /// Regenerate with an optional config override merged in first.
    /// Bypasses existing-favicon respect; a `force_regenerate` override
    /// also clears the cache before generating.
    pub async fn regenerate(&self, update: Option<ConfigUpdate>) -> Option<IconArtifact> {
        let mut state = self.state.lock().await;
        if let Some(update) = update {
            state.config = state.config.merged(&update);
        }

        if state.config.force_regenerate {
            self.cache.clear();
        }

        let signature = signature::compute(self.dom.as_ref(), &state.config);
        state.page_signature = Some(signature.clone());

        let artifact = match self.generate_with_retry(&state.config).await {
            Generation::Generated(artifact) => {
                if state.config.enable_caching {
                    self.cache.put(&signature, &artifact);
                }
                Some(artifact)
            }
            Generation::Fallback(artifact) => Some(artifact),
            Generation::Failed => None,
        };
        state.initialized = true;
        artifact
    }

    /// Current configuration snapshot.
    pub async fn get_config(&self) -> FaviconConfig {
        self.state.lock().await.config.clone()
    }

    /// Shallow-merge a partial update into the configuration.
    pub async fn update_config(&self, update: ConfigUpdate) {
        let mut state = self.state.lock().await;
        state.config = state.config.merged(&update);
        debug!("Configuration updated: {:?}", state.config);
    }

    /// Diagnostic view of the cache slot.
    pub async fn get_cache_info(&self) -> CacheInfo {
        let state = self.state.lock().await;
        self.cache.info(state.page_signature.as_deref(), &state.config)
    }

    /// Drop the cache slot and regenerate from scratch.
    pub async fn force_clear_and_regenerate(&self) -> Option<IconArtifact> {
        self.cache.clear();
        self.regenerate(Some(ConfigUpdate {
            force_regenerate: Some(true),
            ..Default::default()
        }))
        .await
    }

    async fn check_and_generate(&self, state: &mut GeneratorState) -> Option<IconArtifact> {
        // Checking: an author-provided favicon wins unless overridden.
        if state.config.respect_existing && !state.config.force_regenerate {
            if let Some(href) = self.detect_existing_favicon(&state.config).await {
                info!("Existing favicon detected, skipping generation: {}", href);
                state.initialized = true;
                return None;
            }
        }

        let sig = signature::compute(self.dom.as_ref(), &state.config);
        debug!("Page signature: {}", sig);
        state.page_signature = Some(sig.clone());

        if state.config.enable_caching && !state.config.force_regenerate {
            if let Some(artifact) = self.cache.get(&sig, &state.config) {
                info!("Using cached favicon");
                if let Err(e) = self.apply(&artifact) {
                    warn!("Failed to apply cached favicon: {}", e);
                } else {
                    state.initialized = true;
                    return Some(artifact);
                }
            }
        }

        let artifact = match self.generate_with_retry(&state.config).await {
            Generation::Generated(artifact) => {
                if state.config.enable_caching {
                    self.cache.put(&sig, &artifact);
                }
                Some(artifact)
            }
            Generation::Fallback(artifact) => Some(artifact),
            Generation::Failed => None,
        };
        state.initialized = true;
        artifact
    }

    /// Scan the document head for a real favicon, optionally probing the
    /// implicit root resource. Self-installed links never count.
    async fn detect_existing_favicon(&self, config: &FaviconConfig) -> Option<String> {
        for link in self.dom.icon_links() {
            if link.auto_generated {
                continue;
            }
            let rel_matches = ICON_RELS.iter().any(|rel| link.rel.eq_ignore_ascii_case(rel));
            let type_matches = link
                .link_type
                .as_deref()
                .map(|t| ICON_TYPES.contains(&t))
                .unwrap_or(false);
            if !rel_matches && !type_matches {
                continue;
            }
            let href = link.href.trim();
            if !href.is_empty() && href != "#" {
                return Some(href.to_string());
            }
        }

        if config.check_implicit_favicon {
            let probe = self.implicit_favicon_url();
            if self.fetcher.resource_exists(&probe).await {
                info!("Found implicit favicon at {}", probe);
                return Some("/favicon.ico".to_string());
            }
        }

        debug!("No existing favicon detected");
        None
    }

    /// Root favicon URL with a cache-busting query so a stale negative
    /// never hides a freshly deployed icon.
    fn implicit_favicon_url(&self) -> String {
        let bust = fastrand::u32(..);
        let path = format!("/favicon.ico?{}", bust);
        match self.dom.url().and_then(|u| Url::parse(&u).ok()) {
            Some(page) => page.join(&path).map(String::from).unwrap_or(path),
            None => path,
        }
    }

    /// Bounded retry loop around a single generation pass. Exhausting
    /// the attempts renders the fixed placeholder fallback; only a
    /// failure to produce even that yields `Failed`.
    async fn generate_with_retry(&self, config: &FaviconConfig) -> Generation {
        let mut attempt = 0;
        loop {
            match self.generate_once(config).await {
                Ok(artifact) => {
                    info!("Favicon generated and applied");
                    return Generation::Generated(artifact);
                }
                Err(e) if attempt < config.retry_attempts => {
                    attempt += 1;
                    warn!(
                        "Generation failed (attempt {}/{}): {}",
                        attempt, config.retry_attempts, e
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    warn!("Generation attempts exhausted: {}", e);
                    return match self.apply_fallback(config) {
                        Some(artifact) => Generation::Fallback(artifact),
                        None => Generation::Failed,
                    };
                }
            }
        }
    }

    /// Title resolution chain: document title, then the first headline,
    /// then meta-carried titles, then the fixed default. Whitespace-only
    /// sources fall through.
    fn page_title(&self) -> String {
        [self.dom.title(), self.dom.headline(), self.dom.meta_title()]
            .into_iter()
            .flatten()
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// One generation pass: extract, derive, render, apply.
    async fn generate_once(&self, config: &FaviconConfig) -> Result<IconArtifact, FaviconError> {
        let dominant = extract::analyze(self.dom.as_ref(), self.fetcher.as_ref(), config).await;
        let initials = title::derive_initials(&self.page_title());
        debug!("Rendering initials {:?} on {}", initials, dominant);

        let artifact = render::render(&initials, &dominant, config)?;
        self.apply(&artifact)?;
        Ok(artifact)
    }

    /// Fixed placeholder icon, applied but deliberately never cached: a
    /// fallback reflects a transient failure, not the page's state.
    fn apply_fallback(&self, config: &FaviconConfig) -> Option<IconArtifact> {
        let initials = title::PLACEHOLDER.to_string();
        match render::render(&initials, &config.fallback_color, config) {
            Ok(artifact) => match self.apply(&artifact) {
                Ok(()) => {
                    info!("Fallback favicon applied");
                    Some(artifact)
                }
                Err(e) => {
                    warn!("Failed to apply fallback favicon: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to render fallback favicon: {}", e);
                None
            }
        }
    }

    /// Install the artifact as the page favicon: replace previously
    /// generated links (manual ones stay) with a fresh `icon` pair.
    fn apply(&self, artifact: &IconArtifact) -> Result<(), FaviconError> {
        self.dom.remove_generated_icon_links()?;

        for rel in ["icon", "shortcut icon"] {
            self.dom.install_icon_link(IconLink {
                rel: rel.to_string(),
                href: artifact.as_data_url().to_string(),
                link_type: Some("image/png".to_string()),
                auto_generated: true,
                manual: false,
            })?;
        }
        Ok(())
    }
}
