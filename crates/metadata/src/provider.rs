use std::path::PathBuf;
use std::sync::Arc;

use rustflix_core::{ContentType, MediaDescriptor};
use tracing::{debug, info, warn};

use crate::catalog::CatalogProvider;
use crate::tmdb::TmdbClient;
use crate::MetadataError;

/// A source of movie and show descriptors.
///
/// `Ok(None)` means the provider does not know the id; callers treat that
/// the same as a fetch that has not resolved yet.
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_media(
        &self,
        id: &str,
        kind: ContentType,
    ) -> Result<Option<MediaDescriptor>, MetadataError>;
}

/// Tries each provider in order; the first hit wins.
///
/// Put locally hosted catalogs before remote ones so their playable
/// sources shadow trailer-only metadata.
#[derive(Clone, Default)]
pub struct ChainProvider {
    providers: Vec<Arc<dyn ContentProvider>>,
}

impl ChainProvider {
    pub fn new(providers: Vec<Arc<dyn ContentProvider>>) -> Self {
        Self { providers }
    }

    pub fn push(&mut self, provider: Arc<dyn ContentProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait::async_trait]
impl ContentProvider for ChainProvider {
    fn name(&self) -> &str {
        "chain"
    }

    async fn fetch_media(
        &self,
        id: &str,
        kind: ContentType,
    ) -> Result<Option<MediaDescriptor>, MetadataError> {
        let mut first_error = None;
        let mut any_answered = false;

        for provider in &self.providers {
            match provider.fetch_media(id, kind).await {
                Ok(Some(descriptor)) => {
                    debug!(provider = provider.name(), media_id = id, %kind, "media resolved");
                    return Ok(Some(descriptor));
                }
                Ok(None) => any_answered = true,
                Err(e) => {
                    warn!(provider = provider.name(), media_id = id, %kind, error = %e, "provider failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if !any_answered => Err(e),
            _ => Ok(None),
        }
    }
}

/// Where descriptors come from, read from `RUSTFLIX_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub catalog_path: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            catalog_path: non_empty_var("RUSTFLIX_CATALOG").map(PathBuf::from),
            tmdb_api_key: non_empty_var("RUSTFLIX_TMDB_API_KEY"),
            tmdb_base_url: non_empty_var("RUSTFLIX_TMDB_BASE_URL"),
        }
    }

    /// Assemble the provider chain: local catalog first, then TMDB.
    pub async fn build(&self) -> Result<ChainProvider, MetadataError> {
        let mut chain = ChainProvider::default();

        if let Some(ref path) = self.catalog_path {
            let catalog = CatalogProvider::load(path).await?;
            info!(path = %path.display(), entries = catalog.len(), "local catalog loaded");
            chain.push(Arc::new(catalog));
        }

        if let Some(ref api_key) = self.tmdb_api_key {
            let client = match self.tmdb_base_url {
                Some(ref base_url) => TmdbClient::with_base_url(api_key.clone(), base_url.clone()),
                None => TmdbClient::new(api_key.clone()),
            };
            chain.push(Arc::new(client));
        }

        if chain.is_empty() {
            warn!("no content providers configured; every title will stay in the loading state");
        }

        Ok(chain)
    }
}

/// Build the provider chain from the environment.
pub async fn from_env() -> Result<ChainProvider, MetadataError> {
    ProviderConfig::from_env().build().await
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
