//! Locally hosted titles, loaded from a JSON array of descriptors.

use std::collections::HashMap;
use std::path::Path;

use rustflix_core::{ContentType, MediaDescriptor};
use tracing::debug;

use crate::provider::ContentProvider;
use crate::MetadataError;

pub struct CatalogProvider {
    entries: HashMap<(ContentType, String), MediaDescriptor>,
}

impl CatalogProvider {
    /// Later entries replace earlier ones with the same kind and id.
    pub fn from_descriptors(descriptors: Vec<MediaDescriptor>) -> Self {
        let entries = descriptors
            .into_iter()
            .map(|d| ((d.content_type(), d.id.clone()), d))
            .collect();
        Self { entries }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let descriptors: Vec<MediaDescriptor> = serde_json::from_str(&raw)
            .map_err(|e| MetadataError::Catalog(format!("parse {}: {e}", path.display())))?;
        Ok(Self::from_descriptors(descriptors))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl ContentProvider for CatalogProvider {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch_media(
        &self,
        id: &str,
        kind: ContentType,
    ) -> Result<Option<MediaDescriptor>, MetadataError> {
        let found = self.entries.get(&(kind, id.to_string())).cloned();
        debug!(media_id = id, %kind, hit = found.is_some(), "catalog lookup");
        Ok(found)
    }
}
