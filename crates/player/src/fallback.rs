//! Last-resort sample clips played when a title has no usable source.

use crate::ConfigError;

/// Publicly hosted sample videos, cycled round-robin.
pub const DEFAULT_FALLBACK_POOL: [&str; 4] = [
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4",
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerEscapes.mp4",
];

/// A fixed, ordered, non-empty list of always-playable urls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPool {
    urls: Vec<String>,
}

impl FallbackPool {
    pub fn new<I, T>(urls: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        if urls.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        for url in &urls {
            url::Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(Self { urls })
    }

    /// `pool[index mod len]`.
    pub fn get(&self, index: usize) -> &str {
        &self.urls[index % self.urls.len()]
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

impl Default for FallbackPool {
    fn default() -> Self {
        Self {
            urls: DEFAULT_FALLBACK_POOL.iter().map(|u| u.to_string()).collect(),
        }
    }
}
