//! Movie and show descriptors as handed out by a content provider.
//!
//! Seasons and episodes are addressed by their number, never by their
//! position in the containing `Vec`: catalogs may start numbering at any
//! value, skip numbers, or list entries out of order.

use serde::{Deserialize, Serialize};

use crate::types::ContentType;

/// Metadata for one playable title, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Show-level (or movie-level) trailer, used when an episode has no source.
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(flatten)]
    pub content: MediaContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaContent {
    Movie {
        #[serde(default)]
        video_url: Option<String>,
    },
    Show {
        #[serde(default)]
        seasons: Vec<Season>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// An unnamed episode deserializes as `"Episode {n}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EpisodeRecord")]
pub struct Episode {
    pub episode_number: u32,
    pub name: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    /// Display duration, e.g. `"45m"`.
    pub duration: Option<String>,
    pub video_url: Option<String>,
}

/// Wire form of [`Episode`]; everything but the number is optional.
#[derive(Deserialize)]
struct EpisodeRecord {
    episode_number: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

impl From<EpisodeRecord> for Episode {
    fn from(record: EpisodeRecord) -> Self {
        let name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Episode {}", record.episode_number));
        Self {
            episode_number: record.episode_number,
            name,
            description: record.description,
            thumbnail_url: record.thumbnail_url,
            duration: record.duration,
            video_url: record.video_url,
        }
    }
}

impl MediaDescriptor {
    pub fn movie(
        id: impl Into<String>,
        title: impl Into<String>,
        video_url: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            thumbnail_url: None,
            trailer_url: None,
            content: MediaContent::Movie { video_url },
        }
    }

    pub fn show(id: impl Into<String>, title: impl Into<String>, seasons: Vec<Season>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            thumbnail_url: None,
            trailer_url: None,
            content: MediaContent::Show { seasons },
        }
    }

    pub fn is_tv_show(&self) -> bool {
        matches!(self.content, MediaContent::Show { .. })
    }

    pub fn content_type(&self) -> ContentType {
        match self.content {
            MediaContent::Movie { .. } => ContentType::Movie,
            MediaContent::Show { .. } => ContentType::Tv,
        }
    }

    /// The movie's own source. Always `None` for shows.
    pub fn video_url(&self) -> Option<&str> {
        match &self.content {
            MediaContent::Movie { video_url } => video_url.as_deref(),
            MediaContent::Show { .. } => None,
        }
    }

    /// All seasons in catalog order. Empty for movies.
    pub fn seasons(&self) -> &[Season] {
        match &self.content {
            MediaContent::Movie { .. } => &[],
            MediaContent::Show { seasons } => seasons,
        }
    }

    /// Look up a season by its number.
    pub fn season(&self, season_number: u32) -> Option<&Season> {
        self.seasons()
            .iter()
            .find(|s| s.season_number == season_number)
    }

    /// Season numbers in ascending order, duplicates removed.
    pub fn season_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.seasons().iter().map(|s| s.season_number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

impl Season {
    pub fn new(season_number: u32, episodes: Vec<Episode>) -> Self {
        Self {
            season_number,
            episodes,
        }
    }

    /// Look up an episode by its number.
    pub fn episode(&self, episode_number: u32) -> Option<&Episode> {
        self.episodes
            .iter()
            .find(|e| e.episode_number == episode_number)
    }
}

impl Episode {
    pub fn new(episode_number: u32, video_url: Option<String>) -> Self {
        Self {
            episode_number,
            name: format!("Episode {episode_number}"),
            description: String::new(),
            thumbnail_url: None,
            duration: None,
            video_url,
        }
    }
}
