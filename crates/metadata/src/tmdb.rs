//! TMDB (The Movie Database) content provider.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs
//!
//! TMDB hosts no playable media, so descriptors built here carry a YouTube
//! trailer at most. Episodes get no `video_url` and the player falls back
//! to the trailer or its sample pool.

use futures::future::join_all;
use rustflix_core::{ContentType, Episode, MediaContent, MediaDescriptor, Season};
use tracing::{debug, warn};

use crate::provider::ContentProvider;
use crate::MetadataError;

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

pub struct TmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Point the client at a proxy or a test server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, MetadataError> {
        let mut all_params = vec![("api_key", self.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound);
        }

        if !resp.status().is_success() {
            return Err(MetadataError::Provider(format!(
                "TMDB returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| MetadataError::Provider(format!("parse JSON: {e}")))
    }

    pub async fn get_movie(&self, id: &str) -> Result<MediaDescriptor, MetadataError> {
        let data = self
            .get_json(&format!("/movie/{id}"), &[("append_to_response", "videos")])
            .await?;
        Ok(parse_movie(id, &data))
    }

    /// Fetch a show and all of its regular seasons concurrently.
    ///
    /// A season that fails to load is dropped from the result rather than
    /// failing the whole show.
    pub async fn get_show(&self, id: &str) -> Result<MediaDescriptor, MetadataError> {
        let data = self
            .get_json(&format!("/tv/{id}"), &[("append_to_response", "videos")])
            .await?;

        let season_numbers: Vec<u32> = data["seasons"]
            .as_array()
            .map(|ss| {
                ss.iter()
                    .filter_map(|s| s["season_number"].as_u64())
                    .filter(|&n| n > 0)
                    .map(|n| n as u32)
                    .collect()
            })
            .unwrap_or_default();

        let fetches = season_numbers
            .iter()
            .map(|&n| self.get_season(id, n));
        let results = join_all(fetches).await;

        let mut seasons = Vec::with_capacity(results.len());
        for (number, result) in season_numbers.iter().zip(results) {
            match result {
                Ok(season) => seasons.push(season),
                Err(e) => {
                    warn!(media_id = id, season = number, error = %e, "TMDB season fetch failed, omitting")
                }
            }
        }

        Ok(parse_show(id, &data, seasons))
    }

    async fn get_season(&self, id: &str, season_number: u32) -> Result<Season, MetadataError> {
        let data = self
            .get_json(&format!("/tv/{id}/season/{season_number}"), &[])
            .await?;
        Ok(parse_season(season_number, &data))
    }
}

#[async_trait::async_trait]
impl ContentProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn fetch_media(
        &self,
        id: &str,
        kind: ContentType,
    ) -> Result<Option<MediaDescriptor>, MetadataError> {
        let result = match kind {
            ContentType::Movie => self.get_movie(id).await,
            ContentType::Tv => self.get_show(id).await,
        };

        match result {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(MetadataError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn parse_movie(id: &str, data: &serde_json::Value) -> MediaDescriptor {
    MediaDescriptor {
        id: id.to_string(),
        title: data["title"].as_str().unwrap_or("Unknown").to_string(),
        description: data["overview"].as_str().unwrap_or("").to_string(),
        thumbnail_url: poster_url(data),
        trailer_url: trailer_url(data),
        content: MediaContent::Movie { video_url: None },
    }
}

fn parse_show(id: &str, data: &serde_json::Value, seasons: Vec<Season>) -> MediaDescriptor {
    MediaDescriptor {
        id: id.to_string(),
        title: data["name"].as_str().unwrap_or("Unknown").to_string(),
        description: data["overview"].as_str().unwrap_or("").to_string(),
        thumbnail_url: poster_url(data),
        trailer_url: trailer_url(data),
        content: MediaContent::Show { seasons },
    }
}

fn parse_season(season_number: u32, data: &serde_json::Value) -> Season {
    let episodes = data["episodes"].as_array().cloned().unwrap_or_default();

    Season {
        season_number,
        episodes: episodes
            .iter()
            .filter_map(|ep| {
                let number = ep["episode_number"].as_u64()? as u32;
                Some(Episode {
                    episode_number: number,
                    name: ep["name"]
                        .as_str()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("Episode {number}")),
                    description: ep["overview"].as_str().unwrap_or("").to_string(),
                    thumbnail_url: ep["still_path"]
                        .as_str()
                        .map(|p| format!("{IMAGE_BASE}/w300{p}")),
                    duration: ep["runtime"].as_u64().map(|m| format!("{m}m")),
                    video_url: None,
                })
            })
            .collect(),
    }
}

fn poster_url(data: &serde_json::Value) -> Option<String> {
    data["poster_path"]
        .as_str()
        .map(|p| format!("{IMAGE_BASE}/w500{p}"))
}

/// First YouTube trailer from `append_to_response=videos`.
fn trailer_url(data: &serde_json::Value) -> Option<String> {
    data["videos"]["results"]
        .as_array()?
        .iter()
        .find(|v| v["site"].as_str() == Some("YouTube") && v["type"].as_str() == Some("Trailer"))
        .and_then(|v| v["key"].as_str())
        .map(|key| format!("https://www.youtube.com/watch?v={key}"))
}
