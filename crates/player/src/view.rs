use rustflix_core::{ContentType, Episode};
use serde::Serialize;
use uuid::Uuid;

use crate::controller::Mount;
use crate::resolver;
use crate::state::PlaybackPhase;

/// Read-only snapshot the UI shell renders from.
///
/// Season and episode fields are `None` for movies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub mount_id: Uuid,
    pub media_id: String,
    pub content_type: ContentType,
    pub phase: PlaybackPhase,
    pub title: String,
    pub description: String,
    /// No descriptor yet; render the loading placeholder.
    pub is_metadata_loading: bool,
    pub source: Option<String>,
    pub is_paused: bool,
    pub show_overlay: bool,
    pub show_controls: bool,
    pub show_volume_slider: bool,
    pub progress: f64,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub is_video_loading: bool,
    pub video_error: bool,
    pub using_fallback_video: bool,
    pub current_season: Option<u32>,
    pub current_episode: Option<u32>,
    pub current_episode_info: Option<Episode>,
    pub show_episode_list: bool,
    pub seasons: Vec<u32>,
    pub episodes: Vec<Episode>,
}

impl PlayerView {
    pub fn from_mount(mount: &Mount) -> Self {
        let target = mount.target();
        let descriptor = mount.descriptor();
        let state = mount.state();
        let cursor = mount.cursor();

        let (current_season, current_episode, current_episode_info, seasons, episodes) =
            if target.kind.is_tv() {
                let mut seasons = descriptor.map(|d| d.season_numbers()).unwrap_or_default();
                if seasons.is_empty() {
                    seasons.push(cursor.current_season);
                }
                (
                    Some(cursor.current_season),
                    Some(cursor.current_episode),
                    resolver::current_episode(descriptor, cursor),
                    seasons,
                    resolver::season_episodes(descriptor, cursor.current_season).into_owned(),
                )
            } else {
                (None, None, None, Vec::new(), Vec::new())
            };

        Self {
            mount_id: mount.id(),
            media_id: target.id.clone(),
            content_type: target.kind,
            phase: state.phase,
            title: descriptor.map(|d| d.title.clone()).unwrap_or_default(),
            description: descriptor.map(|d| d.description.clone()).unwrap_or_default(),
            is_metadata_loading: descriptor.is_none(),
            source: mount.source().map(str::to_string),
            is_paused: state.is_paused,
            show_overlay: state.show_overlay,
            show_controls: state.show_controls,
            show_volume_slider: state.show_volume_slider,
            progress: state.progress(),
            current_time: state.current_time,
            duration: state.duration,
            volume: state.volume,
            is_muted: state.is_muted,
            is_fullscreen: state.is_fullscreen,
            is_video_loading: state.is_video_loading,
            video_error: state.video_error,
            using_fallback_video: state.using_fallback_video,
            current_season,
            current_episode,
            current_episode_info,
            show_episode_list: cursor.show_episode_list,
            seasons,
            episodes,
        }
    }

    /// Equal apart from the playback clock.
    pub fn same_except_clock(&self, other: &Self) -> bool {
        let strip = |v: &Self| Self {
            progress: 0.0,
            current_time: 0.0,
            ..v.clone()
        };
        strip(self) == strip(other)
    }
}
