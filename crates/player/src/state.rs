//! Playback state and its pure reducer.
//!
//! `reduce` never touches the surface or the clock. It returns the next
//! state plus a list of [`Effect`]s for the controller to carry out, so
//! every transition can be exercised without a media element.

use rustflix_core::ContentType;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Error,
}

impl PlaybackPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    pub is_paused: bool,
    pub show_overlay: bool,
    pub show_controls: bool,
    pub show_volume_slider: bool,
    /// Last position reported by the surface. Mirrors the surface clock.
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub is_video_loading: bool,
    pub video_error: bool,
    pub using_fallback_video: bool,
    pub current_fallback_video_index: usize,
}

impl PlaybackState {
    pub fn new(initial_volume: f64) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            is_paused: true,
            show_overlay: false,
            show_controls: true,
            show_volume_slider: false,
            current_time: 0.0,
            duration: 0.0,
            volume: initial_volume.clamp(0.0, 1.0),
            is_muted: false,
            is_fullscreen: false,
            is_video_loading: true,
            video_error: false,
            using_fallback_video: false,
            current_fallback_video_index: 0,
        }
    }

    /// Percentage in `[0, 100]`, derived on every read.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 && self.duration.is_finite() {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Position within a show. Unused for movies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCursor {
    pub current_season: u32,
    pub current_episode: u32,
    pub show_episode_list: bool,
}

impl Default for EpisodeCursor {
    fn default() -> Self {
        Self {
            current_season: 1,
            current_episode: 1,
            show_episode_list: false,
        }
    }
}

/// Everything that can move the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A new url was handed to the surface.
    SourceAssigned { fallback: bool, fallback_index: usize },
    LoadedMetadata { duration: f64 },
    Play,
    Playing,
    Pause,
    Waiting,
    TimeUpdate { current_time: f64, duration: f64 },
    Ended,
    Error,
    /// The auto-advancer ran out of episodes and seasons.
    SeriesFinished,
    OverlayTimerFired,
    ControlsTimerFired,
    PointerMoved,
    VolumeSet(f64),
    MuteToggled,
    FullscreenSet(bool),
    VolumeSliderVisible(bool),
}

/// Work the controller must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ScheduleOverlay,
    CancelOverlay,
    ScheduleControlsHide,
    CancelControlsHide,
    /// Point the surface at `pool[index]` and start it from zero.
    LoadFallback { index: usize },
    /// Run the episode advancer for the current cursor.
    AdvanceEpisode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: PlaybackState,
    pub effects: Vec<Effect>,
}

/// Compute the next state for `event`.
///
/// `pool_len` is the fallback pool size, used to wrap the index.
pub fn reduce(
    state: &PlaybackState,
    event: &PlaybackEvent,
    kind: ContentType,
    pool_len: usize,
) -> Reduction {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match *event {
        PlaybackEvent::SourceAssigned {
            fallback,
            fallback_index,
        } => {
            next.phase = PlaybackPhase::Loading;
            next.is_video_loading = true;
            next.show_overlay = false;
            next.current_time = 0.0;
            next.duration = 0.0;
            next.using_fallback_video = fallback;
            if fallback {
                next.current_fallback_video_index = fallback_index;
            } else {
                next.current_fallback_video_index = 0;
                next.video_error = false;
            }
            effects.push(Effect::CancelOverlay);
        }
        PlaybackEvent::LoadedMetadata { duration } => {
            next.duration = sanitize(duration);
            next.is_video_loading = false;
        }
        PlaybackEvent::Play => {
            next.phase = PlaybackPhase::Playing;
            next.is_paused = false;
            next.show_overlay = false;
            effects.push(Effect::CancelOverlay);
            effects.push(Effect::ScheduleControlsHide);
        }
        PlaybackEvent::Playing => {
            next.is_video_loading = false;
            if next.phase == PlaybackPhase::Loading {
                next.phase = PlaybackPhase::Playing;
                next.is_paused = false;
            }
        }
        PlaybackEvent::Pause => {
            // The surface also pauses right before `ended`; keep the Ended phase.
            if next.phase != PlaybackPhase::Ended {
                next.phase = PlaybackPhase::Paused;
            }
            next.is_paused = true;
            next.show_controls = true;
            effects.push(Effect::CancelControlsHide);
            effects.push(Effect::ScheduleOverlay);
        }
        PlaybackEvent::Waiting => {
            next.is_video_loading = true;
        }
        PlaybackEvent::TimeUpdate {
            current_time,
            duration,
        } => {
            next.current_time = sanitize(current_time);
            next.duration = sanitize(duration);
        }
        PlaybackEvent::Ended => {
            if next.using_fallback_video {
                let index = wrap_next(next.current_fallback_video_index, pool_len);
                next.current_fallback_video_index = index;
                next.phase = PlaybackPhase::Ended;
                effects.push(Effect::LoadFallback { index });
            } else if kind.is_tv() {
                next.phase = PlaybackPhase::Ended;
                effects.push(Effect::AdvanceEpisode);
            } else {
                next.phase = PlaybackPhase::Ended;
                next.is_paused = true;
                next.show_overlay = true;
                next.show_controls = true;
                effects.push(Effect::CancelOverlay);
                effects.push(Effect::CancelControlsHide);
            }
        }
        PlaybackEvent::Error => {
            next.phase = PlaybackPhase::Error;
            next.video_error = true;
            let index = if next.using_fallback_video {
                wrap_next(next.current_fallback_video_index, pool_len)
            } else {
                next.current_fallback_video_index
            };
            next.using_fallback_video = true;
            next.current_fallback_video_index = index;
            effects.push(Effect::LoadFallback { index });
        }
        PlaybackEvent::SeriesFinished => {
            next.phase = PlaybackPhase::Ended;
            next.is_paused = true;
            next.show_overlay = true;
            next.show_controls = true;
            effects.push(Effect::CancelOverlay);
            effects.push(Effect::CancelControlsHide);
        }
        PlaybackEvent::OverlayTimerFired => {
            if next.is_paused {
                next.show_overlay = true;
            }
        }
        PlaybackEvent::ControlsTimerFired => {
            if !next.is_paused {
                next.show_controls = false;
            }
        }
        PlaybackEvent::PointerMoved => {
            next.show_controls = true;
            if !next.is_paused {
                effects.push(Effect::ScheduleControlsHide);
            }
        }
        PlaybackEvent::VolumeSet(volume) => {
            let volume = sanitize(volume).clamp(0.0, 1.0);
            if volume > 0.0 {
                next.volume = volume;
                next.is_muted = false;
            } else {
                // Keep the last audible level so unmuting can restore it.
                next.is_muted = true;
            }
        }
        PlaybackEvent::MuteToggled => {
            next.is_muted = !next.is_muted;
        }
        PlaybackEvent::FullscreenSet(on) => {
            next.is_fullscreen = on;
        }
        PlaybackEvent::VolumeSliderVisible(visible) => {
            next.show_volume_slider = visible;
        }
    }

    Reduction {
        state: next,
        effects,
    }
}

fn wrap_next(index: usize, pool_len: usize) -> usize {
    if pool_len == 0 {
        0
    } else {
        (index + 1) % pool_len
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
