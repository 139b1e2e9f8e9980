//! Single-session playback controller.
//!
//! The controller owns one [`PlaybackSurface`] and at most one [`Mount`]: the
//! state for the title currently on screen. Remounting (new media id or
//! content type) discards the old mount wholesale, including its pending
//! timers and its event subscription. Nothing here returns an error to the
//! shell; surface failures are logged and playback degrades to the
//! fallback pool instead.

use rustflix_core::{MediaDescriptor, MediaRef};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advance::{self, Advance};
use crate::config::PlayerConfig;
use crate::resolver::{self, Source};
use crate::state::{self, Effect, EpisodeCursor, PlaybackEvent, PlaybackPhase, PlaybackState, Reduction};
use crate::surface::{EventSink, PlaybackSurface, SurfaceEvent, SurfaceSignal};
use crate::timers::{DeferredTimers, TimerKind};
use crate::view::PlayerView;
use crate::SurfaceError;

/// Commands the UI shell may issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    PlayPause,
    SkipForward,
    SkipBackward,
    SetVolume { volume: f64 },
    ToggleMute,
    ToggleFullscreen,
    SeekToPercent { percent: f64 },
    ToggleEpisodeList,
    SelectEpisode { episode: u32 },
    SelectSeason { season: u32 },
    PointerMoved,
    SetVolumeSliderVisible { visible: bool },
}

/// Everything that lives exactly as long as one (media id, content type).
#[derive(Debug)]
pub struct Mount {
    id: Uuid,
    target: MediaRef,
    descriptor: Option<MediaDescriptor>,
    state: PlaybackState,
    cursor: EpisodeCursor,
    timers: DeferredTimers,
    source: Option<String>,
    /// Generation of `source`; surface events from earlier loads are dropped.
    load: u64,
}

impl Mount {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &MediaRef {
        &self.target
    }

    pub fn descriptor(&self) -> Option<&MediaDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn cursor(&self) -> &EpisodeCursor {
        &self.cursor
    }

    pub fn timers(&self) -> &DeferredTimers {
        &self.timers
    }

    /// The url most recently handed to the surface.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

pub struct PlaybackController<S> {
    surface: S,
    config: PlayerConfig,
    events_tx: mpsc::UnboundedSender<SurfaceSignal>,
    mount: Option<Mount>,
}

impl<S: PlaybackSurface> PlaybackController<S> {
    /// Returns the controller and the receiving end of its surface events.
    /// Whoever runs the event loop feeds those back through
    /// [`Self::handle_surface_event`].
    pub fn new(surface: S, config: PlayerConfig) -> (Self, mpsc::UnboundedReceiver<SurfaceSignal>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller = Self {
            surface,
            config,
            events_tx,
            mount: None,
        };
        (controller, events_rx)
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(mut self) -> S {
        self.teardown();
        self.surface
    }

    pub fn mount_ref(&self) -> Option<&Mount> {
        self.mount.as_ref()
    }

    pub fn mount_id(&self) -> Option<Uuid> {
        self.mount.as_ref().map(|m| m.id)
    }

    pub fn state(&self) -> Option<&PlaybackState> {
        self.mount.as_ref().map(|m| &m.state)
    }

    pub fn cursor(&self) -> Option<&EpisodeCursor> {
        self.mount.as_ref().map(|m| &m.cursor)
    }

    pub fn view(&self) -> Option<PlayerView> {
        self.mount.as_ref().map(PlayerView::from_mount)
    }

    /// Start a fresh session for `target`, tearing down any previous one.
    ///
    /// With `descriptor == None` the player stays in its loading state until
    /// [`Self::descriptor_loaded`] is called for the returned mount id.
    pub fn mount(&mut self, target: MediaRef, descriptor: Option<MediaDescriptor>) -> Uuid {
        self.teardown();

        let id = Uuid::new_v4();
        info!(mount_id = %id, media = %target, "mounting player");

        self.surface.attach(EventSink::new(id, 0, self.events_tx.clone()));
        let state = PlaybackState::new(self.config.initial_volume);
        check("set_volume", self.surface.set_volume(state.volume));
        check("set_muted", self.surface.set_muted(state.is_muted));

        let has_descriptor = descriptor.is_some();
        self.mount = Some(Mount {
            id,
            target,
            descriptor,
            state,
            cursor: EpisodeCursor::default(),
            timers: DeferredTimers::new(self.config.overlay_delay, self.config.controls_hide_delay),
            source: None,
            load: 0,
        });

        if has_descriptor {
            self.load_current_source();
        }
        id
    }

    /// Discard the current mount: timers cleared, surface detached and
    /// paused. Returns the discarded mount.
    pub fn teardown(&mut self) -> Option<Mount> {
        let mut mount = self.mount.take()?;
        mount.timers.clear();
        self.surface.detach();
        check("pause", self.surface.pause());
        info!(mount_id = %mount.id, media = %mount.target, "player torn down");
        Some(mount)
    }

    /// Deliver the fetched descriptor. Ignored if `mount_id` is stale.
    pub fn descriptor_loaded(&mut self, mount_id: Uuid, descriptor: MediaDescriptor) -> bool {
        let Some(mount) = self.mount.as_mut().filter(|m| m.id == mount_id) else {
            debug!(%mount_id, "descriptor arrived for a discarded mount, ignoring");
            return false;
        };
        if descriptor.content_type() != mount.target.kind {
            warn!(
                mount_id = %mount.id,
                media = %mount.target,
                got = %descriptor.content_type(),
                "descriptor kind does not match requested content type"
            );
        }
        debug!(mount_id = %mount.id, title = %descriptor.title, "descriptor loaded");
        mount.descriptor = Some(descriptor);
        self.load_current_source();
        true
    }

    pub fn handle_surface_event(&mut self, signal: SurfaceSignal) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        if signal.mount_id != mount.id {
            debug!(stale = %signal.mount_id, current = %mount.id, event = ?signal.event, "dropping stale surface event");
            return;
        }
        if signal.load != mount.load {
            debug!(
                mount_id = %mount.id,
                stale_load = signal.load,
                load = mount.load,
                event = ?signal.event,
                "dropping event from a replaced source"
            );
            return;
        }

        let event = match signal.event {
            SurfaceEvent::TimeUpdate => PlaybackEvent::TimeUpdate {
                current_time: self.surface.current_time(),
                duration: self.surface.duration(),
            },
            SurfaceEvent::LoadedMetadata => PlaybackEvent::LoadedMetadata {
                duration: self.surface.duration(),
            },
            SurfaceEvent::Pause => PlaybackEvent::Pause,
            SurfaceEvent::Play => PlaybackEvent::Play,
            SurfaceEvent::Playing => PlaybackEvent::Playing,
            SurfaceEvent::Waiting => PlaybackEvent::Waiting,
            SurfaceEvent::Ended => PlaybackEvent::Ended,
            SurfaceEvent::Error(reason) => {
                warn!(
                    mount_id = %mount.id,
                    url = mount.source.as_deref().unwrap_or(""),
                    fallback = mount.state.using_fallback_video,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "source failed to play"
                );
                PlaybackEvent::Error
            }
        };
        self.dispatch(event);
    }

    /// Earliest pending timer deadline of the current mount.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.mount.as_ref().and_then(|m| m.timers.next_deadline())
    }

    /// Run every timer due at `now`.
    pub fn fire_due_timers(&mut self, now: Instant) {
        let due = match self.mount.as_mut() {
            Some(mount) => mount.timers.take_due(now),
            None => return,
        };
        for kind in due {
            self.dispatch(match kind {
                TimerKind::OverlayReveal => PlaybackEvent::OverlayTimerFired,
                TimerKind::ControlsHide => PlaybackEvent::ControlsTimerFired,
            });
        }
    }

    pub fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::PlayPause => self.play_pause(),
            Intent::SkipForward => self.skip_forward(),
            Intent::SkipBackward => self.skip_backward(),
            Intent::SetVolume { volume } => self.set_volume(volume),
            Intent::ToggleMute => self.toggle_mute(),
            Intent::ToggleFullscreen => self.toggle_fullscreen(),
            Intent::SeekToPercent { percent } => self.seek_to_percent(percent),
            Intent::ToggleEpisodeList => self.toggle_episode_list(),
            Intent::SelectEpisode { episode } => {
                self.select_episode(episode);
            }
            Intent::SelectSeason { season } => {
                self.select_season(season);
            }
            Intent::PointerMoved => self.pointer_moved(),
            Intent::SetVolumeSliderVisible { visible } => self.set_volume_slider_visible(visible),
        }
    }

    pub fn play_pause(&mut self) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        if self.surface.is_paused() {
            // Replay from the start only if nobody moved the clock off the end.
            let duration = self.surface.duration();
            if mount.state.phase == PlaybackPhase::Ended
                && duration > 0.0
                && self.surface.current_time() >= duration
            {
                check("seek", self.surface.seek(0.0));
            }
            check("play", self.surface.play());
        } else {
            check("pause", self.surface.pause());
        }
    }

    pub fn skip_forward(&mut self) {
        self.skip_by(self.config.skip_step_secs);
    }

    pub fn skip_backward(&mut self) {
        self.skip_by(-self.config.skip_step_secs);
    }

    /// Move the clock by `delta_secs`, clamped to the clip.
    pub fn skip_by(&mut self, delta_secs: f64) {
        if self.mount.is_none() {
            return;
        }
        let mut target = (self.surface.current_time() + delta_secs).max(0.0);
        let duration = self.surface.duration();
        if duration.is_finite() && duration > 0.0 {
            target = target.min(duration);
        }
        check("seek", self.surface.seek(target));
        self.sync_clock();
    }

    pub fn seek_to_percent(&mut self, percent: f64) {
        if self.mount.is_none() || !percent.is_finite() {
            return;
        }
        let duration = self.surface.duration();
        if !(duration.is_finite() && duration > 0.0) {
            debug!("seek ignored, duration unknown");
            return;
        }
        check("seek", self.surface.seek(duration * percent.clamp(0.0, 100.0) / 100.0));
        self.sync_clock();
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.dispatch(PlaybackEvent::VolumeSet(volume));
        self.sync_audio();
    }

    pub fn toggle_mute(&mut self) {
        self.dispatch(PlaybackEvent::MuteToggled);
        self.sync_audio();
    }

    pub fn toggle_fullscreen(&mut self) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        let target = !mount.state.is_fullscreen;
        match self.surface.set_fullscreen(target) {
            Ok(()) => self.dispatch(PlaybackEvent::FullscreenSet(target)),
            Err(e) => warn!(error = %e, fullscreen = target, "fullscreen request failed"),
        }
    }

    /// Open or close the episode list. Opening it pauses playback.
    pub fn toggle_episode_list(&mut self) {
        let Some(mount) = self.mount.as_mut().filter(|m| m.target.kind.is_tv()) else {
            return;
        };
        mount.cursor.show_episode_list = !mount.cursor.show_episode_list;
        if mount.cursor.show_episode_list {
            check("pause", self.surface.pause());
        }
    }

    /// Jump to episode `episode` of the current season and play it.
    ///
    /// Unknown numbers are accepted and play whatever the resolver falls
    /// back to, unless strict selection is configured.
    pub fn select_episode(&mut self, episode: u32) -> bool {
        let Some(mount) = self.mount.as_mut().filter(|m| m.target.kind.is_tv()) else {
            return false;
        };
        if self.config.strict_episode_selection
            && !resolver::season_episodes(mount.descriptor.as_ref(), mount.cursor.current_season)
                .iter()
                .any(|e| e.episode_number == episode)
        {
            warn!(
                mount_id = %mount.id,
                season = mount.cursor.current_season,
                episode,
                "rejecting selection of unknown episode"
            );
            return false;
        }

        info!(mount_id = %mount.id, season = mount.cursor.current_season, episode, "episode selected");
        mount.cursor.current_episode = episode;
        mount.cursor.show_episode_list = false;
        self.load_current_source();
        true
    }

    /// Switch seasons, restarting at episode 1. Selecting the current
    /// season is a no-op.
    pub fn select_season(&mut self, season: u32) -> bool {
        let Some(mount) = self.mount.as_mut().filter(|m| m.target.kind.is_tv()) else {
            return false;
        };
        if mount.cursor.current_season == season {
            return false;
        }
        info!(mount_id = %mount.id, season, "season selected");
        mount.cursor.current_season = season;
        mount.cursor.current_episode = 1;
        self.load_current_source();
        true
    }

    pub fn pointer_moved(&mut self) {
        self.dispatch(PlaybackEvent::PointerMoved);
    }

    pub fn set_volume_slider_visible(&mut self, visible: bool) {
        self.dispatch(PlaybackEvent::VolumeSliderVisible(visible));
    }

    fn dispatch(&mut self, event: PlaybackEvent) {
        let pool_len = self.config.fallback_pool.len();
        let effects = {
            let Some(mount) = self.mount.as_mut() else {
                return;
            };
            let Reduction { state, effects } =
                state::reduce(&mount.state, &event, mount.target.kind, pool_len);
            if state.phase != mount.state.phase {
                debug!(mount_id = %mount.id, from = %mount.state.phase, to = %state.phase, "playback transition");
            }
            mount.state = state;
            effects
        };

        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        let now = Instant::now();
        match effect {
            Effect::ScheduleOverlay => self.with_timers(|t| t.schedule(TimerKind::OverlayReveal, now)),
            Effect::CancelOverlay => self.with_timers(|t| t.cancel(TimerKind::OverlayReveal)),
            Effect::ScheduleControlsHide => self.with_timers(|t| t.schedule(TimerKind::ControlsHide, now)),
            Effect::CancelControlsHide => self.with_timers(|t| t.cancel(TimerKind::ControlsHide)),
            Effect::LoadFallback { index } => {
                let url = self.config.fallback_pool.get(index).to_string();
                info!(index, url = %url, "switching to fallback clip");
                self.assign_source(url, true, index);
            }
            Effect::AdvanceEpisode => self.advance_episode(),
        }
    }

    fn with_timers(&mut self, f: impl FnOnce(&mut DeferredTimers)) {
        if let Some(mount) = self.mount.as_mut() {
            f(&mut mount.timers);
        }
    }

    fn advance_episode(&mut self) {
        let Some(mount) = self.mount.as_mut() else {
            return;
        };
        match advance::next_after(mount.descriptor.as_ref(), &mount.cursor) {
            Advance::SeriesEnd => {
                info!(mount_id = %mount.id, media = %mount.target, "end of series");
                self.dispatch(PlaybackEvent::SeriesFinished);
            }
            step => {
                step.apply(&mut mount.cursor);
                info!(
                    mount_id = %mount.id,
                    season = mount.cursor.current_season,
                    episode = mount.cursor.current_episode,
                    "advancing to next episode"
                );
                self.load_current_source();
            }
        }
    }

    /// Resolve the cursor's source and start it from zero.
    fn load_current_source(&mut self) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        let source = resolver::effective_source(
            mount.target.kind,
            mount.descriptor.as_ref(),
            &mount.cursor,
            &self.config.fallback_pool,
            mount.state.current_fallback_video_index,
        );
        match source {
            Source::Primary(url) => self.assign_source(url, false, 0),
            Source::Fallback { index, url } => {
                info!(mount_id = %mount.id, media = %mount.target, index, "no playable source, using fallback clip");
                self.assign_source(url, true, index);
            }
        }
    }

    fn assign_source(&mut self, url: String, fallback: bool, fallback_index: usize) {
        let Some(mount) = self.mount.as_mut() else {
            return;
        };
        mount.load += 1;
        debug!(mount_id = %mount.id, load = mount.load, url = %url, fallback, "assigning source");
        mount.source = Some(url.clone());
        self.surface
            .attach(EventSink::new(mount.id, mount.load, self.events_tx.clone()));
        self.dispatch(PlaybackEvent::SourceAssigned {
            fallback,
            fallback_index,
        });

        check("set_source", self.surface.set_source(&url));
        check("seek", self.surface.seek(0.0));
        check("load", self.surface.load());
        check("play", self.surface.play());
    }

    fn sync_clock(&mut self) {
        let current_time = self.surface.current_time();
        let duration = self.surface.duration();
        self.dispatch(PlaybackEvent::TimeUpdate {
            current_time,
            duration,
        });
    }

    fn sync_audio(&mut self) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        let (volume, muted) = (mount.state.volume, mount.state.is_muted);
        check("set_volume", self.surface.set_volume(volume));
        check("set_muted", self.surface.set_muted(muted));
    }
}

fn check(command: &'static str, result: Result<(), SurfaceError>) {
    if let Err(e) = result {
        warn!(command, error = %e, "surface command failed");
    }
}
