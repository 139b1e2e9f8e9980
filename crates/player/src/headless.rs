//! An in-memory surface that simulates a media element.
//!
//! No decoding happens: loading a source reports a fixed clip length and
//! [`HeadlessSurface::tick`] moves the clock forward. Sources can be marked
//! as broken to exercise the fallback path. Clones share the same element,
//! so a driver task can tick a surface the controller owns.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::surface::{EventSink, PlaybackSurface, SurfaceEvent};
use crate::SurfaceError;

/// Commands received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    SetSource(String),
    Load,
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
    SetFullscreen(bool),
}

#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    clip_secs: f64,
    src: Option<String>,
    loaded: bool,
    current_time: f64,
    duration: f64,
    paused: bool,
    volume: f64,
    muted: bool,
    fullscreen: bool,
    broken: HashSet<String>,
    sink: Option<EventSink>,
    commands: Vec<SurfaceCommand>,
}

impl Inner {
    fn emit(&self, event: SurfaceEvent) {
        if let Some(ref sink) = self.sink {
            sink.emit(event);
        }
    }
}

impl HeadlessSurface {
    /// Every loadable source reports `clip_secs` of media.
    pub fn new(clip_secs: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                clip_secs,
                paused: true,
                volume: 1.0,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Loading `url` will report an error instead of metadata.
    pub fn mark_broken(&self, url: impl Into<String>) {
        self.lock().broken.insert(url.into());
    }

    pub fn source(&self) -> Option<String> {
        self.lock().src.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.lock().sink.is_some()
    }

    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    pub fn is_fullscreen(&self) -> bool {
        self.lock().fullscreen
    }

    pub fn commands(&self) -> Vec<SurfaceCommand> {
        self.lock().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.lock().commands.clear();
    }

    /// Advance the clock by `secs` if playing. Emits `timeupdate`, and
    /// `pause` + `ended` when the clip runs out.
    pub fn tick(&self, secs: f64) {
        let mut inner = self.lock();
        if inner.paused || !inner.loaded {
            return;
        }
        inner.current_time = (inner.current_time + secs).min(inner.duration);
        inner.emit(SurfaceEvent::TimeUpdate);
        if inner.current_time >= inner.duration {
            inner.paused = true;
            inner.emit(SurfaceEvent::Pause);
            inner.emit(SurfaceEvent::Ended);
        }
    }

    /// Report a playback failure for the current source.
    pub fn fail(&self, reason: &str) {
        let inner = self.lock();
        inner.emit(SurfaceEvent::Error(Some(reason.to_string())));
    }
}

impl PlaybackSurface for HeadlessSurface {
    fn set_source(&mut self, url: &str) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::SetSource(url.to_string()));
        inner.src = Some(url.to_string());
        inner.loaded = false;
        inner.current_time = 0.0;
        inner.duration = 0.0;
        Ok(())
    }

    fn load(&mut self) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::Load);
        let src = inner.src.clone().ok_or(SurfaceError::NoSource)?;
        // Reloading stops playback without a pause event, like a media element.
        inner.paused = true;
        inner.current_time = 0.0;
        if inner.broken.contains(&src) {
            inner.loaded = false;
            inner.emit(SurfaceEvent::Error(Some(format!("cannot decode {src}"))));
            return Ok(());
        }
        inner.loaded = true;
        inner.duration = inner.clip_secs;
        inner.emit(SurfaceEvent::LoadedMetadata);
        Ok(())
    }

    fn play(&mut self) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::Play);
        if inner.src.is_none() {
            return Err(SurfaceError::NoSource);
        }
        if !inner.loaded {
            return Err(SurfaceError::Rejected("source not loaded".into()));
        }
        if inner.paused {
            inner.paused = false;
            inner.emit(SurfaceEvent::Play);
            inner.emit(SurfaceEvent::Playing);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::Pause);
        if !inner.paused {
            inner.paused = true;
            inner.emit(SurfaceEvent::Pause);
        }
        Ok(())
    }

    fn seek(&mut self, position_secs: f64) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::Seek(position_secs));
        let upper = if inner.loaded { inner.duration } else { 0.0 };
        inner.current_time = position_secs.clamp(0.0, upper);
        if inner.loaded {
            inner.emit(SurfaceEvent::TimeUpdate);
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::SetVolume(volume));
        inner.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::SetMuted(muted));
        inner.muted = muted;
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), SurfaceError> {
        let mut inner = self.lock();
        inner.commands.push(SurfaceCommand::SetFullscreen(fullscreen));
        inner.fullscreen = fullscreen;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn attach(&mut self, sink: EventSink) {
        self.lock().sink = Some(sink);
    }

    fn detach(&mut self) {
        self.lock().sink = None;
    }
}
