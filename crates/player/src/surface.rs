//! The media element the controller drives.
//!
//! A [`PlaybackSurface`] takes imperative commands and reports what happened
//! asynchronously through the [`EventSink`] it was attached with. Events are
//! tagged with the mount that attached the sink and the source load it was
//! attached for, so anything emitted after a remount or a source switch is
//! recognisably stale.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::SurfaceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    TimeUpdate,
    LoadedMetadata,
    Pause,
    Play,
    Ended,
    /// The current source cannot be played. Carries the platform's reason.
    Error(Option<String>),
    Waiting,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSignal {
    pub mount_id: Uuid,
    /// Source generation within the mount; bumped on every source assignment.
    pub load: u64,
    pub event: SurfaceEvent,
}

/// Subscription handle given to a surface on attach.
#[derive(Debug, Clone)]
pub struct EventSink {
    mount_id: Uuid,
    load: u64,
    tx: mpsc::UnboundedSender<SurfaceSignal>,
}

impl EventSink {
    pub fn new(mount_id: Uuid, load: u64, tx: mpsc::UnboundedSender<SurfaceSignal>) -> Self {
        Self { mount_id, load, tx }
    }

    pub fn mount_id(&self) -> Uuid {
        self.mount_id
    }

    pub fn load(&self) -> u64 {
        self.load
    }

    /// Returns `false` once the controller side has gone away.
    pub fn emit(&self, event: SurfaceEvent) -> bool {
        self.tx
            .send(SurfaceSignal {
                mount_id: self.mount_id,
                load: self.load,
                event,
            })
            .is_ok()
    }
}

/// Capability set of a platform media element.
///
/// Commands may fail; the controller logs failures and carries on.
/// Positions and durations are seconds. `duration` may be zero or
/// non-finite until metadata has loaded.
pub trait PlaybackSurface: Send {
    fn set_source(&mut self, url: &str) -> Result<(), SurfaceError>;
    fn load(&mut self) -> Result<(), SurfaceError>;
    fn play(&mut self) -> Result<(), SurfaceError>;
    fn pause(&mut self) -> Result<(), SurfaceError>;
    fn seek(&mut self, position_secs: f64) -> Result<(), SurfaceError>;
    fn set_volume(&mut self, volume: f64) -> Result<(), SurfaceError>;
    fn set_muted(&mut self, muted: bool) -> Result<(), SurfaceError>;
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), SurfaceError>;

    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_paused(&self) -> bool;

    /// Start delivering events to `sink`, replacing any previous subscriber.
    fn attach(&mut self, sink: EventSink);
    /// Stop delivering events.
    fn detach(&mut self);
}
