//! Deferred overlay-reveal and controls-hide actions, owned per mount.
//!
//! Timers are plain deadlines rather than spawned tasks: whoever owns the
//! [`DeferredTimers`] sleeps until [`DeferredTimers::next_deadline`] and then
//! collects what is due. Dropping or clearing the value cancels everything,
//! so nothing can fire against a torn-down mount.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    OverlayReveal,
    ControlsHide,
}

#[derive(Debug, Clone)]
pub struct DeferredTimers {
    overlay_delay: Duration,
    controls_hide_delay: Duration,
    overlay: Option<Instant>,
    controls_hide: Option<Instant>,
}

impl DeferredTimers {
    pub fn new(overlay_delay: Duration, controls_hide_delay: Duration) -> Self {
        Self {
            overlay_delay,
            controls_hide_delay,
            overlay: None,
            controls_hide: None,
        }
    }

    /// (Re)arm `kind` relative to `now`, replacing any pending deadline.
    pub fn schedule(&mut self, kind: TimerKind, now: Instant) {
        match kind {
            TimerKind::OverlayReveal => self.overlay = Some(now + self.overlay_delay),
            TimerKind::ControlsHide => self.controls_hide = Some(now + self.controls_hide_delay),
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::OverlayReveal => self.overlay = None,
            TimerKind::ControlsHide => self.controls_hide = None,
        }
    }

    pub fn clear(&mut self) {
        self.overlay = None;
        self.controls_hide = None;
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::OverlayReveal => self.overlay.is_some(),
            TimerKind::ControlsHide => self.controls_hide.is_some(),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.overlay, self.controls_hide) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Disarm and return every timer whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due = Vec::with_capacity(2);
        if let Some(at) = self.overlay.filter(|at| *at <= now) {
            due.push((at, TimerKind::OverlayReveal));
            self.overlay = None;
        }
        if let Some(at) = self.controls_hide.filter(|at| *at <= now) {
            due.push((at, TimerKind::ControlsHide));
            self.controls_hide = None;
        }
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, kind)| kind).collect()
    }
}
