use std::time::Duration;

use tracing::warn;

use crate::fallback::FallbackPool;

/// Player tuning, read from `RUSTFLIX_*` environment variables.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// How long playback must stay paused before the title overlay appears.
    pub overlay_delay: Duration,
    /// Idle time during playback before the controls hide.
    pub controls_hide_delay: Duration,
    pub skip_step_secs: f64,
    pub initial_volume: f64,
    /// Reject `select_episode` for numbers the current season does not have.
    pub strict_episode_selection: bool,
    pub fallback_pool: FallbackPool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            overlay_delay: Duration::from_secs(2),
            controls_hide_delay: Duration::from_secs(3),
            skip_step_secs: 10.0,
            initial_volume: 1.0,
            strict_episode_selection: false,
            fallback_pool: FallbackPool::default(),
        }
    }
}

impl PlayerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let overlay_delay = parse_var(&lookup, "RUSTFLIX_OVERLAY_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.overlay_delay);
        let controls_hide_delay = parse_var(&lookup, "RUSTFLIX_CONTROLS_HIDE_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.controls_hide_delay);
        let skip_step_secs = parse_var::<f64>(&lookup, "RUSTFLIX_SKIP_SECS")
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(defaults.skip_step_secs);
        let initial_volume = parse_var::<f64>(&lookup, "RUSTFLIX_INITIAL_VOLUME")
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(defaults.initial_volume);
        let strict_episode_selection = parse_var(&lookup, "RUSTFLIX_STRICT_EPISODES")
            .unwrap_or(defaults.strict_episode_selection);

        let fallback_pool = match lookup("RUSTFLIX_FALLBACK_POOL") {
            Some(raw) if !raw.trim().is_empty() => {
                let urls = raw.split(',').map(str::trim).filter(|u| !u.is_empty());
                FallbackPool::new(urls).unwrap_or_else(|e| {
                    warn!(error = %e, "ignoring RUSTFLIX_FALLBACK_POOL, using built-in samples");
                    defaults.fallback_pool.clone()
                })
            }
            _ => defaults.fallback_pool,
        };

        Self {
            overlay_delay,
            controls_hide_delay,
            skip_step_secs,
            initial_volume,
            strict_episode_selection,
            fallback_pool,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!(key, value = %raw, "invalid value, using default");
    }
    parsed
}
