pub mod advance;
pub mod config;
pub mod controller;
pub mod fallback;
pub mod headless;
pub mod resolver;
pub mod session;
pub mod state;
pub mod surface;
pub mod timers;
pub mod view;

use thiserror::Error;

pub use config::PlayerConfig;
pub use controller::{Intent, PlaybackController};
pub use fallback::FallbackPool;
pub use headless::HeadlessSurface;
pub use session::{PlayerSession, SessionCommand};
pub use state::{EpisodeCursor, PlaybackPhase, PlaybackState};
pub use surface::{EventSink, PlaybackSurface, SurfaceEvent, SurfaceSignal};
pub use view::PlayerView;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("fallback pool must contain at least one url")]
    EmptyPool,
    #[error("invalid fallback url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("no source assigned")]
    NoSource,
    #[error("surface rejected command: {0}")]
    Rejected(String),
    #[error("not supported by this surface: {0}")]
    Unsupported(&'static str),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("player session has shut down")]
    Closed,
}
