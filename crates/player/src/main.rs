use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rustflix_core::{ContentType, MediaRef};
use rustflix_player::{HeadlessSurface, Intent, PlaybackController, PlayerConfig, PlayerSession, SessionCommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let kind: ContentType = args
        .next()
        .context("usage: rustflix-player <movie|tv> <id>")?
        .parse()?;
    let id = args.next().context("usage: rustflix-player <movie|tv> <id>")?;

    let provider = rustflix_metadata::provider::from_env()
        .await
        .context("failed to build content providers")?;

    let config = PlayerConfig::from_env();
    let clip_secs: f64 = std::env::var("RUSTFLIX_SIM_CLIP_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30.0);
    let speed: f64 = std::env::var("RUSTFLIX_SIM_SPEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1.0);

    let surface = HeadlessSurface::new(clip_secs);
    let (controller, events) = PlaybackController::new(surface.clone(), config);
    let target = MediaRef::new(id, kind);
    info!(media = %target, clip_secs, "starting headless player");
    let session = PlayerSession::spawn(controller, events, Arc::new(provider), target);

    // Simulated playback clock
    {
        let surface = surface.clone();
        tokio::spawn(async move {
            let step = Duration::from_millis(250);
            loop {
                tokio::time::sleep(step).await;
                surface.tick(step.as_secs_f64() * speed);
            }
        });
    }

    // Print every view change apart from clock ticks
    {
        let mut views = session.views();
        tokio::spawn(async move {
            let mut last: Option<rustflix_player::PlayerView> = None;
            while views.changed().await.is_ok() {
                let Some(view) = views.borrow_and_update().clone() else {
                    continue;
                };
                if last.as_ref().is_some_and(|l| l.same_except_clock(&view)) {
                    continue;
                }
                match serde_json::to_string(&view) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!(error = %e, "failed to serialize view"),
                }
                last = Some(view);
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        match parse_command(line) {
            Some(command) => {
                if session.command(command).await.is_err() {
                    break;
                }
            }
            None => warn!(input = line, "unrecognized command"),
        }
    }

    session.shutdown().await;
    info!("bye");
    Ok(())
}

/// One shell command per line, e.g. `play`, `vol 0.4`, `ep 3`, `go tv 1399`,
/// or a JSON intent such as `{"intent":"seek_to_percent","percent":50}`.
fn parse_command(line: &str) -> Option<SessionCommand> {
    if line.starts_with('{') {
        return serde_json::from_str(line).ok().map(SessionCommand::Intent);
    }

    let mut words = line.split_whitespace();
    let intent = match (words.next()?, words.next()) {
        ("play" | "pause" | "p", None) => Intent::PlayPause,
        ("ff", None) => Intent::SkipForward,
        ("rw", None) => Intent::SkipBackward,
        ("mute", None) => Intent::ToggleMute,
        ("fs", None) => Intent::ToggleFullscreen,
        ("list", None) => Intent::ToggleEpisodeList,
        ("move", None) => Intent::PointerMoved,
        ("vol", Some(v)) => Intent::SetVolume { volume: v.parse().ok()? },
        ("seek", Some(p)) => Intent::SeekToPercent { percent: p.parse().ok()? },
        ("ep", Some(n)) => Intent::SelectEpisode { episode: n.parse().ok()? },
        ("season", Some(n)) => Intent::SelectSeason { season: n.parse().ok()? },
        ("go", Some(kind)) => {
            let id = words.next()?;
            return Some(SessionCommand::Navigate(MediaRef::new(id, kind.parse().ok()?)));
        }
        _ => return None,
    };
    Some(SessionCommand::Intent(intent))
}
