use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustflix_core::{ContentType, Episode, MediaDescriptor, MediaRef, Season};
use rustflix_metadata::{CatalogProvider, ContentProvider, MetadataError};
use rustflix_player::fallback::DEFAULT_FALLBACK_POOL;
use rustflix_player::{
    HeadlessSurface, Intent, PlaybackController, PlaybackPhase, PlaybackSurface, PlayerConfig,
    PlayerSession, PlayerView,
};
use tokio::sync::watch;
use tokio::time::Instant;

const CLIP_SECS: f64 = 30.0;

fn catalog() -> CatalogProvider {
    let episode = |n: u32, url: &str| Episode::new(n, Some(url.to_string()));
    CatalogProvider::from_descriptors(vec![
        MediaDescriptor::movie("m1", "Feature", Some("https://cdn.example/feature.mp4".into())),
        MediaDescriptor::movie("m2", "Broken", Some("https://cdn.example/broken.mp4".into())),
        MediaDescriptor::movie("fast", "Fast", Some("https://cdn.example/fast.mp4".into())),
        MediaDescriptor::movie("slow", "Slow", Some("https://cdn.example/slow.mp4".into())),
        MediaDescriptor::show(
            "s1",
            "Serial",
            vec![
                Season::new(
                    1,
                    vec![
                        episode(1, "https://cdn.example/s1e1.mp4"),
                        episode(2, "https://cdn.example/s1e2.mp4"),
                    ],
                ),
                Season::new(2, vec![episode(1, "https://cdn.example/s2e1.mp4")]),
            ],
        ),
    ])
}

/// Holds back the `slow` title so a navigation can overtake it.
struct SlowProvider {
    inner: CatalogProvider,
    delay: Duration,
}

#[async_trait]
impl ContentProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch_media(
        &self,
        id: &str,
        kind: ContentType,
    ) -> Result<Option<MediaDescriptor>, MetadataError> {
        if id == "slow" {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.fetch_media(id, kind).await
    }
}

fn start(
    provider: Arc<dyn ContentProvider>,
    target: MediaRef,
) -> (PlayerSession<HeadlessSurface>, HeadlessSurface) {
    let surface = HeadlessSurface::new(CLIP_SECS);
    surface.mark_broken("https://cdn.example/broken.mp4");
    let (controller, events) = PlaybackController::new(surface.clone(), PlayerConfig::default());
    let session = PlayerSession::spawn(controller, events, provider, target);
    (session, surface)
}

async fn wait_for(
    views: &mut watch::Receiver<Option<PlayerView>>,
    pred: impl Fn(&PlayerView) -> bool,
) -> PlayerView {
    let seen = tokio::time::timeout(
        Duration::from_secs(60),
        views.wait_for(|v| v.as_ref().is_some_and(&pred)),
    )
    .await
    .expect("timed out waiting for view")
    .expect("session closed");
    seen.clone().expect("view present")
}

#[tokio::test(start_paused = true)]
async fn movie_starts_playing_its_own_source() {
    let (session, surface) = start(Arc::new(catalog()), MediaRef::movie("m1"));
    let mut views = session.views();

    let view = wait_for(&mut views, |v| v.phase == PlaybackPhase::Playing).await;
    assert_eq!(view.title, "Feature");
    assert_eq!(view.source.as_deref(), Some("https://cdn.example/feature.mp4"));
    assert!(!view.using_fallback_video);
    assert_eq!(view.duration, CLIP_SECS);
    assert!(!surface.is_paused());

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn controls_hide_after_idle_playback() {
    let (session, _surface) = start(Arc::new(catalog()), MediaRef::movie("m1"));
    let mut views = session.views();

    let view = wait_for(&mut views, |v| v.phase == PlaybackPhase::Playing).await;
    assert!(view.show_controls);
    let started = Instant::now();

    wait_for(&mut views, |v| !v.show_controls).await;
    assert!(started.elapsed() >= Duration::from_secs(3));

    session.send(Intent::PointerMoved).await.unwrap();
    wait_for(&mut views, |v| v.show_controls).await;

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn pausing_reveals_overlay_after_delay() {
    let (session, _surface) = start(Arc::new(catalog()), MediaRef::movie("m1"));
    let mut views = session.views();
    wait_for(&mut views, |v| v.phase == PlaybackPhase::Playing).await;

    let paused_at = Instant::now();
    session.send(Intent::PlayPause).await.unwrap();
    let view = wait_for(&mut views, |v| v.is_paused).await;
    assert!(!view.show_overlay);
    assert!(view.show_controls);

    wait_for(&mut views, |v| v.show_overlay).await;
    assert!(paused_at.elapsed() >= Duration::from_secs(2));

    // Resuming hides the overlay again.
    session.send(Intent::PlayPause).await.unwrap();
    wait_for(&mut views, |v| !v.is_paused && !v.show_overlay).await;

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn broken_source_degrades_to_fallback_clip() {
    let (session, surface) = start(Arc::new(catalog()), MediaRef::movie("m2"));
    let mut views = session.views();

    let view = wait_for(&mut views, |v| {
        v.using_fallback_video && v.phase == PlaybackPhase::Playing
    })
    .await;
    assert!(view.video_error);
    assert_eq!(view.source.as_deref(), Some(DEFAULT_FALLBACK_POOL[0]));
    assert_eq!(surface.source().as_deref(), Some(DEFAULT_FALLBACK_POOL[0]));

    // Fallback clips rotate when one finishes.
    surface.tick(CLIP_SECS + 1.0);
    let view = wait_for(&mut views, |v| {
        v.source.as_deref() == Some(DEFAULT_FALLBACK_POOL[1]) && v.phase == PlaybackPhase::Playing
    })
    .await;
    assert!(view.using_fallback_video);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn navigating_away_discards_pending_timers() {
    let (session, _surface) = start(Arc::new(catalog()), MediaRef::movie("m1"));
    let mut views = session.views();
    let first = wait_for(&mut views, |v| v.phase == PlaybackPhase::Playing).await;

    // The controls-hide timer of the first mount is now pending.
    session.navigate(MediaRef::movie("missing")).await.unwrap();
    let second = wait_for(&mut views, |v| v.mount_id != first.mount_id).await;
    assert!(second.is_metadata_loading);
    assert!(second.show_controls);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let view = views.borrow().clone().unwrap();
    assert_eq!(view.mount_id, second.mount_id);
    assert!(view.show_controls);
    assert!(view.is_metadata_loading);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn show_advances_through_seasons_to_series_end() {
    let (session, surface) = start(Arc::new(catalog()), MediaRef::tv("s1"));
    let mut views = session.views();

    let playing_at = |season: u32, episode: u32| {
        move |v: &PlayerView| {
            v.current_season == Some(season)
                && v.current_episode == Some(episode)
                && v.phase == PlaybackPhase::Playing
        }
    };

    let view = wait_for(&mut views, playing_at(1, 1)).await;
    assert_eq!(view.seasons, vec![1, 2]);
    assert_eq!(view.source.as_deref(), Some("https://cdn.example/s1e1.mp4"));

    surface.tick(CLIP_SECS + 1.0);
    let view = wait_for(&mut views, playing_at(1, 2)).await;
    assert_eq!(view.source.as_deref(), Some("https://cdn.example/s1e2.mp4"));

    surface.tick(CLIP_SECS + 1.0);
    let view = wait_for(&mut views, playing_at(2, 1)).await;
    assert_eq!(view.source.as_deref(), Some("https://cdn.example/s2e1.mp4"));
    assert_eq!(view.episodes.len(), 1);

    surface.tick(CLIP_SECS + 1.0);
    let view = wait_for(&mut views, |v| v.phase == PlaybackPhase::Ended && v.show_overlay).await;
    assert_eq!((view.current_season, view.current_episode), (Some(2), Some(1)));
    assert!(view.is_paused);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn selecting_an_episode_switches_source() {
    let (session, _surface) = start(Arc::new(catalog()), MediaRef::tv("s1"));
    let mut views = session.views();
    wait_for(&mut views, |v| v.phase == PlaybackPhase::Playing).await;

    session.send(Intent::ToggleEpisodeList).await.unwrap();
    let view = wait_for(&mut views, |v| v.show_episode_list).await;
    assert_eq!(view.episodes.len(), 2);

    session.send(Intent::SelectEpisode { episode: 2 }).await.unwrap();
    let view = wait_for(&mut views, |v| {
        v.current_episode == Some(2) && v.phase == PlaybackPhase::Playing
    })
    .await;
    assert_eq!(view.source.as_deref(), Some("https://cdn.example/s1e2.mp4"));
    assert!(!view.show_episode_list);

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_for_a_discarded_mount_is_dropped() {
    let provider = SlowProvider {
        inner: catalog(),
        delay: Duration::from_secs(5),
    };
    let (session, _surface) = start(Arc::new(provider), MediaRef::movie("slow"));
    let mut views = session.views();
    let first = wait_for(&mut views, |v| v.is_metadata_loading).await;

    session.navigate(MediaRef::movie("fast")).await.unwrap();
    let fast = wait_for(&mut views, |v| v.title == "Fast").await;
    assert_ne!(fast.mount_id, first.mount_id);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let view = views.borrow().clone().unwrap();
    assert_eq!(view.title, "Fast");
    assert_eq!(view.mount_id, fast.mount_id);
    assert_eq!(view.source.as_deref(), Some("https://cdn.example/fast.mp4"));

    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_returns_a_torn_down_controller() {
    let (session, surface) = start(Arc::new(catalog()), MediaRef::movie("m1"));
    let mut views = session.views();
    wait_for(&mut views, |v| v.phase == PlaybackPhase::Playing).await;

    let controller = session.shutdown().await.expect("session task finished");
    assert!(controller.mount_ref().is_none());
    assert!(!surface.is_attached());
    assert!(surface.is_paused());
    assert!(views.borrow().is_none());
}
