//! Picks the url playback should attempt for the current cursor.
//!
//! Resolution never fails: a missing descriptor, season or episode just
//! yields no candidate, and no candidate means the fallback pool.

use std::borrow::Cow;

use rustflix_core::{ContentType, Episode, MediaDescriptor};

use crate::fallback::FallbackPool;
use crate::state::EpisodeCursor;

/// Episodes synthesized for a season the descriptor does not (yet) describe.
pub const PLACEHOLDER_EPISODE_COUNT: u32 = 5;

/// Where the next load should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Primary(String),
    Fallback { index: usize, url: String },
}

impl Source {
    pub fn url(&self) -> &str {
        match self {
            Self::Primary(url) => url,
            Self::Fallback { url, .. } => url,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// The episode list for `season_number`, or generic placeholders when the
/// season is absent or empty.
pub fn season_episodes(descriptor: Option<&MediaDescriptor>, season_number: u32) -> Cow<'_, [Episode]> {
    match descriptor.and_then(|d| d.season(season_number)) {
        Some(season) if !season.episodes.is_empty() => Cow::Borrowed(&season.episodes),
        _ => Cow::Owned(placeholder_episodes(descriptor)),
    }
}

pub fn placeholder_episodes(descriptor: Option<&MediaDescriptor>) -> Vec<Episode> {
    let thumbnail_url = descriptor.and_then(|d| d.thumbnail_url.clone());
    (1..=PLACEHOLDER_EPISODE_COUNT)
        .map(|n| Episode {
            thumbnail_url: thumbnail_url.clone(),
            ..Episode::new(n, None)
        })
        .collect()
}

/// The episode under the cursor, placeholders included.
pub fn current_episode(descriptor: Option<&MediaDescriptor>, cursor: &EpisodeCursor) -> Option<Episode> {
    season_episodes(descriptor, cursor.current_season)
        .iter()
        .find(|e| e.episode_number == cursor.current_episode)
        .cloned()
}

/// The raw url the descriptor offers for this cursor, valid or not.
pub fn candidate(
    kind: ContentType,
    descriptor: Option<&MediaDescriptor>,
    cursor: &EpisodeCursor,
) -> Option<String> {
    let descriptor = descriptor?;
    match kind {
        ContentType::Movie => descriptor.video_url().map(str::to_string),
        ContentType::Tv => current_episode(Some(descriptor), cursor)
            .and_then(|e| e.video_url)
            .or_else(|| descriptor.trailer_url.clone()),
    }
}

/// Accept only well-formed absolute urls.
pub fn is_playable_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok()
}

/// Resolve the candidate, substituting `pool[fallback_index]` when it is
/// missing or malformed.
pub fn effective_source(
    kind: ContentType,
    descriptor: Option<&MediaDescriptor>,
    cursor: &EpisodeCursor,
    pool: &FallbackPool,
    fallback_index: usize,
) -> Source {
    match candidate(kind, descriptor, cursor) {
        Some(url) if is_playable_url(&url) => Source::Primary(url),
        _ => Source::Fallback {
            index: fallback_index,
            url: pool.get(fallback_index).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustflix_core::Season;

    fn url(s: &str) -> Option<String> {
        Some(format!("https://cdn.example/{s}.mp4"))
    }

    fn cursor(season: u32, episode: u32) -> EpisodeCursor {
        EpisodeCursor {
            current_season: season,
            current_episode: episode,
            show_episode_list: false,
        }
    }

    #[test]
    fn episodes_are_found_by_number_not_index() {
        let show = MediaDescriptor::show(
            "s",
            "Shuffled",
            vec![Season::new(
                1,
                vec![
                    Episode::new(3, url("e3")),
                    Episode::new(1, url("e1")),
                    Episode::new(2, url("e2")),
                ],
            )],
        );

        let found = candidate(ContentType::Tv, Some(&show), &cursor(1, 2));
        assert_eq!(found, url("e2"));
    }

    #[test]
    fn missing_season_synthesizes_placeholders() {
        let mut show = MediaDescriptor::show("s", "Partial", vec![Season::new(1, vec![])]);
        show.thumbnail_url = Some("https://img.example/poster.jpg".into());

        let episodes = season_episodes(Some(&show), 4);
        assert_eq!(episodes.len(), PLACEHOLDER_EPISODE_COUNT as usize);
        assert_eq!(episodes[0].episode_number, 1);
        assert_eq!(episodes[4].name, "Episode 5");
        assert_eq!(
            episodes[2].thumbnail_url.as_deref(),
            Some("https://img.example/poster.jpg")
        );

        assert_eq!(season_episodes(None, 1).len(), PLACEHOLDER_EPISODE_COUNT as usize);
    }

    #[test]
    fn episode_without_source_uses_show_trailer() {
        let mut show = MediaDescriptor::show(
            "s",
            "Trailered",
            vec![Season::new(1, vec![Episode::new(1, None)])],
        );
        show.trailer_url = url("trailer");

        assert_eq!(candidate(ContentType::Tv, Some(&show), &cursor(1, 1)), url("trailer"));
        assert_eq!(candidate(ContentType::Tv, Some(&show), &cursor(1, 9)), url("trailer"));
    }

    #[test]
    fn pending_descriptor_has_no_candidate() {
        assert_eq!(candidate(ContentType::Movie, None, &cursor(1, 1)), None);
        assert_eq!(candidate(ContentType::Tv, None, &cursor(1, 1)), None);
    }

    #[test]
    fn malformed_urls_fall_back() {
        let pool = FallbackPool::default();
        let movie = MediaDescriptor::movie("m", "Broken", Some("/relative/only.mp4".into()));

        let source = effective_source(ContentType::Movie, Some(&movie), &cursor(1, 1), &pool, 2);
        assert_eq!(
            source,
            Source::Fallback {
                index: 2,
                url: pool.get(2).to_string()
            }
        );
    }

    #[test]
    fn fallback_selection_is_deterministic() {
        let pool = FallbackPool::default();
        let movie = MediaDescriptor::movie("m", "No Source", None);

        let initial = effective_source(ContentType::Movie, Some(&movie), &cursor(1, 1), &pool, 0);
        assert_eq!(initial.url(), pool.get(0));
        assert!(initial.is_fallback());

        for k in 0..10 {
            let source = effective_source(ContentType::Movie, Some(&movie), &cursor(1, 1), &pool, k);
            assert_eq!(source.url(), pool.urls()[k % pool.len()]);
        }
    }

    #[test]
    fn valid_movie_url_is_primary() {
        let pool = FallbackPool::default();
        let movie = MediaDescriptor::movie("m", "Good", url("good"));
        let source = effective_source(ContentType::Movie, Some(&movie), &cursor(1, 1), &pool, 3);
        assert_eq!(source, Source::Primary("https://cdn.example/good.mp4".into()));
    }
}
