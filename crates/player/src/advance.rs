use rustflix_core::MediaDescriptor;

use crate::resolver::season_episodes;
use crate::state::EpisodeCursor;

/// What happens after the current episode ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Next episode in the same season.
    Episode(u32),
    /// First episode of the next season.
    Season(u32),
    /// No next episode and no next season.
    SeriesEnd,
}

/// Next position after `cursor`: `episode + 1` if the current season has it,
/// otherwise episode 1 of `season + 1` if the show has that season.
pub fn next_after(descriptor: Option<&MediaDescriptor>, cursor: &EpisodeCursor) -> Advance {
    let next_episode = cursor.current_episode.saturating_add(1);
    let episodes = season_episodes(descriptor, cursor.current_season);
    if episodes.iter().any(|e| e.episode_number == next_episode) {
        return Advance::Episode(next_episode);
    }

    let next_season = cursor.current_season.saturating_add(1);
    if descriptor.and_then(|d| d.season(next_season)).is_some() {
        return Advance::Season(next_season);
    }

    Advance::SeriesEnd
}

impl Advance {
    /// Apply to a cursor. `SeriesEnd` leaves it untouched.
    pub fn apply(self, cursor: &mut EpisodeCursor) {
        match self {
            Self::Episode(n) => cursor.current_episode = n,
            Self::Season(n) => {
                cursor.current_season = n;
                cursor.current_episode = 1;
            }
            Self::SeriesEnd => {}
        }
    }
}
