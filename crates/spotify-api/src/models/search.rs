use serde::{Deserialize, Serialize};

use super::common::Page;
use super::episode::{Episode, SimplifiedShow};
use super::playlist::Playlist;
use super::track::{Artist, SimplifiedAlbum, Track};

/// One page per requested type; types not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub tracks: Option<Page<Track>>,
    pub artists: Option<Page<Artist>>,
    pub albums: Option<Page<SimplifiedAlbum>>,
    /// Entries can be `null` when a playlist is unavailable.
    pub playlists: Option<Page<Option<Playlist>>>,
    pub shows: Option<Page<Option<SimplifiedShow>>>,
    pub episodes: Option<Page<Option<Episode>>>,
}
