use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::common::{ExternalUrls, Followers, Image};
use super::player::PlayableItem;
use super::user::PublicUser;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collaborative: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub followers: Option<Followers>,
    pub href: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub owner: PublicUser,
    pub public: Option<bool>,
    pub snapshot_id: String,
    pub tracks: Option<PlaylistTracks>,
    pub uri: String,
}

/// The `tracks` field of a playlist: a full page on `GET /playlists/{id}`,
/// only `href` and `total` in simplified listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracks {
    pub href: String,
    pub total: u32,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// An entry with its playable item (`track` key present, possibly `null`
/// for unavailable items).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub added_at: Option<String>,
    pub added_by: Option<Value>,
    #[serde(default)]
    pub is_local: bool,
    pub track: Option<PlayableItem>,
}

/// A bare reference to a track collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrackRef {
    pub href: String,
    pub total: u32,
}

/// Playlist entry, chosen by the presence of a `track` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlaylistItem {
    Track(PlaylistTrack),
    Ref(PlaylistTrackRef),
}

impl PlaylistItem {
    pub fn as_track(&self) -> Option<&PlaylistTrack> {
        match self {
            PlaylistItem::Track(track) => Some(track),
            PlaylistItem::Ref(_) => None,
        }
    }

    pub fn as_track_ref(&self) -> Option<&PlaylistTrackRef> {
        match self {
            PlaylistItem::Ref(reference) => Some(reference),
            PlaylistItem::Track(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for PlaylistItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let item = if value.get("track").is_some() {
            serde_json::from_value(value).map(PlaylistItem::Track)
        } else {
            serde_json::from_value(value).map(PlaylistItem::Ref)
        };
        item.map_err(serde::de::Error::custom)
    }
}
