//! Playback state
//!
//! `CurrentPlayback` and `PlayableItem` are polymorphic: the concrete variant
//! is chosen by the item's `type` field, with a raw-JSON fallback for item
//! kinds this crate does not model (ads, unknown) and for a `null` item.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use spotify_dispatch::Discriminated;

use super::common::{Context, CursorPage};
use super::episode::Episode;
use super::track::Track;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub is_private_session: bool,
    #[serde(default)]
    pub is_restricted: bool,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub volume_percent: Option<u8>,
    #[serde(default)]
    pub supports_volume: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devices {
    pub devices: Vec<Device>,
}

/// Actions the player currently refuses. `None` means allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disallows {
    pub interrupting_playback: Option<bool>,
    pub pausing: Option<bool>,
    pub resuming: Option<bool>,
    pub seeking: Option<bool>,
    pub skipping_next: Option<bool>,
    pub skipping_prev: Option<bool>,
    pub toggling_repeat_context: Option<bool>,
    pub toggling_shuffle: Option<bool>,
    pub toggling_repeat_track: Option<bool>,
    pub transferring_playback: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    #[serde(default)]
    pub disallows: Disallows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatState {
    Track,
    Context,
    Off,
}

impl RepeatState {
    pub fn as_str(self) -> &'static str {
        match self {
            RepeatState::Track => "track",
            RepeatState::Context => "context",
            RepeatState::Off => "off",
        }
    }
}

impl fmt::Display for RepeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback state around an item of type `I`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playback<I> {
    pub timestamp: u64,
    pub progress_ms: Option<u64>,
    pub is_playing: bool,
    pub currently_playing_type: String,
    pub device: Option<Device>,
    pub shuffle_state: Option<bool>,
    pub repeat_state: Option<RepeatState>,
    pub context: Option<Context>,
    #[serde(default)]
    pub actions: Actions,
    pub item: Option<I>,
}

/// What the user is listening to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CurrentPlayback {
    Track(Playback<Track>),
    Episode(Playback<Episode>),
    /// `null` item, or an item kind without a dedicated model.
    Other(Playback<Value>),
}

impl Discriminated for CurrentPlayback {
    const TAG_POINTER: &'static str = "/item/type";

    fn from_tagged(tag: Option<&str>, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match tag {
            Some("track") => CurrentPlayback::Track(serde_json::from_value(value)?),
            Some("episode") => CurrentPlayback::Episode(serde_json::from_value(value)?),
            _ => CurrentPlayback::Other(serde_json::from_value(value)?),
        })
    }
}

super::deserialize_discriminated!(CurrentPlayback);

impl CurrentPlayback {
    pub fn is_playing(&self) -> bool {
        match self {
            CurrentPlayback::Track(p) => p.is_playing,
            CurrentPlayback::Episode(p) => p.is_playing,
            CurrentPlayback::Other(p) => p.is_playing,
        }
    }

    pub fn progress_ms(&self) -> Option<u64> {
        match self {
            CurrentPlayback::Track(p) => p.progress_ms,
            CurrentPlayback::Episode(p) => p.progress_ms,
            CurrentPlayback::Other(p) => p.progress_ms,
        }
    }

    pub fn device(&self) -> Option<&Device> {
        match self {
            CurrentPlayback::Track(p) => p.device.as_ref(),
            CurrentPlayback::Episode(p) => p.device.as_ref(),
            CurrentPlayback::Other(p) => p.device.as_ref(),
        }
    }

    pub fn track(&self) -> Option<&Track> {
        match self {
            CurrentPlayback::Track(p) => p.item.as_ref(),
            _ => None,
        }
    }

    pub fn episode(&self) -> Option<&Episode> {
        match self {
            CurrentPlayback::Episode(p) => p.item.as_ref(),
            _ => None,
        }
    }
}

/// A track or an episode, chosen by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlayableItem {
    Track(Box<Track>),
    Episode(Box<Episode>),
    Other(Value),
}

impl Discriminated for PlayableItem {
    const TAG_POINTER: &'static str = "/type";

    fn from_tagged(tag: Option<&str>, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match tag {
            Some("track") => PlayableItem::Track(serde_json::from_value(value)?),
            Some("episode") => PlayableItem::Episode(serde_json::from_value(value)?),
            _ => PlayableItem::Other(value),
        })
    }
}

super::deserialize_discriminated!(PlayableItem);

impl PlayableItem {
    pub fn uri(&self) -> Option<&str> {
        match self {
            PlayableItem::Track(track) => Some(&track.uri),
            PlayableItem::Episode(episode) => Some(&episode.uri),
            PlayableItem::Other(value) => value.get("uri").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: String,
    pub context: Option<Context>,
}

pub type RecentlyPlayed = CursorPage<PlayHistory>;

/// Where to start within a context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayOffset {
    Position(u32),
    Uri(String),
}

/// Body of `PUT /me/player/play`. All fields optional; an empty body
/// resumes the current context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<PlayOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_ms: Option<u64>,
}

impl PlayRequest {
    pub fn context(uri: impl Into<String>) -> Self {
        Self {
            context_uri: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn uris<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: Some(uris.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: PlayOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn position_ms(mut self, position_ms: u64) -> Self {
        self.position_ms = Some(position_ms);
        self
    }
}
