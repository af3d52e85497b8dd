use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of a top-level object, as carried in its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Album,
    Artist,
    Playlist,
    Track,
    Show,
    Episode,
    Audiobook,
    User,
    Collection,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Album => "album",
            ObjectType::Artist => "artist",
            ObjectType::Playlist => "playlist",
            ObjectType::Track => "track",
            ObjectType::Show => "show",
            ObjectType::Episode => "episode",
            ObjectType::Audiobook => "audiobook",
            ObjectType::User => "user",
            ObjectType::Collection => "collection",
        }
    }
}

pub type ExternalUrls = HashMap<String, String>;
pub type ExternalIds = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Followers {
    pub href: Option<String>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restrictions {
    pub reason: String,
}

/// Where playback is coming from (album, playlist, artist, show).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub href: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub uri: String,
}

/// Offset-based page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    pub next: Option<String>,
    pub offset: u32,
    pub previous: Option<String>,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Cursor-based page (recently played, followed artists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub href: String,
    pub items: Vec<T>,
    pub limit: u32,
    pub next: Option<String>,
    pub cursors: Option<Cursors>,
    pub total: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_decodes_with_nulls() {
        let page: Page<String> = serde_json::from_value(serde_json::json!({
            "href": "https://api.spotify.com/v1/me/tracks?offset=0&limit=2",
            "items": ["a", "b"],
            "limit": 2,
            "next": null,
            "offset": 0,
            "previous": null,
            "total": 2
        }))
        .unwrap();
        assert_eq!(page.items, vec!["a", "b"]);
        assert!(page.next.is_none());
    }

    #[test]
    fn context_reads_type_field() {
        let context: Context = serde_json::from_value(serde_json::json!({
            "type": "playlist",
            "href": "https://api.spotify.com/v1/playlists/p1",
            "external_urls": {"spotify": "https://open.spotify.com/playlist/p1"},
            "uri": "spotify:playlist:p1"
        }))
        .unwrap();
        assert_eq!(context.object_type, ObjectType::Playlist);
        assert_eq!(context.external_urls["spotify"], "https://open.spotify.com/playlist/p1");
    }

    #[test]
    fn object_type_strings_match_serde() {
        for ty in [ObjectType::Album, ObjectType::Track, ObjectType::Episode, ObjectType::User] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }
}
