//! Playlists

use spotify_dispatch::{RequestSpec, Result};

use crate::client::Spotify;
use crate::models::{Page, Playlist, PlaylistItem};

impl Spotify {
    /// A playlist with its first page of entries.
    pub async fn playlist(&self, playlist_id: &str, market: Option<&str>) -> Result<Playlist> {
        let spec = RequestSpec::get(format!("playlists/{playlist_id}"))
            .query_opt("market", market)
            .query("additional_types", "track,episode");
        self.dispatcher().execute_json(spec).await
    }

    /// One page of playlist entries. `limit` is only sent within 1..=100.
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<Page<PlaylistItem>> {
        let spec = RequestSpec::get(format!("playlists/{playlist_id}/tracks"))
            .query_opt("limit", limit.filter(|l| (1..=100).contains(l)))
            .query_opt("offset", offset)
            .query_opt("market", market)
            .query("additional_types", "track,episode");
        self.dispatcher().execute_json(spec).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::client;
    use crate::models::PlayableItem;
    use crate::models::episode::fixtures::episode_json;
    use crate::models::track::fixtures::track_json;

    #[tokio::test]
    async fn playlist_with_mixed_entries() {
        let (spotify, mock) = client(&[]);
        mock.push_json(
            200,
            serde_json::json!({
                "id": "p1",
                "name": "Mix",
                "collaborative": false,
                "description": null,
                "href": "https://api.spotify.com/v1/playlists/p1",
                "owner": {
                    "id": "u1",
                    "href": "https://api.spotify.com/v1/users/u1",
                    "uri": "spotify:user:u1"
                },
                "public": true,
                "snapshot_id": "s1",
                "uri": "spotify:playlist:p1",
                "tracks": {
                    "href": "https://api.spotify.com/v1/playlists/p1/tracks",
                    "total": 2,
                    "items": [
                        {"added_at": "2024-01-01T00:00:00Z", "is_local": false, "track": track_json("t1")},
                        {"added_at": "2024-01-02T00:00:00Z", "is_local": false, "track": episode_json("e1")}
                    ]
                }
            }),
        );

        let playlist = spotify.playlist("p1", Some("SE")).await.unwrap();
        let items = &playlist.tracks.unwrap().items;
        assert!(matches!(
            items[0].as_track().unwrap().track,
            Some(PlayableItem::Track(_))
        ));
        assert!(matches!(
            items[1].as_track().unwrap().track,
            Some(PlayableItem::Episode(_))
        ));

        let sent = &mock.requests()[0];
        assert_eq!(sent.url, "https://api.example.test/v1/playlists/p1");
        assert_eq!(sent.query_value("market"), Some("SE"));
    }

    #[tokio::test]
    async fn playlist_items_page() {
        let (spotify, mock) = client(&[]);
        mock.push_json(
            200,
            serde_json::json!({
                "href": "https://api.spotify.com/v1/playlists/p1/tracks",
                "items": [{"is_local": false, "track": track_json("t1")}],
                "limit": 100, "next": null, "offset": 0, "previous": null, "total": 1
            }),
        );
        let page = spotify.playlist_items("p1", Some(500), Some(0), None).await.unwrap();
        assert_eq!(page.items.len(), 1);

        let sent = &mock.requests()[0];
        assert_eq!(sent.url, "https://api.example.test/v1/playlists/p1/tracks");
        assert_eq!(sent.query_value("limit"), None);
        assert_eq!(sent.query_value("offset"), Some("0"));
    }
}
