//! Catalog search

use spotify_dispatch::{Error, RequestSpec, Result};

use crate::client::Spotify;
use crate::models::{ObjectType, SearchResult};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 50;
const MAX_OFFSET_WINDOW: u32 = 1000;

/// Builds the `q` parameter from keywords and field filters.
///
/// Parts are emitted in a fixed order: keywords, negated keywords, then
/// `genre:`, `artist:`, `album:`, `track:`, `year:` and the tag filters.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    keywords: Vec<String>,
    not_keywords: Vec<String>,
    genre: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    track: Option<String>,
    years: Option<(u16, u16)>,
    hipster: bool,
    new_releases: bool,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Keyword that must match as a whole phrase.
    pub fn exact(mut self, phrase: impl AsRef<str>) -> Self {
        self.keywords.push(format!("({})", phrase.as_ref()));
        self
    }

    pub fn not_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.not_keywords.push(keyword.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    pub fn year(self, year: u16) -> Self {
        self.years(year, year)
    }

    pub fn years(mut self, from: u16, to: u16) -> Self {
        self.years = Some((from, to));
        self
    }

    /// Only albums in the lowest 10% of popularity.
    pub fn hipster(mut self) -> Self {
        self.hipster = true;
        self
    }

    /// Only albums released in the past two weeks.
    pub fn new_releases(mut self) -> Self {
        self.new_releases = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.build().is_empty()
    }

    pub fn build(&self) -> String {
        let mut parts: Vec<String> = self.keywords.clone();
        parts.extend(self.not_keywords.iter().map(|k| format!("NOT {k}")));
        if let Some(genre) = &self.genre {
            parts.push(format!("genre:\"{genre}\""));
        }
        if let Some(artist) = &self.artist {
            parts.push(format!("artist:{artist}"));
        }
        if let Some(album) = &self.album {
            parts.push(format!("album:{album}"));
        }
        if let Some(track) = &self.track {
            parts.push(format!("track:{track}"));
        }
        match self.years {
            Some((from, to)) if from == to => parts.push(format!("year:{from}")),
            Some((from, to)) => parts.push(format!("year:{from}-{to}")),
            None => {}
        }
        if self.hipster {
            parts.push("tag:hipster".to_string());
        }
        if self.new_releases {
            parts.push("tag:new".to_string());
        }
        parts.join(" ")
    }
}

/// Paging and filtering for [`Spotify::search`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Results per type. Values outside 1..=50 fall back to 20.
    pub limit: u32,
    /// Reset to 0 when `offset + limit` would pass 1000.
    pub offset: u32,
    /// Include externally hosted audio (`include_external=audio`).
    pub include_external: bool,
    pub market: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            include_external: false,
            market: None,
        }
    }
}

impl SearchOptions {
    fn effective_limit(&self) -> u32 {
        if (1..=MAX_LIMIT).contains(&self.limit) {
            self.limit
        } else {
            DEFAULT_LIMIT
        }
    }

    fn effective_offset(&self) -> u32 {
        match self.offset.checked_add(self.effective_limit()) {
            Some(end) if end <= MAX_OFFSET_WINDOW => self.offset,
            _ => 0,
        }
    }
}

impl Spotify {
    /// Search the catalog for `types`. An empty query or type list is
    /// rejected before any request.
    pub async fn search(
        &self,
        query: &SearchQuery,
        types: &[ObjectType],
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        let q = query.build();
        if q.is_empty() {
            return Err(Error::invalid_input("q", "search query is empty"));
        }
        if types.is_empty() {
            return Err(Error::invalid_input("type", "at least one type is required"));
        }
        let types = types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let spec = RequestSpec::get("search")
            .query("q", q)
            .query("type", types)
            .query("limit", options.effective_limit())
            .query("offset", options.effective_offset())
            .query_opt("include_external", options.include_external.then_some("audio"))
            .query_opt("market", options.market.as_deref());
        self.dispatcher().execute_json(spec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client;
    use crate::models::track::fixtures::track_json;

    #[test]
    fn query_parts_are_ordered() {
        let q = SearchQuery::new()
            .keyword("daft")
            .exact("get lucky")
            .not_keyword("remix")
            .genre("french house")
            .artist("Daft Punk")
            .album("Discovery")
            .track("Aerodynamic")
            .years(1999, 2001)
            .hipster()
            .new_releases()
            .build();
        assert_eq!(
            q,
            "daft (get lucky) NOT remix genre:\"french house\" artist:Daft Punk album:Discovery \
             track:Aerodynamic year:1999-2001 tag:hipster tag:new"
        );
    }

    #[test]
    fn single_year() {
        assert_eq!(SearchQuery::new().year(2001).build(), "year:2001");
        assert!(SearchQuery::new().is_empty());
    }

    #[test]
    fn limit_falls_back_to_default() {
        let mut options = SearchOptions::default();
        for limit in [0, 51, 500] {
            options.limit = limit;
            assert_eq!(options.effective_limit(), 20);
        }
        options.limit = 50;
        assert_eq!(options.effective_limit(), 50);
    }

    #[test]
    fn offset_resets_past_window() {
        let options = SearchOptions {
            limit: 50,
            offset: 950,
            ..SearchOptions::default()
        };
        assert_eq!(options.effective_offset(), 950);

        let options = SearchOptions {
            limit: 50,
            offset: 951,
            ..SearchOptions::default()
        };
        assert_eq!(options.effective_offset(), 0);

        let options = SearchOptions {
            offset: u32::MAX,
            ..SearchOptions::default()
        };
        assert_eq!(options.effective_offset(), 0);
    }

    #[tokio::test]
    async fn search_sends_parameters() {
        let (spotify, mock) = client(&[]);
        mock.push_json(
            200,
            serde_json::json!({"tracks": {
                "href": "https://api.spotify.com/v1/search",
                "items": [track_json("t1")],
                "limit": 5, "next": null, "offset": 0, "previous": null, "total": 1
            }}),
        );

        let options = SearchOptions {
            limit: 5,
            offset: 10,
            include_external: true,
            market: Some("from_token".into()),
        };
        let result = spotify
            .search(
                &SearchQuery::new().artist("Justice"),
                &[ObjectType::Track, ObjectType::Album],
                &options,
            )
            .await
            .unwrap();
        assert_eq!(result.tracks.unwrap().items[0].id.as_deref(), Some("t1"));
        assert!(result.albums.is_none());

        let sent = &mock.requests()[0];
        assert_eq!(sent.url, "https://api.example.test/v1/search");
        assert_eq!(sent.query_value("q"), Some("artist:Justice"));
        assert_eq!(sent.query_value("type"), Some("track,album"));
        assert_eq!(sent.query_value("limit"), Some("5"));
        assert_eq!(sent.query_value("offset"), Some("10"));
        assert_eq!(sent.query_value("include_external"), Some("audio"));
        assert_eq!(sent.query_value("market"), Some("from_token"));
    }

    #[tokio::test]
    async fn empty_search_is_rejected_locally() {
        let (spotify, mock) = client(&[]);
        let options = SearchOptions::default();

        let err = spotify.search(&SearchQuery::new(), &[ObjectType::Track], &options).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        let err = spotify.search(&SearchQuery::new().keyword("x"), &[], &options).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert_eq!(mock.request_count(), 0);
    }
}
