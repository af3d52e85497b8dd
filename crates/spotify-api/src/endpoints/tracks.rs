//! Tracks, the saved-tracks library, audio features and recommendations

use spotify_auth::Scope;
use spotify_dispatch::{Error, RequestSpec, Result};

use super::join_ids;
use crate::client::Spotify;
use crate::models::{
    AudioAnalysis, AudioFeatures, Page, Recommendations, SavedTrack, SeveralAudioFeatures,
    SeveralTracks, Track,
};

const MAX_TRACK_IDS: usize = 50;
const MAX_AUDIO_FEATURE_IDS: usize = 100;
const MAX_SEEDS: usize = 5;

/// Audio attributes accepted as `min_`, `max_` and `target_` filters on
/// recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tunable {
    Acousticness,
    Danceability,
    DurationMs,
    Energy,
    Instrumentalness,
    Key,
    Liveness,
    Loudness,
    Mode,
    Popularity,
    Speechiness,
    Tempo,
    TimeSignature,
    Valence,
}

impl Tunable {
    pub fn as_str(self) -> &'static str {
        match self {
            Tunable::Acousticness => "acousticness",
            Tunable::Danceability => "danceability",
            Tunable::DurationMs => "duration_ms",
            Tunable::Energy => "energy",
            Tunable::Instrumentalness => "instrumentalness",
            Tunable::Key => "key",
            Tunable::Liveness => "liveness",
            Tunable::Loudness => "loudness",
            Tunable::Mode => "mode",
            Tunable::Popularity => "popularity",
            Tunable::Speechiness => "speechiness",
            Tunable::Tempo => "tempo",
            Tunable::TimeSignature => "time_signature",
            Tunable::Valence => "valence",
        }
    }
}

/// Parameters for [`Spotify::recommendations`]. Between one and five seeds
/// in total are required.
#[derive(Debug, Clone, Default)]
pub struct RecommendationsRequest {
    seed_artists: Vec<String>,
    seed_genres: Vec<String>,
    seed_tracks: Vec<String>,
    limit: Option<u32>,
    market: Option<String>,
    tunables: Vec<(String, f64)>,
}

impl RecommendationsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_artist(mut self, id: impl Into<String>) -> Self {
        self.seed_artists.push(id.into());
        self
    }

    pub fn seed_genre(mut self, genre: impl Into<String>) -> Self {
        self.seed_genres.push(genre.into());
        self
    }

    pub fn seed_track(mut self, id: impl Into<String>) -> Self {
        self.seed_tracks.push(id.into());
        self
    }

    /// 1..=100; other values leave the server default (20).
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    pub fn min(self, tunable: Tunable, value: f64) -> Self {
        self.tunable("min", tunable, value)
    }

    pub fn max(self, tunable: Tunable, value: f64) -> Self {
        self.tunable("max", tunable, value)
    }

    pub fn target(self, tunable: Tunable, value: f64) -> Self {
        self.tunable("target", tunable, value)
    }

    fn tunable(mut self, prefix: &str, tunable: Tunable, value: f64) -> Self {
        self.tunables
            .push((format!("{prefix}_{}", tunable.as_str()), value));
        self
    }

    fn seed_count(&self) -> usize {
        self.seed_artists.len() + self.seed_genres.len() + self.seed_tracks.len()
    }

    fn to_spec(&self) -> Result<RequestSpec> {
        let seeds = self.seed_count();
        if seeds == 0 || seeds > MAX_SEEDS {
            return Err(Error::invalid_input(
                "seed_artists, seed_genres, seed_tracks",
                format!("between 1 and {MAX_SEEDS} seeds are required, got {seeds}"),
            ));
        }

        let mut spec = RequestSpec::get("recommendations")
            .query_opt("limit", self.limit.filter(|l| (1..=100).contains(l)))
            .query_opt("market", self.market.as_deref());
        for (name, values) in [
            ("seed_artists", &self.seed_artists),
            ("seed_genres", &self.seed_genres),
            ("seed_tracks", &self.seed_tracks),
        ] {
            if !values.is_empty() {
                spec = spec.query(name, values.join(","));
            }
        }
        for (name, value) in &self.tunables {
            spec = spec.query(name, value);
        }
        Ok(spec)
    }
}

impl Spotify {
    pub async fn track(&self, id: &str, market: Option<&str>) -> Result<Track> {
        let spec = RequestSpec::get(format!("tracks/{id}")).query_opt("market", market);
        self.dispatcher().execute_json(spec).await
    }

    /// Up to 50 tracks. Unknown ids come back as `None` in their slot.
    pub async fn tracks(&self, ids: &[&str], market: Option<&str>) -> Result<Vec<Option<Track>>> {
        let spec = RequestSpec::get("tracks")
            .query("ids", join_ids(ids, MAX_TRACK_IDS))
            .query_opt("market", market);
        let several: SeveralTracks = self.dispatcher().execute_json(spec).await?;
        Ok(several.tracks)
    }

    pub async fn saved_tracks(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<Page<SavedTrack>> {
        let spec = RequestSpec::get("me/tracks")
            .scope(Scope::UserLibraryRead)
            .query_opt("limit", limit.filter(|l| (1..=50).contains(l)))
            .query_opt("offset", offset)
            .query_opt("market", market);
        self.dispatcher().execute_json(spec).await
    }

    /// Save tracks to the library. Only the first 50 ids are sent.
    pub async fn save_tracks(&self, ids: &[&str]) -> Result<()> {
        let spec = RequestSpec::put("me/tracks")
            .scope(Scope::UserLibraryModify)
            .query("ids", join_ids(ids, MAX_TRACK_IDS));
        self.dispatcher().execute_empty(spec).await
    }

    /// Remove tracks from the library. Only the first 50 ids are sent.
    pub async fn remove_saved_tracks(&self, ids: &[&str]) -> Result<()> {
        let spec = RequestSpec::delete("me/tracks")
            .scope(Scope::UserLibraryModify)
            .query("ids", join_ids(ids, MAX_TRACK_IDS));
        self.dispatcher().execute_empty(spec).await
    }

    /// One flag per id (first 50), in request order.
    pub async fn saved_tracks_contain(&self, ids: &[&str]) -> Result<Vec<bool>> {
        let spec = RequestSpec::get("me/tracks/contains")
            .scope(Scope::UserLibraryRead)
            .query("ids", join_ids(ids, MAX_TRACK_IDS));
        self.dispatcher().execute_json(spec).await
    }

    pub async fn audio_features(&self, id: &str) -> Result<AudioFeatures> {
        let spec = RequestSpec::get(format!("audio-features/{id}"));
        self.dispatcher().execute_json(spec).await
    }

    /// Features for up to 100 tracks.
    pub async fn several_audio_features(&self, ids: &[&str]) -> Result<Vec<Option<AudioFeatures>>> {
        let spec = RequestSpec::get("audio-features")
            .query("ids", join_ids(ids, MAX_AUDIO_FEATURE_IDS));
        let several: SeveralAudioFeatures = self.dispatcher().execute_json(spec).await?;
        Ok(several.audio_features)
    }

    pub async fn audio_analysis(&self, id: &str) -> Result<AudioAnalysis> {
        let spec = RequestSpec::get(format!("audio-analysis/{id}"));
        self.dispatcher().execute_json(spec).await
    }

    pub async fn recommendations(&self, request: &RecommendationsRequest) -> Result<Recommendations> {
        let spec = request.to_spec()?;
        self.dispatcher().execute_json(spec).await
    }
}
