//! Player endpoints
//!
//! Playback commands return the response status as-is (204 on success, 404
//! for an unknown device, 403 for non-premium accounts) instead of turning it
//! into an error. Reads that have nothing to report return `Ok(None)`.

use spotify_auth::Scope;
use spotify_dispatch::{Error, RequestSpec, Result};
use transport::StatusCode;

use crate::client::Spotify;
use crate::models::{CurrentPlayback, Device, Devices, PlayRequest, RecentlyPlayed, RepeatState};

const ADDITIONAL_TYPES: &str = "track,episode";

fn command(spec: RequestSpec, device_id: Option<&str>) -> RequestSpec {
    spec.scope(Scope::UserModifyPlaybackState)
        .query_opt("device_id", device_id)
}

impl Spotify {
    /// Full playback state, or `None` when nothing is active.
    ///
    /// Checks the endpoint status first; any status other than 200 (204 when no
    /// device is active) means there is nothing to decode.
    pub async fn current_playback(&self, market: Option<&str>) -> Result<Option<CurrentPlayback>> {
        let spec = RequestSpec::get("me/player")
            .scope(Scope::UserReadPlaybackState)
            .query_opt("market", market)
            .query("additional_types", ADDITIONAL_TYPES);

        if self.dispatcher().execute_status(spec.clone()).await? != StatusCode::OK {
            return Ok(None);
        }
        self.dispatcher().execute_if_present(spec, "is_playing").await
    }

    /// The item currently playing. Without `user-read-currently-playing`
    /// this reports `None` rather than failing.
    pub async fn currently_playing(&self, market: Option<&str>) -> Result<Option<CurrentPlayback>> {
        let spec = RequestSpec::get("me/player/currently-playing")
            .scope(Scope::UserReadCurrentlyPlaying)
            .absent_without_scope()
            .query_opt("market", market)
            .query("additional_types", ADDITIONAL_TYPES);
        self.dispatcher().execute_if_present(spec, "is_playing").await
    }

    pub async fn available_devices(&self) -> Result<Vec<Device>> {
        let spec = RequestSpec::get("me/player/devices").scope(Scope::UserReadPlaybackState);
        let devices: Devices = self.dispatcher().execute_json(spec).await?;
        Ok(devices.devices)
    }

    /// Move playback to `device_id`. With `play` unset the current
    /// play/pause state is kept.
    pub async fn transfer_playback(&self, device_id: &str, play: Option<bool>) -> Result<StatusCode> {
        let mut body = serde_json::json!({ "device_ids": [device_id] });
        if let Some(play) = play {
            body["play"] = serde_json::Value::Bool(play);
        }
        let spec = command(RequestSpec::put("me/player"), None).json(body);
        self.dispatcher().execute_status(spec).await
    }

    /// Start a new context or resume the current one.
    pub async fn start_playback(&self, request: &PlayRequest, device_id: Option<&str>) -> Result<StatusCode> {
        let body = serde_json::to_value(request).map_err(|e| Error::invalid_input("request", e.to_string()))?;
        let spec = command(RequestSpec::put("me/player/play"), device_id).json(body);
        self.dispatcher().execute_status(spec).await
    }

    pub async fn pause_playback(&self, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::put("me/player/pause"), device_id);
        self.dispatcher().execute_status(spec).await
    }

    pub async fn skip_to_next(&self, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::post("me/player/next"), device_id);
        self.dispatcher().execute_status(spec).await
    }

    pub async fn skip_to_previous(&self, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::post("me/player/previous"), device_id);
        self.dispatcher().execute_status(spec).await
    }

    /// Seek within the current item. Positions past the end skip to the
    /// next item.
    pub async fn seek_to_position(&self, position_ms: u64, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::put("me/player/seek"), device_id).query("position_ms", position_ms);
        self.dispatcher().execute_status(spec).await
    }

    pub async fn set_repeat_mode(&self, state: RepeatState, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::put("me/player/repeat"), device_id).query("state", state);
        self.dispatcher().execute_status(spec).await
    }

    /// Set the volume. Values above 100 are rejected before any request.
    pub async fn set_volume(&self, volume_percent: u8, device_id: Option<&str>) -> Result<StatusCode> {
        if volume_percent > 100 {
            return Err(Error::invalid_input(
                "volume_percent",
                format!("{volume_percent} is outside 0..=100"),
            ));
        }
        let spec = command(RequestSpec::put("me/player/volume"), device_id)
            .query("volume_percent", volume_percent);
        self.dispatcher().execute_status(spec).await
    }

    pub async fn set_shuffle(&self, state: bool, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::put("me/player/shuffle"), device_id).query("state", state);
        self.dispatcher().execute_status(spec).await
    }

    /// Append a track or episode URI to the queue.
    pub async fn add_to_queue(&self, uri: &str, device_id: Option<&str>) -> Result<StatusCode> {
        let spec = command(RequestSpec::post("me/player/queue"), device_id).query("uri", uri);
        self.dispatcher().execute_status(spec).await
    }

    /// Recently played tracks around a unix-millisecond cursor.
    ///
    /// Exactly one of `after` and `before` selects the window; with neither
    /// there is nothing to ask for and the result is `None`. `limit` is only
    /// sent within 1..=50. A non-200 status check (e.g. private session) is `None`.
    pub async fn recently_played(
        &self,
        limit: Option<u32>,
        after: Option<u64>,
        before: Option<u64>,
    ) -> Result<Option<RecentlyPlayed>> {
        if after.is_some() && before.is_some() {
            return Err(Error::invalid_input("after, before", "only one cursor may be given"));
        }
        if after.is_none() && before.is_none() {
            return Ok(None);
        }
        let spec = RequestSpec::get("me/player/recently-played")
            .scope(Scope::UserReadRecentlyPlayed)
            .query_opt("limit", limit.filter(|l| (1..=50).contains(l)))
            .query_opt("after", after)
            .query_opt("before", before);

        if self.dispatcher().execute_status(spec.clone()).await? != StatusCode::OK {
            return Ok(None);
        }
        self.dispatcher().execute_json(spec).await.map(Some)
    }
}
