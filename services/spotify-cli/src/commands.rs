//! Command-line definition and command implementations
//!
//! Commands return their output as text; `main` decides where it goes.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use spotify_api::models::{CurrentPlayback, CurrentUser, Device, ObjectType, Track};
use spotify_api::{SearchOptions, SearchQuery, Spotify, SpotifyBuilder};
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use transport::Transport;

use crate::callback::CallbackListener;
use crate::config::Config;

const SEARCH_LIMIT: u32 = 10;

#[derive(Parser, Debug)]
#[command(name = "spotify-cli", version, about = "Spotify Web API client")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,
    /// Print the Prometheus rendering of client metrics to stderr on exit
    #[arg(long)]
    pub metrics: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the consent flow and print a refresh token
    Authorize,
    /// Show the current playback
    NowPlaying,
    /// List available devices
    Devices,
    /// Show the current user's profile
    Profile,
    /// Search tracks
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

fn builder(config: &Config, transport: Arc<dyn Transport>) -> Result<SpotifyBuilder> {
    let secret = config
        .spotify
        .client_secret
        .as_ref()
        .context("client secret missing: set SPOTIFY_CLIENT_SECRET or client_secret_file")?;
    Ok(SpotifyBuilder::new(
        config.spotify.client_id.clone(),
        secret.expose().clone(),
        config.spotify.redirect_uri.clone(),
        transport,
    )
    .with_api_base_url(config.http.api_base_url.clone())
    .with_token_endpoint(config.http.token_endpoint.clone())
    .with_authorize_endpoint(config.http.authorize_endpoint.clone()))
}

/// Client resumed from the configured refresh token.
pub async fn connect(config: &Config, transport: Arc<dyn Transport>) -> Result<Spotify> {
    let refresh_token = config.spotify.refresh_token.as_ref().context(
        "no refresh token: run `spotify-cli authorize` and set SPOTIFY_REFRESH_TOKEN or refresh_token_file",
    )?;
    builder(config, transport)?
        .from_refresh_token(refresh_token.expose().clone())
        .await
        .context("failed to obtain an access token")
}

/// Consent flow. `on_ready` receives the authorization URL and the bound
/// callback address once the listener is up.
pub async fn authorize(
    config: &Config,
    transport: Arc<dyn Transport>,
    on_ready: impl FnOnce(&str, SocketAddr),
) -> Result<String> {
    let builder = builder(config, transport)?;
    let url = builder.authorization_url(&config.spotify.scopes)?;
    let listener = CallbackListener::bind(builder.redirect_uri()).await?;
    on_ready(&url, listener.local_addr()?);

    let timeout = Duration::from_secs(config.http.callback_timeout_secs);
    let code = listener.wait_for_code(builder.state(), timeout).await?;
    let spotify = builder
        .build(&code)
        .await
        .context("authorization code exchange failed")?;

    let credential = spotify.credential().await;
    let refresh_token = credential
        .refresh_token
        .as_ref()
        .context("token endpoint returned no refresh token")?;
    info!("authorization complete");

    let mut scopes: Vec<_> = credential
        .scopes
        .iter()
        .flatten()
        .map(|s| s.as_str())
        .collect();
    scopes.sort_unstable();
    Ok(format!(
        "refresh token: {}\ngranted scopes: {}",
        refresh_token.expose(),
        scopes.join(" ")
    ))
}

/// Run one of the read commands against a connected client.
pub async fn run(spotify: &Spotify, command: &Command, config: &Config) -> Result<String> {
    let market = config.spotify.market.as_deref();
    match command {
        Command::Authorize => bail!("authorize does not run against a connected client"),
        Command::NowPlaying => Ok(match spotify.current_playback(market).await? {
            Some(playback) => format_playback(&playback),
            None => "nothing playing".to_string(),
        }),
        Command::Devices => {
            let devices = spotify.available_devices().await?;
            if devices.is_empty() {
                return Ok("no devices available".to_string());
            }
            Ok(devices
                .iter()
                .map(format_device)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Profile => Ok(format_profile(&spotify.current_user().await?)),
        Command::Search { terms } => {
            let query = terms
                .iter()
                .fold(SearchQuery::new(), |query, term| query.keyword(term.as_str()));
            let options = SearchOptions {
                limit: SEARCH_LIMIT,
                market: config.spotify.market.clone(),
                ..SearchOptions::default()
            };
            let result = spotify
                .search(&query, &[ObjectType::Track], &options)
                .await?;
            let tracks = result.tracks.map(|page| page.items).unwrap_or_default();
            if tracks.is_empty() {
                return Ok("no tracks found".to_string());
            }
            Ok(tracks
                .iter()
                .map(|track| format!("{}  {}", format_track(track), track.uri))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn format_track(track: &Track) -> String {
    let artists: Vec<_> = track.artists.iter().map(|a| a.name.as_str()).collect();
    if artists.is_empty() {
        track.name.clone()
    } else {
        format!("{} - {}", artists.join(", "), track.name)
    }
}

fn format_playback(playback: &CurrentPlayback) -> String {
    let state = if playback.is_playing() { "playing" } else { "paused" };
    let (title, duration_ms) = match (playback.track(), playback.episode()) {
        (Some(track), _) => (format_track(track), Some(track.duration_ms)),
        (None, Some(episode)) => {
            let title = match &episode.show {
                Some(show) => format!("{} - {}", show.name, episode.name),
                None => episode.name.clone(),
            };
            (title, Some(episode.duration_ms))
        }
        (None, None) => ("unknown item".to_string(), None),
    };

    let mut out = format!("{state}: {title}");
    if let (Some(progress), Some(duration)) = (playback.progress_ms(), duration_ms) {
        let _ = write!(out, " [{}/{}]", format_duration(progress), format_duration(duration));
    }
    if let Some(device) = playback.device() {
        let _ = write!(out, " on {}", device.name);
    }
    out
}

fn format_device(device: &Device) -> String {
    let marker = if device.is_active { "*" } else { " " };
    let mut line = format!("{marker} {} ({})", device.name, device.device_type);
    if let Some(volume) = device.volume_percent {
        let _ = write!(line, " volume {volume}%");
    }
    if let Some(id) = &device.id {
        let _ = write!(line, " id={id}");
    }
    line
}

fn format_profile(user: &CurrentUser) -> String {
    let mut out = user.display_name.clone().unwrap_or_else(|| user.id.clone());
    if let Some(product) = &user.product {
        let _ = write!(out, " ({product})");
    }
    if let Some(country) = &user.country {
        let _ = write!(out, " {country}");
    }
    if let Some(followers) = &user.followers {
        let _ = write!(out, ", {} followers", followers.total);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, SpotifyConfig};
    use common::Secret;
    use spotify_api::Scope;
    use transport::{ApiRequest, Method, MockTransport, ReqwestTransport, RequestBody, Url};

    fn args(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("spotify-cli").chain(list.iter().copied()))
    }

    fn config(redirect_uri: &str) -> Config {
        Config {
            spotify: SpotifyConfig {
                client_id: "client-id".into(),
                client_secret: Some(Secret::new("client-secret".to_string())),
                client_secret_file: None,
                refresh_token: Some(Secret::new("rt_stored".to_string())),
                refresh_token_file: None,
                redirect_uri: redirect_uri.into(),
                scopes: vec![Scope::UserReadPlaybackState, Scope::UserReadPrivate],
                market: Some("DE".into()),
            },
            http: HttpConfig {
                api_base_url: "https://api.example.test/v1/".into(),
                token_endpoint: "https://accounts.example.test/api/token".into(),
                authorize_endpoint: "https://accounts.example.test/authorize".into(),
                callback_timeout_secs: 10,
                ..HttpConfig::default()
            },
        }
    }

    fn token_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "at_1",
            "token_type": "Bearer",
            "scope": "user-read-playback-state user-read-private",
            "expires_in": 3600,
            "refresh_token": "rt_new"
        })
    }

    fn track(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": "One More Time",
            "type": "track",
            "artists": [{"id": "a1", "name": "Daft Punk"}],
            "disc_number": 1,
            "duration_ms": 320_357,
            "explicit": false,
            "track_number": 1,
            "uri": format!("spotify:track:{id}")
        })
    }

    #[test]
    fn parses_flags_and_command() {
        let cli = args(&["--config", "/etc/spotify.toml", "--metrics", "devices"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/etc/spotify.toml"));
        assert!(cli.metrics);
        assert_eq!(cli.command, Command::Devices);

        let cli = args(&["now-playing"]).unwrap();
        assert_eq!(cli.command, Command::NowPlaying);
        assert!(!cli.metrics);
    }

    #[test]
    fn search_collects_terms() {
        let cli = args(&["search", "daft", "punk"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Search {
                terms: vec!["daft".into(), "punk".into()]
            }
        );
        assert!(args(&["search"]).is_err());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["--config"]).is_err());
        assert!(args(&["play"]).is_err());
        assert!(args(&["profile", "extra"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(61_999), "1:01");
        assert_eq!(format_duration(320_357), "5:20");
    }

    #[tokio::test]
    async fn connect_requires_refresh_token() {
        let mut config = config("http://127.0.0.1:0/callback");
        config.spotify.refresh_token = None;
        let err = connect(&config, Arc::new(MockTransport::new())).await.err().unwrap();
        assert!(err.to_string().contains("no refresh token"), "got: {err}");
    }

    #[tokio::test]
    async fn now_playing_formats_track() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, token_body());
        let playback = serde_json::json!({
            "timestamp": 0,
            "progress_ms": 65_000,
            "is_playing": true,
            "currently_playing_type": "track",
            "device": {"id": "d1", "is_active": true, "name": "Desk", "type": "Computer", "volume_percent": 40},
            "item": track("t1")
        });
        mock.push_json(200, playback.clone());
        mock.push_json(200, playback);

        let config = config("http://127.0.0.1:0/callback");
        let spotify = connect(&config, mock.clone()).await.unwrap();
        let out = run(&spotify, &Command::NowPlaying, &config).await.unwrap();
        assert_eq!(out, "playing: Daft Punk - One More Time [1:05/5:20] on Desk");

        let requests = mock.requests();
        assert_eq!(requests[1].query_value("market"), Some("DE"));
    }

    #[tokio::test]
    async fn now_playing_when_idle() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, token_body());
        mock.push(transport::ApiResponse::new(transport::StatusCode::NO_CONTENT, ""));

        let config = config("http://127.0.0.1:0/callback");
        let spotify = connect(&config, mock.clone()).await.unwrap();
        let out = run(&spotify, &Command::NowPlaying, &config).await.unwrap();
        assert_eq!(out, "nothing playing");
    }

    #[tokio::test]
    async fn devices_and_search_output() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, token_body());
        mock.push_json(
            200,
            serde_json::json!({"devices": [
                {"id": "d1", "is_active": true, "name": "Desk", "type": "Computer", "volume_percent": 40},
                {"id": null, "is_active": false, "name": "Radio", "type": "Speaker", "volume_percent": null}
            ]}),
        );
        mock.push_json(
            200,
            serde_json::json!({"tracks": {
                "href": "https://api.spotify.com/v1/search",
                "items": [track("t1")],
                "limit": 10, "next": null, "offset": 0, "previous": null, "total": 1
            }}),
        );

        let config = config("http://127.0.0.1:0/callback");
        let spotify = connect(&config, mock.clone()).await.unwrap();

        let out = run(&spotify, &Command::Devices, &config).await.unwrap();
        assert_eq!(out, "* Desk (Computer) volume 40% id=d1\n  Radio (Speaker)");

        let search = Command::Search {
            terms: vec!["one".into(), "more".into()],
        };
        let out = run(&spotify, &search, &config).await.unwrap();
        assert_eq!(out, "Daft Punk - One More Time  spotify:track:t1");
        let sent = &mock.requests()[2];
        assert_eq!(sent.query_value("q"), Some("one more"));
        assert_eq!(sent.query_value("type"), Some("track"));
        assert_eq!(sent.query_value("limit"), Some("10"));
    }

    #[tokio::test]
    async fn profile_output() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, token_body());
        mock.push_json(
            200,
            serde_json::json!({
                "id": "u1",
                "display_name": "Ada",
                "country": "DE",
                "product": "premium",
                "followers": {"href": null, "total": 7},
                "href": "https://api.spotify.com/v1/users/u1",
                "uri": "spotify:user:u1"
            }),
        );
        let config = config("http://127.0.0.1:0/callback");
        let spotify = connect(&config, mock.clone()).await.unwrap();
        let out = run(&spotify, &Command::Profile, &config).await.unwrap();
        assert_eq!(out, "Ada (premium) DE, 7 followers");
    }

    #[tokio::test]
    async fn authorize_round_trip() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, token_body());
        let config = config("http://127.0.0.1:0/callback");

        let out = authorize(&config, mock.clone(), |url, addr| {
            let state = Url::parse(url)
                .unwrap()
                .query_pairs()
                .find(|(k, _)| k == "state")
                .map(|(_, v)| v.into_owned())
                .unwrap();
            tokio::spawn(async move {
                let transport = ReqwestTransport::with_timeout(Duration::from_secs(5)).unwrap();
                let request = ApiRequest::new(Method::GET, format!("http://{addr}/callback"))
                    .query("code", "code_1")
                    .query("state", state);
                transport.send(request).await.unwrap();
            });
        })
        .await
        .unwrap();

        assert_eq!(
            out,
            "refresh token: rt_new\ngranted scopes: user-read-playback-state user-read-private"
        );
        match &mock.requests()[0].body {
            RequestBody::Form(pairs) => {
                assert!(pairs.contains(&("code".to_string(), "code_1".to_string())));
                assert!(pairs.contains(&("grant_type".to_string(), "authorization_code".to_string())));
            }
            other => panic!("expected form body, got {other:?}"),
        }
    }
}
