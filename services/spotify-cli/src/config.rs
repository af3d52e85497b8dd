//! Configuration types and loading
//!
//! Precedence: CLI args > env vars > config file > defaults. The client
//! secret and the refresh token come from `SPOTIFY_CLIENT_SECRET` /
//! `SPOTIFY_REFRESH_TOKEN` or from the `*_file` paths, never from the TOML
//! itself.

use common::Secret;
use serde::Deserialize;
use spotify_auth::{API_BASE_URL, AUTHORIZE_ENDPOINT, Scope, TOKEN_ENDPOINT};
use std::path::{Path, PathBuf};

const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";
const REFRESH_TOKEN_ENV: &str = "SPOTIFY_REFRESH_TOKEN";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Registered application and the grant it asks for
#[derive(Debug, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub refresh_token: Option<Secret<String>>,
    #[serde(default)]
    pub refresh_token_file: Option<PathBuf>,
    /// Must point at a loopback address; `authorize` listens there.
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<Scope>,
    /// ISO 3166-1 alpha-2 code or `from_token`
    #[serde(default)]
    pub market: Option<String>,
}

/// Endpoints and timeouts
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_callback_timeout")]
    pub callback_timeout_secs: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_authorize_endpoint")]
    pub authorize_endpoint: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            callback_timeout_secs: default_callback_timeout(),
            api_base_url: default_api_base_url(),
            token_endpoint: default_token_endpoint(),
            authorize_endpoint: default_authorize_endpoint(),
        }
    }
}

fn default_scopes() -> Vec<Scope> {
    vec![
        Scope::UserReadPrivate,
        Scope::UserReadPlaybackState,
        Scope::UserReadCurrentlyPlaying,
        Scope::UserModifyPlaybackState,
    ]
}

fn default_timeout() -> u64 {
    30
}

fn default_callback_timeout() -> u64 {
    300
}

fn default_api_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_token_endpoint() -> String {
    TOKEN_ENDPOINT.to_string()
}

fn default_authorize_endpoint() -> String {
    AUTHORIZE_ENDPOINT.to_string()
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.spotify.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }
        for (name, url) in [
            ("redirect_uri", &config.spotify.redirect_uri),
            ("api_base_url", &config.http.api_base_url),
            ("token_endpoint", &config.http.token_endpoint),
            ("authorize_endpoint", &config.http.authorize_endpoint),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }
        if config.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if config.http.callback_timeout_secs == 0 {
            return Err(common::Error::Config(
                "callback_timeout_secs must be greater than 0".into(),
            ));
        }

        config.spotify.client_secret = resolve_secret(
            CLIENT_SECRET_ENV,
            config.spotify.client_secret_file.as_deref(),
            "client_secret_file",
        )?;
        config.spotify.refresh_token = resolve_secret(
            REFRESH_TOKEN_ENV,
            config.spotify.refresh_token_file.as_deref(),
            "refresh_token_file",
        )?;

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("spotify-cli.toml")
    }
}

/// Env var first, then file contents. Blank values count as unset.
fn resolve_secret(
    env: &str,
    file: Option<&Path>,
    field: &str,
) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env) {
        let value = value.trim().to_owned();
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    let Some(file) = file else {
        return Ok(None);
    };
    let value = std::fs::read_to_string(file).map_err(|e| {
        common::Error::Config(format!("failed to read {field} {}: {e}", file.display()))
    })?;
    let value = value.trim().to_owned();
    Ok((!value.is_empty()).then(|| Secret::new(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn clear_secrets() {
        unsafe {
            remove_env(CLIENT_SECRET_ENV);
            remove_env(REFRESH_TOKEN_ENV);
        }
    }

    fn valid_toml() -> &'static str {
        r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"
scopes = ["user-read-playback-state", "user-library-read"]
market = "DE"
"#
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("spotify-cli.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_secrets();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let config = Config::load(&path).unwrap();
        assert_eq!(config.spotify.client_id, "abc123");
        assert_eq!(
            config.spotify.scopes,
            vec![Scope::UserReadPlaybackState, Scope::UserLibraryRead]
        );
        assert_eq!(config.spotify.market.as_deref(), Some("DE"));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.api_base_url, "https://api.spotify.com/v1/");
        assert!(config.spotify.client_secret.is_none());
        assert!(config.spotify.refresh_token.is_none());
    }

    #[test]
    fn test_default_scopes() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_secrets();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"
"#,
        );
        let config = Config::load(&path).unwrap();
        assert!(config.spotify.scopes.contains(&Scope::UserReadPlaybackState));
        assert!(config.spotify.market.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/path/spotify-cli.toml"));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }

    #[test]
    fn test_unknown_scope_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"
scopes = ["user-read-everything"]
"#,
        );
        assert!(matches!(Config::load(&path), Err(common::Error::Toml(_))));
    }

    #[test]
    fn test_secrets_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        unsafe {
            set_env(CLIENT_SECRET_ENV, "cs-env");
            set_env(REFRESH_TOKEN_ENV, "rt-env");
        }
        let config = Config::load(&path).unwrap();
        assert_eq!(config.spotify.client_secret.as_ref().unwrap().expose(), "cs-env");
        assert_eq!(config.spotify.refresh_token.as_ref().unwrap().expose(), "rt-env");
        clear_secrets();
    }

    #[test]
    fn test_secrets_from_files() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_secrets();
        let dir = tempfile::tempdir().unwrap();
        let secret_path = dir.path().join("client_secret");
        let token_path = dir.path().join("refresh_token");
        std::fs::write(&secret_path, "cs-file\n").unwrap();
        std::fs::write(&token_path, "  \n").unwrap();

        let path = write_config(
            &dir,
            &format!(
                r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"
client_secret_file = "{}"
refresh_token_file = "{}"
"#,
                secret_path.display(),
                token_path.display()
            ),
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.spotify.client_secret.as_ref().unwrap().expose(), "cs-file");
        assert!(
            config.spotify.refresh_token.is_none(),
            "whitespace-only refresh_token_file should yield no token"
        );
    }

    #[test]
    fn test_env_overrides_missing_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"
client_secret_file = "/nonexistent/client_secret"
"#,
        );

        unsafe { set_env(CLIENT_SECRET_ENV, "cs-env-wins") };
        let config = Config::load(&path).unwrap();
        assert_eq!(config.spotify.client_secret.as_ref().unwrap().expose(), "cs-env-wins");
        clear_secrets();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("client_secret_file"), "got: {err}");
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_secrets();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[spotify]
client_id = "abc123"
redirect_uri = "127.0.0.1:8888/callback"
"#,
        );
        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("redirect_uri must start with http"), "got: {err}");

        let path = write_config(
            &dir,
            r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"

[http]
api_base_url = "api.spotify.com/v1"
"#,
        );
        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("api_base_url"), "got: {err}");
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_secrets();
        let dir = tempfile::tempdir().unwrap();
        for field in ["timeout_secs", "callback_timeout_secs"] {
            let path = write_config(
                &dir,
                &format!(
                    r#"
[spotify]
client_id = "abc123"
redirect_uri = "http://127.0.0.1:8888/callback"

[http]
{field} = 0
"#
                ),
            );
            assert!(
                matches!(Config::load(&path), Err(common::Error::Config(_))),
                "{field} = 0 must be rejected"
            );
        }
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[spotify]
client_id = " "
redirect_uri = "http://127.0.0.1:8888/callback"
"#,
        );
        assert!(matches!(Config::load(&path), Err(common::Error::Config(_))));
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("spotify-cli.toml"));
    }
}
