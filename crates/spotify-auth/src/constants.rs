//! Spotify Web API endpoints

/// Base URL for all Web API calls. Endpoint paths are appended verbatim.
pub const API_BASE_URL: &str = "https://api.spotify.com/v1/";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Authorization endpoint the user is sent to for consent
pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

/// Token type assumed when the token endpoint omits one
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";
