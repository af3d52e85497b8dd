//! Typed Spotify Web API client
//!
//! [`SpotifyBuilder`] handles the authorization-code bootstrap and yields a
//! [`Spotify`] client. Endpoint groups (player, tracks and library, search,
//! users, playlists) are methods on [`Spotify`]; every call goes through the
//! authenticated dispatcher, so rate limiting, scope checks and token refresh
//! apply uniformly.

pub mod client;
pub mod endpoints;
pub mod models;

pub use client::{Spotify, SpotifyBuilder};
pub use endpoints::search::{SearchOptions, SearchQuery};
pub use endpoints::tracks::{RecommendationsRequest, Tunable};
pub use spotify_auth::{ClientIdentity, Credential, Scope};
pub use spotify_dispatch::{Error, Result};
