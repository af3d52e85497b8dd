//! User profiles

use spotify_dispatch::{RequestSpec, Result};
use transport::StatusCode;

use crate::client::Spotify;
use crate::models::{CurrentUser, PublicUser};

impl Spotify {
    /// Profile of the authorizing user. `email`, `country` and `product`
    /// are only present with the matching read scopes.
    pub async fn current_user(&self) -> Result<CurrentUser> {
        self.dispatcher().execute_json(RequestSpec::get("me")).await
    }

    /// Public profile of any user, or `None` when the id does not resolve.
    pub async fn user(&self, user_id: &str) -> Result<Option<PublicUser>> {
        let spec = RequestSpec::get(format!("users/{user_id}"));
        if self.dispatcher().execute_status(spec.clone()).await? != StatusCode::OK {
            return Ok(None);
        }
        self.dispatcher().execute_json(spec).await.map(Some)
    }
}
