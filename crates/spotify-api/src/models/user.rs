use serde::{Deserialize, Serialize};

use super::common::{ExternalUrls, Followers, Image};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitContent {
    pub filter_enabled: bool,
    pub filter_locked: bool,
}

/// The authorized user. `country`, `email`, `product` and
/// `explicit_content` depend on granted scopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub explicit_content: Option<ExplicitContent>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub followers: Option<Followers>,
    pub href: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub product: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub followers: Option<Followers>,
    pub href: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub uri: String,
}
