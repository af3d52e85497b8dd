//! Web API object model
//!
//! Field names follow the wire format. Objects the API returns in both full
//! and simplified form use `Option` for the fields only the full form has.

/// `Deserialize` through `decode_discriminated` for a `Discriminated` type.
macro_rules! deserialize_discriminated {
    ($ty:ty) => {
        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                spotify_dispatch::decode_discriminated(value).map_err(serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use deserialize_discriminated;

pub mod common;
pub mod episode;
pub mod player;
pub mod playlist;
pub mod search;
pub mod track;
pub mod user;

pub use common::*;
pub use episode::*;
pub use player::*;
pub use playlist::*;
pub use search::*;
pub use track::*;
pub use user::*;
