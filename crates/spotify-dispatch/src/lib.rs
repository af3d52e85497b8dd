//! Authenticated request dispatcher
//!
//! Every Web API call goes through [`Dispatcher`], which in order:
//! - short-circuits while the server-driven rate-limit window is open
//! - refuses requests whose required scope was not granted
//! - refreshes the access token when it has expired
//! - attaches the `Authorization` header and issues the call
//! - classifies the response into a body or a typed [`Error`]
//!
//! The response decoders in [`decode`] handle optional and polymorphic
//! payloads on top of the classified body.

pub mod classify;
pub mod decode;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod rate_limit;
pub mod request;

pub use decode::{Discriminated, decode_discriminated, decode_if_present};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use rate_limit::RateLimitGate;
pub use request::{OnMissingScope, RequestSpec};
