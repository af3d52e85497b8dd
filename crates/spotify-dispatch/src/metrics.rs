//! Dispatcher metrics
//!
//! - `spotify_requests_total` (counter): labels `method`, `status`
//! - `spotify_rate_limited_total` (counter): label `source` (`upstream` for a
//!   429 response, `gate` for a call refused locally)
//! - `spotify_token_refresh_total` (counter): label `outcome`
//!
//! Without an installed recorder these are no-ops.

pub fn record_request(method: &str, status: u16) {
    metrics::counter!(
        "spotify_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_rate_limited(source: &'static str) {
    metrics::counter!("spotify_rate_limited_total", "source" => source).increment(1);
}

pub fn record_token_refresh(outcome: &'static str) {
    metrics::counter!("spotify_token_refresh_total", "outcome" => outcome).increment(1);
}
