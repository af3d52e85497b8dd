//! Loopback listener for the authorization-code redirect
//!
//! Binds the host and port of the configured redirect URI, serves exactly one
//! callback and hands the code back once `state` matches.

use anyhow::{Context, Result, bail};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};
use transport::Url;

/// Query parameters of the consent redirect.
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

type Outcome = std::result::Result<String, String>;

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    outcome: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    /// Bind to the redirect URI's host and port. Port 0 picks a free port.
    pub async fn bind(redirect_uri: &str) -> Result<Self> {
        let url = Url::parse(redirect_uri)
            .with_context(|| format!("invalid redirect_uri {redirect_uri}"))?;
        let host = url
            .host_str()
            .with_context(|| format!("redirect_uri {redirect_uri} has no host"))?;
        let port = url.port_or_known_default().unwrap_or(80);
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let host = if host == "localhost" { "127.0.0.1" } else { host };

        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("failed to bind callback listener on {host}:{port}"))?;
        Ok(Self {
            listener,
            path: url.path().to_string(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until one callback arrives or `timeout` elapses.
    pub async fn wait_for_code(self, expected_state: &str, timeout: Duration) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let state = CallbackState {
            expected_state: Arc::from(expected_state),
            outcome: Arc::new(Mutex::new(Some(tx))),
        };
        let app = Router::new()
            .route(&self.path, get(callback_handler))
            .with_state(state);

        let addr = self.local_addr()?;
        info!(%addr, path = %self.path, "waiting for authorization callback");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = tokio::time::timeout(timeout, rx).await;
        let _ = shutdown_tx.send(());
        let _ = tokio::time::timeout(Duration::from_secs(5), server).await;

        match outcome {
            Err(_) => bail!("no authorization callback within {}s", timeout.as_secs()),
            Ok(Err(_)) => bail!("callback listener stopped before a callback arrived"),
            Ok(Ok(Err(reason))) => bail!("authorization failed: {reason}"),
            Ok(Ok(Ok(code))) => Ok(code),
        }
    }
}

async fn callback_handler(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    let outcome = if params.state.as_deref() != Some(&*state.expected_state) {
        warn!("callback state mismatch");
        Err("state mismatch".to_string())
    } else if let Some(error) = params.error {
        Err(error)
    } else if let Some(code) = params.code {
        Ok(code)
    } else {
        Err("callback carried neither code nor error".to_string())
    };

    let reply = match &outcome {
        Ok(_) => (StatusCode::OK, "Authorization complete. You can close this tab."),
        Err(_) => (StatusCode::BAD_REQUEST, "Authorization failed. Check the terminal."),
    };

    let sender = state
        .outcome
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    match sender {
        Some(sender) => {
            let _ = sender.send(outcome);
        }
        None => warn!("duplicate authorization callback ignored"),
    }
    reply
}
