use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use jiff::Timestamp;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, DEFAULT_TOKEN_URL};
use crate::errors::Error;
use crate::telemetry::refresh::RefreshTelemetry;
use crate::transport::AccessTokenSource;

use super::{AccessTokenState, RefreshPolicy, schedule};

/// Credentials and knobs for keeping an access token fresh.
#[derive(Clone)]
pub struct RefresherConfig {
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub policy: RefreshPolicy,
    pub http_client: Client,
}

impl RefresherConfig {
    pub fn new(
        refresh_token: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            policy: RefreshPolicy::default(),
            http_client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.refresh_token.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
        .with_token_url(config.token_url())
        .with_expiry_delta(config.expiry_delta())
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_expiry_delta(mut self, delta: Duration) -> Self {
        self.policy = RefreshPolicy::new(delta);
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// Body returned by the token issuance endpoint, on success and on error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub error: String,
    pub error_description: String,
}

struct Shared {
    config: RefresherConfig,
    state: watch::Sender<AccessTokenState>,
}

impl Shared {
    fn delay_until_refresh(&self) -> Duration {
        self.config
            .policy
            .delay_until_refresh(&self.state.borrow(), Timestamp::now())
    }

    // Failures are logged and the previous token stays published; the loop tries again
    // on its next wake.
    async fn refresh(&self) {
        let telemetry = RefreshTelemetry::new("token.refresh.background");
        telemetry.emit_start(Timestamp::now());
        match fetch_access_token(&self.config).await {
            Ok(state) => {
                let expires_at = state.expires_at();
                self.state.send_replace(state);
                telemetry.emit_success(expires_at);
            }
            Err(err) => telemetry.emit_failure(&err, Timestamp::now()),
        }
    }
}

/// Owns the current access token and renews it in the background before it expires.
///
/// Construction fetches the first token synchronously. Call [`run_in_background`]
/// once to start renewing, and [`shutdown`] to stop. Token reads keep returning the
/// last published value after the refresher stopped.
///
/// [`run_in_background`]: CredentialRefresher::run_in_background
/// [`shutdown`]: CredentialRefresher::shutdown
pub struct CredentialRefresher {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    started: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CredentialRefresher {
    pub async fn new(config: RefresherConfig) -> Result<Self, Error> {
        let telemetry = RefreshTelemetry::new("token.refresh.initial");
        telemetry.emit_start(Timestamp::now());
        let initial = match fetch_access_token(&config).await {
            Ok(state) => {
                telemetry.emit_success(state.expires_at());
                state
            }
            Err(err) => {
                telemetry.emit_failure(&err, Timestamp::now());
                return Err(Error::Initialization(Box::new(err)));
            }
        };
        let (state, _) = watch::channel(initial);
        Ok(Self {
            shared: Arc::new(Shared { config, state }),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            task: Mutex::new(None),
        })
    }

    /// Spawns the renewal loop on the current tokio runtime. Only one loop per refresher.
    ///
    /// Fails with [`Error::NoRuntime`] when called outside a runtime; the refresher can
    /// still be started later from within one.
    pub fn run_in_background(&self) -> Result<(), Error> {
        let runtime = Handle::try_current()?;
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }

        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        let handle = runtime.spawn(async move {
            let delay_source = Arc::clone(&shared);
            schedule::run_until_cancelled(
                cancel,
                move || delay_source.delay_until_refresh(),
                move || {
                    let shared = Arc::clone(&shared);
                    async move { shared.refresh().await }
                },
            )
            .await;
            info!("Received signal to stop token updates");
        });

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        info!(
            expiry_delta_secs = self.shared.config.policy.expiry_delta.as_secs(),
            "token refresher started"
        );
        Ok(())
    }

    pub fn get_access_token(&self) -> String {
        self.shared.state.borrow().token().to_string()
    }

    /// Token and expiry, read together.
    pub fn current_state(&self) -> AccessTokenState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AccessTokenState> {
        self.shared.state.subscribe()
    }

    /// Signals the loop to stop without waiting for it.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Signals the loop to stop and waits until it has exited.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            warn!("token refresher task ended abnormally: {}", err);
        }
    }
}

impl AccessTokenSource for CredentialRefresher {
    fn access_token(&self) -> String {
        self.get_access_token()
    }
}

impl Drop for CredentialRefresher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// POSTs the refresh grant and turns the answer into a new token state.
pub async fn fetch_access_token(config: &RefresherConfig) -> Result<AccessTokenState, Error> {
    let request = AccessTokenRequest {
        grant_type: "refresh_token",
        refresh_token: &config.refresh_token,
        client_id: &config.client_id,
        client_secret: &config.client_secret,
    };
    let resp = config
        .http_client
        .post(&config.token_url)
        .json(&request)
        .send()
        .await?;
    let status = resp.status();
    let body = resp.bytes().await?;

    let parsed: AccessTokenResponse = serde_json::from_slice(&body).map_err(|_| {
        Error::TokenFetch(format!(
            "RefreshToken response parse failed (status {}). Body: '{}'",
            status,
            String::from_utf8_lossy(&body)
        ))
    })?;

    if parsed.access_token.is_empty() {
        let reason = if !parsed.error_description.is_empty() {
            parsed.error_description
        } else if !parsed.error.is_empty() {
            parsed.error
        } else {
            format!("empty access token (status {})", status)
        };
        return Err(Error::TokenFetch(reason));
    }

    AccessTokenState::issued(parsed.access_token, Timestamp::now(), parsed.expires_in)
}
