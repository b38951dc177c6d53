//! Token guard: every outbound REST call goes through [`TokenGuard::execute`].
//!
//! ## Refresh protocol
//!
//! 1. Attach `Authorization: Bearer <accessToken>`; without a token, fail fast
//!    with [`ApiError::Unauthenticated`] and make no call.
//! 2. On a 401, join (or start) the single in-flight refresh.
//! 3. On success, re-read the token from the store and resend once. A second
//!    401 is final.
//! 4. On failure, the store is cleared and [`AuthEvent::LoggedOut`] is emitted
//!    once for the whole refresh, no matter how many callers were waiting.
//!
//! ## Single flight
//!
//! The refresh runs in its own task and is shared with `futures_util`'s
//! `Shared`, so waiters that go away never cancel it. The pending slot is
//! released by that task when it finishes, so a later 401 starts a new refresh.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, mpsc};

use barcart_shared::protocol::{RefreshRequest, TokenResponse};

use crate::{
    config::{ClientConfig, DEFAULT_REFRESH_PATH},
    credential::{CredentialStore, CredentialUpdate},
    error::{ApiError, RefreshError},
    http::{ApiRequest, ApiResponse, HttpTransport},
};

/// Why the session returned to the guest state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The refresh endpoint rejected the refresh token, errored or timed out
    RefreshFailed,
    /// Explicit logout
    UserRequested,
}

/// Authentication events delivered to the composition root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A new access token was stored
    Refreshed,
    /// The credential store was cleared
    LoggedOut(LogoutReason),
}

/// Refresh settings
#[derive(Debug, Clone)]
pub struct GuardOptions {
    pub refresh_path: String,
    pub refresh_timeout: Duration,
    pub events: Option<mpsc::UnboundedSender<AuthEvent>>,
}

impl GuardOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            refresh_path: config.refresh_path.clone(),
            refresh_timeout: config.refresh_timeout,
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<AuthEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_timeout: Duration::from_secs(5),
            events: None,
        }
    }
}

type RefreshOutcome = Shared<BoxFuture<'static, bool>>;

struct PendingRefresh {
    generation: u64,
    outcome: RefreshOutcome,
}

struct GuardInner {
    credentials: CredentialStore,
    transport: Arc<dyn HttpTransport>,
    options: GuardOptions,
    /// Single-flight lock: `Some` while a refresh is in flight
    pending: Mutex<Option<PendingRefresh>>,
    generation: AtomicU64,
}

/// Cloneable handle wrapping the raw transport
#[derive(Clone)]
pub struct TokenGuard {
    inner: Arc<GuardInner>,
}

impl TokenGuard {
    pub fn new(
        credentials: CredentialStore,
        transport: Arc<dyn HttpTransport>,
        options: GuardOptions,
    ) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                credentials,
                transport,
                options,
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// Raw transport, for calls that must not carry a bearer token (login)
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.inner.transport)
    }

    /// Send `request` as if the caller always held a valid access token.
    ///
    /// Non-401 responses, success or not, are returned unmodified.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthenticated`] when no access token is stored
    /// - [`ApiError::Unauthorized`] when the refresh failed or the single retry
    ///   was rejected again
    /// - [`ApiError::Transport`] on network failure
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let Some(token) = self.inner.credentials.access_token() else {
            tracing::debug!("{} {} skipped: not authenticated", request.method, request.path);
            return Err(ApiError::Unauthenticated);
        };

        let response = self
            .inner
            .transport
            .send(request.with_bearer(Some(token.clone())))
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        // From here on the request counts as retried.
        tracing::debug!("{} {} returned 401", request.method, request.path);
        let refreshed = match self.inner.credentials.access_token() {
            None => false,
            // Another caller already rotated the token while this one was in flight.
            Some(current) if current != token => true,
            Some(_) => self.refresh_once().await,
        };
        if !refreshed {
            return Err(ApiError::Unauthorized);
        }

        let Some(token) = self.inner.credentials.access_token() else {
            return Err(ApiError::Unauthorized);
        };
        let retry = self
            .inner
            .transport
            .send(request.with_bearer(Some(token)))
            .await?;
        if retry.is_unauthorized() {
            tracing::warn!(
                "{} {} still unauthorized after refresh",
                request.method,
                request.path
            );
            return Err(ApiError::Unauthorized);
        }
        Ok(retry)
    }

    /// Join the in-flight refresh or start one.
    ///
    /// Resolves `true` once a new access token is stored.
    pub async fn refresh_once(&self) -> bool {
        let outcome = {
            let mut pending = self.inner.pending.lock().await;
            match pending.as_ref() {
                Some(in_flight) => {
                    tracing::debug!("Joining in-flight token refresh");
                    in_flight.outcome.clone()
                }
                None => {
                    let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(async move {
                        let refreshed = inner.refresh().await;
                        inner.release(generation).await;
                        refreshed
                    });
                    let outcome = task.map(|joined| joined.unwrap_or(false)).boxed().shared();
                    *pending = Some(PendingRefresh {
                        generation,
                        outcome: outcome.clone(),
                    });
                    outcome
                }
            }
        };
        outcome.await
    }

    /// Explicit logout: clear the store and notify
    pub fn logout(&self) {
        self.inner.end_session(LogoutReason::UserRequested);
    }
}

impl GuardInner {
    async fn refresh(&self) -> bool {
        match self.request_refresh().await {
            Ok((used_refresh_token, tokens)) => {
                // A logout or re-login during the round-trip wins over this result.
                if self.credentials.refresh_token().as_deref() != Some(used_refresh_token.as_str())
                {
                    tracing::info!("Credentials changed during refresh, discarding new token");
                    return false;
                }
                self.credentials.set(
                    CredentialUpdate::access_token(tokens.access_token)
                        .with_refresh_token(tokens.refresh_token),
                );
                tracing::info!("Access token refreshed");
                self.emit(AuthEvent::Refreshed);
                true
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                self.end_session(LogoutReason::RefreshFailed);
                false
            }
        }
    }

    async fn request_refresh(&self) -> Result<(String, TokenResponse), RefreshError> {
        let credential = self.credentials.get();
        let refresh_token = credential
            .refresh_token
            .ok_or(RefreshError::MissingRefreshToken)?;

        let request = ApiRequest::post(
            &self.options.refresh_path,
            &RefreshRequest {
                refresh_token: refresh_token.clone(),
            },
        )
        .map_err(|e| RefreshError::Decode(e.to_string()))?
        .with_bearer(credential.access_token);

        let sent = self.transport.send(request);
        let response = tokio::time::timeout(self.options.refresh_timeout, sent)
            .await
            .map_err(|_| RefreshError::Timeout)?
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status,
            });
        }

        let tokens = response
            .json::<TokenResponse>()
            .map_err(|e| RefreshError::Decode(e.to_string()))?;
        Ok((refresh_token, tokens))
    }

    async fn release(&self, generation: u64) {
        let mut pending = self.pending.lock().await;
        if pending
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            *pending = None;
        }
    }

    fn end_session(&self, reason: LogoutReason) {
        self.credentials.clear();
        tracing::info!("Session ended: {:?}", reason);
        self.emit(AuthEvent::LoggedOut(reason));
    }

    fn emit(&self, event: AuthEvent) {
        if let Some(events) = &self.options.events {
            // Receiver gone means nobody is listening anymore.
            let _ = events.send(event);
        }
    }
}
