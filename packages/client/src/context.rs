//! Composition root: one [`CredentialStore`], one [`TokenGuard`] and one
//! [`ChatSession`] per application.

use std::sync::Arc;

use tokio::sync::mpsc;

use barcart_shared::{
    protocol::{LoginRequest, MemberInfo, TokenResponse},
    time::{Clock, SystemClock},
};

use crate::{
    chat::{ChatEvent, ChatSession, Connector, WebSocketConnector},
    config::ClientConfig,
    credential::{Credential, CredentialStore},
    directory::RestRoomDirectory,
    error::ApiError,
    guard::{AuthEvent, GuardOptions, TokenGuard},
    http::{ApiRequest, HttpTransport, ReqwestTransport},
};

const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";

/// Event streams handed to the UI
#[derive(Debug)]
pub struct ContextEvents {
    pub auth: mpsc::UnboundedReceiver<AuthEvent>,
    pub chat: mpsc::UnboundedReceiver<ChatEvent>,
}

pub struct ClientContext {
    config: ClientConfig,
    guard: TokenGuard,
    directory: RestRoomDirectory,
    chat: ChatSession,
}

impl ClientContext {
    /// Build the context over `reqwest` and `tokio-tungstenite`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<(Self, ContextEvents), ApiError> {
        let transport = ReqwestTransport::new(&config.base_url, config.request_timeout)?;
        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(WebSocketConnector),
            Arc::new(SystemClock),
        ))
    }

    /// Build the context over explicit transports
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> (Self, ContextEvents) {
        let (auth_tx, auth_rx) = mpsc::unbounded_channel();
        let guard = TokenGuard::new(
            CredentialStore::new(),
            transport,
            GuardOptions::from_config(&config).with_events(auth_tx),
        );
        let directory = RestRoomDirectory::new(guard.clone());
        let (chat, chat_rx) = ChatSession::new(
            config.ws_url.clone(),
            config.reconnect,
            connector,
            Arc::new(directory.clone()),
            clock,
        );

        let context = Self {
            config,
            guard,
            directory,
            chat,
        };
        let events = ContextEvents {
            auth: auth_rx,
            chat: chat_rx,
        };
        (context, events)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.guard.credentials()
    }

    pub fn guard(&self) -> &TokenGuard {
        &self.guard
    }

    pub fn directory(&self) -> &RestRoomDirectory {
        &self.directory
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Exchange email and password for a token pair and store it.
    ///
    /// Login is sent without a bearer token and is never refreshed.
    pub async fn login(&self, email: &str, pwd: &str) -> Result<(), ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            pwd: pwd.to_string(),
        };
        let response = self
            .guard
            .transport()
            .send(ApiRequest::post(LOGIN_PATH, &body)?)
            .await?;
        if response.is_unauthorized() {
            tracing::info!("Login rejected for {}", email);
            return Err(ApiError::Unauthorized);
        }

        let tokens: TokenResponse = response.error_for_status(LOGIN_PATH)?.json()?;
        let refresh_token = tokens
            .refresh_token
            .ok_or_else(|| ApiError::Decode("login response has no refreshToken".to_string()))?;
        self.credentials()
            .replace(Credential::new(tokens.access_token, refresh_token));
        tracing::info!("Logged in as {}", email);
        Ok(())
    }

    /// Identity of the logged-in member
    pub async fn me(&self) -> Result<MemberInfo, ApiError> {
        self.guard
            .execute(ApiRequest::get(ME_PATH))
            .await?
            .error_for_status(ME_PATH)?
            .json()
    }

    /// Clear the credentials and leave any chat room
    pub async fn logout(&self) {
        self.chat.leave().await;
        self.guard.logout();
    }
}
