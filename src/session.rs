//! Session cache for the transport handle and authentication token.
//!
//! Both are created lazily and at most once per session. The first caller
//! installs a shared in-flight future; everyone else awaits a clone of it, so
//! a burst of concurrent first calls performs a single connect and a single
//! authentication. The outcome, success or failure, is kept for the lifetime
//! of the session.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::operation::AUTHENTICATE_OPERATION;
use crate::transport::{Transport, TransportFactory};

/// Field of the authentication response carrying the token
const TOKEN_RESULT_FIELD: &str = "AuthenticationTokenGetResult";

type SharedInit<T> = Shared<BoxFuture<'static, Result<T, SessionError>>>;

/// Opaque authentication credential returned by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Per-client credential and transport cache.
pub struct Session {
    config: Arc<ClientConfig>,
    factory: Arc<dyn TransportFactory>,
    transport: OnceLock<SharedInit<Arc<dyn Transport>>>,
    token: OnceLock<SharedInit<AuthToken>>,
}

impl Session {
    pub fn new(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            config: Arc::new(config),
            factory,
            transport: OnceLock::new(),
            token: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the transport handle, creating it on first use.
    pub async fn acquire_transport(&self) -> Result<Arc<dyn Transport>, SessionError> {
        self.transport_init().await
    }

    /// Get the authentication token, authenticating on first use.
    pub async fn acquire_token(&self) -> Result<AuthToken, SessionError> {
        self.token_init().await
    }

    /// Whether the transport handle has been created successfully.
    pub fn is_connected(&self) -> bool {
        Self::completed_ok(&self.transport)
    }

    /// Whether a token has been obtained.
    pub fn is_authenticated(&self) -> bool {
        Self::completed_ok(&self.token)
    }

    fn completed_ok<T: Clone>(cell: &OnceLock<SharedInit<T>>) -> bool {
        cell.get()
            .and_then(|init| init.peek())
            .map(|outcome| outcome.is_ok())
            .unwrap_or(false)
    }

    fn transport_init(&self) -> SharedInit<Arc<dyn Transport>> {
        self.transport
            .get_or_init(|| {
                connect(Arc::clone(&self.factory), Arc::clone(&self.config))
                    .boxed()
                    .shared()
            })
            .clone()
    }

    fn token_init(&self) -> SharedInit<AuthToken> {
        self.token
            .get_or_init(|| {
                authenticate(self.transport_init(), Arc::clone(&self.config))
                    .boxed()
                    .shared()
            })
            .clone()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

async fn connect(
    factory: Arc<dyn TransportFactory>,
    config: Arc<ClientConfig>,
) -> Result<Arc<dyn Transport>, SessionError> {
    debug!(environment = %config.environment, "Creating transport");

    match factory.connect(&config).await {
        Ok(transport) => {
            info!(environment = %config.environment, "Transport ready");
            Ok(transport)
        }
        Err(e) => {
            warn!(environment = %config.environment, error = %e, "Transport creation failed");
            Err(SessionError::TransportUnavailable(e.to_string()))
        }
    }
}

async fn authenticate(
    transport: SharedInit<Arc<dyn Transport>>,
    config: Arc<ClientConfig>,
) -> Result<AuthToken, SessionError> {
    let transport = transport.await?;

    debug!(web_address = %config.web_address, "Authenticating");

    let result = transport
        .call(AUTHENTICATE_OPERATION, &config.auth_payload())
        .await
        .map_err(|e| {
            warn!(web_address = %config.web_address, error = %e, "Authentication call failed");
            SessionError::AuthenticationFailed(e.to_string())
        })?;

    let token = extract_token(&result)?;
    info!(web_address = %config.web_address, "Authenticated");
    Ok(token)
}

fn extract_token(result: &Value) -> Result<AuthToken, SessionError> {
    match result.get(TOKEN_RESULT_FIELD).and_then(Value::as_str) {
        Some(token) if !token.trim().is_empty() => Ok(AuthToken::new(token)),
        _ => {
            warn!("Authentication response carried no token");
            Err(SessionError::AuthenticationFailed(
                "no authentication token returned".to_string(),
            ))
        }
    }
}
