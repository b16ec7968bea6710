//! Bearer-token session management.
//!
//! A [`TokenSession`] owns the token of one indexer instance. The site gives
//! no expiry, so a token is considered valid until a request is rejected with
//! 401. All reads and writes of the token slot happen under one async mutex,
//! held across the login request, so concurrent callers never log in twice.

mod authorized;

pub use authorized::AuthorizedClient;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::credentials::CredentialStore;
use crate::metrics::INDEXER_LOGINS;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

const DEFAULT_REJECTION_MESSAGE: &str = "Login failed without an error message";

/// Errors raised while obtaining a token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The site answered but did not hand out a token.
    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    #[error("Login request failed: {0}")]
    Transport(#[from] TransportError),
}

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Token lifecycle for one indexer instance.
pub struct TokenSession {
    indexer: String,
    login_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    token: Mutex<Option<Token>>,
}

impl TokenSession {
    pub fn new(
        indexer: impl Into<String>,
        login_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            indexer: indexer.into(),
            login_url: login_url.into(),
            transport,
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Return the cached token, logging in first if there is none.
    pub async fn ensure(&self) -> Result<Token, AuthError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let token = self.login().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Replace a token the site just rejected.
    ///
    /// If another caller already swapped the rejected token for a new one,
    /// that token is returned without logging in again.
    pub async fn renew(&self, rejected: &Token) -> Result<Token, AuthError> {
        let mut slot = self.token.lock().await;
        if let Some(current) = slot.as_ref() {
            if current != rejected {
                debug!(indexer = %self.indexer, "Token already renewed by another request");
                return Ok(current.clone());
            }
        }

        *slot = None;
        let token = self.login().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token; the next [`ensure`](Self::ensure) logs in again.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    /// Drop the cached token only if it is still `rejected`.
    pub async fn invalidate_if_current(&self, rejected: &Token) {
        let mut slot = self.token.lock().await;
        if slot.as_ref() == Some(rejected) {
            *slot = None;
        }
    }

    pub async fn current(&self) -> Option<Token> {
        self.token.lock().await.clone()
    }

    pub fn indexer(&self) -> &str {
        &self.indexer
    }

    async fn login(&self) -> Result<Token, AuthError> {
        let credentials = self.credentials.credentials();
        let request = HttpRequest::post(&self.login_url, credentials.login_body().to_string())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        debug!(indexer = %self.indexer, "Logging in");

        let result = match self.transport.execute(request).await {
            Ok(response) => parse_login_response(&response),
            Err(e) => Err(AuthError::Transport(e)),
        };

        match &result {
            Ok(_) => {
                info!(indexer = %self.indexer, "Login successful");
                INDEXER_LOGINS
                    .with_label_values(&[&self.indexer, "success"])
                    .inc();
            }
            Err(AuthError::Rejected(message)) => {
                warn!(indexer = %self.indexer, message = %message, "Login rejected");
                INDEXER_LOGINS
                    .with_label_values(&[&self.indexer, "rejected"])
                    .inc();
            }
            Err(e) => {
                warn!(indexer = %self.indexer, error = %e, "Login failed");
                INDEXER_LOGINS
                    .with_label_values(&[&self.indexer, "failed"])
                    .inc();
            }
        }

        result
    }
}

/// Extract the token from a login response.
///
/// The site answers with a JSON object holding either `token` or `message`,
/// regardless of the HTTP status.
fn parse_login_response(response: &HttpResponse) -> Result<Token, AuthError> {
    let json: Value = serde_json::from_slice(&response.body).map_err(|_| {
        AuthError::InvalidResponse(format!(
            "HTTP {}: {}",
            response.status,
            response.excerpt(200)
        ))
    })?;

    let object = json.as_object().ok_or_else(|| {
        AuthError::InvalidResponse(format!(
            "HTTP {}: expected a JSON object",
            response.status
        ))
    })?;

    match object.get("token").and_then(Value::as_str) {
        Some(token) if !token.trim().is_empty() => Ok(Token::new(token)),
        _ => Err(AuthError::Rejected(
            object
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_REJECTION_MESSAGE)
                .to_string(),
        )),
    }
}
