//! Authorized requests with a single re-authentication retry.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::indexers::{IndexerError, Operation};
use crate::metrics::{INDEXER_REAUTHENTICATIONS, INDEXER_REQUESTS, INDEXER_REQUEST_DURATION};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

use super::{Token, TokenSession};

/// Longest body excerpt kept in an unexpected-status error.
const ERROR_BODY_CHARS: usize = 200;

/// Sends bearer-authorized requests for one indexer.
///
/// Each call runs at most: the original attempt, one token renewal after a
/// 401, and one retry. A second 401 ends the call with
/// [`IndexerError::ExhaustedRetry`]; any status other than 200 or 401 ends
/// it with a transport error and no retry.
pub struct AuthorizedClient {
    transport: Arc<dyn Transport>,
    session: TokenSession,
}

impl AuthorizedClient {
    pub fn new(transport: Arc<dyn Transport>, session: TokenSession) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    /// GET `url` with the session token and return the 200 response.
    pub async fn get(&self, url: &str, operation: Operation) -> Result<HttpResponse, IndexerError> {
        let indexer = self.session.indexer();
        let start = Instant::now();

        let result = self.get_with_reauth(url, operation).await;

        INDEXER_REQUEST_DURATION
            .with_label_values(&[indexer, operation.as_str()])
            .observe(start.elapsed().as_secs_f64());
        INDEXER_REQUESTS
            .with_label_values(&[indexer, operation.as_str(), outcome_label(&result)])
            .inc();

        if let Err(e) = &result {
            warn!(indexer = %indexer, operation = %operation, error = %e, "Indexer request failed");
        }

        result
    }

    async fn get_with_reauth(
        &self,
        url: &str,
        operation: Operation,
    ) -> Result<HttpResponse, IndexerError> {
        let indexer = self.session.indexer();

        let token = self.session.ensure().await?;
        let response = self.send(url, &token).await?;
        match response.status {
            200 => return Ok(response),
            401 => {}
            _ => return Err(unexpected_status(&response).into()),
        }

        warn!(indexer = %indexer, operation = %operation, "Token rejected, re-authenticating");
        INDEXER_REAUTHENTICATIONS.with_label_values(&[indexer]).inc();

        let token = self.session.renew(&token).await?;
        let response = self.send(url, &token).await?;
        match response.status {
            200 => Ok(response),
            401 => {
                self.session.invalidate_if_current(&token).await;
                Err(IndexerError::ExhaustedRetry {
                    indexer: indexer.to_string(),
                    operation,
                })
            }
            _ => Err(unexpected_status(&response).into()),
        }
    }

    async fn send(&self, url: &str, token: &Token) -> Result<HttpResponse, TransportError> {
        let request = HttpRequest::get(url).header("Authorization", token.bearer());
        let response = self.transport.execute(request).await?;
        debug!(indexer = %self.session.indexer(), status = response.status, "Authorized request done");
        Ok(response)
    }
}

fn unexpected_status(response: &HttpResponse) -> TransportError {
    TransportError::UnexpectedStatus {
        status: response.status,
        body: response.excerpt(ERROR_BODY_CHARS),
    }
}

fn outcome_label(result: &Result<HttpResponse, IndexerError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(IndexerError::Auth(_)) => "auth_error",
        Err(IndexerError::Transport(_)) => "transport_error",
        Err(IndexerError::ExhaustedRetry { .. }) => "exhausted_retry",
        Err(IndexerError::NoReleases(_)) => "no_releases",
        Err(IndexerError::ForeignLink { .. }) => "foreign_link",
    }
}
