//! Types shared by indexer implementations.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::category::Category;
use crate::search::{Release, SearchQuery};
use crate::session::AuthError;
use crate::transport::TransportError;

/// Indexer operation, for errors, logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Download,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::Download => "download",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that fail an indexer call.
///
/// Parse problems are not here: they are reported to the parse error sink
/// and only shrink the result set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexerError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{indexer}: {operation} still unauthorized after re-authenticating")]
    ExhaustedRetry { indexer: String, operation: Operation },

    #[error("{0}: no releases found, check the indexer configuration")]
    NoReleases(String),

    /// The link points outside the indexer's site, so the session token
    /// must not be sent with it.
    #[error("{indexer}: refusing to fetch {link}, it is not on the indexer's site")]
    ForeignLink { indexer: String, link: String },
}

/// Whether an indexer needs an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexerPrivacy {
    Public,
    SemiPrivate,
    Private,
}

/// Static description of an indexer instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Site root, always ending in `/`.
    pub link: Url,
    /// Site language as a BCP 47 tag.
    pub language: String,
    pub privacy: IndexerPrivacy,
    /// Canonical categories the site can return.
    pub categories: Vec<Category>,
}

/// A site-specific indexer.
///
/// Implementations translate canonical queries into the site's API, keep
/// their own login session, and normalize the site's responses.
#[async_trait]
pub trait IndexerAdapter: Send + Sync {
    fn info(&self) -> &IndexerInfo;

    fn id(&self) -> &str {
        &self.info().id
    }

    /// Run a search. Malformed rows are skipped and reported, not raised.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Release>, IndexerError>;

    /// Fetch the raw content behind a release link.
    async fn download(&self, link: &Url) -> Result<Vec<u8>, IndexerError>;

    /// Log in from scratch and make sure the site returns releases.
    ///
    /// Returns the number of releases in the latest listing.
    async fn check(&self) -> Result<usize, IndexerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_labels() {
        assert_eq!(Operation::Search.to_string(), "search");
        assert_eq!(Operation::Download.as_str(), "download");
    }

    #[test]
    fn test_error_messages() {
        let err = IndexerError::ExhaustedRetry {
            indexer: "xtremezone".to_string(),
            operation: Operation::Download,
        };
        assert_eq!(
            err.to_string(),
            "xtremezone: download still unauthorized after re-authenticating"
        );

        let err: IndexerError = AuthError::Rejected("bad credentials".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Authentication failed: Login rejected: bad credentials"
        );

        let err: IndexerError = TransportError::Timeout.into();
        assert_eq!(err.to_string(), "Transport error: Request timeout");

        let err = IndexerError::ForeignLink {
            indexer: "xtremezone".to_string(),
            link: "https://elsewhere.test/file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "xtremezone: refusing to fetch https://elsewhere.test/file, it is not on the indexer's site"
        );
    }

    #[test]
    fn test_privacy_serialization() {
        assert_eq!(
            serde_json::to_string(&IndexerPrivacy::SemiPrivate).unwrap(),
            "\"semi_private\""
        );
    }
}
