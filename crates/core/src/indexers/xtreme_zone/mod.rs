//! Adapter for trackers running the XtremeZone JSON API.
//!
//! The site exposes three endpoints under its root:
//! - `POST api/login` returning a bearer token
//! - `GET api/torrent` for searches
//! - `GET api/torrent/{id}/download` for torrent files

mod categories;
pub mod parse;
pub mod translate;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::category::{CategoryMap, CategoryTable};
use crate::credentials::CredentialStore;
use crate::diagnostics::ParseErrorSink;
use crate::metrics::SEARCH_RELEASES;
use crate::search::{Release, SearchQuery};
use crate::session::{AuthorizedClient, TokenSession};
use crate::transport::Transport;

use super::{IndexerAdapter, IndexerError, IndexerInfo, IndexerPrivacy, Operation};

pub use categories::default_categories;
pub use parse::{ParseOutcome, ResponseParser, MINIMUM_RATIO, MINIMUM_SEED_TIME_SECS};
pub use translate::translate;

/// Public site root of the flagship tracker.
pub const DEFAULT_LINK: &str = "https://www.xtremezone.ro/";
/// Site language.
pub const LANGUAGE: &str = "ro-RO";
/// The site allows one request every 2.1 seconds.
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 2.1;

/// Everything needed to build one [`XtremeZoneIndexer`].
pub struct XtremeZoneSettings {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Site root; a trailing `/` is added when missing.
    pub link: Url,
    pub credentials: Arc<dyn CredentialStore>,
    pub categories: CategoryTable,
}

impl XtremeZoneSettings {
    /// Settings with the built-in name, description and category table.
    pub fn new(id: impl Into<String>, link: Url, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            id: id.into(),
            name: "XtremeZone".to_string(),
            description: "Romanian private tracker for movies, TV and more".to_string(),
            link,
            credentials,
            categories: default_categories(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }
}

/// [`IndexerAdapter`] for one XtremeZone-family site.
pub struct XtremeZoneIndexer {
    info: IndexerInfo,
    client: AuthorizedClient,
    categories: Arc<CategoryTable>,
    parser: ResponseParser,
    sink: Arc<dyn ParseErrorSink>,
}

impl XtremeZoneIndexer {
    pub fn new(
        settings: XtremeZoneSettings,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ParseErrorSink>,
    ) -> Self {
        let link = with_trailing_slash(settings.link);
        let categories = Arc::new(settings.categories);

        let info = IndexerInfo {
            id: settings.id.clone(),
            name: settings.name,
            description: settings.description,
            link: link.clone(),
            language: LANGUAGE.to_string(),
            privacy: IndexerPrivacy::Private,
            categories: categories.categories(),
        };

        let session = TokenSession::new(
            settings.id.clone(),
            format!("{}api/login", link),
            Arc::clone(&transport),
            settings.credentials,
        );
        let parser = ResponseParser::new(settings.id, link, categories.clone());

        Self {
            info,
            client: AuthorizedClient::new(transport, session),
            categories,
            parser,
            sink,
        }
    }

    /// The login session, for callers that need to inspect or reset it.
    pub fn session(&self) -> &TokenSession {
        self.client.session()
    }

    /// Whether `link` is on this site: same scheme, host and port as the root.
    fn is_own_link(&self, link: &Url) -> bool {
        let root = &self.info.link;
        link.scheme() == root.scheme()
            && link.host_str() == root.host_str()
            && link.port_or_known_default() == root.port_or_known_default()
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let params = translate(query, self.categories.as_ref());
        format!("{}api/torrent?{}", self.info.link, params.to_query_string())
    }
}

#[async_trait]
impl IndexerAdapter for XtremeZoneIndexer {
    fn info(&self) -> &IndexerInfo {
        &self.info
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Release>, IndexerError> {
        let url = self.search_url(query);
        debug!(indexer = %self.info.id, url = %url, "Searching");

        let response = self.client.get(&url, Operation::Search).await?;
        let body = response.text();
        let outcome = self.parser.parse(&body);

        for error in &outcome.errors {
            self.sink.report(&error.raw, error);
        }

        SEARCH_RELEASES
            .with_label_values(&[&self.info.id])
            .observe(outcome.releases.len() as f64);
        debug!(
            indexer = %self.info.id,
            releases = outcome.releases.len(),
            skipped = outcome.errors.len(),
            "Search complete"
        );

        Ok(outcome.releases)
    }

    async fn download(&self, link: &Url) -> Result<Vec<u8>, IndexerError> {
        if !self.is_own_link(link) {
            warn!(indexer = %self.info.id, link = %link, "Refusing download from another site");
            return Err(IndexerError::ForeignLink {
                indexer: self.info.id.clone(),
                link: link.to_string(),
            });
        }

        debug!(indexer = %self.info.id, link = %link, "Downloading");
        let response = self.client.get(link.as_str(), Operation::Download).await?;
        Ok(response.body)
    }

    async fn check(&self) -> Result<usize, IndexerError> {
        let session = self.client.session();
        session.invalidate().await;
        session.ensure().await?;

        let releases = self.search(&SearchQuery::default()).await?;
        if releases.is_empty() {
            return Err(IndexerError::NoReleases(self.info.id.clone()));
        }

        info!(indexer = %self.info.id, releases = releases.len(), "Indexer check passed");
        Ok(releases.len())
    }
}

fn with_trailing_slash(mut link: Url) -> Url {
    if !link.path().ends_with('/') {
        let path = format!("{}/", link.path());
        link.set_path(&path);
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::testing::fixtures::{torrent_row, xtreme_zone_settings};
    use crate::testing::{MockTransport, RecordingParseErrorSink};
    use crate::transport::HttpMethod;
    use serde_json::json;

    async fn indexer() -> (XtremeZoneIndexer, MockTransport, RecordingParseErrorSink) {
        let transport = MockTransport::new();
        transport
            .set_json(HttpMethod::Post, "/api/login", 200, r#"{"token":"abc"}"#)
            .await;
        let sink = RecordingParseErrorSink::new();
        let indexer = XtremeZoneIndexer::new(
            xtreme_zone_settings("https://tracker.test/"),
            Arc::new(transport.clone()),
            Arc::new(sink.clone()),
        );
        (indexer, transport, sink)
    }

    #[test]
    fn test_trailing_slash_is_added() {
        let link = with_trailing_slash(Url::parse("https://tracker.test/site").unwrap());
        assert_eq!(link.as_str(), "https://tracker.test/site/");

        let link = with_trailing_slash(Url::parse("https://tracker.test").unwrap());
        assert_eq!(link.as_str(), "https://tracker.test/");
    }

    #[tokio::test]
    async fn test_info() {
        let (indexer, _, _) = indexer().await;
        let info = indexer.info();

        assert_eq!(indexer.id(), "xz");
        assert_eq!(info.language, "ro-RO");
        assert_eq!(info.privacy, IndexerPrivacy::Private);
        assert!(info.categories.contains(&Category::MoviesHd));
    }

    #[tokio::test]
    async fn test_search_url_and_headers() {
        let (indexer, transport, _) = indexer().await;
        transport
            .set_json(HttpMethod::Get, "/api/torrent", 200, "[]")
            .await;

        let query = SearchQuery::term("the matrix").with_categories(vec![Category::MoviesHd]);
        indexer.search(&query).await.unwrap();

        let requests = transport.requests_to(HttpMethod::Get, "/api/torrent").await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://tracker.test/api/torrent?itemsPerPage=100&sort=torrent.createdAt\
             &direction=desc&categories[]=3&search=the%20matrix"
        );
        assert_eq!(requests[0].header_value("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_search_reports_bad_rows() {
        let (indexer, transport, sink) = indexer().await;
        let body = json!([torrent_row(1), {"id": 2}, torrent_row(3)]).to_string();
        transport
            .set_json(HttpMethod::Get, "/api/torrent", 200, &body)
            .await;

        let releases = indexer.search(&SearchQuery::term("x")).await.unwrap();

        assert_eq!(releases.len(), 2);
        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].raw_input, r#"{"id":2}"#);
    }

    #[tokio::test]
    async fn test_download_returns_raw_bytes() {
        let (indexer, transport, _) = indexer().await;
        let bytes = vec![0xd8, 0x00, 0xff, b'e'];
        transport
            .set_bytes(HttpMethod::Get, "/api/torrent/7/download", 200, bytes.clone())
            .await;

        let link = Url::parse("https://tracker.test/api/torrent/7/download").unwrap();
        assert_eq!(indexer.download(&link).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_download_from_another_site_sends_nothing() {
        let (indexer, transport, _) = indexer().await;

        for link in [
            "https://elsewhere.test/api/torrent/7/download",
            "http://tracker.test/api/torrent/7/download",
            "https://tracker.test:8443/api/torrent/7/download",
        ] {
            let link = Url::parse(link).unwrap();
            let err = indexer.download(&link).await.unwrap_err();
            assert_eq!(
                err,
                IndexerError::ForeignLink {
                    indexer: "xz".to_string(),
                    link: link.to_string(),
                }
            );
        }

        assert_eq!(transport.request_count().await, 0);
        assert!(indexer.session().current().await.is_none());
    }

    #[tokio::test]
    async fn test_download_accepts_explicit_default_port() {
        let (indexer, transport, _) = indexer().await;
        transport
            .set_bytes(HttpMethod::Get, "/api/torrent/7/download", 200, vec![b'd'])
            .await;

        let link = Url::parse("https://tracker.test:443/api/torrent/7/download").unwrap();
        assert_eq!(indexer.download(&link).await.unwrap(), vec![b'd']);
    }

    #[tokio::test]
    async fn test_check_forces_login_and_counts_releases() {
        let (indexer, transport, _) = indexer().await;
        let body = json!([torrent_row(1), torrent_row(2)]).to_string();
        transport
            .set_json(HttpMethod::Get, "/api/torrent", 200, &body)
            .await;

        indexer.search(&SearchQuery::default()).await.unwrap();
        assert_eq!(indexer.check().await.unwrap(), 2);

        assert_eq!(transport.requests_to(HttpMethod::Post, "/api/login").await.len(), 2);
    }

    #[tokio::test]
    async fn test_check_without_releases_fails() {
        let (indexer, transport, _) = indexer().await;
        transport
            .set_json(HttpMethod::Get, "/api/torrent", 200, "[]")
            .await;

        assert_eq!(
            indexer.check().await,
            Err(IndexerError::NoReleases("xz".to_string()))
        );
    }
}
