//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the network and the diagnostics sink so adapters can
//! be exercised end to end without a live tracker.
//!
//! # Example
//!
//! ```rust,ignore
//! use trackerhub_core::testing::{MockTransport, RecordingParseErrorSink};
//!
//! let transport = MockTransport::new();
//! transport.set_json(HttpMethod::Post, "/api/login", 200, r#"{"token":"abc"}"#).await;
//! transport.set_json(HttpMethod::Get, "/api/torrent", 200, "[]").await;
//!
//! let sink = RecordingParseErrorSink::new();
//! // Build an indexer with Arc::new(transport.clone()) and Arc::new(sink.clone())...
//! ```

mod mock_transport;
mod recording_sink;

pub use mock_transport::{MockReply, MockTransport};
pub use recording_sink::{RecordedParseError, RecordingParseErrorSink};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use url::Url;

    use crate::credentials::{Credentials, StaticCredentialStore};
    use crate::indexers::XtremeZoneSettings;

    /// A well-formed `/api/torrent` row in category `3` (Movies/HD).
    pub fn torrent_row(id: u64) -> Value {
        json!({
            "id": id,
            "name": format!("Release {}", id),
            "created_at": "2024-06-15T10:30:00Z",
            "category": {"id": 3, "name": "Filme HD"},
            "short_description": format!("Description {}", id),
            "poster": format!("https://img.tracker.test/{}.jpg", id),
            "is_half_download": false,
            "is_freeleech": false,
            "is_double_upload": false,
            "size": 1024 * 1024 * 700,
            "times_completed": 12,
            "seeders": 20,
            "leechers": 5
        })
    }

    /// A JSON array body holding `rows`.
    pub fn search_body(rows: &[Value]) -> String {
        Value::Array(rows.to_vec()).to_string()
    }

    /// Settings for an indexer `xz` at `link` with user `alice`.
    ///
    /// # Panics
    ///
    /// Panics if `link` is not a valid URL.
    pub fn xtreme_zone_settings(link: &str) -> XtremeZoneSettings {
        let link = Url::parse(link).expect("fixture link must be a valid URL");
        XtremeZoneSettings::new(
            "xz",
            link,
            Arc::new(StaticCredentialStore::new(Credentials::new(
                "alice", "secret",
            ))),
        )
    }
}
