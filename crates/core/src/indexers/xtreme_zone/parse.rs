//! `/api/torrent` response parsing.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::category::CategoryMap;
use crate::diagnostics::ParseError;
use crate::search::{download_volume_factor, upload_volume_factor, Release};

/// Ratio every release must reach.
pub const MINIMUM_RATIO: f64 = 1.0;
/// Seed time every release requires: 48 hours.
pub const MINIMUM_SEED_TIME_SECS: u64 = 172_800;

/// Releases parsed from one response plus the problems met on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub releases: Vec<Release>,
    pub errors: Vec<ParseError>,
}

/// Turns a search response body into canonical releases.
pub struct ResponseParser {
    indexer: String,
    link: Url,
    categories: Arc<dyn CategoryMap>,
}

impl ResponseParser {
    /// `link` is the site root and must end with `/`.
    pub fn new(indexer: impl Into<String>, link: Url, categories: Arc<dyn CategoryMap>) -> Self {
        Self {
            indexer: indexer.into(),
            link,
            categories,
        }
    }

    /// Parse a body that should be a JSON array of torrents.
    ///
    /// A body that is not an array gives one batch error and no releases.
    /// A bad row gives one row error and is skipped; the other rows are kept.
    pub fn parse(&self, body: &str) -> ParseOutcome {
        let rows: Vec<Value> = match serde_json::from_str(body) {
            Ok(rows) => rows,
            Err(e) => {
                return ParseOutcome {
                    releases: Vec::new(),
                    errors: vec![ParseError::batch(&self.indexer, e.to_string(), body)],
                }
            }
        };

        let mut outcome = ParseOutcome::default();
        for (index, row) in rows.into_iter().enumerate() {
            match self.parse_row(&row) {
                Ok(release) => outcome.releases.push(release),
                Err(message) => outcome.errors.push(ParseError::row(
                    &self.indexer,
                    index,
                    message,
                    row.to_string(),
                )),
            }
        }
        outcome
    }

    /// Link under the site root. Each segment is percent-encoded, so ids
    /// holding `/`, `?` or `#` stay inside their own path segment.
    fn site_link(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = self.link.clone();
        url.path_segments_mut()
            .map_err(|_| format!("site link {} cannot hold a path", self.link))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn parse_row(&self, row: &Value) -> Result<Release, String> {
        let torrent = ApiTorrent::deserialize(row).map_err(|e| e.to_string())?;

        let details = self.site_link(&["browse", torrent.id.as_str()])?;
        let link = self.site_link(&["api", "torrent", torrent.id.as_str(), "download"])?;
        let publish_date = parse_created_at(&torrent.created_at)
            .ok_or_else(|| format!("invalid created_at: {:?}", torrent.created_at))?;

        // Relative or garbled posters are dropped, the row is still valid
        let poster = torrent
            .poster
            .as_deref()
            .and_then(|p| Url::parse(p.trim()).ok());

        let freeleech = torrent.is_freeleech.unwrap_or(false);
        let half_download = torrent.is_half_download.unwrap_or(false);
        let double_upload = torrent.is_double_upload.unwrap_or(false);

        Ok(Release {
            indexer: self.indexer.clone(),
            title: torrent.name,
            link,
            guid: details.clone(),
            details,
            categories: self.categories.categories_for(&torrent.category.id),
            publish_date,
            description: torrent.short_description,
            poster,
            size_bytes: torrent.size,
            grabs: torrent.times_completed,
            seeders: torrent.seeders,
            peers: torrent.seeders.saturating_add(torrent.leechers),
            download_volume_factor: download_volume_factor(freeleech, half_download),
            upload_volume_factor: upload_volume_factor(double_upload),
            minimum_ratio: MINIMUM_RATIO,
            minimum_seed_time_secs: MINIMUM_SEED_TIME_SECS,
        })
    }
}

/// Parse the API's ISO 8601 timestamps; zoneless values are taken as UTC.
fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

// API row types
#[derive(Debug, Deserialize)]
struct ApiTorrent {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    name: String,
    created_at: String,
    category: ApiCategory,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    is_half_download: Option<bool>,
    #[serde(default)]
    is_freeleech: Option<bool>,
    #[serde(default)]
    is_double_upload: Option<bool>,
    size: u64,
    times_completed: u64,
    seeders: u32,
    leechers: u32,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, CategoryMapping, CategoryTable};
    use crate::diagnostics::ParseScope;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn parser() -> ResponseParser {
        ResponseParser::new(
            "xz",
            Url::parse("https://tracker.test/").unwrap(),
            Arc::new(CategoryTable::new(vec![
                CategoryMapping::new("3", Category::MoviesHd, ""),
                CategoryMapping::new("9", Category::TvHd, ""),
            ])),
        )
    }

    fn row(id: u64) -> Value {
        json!({
            "id": id,
            "name": format!("Release {}", id),
            "created_at": "2024-06-15T10:30:00+03:00",
            "category": {"id": 3, "name": "Filme HD"},
            "short_description": "short",
            "poster": "https://img.tracker.test/p.jpg",
            "is_half_download": false,
            "is_freeleech": false,
            "is_double_upload": false,
            "size": 1_073_741_824u64,
            "times_completed": 42,
            "seeders": 10,
            "leechers": 3
        })
    }

    fn parse_one(value: Value) -> Release {
        let outcome = parser().parse(&json!([value]).to_string());
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        outcome.releases.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_full_row() {
        let release = parse_one(row(1234));

        assert_eq!(release.indexer, "xz");
        assert_eq!(release.title, "Release 1234");
        assert_eq!(
            release.link.as_str(),
            "https://tracker.test/api/torrent/1234/download"
        );
        assert_eq!(release.details.as_str(), "https://tracker.test/browse/1234");
        assert_eq!(release.guid, release.details);
        assert_eq!(release.categories, vec![Category::MoviesHd]);
        assert_eq!(release.publish_date.hour(), 7);
        assert_eq!(release.description.as_deref(), Some("short"));
        assert_eq!(
            release.poster.as_ref().map(Url::as_str),
            Some("https://img.tracker.test/p.jpg")
        );
        assert_eq!(release.size_bytes, 1_073_741_824);
        assert_eq!(release.grabs, 42);
        assert_eq!(release.seeders, 10);
        assert_eq!(release.peers, 13);
        assert_eq!(release.download_volume_factor, 1.0);
        assert_eq!(release.upload_volume_factor, 1.0);
        assert_eq!(release.minimum_ratio, 1.0);
        assert_eq!(release.minimum_seed_time_secs, 172_800);
    }

    #[test]
    fn test_volume_factor_flags() {
        let cases = [
            (true, true, false, 0.0, 1.0),
            (true, false, true, 0.0, 2.0),
            (false, true, false, 0.5, 1.0),
            (false, false, true, 1.0, 2.0),
        ];

        for (freeleech, half, double, dl, ul) in cases {
            let mut value = row(1);
            value["is_freeleech"] = json!(freeleech);
            value["is_half_download"] = json!(half);
            value["is_double_upload"] = json!(double);

            let release = parse_one(value);
            assert_eq!(release.download_volume_factor, dl);
            assert_eq!(release.upload_volume_factor, ul);
        }
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let mut value = row(1);
        let object = value.as_object_mut().unwrap();
        object.remove("is_freeleech");
        object.remove("is_half_download");
        object.insert("is_double_upload".to_string(), Value::Null);

        let release = parse_one(value);
        assert_eq!(release.download_volume_factor, 1.0);
        assert_eq!(release.upload_volume_factor, 1.0);
    }

    #[test]
    fn test_missing_or_relative_poster_is_omitted() {
        let mut missing = row(1);
        missing.as_object_mut().unwrap().remove("poster");
        assert!(parse_one(missing).poster.is_none());

        let mut relative = row(2);
        relative["poster"] = json!("/images/poster.jpg");
        assert!(parse_one(relative).poster.is_none());

        let mut garbage = row(3);
        garbage["poster"] = json!("not a url");
        assert!(parse_one(garbage).poster.is_none());
    }

    #[test]
    fn test_string_ids_and_category_ids() {
        let mut value = row(1);
        value["id"] = json!("abc-77");
        value["category"] = json!({"id": "9"});

        let release = parse_one(value);
        assert_eq!(release.details.as_str(), "https://tracker.test/browse/abc-77");
        assert_eq!(release.categories, vec![Category::TvHd]);
    }

    #[test]
    fn test_reserved_characters_in_id_are_encoded() {
        let mut value = row(1);
        value["id"] = json!("12#34?x/y");

        let release = parse_one(value);
        assert_eq!(release.link.path(), "/api/torrent/12%2334%3Fx%2Fy/download");
        assert_eq!(release.link.query(), None);
        assert_eq!(release.link.fragment(), None);
        assert_eq!(
            release.details.as_str(),
            "https://tracker.test/browse/12%2334%3Fx%2Fy"
        );
        assert_eq!(release.guid, release.details);
    }

    #[test]
    fn test_links_keep_site_path_prefix() {
        let parser = ResponseParser::new(
            "xz",
            Url::parse("https://tracker.test/site/").unwrap(),
            Arc::new(CategoryTable::new(vec![])),
        );
        let outcome = parser.parse(&json!([row(5)]).to_string());

        assert_eq!(
            outcome.releases[0].link.as_str(),
            "https://tracker.test/site/api/torrent/5/download"
        );
    }

    #[test]
    fn test_unknown_category_is_empty_not_error() {
        let mut value = row(1);
        value["category"] = json!({"id": 404});

        assert!(parse_one(value).categories.is_empty());
    }

    #[test]
    fn test_peers_saturate() {
        let mut value = row(1);
        value["seeders"] = json!(u32::MAX);
        value["leechers"] = json!(5);

        assert_eq!(parse_one(value).peers, u32::MAX);
    }

    #[test]
    fn test_malformed_row_is_isolated() {
        let mut bad = row(2);
        bad.as_object_mut().unwrap().remove("name");
        let body = json!([row(1), bad, row(3)]).to_string();

        let outcome = parser().parse(&body);

        assert_eq!(outcome.releases.len(), 2);
        assert_eq!(outcome.releases[0].title, "Release 1");
        assert_eq!(outcome.releases[1].title, "Release 3");
        assert_eq!(outcome.errors.len(), 1);
        let err = &outcome.errors[0];
        assert_eq!(err.scope, ParseScope::Row { index: 1 });
        assert!(err.message.contains("name"));
        assert!(err.raw.contains("\"id\":2"));
    }

    #[test]
    fn test_invalid_date_is_row_error() {
        let mut value = row(1);
        value["created_at"] = json!("yesterday");

        let outcome = parser().parse(&json!([value]).to_string());

        assert!(outcome.releases.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("created_at"));
    }

    #[test]
    fn test_negative_size_is_row_error() {
        let mut value = row(1);
        value["size"] = json!(-1);

        let outcome = parser().parse(&json!([value, row(2)]).to_string());

        assert_eq!(outcome.releases.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_non_array_body_is_batch_error() {
        let outcome = parser().parse(r#"{"message":"Unauthorized"}"#);

        assert!(outcome.releases.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].scope, ParseScope::Batch);
        assert_eq!(outcome.errors[0].raw, r#"{"message":"Unauthorized"}"#);
    }

    #[test]
    fn test_html_body_is_batch_error() {
        let outcome = parser().parse("<html>maintenance</html>");
        assert!(outcome.releases.is_empty());
        assert_eq!(outcome.errors[0].scope, ParseScope::Batch);
    }

    #[test]
    fn test_empty_array() {
        let outcome = parser().parse("[]");
        assert!(outcome.releases.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_parse_created_at_formats() {
        let utc = parse_created_at("2024-06-15T10:30:00Z").unwrap();
        assert_eq!((utc.year(), utc.month(), utc.day()), (2024, 6, 15));

        let naive = parse_created_at("2024-06-15T10:30:00").unwrap();
        assert_eq!(naive.hour(), 10);

        let fractional = parse_created_at("2024-06-15T10:30:00.123").unwrap();
        assert_eq!(fractional.minute(), 30);

        let spaced = parse_created_at("2024-06-15 10:30:00").unwrap();
        assert_eq!(spaced.day(), 15);

        assert!(parse_created_at("15/06/2024").is_none());
    }
}
