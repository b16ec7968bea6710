//! Canonical query to `/api/torrent` parameters.

use crate::category::CategoryMap;
use crate::search::{QueryParams, SearchQuery};

const ITEMS_PER_PAGE: &str = "100";
const SORT_FIELD: &str = "torrent.createdAt";
const SORT_DIRECTION: &str = "desc";

/// Build the search parameters for a query.
///
/// Order: paging/sort defaults, one `categories[]` per mapped site code,
/// then either `imdbId` or `search`, never both.
pub fn translate(query: &SearchQuery, categories: &dyn CategoryMap) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("itemsPerPage", ITEMS_PER_PAGE);
    params.push("sort", SORT_FIELD);
    params.push("direction", SORT_DIRECTION);

    let mut codes: Vec<String> = Vec::new();
    for category in &query.categories {
        for code in categories.site_codes_for(*category) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    for code in codes {
        params.push("categories[]", code);
    }

    match query.imdb_lookup() {
        Some(imdb_id) => params.push("imdbId", imdb_id),
        None => params.push("search", query.search_string()),
    }

    params
}
