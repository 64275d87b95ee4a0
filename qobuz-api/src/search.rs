//! Catalog search API.
//!
//! Endpoint: `GET /catalog/search?query=`
//!
//! Response (abridged):
//! ```json
//! {
//!   "query": "daft punk",
//!   "albums":    { "limit": 10, "offset": 0, "total": 52, "items": [ ... ] },
//!   "tracks":    { "limit": 10, "offset": 0, "total": 713, "items": [ ... ] },
//!   "artists":   { "limit": 10, "offset": 0, "total": 3, "items": [ ... ] },
//!   "playlists": { "limit": 10, "offset": 0, "total": 12, "items": [ ... ] },
//!   "stories":   { "limit": 10, "offset": 0, "total": 0, "items": [ ... ] }
//! }
//! ```
//!
//! Albums and tracks are the sections this client consumes; the other three
//! pass through as opaque JSON.

use crate::client::QobuzClient;
use crate::error::Result;
use crate::types::SearchResults;

impl QobuzClient {
    /// Search the catalog across every entity kind at once.
    ///
    /// # Errors
    ///
    /// - [`QobuzError::Http`](crate::QobuzError::Http) — network failure
    /// - [`QobuzError::Status`](crate::QobuzError::Status) — non-2xx response
    /// - [`QobuzError::Json`](crate::QobuzError::Json) — malformed body
    pub fn search(&self, query: &str) -> Result<SearchResults> {
        self.get_json("/catalog/search", &[("query", query)])
    }
}
