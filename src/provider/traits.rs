use crate::types::{DownloadStrategy, SubtitleResult};
use encoding_rs::{Encoding, WINDOWS_1251};
use reqwest::{Client, RequestBuilder};

/// One subtitle site.
///
/// Implementations own everything site-specific: URL layout, request shape
/// and markup. Networking stays with the caller.
pub trait SubtitleProvider: Send + Sync {
    /// Stable provider identifier (e.g., "sab", "yavka"), embedded in composite ids
    fn id(&self) -> &'static str;

    /// Human-readable provider name
    fn name(&self) -> &'static str;

    /// Origin presented as referer on follow-up requests
    fn referer(&self) -> String;

    /// Search endpoint for an already URL-encoded query
    fn search_url(&self, encoded_query: &str, year: Option<i32>) -> String;

    /// Build the search request; GET by default
    fn search_request(&self, client: &Client, url: &str, _raw_query: &str) -> RequestBuilder {
        client.get(url)
    }

    /// Rebuild the download strategy for a bare URL from this site
    fn download_strategy(&self, url: &str) -> DownloadStrategy;

    /// Character set of the site's HTML
    fn encoding(&self) -> &'static Encoding {
        WINDOWS_1251
    }

    /// Parse a decoded response body. Never fails: bad markup yields no results.
    fn parse_results(&self, body: &str) -> Vec<SubtitleResult>;
}
