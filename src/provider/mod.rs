pub(crate) mod html;
mod http;
pub mod podnapisi;
pub mod sab;
pub mod subsunacs;
mod traits;
pub mod yavka;

pub use http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, HttpClient, HttpResponse, decode};
pub use podnapisi::PodnapisiProvider;
pub use sab::SabProvider;
pub use subsunacs::SubsunacsProvider;
pub use traits::SubtitleProvider;
pub use yavka::YavkaProvider;

use crate::{Result, types::SubtitleResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Every known provider id, in the order providers are searched
pub const PROVIDER_IDS: [&str; 4] = ["sab", "subsunacs", "yavka", "podnapisi"];

/// Provider base configuration
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Base URL without trailing slash
    pub base_url: String,
}

impl ProviderConfig {
    /// Create new configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Build the enabled providers in declared search order.
///
/// Unknown ids are ignored with a warning.
pub fn registry(enabled: &[String]) -> Vec<Arc<dyn SubtitleProvider>> {
    for id in enabled {
        if !PROVIDER_IDS.iter().any(|known| known.eq_ignore_ascii_case(id)) {
            warn!(provider = %id, "ignoring unknown subtitle provider");
        }
    }

    PROVIDER_IDS
        .iter()
        .filter(|id| enabled.iter().any(|e| e.eq_ignore_ascii_case(id)))
        .filter_map(|id| -> Option<Arc<dyn SubtitleProvider>> {
            match *id {
                "sab" => Some(Arc::new(SabProvider::new())),
                "subsunacs" => Some(Arc::new(SubsunacsProvider::new())),
                "yavka" => Some(Arc::new(YavkaProvider::new())),
                "podnapisi" => Some(Arc::new(PodnapisiProvider::new())),
                _ => None,
            }
        })
        .collect()
}

/// Swallow a parse failure at the provider boundary
pub(crate) fn empty_on_error(
    provider: &str,
    parsed: Result<Vec<SubtitleResult>>,
) -> Vec<SubtitleResult> {
    match parsed {
        Ok(results) => results,
        Err(e) => {
            debug!(provider, error = %e, "failed to parse search results");
            Vec::new()
        }
    }
}
