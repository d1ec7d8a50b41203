//! Opaque subtitle ids handed to callers between search and download.
//!
//! An id is the unpadded URL-safe base64 of `{"provider": .., "strategy": ..}`,
//! so it survives being used as a path segment or file stem. The older
//! `provider|url` form is still accepted on the way in.

use crate::{Result, SubsError, provider::SubtitleProvider, types::DownloadStrategy};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

const LEGACY_SEPARATOR: char = '|';

/// Where the download starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdTarget {
    Strategy(DownloadStrategy),
    /// Bare URL from a `provider|url` id; the provider decides how to fetch it
    Legacy(String),
}

/// Decoded subtitle id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleId {
    pub provider: String,
    pub target: IdTarget,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    provider: String,
    strategy: DownloadStrategy,
}

impl SubtitleId {
    pub fn new(provider: impl Into<String>, strategy: DownloadStrategy) -> Self {
        Self {
            provider: provider.into(),
            target: IdTarget::Strategy(strategy),
        }
    }

    pub fn encode(&self) -> String {
        match &self.target {
            IdTarget::Strategy(strategy) => {
                let payload = Payload {
                    provider: self.provider.clone(),
                    strategy: strategy.clone(),
                };
                // Serializing plain strings can't fail
                let json = serde_json::to_vec(&payload).unwrap_or_default();
                URL_SAFE_NO_PAD.encode(json)
            }
            IdTarget::Legacy(url) => format!("{}{LEGACY_SEPARATOR}{url}", self.provider),
        }
    }

    pub fn decode(id: &str) -> Result<Self> {
        let id = id.trim();

        if let Some((provider, url)) = id.split_once(LEGACY_SEPARATOR) {
            if provider.is_empty() || url.is_empty() {
                return Err(SubsError::InvalidId(id.to_string()));
            }
            return Ok(Self {
                provider: provider.to_string(),
                target: IdTarget::Legacy(url.to_string()),
            });
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(id)
            .map_err(|e| SubsError::InvalidId(format!("{id}: {e}")))?;
        let payload: Payload = serde_json::from_slice(&bytes)
            .map_err(|e| SubsError::InvalidId(format!("{id}: {e}")))?;

        if payload.provider.is_empty() || payload.strategy.url().is_empty() {
            return Err(SubsError::InvalidId(id.to_string()));
        }

        Ok(Self::new(payload.provider, payload.strategy))
    }

    /// Resolve the download strategy, asking `provider` for legacy ids
    pub fn strategy(&self, provider: &dyn SubtitleProvider) -> DownloadStrategy {
        match &self.target {
            IdTarget::Strategy(strategy) => strategy.clone(),
            IdTarget::Legacy(url) => provider.download_strategy(url),
        }
    }
}
