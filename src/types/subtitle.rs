use crate::{DEFAULT_EXTENSION, LANGUAGE_CODE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// How the bytes behind a search result are obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadStrategy {
    /// A single GET returns the subtitle or an archive holding it
    DirectUrl { url: String, referer: String },
    /// An HTML page whose first form must be re-posted to get the file
    FormPage { page_url: String, referer: String },
}

impl DownloadStrategy {
    pub fn direct(url: impl Into<String>, referer: impl Into<String>) -> Self {
        Self::DirectUrl {
            url: url.into(),
            referer: referer.into(),
        }
    }

    pub fn form_page(page_url: impl Into<String>, referer: impl Into<String>) -> Self {
        Self::FormPage {
            page_url: page_url.into(),
            referer: referer.into(),
        }
    }

    /// The URL this strategy starts from
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::DirectUrl { url, .. } => url,
            Self::FormPage { page_url, .. } => page_url,
        }
    }
}

/// Normalized search result produced by a provider.
///
/// `id` is only unique within the producing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleResult {
    /// Provider-specific ID
    pub id: String,
    /// Human-readable title as listed by the site
    pub title: String,
    /// Provider display name
    pub provider: String,
    /// File extension, when the site states it
    pub format: Option<String>,
    /// Uploader name
    pub uploader: Option<String>,
    /// Download count
    pub downloads: Option<u32>,
    /// Frame rate
    pub fps: Option<f32>,
    /// Quality rating as shown by the site
    pub rating: Option<f32>,
    /// Upload time
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Details page
    pub info_url: Option<String>,
    /// How to fetch the file
    pub strategy: DownloadStrategy,
}

impl SubtitleResult {
    /// Create a new result with required fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        provider: impl Into<String>,
        strategy: DownloadStrategy,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            provider: provider.into(),
            format: None,
            uploader: None,
            downloads: None,
            fps: None,
            rating: None,
            uploaded_at: None,
            info_url: None,
            strategy,
        }
    }

    /// Builder pattern: set format
    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format.filter(|f| !f.is_empty());
        self
    }

    /// Builder pattern: set uploader
    pub fn with_uploader(mut self, uploader: Option<String>) -> Self {
        self.uploader = uploader.filter(|u| !u.is_empty());
        self
    }

    /// Builder pattern: set download count
    pub fn with_downloads(mut self, downloads: Option<u32>) -> Self {
        self.downloads = downloads;
        self
    }

    /// Builder pattern: set frame rate
    pub fn with_fps(mut self, fps: Option<f32>) -> Self {
        self.fps = fps.filter(|f| *f > 0.0);
        self
    }

    /// Builder pattern: set rating
    pub fn with_rating(mut self, rating: Option<f32>) -> Self {
        self.rating = rating;
        self
    }

    /// Builder pattern: set upload time
    pub fn with_uploaded_at(mut self, uploaded_at: Option<DateTime<Utc>>) -> Self {
        self.uploaded_at = uploaded_at;
        self
    }

    /// Builder pattern: set info page
    pub fn with_info_url(mut self, url: Option<String>) -> Self {
        self.info_url = url;
        self
    }

    /// Download count used for ranking
    #[must_use]
    pub fn rank_downloads(&self) -> u32 {
        self.downloads.unwrap_or(0)
    }
}

/// A search result as handed to the caller, carrying its composite id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSubtitle {
    /// Composite id, round-tripped into `SubtitleManager::get_subtitle`
    pub id: String,
    /// Stable id of the provider that produced this result
    pub provider_id: String,
    #[serde(flatten)]
    pub result: SubtitleResult,
}

/// Retrieved subtitle, owned by the caller
#[derive(Debug, Clone)]
pub struct SubtitleResponse {
    pub stream: Cursor<Vec<u8>>,
    pub format: String,
    pub language: String,
}

impl SubtitleResponse {
    pub fn new(content: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            stream: Cursor::new(content),
            format: format.into(),
            language: LANGUAGE_CODE.to_string(),
        }
    }

    /// Empty stream with the default extension
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_EXTENSION)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stream.get_ref().is_empty()
    }
}
