//! Bulgarian subtitle search and retrieval across several community sites.

mod archive;
mod composite_id;
pub mod config;
mod downloader;
mod manager;
mod matcher;
mod metadata;
mod parser;
mod provider;
mod query;
pub mod telemetry;
mod types;


pub use archive::{ArchiveFormat, ExtractedSubtitle, detect_format, extract};
pub use composite_id::{IdTarget, SubtitleId};
pub use self::config::{LoggingConfig, SubsConfig};
pub use downloader::Downloader;
pub use manager::{AttemptOutcome, AttemptReport, SearchReport, SubtitleManager};
pub use matcher::EpisodeMatcher;
pub use metadata::{NoopTitleLookup, TitleLookup};
pub use parser::{FileNameParser, ParsedFileName};
pub use provider::{
    HttpClient, PodnapisiProvider, SabProvider, SubsunacsProvider, SubtitleProvider,
    YavkaProvider, registry,
};
pub use query::{QueryBuilder, QueryTerm};
pub use types::{
    DownloadStrategy, ExtractedMetadata, RemoteSubtitle, SearchRequest, SubtitleResponse,
    SubtitleResult,
};

use std::time::Duration;

/// Language code reported for every retrieved subtitle
pub const LANGUAGE_CODE: &str = "bul";

/// Extension used whenever nothing better is known
pub const DEFAULT_EXTENSION: &str = "srt";

/// Crate result type
pub type Result<T> = std::result::Result<T, SubsError>;

/// Crate error types
#[derive(Debug, thiserror::Error)]
pub enum SubsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Invalid subtitle id: {0}")]
    InvalidId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create a manager with every provider enabled in `config`
pub fn create_default_manager(config: &SubsConfig) -> Result<SubtitleManager> {
    config.validate()?;

    let http = HttpClient::from_config(config)?;
    let mut manager = SubtitleManager::new(http).with_max_queries(config.max_query_variations);

    for provider in registry(&config.providers) {
        manager.add_shared_provider(provider);
    }

    Ok(manager)
}
