mod request;
mod subtitle;

pub use request::{ExtractedMetadata, SearchRequest};
pub use subtitle::{DownloadStrategy, RemoteSubtitle, SubtitleResponse, SubtitleResult};
