use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Maps a media file to its original-language title
///
/// Implemented by the host's library database. The title beats anything
/// guessed from the request when building the display name.
#[async_trait]
pub trait TitleLookup: Send + Sync {
    async fn find_original_title_by_path(&self, path: &Path) -> Result<Option<String>>;
}

/// Lookup that never knows anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTitleLookup;

#[async_trait]
impl TitleLookup for NoopTitleLookup {
    async fn find_original_title_by_path(&self, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }
}
