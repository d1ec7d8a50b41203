use super::{ArchiveEntry, is_subtitle_name};
use crate::{Result, SubsError};
use std::io::{Read, Seek};

/// ZIP archives
pub struct ZipExtractor;

impl ZipExtractor {
    /// First non-directory `.srt`/`.sub` entry, in archive order
    pub fn first_subtitle<R: Read + Seek>(reader: R) -> Result<Option<ArchiveEntry>> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| SubsError::Archive(format!("failed to read ZIP archive: {e}")))?;

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| SubsError::Archive(format!("failed to read ZIP entry {i}: {e}")))?;

            if file.is_dir() || !is_subtitle_name(file.name()) {
                continue;
            }

            let name = file.name().to_string();
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
            file.read_to_end(&mut data)?;

            return Ok(Some(ArchiveEntry { name, data }));
        }

        Ok(None)
    }
}
