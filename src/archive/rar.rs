use super::{ArchiveEntry, is_subtitle_name};
use crate::{Result, SubsError};
use std::io::{self, Read, Seek, SeekFrom, Write};
use unrar::Archive;

/// RAR archives
///
/// unrar only opens archives from disk, so the stream is spooled to a
/// temporary file first.
pub struct RarExtractor;

impl RarExtractor {
    pub fn first_subtitle<R: Read + Seek>(mut reader: R) -> Result<Option<ArchiveEntry>> {
        reader.seek(SeekFrom::Start(0))?;

        let mut spool = tempfile::Builder::new()
            .prefix("bgsubs-")
            .suffix(".rar")
            .tempfile()?;
        io::copy(&mut reader, spool.as_file_mut())?;
        spool.as_file_mut().flush()?;

        let mut archive = Archive::new(spool.path())
            .open_for_processing()
            .map_err(|e| SubsError::Archive(format!("failed to open RAR archive: {e}")))?;

        loop {
            let Some(header) = archive
                .read_header()
                .map_err(|e| SubsError::Archive(format!("failed to read RAR header: {e}")))?
            else {
                return Ok(None);
            };

            let entry = header.entry();
            let name = entry.filename.to_string_lossy().into_owned();

            if !entry.is_directory() && is_subtitle_name(&name) {
                let (data, _) = header
                    .read()
                    .map_err(|e| SubsError::Archive(format!("failed to read {name}: {e}")))?;
                return Ok(Some(ArchiveEntry { name, data }));
            }

            archive = header
                .skip()
                .map_err(|e| SubsError::Archive(format!("failed to skip {name}: {e}")))?;
        }
    }
}
