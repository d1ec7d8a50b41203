use super::{ArchiveEntry, is_subtitle_name};
use crate::{Result, SubsError};
use sevenz_rust::{Password, SevenZReader};
use std::io::{self, Read, Seek, SeekFrom};

/// 7-Zip archives
pub struct SevenZipExtractor;

impl SevenZipExtractor {
    pub fn first_subtitle<R: Read + Seek>(mut reader: R) -> Result<Option<ArchiveEntry>> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let mut archive = SevenZReader::new(reader, len, Password::empty())
            .map_err(|e| SubsError::Archive(format!("failed to open 7z archive: {e}")))?;

        let mut found = None;
        archive
            .for_each_entries(|entry, data| {
                // Solid blocks share one decoder; skipped entries are drained
                if entry.is_directory() || !is_subtitle_name(entry.name()) {
                    io::copy(data, &mut io::sink())?;
                    return Ok(true);
                }

                let mut content = Vec::new();
                data.read_to_end(&mut content)?;
                found = Some(ArchiveEntry {
                    name: entry.name().to_string(),
                    data: content,
                });
                Ok(false)
            })
            .map_err(|e| SubsError::Archive(format!("failed to read 7z archive: {e}")))?;

        Ok(found)
    }
}
