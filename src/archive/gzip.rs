use super::{ArchiveEntry, is_subtitle_name};
use crate::Result;
use flate2::read::GzDecoder;
use std::io::Read;

/// Single-member gzip streams
///
/// The member name comes from the FNAME header field; a stream without one
/// can't be recognized as a subtitle.
pub struct GzipExtractor;

impl GzipExtractor {
    pub fn first_subtitle<R: Read>(reader: R) -> Result<Option<ArchiveEntry>> {
        let mut decoder = GzDecoder::new(reader);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;

        let name = decoder
            .header()
            .and_then(|header| header.filename())
            .map(|name| String::from_utf8_lossy(name).into_owned());

        Ok(name
            .filter(|name| is_subtitle_name(name))
            .map(|name| ArchiveEntry { name, data }))
    }
}
