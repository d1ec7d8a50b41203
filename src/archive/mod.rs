//! Archive sniffing and subtitle extraction
//!
//! Sites hand out either a bare subtitle file or an archive holding one. The
//! container is recognized from its leading magic bytes, never from a file name,
//! and only the first `.srt`/`.sub` entry is taken out of it.

mod gzip;
mod rar;
mod sevenz;
mod zip;


use self::gzip::GzipExtractor;
use self::rar::RarExtractor;
use self::sevenz::SevenZipExtractor;
use self::zip::ZipExtractor;
use crate::DEFAULT_EXTENSION;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

/// Container formats recognized by their magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Rar,
    SevenZ,
    Gzip,
}

impl ArchiveFormat {
    /// Classify leading bytes; fewer than two bytes is never an archive
    #[must_use]
    pub fn from_magic(header: &[u8]) -> Option<Self> {
        if header.len() < 2 {
            return None;
        }

        if header.starts_with(&[0x50, 0x4B]) {
            Some(Self::Zip)
        } else if header.starts_with(&[0x1F, 0x8B]) {
            Some(Self::Gzip)
        } else if header.starts_with(&[0x52, 0x61, 0x72]) {
            Some(Self::Rar)
        } else if header.starts_with(&[0x37, 0x7A, 0xBC, 0xAF]) {
            Some(Self::SevenZ)
        } else {
            None
        }
    }
}

/// A file taken out of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Subtitle bytes plus the extension they should be saved with
#[derive(Debug, Clone)]
pub struct ExtractedSubtitle {
    pub stream: Cursor<Vec<u8>>,
    pub extension: String,
}

impl ExtractedSubtitle {
    pub fn new(content: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            stream: Cursor::new(content),
            extension: extension.into(),
        }
    }

    /// Nothing usable was found
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_EXTENSION)
    }

    #[must_use]
    pub fn into_inner(self) -> (Vec<u8>, String) {
        (self.stream.into_inner(), self.extension)
    }
}

/// Detect the container format from the first bytes of `stream`.
///
/// The stream is always left at offset 0.
pub fn detect_format<R: Read + Seek>(stream: &mut R) -> Option<ArchiveFormat> {
    let mut header = [0u8; 4];

    let read = stream
        .seek(SeekFrom::Start(0))
        .and_then(|_| read_up_to(stream, &mut header));
    let rewound = stream.seek(SeekFrom::Start(0));

    match (read, rewound) {
        (Ok(n), Ok(_)) => ArchiveFormat::from_magic(&header[..n]),
        _ => None,
    }
}

/// Extract the first subtitle from `stream`.
///
/// Plain files are copied as they are, using `fallback_extension`. Archives
/// without a subtitle entry, or that fail to open, give an empty `srt`.
pub fn extract<R: Read + Seek>(mut stream: R, fallback_extension: &str) -> ExtractedSubtitle {
    let Some(format) = detect_format(&mut stream) else {
        let mut content = Vec::new();
        if let Err(e) = stream.read_to_end(&mut content) {
            warn!(error = %e, "failed to read subtitle stream");
            return ExtractedSubtitle::empty();
        }

        let extension = fallback_extension.trim().trim_start_matches('.');
        let extension = if extension.is_empty() {
            DEFAULT_EXTENSION
        } else {
            extension
        };
        return ExtractedSubtitle::new(content, extension);
    };

    let entry = match format {
        ArchiveFormat::Zip => ZipExtractor::first_subtitle(&mut stream),
        ArchiveFormat::Rar => RarExtractor::first_subtitle(&mut stream),
        ArchiveFormat::SevenZ => SevenZipExtractor::first_subtitle(&mut stream),
        ArchiveFormat::Gzip => GzipExtractor::first_subtitle(&mut stream),
    };

    match entry {
        Ok(Some(entry)) => {
            debug!(?format, entry = %entry.name, size = entry.data.len(), "extracted subtitle from archive");
            let extension = entry_extension(&entry.name);
            ExtractedSubtitle::new(entry.data, extension)
        }
        Ok(None) => {
            debug!(?format, "archive holds no subtitle entry");
            ExtractedSubtitle::empty()
        }
        Err(e) => {
            warn!(?format, error = %e, "failed to open archive");
            ExtractedSubtitle::empty()
        }
    }
}

/// Whether an archive entry name looks like a subtitle
pub(crate) fn is_subtitle_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.ends_with(".srt") || name.ends_with(".sub")
}

/// Extension as written in the entry name, without the dot
fn entry_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(|| DEFAULT_EXTENSION.to_string(), str::to_string)
}

fn read_up_to<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
