mod filename;
mod patterns;

pub use filename::{FileNameParser, ParsedFileName};
