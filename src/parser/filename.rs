use super::patterns::{PATTERNS, Patterns};
use std::path::Path;

/// What a media file name tells about its content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFileName {
    /// Release title, usually the original (often English) one
    pub title: Option<String>,
    /// Year token that ended the title
    pub year: Option<i32>,
    /// Season and episode markers
    pub season_episode: Option<(u32, u32)>,
}

pub struct FileNameParser;

impl FileNameParser {
    /// Parse a media path; only the file stem is considered
    #[must_use]
    pub fn parse(path: &Path) -> ParsedFileName {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

        Self::parse_stem(stem)
    }

    /// Parse a file name without extension
    #[must_use]
    pub fn parse_stem(stem: &str) -> ParsedFileName {
        let patterns = &*PATTERNS;

        let (title, year) = Self::extract_title(stem, patterns);

        ParsedFileName {
            title: Some(title).filter(|t| !t.is_empty()),
            year,
            season_episode: Self::extract_episode(stem, patterns),
        }
    }

    fn extract_title(stem: &str, patterns: &Patterns) -> (String, Option<i32>) {
        // Everything before the first year token is the title
        if let Some(caps) = patterns.year.captures(stem)
            && let Some(whole) = caps.get(0)
        {
            let year = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let title = Self::collapse(&stem[..whole.start()], patterns);
            if !title.is_empty() {
                return (title, year);
            }
        }

        // Episodes without a year stop at the episode marker
        if let Some(m) = patterns.episode_token.find(stem) {
            let title = Self::collapse(&stem[..m.start()], patterns);
            if !title.is_empty() {
                return (title, None);
            }
        }

        let collapsed = Self::collapse(stem, patterns);
        let title = patterns.release_tags.replace(&collapsed, "");

        (title.trim().to_string(), None)
    }

    fn extract_episode(stem: &str, patterns: &Patterns) -> Option<(u32, u32)> {
        let caps = patterns
            .season_episode
            .captures(stem)
            .or_else(|| patterns.season_x_episode.captures(stem))?;

        let season = caps.get(1)?.as_str().parse().ok()?;
        let episode = caps.get(2)?.as_str().parse().ok()?;

        Some((season, episode))
    }

    /// Replace `.`/`_` with spaces and collapse whitespace
    fn collapse(text: &str, patterns: &Patterns) -> String {
        let spaced = text.replace(['.', '_'], " ");

        patterns
            .whitespace
            .replace_all(spaced.trim(), " ")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_movie_with_year() {
        let info = FileNameParser::parse(&PathBuf::from("Inception.2010.1080p.BluRay.x264.mkv"));
        assert_eq!(info.title.as_deref(), Some("Inception"));
        assert_eq!(info.year, Some(2010));
        assert_eq!(info.season_episode, None);
    }

    #[test]
    fn test_parse_movie_with_parens_year() {
        let info = FileNameParser::parse(&PathBuf::from("The Dark Knight (2008) 2160p.mkv"));
        assert_eq!(info.title.as_deref(), Some("The Dark Knight"));
        assert_eq!(info.year, Some(2008));
    }

    #[test]
    fn test_parse_underscores() {
        let info = FileNameParser::parse(&PathBuf::from("/media/The_Big_Lebowski_1998.avi"));
        assert_eq!(info.title.as_deref(), Some("The Big Lebowski"));
        assert_eq!(info.year, Some(1998));
    }

    #[test]
    fn test_year_like_title_keeps_title() {
        let info = FileNameParser::parse(&PathBuf::from("2012.2009.720p.mkv"));
        assert_eq!(info.title.as_deref(), Some("2012"));
        assert_eq!(info.year, Some(2009));
    }

    #[test]
    fn test_parse_without_year_strips_release_tags() {
        let info = FileNameParser::parse(&PathBuf::from("Amelie.1080p.BluRay.x264-GROUP.mkv"));
        assert_eq!(info.title.as_deref(), Some("Amelie"));
        assert_eq!(info.year, None);
    }

    #[test]
    fn test_release_tags_case_insensitive() {
        let info = FileNameParser::parse_stem("Amelie WEBRip HEVC");
        assert_eq!(info.title.as_deref(), Some("Amelie"));
    }

    #[test]
    fn test_parse_episode() {
        let info = FileNameParser::parse(&PathBuf::from("Breaking.Bad.S01E02.720p.HDTV.mkv"));
        assert_eq!(info.title.as_deref(), Some("Breaking Bad"));
        assert_eq!(info.season_episode, Some((1, 2)));
    }

    #[test]
    fn test_parse_episode_x_format() {
        let info = FileNameParser::parse(&PathBuf::from("Friends.1x01.The.Pilot.mkv"));
        assert_eq!(info.title.as_deref(), Some("Friends"));
        assert_eq!(info.season_episode, Some((1, 1)));
    }

    #[test]
    fn test_parse_empty() {
        let info = FileNameParser::parse(&PathBuf::from(""));
        assert_eq!(info, ParsedFileName::default());
    }
}
