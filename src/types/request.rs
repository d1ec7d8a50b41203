use crate::parser::FileNameParser;
use std::collections::HashMap;
use std::path::PathBuf;

/// Inbound search call from the host
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Requested language ("bg", "bul" or "bulgarian")
    pub language: String,
    /// Display name from the library
    pub name: String,
    /// Series name for episodes
    pub series_name: Option<String>,
    /// Production year
    pub year: Option<i32>,
    /// Season number
    pub season: Option<u32>,
    /// Episode number
    pub episode: Option<u32>,
    /// Media file on disk
    pub media_path: Option<PathBuf>,
    /// External ids keyed by namespace (e.g. "Imdb", "Tmdb")
    pub external_ids: HashMap<String, String>,
}

impl SearchRequest {
    pub fn new(language: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_series(mut self, series_name: impl Into<String>) -> Self {
        self.series_name = Some(series_name.into());
        self
    }

    pub fn with_episode(mut self, season: u32, episode: u32) -> Self {
        self.season = Some(season);
        self.episode = Some(episode);
        self
    }

    pub fn with_media_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.media_path = Some(path.into());
        self
    }

    pub fn with_external_id(mut self, namespace: impl Into<String>, id: impl Into<String>) -> Self {
        self.external_ids.insert(namespace.into(), id.into());
        self
    }

    /// Whether the requested language is Bulgarian
    #[must_use]
    pub fn is_bulgarian(&self) -> bool {
        matches!(
            self.language.trim().to_lowercase().as_str(),
            "bg" | "bul" | "bulgarian"
        )
    }

    fn external_id(&self, namespace: &str) -> Option<String> {
        self.external_ids
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(namespace) && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
    }
}

/// Metadata derived once per search and discarded afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<String>,
    pub year: Option<i32>,
    pub is_movie: bool,
    pub is_episode: bool,
    pub series_name: Option<String>,
    pub season_episode: Option<(u32, u32)>,
    /// Title recovered from the media file name
    pub file_title: Option<String>,
}

impl ExtractedMetadata {
    /// Derive metadata from a request, filling gaps from the media file name
    #[must_use]
    pub fn from_request(request: &SearchRequest) -> Self {
        let parsed = request
            .media_path
            .as_deref()
            .map(FileNameParser::parse);

        let season_episode = match (request.season, request.episode) {
            (Some(season), Some(episode)) => Some((season, episode)),
            _ => parsed.as_ref().and_then(|p| p.season_episode),
        };

        let series_name = request
            .series_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let is_episode = series_name.is_some() || season_episode.is_some();

        Self {
            imdb_id: request.external_id("imdb"),
            tmdb_id: request.external_id("tmdb"),
            year: request.year.or_else(|| parsed.as_ref().and_then(|p| p.year)),
            is_movie: !is_episode,
            is_episode,
            series_name,
            season_episode,
            file_title: parsed.and_then(|p| p.title),
        }
    }

    #[must_use]
    pub fn has_external_id(&self) -> bool {
        self.imdb_id.is_some() || self.tmdb_id.is_some()
    }

    /// External id and year are both known
    #[must_use]
    pub fn is_high_confidence(&self) -> bool {
        self.has_external_id() && self.year.is_some()
    }

    /// Enough is known to expect a targeted search to work
    #[must_use]
    pub fn is_reliable(&self) -> bool {
        if self.is_episode {
            self.series_name.is_some() && self.season_episode.is_some()
        } else {
            self.has_external_id() || self.year.is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_check() {
        for lang in ["bg", "BG", "bul", "Bulgarian", " bg "] {
            assert!(SearchRequest::new(lang, "x").is_bulgarian(), "{lang}");
        }
        for lang in ["en", "", "bulg", "bgr"] {
            assert!(!SearchRequest::new(lang, "x").is_bulgarian(), "{lang}");
        }
    }

    #[test]
    fn test_movie_metadata() {
        let request = SearchRequest::new("bg", "Начало")
            .with_year(Some(2010))
            .with_external_id("Imdb", "tt1375666")
            .with_media_path("/movies/Inception.2010.1080p.BluRay.x264.mkv");

        let metadata = ExtractedMetadata::from_request(&request);

        assert!(metadata.is_movie);
        assert!(!metadata.is_episode);
        assert_eq!(metadata.imdb_id.as_deref(), Some("tt1375666"));
        assert_eq!(metadata.tmdb_id, None);
        assert_eq!(metadata.file_title.as_deref(), Some("Inception"));
        assert!(metadata.is_high_confidence());
        assert!(metadata.is_reliable());
    }

    #[test]
    fn test_year_falls_back_to_file_name() {
        let request = SearchRequest::new("bg", "Heat").with_media_path("Heat.1995.mkv");
        let metadata = ExtractedMetadata::from_request(&request);

        assert_eq!(metadata.year, Some(1995));
        assert!(!metadata.is_high_confidence());
        assert!(metadata.is_reliable());
    }

    #[test]
    fn test_episode_metadata() {
        let request = SearchRequest::new("bg", "Pilot")
            .with_series("Breaking Bad")
            .with_episode(1, 1);

        let metadata = ExtractedMetadata::from_request(&request);

        assert!(metadata.is_episode);
        assert!(!metadata.is_movie);
        assert_eq!(metadata.season_episode, Some((1, 1)));
        assert!(metadata.is_reliable());
    }

    #[test]
    fn test_episode_without_numbers_is_not_reliable() {
        let request = SearchRequest::new("bg", "Pilot").with_series("Breaking Bad");
        let metadata = ExtractedMetadata::from_request(&request);

        assert!(metadata.is_episode);
        assert!(!metadata.is_reliable());
    }

    #[test]
    fn test_season_episode_from_file_name() {
        let request =
            SearchRequest::new("bg", "Pilot").with_media_path("Breaking.Bad.S01E02.720p.mkv");
        let metadata = ExtractedMetadata::from_request(&request);

        assert_eq!(metadata.season_episode, Some((1, 2)));
        assert!(metadata.is_episode);
    }
}
