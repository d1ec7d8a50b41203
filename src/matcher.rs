/// Filters search results down to a requested season/episode
pub struct EpisodeMatcher;

impl EpisodeMatcher {
    /// Whether `title` names the given season and episode.
    ///
    /// Accepts `SSxEE`, `SxE`, `sSSeEE` and `sSeE` in any letter case.
    #[must_use]
    pub fn matches(season: u32, episode: u32, title: &str) -> bool {
        let title = title.to_lowercase();

        Self::patterns(season, episode)
            .iter()
            .any(|pattern| title.contains(pattern.as_str()))
    }

    /// Apply the filter only when both numbers are known
    #[must_use]
    pub fn accepts(season_episode: Option<(u32, u32)>, title: &str) -> bool {
        season_episode.is_none_or(|(season, episode)| Self::matches(season, episode, title))
    }

    fn patterns(season: u32, episode: u32) -> [String; 4] {
        [
            format!("{season:02}x{episode:02}"),
            format!("{season}x{episode}"),
            format!("s{season:02}e{episode:02}"),
            format!("s{season}e{episode}"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_forms_match_in_any_case() {
        for season in 0..=99 {
            for episode in 0..=99 {
                let titles = [
                    format!("Show S{season:02}E{episode:02} 720p"),
                    format!("show s{season}e{episode}"),
                    format!("Show {season:02}x{episode:02}"),
                    format!("SHOW {season}X{episode}"),
                ];
                for title in &titles {
                    assert!(
                        EpisodeMatcher::matches(season, episode, title),
                        "{title} should match {season}/{episode}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_other_episodes_do_not_match() {
        assert!(!EpisodeMatcher::matches(1, 2, "Breaking Bad S01E03"));
        assert!(!EpisodeMatcher::matches(1, 2, "Breaking Bad S02E01"));
        assert!(!EpisodeMatcher::matches(1, 2, "Breaking Bad 2x01"));
        assert!(!EpisodeMatcher::matches(1, 2, "Breaking Bad (2008)"));
    }

    #[test]
    fn test_matching_is_literal_containment() {
        // "s1e1" is contained in "s1e12"
        assert!(EpisodeMatcher::matches(1, 1, "Show S1E12"));
    }

    #[test]
    fn test_accepts_without_numbers() {
        assert!(EpisodeMatcher::accepts(None, "Inception (2010)"));
        assert!(EpisodeMatcher::accepts(Some((3, 7)), "Lost.S03E07.HDTV"));
        assert!(!EpisodeMatcher::accepts(Some((3, 7)), "Lost.S03E08.HDTV"));
    }
}
