use regex::Regex;
use std::sync::LazyLock;

/// Pre-compiled regex patterns for file-name parsing
pub struct Patterns {
    // Year token preceded by a separator run: "Inception.2010", "Heat (1995)"
    pub year: Regex,

    // Episode tokens preceded by a separator run: ".S01E02", " 1x02"
    pub episode_token: Regex,

    // Episode markers anywhere in the name
    pub season_episode: Regex,   // S01E01, s1e1
    pub season_x_episode: Regex, // 1x01

    // Trailing run of release tags after separators were collapsed
    pub release_tags: Regex,

    pub whitespace: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            year: Regex::new(r"[\s._\-\(\[]+((?:19|20)\d{2})(?:[\s._\-\)\]]|$)")
                .expect("Invalid year regex"),

            episode_token: Regex::new(
                r"(?i)[\s._\-]+(?:s\d{1,2}e\d{1,3}|\d{1,2}x\d{2,3})(?:[\s._\-]|$)",
            )
            .expect("Invalid episode_token regex"),
            season_episode: Regex::new(r"(?i)\bs(\d{1,2})e(\d{1,3})\b")
                .expect("Invalid season_episode regex"),
            season_x_episode: Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b")
                .expect("Invalid season_x_episode regex"),

            release_tags: Regex::new(
                r"(?i)(?:\s+(?:2160p|1080p|1080i|720p|576p|480p|4k|uhd|hdr|hdr10|bluray|blu-ray|bdrip|brrip|bdremux|remux|dvdrip|dvdscr|dvdr|webrip|web-dl|webdl|web|hdtv|hdrip|hdcam|cam|x264|x265|h\s?264|h\s?265|hevc|avc|xvid|divx|aac|ac3|dts|ddp?5\s1|10bit|proper|repack|extended|unrated|internal|limited)(?:-[a-z0-9]+)?)+$",
            )
            .expect("Invalid release_tags regex"),

            whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global singleton for patterns
pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);
