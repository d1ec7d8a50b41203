use super::api_types::{SearchResponse, Subtitle};
use crate::{
    Result,
    provider::{
        ProviderConfig, SubtitleProvider, empty_on_error,
        html::{parse_count, parse_decimal},
    },
    types::{DownloadStrategy, SubtitleResult},
};
use chrono::DateTime;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

const PODNAPISI_BASE_URL: &str = "https://www.podnapisi.net";

/// podnapisi.net legacy XML API, filtered to Bulgarian
pub struct PodnapisiProvider {
    config: ProviderConfig,
}

impl Default for PodnapisiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PodnapisiProvider {
    pub fn new() -> Self {
        Self::with_base_url(PODNAPISI_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new(base_url),
        }
    }

    fn parse(&self, body: &str) -> Result<Vec<SubtitleResult>> {
        let response: SearchResponse = quick_xml::de::from_str(body)?;

        Ok(response
            .subtitles
            .into_iter()
            .filter_map(|s| self.subtitle_to_result(s))
            .collect())
    }

    /// Records without id, download id or title are skipped
    fn subtitle_to_result(&self, subtitle: Subtitle) -> Option<SubtitleResult> {
        if subtitle.id.trim().is_empty()
            || subtitle.pid.trim().is_empty()
            || subtitle.title.trim().is_empty()
        {
            debug!(id = %subtitle.id, "skipping incomplete subtitle record");
            return None;
        }

        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut title = subtitle.title.trim().to_string();
        if let Some(year) = non_empty(subtitle.year) {
            title.push_str(&format!(" ({year})"));
        }
        if let Some(release) = non_empty(subtitle.release) {
            title.push_str(&format!(" {release}"));
        }

        let download_url = format!(
            "{}/subtitles/{}/download",
            self.config.base_url,
            subtitle.pid.trim()
        );

        let uploaded_at = non_empty(subtitle.time)
            .and_then(|t| t.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        let result = SubtitleResult::new(
            subtitle.id.trim(),
            title,
            self.name(),
            self.download_strategy(&download_url),
        )
        .with_format(non_empty(subtitle.format).map(|f| format_extension(&f)))
        .with_uploader(non_empty(subtitle.uploader_name))
        .with_downloads(non_empty(subtitle.downloads).as_deref().and_then(parse_count))
        .with_fps(non_empty(subtitle.fps).as_deref().and_then(parse_decimal))
        .with_rating(non_empty(subtitle.rating).as_deref().and_then(parse_decimal))
        .with_uploaded_at(uploaded_at)
        .with_info_url(non_empty(subtitle.url));

        Some(result)
    }
}

/// Map the API's format names to file extensions
fn format_extension(format: &str) -> String {
    match format.to_lowercase().as_str() {
        "subrip" | "srt" => "srt".to_string(),
        "microdvd" | "subviewer" | "sub" => "sub".to_string(),
        "advanced substation alpha" | "ass" => "ass".to_string(),
        "substation alpha" | "ssa" => "ssa".to_string(),
        other => other.to_string(),
    }
}

impl SubtitleProvider for PodnapisiProvider {
    fn id(&self) -> &'static str {
        "podnapisi"
    }

    fn name(&self) -> &'static str {
        "podnapisi.net"
    }

    fn referer(&self) -> String {
        format!("{}/", self.config.base_url)
    }

    fn search_url(&self, encoded_query: &str, year: Option<i32>) -> String {
        let mut url = format!(
            "{}/subtitles/search/old?sXML=1&sL=bg&sK={encoded_query}",
            self.config.base_url
        );
        if let Some(year) = year {
            url.push_str(&format!("&sY={year}"));
        }
        url
    }

    fn download_strategy(&self, url: &str) -> DownloadStrategy {
        DownloadStrategy::direct(url, self.referer())
    }

    /// The API answers in UTF-8
    fn encoding(&self) -> &'static Encoding {
        UTF_8
    }

    fn parse_results(&self, body: &str) -> Vec<SubtitleResult> {
        empty_on_error(self.id(), self.parse(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<results>
  <pagination><current>1</current><count>1</count><results>2</results></pagination>
  <subtitle>
    <id>1001</id>
    <pid>aBcD</pid>
    <title>Inception</title>
    <year>2010</year>
    <url>https://www.podnapisi.net/subtitles/bg-inception-2010/aBcD</url>
    <uploaderName>maria</uploaderName>
    <release>Inception.2010.720p.BluRay</release>
    <format>SubRip</format>
    <fps>23.976</fps>
    <rating>4.5</rating>
    <downloads>420</downloads>
    <time>1289000000</time>
  </subtitle>
  <subtitle>
    <id>1002</id>
    <pid>eFgH</pid>
    <title>Inception</title>
  </subtitle>
</results>"#;

    #[test]
    fn test_search_url() {
        assert_eq!(
            PodnapisiProvider::new().search_url("Inception", Some(2010)),
            "https://www.podnapisi.net/subtitles/search/old?sXML=1&sL=bg&sK=Inception&sY=2010"
        );
    }

    #[test]
    fn test_parse_results() {
        let results = PodnapisiProvider::new().parse_results(XML);

        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.id, "1001");
        assert_eq!(first.title, "Inception (2010) Inception.2010.720p.BluRay");
        assert_eq!(first.provider, "podnapisi.net");
        assert_eq!(first.format.as_deref(), Some("srt"));
        assert_eq!(first.downloads, Some(420));
        assert_eq!(first.rating, Some(4.5));
        assert_eq!(first.uploader.as_deref(), Some("maria"));
        assert!(first.uploaded_at.is_some());
        assert_eq!(
            first.strategy,
            DownloadStrategy::direct(
                "https://www.podnapisi.net/subtitles/aBcD/download",
                "https://www.podnapisi.net/"
            )
        );

        let second = &results[1];
        assert_eq!(second.title, "Inception");
        assert_eq!(second.downloads, None);
    }

    #[test]
    fn test_incomplete_record_does_not_drop_page() {
        let xml = r#"<results>
  <subtitle><id>1</id><pid>aaa</pid><title>Heat</title><downloads>3</downloads></subtitle>
  <subtitle><id>2</id><title>Heat</title></subtitle>
  <subtitle><pid>ccc</pid><title>Heat</title></subtitle>
</results>"#;

        let results = PodnapisiProvider::new().parse_results(xml);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");
        assert_eq!(results[0].downloads, Some(3));
    }

    #[test]
    fn test_parse_empty_results() {
        let results = PodnapisiProvider::new().parse_results("<results></results>");
        assert!(results.is_empty());
    }

    #[test]
    fn test_malformed_xml_yields_nothing() {
        let results = PodnapisiProvider::new().parse_results("<results><subtitle><id>1</id>");
        assert!(results.is_empty());
    }

    #[test]
    fn test_uses_utf8() {
        assert_eq!(PodnapisiProvider::new().encoding(), UTF_8);
    }
}
