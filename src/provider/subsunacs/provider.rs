use crate::{
    Result,
    provider::{
        ProviderConfig, SubtitleProvider, empty_on_error,
        html::{absolute_url, parse_count, parse_decimal, selector, text},
    },
    types::{DownloadStrategy, SubtitleResult},
};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

const SUBSUNACS_BASE_URL: &str = "https://subsunacs.net";

static SUBTITLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)/?$").expect("Invalid subtitle id regex"));

// Result table columns
const COL_TITLE: usize = 0;
const COL_FPS: usize = 2;
const COL_RATING: usize = 3;
const COL_UPLOADER: usize = 4;
const COL_DOWNLOADS: usize = 5;

/// subsunacs.net: GET search, HTML table, direct downloads by entry id
pub struct SubsunacsProvider {
    config: ProviderConfig,
}

impl Default for SubsunacsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SubsunacsProvider {
    pub fn new() -> Self {
        Self::with_base_url(SUBSUNACS_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new(base_url),
        }
    }

    fn download_url(&self, id: &str) -> String {
        format!("{}/getentry.php?id={id}&ei=0", self.config.base_url)
    }

    fn parse(&self, body: &str) -> Result<Vec<SubtitleResult>> {
        let document = Html::parse_document(body);
        let row_selector = selector("table#tblSubs tr")?;
        let cell_selector = selector("td")?;
        let link_selector = selector("a.tooltip")?;

        let mut results = Vec::new();

        for row in document.select(&row_selector) {
            let cells: Vec<_> = row.select(&cell_selector).collect();

            let Some(title_cell) = cells.get(COL_TITLE) else {
                continue;
            };
            let Some(href) = title_cell
                .select(&link_selector)
                .next()
                .and_then(|link| link.value().attr("href"))
            else {
                continue;
            };
            let Some(id) = SUBTITLE_ID
                .captures(href)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };

            let cell_text = |index: usize| cells.get(index).map(|cell| text(*cell));
            let strategy = self.download_strategy(&self.download_url(&id));

            let result = SubtitleResult::new(id, text(*title_cell), self.name(), strategy)
                .with_fps(cell_text(COL_FPS).as_deref().and_then(parse_decimal))
                .with_rating(cell_text(COL_RATING).as_deref().and_then(parse_decimal))
                .with_uploader(cell_text(COL_UPLOADER))
                .with_downloads(cell_text(COL_DOWNLOADS).as_deref().and_then(parse_count))
                .with_info_url(absolute_url(&self.referer(), href));

            results.push(result);
        }

        Ok(results)
    }
}

impl SubtitleProvider for SubsunacsProvider {
    fn id(&self) -> &'static str {
        "subsunacs"
    }

    fn name(&self) -> &'static str {
        "subsunacs.net"
    }

    fn referer(&self) -> String {
        format!("{}/", self.config.base_url)
    }

    fn search_url(&self, encoded_query: &str, year: Option<i32>) -> String {
        let year = year.map(|y| y.to_string()).unwrap_or_default();
        format!(
            "{}/search.php?m={encoded_query}&y={year}&t=Submit",
            self.config.base_url
        )
    }

    fn download_strategy(&self, url: &str) -> DownloadStrategy {
        DownloadStrategy::direct(url, self.referer())
    }

    fn parse_results(&self, body: &str) -> Vec<SubtitleResult> {
        empty_on_error(self.id(), self.parse(body))
    }
}
