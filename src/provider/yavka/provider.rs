use crate::{
    Result,
    provider::{
        ProviderConfig, SubtitleProvider, empty_on_error,
        html::{
            absolute_url, parse_count, parse_date, parse_decimal, query_param, selector, text,
        },
    },
    types::{DownloadStrategy, SubtitleResult},
};
use regex::Regex;
use reqwest::{Client, RequestBuilder};
use scraper::Html;
use std::sync::LazyLock;

const YAVKA_BASE_URL: &str = "https://yavka.net";

/// Text of the site's search button, expected in the form post
const SUBMIT_TEXT: &str = "Търсене";

static SUBTITLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/subs/(\d+)/").expect("Invalid subtitle id regex"));

// Result table columns
const COL_TITLE: usize = 0;
const COL_FPS: usize = 1;
const COL_UPLOADER: usize = 2;
const COL_DATE: usize = 3;
const COL_DOWNLOADS: usize = 4;

/// yavka.net: POST search, HTML table, downloads behind a per-subtitle form page
pub struct YavkaProvider {
    config: ProviderConfig,
}

impl Default for YavkaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl YavkaProvider {
    pub fn new() -> Self {
        Self::with_base_url(YAVKA_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new(base_url),
        }
    }

    fn parse(&self, body: &str) -> Result<Vec<SubtitleResult>> {
        let document = Html::parse_document(body);
        let row_selector = selector("tr")?;
        let cell_selector = selector("td")?;
        let link_selector = selector("a.balon")?;

        let mut results = Vec::new();

        for row in document.select(&row_selector) {
            let cells: Vec<_> = row.select(&cell_selector).collect();

            let Some(link) = cells
                .get(COL_TITLE)
                .and_then(|cell| cell.select(&link_selector).next())
            else {
                continue;
            };
            let Some(page_url) = link
                .value()
                .attr("href")
                .and_then(|href| absolute_url(&self.referer(), href))
            else {
                continue;
            };
            let Some(id) = SUBTITLE_ID
                .captures(&page_url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };

            let cell_text = |index: usize| cells.get(index).map(|cell| text(*cell));
            let title = cell_text(COL_TITLE).unwrap_or_else(|| text(link));

            let strategy = self.download_strategy(&page_url);

            let result = SubtitleResult::new(id, title, self.name(), strategy)
                .with_fps(cell_text(COL_FPS).as_deref().and_then(parse_decimal))
                .with_uploader(cell_text(COL_UPLOADER))
                .with_uploaded_at(cell_text(COL_DATE).as_deref().and_then(parse_date))
                .with_downloads(cell_text(COL_DOWNLOADS).as_deref().and_then(parse_count))
                .with_info_url(Some(page_url));

            results.push(result);
        }

        Ok(results)
    }
}

impl SubtitleProvider for YavkaProvider {
    fn id(&self) -> &'static str {
        "yavka"
    }

    fn name(&self) -> &'static str {
        "yavka.net"
    }

    fn referer(&self) -> String {
        format!("{}/", self.config.base_url)
    }

    fn search_url(&self, encoded_query: &str, year: Option<i32>) -> String {
        let year = year.map(|y| y.to_string()).unwrap_or_default();
        format!(
            "{}/subtitles.php?s={encoded_query}&y={year}&l=BG",
            self.config.base_url
        )
    }

    /// The site only answers form posts; unused filters must still be sent empty
    fn search_request(&self, client: &Client, url: &str, raw_query: &str) -> RequestBuilder {
        let year = query_param(url, "y").unwrap_or_default();
        let form = [
            ("s", raw_query),
            ("y", year.as_str()),
            ("c", ""),
            ("u", ""),
            ("l", "BG"),
            ("g", ""),
            ("i", ""),
            ("search", SUBMIT_TEXT),
        ];

        client
            .post(url)
            .header(reqwest::header::REFERER, self.referer())
            .form(&form)
    }

    fn download_strategy(&self, url: &str) -> DownloadStrategy {
        DownloadStrategy::form_page(url, self.referer())
    }

    fn parse_results(&self, body: &str) -> Vec<SubtitleResult> {
        empty_on_error(self.id(), self.parse(body))
    }
}
