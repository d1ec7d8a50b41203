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
use scraper::Html;

const SAB_BASE_URL: &str = "http://subs.sab.bz";

// Result table columns
const COL_TITLE: usize = 1;
const COL_DATE: usize = 2;
const COL_FPS: usize = 5;
const COL_UPLOADER: usize = 6;
const COL_DOWNLOADS: usize = 9;

/// subs.sab.bz: GET search, HTML table, direct downloads
pub struct SabProvider {
    config: ProviderConfig,
}

impl Default for SabProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SabProvider {
    pub fn new() -> Self {
        Self::with_base_url(SAB_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new(base_url),
        }
    }

    fn parse(&self, body: &str) -> Result<Vec<SubtitleResult>> {
        let document = Html::parse_document(body);
        let row_selector = selector("tr.subs-row")?;
        let cell_selector = selector("td")?;
        let link_selector = selector("a")?;

        let mut results = Vec::new();

        for row in document.select(&row_selector) {
            let cells: Vec<_> = row.select(&cell_selector).collect();

            let Some(link) = cells
                .get(COL_TITLE)
                .and_then(|cell| cell.select(&link_selector).next())
            else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(url) = absolute_url(&self.referer(), href) else {
                continue;
            };
            let Some(id) = query_param(&url, "attach_id") else {
                continue;
            };

            let cell_text = |index: usize| cells.get(index).map(|cell| text(*cell));

            let result = SubtitleResult::new(
                id,
                text(link),
                self.name(),
                self.download_strategy(&url),
            )
            .with_uploaded_at(cell_text(COL_DATE).as_deref().and_then(parse_date))
            .with_fps(cell_text(COL_FPS).as_deref().and_then(parse_decimal))
            .with_uploader(cell_text(COL_UPLOADER))
            .with_downloads(cell_text(COL_DOWNLOADS).as_deref().and_then(parse_count));

            results.push(result);
        }

        Ok(results)
    }
}

impl SubtitleProvider for SabProvider {
    fn id(&self) -> &'static str {
        "sab"
    }

    fn name(&self) -> &'static str {
        "subs.sab.bz"
    }

    fn referer(&self) -> String {
        format!("{}/", self.config.base_url)
    }

    fn search_url(&self, encoded_query: &str, year: Option<i32>) -> String {
        let mut url = format!(
            "{}/index.php?act=search&movie={encoded_query}",
            self.config.base_url
        );
        if let Some(year) = year {
            url.push_str(&format!("&yr={year}"));
        }
        url
    }

    fn download_strategy(&self, url: &str) -> DownloadStrategy {
        DownloadStrategy::direct(url, self.referer())
    }

    fn parse_results(&self, body: &str) -> Vec<SubtitleResult> {
        empty_on_error(self.id(), self.parse(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
<html><body><table>
<tr class="subs-row">
  <td><img src="movie.gif"></td>
  <td><a href="http://subs.sab.bz/index.php?act=download&amp;attach_id=12345">Inception (2010)</a></td>
  <td>05.11.2010</td>
  <td><img alt="bg"></td>
  <td>1</td>
  <td>23,976</td>
  <td><a href="#">Nikolay</a></td>
  <td><a href="https://www.imdb.com/title/tt1375666/">IMDb</a></td>
  <td>3</td>
  <td>1 234</td>
</tr>
<tr class="subs-row">
  <td></td>
  <td><a href="index.php?act=download&amp;attach_id=777">Inception.2010.BDRip</a></td>
</tr>
<tr class="subs-row"><td></td><td>no link</td></tr>
</table></body></html>"##;

    #[test]
    fn test_search_url() {
        let provider = SabProvider::new();
        assert_eq!(
            provider.search_url("Inception", Some(2010)),
            "http://subs.sab.bz/index.php?act=search&movie=Inception&yr=2010"
        );
        assert_eq!(
            provider.search_url("Inception", None),
            "http://subs.sab.bz/index.php?act=search&movie=Inception"
        );
    }

    #[test]
    fn test_parse_results() {
        let results = SabProvider::new().parse_results(PAGE);

        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.id, "12345");
        assert_eq!(first.title, "Inception (2010)");
        assert_eq!(first.provider, "subs.sab.bz");
        assert_eq!(first.downloads, Some(1234));
        assert_eq!(first.fps, Some(23.976));
        assert_eq!(first.uploader.as_deref(), Some("Nikolay"));
        assert!(first.uploaded_at.is_some());
        assert_eq!(
            first.strategy,
            DownloadStrategy::direct(
                "http://subs.sab.bz/index.php?act=download&attach_id=12345",
                "http://subs.sab.bz/"
            )
        );

        let second = &results[1];
        assert_eq!(second.id, "777");
        assert_eq!(second.downloads, None);
        assert_eq!(
            second.strategy.url(),
            "http://subs.sab.bz/index.php?act=download&attach_id=777"
        );
    }

    #[test]
    fn test_parse_garbage_yields_nothing() {
        assert!(SabProvider::new().parse_results("<<<not html").is_empty());
        assert!(SabProvider::new().parse_results("").is_empty());
    }
}
