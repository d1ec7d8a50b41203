//! Executes a result's download strategy and turns the bytes into a subtitle.

use crate::{
    DEFAULT_EXTENSION, Result, SubsError, archive,
    provider::{
        HttpClient, HttpResponse, decode,
        html::{absolute_url, selector},
    },
    types::{DownloadStrategy, SubtitleResponse},
};
use encoding_rs::Encoding;
use reqwest::header::REFERER;
use scraper::Html;
use std::io::Cursor;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Download form found on a `FormPage`
#[derive(Debug, Clone, PartialEq, Eq)]
struct DownloadForm {
    action: String,
    fields: Vec<(String, String)>,
}

/// Fetches subtitle files through a [`HttpClient`]
#[derive(Clone)]
pub struct Downloader {
    http: HttpClient,
}

impl Downloader {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Run `strategy` and extract the subtitle it points at.
    ///
    /// Transport failures and non-2xx answers are errors. A form page without
    /// a form, or an archive without a subtitle, is an empty `srt`.
    pub async fn fetch(
        &self,
        strategy: &DownloadStrategy,
        encoding: &'static Encoding,
        cancel: &CancellationToken,
    ) -> Result<SubtitleResponse> {
        let response = match strategy {
            DownloadStrategy::DirectUrl { url, referer } => {
                debug!(url = %url, "downloading subtitle");
                self.get(url, referer, cancel).await?
            }
            DownloadStrategy::FormPage { page_url, referer } => {
                debug!(url = %page_url, "loading download page");
                let page = self.get(page_url, referer, cancel).await?;
                let html = decode(encoding, &page.body);

                let Some(form) = find_form(&html, &page.url)? else {
                    info!(url = %page_url, "download page has no form");
                    return Ok(SubtitleResponse::empty());
                };

                debug!(action = %form.action, fields = form.fields.len(), "submitting download form");
                let request = self
                    .http
                    .inner()
                    .post(&form.action)
                    .header(REFERER, page_url.as_str())
                    .form(&form.fields);
                self.http.fetch(request, cancel).await?
            }
        };

        let fallback = response
            .content_disposition
            .as_deref()
            .and_then(disposition_filename)
            .and_then(|name| file_extension(&name))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        let body = response.body;
        let size = body.len();
        let extracted =
            tokio::task::spawn_blocking(move || archive::extract(Cursor::new(body), &fallback))
                .await
                .map_err(|e| SubsError::Archive(format!("extraction task failed: {e}")))?;

        let (content, extension) = extracted.into_inner();
        debug!(downloaded = size, extracted = content.len(), %extension, "subtitle retrieved");

        Ok(SubtitleResponse::new(content, extension))
    }

    async fn get(
        &self,
        url: &str,
        referer: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        let request = self.http.inner().get(url).header(REFERER, referer);
        self.http.fetch(request, cancel).await
    }
}

/// First form on the page, its action resolved and hidden inputs collected
fn find_form(html: &str, page_url: &str) -> Result<Option<DownloadForm>> {
    let document = Html::parse_document(html);
    let form_selector = selector("form")?;
    let hidden_selector = selector(r#"input[type="hidden"]"#)?;

    let Some(form) = document.select(&form_selector).next() else {
        return Ok(None);
    };

    let action = form
        .value()
        .attr("action")
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .unwrap_or(page_url);
    let action = absolute_url(page_url, action)
        .ok_or_else(|| SubsError::Parse(format!("bad form action {action:?} on {page_url}")))?;

    let fields = form
        .select(&hidden_selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Ok(Some(DownloadForm { action, fields }))
}

/// File name from a `Content-Disposition` header, preferring `filename*`
fn disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;

    for part in header.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');

        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'percent-encoded
                let encoded = value.rsplit_once("''").map_or(value, |(_, name)| name);
                if let Ok(name) = urlencoding::decode(encoded) {
                    return Some(name.into_owned());
                }
            }
            "filename" => plain = Some(value.to_string()),
            _ => {}
        }
    }

    plain.filter(|name| !name.is_empty())
}

fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
}
