use crate::{
    Result, SubsError,
    composite_id::SubtitleId,
    downloader::Downloader,
    matcher::EpisodeMatcher,
    metadata::{NoopTitleLookup, TitleLookup},
    provider::{HttpClient, SubtitleProvider, decode},
    query::{DEFAULT_MAX_QUERIES, MAX_QUERIES_CAP, QueryBuilder, QueryTerm},
    types::{ExtractedMetadata, RemoteSubtitle, SearchRequest, SubtitleResponse},
};
use std::cmp::Reverse;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What happened to one (provider, query) attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The site answered; `parsed` rows were read and `kept` survived episode filtering
    Completed { parsed: usize, kept: usize },
    /// Timeout, transport or status failure
    Failed(String),
}

/// One search attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub provider: String,
    pub query: String,
    pub outcome: AttemptOutcome,
}

/// Ranked results plus a record of every attempt made to find them
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub results: Vec<RemoteSubtitle>,
    pub attempts: Vec<AttemptReport>,
}

impl SearchReport {
    /// Attempts that failed
    pub fn failures(&self) -> impl Iterator<Item = &AttemptReport> {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, AttemptOutcome::Failed(_)))
    }
}

/// Searches every provider and retrieves subtitles by composite id.
///
/// Holds no mutable state: concurrent calls each build their own accumulator.
pub struct SubtitleManager {
    providers: Vec<Arc<dyn SubtitleProvider>>,
    http: HttpClient,
    downloader: Downloader,
    lookup: Arc<dyn TitleLookup>,
    max_queries: usize,
}

impl SubtitleManager {
    /// Create a manager without providers
    pub fn new(http: HttpClient) -> Self {
        Self {
            providers: Vec::new(),
            downloader: Downloader::new(http.clone()),
            http,
            lookup: Arc::new(NoopTitleLookup),
            max_queries: DEFAULT_MAX_QUERIES,
        }
    }

    /// Builder pattern: query variations per provider, clamped to `1..=3`
    #[must_use]
    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.clamp(1, MAX_QUERIES_CAP);
        self
    }

    /// Builder pattern: set the original-title lookup
    #[must_use]
    pub fn with_title_lookup(mut self, lookup: Arc<dyn TitleLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Add a provider; providers are searched in insertion order
    pub fn add_provider<P: SubtitleProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Arc::new(provider));
    }

    pub fn add_shared_provider(&mut self, provider: Arc<dyn SubtitleProvider>) {
        self.providers.push(provider);
    }

    /// Get all providers
    pub fn providers(&self) -> &[Arc<dyn SubtitleProvider>] {
        &self.providers
    }

    fn provider(&self, id: &str) -> Option<&Arc<dyn SubtitleProvider>> {
        self.providers
            .iter()
            .find(|p| p.id().eq_ignore_ascii_case(id))
    }

    /// Search all providers, most downloaded first.
    ///
    /// Only cancellation is an error; everything else is at worst an empty list.
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteSubtitle>> {
        Ok(self.search_with_report(request, cancel).await?.results)
    }

    /// [`search`](Self::search), also reporting each attempt
    pub async fn search_with_report(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchReport> {
        let mut report = SearchReport::default();

        if !request.is_bulgarian() {
            debug!("Skipping subtitle search for language {:?}", request.language);
            return Ok(report);
        }

        let metadata = ExtractedMetadata::from_request(request);
        let display_name = self.display_name(request).await;
        let terms = QueryBuilder::new(self.max_queries).build(&metadata, &display_name);

        info!(
            "Searching subtitles: {} ({} queries, {} providers)",
            display_name,
            terms.len(),
            self.providers.len()
        );

        if !metadata.is_reliable() {
            debug!("Search metadata for {} is incomplete", display_name);
        }

        for provider in &self.providers {
            for term in &terms {
                if cancel.is_cancelled() {
                    return Err(SubsError::Cancelled);
                }

                let outcome = match self.attempt(provider.as_ref(), term, &metadata, cancel).await {
                    Ok(found) => {
                        // Results that arrive after cancellation are dropped
                        if cancel.is_cancelled() {
                            return Err(SubsError::Cancelled);
                        }
                        let outcome = AttemptOutcome::Completed {
                            parsed: found.parsed,
                            kept: found.kept.len(),
                        };
                        report.results.extend(found.kept);
                        outcome
                    }
                    Err(SubsError::Cancelled) => return Err(SubsError::Cancelled),
                    Err(e) => {
                        warn!("Provider {} failed for {:?}: {}", provider.id(), term.raw, e);
                        AttemptOutcome::Failed(e.to_string())
                    }
                };

                report.attempts.push(AttemptReport {
                    provider: provider.id().to_string(),
                    query: term.raw.clone(),
                    outcome,
                });
            }
        }

        // Stable: ties keep discovery order
        report
            .results
            .sort_by_key(|subtitle| Reverse(subtitle.result.rank_downloads()));

        info!(
            "Found {} subtitles for {} ({} failed attempts)",
            report.results.len(),
            display_name,
            report.failures().count()
        );

        Ok(report)
    }

    /// Retrieve a subtitle by the composite id from a search result.
    ///
    /// Malformed ids and unknown providers give an empty `srt`.
    pub async fn get_subtitle(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<SubtitleResponse> {
        let id = match SubtitleId::decode(id) {
            Ok(id) => id,
            Err(e) => {
                warn!("Cannot retrieve subtitle: {}", e);
                return Ok(SubtitleResponse::empty());
            }
        };

        let Some(provider) = self.provider(&id.provider) else {
            warn!("Cannot retrieve subtitle: provider not found: {}", id.provider);
            return Ok(SubtitleResponse::empty());
        };

        let strategy = id.strategy(provider.as_ref());
        debug!("Retrieving subtitle from {}: {}", provider.id(), strategy.url());

        let response = self
            .downloader
            .fetch(&strategy, provider.encoding(), cancel)
            .await?;

        info!(
            "Retrieved subtitle from {} ({} bytes, {})",
            provider.id(),
            response.stream.get_ref().len(),
            response.format
        );

        Ok(response)
    }

    /// Original title from the lookup, else the series name for episodes, else the request name
    async fn display_name(&self, request: &SearchRequest) -> String {
        if let Some(path) = request.media_path.as_deref() {
            match self.lookup.find_original_title_by_path(path).await {
                Ok(Some(title)) if !title.trim().is_empty() => return title.trim().to_string(),
                Ok(_) => {}
                Err(e) => debug!("Original title lookup failed for {}: {}", path.display(), e),
            }
        }

        request
            .series_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| request.name.trim())
            .to_string()
    }

    /// One provider, one query
    async fn attempt(
        &self,
        provider: &dyn SubtitleProvider,
        term: &QueryTerm,
        metadata: &ExtractedMetadata,
        cancel: &CancellationToken,
    ) -> Result<Attempt> {
        let url = provider.search_url(&term.encoded, metadata.year);
        debug!("Searching {} for {:?}: {}", provider.id(), term.raw, url);

        let request = provider.search_request(self.http.inner(), &url, &term.raw);
        let response = self.http.fetch(request, cancel).await?;

        let body = decode(provider.encoding(), &response.body);
        let parsed = provider.parse_results(&body);
        let parsed_count = parsed.len();

        let kept: Vec<RemoteSubtitle> = parsed
            .into_iter()
            .filter(|result| EpisodeMatcher::accepts(metadata.season_episode, &result.title))
            .map(|result| RemoteSubtitle {
                id: SubtitleId::new(provider.id(), result.strategy.clone()).encode(),
                provider_id: provider.id().to_string(),
                result,
            })
            .collect();

        debug!(
            "Provider {} returned {} results for {:?}, kept {}",
            provider.id(),
            parsed_count,
            term.raw,
            kept.len()
        );

        Ok(Attempt {
            parsed: parsed_count,
            kept,
        })
    }
}

struct Attempt {
    parsed: usize,
    kept: Vec<RemoteSubtitle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DEFAULT_USER_AGENT;
    use async_trait::async_trait;
    use std::path::Path;
    use std::time::Duration;

    struct FixedTitle(Option<&'static str>);

    #[async_trait]
    impl TitleLookup for FixedTitle {
        async fn find_original_title_by_path(&self, _path: &Path) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl TitleLookup for FailingLookup {
        async fn find_original_title_by_path(&self, _path: &Path) -> Result<Option<String>> {
            Err(SubsError::Parse("library unavailable".to_string()))
        }
    }

    fn manager() -> SubtitleManager {
        SubtitleManager::new(HttpClient::new(DEFAULT_USER_AGENT, Duration::from_secs(1)).unwrap())
    }

    #[tokio::test]
    async fn test_display_name_prefers_lookup() {
        let manager = manager().with_title_lookup(Arc::new(FixedTitle(Some("The Wire"))));
        let request = SearchRequest::new("bg", "Наркомания")
            .with_media_path("/tv/wire/s01e01.mkv");

        assert_eq!(manager.display_name(&request).await, "The Wire");
    }

    #[tokio::test]
    async fn test_display_name_uses_series_for_episodes() {
        let request = SearchRequest::new("bg", "Pilot")
            .with_series("Breaking Bad")
            .with_episode(1, 1);

        assert_eq!(manager().display_name(&request).await, "Breaking Bad");
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_name() {
        let manager = manager().with_title_lookup(Arc::new(FailingLookup));
        let request = SearchRequest::new("bg", "Inception").with_media_path("/m/x.mkv");

        assert_eq!(manager.display_name(&request).await, "Inception");

        let empty = manager_with_lookup(FixedTitle(Some("  ")));
        assert_eq!(empty.display_name(&request).await, "Inception");
    }

    fn manager_with_lookup(lookup: impl TitleLookup + 'static) -> SubtitleManager {
        manager().with_title_lookup(Arc::new(lookup))
    }

    #[tokio::test]
    async fn test_non_bulgarian_request_is_empty() {
        let mut manager = manager();
        manager.add_provider(crate::provider::SabProvider::with_base_url("http://127.0.0.1:9"));

        let report = manager
            .search_with_report(&SearchRequest::new("en", "Inception"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.results.is_empty());
        assert!(report.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_gives_empty_response() {
        let response = manager()
            .get_subtitle("definitely not an id", &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.is_empty());
        assert_eq!(response.format, "srt");
        assert_eq!(response.language, "bul");
    }

    #[tokio::test]
    async fn test_unknown_provider_gives_empty_response() {
        let response = manager()
            .get_subtitle("nowhere|http://example.com/x", &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.is_empty());
    }

    #[test]
    fn test_max_queries_clamped() {
        assert_eq!(manager().with_max_queries(0).max_queries, 1);
        assert_eq!(manager().with_max_queries(7).max_queries, 3);
    }
}
