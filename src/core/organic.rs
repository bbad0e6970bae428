use crate::core::matching::TargetDomain;
use crate::domain::model::{OrganicQuery, RankOutcome, SerpResponse};
use crate::domain::ports::SearchSource;
use std::sync::Arc;

pub const DEFAULT_MAX_PAGES: u32 = 5;
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 10;

/// 在自然搜尋結果中尋找目標網域的排名
pub struct OrganicRankFinder<S: SearchSource> {
    source: Arc<S>,
    target: TargetDomain,
    max_pages: u32,
    results_per_page: u32,
}

impl<S: SearchSource> OrganicRankFinder<S> {
    pub fn new(source: Arc<S>, target: TargetDomain) -> Self {
        Self {
            source,
            target,
            max_pages: DEFAULT_MAX_PAGES,
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
        }
    }

    pub fn with_pagination(mut self, max_pages: u32, results_per_page: u32) -> Self {
        self.max_pages = max_pages;
        self.results_per_page = results_per_page;
        self
    }

    pub async fn find(&self, keyword: &str) -> RankOutcome {
        tracing::debug!(
            "Searching organic results for '{}' ({} pages, top {})",
            keyword,
            self.max_pages,
            self.max_pages.saturating_mul(self.results_per_page)
        );

        for page in 0..self.max_pages {
            let start = page.saturating_mul(self.results_per_page);
            let query = OrganicQuery {
                keyword: keyword.to_string(),
                start,
            };

            tracing::debug!(
                "Checking page {} of {} (start={})",
                page + 1,
                self.max_pages,
                start
            );

            let results = match self.source.organic(&query).await {
                Ok(SerpResponse::Results(results)) => results,
                Ok(SerpResponse::Error(message)) => {
                    tracing::warn!("✗ Search API error for '{}': {}", keyword, message);
                    return RankOutcome::ApiError(message);
                }
                Err(e) => {
                    tracing::warn!("✗ Organic search failed for '{}': {}", keyword, e);
                    return RankOutcome::ApiError(e.to_string());
                }
            };

            if results.is_empty() {
                if page == 0 {
                    tracing::debug!("No organic results for '{}'", keyword);
                }
                break;
            }

            tracing::debug!("Found {} organic results on page {}", results.len(), page + 1);

            // 超出每頁筆數的結果不計，名次才不會和下一頁重疊
            let page_size = self.results_per_page as usize;
            for (idx, result) in results.iter().take(page_size).enumerate() {
                let Some(link) = result.link.as_deref().filter(|l| !l.is_empty()) else {
                    continue;
                };

                match self.target.matches_link(link) {
                    Ok(true) => {
                        let position = start.saturating_add(idx as u32 + 1);
                        tracing::info!(
                            "✓ Found {} at organic position {}: {} ({})",
                            self.target.as_str(),
                            position,
                            link,
                            result.title.as_deref().unwrap_or("untitled")
                        );
                        return RankOutcome::Found(position);
                    }
                    Ok(false) => {}
                    Err(e) => tracing::debug!("Skipping unparseable link '{}': {}", link, e),
                }
            }
        }

        RankOutcome::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LocalListing, LocalQuery, OrganicResult};
    use crate::utils::error::{RankError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    enum Page {
        Results(Vec<OrganicResult>),
        ApiError(&'static str),
        Transport,
    }

    struct ScriptedSource {
        pages: Vec<Page>,
        queries: Mutex<Vec<OrganicQuery>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Page>) -> Self {
            Self {
                pages,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn starts(&self) -> Vec<u32> {
            self.queries.lock().unwrap().iter().map(|q| q.start).collect()
        }
    }

    #[async_trait]
    impl SearchSource for ScriptedSource {
        async fn organic(&self, query: &OrganicQuery) -> Result<SerpResponse<OrganicResult>> {
            let page = {
                let mut queries = self.queries.lock().unwrap();
                queries.push(query.clone());
                queries.len() - 1
            };
            match self.pages.get(page) {
                Some(Page::Results(results)) => Ok(SerpResponse::Results(results.clone())),
                Some(Page::ApiError(message)) => Ok(SerpResponse::Error(message.to_string())),
                Some(Page::Transport) => Err(RankError::HttpStatusError { status: 502 }),
                None => Ok(SerpResponse::Results(Vec::new())),
            }
        }

        async fn local(&self, _query: &LocalQuery) -> Result<SerpResponse<LocalListing>> {
            unreachable!("organic finder never issues local queries")
        }
    }

    fn result(link: &str) -> OrganicResult {
        OrganicResult {
            link: Some(link.to_string()),
            ..Default::default()
        }
    }

    fn unrelated_page() -> Vec<OrganicResult> {
        (0..10)
            .map(|i| result(&format!("https://site{}.example.org/page", i)))
            .collect()
    }

    fn finder(source: Arc<ScriptedSource>) -> OrganicRankFinder<ScriptedSource> {
        OrganicRankFinder::new(source, TargetDomain::new("omorganickitchen.com"))
    }

    #[tokio::test]
    async fn test_match_on_second_page_adds_page_offset() {
        let mut second = unrelated_page();
        second[2] = result("https://www.omorganickitchen.com/cookies");
        let source = Arc::new(ScriptedSource::new(vec![
            Page::Results(unrelated_page()),
            Page::Results(second),
        ]));

        let outcome = finder(source.clone()).find("organic cookies").await;

        assert_eq!(outcome, RankOutcome::Found(13));
        assert_eq!(source.starts(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let mut page = unrelated_page();
        page[1] = result("https://omorganickitchen.com/a");
        page[4] = result("https://omorganickitchen.com/b");
        let source = Arc::new(ScriptedSource::new(vec![Page::Results(page)]));

        assert_eq!(finder(source).find("k").await, RankOutcome::Found(2));
    }

    #[tokio::test]
    async fn test_empty_page_stops_pagination() {
        let mut third = unrelated_page();
        third[0] = result("https://omorganickitchen.com");
        let source = Arc::new(ScriptedSource::new(vec![
            Page::Results(unrelated_page()),
            Page::Results(Vec::new()),
            Page::Results(third),
        ]));

        let outcome = finder(source.clone()).find("healthy snacks").await;

        assert_eq!(outcome, RankOutcome::NotFound);
        assert_eq!(source.starts(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_scans_at_most_five_pages() {
        let pages = (0..6).map(|_| Page::Results(unrelated_page())).collect();
        let source = Arc::new(ScriptedSource::new(pages));

        let outcome = finder(source.clone()).find("snacks").await;

        assert_eq!(outcome, RankOutcome::NotFound);
        assert_eq!(source.starts(), vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_api_error_aborts_search() {
        let source = Arc::new(ScriptedSource::new(vec![
            Page::Results(unrelated_page()),
            Page::ApiError("Invalid API key."),
            Page::Results(vec![result("https://omorganickitchen.com")]),
        ]));

        let outcome = finder(source.clone()).find("snacks").await;

        assert_eq!(outcome, RankOutcome::ApiError("Invalid API key.".to_string()));
        assert_eq!(outcome.rank(), crate::domain::model::Rank::NotFound);
        assert_eq!(source.starts(), vec![0, 10]);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_found() {
        let source = Arc::new(ScriptedSource::new(vec![Page::Transport]));

        let outcome = finder(source).find("snacks").await;

        assert!(matches!(outcome, RankOutcome::ApiError(_)));
        assert!(!outcome.rank().is_found());
    }

    #[tokio::test]
    async fn test_results_without_links_keep_their_position() {
        let page = vec![
            OrganicResult::default(),
            result("not a url with spaces http://[::1"),
            result("https://omorganickitchen.com"),
        ];
        let source = Arc::new(ScriptedSource::new(vec![Page::Results(page)]));

        assert_eq!(finder(source).find("k").await, RankOutcome::Found(3));
    }

    #[tokio::test]
    async fn test_extra_results_beyond_page_size_are_ignored() {
        let mut pages: Vec<Page> = (0..4).map(|_| Page::Results(unrelated_page())).collect();
        let mut last = unrelated_page();
        last.push(result("https://omorganickitchen.com"));
        pages.push(Page::Results(last));
        let source = Arc::new(ScriptedSource::new(pages));

        let outcome = finder(source.clone()).find("snacks").await;

        assert_eq!(outcome, RankOutcome::NotFound);
        assert_eq!(source.starts(), vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_rank_never_exceeds_pages_times_page_size() {
        let mut pages: Vec<Page> = (0..4).map(|_| Page::Results(unrelated_page())).collect();
        let mut last = unrelated_page();
        last[9] = result("https://omorganickitchen.com");
        last.push(result("https://omorganickitchen.com/extra"));
        pages.push(Page::Results(last));
        let source = Arc::new(ScriptedSource::new(pages));

        assert_eq!(finder(source).find("snacks").await, RankOutcome::Found(50));
    }

    #[tokio::test]
    async fn test_huge_pagination_does_not_overflow() {
        let source = Arc::new(ScriptedSource::new(vec![
            Page::Results(vec![result("https://a.org")]),
            Page::Results(Vec::new()),
        ]));

        let outcome = finder(source.clone())
            .with_pagination(u32::MAX, u32::MAX)
            .find("k")
            .await;

        assert_eq!(outcome, RankOutcome::NotFound);
        assert_eq!(source.starts(), vec![0, u32::MAX]);
    }

    #[tokio::test]
    async fn test_custom_pagination() {
        let page = vec![result("https://a.org"), result("https://omorganickitchen.com")];
        let source = Arc::new(ScriptedSource::new(vec![
            Page::Results(vec![result("https://a.org"), result("https://b.org")]),
            Page::Results(page),
        ]));

        let outcome = finder(source.clone())
            .with_pagination(3, 2)
            .find("k")
            .await;

        assert_eq!(outcome, RankOutcome::Found(4));
        assert_eq!(source.starts(), vec![0, 2]);
    }
}
