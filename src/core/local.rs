use crate::core::matching::TargetDomain;
use crate::domain::model::{LocalListing, LocalQuery, RankOutcome, SerpResponse};
use crate::domain::ports::SearchSource;
use crate::utils::error::Result;
use std::sync::Arc;

/// 本地商家清單中命中的欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMatch {
    Website,
    Title,
    Link,
}

/// 在地圖 / Local Pack 結果中尋找目標網域的排名
pub struct LocalRankFinder<S: SearchSource> {
    source: Arc<S>,
    target: TargetDomain,
    title_fragments: Vec<String>,
}

impl<S: SearchSource> LocalRankFinder<S> {
    pub fn new(source: Arc<S>, target: TargetDomain, title_fragments: &[String]) -> Self {
        let title_fragments = title_fragments
            .iter()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();

        Self {
            source,
            target,
            title_fragments,
        }
    }

    pub async fn find(&self, keyword: &str) -> RankOutcome {
        tracing::debug!("Searching local listings for '{}'", keyword);

        let query = LocalQuery {
            keyword: keyword.to_string(),
        };

        let listings = match self.source.local(&query).await {
            Ok(SerpResponse::Results(listings)) => listings,
            Ok(SerpResponse::Error(message)) => {
                tracing::warn!("✗ Search API error for '{}': {}", keyword, message);
                return RankOutcome::ApiError(message);
            }
            Err(e) => {
                tracing::warn!("✗ Local search failed for '{}': {}", keyword, e);
                return RankOutcome::ApiError(e.to_string());
            }
        };

        if listings.is_empty() {
            tracing::debug!("No local results for '{}'", keyword);
            return RankOutcome::NotFound;
        }

        tracing::debug!("Found {} local results", listings.len());

        for (idx, listing) in listings.iter().enumerate() {
            let position = idx as u32 + 1;
            match self.match_listing(listing) {
                Ok(Some(field)) => {
                    tracing::info!(
                        "✓ Found {} in local results at position {} (matched on {:?}): {} [{}]",
                        self.target.as_str(),
                        position,
                        field,
                        listing.title.as_deref().unwrap_or("untitled"),
                        listing.address.as_deref().unwrap_or("no address")
                    );
                    return RankOutcome::Found(position);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("Skipping local listing {}: {}", position, e);
                }
            }
        }

        RankOutcome::NotFound
    }

    /// 依序檢查 website、title、link，第一個命中的欄位勝出
    pub fn match_listing(&self, listing: &LocalListing) -> Result<Option<ListingMatch>> {
        if let Some(website) = non_empty(&listing.website) {
            if self.target.matches_link(website)? {
                return Ok(Some(ListingMatch::Website));
            }
        }

        if let Some(title) = non_empty(&listing.title) {
            let title = title.to_lowercase();
            if self.title_fragments.iter().any(|f| title.contains(f.as_str())) {
                return Ok(Some(ListingMatch::Title));
            }
        }

        if let Some(link) = non_empty(&listing.link) {
            if self.target.matches_link(link)? {
                return Ok(Some(ListingMatch::Link));
            }
        }

        Ok(None)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OrganicQuery, OrganicResult};
    use crate::utils::error::RankError;
    use async_trait::async_trait;

    enum Reply {
        Listings(Vec<LocalListing>),
        ApiError(&'static str),
        Transport,
    }

    struct ScriptedSource {
        reply: Reply,
    }

    #[async_trait]
    impl SearchSource for ScriptedSource {
        async fn organic(&self, _query: &OrganicQuery) -> Result<SerpResponse<OrganicResult>> {
            unreachable!("local finder never issues organic queries")
        }

        async fn local(&self, _query: &LocalQuery) -> Result<SerpResponse<LocalListing>> {
            match &self.reply {
                Reply::Listings(listings) => Ok(SerpResponse::Results(listings.clone())),
                Reply::ApiError(message) => Ok(SerpResponse::Error(message.to_string())),
                Reply::Transport => Err(RankError::HttpStatusError { status: 503 }),
            }
        }
    }

    fn listing(title: &str, website: Option<&str>, link: Option<&str>) -> LocalListing {
        LocalListing {
            title: Some(title.to_string()),
            website: website.map(str::to_string),
            link: link.map(str::to_string),
            ..Default::default()
        }
    }

    fn finder(reply: Reply) -> LocalRankFinder<ScriptedSource> {
        let fragments = vec![
            "omorganic".to_string(),
            "om organic".to_string(),
            "omorganickitchen".to_string(),
        ];
        LocalRankFinder::new(
            Arc::new(ScriptedSource { reply }),
            TargetDomain::new("omorganickitchen.com"),
            &fragments,
        )
    }

    #[tokio::test]
    async fn test_match_on_website() {
        let finder = finder(Reply::Listings(vec![
            listing("Green Bowl", Some("https://greenbowl.in"), None),
            listing("Kitchen", Some("https://www.omorganickitchen.com/"), None),
        ]));

        assert_eq!(finder.find("organic food").await, RankOutcome::Found(2));
    }

    #[tokio::test]
    async fn test_match_on_title_fragment() {
        let finder = finder(Reply::Listings(vec![
            listing("Green Bowl", None, None),
            listing("Cafe", None, None),
            listing("OM Organic Kitchen - Sector 18", None, None),
        ]));

        assert_eq!(finder.find("organic food").await, RankOutcome::Found(3));
    }

    #[tokio::test]
    async fn test_match_on_link() {
        let finder = finder(Reply::Listings(vec![listing(
            "Kitchen",
            Some("https://facebook.com/kitchen"),
            Some("https://omorganickitchen.com/noida"),
        )]));

        assert_eq!(finder.find("organic food").await, RankOutcome::Found(1));
    }

    #[test]
    fn test_website_checked_before_title_and_link() {
        let finder = finder(Reply::Listings(Vec::new()));
        let both = listing(
            "OM Organic",
            Some("https://omorganickitchen.com"),
            Some("https://omorganickitchen.com"),
        );
        assert_eq!(finder.match_listing(&both).unwrap(), Some(ListingMatch::Website));

        let title_and_link = listing("OM Organic", None, Some("https://omorganickitchen.com"));
        assert_eq!(
            finder.match_listing(&title_and_link).unwrap(),
            Some(ListingMatch::Title)
        );
    }

    #[tokio::test]
    async fn test_first_matching_listing_wins() {
        let finder = finder(Reply::Listings(vec![
            listing("Other", None, Some("https://omorganickitchen.com")),
            listing("Kitchen", Some("https://omorganickitchen.com"), None),
        ]));

        assert_eq!(finder.find("organic food").await, RankOutcome::Found(1));
    }

    #[tokio::test]
    async fn test_listing_error_is_skipped() {
        let finder = finder(Reply::Listings(vec![
            listing("OM Organic", Some("http://[::1"), None),
            listing("Kitchen", Some("https://omorganickitchen.com"), None),
        ]));

        assert_eq!(finder.find("organic food").await, RankOutcome::Found(2));
    }

    #[tokio::test]
    async fn test_empty_listings_not_found() {
        let finder = finder(Reply::Listings(Vec::new()));
        assert_eq!(finder.find("organic food").await, RankOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_no_match_not_found() {
        let finder = finder(Reply::Listings(vec![
            listing("Green Bowl", Some("https://greenbowl.in"), Some("https://maps.google.com/x")),
        ]));
        assert_eq!(finder.find("organic food").await, RankOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_api_and_transport_errors() {
        let api = finder(Reply::ApiError("Google hasn't returned any results for this query."));
        let outcome = api.find("organic food").await;
        assert!(matches!(outcome, RankOutcome::ApiError(_)));
        assert!(!outcome.rank().is_found());

        let transport = finder(Reply::Transport);
        assert!(matches!(
            transport.find("organic food").await,
            RankOutcome::ApiError(_)
        ));
    }
}
