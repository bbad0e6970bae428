use crate::config::toml_config::{DelayRange, TrackerConfig};
use crate::core::local::LocalRankFinder;
use crate::core::matching::TargetDomain;
use crate::core::organic::OrganicRankFinder;
use crate::domain::model::{KeywordRanks, KeywordRow, RunSummary};
use crate::domain::ports::{RankSink, SearchSource};
use std::sync::Arc;

/// 逐列處理關鍵字：地圖搜尋、自然搜尋，然後寫回工作表
pub struct RankTracker<S: SearchSource, W: RankSink> {
    local: LocalRankFinder<S>,
    organic: OrganicRankFinder<S>,
    sink: W,
    search_delay: DelayRange,
    keyword_delay: DelayRange,
}

impl<S: SearchSource, W: RankSink> RankTracker<S, W> {
    pub fn new(local: LocalRankFinder<S>, organic: OrganicRankFinder<S>, sink: W) -> Self {
        Self {
            local,
            organic,
            sink,
            search_delay: DelayRange::NONE,
            keyword_delay: DelayRange::NONE,
        }
    }

    pub fn from_config(source: Arc<S>, sink: W, config: &TrackerConfig) -> Self {
        let target = TargetDomain::new(&config.target.domain);
        let local = LocalRankFinder::new(
            source.clone(),
            target.clone(),
            &config.target.effective_title_fragments(),
        );
        let organic = OrganicRankFinder::new(source, target)
            .with_pagination(config.search.max_pages(), config.search.results_per_page());

        Self::new(local, organic, sink).with_delays(config.search_delay(), config.keyword_delay())
    }

    pub fn with_delays(mut self, search_delay: DelayRange, keyword_delay: DelayRange) -> Self {
        self.search_delay = search_delay;
        self.keyword_delay = keyword_delay;
        self
    }

    /// 查詢單一關鍵字的兩種排名
    pub async fn rank_keyword(&self, keyword: &str) -> KeywordRanks {
        tracing::info!("  Google Places:");
        let local = self.local.find(keyword).await.rank();
        tracing::info!("  → Result: {}", local);

        pause(self.search_delay).await;

        tracing::info!("  Google Links:");
        let organic = self.organic.find(keyword).await.rank();
        tracing::info!("  → Result: {}", organic);

        KeywordRanks { local, organic }
    }

    pub async fn run(&self, rows: &[KeywordRow]) -> RunSummary {
        let total = rows.len();
        let mut summary = RunSummary::default();

        for (idx, row) in rows.iter().enumerate() {
            tracing::info!("[{}/{}] Processing: {}", idx + 1, total, row.keyword);

            let ranks = self.rank_keyword(&row.keyword).await;
            summary.processed += 1;
            if ranks.local.is_found() {
                summary.local_found += 1;
            }
            if ranks.organic.is_found() {
                summary.organic_found += 1;
            }

            match self.sink.write_ranks(row, &ranks) {
                Ok(excel_row) => {
                    summary.written += 1;
                    tracing::info!("  ✓ Saved row {}", excel_row);
                }
                Err(e) => {
                    summary.write_failures += 1;
                    tracing::error!("  ✗ Failed to update row for '{}': {}", row.keyword, e);
                }
            }

            if idx + 1 < total {
                let delay = self.keyword_delay.sample();
                if !delay.is_zero() {
                    tracing::info!(
                        "  → Waiting {:.1}s before next keyword...",
                        delay.as_secs_f64()
                    );
                }
                tokio::time::sleep(delay).await;
            }
        }

        summary
    }
}

async fn pause(range: DelayRange) {
    let delay = range.sample();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
