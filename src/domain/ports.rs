use crate::domain::model::{
    KeywordRanks, KeywordRow, LocalListing, LocalQuery, OrganicQuery, OrganicResult, SerpResponse,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 搜尋結果來源。傳輸層錯誤以 `Err` 回傳，API 回報的錯誤以 `SerpResponse::Error` 回傳。
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn organic(&self, query: &OrganicQuery) -> Result<SerpResponse<OrganicResult>>;
    async fn local(&self, query: &LocalQuery) -> Result<SerpResponse<LocalListing>>;
}

/// 排名寫入目標。每次呼叫都必須立即持久化。
pub trait RankSink: Send + Sync {
    fn write_ranks(&self, row: &KeywordRow, ranks: &KeywordRanks) -> Result<u32>;
}
