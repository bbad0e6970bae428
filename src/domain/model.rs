use serde::Deserialize;
use std::fmt;

/// 工作表中的一筆關鍵字資料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRow {
    pub keyword: String,
    /// 標題列下方的 0-based 資料列位置（含被略過的空白列）
    pub row_index: u32,
}

/// 寫入工作表的排名值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Found(u32),
    NotFound,
}

impl Rank {
    pub const NOT_FOUND_TEXT: &'static str = "Not Found";

    pub fn is_found(&self) -> bool {
        matches!(self, Rank::Found(_))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Found(position) => write!(f, "{}", position),
            Rank::NotFound => f.write_str(Self::NOT_FOUND_TEXT),
        }
    }
}

/// 單一類別搜尋的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankOutcome {
    Found(u32),
    NotFound,
    ApiError(String),
}

impl RankOutcome {
    pub fn rank(&self) -> Rank {
        match self {
            RankOutcome::Found(position) => Rank::Found(*position),
            RankOutcome::NotFound | RankOutcome::ApiError(_) => Rank::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRanks {
    pub local: Rank,
    pub organic: Rank,
}

/// API 回應在邊界解碼後的形狀
#[derive(Debug, Clone, PartialEq)]
pub enum SerpResponse<T> {
    Results(Vec<T>),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocalListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// 一頁自然搜尋的查詢
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganicQuery {
    pub keyword: String,
    pub start: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalQuery {
    pub keyword: String,
}

/// 一次執行的統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub written: usize,
    pub write_failures: usize,
    pub local_found: usize,
    pub organic_found: usize,
}
