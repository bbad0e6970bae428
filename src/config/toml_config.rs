use crate::adapters::serpapi::DEFAULT_BASE_URL;
use crate::core::organic::{DEFAULT_MAX_PAGES, DEFAULT_RESULTS_PER_PAGE};
use crate::utils::error::{RankError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 自然搜尋最多翻頁數
pub const MAX_PAGES_LIMIT: u32 = 20;
/// SerpAPI 的 `num` 參數上限
pub const MAX_RESULTS_PER_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub spreadsheet: SpreadsheetConfig,
    pub target: TargetConfig,
    pub search: SearchConfig,
    pub rate_limit: Option<RateLimitConfig>,
    pub max_keywords: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    pub path: String,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    /// 標題列位置（0-based，與 pandas 的 header 參數相同）
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_keyword_column")]
    pub keyword_column: String,
    #[serde(default = "default_local_column")]
    pub local_column: String,
    #[serde(default = "default_organic_column")]
    pub organic_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub domain: String,
    #[serde(default)]
    pub title_fragments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_google_domain")]
    pub google_domain: String,
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_hl")]
    pub hl: String,
    pub location: String,
    pub zoom: Option<u32>,
    pub max_pages: Option<u32>,
    pub results_per_page: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub between_searches: Option<DelayRange>,
    pub between_keywords: Option<DelayRange>,
}

/// 隨機延遲區間（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const NONE: DelayRange = DelayRange {
        min_ms: 0,
        max_ms: 0,
    };

    pub fn sample(&self) -> Duration {
        use rand::Rng;
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

fn default_sheet() -> String {
    "Keywords".to_string()
}

fn default_header_row() -> u32 {
    1
}

fn default_keyword_column() -> String {
    "Local Keyword Ideas".to_string()
}

fn default_local_column() -> String {
    "Google Places".to_string()
}

fn default_organic_column() -> String {
    "Google Links".to_string()
}

fn default_google_domain() -> String {
    "google.co.in".to_string()
}

fn default_gl() -> String {
    "in".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

impl SearchConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn zoom(&self) -> u32 {
        self.zoom.unwrap_or(20)
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }

    pub fn results_per_page(&self) -> u32 {
        self.results_per_page.unwrap_or(DEFAULT_RESULTS_PER_PAGE)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(60)
    }
}

impl TargetConfig {
    /// 實際用於比對商家名稱的片段。未設定時退回網域主體（例如 `omorganickitchen`）
    pub fn effective_title_fragments(&self) -> Vec<String> {
        let configured: Vec<String> = self
            .title_fragments
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !configured.is_empty() {
            return configured;
        }

        match domain_stem(&self.domain) {
            Some(stem) => {
                tracing::warn!(
                    "⚠ target.title_fragments is empty, matching listing titles on '{}'",
                    stem
                );
                vec![stem]
            }
            None => {
                tracing::warn!("⚠ target.title_fragments is empty, title matching disabled");
                Vec::new()
            }
        }
    }
}

fn domain_stem(domain: &str) -> Option<String> {
    let host = domain.trim().to_lowercase();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(&host);
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.split(['.', '/', ':'])
        .next()
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

impl TrackerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RankError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RankError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SERPAPI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RankError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("spreadsheet.path", &self.spreadsheet.path)?;
        validation::validate_file_extension("spreadsheet.path", &self.spreadsheet.path, &["xlsx"])?;
        validation::validate_non_empty_string("spreadsheet.sheet", &self.spreadsheet.sheet)?;
        validation::validate_non_empty_string(
            "spreadsheet.keyword_column",
            &self.spreadsheet.keyword_column,
        )?;
        validation::validate_non_empty_string(
            "spreadsheet.local_column",
            &self.spreadsheet.local_column,
        )?;
        validation::validate_non_empty_string(
            "spreadsheet.organic_column",
            &self.spreadsheet.organic_column,
        )?;

        validation::validate_non_empty_string("target.domain", &self.target.domain)?;

        let api_key = validation::validate_required_field("search.api_key", &self.search.api_key)?;
        if api_key.starts_with("${") {
            return Err(RankError::InvalidConfigValueError {
                field: "search.api_key".to_string(),
                value: api_key.clone(),
                reason: "Environment variable is not set".to_string(),
            });
        }
        validation::validate_non_empty_string("search.api_key", api_key)?;
        validation::validate_url("search.base_url", self.search.base_url())?;
        validation::validate_non_empty_string("search.location", &self.search.location)?;
        validation::validate_range("search.zoom", self.search.zoom(), 3, 21)?;
        validation::validate_range("search.max_pages", self.search.max_pages(), 1, MAX_PAGES_LIMIT)?;
        validation::validate_range(
            "search.results_per_page",
            self.search.results_per_page(),
            1,
            MAX_RESULTS_PER_PAGE_LIMIT,
        )?;

        if let Some(rate_limit) = &self.rate_limit {
            for (field, range) in [
                ("rate_limit.between_searches", rate_limit.between_searches),
                ("rate_limit.between_keywords", rate_limit.between_keywords),
            ] {
                if let Some(range) = range {
                    if range.min_ms > range.max_ms {
                        return Err(RankError::InvalidConfigValueError {
                            field: field.to_string(),
                            value: format!("{}..{}", range.min_ms, range.max_ms),
                            reason: "min_ms must not exceed max_ms".to_string(),
                        });
                    }
                }
            }
        }

        if let Some(max) = self.max_keywords {
            validation::validate_positive_number("max_keywords", max, 1)?;
        }

        Ok(())
    }

    /// 兩次搜尋之間的延遲
    pub fn search_delay(&self) -> DelayRange {
        self.rate_limit
            .as_ref()
            .and_then(|r| r.between_searches)
            .unwrap_or(DelayRange {
                min_ms: 1000,
                max_ms: 2000,
            })
    }

    /// 兩個關鍵字之間的延遲
    pub fn keyword_delay(&self) -> DelayRange {
        self.rate_limit
            .as_ref()
            .and_then(|r| r.between_keywords)
            .unwrap_or(DelayRange {
                min_ms: 2000,
                max_ms: 3000,
            })
    }
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
