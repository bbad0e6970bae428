pub mod toml_config;

use crate::config::toml_config::TrackerConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "serp-rank")]
#[command(about = "Track Google organic and local ranks for keywords listed in an Excel workbook")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "rank-config.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Load keywords and resolve columns without querying or writing
    #[arg(long)]
    pub dry_run: bool,

    /// Override spreadsheet.path
    #[arg(long)]
    pub excel_file: Option<String>,

    /// Override spreadsheet.sheet
    #[arg(long)]
    pub sheet: Option<String>,

    /// Override target.domain
    #[arg(long)]
    pub target_domain: Option<String>,

    /// Override search.location
    #[arg(long)]
    pub location: Option<String>,

    /// Process at most this many keywords
    #[arg(long)]
    pub max_keywords: Option<usize>,
}

impl CliArgs {
    /// 將命令列覆蓋設定套用到配置
    pub fn apply_overrides(&self, config: &mut TrackerConfig) {
        if let Some(path) = &self.excel_file {
            config.spreadsheet.path = path.clone();
            tracing::info!("🔧 Spreadsheet overridden to: {}", path);
        }
        if let Some(sheet) = &self.sheet {
            config.spreadsheet.sheet = sheet.clone();
            tracing::info!("🔧 Sheet overridden to: {}", sheet);
        }
        if let Some(domain) = &self.target_domain {
            config.target.domain = domain.clone();
            tracing::info!("🔧 Target domain overridden to: {}", domain);
        }
        if let Some(location) = &self.location {
            config.search.location = location.clone();
            tracing::info!("🔧 Location overridden to: {}", location);
        }
        if let Some(max) = self.max_keywords {
            config.max_keywords = Some(max);
            tracing::info!("🔧 Max keywords overridden to: {}", max);
        }
    }
}
