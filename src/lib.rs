pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::serpapi::SerpApiClient;
pub use adapters::workbook::{excel_row, load_keywords, ExcelRankWriter, SheetLayout};
pub use config::{toml_config::TrackerConfig, CliArgs};
pub use core::tracker::RankTracker;
pub use utils::error::{RankError, Result};
