pub mod local;
pub mod matching;
pub mod organic;
pub mod tracker;

pub use crate::domain::model::{KeywordRanks, KeywordRow, Rank, RankOutcome, RunSummary};
pub use crate::domain::ports::{RankSink, SearchSource};
pub use crate::utils::error::Result;
