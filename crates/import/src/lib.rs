pub mod ledger;
pub mod match_engine;
pub mod util;

pub use ledger::{LedgerEntry, LedgerSummarizer, LedgerSummary};
pub use match_engine::{
    MatchResult, MatchType, ReconciliationReport, ReconciliationRow, Reconciler, RowCategory,
};
pub use util::token_set_ratio;
