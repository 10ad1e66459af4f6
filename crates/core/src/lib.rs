pub mod cell;
pub mod config;
pub mod money;
pub mod party;
pub mod period;
pub mod skip;

pub use cell::{cell_at, Cell};
pub use config::{Config, ConfigError, LedgerConfig, MatchPolicy, ReconcileConfig, StatementConfig};
pub use money::{AmountOverflow, Money};
pub use party::{dedup_sorted, is_total_label, PartyAmount, PartyTotal, StatementRecord, TOTAL_LABEL};
pub use skip::{SkipReason, SkipTally};
