use std::collections::BTreeMap;

use serde::Serialize;
use tdsreco_core::{cell_at, AmountOverflow, Cell, LedgerConfig, Money, PartyTotal, SkipReason, SkipTally};

/// The three fields of a ledger export row that the summary reads.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Trimmed description; empty when the cell was blank.
    pub particulars: String,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
}

impl LedgerEntry {
    /// Pull the configured columns out of a raw row. Short rows read as blank
    /// and non-numeric amount cells as absent.
    pub fn from_row(row: &[Cell], config: &LedgerConfig) -> Self {
        LedgerEntry {
            particulars: cell_at(row, config.description_column).text().unwrap_or_default(),
            debit: cell_at(row, config.debit_column).money(),
            credit: cell_at(row, config.credit_column).money(),
        }
    }

    /// Credit if positive, else debit if positive.
    pub fn amount(&self) -> Option<Money> {
        self.credit
            .filter(|c| c.is_positive())
            .or_else(|| self.debit.filter(|d| d.is_positive()))
    }
}

/// Per-party totals of a ledger export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSummary {
    /// Sorted by party name.
    pub totals: Vec<PartyTotal>,
    /// Exact sum of `totals`.
    pub total: Money,
    /// Rows that contributed an amount.
    pub rows_used: usize,
    pub skipped: SkipTally,
}

impl LedgerSummary {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Groups a Tally-style ledger export by counterparty.
///
/// Every row goes through the same checks; there is no header detection, a
/// header row simply fails them.
pub struct LedgerSummarizer {
    config: LedgerConfig,
    skip_markers: Vec<String>,
}

impl Default for LedgerSummarizer {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl LedgerSummarizer {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            skip_markers: config.effective_skip_markers(),
            config: config.clone(),
        }
    }

    /// Fails only when a party total or the grand total leaves the decimal
    /// range.
    pub fn summarize<R: AsRef<[Cell]>>(&self, rows: &[R]) -> Result<LedgerSummary, AmountOverflow> {
        let mut by_party: BTreeMap<String, Money> = BTreeMap::new();
        let mut skipped = SkipTally::default();
        let mut rows_used = 0;

        for (idx, row) in rows.iter().enumerate() {
            match self.classify(row.as_ref()) {
                Ok((party, amount)) => {
                    let total = by_party.entry(party).or_insert_with(Money::zero);
                    *total = total.checked_add(amount)?;
                    rows_used += 1;
                }
                Err(reason) => {
                    tracing::trace!(row = idx, %reason, "ledger row skipped");
                    skipped.record(reason);
                }
            }
        }

        let totals: Vec<PartyTotal> = by_party
            .into_iter()
            .map(|(party, amount)| PartyTotal::new(party, amount))
            .collect();
        let total = Money::try_sum(totals.iter().map(|t| t.amount))?;

        tracing::debug!(parties = totals.len(), rows_used, skipped = %skipped, "ledger summarized");
        Ok(LedgerSummary { totals, total, rows_used, skipped })
    }

    /// Party name and amount for one row, or why the row contributes nothing.
    pub fn classify(&self, row: &[Cell]) -> Result<(String, Money), SkipReason> {
        let entry = LedgerEntry::from_row(row, &self.config);
        let party = self.party_name(&entry.particulars)?;
        let amount = entry.amount().ok_or(SkipReason::NoPositiveAmount)?;
        Ok((party, amount))
    }

    /// Normalize a description into a party name.
    pub fn party_name(&self, particulars: &str) -> Result<String, SkipReason> {
        if particulars.is_empty() || particulars == "nan" {
            return Err(SkipReason::BlankDescription);
        }
        if self.skip_markers.iter().any(|m| particulars.contains(m.as_str())) {
            return Err(SkipReason::Boilerplate);
        }

        let stripped = self
            .config
            .strip_fragments
            .iter()
            .fold(particulars.to_string(), |acc, frag| acc.replace(frag.as_str(), ""));
        let party = stripped.trim();

        let placeholder =
            !self.config.excluded_fragment.is_empty() && party.contains(&self.config.excluded_fragment);
        if party.is_empty()
            || placeholder
            || party.chars().count() < self.config.min_party_len
            || party.chars().all(|c| c.is_ascii_digit())
        {
            return Err(SkipReason::InvalidParty);
        }
        Ok(party.to_string())
    }
}
