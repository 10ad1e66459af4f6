use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Label of the synthetic summary row appended to every output table.
pub const TOTAL_LABEL: &str = "TOTAL";

/// A counterparty name with one amount against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAmount {
    pub party_name: String,
    pub amount: Money,
}

/// One row recovered from the OCR text of a tax statement.
pub type StatementRecord = PartyAmount;

/// Accumulated ledger amount for one normalized party name.
pub type PartyTotal = PartyAmount;

impl PartyAmount {
    pub fn new(party_name: impl Into<String>, amount: Money) -> Self {
        Self { party_name: party_name.into(), amount }
    }

    /// Whether this row is a summary row rather than a party.
    pub fn is_total(&self) -> bool {
        is_total_label(&self.party_name)
    }
}

/// Case-insensitive, whitespace-tolerant test for the TOTAL label.
pub fn is_total_label(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(TOTAL_LABEL)
}

/// Sorts by party name (ascending, stable) and drops later duplicates.
pub fn dedup_sorted(rows: Vec<PartyAmount>) -> Vec<PartyAmount> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<PartyAmount> = rows
        .into_iter()
        .filter(|r| seen.insert(r.party_name.clone()))
        .collect();
    unique.sort_by(|a, b| a.party_name.cmp(&b.party_name));
    unique
}
