use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a single OCR line or ledger row was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// OCR line shorter than the noise threshold.
    ShortLine,
    /// No deductor code on the line.
    NoAnchor,
    /// Party name too short once serials and noise were removed.
    ShortPartyName,
    /// No numeric token on the line cleared the minimum amount.
    NoAmount,
    /// Description cell blank or "nan".
    BlankDescription,
    /// Description matched a balance/header marker.
    Boilerplate,
    /// Description unusable as a party name after normalization.
    InvalidParty,
    /// Neither credit nor debit held a positive number.
    NoPositiveAmount,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::ShortLine => "short_line",
            SkipReason::NoAnchor => "no_anchor",
            SkipReason::ShortPartyName => "short_party_name",
            SkipReason::NoAmount => "no_amount",
            SkipReason::BlankDescription => "blank_description",
            SkipReason::Boilerplate => "boilerplate",
            SkipReason::InvalidParty => "invalid_party",
            SkipReason::NoPositiveAmount => "no_positive_amount",
        };
        write!(f, "{s}")
    }
}

/// Per-reason counts of skipped inputs, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipTally(BTreeMap<SkipReason, usize>);

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkipReason, usize)> + '_ {
        self.0.iter().map(|(r, n)| (*r, *n))
    }
}

impl fmt::Display for SkipTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = self.iter().map(|(r, n)| format!("{r}={n}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}
