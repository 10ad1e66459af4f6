use std::collections::BTreeSet;

use serde::Serialize;
use tdsreco_core::{AmountOverflow, MatchPolicy, Money, PartyAmount, ReconcileConfig, TOTAL_LABEL};

use crate::util::token_set_ratio;

/// Where a reconciliation row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchType {
    /// Books row paired with a statement row at this similarity.
    Matched { score: u8 },
    BooksOnly,
    StatementOnly,
    Total,
}

/// Presentation class of a row, by the size of its difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCategory {
    Matched,
    Mismatched,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationRow {
    pub party_name: String,
    pub amount_books: Money,
    pub amount_statement: Money,
    /// Books minus statement.
    pub difference: Money,
    pub match_type: MatchType,
}

impl ReconciliationRow {
    fn new(
        party_name: &str,
        amount_books: Money,
        amount_statement: Money,
        match_type: MatchType,
    ) -> Result<Self, AmountOverflow> {
        Ok(Self {
            party_name: party_name.to_string(),
            amount_books,
            amount_statement,
            difference: amount_books.checked_sub(amount_statement)?,
            match_type,
        })
    }

    pub fn is_total(&self) -> bool {
        self.match_type == MatchType::Total
    }
}

/// The best statement row for one books row, if it cleared the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub books_idx: usize,
    pub statement_idx: Option<usize>,
    /// Best score seen, whether or not it cleared the threshold.
    pub score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// Party rows sorted by name, then exactly one TOTAL row.
    pub rows: Vec<ReconciliationRow>,
    pub matched: usize,
    pub books_only: usize,
    pub statement_only: usize,
    /// Statement rows chosen by more than one books row (greedy policy only).
    pub shared_statement_rows: usize,
    #[serde(skip)]
    tolerance: Money,
}

impl ReconciliationReport {
    pub fn category(&self, row: &ReconciliationRow) -> RowCategory {
        if row.is_total() {
            RowCategory::Total
        } else if row.difference.is_zero() || row.difference.abs() < self.tolerance {
            RowCategory::Matched
        } else {
            RowCategory::Mismatched
        }
    }

    pub fn total(&self) -> Option<&ReconciliationRow> {
        self.rows.last().filter(|r| r.is_total())
    }

    pub fn party_rows(&self) -> impl Iterator<Item = &ReconciliationRow> {
        self.rows.iter().filter(|r| !r.is_total())
    }
}

/// Pairs "books" party totals with "statement" party totals by name
/// similarity.
///
/// Matching is greedy and one-sided: each books row, in input order, takes
/// the statement row with the highest token-set score (first wins on ties).
/// Under [`MatchPolicy::Greedy`] the same statement row may be taken by
/// several books rows; [`MatchPolicy::Exclusive`] withholds it once taken.
pub struct Reconciler {
    pub threshold: u8,
    pub tolerance: Money,
    pub policy: MatchPolicy,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&ReconcileConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: &ReconcileConfig) -> Self {
        Self {
            threshold: config.threshold,
            tolerance: Money::from_f64(config.tolerance).unwrap_or_else(Money::zero),
            policy: config.policy,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn find_matches(&self, books: &[PartyAmount], statement: &[PartyAmount]) -> Vec<MatchResult> {
        let mut taken = BTreeSet::new();
        books
            .iter()
            .enumerate()
            .map(|(books_idx, b)| {
                let result = self.find_best_match(books_idx, b, statement, &taken);
                if let Some(idx) = result.statement_idx {
                    taken.insert(idx);
                }
                result
            })
            .collect()
    }

    fn find_best_match(
        &self,
        books_idx: usize,
        book: &PartyAmount,
        statement: &[PartyAmount],
        taken: &BTreeSet<usize>,
    ) -> MatchResult {
        let name = book.party_name.to_uppercase();
        let mut best: Option<usize> = None;
        let mut best_score = 0u8;

        for (idx, s) in statement.iter().enumerate() {
            if self.policy == MatchPolicy::Exclusive && taken.contains(&idx) {
                continue;
            }
            let score = token_set_ratio(&name, &s.party_name.to_uppercase());
            if score > best_score {
                best_score = score;
                best = Some(idx);
            }
        }

        MatchResult {
            books_idx,
            statement_idx: best.filter(|_| best_score >= self.threshold),
            score: best_score,
        }
    }

    /// Reconcile two party/amount tables. TOTAL rows in either input are
    /// ignored; the report carries its own. Fails only if a difference or a
    /// column total leaves the decimal range.
    pub fn reconcile(
        &self,
        books: &[PartyAmount],
        statement: &[PartyAmount],
    ) -> Result<ReconciliationReport, AmountOverflow> {
        let books: Vec<PartyAmount> = books.iter().filter(|r| !r.is_total()).cloned().collect();
        let statement: Vec<PartyAmount> = statement.iter().filter(|r| !r.is_total()).cloned().collect();

        let matches = self.find_matches(&books, &statement);

        let mut matched_rows = Vec::new();
        let mut books_only_rows = Vec::new();
        let mut used = BTreeSet::new();
        let mut shared = BTreeSet::new();

        for m in &matches {
            let b = &books[m.books_idx];
            match m.statement_idx {
                Some(s_idx) => {
                    if !used.insert(s_idx) {
                        shared.insert(s_idx);
                    }
                    let s = &statement[s_idx];
                    matched_rows.push(ReconciliationRow::new(
                        &b.party_name,
                        b.amount,
                        s.amount,
                        MatchType::Matched { score: m.score },
                    )?);
                }
                None => {
                    books_only_rows.push(ReconciliationRow::new(
                        &b.party_name,
                        b.amount,
                        Money::zero(),
                        MatchType::BooksOnly,
                    )?);
                }
            }
        }

        let statement_only_rows = statement
            .iter()
            .enumerate()
            .filter(|(idx, _)| !used.contains(idx))
            .map(|(_, s)| ReconciliationRow::new(&s.party_name, Money::zero(), s.amount, MatchType::StatementOnly))
            .collect::<Result<Vec<_>, _>>()?;

        let (matched, books_only, statement_only) =
            (matched_rows.len(), books_only_rows.len(), statement_only_rows.len());

        let mut rows: Vec<ReconciliationRow> = matched_rows
            .into_iter()
            .chain(books_only_rows)
            .chain(statement_only_rows)
            .collect();
        rows.sort_by(|a, b| a.party_name.cmp(&b.party_name));

        let total = ReconciliationRow {
            party_name: TOTAL_LABEL.to_string(),
            amount_books: Money::try_sum(rows.iter().map(|r| r.amount_books))?,
            amount_statement: Money::try_sum(rows.iter().map(|r| r.amount_statement))?,
            difference: Money::try_sum(rows.iter().map(|r| r.difference))?,
            match_type: MatchType::Total,
        };
        rows.push(total);

        if !shared.is_empty() {
            tracing::warn!(
                count = shared.len(),
                "statement rows matched by more than one books row"
            );
        }
        tracing::info!(matched, books_only, statement_only, threshold = self.threshold, "reconciliation complete");

        Ok(ReconciliationReport {
            rows,
            matched,
            books_only,
            statement_only,
            shared_statement_rows: shared.len(),
            tolerance: self.tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pa(name: &str, amount: &str) -> PartyAmount {
        PartyAmount::new(name, amount.parse().unwrap())
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn near_identical_names_match() {
        let report = Reconciler::default().reconcile(&[pa("Acme Traders", "1000")], &[pa("ACME TRADER", "1000")]).unwrap();
        assert_eq!(report.rows.len(), 2);
        let row = &report.rows[0];
        assert_eq!(row.party_name, "Acme Traders");
        assert_eq!(row.difference, Money::zero());
        assert_eq!(row.match_type, MatchType::Matched { score: 96 });
        assert_eq!(report.category(row), RowCategory::Matched);
    }

    #[test]
    fn books_only_row() {
        let report = Reconciler::default().reconcile(&[pa("Beta Co", "500")], &[]).unwrap();
        let row = &report.rows[0];
        assert_eq!(row.match_type, MatchType::BooksOnly);
        assert_eq!(row.amount_statement, Money::zero());
        assert_eq!(row.difference, money("500"));
        assert_eq!(report.category(row), RowCategory::Mismatched);
        assert_eq!(report.books_only, 1);
    }

    #[test]
    fn statement_only_row_has_negative_difference() {
        let report = Reconciler::default().reconcile(&[], &[pa("Gamma Steels", "300")]).unwrap();
        let row = &report.rows[0];
        assert_eq!(row.match_type, MatchType::StatementOnly);
        assert_eq!(row.amount_books, Money::zero());
        assert_eq!(row.difference, money("-300"));
    }

    #[test]
    fn below_threshold_is_unmatched() {
        let report = Reconciler::default().reconcile(&[pa("Beta Co", "500")], &[pa("Zeta Logistics", "500")]).unwrap();
        assert_eq!(report.matched, 0);
        assert_eq!(report.books_only, 1);
        assert_eq!(report.statement_only, 1);
    }

    #[test]
    fn threshold_is_inclusive() {
        let r = Reconciler::default().with_threshold(96);
        let report = r.reconcile(&[pa("Acme Traders", "1")], &[pa("ACME TRADER", "1")]).unwrap();
        assert_eq!(report.matched, 1);
        let r = Reconciler::default().with_threshold(97);
        let report = r.reconcile(&[pa("Acme Traders", "1")], &[pa("ACME TRADER", "1")]).unwrap();
        assert_eq!(report.matched, 0);
    }

    #[test]
    fn total_row_pinned_last_and_sums_columns() {
        let books = [pa("Zeta Corp", "100"), pa("Alpha Corp", "250.50")];
        let statement = [pa("ZETA CORP", "90"), pa("Omega Ltd", "40")];
        let report = Reconciler::default().reconcile(&books, &statement).unwrap();

        let names: Vec<_> = report.rows.iter().map(|r| r.party_name.as_str()).collect();
        assert_eq!(names, ["Alpha Corp", "Omega Ltd", "Zeta Corp", "TOTAL"]);

        let total = report.total().unwrap();
        assert_eq!(total.amount_books, money("350.50"));
        assert_eq!(total.amount_statement, money("130"));
        assert_eq!(total.difference, money("220.50"));
        assert_eq!(report.category(total), RowCategory::Total);
        assert_eq!(report.party_rows().count(), 3);
    }

    #[test]
    fn input_total_rows_ignored() {
        let books = [pa("Acme Traders", "1000"), pa("TOTAL", "1000")];
        let statement = [pa("ACME TRADERS", "1000"), pa("Total", "1000")];
        let report = Reconciler::default().reconcile(&books, &statement).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total().unwrap().amount_books, money("1000"));
    }

    #[test]
    fn tolerance_below_one_unit_is_matched() {
        let report = Reconciler::default().reconcile(&[pa("Acme Traders", "1000.40")], &[pa("ACME TRADERS", "999.50")]).unwrap();
        assert_eq!(report.category(&report.rows[0]), RowCategory::Matched);

        let report = Reconciler::default().reconcile(&[pa("Acme Traders", "1001")], &[pa("ACME TRADERS", "1000")]).unwrap();
        assert_eq!(report.category(&report.rows[0]), RowCategory::Mismatched);
    }

    #[test]
    fn greedy_policy_lets_rows_share_a_statement_row() {
        let books = [pa("Acme Traders Mumbai", "600"), pa("Acme Traders Pune", "400")];
        let statement = [pa("ACME TRADERS", "1000")];
        let report = Reconciler::default().reconcile(&books, &statement).unwrap();
        assert_eq!(report.matched, 2);
        assert_eq!(report.statement_only, 0);
        assert_eq!(report.shared_statement_rows, 1);
        // The statement amount is counted once per books row.
        assert_eq!(report.total().unwrap().amount_statement, money("2000"));
    }

    #[test]
    fn exclusive_policy_withholds_taken_rows() {
        let config = ReconcileConfig { policy: MatchPolicy::Exclusive, ..ReconcileConfig::default() };
        let books = [pa("Acme Traders Mumbai", "600"), pa("Acme Traders Pune", "400")];
        let statement = [pa("ACME TRADERS", "1000")];
        let report = Reconciler::new(&config).reconcile(&books, &statement).unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(report.books_only, 1);
        assert_eq!(report.shared_statement_rows, 0);
    }

    #[test]
    fn out_of_range_totals_are_an_error() {
        let huge = "50000000000000000000000000000";
        let negative = "-50000000000000000000000000000";
        // A matched pair of opposite sign: the row difference itself overflows.
        let result = Reconciler::default().reconcile(&[pa("Alpha Corp", huge)], &[pa("ALPHA CORP", negative)]);
        assert_eq!(result.unwrap_err(), AmountOverflow);

        // Rows that fit alone but not in the TOTAL column.

        let result = Reconciler::default().reconcile(&[pa("Alpha Corp", huge), pa("Beta Co", huge)], &[]);
        assert_eq!(result.unwrap_err(), AmountOverflow);
    }

    #[test]
    fn first_best_wins_on_ties() {
        let results = Reconciler::default().find_matches(
            &[pa("Acme", "1")],
            &[pa("ACME TRADERS", "1"), pa("ACME LTD", "1")],
        );
        assert_eq!(results[0].statement_idx, Some(0));
        assert_eq!(results[0].score, 100);
    }

    #[test]
    fn unmatched_result_keeps_best_score() {
        let results = Reconciler::default().find_matches(&[pa("Beta Co", "1")], &[pa("Zeta Logistics", "1")]);
        assert_eq!(results[0].statement_idx, None);
        assert!(results[0].score < 75);
    }
}
