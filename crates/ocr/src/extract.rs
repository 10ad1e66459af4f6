use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use tdsreco_core::{dedup_sorted, Money, SkipReason, SkipTally, StatementConfig, StatementRecord};

use crate::types::ParsedStatement;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Deductor TAN: 4 letters, 5 digits, 1 letter. OCR reads 0 as O and 1 as I/l.
re!(re_tan_loose, r"[A-Z]{4}[0-9OIl]{5}[A-Z]");
re!(re_amount_token, r"^\d+\.?\d{0,2}$");
re!(re_leading_noise, r"^[^A-Z]+");

// ── Public extraction API ─────────────────────────────────────────────────────

/// Line parser for the "Part I" table of a Form 26AS tax credit statement.
///
/// Each data row reads `<sr no> <deductor name> <TAN> <amounts...>`; rows are
/// recognized by the TAN anchor and everything else on the page is noise.
#[derive(Debug, Clone)]
pub struct StatementParser {
    min_line_len: usize,
    min_amount: Decimal,
    min_party_len: usize,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new(&StatementConfig::default())
    }
}

impl StatementParser {
    pub fn new(config: &StatementConfig) -> Self {
        Self {
            min_line_len: config.min_line_len,
            min_amount: Decimal::from(config.min_amount),
            min_party_len: config.min_party_len,
        }
    }

    /// Parse every line of `ocr_text`, dedupe by party and sort by name.
    pub fn parse(&self, ocr_text: &str) -> ParsedStatement {
        let mut skipped = SkipTally::default();
        let mut records = Vec::new();

        for line in ocr_text.lines() {
            match self.parse_line(line) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    tracing::trace!(%reason, line, "statement line skipped");
                    skipped.record(reason);
                }
            }
        }

        let matched_lines = records.len();
        ParsedStatement { records: dedup_sorted(records), matched_lines, skipped }
    }

    /// Parse one OCR line into a record, or say why it isn't one.
    pub fn parse_line(&self, line: &str) -> Result<StatementRecord, SkipReason> {
        let line = line.trim();
        if line.chars().count() < self.min_line_len {
            return Err(SkipReason::ShortLine);
        }

        let tan = re_tan_loose().find(line).ok_or(SkipReason::NoAnchor)?.as_str();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let tan_idx = tokens
            .iter()
            .position(|t| t.contains(tan))
            .ok_or(SkipReason::NoAnchor)?;

        let party_name = party_name(&tokens[..tan_idx]);
        let amounts: Vec<Decimal> = tokens[tan_idx + 1..]
            .iter()
            .filter_map(|t| parse_amount_token(t))
            .filter(|v| *v > self.min_amount)
            .collect();
        let amount = select_amount(&amounts).ok_or(SkipReason::NoAmount)?;

        if party_name.chars().count() <= self.min_party_len {
            return Err(SkipReason::ShortPartyName);
        }
        if amount <= Decimal::ZERO {
            return Err(SkipReason::NoAmount);
        }

        Ok(StatementRecord::new(party_name, Money::from_decimal(amount)))
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

/// Join the tokens before the TAN, dropping serial numbers and the "Sr. No"
/// header fragments, then trim stray leading punctuation or digits.
fn party_name(tokens: &[&str]) -> String {
    let joined = tokens
        .iter()
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !matches!(w.to_lowercase().as_str(), "sr" | "no"))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    re_leading_noise().replace(&joined, "").into_owned()
}

/// Undo the usual letter-for-digit OCR swaps and parse what is left as an
/// amount with at most two decimals.
fn parse_amount_token(token: &str) -> Option<Decimal> {
    let clean: String = token
        .chars()
        .map(fix_ocr_digit)
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !re_amount_token().is_match(&clean) {
        return None;
    }
    Decimal::from_str(clean.trim_end_matches('.')).ok()
}

fn fix_ocr_digit(c: char) -> char {
    match c {
        'O' | 'o' => '0',
        'l' | 'I' => '1',
        'S' => '5',
        other => other,
    }
}

/// The statement prints amount paid, tax deducted and tax deposited in that
/// order; when two or more survive, the second is the TDS figure.
fn select_amount(amounts: &[Decimal]) -> Option<Decimal> {
    match amounts {
        [] => None,
        [only] => Some(*only),
        [_, second, ..] => Some(*second),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parser() -> StatementParser {
        StatementParser::default()
    }

    // ── Line parsing ──────────────────────────────────────────────────────────

    #[test]
    fn parses_typical_row() {
        let r = parser()
            .parse_line("1 ACME TRADERS PVT LTD MUMA12345B 150000.00 15000.00 15000.00")
            .unwrap();
        assert_eq!(r.party_name, "ACME TRADERS PVT LTD");
        assert_eq!(r.amount, Money::from_decimal(dec("15000.00")));
    }

    #[test]
    fn short_line_is_noise() {
        assert_eq!(parser().parse_line("  ABCD12345E 5 "), Err(SkipReason::ShortLine));
    }

    #[test]
    fn line_without_tan_is_skipped() {
        assert_eq!(
            parser().parse_line("Name of Deductor   Total Amount Paid"),
            Err(SkipReason::NoAnchor)
        );
    }

    #[test]
    fn tan_with_ocr_confusions_still_anchors() {
        let r = parser().parse_line("2 BETA INFRA LLP DELBO1I2lC 5000.00 500.00").unwrap();
        assert_eq!(r.party_name, "BETA INFRA LLP");
        assert_eq!(r.amount, Money::from_decimal(dec("500.00")));
    }

    #[test]
    fn serials_and_header_words_dropped_from_name() {
        let r = parser().parse_line("Sr No 12 GAMMA STEELS LTD PNEG12345H 900.00").unwrap();
        assert_eq!(r.party_name, "GAMMA STEELS LTD");
    }

    #[test]
    fn leading_punctuation_stripped_from_name() {
        let r = parser().parse_line("|3 ~(DELTA CORP MUMD12345E 1200.00 120.00").unwrap();
        assert_eq!(r.party_name, "DELTA CORP");
    }

    #[test]
    fn ocr_letters_in_amounts_corrected() {
        let r = parser().parse_line("EPSILON FOODS BLRE12345F 1OOO.OO 1S0.l0").unwrap();
        assert_eq!(r.amount, Money::from_decimal(dec("150.10")));
    }

    #[test]
    fn small_tokens_are_not_amounts() {
        // "4" and "10" never exceed the minimum, leaving only one amount.
        let r = parser().parse_line("ZETA LOGISTICS HYDZ12345K 4 10 2500.00").unwrap();
        assert_eq!(r.amount, Money::from_decimal(dec("2500.00")));
    }

    #[test]
    fn row_without_amounts_discarded() {
        assert_eq!(
            parser().parse_line("ETA ENTERPRISES CHNE12345L 2 F 4"),
            Err(SkipReason::NoAmount)
        );
    }

    #[test]
    fn short_party_name_discarded() {
        assert_eq!(
            parser().parse_line("1 ABC MUMA12345B 1000.00 100.00"),
            Err(SkipReason::ShortPartyName)
        );
    }

    // ── Amount helpers ────────────────────────────────────────────────────────

    #[test]
    fn select_amount_policy() {
        let (a, b, c) = (dec("100"), dec("20"), dec("30"));
        assert_eq!(select_amount(&[]), None);
        assert_eq!(select_amount(&[a]), Some(a));
        assert_eq!(select_amount(&[a, b]), Some(b));
        assert_eq!(select_amount(&[a, b, c]), Some(b));
    }

    #[test]
    fn amount_token_shapes() {
        assert_eq!(parse_amount_token("1,50,000.00"), Some(dec("150000.00")));
        assert_eq!(parse_amount_token("123."), Some(dec("123")));
        assert_eq!(parse_amount_token("12.345"), None);
        assert_eq!(parse_amount_token("1.2.3"), None);
        assert_eq!(parse_amount_token("--"), None);
    }

    // ── Whole-text parsing ────────────────────────────────────────────────────

    #[test]
    fn parse_dedupes_and_sorts() {
        let text = "\
Form 26AS Annual Tax Statement
1 ZULU MOTORS LTD MUMZ12345A 10000.00 1000.00 1000.00
2 ALPHA TRADERS DELA12345B 5000.00 500.00 500.00
3 ZULU MOTORS LTD MUMZ12345A 20000.00 2000.00 2000.00
";
        let parsed = parser().parse(text);
        assert_eq!(parsed.matched_lines, 3);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].party_name, "ALPHA TRADERS");
        assert_eq!(parsed.records[1].party_name, "ZULU MOTORS LTD");
        assert_eq!(parsed.records[1].amount, Money::from_decimal(dec("1000.00")));
        assert_eq!(parsed.skipped.count(SkipReason::NoAnchor), 1);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let parsed = parser().parse("");
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped.total(), 0);
    }

    #[test]
    fn custom_line_threshold() {
        let config = StatementConfig { min_line_len: 80, ..StatementConfig::default() };
        let parsed = StatementParser::new(&config).parse("ALPHA TRADERS DELA12345B 5000.00 500.00");
        assert_eq!(parsed.skipped.count(SkipReason::ShortLine), 1);
    }
}
