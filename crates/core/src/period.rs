use chrono::NaiveDate;

/// The "d-Mon" label ledger exports print on a financial year's
/// opening-balance line, e.g. "1-Apr" for years starting in April.
/// Returns `None` when `start_month` is not 1..=12.
pub fn opening_marker(start_month: u32) -> Option<String> {
    // 2000 is a leap year, so any month's first day exists.
    NaiveDate::from_ymd_opt(2000, start_month, 1).map(|d| d.format("%-d-%b").to_string())
}
