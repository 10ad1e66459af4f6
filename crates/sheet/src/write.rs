use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, Worksheet};
use tdsreco_core::{Money, StatementRecord, TOTAL_LABEL};
use tdsreco_import::{LedgerSummary, ReconciliationReport, RowCategory};

use crate::SheetError;

pub const STATEMENT_SHEET: &str = "26AS Data";
pub const SUMMARY_SHEET: &str = "Party Summary";
pub const RECONCILIATION_SHEET: &str = "Reconciliation";

const AMOUNT_FORMAT: &str = "#,##0.00";
const HEADER_FILL: u32 = 0x4472C4;
const MATCHED_FILL: u32 = 0xC6EFCE;
const MISMATCHED_FILL: u32 = 0xFFC7CE;
const TOTAL_FILL: u32 = 0xFFEB9C;

// ── Statement extract ────────────────────────────────────────────────────────

/// Extracted statement rows, unstyled, one sheet.
pub fn write_statement(path: &Path, records: &[StatementRecord]) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name(STATEMENT_SHEET)?;

    let plain = Format::new();
    write_header(sheet, &["Name of Party", "Amount showing in 26AS"], &plain)?;
    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &record.party_name)?;
        sheet.write_number(row, 1, record.amount.to_f64())?;
    }
    set_widths(sheet, &[50.0, 18.0])?;

    workbook.save(path)?;
    tracing::info!(path = %path.display(), rows = records.len(), "statement written");
    Ok(())
}

// ── Ledger summary ───────────────────────────────────────────────────────────

/// Party totals with a bold TOTAL row, on a styled sheet.
pub fn write_summary(path: &Path, summary: &LedgerSummary) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;

    let header = header_format();
    let text = Format::new().set_border(FormatBorder::Thin);
    let amount = text.clone().set_num_format(AMOUNT_FORMAT);

    write_header(sheet, &["Name of Party", "Amount as per Books"], &header)?;
    let mut row = 1;
    for total in &summary.totals {
        sheet.write_string_with_format(row, 0, &total.party_name, &text)?;
        sheet.write_number_with_format(row, 1, total.amount.to_f64(), &amount)?;
        row += 1;
    }
    sheet.write_string_with_format(row, 0, TOTAL_LABEL, &text.clone().set_bold())?;
    sheet.write_number_with_format(row, 1, summary.total.to_f64(), &amount.clone().set_bold())?;
    set_widths(sheet, &[50.0, 20.0])?;

    workbook.save(path)?;
    tracing::info!(path = %path.display(), parties = summary.totals.len(), "summary written");
    Ok(())
}

// ── Reconciliation ───────────────────────────────────────────────────────────

/// Reconciliation rows filled green (matched), red (mismatched) or yellow
/// (TOTAL).
pub fn write_reconciliation(path: &Path, report: &ReconciliationReport) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name(RECONCILIATION_SHEET)?;

    write_header(
        sheet,
        &["Name of Party", "Amount in Books", "Amount in 26AS", "Difference"],
        &header_format(),
    )?;

    for (i, r) in report.rows.iter().enumerate() {
        let row = i as u32 + 1;
        let fill = match report.category(r) {
            RowCategory::Matched => MATCHED_FILL,
            RowCategory::Mismatched => MISMATCHED_FILL,
            RowCategory::Total => TOTAL_FILL,
        };
        let text = Format::new()
            .set_border(FormatBorder::Thin)
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill));
        let text = if r.is_total() { text.set_bold() } else { text };
        let amount = text.clone().set_num_format(AMOUNT_FORMAT);

        sheet.write_string_with_format(row, 0, &r.party_name, &text)?;
        write_amounts(sheet, row, &[r.amount_books, r.amount_statement, r.difference], &amount)?;
    }
    set_widths(sheet, &[50.0, 18.0, 18.0, 18.0])?;

    workbook.save(path)?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "reconciliation written");
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin)
}

fn write_header(sheet: &mut Worksheet, titles: &[&str], format: &Format) -> Result<(), SheetError> {
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, format)?;
    }
    Ok(())
}

fn write_amounts(sheet: &mut Worksheet, row: u32, amounts: &[Money], format: &Format) -> Result<(), SheetError> {
    for (i, amount) in amounts.iter().enumerate() {
        sheet.write_number_with_format(row, i as u16 + 1, amount.to_f64(), format)?;
    }
    Ok(())
}

fn set_widths(sheet: &mut Worksheet, widths: &[f64]) -> Result<(), SheetError> {
    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}
