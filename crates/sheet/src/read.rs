use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tdsreco_core::{Cell, PartyAmount};

use crate::SheetError;

/// Every row of the first sheet of a workbook, or of a CSV file, as cells.
///
/// `.csv` files are read without header handling and may have ragged rows;
/// anything else goes through calamine (xlsx, xlsm, xls, xlsb, ods).
pub fn read_rows(path: &Path) -> Result<Vec<Vec<Cell>>, SheetError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let rows = if is_csv { read_csv(path)? } else { read_workbook(path)? };
    tracing::debug!(path = %path.display(), rows = rows.len(), "rows read");
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Vec<Vec<Cell>>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(csv_cell).collect());
    }
    Ok(rows)
}

/// CSV has no types; numeric-looking fields become numbers so both readers
/// hand the same cells to the summarizer. Words that `f64` also accepts
/// ("inf", "NaN") stay text.
fn csv_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(field.to_string()),
    }
}

fn read_workbook(path: &Path) -> Result<Vec<Vec<Cell>>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(SheetError::NoSheets)??;
    Ok(range.rows().map(|row| row.iter().map(data_cell).collect()).collect())
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Read a two-column party/amount table, as written by the extractor or the
/// summarizer.
///
/// The first row is a header and its text is ignored. Rows missing a name or
/// an amount are dropped; an amount that is present but not a number fails
/// the whole read.
pub fn read_party_table(path: &Path) -> Result<Vec<PartyAmount>, SheetError> {
    let rows = read_rows(path)?;

    let width = rows.iter().map(|r| used_width(r)).max().unwrap_or(0);
    if width != 2 {
        return Err(SheetError::ColumnCount { expected: 2, found: width });
    }

    let mut table = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(1) {
        let (Some(name), Some(amount_cell)) = (row.first(), row.get(1)) else {
            continue;
        };
        let Some(name) = name.text() else {
            continue;
        };
        if amount_cell.is_empty() {
            continue;
        }
        let amount = amount_cell.money().ok_or_else(|| SheetError::InvalidAmount {
            row: idx + 1,
            value: amount_cell.to_string(),
        })?;
        table.push(PartyAmount::new(name, amount));
    }
    Ok(table)
}

/// Number of columns up to and including the last non-blank cell.
fn used_width(row: &[Cell]) -> usize {
    row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn money(s: &str) -> tdsreco_core::Money {
        s.parse().unwrap()
    }

    #[test]
    fn csv_rows_are_typed_and_ragged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "Ledger Account\n1-Jun-24,Journal,ABC Pvt Ltd,7,,1200.50\n").unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![Cell::Text("Ledger Account".into())]);
        assert_eq!(rows[1][2], Cell::Text("ABC Pvt Ltd".into()));
        assert_eq!(rows[1][4], Cell::Empty);
        assert_eq!(rows[1][5], Cell::Number(1200.5));
    }

    #[test]
    fn non_finite_words_stay_text() {
        for word in ["Infinity", "inf", "NaN", "-inf"] {
            assert_eq!(csv_cell(word), Cell::Text(word.to_string()), "{word}");
        }
        assert_eq!(csv_cell(" 1e3 "), Cell::Number(1000.0));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "a,b,Infinity,x,,100\n").unwrap();
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0][2].text().as_deref(), Some("Infinity"));
    }

    #[test]
    fn party_table_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        fs::write(
            &path,
            "Party,Amount\nAcme Traders,1000\n,50\nBeta Co,\nGamma Steels,\"1,250.75\"\nTOTAL,2250.75\n",
        )
        .unwrap();

        let table = read_party_table(&path).unwrap();
        assert_eq!(
            table,
            vec![
                PartyAmount::new("Acme Traders", money("1000")),
                PartyAmount::new("Gamma Steels", money("1250.75")),
                PartyAmount::new("TOTAL", money("2250.75")),
            ]
        );
    }

    #[test]
    fn party_table_needs_two_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.csv");
        fs::write(&path, "Party,Amount,Note\nAcme,10,x\n").unwrap();
        assert!(matches!(
            read_party_table(&path),
            Err(SheetError::ColumnCount { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn non_numeric_amount_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Party,Amount\nAcme,ten\n").unwrap();
        assert!(matches!(
            read_party_table(&path),
            Err(SheetError::InvalidAmount { row: 2, .. })
        ));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_rows(&dir.path().join("absent.xlsx")).is_err());
    }
}
