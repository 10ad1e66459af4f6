//! Spreadsheet and CSV I/O for the three tools: raw rows in, styled xlsx out.

pub mod read;
pub mod write;

use thiserror::Error;

pub use read::{read_party_table, read_rows};
pub use write::{write_reconciliation, write_statement, write_summary};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read spreadsheet: {0}")]
    Read(#[from] calamine::Error),
    #[error("Failed to write spreadsheet: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("Spreadsheet has no sheets")]
    NoSheets,
    #[error("Expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("Invalid amount {value:?} in row {row}")]
    InvalidAmount { row: usize, value: String },
}
