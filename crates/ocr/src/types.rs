use serde::Serialize;
use tdsreco_core::{SkipTally, StatementRecord};

/// Pages recognized so far out of the document total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageProgress {
    pub completed: usize,
    pub total: usize,
}

impl PageProgress {
    /// Completed fraction in 0.0–1.0; an empty document counts as done.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

impl std::fmt::Display for PageProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({:.0}%)", self.completed, self.total, self.fraction() * 100.0)
    }
}

/// Records parsed out of a block of OCR text, with the lines that were
/// rejected counted by reason.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedStatement {
    /// Deduplicated by party name (first occurrence wins), sorted ascending.
    pub records: Vec<StatementRecord>,
    /// Lines that produced a record, before deduplication.
    pub matched_lines: usize,
    pub skipped: SkipTally,
}

/// The outcome of a full extraction run over one document.
#[derive(Debug, Clone, Serialize)]
pub struct StatementExtraction {
    pub page_count: usize,
    /// Concatenated OCR text, one newline after each page.
    pub ocr_text: String,
    pub parsed: ParsedStatement,
}

impl StatementExtraction {
    pub fn records(&self) -> &[StatementRecord] {
        &self.parsed.records
    }
}
