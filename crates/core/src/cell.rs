use std::fmt;

use crate::money::Money;

/// A spreadsheet or CSV cell as it arrives from the file readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// The trimmed textual form, `None` for blank cells.
    pub fn text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_string().trim().to_string())
    }

    /// Numeric value of the cell; text cells are parsed leniently.
    pub fn money(&self) -> Option<Money> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Money::from_f64(*n),
            Cell::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            // Integers print without a trailing ".0" (account numbers, serials).
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Returns the cell at `idx`, treating short rows as blank.
pub fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&Cell::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(700224.0).to_string(), "700224");
        assert_eq!(Cell::Number(12.5).to_string(), "12.5");
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(Cell::Text("   ".into()).is_empty());
        assert_eq!(Cell::Text("  ABC  ".into()).text().as_deref(), Some("ABC"));
        assert_eq!(Cell::Empty.text(), None);
    }

    #[test]
    fn money_from_text_and_number() {
        assert_eq!(Cell::Number(1200.5).money().unwrap().to_string(), "1200.50");
        assert_eq!(Cell::Text("1,000".into()).money().unwrap().to_string(), "1000.00");
        assert_eq!(Cell::Text("Dr".into()).money(), None);
        assert_eq!(Cell::Empty.money(), None);
    }

    #[test]
    fn short_rows_read_as_blank() {
        let row = vec![Cell::Text("a".into())];
        assert_eq!(cell_at(&row, 5), &Cell::Empty);
    }
}
