use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::period::opening_marker;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for all three tools. Every field has a default, so an empty file
/// (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub statement: StatementConfig,
    pub ledger: LedgerConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// Trimmed OCR lines shorter than this are noise.
    pub min_line_len: usize,
    /// Numeric tokens must exceed this to count as an amount.
    pub min_amount: u32,
    /// Party names must be strictly longer than this.
    pub min_party_len: usize,
    pub ocr_language: String,
    pub tessdata_dir: Option<String>,
    /// Tesseract page segmentation mode; 6 treats a page as one uniform block.
    pub page_seg_mode: u8,
    /// Render width in pixels for each rasterized page.
    pub render_width: u32,
    /// Directory holding the pdfium shared library; system search path if unset.
    pub pdfium_dir: Option<String>,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            min_line_len: 15,
            min_amount: 10,
            min_party_len: 3,
            ocr_language: "eng".to_string(),
            tessdata_dir: None,
            page_seg_mode: 6,
            render_width: 2000,
            pdfium_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub description_column: usize,
    pub debit_column: usize,
    pub credit_column: usize,
    /// Rows whose description contains any of these are headers or balances.
    pub skip_markers: Vec<String>,
    /// Fragments removed from descriptions to get the party name.
    pub strip_fragments: Vec<String>,
    /// Party names containing this are placeholders, not parties.
    pub excluded_fragment: String,
    /// Party names shorter than this are dropped.
    pub min_party_len: usize,
    /// First month of the financial year; its opening-balance label ("1-Apr")
    /// is added to the skip markers.
    pub fiscal_year_start_month: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            description_column: 2,
            debit_column: 4,
            credit_column: 5,
            skip_markers: vec![
                "Closing Balance".to_string(),
                "Opening Balance".to_string(),
                "Balance".to_string(),
                "700224".to_string(),
                "Ledger Account".to_string(),
            ],
            strip_fragments: vec!["(Rent)".to_string(), "(Interest)".to_string()],
            excluded_fragment: "(as per details)".to_string(),
            min_party_len: 3,
            fiscal_year_start_month: 4,
        }
    }
}

impl LedgerConfig {
    /// Configured markers plus the financial-year opening label.
    pub fn effective_skip_markers(&self) -> Vec<String> {
        let mut markers = self.skip_markers.clone();
        if let Some(marker) = opening_marker(self.fiscal_year_start_month) {
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }
        markers
    }
}

/// How a statement row already claimed by one books row is treated when a
/// later books row scores it highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every books row picks its best statement row, even one already taken.
    #[default]
    Greedy,
    /// Taken statement rows are withheld from later books rows.
    Exclusive,
}

impl std::str::FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greedy" => Ok(MatchPolicy::Greedy),
            "exclusive" => Ok(MatchPolicy::Exclusive),
            other => Err(format!("Unknown match policy: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Minimum token-set similarity (0–100) for a pair to count as matched.
    pub threshold: u8,
    /// Differences strictly below this (absolute) are shown as matched.
    pub tolerance: f64,
    pub policy: MatchPolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { threshold: 75, tolerance: 1.0, policy: MatchPolicy::Greedy }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_toml(&std::fs::read_to_string(p)?),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reconcile.threshold > 100 {
            return Err(ConfigError::Invalid(format!(
                "reconcile.threshold must be 0-100, got {}",
                self.reconcile.threshold
            )));
        }
        if self.reconcile.tolerance.is_nan() || self.reconcile.tolerance < 0.0 {
            return Err(ConfigError::Invalid("reconcile.tolerance must be >= 0".into()));
        }
        if opening_marker(self.ledger.fiscal_year_start_month).is_none() {
            return Err(ConfigError::Invalid(format!(
                "ledger.fiscal_year_start_month must be 1-12, got {}",
                self.ledger.fiscal_year_start_month
            )));
        }
        Ok(())
    }
}
