use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tdsreco_core::{Config, PartyAmount, StatementConfig, TOTAL_LABEL};
use tdsreco_import::{LedgerSummarizer, Reconciler};
use tdsreco_ocr::{OcrBackend, PageRasterizer, PipelineError, StatementPipeline};
use tdsreco_sheet::{read_party_table, read_rows, write_reconciliation, write_statement, write_summary};

/// How a command finished when it did not fail.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The output sheet was written here.
    Written(PathBuf),
    /// Nothing qualified; no file was written.
    NoData(String),
}

// ── Extract ──────────────────────────────────────────────────────────────────

pub async fn extract(config: &Config, pdf: &Path, output: &Path, json: bool) -> Result<Outcome> {
    let pipeline = StatementPipeline::new(
        rasterizer(&config.statement),
        recognizer(&config.statement),
        &config.statement,
    );

    let result = pipeline
        .process_file(pdf, |p| {
            eprint!("\rOCR {p}");
            if p.completed == p.total {
                eprintln!();
            }
        })
        .await;

    let extraction = match result {
        Ok(extraction) => extraction,
        Err(PipelineError::NoValidData) => return Ok(Outcome::NoData(PipelineError::NoValidData.to_string())),
        Err(e) => return Err(e).with_context(|| format!("processing {}", pdf.display())),
    };

    write_statement(output, extraction.records()).with_context(|| format!("writing {}", output.display()))?;
    if json {
        print_json(extraction.records())?;
    }
    Ok(Outcome::Written(output.to_path_buf()))
}

#[cfg(feature = "pdfium")]
fn rasterizer(config: &StatementConfig) -> impl PageRasterizer {
    tdsreco_ocr::PdfiumRasterizer::new(config.pdfium_dir.clone(), config.render_width)
}

#[cfg(not(feature = "pdfium"))]
fn rasterizer(_config: &StatementConfig) -> impl PageRasterizer {
    tdsreco_ocr::UnavailableRasterizer
}

#[cfg(feature = "tesseract")]
fn recognizer(config: &StatementConfig) -> impl OcrBackend {
    tdsreco_ocr::TesseractRecognizer::new(config.tessdata_dir.clone(), &config.ocr_language, config.page_seg_mode)
}

#[cfg(not(feature = "tesseract"))]
fn recognizer(_config: &StatementConfig) -> impl OcrBackend {
    tdsreco_ocr::UnavailableRecognizer
}

// ── Summarize ────────────────────────────────────────────────────────────────

pub fn summarize(config: &Config, ledger: &Path, output: &Path, json: bool) -> Result<Outcome> {
    let rows = read_rows(ledger).with_context(|| format!("reading {}", ledger.display()))?;
    let summary = LedgerSummarizer::new(&config.ledger)
        .summarize(&rows)
        .with_context(|| format!("summarizing {}", ledger.display()))?;
    tracing::info!(
        parties = summary.totals.len(),
        rows_used = summary.rows_used,
        skipped = %summary.skipped,
        "ledger summarized"
    );

    if summary.is_empty() {
        return Ok(Outcome::NoData("No valid party rows found in the ledger.".to_string()));
    }

    write_summary(output, &summary).with_context(|| format!("writing {}", output.display()))?;
    if json {
        let mut rows = summary.totals.clone();
        rows.push(PartyAmount::new(TOTAL_LABEL, summary.total));
        print_json(&rows)?;
    }
    Ok(Outcome::Written(output.to_path_buf()))
}

// ── Reconcile ────────────────────────────────────────────────────────────────

pub fn reconcile(config: &Config, books: &Path, statement: &Path, output: &Path, json: bool) -> Result<Outcome> {
    let books_rows = read_party_table(books).with_context(|| format!("reading {}", books.display()))?;
    let statement_rows =
        read_party_table(statement).with_context(|| format!("reading {}", statement.display()))?;

    let report = Reconciler::new(&config.reconcile)
        .reconcile(&books_rows, &statement_rows)
        .context("reconciling books against statement")?;

    write_reconciliation(output, &report).with_context(|| format!("writing {}", output.display()))?;
    if json {
        print_json(&report)?;
    }
    Ok(Outcome::Written(output.to_path_buf()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    write_json(std::io::stdout().lock(), value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut out: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
