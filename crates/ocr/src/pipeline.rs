use std::path::Path;
use thiserror::Error;

use tdsreco_core::StatementConfig;

use crate::extract::StatementParser;
use crate::preprocess::{self, PreprocessError};
use crate::rasterize::{PageRasterizer, RasterError};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{PageProgress, StatementExtraction};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ran to completion but found nothing usable. Not a failure of the tool.
    #[error("No valid data found in the document. Please ensure the scan quality is good.")]
    NoValidData,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF rasterization failed: {0}")]
    Raster(#[from] RasterError),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Orchestrates: rasterize → per page (preprocess → OCR) → parse lines.
///
/// Nothing is returned until every page has been recognized; `progress` is
/// called after each page so callers can report how far along a long scan is.
pub struct StatementPipeline<P: PageRasterizer, R: OcrBackend> {
    rasterizer: P,
    recognizer: R,
    parser: StatementParser,
}

impl<P: PageRasterizer, R: OcrBackend> StatementPipeline<P, R> {
    pub fn new(rasterizer: P, recognizer: R, config: &StatementConfig) -> Self {
        Self { rasterizer, recognizer, parser: StatementParser::new(config) }
    }

    /// Process a PDF on disk.
    pub async fn process_file(
        &self,
        path: &Path,
        progress: impl FnMut(PageProgress),
    ) -> Result<StatementExtraction, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes, progress)
    }

    /// Process raw PDF bytes.
    pub fn process_bytes(
        &self,
        document: &[u8],
        mut progress: impl FnMut(PageProgress),
    ) -> Result<StatementExtraction, PipelineError> {
        // 1. Rasterize. A document that cannot be opened has no data in it.
        let pages = match self.rasterizer.rasterize(document) {
            Ok(pages) => pages,
            Err(RasterError::Unreadable(reason)) => {
                tracing::warn!(%reason, "document could not be rasterized");
                return Err(PipelineError::NoValidData);
            }
            Err(e) => return Err(e.into()),
        };
        let total = pages.len();
        tracing::info!(pages = total, "document rasterized");

        // 2. Preprocess + OCR each page, in order.
        let mut ocr_text = String::new();
        for (idx, page) in pages.into_iter().enumerate() {
            let png = preprocess::prepare_page(page)?;
            let text = self.recognizer.recognize(&png)?;
            tracing::debug!(page = idx + 1, chars = text.len(), "page recognized");
            ocr_text.push_str(&text);
            ocr_text.push('\n');

            let p = PageProgress { completed: idx + 1, total };
            tracing::debug!(progress = %p, "OCR progress");
            progress(p);
        }

        // 3. Parse rows out of the combined text.
        let parsed = self.parser.parse(&ocr_text);
        tracing::info!(
            records = parsed.records.len(),
            matched_lines = parsed.matched_lines,
            skipped = %parsed.skipped,
            "statement parsed"
        );

        if parsed.records.is_empty() {
            return Err(PipelineError::NoValidData);
        }

        Ok(StatementExtraction { page_count: total, ocr_text, parsed })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
