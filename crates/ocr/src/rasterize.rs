use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    /// The bytes could not be opened or rendered as a PDF.
    #[error("Document could not be rendered: {0}")]
    Unreadable(String),
    #[error("PDF renderer error: {0}")]
    Backend(String),
    #[error("PDF rasterizer not available; rebuild with the `pdfium` feature")]
    NotAvailable,
}

/// Turns a multi-page document into one image per page, in page order.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, document: &[u8]) -> Result<Vec<DynamicImage>, RasterError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Yields `pages` blank white pages regardless of input; pair it with
/// `MockRecognizer` to drive the pipeline without a PDF engine.
pub struct MockRasterizer {
    pub pages: usize,
}

impl MockRasterizer {
    pub fn new(pages: usize) -> Self {
        Self { pages }
    }
}

impl PageRasterizer for MockRasterizer {
    fn rasterize(&self, document: &[u8]) -> Result<Vec<DynamicImage>, RasterError> {
        if document.is_empty() {
            return Err(RasterError::Unreadable("empty document".into()));
        }
        Ok((0..self.pages)
            .map(|_| {
                let page: GrayImage = ImageBuffer::from_fn(8, 8, |_, _| Luma([255u8]));
                DynamicImage::ImageLuma8(page)
            })
            .collect())
    }
}

/// Placeholder used when no PDF engine was compiled in.
pub struct UnavailableRasterizer;

impl PageRasterizer for UnavailableRasterizer {
    fn rasterize(&self, _document: &[u8]) -> Result<Vec<DynamicImage>, RasterError> {
        Err(RasterError::NotAvailable)
    }
}

// ── Pdfium backend (optional, gated behind `pdfium` feature) ──────────────────

#[cfg(feature = "pdfium")]
pub mod pdfium_backend {
    use super::{PageRasterizer, RasterError};
    use image::DynamicImage;
    use pdfium_render::prelude::*;

    pub struct PdfiumRasterizer {
        /// Directory holding the pdfium shared library; system search path if `None`.
        library_dir: Option<String>,
        target_width: u32,
    }

    impl PdfiumRasterizer {
        pub fn new(library_dir: Option<String>, target_width: u32) -> Self {
            Self { library_dir, target_width }
        }

        fn bind(&self) -> Result<Pdfium, RasterError> {
            let bindings = match &self.library_dir {
                Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
                None => Pdfium::bind_to_system_library(),
            }
            .map_err(|e| RasterError::Backend(e.to_string()))?;
            Ok(Pdfium::new(bindings))
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize(&self, document: &[u8]) -> Result<Vec<DynamicImage>, RasterError> {
            let pdfium = self.bind()?;
            let doc = pdfium
                .load_pdf_from_byte_slice(document, None)
                .map_err(|e| RasterError::Unreadable(e.to_string()))?;
            let config = PdfRenderConfig::new().set_target_width(self.target_width as Pixels);

            doc.pages()
                .iter()
                .map(|page| {
                    page.render_with_config(&config)
                        .map(|bitmap| bitmap.as_image())
                        .map_err(|e| RasterError::Unreadable(e.to_string()))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_yields_requested_page_count() {
        let pages = MockRasterizer::new(3).rasterize(b"%PDF-1.4").unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].width(), 8);
    }

    #[test]
    fn mock_rejects_empty_document() {
        assert!(matches!(
            MockRasterizer::new(1).rasterize(b""),
            Err(RasterError::Unreadable(_))
        ));
    }

    #[test]
    fn unavailable_rasterizer_errors() {
        assert!(matches!(
            UnavailableRasterizer.rasterize(b"%PDF"),
            Err(RasterError::NotAvailable)
        ));
    }
}
