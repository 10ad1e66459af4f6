pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod rasterize;
pub mod recognizer;
pub mod types;

pub use extract::StatementParser;
pub use pipeline::{PipelineError, StatementPipeline};
pub use preprocess::{prepare_page, PreprocessError};
pub use rasterize::{MockRasterizer, PageRasterizer, RasterError, UnavailableRasterizer};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use types::{PageProgress, ParsedStatement, StatementExtraction};

#[cfg(feature = "pdfium")]
pub use rasterize::pdfium_backend::PdfiumRasterizer;
#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
