use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Below this width a rendered statement page is too coarse for the small
/// print in its table rows.
const MIN_OCR_WIDTH: u32 = 1600;
/// Above this Tesseract gets slow without reading any better.
const MAX_OCR_EDGE: u32 = 4200;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Page image is empty")]
    EmptyPage,
    #[error("Failed to encode processed page: {0}")]
    Encode(String),
}

/// Normalize one rasterized page and return PNG bytes ready for OCR.
pub fn prepare_page(page: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    if page.width() == 0 || page.height() == 0 {
        return Err(PreprocessError::EmptyPage);
    }
    encode_as_png(normalize(page))
}

/// Rescale into the OCR-friendly size band, then grayscale + contrast stretch.
fn normalize(page: DynamicImage) -> DynamicImage {
    let page = rescale(page);
    let gray: GrayImage = page.to_luma8();

    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    // Blank page: nothing to stretch.
    if max_px == min_px {
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn rescale(page: DynamicImage) -> DynamicImage {
    let (w, h) = (page.width(), page.height());
    if w.max(h) > MAX_OCR_EDGE {
        page.resize(MAX_OCR_EDGE, MAX_OCR_EDGE, FilterType::Lanczos3)
    } else if w < MIN_OCR_WIDTH {
        let scale = MIN_OCR_WIDTH.div_ceil(w);
        let (nw, nh) = (w * scale, h * scale);
        if nw.max(nh) > MAX_OCR_EDGE {
            page.resize(MAX_OCR_EDGE, MAX_OCR_EDGE, FilterType::CatmullRom)
        } else {
            page.resize_exact(nw, nh, FilterType::CatmullRom)
        }
    } else {
        page
    }
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
