//! Document conversion: PDF bytes to plain text, and PDF bytes to a preview image.
//!
//! Both conversions are CPU-bound and run on the blocking pool. The trait
//! exists so orchestrator tests can substitute canned text and images.

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};

pub mod pdf;

pub use pdf::PdfConverter;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Nothing extractable: usually an image-only or encrypted PDF.
    #[error("no text extracted, PDF may be image-based or encrypted")]
    EmptyExtraction,

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Plain text of every decodable page; see [`assemble_text`].
    async fn extract_text(&self, pdf: Bytes) -> Result<String, ConvertError>;

    /// Rasterizes page index 0 only.
    async fn render_first_page(&self, pdf: Bytes) -> Result<DynamicImage, ConvertError>;
}

/// Joins per-page extraction results into one document.
///
/// Failed pages are logged and skipped. Each page has its whitespace collapsed
/// to single spaces; pages are separated by a blank line. An all-blank result is
/// `EmptyExtraction`, never an empty success.
pub fn assemble_text<E: std::fmt::Display>(
    pages: impl IntoIterator<Item = Result<String, E>>,
) -> Result<String, ConvertError> {
    let mut out = String::new();
    for (idx, page) in pages.into_iter().enumerate() {
        let text = match page {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping page {}: {e}", idx + 1);
                continue;
            }
        };
        let cleaned = clean_page(&text);
        if cleaned.is_empty() {
            continue;
        }
        out.push_str(&cleaned);
        out.push_str("\n\n");
    }

    let out = out.trim();
    if out.is_empty() {
        return Err(ConvertError::EmptyExtraction);
    }
    Ok(out.to_string())
}

fn clean_page(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lossless PNG encoding of a rendered page.
pub fn encode_png(img: &DynamicImage) -> Result<Bytes, ConvertError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} preview → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_pages_are_collapsed_and_separated_by_blank_line() {
        let pages: Vec<Result<String, String>> = vec![
            Ok("  Jane   Doe\n   Senior Engineer  \n\n".to_string()),
            Ok("Skills:\tRust,\n Go".to_string()),
        ];
        assert_eq!(
            assemble_text(pages).unwrap(),
            "Jane Doe Senior Engineer\n\nSkills: Rust, Go"
        );
    }

    #[test]
    fn test_failed_pages_are_skipped() {
        let pages = vec![
            Err("bad xref".to_string()),
            Ok("Experience".to_string()),
            Err("bad font".to_string()),
        ];
        assert_eq!(assemble_text(pages).unwrap(), "Experience");
    }

    #[test]
    fn test_blank_pages_are_empty_extraction() {
        let pages: Vec<Result<String, String>> =
            vec![Ok("   \n\n".to_string()), Ok(String::new())];
        assert!(matches!(
            assemble_text(pages),
            Err(ConvertError::EmptyExtraction)
        ));
    }

    #[test]
    fn test_all_pages_failing_is_empty_extraction() {
        let pages = vec![Err::<String, _>("boom")];
        assert!(matches!(
            assemble_text(pages),
            Err(ConvertError::EmptyExtraction)
        ));
    }

    #[test]
    fn test_encode_png_has_png_signature() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
