use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use pdfium_render::prelude::*;
use pdf_extract::{Document, OutputError, PlainTextOutput};
use tracing::debug;

use super::{assemble_text, ConvertError, DocumentConverter};

/// Longest edge of a rendered preview, in pixels.
const PREVIEW_MAX_PIXELS: i32 = 1200;

/// Production converter: `pdf-extract` for text, pdfium for the preview.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    /// Directory holding the pdfium shared library; system search path when `None`.
    pdfium_dir: Option<PathBuf>,
}

impl PdfConverter {
    pub fn new(pdfium_dir: Option<PathBuf>) -> Self {
        Self { pdfium_dir }
    }
}

#[async_trait]
impl DocumentConverter for PdfConverter {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, ConvertError> {
        tokio::task::spawn_blocking(move || extract_text_blocking(&pdf)).await?
    }

    async fn render_first_page(&self, pdf: Bytes) -> Result<DynamicImage, ConvertError> {
        let dir = self.pdfium_dir.clone();
        tokio::task::spawn_blocking(move || render_first_page_blocking(dir.as_deref(), &pdf))
            .await?
    }
}

fn extract_text_blocking(pdf: &[u8]) -> Result<String, ConvertError> {
    let mut doc =
        Document::load_mem(pdf).map_err(|e| ConvertError::Extraction(e.to_string()))?;
    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| ConvertError::Extraction(format!("encrypted PDF: {e}")))?;
    }

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!("Extracting text from {} pages", page_numbers.len());
    assemble_text(page_numbers.into_iter().map(|n| extract_page(&doc, n)))
}

/// One page's text. A page that errors or panics inside pdf-extract becomes
/// an `Err` so the remaining pages still come through.
fn extract_page(doc: &Document, page_num: u32) -> Result<String, String> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut text = String::new();
        {
            let mut output = PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(doc, &mut output, page_num)?;
        }
        Ok::<_, OutputError>(text)
    }));

    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("decoder panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn bind_pdfium(dir: Option<&Path>) -> Result<Pdfium, ConvertError> {
    let bindings = match dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConvertError::Render(format!("pdfium library unavailable: {e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn render_first_page_blocking(dir: Option<&Path>, pdf: &[u8]) -> Result<DynamicImage, ConvertError> {
    let pdfium = bind_pdfium(dir)?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| ConvertError::Render(format!("cannot open PDF: {e:?}")))?;

    let page = document
        .pages()
        .get(0)
        .map_err(|e| ConvertError::Render(format!("no first page: {e:?}")))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(PREVIEW_MAX_PIXELS)
        .set_maximum_height(PREVIEW_MAX_PIXELS);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ConvertError::Render(format!("{e:?}")))?;

    let image = bitmap.as_image();
    debug!("Rendered first page → {}x{} px", image.width(), image.height());
    Ok(image)
}
