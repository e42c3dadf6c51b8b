//! Document Extraction
//!
//! Turns uploaded bytes into [`DocumentContent`] plus a display-only unit
//! count (pages, slides or an estimate), dispatching on the file extension.

pub mod content;
pub mod ooxml;
pub mod pdf;

pub use content::{decode_base64_file, DocumentContent};

use tracing::info;

use crate::types::{AppError, AppResult};

/// Character ceiling for extracted text.
pub const MAX_TEXT_CHARS: usize = 50_000;
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Characters per estimated DOCX page.
const DOCX_CHARS_PER_PAGE: usize = 3000;

const LEGACY_DOC_NOTICE: &str =
    "[This is an older .doc format. Please convert to .docx for better support.]";
const LEGACY_PPT_NOTICE: &str =
    "[This is an older .ppt format. Please convert to .pptx for better support.]";

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub content: DocumentContent,
    pub units: usize,
}

/// Lowercased text after the last `.`; the whole name when there is none.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

pub fn image_mime_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

pub fn extract(bytes: &[u8], filename: &str) -> AppResult<Extracted> {
    let extension = file_extension(filename);

    let (content, units) = match extension.as_str() {
        "pdf" => {
            let (text, pages) = pdf::extract_pdf(bytes)?;
            (DocumentContent::Text(truncate_text(text)), pages)
        }
        "docx" => {
            let text = ooxml::extract_docx(bytes)?;
            let pages = (text.chars().count() / DOCX_CHARS_PER_PAGE).max(1);
            (DocumentContent::Text(truncate_text(text)), pages)
        }
        "pptx" => {
            let (text, slides) = ooxml::extract_pptx(bytes)?;
            (DocumentContent::Text(truncate_text(text)), slides)
        }
        "doc" => (DocumentContent::Text(LEGACY_DOC_NOTICE.to_string()), 1),
        "ppt" => (DocumentContent::Text(LEGACY_PPT_NOTICE.to_string()), 1),
        ext if IMAGE_EXTENSIONS.contains(&ext) => {
            (DocumentContent::image(image_mime_type(ext), bytes.to_vec()), 1)
        }
        other => return Err(AppError::UnsupportedType(other.to_string())),
    };

    info!(
        filename = %filename,
        extension = %extension,
        units,
        image = content.is_image(),
        "Extracted document"
    );
    Ok(Extracted { content, units })
}

/// Cut `text` to [`MAX_TEXT_CHARS`] characters and append the marker when
/// anything was dropped.
pub fn truncate_text(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_TEXT_CHARS) {
        text.truncate(cut);
        text.push_str(TRUNCATION_MARKER);
    }
    text
}
