use lopdf::Document;
use tracing::{debug, warn};

use crate::types::{AppError, AppResult};

/// Pages read from a PDF before the rest are skipped.
pub const MAX_PDF_PAGES: usize = 20;

/// Extract text from the first [`MAX_PDF_PAGES`] pages, each prefixed with a
/// page marker. The returned count is the document's real page count.
pub fn extract_pdf(bytes: &[u8]) -> AppResult<(String, usize)> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("Failed to extract PDF text: {}", e)))?;

    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut text = String::new();
    for (index, page_number) in pages.keys().take(MAX_PDF_PAGES).enumerate() {
        let page_text = doc.extract_text(&[*page_number]).unwrap_or_else(|e| {
            warn!(page = page_number, error = %e, "Could not extract text from PDF page");
            String::new()
        });
        text.push_str(&format!("\n--- Page {} ---\n{}", index + 1, page_text));
    }

    debug!(page_count, chars = text.chars().count(), "Extracted PDF");
    Ok((text, page_count))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build an in-memory PDF with one line of Helvetica text per page.
    pub(crate) fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_extract_pages_with_markers() {
        let pdf = build_pdf(&["Cell biology", "Mitochondria"]);
        let (text, pages) = extract_pdf(&pdf).unwrap();

        assert_eq!(pages, 2);
        assert!(text.starts_with("\n--- Page 1 ---\n"));
        assert!(text.contains("--- Page 2 ---"));
    }

    #[test]
    fn test_page_cap_reports_true_count() {
        let texts: Vec<String> = (1..=23).map(|i| format!("Chapter {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let (text, pages) = extract_pdf(&build_pdf(&refs)).unwrap();

        assert_eq!(pages, 23);
        assert!(text.contains("--- Page 20 ---"));
        assert!(!text.contains("--- Page 21 ---"));
    }

    #[test]
    fn test_corrupt_pdf() {
        let err = extract_pdf(b"%PDF-1.5 this is not really a pdf").unwrap_err();
        assert!(err.to_string().starts_with("Failed to extract PDF text"));
    }
}
