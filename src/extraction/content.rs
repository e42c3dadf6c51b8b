//! Document content as carried between the extractor, the cache and the
//! generation services.
//!
//! On the wire (HTTP bodies, cache) content is always a string; images travel
//! as `[IMAGE_DATA:<mime>:<base64>]`. Inside the service it is parsed once into
//! [`DocumentContent`] and every consumer matches on the variant.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::types::AppResult;

const IMAGE_PREFIX: &str = "[IMAGE_DATA:";

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    Text(String),
    Image { mime: String, bytes: Vec<u8> },
}

impl DocumentContent {
    pub fn image(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        DocumentContent::Image {
            mime: mime.into(),
            bytes,
        }
    }

    /// Parse wire text. A string that is not a well-formed image marker is
    /// plain text; a well-formed marker with an undecodable body is an error.
    pub fn from_wire(text: &str) -> AppResult<Self> {
        match split_image_marker(text) {
            Some((mime, data)) => {
                let bytes = BASE64.decode(data)?;
                Ok(DocumentContent::image(mime, bytes))
            }
            None => Ok(DocumentContent::Text(text.to_string())),
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            DocumentContent::Text(text) => text.clone(),
            DocumentContent::Image { mime, bytes } => {
                format!("{}{}:{}]", IMAGE_PREFIX, mime, BASE64.encode(bytes))
            }
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentContent::Image { .. })
    }
}

/// Returns `(mime, base64)` when `text` has the exact image marker shape.
fn split_image_marker(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix(IMAGE_PREFIX)?.strip_suffix(']')?;
    let (mime, data) = body.split_once(':')?;
    if mime.is_empty() || data.is_empty() || data.contains('\n') {
        return None;
    }
    Some((mime, data))
}

/// Decode a base64 upload, tolerating a `data:<mime>;base64,` URL prefix.
pub fn decode_base64_file(data: &str) -> AppResult<Vec<u8>> {
    let payload = match data.split_once(',') {
        Some((_, rest)) => rest,
        None => data,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(BASE64.decode(cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppError;

    #[test]
    fn test_image_marker_parses() {
        let bytes = vec![0u8, 1, 2, 250, 255];
        let wire = format!("[IMAGE_DATA:image/png:{}]", BASE64.encode(&bytes));

        let content = DocumentContent::from_wire(&wire).unwrap();
        assert_eq!(content, DocumentContent::image("image/png", bytes));
        assert_eq!(content.to_wire(), wire);
    }

    #[test]
    fn test_plain_text_is_not_image() {
        for text in [
            "Lecture notes about photosynthesis",
            "[IMAGE_DATA:image/png]",
            "[IMAGE_DATA::aGVsbG8=]",
            "[IMAGE_DATA:image/png:aGVsbG8=",
            "prefix [IMAGE_DATA:image/png:aGVsbG8=]",
            "",
        ] {
            let content = DocumentContent::from_wire(text).unwrap();
            assert!(!content.is_image(), "{text:?} detected as image");
            assert_eq!(content.to_wire(), text);
        }
    }

    #[test]
    fn test_corrupt_image_body() {
        let err = DocumentContent::from_wire("[IMAGE_DATA:image/png:@@not-base64@@]").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_decode_with_and_without_data_url() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = BASE64.encode(&bytes);

        assert_eq!(decode_base64_file(&encoded).unwrap(), bytes);
        assert_eq!(
            decode_base64_file(&format!("data:application/pdf;base64,{encoded}")).unwrap(),
            bytes
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_base64_file("data:text/plain;base64,***"),
            Err(AppError::Decode(_))
        ));
    }
}
