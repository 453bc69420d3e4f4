//! Resume text extraction. PDFs go through `pdf-extract`; anything else must be UTF-8.

use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Resume file is required")]
    MissingResume,

    #[error("Resume file is empty")]
    EmptyResume,

    #[error("Could not read text from PDF: {0}")]
    Pdf(String),

    #[error("Resume is neither a PDF nor UTF-8 text")]
    UnsupportedEncoding,

    #[error("No readable text found in resume")]
    NoText,
}

/// True when the upload looks like a PDF by magic bytes, content type or extension.
pub fn is_pdf(bytes: &[u8], content_type: Option<&str>, file_name: Option<&str>) -> bool {
    bytes.starts_with(PDF_MAGIC)
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || file_name.is_some_and(|name| name.to_lowercase().ends_with(".pdf"))
}

/// Extracts lower-cased text from an uploaded resume.
pub fn extract_text(
    bytes: &[u8],
    content_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<String, ScreeningError> {
    if bytes.is_empty() {
        return Err(ScreeningError::EmptyResume);
    }

    let text = if is_pdf(bytes, content_type, file_name) {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ScreeningError::Pdf(e.to_string()))?
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|_| ScreeningError::UnsupportedEncoding)?
    };

    if text.trim().is_empty() {
        return Err(ScreeningError::NoText);
    }
    Ok(text.to_lowercase())
}
