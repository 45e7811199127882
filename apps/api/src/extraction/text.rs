//! Text Extractor: turns an uploaded document into its concatenated text.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::extraction::ExtractionError;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Content sniffing first (`%PDF-`), then the filename extension.
    pub fn detect(filename: &str, bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            return Some(DocumentKind::Pdf);
        }
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" | "text" | "md" | "markdown" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

/// Reads a document's text. Implementations are synchronous and may be CPU-heavy.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Default extractor: PDF via `pdf-extract`, plain text as UTF-8.
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
        match DocumentKind::detect(filename, bytes) {
            Some(DocumentKind::Pdf) => extract_pdf(filename, bytes),
            Some(DocumentKind::PlainText) => extract_plain_text(filename, bytes),
            None => Err(ExtractionError::UnsupportedFormat(filename.to_string())),
        }
    }
}

fn extract_pdf(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    if is_encrypted_pdf(bytes) {
        return Err(ExtractionError::Encrypted(filename.to_string()));
    }
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf {
        filename: filename.to_string(),
        message: e.to_string(),
    })?;
    debug!("Extracted {} chars from PDF '{}'", text.len(), filename);
    Ok(text)
}

fn extract_plain_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ExtractionError::InvalidEncoding(filename.to_string()))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

/// An encrypted PDF names an `/Encrypt` dictionary in its trailer. Classic files keep
/// the trailer after the last `trailer` keyword; files with a cross-reference stream
/// carry it in the dictionary of the object `startxref` points at. Page content is
/// never inspected.
fn is_encrypted_pdf(bytes: &[u8]) -> bool {
    const MARKER: &[u8] = b"/Encrypt";
    let in_trailer =
        rfind(bytes, b"trailer").is_some_and(|start| find(&bytes[start..], MARKER).is_some());
    in_trailer || xref_stream_dictionary(bytes).is_some_and(|dict| find(dict, MARKER).is_some())
}

fn xref_stream_dictionary(bytes: &[u8]) -> Option<&[u8]> {
    const KEYWORD: &[u8] = b"startxref";
    let after = rfind(bytes, KEYWORD)? + KEYWORD.len();
    let digits: String = bytes[after..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| char::from(b))
        .collect();
    let object = bytes.get(digits.parse::<usize>().ok()?..)?;
    let end = find(object, b"stream").unwrap_or(object.len());
    Some(&object[..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Runs `extractor` on the blocking pool. A panic inside the extractor is reported
/// as `ExtractionError::Aborted` for that document.
pub async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    filename: String,
    bytes: Bytes,
) -> Result<String, ExtractionError> {
    let name = filename.clone();
    tokio::task::spawn_blocking(move || extractor.extract(&filename, &bytes))
        .await
        .map_err(|_| ExtractionError::Aborted(name))?
}
