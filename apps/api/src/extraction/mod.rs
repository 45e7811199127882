// Document extraction: raw text from uploaded files, then contact entities from that text.
// PDF parsing is CPU-bound and can panic on malformed input; run it via `extract_text`,
// which moves the work onto tokio's blocking pool.

pub mod entities;
pub mod text;

use thiserror::Error;

pub use entities::{EntityExtractor, RegexEntityExtractor};
pub use text::{extract_text, DocumentTextExtractor, TextExtractor};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("'{0}' is not a supported document type (expected PDF or plain text)")]
    UnsupportedFormat(String),

    #[error("'{0}' is not valid UTF-8 text")]
    InvalidEncoding(String),

    #[error("'{0}' is encrypted")]
    Encrypted(String),

    #[error("failed to read PDF '{filename}': {message}")]
    Pdf { filename: String, message: String },

    #[error("PDF parser aborted while reading '{0}'")]
    Aborted(String),
}
