//! Error types for the pdfcarve recovery engine.
//!
//! Recovery queries degrade to partial results instead of failing; these
//! errors surface only when opening a file and at the signature gate.

use thiserror::Error;

/// Primary error type for PDF structure recovery.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PDF file: missing %PDF signature")]
    NotPdf,
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
