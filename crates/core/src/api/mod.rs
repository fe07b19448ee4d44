//! Public façade helpers built on top of the recovery passes.
//!
//! # Example
//!
//! ```ignore
//! use pdfcarve_core::{FilterDecoder, PdfFile, ScanContext};
//!
//! let file = PdfFile::open("document.pdf")?;
//! for stream in file.unpack_streams(&FilterDecoder::new(), &ScanContext::new()) {
//!     std::fs::write(stream.file_name(), &stream.data)?;
//! }
//! ```

pub mod unpack;

pub use unpack::{UnpackedStream, sanitize_file_name, unpack_streams};
