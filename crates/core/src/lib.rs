//! pdfcarve - structural recovery of PDF files.
//!
//! Locates the footer chain, reads classic xref tables, falls back to
//! scanning for `N G obj … endobj` spans in damaged files, resolves stream
//! boundaries and splits the file into typed byte ranges.

pub mod api;
pub mod codec;
pub mod context;
pub mod document;
pub mod error;
pub mod model;
pub mod params;
pub mod parser;
pub mod source;

pub use api::{UnpackedStream, sanitize_file_name};
pub use codec::{CompressMethod, DecompressError, Decompressor, FilterDecoder};
pub use context::{CancelToken, ProgressCounter, ProgressSink, ScanContext};
pub use document::PdfFile;
pub use error::{PdfError, Result};
pub use model::{
    FilePart, FilePartKind, FooterRecord, MemoryMap, ObjectRecord, ParsedObject, PartMask,
    PartProperties, StreamRecord, TypedValue,
};
pub use params::ScanOptions;
pub use source::{PdfBytes, Window};
