//! PDF file structure - footers, xref tables, object discovery and parts.
//!
//! This module contains:
//! - `catalog` - the `PdfFile` entry point
//! - `xref` - footer chain discovery, xref tables and the trailer
//! - `scan` - fallback object scanner for damaged files
//! - `parts` - file-part assembly and stream classification

pub mod catalog;
pub mod parts;
pub mod scan;
pub mod xref;

// Re-export main types for convenience
pub use catalog::PdfFile;
pub use parts::{Assembler, Discovery, Section, classify_stream, filter_name};
pub use scan::scan_objects;
pub use xref::{find_startxrefs, read_trailer, read_xref_table};
