//! PDF file - main entry point for structural recovery.
//!
//! Handles:
//! - Signature and version checks
//! - Footer chain, xref tables and trailer lookup
//! - Object discovery (xref tables, append recovery, fallback scan)
//! - File parts, memory map and stream unpacking

use super::parts::Assembler;
use super::scan::scan_objects;
use super::xref::{find_startxrefs, read_trailer, read_xref_table};
use crate::api::unpack::{UnpackedStream, unpack_streams};
use crate::codec::Decompressor;
use crate::context::ScanContext;
use crate::error::{PdfError, Result};
use crate::model::{
    FilePart, FilePartKind, FooterRecord, MemoryMap, ObjectRecord, ParsedObject, PartMask, TypedValue,
    all_values_by_key,
};
use crate::params::ScanOptions;
use crate::parser::{Lexer, ObjectParser};
use crate::source::{PdfBytes, is_whitespace};
use bytes::Bytes;
use indexmap::IndexMap;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// `%PDF` read as a little-endian u32.
const PDF_MAGIC: u32 = 0x4644_5025;

/// A read-only PDF byte source plus scan options.
///
/// Every query recomputes its result from the bytes; nothing is cached.
#[derive(Debug, Clone)]
pub struct PdfFile {
    data: PdfBytes,
    options: ScanOptions,
}

impl PdfFile {
    /// Wraps a copy of `data`. No validity check is made.
    pub fn new<D: AsRef<[u8]>>(data: D) -> Self {
        Self::new_from_bytes(Bytes::copy_from_slice(data.as_ref()))
    }

    /// Wraps shared bytes (zero-copy).
    pub fn new_from_bytes(data: Bytes) -> Self {
        Self {
            data: PdfBytes::Owned(data),
            options: ScanOptions::default(),
        }
    }

    /// Wraps a memory-mapped file.
    pub fn new_from_mmap(mmap: Mmap) -> Self {
        Self {
            data: PdfBytes::Mapped(Arc::new(mmap)),
            options: ScanOptions::default(),
        }
    }

    /// Like [`new`](Self::new) but rejects data without the `%PDF` signature.
    pub fn new_checked<D: AsRef<[u8]>>(data: D) -> Result<Self> {
        let file = Self::new(data);
        if !file.is_valid() {
            return Err(PdfError::NotPdf);
        }
        Ok(file)
    }

    /// Memory-maps `path` and checks the signature.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and only ever read through slices.
        let mmap = unsafe { Mmap::map(&file) }?;
        let pdf = Self::new_from_mmap(mmap);
        if !pdf.is_valid() {
            return Err(PdfError::NotPdf);
        }
        Ok(pdf)
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Returns the raw PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn lexer(&self) -> Lexer<'_> {
        Lexer::with_options(self.data.window(), &self.options)
    }

    fn assembler(&self) -> Assembler<'_> {
        Assembler::new(self.lexer(), self.options)
    }

    /// True when the file is longer than 4 bytes and starts with `%PDF`.
    pub fn is_valid(&self) -> bool {
        let window = self.data.window();
        window.size() > 4 && window.read_u32(0, false) == Some(PDF_MAGIC)
    }

    /// Version token after the `%PDF-` signature, e.g. `1.7`.
    pub fn version(&self) -> String {
        let bytes = self.data.window().read_bytes(5, 3);
        let n = bytes
            .iter()
            .position(|&b| is_whitespace(b) || !b.is_ascii_graphic() || b == b'%')
            .unwrap_or(bytes.len());
        bytes[..n].iter().map(|&b| char::from(b)).collect()
    }

    /// Valid footers in file order.
    pub fn find_startxrefs(&self, ctx: &ScanContext<'_>) -> Vec<FooterRecord> {
        find_startxrefs(&self.lexer(), 0, ctx)
    }

    /// `startxref` target of the last valid footer.
    pub fn last_startxref(&self, ctx: &ScanContext<'_>) -> Option<u64> {
        self.find_startxrefs(ctx).last().map(|f| f.xref_offset)
    }

    /// In-use objects of the classic table behind `footer`.
    pub fn read_xref_table(&self, footer: &FooterRecord, ctx: &ScanContext<'_>) -> Vec<ObjectRecord> {
        read_xref_table(&self.lexer(), footer, ctx)
    }

    /// Fallback scan of `[start, end)`.
    pub fn scan_objects(&self, start: u64, end: u64, deep: bool, ctx: &ScanContext<'_>) -> Vec<ObjectRecord> {
        scan_objects(&self.lexer(), start, end, deep, ctx)
    }

    /// Parses the object at `offset` into tokens and streams.
    pub fn parse_object(
        &self,
        offset: u64,
        known_id: Option<u64>,
        part_limit: Option<usize>,
        ctx: &ScanContext<'_>,
    ) -> ParsedObject {
        ObjectParser::new(self.lexer())
            .with_endstream_fallback(self.options.endstream_fallback)
            .parse(offset, known_id, part_limit, ctx)
    }

    /// Keys and raw values of the last `trailer` dictionary.
    pub fn read_trailer(&self, ctx: &ScanContext<'_>) -> IndexMap<String, String> {
        read_trailer(&self.lexer(), ctx)
    }

    /// Objects that [`get_file_parts`](Self::get_file_parts) works from, in
    /// discovery order.
    pub fn find_objects(&self, ctx: &ScanContext<'_>) -> Vec<ObjectRecord> {
        self.assembler().discover(None, ctx).objects().copied().collect()
    }

    /// Parses every discovered object, up to `limit` objects.
    pub fn get_objects(&self, limit: Option<usize>, ctx: &ScanContext<'_>) -> Vec<ParsedObject> {
        let records = self.assembler().discover(limit, ctx);
        let mut objects = Vec::new();
        for record in records.objects() {
            if ctx.is_cancelled() {
                break;
            }
            objects.push(self.parse_object(record.offset, Some(record.id), None, ctx));
            ctx.step();
        }
        objects
    }

    /// Distinct first values of `key` across all objects.
    pub fn values_by_key(&self, key: &str, ctx: &ScanContext<'_>) -> Vec<TypedValue> {
        all_values_by_key(&self.get_objects(None, ctx), key)
    }

    /// File parts of the requested kinds in discovery order. `limit` caps
    /// the number of objects considered.
    pub fn get_file_parts(
        &self,
        kinds: PartMask,
        limit: Option<usize>,
        ctx: &ScanContext<'_>,
    ) -> Vec<FilePart> {
        self.assembler().file_parts(kinds, limit, ctx)
    }

    /// All parts sorted into layout order.
    pub fn memory_map(&self, ctx: &ScanContext<'_>) -> MemoryMap {
        MemoryMap::new(self.len(), self.get_file_parts(PartMask::ALL, None, ctx))
    }

    /// Decodes every stream; undecodable streams come back raw.
    pub fn unpack_streams(
        &self,
        decompressor: &dyn Decompressor,
        ctx: &ScanContext<'_>,
    ) -> Vec<UnpackedStream> {
        let parts = self.get_file_parts(FilePartKind::Stream.into(), None, ctx);
        unpack_streams(self.data.window(), &parts, decompressor, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_and_version() {
        let file = PdfFile::new(b"%PDF-1.7\n%%EOF\n");
        assert!(file.is_valid());
        assert_eq!(file.version(), "1.7");
        assert_eq!(PdfFile::new(b"%PDF-2.0 \n").version(), "2.0");
        assert!(!PdfFile::new(b"%PDF").is_valid());
        assert!(!PdfFile::new(b"GIF89a").is_valid());
    }

    #[test]
    fn test_checked_constructor() {
        assert!(matches!(PdfFile::new_checked(b"hello world"), Err(PdfError::NotPdf)));
        assert!(PdfFile::new_checked(b"%PDF-1.4\n").is_ok());
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = PdfFile::open("/nonexistent/definitely/missing.pdf").unwrap_err();
        assert!(matches!(err, PdfError::Io(_)));
    }
}
