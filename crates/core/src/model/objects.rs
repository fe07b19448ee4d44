//! Records produced by the recovery passes.
//!
//! Everything here is computed fresh per query and never mutated afterwards.

/// One validated `startxref` … `%%EOF` footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterRecord {
    /// Target of `startxref`: an `xref` table or an xref-stream object.
    pub xref_offset: u64,
    /// Offset of the `startxref` keyword.
    pub footer_offset: u64,
    /// Bytes from `startxref` through `%%EOF` and its trailing CR/LF.
    pub footer_size: u64,
    /// Target is a classic `xref` table.
    pub is_xref: bool,
    /// Target is an `<id> <gen> obj` header (cross-reference stream).
    pub is_object: bool,
}

impl FooterRecord {
    pub const fn end(&self) -> u64 {
        self.footer_offset + self.footer_size
    }
}

/// A byte span believed to hold one `N G obj … endobj` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRecord {
    pub id: u64,
    pub offset: u64,
    pub size: u64,
}

impl ObjectRecord {
    pub const fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Resolved stream payload span (excludes the trailing line ending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRecord {
    pub offset: u64,
    pub size: u64,
}

/// One object's flattened token list plus the streams found in it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedObject {
    pub id: u64,
    pub offset: u64,
    /// Bytes consumed from `offset` until parsing stopped.
    pub size: u64,
    /// Dictionary/array body tokens in file order. `stream`, `endstream`
    /// and `endobj` keywords are not included.
    pub tokens: Vec<String>,
    pub streams: Vec<StreamRecord>,
}

impl ParsedObject {
    /// Raw token following the first occurrence of `key`.
    pub fn raw_value(&self, key: &str) -> Option<&str> {
        let pos = self.tokens.iter().position(|t| t == key)?;
        self.tokens.get(pos + 1).map(String::as_str)
    }
}
