//! Typed byte ranges describing the layout of a PDF file.

use crate::codec::CompressMethod;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Region kinds reported by the file-part assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilePartKind {
    Signature,
    Object,
    Table,
    Footer,
    Stream,
    Data,
    Overlay,
}

impl FilePartKind {
    pub const ALL: [Self; 7] = [
        Self::Signature,
        Self::Object,
        Self::Table,
        Self::Footer,
        Self::Stream,
        Self::Data,
        Self::Overlay,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Object => "object",
            Self::Table => "table",
            Self::Footer => "footer",
            Self::Stream => "stream",
            Self::Data => "data",
            Self::Overlay => "overlay",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for FilePartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Set of requested part kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartMask(u32);

impl PartMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0x7F);

    pub const fn contains(self, kind: FilePartKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<FilePartKind> for PartMask {
    fn from(kind: FilePartKind) -> Self {
        Self(kind.bit())
    }
}

impl FromIterator<FilePartKind> for PartMask {
    fn from_iter<I: IntoIterator<Item = FilePartKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, |mask, kind| mask | kind)
    }
}

impl BitOr for PartMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<FilePartKind> for PartMask {
    type Output = Self;
    fn bitor(self, rhs: FilePartKind) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for FilePartKind {
    type Output = PartMask;
    fn bitor(self, rhs: Self) -> PartMask {
        PartMask(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<FilePartKind> for PartMask {
    fn bitor_assign(&mut self, rhs: FilePartKind) {
        self.0 |= rhs.bit();
    }
}

/// Optional attributes attached to a part.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartProperties {
    pub compress_method: Option<CompressMethod>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub bits_per_component: Option<i64>,
    /// Payload is raw image samples (metadata only; nothing is re-encoded).
    pub raw_image: bool,
    /// Suggested extension for extracted output.
    pub extension: Option<String>,
    /// Free-text note, e.g. the declared filter name.
    pub info: Option<String>,
}

/// A named, typed byte range of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub kind: FilePartKind,
    pub offset: u64,
    pub size: u64,
    pub name: String,
    pub properties: PartProperties,
}

impl FilePart {
    pub fn new(kind: FilePartKind, offset: u64, size: u64, name: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            size,
            name: name.into(),
            properties: PartProperties::default(),
        }
    }

    pub const fn end(&self) -> u64 {
        self.offset + self.size
    }

    /// Compression method, `Store` when unclassified.
    pub fn compress_method(&self) -> CompressMethod {
        self.properties.compress_method.unwrap_or_default()
    }
}

/// File parts sorted into layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    pub file_size: u64,
    pub parts: Vec<FilePart>,
}

impl MemoryMap {
    /// Sorts by offset; enclosing (larger) parts come before the parts they contain.
    pub fn new(file_size: u64, mut parts: Vec<FilePart>) -> Self {
        parts.sort_by(|a, b| a.offset.cmp(&b.offset).then(b.size.cmp(&a.size)));
        Self { file_size, parts }
    }

    /// Parts of one kind, in layout order.
    pub fn of_kind(&self, kind: FilePartKind) -> impl Iterator<Item = &FilePart> + '_ {
        self.parts.iter().filter(move |p| p.kind == kind)
    }

    /// Innermost part covering `offset`.
    pub fn part_at(&self, offset: u64) -> Option<&FilePart> {
        self.parts
            .iter()
            .filter(|p| p.offset <= offset && offset < p.end())
            .min_by_key(|p| p.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_membership() {
        let mask = FilePartKind::Object | FilePartKind::Stream;
        assert!(mask.contains(FilePartKind::Object));
        assert!(mask.contains(FilePartKind::Stream));
        assert!(!mask.contains(FilePartKind::Overlay));
        assert!(PartMask::ALL.contains(FilePartKind::Overlay));
        assert!(PartMask::NONE.is_empty());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in FilePartKind::ALL {
            assert_eq!(FilePartKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(FilePartKind::from_name(" Stream "), Some(FilePartKind::Stream));
        assert_eq!(FilePartKind::from_name("trailer"), None);
    }

    #[test]
    fn test_memory_map_orders_and_finds_innermost() {
        let parts = vec![
            FilePart::new(FilePartKind::Object, 10, 20, "Object 1"),
            FilePart::new(FilePartKind::Data, 0, 100, "Data"),
            FilePart::new(FilePartKind::Stream, 15, 5, "Stream"),
        ];
        let map = MemoryMap::new(120, parts);
        assert_eq!(map.parts[0].kind, FilePartKind::Data);
        assert_eq!(map.part_at(16).map(|p| p.kind), Some(FilePartKind::Stream));
        assert_eq!(map.part_at(12).map(|p| p.kind), Some(FilePartKind::Object));
        assert!(map.part_at(110).is_none());
        assert_eq!(map.of_kind(FilePartKind::Object).count(), 1);
    }
}
