//! File-part assembler.
//!
//! Combines the footer chain, xref tables, the fallback scanner and the
//! object parser into a flat list of typed byte ranges.

use super::scan::scan_objects;
use super::xref::{find_startxrefs, read_xref_table};
use crate::codec::CompressMethod;
use crate::context::ScanContext;
use crate::model::{
    FilePart, FilePartKind, FooterRecord, ObjectRecord, PartMask, PartProperties, TypedValue,
    first_value_by_key,
};
use crate::params::ScanOptions;
use crate::parser::{Lexer, ObjectParser};
use tracing::debug;

/// One revision: the objects it contributes and the footer closing it.
/// `footer` is `None` when the file was recovered by a plain scan.
#[derive(Debug, Clone)]
pub struct Section {
    pub footer: Option<FooterRecord>,
    pub objects: Vec<ObjectRecord>,
}

/// Everything the structural passes found in one file.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub sections: Vec<Section>,
    /// End of the last recognized structure.
    pub max_offset: u64,
}

impl Discovery {
    pub fn objects(&self) -> impl Iterator<Item = &ObjectRecord> + '_ {
        self.sections.iter().flat_map(|s| s.objects.iter())
    }
}

/// Builds file parts for one file.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    lexer: Lexer<'a>,
    options: ScanOptions,
}

impl<'a> Assembler<'a> {
    pub fn new(lexer: Lexer<'a>, options: ScanOptions) -> Self {
        Self { lexer, options }
    }

    fn object_parser(&self) -> ObjectParser<'a> {
        ObjectParser::new(self.lexer).with_endstream_fallback(self.options.endstream_fallback)
    }

    /// Locates objects through the footer chain, or by scanning when the
    /// file has no valid footer. `limit` caps the number of objects kept.
    pub fn discover(&self, limit: Option<usize>, ctx: &ScanContext<'_>) -> Discovery {
        let window = self.lexer.window();
        let footers = find_startxrefs(&self.lexer, 0, ctx);
        let mut remaining = limit.unwrap_or(usize::MAX);

        if footers.is_empty() {
            debug!("no valid footer, scanning for objects");
            let mut objects = scan_objects(&self.lexer, 0, window.size(), false, ctx);
            objects.truncate(remaining);
            let max_offset = objects.iter().map(ObjectRecord::end).max().unwrap_or(0);
            return Discovery {
                sections: vec![Section {
                    footer: None,
                    objects,
                }],
                max_offset,
            };
        }

        let mut sections = Vec::with_capacity(footers.len());
        let mut segment_start = 0;
        for footer in footers {
            if ctx.is_cancelled() {
                break;
            }
            let mut objects = if footer.is_xref {
                read_xref_table(&self.lexer, &footer, ctx)
            } else if self.options.recover_appends {
                // Only this revision's segment is scanned, starting at the end
                // of the previous footer. Scanning from 0 would report the
                // objects of earlier revisions again.
                debug!(
                    from = segment_start,
                    to = footer.footer_offset,
                    "deep scanning xref stream revision"
                );
                scan_objects(&self.lexer, segment_start, footer.footer_offset, true, ctx)
            } else {
                Vec::new()
            };
            objects.truncate(remaining);
            remaining -= objects.len();
            segment_start = footer.end();
            sections.push(Section {
                footer: Some(footer),
                objects,
            });
        }
        Discovery {
            sections,
            max_offset: segment_start,
        }
    }

    /// File parts of the requested kinds, in discovery order.
    pub fn file_parts(
        &self,
        kinds: PartMask,
        limit: Option<usize>,
        ctx: &ScanContext<'_>,
    ) -> Vec<FilePart> {
        let window = self.lexer.window();
        let file_size = window.size();
        let discovery = self.discover(limit, ctx);
        let mut parts = Vec::new();

        if kinds.contains(FilePartKind::Signature) && file_size > 0 {
            let line = self.lexer.read_line(0, self.options.max_line_len);
            let mut part = FilePart::new(FilePartKind::Signature, 0, line.size, "Signature");
            part.properties.info = Some(line.text);
            parts.push(part);
        }

        for section in &discovery.sections {
            if kinds.contains(FilePartKind::Object) {
                parts.extend(section.objects.iter().map(|obj| {
                    FilePart::new(
                        FilePartKind::Object,
                        obj.offset,
                        obj.size,
                        format!("Object {}", obj.id),
                    )
                }));
            }
            let Some(footer) = section.footer else {
                continue;
            };
            if footer.is_xref && kinds.contains(FilePartKind::Table) {
                parts.push(FilePart::new(
                    FilePartKind::Table,
                    footer.xref_offset,
                    footer.footer_offset - footer.xref_offset,
                    "XRef Table",
                ));
            }
            if kinds.contains(FilePartKind::Footer) {
                parts.push(FilePart::new(
                    FilePartKind::Footer,
                    footer.footer_offset,
                    footer.footer_size,
                    "Footer",
                ));
            }
        }

        if kinds.contains(FilePartKind::Stream) {
            for obj in discovery.objects() {
                if ctx.is_cancelled() {
                    break;
                }
                parts.extend(self.stream_parts(obj, ctx));
                ctx.step();
            }
        }

        if kinds.contains(FilePartKind::Data) && discovery.max_offset > 0 {
            parts.push(FilePart::new(
                FilePartKind::Data,
                0,
                discovery.max_offset,
                "Data",
            ));
        }
        if kinds.contains(FilePartKind::Overlay) && discovery.max_offset < file_size {
            parts.push(FilePart::new(
                FilePartKind::Overlay,
                discovery.max_offset,
                file_size - discovery.max_offset,
                "Overlay",
            ));
        }
        parts
    }

    fn stream_parts(&self, obj: &ObjectRecord, ctx: &ScanContext<'_>) -> Vec<FilePart> {
        let parsed = self.object_parser().parse(obj.offset, Some(obj.id), None, ctx);
        if parsed.streams.is_empty() {
            return Vec::new();
        }
        let properties = classify_stream(&parsed.tokens);
        let many = parsed.streams.len() > 1;
        parsed
            .streams
            .iter()
            .enumerate()
            .map(|(i, stream)| {
                let name = if many {
                    format!("Stream {}.{}", obj.id, i)
                } else {
                    format!("Stream {}", obj.id)
                };
                let mut part = FilePart::new(FilePartKind::Stream, stream.offset, stream.size, name);
                part.properties = properties.clone();
                part
            })
            .collect()
    }
}

/// First `/Filter` name of an object; `[ /A /B ]` yields `/A`.
pub fn filter_name(tokens: &[String]) -> Option<&str> {
    let pos = tokens.iter().position(|t| t == "/Filter")?;
    let value = tokens.get(pos + 1)?;
    let name = if value == "[" { tokens.get(pos + 2)? } else { value };
    name.starts_with('/').then_some(name.as_str())
}

/// Compression method and image metadata for a stream owned by an object
/// with the given tokens.
pub fn classify_stream(tokens: &[String]) -> PartProperties {
    let filter = filter_name(tokens);
    let method = filter.and_then(CompressMethod::from_filter);
    let mut properties = PartProperties {
        compress_method: Some(method.unwrap_or_default()),
        extension: Some("bin".to_string()),
        info: filter.map(|f| f.trim_start_matches('/').to_string()),
        ..Default::default()
    };

    let is_image = matches!(
        first_value_by_key(tokens, "/Subtype"),
        Some(TypedValue::Raw(ref subtype)) if subtype == "/Image"
    );
    if is_image && method.is_some() {
        let int = |key| first_value_by_key(tokens, key).and_then(|v| v.as_i64());
        properties.width = int("/Width");
        properties.height = int("/Height");
        properties.bits_per_component = int("/BitsPerComponent");
        properties.raw_image = true;
        let jpeg = matches!(filter, Some("/DCTDecode" | "/DCT"));
        properties.extension = Some(if jpeg { "jpg" } else { "png" }.to_string());
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_filter_name_from_array() {
        let t = tokens(&["<<", "/Filter", "[", "/ASCII85Decode", "/FlateDecode", "]", ">>"]);
        assert_eq!(filter_name(&t), Some("/ASCII85Decode"));
        assert_eq!(filter_name(&tokens(&["<<", ">>"])), None);
    }

    #[test]
    fn test_image_metadata() {
        let t = tokens(&[
            "<<", "/Filter", "/FlateDecode", "/Subtype", "/Image", "/Width", "10", "/Height", "20",
            "/BitsPerComponent", "8", ">>",
        ]);
        let p = classify_stream(&t);
        assert_eq!(p.compress_method, Some(CompressMethod::Zlib));
        assert_eq!((p.width, p.height, p.bits_per_component), (Some(10), Some(20), Some(8)));
        assert!(p.raw_image);
        assert_eq!(p.extension.as_deref(), Some("png"));
    }

    #[test]
    fn test_unknown_filter_is_store_without_image_data() {
        let t = tokens(&["<<", "/Filter", "/JBIG2Decode", "/Subtype", "/Image", "/Width", "4", ">>"]);
        let p = classify_stream(&t);
        assert_eq!(p.compress_method, Some(CompressMethod::Store));
        assert_eq!(p.width, None);
        assert!(!p.raw_image);
        assert_eq!(p.info.as_deref(), Some("JBIG2Decode"));
    }

    #[test]
    fn test_dct_image_is_jpeg() {
        let t = tokens(&["<<", "/Subtype", "/Image", "/Filter", "/DCTDecode", ">>"]);
        let p = classify_stream(&t);
        assert_eq!(p.compress_method, Some(CompressMethod::Store));
        assert_eq!(p.extension.as_deref(), Some("jpg"));
    }
}
