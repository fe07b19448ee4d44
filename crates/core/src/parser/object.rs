//! Object body parser.
//!
//! Flattens one `N G obj … endobj` body into raw tokens and resolves the
//! byte spans of its streams from `/Length`. No value tree is built.

use super::lexer::{Lexer, object_header, reference};
use crate::context::ScanContext;
use crate::model::{ParsedObject, StreamRecord};
use tracing::{debug, trace};

const ENDSTREAM: &[u8] = b"endstream";

/// Parses objects at arbitrary offsets of one file.
#[derive(Debug, Clone, Copy)]
pub struct ObjectParser<'a> {
    lexer: Lexer<'a>,
    endstream_fallback: bool,
}

impl<'a> ObjectParser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            endstream_fallback: true,
        }
    }

    /// When a declared length overruns the file or does not land on
    /// `endstream`, bound the stream at the next `endstream` keyword.
    pub fn with_endstream_fallback(mut self, enabled: bool) -> Self {
        self.endstream_fallback = enabled;
        self
    }

    /// Parses the object starting at `offset`.
    ///
    /// `known_id` overrides the id read from the header. `part_limit` caps
    /// the number of collected tokens. Parsing stops at `endobj`, at end of
    /// input, or when a stream length cannot be resolved; tokens gathered up
    /// to that point are kept.
    pub fn parse(
        &self,
        offset: u64,
        known_id: Option<u64>,
        part_limit: Option<usize>,
        ctx: &ScanContext<'_>,
    ) -> ParsedObject {
        let window = self.lexer.window();
        let start = window.skip_whitespace(offset);
        let title = self.lexer.read_title_line(start, self.lexer.max_line_len());
        let Some(header) = object_header(&title.text) else {
            trace!(offset, "no object header");
            return ParsedObject {
                id: known_id.unwrap_or_default(),
                offset,
                ..Default::default()
            };
        };

        let mut object = ParsedObject {
            id: known_id.unwrap_or(header.id),
            offset,
            ..Default::default()
        };
        let mut cur = start + header.len as u64;
        let mut dict_depth = 0i64;
        let mut array_depth = 0i64;
        let mut length_armed = false;
        let mut pending_length: Option<String> = None;

        while !ctx.is_cancelled() {
            if part_limit.is_some_and(|limit| object.tokens.len() >= limit) {
                break;
            }
            let token = self.lexer.read_value_part(cur);
            if token.is_empty() {
                break;
            }
            cur += token.size;

            match token.text.as_str() {
                "endobj" => break,
                "endstream" => continue,
                "stream" => {
                    let Some(length) = pending_length.take().and_then(|raw| self.resolve_length(&raw))
                    else {
                        debug!(offset = cur, id = object.id, "unresolved stream length, aborting object");
                        break;
                    };
                    let (stream, next) = self.stream_span(cur, length);
                    trace!(offset = stream.offset, size = stream.size, id = object.id, "stream");
                    object.streams.push(stream);
                    cur = next;
                    continue;
                }
                _ => {}
            }

            if length_armed {
                pending_length = Some(token.text.clone());
                length_armed = false;
            }
            match token.text.as_str() {
                "<<" => dict_depth += 1,
                ">>" => {
                    dict_depth -= 1;
                    if dict_depth == 0 && array_depth == 0 {
                        trace!(offset = cur, id = object.id, "dictionary closed");
                    }
                }
                "[" => array_depth += 1,
                "]" => array_depth -= 1,
                "/Length" => length_armed = true,
                _ => {}
            }
            object.tokens.push(token.text);
        }

        object.size = cur - offset;
        object
    }

    /// Resolves a raw `/Length` value to a positive byte count.
    ///
    /// Direct integers are used as-is; `N G R` references are looked up by
    /// locating `N G obj` in the file and reading the value that follows.
    pub fn resolve_length(&self, raw: &str) -> Option<u64> {
        if let Ok(n) = raw.parse::<i64>() {
            return u64::try_from(n).ok().filter(|&n| n > 0);
        }
        let (id, generation) = reference(raw)?;
        let pattern = format!("{id} {generation} obj");
        let at = self.find_object(pattern.as_bytes())?;
        let value = self.lexer.read_value_part(at + pattern.len() as u64);
        let n = value.text.parse::<i64>().ok()?;
        u64::try_from(n).ok().filter(|&n| n > 0)
    }

    /// First occurrence of `pattern` not preceded by a digit.
    fn find_object(&self, pattern: &[u8]) -> Option<u64> {
        let window = self.lexer.window();
        let mut from = 0;
        while let Some(pos) = window.find(pattern, from, window.size()) {
            let preceded_by_digit = pos > 0
                && window
                    .read_u8(pos - 1)
                    .is_some_and(|b| b.is_ascii_digit());
            if !preceded_by_digit {
                return Some(pos);
            }
            from = pos + 1;
        }
        None
    }

    /// Stream payload span starting at `body` and the offset to resume
    /// tokenizing from.
    fn stream_span(&self, body: u64, length: u64) -> (StreamRecord, u64) {
        let window = self.lexer.window();
        let file_size = window.size();
        let declared_end = body.saturating_add(length);

        if declared_end <= file_size {
            let after = window.skip_whitespace(declared_end);
            let lands_on_endstream = window.read_bytes(after, ENDSTREAM.len() as u64) == ENDSTREAM
                || after >= file_size;
            if lands_on_endstream || !self.endstream_fallback {
                let next = declared_end + window.line_ending_len(declared_end);
                return (StreamRecord { offset: body, size: length }, next);
            }
        }

        if self.endstream_fallback
            && let Some(keyword) = window.find(ENDSTREAM, body, file_size)
        {
            let end = trim_line_ending(window, body, keyword);
            debug!(
                offset = body,
                declared = length,
                actual = end - body,
                "stream length mismatch, bounded at endstream"
            );
            return (StreamRecord { offset: body, size: end - body }, keyword);
        }

        let end = declared_end.min(file_size);
        (StreamRecord { offset: body, size: end - body }, end)
    }
}

/// Backs `end` off one line ending, never past `floor`.
fn trim_line_ending(window: crate::source::Window<'_>, floor: u64, end: u64) -> u64 {
    let mut end = end;
    if end > floor && window.read_u8(end - 1) == Some(b'\n') {
        end -= 1;
    }
    if end > floor && window.read_u8(end - 1) == Some(b'\r') {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Window;

    fn parse(data: &[u8], offset: u64) -> ParsedObject {
        ObjectParser::new(Lexer::new(Window::new(data))).parse(offset, None, None, &ScanContext::new())
    }

    #[test]
    fn test_dictionary_tokens() {
        let obj = parse(b"3 0 obj\n<< /Type /Page /Parent 2 0 R /Kids [4 0 R] >>\nendobj\n", 0);
        assert_eq!(obj.id, 3);
        assert_eq!(
            obj.tokens,
            ["<<", "/Type", "/Page", "/Parent", "2 0 R", "/Kids", "[", "4 0 R", "]", ">>"]
        );
        assert!(obj.streams.is_empty());
    }

    #[test]
    fn test_direct_length_stream() {
        let data = b"1 0 obj\n<< /Length 5 >>\nstream\nhello\nendstream\nendobj\n";
        let obj = parse(data, 0);
        assert_eq!(obj.streams.len(), 1);
        let s = obj.streams[0];
        assert_eq!(&data[s.offset as usize..(s.offset + s.size) as usize], b"hello");
        assert_eq!(obj.size, data.len() as u64);
    }

    #[test]
    fn test_indirect_length_ignores_longer_ids() {
        let data = b"1 0 obj\n<< /Length 5 0 R >>\nstream\nabc\nendstream\nendobj\n15 0 obj\n99\nendobj\n5 0 obj\n3\nendobj\n";
        let obj = parse(data, 0);
        assert_eq!(obj.streams.len(), 1);
        assert_eq!(obj.streams[0].size, 3);
    }

    #[test]
    fn test_unresolved_length_aborts() {
        let data = b"1 0 obj\n<< /Length 9 0 R /Filter /FlateDecode >>\nstream\nabc\nendstream\nendobj\n";
        let obj = parse(data, 0);
        assert!(obj.streams.is_empty());
        assert_eq!(obj.tokens.last().map(String::as_str), Some(">>"));
    }

    #[test]
    fn test_wrong_length_falls_back_to_endstream() {
        let data = b"1 0 obj\n<< /Length 2 >>\nstream\nhello\r\nendstream\nendobj\n";
        let obj = parse(data, 0);
        assert_eq!(obj.streams[0].size, 5);

        let strict = ObjectParser::new(Lexer::new(Window::new(data))).with_endstream_fallback(false);
        let obj = strict.parse(0, None, None, &ScanContext::new());
        assert_eq!(obj.streams[0].size, 2);
    }

    #[test]
    fn test_part_limit() {
        let data = b"1 0 obj\n<< /A 1 /B 2 /C 3 >>\nendobj\n";
        let obj = ObjectParser::new(Lexer::new(Window::new(data))).parse(0, Some(7), Some(3), &ScanContext::new());
        assert_eq!(obj.id, 7);
        assert_eq!(obj.tokens, ["<<", "/A", "1"]);
    }

    #[test]
    fn test_missing_header_is_empty() {
        let obj = parse(b"xref\n0 1\n", 0);
        assert!(obj.tokens.is_empty());
        assert_eq!(obj.size, 0);
    }
}
