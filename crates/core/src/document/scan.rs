//! Fallback object scanner for files without a usable xref chain.
//!
//! Walks forward looking for `<id> <gen> obj … endobj` spans. Every step
//! either moves the cursor forward or ends the scan.

use crate::context::ScanContext;
use crate::model::ObjectRecord;
use crate::parser::lexer::{Lexer, object_header};
use tracing::{debug, trace};

const ENDOBJ: &[u8] = b"endobj";
const OBJ_MARKER: &[u8] = b" obj";

/// Scans `[start, end)` for indirect objects.
///
/// With `deep` set, unrecognized bytes trigger a search for the next ` obj`
/// marker and a walk back over the header digits; otherwise they end the scan.
pub fn scan_objects(
    lexer: &Lexer<'_>,
    start: u64,
    end: u64,
    deep: bool,
    ctx: &ScanContext<'_>,
) -> Vec<ObjectRecord> {
    let window = lexer.window();
    let end = end.min(window.size());
    let mut objects = Vec::new();
    let mut cur = start;

    while !ctx.is_cancelled() {
        cur = window.skip_whitespace(cur);
        if cur >= end {
            break;
        }
        let title = lexer.read_title_line(cur, lexer.max_line_len());

        if let Some(header) = object_header(&title.text) {
            let body = cur + header.len as u64;
            let Some(found) = window.find(ENDOBJ, body, end) else {
                debug!(offset = cur, id = header.id, "object without endobj, stopping scan");
                break;
            };
            if lexer.read_value_part(found).text != "endobj" {
                debug!(offset = found, id = header.id, "malformed endobj, stopping scan");
                break;
            }
            let obj_end = found + ENDOBJ.len() as u64;
            trace!(offset = cur, id = header.id, size = obj_end - cur, "scanned object");
            objects.push(ObjectRecord {
                id: header.id,
                offset: cur,
                size: obj_end - cur,
            });
            ctx.step();
            cur = obj_end;
        } else if title.text.starts_with('%') {
            let line = lexer.read_line(cur, usize::MAX);
            cur += line.size.max(1);
        } else if deep {
            match recover_header(lexer, cur, end) {
                Some(next) => {
                    trace!(from = cur, to = next, "deep scan recovered header");
                    cur = next;
                }
                None => break,
            }
        } else {
            debug!(offset = cur, "unrecognized data, stopping scan");
            break;
        }
    }
    objects
}

/// Finds the next ` obj` after `cur` and walks back over the digits and
/// spaces that precede it. Only a position past `cur` counts as recovered.
fn recover_header(lexer: &Lexer<'_>, cur: u64, end: u64) -> Option<u64> {
    let window = lexer.window();
    let marker = window.find(OBJ_MARKER, cur, end)?;
    let mut begin = marker;
    while begin > cur
        && let Some(b) = window.read_u8(begin - 1)
        && (b.is_ascii_digit() || b == b' ')
    {
        begin -= 1;
    }
    while window.read_u8(begin) == Some(b' ') && begin < marker {
        begin += 1;
    }
    (begin > cur).then_some(begin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Window;

    fn scan(data: &[u8], deep: bool) -> Vec<ObjectRecord> {
        let lexer = Lexer::new(Window::new(data));
        scan_objects(&lexer, 0, data.len() as u64, deep, &ScanContext::new())
    }

    #[test]
    fn test_skips_comments() {
        let data = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<< >>\nendobj\n2 0 obj<</A 1>>endobj\n";
        let objects = scan(data, false);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].offset, 15);
        assert_eq!(objects[0].id, 1);
        assert_eq!(objects[1].id, 2);
        assert_eq!(&data[objects[1].offset as usize..objects[1].end() as usize], b"2 0 obj<</A 1>>endobj");
    }

    #[test]
    fn test_garbage_stops_shallow_scan() {
        let data = b"garbage 1 0 obj\n<< >>\nendobj\n";
        assert!(scan(data, false).is_empty());
    }

    #[test]
    fn test_deep_scan_walks_back_to_header() {
        let data = b"garbage 12 0 obj\n<< >>\nendobj\n";
        let objects = scan(data, true);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].id, 12);
        assert_eq!(objects[0].offset, 8);
    }

    #[test]
    fn test_missing_endobj_stops() {
        let data = b"1 0 obj\n<< >>\nendobj\n2 0 obj\n<< >>\n";
        assert_eq!(scan(data, true).len(), 1);
    }

    #[test]
    fn test_cancelled_scan_returns_partial() {
        let data = b"1 0 obj\n<< >>\nendobj\n";
        let lexer = Lexer::new(Window::new(data));
        let token = crate::context::CancelToken::new();
        token.cancel();
        let ctx = ScanContext::new().with_cancel(token);
        assert!(scan_objects(&lexer, 0, data.len() as u64, false, &ctx).is_empty());
    }
}
