//! Footer chain discovery and classic xref table reading.
//!
//! A footer is the `startxref <offset> %%EOF` block closing one revision.
//! Incrementally updated files carry one footer per revision; the chain is
//! walked forward from the start of the file so records come out in append
//! order.

use crate::context::ScanContext;
use crate::model::{FooterRecord, ObjectRecord};
use crate::parser::lexer::{Lexer, object_header};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::{debug, trace};

const STARTXREF: &[u8] = b"startxref";
const EOF_MARKER: &str = "%%EOF";

/// Outcome of validating one `startxref` candidate.
enum Candidate {
    /// Not a real footer; resume scanning after the keyword.
    Rejected(&'static str),
    /// Valid footer. `last` is set when no revision can follow it.
    Footer { record: FooterRecord, last: bool },
}

/// Finds every valid footer at or after `start`, in file order.
pub fn find_startxrefs(lexer: &Lexer<'_>, start: u64, ctx: &ScanContext<'_>) -> Vec<FooterRecord> {
    let window = lexer.window();
    let mut footers = Vec::new();
    let mut pos = start;

    while !ctx.is_cancelled() {
        let Some(found) = window.find(STARTXREF, pos, window.size()) else {
            break;
        };
        match check_footer(lexer, found) {
            Candidate::Rejected(reason) => {
                trace!(offset = found, reason, "rejected startxref candidate");
                pos = found + STARTXREF.len() as u64;
            }
            Candidate::Footer { record, last } => {
                debug!(
                    offset = record.footer_offset,
                    xref = record.xref_offset,
                    is_xref = record.is_xref,
                    "found footer"
                );
                footers.push(record);
                ctx.step();
                if last {
                    break;
                }
                pos = found + STARTXREF.len() as u64 + 1;
            }
        }
    }
    footers
}

fn check_footer(lexer: &Lexer<'_>, found: u64) -> Candidate {
    let window = lexer.window();
    let mut cur = found + STARTXREF.len() as u64;

    let target_token = lexer.read_value_part(cur);
    cur += target_token.size;
    let Ok(xref_offset) = target_token.text.parse::<u64>() else {
        return Candidate::Rejected("target is not an offset");
    };

    let target_line = lexer.read_title_line(xref_offset, lexer.max_line_len());
    let target_text = target_line.text.trim_start();
    let is_xref = target_text.starts_with("xref");
    let is_object = !is_xref && object_header(target_text).is_some();
    if !is_xref && !is_object {
        return Candidate::Rejected("target is neither xref nor object");
    }
    if xref_offset >= found {
        return Candidate::Rejected("target does not precede footer");
    }

    let eof_token = lexer.read_value_part(cur);
    let prefix: String = eof_token.text.chars().chain(std::iter::repeat(' ')).take(5).collect();
    if prefix != EOF_MARKER {
        return Candidate::Rejected("missing %%EOF");
    }
    cur += eof_token.size;
    while let Some(b'\r' | b'\n') = window.read_u8(cur) {
        cur += 1;
    }

    let record = FooterRecord {
        xref_offset,
        footer_offset: found,
        footer_size: cur - found,
        is_xref,
        is_object,
    };
    if eof_token.text.len() != EOF_MARKER.len() {
        return Candidate::Footer { record, last: true };
    }

    let next = lexer.read_title_line(window.skip_whitespace(cur), lexer.max_line_len());
    let next_text = next.text.trim();
    let continues = object_header(next_text).is_some()
        || next_text.starts_with('%')
        || next_text.starts_with("xref");
    Candidate::Footer {
        record,
        last: !continues,
    }
}

/// Reads the classic `xref` table a footer points at.
///
/// Returns in-use objects ordered by offset. Sizes run to the next object,
/// and the last object runs to the table itself.
pub fn read_xref_table(
    lexer: &Lexer<'_>,
    footer: &FooterRecord,
    ctx: &ScanContext<'_>,
) -> Vec<ObjectRecord> {
    if !footer.is_xref {
        return Vec::new();
    }
    let window = lexer.window();
    let file_size = window.size();

    let keyword = lexer.read_value_part(footer.xref_offset);
    if keyword.text != "xref" {
        debug!(offset = footer.xref_offset, "xref keyword missing");
        return Vec::new();
    }
    let mut cur = footer.xref_offset + keyword.size;
    let mut by_offset: BTreeMap<u64, u64> = BTreeMap::new();

    'sections: while !ctx.is_cancelled() {
        cur = window.skip_whitespace(cur);
        let header = lexer.read_line(cur, lexer.max_line_len());
        let Some((first_id, count)) = parse_pair(&header.text) else {
            break;
        };
        if count == 0 {
            break;
        }
        trace!(offset = cur, first_id, count, "xref subsection");
        cur += header.size;

        for index in 0..count {
            if ctx.is_cancelled() {
                break 'sections;
            }
            cur = window.skip_whitespace(cur);
            let entry = lexer.read_line(cur, lexer.max_line_len());
            let Some((offset, in_use)) = parse_entry(&entry.text) else {
                debug!(offset = cur, "malformed xref entry");
                break 'sections;
            };
            cur += entry.size;
            ctx.step();
            let Some(id) = first_id.checked_add(index) else {
                debug!(offset = cur, first_id, "xref subsection id overflow");
                break 'sections;
            };
            if in_use && offset > 0 && offset < file_size {
                by_offset.insert(offset, id);
            }
        }
    }

    let offsets: Vec<(u64, u64)> = by_offset.into_iter().collect();
    offsets
        .iter()
        .enumerate()
        .map(|(i, &(offset, id))| {
            let end = offsets
                .get(i + 1)
                .map_or(footer.xref_offset, |&(next, _)| next);
            let size = end.saturating_sub(offset).min(file_size - offset);
            ObjectRecord { id, offset, size }
        })
        .collect()
}

fn parse_pair(text: &str) -> Option<(u64, u64)> {
    let mut parts = text.split_whitespace();
    let first = parts.next()?.parse().ok()?;
    let count = parts.next()?.parse().ok()?;
    Some((first, count))
}

/// `<offset> <gen> <n|f>` → (offset, in use).
fn parse_entry(text: &str) -> Option<(u64, bool)> {
    let mut parts = text.split_whitespace();
    let offset = parts.next()?.parse().ok()?;
    let _generation: u64 = parts.next()?.parse().ok()?;
    match parts.next()? {
        "n" => Some((offset, true)),
        "f" => Some((offset, false)),
        _ => None,
    }
}

/// Keys and raw values of the last `trailer << … >>` dictionary.
///
/// Keys are returned without the leading `/`. Nested dictionaries and arrays
/// are kept as their space-joined tokens.
pub fn read_trailer(lexer: &Lexer<'_>, ctx: &ScanContext<'_>) -> IndexMap<String, String> {
    let window = lexer.window();
    let mut entries = IndexMap::new();
    let Some(found) = window.rfind(b"trailer", 0, window.size()) else {
        return entries;
    };
    let mut cur = found + "trailer".len() as u64;
    let open = lexer.read_value_part(cur);
    if open.text != "<<" {
        return entries;
    }
    cur += open.size;

    let mut pending_key: Option<String> = None;
    let mut value: Vec<String> = Vec::new();
    let mut depth = 1usize;
    while !ctx.is_cancelled() {
        let token = lexer.read_value_part(cur);
        if token.is_empty() {
            break;
        }
        cur += token.size;
        match token.text.as_str() {
            "<<" | "[" => depth += 1,
            ">>" | "]" => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            break;
        }
        if pending_key.is_none() {
            if let Some(key) = token.text.strip_prefix('/')
                && depth == 1
            {
                pending_key = Some(key.to_string());
            }
            continue;
        }
        value.push(token.text);
        // A value is complete once its nesting has closed again.
        if depth == 1
            && let Some(key) = pending_key.take()
        {
            entries.insert(key, value.join(" "));
            value.clear();
        }
    }
    entries
}
