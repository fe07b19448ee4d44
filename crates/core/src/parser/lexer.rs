//! PDF token lexer over a random-access window.
//!
//! Every read starts at an absolute offset and reports how many bytes it
//! consumed, so callers can backtrack freely. A read at or past end of file
//! yields an empty lexeme with zero consumed bytes.

use crate::params::ScanOptions;
use crate::source::{Window, is_whitespace};
use once_cell::sync::Lazy;
use regex::Regex;

static OBJECT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)[ \t\x0c\x00]+(\d+)[ \t\x0c\x00]+obj").expect("valid object header regex")
});

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+) +(\d+) +R$").expect("valid reference regex"));

/// One token (or line) read from the file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lexeme {
    /// Token text, without trailing whitespace or line ending.
    pub text: String,
    /// Bytes consumed from the read offset, including skipped whitespace.
    pub size: u64,
}

impl Lexeme {
    pub fn new(text: impl Into<String>, size: u64) -> Self {
        Self {
            text: text.into(),
            size,
        }
    }

    /// True when nothing could be read (end of input).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.size == 0
    }
}

/// Parsed `<id> <gen> obj` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub id: u64,
    pub generation: u64,
    /// Length of the header text up to and including `obj`.
    pub len: usize,
}

/// Matches `<id> <gen> obj` at the start of `text`.
pub fn object_header(text: &str) -> Option<ObjectHeader> {
    let caps = OBJECT_HEADER.captures(text)?;
    let whole = caps.get(0)?;
    if let Some(next) = text[whole.end()..].bytes().next()
        && next.is_ascii_alphanumeric()
    {
        return None;
    }
    Some(ObjectHeader {
        id: caps[1].parse().ok()?,
        generation: caps[2].parse().ok()?,
        len: whole.end(),
    })
}

/// Matches a collapsed indirect reference token `N G R`.
pub fn reference(text: &str) -> Option<(u64, u64)> {
    let caps = REFERENCE.captures(text.trim())?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Bytes to a string, one char per byte (Latin-1).
pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[inline]
fn is_name_end(b: u8) -> bool {
    is_whitespace(b)
        || matches!(
            b,
            b'/' | b'[' | b']' | b'<' | b'>' | b'(' | b')' | b'{' | b'}'
        )
}

#[inline]
fn is_bare_end(b: u8) -> bool {
    is_name_end(b)
}

/// Tokenizer bound to one file.
#[derive(Clone, Copy, Debug)]
pub struct Lexer<'a> {
    window: Window<'a>,
    max_line_len: usize,
    max_token_len: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(window: Window<'a>) -> Self {
        Self::with_options(window, &ScanOptions::default())
    }

    pub fn with_options(window: Window<'a>, options: &ScanOptions) -> Self {
        Self {
            window,
            max_line_len: options.max_line_len,
            max_token_len: options.max_token_len,
        }
    }

    pub fn window(&self) -> Window<'a> {
        self.window
    }

    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Copies bytes until NUL/CR/LF or `max_len`, then consumes one line ending.
    pub fn read_line(&self, offset: u64, max_len: usize) -> Lexeme {
        self.read_until(offset, max_len, |b| matches!(b, b'\0' | b'\r' | b'\n'))
    }

    /// Like [`read_line`](Self::read_line) but also stops at `<`, so
    /// `1 0 obj<<` yields `1 0 obj`.
    pub fn read_title_line(&self, offset: u64, max_len: usize) -> Lexeme {
        self.read_until(offset, max_len, |b| {
            matches!(b, b'\0' | b'\r' | b'\n' | b'<')
        })
    }

    fn read_until(&self, offset: u64, max_len: usize, stop: impl Fn(u8) -> bool) -> Lexeme {
        let bytes = self.window.read_bytes(offset, max_len as u64);
        let n = bytes.iter().position(|&b| stop(b)).unwrap_or(bytes.len());
        let end = offset + n as u64;
        let ending = self.window.line_ending_len(end);
        Lexeme::new(latin1(&bytes[..n]), n as u64 + ending)
    }

    /// Reads one value token: name, literal string, hex string, dictionary or
    /// array bracket, or bare value. Trailing spaces and one line ending are
    /// folded into the consumed size.
    pub fn read_value_part(&self, offset: u64) -> Lexeme {
        let start = self.window.skip_whitespace(offset);
        let Some(first) = self.window.read_u8(start) else {
            return Lexeme::default();
        };
        let second = self.window.read_u8(start + 1);

        let (text, body_end) = match (first, second) {
            (b'/', _) => self.lex_name(start),
            (b'(', _) => self.lex_literal_string(start),
            (b'<', Some(b'<')) => ("<<".to_string(), start + 2),
            (b'>', Some(b'>')) => (">>".to_string(), start + 2),
            (b'<', _) => self.lex_hex_string(start),
            (b'[', _) => ("[".to_string(), start + 1),
            (b']', _) => ("]".to_string(), start + 1),
            _ => self.lex_bare(start),
        };

        let end = self.window.skip_spaces(body_end);
        let end = end + self.window.line_ending_len(end);
        Lexeme::new(text, end - offset)
    }

    fn lex_name(&self, start: u64) -> (String, u64) {
        let body = self.window.read_bytes(start + 1, self.max_token_len as u64);
        let n = body.iter().position(|&b| is_name_end(b)).unwrap_or(body.len());
        let mut text = String::with_capacity(n + 1);
        text.push('/');
        text.push_str(&latin1(&body[..n]));
        (text, start + 1 + n as u64)
    }

    fn lex_hex_string(&self, start: u64) -> (String, u64) {
        let body = self.window.read_bytes(start, self.max_token_len as u64);
        let n = body
            .iter()
            .position(|&b| b == b'>')
            .map_or(body.len(), |gt| gt + 1);
        (latin1(&body[..n]), start + n as u64)
    }

    fn lex_bare(&self, start: u64) -> (String, u64) {
        let body = self.window.read_bytes(start, self.max_token_len as u64);
        let n = body.iter().position(|&b| is_bare_end(b)).unwrap_or(body.len());
        if n == 0 {
            // Stray delimiter such as `)` or `{`: consume it alone so callers advance.
            return (latin1(&body[..1]), start + 1);
        }

        let mut text = latin1(&body[..n]);
        let mut end = start + n as u64;
        if text.bytes().all(|b| b.is_ascii_digit())
            && self.window.read_u8(end) == Some(b' ')
            && let Some((tail, tail_end)) = self.reference_tail(end + 1)
        {
            text.push(' ');
            text.push_str(&tail);
            end = tail_end;
        }
        (text, end)
    }

    /// Matches `<gen> R` at `pos`, ending at a delimiter or end of file.
    fn reference_tail(&self, pos: u64) -> Option<(String, u64)> {
        let bytes = self.window.read_bytes(pos, 24);
        let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 || bytes.get(digits) != Some(&b' ') || bytes.get(digits + 1) != Some(&b'R') {
            return None;
        }
        let after = digits + 2;
        match self.window.read_u8(pos + after as u64) {
            Some(b) if !is_bare_end(b) => None,
            _ => Some((latin1(&bytes[..after]), pos + after as u64)),
        }
    }

    fn lex_literal_string(&self, start: u64) -> (String, u64) {
        let data = self.window.read_bytes(start + 1, self.max_token_len as u64);
        if data.starts_with(&[0xFE, 0xFF]) {
            let (content, used) = lex_utf16_body(&data[2..]);
            return (format!("({content})"), start + 3 + used as u64);
        }

        let mut out = Vec::with_capacity(data.len().min(256));
        let mut depth = 1usize;
        let mut i = 0;
        while i < data.len() {
            let b = data[i];
            i += 1;
            match b {
                b'\\' => {
                    let Some(&c) = data.get(i) else { break };
                    i += 1;
                    match c {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'\r' => {
                            if data.get(i) == Some(&b'\n') {
                                i += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = u32::from(c - b'0');
                            for _ in 0..2 {
                                match data.get(i) {
                                    Some(&d @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(d - b'0');
                                        i += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push(b);
                }
                _ => out.push(b),
            }
        }

        let content = if out.starts_with(&[0xFE, 0xFF]) {
            utf16be(&out[2..])
        } else {
            latin1(&out)
        };
        (format!("({content})"), start + 1 + i as u64)
    }
}

/// Decodes raw UTF-16BE code units after a BOM until an unescaped `)` low byte.
/// Returns the text and the bytes used (including `)`).
fn lex_utf16_body(data: &[u8]) -> (String, usize) {
    let mut units = Vec::new();
    let mut i = 0;
    loop {
        // A `)` in the high byte is part of the character (U+29xx).
        let Some((hi, _)) = next_utf16_byte(data, &mut i) else {
            break;
        };
        let Some((lo, lo_escaped)) = next_utf16_byte(data, &mut i) else {
            break;
        };
        if lo == b')' && !lo_escaped {
            break;
        }
        units.push(u16::from_be_bytes([hi, lo]));
    }
    (String::from_utf16_lossy(&units), i)
}

fn next_utf16_byte(data: &[u8], i: &mut usize) -> Option<(u8, bool)> {
    let b = *data.get(*i)?;
    if b == b'\\'
        && let Some(&c) = data.get(*i + 1)
    {
        *i += 2;
        let byte = match c {
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'b' => 0x08,
            b'f' => 0x0c,
            other => other,
        };
        return Some((byte, true));
    }
    *i += 1;
    Some((b, false))
}

fn utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
