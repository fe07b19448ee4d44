//! Typed values extracted from flat token lists.

use super::objects::ParsedObject;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use itertools::Itertools;
use std::fmt;

/// A token classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Int64(i64),
    DateTime(DateTime<FixedOffset>),
    /// Literal string contents without the surrounding parentheses.
    String(String),
    /// Hex string digits without the angle brackets.
    Hex(String),
    Raw(String),
}

impl TypedValue {
    /// Classifies a raw token.
    ///
    /// `0` is not an integer here; it falls through to `Raw("0")`.
    pub fn from_token(token: &str) -> Self {
        if let Ok(n) = token.parse::<i64>()
            && n != 0
        {
            return Self::Int64(n);
        }
        if token.starts_with("(D:")
            && token.ends_with(')')
            && token.len() >= 18
            && let Some(date) = parse_pdf_date(&token[3..token.len() - 1])
        {
            return Self::DateTime(date);
        }
        if token.len() >= 2 && token.starts_with('(') && token.ends_with(')') {
            return Self::String(token[1..token.len() - 1].to_string());
        }
        let bytes = token.as_bytes();
        if token.len() >= 2 && bytes[0] == b'<' && bytes[1] != b'<' && token.ends_with('>') {
            return Self::Hex(token[1..token.len() - 1].to_string());
        }
        Self::Raw(token.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Hex(s) | Self::Raw(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(n) => write!(f, "{n}"),
            Self::DateTime(d) => write!(f, "{}", d.to_rfc3339()),
            Self::String(s) | Self::Hex(s) | Self::Raw(s) => f.write_str(s),
        }
    }
}

/// Parses the body of a `D:` date (`yyyyMMddHHmmss` plus optional zone).
fn parse_pdf_date(body: &str) -> Option<DateTime<FixedOffset>> {
    let normalized: String = body
        .chars()
        .filter(|&c| c != '\'')
        .map(|c| if c == 'Z' { '+' } else { c })
        .collect();
    let stamp = normalized.get(..14)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()?;
    let offset = parse_zone(&normalized[14..])?;
    offset.from_local_datetime(&naive).single()
}

fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let (sign, digits) = match zone.as_bytes().first() {
        None => return FixedOffset::east_opt(0),
        Some(b'+') => (1, &zone[1..]),
        Some(b'-') => (-1, &zone[1..]),
        Some(_) => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits.get(..2).map_or(Some(0), |h| h.parse().ok())?;
    let minutes: i32 = digits.get(2..4).map_or(Some(0), |m| m.parse().ok())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn normalize_key(key: &str) -> String {
    if key.starts_with('/') {
        key.to_string()
    } else {
        format!("/{key}")
    }
}

/// Value following the first occurrence of `key` in `tokens`.
pub fn first_value_by_key(tokens: &[String], key: &str) -> Option<TypedValue> {
    let key = normalize_key(key);
    let pos = tokens.iter().position(|t| *t == key)?;
    tokens.get(pos + 1).map(|t| TypedValue::from_token(t))
}

/// First value of `key` from every object that has one, deduplicated by
/// string form in first-seen order.
pub fn all_values_by_key(objects: &[ParsedObject], key: &str) -> Vec<TypedValue> {
    objects
        .iter()
        .filter_map(|obj| first_value_by_key(&obj.tokens, key))
        .unique_by(|v| v.to_string())
        .collect()
}
