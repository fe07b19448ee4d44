//! Tokenizing and object parsing.
//!
//! - `lexer`: single-token reads at absolute offsets
//! - `object`: flat token lists and stream spans for one indirect object

pub mod lexer;
pub mod object;

// Re-export main types for convenience
pub use lexer::{Lexeme, Lexer, ObjectHeader, object_header, reference};
pub use object::ObjectParser;
