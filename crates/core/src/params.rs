//! Tunable limits for the recovery engine.

/// Options controlling how the lexer and scanners read the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Longest line `read_line`/`read_title_line` will copy.
    pub max_line_len: usize,
    /// Longest token body `read_value_part` will copy.
    pub max_token_len: usize,
    /// Deep-scan revisions whose footer points at an xref stream.
    pub recover_appends: bool,
    /// When a declared stream length runs past end of file or does not land
    /// on `endstream`, bound the stream at the next `endstream` keyword.
    pub endstream_fallback: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_line_len: 1024,
            max_token_len: 65535,
            recover_appends: true,
            endstream_fallback: true,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len.max(1);
        self
    }

    pub fn with_max_token_len(mut self, len: usize) -> Self {
        self.max_token_len = len.max(1);
        self
    }

    pub fn with_recover_appends(mut self, enabled: bool) -> Self {
        self.recover_appends = enabled;
        self
    }

    pub fn with_endstream_fallback(mut self, enabled: bool) -> Self {
        self.endstream_fallback = enabled;
        self
    }
}
