//! Byte sources for the [ByteParser](super::ByteParser).
//!
//! Alignment, tree and directive files are small enough to be read whole, so
//! the only implementation is the in-memory [TextSource]. It tracks the
//! current line so that readers can point users at the offending line.

use std::fs;
use std::path::Path;

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================#=
/// Cursor over the bytes of one input file.
pub trait ByteSource {
    /// The current byte, without consuming it; `None` at EOF.
    fn peek(&self) -> Option<u8>;

    /// Consumes and returns the current byte.
    fn next_byte(&mut self) -> Option<u8>;

    /// Up to `k` bytes from the current position, without consuming them.
    fn peek_slice(&self, k: usize) -> &[u8];

    /// Byte offset of the cursor.
    fn position(&self) -> usize;

    /// 1-based line of the cursor.
    fn line(&self) -> usize;

    fn is_eof(&self) -> bool {
        self.peek().is_none()
    }
}

// =#========================================================================#=
// TEXT SOURCE
// =#========================================================================#=
/// A whole input file held in memory.
#[derive(Debug, Clone)]
pub struct TextSource {
    bytes: Vec<u8>,
    pos: usize,
    line: usize,
}

impl TextSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            pos: 0,
            line: 1,
        }
    }

    /// Reads the file at `path`.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be opened or read
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(fs::read(path)?))
    }
}

impl ByteSource for TextSource {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    #[inline]
    fn peek_slice(&self, k: usize) -> &[u8] {
        let end = (self.pos + k).min(self.bytes.len());
        &self.bytes[self.pos..end]
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn line(&self) -> usize {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_follows_newlines() {
        let mut source = TextSource::new(b"ab\ncd\n".to_vec());
        assert_eq!(source.line(), 1);
        for _ in 0..3 {
            source.next_byte();
        }
        assert_eq!(source.line(), 2);
        assert_eq!(source.peek_slice(10), b"cd\n");
        while source.next_byte().is_some() {}
        assert!(source.is_eof());
        assert_eq!(source.line(), 3);
        assert_eq!(source.position(), 6);
    }
}
