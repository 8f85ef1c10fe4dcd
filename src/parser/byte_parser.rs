//! Low-level byte-by-byte parser for ASCII text.
//!
//! This module provides [ByteParser] for text-based input files with support
//! for peeking, consuming, Nexus comment
//! skipping, quote-aware label parsing and line-wise reading. It is the
//! foundation of the alignment reader, the starting-tree reader and the
//! directive-file reader.

use crate::parser::byte_parser::ConsumeMode::Inclusive;
use crate::parser::byte_source::{ByteSource, TextSource};
use crate::parser::parsing_error::ParsingError;
use std::path::Path;

/// Whitespace bytes recognized by [ByteParser::skip_whitespace].
pub(crate) const WHITESPACE: &[u8] = b" \t\n\r";

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser for ASCII text with support for peeking, consuming, and pattern matching.
///
/// # Features
/// - Case-insensitive matching for ASCII characters
/// - Whitespace and Nexus comment (`[...]`) skipping
/// - Quote-aware label parsing (single quotes with escaping)
/// - Line-wise reading for line-oriented formats
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use beastgen::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("DIMENSIONS [taxa] ntax=4 nchar=10;");
/// assert_eq!(parser.parse_word(b";").unwrap(), "DIMENSIONS");
/// parser.skip_comment_and_whitespace().unwrap();
/// assert_eq!(parser.parse_word(b"=").unwrap(), "ntax");
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

// ============================================================================
// Building - TextSource specific (pub)
// ============================================================================
impl ByteParser<TextSource> {
    /// Creates a new `ByteParser` from a byte slice by copying it into a Vec.
    pub fn for_bytes(input: &[u8]) -> Self {
        Self::new(TextSource::new(input.to_vec()))
    }

    /// Creates a new `ByteParser` from a string by copying it into a Vec.
    pub fn for_str(input: &str) -> Self {
        Self::for_bytes(input.as_bytes())
    }

    /// Creates a new `ByteParser` reading the whole file at `path` into memory.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be opened or read
    pub fn for_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(TextSource::from_file(path)?))
    }
}

// ============================================================================
// Peeking and consuming (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Creates a new `ByteParser` from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Skips (consumes) all consecutive whitespace characters.
    ///
    /// Whitespace includes: space (' '), tab ('\t'), newline ('\n'), and carriage return ('\r').
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if WHITESPACE.contains(&b) {
                self.next_byte();
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a Nexus-style comment `[...]` if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    ///
    /// # Errors
    /// Returns an error if a comment starts with `[` but doesn't have a closing `]`.
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if self.consume_if(b'[') {
            if !self.consume_until(b']', Inclusive) {
                return Err(ParsingError::unclosed_comment(self));
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Skips (consumes) all consecutive whitespace and Nexus comments.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();

        while self.skip_comment()? {
            self.skip_whitespace();
        }

        Ok(())
    }

    /// Checks if the current byte matches the target byte (case-insensitive for ASCII).
    pub fn peek_is(&self, ch: u8) -> bool {
        matches!(self.peek(), Some(b) if b.eq_ignore_ascii_case(&ch))
    }

    /// Consumes the current byte if it matches the target byte (case-insensitive).
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Consumes bytes until the target byte is found.
    ///
    /// # Arguments
    /// * `target` - The byte to search for
    /// * `mode` - Whether to consume the target byte (`Inclusive`) or stop before it (`Exclusive`)
    ///
    /// # Returns
    /// `true` if the target was found, `false` if EOF was reached first
    pub fn consume_until(&mut self, target: u8, mode: ConsumeMode) -> bool {
        while let Some(b) = self.peek() {
            if b == target {
                if mode == ConsumeMode::Inclusive {
                    self.next_byte();
                }
                return true;
            }
            self.next_byte();
        }
        false
    }

    /// Consumes bytes until any of the target bytes is found.
    ///
    /// # Returns
    /// `Some(u8)` with the found byte, or `None` if EOF was reached first
    pub fn consume_until_any(&mut self, targets: &[u8], mode: ConsumeMode) -> Option<u8> {
        while let Some(b) = self.peek() {
            if targets.contains(&b) {
                if mode == ConsumeMode::Inclusive {
                    self.next_byte();
                }
                return Some(b);
            }
            self.next_byte();
        }
        None
    }

    /// Consumes a `;`-terminated command, skipping over Nexus comments inside it.
    ///
    /// # Errors
    /// Returns [ParsingError] with `UnexpectedEOF` if no `;` follows, or
    /// `UnclosedComment` if a comment inside the command is not closed.
    pub fn skip_command(&mut self) -> Result<(), ParsingError> {
        loop {
            match self.consume_until_any(b";[", ConsumeMode::Exclusive) {
                Some(b';') => {
                    self.next_byte();
                    return Ok(());
                }
                Some(_) => {
                    self.skip_comment()?;
                }
                None => return Err(ParsingError::unexpected_eof(self)),
            }
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Returns the 1-based line of the current position.
    pub fn line(&self) -> usize {
        self.source.line()
    }

    /// Returns up to `k` bytes from the current position for error context,
    /// cut at the first line break.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let context = self.source.peek_slice(k);
        let end = context
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(context.len());
        String::from_utf8_lossy(&context[..end]).into_owned()
    }
}

// ============================================================================
// Tokens, labels and lines (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Parses a label (quoted or unquoted) with the given delimiter set,
    /// skipping leading whitespace and comments.
    ///
    /// # Arguments
    /// * `delimiters` - Byte array of characters that end an unquoted label
    ///
    /// # Errors
    /// Returns an error if a comment before the label is unclosed
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            self.parse_unquoted_label(delimiters)
        }
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes within
    /// the label are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    ///
    /// # Errors
    /// Returns `UnexpectedEOF` if the quoted label is not closed
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        self.next_byte(); // consume opening '

        let mut label = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') if self.peek() == Some(b'\'') => {
                    label.push(b'\'');
                    self.next_byte();
                }
                Some(b'\'') => break,
                Some(b) => label.push(b),
                None => return Err(ParsingError::unexpected_eof(self)),
            }
        }

        Ok(String::from_utf8_lossy(&label).into_owned())
    }

    /// Parses an unquoted label until any of the given delimiters (or EOF) is encountered.
    ///
    /// # Errors
    /// Currently does not return errors, but returns `Result` for API consistency
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        let mut label = Vec::new();

        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            label.push(b);
            self.next_byte();
        }

        Ok(String::from_utf8_lossy(&label).into_owned())
    }

    /// Parses the next word, i.e. the bytes up to whitespace, a comment start
    /// or any of the `extra` delimiters, after skipping whitespace and comments.
    ///
    /// # Returns
    /// The word, which is empty if a delimiter or EOF directly follows
    pub fn parse_word(&mut self, extra: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        let mut word = Vec::new();
        while let Some(b) = self.peek() {
            if WHITESPACE.contains(&b) || b == b'[' || extra.contains(&b) {
                break;
            }
            word.push(b);
            self.next_byte();
        }

        Ok(String::from_utf8_lossy(&word).into_owned())
    }

    /// Reads the remainder of the current line and consumes its line break.
    ///
    /// Trailing `\r` of Windows line endings is stripped.
    ///
    /// # Returns
    /// `None` if already at EOF, otherwise the line content
    pub fn read_line(&mut self) -> Option<String> {
        if self.is_eof() {
            return None;
        }

        let mut line = Vec::new();
        while let Some(b) = self.next_byte() {
            if b == b'\n' {
                break;
            }
            line.push(b);
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Specifies whether to consume or leave the target when using `consume_until` methods.
///
/// # Examples
/// ```
/// use beastgen::parser::byte_parser::{ByteParser, ConsumeMode};
///
/// let mut parser = ByteParser::for_str("ntax=4;");
///
/// // Inclusive: consume up to and including '='
/// parser.consume_until(b'=', ConsumeMode::Inclusive);
/// assert_eq!(parser.peek(), Some(b'4'));
///
/// // Exclusive: consume up to but not including ';'
/// parser.consume_until(b';', ConsumeMode::Exclusive);
/// assert_eq!(parser.peek(), Some(b';'));
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConsumeMode {
    /// Consume the target byte/sequence along with everything before it.
    Inclusive,

    /// Stop before the target byte/sequence without consuming it.
    Exclusive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_command_with_comment() {
        let mut parser = ByteParser::for_str("begin data [; not the end] ; matrix");
        parser.skip_command().unwrap();
        parser.skip_whitespace();
        assert_eq!(parser.parse_word(b";").unwrap(), "matrix");
    }

    #[test]
    fn test_skip_command_eof() {
        let mut parser = ByteParser::for_str("begin data");
        assert!(parser.skip_command().is_err());
    }

    #[test]
    fn test_context_stops_at_line_break() {
        let mut parser = ByteParser::for_str("[x]\nntax=x;\nnchar=4;");
        parser.skip_comment_and_whitespace().unwrap();
        assert_eq!(parser.line(), 2);
        assert_eq!(parser.get_context_as_string(50), "ntax=x;");
    }

    #[test]
    fn test_read_line_strips_carriage_return() {
        let mut parser = ByteParser::for_str("first\r\nsecond");
        assert_eq!(parser.read_line().as_deref(), Some("first"));
        assert_eq!(parser.read_line().as_deref(), Some("second"));
        assert_eq!(parser.read_line(), None);
    }
}
