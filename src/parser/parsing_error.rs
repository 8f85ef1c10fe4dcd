//! Error types for reading alignment, tree and directive files.
//!
//! This module provides [ParsingError] and [ParsingErrorType] for representing
//! and reporting errors that occur while reading input files.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use std::error::Error;
use std::fmt;

/// Default length of context provided by error from parser
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================#=
/// Error types that can occur while reading input files.
#[derive(PartialEq, Debug, Clone)]
pub enum ParsingErrorType {
    IoError(String),
    UnexpectedEOF,
    UnclosedComment,
    MissingMatrix,
    InvalidDimensions(String),
    InvalidFormat(String),
    InvalidMatrix(String),
    CharCountMismatch { declared: usize, read: usize },
    TaxonCountMismatch { declared: usize, read: usize },
    MissingTree,
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================#=
/// Parsing error with contextual information (line, byte offset and the
/// text at the error).
#[derive(Debug)]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    line: usize,
    context: String,
}

impl ParsingError {
    /// Create a ParsingError from an error type and parser state
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &ByteParser<S>) -> Self {
        Self {
            kind,
            position: parser.position(),
            line: parser.line(),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Convenience constructor for UnexpectedEOF
    pub fn unexpected_eof<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    /// Convenience constructor for UnclosedComment
    pub fn unclosed_comment<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    /// Convenience constructor for MissingMatrix
    pub fn missing_matrix<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::MissingMatrix, parser)
    }

    /// Convenience constructor for InvalidDimensions
    pub fn invalid_dimensions<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidDimensions(msg), parser)
    }

    /// Convenience constructor for InvalidFormat
    pub fn invalid_format<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidFormat(msg), parser)
    }

    /// Convenience constructor for InvalidMatrix
    pub fn invalid_matrix<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidMatrix(msg), parser)
    }

    /// Create a ParsingError without parser context (for checks after parsing)
    pub fn without_context(kind: ParsingErrorType) -> Self {
        Self {
            kind,
            position: 0,
            line: 0,
            context: String::new(),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Get the byte offset where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the 1-based line where the error occurred (0 without context)
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ParsingErrorType::IoError(msg) => return write!(f, "IO error - {msg}"),
            ParsingErrorType::CharCountMismatch { declared, read } => {
                return write!(f, "Declared nchar={declared} but read {read} characters");
            }
            ParsingErrorType::TaxonCountMismatch { declared, read } => {
                return write!(f, "Declared ntax={declared} but read {read} matrix rows");
            }
            ParsingErrorType::MissingTree => {
                return write!(f, "Tree file holds no tree description");
            }
            ParsingErrorType::UnexpectedEOF => write!(f, "Unexpected end of file")?,
            ParsingErrorType::UnclosedComment => write!(f, "Unclosed comment")?,
            ParsingErrorType::MissingMatrix => write!(f, "No MATRIX command found")?,
            ParsingErrorType::InvalidDimensions(msg) => {
                write!(f, "Invalid DIMENSIONS command - {msg}")?
            }
            ParsingErrorType::InvalidFormat(msg) => write!(f, "Invalid FORMAT command - {msg}")?,
            ParsingErrorType::InvalidMatrix(msg) => write!(f, "Invalid MATRIX command - {msg}")?,
        }

        write!(f, " on line {} (byte {})", self.line, self.position)?;

        if !self.context.is_empty() {
            write!(f, "\n  Context: {}", self.context)?;
        }

        Ok(())
    }
}

impl Error for ParsingError {}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        Self::without_context(ParsingErrorType::IoError(err.to_string()))
    }
}
