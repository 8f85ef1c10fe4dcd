//! Basic low-level byte parser functionality.
//!
//! Shared by the alignment reader ([crate::alignment]) and the directive-file
//! reader ([crate::config]).

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
