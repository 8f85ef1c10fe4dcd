//! XML emission for generated documents.

pub mod writer;

pub use writer::{IdEvent, XmlWriter, format_real};
