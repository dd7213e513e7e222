//! Tax document field extraction module.

mod parser;
pub mod rules;
pub mod source;

pub use parser::{ExtractionResult, FieldExtractor, RuleSet};
pub use source::{FileTextSource, TextSource};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
