pub mod cursor;
pub mod tlog;
pub mod tokenizer;
pub mod types;

pub use tlog::Tlog;
pub use types::{Category, Diagnostic, DiagnosticKind, Parseable, TimeScale, TlogError};
