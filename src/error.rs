use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a documentation build
#[derive(Debug, Error)]
pub enum Error {
    /// An `@input` / `@output` line does not match the directive grammar.
    /// `line` and `column` are 1-based and relative to the doc comment.
    #[error("malformed directive at {line}:{column} `{directive}`: {reason}")]
    MalformedDirective {
        line: usize,
        column: usize,
        directive: String,
        reason: String,
    },

    #[error("structured type `{type_name}` is not registered")]
    UnresolvableStructuredType { type_name: String },

    #[error("invalid manifest {}: {message}", file.display())]
    InvalidManifest { file: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
