//! Error types for the linear hash index

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A bulk-load row is missing a field or carries a non-numeric key
    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// A string field exceeds its fixed on-disk width
    #[error("Field '{field}' is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The one-byte overflow link cannot reach the newly allocated page
    #[error("Overflow page {to} is unreachable from page {from} (link delta exceeds 255)")]
    OverflowChainUnaddressable { from: u32, to: u32 },

    #[error("Record not found: {0}")]
    RecordNotFound(u32),

    #[error("Page {page} out of range ({allocated} pages allocated)")]
    PageOutOfRange { page: u32, allocated: u32 },

    #[error("Data corruption: {0}")]
    Corruption(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl IndexError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        IndexError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}
