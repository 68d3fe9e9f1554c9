//! Error types for datebook records.

use thiserror::Error;

/// Errors that can occur while decoding, encoding or loading datebook data.
#[derive(Error, Debug)]
pub enum DatebookError {
    #[error("Record truncated: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid packed date: 0x{0:04x}")]
    InvalidDate(u16),

    #[error("Invalid time of day: {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },

    #[error("Unknown repeat type: {0}")]
    InvalidRepeatType(u8),

    #[error("Unknown alarm advance units: {0}")]
    InvalidAdvanceUnits(u8),

    #[error("String at offset {0} is not NUL-terminated")]
    UnterminatedString(usize),

    #[error("Text cannot be encoded for the device: {0:?}")]
    Unencodable(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("PDB error: {0}")]
    Pdb(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for datebook operations.
pub type DatebookResult<T> = Result<T, DatebookError>;
