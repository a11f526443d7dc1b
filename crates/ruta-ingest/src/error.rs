//! Error types for connection ingestion.

use thiserror::Error;

/// Reasons a connection file is rejected.
///
/// Line numbers are 1-based and count every physical line, blank lines
/// and the header included, so they match what an editor shows.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File is empty")]
    EmptyInput,

    #[error("Invalid format at line {line}")]
    InvalidFormat { line: usize },

    #[error("Invalid time at line {line}")]
    InvalidWeight { line: usize },

    #[error("Invalid data at line {line}")]
    InvalidData { line: usize },

    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// The offending line, for errors tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidFormat { line }
            | Self::InvalidWeight { line }
            | Self::InvalidData { line } => Some(*line),
            Self::EmptyInput | Self::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
