//! Error types for elfinject.
//!
//! Each layer keeps its own error enum; `InjectError` wraps them so callers
//! that drive the whole pipeline can use a single `?`.
//!
//! Lookups that simply find nothing return `None` and never appear here.

use thiserror::Error;

use crate::formats::elf::ElfError;
use crate::io::error::IoError;
use crate::memory::MemoryError;

/// Main error type for elfinject operations.
#[derive(Debug, Error)]
pub enum InjectError {
    /// Malformed or unsupported ELF input
    #[error("ELF error: {0}")]
    Elf(#[from] ElfError),

    /// File could not be read completely
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// A trace request against the target process failed
    #[error("Process memory error: {0}")]
    Memory(#[from] MemoryError),

    /// Configuration could not be parsed or serialized
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for elfinject operations
pub type Result<T> = std::result::Result<T, InjectError>;

impl InjectError {
    /// Whether this error came from the traced process rather than the file.
    pub fn is_process_error(&self) -> bool {
        matches!(self, InjectError::Memory(_))
    }
}
