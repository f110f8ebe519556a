//! Bounded whole-file reads.
//!
//! ELF images are parsed from a single owned buffer holding the entire file,
//! so loading is all-or-nothing: the size is checked against the configured
//! limit before any allocation, and a file that yields fewer bytes than its
//! recorded size is an error rather than a truncated image.

pub mod error;

use crate::config::IOConfig;
use crate::io::error::{IoError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Read the whole file at `path` into memory.
pub fn read_file(path: &Path, config: &IOConfig) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    debug!(
        path = %path.display(),
        size = file_size,
        limit = config.max_file_size,
        "Reading file"
    );

    if file_size > config.max_file_size {
        warn!(
            path = %path.display(),
            size = file_size,
            limit = config.max_file_size,
            "File is too large"
        );
        return Err(IoError::FileTooLarge {
            limit: config.max_file_size,
            found: file_size,
        });
    }

    let mut data = Vec::with_capacity(file_size as usize);
    file.take(file_size).read_to_end(&mut data)?;

    let read = data.len() as u64;
    if read != file_size {
        warn!(path = %path.display(), expected = file_size, read, "Short read");
        return Err(IoError::ShortRead {
            expected: file_size,
            read,
        });
    }

    Ok(data)
}
