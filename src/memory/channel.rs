//! Arbitrary-length reads and writes built from single-word requests.

use nix::unistd::Pid;
use tracing::{debug, trace};

use super::{MemoryError, Result, Word, WordTracer, WORD_SIZE};
use crate::config::MemoryConfig;

/// Read/write channel into traced processes
#[derive(Debug, Clone)]
pub struct ProcessMemory<T> {
    tracer: T,
    max_transfer: usize,
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl ProcessMemory<super::Ptrace> {
    /// Channel backed by real trace requests, with default limits.
    pub fn new() -> Self {
        Self::with_tracer(super::Ptrace)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
impl Default for ProcessMemory<super::Ptrace> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: WordTracer> ProcessMemory<T> {
    pub fn with_tracer(tracer: T) -> Self {
        Self::with_config(tracer, &MemoryConfig::default())
    }

    pub fn with_config(tracer: T, config: &MemoryConfig) -> Self {
        Self {
            tracer,
            max_transfer: config.max_transfer,
        }
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Copy `length` bytes starting at `address` out of `pid`.
    ///
    /// The length is checked against the transfer limit before any buffer
    /// is allocated.
    pub fn read(&self, pid: Pid, address: u64, length: usize) -> Result<Vec<u8>> {
        self.check_transfer(address, length)?;
        let mut buf = vec![0u8; length];
        self.read_into(pid, address, &mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` from `address` in `pid`.
    ///
    /// One peek per word; exactly `buf.len()` bytes are written, so a final
    /// partial word only contributes its leading bytes.
    pub fn read_into(&self, pid: Pid, address: u64, buf: &mut [u8]) -> Result<()> {
        self.check_transfer(address, buf.len())?;
        debug!(
            %pid,
            address = format_args!("{:#x}", address),
            len = buf.len(),
            "Reading process memory"
        );

        for (i, chunk) in buf.chunks_mut(WORD_SIZE).enumerate() {
            let word_addr = address + (i * WORD_SIZE) as u64;
            let word = self.peek(pid, word_addr)?;
            chunk.copy_from_slice(&word.to_ne_bytes()[..chunk.len()]);
        }
        Ok(())
    }

    /// Copy `bytes` into `pid` starting at `address`.
    ///
    /// Whole words are poked directly. A trailing partial word is merged
    /// into the word already present, so bytes past the end of `bytes` keep
    /// their values in the target.
    pub fn write(&self, pid: Pid, address: u64, bytes: &[u8]) -> Result<()> {
        self.check_transfer(address, bytes.len())?;
        debug!(
            %pid,
            address = format_args!("{:#x}", address),
            len = bytes.len(),
            "Writing process memory"
        );

        for (i, chunk) in bytes.chunks(WORD_SIZE).enumerate() {
            let word_addr = address + (i * WORD_SIZE) as u64;
            let mut word = [0u8; WORD_SIZE];
            if chunk.len() < WORD_SIZE {
                word = self.peek(pid, word_addr)?.to_ne_bytes();
            }
            word[..chunk.len()].copy_from_slice(chunk);
            self.poke(pid, word_addr, Word::from_ne_bytes(word))?;
        }
        Ok(())
    }

    /// Read one word at `address`.
    pub fn read_word(&self, pid: Pid, address: u64) -> Result<Word> {
        self.peek(pid, address)
    }

    /// Overwrite one word at `address`.
    pub fn write_word(&self, pid: Pid, address: u64, word: Word) -> Result<()> {
        self.poke(pid, address, word)
    }

    fn peek(&self, pid: Pid, address: u64) -> Result<Word> {
        trace!(%pid, address = format_args!("{:#x}", address), "peek");
        self.tracer
            .peek_word(pid, address)
            .map_err(|source| MemoryError::Peek {
                pid,
                address,
                source,
            })
    }

    fn poke(&self, pid: Pid, address: u64, word: Word) -> Result<()> {
        trace!(%pid, address = format_args!("{:#x}", address), "poke");
        self.tracer
            .poke_word(pid, address, word)
            .map_err(|source| MemoryError::Poke {
                pid,
                address,
                source,
            })
    }

    fn check_transfer(&self, address: u64, length: usize) -> Result<()> {
        if length > self.max_transfer {
            return Err(MemoryError::TransferTooLarge {
                requested: length,
                limit: self.max_transfer,
            });
        }
        // The last word touched may extend past `length` but must still be
        // addressable.
        let span = length.div_ceil(WORD_SIZE) * WORD_SIZE;
        if address.checked_add(span as u64).is_none() {
            return Err(MemoryError::AddressOverflow { address, length });
        }
        Ok(())
    }
}
