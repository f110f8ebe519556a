//! In-memory stand-in for a traced process.
//!
//! Useful for exercising code built on [`ProcessMemory`](super::ProcessMemory)
//! without a live tracee. Memory is a set of mapped regions; a word that is
//! not fully inside one region fails with `EIO`, as the kernel does for
//! unmapped addresses.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use nix::errno::Errno;
use nix::unistd::Pid;

use super::{Word, WordTracer, WORD_SIZE};

#[derive(Debug, Clone)]
struct Region {
    start: u64,
    bytes: Vec<u8>,
}

impl Region {
    fn word_range(&self, address: u64) -> Option<std::ops::Range<usize>> {
        let offset = usize::try_from(address.checked_sub(self.start)?).ok()?;
        let end = offset.checked_add(WORD_SIZE)?;
        (end <= self.bytes.len()).then_some(offset..end)
    }
}

/// Simulated address space answering word-sized trace requests
#[derive(Debug, Default)]
pub struct SimulatedProcess {
    regions: RefCell<Vec<Region>>,
    faults: BTreeSet<u64>,
    peeks: Cell<usize>,
    pokes: Cell<usize>,
}

impl SimulatedProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `bytes` at `start`.
    pub fn with_region(self, start: u64, bytes: Vec<u8>) -> Self {
        self.regions.borrow_mut().push(Region { start, bytes });
        self
    }

    /// Make any request whose word starts at `address` fail with `EFAULT`.
    pub fn with_fault(mut self, address: u64) -> Self {
        self.faults.insert(address);
        self
    }

    /// Copy of `len` mapped bytes at `address`, if fully mapped.
    pub fn snapshot(&self, address: u64, len: usize) -> Option<Vec<u8>> {
        let regions = self.regions.borrow();
        regions.iter().find_map(|r| {
            let offset = usize::try_from(address.checked_sub(r.start)?).ok()?;
            r.bytes.get(offset..offset.checked_add(len)?).map(<[u8]>::to_vec)
        })
    }

    /// Number of peek requests served so far
    pub fn peeks(&self) -> usize {
        self.peeks.get()
    }

    /// Number of poke requests served so far
    pub fn pokes(&self) -> usize {
        self.pokes.get()
    }

    fn check_fault(&self, address: u64) -> Result<(), Errno> {
        if self.faults.contains(&address) {
            Err(Errno::EFAULT)
        } else {
            Ok(())
        }
    }
}

impl WordTracer for SimulatedProcess {
    fn peek_word(&self, _pid: Pid, address: u64) -> Result<Word, Errno> {
        self.peeks.set(self.peeks.get() + 1);
        self.check_fault(address)?;
        let regions = self.regions.borrow();
        let (region, range) = regions
            .iter()
            .find_map(|r| r.word_range(address).map(|range| (r, range)))
            .ok_or(Errno::EIO)?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(&region.bytes[range]);
        Ok(Word::from_ne_bytes(word))
    }

    fn poke_word(&self, _pid: Pid, address: u64, word: Word) -> Result<(), Errno> {
        self.pokes.set(self.pokes.get() + 1);
        self.check_fault(address)?;
        let mut regions = self.regions.borrow_mut();
        let (region, range) = regions
            .iter_mut()
            .find_map(|r| r.word_range(address).map(|range| (r, range)))
            .ok_or(Errno::EIO)?;
        region.bytes[range].copy_from_slice(&word.to_ne_bytes());
        Ok(())
    }
}
