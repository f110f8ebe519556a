//! `PTRACE_PEEKDATA` / `PTRACE_POKEDATA` backend.

use nix::errno::Errno;
use nix::sys::ptrace;
use nix::unistd::Pid;

use super::{Word, WordTracer};

/// Trace requests issued through the kernel.
///
/// A raw peek returns -1 both on failure and for a word whose bits are all
/// set. `nix` clears errno before the request and only reports failure when
/// errno was set, so such words read back correctly here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ptrace;

impl WordTracer for Ptrace {
    fn peek_word(&self, pid: Pid, address: u64) -> Result<Word, Errno> {
        ptrace::read(pid, address as usize as ptrace::AddressType)
    }

    fn poke_word(&self, pid: Pid, address: u64, word: Word) -> Result<(), Errno> {
        ptrace::write(pid, address as usize as ptrace::AddressType, word)
    }
}
