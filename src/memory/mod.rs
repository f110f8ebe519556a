//! Word-granular access to a traced process's address space.
//!
//! The kernel's trace interface moves memory one machine word at a time.
//! [`WordTracer`] is that primitive; [`ProcessMemory`] builds arbitrary-length
//! reads and writes on top of it without ever touching bytes outside the
//! requested range.
//!
//! The target pid must already be traced by the calling thread and stopped.
//! Requests against one pid must be serialized by the caller: the kernel only
//! accepts them from the thread holding the trace relationship.

pub mod channel;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod ptrace;
pub mod sim;

pub use channel::ProcessMemory;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use ptrace::Ptrace;
pub use sim::SimulatedProcess;

use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

/// The unit of a single peek or poke.
pub type Word = std::ffi::c_long;

/// Bytes per [`Word`]; the native pointer width on supported targets.
pub const WORD_SIZE: usize = std::mem::size_of::<Word>();

/// Errors raised by the process memory channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("peek at {address:#x} in pid {pid} failed: {source}")]
    Peek {
        pid: Pid,
        address: u64,
        #[source]
        source: Errno,
    },
    #[error("poke at {address:#x} in pid {pid} failed: {source}")]
    Poke {
        pid: Pid,
        address: u64,
        #[source]
        source: Errno,
    },
    #[error("range {address:#x} + {length} overflows the address space")]
    AddressOverflow { address: u64, length: usize },
    #[error("transfer of {requested} bytes exceeds the limit of {limit} bytes")]
    TransferTooLarge { requested: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// One-word trace requests against a stopped, traced process.
///
/// Failures carry the errno reported by the kernel. Implementations must not
/// report a successfully peeked word as a failure because of its value; in
/// particular a word with every bit set is valid data.
pub trait WordTracer {
    /// Read the word at `address`.
    fn peek_word(&self, pid: Pid, address: u64) -> std::result::Result<Word, Errno>;

    /// Replace the word at `address`.
    fn poke_word(&self, pid: Pid, address: u64, word: Word) -> std::result::Result<(), Errno>;
}

impl<T: WordTracer + ?Sized> WordTracer for &T {
    fn peek_word(&self, pid: Pid, address: u64) -> std::result::Result<Word, Errno> {
        (**self).peek_word(pid, address)
    }

    fn poke_word(&self, pid: Pid, address: u64, word: Word) -> std::result::Result<(), Errno> {
        (**self).poke_word(pid, address, word)
    }
}
