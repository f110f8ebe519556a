//! Foundations for runtime ELF instrumentation.
//!
//! - [`formats::elf`] parses an ELF64 image and locates injection points:
//!   the interpreter, text, data and note segments, and named sections.
//! - [`memory`] reads and writes a traced process's memory one word at a
//!   time.
//! - [`guard`] is an anti-debugging tripwire.
//!
//! The two halves are independent; a caller computes addresses from an
//! [`ElfImage`] and applies them through [`ProcessMemory`]. Attaching to and
//! detaching from the target process is left to the caller.

pub mod config;
pub mod error;
pub mod formats;
pub mod guard;
pub mod io;
pub mod logging;
pub mod memory;

pub use config::InjectConfig;
pub use error::{InjectError, Result};
pub use formats::elf::ElfImage;
pub use memory::ProcessMemory;
