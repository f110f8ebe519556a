//! Object file formats.

pub mod elf;
