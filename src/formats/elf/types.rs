//! Core ELF64 types and constants

use bitflags::bitflags;
use thiserror::Error;

/// ELF parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElfError {
    #[error("Invalid ELF magic")]
    InvalidMagic,
    #[error("Unsupported ELF class: {0} (only ELF64 is supported)")]
    UnsupportedClass(u8),
    #[error("Unsupported ELF data encoding: {0} (only little-endian is supported)")]
    UnsupportedData(u8),
    #[error("Invalid offset: {offset:#x}")]
    InvalidOffset { offset: usize },
    #[error("Truncated at {offset:#x}, needed {needed} bytes")]
    Truncated { offset: usize, needed: usize },
    #[error("Invalid section index: {0}")]
    InvalidSectionIndex(u16),
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
    #[error("String not UTF-8")]
    InvalidString,
    #[error("No section header table exists")]
    MissingSectionTable,
}

pub type Result<T> = std::result::Result<T, ElfError>;

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// `EI_CLASS` value for 64-bit objects
pub const ELFCLASS64: u8 = 2;
/// `EI_DATA` value for little-endian objects
pub const ELFDATA2LSB: u8 = 1;

/// Size of the ELF64 file header
pub const EHDR_SIZE: usize = 64;
/// Size of one ELF64 program header entry
pub const PHDR_SIZE: usize = 56;
/// Size of one ELF64 section header entry
pub const SHDR_SIZE: usize = 64;

/// ELF file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfType {
    None = 0,
    Relocatable = 1,
    Executable = 2,
    SharedObject = 3,
    Core = 4,
}

impl From<u16> for ElfType {
    fn from(val: u16) -> Self {
        match val {
            1 => ElfType::Relocatable,
            2 => ElfType::Executable,
            3 => ElfType::SharedObject,
            4 => ElfType::Core,
            _ => ElfType::None,
        }
    }
}

/// ELF machine architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfMachine {
    None,
    X86,
    ARM,
    X86_64,
    AArch64,
    RiscV,
    Other(u16),
}

impl From<u16> for ElfMachine {
    fn from(val: u16) -> Self {
        match val {
            0 => ElfMachine::None,
            3 => ElfMachine::X86,
            40 => ElfMachine::ARM,
            62 => ElfMachine::X86_64,
            183 => ElfMachine::AArch64,
            243 => ElfMachine::RiscV,
            other => ElfMachine::Other(other),
        }
    }
}

/// ELF identification (first 16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfIdent {
    pub class: u8,
    pub data: u8,
    pub version: u8,
    pub osabi: u8,
    pub abiversion: u8,
}

/// ELF64 file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    pub ident: ElfIdent,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl ElfHeader {
    pub fn file_type(&self) -> ElfType {
        ElfType::from(self.e_type)
    }

    pub fn machine(&self) -> ElfMachine {
        ElfMachine::from(self.e_machine)
    }

    pub fn entry_point(&self) -> u64 {
        self.e_entry
    }

    /// Whether a section header table is recorded at all.
    ///
    /// A stripped table is signalled by a zero count or a zero offset.
    pub fn has_section_table(&self) -> bool {
        self.e_shnum != 0 && self.e_shoff != 0
    }

    pub fn has_program_table(&self) -> bool {
        self.e_phnum != 0 && self.e_phoff != 0
    }
}

/// Section header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

/// Section types
pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_RELA: u32 = 4;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHT_DYNSYM: u32 = 11;

/// Section flags
pub const SHF_WRITE: u64 = 0x1;
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;

/// Special section indices
pub const SHN_UNDEF: u16 = 0;

/// Program header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

/// Program header types
pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;
pub const PT_TLS: u32 = 7;
pub const PT_GNU_EH_FRAME: u32 = 0x6474e550;
pub const PT_GNU_STACK: u32 = 0x6474e551;
pub const PT_GNU_RELRO: u32 = 0x6474e552;

/// Program header flags
pub const PF_X: u32 = 0x1;
pub const PF_W: u32 = 0x2;
pub const PF_R: u32 = 0x4;

bitflags! {
    /// Permission bits of a program segment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u32 {
        const EXECUTE = PF_X;
        const WRITE = PF_W;
        const READ = PF_R;
    }
}

/// Decoded program header type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    Other(u32),
}

impl From<u32> for SegmentKind {
    fn from(val: u32) -> Self {
        match val {
            PT_NULL => SegmentKind::Null,
            PT_LOAD => SegmentKind::Load,
            PT_DYNAMIC => SegmentKind::Dynamic,
            PT_INTERP => SegmentKind::Interp,
            PT_NOTE => SegmentKind::Note,
            PT_PHDR => SegmentKind::Phdr,
            PT_TLS => SegmentKind::Tls,
            PT_GNU_EH_FRAME => SegmentKind::GnuEhFrame,
            PT_GNU_STACK => SegmentKind::GnuStack,
            PT_GNU_RELRO => SegmentKind::GnuRelro,
            other => SegmentKind::Other(other),
        }
    }
}

/// Section resolved against the section name string table
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub index: usize,
    pub header: SectionHeader,
    pub name: &'a str,
}

impl<'a> Section<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn size(&self) -> u64 {
        self.header.sh_size
    }

    pub fn addr(&self) -> u64 {
        self.header.sh_addr
    }

    pub fn offset(&self) -> u64 {
        self.header.sh_offset
    }

    pub fn is_executable(&self) -> bool {
        (self.header.sh_flags & SHF_EXECINSTR) != 0
    }

    pub fn is_writable(&self) -> bool {
        (self.header.sh_flags & SHF_WRITE) != 0
    }
}

/// Program segment
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub index: usize,
    pub header: ProgramHeader,
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        SegmentKind::from(self.header.p_type)
    }

    /// Permission flags; unknown bits (e.g. `PF_MASKOS`) are dropped.
    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_truncate(self.header.p_flags)
    }

    pub fn is_executable(&self) -> bool {
        self.flags().contains(SegmentFlags::EXECUTE)
    }

    pub fn is_writable(&self) -> bool {
        self.flags().contains(SegmentFlags::WRITE)
    }

    pub fn is_readable(&self) -> bool {
        self.flags().contains(SegmentFlags::READ)
    }

    pub fn contains_vaddr(&self, addr: u64) -> bool {
        addr >= self.header.p_vaddr
            && addr < self.header.p_vaddr.saturating_add(self.header.p_memsz)
    }
}

/// Interpreter segment and the loader path it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpreter<'a> {
    pub index: usize,
    pub path: &'a str,
}
