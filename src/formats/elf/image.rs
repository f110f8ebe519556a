//! Owned ELF64 image and the views derived from it.

use std::ops::Range;
use std::path::Path;

use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::formats::elf::headers::parse_header;
use crate::formats::elf::sections::{SectionLayout, SectionTable};
use crate::formats::elf::segments::SegmentTable;
use crate::formats::elf::types::{ElfHeader, Result as ElfResult, Section, Segment};
use crate::io::read_file;

/// An ELF64 file held in memory.
///
/// The image is the sole owner of the file contents. The header is decoded
/// once at load, and the program header table, section header table and
/// string table are located and bounds-checked at the same time. The views
/// handed out afterwards borrow the buffer and cannot outlive it.
#[derive(Debug, Clone)]
pub struct ElfImage {
    data: Vec<u8>,
    header: ElfHeader,
    program_table: Range<usize>,
    section_layout: SectionLayout,
}

impl ElfImage {
    /// Read and parse the file at `path` with default limits.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, &LoaderConfig::default())
    }

    /// Read and parse the file at `path`.
    ///
    /// The file must be read completely; a short read is an error, never a
    /// partial image.
    pub fn load_with<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let data =
            read_file(path, &config.io).map_err(|e| crate::log_error!(e, "reading ELF file"))?;
        debug!(path = %path.display(), size = data.len(), "Read ELF file");
        Self::parse(data, config.elf.validate_ident)
            .map_err(|e| crate::log_error!(e, "parsing ELF file").into())
    }

    /// Parse an already-read buffer, validating the ELF identification.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::parse(data, true)?)
    }

    /// Header first, then both tables, so that a malformed table is reported
    /// here instead of on first query.
    fn parse(data: Vec<u8>, validate_ident: bool) -> ElfResult<Self> {
        let header = parse_header(&data, validate_ident)?;
        let program_table = SegmentTable::locate(&data, &header)?;
        let section_layout = SectionLayout::locate(&data, &header)?;
        debug!(
            entry = format_args!("{:#x}", header.e_entry),
            phnum = header.e_phnum,
            shnum = header.e_shnum,
            "Parsed ELF header"
        );
        Ok(Self {
            data,
            header,
            program_table,
            section_layout,
        })
    }

    /// Get ELF header
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// Raw file contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the file in bytes
    pub fn file_size(&self) -> usize {
        self.data.len()
    }

    /// Program header table
    pub fn segments(&self) -> SegmentTable<'_> {
        SegmentTable::from_range(&self.data, self.program_table.clone())
    }

    /// Section header table and its name string table
    pub fn sections(&self) -> SectionTable<'_> {
        SectionTable::from_layout(&self.data, &self.section_layout)
    }

    /// Section name string table (empty when absent)
    pub fn string_table(&self) -> &[u8] {
        self.sections().string_table()
    }

    pub fn segment(&self, index: usize) -> Option<Segment> {
        self.segments().get(index)
    }

    pub fn section(&self, index: usize) -> Option<Section<'_>> {
        self.sections().get(index)
    }

    /// Interpreter path, if the image names one and it is readable.
    ///
    /// The path itself is only checked when asked for, so an interpreter
    /// segment pointing outside the file reads as `None` here; use
    /// [`SegmentTable::interpreter`] to see the error.
    pub fn interpreter_path(&self) -> Option<&str> {
        self.segments()
            .interpreter()
            .ok()
            .flatten()
            .map(|interp| interp.path)
    }

    /// Free the buffer. Consuming `self` rules out a second release.
    pub fn release(self) {
        debug!(size = self.data.len(), "Releasing ELF image");
        drop(self);
    }
}
