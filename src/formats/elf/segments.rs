//! Program header table queries
//!
//! Entries are decoded from the image buffer on access and always visited in
//! on-disk order. Every `find_*` query returns the index of the *first*
//! matching entry; binaries often carry several qualifying segments and
//! callers rely on getting the canonical first one.

use std::ops::Range;

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{range_at, read_cstring, LeRead};
use tracing::{debug, info};

/// Program header table view over an ELF image
#[derive(Debug, Clone, Copy)]
pub struct SegmentTable<'a> {
    table: &'a [u8],
    data: &'a [u8],
}

impl<'a> SegmentTable<'a> {
    /// Locate the program header table described by `header`.
    ///
    /// A table recorded with a zero count or offset yields an empty view. A
    /// table that does not fit inside `data` is rejected.
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        let range = Self::locate(data, header)?;
        Ok(Self::from_range(data, range))
    }

    /// Byte range of the program header table within `data`; empty when the
    /// image has none.
    pub(crate) fn locate(data: &[u8], header: &ElfHeader) -> Result<Range<usize>> {
        if !header.has_program_table() {
            debug!("No program header table");
            return Ok(0..0);
        }

        let total_size = header.e_phnum as u64 * PHDR_SIZE as u64;
        range_at(data.len(), header.e_phoff, total_size).map_err(|_| ElfError::Truncated {
            offset: header.e_phoff as usize,
            needed: total_size as usize,
        })
    }

    /// View over a range previously returned by [`SegmentTable::locate`]
    /// for the same `data`.
    pub(crate) fn from_range(data: &'a [u8], range: Range<usize>) -> Self {
        Self {
            table: data.get(range).unwrap_or_default(),
            data,
        }
    }

    /// Count segments
    pub fn count(&self) -> usize {
        self.table.len() / PHDR_SIZE
    }

    /// Segment at `index` in table order
    pub fn get(&self, index: usize) -> Option<Segment> {
        if index >= self.count() {
            return None;
        }
        parse_program_header(self.table, index * PHDR_SIZE)
            .ok()
            .map(|header| Segment { index, header })
    }

    /// All segments in table order
    pub fn iter(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.count()).filter_map(move |i| self.get(i))
    }

    fn position(&self, pred: impl Fn(&Segment) -> bool) -> Option<usize> {
        self.iter().find(|s| pred(s)).map(|s| s.index)
    }

    /// Index of the first `PT_INTERP` segment
    pub fn find_interpreter(&self) -> Option<usize> {
        let index = self.position(|s| s.kind() == SegmentKind::Interp)?;
        info!(index, "Interpreter found at program header");
        if let Ok(Some(interp)) = self.interpreter_at(index) {
            info!(path = interp.path, "Interpreter path");
        }
        Some(index)
    }

    /// The first interpreter segment together with the loader path it names.
    ///
    /// The path is the null-terminated string at the segment's file offset.
    /// An offset outside the image is an error rather than a miss.
    pub fn interpreter(&self) -> Result<Option<Interpreter<'a>>> {
        match self.position(|s| s.kind() == SegmentKind::Interp) {
            Some(index) => self.interpreter_at(index),
            None => Ok(None),
        }
    }

    fn interpreter_at(&self, index: usize) -> Result<Option<Interpreter<'a>>> {
        let Some(segment) = self.get(index) else {
            return Ok(None);
        };
        let offset = usize::try_from(segment.header.p_offset).map_err(|_| {
            ElfError::InvalidOffset {
                offset: usize::MAX,
            }
        })?;
        let path = read_cstring(self.data, offset)?;
        Ok(Some(Interpreter { index, path }))
    }

    /// Index of the first executable segment
    pub fn find_text_segment(&self) -> Option<usize> {
        let index = self.position(|s| s.is_executable())?;
        info!(index, "Found text segment");
        Some(index)
    }

    /// Index of the first loadable, readable and writable segment
    pub fn find_data_segment(&self) -> Option<usize> {
        let index = self.position(|s| {
            s.kind() == SegmentKind::Load
                && s.flags().contains(SegmentFlags::READ | SegmentFlags::WRITE)
        })?;
        info!(index, "Found data segment");
        Some(index)
    }

    /// Index of the first `PT_NOTE` segment
    pub fn find_note_segment(&self) -> Option<usize> {
        let index = self.position(|s| s.kind() == SegmentKind::Note)?;
        info!(index, "Found note segment");
        Some(index)
    }

    /// First segment whose memory image covers `vaddr`.
    ///
    /// Maps an address computed for injection back to the segment it lands
    /// in.
    pub fn segment_at_vaddr(&self, vaddr: u64) -> Option<Segment> {
        self.iter().find(|s| s.contains_vaddr(vaddr))
    }
}

/// Parse a single ELF64 program header
fn parse_program_header(data: &[u8], offset: usize) -> Result<ProgramHeader> {
    Ok(ProgramHeader {
        p_type: data.read_u32(offset)?,
        p_flags: data.read_u32(offset + 4)?,
        p_offset: data.read_u64(offset + 8)?,
        p_vaddr: data.read_u64(offset + 16)?,
        p_paddr: data.read_u64(offset + 24)?,
        p_filesz: data.read_u64(offset + 32)?,
        p_memsz: data.read_u64(offset + 40)?,
        p_align: data.read_u64(offset + 48)?,
    })
}
