//! Section table queries
//!
//! Two contracts live here and deliberately disagree about a stripped section
//! header table: [`SectionTable::enumerate_sections`] refuses with
//! [`ElfError::MissingSectionTable`], while
//! [`SectionTable::find_section_index`] treats it as an ordinary miss.

use std::ops::Range;

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{range_at, read_cstr_bytes, read_cstring, LeRead};
use tracing::{debug, info, trace, warn};

/// Section header table view with its name string table
#[derive(Debug, Clone, Copy)]
pub struct SectionTable<'a> {
    table: &'a [u8],
    strings: &'a [u8],
    present: bool,
}

impl<'a> SectionTable<'a> {
    /// Locate the section header table and section name string table.
    ///
    /// The string table is the section whose index equals `e_shstrndx`. An
    /// index of `SHN_UNDEF` leaves every section unnamed; any other index
    /// past the table, or a string table outside `data`, is rejected.
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        let layout = SectionLayout::locate(data, header)?;
        Ok(Self::from_layout(data, &layout))
    }

    /// View over a layout previously located in the same `data`.
    pub(crate) fn from_layout(data: &'a [u8], layout: &SectionLayout) -> Self {
        Self {
            table: data.get(layout.table.clone()).unwrap_or_default(),
            strings: data.get(layout.strings.clone()).unwrap_or_default(),
            present: layout.present,
        }
    }

    /// Whether the image records a section header table at all
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Count sections
    pub fn count(&self) -> usize {
        self.table.len() / SHDR_SIZE
    }

    /// Raw bytes of the section name string table
    pub fn string_table(&self) -> &'a [u8] {
        self.strings
    }

    fn header_at(&self, index: usize) -> Option<SectionHeader> {
        if index >= self.count() {
            return None;
        }
        parse_section_header(self.table, index * SHDR_SIZE).ok()
    }

    fn name_of(&self, header: &SectionHeader) -> &'a str {
        match read_cstring(self.strings, header.sh_name as usize) {
            Ok(name) => name,
            Err(e) => {
                trace!(sh_name = header.sh_name, error = %e, "Unresolvable section name");
                ""
            }
        }
    }

    /// Get section by index
    pub fn get(&self, index: usize) -> Option<Section<'a>> {
        let header = self.header_at(index)?;
        Some(Section {
            index,
            header,
            name: self.name_of(&header),
        })
    }

    /// All sections in table order
    pub fn iter(&self) -> impl Iterator<Item = Section<'a>> + '_ {
        (0..self.count()).filter_map(move |i| self.get(i))
    }

    /// Names of every section, in table order.
    ///
    /// The returned iterator is lazy and can be cloned to restart the walk.
    /// Fails when the image has no section header table.
    pub fn enumerate_sections(&self) -> Result<SectionNames<'a>> {
        if !self.present {
            return Err(ElfError::MissingSectionTable);
        }
        Ok(SectionNames {
            table: *self,
            next: 0,
        })
    }

    /// Log every section as `index --> name`
    pub fn display_sections(&self) -> Result<()> {
        info!("Displaying section names");
        for (index, name) in self.enumerate_sections()? {
            info!("\t{} --> {}", index, name);
        }
        Ok(())
    }

    /// Index of the first section whose name equals `name` exactly.
    ///
    /// A missing section header table is reported as a miss.
    pub fn find_section_index(&self, name: &str) -> Option<usize> {
        if !self.present {
            warn!(
                section = name,
                "Unable to find a section in a binary with no section header table"
            );
            return None;
        }

        let index = (0..self.count()).find(|&i| {
            self.header_at(i)
                .and_then(|h| read_cstr_bytes(self.strings, h.sh_name as usize).ok())
                .is_some_and(|bytes| bytes == name.as_bytes())
        })?;
        info!(section = name, index, "Found section");
        Some(index)
    }

    /// Get section by name
    pub fn by_name(&self, name: &str) -> Option<Section<'a>> {
        self.find_section_index(name).and_then(|i| self.get(i))
    }
}

/// Validated byte ranges of the section header table and its name string
/// table within an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SectionLayout {
    table: Range<usize>,
    strings: Range<usize>,
    present: bool,
}

impl SectionLayout {
    pub(crate) fn locate(data: &[u8], header: &ElfHeader) -> Result<Self> {
        if !header.has_section_table() {
            debug!("No section header table");
            return Ok(Self::default());
        }

        let total_size = header.e_shnum as u64 * SHDR_SIZE as u64;
        let table = range_at(data.len(), header.e_shoff, total_size).map_err(|_| {
            ElfError::Truncated {
                offset: header.e_shoff as usize,
                needed: total_size as usize,
            }
        })?;

        let shstrndx = header.e_shstrndx;
        let strings = if shstrndx == SHN_UNDEF {
            0..0
        } else if shstrndx < header.e_shnum {
            let str_header =
                parse_section_header(&data[table.clone()], shstrndx as usize * SHDR_SIZE)?;
            range_at(data.len(), str_header.sh_offset, str_header.sh_size)?
        } else {
            return Err(ElfError::InvalidSectionIndex(shstrndx));
        };

        Ok(Self {
            table,
            strings,
            present: true,
        })
    }
}

/// Lazy walk over section names, yielding `(index, name)`
#[derive(Debug, Clone)]
pub struct SectionNames<'a> {
    table: SectionTable<'a>,
    next: usize,
}

impl<'a> Iterator for SectionNames<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.table.header_at(self.next)?;
        let index = self.next;
        self.next += 1;
        Some((index, self.table.name_of(&header)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.table.count().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for SectionNames<'_> {}

/// Parse a single ELF64 section header
fn parse_section_header(data: &[u8], offset: usize) -> Result<SectionHeader> {
    Ok(SectionHeader {
        sh_name: data.read_u32(offset)?,
        sh_type: data.read_u32(offset + 4)?,
        sh_flags: data.read_u64(offset + 8)?,
        sh_addr: data.read_u64(offset + 16)?,
        sh_offset: data.read_u64(offset + 24)?,
        sh_size: data.read_u64(offset + 32)?,
        sh_link: data.read_u32(offset + 40)?,
        sh_info: data.read_u32(offset + 44)?,
        sh_addralign: data.read_u64(offset + 48)?,
        sh_entsize: data.read_u64(offset + 56)?,
    })
}
