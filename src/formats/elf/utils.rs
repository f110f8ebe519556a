//! Utility functions for ELF parsing

use std::ops::Range;

use crate::formats::elf::types::{ElfError, Result};

/// Page size assumed for injection region arithmetic
pub const PAGE_SIZE: u64 = 4096;

/// Bounds-checked little-endian reads over a byte buffer
pub trait LeRead {
    fn read_u16(&self, offset: usize) -> Result<u16>;
    fn read_u32(&self, offset: usize) -> Result<u32>;
    fn read_u64(&self, offset: usize) -> Result<u64>;
}

impl LeRead for [u8] {
    fn read_u16(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_le_bytes(read_array(self, offset)?))
    }

    fn read_u32(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_le_bytes(read_array(self, offset)?))
    }

    fn read_u64(&self, offset: usize) -> Result<u64> {
        Ok(u64::from_le_bytes(read_array(self, offset)?))
    }
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    let bytes = offset
        .checked_add(N)
        .and_then(|end| data.get(offset..end))
        .ok_or(ElfError::Truncated { offset, needed: N })?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Byte range `offset..offset + size` after checking it lies within
/// `data_len`, converting file-controlled `u64` values without overflow.
pub fn range_at(data_len: usize, offset: u64, size: u64) -> Result<Range<usize>> {
    let start = usize::try_from(offset).map_err(|_| ElfError::InvalidOffset {
        offset: usize::MAX,
    })?;
    let len = usize::try_from(size).map_err(|_| ElfError::InvalidOffset { offset: start })?;
    check_bounds(start, len, data_len)?;
    Ok(start..start + len)
}

/// Return `data[offset..offset + size]`; see [`range_at`].
pub fn slice_at(data: &[u8], offset: u64, size: u64) -> Result<&[u8]> {
    Ok(&data[range_at(data.len(), offset, size)?])
}

/// Bytes of a null-terminated string, without the terminator.
///
/// A string running to the end of `data` without a terminator is returned
/// whole.
pub fn read_cstr_bytes(data: &[u8], offset: usize) -> Result<&[u8]> {
    let slice = data
        .get(offset..)
        .filter(|s| !s.is_empty())
        .ok_or(ElfError::InvalidOffset { offset })?;
    let end = memchr::memchr(0, slice).unwrap_or(slice.len());
    Ok(&slice[..end])
}

/// Read a null-terminated string from data
pub fn read_cstring(data: &[u8], offset: usize) -> Result<&str> {
    let bytes = read_cstr_bytes(data, offset)?;
    std::str::from_utf8(bytes).map_err(|_| ElfError::InvalidString)
}

/// Round an address down to its page boundary.
pub fn page_align(addr: u64) -> u64 {
    addr & !(PAGE_SIZE - 1)
}

/// Page boundary strictly past the page containing `addr`.
///
/// Already-aligned addresses still advance by one page, which gives an
/// injected payload a fresh page after the segment it follows. The last page
/// of the address space wraps to zero.
pub fn page_align_up(addr: u64) -> u64 {
    page_align(addr).wrapping_add(PAGE_SIZE)
}

/// Check if a range is within bounds
pub fn check_bounds(offset: usize, size: usize, data_len: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= data_len => Ok(()),
        _ => Err(ElfError::InvalidOffset { offset }),
    }
}
