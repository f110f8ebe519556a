//! ELF64 header parsing

use crate::formats::elf::types::*;
use crate::formats::elf::utils::LeRead;

/// Parse ELF identification bytes.
///
/// With `validate` set, the magic, class and data encoding must describe a
/// little-endian ELF64 object. Without it the bytes are taken as-is and the
/// rest of the header is interpreted as ELF64 regardless.
pub fn parse_ident(data: &[u8], validate: bool) -> Result<ElfIdent> {
    if data.len() < 16 {
        return Err(ElfError::Truncated {
            offset: 0,
            needed: 16,
        });
    }

    let ident = ElfIdent {
        class: data[4],
        data: data[5],
        version: data[6],
        osabi: data[7],
        abiversion: data[8],
    };

    if validate {
        if &data[0..4] != ELF_MAGIC {
            return Err(ElfError::InvalidMagic);
        }
        if ident.class != ELFCLASS64 {
            return Err(ElfError::UnsupportedClass(ident.class));
        }
        if ident.data != ELFDATA2LSB {
            return Err(ElfError::UnsupportedData(ident.data));
        }
    }

    Ok(ident)
}

/// Parse the ELF64 header at offset 0
pub fn parse_header(data: &[u8], validate_ident: bool) -> Result<ElfHeader> {
    let ident = parse_ident(data, validate_ident)?;

    if data.len() < EHDR_SIZE {
        return Err(ElfError::Truncated {
            offset: 0,
            needed: EHDR_SIZE,
        });
    }

    let header = ElfHeader {
        ident,
        e_type: data.read_u16(16)?,
        e_machine: data.read_u16(18)?,
        e_version: data.read_u32(20)?,
        e_entry: data.read_u64(24)?,
        e_phoff: data.read_u64(32)?,
        e_shoff: data.read_u64(40)?,
        e_flags: data.read_u32(48)?,
        e_ehsize: data.read_u16(52)?,
        e_phentsize: data.read_u16(54)?,
        e_phnum: data.read_u16(56)?,
        e_shentsize: data.read_u16(58)?,
        e_shnum: data.read_u16(60)?,
        e_shstrndx: data.read_u16(62)?,
    };

    // Entry sizes drive table strides; anything else would misalign every entry
    if header.e_phnum > 0 && header.e_phentsize as usize != PHDR_SIZE {
        return Err(ElfError::MalformedHeader(format!(
            "Invalid e_phentsize: expected {}, got {}",
            PHDR_SIZE, header.e_phentsize
        )));
    }
    if header.e_shnum > 0 && header.e_shentsize as usize != SHDR_SIZE {
        return Err(ElfError::MalformedHeader(format!(
            "Invalid e_shentsize: expected {}, got {}",
            SHDR_SIZE, header.e_shentsize
        )));
    }

    Ok(header)
}
