//! Checks against the running test executable, cross-verified with raw
//! byte offsets from the ELF64 layout.

use crate::common::current_exe;
use elfinject::formats::elf::{ElfImage, SegmentKind};

fn le_u16(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn le_u64(b: &[u8], off: usize) -> u64 {
    let mut v = [0u8; 8];
    v.copy_from_slice(&b[off..off + 8]);
    u64::from_le_bytes(v)
}

#[test]
fn header_matches_raw_bytes() {
    let path = current_exe();
    let raw = std::fs::read(&path).unwrap();
    let image = ElfImage::load(&path).unwrap();
    let header = image.header();

    assert_eq!(image.file_size(), raw.len());
    assert_eq!(header.e_entry, le_u64(&raw, 24));
    assert_eq!(header.e_phoff, le_u64(&raw, 32));
    assert_eq!(header.e_shoff, le_u64(&raw, 40));
    assert_eq!(header.e_phnum, le_u16(&raw, 56));
    assert_eq!(header.e_shnum, le_u16(&raw, 60));
    assert_eq!(header.e_shstrndx, le_u16(&raw, 62));
    assert_eq!(image.segments().count(), header.e_phnum as usize);
}

#[test]
fn text_section_and_segment() {
    let image = ElfImage::load(current_exe()).unwrap();

    let sections = image.sections();
    let index = sections.find_section_index(".text").expect(".text present");
    assert_eq!(sections.get(index).unwrap().name(), ".text");
    assert!(sections.get(index).unwrap().is_executable());

    let segments = image.segments();
    let text = segments.find_text_segment().expect("executable segment");
    let segment = segments.get(text).unwrap();
    assert_eq!(segment.kind(), SegmentKind::Load);
    assert!(segments.iter().take(text).all(|s| !s.is_executable()));

    let data = segments.find_data_segment().expect("writable segment");
    assert!(segments.get(data).unwrap().is_writable());
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn interpreter_names_the_dynamic_loader() {
    let path = current_exe();
    let raw = std::fs::read(&path).unwrap();
    let image = ElfImage::load(&path).unwrap();
    let segments = image.segments();

    let index = segments.find_interpreter().expect("dynamically linked");
    let interp = segments.interpreter().unwrap().unwrap();
    assert_eq!(interp.index, index);

    // Same string as sits at p_offset in the file
    let offset = segments.get(index).unwrap().header.p_offset as usize;
    let end = raw[offset..].iter().position(|&b| b == 0).unwrap();
    assert_eq!(interp.path.as_bytes(), &raw[offset..offset + end]);
    assert!(interp.path.starts_with('/'));
    assert!(std::path::Path::new(interp.path).exists());
}

#[test]
fn enumerate_matches_header_count() {
    let image = ElfImage::load(current_exe()).unwrap();
    let sections = image.sections();
    let names = sections.enumerate_sections().unwrap();
    assert_eq!(names.count(), image.header().e_shnum as usize);
}
