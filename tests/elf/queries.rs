use crate::common::{write_temp, ElfBuilder, ENTRY, PF_R, PF_W, PF_X, PT_LOAD, PT_NOTE};
use elfinject::config::{InjectConfig, LoaderConfig};
use elfinject::formats::elf::{ElfError, ElfImage, SHT_PROGBITS};
use elfinject::io::error::IoError;
use elfinject::InjectError;

fn dynamic_exe() -> ElfBuilder {
    ElfBuilder::new()
        .interpreter("/lib64/ld-linux-x86-64.so.2")
        .segment(PT_LOAD, PF_R, 0x400000)
        .segment(PT_LOAD, PF_R | PF_X, 0x401000)
        .segment(PT_LOAD, PF_R | PF_W, 0x403000)
        .segment(PT_NOTE, PF_R, 0x400300)
        .section(".interp", SHT_PROGBITS, 0x400318)
        .section(".text", SHT_PROGBITS, 0x401000)
        .section(".data", SHT_PROGBITS, 0x403000)
}

#[test]
fn load_from_disk_and_query() {
    let file = dynamic_exe().write_temp();
    let image = ElfImage::load(file.path()).unwrap();

    assert_eq!(image.header().entry_point(), ENTRY);
    assert_eq!(image.header().e_phnum, 5);
    assert_eq!(image.header().e_shnum, 5);

    let segments = image.segments();
    assert_eq!(segments.find_interpreter(), Some(0));
    assert_eq!(segments.find_text_segment(), Some(2));
    assert_eq!(segments.find_data_segment(), Some(3));
    assert_eq!(segments.find_note_segment(), Some(4));
    assert_eq!(
        image.interpreter_path(),
        Some("/lib64/ld-linux-x86-64.so.2")
    );

    let sections = image.sections();
    assert_eq!(sections.find_section_index(".text"), Some(2));
    assert_eq!(sections.find_section_index("does-not-exist"), None);
    assert_eq!(image.section(3).unwrap().name(), ".data");

    image.release();
}

#[test]
fn synthetic_flag_tables() {
    let image = ElfImage::from_bytes(
        ElfBuilder::new()
            .segment(PT_LOAD, PF_R | PF_W, 0x1000)
            .segment(PT_LOAD, PF_R | PF_X, 0x2000)
            .segment(PT_LOAD, PF_R | PF_W | PF_X, 0x3000)
            .build(),
    )
    .unwrap();
    assert_eq!(image.segments().find_text_segment(), Some(1));

    let image = ElfImage::from_bytes(
        ElfBuilder::new()
            .segment(PT_LOAD, PF_R, 0x1000)
            .segment(PT_LOAD, PF_R | PF_W, 0x2000)
            .segment(PT_LOAD, PF_R | PF_W | PF_X, 0x3000)
            .build(),
    )
    .unwrap();
    assert_eq!(image.segments().find_data_segment(), Some(1));
}

#[test]
fn static_binary_has_no_interpreter() {
    let image = ElfImage::from_bytes(
        ElfBuilder::new()
            .segment(PT_LOAD, PF_R | PF_X, 0x401000)
            .segment(PT_LOAD, PF_R | PF_W, 0x403000)
            .build(),
    )
    .unwrap();
    assert_eq!(image.segments().find_interpreter(), None);
    assert!(image.interpreter_path().is_none());
}

#[test]
fn duplicate_section_names_resolve_to_first() {
    let image = ElfImage::from_bytes(
        ElfBuilder::new()
            .section(".text", SHT_PROGBITS, 0x1000)
            .section(".init", SHT_PROGBITS, 0x2000)
            .section(".text", SHT_PROGBITS, 0x3000)
            .build(),
    )
    .unwrap();
    let sections = image.sections();
    assert_eq!(sections.find_section_index(".text"), Some(1));
    assert_eq!(sections.by_name(".text").unwrap().addr(), 0x1000);
}

#[test]
fn stripped_section_table_asymmetry() {
    let image = ElfImage::from_bytes(
        dynamic_exe().strip_section_headers().build(),
    )
    .unwrap();
    let sections = image.sections();

    // Enumeration is strict, lookup is not
    assert_eq!(
        sections.enumerate_sections().err(),
        Some(ElfError::MissingSectionTable)
    );
    assert_eq!(sections.find_section_index(".text"), None);

    // Segment queries are unaffected
    assert_eq!(image.segments().find_text_segment(), Some(2));
}

#[test]
fn enumerate_sections_in_table_order() {
    let image = ElfImage::from_bytes(dynamic_exe().build()).unwrap();
    let sections = image.sections();
    let names: Vec<&str> = sections
        .enumerate_sections()
        .unwrap()
        .map(|(_, name)| name)
        .collect();
    assert_eq!(names, vec!["", ".interp", ".text", ".data", ".shstrtab"]);
}

#[test]
fn oversized_file_rejected() {
    let file = dynamic_exe().write_temp();
    let mut config = InjectConfig::default();
    config.io.max_file_size = 16;

    let result = ElfImage::load_with(file.path(), &config.loader());
    assert!(matches!(
        result,
        Err(InjectError::Io(IoError::FileTooLarge { limit: 16, .. }))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ElfImage::load(dir.path().join("nope"));
    assert!(matches!(result, Err(InjectError::Io(IoError::StdIo(_)))));
}

#[test]
fn truncated_file_rejected() {
    let mut bytes = dynamic_exe().build();
    bytes.truncate(100);
    let file = write_temp(&bytes);
    assert!(matches!(
        ElfImage::load(file.path()),
        Err(InjectError::Elf(ElfError::Truncated { .. }))
    ));
}

#[test]
fn ident_validation_can_be_disabled() {
    let mut bytes = dynamic_exe().build();
    bytes[0] = 0;
    let file = write_temp(&bytes);

    assert!(matches!(
        ElfImage::load(file.path()),
        Err(InjectError::Elf(ElfError::InvalidMagic))
    ));

    let mut config = LoaderConfig::default();
    config.elf.validate_ident = false;
    let image = ElfImage::load_with(file.path(), &config).unwrap();
    assert_eq!(image.segments().find_text_segment(), Some(2));
}
