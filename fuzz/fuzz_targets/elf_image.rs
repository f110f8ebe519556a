#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(image) = elfinject::ElfImage::from_bytes(data.to_vec()) else {
        return;
    };
    let segments = image.segments();
    let _ = segments.find_interpreter();
    let _ = segments.interpreter();
    let _ = segments.find_text_segment();
    let _ = segments.find_data_segment();
    let _ = segments.find_note_segment();
    let _ = segments.segment_at_vaddr(image.header().e_entry);

    let sections = image.sections();
    let _ = sections.find_section_index(".text");
    if let Ok(names) = sections.enumerate_sections() {
        for _ in names {}
    }
    image.release();
});
