//! ELF64 structural parser
//!
//! [`ElfImage`] owns the file contents; [`SegmentTable`] and [`SectionTable`]
//! are bounds-checked views over it that answer the injection-point queries.

pub mod headers;
pub mod image;
pub mod sections;
pub mod segments;
pub mod types;
pub mod utils;

pub use image::ElfImage;
pub use sections::{SectionNames, SectionTable};
pub use segments::SegmentTable;
pub use types::*;
pub use utils::{page_align, page_align_up, PAGE_SIZE};
