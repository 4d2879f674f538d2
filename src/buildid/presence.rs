//! Which identifying metadata sections an image carries.

use crate::formats::elf::ElfParser;

use super::GO_BUILD_ID_SECTION;

/// Whether any section of `elf` is named `name`.
pub fn has_section(elf: &ElfParser<'_>, name: &str) -> bool {
    elf.sections().names().any(|section| section == name)
}

/// Whether the Go toolchain's build ID note section is present.
pub fn has_go_build_id_section(elf: &ElfParser<'_>) -> bool {
    has_section(elf, GO_BUILD_ID_SECTION)
}
