//! Build ID extraction from a named note section.
//!
//! The adapter decodes every note in the section and applies a selection
//! predicate. Exactly one match is required: several matching notes are
//! reported as [`BuildIdError::AmbiguousIdentifier`] instead of picking one.

use tracing::trace;

use crate::config::ResolverConfig;
use crate::error::{BuildIdError, Result};
use crate::formats::elf::notes::{parse_notes_with_limit, Note};
use crate::formats::elf::{
    ElfParser, ELF_NOTE_GNU, ELF_NOTE_GO, NT_GNU_BUILD_ID, NT_GO_BUILD_ID,
};

use super::{GNU_BUILD_ID_SECTION, GO_BUILD_ID_SECTION};

/// Selects the Go toolchain's build ID note.
pub fn is_go_build_id(note: &Note<'_>) -> bool {
    note.is(ELF_NOTE_GO, NT_GO_BUILD_ID)
}

/// Selects the GNU linker's build ID note.
pub fn is_gnu_build_id(note: &Note<'_>) -> bool {
    note.is(ELF_NOTE_GNU, NT_GNU_BUILD_ID)
}

/// Returns the descriptor of the single note in `section` matching `predicate`.
pub fn extract_note<F>(
    elf: &ElfParser<'_>,
    section: &str,
    max_note_size: u32,
    predicate: F,
) -> Result<Vec<u8>>
where
    F: Fn(&Note<'_>) -> bool,
{
    let s = elf
        .section(section)
        .ok_or_else(|| BuildIdError::SectionNotFound {
            section: section.to_string(),
        })?;

    let notes = parse_notes_with_limit(s.data, s.addralign(), elf.byte_order(), max_note_size)
        .map_err(|e| BuildIdError::MalformedNotes(format!("{}: {}", section, e)))?;
    trace!(section, count = notes.len(), "Decoded notes");

    let matching: Vec<&Note<'_>> = notes.iter().filter(|note| predicate(note)).collect();
    match matching.as_slice() {
        [] => Err(BuildIdError::IdentifierNotFound {
            section: section.to_string(),
        }),
        [note] => Ok(note.desc.to_vec()),
        many => Err(BuildIdError::AmbiguousIdentifier {
            section: section.to_string(),
            count: many.len(),
        }),
    }
}

/// Go build ID from `.note.go.buildid`.
pub fn go_build_id(elf: &ElfParser<'_>, config: &ResolverConfig) -> Result<Vec<u8>> {
    extract_note(elf, GO_BUILD_ID_SECTION, config.max_note_size, is_go_build_id)
}

/// GNU build ID from `.note.gnu.build-id`.
pub fn gnu_build_id(elf: &ElfParser<'_>, config: &ResolverConfig) -> Result<Vec<u8>> {
    extract_note(elf, GNU_BUILD_ID_SECTION, config.max_note_size, is_gnu_build_id)
}
