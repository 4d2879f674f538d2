//! Container-level build ID lookup.
//!
//! Reads notes through the `object` crate rather than the in-crate note
//! reader, so it also finds identifiers in note sections with unusual names
//! and, for images without section headers, in `PT_NOTE` segments.

use object::elf::{ELF_NOTE_GNU, NT_GNU_BUILD_ID};
use object::read::elf::{
    ElfFile, ElfFile32, ElfFile64, FileHeader, NoteIterator, ProgramHeader, SectionHeader,
};
use object::{Endianness, FileKind, Object};
use std::path::Path;
use tracing::trace;

use crate::error::{BuildIdError, Result, Stage};
use crate::io::MappedFile;

/// Build ID recorded in the container at `path`.
///
/// `Ok(None)` means the container carries no identifier. An empty identifier
/// counts as none. A note section or segment holding more than one GNU build
/// ID is an error, since there is no telling which one is real.
pub fn build_id(path: &Path) -> Result<Option<Vec<u8>>> {
    let mapped =
        MappedFile::open(path).map_err(|e| BuildIdError::io(Stage::Container, path, e))?;
    let data = mapped.data();

    let id = match FileKind::parse(data).map_err(container_error)? {
        FileKind::Elf32 => {
            elf_build_id(&ElfFile32::<Endianness>::parse(data).map_err(container_error)?)?
        }
        FileKind::Elf64 => {
            elf_build_id(&ElfFile64::<Endianness>::parse(data).map_err(container_error)?)?
        }
        _ => object::File::parse(data)
            .and_then(|file| file.build_id())
            .map_err(container_error)?,
    };

    trace!(found = id.is_some(), "Container build id lookup");

    Ok(id.filter(|id| !id.is_empty()).map(<[u8]>::to_vec))
}

fn container_error(e: object::Error) -> BuildIdError {
    BuildIdError::parse(Stage::Container, e)
}

// Section headers win when present; segments are only used without them
fn elf_build_id<'data, Elf: FileHeader>(file: &ElfFile<'data, Elf>) -> Result<Option<&'data [u8]>> {
    let endian = file.endian();
    let data = file.data();
    let sections = file.elf_section_table();

    if !sections.is_empty() {
        for (index, section) in sections.iter().enumerate() {
            let notes = section.notes(endian, data).map_err(container_error)?;
            let place = || {
                sections
                    .section_name(endian, section)
                    .map(|name| String::from_utf8_lossy(name).into_owned())
                    .unwrap_or_else(|_| format!("section {}", index))
            };
            if let Some(id) = unique_gnu_build_id(notes, endian, place)? {
                return Ok(Some(id));
            }
        }
    } else {
        for (index, segment) in file.elf_program_headers().iter().enumerate() {
            let notes = segment.notes(endian, data).map_err(container_error)?;
            let place = || format!("note segment {}", index);
            if let Some(id) = unique_gnu_build_id(notes, endian, place)? {
                return Ok(Some(id));
            }
        }
    }

    Ok(None)
}

fn unique_gnu_build_id<'data, Elf: FileHeader>(
    notes: Option<NoteIterator<'data, Elf>>,
    endian: Elf::Endian,
    place: impl FnOnce() -> String,
) -> Result<Option<&'data [u8]>> {
    let Some(mut notes) = notes else {
        return Ok(None);
    };

    let mut found = None;
    let mut count = 0;
    while let Some(note) = notes.next().map_err(container_error)? {
        if note.name() == ELF_NOTE_GNU && note.n_type(endian) == NT_GNU_BUILD_ID {
            count += 1;
            if found.is_none() {
                found = Some(note.desc());
            }
        }
    }

    if count > 1 {
        return Err(BuildIdError::AmbiguousIdentifier {
            section: place(),
            count,
        });
    }
    Ok(found)
}
