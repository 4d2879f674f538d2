//! Note record parsing
//!
//! Notes are the self-describing records carried by `SHT_NOTE` sections and
//! `PT_NOTE` segments: a 12-byte header (`namesz`, `descsz`, `type`) in the
//! image's byte order, then the name and the descriptor, each padded to the
//! container's alignment.

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{align_up, EndianRead};

/// Largest name or descriptor accepted in a single note.
pub const MAX_NOTE_SIZE: u32 = 1 << 20;

const NOTE_HEADER_SIZE: usize = 12;

/// Individual note entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note<'a> {
    pub n_type: u32,
    pub name: &'a str,
    pub desc: &'a [u8],
}

impl<'a> Note<'a> {
    /// Whether this note has the given namespace tag and type code.
    pub fn is(&self, name: &str, n_type: u32) -> bool {
        self.name == name && self.n_type == n_type
    }
}

/// Parse every note in `data` using the default size limit.
pub fn parse_notes(data: &[u8], alignment: u64, endian: ElfData) -> Result<Vec<Note<'_>>> {
    parse_notes_with_limit(data, alignment, endian, MAX_NOTE_SIZE)
}

/// Parse every note in `data`.
///
/// `alignment` is the section's `sh_addralign` (or the segment's `p_align`);
/// values below 4 fall back to the 4-byte alignment every ELF producer uses.
/// A name or descriptor that overruns the data is an error, while missing
/// padding after the final descriptor is not.
pub fn parse_notes_with_limit(
    data: &[u8],
    alignment: u64,
    endian: ElfData,
    max_note_size: u32,
) -> Result<Vec<Note<'_>>> {
    let alignment = alignment.max(4);
    let mut notes = Vec::new();
    let mut offset = 0;

    while data.len().saturating_sub(offset) >= NOTE_HEADER_SIZE {
        let n_namesz = data.read_u32(offset, endian)?;
        let n_descsz = data.read_u32(offset + 4, endian)?;
        let n_type = data.read_u32(offset + 8, endian)?;

        if n_namesz > max_note_size {
            return Err(ElfError::MalformedNote(format!(
                "note name too long ({} bytes)",
                n_namesz
            )));
        }
        if n_descsz > max_note_size {
            return Err(ElfError::MalformedNote(format!(
                "note desc too long ({} bytes)",
                n_descsz
            )));
        }

        let name_start = offset + NOTE_HEADER_SIZE;
        let name_end = name_start + n_namesz as usize;
        let name_bytes = data.get(name_start..name_end).ok_or_else(|| {
            ElfError::MalformedNote(format!("missing note name (want {} bytes)", n_namesz))
        })?;
        let len = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let name = std::str::from_utf8(&name_bytes[..len]).unwrap_or("");

        // Padding after the name is relative to the start of the record
        let desc_start = align_up((NOTE_HEADER_SIZE + n_namesz as usize) as u64, alignment)
            .and_then(|field| usize::try_from(field).ok())
            .and_then(|field| offset.checked_add(field));
        let desc = desc_start
            .and_then(|start| data.get(start..start.checked_add(n_descsz as usize)?))
            .ok_or_else(|| {
                ElfError::MalformedNote(format!("missing desc (want {} bytes)", n_descsz))
            })?;

        notes.push(Note { n_type, name, desc });

        // An absurd alignment pushes the next record past the end of the data
        let next = align_up(n_descsz as u64, alignment)
            .and_then(|field| usize::try_from(field).ok())
            .zip(desc_start)
            .and_then(|(field, start)| start.checked_add(field));
        match next {
            Some(next) => offset = next,
            None => break,
        }
    }

    Ok(notes)
}
