//! Go build ID reader working on the file itself.
//!
//! The Go linker records its build ID in several places: a `PT_NOTE` segment
//! (ELF), and as a quoted string near the start of the text segment on every
//! platform. gccgo only emits a GNU build ID note. This reader looks at the
//! first `go_scan_limit` bytes of the file and tries, in order:
//!
//! 1. `"Go"` notes of type 4 in `PT_NOTE` segments,
//! 2. `"GNU"` notes of type 3 in the same segments,
//! 3. the raw `\xff Go build ID: "..."\n \xff` marker.

use memchr::memmem;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

use crate::config::ResolverConfig;
use crate::error::{BuildIdError, Result, Stage};
use crate::formats::elf::headers::parse_header;
use crate::formats::elf::notes::parse_notes_with_limit;
use crate::formats::elf::segments::SegmentTable;
use crate::formats::elf::{ElfData, ELF_MAGIC};
use crate::io::read_prefix;

use super::notes::{is_gnu_build_id, is_go_build_id};

const ARCHIVE_MAGIC: &[u8] = b"!<arch>\n";
const GO_BUILD_PREFIX: &[u8] = b"\xff Go build ID: \"";
const GO_BUILD_END: &[u8] = b"\"\n \xff";

/// Smallest `PT_NOTE` segment that can hold a build ID note.
const MIN_NOTE_SEGMENT: u64 = 16;

/// Reads the Go build ID of the file at `path`.
///
/// A Go build ID is returned as its text bytes; a gccgo GNU build ID as the
/// raw descriptor bytes.
pub fn read_file(path: &Path, config: &ResolverConfig) -> Result<Vec<u8>> {
    let data = read_prefix(path, config.go_scan_limit)
        .map_err(|e| BuildIdError::io(Stage::GoReader, path, e))?;

    if data.starts_with(ARCHIVE_MAGIC) {
        return Err(BuildIdError::IdentifierNotFound {
            section: "archive".to_string(),
        });
    }

    if data.starts_with(ELF_MAGIC) {
        if let Some(id) = read_elf_notes(path, &data, config)? {
            return non_empty(id);
        }
    }

    non_empty(read_raw(&data)?)
}

fn non_empty(id: Vec<u8>) -> Result<Vec<u8>> {
    if id.is_empty() {
        Err(BuildIdError::EmptyIdentifier)
    } else {
        Ok(id)
    }
}

/// Walks the `PT_NOTE` segments described by the header in `prefix`.
fn read_elf_notes(path: &Path, prefix: &[u8], config: &ResolverConfig) -> Result<Option<Vec<u8>>> {
    let malformed = |e: crate::formats::elf::ElfError| BuildIdError::MalformedIdentifier(e.to_string());
    let header = parse_header(prefix).map_err(malformed)?;
    let segments = SegmentTable::parse(prefix, &header).map_err(malformed)?;
    let endian = header.ident.data;

    let mut gnu = None;
    for segment in segments.note_segments() {
        let filesz = segment.header.p_filesz;
        if filesz < MIN_NOTE_SEGMENT || filesz > u64::from(config.max_note_size) {
            continue;
        }

        // Some linkers place notes past the scanned prefix
        let owned;
        let bytes = if segment.data.is_empty() {
            owned = read_segment(path, segment.header.p_offset, filesz)?;
            &owned[..]
        } else {
            segment.data
        };

        match scan_note_segment(bytes, segment.header.p_align, endian, config) {
            NoteScan::Go(id) => return Ok(Some(id)),
            NoteScan::Gnu(id) => gnu = gnu.or(Some(id)),
            NoteScan::Nothing => {}
        }
    }

    Ok(gnu)
}

enum NoteScan {
    Go(Vec<u8>),
    Gnu(Vec<u8>),
    Nothing,
}

fn scan_note_segment(bytes: &[u8], align: u64, endian: ElfData, config: &ResolverConfig) -> NoteScan {
    // A segment that does not decode cleanly is skipped, not fatal
    let Ok(notes) = parse_notes_with_limit(bytes, align, endian, config.max_note_size) else {
        trace!(len = bytes.len(), "Skipping undecodable note segment");
        return NoteScan::Nothing;
    };

    let mut found = NoteScan::Nothing;
    for note in &notes {
        if is_go_build_id(note) {
            return NoteScan::Go(note.desc.to_vec());
        }
        if is_gnu_build_id(note) {
            found = NoteScan::Gnu(note.desc.to_vec());
        }
    }
    found
}

fn read_segment(path: &Path, offset: u64, len: u64) -> Result<Vec<u8>> {
    let io_err = |e| BuildIdError::io(Stage::GoReader, path, e);
    let mut file = File::open(path).map_err(io_err)?;
    file.seek(SeekFrom::Start(offset)).map_err(io_err)?;
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).map_err(io_err)?;
    Ok(buf)
}

/// Finds the quoted build ID that follows the raw marker.
pub fn read_raw(data: &[u8]) -> Result<Vec<u8>> {
    let Some(start) = memmem::find(data, GO_BUILD_PREFIX) else {
        return Err(BuildIdError::IdentifierNotFound {
            section: "file prefix".to_string(),
        });
    };
    let body = start + GO_BUILD_PREFIX.len();
    let Some(len) = memmem::find(&data[body..], GO_BUILD_END) else {
        return Err(BuildIdError::MalformedIdentifier(
            "unterminated Go build ID".to_string(),
        ));
    };
    unquote(&data[body..body + len])
}

/// Decodes the body of a Go string literal.
fn unquote(body: &[u8]) -> Result<Vec<u8>> {
    let bad = |what: &str| BuildIdError::MalformedIdentifier(format!("{} in Go build ID", what));

    let mut out = Vec::with_capacity(body.len());
    let mut bytes = body.iter().copied();
    while let Some(b) = bytes.next() {
        match b {
            b'"' | b'\n' => return Err(bad("unescaped quote or newline")),
            b'\\' => match bytes.next() {
                Some(b'\\') => out.push(b'\\'),
                Some(b'"') => out.push(b'"'),
                Some(b'n') => out.push(b'\n'),
                Some(b't') => out.push(b'\t'),
                Some(b'x') => {
                    let hi = bytes.next().and_then(hex_value);
                    let lo = bytes.next().and_then(hex_value);
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                        _ => return Err(bad("invalid \\x escape")),
                    }
                }
                _ => return Err(bad("unsupported escape")),
            },
            other => out.push(other),
        }
    }
    Ok(out)
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|v| v as u8)
}
