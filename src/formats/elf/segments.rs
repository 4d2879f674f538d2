//! Program header table

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{slice_at, table_offsets, FieldReader};

/// Program headers in file order.
///
/// `data` may be a prefix of the file: segments whose contents fall outside
/// it get an empty slice, and callers that need them read them separately.
pub struct SegmentTable<'a> {
    headers: Vec<ProgramHeader>,
    data: &'a [u8],
}

impl<'a> SegmentTable<'a> {
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        let headers = if header.e_phnum == 0 || header.e_phoff == 0 {
            Vec::new()
        } else {
            table_offsets(data, header.e_phoff, header.e_phentsize, header.e_phnum)?
                .map(|offset| {
                    read_program_header(data, offset, header.ident.class, header.ident.data)
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self { headers, data })
    }

    /// `PT_NOTE` segments only
    pub fn note_segments(&self) -> impl Iterator<Item = Segment<'a>> + '_ {
        self.segments().filter(Segment::is_note)
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment<'a>> + '_ {
        self.headers.iter().map(move |ph| Segment {
            header: *ph,
            data: slice_at(self.data, ph.p_offset, ph.p_filesz).unwrap_or(&[]),
        })
    }
}

fn read_program_header(
    data: &[u8],
    offset: usize,
    class: ElfClass,
    endian: ElfData,
) -> Result<ProgramHeader> {
    let mut r = FieldReader::new(data, offset, class, endian);
    let p_type = r.u32()?;

    // ELF64 moves p_flags up next to p_type
    match class {
        ElfClass::Elf64 => {
            let p_flags = r.u32()?;
            let p_offset = r.word()?;
            let p_vaddr = r.word()?;
            let _p_paddr = r.word()?;
            let p_filesz = r.word()?;
            let p_memsz = r.word()?;
            let p_align = r.word()?;
            Ok(ProgramHeader {
                p_type,
                p_flags,
                p_offset,
                p_vaddr,
                p_filesz,
                p_memsz,
                p_align,
            })
        }
        ElfClass::Elf32 => {
            let p_offset = r.word()?;
            let p_vaddr = r.word()?;
            let _p_paddr = r.word()?;
            let p_filesz = r.word()?;
            let p_memsz = r.word()?;
            let p_flags = r.u32()?;
            let p_align = r.word()?;
            Ok(ProgramHeader {
                p_type,
                p_flags,
                p_offset,
                p_vaddr,
                p_filesz,
                p_memsz,
                p_align,
            })
        }
    }
}
