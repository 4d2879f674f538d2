//! Section header table

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_cstring, slice_at, table_offsets, FieldReader};
use std::collections::HashMap;

/// Sections of an image with their names and contents resolved up front.
pub struct SectionTable<'a> {
    entries: Vec<Section<'a>>,
    by_name: HashMap<&'a str, usize>,
}

impl<'a> SectionTable<'a> {
    /// Reads the section header table described by `header`.
    ///
    /// An image without a table (`e_shoff` or `e_shnum` of zero) yields an
    /// empty table. Names that cannot be read resolve to `""`.
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        if header.e_shnum == 0 || header.e_shoff == 0 {
            return Ok(Self {
                entries: Vec::new(),
                by_name: HashMap::new(),
            });
        }

        let headers = table_offsets(data, header.e_shoff, header.e_shentsize, header.e_shnum)?
            .map(|offset| read_section_header(data, offset, header.ident.class, header.ident.data))
            .collect::<Result<Vec<_>>>()?;

        let names = headers
            .get(header.e_shstrndx as usize)
            .and_then(|strtab| slice_at(data, strtab.sh_offset, strtab.sh_size))
            .unwrap_or(&[]);

        let entries: Vec<Section<'a>> = headers
            .into_iter()
            .map(|sh| Section {
                name: read_cstring(names, sh.sh_name as usize).unwrap_or(""),
                data: section_contents(data, &sh),
                header: sh,
            })
            .collect();

        // Duplicate names resolve to the first section carrying them
        let mut by_name = HashMap::new();
        for (i, section) in entries.iter().enumerate() {
            if !section.name.is_empty() {
                by_name.entry(section.name).or_insert(i);
            }
        }

        Ok(Self { entries, by_name })
    }

    pub fn by_name(&self, name: &str) -> Option<Section<'a>> {
        self.by_name.get(name).map(|&i| self.entries[i])
    }

    /// Names of all sections, in header order
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|section| section.name)
    }
}

// NOBITS sections and sections pointing outside the file have no contents
fn section_contents<'a>(data: &'a [u8], sh: &SectionHeader) -> &'a [u8] {
    if sh.sh_type == SHT_NOBITS {
        return &[];
    }
    slice_at(data, sh.sh_offset, sh.sh_size).unwrap_or(&[])
}

fn read_section_header(
    data: &[u8],
    offset: usize,
    class: ElfClass,
    endian: ElfData,
) -> Result<SectionHeader> {
    let mut r = FieldReader::new(data, offset, class, endian);
    let sh_name = r.u32()?;
    let sh_type = r.u32()?;
    let sh_flags = r.word()?;
    let sh_addr = r.word()?;
    let sh_offset = r.word()?;
    let sh_size = r.word()?;
    let _sh_link = r.u32()?;
    let _sh_info = r.u32()?;
    let sh_addralign = r.word()?;

    Ok(SectionHeader {
        sh_name,
        sh_type,
        sh_flags,
        sh_addr,
        sh_offset,
        sh_size,
        sh_addralign,
    })
}
