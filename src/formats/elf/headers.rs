//! ELF header parsing

use crate::formats::elf::types::*;
use crate::formats::elf::utils::FieldReader;

/// Parse ELF identification bytes
pub fn parse_ident(data: &[u8]) -> Result<ElfIdent> {
    if data.len() < 16 {
        return Err(ElfError::Truncated {
            offset: 0,
            needed: 16,
        });
    }

    // Check magic
    if &data[0..4] != ELF_MAGIC {
        return Err(ElfError::InvalidMagic);
    }

    let class = ElfClass::from_u8(data[4])?;
    let data_encoding = ElfData::from_u8(data[5])?;

    Ok(ElfIdent {
        class,
        data: data_encoding,
        version: data[6],
        osabi: data[7],
    })
}

/// Size in bytes of the ELF header and of one program/section header entry.
fn layout(class: ElfClass) -> (usize, u16, u16) {
    match class {
        ElfClass::Elf32 => (52, 32, 40),
        ElfClass::Elf64 => (64, 56, 64),
    }
}

/// Parse ELF header
pub fn parse_header(data: &[u8]) -> Result<ElfHeader> {
    let ident = parse_ident(data)?;
    let (header_size, phentsize, shentsize) = layout(ident.class);

    if data.len() < header_size {
        return Err(ElfError::Truncated {
            offset: 0,
            needed: header_size,
        });
    }

    let mut r = FieldReader::new(data, 16, ident.class, ident.data);
    let e_type = r.u16()?;
    let e_machine = r.u16()?;
    let _e_version = r.u32()?;
    let _e_entry = r.word()?;
    let e_phoff = r.word()?;
    let e_shoff = r.word()?;
    let _e_flags = r.u32()?;
    let _e_ehsize = r.u16()?;
    let e_phentsize = r.u16()?;
    let e_phnum = r.u16()?;
    let e_shentsize = r.u16()?;
    let e_shnum = r.u16()?;
    let e_shstrndx = r.u16()?;

    // Entry sizes only matter when the table exists
    for (table, count, actual, expected) in [
        ("program", e_phnum, e_phentsize, phentsize),
        ("section", e_shnum, e_shentsize, shentsize),
    ] {
        if count > 0 && actual != expected {
            return Err(ElfError::MalformedHeader(format!(
                "{} header entry size {} (expected {})",
                table, actual, expected
            )));
        }
    }

    Ok(ElfHeader {
        ident,
        e_type,
        e_machine,
        e_phoff,
        e_shoff,
        e_phentsize,
        e_phnum,
        e_shentsize,
        e_shnum,
        e_shstrndx,
    })
}
