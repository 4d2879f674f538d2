//! ELF (Executable and Linkable Format) parser
//!
//! A zero-copy reader covering what build ID resolution needs: the header,
//! the section table, the program header table and note records.

pub mod headers;
pub mod notes;
pub mod sections;
pub mod segments;
pub mod types;
pub mod utils;

use headers::parse_header;
use sections::SectionTable;
pub use types::*;

/// Main ELF parser
pub struct ElfParser<'data> {
    header: ElfHeader,
    sections: SectionTable<'data>,
}

impl<'data> ElfParser<'data> {
    /// Parse ELF from raw data
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let header = parse_header(data)?;
        let sections = SectionTable::parse(data, &header)?;

        Ok(Self { header, sections })
    }

    /// Get ELF header
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// Byte order of every multi-byte field in the image
    pub fn byte_order(&self) -> ElfData {
        self.header.ident.data
    }

    /// Get sections
    pub fn sections(&self) -> &SectionTable<'data> {
        &self.sections
    }

    /// Look up a section by name
    pub fn section(&self, name: &str) -> Option<Section<'data>> {
        self.sections.by_name(name)
    }
}
