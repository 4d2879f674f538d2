//! ELF record types and the constants build ID lookup relies on

use thiserror::Error;

/// Errors from the in-crate ELF reader.
#[derive(Debug, Clone, Error)]
pub enum ElfError {
    #[error("not an ELF image")]
    InvalidMagic,
    #[error("unsupported ELF class {0}")]
    UnsupportedClass(u8),
    #[error("unsupported ELF data encoding {0}")]
    UnsupportedData(u8),
    #[error("offset {offset:#x} out of range")]
    InvalidOffset { offset: usize },
    #[error("truncated at {offset:#x}: needed {needed} bytes")]
    Truncated { offset: usize, needed: usize },
    #[error("malformed ELF header: {0}")]
    MalformedHeader(String),
    #[error("malformed note: {0}")]
    MalformedNote(String),
    #[error("string is not valid UTF-8")]
    InvalidString,
}

pub type Result<T> = std::result::Result<T, ElfError>;

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// ELF class (32-bit or 64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32 = 1,
    Elf64 = 2,
}

impl ElfClass {
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            1 => Ok(ElfClass::Elf32),
            2 => Ok(ElfClass::Elf64),
            _ => Err(ElfError::UnsupportedClass(val)),
        }
    }
}

/// ELF data encoding (endianness)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfData {
    Little = 1,
    Big = 2,
}

impl ElfData {
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            1 => Ok(ElfData::Little),
            2 => Ok(ElfData::Big),
            _ => Err(ElfError::UnsupportedData(val)),
        }
    }
}

/// ELF identification (first 16 bytes)
#[derive(Debug, Clone, Copy)]
pub struct ElfIdent {
    pub class: ElfClass,
    pub data: ElfData,
    pub version: u8,
    pub osabi: u8,
}

/// ELF header
#[derive(Debug, Clone, Copy)]
pub struct ElfHeader {
    pub ident: ElfIdent,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

/// Section header
#[derive(Debug, Clone, Copy)]
pub struct SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_addralign: u64,
}

/// Section types
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;

/// Section flags
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;

/// Program header
#[derive(Debug, Clone, Copy)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

/// Program header types
pub const PT_LOAD: u32 = 1;
pub const PT_NOTE: u32 = 4;

/// Note types
pub const NT_GNU_BUILD_ID: u32 = 3;
pub const NT_GO_BUILD_ID: u32 = 4;

/// Note namespaces
pub const ELF_NOTE_GNU: &str = "GNU";
pub const ELF_NOTE_GO: &str = "Go";

/// A section header with its name and file contents
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub header: SectionHeader,
    pub name: &'a str,
    pub data: &'a [u8],
}

impl<'a> Section<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn size(&self) -> u64 {
        self.header.sh_size
    }

    /// Address alignment, as recorded in the section header.
    pub fn addralign(&self) -> u64 {
        self.header.sh_addralign
    }

    pub fn is_executable(&self) -> bool {
        (self.header.sh_flags & SHF_EXECINSTR) != 0
    }

    pub fn is_note(&self) -> bool {
        self.header.sh_type == SHT_NOTE
    }
}

/// A program header with its file contents
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub header: ProgramHeader,
    pub data: &'a [u8],
}

impl<'a> Segment<'a> {
    pub fn is_note(&self) -> bool {
        self.header.p_type == PT_NOTE
    }
}
