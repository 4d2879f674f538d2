//! Common test utilities and helpers.
//!
//! [`ElfBuilder`] synthesizes small but well-formed ELF images: named
//! sections, note sections, `PT_NOTE` segments and raw trailing bytes, in
//! either 64-bit little-endian or 32-bit big-endian layout.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_NOTE: u32 = 7;
pub const SHT_NOBITS: u32 = 8;
pub const SHF_ALLOC: u64 = 0x2;
pub const SHF_EXECINSTR: u64 = 0x4;
pub const PT_NOTE: u32 = 4;

pub const NT_GNU_BUILD_ID: u32 = 3;
pub const NT_GO_BUILD_ID: u32 = 4;

/// Raw Go build ID marker as the Go linker lays it out in the text segment.
pub fn go_raw_marker(id: &str) -> Vec<u8> {
    let mut out = b"\xff Go build ID: \"".to_vec();
    out.extend_from_slice(id.as_bytes());
    out.extend_from_slice(b"\"\n \xff");
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Layout {
    Elf64Le,
    Elf32Be,
}

struct SectionSpec {
    name: String,
    sh_type: u32,
    flags: u64,
    align: u64,
    size: u64,
    data: Vec<u8>,
}

struct SegmentSpec {
    align: u64,
    data: Vec<u8>,
}

/// Builder for synthetic ELF files.
pub struct ElfBuilder {
    layout: Layout,
    sections: Vec<SectionSpec>,
    segments: Vec<SegmentSpec>,
    raw: Vec<u8>,
}

impl ElfBuilder {
    /// 64-bit little-endian x86-64 image.
    pub fn new() -> Self {
        Self::with_layout(Layout::Elf64Le)
    }

    /// 32-bit big-endian PowerPC image.
    pub fn new_elf32_be() -> Self {
        Self::with_layout(Layout::Elf32Be)
    }

    fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            sections: Vec::new(),
            segments: Vec::new(),
            raw: Vec::new(),
        }
    }

    fn big_endian(&self) -> bool {
        self.layout == Layout::Elf32Be
    }

    /// Encodes one note record in this image's byte order.
    pub fn note(&self, name: &str, n_type: u32, desc: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        self.put_u32(&mut out, name.len() as u32 + 1);
        self.put_u32(&mut out, desc.len() as u32);
        self.put_u32(&mut out, n_type);
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        pad_to(&mut out, 4);
        out.extend_from_slice(desc);
        pad_to(&mut out, 4);
        out
    }

    pub fn section(mut self, name: &str, sh_type: u32, flags: u64, data: &[u8]) -> Self {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            sh_type,
            flags,
            align: if sh_type == SHT_NOTE { 4 } else { 16 },
            size: data.len() as u64,
            data: data.to_vec(),
        });
        self
    }

    /// `SHT_NOBITS` section of `size` bytes with nothing stored in the file.
    pub fn nobits(mut self, name: &str, flags: u64, size: u64) -> Self {
        self.sections.push(SectionSpec {
            name: name.to_string(),
            sh_type: SHT_NOBITS,
            flags,
            align: 16,
            size,
            data: Vec::new(),
        });
        self
    }

    /// Executable `.text` section.
    pub fn text(self, code: &[u8]) -> Self {
        self.section(".text", SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR, code)
    }

    /// Note section holding the given `(name, type, desc)` records.
    pub fn note_section(self, section: &str, notes: &[(&str, u32, &[u8])]) -> Self {
        let data = self.encode_notes(notes);
        self.section(section, SHT_NOTE, SHF_ALLOC, &data)
    }

    pub fn go_note_section(self, desc: &[u8]) -> Self {
        self.note_section(".note.go.buildid", &[("Go", NT_GO_BUILD_ID, desc)])
    }

    pub fn gnu_note_section(self, desc: &[u8]) -> Self {
        self.note_section(".note.gnu.build-id", &[("GNU", NT_GNU_BUILD_ID, desc)])
    }

    /// `PT_NOTE` segment holding the given records, not covered by any section.
    pub fn note_segment(mut self, notes: &[(&str, u32, &[u8])]) -> Self {
        let data = self.encode_notes(notes);
        self.segments.push(SegmentSpec { align: 4, data });
        self
    }

    /// Bytes placed in the file outside every section and segment.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.raw.extend_from_slice(bytes);
        self
    }

    fn encode_notes(&self, notes: &[(&str, u32, &[u8])]) -> Vec<u8> {
        notes
            .iter()
            .flat_map(|(name, n_type, desc)| self.note(name, *n_type, desc))
            .collect()
    }

    pub fn build(&self) -> Vec<u8> {
        let is64 = self.layout == Layout::Elf64Le;
        let (ehsize, phentsize, shentsize) = if is64 { (64, 56, 64) } else { (52, 32, 40) };

        // Section names: null name at 0, then every section, then .shstrtab
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for s in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(s.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let phoff = ehsize;
        let mut out = vec![0u8; ehsize + phentsize * self.segments.len()];

        out.extend_from_slice(&self.raw);

        let mut section_offsets = Vec::new();
        for s in &self.sections {
            pad_to(&mut out, 16);
            section_offsets.push(out.len() as u64);
            out.extend_from_slice(&s.data);
        }

        let mut segment_offsets = Vec::new();
        for seg in &self.segments {
            pad_to(&mut out, 8);
            segment_offsets.push(out.len() as u64);
            out.extend_from_slice(&seg.data);
        }

        pad_to(&mut out, 8);
        let shstrtab_offset = out.len() as u64;
        out.extend_from_slice(&shstrtab);

        pad_to(&mut out, 8);
        let shoff = out.len();
        let shnum = self.sections.len() + 2;

        // Section header table
        let mut table = vec![0u8; shentsize];
        for (i, s) in self.sections.iter().enumerate() {
            self.put_section_header(
                &mut table,
                name_offsets[i],
                s.sh_type,
                s.flags,
                section_offsets[i],
                s.size,
                s.align,
            );
        }
        self.put_section_header(
            &mut table,
            shstrtab_name,
            SHT_STRTAB,
            0,
            shstrtab_offset,
            shstrtab.len() as u64,
            1,
        );
        out.extend_from_slice(&table);

        // Program header table
        let mut phdrs = Vec::new();
        for (seg, offset) in self.segments.iter().zip(&segment_offsets) {
            self.put_program_header(&mut phdrs, *offset, seg.data.len() as u64, seg.align);
        }
        out[phoff..phoff + phdrs.len()].copy_from_slice(&phdrs);

        // ELF header
        let mut header = Vec::new();
        header.extend_from_slice(b"\x7fELF");
        header.push(if is64 { 2 } else { 1 });
        header.push(if self.big_endian() { 2 } else { 1 });
        header.push(1);
        header.resize(16, 0);
        self.put_u16(&mut header, 3); // ET_DYN
        self.put_u16(&mut header, if is64 { 62 } else { 20 });
        self.put_u32(&mut header, 1);
        self.put_word(&mut header, 0); // e_entry
        self.put_word(&mut header, if self.segments.is_empty() { 0 } else { phoff as u64 });
        self.put_word(&mut header, shoff as u64);
        self.put_u32(&mut header, 0); // e_flags
        self.put_u16(&mut header, ehsize as u16);
        self.put_u16(&mut header, phentsize as u16);
        self.put_u16(&mut header, self.segments.len() as u16);
        self.put_u16(&mut header, shentsize as u16);
        self.put_u16(&mut header, shnum as u16);
        self.put_u16(&mut header, (shnum - 1) as u16);
        assert_eq!(header.len(), ehsize);
        out[..ehsize].copy_from_slice(&header);

        out
    }

    /// Writes the image to a temporary file.
    pub fn write(&self) -> NamedTempFile {
        write_temp(&self.build())
    }

    #[allow(clippy::too_many_arguments)]
    fn put_section_header(
        &self,
        out: &mut Vec<u8>,
        name: u32,
        sh_type: u32,
        flags: u64,
        offset: u64,
        size: u64,
        align: u64,
    ) {
        self.put_u32(out, name);
        self.put_u32(out, sh_type);
        self.put_word(out, flags);
        self.put_word(out, 0); // sh_addr
        self.put_word(out, offset);
        self.put_word(out, size);
        self.put_u32(out, 0); // sh_link
        self.put_u32(out, 0); // sh_info
        self.put_word(out, align);
        self.put_word(out, 0); // sh_entsize
    }

    fn put_program_header(&self, out: &mut Vec<u8>, offset: u64, size: u64, align: u64) {
        match self.layout {
            Layout::Elf64Le => {
                self.put_u32(out, PT_NOTE);
                self.put_u32(out, 4); // PF_R
                self.put_word(out, offset);
                self.put_word(out, 0);
                self.put_word(out, 0);
                self.put_word(out, size);
                self.put_word(out, size);
                self.put_word(out, align);
            }
            Layout::Elf32Be => {
                self.put_u32(out, PT_NOTE);
                self.put_word(out, offset);
                self.put_word(out, 0);
                self.put_word(out, 0);
                self.put_word(out, size);
                self.put_word(out, size);
                self.put_u32(out, 4);
                self.put_word(out, align);
            }
        }
    }

    fn put_u16(&self, out: &mut Vec<u8>, v: u16) {
        if self.big_endian() {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn put_u32(&self, out: &mut Vec<u8>, v: u32) {
        if self.big_endian() {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Address-sized field: 8 bytes for ELF64, 4 for ELF32.
    fn put_word(&self, out: &mut Vec<u8>, v: u64) {
        match self.layout {
            Layout::Elf64Le => out.extend_from_slice(&v.to_le_bytes()),
            Layout::Elf32Be => out.extend_from_slice(&(v as u32).to_be_bytes()),
        }
    }
}

impl Default for ElfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn pad_to(out: &mut Vec<u8>, align: usize) {
    while out.len() % align != 0 {
        out.push(0);
    }
}

/// Writes `content` to a fresh temporary file.
pub fn write_temp(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}
