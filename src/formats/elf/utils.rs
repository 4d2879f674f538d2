//! Utility functions for ELF parsing

use crate::formats::elf::types::{ElfClass, ElfData, ElfError, Result};
use std::iter::StepBy;
use std::ops::Range;

/// Trait for reading values with endianness support
pub trait EndianRead {
    fn read_u16(&self, offset: usize, data: ElfData) -> Result<u16>;
    fn read_u32(&self, offset: usize, data: ElfData) -> Result<u32>;
    fn read_u64(&self, offset: usize, data: ElfData) -> Result<u64>;
}

/// Copy `N` bytes at `offset`, or report how far the read fell short.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| bytes.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ElfError::Truncated { offset, needed: N })
}

impl EndianRead for [u8] {
    fn read_u16(&self, offset: usize, data: ElfData) -> Result<u16> {
        let bytes = read_array::<2>(self, offset)?;
        Ok(match data {
            ElfData::Little => u16::from_le_bytes(bytes),
            ElfData::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&self, offset: usize, data: ElfData) -> Result<u32> {
        let bytes = read_array::<4>(self, offset)?;
        Ok(match data {
            ElfData::Little => u32::from_le_bytes(bytes),
            ElfData::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_u64(&self, offset: usize, data: ElfData) -> Result<u64> {
        let bytes = read_array::<8>(self, offset)?;
        Ok(match data {
            ElfData::Little => u64::from_le_bytes(bytes),
            ElfData::Big => u64::from_be_bytes(bytes),
        })
    }
}

/// Read a null-terminated string from data
pub fn read_cstring(data: &[u8], offset: usize) -> Result<&str> {
    if offset >= data.len() {
        return Err(ElfError::InvalidOffset { offset });
    }

    let slice = &data[offset..];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());

    std::str::from_utf8(&slice[..end]).map_err(|_| ElfError::InvalidString)
}

/// Round `value` up to a multiple of `alignment`, or `None` on overflow.
pub fn align_up(value: u64, alignment: u64) -> Option<u64> {
    if alignment <= 1 {
        return Some(value);
    }
    value
        .checked_add(alignment - 1)
        .map(|v| v / alignment * alignment)
}

/// Borrow `len` bytes at `offset` if the whole range lies inside `data`.
pub fn slice_at(data: &[u8], offset: u64, len: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let len = usize::try_from(len).ok()?;
    data.get(start..start.checked_add(len)?)
}

/// Offsets of the `count` entries of a header table at `offset`.
///
/// The whole table must lie inside `data`.
pub fn table_offsets(
    data: &[u8],
    offset: u64,
    entsize: u16,
    count: u16,
) -> Result<StepBy<Range<usize>>> {
    if entsize == 0 {
        return Err(ElfError::MalformedHeader("zero table entry size".to_string()));
    }
    let start = usize::try_from(offset).map_err(|_| ElfError::InvalidOffset { offset: usize::MAX })?;
    let len = entsize as usize * count as usize;
    match start.checked_add(len) {
        Some(end) if end <= data.len() => Ok((start..end).step_by(entsize as usize)),
        _ => Err(ElfError::Truncated {
            offset: start,
            needed: len,
        }),
    }
}

/// Reads the fields of one header table entry in order.
///
/// Address-sized fields are 4 bytes in ELF32 and 8 bytes in ELF64.
pub struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
    class: ElfClass,
    endian: ElfData,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8], offset: usize, class: ElfClass, endian: ElfData) -> Self {
        Self {
            data,
            offset,
            class,
            endian,
        }
    }

    pub fn u16(&mut self) -> Result<u16> {
        let v = self.data.read_u16(self.offset, self.endian)?;
        self.offset += 2;
        Ok(v)
    }

    pub fn u32(&mut self) -> Result<u32> {
        let v = self.data.read_u32(self.offset, self.endian)?;
        self.offset += 4;
        Ok(v)
    }

    /// An address, offset or size field.
    pub fn word(&mut self) -> Result<u64> {
        match self.class {
            ElfClass::Elf32 => self.u32().map(u64::from),
            ElfClass::Elf64 => {
                let v = self.data.read_u64(self.offset, self.endian)?;
                self.offset += 8;
                Ok(v)
            }
        }
    }
}
