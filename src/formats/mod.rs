//! Container format readers.

pub mod elf;
