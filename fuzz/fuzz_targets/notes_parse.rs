#![no_main]
use libfuzzer_sys::fuzz_target;

use buildid::formats::elf::notes::parse_notes;
use buildid::formats::elf::ElfData;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, notes)) = data.split_first() else {
        return;
    };
    let align = u64::from(selector & 0x0f);
    let endian = if selector & 0x10 == 0 {
        ElfData::Little
    } else {
        ElfData::Big
    };
    let _ = parse_notes(notes, align, endian);
});
