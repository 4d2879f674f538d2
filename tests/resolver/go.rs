use buildid::{build_id_from_path, hashing::xxh64_hex, Resolver, ResolverConfig, Strategy};

use crate::common::{
    go_raw_marker, write_temp, ElfBuilder, NT_GNU_BUILD_ID, NT_GO_BUILD_ID, SHF_ALLOC, SHT_NOTE,
};

const CODE: &[u8] = b"\x90\x90\xc3";

/// Image with an empty `.note.go.buildid`, so only the file reader can succeed.
fn empty_go_section() -> ElfBuilder {
    ElfBuilder::new()
        .section(".note.go.buildid", SHT_NOTE, SHF_ALLOC, &[])
        .text(CODE)
}

#[test]
fn go_note_resolves_to_hex() {
    let file = ElfBuilder::new()
        .go_note_section(&[0xde, 0xad, 0xbe, 0xef])
        .text(CODE)
        .write();

    assert_eq!(build_id_from_path(file.path()).unwrap(), "deadbeef");

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::GoNote);
}

#[test]
fn go_note_wins_over_gnu_note() {
    let file = ElfBuilder::new()
        .gnu_note_section(&[1, 2, 3, 4])
        .go_note_section(b"go-id")
        .text(CODE)
        .write();

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::GoNote);
    assert_eq!(resolution.build_id.to_hex(), hex::encode("go-id"));
}

#[test]
fn go_note_without_code_section_never_hashes() {
    let file = ElfBuilder::new().go_note_section(&[0xde, 0xad, 0xbe, 0xef]).write();
    assert_eq!(build_id_from_path(file.path()).unwrap(), "deadbeef");
}

#[test]
fn go_reader_finds_note_segment() {
    let file = empty_go_section()
        .note_segment(&[("Go", NT_GO_BUILD_ID, b"abc/def")])
        .write();

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::GoReader);
    assert_eq!(resolution.build_id.to_hex(), hex::encode("abc/def"));
}

#[test]
fn go_reader_prefers_go_note_over_gccgo_note() {
    let file = empty_go_section()
        .note_segment(&[("GNU", NT_GNU_BUILD_ID, &[0xaa, 0xbb])])
        .note_segment(&[("Go", NT_GO_BUILD_ID, b"from-go")])
        .write();

    let id = build_id_from_path(file.path()).unwrap();
    assert_eq!(id, hex::encode("from-go"));
}

#[test]
fn go_reader_falls_back_to_gccgo_note() {
    let file = empty_go_section()
        .note_segment(&[("GNU", NT_GNU_BUILD_ID, &[0xaa, 0xbb, 0xcc])])
        .write();

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::GoReader);
    assert_eq!(resolution.build_id.to_hex(), "aabbcc");
}

#[test]
fn go_reader_finds_raw_marker() {
    let file = empty_go_section().raw(&go_raw_marker("abc/def")).write();

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::GoReader);
    assert_eq!(resolution.build_id.to_hex(), hex::encode("abc/def"));
}

#[test]
fn go_section_skips_gnu_fast_path() {
    // The GNU note is still found, but only by the container lookup
    let file = empty_go_section().gnu_note_section(&[9, 8, 7]).write();

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::Container);
    assert_eq!(resolution.build_id.to_hex(), "090807");
}

#[test]
fn go_note_in_big_endian_image() {
    let file = ElfBuilder::new_elf32_be()
        .go_note_section(&[0xca, 0xfe])
        .text(CODE)
        .write();

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::GoNote);
    assert_eq!(resolution.build_id.to_hex(), "cafe");
}

#[test]
fn go_reader_note_segment_in_big_endian_image() {
    let file = ElfBuilder::new_elf32_be()
        .section(".note.go.buildid", SHT_NOTE, SHF_ALLOC, &[])
        .note_segment(&[("Go", NT_GO_BUILD_ID, b"be")])
        .write();

    assert_eq!(build_id_from_path(file.path()).unwrap(), hex::encode("be"));
}

#[test]
fn unreadable_note_segment_falls_through() {
    let mut image = empty_go_section()
        .note_segment(&[("GNU", NT_GNU_BUILD_ID, &[0xaa, 0xbb, 0xcc])])
        .build();

    // Point the segment at the last 8 bytes, short of a whole note
    let p_offset = 64 + 8;
    let past_end = image.len() as u64 - 8;
    image[p_offset..p_offset + 8].copy_from_slice(&past_end.to_le_bytes());
    let file = write_temp(&image);

    let resolution = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(resolution.strategy, Strategy::Fingerprint);
    assert_eq!(resolution.build_id.to_hex(), xxh64_hex(CODE));
}

#[test]
fn program_headers_beyond_scan_limit_fall_through() {
    let file = empty_go_section()
        .gnu_note_section(&[1, 2, 3])
        .note_segment(&[("Go", NT_GO_BUILD_ID, b"abc/def")])
        .write();

    let full = Resolver::default().resolve_path(file.path()).unwrap();
    assert_eq!(full.strategy, Strategy::GoReader);

    // Only the ELF header fits in the scanned prefix
    let header_only = Resolver::new(ResolverConfig {
        go_scan_limit: 64,
        ..ResolverConfig::default()
    })
    .resolve_path(file.path())
    .unwrap();
    assert_eq!(header_only.strategy, Strategy::Container);
    assert_eq!(header_only.build_id.to_hex(), "010203");
}
