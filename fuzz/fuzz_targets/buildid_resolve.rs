#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Write;

use buildid::{BinaryImage, Resolver};

fuzz_target!(|data: &[u8]| {
    // Strategies reopen the file by path, so the input has to live on disk
    let Ok(mut file) = tempfile::NamedTempFile::new() else {
        return;
    };
    if file.write_all(data).is_err() {
        return;
    }
    let Ok(image) = BinaryImage::parse(file.path(), data) else {
        return;
    };
    let _ = Resolver::default().resolve(&image);
});
