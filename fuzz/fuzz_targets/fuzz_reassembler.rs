#![no_main]

use libfuzzer_sys::fuzz_target;

use ifit::{Reassembler, MAX_CHUNK};

fuzz_target!(|data: &[u8]| {
    let mut reassembler = Reassembler::new();

    for chunk in data.chunks(MAX_CHUNK) {
        if let Ok(Some(frame)) = reassembler.push(chunk) {
            assert!(frame.len() <= u8::MAX as usize);
            assert!(!reassembler.in_progress());
        }
    }
});
