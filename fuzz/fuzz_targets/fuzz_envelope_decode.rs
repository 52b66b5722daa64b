#![no_main]

use libfuzzer_sys::fuzz_target;

use ifit::Envelope;

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = Envelope::decode(data) {
        assert_eq!(envelope.frame_len(), data.len());
    }
});
