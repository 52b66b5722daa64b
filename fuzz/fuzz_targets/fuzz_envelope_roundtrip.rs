#![no_main]

use libfuzzer_sys::fuzz_target;

use ifit::Envelope;

fuzz_target!(|envelope: Envelope| {
    // Payloads past the length byte's range refuse to encode; everything
    // else must round-trip exactly
    if let Ok(frame) = envelope.encode() {
        let decoded = Envelope::decode(&frame).expect("encoded frame failed to decode");
        assert_eq!(decoded, envelope);
    }
});
