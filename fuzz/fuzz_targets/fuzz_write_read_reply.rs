#![no_main]

use std::collections::BTreeSet;

use libfuzzer_sys::fuzz_target;

use ifit::{catalog, WriteReadReply};

fuzz_target!(|data: &[u8]| {
    let reads: BTreeSet<u8> = catalog::iter_sorted_by_id().map(|c| c.id()).collect();

    if let Ok(reply) = WriteReadReply::parse(data, &reads) {
        assert_eq!(reply.values().len(), reads.len());
    }
});
