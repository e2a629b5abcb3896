// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for bundle stream decoding
//!
//! Feeds arbitrary bytes to the bundle decoder, with and without the raw
//! opaque fallback. Decoding must never panic, and anything that decodes
//! must re-encode to a stream that decodes to an equal bundle.

#![no_main]

use libfuzzer_sys::fuzz_target;
use state_bundle::{codec, DecodeLimits, OpaqueRegistry};

fuzz_target!(|data: &[u8]| {
    let strict = OpaqueRegistry::new();
    let _ = codec::decode(data, &strict);

    let limits = DecodeLimits {
        max_depth: 8,
        max_entries: 256,
        max_collection_len: 1024,
    };
    let passthrough = OpaqueRegistry::with_raw_fallback();
    if let Ok(bundle) = codec::decode_with_limits(data, &passthrough, &limits) {
        let _ = bundle.to_string();
        let _ = bundle.content_hash();

        let bytes = codec::encode(&bundle).expect("decoded bundle must encode");
        let again = codec::decode_with_limits(&bytes, &passthrough, &limits)
            .expect("re-encoded bundle must decode");
        assert_eq!(again, bundle);
    }
});
