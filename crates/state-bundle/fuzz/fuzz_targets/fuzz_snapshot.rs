// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for snapshot envelopes
//!
//! Arbitrary bytes are checked as a snapshot image. Magic, length and CRC
//! validation must reject garbage without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use state_bundle::{snapshot, DecodeLimits, OpaqueRegistry};

fuzz_target!(|data: &[u8]| {
    let registry = OpaqueRegistry::with_raw_fallback();
    let _ = snapshot::from_bytes(data, &registry, &DecodeLimits::default());

    let mut reader = data;
    let _ = snapshot::read_payload(&mut reader);
});
