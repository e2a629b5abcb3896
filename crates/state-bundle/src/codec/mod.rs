// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary codec.
//!
//! - [`stream`]: primitive transport traits over `std::io`.
//! - [`wire`]: the bundle stream grammar (entry count, then key/tag/payload
//!   per entry, nested bundles recursing into the same grammar).

pub mod stream;
pub mod wire;

pub use stream::{BundleRead, BundleWrite, NULL_LENGTH};
pub use wire::{decode, decode_from, decode_with_limits, encode, encode_into, DecodeLimits};
