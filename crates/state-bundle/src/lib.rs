// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! State Bundle
//!
//! Typed, ordered, heterogeneous key-value container for persisting transient
//! program state across process or view recreation.
//!
//! - Values of 26 kinds ([`TypeTag`]) under string keys, in insertion order
//! - Lenient `get_*` accessors that fall back to a default and report a
//!   [`TypeMismatchWarning`] instead of failing
//! - Strict [`StateBundle::try_get`] for callers who want the error
//! - Append-only binary wire format ([`codec`]) and checksummed snapshot
//!   files ([`snapshot`])
//! - Order-independent equality and hashing
//!
//! # Quick Start
//!
//! ```rust
//! use state_bundle::{codec, OpaqueRegistry, StateBundle};
//!
//! let mut state = StateBundle::new();
//! state.put_string("TEXT", "hello").put_int("cursor", 5);
//!
//! let bytes = codec::encode(&state)?;
//! let restored = codec::decode(&bytes, &OpaqueRegistry::new())?;
//!
//! assert_eq!(restored, state);
//! assert_eq!(restored.get_string("TEXT"), Some("hello"));
//! // Wrong kind: default plus a warning, never a failure.
//! assert_eq!(restored.get_long("TEXT"), 0);
//! # Ok::<(), state_bundle::BundleError>(())
//! ```
//!
//! # Kinds
//!
//! | Kind | Rust type | Wire |
//! |------|-----------|------|
//! | scalars | `bool`, `u8`, `char`, `i16`, `i32`, `i64`, `f32`, `f64` | 0-7 |
//! | text | `String` (string, text sequence) | 8, 9 |
//! | lists | `Vec<i32>`, `Vec<String>` | 11-13 |
//! | arrays | `Vec<bool>` .. `Vec<f64>` | 14-21 |
//! | nested | [`StateBundle`] | 26 |
//! | opaque | [`OpaqueRef`] and collections of it | 10, 27, 29, 30 |

pub mod accessor;
pub mod bundle;
pub mod codec;
pub mod config;
pub mod diagnostics;
mod equality;
pub mod error;
pub mod export;
pub mod opaque;
pub mod snapshot;
pub mod tag;
pub mod value;

pub use accessor::FromBundleValue;
pub use bundle::StateBundle;
pub use codec::{BundleRead, BundleWrite, DecodeLimits};
pub use config::{BundleConfig, ConfigError, DecodeConfig, DiagnosticsConfig, LogLevel};
pub use diagnostics::{capture_mismatches, TypeMismatchWarning};
pub use error::{BundleError, Result};
pub use export::{RecordingSink, StateBagSink};
pub use opaque::{OpaqueObject, OpaqueRef, OpaqueRegistry, OpaqueType, RawOpaque};
pub use tag::TypeTag;
pub use value::{BundleValue, SparseOpaqueArray};
