// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for bundle operations.

use crate::diagnostics::TypeMismatchWarning;
use std::io;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Bundle errors.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Strict accessor found a value of another kind.
    #[error("Type mismatch: {0}")]
    TypeMismatch(TypeMismatchWarning),

    /// Caller bug, e.g. merging from an absent bundle.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Decode met a tag number outside the registry (or a reserved one).
    #[error("Unsupported type tag {0} (corrupted stream or newer writer)")]
    UnsupportedTag(i32),

    /// No decoder registered for an opaque object's type name.
    #[error("No opaque decoder registered for type '{0}'")]
    UnknownOpaqueType(String),

    /// Structurally invalid stream (bad length, trailing bytes, ...).
    #[error("Malformed stream: {0}")]
    Malformed(String),

    /// Decode limit exceeded.
    #[error("{what} limit exceeded: {actual} > {max}")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        max: usize,
    },

    /// Error raised by an opaque object's own codec.
    #[error("Opaque codec error for '{type_name}': {source}")]
    Opaque {
        type_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Snapshot envelope is not ours.
    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl BundleError {
    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a malformed stream error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Wrap an opaque implementor's own error.
    pub fn opaque(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Opaque {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// True when the input bytes (not the caller) are at fault.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            BundleError::UnsupportedTag(_)
                | BundleError::Malformed(_)
                | BundleError::Utf8(_)
                | BundleError::InvalidFormat(_)
                | BundleError::ChecksumMismatch { .. }
        ) || matches!(self, BundleError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}
