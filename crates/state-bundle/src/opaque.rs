// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque objects.
//!
//! An opaque object is an externally-defined value the bundle stores and
//! forwards but never inspects. It brings its own codec:
//!
//! - encoding is a method on the value ([`OpaqueObject::encode`]),
//! - decoding is a function registered by type name in an
//!   [`OpaqueRegistry`], which the bundle decoder consults when it meets the
//!   name on the wire.
//!
//! Bundles hold opaque objects through [`OpaqueRef`] (`Arc`), so copying a
//! bundle shares them instead of cloning them.
//!
//! # Example
//!
//! ```rust
//! use state_bundle::opaque::{opaque_eq_by_value, opaque_hash_by_value};
//! use state_bundle::{BundleRead, BundleWrite, OpaqueObject, OpaqueRegistry, OpaqueType, Result};
//!
//! #[derive(Debug, PartialEq, Hash)]
//! struct Point { x: i32, y: i32 }
//!
//! impl OpaqueObject for Point {
//!     fn type_name(&self) -> &str { Self::TYPE_NAME }
//!     fn encode(&self, out: &mut dyn BundleWrite) -> Result<()> {
//!         out.write_i32_le(self.x)?;
//!         out.write_i32_le(self.y)
//!     }
//!     fn opaque_eq(&self, other: &dyn OpaqueObject) -> bool { opaque_eq_by_value(self, other) }
//!     fn opaque_hash(&self) -> u64 { opaque_hash_by_value(self) }
//! }
//!
//! impl OpaqueType for Point {
//!     const TYPE_NAME: &'static str = "example.Point";
//!     fn decode(input: &mut dyn BundleRead) -> Result<Self> {
//!         Ok(Point { x: input.read_i32_le()?, y: input.read_i32_le()? })
//!     }
//! }
//!
//! let mut registry = OpaqueRegistry::new();
//! registry.register_type::<Point>();
//! assert!(registry.contains("example.Point"));
//! ```

use crate::codec::{BundleRead, BundleWrite};
use crate::error::{BundleError, Result};
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to an opaque object.
pub type OpaqueRef = Arc<dyn OpaqueObject>;

/// Upcast helpers, implemented for every `Any + Send + Sync` type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Encode capability and identity of an opaque value.
pub trait OpaqueObject: AsAny + fmt::Debug {
    /// Name written on the wire and used to find the decoder.
    fn type_name(&self) -> &str;

    /// Write the object's body. Errors are propagated to the bundle encoder's
    /// caller unchanged.
    fn encode(&self, out: &mut dyn BundleWrite) -> Result<()>;

    /// Object equality. Defaults to identity (same allocation).
    fn opaque_eq(&self, other: &dyn OpaqueObject) -> bool {
        std::ptr::eq(
            self.as_any() as *const dyn Any as *const u8,
            other.as_any() as *const dyn Any as *const u8,
        )
    }

    /// Hash consistent with [`OpaqueObject::opaque_eq`]. Defaults to the
    /// object's address.
    fn opaque_hash(&self) -> u64 {
        self.as_any() as *const dyn Any as *const u8 as usize as u64
    }
}

/// Decode side of an opaque type, for [`OpaqueRegistry::register_type`].
pub trait OpaqueType: OpaqueObject + Sized {
    const TYPE_NAME: &'static str;

    fn decode(input: &mut dyn BundleRead) -> Result<Self>;
}

/// Value equality for implementors that derive `PartialEq`.
pub fn opaque_eq_by_value<T: PartialEq + 'static>(this: &T, other: &dyn OpaqueObject) -> bool {
    other
        .as_any()
        .downcast_ref::<T>()
        .is_some_and(|other| this == other)
}

/// Value hash for implementors that derive `Hash`.
pub fn opaque_hash_by_value<T: Hash>(this: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    this.hash(&mut hasher);
    hasher.finish()
}

/// Compare two shared opaque handles.
pub fn opaque_ref_eq(a: &OpaqueRef, b: &OpaqueRef) -> bool {
    Arc::ptr_eq(a, b) || a.opaque_eq(b.as_ref())
}

/// Downcast a shared opaque handle to its concrete type.
pub fn downcast_opaque<T: OpaqueObject>(value: &OpaqueRef) -> Option<Arc<T>> {
    Arc::clone(value).into_any_arc().downcast::<T>().ok()
}

/// Decoder for one opaque type name.
pub type OpaqueDecodeFn = Arc<dyn Fn(&mut dyn BundleRead) -> Result<OpaqueRef> + Send + Sync>;

/// Decoder used for type names without a registered decoder.
pub type OpaqueFallbackFn =
    Arc<dyn Fn(&str, &mut dyn BundleRead) -> Result<OpaqueRef> + Send + Sync>;

/// Opaque decoders keyed by type name.
#[derive(Clone, Default)]
pub struct OpaqueRegistry {
    decoders: HashMap<String, OpaqueDecodeFn>,
    fallback: Option<OpaqueFallbackFn>,
}

impl OpaqueRegistry {
    /// Empty registry: decoding any opaque object fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that decodes unknown types into [`RawOpaque`], keeping the
    /// body bytes so the value re-encodes identically.
    pub fn with_raw_fallback() -> Self {
        let mut registry = Self::new();
        registry.set_fallback(|type_name, input| {
            let mut body = Vec::new();
            std::io::copy(&mut ReadAdapter(input), &mut body)?;
            Ok(Arc::new(RawOpaque::new(type_name, body)) as OpaqueRef)
        });
        registry
    }

    /// Register a decoder closure. Replaces any decoder for the same name.
    pub fn register<F>(&mut self, type_name: impl Into<String>, decode: F) -> &mut Self
    where
        F: Fn(&mut dyn BundleRead) -> Result<OpaqueRef> + Send + Sync + 'static,
    {
        self.decoders.insert(type_name.into(), Arc::new(decode));
        self
    }

    /// Register a type implementing [`OpaqueType`].
    pub fn register_type<T: OpaqueType>(&mut self) -> &mut Self {
        self.register(T::TYPE_NAME, |input| {
            T::decode(input).map(|value| Arc::new(value) as OpaqueRef)
        })
    }

    /// Decoder for names nobody registered.
    pub fn set_fallback<F>(&mut self, decode: F) -> &mut Self
    where
        F: Fn(&str, &mut dyn BundleRead) -> Result<OpaqueRef> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(decode));
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode one body. Decoder errors are returned unchanged.
    pub fn decode(&self, type_name: &str, input: &mut dyn BundleRead) -> Result<OpaqueRef> {
        if let Some(decode) = self.decoders.get(type_name) {
            return decode(input);
        }
        match &self.fallback {
            Some(fallback) => {
                log::debug!("[OpaqueRegistry] no decoder for '{}', using fallback", type_name);
                fallback(type_name, input)
            }
            None => Err(BundleError::UnknownOpaqueType(type_name.to_string())),
        }
    }
}

impl fmt::Debug for OpaqueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("OpaqueRegistry")
            .field("types", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Opaque object kept as its type name and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawOpaque {
    type_name: String,
    body: Vec<u8>,
}

impl RawOpaque {
    pub fn new(type_name: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            type_name: type_name.into(),
            body,
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl OpaqueObject for RawOpaque {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn encode(&self, out: &mut dyn BundleWrite) -> Result<()> {
        out.write_raw(&self.body)
    }

    fn opaque_eq(&self, other: &dyn OpaqueObject) -> bool {
        opaque_eq_by_value(self, other)
    }

    fn opaque_hash(&self) -> u64 {
        opaque_hash_by_value(self)
    }
}

/// Byte-at-a-time `Read` view over a `dyn BundleRead`; bodies are already
/// bounded by their length prefix.
struct ReadAdapter<'a>(&'a mut dyn BundleRead);

impl std::io::Read for ReadAdapter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.0.read_byte() {
            Ok(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            Err(BundleError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(0),
            Err(BundleError::Io(e)) => Err(e),
            Err(other) => Err(std::io::Error::new(std::io::ErrorKind::Other, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Hash)]
    struct Tag(u32);

    impl OpaqueObject for Tag {
        fn type_name(&self) -> &str {
            Self::TYPE_NAME
        }

        fn encode(&self, out: &mut dyn BundleWrite) -> Result<()> {
            out.write_u32_le(self.0)
        }

        fn opaque_eq(&self, other: &dyn OpaqueObject) -> bool {
            opaque_eq_by_value(self, other)
        }

        fn opaque_hash(&self) -> u64 {
            opaque_hash_by_value(self)
        }
    }

    impl OpaqueType for Tag {
        const TYPE_NAME: &'static str = "test.Tag";

        fn decode(input: &mut dyn BundleRead) -> Result<Self> {
            Ok(Tag(input.read_u32_le()?))
        }
    }

    #[derive(Debug)]
    struct Handle;

    impl OpaqueObject for Handle {
        fn type_name(&self) -> &str {
            "test.Handle"
        }

        fn encode(&self, _out: &mut dyn BundleWrite) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_value_equality() {
        let a: OpaqueRef = Arc::new(Tag(7));
        let b: OpaqueRef = Arc::new(Tag(7));
        let c: OpaqueRef = Arc::new(Tag(8));
        assert!(opaque_ref_eq(&a, &b));
        assert!(!opaque_ref_eq(&a, &c));
        assert_eq!(a.opaque_hash(), b.opaque_hash());
    }

    #[test]
    fn test_identity_equality_default() {
        let a: OpaqueRef = Arc::new(Handle);
        let b: OpaqueRef = Arc::new(Handle);
        assert!(opaque_ref_eq(&a, &Arc::clone(&a)));
        assert!(!a.opaque_eq(b.as_ref()));
    }

    #[test]
    fn test_cross_type_is_unequal() {
        let tag: OpaqueRef = Arc::new(Tag(1));
        let raw: OpaqueRef = Arc::new(RawOpaque::new("test.Tag", vec![1, 0, 0, 0]));
        assert!(!opaque_ref_eq(&tag, &raw));
    }

    #[test]
    fn test_registry_decode_and_downcast() {
        let mut registry = OpaqueRegistry::new();
        registry.register_type::<Tag>();
        assert_eq!(registry.len(), 1);

        let mut input: &[u8] = &[42, 0, 0, 0];
        let value = registry.decode("test.Tag", &mut input).expect("decode");
        let tag = downcast_opaque::<Tag>(&value).expect("downcast");
        assert_eq!(*tag, Tag(42));
        assert!(downcast_opaque::<RawOpaque>(&value).is_none());
    }

    #[test]
    fn test_unknown_type() {
        let registry = OpaqueRegistry::new();
        let mut input: &[u8] = &[];
        let err = registry.decode("nope", &mut input).unwrap_err();
        assert!(matches!(err, BundleError::UnknownOpaqueType(name) if name == "nope"));
    }

    #[test]
    fn test_raw_fallback_keeps_body() {
        let registry = OpaqueRegistry::with_raw_fallback();
        let mut input: &[u8] = &[1, 2, 3];
        let value = registry.decode("vendor.Thing", &mut input).expect("decode");
        assert_eq!(value.type_name(), "vendor.Thing");

        let mut out = Vec::new();
        value.encode(&mut out).expect("encode");
        assert_eq!(out, [1, 2, 3]);
    }
}
