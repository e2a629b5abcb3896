// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bundle wire format.
//!
//! ```text
//! stream  := entry_count:i32 (-1 = null bundle), entry*
//! entry   := key:string, tag:i32, payload
//! string  := len:i32 (-1 = null), utf8 bytes
//!
//! payload by tag:
//!   Boolean, Byte        u8
//!   Char                 u32 (unicode scalar)
//!   Short / Int / Long   i16 / i32 / i64
//!   Float / Double       f32 / f64
//!   String, CharSequence string
//!   IntegerList, *Array  len:i32 (-1 = null), element*
//!   StringList,
//!   CharSequenceList     len:i32 (-1 = null), string*
//!   Serializable, Opaque opaque
//!   OpaqueList           len:i32 (-1 = null), opaque*
//!   SparseOpaqueArray    len:i32 (-1 = null), (index:i32, opaque)*
//!   Bundle               stream
//!
//! opaque  := type_name:string (-1 = null value), body_len:i32, body
//! ```
//!
//! All integers are little-endian. Entries are written in insertion order.
//! Tag numbers follow [`TypeTag::to_wire`]; a number outside the table stops
//! the decode with [`BundleError::UnsupportedTag`].

use super::stream::{BundleRead, BundleWrite};
use crate::bundle::StateBundle;
use crate::config::{
    DecodeConfig, DEFAULT_MAX_COLLECTION_LEN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENTRIES,
};
use crate::error::{BundleError, Result};
use crate::opaque::{OpaqueRef, OpaqueRegistry};
use crate::tag::TypeTag;
use crate::value::{BundleValue, SparseOpaqueArray};

/// Upper bound on speculative `Vec` capacity while decoding.
const MAX_PREALLOC: usize = 4096;

/// Resource limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum bundle nesting; the top-level bundle is depth 1.
    pub max_depth: usize,
    /// Maximum entries in one bundle.
    pub max_entries: usize,
    /// Maximum elements in one list/array/sparse map, bytes in one string
    /// (keys and type names included) or opaque body.
    pub max_collection_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
        }
    }
}

impl From<&DecodeConfig> for DecodeLimits {
    fn from(config: &DecodeConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_entries: config.max_entries,
            max_collection_len: config.max_collection_len,
        }
    }
}

/// Encode `bundle` into a fresh buffer.
pub fn encode(bundle: &StateBundle) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(bundle, &mut buf)?;
    log::debug!(
        "[codec] encoded bundle: {} entries, {} bytes",
        bundle.len(),
        buf.len()
    );
    Ok(buf)
}

/// Encode `bundle` onto `out`.
///
/// Opaque encode errors are returned unchanged; `out` may then hold a
/// partial stream.
pub fn encode_into(bundle: &StateBundle, out: &mut dyn BundleWrite) -> Result<()> {
    Encoder { out }.encode_bundle(Some(bundle))
}

/// Decode one bundle from `bytes`, which must contain nothing else.
pub fn decode(bytes: &[u8], registry: &OpaqueRegistry) -> Result<StateBundle> {
    decode_with_limits(bytes, registry, &DecodeLimits::default())
}

/// [`decode`] with explicit limits.
pub fn decode_with_limits(
    bytes: &[u8],
    registry: &OpaqueRegistry,
    limits: &DecodeLimits,
) -> Result<StateBundle> {
    let mut input = bytes;
    let bundle = decode_from(&mut input, registry, limits)?;
    if !input.is_empty() {
        return Err(BundleError::malformed(format!(
            "{} trailing bytes after bundle",
            input.len()
        )));
    }
    log::debug!(
        "[codec] decoded bundle: {} entries from {} bytes",
        bundle.len(),
        bytes.len()
    );
    Ok(bundle)
}

/// Decode one bundle from the front of `input`, leaving the rest unread.
///
/// Nothing is returned on failure: either the whole bundle decodes or the
/// error comes back.
pub fn decode_from(
    input: &mut dyn BundleRead,
    registry: &OpaqueRegistry,
    limits: &DecodeLimits,
) -> Result<StateBundle> {
    let mut decoder = Decoder {
        input,
        registry,
        limits,
    };
    decoder
        .decode_bundle(1)?
        .ok_or_else(|| BundleError::malformed("top-level bundle is null"))
}

struct Encoder<'a> {
    out: &'a mut dyn BundleWrite,
}

impl Encoder<'_> {
    fn encode_bundle(&mut self, bundle: Option<&StateBundle>) -> Result<()> {
        let Some(bundle) = bundle else {
            return self.out.write_len(None);
        };
        self.out.write_len(Some(bundle.len()))?;
        for (key, value) in bundle.iter() {
            self.out.write_string(Some(key))?;
            self.out.write_i32_le(value.tag().to_wire())?;
            self.encode_value(value)?;
        }
        Ok(())
    }

    fn encode_value(&mut self, value: &BundleValue) -> Result<()> {
        match value {
            BundleValue::Boolean(v) => self.out.write_bool(*v),
            BundleValue::Byte(v) => self.out.write_byte(*v),
            BundleValue::Char(v) => self.out.write_u32_le(u32::from(*v)),
            BundleValue::Short(v) => self.out.write_i16_le(*v),
            BundleValue::Int(v) => self.out.write_i32_le(*v),
            BundleValue::Long(v) => self.out.write_i64_le(*v),
            BundleValue::Float(v) => self.out.write_f32_le(*v),
            BundleValue::Double(v) => self.out.write_f64_le(*v),
            BundleValue::String(v) | BundleValue::CharSequence(v) => {
                self.out.write_string(v.as_deref())
            }
            BundleValue::Serializable(v) | BundleValue::Opaque(v) => {
                self.encode_opaque(v.as_ref())
            }
            BundleValue::IntegerList(v) | BundleValue::IntArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_i32_le(*x))
            }
            BundleValue::StringList(v) | BundleValue::CharSequenceList(v) => {
                self.encode_seq(v.as_deref(), |out, s| out.write_string(Some(s.as_str())))
            }
            BundleValue::BooleanArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_bool(*x))
            }
            BundleValue::ByteArray(v) => match v {
                None => self.out.write_len(None),
                Some(bytes) => {
                    self.out.write_len(Some(bytes.len()))?;
                    self.out.write_raw(bytes)
                }
            },
            BundleValue::ShortArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_i16_le(*x))
            }
            BundleValue::CharArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_u32_le(u32::from(*x)))
            }
            BundleValue::LongArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_i64_le(*x))
            }
            BundleValue::FloatArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_f32_le(*x))
            }
            BundleValue::DoubleArray(v) => {
                self.encode_seq(v.as_deref(), |out, x| out.write_f64_le(*x))
            }
            BundleValue::Bundle(v) => self.encode_bundle(v.as_ref()),
            BundleValue::OpaqueList(v) => match v {
                None => self.out.write_len(None),
                Some(items) => {
                    self.out.write_len(Some(items.len()))?;
                    for item in items {
                        self.encode_opaque(Some(item))?;
                    }
                    Ok(())
                }
            },
            BundleValue::SparseOpaqueArray(v) => match v {
                None => self.out.write_len(None),
                Some(map) => {
                    self.out.write_len(Some(map.len()))?;
                    for (index, item) in map {
                        self.out.write_i32_le(*index)?;
                        self.encode_opaque(Some(item))?;
                    }
                    Ok(())
                }
            },
        }
    }

    fn encode_seq<T>(
        &mut self,
        items: Option<&[T]>,
        mut write: impl FnMut(&mut dyn BundleWrite, &T) -> Result<()>,
    ) -> Result<()> {
        let Some(items) = items else {
            return self.out.write_len(None);
        };
        self.out.write_len(Some(items.len()))?;
        for item in items {
            write(&mut *self.out, item)?;
        }
        Ok(())
    }

    /// The body is buffered so its length can precede it.
    fn encode_opaque(&mut self, value: Option<&OpaqueRef>) -> Result<()> {
        let Some(value) = value else {
            return self.out.write_string(None);
        };
        let mut body = Vec::new();
        value.encode(&mut body)?;
        log::trace!(
            "[codec] opaque '{}': {} body bytes",
            value.type_name(),
            body.len()
        );
        self.out.write_string(Some(value.type_name()))?;
        self.out.write_len(Some(body.len()))?;
        self.out.write_raw(&body)
    }
}

struct Decoder<'a> {
    input: &'a mut dyn BundleRead,
    registry: &'a OpaqueRegistry,
    limits: &'a DecodeLimits,
}

impl Decoder<'_> {
    fn decode_bundle(&mut self, depth: usize) -> Result<Option<StateBundle>> {
        if depth > self.limits.max_depth {
            return Err(BundleError::LimitExceeded {
                what: "nesting depth",
                actual: depth,
                max: self.limits.max_depth,
            });
        }
        let Some(count) = self.input.read_len()? else {
            return Ok(None);
        };
        if count > self.limits.max_entries {
            return Err(BundleError::LimitExceeded {
                what: "entry count",
                actual: count,
                max: self.limits.max_entries,
            });
        }

        let mut bundle = StateBundle::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            let key = self
                .read_text()?
                .ok_or_else(|| BundleError::malformed("null entry key"))?;
            let wire = self.input.read_i32_le()?;
            let tag = TypeTag::from_wire(wire).ok_or(BundleError::UnsupportedTag(wire))?;
            let value = self.decode_value(tag, depth)?;
            log::trace!("[codec] entry '{}' ({})", key, tag);
            bundle.put(key, value);
        }
        Ok(Some(bundle))
    }

    fn decode_value(&mut self, tag: TypeTag, depth: usize) -> Result<BundleValue> {
        let value = match tag {
            TypeTag::Boolean => BundleValue::Boolean(self.input.read_bool()?),
            TypeTag::Byte => BundleValue::Byte(self.input.read_byte()?),
            TypeTag::Char => BundleValue::Char(read_char(self.input)?),
            TypeTag::Short => BundleValue::Short(self.input.read_i16_le()?),
            TypeTag::Int => BundleValue::Int(self.input.read_i32_le()?),
            TypeTag::Long => BundleValue::Long(self.input.read_i64_le()?),
            TypeTag::Float => BundleValue::Float(self.input.read_f32_le()?),
            TypeTag::Double => BundleValue::Double(self.input.read_f64_le()?),
            TypeTag::String => BundleValue::String(self.read_text()?),
            TypeTag::CharSequence => BundleValue::CharSequence(self.read_text()?),
            TypeTag::Serializable => BundleValue::Serializable(self.decode_opaque()?),
            TypeTag::IntegerList => {
                BundleValue::IntegerList(self.decode_seq(|input| input.read_i32_le())?)
            }
            TypeTag::StringList => BundleValue::StringList(self.decode_text_seq()?),
            TypeTag::CharSequenceList => BundleValue::CharSequenceList(self.decode_text_seq()?),
            TypeTag::BooleanArray => {
                BundleValue::BooleanArray(self.decode_seq(|input| input.read_bool())?)
            }
            TypeTag::ByteArray => BundleValue::ByteArray(match self.read_len()? {
                None => None,
                Some(len) => Some(self.input.read_raw(len)?),
            }),
            TypeTag::ShortArray => {
                BundleValue::ShortArray(self.decode_seq(|input| input.read_i16_le())?)
            }
            TypeTag::CharArray => BundleValue::CharArray(self.decode_seq(read_char)?),
            TypeTag::IntArray => {
                BundleValue::IntArray(self.decode_seq(|input| input.read_i32_le())?)
            }
            TypeTag::LongArray => {
                BundleValue::LongArray(self.decode_seq(|input| input.read_i64_le())?)
            }
            TypeTag::FloatArray => {
                BundleValue::FloatArray(self.decode_seq(|input| input.read_f32_le())?)
            }
            TypeTag::DoubleArray => {
                BundleValue::DoubleArray(self.decode_seq(|input| input.read_f64_le())?)
            }
            TypeTag::Bundle => BundleValue::Bundle(self.decode_bundle(depth + 1)?),
            TypeTag::Opaque => BundleValue::Opaque(self.decode_opaque()?),
            TypeTag::OpaqueList => BundleValue::OpaqueList(match self.read_len()? {
                None => None,
                Some(len) => {
                    let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
                    for _ in 0..len {
                        items.push(self.decode_present_opaque()?);
                    }
                    Some(items)
                }
            }),
            TypeTag::SparseOpaqueArray => BundleValue::SparseOpaqueArray(match self.read_len()? {
                None => None,
                Some(len) => {
                    let mut map = SparseOpaqueArray::new();
                    for _ in 0..len {
                        let index = self.input.read_i32_le()?;
                        let item = self.decode_present_opaque()?;
                        if map.insert(index, item).is_some() {
                            return Err(BundleError::malformed(format!(
                                "duplicate sparse index {index}"
                            )));
                        }
                    }
                    Some(map)
                }
            }),
        };
        Ok(value)
    }

    /// Collection length prefix, checked against the limit.
    fn read_len(&mut self) -> Result<Option<usize>> {
        let len = self.input.read_len()?;
        if let Some(len) = len {
            if len > self.limits.max_collection_len {
                return Err(BundleError::LimitExceeded {
                    what: "collection length",
                    actual: len,
                    max: self.limits.max_collection_len,
                });
            }
        }
        Ok(len)
    }

    /// Length-prefixed string, its byte length checked like a collection.
    fn read_text(&mut self) -> Result<Option<String>> {
        match self.read_len()? {
            None => Ok(None),
            Some(len) => Ok(Some(String::from_utf8(self.input.read_raw(len)?)?)),
        }
    }

    fn decode_seq<T>(
        &mut self,
        mut read: impl FnMut(&mut dyn BundleRead) -> Result<T>,
    ) -> Result<Option<Vec<T>>> {
        let Some(len) = self.read_len()? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            items.push(read(&mut *self.input)?);
        }
        Ok(Some(items))
    }

    fn decode_text_seq(&mut self) -> Result<Option<Vec<String>>> {
        let Some(len) = self.read_len()? else {
            return Ok(None);
        };
        let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let item = self
                .read_text()?
                .ok_or_else(|| BundleError::malformed("null element in string list"))?;
            items.push(item);
        }
        Ok(Some(items))
    }

    fn decode_present_opaque(&mut self) -> Result<OpaqueRef> {
        self.decode_opaque()?
            .ok_or_else(|| BundleError::malformed("null element in opaque collection"))
    }

    /// The registered decoder must consume exactly `body_len` bytes.
    fn decode_opaque(&mut self) -> Result<Option<OpaqueRef>> {
        let Some(type_name) = self.read_text()? else {
            return Ok(None);
        };
        let body_len = self
            .read_len()?
            .ok_or_else(|| BundleError::malformed(format!("opaque '{type_name}' has null body")))?;
        let body = self.input.read_raw(body_len)?;

        let mut body_input: &[u8] = &body;
        let value = self.registry.decode(&type_name, &mut body_input)?;
        if !body_input.is_empty() {
            return Err(BundleError::malformed(format!(
                "opaque '{}' left {} of {} body bytes unread",
                type_name,
                body_input.len(),
                body_len
            )));
        }
        Ok(Some(value))
    }
}

fn read_char(input: &mut dyn BundleRead) -> Result<char> {
    let scalar = input.read_u32_le()?;
    char::from_u32(scalar)
        .ok_or_else(|| BundleError::malformed(format!("invalid char scalar {scalar:#x}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opaque::RawOpaque;
    use crate::tag::RESERVED_WIRE_TAGS;
    use std::sync::Arc;

    fn one_entry(tag: i32, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_len(Some(1)).expect("write");
        buf.write_string(Some("k")).expect("write");
        buf.write_i32_le(tag).expect("write");
        buf.write_raw(payload).expect("write");
        buf
    }

    #[test]
    fn test_empty_bundle_layout() {
        let bytes = encode(&StateBundle::new()).expect("encode");
        assert_eq!(bytes, [0, 0, 0, 0]);
        let decoded = decode(&bytes, &OpaqueRegistry::new()).expect("decode");
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_int_entry_layout() {
        let mut bundle = StateBundle::new();
        bundle.put_int("k", 0x0102_0304);
        let bytes = encode(&bundle).expect("encode");
        assert_eq!(bytes, one_entry(4, &[0x04, 0x03, 0x02, 0x01]));
    }

    #[test]
    fn test_scalar_and_array_round_trip() {
        let mut bundle = StateBundle::new();
        bundle
            .put_boolean("b", true)
            .put_char("c", '\u{1F600}')
            .put_long("l", -1)
            .put_byte_array("bytes", vec![0u8, 255])
            .put_char_array("chars", ['a', 'ß'])
            .put_float_array("f", [1.5f32, -0.0])
            .put_string_list("names", ["x", ""]);
        bundle.put_null("nothing", TypeTag::LongArray).expect("reference");

        let bytes = encode(&bundle).expect("encode");
        let decoded = decode(&bytes, &OpaqueRegistry::new()).expect("decode");
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.keys().collect::<Vec<_>>(), bundle.keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_unknown_and_reserved_tags_rejected() {
        for wire in RESERVED_WIRE_TAGS.into_iter().chain([31, 99, -5]) {
            let bytes = one_entry(wire, &[0; 8]);
            let err = decode(&bytes, &OpaqueRegistry::new()).unwrap_err();
            assert!(matches!(err, BundleError::UnsupportedTag(n) if n == wire), "{wire}");
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&StateBundle::new()).expect("encode");
        bytes.push(0);
        let err = decode(&bytes, &OpaqueRegistry::new()).unwrap_err();
        assert!(matches!(err, BundleError::Malformed(_)));

        let mut input: &[u8] = &bytes;
        let bundle = decode_from(&mut input, &OpaqueRegistry::new(), &DecodeLimits::default())
            .expect("prefix decode");
        assert!(bundle.is_empty());
        assert_eq!(input, [0]);
    }

    #[test]
    fn test_truncated_stream() {
        let mut bundle = StateBundle::new();
        bundle.put_string("k", "some text").put_long("n", 7);
        let bytes = encode(&bundle).expect("encode");
        for cut in 0..bytes.len() {
            let err = decode(&bytes[..cut], &OpaqueRegistry::new()).unwrap_err();
            assert!(err.is_corruption(), "cut at {cut}: {err}");
        }
    }

    #[test]
    fn test_null_nested_bundle() {
        let mut bundle = StateBundle::new();
        bundle.put_null("inner", TypeTag::Bundle).expect("reference");
        let bytes = encode(&bundle).expect("encode");
        let decoded = decode(&bytes, &OpaqueRegistry::new()).expect("decode");
        assert!(decoded.get_value("inner").is_some_and(BundleValue::is_null));
    }

    #[test]
    fn test_top_level_null_is_malformed() {
        let bytes = (-1i32).to_le_bytes();
        let err = decode(&bytes, &OpaqueRegistry::new()).unwrap_err();
        assert!(matches!(err, BundleError::Malformed(_)));
    }

    #[test]
    fn test_depth_limit() {
        let mut bundle = StateBundle::new();
        for _ in 0..4 {
            let mut outer = StateBundle::new();
            outer.put_bundle("inner", bundle);
            bundle = outer;
        }
        let bytes = encode(&bundle).expect("encode");
        let limits = DecodeLimits {
            max_depth: 4,
            ..DecodeLimits::default()
        };
        let err = decode_with_limits(&bytes, &OpaqueRegistry::new(), &limits).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 5, max: 4, .. }));

        let limits = DecodeLimits {
            max_depth: 5,
            ..DecodeLimits::default()
        };
        assert!(decode_with_limits(&bytes, &OpaqueRegistry::new(), &limits).is_ok());
    }

    #[test]
    fn test_collection_limit() {
        let mut bundle = StateBundle::new();
        bundle.put_int_array("a", vec![0; 10]);
        let bytes = encode(&bundle).expect("encode");
        let limits = DecodeLimits {
            max_collection_len: 9,
            ..DecodeLimits::default()
        };
        let err = decode_with_limits(&bytes, &OpaqueRegistry::new(), &limits).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 10, .. }));
    }

    #[test]
    fn test_string_lengths_follow_collection_limit() {
        let limits = DecodeLimits {
            max_collection_len: 10,
            ..DecodeLimits::default()
        };
        let registry = OpaqueRegistry::with_raw_fallback();
        let decode_one = |bundle: &StateBundle| {
            let bytes = encode(bundle).expect("encode");
            decode_with_limits(&bytes, &registry, &limits)
        };

        let mut value = StateBundle::new();
        value.put_string("s", "x".repeat(100));
        let err = decode_one(&value).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 100, max: 10, .. }));

        let mut key = StateBundle::new();
        key.put_int("k".repeat(100), 1);
        let err = decode_one(&key).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 100, .. }));

        let mut element = StateBundle::new();
        element.put_string_list("names", vec!["ok".to_string(), "y".repeat(50)]);
        let err = decode_one(&element).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 50, .. }));

        let mut opaque = StateBundle::new();
        opaque.put_opaque("o", Arc::new(RawOpaque::new("n".repeat(20), vec![])));
        let err = decode_one(&opaque).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 20, .. }));

        let mut fits = StateBundle::new();
        fits.put_string("s", "x".repeat(10));
        assert_eq!(decode_one(&fits).expect("at the limit"), fits);
    }

    #[test]
    fn test_string_length_checked_before_reading() {
        // Key length claims i32::MAX bytes; nothing after it.
        let mut bytes = Vec::new();
        bytes.write_len(Some(1)).expect("write");
        bytes.write_i32_le(i32::MAX).expect("write");
        let err = decode(&bytes, &OpaqueRegistry::new()).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { .. }));
    }

    #[test]
    fn test_entry_limit() {
        let bundle: StateBundle = (0..3i32).map(|i| (format!("k{i}"), i)).collect();
        let bytes = encode(&bundle).expect("encode");
        let limits = DecodeLimits {
            max_entries: 2,
            ..DecodeLimits::default()
        };
        let err = decode_with_limits(&bytes, &OpaqueRegistry::new(), &limits).unwrap_err();
        assert!(matches!(err, BundleError::LimitExceeded { actual: 3, max: 2, .. }));
    }

    #[test]
    fn test_opaque_framing_and_raw_fallback() {
        let raw: OpaqueRef = Arc::new(RawOpaque::new("vendor.Blob", vec![7, 8, 9]));
        let mut bundle = StateBundle::new();
        bundle.put_opaque("o", Arc::clone(&raw));

        let bytes = encode(&bundle).expect("encode");
        let err = decode(&bytes, &OpaqueRegistry::new()).unwrap_err();
        assert!(matches!(err, BundleError::UnknownOpaqueType(ref name) if name == "vendor.Blob"));

        let decoded = decode(&bytes, &OpaqueRegistry::with_raw_fallback()).expect("decode");
        assert_eq!(decoded, bundle);
        assert_eq!(encode(&decoded).expect("re-encode"), bytes);
    }

    #[test]
    fn test_opaque_body_must_be_consumed() {
        let mut registry = OpaqueRegistry::new();
        registry.register("short.Reader", |input| {
            input.read_byte()?;
            Ok(Arc::new(RawOpaque::new("short.Reader", vec![])) as OpaqueRef)
        });

        let mut bundle = StateBundle::new();
        bundle.put_opaque("o", Arc::new(RawOpaque::new("short.Reader", vec![1, 2])));
        let bytes = encode(&bundle).expect("encode");
        let err = decode(&bytes, &registry).unwrap_err();
        assert!(matches!(err, BundleError::Malformed(_)));
    }

    #[test]
    fn test_invalid_char_scalar() {
        let bytes = one_entry(2, &0xD800u32.to_le_bytes());
        let err = decode(&bytes, &OpaqueRegistry::new()).unwrap_err();
        assert!(matches!(err, BundleError::Malformed(_)));
    }

    #[test]
    fn test_limits_from_config() {
        let config = DecodeConfig {
            max_depth: 3,
            max_entries: 10,
            max_collection_len: 100,
        };
        let limits = DecodeLimits::from(&config);
        assert_eq!(limits.max_depth, 3);
        assert_eq!(limits.max_entries, 10);
        assert_eq!(limits.max_collection_len, 100);
        assert_eq!(DecodeLimits::from(&DecodeConfig::default()), DecodeLimits::default());
    }
}
