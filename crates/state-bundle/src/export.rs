// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Export into a host state bag.
//!
//! Some hosts keep their own native state container. [`StateBundle::copy_to`]
//! walks the bundle once, in insertion order, and makes exactly one
//! tag-specific [`StateBagSink`] call per entry. The export is one-way: a
//! bundle is never rebuilt from a sink.

use crate::bundle::StateBundle;
use crate::opaque::OpaqueRef;
use crate::tag::TypeTag;
use crate::value::{BundleValue, SparseOpaqueArray};
use std::collections::BTreeMap;

/// Write-only host state bag, one method per kind.
///
/// Reference kinds receive `None` for an explicitly stored null.
pub trait StateBagSink {
    fn put_boolean(&mut self, key: &str, value: bool);
    fn put_byte(&mut self, key: &str, value: u8);
    fn put_char(&mut self, key: &str, value: char);
    fn put_short(&mut self, key: &str, value: i16);
    fn put_int(&mut self, key: &str, value: i32);
    fn put_long(&mut self, key: &str, value: i64);
    fn put_float(&mut self, key: &str, value: f32);
    fn put_double(&mut self, key: &str, value: f64);
    fn put_string(&mut self, key: &str, value: Option<&str>);
    fn put_char_sequence(&mut self, key: &str, value: Option<&str>);
    fn put_serializable(&mut self, key: &str, value: Option<&OpaqueRef>);
    fn put_integer_list(&mut self, key: &str, value: Option<&[i32]>);
    fn put_string_list(&mut self, key: &str, value: Option<&[String]>);
    fn put_char_sequence_list(&mut self, key: &str, value: Option<&[String]>);
    fn put_boolean_array(&mut self, key: &str, value: Option<&[bool]>);
    fn put_byte_array(&mut self, key: &str, value: Option<&[u8]>);
    fn put_short_array(&mut self, key: &str, value: Option<&[i16]>);
    fn put_char_array(&mut self, key: &str, value: Option<&[char]>);
    fn put_int_array(&mut self, key: &str, value: Option<&[i32]>);
    fn put_long_array(&mut self, key: &str, value: Option<&[i64]>);
    fn put_float_array(&mut self, key: &str, value: Option<&[f32]>);
    fn put_double_array(&mut self, key: &str, value: Option<&[f64]>);
    fn put_bundle(&mut self, key: &str, value: Option<&StateBundle>);
    fn put_opaque(&mut self, key: &str, value: Option<&OpaqueRef>);
    fn put_opaque_list(&mut self, key: &str, value: Option<&[OpaqueRef]>);
    fn put_sparse_opaque_array(&mut self, key: &str, value: Option<&SparseOpaqueArray>);
}

impl StateBundle {
    /// Emit every entry into `sink`, in insertion order.
    pub fn copy_to<S: StateBagSink + ?Sized>(&self, sink: &mut S) {
        for (key, value) in self.iter() {
            match value {
                BundleValue::Boolean(v) => sink.put_boolean(key, *v),
                BundleValue::Byte(v) => sink.put_byte(key, *v),
                BundleValue::Char(v) => sink.put_char(key, *v),
                BundleValue::Short(v) => sink.put_short(key, *v),
                BundleValue::Int(v) => sink.put_int(key, *v),
                BundleValue::Long(v) => sink.put_long(key, *v),
                BundleValue::Float(v) => sink.put_float(key, *v),
                BundleValue::Double(v) => sink.put_double(key, *v),
                BundleValue::String(v) => sink.put_string(key, v.as_deref()),
                BundleValue::CharSequence(v) => sink.put_char_sequence(key, v.as_deref()),
                BundleValue::Serializable(v) => sink.put_serializable(key, v.as_ref()),
                BundleValue::IntegerList(v) => sink.put_integer_list(key, v.as_deref()),
                BundleValue::StringList(v) => sink.put_string_list(key, v.as_deref()),
                BundleValue::CharSequenceList(v) => {
                    sink.put_char_sequence_list(key, v.as_deref())
                }
                BundleValue::BooleanArray(v) => sink.put_boolean_array(key, v.as_deref()),
                BundleValue::ByteArray(v) => sink.put_byte_array(key, v.as_deref()),
                BundleValue::ShortArray(v) => sink.put_short_array(key, v.as_deref()),
                BundleValue::CharArray(v) => sink.put_char_array(key, v.as_deref()),
                BundleValue::IntArray(v) => sink.put_int_array(key, v.as_deref()),
                BundleValue::LongArray(v) => sink.put_long_array(key, v.as_deref()),
                BundleValue::FloatArray(v) => sink.put_float_array(key, v.as_deref()),
                BundleValue::DoubleArray(v) => sink.put_double_array(key, v.as_deref()),
                BundleValue::Bundle(v) => sink.put_bundle(key, v.as_ref()),
                BundleValue::Opaque(v) => sink.put_opaque(key, v.as_ref()),
                BundleValue::OpaqueList(v) => sink.put_opaque_list(key, v.as_deref()),
                BundleValue::SparseOpaqueArray(v) => {
                    sink.put_sparse_opaque_array(key, v.as_ref())
                }
            }
        }
    }
}

/// Sink that keeps what it receives, keyed by name, plus the call order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: BTreeMap<String, BundleValue>,
    calls: Vec<(String, TypeTag)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.entries.get(key)
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> &BTreeMap<String, BundleValue> {
        &self.entries
    }

    /// `(key, kind)` per call, in call order.
    pub fn calls(&self) -> &[(String, TypeTag)] {
        &self.calls
    }

    fn record(&mut self, key: &str, value: BundleValue) {
        self.calls.push((key.to_string(), value.tag()));
        self.entries.insert(key.to_string(), value);
    }
}

macro_rules! record_copy {
    ($($method:ident, $ty:ty, $variant:ident;)*) => {
        $(
            fn $method(&mut self, key: &str, value: $ty) {
                self.record(key, BundleValue::$variant(value));
            }
        )*
    };
}

macro_rules! record_owned {
    ($($method:ident, $ty:ty, $variant:ident;)*) => {
        $(
            fn $method(&mut self, key: &str, value: Option<$ty>) {
                self.record(key, BundleValue::$variant(value.map(ToOwned::to_owned)));
            }
        )*
    };
}

impl StateBagSink for RecordingSink {
    record_copy! {
        put_boolean, bool, Boolean;
        put_byte, u8, Byte;
        put_char, char, Char;
        put_short, i16, Short;
        put_int, i32, Int;
        put_long, i64, Long;
        put_float, f32, Float;
        put_double, f64, Double;
    }

    record_owned! {
        put_string, &str, String;
        put_char_sequence, &str, CharSequence;
        put_serializable, &OpaqueRef, Serializable;
        put_integer_list, &[i32], IntegerList;
        put_string_list, &[String], StringList;
        put_char_sequence_list, &[String], CharSequenceList;
        put_boolean_array, &[bool], BooleanArray;
        put_byte_array, &[u8], ByteArray;
        put_short_array, &[i16], ShortArray;
        put_char_array, &[char], CharArray;
        put_int_array, &[i32], IntArray;
        put_long_array, &[i64], LongArray;
        put_float_array, &[f32], FloatArray;
        put_double_array, &[f64], DoubleArray;
        put_bundle, &StateBundle, Bundle;
        put_opaque, &OpaqueRef, Opaque;
        put_opaque_list, &[OpaqueRef], OpaqueList;
        put_sparse_opaque_array, &SparseOpaqueArray, SparseOpaqueArray;
    }
}
