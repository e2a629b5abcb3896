// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bundle value types.
//!
//! [`BundleValue`] has exactly one arm per [`TypeTag`], so a stored value
//! always agrees with its tag. Reference-shaped arms hold an `Option`: `None`
//! is an explicitly stored null that still carries its kind.

use crate::bundle::StateBundle;
use crate::opaque::OpaqueRef;
use crate::tag::TypeTag;
use std::collections::BTreeMap;

/// Sparse `i32 -> opaque` mapping, ordered by index.
pub type SparseOpaqueArray = BTreeMap<i32, OpaqueRef>;

/// A value stored in a [`StateBundle`].
#[derive(Debug, Clone)]
pub enum BundleValue {
    // Scalars
    Boolean(bool),
    Byte(u8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),

    // Text and opaque blobs
    String(Option<String>),
    CharSequence(Option<String>),
    Serializable(Option<OpaqueRef>),

    // Lists
    IntegerList(Option<Vec<i32>>),
    StringList(Option<Vec<String>>),
    CharSequenceList(Option<Vec<String>>),

    // Fixed-width arrays
    BooleanArray(Option<Vec<bool>>),
    ByteArray(Option<Vec<u8>>),
    ShortArray(Option<Vec<i16>>),
    CharArray(Option<Vec<char>>),
    IntArray(Option<Vec<i32>>),
    LongArray(Option<Vec<i64>>),
    FloatArray(Option<Vec<f32>>),
    DoubleArray(Option<Vec<f64>>),

    // Containers and opaque objects
    Bundle(Option<StateBundle>),
    Opaque(Option<OpaqueRef>),
    OpaqueList(Option<Vec<OpaqueRef>>),
    SparseOpaqueArray(Option<SparseOpaqueArray>),
}

impl BundleValue {
    /// The tag selected by this arm.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Byte(_) => TypeTag::Byte,
            Self::Char(_) => TypeTag::Char,
            Self::Short(_) => TypeTag::Short,
            Self::Int(_) => TypeTag::Int,
            Self::Long(_) => TypeTag::Long,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::String(_) => TypeTag::String,
            Self::CharSequence(_) => TypeTag::CharSequence,
            Self::Serializable(_) => TypeTag::Serializable,
            Self::IntegerList(_) => TypeTag::IntegerList,
            Self::StringList(_) => TypeTag::StringList,
            Self::CharSequenceList(_) => TypeTag::CharSequenceList,
            Self::BooleanArray(_) => TypeTag::BooleanArray,
            Self::ByteArray(_) => TypeTag::ByteArray,
            Self::ShortArray(_) => TypeTag::ShortArray,
            Self::CharArray(_) => TypeTag::CharArray,
            Self::IntArray(_) => TypeTag::IntArray,
            Self::LongArray(_) => TypeTag::LongArray,
            Self::FloatArray(_) => TypeTag::FloatArray,
            Self::DoubleArray(_) => TypeTag::DoubleArray,
            Self::Bundle(_) => TypeTag::Bundle,
            Self::Opaque(_) => TypeTag::Opaque,
            Self::OpaqueList(_) => TypeTag::OpaqueList,
            Self::SparseOpaqueArray(_) => TypeTag::SparseOpaqueArray,
        }
    }

    /// Explicitly stored null of the given kind. Scalars have no null and
    /// yield `None`.
    pub fn null_of(tag: TypeTag) -> Option<Self> {
        let value = match tag {
            TypeTag::String => Self::String(None),
            TypeTag::CharSequence => Self::CharSequence(None),
            TypeTag::Serializable => Self::Serializable(None),
            TypeTag::IntegerList => Self::IntegerList(None),
            TypeTag::StringList => Self::StringList(None),
            TypeTag::CharSequenceList => Self::CharSequenceList(None),
            TypeTag::BooleanArray => Self::BooleanArray(None),
            TypeTag::ByteArray => Self::ByteArray(None),
            TypeTag::ShortArray => Self::ShortArray(None),
            TypeTag::CharArray => Self::CharArray(None),
            TypeTag::IntArray => Self::IntArray(None),
            TypeTag::LongArray => Self::LongArray(None),
            TypeTag::FloatArray => Self::FloatArray(None),
            TypeTag::DoubleArray => Self::DoubleArray(None),
            TypeTag::Bundle => Self::Bundle(None),
            TypeTag::Opaque => Self::Opaque(None),
            TypeTag::OpaqueList => Self::OpaqueList(None),
            TypeTag::SparseOpaqueArray => Self::SparseOpaqueArray(None),
            TypeTag::Boolean
            | TypeTag::Byte
            | TypeTag::Char
            | TypeTag::Short
            | TypeTag::Int
            | TypeTag::Long
            | TypeTag::Float
            | TypeTag::Double => return None,
        };
        Some(value)
    }

    /// True for an explicitly stored null.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Boolean(_)
            | Self::Byte(_)
            | Self::Char(_)
            | Self::Short(_)
            | Self::Int(_)
            | Self::Long(_)
            | Self::Float(_)
            | Self::Double(_) => false,
            Self::String(v) | Self::CharSequence(v) => v.is_none(),
            Self::Serializable(v) | Self::Opaque(v) => v.is_none(),
            Self::IntegerList(v) | Self::IntArray(v) => v.is_none(),
            Self::StringList(v) | Self::CharSequenceList(v) => v.is_none(),
            Self::BooleanArray(v) => v.is_none(),
            Self::ByteArray(v) => v.is_none(),
            Self::ShortArray(v) => v.is_none(),
            Self::CharArray(v) => v.is_none(),
            Self::LongArray(v) => v.is_none(),
            Self::FloatArray(v) => v.is_none(),
            Self::DoubleArray(v) => v.is_none(),
            Self::Bundle(v) => v.is_none(),
            Self::OpaqueList(v) => v.is_none(),
            Self::SparseOpaqueArray(v) => v.is_none(),
        }
    }

    /// Element count for lists, arrays, sparse maps and nested bundles.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::IntegerList(v) | Self::IntArray(v) => v.as_ref().map(Vec::len),
            Self::StringList(v) | Self::CharSequenceList(v) => v.as_ref().map(Vec::len),
            Self::BooleanArray(v) => v.as_ref().map(Vec::len),
            Self::ByteArray(v) => v.as_ref().map(Vec::len),
            Self::ShortArray(v) => v.as_ref().map(Vec::len),
            Self::CharArray(v) => v.as_ref().map(Vec::len),
            Self::LongArray(v) => v.as_ref().map(Vec::len),
            Self::FloatArray(v) => v.as_ref().map(Vec::len),
            Self::DoubleArray(v) => v.as_ref().map(Vec::len),
            Self::OpaqueList(v) => v.as_ref().map(Vec::len),
            Self::SparseOpaqueArray(v) => v.as_ref().map(BTreeMap::len),
            Self::Bundle(v) => v.as_ref().map(StateBundle::len),
            _ => None,
        }
    }
}

// Conversion traits: each Rust type maps to exactly one tag.
macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for BundleValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(bool, Boolean);
impl_from_scalar!(u8, Byte);
impl_from_scalar!(char, Char);
impl_from_scalar!(i16, Short);
impl_from_scalar!(i32, Int);
impl_from_scalar!(i64, Long);
impl_from_scalar!(f32, Float);
impl_from_scalar!(f64, Double);

macro_rules! impl_from_reference {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for BundleValue {
            fn from(v: $ty) -> Self {
                Self::$variant(Some(v))
            }
        }

        impl From<Option<$ty>> for BundleValue {
            fn from(v: Option<$ty>) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_reference!(String, String);
impl_from_reference!(Vec<String>, StringList);
impl_from_reference!(Vec<bool>, BooleanArray);
impl_from_reference!(Vec<u8>, ByteArray);
impl_from_reference!(Vec<i16>, ShortArray);
impl_from_reference!(Vec<char>, CharArray);
impl_from_reference!(Vec<i32>, IntArray);
impl_from_reference!(Vec<i64>, LongArray);
impl_from_reference!(Vec<f32>, FloatArray);
impl_from_reference!(Vec<f64>, DoubleArray);
impl_from_reference!(StateBundle, Bundle);
impl_from_reference!(OpaqueRef, Opaque);
impl_from_reference!(Vec<OpaqueRef>, OpaqueList);
impl_from_reference!(SparseOpaqueArray, SparseOpaqueArray);

impl From<&str> for BundleValue {
    fn from(v: &str) -> Self {
        Self::String(Some(v.to_string()))
    }
}
