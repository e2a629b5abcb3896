// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed accessors.
//!
//! Every storable kind gets a `get_x` / `get_x_or` / `put_x` triple:
//!
//! | stored                | `get_x`             | `get_x_or(default)` |
//! |-----------------------|---------------------|---------------------|
//! | absent                | zero / `None`       | `default`           |
//! | same kind             | value               | value               |
//! | same kind, null       | `None`              | `default`           |
//! | other kind            | zero / `None` + warning | `default` + warning |
//!
//! A kind mismatch is never an error here: a
//! [`TypeMismatchWarning`](crate::TypeMismatchWarning) is reported through
//! [`diagnostics`](crate::diagnostics) and the default comes back. Callers who
//! want a hard failure use [`StateBundle::try_get`].
//!
//! The text-sequence accessors also accept a stored string. All other
//! accessors require the exact kind.

use crate::bundle::StateBundle;
use crate::diagnostics::{self, TypeMismatchWarning};
use crate::error::{BundleError, Result};
use crate::opaque::{downcast_opaque, OpaqueObject, OpaqueRef};
use crate::tag::TypeTag;
use crate::value::{BundleValue, SparseOpaqueArray};
use std::fmt;
use std::sync::Arc;

/// Rendering of an absent default in mismatch reports.
const NULL_DEFAULT: &str = "<null>";

impl StateBundle {
    /// Look `key` up and view it with `extract`.
    ///
    /// `None` when the key is absent or `extract` rejects the stored kind; the
    /// latter is reported as a mismatch with `render_default` describing what
    /// the caller falls back to.
    fn view<'a, R>(
        &'a self,
        key: &str,
        expected: TypeTag,
        extract: impl FnOnce(&'a BundleValue) -> Option<R>,
        render_default: impl FnOnce() -> String,
    ) -> Option<R> {
        let value = self.get_value(key)?;
        let actual = value.tag();
        let viewed = extract(value);
        if viewed.is_none() {
            diagnostics::report(TypeMismatchWarning {
                key: key.to_string(),
                expected,
                actual,
                default: render_default(),
            });
        }
        viewed
    }
}

macro_rules! scalar_accessors {
    ($($get:ident, $get_or:ident, $put:ident, $ty:ty, $variant:ident, $zero:expr;)*) => {
        impl StateBundle {
            $(
                #[doc = concat!("Value at `key` as `", stringify!($ty), "`, or `", stringify!($zero), "`.")]
                pub fn $get(&self, key: &str) -> $ty {
                    self.$get_or(key, $zero)
                }

                #[doc = concat!("Value at `key` as `", stringify!($ty), "`, or `default`.")]
                pub fn $get_or(&self, key: &str, default: $ty) -> $ty {
                    self.view(
                        key,
                        TypeTag::$variant,
                        |value| match value {
                            BundleValue::$variant(v) => Some(*v),
                            _ => None,
                        },
                        || format!("{default:?}"),
                    )
                    .unwrap_or(default)
                }

                pub fn $put(&mut self, key: impl Into<String>, value: $ty) -> &mut Self {
                    self.put(key, BundleValue::$variant(value))
                }
            )*
        }
    };
}

scalar_accessors! {
    get_boolean, get_boolean_or, put_boolean, bool, Boolean, false;
    get_byte, get_byte_or, put_byte, u8, Byte, 0;
    get_char, get_char_or, put_char, char, Char, '\0';
    get_short, get_short_or, put_short, i16, Short, 0;
    get_int, get_int_or, put_int, i32, Int, 0;
    get_long, get_long_or, put_long, i64, Long, 0;
    get_float, get_float_or, put_float, f32, Float, 0.0;
    get_double, get_double_or, put_double, f64, Double, 0.0;
}

macro_rules! slice_accessors {
    ($($get:ident, $get_or:ident, $put:ident, $elem:ty, $variant:ident;)*) => {
        impl StateBundle {
            $(
                pub fn $get(&self, key: &str) -> Option<&[$elem]> {
                    self.view(
                        key,
                        TypeTag::$variant,
                        |value| match value {
                            BundleValue::$variant(v) => Some(v.as_deref()),
                            _ => None,
                        },
                        || NULL_DEFAULT.to_string(),
                    )
                    .flatten()
                }

                pub fn $get_or<'a>(&'a self, key: &str, default: &'a [$elem]) -> &'a [$elem] {
                    self.view(
                        key,
                        TypeTag::$variant,
                        |value| match value {
                            BundleValue::$variant(v) => Some(v.as_deref()),
                            _ => None,
                        },
                        || format!("{default:?}"),
                    )
                    .flatten()
                    .unwrap_or(default)
                }

                pub fn $put(
                    &mut self,
                    key: impl Into<String>,
                    value: impl Into<Vec<$elem>>,
                ) -> &mut Self {
                    self.put(key, BundleValue::$variant(Some(value.into())))
                }
            )*
        }
    };
}

slice_accessors! {
    get_integer_list, get_integer_list_or, put_integer_list, i32, IntegerList;
    get_boolean_array, get_boolean_array_or, put_boolean_array, bool, BooleanArray;
    get_byte_array, get_byte_array_or, put_byte_array, u8, ByteArray;
    get_short_array, get_short_array_or, put_short_array, i16, ShortArray;
    get_char_array, get_char_array_or, put_char_array, char, CharArray;
    get_int_array, get_int_array_or, put_int_array, i32, IntArray;
    get_long_array, get_long_array_or, put_long_array, i64, LongArray;
    get_float_array, get_float_array_or, put_float_array, f32, FloatArray;
    get_double_array, get_double_array_or, put_double_array, f64, DoubleArray;
    get_opaque_list, get_opaque_list_or, put_opaque_list, OpaqueRef, OpaqueList;
}

macro_rules! text_list_accessors {
    ($($get:ident, $get_or:ident, $put:ident, $variant:ident;)*) => {
        impl StateBundle {
            $(
                pub fn $get(&self, key: &str) -> Option<&[String]> {
                    self.view(
                        key,
                        TypeTag::$variant,
                        |value| match value {
                            BundleValue::$variant(v) => Some(v.as_deref()),
                            _ => None,
                        },
                        || NULL_DEFAULT.to_string(),
                    )
                    .flatten()
                }

                pub fn $get_or<'a>(&'a self, key: &str, default: &'a [String]) -> &'a [String] {
                    self.view(
                        key,
                        TypeTag::$variant,
                        |value| match value {
                            BundleValue::$variant(v) => Some(v.as_deref()),
                            _ => None,
                        },
                        || format!("{default:?}"),
                    )
                    .flatten()
                    .unwrap_or(default)
                }

                pub fn $put<S: Into<String>>(
                    &mut self,
                    key: impl Into<String>,
                    values: impl IntoIterator<Item = S>,
                ) -> &mut Self {
                    let values = values.into_iter().map(Into::into).collect();
                    self.put(key, BundleValue::$variant(Some(values)))
                }
            )*
        }
    };
}

text_list_accessors! {
    get_string_list, get_string_list_or, put_string_list, StringList;
    get_char_sequence_list, get_char_sequence_list_or, put_char_sequence_list, CharSequenceList;
}

impl StateBundle {
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.view(key, TypeTag::String, string_view, || NULL_DEFAULT.to_string())
            .flatten()
    }

    pub fn get_string_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.view(key, TypeTag::String, string_view, || format!("{default:?}"))
            .flatten()
            .unwrap_or(default)
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key, BundleValue::String(Some(value.into())))
    }

    /// Text at `key`. A stored string is accepted as a text sequence.
    pub fn get_char_sequence(&self, key: &str) -> Option<&str> {
        self.view(key, TypeTag::CharSequence, char_sequence_view, || {
            NULL_DEFAULT.to_string()
        })
        .flatten()
    }

    pub fn get_char_sequence_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.view(key, TypeTag::CharSequence, char_sequence_view, || {
            format!("{default:?}")
        })
        .flatten()
        .unwrap_or(default)
    }

    pub fn put_char_sequence(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.put(key, BundleValue::CharSequence(Some(value.into())))
    }

    pub fn get_bundle(&self, key: &str) -> Option<&StateBundle> {
        self.view(key, TypeTag::Bundle, bundle_view, || NULL_DEFAULT.to_string())
            .flatten()
    }

    pub fn get_bundle_or<'a>(&'a self, key: &str, default: &'a StateBundle) -> &'a StateBundle {
        self.view(key, TypeTag::Bundle, bundle_view, || default.to_string())
            .flatten()
            .unwrap_or(default)
    }

    pub fn put_bundle(&mut self, key: impl Into<String>, value: StateBundle) -> &mut Self {
        self.put(key, BundleValue::Bundle(Some(value)))
    }

    /// Opaque object at `key`. The handle is shared with the bundle.
    pub fn get_opaque(&self, key: &str) -> Option<OpaqueRef> {
        self.view(key, TypeTag::Opaque, opaque_view, || NULL_DEFAULT.to_string())
            .flatten()
    }

    pub fn get_opaque_or(&self, key: &str, default: OpaqueRef) -> OpaqueRef {
        self.view(key, TypeTag::Opaque, opaque_view, || format!("{default:?}"))
            .flatten()
            .unwrap_or(default)
    }

    pub fn put_opaque(&mut self, key: impl Into<String>, value: OpaqueRef) -> &mut Self {
        self.put(key, BundleValue::Opaque(Some(value)))
    }

    pub fn get_serializable(&self, key: &str) -> Option<OpaqueRef> {
        self.view(key, TypeTag::Serializable, serializable_view, || {
            NULL_DEFAULT.to_string()
        })
        .flatten()
    }

    pub fn get_serializable_or(&self, key: &str, default: OpaqueRef) -> OpaqueRef {
        self.view(key, TypeTag::Serializable, serializable_view, || {
            format!("{default:?}")
        })
        .flatten()
        .unwrap_or(default)
    }

    pub fn put_serializable(&mut self, key: impl Into<String>, value: OpaqueRef) -> &mut Self {
        self.put(key, BundleValue::Serializable(Some(value)))
    }

    pub fn get_sparse_opaque_array(&self, key: &str) -> Option<&SparseOpaqueArray> {
        self.view(key, TypeTag::SparseOpaqueArray, sparse_view, || {
            NULL_DEFAULT.to_string()
        })
        .flatten()
    }

    pub fn get_sparse_opaque_array_or<'a>(
        &'a self,
        key: &str,
        default: &'a SparseOpaqueArray,
    ) -> &'a SparseOpaqueArray {
        self.view(key, TypeTag::SparseOpaqueArray, sparse_view, || {
            format!("{default:?}")
        })
        .flatten()
        .unwrap_or(default)
    }

    pub fn put_sparse_opaque_array(
        &mut self,
        key: impl Into<String>,
        value: SparseOpaqueArray,
    ) -> &mut Self {
        self.put(key, BundleValue::SparseOpaqueArray(Some(value)))
    }

    /// Opaque object (or serializable) at `key`, downcast to `T`.
    ///
    /// `None` when absent, null, or of another concrete type. Only a
    /// non-opaque stored kind is reported as a mismatch.
    pub fn get_opaque_as<T: OpaqueObject>(&self, key: &str) -> Option<Arc<T>> {
        let handle = self
            .view(
                key,
                TypeTag::Opaque,
                |value| match value {
                    BundleValue::Opaque(v) | BundleValue::Serializable(v) => Some(v.as_ref()),
                    _ => None,
                },
                || NULL_DEFAULT.to_string(),
            )
            .flatten()?;
        downcast_opaque::<T>(handle)
    }

    /// Generic lenient getter: `None` when absent, null or of another kind
    /// (the last one reported as a mismatch).
    pub fn get<T: FromBundleValue>(&self, key: &str) -> Option<T> {
        self.view(key, T::TAG, T::from_bundle_value, || NULL_DEFAULT.to_string())
            .flatten()
    }

    /// Generic lenient getter with a caller default.
    pub fn get_or<T: FromBundleValue + fmt::Debug>(&self, key: &str, default: T) -> T {
        self.view(key, T::TAG, T::from_bundle_value, || format!("{default:?}"))
            .flatten()
            .unwrap_or(default)
    }

    /// Strict getter: a kind mismatch is an error instead of a default.
    ///
    /// `Ok(None)` when the key is absent or holds a null of the right kind.
    pub fn try_get<T: FromBundleValue>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get_value(key) else {
            return Ok(None);
        };
        T::from_bundle_value(value).ok_or_else(|| {
            BundleError::TypeMismatch(TypeMismatchWarning {
                key: key.to_string(),
                expected: T::TAG,
                actual: value.tag(),
                default: NULL_DEFAULT.to_string(),
            })
        })
    }
}

fn string_view(value: &BundleValue) -> Option<Option<&str>> {
    match value {
        BundleValue::String(v) => Some(v.as_deref()),
        _ => None,
    }
}

fn char_sequence_view(value: &BundleValue) -> Option<Option<&str>> {
    match value {
        BundleValue::CharSequence(v) | BundleValue::String(v) => Some(v.as_deref()),
        _ => None,
    }
}

fn bundle_view(value: &BundleValue) -> Option<Option<&StateBundle>> {
    match value {
        BundleValue::Bundle(v) => Some(v.as_ref()),
        _ => None,
    }
}

fn opaque_view(value: &BundleValue) -> Option<Option<OpaqueRef>> {
    match value {
        BundleValue::Opaque(v) => Some(v.clone()),
        _ => None,
    }
}

fn serializable_view(value: &BundleValue) -> Option<Option<OpaqueRef>> {
    match value {
        BundleValue::Serializable(v) => Some(v.clone()),
        _ => None,
    }
}

fn sparse_view(value: &BundleValue) -> Option<Option<&SparseOpaqueArray>> {
    match value {
        BundleValue::SparseOpaqueArray(v) => Some(v.as_ref()),
        _ => None,
    }
}

/// Owned extraction of one kind from a [`BundleValue`].
pub trait FromBundleValue: Sized {
    /// Kind this type is stored as.
    const TAG: TypeTag;

    /// `None` when `value` is of another kind, `Some(None)` for a stored
    /// null.
    fn from_bundle_value(value: &BundleValue) -> Option<Option<Self>>;
}

macro_rules! impl_from_bundle_scalar {
    ($ty:ty, $variant:ident) => {
        impl FromBundleValue for $ty {
            const TAG: TypeTag = TypeTag::$variant;

            fn from_bundle_value(value: &BundleValue) -> Option<Option<Self>> {
                match value {
                    BundleValue::$variant(v) => Some(Some(*v)),
                    _ => None,
                }
            }
        }
    };
}

impl_from_bundle_scalar!(bool, Boolean);
impl_from_bundle_scalar!(u8, Byte);
impl_from_bundle_scalar!(char, Char);
impl_from_bundle_scalar!(i16, Short);
impl_from_bundle_scalar!(i32, Int);
impl_from_bundle_scalar!(i64, Long);
impl_from_bundle_scalar!(f32, Float);
impl_from_bundle_scalar!(f64, Double);

macro_rules! impl_from_bundle_reference {
    ($ty:ty, $variant:ident) => {
        impl FromBundleValue for $ty {
            const TAG: TypeTag = TypeTag::$variant;

            fn from_bundle_value(value: &BundleValue) -> Option<Option<Self>> {
                match value {
                    BundleValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_from_bundle_reference!(String, String);
impl_from_bundle_reference!(Vec<String>, StringList);
impl_from_bundle_reference!(Vec<bool>, BooleanArray);
impl_from_bundle_reference!(Vec<u8>, ByteArray);
impl_from_bundle_reference!(Vec<i16>, ShortArray);
impl_from_bundle_reference!(Vec<char>, CharArray);
impl_from_bundle_reference!(Vec<i32>, IntArray);
impl_from_bundle_reference!(Vec<i64>, LongArray);
impl_from_bundle_reference!(Vec<f32>, FloatArray);
impl_from_bundle_reference!(Vec<f64>, DoubleArray);
impl_from_bundle_reference!(StateBundle, Bundle);
impl_from_bundle_reference!(OpaqueRef, Opaque);
impl_from_bundle_reference!(Vec<OpaqueRef>, OpaqueList);
impl_from_bundle_reference!(SparseOpaqueArray, SparseOpaqueArray);
