// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Equality, hashing and string form.
//!
//! Two bundles are equal when they hold the same keys (in any order) and each
//! key maps to the same kind with an equal value. Floats compare by bit
//! pattern, which keeps `==` reflexive (`NaN == NaN`) and consistent with the
//! hash; opaque objects compare through
//! [`OpaqueObject::opaque_eq`](crate::opaque::OpaqueObject::opaque_eq).
//!
//! The hash is a wrapping sum of per-entry hashes, so it does not depend on
//! insertion order either.

use crate::bundle::StateBundle;
use crate::opaque::{opaque_ref_eq, OpaqueRef};
use crate::value::BundleValue;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

impl PartialEq for StateBundle {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get_value(key).is_some_and(|o| value == o))
    }
}

impl Eq for StateBundle {}

impl Hash for StateBundle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl StateBundle {
    /// Order-independent content hash: the wrapping sum over entries of
    /// `31 * hash(key) + hash(value)`.
    pub fn content_hash(&self) -> u64 {
        self.iter().fold(0u64, |acc, (key, value)| {
            let entry = hash_one(key)
                .wrapping_mul(31)
                .wrapping_add(value.content_hash());
            acc.wrapping_add(entry)
        })
    }
}

impl PartialEq for BundleValue {
    fn eq(&self, other: &Self) -> bool {
        use BundleValue::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) | (CharSequence(a), CharSequence(b)) => a == b,
            (Serializable(a), Serializable(b)) | (Opaque(a), Opaque(b)) => {
                option_eq(a, b, opaque_ref_eq)
            }
            (IntegerList(a), IntegerList(b)) | (IntArray(a), IntArray(b)) => a == b,
            (StringList(a), StringList(b)) | (CharSequenceList(a), CharSequenceList(b)) => a == b,
            (BooleanArray(a), BooleanArray(b)) => a == b,
            (ByteArray(a), ByteArray(b)) => a == b,
            (ShortArray(a), ShortArray(b)) => a == b,
            (CharArray(a), CharArray(b)) => a == b,
            (LongArray(a), LongArray(b)) => a == b,
            (FloatArray(a), FloatArray(b)) => option_eq(a, b, |a, b| {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }),
            (DoubleArray(a), DoubleArray(b)) => option_eq(a, b, |a, b| {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }),
            (Bundle(a), Bundle(b)) => a == b,
            (OpaqueList(a), OpaqueList(b)) => option_eq(a, b, |a, b| {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| opaque_ref_eq(x, y))
            }),
            (SparseOpaqueArray(a), SparseOpaqueArray(b)) => option_eq(a, b, |a, b| {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((i, x), (j, y))| i == j && opaque_ref_eq(x, y))
            }),
            _ => false,
        }
    }
}

impl Eq for BundleValue {}

fn option_eq<T>(a: &Option<T>, b: &Option<T>, eq: impl Fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => eq(a, b),
        _ => false,
    }
}

fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Sequence hash over already-hashed elements.
fn sequence_hash(items: impl IntoIterator<Item = u64>) -> u64 {
    items
        .into_iter()
        .fold(1u64, |acc, h| acc.wrapping_mul(31).wrapping_add(h))
}

impl BundleValue {
    /// Hash consistent with `==`; `0` for a stored null.
    pub fn content_hash(&self) -> u64 {
        use BundleValue::*;
        match self {
            Boolean(v) => hash_one(v),
            Byte(v) => hash_one(v),
            Char(v) => hash_one(v),
            Short(v) => hash_one(v),
            Int(v) => hash_one(v),
            Long(v) => hash_one(v),
            Float(v) => hash_one(&v.to_bits()),
            Double(v) => hash_one(&v.to_bits()),
            String(v) | CharSequence(v) => v.as_ref().map_or(0, hash_one),
            Serializable(v) | Opaque(v) => v.as_ref().map_or(0, |o| o.opaque_hash()),
            IntegerList(v) | IntArray(v) => v.as_ref().map_or(0, |v| hash_one(v.as_slice())),
            StringList(v) | CharSequenceList(v) => {
                v.as_ref().map_or(0, |v| hash_one(v.as_slice()))
            }
            BooleanArray(v) => v.as_ref().map_or(0, |v| hash_one(v.as_slice())),
            ByteArray(v) => v.as_ref().map_or(0, |v| hash_one(v.as_slice())),
            ShortArray(v) => v.as_ref().map_or(0, |v| hash_one(v.as_slice())),
            CharArray(v) => v.as_ref().map_or(0, |v| hash_one(v.as_slice())),
            LongArray(v) => v.as_ref().map_or(0, |v| hash_one(v.as_slice())),
            FloatArray(v) => v.as_ref().map_or(0, |v| {
                sequence_hash(v.iter().map(|x| hash_one(&x.to_bits())))
            }),
            DoubleArray(v) => v.as_ref().map_or(0, |v| {
                sequence_hash(v.iter().map(|x| hash_one(&x.to_bits())))
            }),
            Bundle(v) => v.as_ref().map_or(0, StateBundle::content_hash),
            OpaqueList(v) => v
                .as_ref()
                .map_or(0, |v| sequence_hash(v.iter().map(|o| o.opaque_hash()))),
            SparseOpaqueArray(v) => v.as_ref().map_or(0, |v| {
                sequence_hash(
                    v.iter()
                        .map(|(i, o)| hash_one(i).wrapping_mul(31).wrapping_add(o.opaque_hash())),
                )
            }),
        }
    }
}

impl Hash for BundleValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

// String form

struct Seq<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Seq<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

struct Obj<'a>(&'a OpaqueRef);

impl fmt::Display for Obj<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

fn write_opt<T>(
    f: &mut fmt::Formatter<'_>,
    value: &Option<T>,
    render: impl FnOnce(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    match value {
        None => f.write_str("<null>"),
        Some(v) => render(f, v),
    }
}

impl fmt::Display for BundleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BundleValue::*;
        match self {
            Boolean(v) => write!(f, "{v}"),
            Byte(v) => write!(f, "{v}"),
            Char(v) => write!(f, "{v}"),
            Short(v) => write!(f, "{v}"),
            Int(v) => write!(f, "{v}"),
            Long(v) => write!(f, "{v}"),
            Float(v) => write!(f, "{v}"),
            Double(v) => write!(f, "{v}"),
            String(v) | CharSequence(v) => write_opt(f, v, |f, s| f.write_str(s)),
            Serializable(v) | Opaque(v) => write_opt(f, v, |f, o| write!(f, "{}", Obj(o))),
            IntegerList(v) | IntArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            StringList(v) | CharSequenceList(v) => {
                write_opt(f, v, |f, v| write!(f, "{}", Seq(v)))
            }
            BooleanArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            ByteArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            ShortArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            CharArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            LongArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            FloatArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            DoubleArray(v) => write_opt(f, v, |f, v| write!(f, "{}", Seq(v))),
            Bundle(v) => write_opt(f, v, |f, b| write!(f, "{b}")),
            OpaqueList(v) => write_opt(f, v, |f, v| {
                let items: Vec<Obj<'_>> = v.iter().map(Obj).collect();
                write!(f, "{}", Seq(&items))
            }),
            SparseOpaqueArray(v) => write_opt(f, v, |f, v| {
                f.write_str("{")?;
                for (i, (index, o)) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{index}={}", Obj(o))?;
                }
                f.write_str("}")
            }),
        }
    }
}

/// `{[key]::[value]}` per entry in insertion order, space separated; `[]`
/// when empty. Diagnostic only.
impl fmt::Display for StateBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("[]");
        }
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{{[{key}]::[{value}]}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opaque::RawOpaque;
    use crate::tag::TypeTag;
    use std::sync::Arc;

    fn sample() -> Vec<(&'static str, BundleValue)> {
        vec![
            ("flag", BundleValue::from(true)),
            ("count", BundleValue::from(3i32)),
            ("ratio", BundleValue::from(0.5f64)),
            ("name", BundleValue::from("abc")),
            ("ids", BundleValue::from(vec![1i64, 2, 3])),
            ("none", BundleValue::null_of(TypeTag::IntArray).expect("reference")),
        ]
    }

    #[test]
    fn test_order_independent_equality_and_hash() {
        let forward: StateBundle = sample().into_iter().collect();
        let backward: StateBundle = sample().into_iter().rev().collect();
        assert_eq!(forward, backward);
        assert_eq!(forward.content_hash(), backward.content_hash());
        assert_ne!(forward.to_string(), backward.to_string());
    }

    #[test]
    fn test_same_value_other_kind_is_unequal() {
        let mut a = StateBundle::new();
        a.put_string("k", "x");
        let mut b = StateBundle::new();
        b.put_char_sequence("k", "x");
        assert_ne!(a, b);

        let mut c = StateBundle::new();
        c.put_int_array("k", [1]);
        let mut d = StateBundle::new();
        d.put_integer_list("k", [1]);
        assert_ne!(c, d);
    }

    #[test]
    fn test_null_equality() {
        let mut a = StateBundle::new();
        a.put_null("k", TypeTag::String).expect("reference");
        let mut b = a.clone();
        assert_eq!(a, b);
        b.put_string("k", "");
        assert_ne!(a, b);
    }

    #[test]
    fn test_float_bits() {
        let mut a = StateBundle::new();
        a.put_double("nan", f64::NAN).put_float_array("v", [f32::NAN, 1.0]);
        assert_eq!(a, a.clone());

        let mut zero = StateBundle::new();
        zero.put_double("z", 0.0);
        let mut neg_zero = StateBundle::new();
        neg_zero.put_double("z", -0.0);
        assert_ne!(zero, neg_zero);
    }

    #[test]
    fn test_extra_key_is_unequal() {
        let a: StateBundle = [("x", 1i32)].into_iter().collect();
        let b: StateBundle = [("x", 1i32), ("y", 2)].into_iter().collect();
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_nested_bundle_equality() {
        let inner_a: StateBundle = [("a", 1i32), ("b", 2)].into_iter().collect();
        let inner_b: StateBundle = [("b", 2i32), ("a", 1)].into_iter().collect();
        let mut outer_a = StateBundle::new();
        outer_a.put_bundle("inner", inner_a);
        let mut outer_b = StateBundle::new();
        outer_b.put_bundle("inner", inner_b);
        assert_eq!(outer_a, outer_b);
        assert_eq!(outer_a.content_hash(), outer_b.content_hash());
    }

    #[test]
    fn test_opaque_equality_uses_object() {
        let mut a = StateBundle::new();
        a.put_opaque("o", Arc::new(RawOpaque::new("t", vec![1, 2])));
        let mut b = StateBundle::new();
        b.put_opaque("o", Arc::new(RawOpaque::new("t", vec![1, 2])));
        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_display() {
        assert_eq!(StateBundle::new().to_string(), "[]");

        let mut bundle = StateBundle::new();
        bundle
            .put_int("a", 1)
            .put_int_array("arr", [1, 2, 3])
            .put_null("s", TypeTag::String)
            .expect("reference");
        assert_eq!(bundle.to_string(), "{[a]::[1]} {[arr]::[[1, 2, 3]]} {[s]::[<null>]}");
    }

    #[test]
    fn test_hash_trait_matches_content_hash() {
        use std::collections::HashSet;
        let a: StateBundle = [("x", 1i32), ("y", 2)].into_iter().collect();
        let b: StateBundle = [("y", 2i32), ("x", 1)].into_iter().collect();
        let set: HashSet<StateBundle> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
