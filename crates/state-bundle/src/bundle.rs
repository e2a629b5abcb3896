// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed map.
//!
//! [`StateBundle`] is an insertion-ordered map from key to [`BundleValue`].
//! The tag lives in the value, so a key's tag and value are always written and
//! removed together.
//!
//! Ordering rules:
//! - overwriting a key keeps its position,
//! - removing a key closes the gap without reordering the rest,
//! - order is visible to iteration, `Display` and the encoder, never to `==`.

use crate::error::{BundleError, Result};
use crate::tag::TypeTag;
use crate::value::BundleValue;
use indexmap::IndexMap;

/// Ordered heterogeneous key-value container.
#[derive(Debug, Clone, Default)]
pub struct StateBundle {
    entries: IndexMap<String, BundleValue>,
}

impl StateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert or overwrite `key`. The stored tag is the value's tag.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<BundleValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Store an explicit null of a reference kind.
    pub fn put_null(&mut self, key: impl Into<String>, tag: TypeTag) -> Result<&mut Self> {
        let value = BundleValue::null_of(tag).ok_or_else(|| {
            BundleError::invalid_argument(format!("{tag} is a scalar kind and cannot be null"))
        })?;
        Ok(self.put(key, value))
    }

    /// Raw slot lookup, without kind checks.
    pub fn get_value(&self, key: &str) -> Option<&BundleValue> {
        self.entries.get(key)
    }

    pub fn tag_of(&self, key: &str) -> Option<TypeTag> {
        self.entries.get(key).map(BundleValue::tag)
    }

    /// Remove `key`, returning its value. Remaining keys keep their order.
    pub fn remove(&mut self, key: &str) -> Option<BundleValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &BundleValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every entry of `other` into `self`; last write wins.
    ///
    /// Shallow: a nested bundle in `other` replaces the one in `self` instead
    /// of being merged into it. Fails when `other` is absent.
    pub fn merge(&mut self, other: Option<&StateBundle>) -> Result<&mut Self> {
        let other =
            other.ok_or_else(|| BundleError::invalid_argument("cannot merge an absent bundle"))?;
        Ok(self.merge_from(other))
    }

    /// Infallible [`StateBundle::merge`] for callers holding a reference.
    pub fn merge_from(&mut self, other: &StateBundle) -> &mut Self {
        self.entries.reserve(other.len());
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
        self
    }
}

impl<'a> IntoIterator for &'a StateBundle {
    type Item = (&'a String, &'a BundleValue);
    type IntoIter = indexmap::map::Iter<'a, String, BundleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<BundleValue>> FromIterator<(K, V)> for StateBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        bundle.extend(iter);
        bundle
    }
}

impl<K: Into<String>, V: Into<BundleValue>> Extend<(K, V)> for StateBundle {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}
