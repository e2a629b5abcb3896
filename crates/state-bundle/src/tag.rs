// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeTag registry.
//!
//! Every storable value kind has exactly one tag, and every tag has a stable
//! wire number. The numbering is append-only: numbers are never renumbered or
//! reused, and the gaps listed in [`RESERVED_WIRE_TAGS`] belonged to kinds that
//! have since been dropped. New kinds go after the highest assigned number.

use std::fmt;

/// Wire numbers once assigned to removed kinds (string array, text-sequence
/// array, size, float size, opaque array). Never assign these again.
pub const RESERVED_WIRE_TAGS: [i32; 5] = [22, 23, 24, 25, 28];

/// Identifies the kind of a stored value and selects its wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum TypeTag {
    // --- Scalars (0-7) ---
    Boolean = 0,
    Byte = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    Float = 6,
    Double = 7,

    // --- Text and opaque blobs (8-10) ---
    String = 8,
    CharSequence = 9,
    Serializable = 10,

    // --- Lists (11-13) ---
    IntegerList = 11,
    StringList = 12,
    CharSequenceList = 13,

    // --- Fixed-width arrays (14-21) ---
    BooleanArray = 14,
    ByteArray = 15,
    ShortArray = 16,
    CharArray = 17,
    IntArray = 18,
    LongArray = 19,
    FloatArray = 20,
    DoubleArray = 21,

    // 22-25 reserved

    // --- Containers and opaque objects (26-30) ---
    Bundle = 26,
    Opaque = 27,
    // 28 reserved
    OpaqueList = 29,
    SparseOpaqueArray = 30,
}

impl TypeTag {
    /// Every assigned tag, in wire-number order.
    pub const ALL: [TypeTag; 26] = [
        TypeTag::Boolean,
        TypeTag::Byte,
        TypeTag::Char,
        TypeTag::Short,
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::CharSequence,
        TypeTag::Serializable,
        TypeTag::IntegerList,
        TypeTag::StringList,
        TypeTag::CharSequenceList,
        TypeTag::BooleanArray,
        TypeTag::ByteArray,
        TypeTag::ShortArray,
        TypeTag::CharArray,
        TypeTag::IntArray,
        TypeTag::LongArray,
        TypeTag::FloatArray,
        TypeTag::DoubleArray,
        TypeTag::Bundle,
        TypeTag::Opaque,
        TypeTag::OpaqueList,
        TypeTag::SparseOpaqueArray,
    ];

    /// Wire number of this tag.
    ///
    /// Spelled out instead of `as i32` so the mapping stays explicit next to
    /// [`TypeTag::from_wire`].
    pub const fn to_wire(self) -> i32 {
        match self {
            TypeTag::Boolean => 0,
            TypeTag::Byte => 1,
            TypeTag::Char => 2,
            TypeTag::Short => 3,
            TypeTag::Int => 4,
            TypeTag::Long => 5,
            TypeTag::Float => 6,
            TypeTag::Double => 7,
            TypeTag::String => 8,
            TypeTag::CharSequence => 9,
            TypeTag::Serializable => 10,
            TypeTag::IntegerList => 11,
            TypeTag::StringList => 12,
            TypeTag::CharSequenceList => 13,
            TypeTag::BooleanArray => 14,
            TypeTag::ByteArray => 15,
            TypeTag::ShortArray => 16,
            TypeTag::CharArray => 17,
            TypeTag::IntArray => 18,
            TypeTag::LongArray => 19,
            TypeTag::FloatArray => 20,
            TypeTag::DoubleArray => 21,
            TypeTag::Bundle => 26,
            TypeTag::Opaque => 27,
            TypeTag::OpaqueList => 29,
            TypeTag::SparseOpaqueArray => 30,
        }
    }

    /// Convert from a wire number. Reserved and unknown numbers yield `None`.
    pub const fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(TypeTag::Boolean),
            1 => Some(TypeTag::Byte),
            2 => Some(TypeTag::Char),
            3 => Some(TypeTag::Short),
            4 => Some(TypeTag::Int),
            5 => Some(TypeTag::Long),
            6 => Some(TypeTag::Float),
            7 => Some(TypeTag::Double),
            8 => Some(TypeTag::String),
            9 => Some(TypeTag::CharSequence),
            10 => Some(TypeTag::Serializable),
            11 => Some(TypeTag::IntegerList),
            12 => Some(TypeTag::StringList),
            13 => Some(TypeTag::CharSequenceList),
            14 => Some(TypeTag::BooleanArray),
            15 => Some(TypeTag::ByteArray),
            16 => Some(TypeTag::ShortArray),
            17 => Some(TypeTag::CharArray),
            18 => Some(TypeTag::IntArray),
            19 => Some(TypeTag::LongArray),
            20 => Some(TypeTag::FloatArray),
            21 => Some(TypeTag::DoubleArray),
            26 => Some(TypeTag::Bundle),
            27 => Some(TypeTag::Opaque),
            29 => Some(TypeTag::OpaqueList),
            30 => Some(TypeTag::SparseOpaqueArray),
            _ => None,
        }
    }

    /// Human-readable kind name, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Byte => "byte",
            TypeTag::Char => "char",
            TypeTag::Short => "short",
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::CharSequence => "char_sequence",
            TypeTag::Serializable => "serializable",
            TypeTag::IntegerList => "integer_list",
            TypeTag::StringList => "string_list",
            TypeTag::CharSequenceList => "char_sequence_list",
            TypeTag::BooleanArray => "boolean_array",
            TypeTag::ByteArray => "byte_array",
            TypeTag::ShortArray => "short_array",
            TypeTag::CharArray => "char_array",
            TypeTag::IntArray => "int_array",
            TypeTag::LongArray => "long_array",
            TypeTag::FloatArray => "float_array",
            TypeTag::DoubleArray => "double_array",
            TypeTag::Bundle => "bundle",
            TypeTag::Opaque => "opaque",
            TypeTag::OpaqueList => "opaque_list",
            TypeTag::SparseOpaqueArray => "sparse_opaque_array",
        }
    }

    /// Fixed-width array kinds: compared and hashed element-wise.
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            TypeTag::BooleanArray
                | TypeTag::ByteArray
                | TypeTag::ShortArray
                | TypeTag::CharArray
                | TypeTag::IntArray
                | TypeTag::LongArray
                | TypeTag::FloatArray
                | TypeTag::DoubleArray
        )
    }

    /// Kinds whose value may be an explicit null.
    pub const fn is_reference(self) -> bool {
        !matches!(
            self,
            TypeTag::Boolean
                | TypeTag::Byte
                | TypeTag::Char
                | TypeTag::Short
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::Float
                | TypeTag::Double
        )
    }

    /// Kinds whose payload is produced by an opaque object's own codec.
    pub const fn is_opaque(self) -> bool {
        matches!(
            self,
            TypeTag::Serializable
                | TypeTag::Opaque
                | TypeTag::OpaqueList
                | TypeTag::SparseOpaqueArray
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_numbers_are_pinned() {
        // Changing any of these breaks every stream written so far.
        let expected = [
            (TypeTag::Boolean, 0),
            (TypeTag::Byte, 1),
            (TypeTag::Char, 2),
            (TypeTag::Short, 3),
            (TypeTag::Int, 4),
            (TypeTag::Long, 5),
            (TypeTag::Float, 6),
            (TypeTag::Double, 7),
            (TypeTag::String, 8),
            (TypeTag::CharSequence, 9),
            (TypeTag::Serializable, 10),
            (TypeTag::IntegerList, 11),
            (TypeTag::StringList, 12),
            (TypeTag::CharSequenceList, 13),
            (TypeTag::BooleanArray, 14),
            (TypeTag::ByteArray, 15),
            (TypeTag::ShortArray, 16),
            (TypeTag::CharArray, 17),
            (TypeTag::IntArray, 18),
            (TypeTag::LongArray, 19),
            (TypeTag::FloatArray, 20),
            (TypeTag::DoubleArray, 21),
            (TypeTag::Bundle, 26),
            (TypeTag::Opaque, 27),
            (TypeTag::OpaqueList, 29),
            (TypeTag::SparseOpaqueArray, 30),
        ];
        for (tag, wire) in expected {
            assert_eq!(tag.to_wire(), wire, "{tag}");
            assert_eq!(tag as i32, wire, "{tag} discriminant");
            assert_eq!(TypeTag::from_wire(wire), Some(tag));
        }
    }

    #[test]
    fn test_reserved_numbers_stay_unassigned() {
        for wire in RESERVED_WIRE_TAGS {
            assert_eq!(TypeTag::from_wire(wire), None, "wire {wire} reused");
        }
        assert!(TypeTag::ALL
            .iter()
            .all(|t| !RESERVED_WIRE_TAGS.contains(&t.to_wire())));
    }

    #[test]
    fn test_unknown_numbers() {
        assert_eq!(TypeTag::from_wire(-1), None);
        assert_eq!(TypeTag::from_wire(31), None);
        assert_eq!(TypeTag::from_wire(i32::MAX), None);
    }

    #[test]
    fn test_all_is_sorted_and_appends_at_end() {
        let wires: Vec<i32> = TypeTag::ALL.iter().map(|t| t.to_wire()).collect();
        assert!(wires.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(wires.last(), Some(&30));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(TypeTag::IntArray.is_array());
        assert!(!TypeTag::IntegerList.is_array());
        assert!(!TypeTag::Int.is_reference());
        assert!(TypeTag::String.is_reference());
        assert!(TypeTag::Bundle.is_reference());
        assert!(TypeTag::SparseOpaqueArray.is_opaque());
        assert!(!TypeTag::Bundle.is_opaque());
        assert_eq!(TypeTag::CharSequenceList.to_string(), "char_sequence_list");
    }
}
