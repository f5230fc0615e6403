// SPDX-License-Identifier: Apache-2.0

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::list::NvList;

/// An opaque descriptor handle. The container never opens, duplicates or
/// closes it.
pub type Descriptor = i32;

/// The type tag of an entry.
///
/// The ordering is only used to order the per-name groups of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    NvList,
    Descriptor,
    Binary,
    BoolArray,
    NumberArray,
    StringArray,
    NvListArray,
    DescriptorArray,
}

impl ValueKind {
    /// Upper-case type name, as printed by diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "NULL",
            ValueKind::Bool => "BOOL",
            ValueKind::Number => "NUMBER",
            ValueKind::String => "STRING",
            ValueKind::NvList => "NVLIST",
            ValueKind::Descriptor => "DESCRIPTOR",
            ValueKind::Binary => "BINARY",
            ValueKind::BoolArray => "BOOL ARRAY",
            ValueKind::NumberArray => "NUMBER ARRAY",
            ValueKind::StringArray => "STRING ARRAY",
            ValueKind::NvListArray => "NVLIST ARRAY",
            ValueKind::DescriptorArray => "DESCRIPTOR ARRAY",
        }
    }

    pub const fn is_array(&self) -> bool {
        matches!(
            self,
            ValueKind::BoolArray
                | ValueKind::NumberArray
                | ValueKind::StringArray
                | ValueKind::NvListArray
                | ValueKind::DescriptorArray
        )
    }

    /// The element kind of an array kind, `None` for scalars.
    pub const fn element(&self) -> Option<ValueKind> {
        match self {
            ValueKind::BoolArray => Some(ValueKind::Bool),
            ValueKind::NumberArray => Some(ValueKind::Number),
            ValueKind::StringArray => Some(ValueKind::String),
            ValueKind::NvListArray => Some(ValueKind::NvList),
            ValueKind::DescriptorArray => Some(ValueKind::Descriptor),
            _ => None,
        }
    }
}

impl core::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held by an entry.
///
/// Arrays are homogeneous by construction: each array variant holds a
/// vector of a single element type.
///
/// There is no array of binary values. libnv defines no such type, and
/// binary data has no JSON form other than a single hex string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(u64),
    String(String),
    NvList(Box<NvList>),
    Descriptor(Descriptor),
    Binary(Vec<u8>),
    BoolArray(Vec<bool>),
    NumberArray(Vec<u64>),
    StringArray(Vec<String>),
    NvListArray(Vec<NvList>),
    DescriptorArray(Vec<Descriptor>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::NvList(_) => ValueKind::NvList,
            Value::Descriptor(_) => ValueKind::Descriptor,
            Value::Binary(_) => ValueKind::Binary,
            Value::BoolArray(_) => ValueKind::BoolArray,
            Value::NumberArray(_) => ValueKind::NumberArray,
            Value::StringArray(_) => ValueKind::StringArray,
            Value::NvListArray(_) => ValueKind::NvListArray,
            Value::DescriptorArray(_) => ValueKind::DescriptorArray,
        }
    }

    /// Number of elements for arrays, `None` for scalars.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::BoolArray(v) => Some(v.len()),
            Value::NumberArray(v) => Some(v.len()),
            Value::StringArray(v) => Some(v.len()),
            Value::NvListArray(v) => Some(v.len()),
            Value::DescriptorArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Checks the constraints a value must meet before it can be stored:
    /// strings carry no NUL byte and arrays are not empty.
    pub(crate) fn is_storable(&self) -> bool {
        match self {
            Value::String(s) => !s.contains('\0'),
            Value::StringArray(v) => !v.is_empty() && v.iter().all(|s| !s.contains('\0')),
            other => other.array_len() != Some(0),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NvList> for Value {
    fn from(v: NvList) -> Self {
        Value::NvList(Box::new(v))
    }
}
