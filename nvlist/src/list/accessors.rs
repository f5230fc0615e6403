// SPDX-License-Identifier: Apache-2.0

//! Typed accessors: `add_*`, `move_*`, `get_*`, `exists_*`, `take_*` and
//! `free_*` for every value kind.
//!
//! `add_*` copies its argument into the list; `move_*` hands over an owned
//! value. `get_*` borrows the earliest-inserted entry of that name and kind,
//! `take_*` removes it and returns ownership.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use paste::paste;

use super::NvList;
use crate::error::{ErrorKind, Result};
use crate::value::{Descriptor, Value, ValueKind};

/// Lookup, removal and existence checks for kinds that carry a payload.
macro_rules! read_accessors {
    ($($kind:ident: $variant:ident, get -> $get:ty = |$g:ident| $get_expr:expr, take -> $take:ty = |$t:ident| $take_expr:expr;)*) => {
        paste! {
            impl NvList {
                $(
                    #[doc = concat!("Earliest-inserted `", stringify!($kind), "` named `name`.")]
                    pub fn [<get_ $kind>](&self, name: &str) -> Result<$get> {
                        match self.get_value(name, ValueKind::$variant)? {
                            Value::$variant($g) => Ok($get_expr),
                            _ => Err(ErrorKind::TypeMismatch),
                        }
                    }

                    #[doc = concat!("Whether a `", stringify!($kind), "` named `name` exists.")]
                    pub fn [<exists_ $kind>](&self, name: &str) -> bool {
                        self.exists_type(name, ValueKind::$variant)
                    }

                    #[doc = concat!("Removes the earliest-inserted `", stringify!($kind), "` named `name` and returns it.")]
                    pub fn [<take_ $kind>](&mut self, name: &str) -> Result<$take> {
                        match self.take_value(name, ValueKind::$variant)? {
                            Value::$variant($t) => Ok($take_expr),
                            _ => Err(ErrorKind::TypeMismatch),
                        }
                    }

                    #[doc = concat!("Drops the earliest-inserted `", stringify!($kind), "` named `name`.")]
                    pub fn [<free_ $kind>](&mut self, name: &str) -> Result<()> {
                        self.free_type(name, ValueKind::$variant)
                    }
                )*
            }
        }
    };
}

/// `add_*` (copying) constructors.
macro_rules! add_accessors {
    ($($kind:ident: $variant:ident, $arg:ty = |$v:ident| $conv:expr;)*) => {
        paste! {
            impl NvList {
                $(
                    #[doc = concat!("Adds a copy of a `", stringify!($kind), "` under `name`.")]
                    pub fn [<add_ $kind>](&mut self, name: &str, $v: $arg) -> Result<()> {
                        self.add_value(name, Value::$variant($conv))
                    }
                )*
            }
        }
    };
}

/// `move_*` constructors for kinds with heap data.
macro_rules! move_accessors {
    ($($kind:ident: $variant:ident, $arg:ty = |$v:ident| $conv:expr;)*) => {
        paste! {
            impl NvList {
                $(
                    #[doc = concat!("Moves an owned `", stringify!($kind), "` into the list under `name`.")]
                    pub fn [<move_ $kind>](&mut self, name: &str, $v: $arg) -> Result<()> {
                        self.add_value(name, Value::$variant($conv))
                    }
                )*
            }
        }
    };
}

read_accessors! {
    bool: Bool, get -> bool = |v| *v, take -> bool = |v| v;
    number: Number, get -> u64 = |v| *v, take -> u64 = |v| v;
    string: String, get -> &str = |v| v.as_str(), take -> String = |v| v;
    binary: Binary, get -> &[u8] = |v| v.as_slice(), take -> Vec<u8> = |v| v;
    nvlist: NvList, get -> &NvList = |v| &**v, take -> NvList = |v| *v;
    descriptor: Descriptor, get -> Descriptor = |v| *v, take -> Descriptor = |v| v;
    bool_array: BoolArray, get -> &[bool] = |v| v.as_slice(), take -> Vec<bool> = |v| v;
    number_array: NumberArray, get -> &[u64] = |v| v.as_slice(), take -> Vec<u64> = |v| v;
    string_array: StringArray, get -> &[String] = |v| v.as_slice(), take -> Vec<String> = |v| v;
    nvlist_array: NvListArray, get -> &[NvList] = |v| v.as_slice(), take -> Vec<NvList> = |v| v;
    descriptor_array: DescriptorArray, get -> &[Descriptor] = |v| v.as_slice(), take -> Vec<Descriptor> = |v| v;
}

add_accessors! {
    bool: Bool, bool = |value| value;
    number: Number, u64 = |value| value;
    string: String, &str = |value| value.to_owned();
    binary: Binary, &[u8] = |value| value.to_vec();
    descriptor: Descriptor, Descriptor = |value| value;
    bool_array: BoolArray, &[bool] = |value| value.to_vec();
    number_array: NumberArray, &[u64] = |value| value.to_vec();
    descriptor_array: DescriptorArray, &[Descriptor] = |value| value.to_vec();
}

move_accessors! {
    string: String, String = |value| value;
    binary: Binary, Vec<u8> = |value| value;
    nvlist: NvList, NvList = |value| Box::new(value);
    descriptor: Descriptor, Descriptor = |value| value;
    bool_array: BoolArray, Vec<bool> = |value| value;
    number_array: NumberArray, Vec<u64> = |value| value;
    string_array: StringArray, Vec<String> = |value| value;
    nvlist_array: NvListArray, Vec<NvList> = |value| value;
    descriptor_array: DescriptorArray, Vec<Descriptor> = |value| value;
}

impl NvList {
    /// Adds a null entry under `name`.
    pub fn add_null(&mut self, name: &str) -> Result<()> {
        self.add_value(name, Value::Null)
    }

    pub fn exists_null(&self, name: &str) -> bool {
        self.exists_type(name, ValueKind::Null)
    }

    /// Removes the earliest-inserted null named `name`.
    pub fn take_null(&mut self, name: &str) -> Result<()> {
        self.take_value(name, ValueKind::Null).map(drop)
    }

    pub fn free_null(&mut self, name: &str) -> Result<()> {
        self.free_type(name, ValueKind::Null)
    }

    /// Adds a deep copy of `value` under `name`.
    ///
    /// A list in the error state is refused with its error, as is a copy
    /// that cannot be completed.
    pub fn add_nvlist(&mut self, name: &str, value: &NvList) -> Result<()> {
        self.ensure_writable()?;
        match value.try_clone() {
            Ok(copy) => self.add_value(name, Value::from(copy)),
            Err(kind) => self.fail(kind),
        }
    }

    /// Adds deep copies of `value` under `name`.
    pub fn add_nvlist_array(&mut self, name: &str, value: &[NvList]) -> Result<()> {
        self.ensure_writable()?;
        match copy_lists(value) {
            Ok(copies) => self.add_value(name, Value::NvListArray(copies)),
            Err(kind) => self.fail(kind),
        }
    }

    /// Adds a copy of a string array under `name`.
    pub fn add_string_array<S: AsRef<str>>(&mut self, name: &str, value: &[S]) -> Result<()> {
        let strings = value.iter().map(|s| s.as_ref().to_owned()).collect();
        self.add_value(name, Value::StringArray(strings))
    }
}

fn copy_lists(lists: &[NvList]) -> Result<Vec<NvList>> {
    let mut copies = Vec::new();
    copies.try_reserve_exact(lists.len())?;
    for list in lists {
        copies.push(list.try_clone()?);
    }
    Ok(copies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::NvFlags;
    use alloc::vec;

    // One round of add, get, exists, take and free per kind.
    macro_rules! accessor_tests {
        ($($kind:ident: $add:expr, $expected:expr;)*) => {
            paste! {
                $(
                    #[test]
                    fn [<test_ $kind _accessors>]() {
                        let mut nvl = NvList::default();
                        assert!(!nvl.[<exists_ $kind>]("key"));
                        assert_eq!(nvl.[<get_ $kind>]("key"), Err(ErrorKind::NotFound));

                        nvl.[<add_ $kind>]("key", $add).unwrap();
                        assert!(nvl.[<exists_ $kind>]("key"));
                        assert_eq!(nvl.[<get_ $kind>]("key").unwrap(), $expected);

                        let taken = nvl.[<take_ $kind>]("key").unwrap();
                        assert_eq!(taken, $expected);
                        assert!(nvl.is_empty());
                        assert_eq!(nvl.[<take_ $kind>]("key"), Err(ErrorKind::NotFound));

                        nvl.[<add_ $kind>]("key", $add).unwrap();
                        nvl.[<free_ $kind>]("key").unwrap();
                        assert!(!nvl.exists("key"));
                        assert_eq!(nvl.error(), None);
                    }
                )*
            }
        };
    }

    accessor_tests! {
        bool: true, true;
        number: 420, 420;
        string: "text", "text";
        binary: &[0xde, 0xad][..], &[0xde, 0xad][..];
        descriptor: 7, 7;
        bool_array: &[true, false][..], &[true, false][..];
        number_array: &[1, 2, 3][..], &[1, 2, 3][..];
        descriptor_array: &[3, 4][..], &[3, 4][..];
    }

    #[test]
    fn test_null_accessors() {
        let mut nvl = NvList::default();
        nvl.add_null("nothing").unwrap();
        assert!(nvl.exists_null("nothing"));
        nvl.take_null("nothing").unwrap();
        assert!(!nvl.exists_null("nothing"));
        assert_eq!(nvl.free_null("nothing"), Err(ErrorKind::NotFound));
    }

    #[test]
    fn test_nvlist_add_copies_and_move_transfers() {
        let mut child = NvList::default();
        child.add_number("n", 1).unwrap();

        let mut nvl = NvList::default();
        nvl.add_nvlist("copy", &child).unwrap();
        nvl.move_nvlist("moved", child).unwrap();
        assert_eq!(nvl.get_nvlist("copy"), nvl.get_nvlist("moved"));

        let taken = nvl.take_nvlist("moved").unwrap();
        assert_eq!(taken.get_number("n"), Ok(1));
        assert_eq!(taken.parent(), None);
    }

    #[test]
    fn test_string_arrays() {
        let mut nvl = NvList::default();
        nvl.add_string_array("borrowed", &["a", "b"]).unwrap();
        nvl.move_string_array("owned", vec![String::from("c")])
            .unwrap();
        assert_eq!(nvl.get_string_array("borrowed").unwrap(), ["a", "b"]);
        assert_eq!(nvl.take_string_array("owned").unwrap(), vec!["c"]);
    }

    #[test]
    fn test_nvlist_array_move() {
        let mut nvl = NvList::default();
        let items = vec![NvList::default(), NvList::default()];
        nvl.move_nvlist_array("items", items).unwrap();
        assert_eq!(nvl.get_nvlist_array("items").unwrap().len(), 2);
        let items = nvl.take_nvlist_array("items").unwrap();
        assert!(items.iter().all(|item| item.parent().is_none()));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        let mut nvl = NvList::default();
        assert_eq!(
            nvl.move_number_array("empty", Vec::new()),
            Err(ErrorKind::InvalidInput)
        );
        assert_eq!(nvl.error(), Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_wrong_kind_is_type_mismatch_and_not_sticky() {
        let mut nvl = NvList::default();
        nvl.add_string("key", "v").unwrap();
        assert_eq!(nvl.get_number("key"), Err(ErrorKind::TypeMismatch));
        assert_eq!(nvl.take_bool("key"), Err(ErrorKind::TypeMismatch));
        assert_eq!(nvl.error(), None);
        assert_eq!(nvl.get_string("key"), Ok("v"));
    }

    #[test]
    fn test_take_removes_in_insertion_order() {
        let mut nvl = NvList::new(NvFlags::NO_UNIQUE);
        nvl.add_bool("bool", true).unwrap();
        nvl.add_bool("bool", false).unwrap();
        assert_eq!(nvl.take_bool("bool"), Ok(true));
        assert_eq!(nvl.get_bool("bool"), Ok(false));
    }
}
