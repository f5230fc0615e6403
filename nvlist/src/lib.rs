// SPDX-License-Identifier: Apache-2.0

//! Typed name/value lists with a streaming JSON codec.
//!
//! An [`NvList`] holds an ordered sequence of named, typed entries: null,
//! bool, unsigned 64-bit number, string, binary, descriptor, nested list, and
//! arrays of those. [`decode`] reads a JSON document from a [`Reader`] into a
//! list and [`encode`] writes a list back out.
//!
//! ```rust
//! use nvlist::{decode_slice, encode_to_string, NvList};
//!
//! let mut nvl = decode_slice(br#"{"pool": "tank", "disks": [{"id": 1}, {"id": 2}]}"#).unwrap();
//! assert_eq!(nvl.get_string("pool"), Ok("tank"));
//! assert_eq!(nvl.get_nvlist_array("disks").unwrap().len(), 2);
//!
//! nvl.add_bool("healthy", true).unwrap();
//! assert_eq!(
//!     encode_to_string(&nvl).unwrap(),
//!     "{\"pool\":\"tank\",\"disks\":[{\"id\":1},{\"id\":2}],\"healthy\":true}\n"
//! );
//! ```
//!
//! # Ownership
//!
//! A list owns every entry in it, and an entry owns its value, nested lists
//! included. `add_*` copies its argument in, `move_*` transfers an owned
//! value, `get_*` borrows and `take_*` removes the entry and hands the value
//! back. A nested list knows where it is attached through
//! [`NvList::parent`]; the link is dropped when the list is taken out.
//!
//! # Names
//!
//! Names are looked up by name and kind. By default names are unique. With
//! [`NvFlags::NO_UNIQUE`] the same name may appear repeatedly; lookups then
//! resolve to the earliest-inserted entry of that name and kind while
//! iteration still visits every entry.
//!
//! # Error state
//!
//! A failed `add_*`/`move_*` stores its [`ErrorKind`] in the list. From then
//! on every mutation returns [`ErrorKind::AlreadyInErrorState`] and leaves
//! the list alone, so a batch of additions can be checked once through
//! [`NvList::error`]. Failed lookups (`NotFound`, `TypeMismatch`) are
//! reported to the caller only.
//!
//! A list in the error state cannot be nested into another list: the
//! attempt fails with the child's error and sets it on the parent.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod chunk_reader;
mod error;
mod escape;
mod flags;
mod io;
mod json;
mod list;
mod number;
mod value;

pub use chunk_reader::ChunkReader;
pub use error::{ErrorKind, Result};
pub use flags::NvFlags;
#[cfg(feature = "std")]
pub use io::{IoReader, IoWriter};
pub use io::{Reader, Writer};
pub use json::{
    decode, decode_slice, decode_with, encode, encode_to_string, encode_to_vec, DecodeOptions,
};
pub use list::{Cursor, Iter, NvList, ParentLink};
pub use value::{Descriptor, Value, ValueKind};

/// Recovers the bytes of a binary value from the hex string the encoder
/// wrote for it.
pub use escape::decode_hex;
