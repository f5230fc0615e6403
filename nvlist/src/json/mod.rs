// SPDX-License-Identifier: Apache-2.0

//! JSON codec for [`NvList`](crate::NvList) trees.

mod decoder;
mod encoder;
mod scanner;

pub use decoder::{decode, decode_slice, decode_with, DecodeOptions};
pub use encoder::{encode, encode_to_string, encode_to_vec};
