// SPDX-License-Identifier: Apache-2.0

//! [`NvList`] to JSON encoding.
//!
//! The output is compact JSON followed by a single `\n`. Binary values are
//! written as strings of lowercase hex pairs and nulls as `null`. The walk
//! keeps its own stack of open lists and arrays of lists, mirroring the
//! decoder.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{ErrorKind, Result};
use crate::escape;
use crate::io::Writer;
use crate::list::{Iter, NvList};
use crate::value::Value;

/// An open scope of the walk.
enum Frame<'a> {
    List { entries: Iter<'a>, first: bool },
    ListArray { items: core::slice::Iter<'a, NvList>, first: bool },
}

/// Encodes `nvl` and writes the document to `writer` in one piece.
///
/// Nothing is written when encoding fails. A list in the error state, or
/// holding one anywhere in its tree, is refused with the stored error, a list holding descriptors anywhere in
/// its tree with [`ErrorKind::Unsupported`]. A failing writer is reported as
/// [`ErrorKind::Io`].
pub fn encode<W: Writer>(nvl: &NvList, mut writer: W) -> Result<()> {
    let out = encode_to_vec(nvl)?;
    writer.write_all(&out).map_err(|_| {
        log::debug!("writer rejected {} bytes of output", out.len());
        ErrorKind::Io
    })
}

/// Encodes `nvl` into a new buffer.
pub fn encode_to_vec(nvl: &NvList) -> Result<Vec<u8>> {
    if let Some(kind) = nvl.tree_error() {
        log::debug!("refusing to encode a list in the error state: {}", kind);
        return Err(kind);
    }
    let descriptors = nvl.descriptor_count();
    if descriptors > 0 {
        log::debug!("refusing to encode a list holding {} descriptors", descriptors);
        return Err(ErrorKind::Unsupported);
    }

    let mut out = Vec::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    put(&mut out, b"{")?;
    stack.push(Frame::List {
        entries: nvl.iter(),
        first: true,
    });

    while let Some(frame) = stack.last_mut() {
        let opened = match frame {
            Frame::List { entries, first } => match entries.next() {
                Some((name, value)) => {
                    if !core::mem::replace(first, false) {
                        put(&mut out, b",")?;
                    }
                    escape::write_quoted(&mut out, name)?;
                    put(&mut out, b":")?;
                    match value {
                        Value::NvList(child) => {
                            put(&mut out, b"{")?;
                            Some(Frame::List {
                                entries: child.iter(),
                                first: true,
                            })
                        }
                        Value::NvListArray(items) => {
                            put(&mut out, b"[")?;
                            Some(Frame::ListArray {
                                items: items.iter(),
                                first: true,
                            })
                        }
                        other => {
                            write_value(&mut out, other)?;
                            None
                        }
                    }
                }
                None => {
                    put(&mut out, b"}")?;
                    stack.pop();
                    None
                }
            },
            Frame::ListArray { items, first } => match items.next() {
                Some(item) => {
                    if !core::mem::replace(first, false) {
                        put(&mut out, b",")?;
                    }
                    put(&mut out, b"{")?;
                    Some(Frame::List {
                        entries: item.iter(),
                        first: true,
                    })
                }
                None => {
                    put(&mut out, b"]")?;
                    stack.pop();
                    None
                }
            },
        };
        if let Some(frame) = opened {
            log::trace!("descending to depth {}", stack.len() + 1);
            stack.try_reserve(1)?;
            stack.push(frame);
        }
    }

    put(&mut out, b"\n")?;
    Ok(out)
}

/// Encodes `nvl` into a `String`.
pub fn encode_to_string(nvl: &NvList) -> Result<String> {
    let out = encode_to_vec(nvl)?;
    String::from_utf8(out).map_err(|_| ErrorKind::InvalidInput)
}

fn put(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    out.try_reserve(bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Writes a value that does not open a scope.
fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Null => put(out, b"null"),
        Value::Bool(b) => write_bool(out, *b),
        Value::Number(n) => write_number(out, *n),
        Value::String(s) => escape::write_quoted(out, s),
        Value::Binary(data) => {
            put(out, b"\"")?;
            escape::write_hex(out, data)?;
            put(out, b"\"")
        }
        Value::BoolArray(v) => write_array(out, v, |out, b| write_bool(out, *b)),
        Value::NumberArray(v) => write_array(out, v, |out, n| write_number(out, *n)),
        Value::StringArray(v) => write_array(out, v, |out, s| escape::write_quoted(out, s)),
        Value::Descriptor(_) | Value::DescriptorArray(_) => Err(ErrorKind::Unsupported),
        Value::NvList(_) | Value::NvListArray(_) => Err(ErrorKind::InvalidInput),
    }
}

fn write_array<T>(
    out: &mut Vec<u8>,
    items: &[T],
    mut write: impl FnMut(&mut Vec<u8>, &T) -> Result<()>,
) -> Result<()> {
    put(out, b"[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            put(out, b",")?;
        }
        write(out, item)?;
    }
    put(out, b"]")
}

fn write_bool(out: &mut Vec<u8>, value: bool) -> Result<()> {
    put(out, if value { &b"true"[..] } else { &b"false"[..] })
}

fn write_number(out: &mut Vec<u8>, mut value: u64) -> Result<()> {
    let mut digits = [0u8; 20];
    let mut start = digits.len();
    loop {
        start -= 1;
        if let Some(slot) = digits.get_mut(start) {
            *slot = b'0' + (value % 10) as u8;
        }
        value /= 10;
        if value == 0 {
            break;
        }
    }
    put(out, digits.get(start..).unwrap_or_default())
}
