// SPDX-License-Identifier: Apache-2.0

//! The string escape table shared by the decoder and the encoder, and the
//! hex codec used to carry binary values as JSON strings.

use alloc::vec::Vec;

use crate::error::ErrorKind;

/// Maps the character following a backslash to the byte it stands for.
///
/// Only the simple escapes are recognized; `\u` sequences are rejected
/// together with every other character.
pub const fn unescape(escape_char: u8) -> Result<u8, ErrorKind> {
    match escape_char {
        b'n' => Ok(b'\n'),
        b't' => Ok(b'\t'),
        b'r' => Ok(b'\r'),
        b'\\' => Ok(b'\\'),
        b'"' => Ok(b'"'),
        b'/' => Ok(b'/'),
        b'b' => Ok(0x08), // Backspace
        b'f' => Ok(0x0C), // Form feed
        _ => Err(ErrorKind::InvalidInput),
    }
}

/// The escape character for `byte`, if it must be escaped on output.
///
/// `/` is accepted escaped on input but written as is.
pub const fn escape_char(byte: u8) -> Option<u8> {
    match byte {
        b'\n' => Some(b'n'),
        b'\t' => Some(b't'),
        b'\r' => Some(b'r'),
        b'\\' => Some(b'\\'),
        b'"' => Some(b'"'),
        0x08 => Some(b'b'),
        0x0C => Some(b'f'),
        _ => None,
    }
}

/// Appends `s` to `out` as a quoted JSON string.
pub fn write_quoted(out: &mut Vec<u8>, s: &str) -> Result<(), ErrorKind> {
    out.try_reserve(s.len().saturating_add(2))?;
    out.push(b'"');
    let mut start = 0;
    let bytes = s.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        if let Some(escaped) = escape_char(byte) {
            out.extend_from_slice(bytes.get(start..i).unwrap_or_default());
            out.try_reserve(2)?;
            out.push(b'\\');
            out.push(escaped);
            start = i + 1;
        }
    }
    out.extend_from_slice(bytes.get(start..).unwrap_or_default());
    out.push(b'"');
    Ok(())
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Appends `data` as lowercase hex pairs.
pub fn write_hex(out: &mut Vec<u8>, data: &[u8]) -> Result<(), ErrorKind> {
    out.try_reserve(data.len().saturating_mul(2))?;
    for &byte in data {
        out.push(HEX_DIGITS[usize::from(byte >> 4)]);
        out.push(HEX_DIGITS[usize::from(byte & 0x0f)]);
    }
    Ok(())
}

/// Parses lowercase or uppercase hex pairs back into bytes.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, ErrorKind> {
    let digits = text.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(ErrorKind::InvalidInput);
    }
    let mut out = Vec::new();
    out.try_reserve_exact(digits.len() / 2)?;
    for pair in digits.chunks_exact(2) {
        if let [high, low] = *pair {
            out.push((hex_value(high)? << 4) | hex_value(low)?);
        }
    }
    Ok(out)
}

const fn hex_value(byte: u8) -> Result<u8, ErrorKind> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(ErrorKind::InvalidInput),
    }
}
