// SPDX-License-Identifier: Apache-2.0

//! Unsigned decimal parsing with overflow detection.

use crate::error::ErrorKind;

/// Folds decimal digits into a `u64` one at a time.
///
/// A leading `0` is only accepted as the whole number zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    value: u64,
    digits: usize,
}

impl Accumulator {
    pub const fn new() -> Self {
        Self {
            value: 0,
            digits: 0,
        }
    }

    /// Folds in one ASCII digit.
    pub fn push(&mut self, byte: u8) -> Result<(), ErrorKind> {
        let digit = match byte {
            b'0'..=b'9' => (byte - b'0') as u64,
            _ => return Err(ErrorKind::InvalidInput),
        };
        if self.digits == 1 && self.value == 0 {
            return Err(ErrorKind::InvalidInput);
        }
        self.value = match self.value.checked_mul(10) {
            Some(val) => val,
            None => return Err(ErrorKind::InvalidInput),
        };
        self.value = match self.value.checked_add(digit) {
            Some(val) => val,
            None => return Err(ErrorKind::InvalidInput),
        };
        self.digits += 1;
        Ok(())
    }

    /// The parsed value, or an error if no digit was pushed.
    pub const fn finish(&self) -> Result<u64, ErrorKind> {
        if self.digits == 0 {
            Err(ErrorKind::InvalidInput)
        } else {
            Ok(self.value)
        }
    }
}
