// SPDX-License-Identifier: Apache-2.0

//! Byte-at-a-time lexing over a [`Reader`].
//!
//! The scanner never reads more than one byte past the token it is working
//! on, so a document followed by its `\n` sentinel leaves the rest of the
//! stream untouched for the next reader.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{ErrorKind, Result};
use crate::escape;
use crate::io::Reader;
use crate::number::Accumulator;
use crate::value::Value;

pub(crate) struct Scanner<R> {
    reader: R,
    peeked: Option<u8>,
    /// Bytes consumed so far.
    pos: usize,
}

impl<R: Reader> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Logs a parse failure at the current position.
    pub fn fail<T>(&self, expected: &str) -> Result<T> {
        log::debug!("invalid JSON at byte {}: expected {}", self.pos, expected);
        Err(ErrorKind::InvalidInput)
    }

    /// The next byte without consuming it, `None` at end of stream.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => self.peeked = Some(byte[0]),
                Err(_) => {
                    log::debug!("read failed at byte {}", self.pos);
                    return Err(ErrorKind::InvalidInput);
                }
            }
        }
        Ok(self.peeked)
    }

    /// Consumes and returns the next byte.
    pub fn bump(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.peeked = None;
            self.pos += 1;
        }
        Ok(byte)
    }

    /// Skips JSON whitespace and peeks at the byte after it.
    pub fn skip_whitespace(&mut self) -> Result<Option<u8>> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
            self.bump()?;
        }
        self.peek()
    }

    /// Consumes `byte` after optional whitespace.
    pub fn expect(&mut self, byte: u8, expected: &str) -> Result<()> {
        if self.skip_whitespace()? == Some(byte) {
            self.bump()?;
            Ok(())
        } else {
            self.fail(expected)
        }
    }

    /// Checks what follows the top-level value: blanks, then `\n` or end of
    /// stream. The `\n` is consumed, nothing after it is.
    pub fn end_of_document(&mut self) -> Result<()> {
        while let Some(b' ' | b'\t' | b'\r') = self.peek()? {
            self.bump()?;
        }
        match self.peek()? {
            None => Ok(()),
            Some(b'\n') => self.bump().map(drop),
            Some(_) => self.fail("end of document"),
        }
    }

    /// Reads a scalar: `null`, `true`, `false`, an unsigned number or a string.
    pub fn scalar(&mut self) -> Result<Value> {
        match self.skip_whitespace()? {
            Some(b'n') => self.literal(b"null").map(|_| Value::Null),
            Some(b't') => self.literal(b"true").map(|_| Value::Bool(true)),
            Some(b'f') => self.literal(b"false").map(|_| Value::Bool(false)),
            Some(b'0'..=b'9') => self.number().map(Value::Number),
            Some(b'"') => self.string().map(Value::String),
            _ => self.fail("value"),
        }
    }

    fn literal(&mut self, text: &[u8]) -> Result<()> {
        for &expected in text {
            if self.bump()? != Some(expected) {
                return self.fail(core::str::from_utf8(text).unwrap_or("literal"));
            }
        }
        Ok(())
    }

    fn number(&mut self) -> Result<u64> {
        let mut acc = Accumulator::new();
        while let Some(byte @ b'0'..=b'9') = self.peek()? {
            if acc.push(byte).is_err() {
                return self.fail("unsigned 64-bit number");
            }
            self.bump()?;
        }
        acc.finish().or_else(|_| self.fail("digit"))
    }

    /// Reads a quoted string, unescaping it.
    pub fn string(&mut self) -> Result<String> {
        if self.bump()? != Some(b'"') {
            return self.fail("`\"`");
        }
        let mut buf = Vec::new();
        loop {
            let byte = match self.bump()? {
                Some(b'"') => break,
                Some(b'\\') => match self.bump()? {
                    Some(c) => match escape::unescape(c) {
                        Ok(b) => b,
                        Err(_) => return self.fail("escape sequence"),
                    },
                    None => return self.fail("escape sequence"),
                },
                Some(b'\n') | None => return self.fail("closing `\"`"),
                Some(b) => b,
            };
            buf.try_reserve(1)?;
            buf.push(byte);
        }
        String::from_utf8(buf).or_else(|_| self.fail("UTF-8 string"))
    }
}
