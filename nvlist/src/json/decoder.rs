// SPDX-License-Identifier: Apache-2.0

//! JSON to [`NvList`] decoding.
//!
//! Nesting is tracked on an explicit stack of open scopes rather than by
//! recursion, so hostile input can only grow the heap up to
//! [`DecodeOptions::max_depth`] frames. Each frame owns the list it is
//! filling; closing a scope pops the frame and moves the finished list into
//! its parent. On failure the stack is dropped together with every partial
//! list it holds.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{ErrorKind, Result};
use crate::flags::NvFlags;
use crate::io::Reader;
use crate::json::scanner::Scanner;
use crate::list::NvList;
use crate::value::Value;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Flags of every list the decoder creates.
    pub flags: NvFlags,
    /// Deepest allowed nesting of objects and arrays of objects. The root
    /// counts as depth 1, so `0` only accepts empty input.
    pub max_depth: usize,
}

impl DecodeOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 256;
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            flags: NvFlags::empty(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// An open scope.
enum Frame {
    /// An object being filled, with the key of the value being read.
    Object { list: NvList, key: String },
    /// An array of objects, with the key it is stored under in the parent.
    ObjectArray { key: String, items: Vec<NvList> },
}

/// What the decoder expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Right after `{`: a key or `}`.
    FirstKey,
    /// After `,` in an object.
    Key,
    /// After `:`, or the top-level value.
    Value,
    /// After a value: a separator or the closing delimiter of the scope.
    AfterValue,
}

enum Step {
    Next(State),
    /// The root list is complete.
    Done(NvList),
}

struct Decoder<R> {
    scanner: Scanner<R>,
    options: DecodeOptions,
    stack: Vec<Frame>,
    /// The root frame stands for a top-level non-object value stored under "".
    bare_root: bool,
}

/// Decodes one JSON document from `reader` using [`DecodeOptions::default`].
///
/// The document ends at a `\n` after the top-level value, or at the end of
/// the stream. Empty input decodes to an empty list. Any failure is reported
/// as [`ErrorKind::InvalidInput`] (or [`ErrorKind::OutOfMemory`]) and no
/// partial list is returned.
pub fn decode<R: Reader>(reader: R) -> Result<NvList> {
    decode_with(reader, DecodeOptions::default())
}

/// Decodes one JSON document from `reader` with explicit options.
pub fn decode_with<R: Reader>(reader: R, options: DecodeOptions) -> Result<NvList> {
    Decoder {
        scanner: Scanner::new(reader),
        options,
        stack: Vec::new(),
        bare_root: false,
    }
    .run()
}

/// Decodes a document held in memory.
pub fn decode_slice(input: &[u8]) -> Result<NvList> {
    decode(crate::ChunkReader::full_slice(input))
}

impl<R: Reader> Decoder<R> {
    fn run(mut self) -> Result<NvList> {
        let root = NvList::new(self.options.flags);
        let mut state = match self.scanner.skip_whitespace()? {
            None => return Ok(root),
            Some(b'{') => {
                self.scanner.bump()?;
                log::trace!("enter object at depth 1");
                State::FirstKey
            }
            Some(_) => {
                self.bare_root = true;
                State::Value
            }
        };
        if self.options.max_depth == 0 {
            return self.scanner.fail("shallower nesting");
        }
        self.stack.push(Frame::Object {
            list: root,
            key: String::new(),
        });

        loop {
            let step = match state {
                State::FirstKey => {
                    if self.scanner.skip_whitespace()? == Some(b'}') {
                        self.scanner.bump()?;
                        self.close_object()?
                    } else {
                        self.key()?
                    }
                }
                State::Key => self.key()?,
                State::Value => self.value()?,
                State::AfterValue if self.bare_root && self.stack.len() == 1 => {
                    match self.stack.pop() {
                        Some(Frame::Object { list, .. }) => Step::Done(list),
                        _ => return self.scanner.fail("top-level value"),
                    }
                }
                State::AfterValue => self.after_value()?,
            };
            state = match step {
                Step::Next(next) => next,
                Step::Done(root) => return self.finish(root),
            };
        }
    }

    fn finish(&mut self, root: NvList) -> Result<NvList> {
        self.scanner.end_of_document()?;
        log::trace!("decoded {} entries from {} bytes", root.len(), self.scanner.position());
        Ok(root)
    }

    /// Reads `"key":` into the innermost object frame.
    fn key(&mut self) -> Result<Step> {
        if self.scanner.skip_whitespace()? != Some(b'"') {
            return self.scanner.fail("object key");
        }
        let name = self.scanner.string()?;
        self.scanner.expect(b':', "`:` after object key")?;
        match self.stack.last_mut() {
            Some(Frame::Object { key, .. }) => *key = name,
            _ => return self.scanner.fail("object"),
        }
        Ok(Step::Next(State::Value))
    }

    fn value(&mut self) -> Result<Step> {
        match self.scanner.skip_whitespace()? {
            Some(b'{') => {
                self.scanner.bump()?;
                self.open(Frame::Object {
                    list: NvList::new(self.options.flags),
                    key: String::new(),
                })?;
                Ok(Step::Next(State::FirstKey))
            }
            Some(b'[') => {
                self.scanner.bump()?;
                match self.scanner.skip_whitespace()? {
                    Some(b'{') => {
                        let key = match self.stack.last_mut() {
                            Some(Frame::Object { key, .. }) => core::mem::take(key),
                            _ => return self.scanner.fail("object"),
                        };
                        self.open(Frame::ObjectArray {
                            key,
                            items: Vec::new(),
                        })?;
                        self.scanner.bump()?;
                        self.open(Frame::Object {
                            list: NvList::new(self.options.flags),
                            key: String::new(),
                        })?;
                        Ok(Step::Next(State::FirstKey))
                    }
                    Some(b']') => self.scanner.fail("non-empty array"),
                    _ => {
                        let array = self.scalar_array()?;
                        self.store(array)?;
                        Ok(Step::Next(State::AfterValue))
                    }
                }
            }
            _ => {
                let value = self.scanner.scalar()?;
                self.store(value)?;
                Ok(Step::Next(State::AfterValue))
            }
        }
    }

    /// Reads the rest of an array of scalars whose `[` is consumed.
    fn scalar_array(&mut self) -> Result<Value> {
        let mut array = match self.scanner.scalar()? {
            Value::Bool(b) => Value::BoolArray(alloc::vec![b]),
            Value::Number(n) => Value::NumberArray(alloc::vec![n]),
            Value::String(s) => Value::StringArray(alloc::vec![s]),
            _ => return self.scanner.fail("array element other than null"),
        };
        loop {
            match self.scanner.skip_whitespace()? {
                Some(b',') => {
                    self.scanner.bump()?;
                    let item = self.scanner.scalar()?;
                    match push_element(&mut array, item) {
                        Ok(()) => {}
                        Err(ErrorKind::OutOfMemory) => return Err(ErrorKind::OutOfMemory),
                        Err(_) => return self.scanner.fail("element of the same type"),
                    }
                }
                Some(b']') => {
                    self.scanner.bump()?;
                    return Ok(array);
                }
                _ => return self.scanner.fail("`,` or `]`"),
            }
        }
    }

    /// After a value inside an object or an array of objects.
    fn after_value(&mut self) -> Result<Step> {
        let in_array = matches!(self.stack.last(), Some(Frame::ObjectArray { .. }));
        match (self.scanner.skip_whitespace()?, in_array) {
            (Some(b','), false) => {
                self.scanner.bump()?;
                Ok(Step::Next(State::Key))
            }
            (Some(b'}'), false) => {
                self.scanner.bump()?;
                self.close_object()
            }
            (Some(b','), true) => {
                self.scanner.bump()?;
                self.scanner.expect(b'{', "object array element")?;
                self.open(Frame::Object {
                    list: NvList::new(self.options.flags),
                    key: String::new(),
                })?;
                Ok(Step::Next(State::FirstKey))
            }
            (Some(b']'), true) => {
                self.scanner.bump()?;
                self.close_array()?;
                Ok(Step::Next(State::AfterValue))
            }
            (_, false) => self.scanner.fail("`,` or `}`"),
            (_, true) => self.scanner.fail("`,` or `]`"),
        }
    }

    fn open(&mut self, frame: Frame) -> Result<()> {
        if self.stack.len() >= self.options.max_depth {
            return self.scanner.fail("shallower nesting");
        }
        self.stack.try_reserve(1)?;
        self.stack.push(frame);
        log::trace!(
            "enter {} at depth {}",
            match self.stack.last() {
                Some(Frame::ObjectArray { .. }) => "array of objects",
                _ => "object",
            },
            self.stack.len()
        );
        Ok(())
    }

    /// Pops the innermost object and hands it to its parent scope.
    fn close_object(&mut self) -> Result<Step> {
        log::trace!("leave object at depth {}", self.stack.len());
        let list = match self.stack.pop() {
            Some(Frame::Object { list, .. }) => list,
            _ => return self.scanner.fail("object"),
        };
        match self.stack.last_mut() {
            None => return Ok(Step::Done(list)),
            Some(Frame::ObjectArray { items, .. }) => {
                items.try_reserve(1)?;
                items.push(list);
            }
            Some(Frame::Object { .. }) => self.store(Value::from(list))?,
        }
        Ok(Step::Next(State::AfterValue))
    }

    fn close_array(&mut self) -> Result<()> {
        log::trace!("leave array of objects at depth {}", self.stack.len());
        match self.stack.pop() {
            Some(Frame::ObjectArray { key, items }) => {
                // Put the key back so `store` files the array under it.
                match self.stack.last_mut() {
                    Some(Frame::Object { key: pending, .. }) => *pending = key,
                    _ => return self.scanner.fail("object"),
                }
                self.store(Value::NvListArray(items))
            }
            _ => self.scanner.fail("array of objects"),
        }
    }

    /// Adds `value` to the innermost object under its pending key.
    fn store(&mut self, value: Value) -> Result<()> {
        let result = match self.stack.last_mut() {
            Some(Frame::Object { list, key }) => list.add_value(key, value),
            _ => return self.scanner.fail("object"),
        };
        match result {
            Ok(()) => Ok(()),
            Err(ErrorKind::OutOfMemory) => Err(ErrorKind::OutOfMemory),
            Err(kind) => {
                log::debug!("cannot store value: {}", kind);
                self.scanner.fail("unique, NUL-free key")
            }
        }
    }
}

fn push_element(array: &mut Value, item: Value) -> Result<()> {
    match (array, item) {
        (Value::BoolArray(v), Value::Bool(b)) => {
            v.try_reserve(1)?;
            v.push(b);
        }
        (Value::NumberArray(v), Value::Number(n)) => {
            v.try_reserve(1)?;
            v.push(n);
        }
        (Value::StringArray(v), Value::String(s)) => {
            v.try_reserve(1)?;
            v.push(s);
        }
        _ => return Err(ErrorKind::InvalidInput),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_flat_object() {
        let nvl = decode_slice(br#"{"a": null, "b": true, "c": 7, "d": "x"}"#).unwrap();
        assert!(nvl.exists_null("a"));
        assert_eq!(nvl.get_bool("b"), Ok(true));
        assert_eq!(nvl.get_number("c"), Ok(7));
        assert_eq!(nvl.get_string("d"), Ok("x"));
        assert_eq!(nvl.len(), 4);
    }

    #[test]
    fn test_empty_documents() {
        assert!(decode_slice(b"").unwrap().is_empty());
        assert!(decode_slice(b" \n\t ").unwrap().is_empty());
        assert!(decode_slice(b"{}").unwrap().is_empty());
        assert!(decode_slice(b"{ }\n").unwrap().is_empty());
    }

    #[test]
    fn test_bare_values_go_under_empty_name() {
        assert_eq!(decode_slice(b"42").unwrap().get_number(""), Ok(42));
        assert_eq!(decode_slice(b"\"s\"\n").unwrap().get_string(""), Ok("s"));
        assert_eq!(
            decode_slice(b"[true, false]").unwrap().get_bool_array(""),
            Ok(&[true, false][..])
        );
        let nvl = decode_slice(br#"[{"a": 1}, {}]"#).unwrap();
        let items = nvl.get_nvlist_array("").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get_number("a"), Ok(1));
        assert!(items[1].is_empty());
    }

    #[test]
    fn test_nested_objects_and_arrays_of_objects() {
        let nvl = decode_slice(
            br#"{"outer": {"inner": {"n": 1}}, "list": [{"a": 1}, {"a": 2}, {}], "after": 3}"#,
        )
        .unwrap();
        let inner = nvl.get_nvlist("outer").unwrap().get_nvlist("inner").unwrap();
        assert_eq!(inner.get_number("n"), Ok(1));
        let list = nvl.get_nvlist_array("list").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].get_number("a"), Ok(2));
        assert!(list[2].is_empty());
        assert_eq!(nvl.get_number("after"), Ok(3));
    }

    #[test_log::test]
    fn test_rejects_malformed_documents() {
        for input in [
            "{",
            "{\"a\"}",
            "{\"a\":}",
            "{\"a\":1,}",
            "{\"a\":1 \"b\":2}",
            "[1,]",
            "[]",
            "{\"a\":[]}",
            "[null]",
            "[[1]]",
            "[1, \"x\"]",
            "[{\"a\":1}, 2]",
            "[{\"a\":1}",
            "{\"a\":-1}",
            "{\"a\":1.5}",
            "{\"a\":1}x",
            "{\"a\":1}}",
            "{a:1}",
        ] {
            assert_eq!(
                decode_slice(input.as_bytes()),
                Err(ErrorKind::InvalidInput),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_duplicate_keys_follow_flags() {
        let input = br#"{"k": 1, "k": 2}"#;
        assert_eq!(decode_slice(input), Err(ErrorKind::InvalidInput));

        let options = DecodeOptions {
            flags: NvFlags::NO_UNIQUE,
            ..DecodeOptions::default()
        };
        let nvl = decode_with(crate::ChunkReader::full_slice(input), options).unwrap();
        assert_eq!(nvl.len(), 2);
        assert_eq!(nvl.get_number("k"), Ok(1));
        assert_eq!(nvl.flags(), NvFlags::NO_UNIQUE);
    }

    #[test]
    fn test_max_depth() {
        let options = DecodeOptions {
            max_depth: 3,
            ..DecodeOptions::default()
        };
        let ok = br#"{"a": {"b": {}}}"#;
        let deep = br#"{"a": {"b": {"c": {}}}}"#;
        let deep_array = br#"{"a": {"b": [{}]}}"#;
        assert!(decode_with(crate::ChunkReader::full_slice(ok), options).is_ok());
        assert_eq!(
            decode_with(crate::ChunkReader::full_slice(deep), options),
            Err(ErrorKind::InvalidInput)
        );
        assert_eq!(
            decode_with(crate::ChunkReader::full_slice(deep_array), options),
            Err(ErrorKind::InvalidInput)
        );
    }

    #[test]
    fn test_zero_max_depth_counts_the_root() {
        let options = DecodeOptions {
            max_depth: 0,
            ..DecodeOptions::default()
        };
        let decode = |input: &[u8]| decode_with(crate::ChunkReader::full_slice(input), options);
        assert_eq!(decode(b"{}"), Err(ErrorKind::InvalidInput));
        assert_eq!(decode(br#"{"a": 1}"#), Err(ErrorKind::InvalidInput));
        assert_eq!(decode(b"7"), Err(ErrorKind::InvalidInput));
        assert!(decode(b" \n").unwrap().is_empty());

        let root_only = DecodeOptions {
            max_depth: 1,
            ..options
        };
        assert!(decode_with(crate::ChunkReader::full_slice(br#"{"a": 1}"#), root_only).is_ok());
        assert_eq!(
            decode_with(crate::ChunkReader::full_slice(br#"{"a": {}}"#), root_only),
            Err(ErrorKind::InvalidInput)
        );
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = DecodeOptions::DEFAULT_MAX_DEPTH;
        let mut input = Vec::new();
        for _ in 0..depth - 1 {
            input.extend_from_slice(br#"{"a":"#);
        }
        input.extend_from_slice(b"{}");
        input.extend(core::iter::repeat(b'}').take(depth - 1));
        let mut nvl = decode_slice(&input).unwrap();
        let mut levels = 1;
        while let Ok(child) = nvl.take_nvlist("a") {
            nvl = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn test_array_kinds() {
        let nvl = decode_slice(br#"{"b": [true], "n": [1, 2], "s": ["x", "y"]}"#).unwrap();
        let kinds: Vec<ValueKind> = nvl.iter().map(|(_, v)| v.kind()).collect();
        assert_eq!(
            kinds,
            [ValueKind::BoolArray, ValueKind::NumberArray, ValueKind::StringArray]
        );
    }

    #[test]
    fn test_nested_list_parent_links() {
        let nvl = decode_slice(br#"{"x": 1, "child": {"y": 2}}"#).unwrap();
        let link = nvl.get_nvlist("child").unwrap().parent().unwrap();
        assert_eq!(nvl.get_at(link.cursor).unwrap().0, "child");
    }

    #[test]
    fn test_nul_in_key_is_invalid_input() {
        assert_eq!(decode_slice(b"{\"a\0\": 1}"), Err(ErrorKind::InvalidInput));
    }
}
