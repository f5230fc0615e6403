// SPDX-License-Identifier: Apache-2.0

//! The name/value container.
//!
//! Entries live in an arena of slots addressed by index. Insertion order is a
//! doubly linked list threaded through the slots, so vacated slots can be
//! reused without disturbing iteration order. Lookups go through an index
//! keyed by (possibly case-folded) name, then by kind; each leaf is a queue of
//! slots in insertion order, so the front of a queue is the entry that `get`
//! resolves to.

mod accessors;
mod cursor;

pub use cursor::{Cursor, ParentLink};

use alloc::borrow::Cow;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{ErrorKind, Result};
use crate::flags::NvFlags;
use crate::value::{Value, ValueKind};

/// Entries sharing one name, split by kind.
type Group = BTreeMap<ValueKind, VecDeque<usize>>;

struct Node {
    name: String,
    value: Value,
    /// Insertion sequence number, used to order entries across groups.
    seq: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A typed, ordered name/value list.
///
/// See the crate documentation for the ownership and error-state rules.
pub struct NvList {
    flags: NvFlags,
    error: Option<ErrorKind>,
    slots: Vec<Slot>,
    vacant: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    next_seq: u64,
    index: BTreeMap<String, Group>,
    parent: Option<ParentLink>,
}

/// Index key for `name` under `flags`.
fn index_key(flags: NvFlags, name: &str) -> Cow<'_, str> {
    if flags.ignores_case() && name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

fn adopt(value: &mut Value, cursor: Cursor) {
    match value {
        Value::NvList(child) => child.parent = Some(ParentLink::new(cursor, None)),
        Value::NvListArray(children) => {
            for (i, child) in children.iter_mut().enumerate() {
                child.parent = Some(ParentLink::new(cursor, Some(i)));
            }
        }
        _ => {}
    }
}

/// Error state of a list carried directly by `value`.
fn nested_error(value: &Value) -> Option<ErrorKind> {
    match value {
        Value::NvList(child) => child.error,
        Value::NvListArray(children) => children.iter().find_map(|child| child.error),
        _ => None,
    }
}

fn orphan(value: &mut Value) {
    match value {
        Value::NvList(child) => child.parent = None,
        Value::NvListArray(children) => children.iter_mut().for_each(|c| c.parent = None),
        _ => {}
    }
}

impl NvList {
    /// Creates an empty list.
    pub fn new(flags: NvFlags) -> Self {
        Self {
            flags,
            error: None,
            slots: Vec::new(),
            vacant: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            next_seq: 0,
            index: BTreeMap::new(),
            parent: None,
        }
    }

    pub fn flags(&self) -> NvFlags {
        self.flags
    }

    /// The sticky error, if any mutation has failed.
    pub fn error(&self) -> Option<ErrorKind> {
        self.error
    }

    /// Sets the sticky error. An error that is already set is kept.
    pub fn set_error(&mut self, kind: ErrorKind) {
        if self.error.is_none() {
            self.error = Some(kind);
        }
    }

    /// Resets the sticky error so the list accepts mutation again.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The entry of the enclosing list that holds this one, while attached.
    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    /// Whether an entry named `name` exists, of any kind.
    pub fn exists(&self, name: &str) -> bool {
        self.group(name).is_some()
    }

    /// Whether an entry named `name` of kind `kind` exists.
    pub fn exists_type(&self, name: &str, kind: ValueKind) -> bool {
        self.front(name, kind).is_ok()
    }

    /// Earliest-inserted value named `name` of kind `kind`.
    pub fn get_value(&self, name: &str, kind: ValueKind) -> Result<&Value> {
        let slot = self.front(name, kind)?;
        self.node(slot)
            .map(|node| &node.value)
            .ok_or(ErrorKind::NotFound)
    }

    /// Earliest-inserted value named `name`, of any kind.
    pub fn get_any(&self, name: &str) -> Result<&Value> {
        let slot = self.earliest(name).ok_or(ErrorKind::NotFound)?;
        self.node(slot)
            .map(|node| &node.value)
            .ok_or(ErrorKind::NotFound)
    }

    /// Adds `value` under `name`.
    ///
    /// Fails, and sets the sticky error, on a NUL in the name or a string, on
    /// an empty array, on a duplicate name when the list requires unique
    /// names, and when storage cannot grow.
    pub fn add_value(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name, value).map(|_| ())
    }

    /// Removes the earliest-inserted entry named `name` of kind `kind` and
    /// returns its value.
    pub fn take_value(&mut self, name: &str, kind: ValueKind) -> Result<Value> {
        self.ensure_writable()?;
        let slot = self.front(name, kind)?;
        self.remove_slot(slot)
            .map(|(_, value)| value)
            .ok_or(ErrorKind::NotFound)
    }

    /// Drops the earliest-inserted entry named `name` of kind `kind`.
    pub fn free_type(&mut self, name: &str, kind: ValueKind) -> Result<()> {
        self.take_value(name, kind).map(drop)
    }

    /// Drops the earliest-inserted entry named `name`, of any kind.
    pub fn free(&mut self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        let slot = self.earliest(name).ok_or(ErrorKind::NotFound)?;
        self.remove_slot(slot).map(drop).ok_or(ErrorKind::NotFound)
    }

    /// Drops every entry. The flags and the error state are unchanged.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_writable()?;
        while let Some(slot) = self.head {
            self.remove_slot(slot);
        }
        Ok(())
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Counts descriptors held by this list and every list nested in it.
    pub fn descriptor_count(&self) -> usize {
        let mut count = 0;
        self.for_each_list(|list| {
            for (_, value) in list.iter() {
                match value {
                    Value::Descriptor(_) => count += 1,
                    Value::DescriptorArray(fds) => count += fds.len(),
                    _ => {}
                }
            }
        });
        count
    }

    /// The sticky error of this list, or else of the first list nested in it
    /// that has one.
    pub fn tree_error(&self) -> Option<ErrorKind> {
        let mut found = None;
        self.for_each_list(|list| found = found.or(list.error));
        found
    }

    /// Deep copy that reports failure instead of hiding it.
    ///
    /// The copy is detached and keeps the error state of every list it
    /// copies. When the copy cannot be completed, for example because its
    /// storage cannot grow, the partial copy is dropped and the failure is
    /// returned.
    pub fn try_clone(&self) -> Result<NvList> {
        let mut stack: Vec<CloneFrame<'_>> = Vec::new();
        stack.push(CloneFrame::list("", self));
        loop {
            let opened = match stack.last_mut() {
                Some(CloneFrame::List { entries, copy, .. }) => match entries.next() {
                    Some((name, Value::NvList(child))) => Some(CloneFrame::list(name, child)),
                    Some((name, Value::NvListArray(children))) => {
                        let mut copies = Vec::new();
                        copies.try_reserve_exact(children.len())?;
                        Some(CloneFrame::ListArray {
                            name,
                            items: children.iter(),
                            copies,
                        })
                    }
                    Some((name, value)) => {
                        copy.insert(name, value.clone())?;
                        continue;
                    }
                    None => None,
                },
                Some(CloneFrame::ListArray { items, .. }) => {
                    items.next().map(|item| CloneFrame::list("", item))
                }
                // The root frame returns before the stack runs empty.
                None => return Err(ErrorKind::NotFound),
            };
            if let Some(frame) = opened {
                stack.try_reserve(1)?;
                stack.push(frame);
                continue;
            }

            match stack.pop() {
                Some(CloneFrame::List {
                    name,
                    source_error,
                    mut copy,
                    ..
                }) => {
                    copy.error = source_error;
                    match stack.last_mut() {
                        None => return Ok(copy),
                        Some(CloneFrame::List { copy: parent, .. }) => {
                            parent.insert(name, Value::from(copy))?;
                        }
                        Some(CloneFrame::ListArray { copies, .. }) => copies.push(copy),
                    }
                }
                Some(CloneFrame::ListArray { name, copies, .. }) => {
                    if let Some(CloneFrame::List { copy: parent, .. }) = stack.last_mut() {
                        parent.insert(name, Value::NvListArray(copies))?;
                    }
                }
                None => return Err(ErrorKind::NotFound),
            }
        }
    }

    /// Calls `visit` on this list and on every list nested in it.
    fn for_each_list<'a>(&'a self, mut visit: impl FnMut(&'a NvList)) {
        let mut pending: Vec<&'a NvList> = Vec::new();
        pending.push(self);
        while let Some(list) = pending.pop() {
            visit(list);
            for (_, value) in list.iter() {
                match value {
                    Value::NvList(child) => pending.push(child),
                    Value::NvListArray(children) => pending.extend(children.iter()),
                    _ => {}
                }
            }
        }
    }

    /// Moves every directly nested list out of this one into `pending`.
    fn detach_nested(&mut self, pending: &mut Vec<NvList>) {
        for slot in &mut self.slots {
            let Some(node) = slot.node.as_mut() else {
                continue;
            };
            match &mut node.value {
                Value::NvList(child) => pending.push(core::mem::take(&mut **child)),
                Value::NvListArray(children) => pending.append(children),
                _ => {}
            }
        }
    }

    pub(crate) fn insert(&mut self, name: &str, mut value: Value) -> Result<Cursor> {
        self.ensure_writable()?;
        if name.contains('\0') || !value.is_storable() {
            log::debug!("rejecting {} entry {:?}: invalid name or value", value.kind(), name);
            return self.fail(ErrorKind::InvalidInput);
        }
        if let Some(kind) = nested_error(&value) {
            log::debug!("rejecting {} entry {:?}: nested list is in the error state", value.kind(), name);
            return self.fail(kind);
        }
        if !self.flags.allows_duplicates() && self.exists(name) {
            log::debug!("rejecting duplicate name {:?}", name);
            return self.fail(ErrorKind::Exists);
        }
        let owned_name = match self.reserve_entry(name) {
            Ok(owned) => owned,
            Err(kind) => return self.fail(kind),
        };

        let slot = match self.vacant.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                self.slots.len() - 1
            }
        };
        let generation = self.slots.get(slot).map_or(0, |s| s.generation);
        let cursor = Cursor::new(slot, generation);
        adopt(&mut value, cursor);

        let kind = value.kind();
        let seq = self.next_seq;
        self.next_seq += 1;
        let node = Node {
            name: owned_name,
            value,
            seq,
            prev: self.tail,
            next: None,
        };
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.node = Some(node);
        }
        match self.tail.and_then(|tail| self.node_mut(tail)) {
            Some(last) => last.next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;

        self.index
            .entry(index_key(self.flags, name).into_owned())
            .or_default()
            .entry(kind)
            .or_default()
            .push_back(slot);
        Ok(cursor)
    }

    /// Makes room for one more entry and copies its name.
    fn reserve_entry(&mut self, name: &str) -> Result<String> {
        if self.vacant.is_empty() {
            self.slots.try_reserve(1)?;
        }
        let mut owned = String::new();
        owned.try_reserve_exact(name.len())?;
        owned.push_str(name);
        Ok(owned)
    }

    /// Detaches the node in `slot`, returning its name and value.
    fn remove_slot(&mut self, slot: usize) -> Option<(String, Value)> {
        let entry = self.slots.get_mut(slot)?;
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);

        match node.prev.and_then(|prev| self.node_mut(prev)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|next| self.node_mut(next)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }

        let kind = node.value.kind();
        let key = index_key(self.flags, &node.name);
        if let Some(group) = self.index.get_mut(key.as_ref()) {
            if let Some(queue) = group.get_mut(&kind) {
                if let Some(pos) = queue.iter().position(|&s| s == slot) {
                    queue.remove(pos);
                }
                if queue.is_empty() {
                    group.remove(&kind);
                }
            }
            if group.is_empty() {
                self.index.remove(key.as_ref());
            }
        }

        self.vacant.push(slot);
        self.len -= 1;
        let Node {
            name, mut value, ..
        } = node;
        orphan(&mut value);
        Some((name, value))
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.index.get(index_key(self.flags, name).as_ref())
    }

    /// Front slot of the (name, kind) queue.
    fn front(&self, name: &str, kind: ValueKind) -> Result<usize> {
        let group = self.group(name).ok_or(ErrorKind::NotFound)?;
        group
            .get(&kind)
            .and_then(|queue| queue.front().copied())
            .ok_or(ErrorKind::TypeMismatch)
    }

    /// Earliest-inserted slot named `name` across all kinds.
    fn earliest(&self, name: &str) -> Option<usize> {
        self.group(name)?
            .values()
            .filter_map(|queue| queue.front().copied())
            .min_by_key(|&slot| self.node(slot).map_or(u64::MAX, |node| node.seq))
    }

    fn node(&self, slot: usize) -> Option<&Node> {
        self.slots.get(slot)?.node.as_ref()
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node> {
        self.slots.get_mut(slot)?.node.as_mut()
    }

    fn ensure_writable(&self) -> Result<()> {
        match self.error {
            Some(_) => Err(ErrorKind::AlreadyInErrorState),
            None => Ok(()),
        }
    }

    fn fail<T>(&mut self, kind: ErrorKind) -> Result<T> {
        self.set_error(kind);
        Err(kind)
    }
}

impl Default for NvList {
    fn default() -> Self {
        Self::new(NvFlags::empty())
    }
}

impl Drop for NvList {
    fn drop(&mut self) {
        // Nested lists are emptied one at a time from a work list.
        let mut pending = Vec::new();
        self.detach_nested(&mut pending);
        while let Some(mut list) = pending.pop() {
            list.detach_nested(&mut pending);
        }
    }
}

/// An open scope of [`NvList::try_clone`].
enum CloneFrame<'a> {
    List {
        /// Name the finished copy is filed under in its parent.
        name: &'a str,
        entries: Iter<'a>,
        source_error: Option<ErrorKind>,
        copy: NvList,
    },
    ListArray {
        name: &'a str,
        items: core::slice::Iter<'a, NvList>,
        copies: Vec<NvList>,
    },
}

impl<'a> CloneFrame<'a> {
    fn list(name: &'a str, source: &'a NvList) -> Self {
        CloneFrame::List {
            name,
            entries: source.iter(),
            source_error: source.error,
            copy: NvList::new(source.flags),
        }
    }
}

impl Clone for NvList {
    /// Deep copy. The copy is detached: it has no parent link.
    ///
    /// A copy that cannot be completed comes back empty, with the failure as
    /// its error. [`NvList::try_clone`] returns the failure instead.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|kind| {
            let mut copy = NvList::new(self.flags);
            copy.error = Some(kind);
            copy
        })
    }
}

impl PartialEq for NvList {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&NvList, &NvList)> = Vec::new();
        pending.push((self, other));
        while let Some((a, b)) = pending.pop() {
            if a.error != b.error || a.len != b.len {
                return false;
            }
            for ((an, av), (bn, bv)) in a.iter().zip(b.iter()) {
                if an != bn {
                    return false;
                }
                match (av, bv) {
                    (Value::NvList(x), Value::NvList(y)) => pending.push((&**x, &**y)),
                    (Value::NvListArray(xs), Value::NvListArray(ys)) => {
                        if xs.len() != ys.len() {
                            return false;
                        }
                        pending.extend(xs.iter().zip(ys.iter()));
                    }
                    _ if av != bv => return false,
                    _ => {}
                }
            }
        }
        true
    }
}

impl core::fmt::Debug for NvList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing iterator over a list's entries in insertion order.
pub struct Iter<'a> {
    list: &'a NvList,
    next: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.next?)?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((node.name.as_str(), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a NvList {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn names(list: &NvList) -> Vec<&str> {
        list.iter().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_insertion_order_survives_slot_reuse() {
        let mut nvl = NvList::new(NvFlags::empty());
        nvl.add_value("a", Value::Number(1)).unwrap();
        nvl.add_value("b", Value::Number(2)).unwrap();
        nvl.add_value("c", Value::Number(3)).unwrap();
        nvl.free("b").unwrap();
        // Reuses b's slot but must be iterated last.
        nvl.add_value("d", Value::Number(4)).unwrap();
        assert_eq!(names(&nvl), vec!["a", "c", "d"]);
        assert_eq!(nvl.len(), 3);
        assert_eq!(nvl.iter().len(), 3);
    }

    #[test]
    fn test_unique_mode_rejects_duplicate_of_any_kind() {
        let mut nvl = NvList::default();
        nvl.add_value("k", Value::Number(1)).unwrap();
        assert_eq!(nvl.add_value("k", Value::Bool(true)), Err(ErrorKind::Exists));
        assert_eq!(nvl.error(), Some(ErrorKind::Exists));
    }

    #[test]
    fn test_get_resolves_kind_before_name() {
        let mut nvl = NvList::new(NvFlags::NO_UNIQUE);
        nvl.add_value("k", Value::Bool(true)).unwrap();
        assert_eq!(
            nvl.get_value("k", ValueKind::Number),
            Err(ErrorKind::TypeMismatch)
        );
        assert_eq!(
            nvl.get_value("missing", ValueKind::Number),
            Err(ErrorKind::NotFound)
        );
        assert_eq!(nvl.error(), None);
    }

    #[test]
    fn test_earliest_across_kinds() {
        let mut nvl = NvList::new(NvFlags::NO_UNIQUE);
        nvl.add_value("k", Value::Bool(false)).unwrap();
        nvl.add_value("k", Value::Number(5)).unwrap();
        assert_eq!(nvl.get_any("k"), Ok(&Value::Bool(false)));
        nvl.free("k").unwrap();
        assert_eq!(nvl.get_any("k"), Ok(&Value::Number(5)));
        nvl.free("k").unwrap();
        assert!(!nvl.exists("k"));
        assert!(nvl.is_empty());
    }

    #[test]
    fn test_ignore_case() {
        let mut nvl = NvList::new(NvFlags::IGNORE_CASE);
        nvl.add_value("Name", Value::Number(1)).unwrap();
        assert!(nvl.exists("NAME"));
        assert_eq!(nvl.get_value("name", ValueKind::Number), Ok(&Value::Number(1)));
        assert_eq!(nvl.add_value("nAmE", Value::Null), Err(ErrorKind::Exists));
        // Original spelling is kept for iteration.
        assert_eq!(names(&nvl), vec!["Name"]);
    }

    #[test]
    fn test_invalid_input_is_sticky() {
        let mut nvl = NvList::default();
        assert_eq!(
            nvl.add_value("bad\0name", Value::Null),
            Err(ErrorKind::InvalidInput)
        );
        assert_eq!(
            nvl.add_value("fine", Value::Null),
            Err(ErrorKind::AlreadyInErrorState)
        );
        assert_eq!(nvl.error(), Some(ErrorKind::InvalidInput));
        assert!(nvl.is_empty());
        nvl.clear_error();
        nvl.add_value("fine", Value::Null).unwrap();
    }

    #[test]
    fn test_parent_link_follows_ownership() {
        let mut parent = NvList::default();
        parent.add_value("x", Value::Null).unwrap();
        parent.add_value("child", Value::from(NvList::default())).unwrap();
        let link = match parent.get_value("child", ValueKind::NvList) {
            Ok(Value::NvList(child)) => child.parent().unwrap(),
            other => panic!("Expected nested list, got {:?}", other),
        };
        assert_eq!(link.index, None);
        assert_eq!(parent.get_at(link.cursor).unwrap().0, "child");

        match parent.take_value("child", ValueKind::NvList) {
            Ok(Value::NvList(child)) => assert_eq!(child.parent(), None),
            other => panic!("Expected nested list, got {:?}", other),
        }
    }

    #[test]
    fn test_parent_link_indexes_array_elements() {
        let mut parent = NvList::default();
        let items = vec![NvList::default(), NvList::default(), NvList::default()];
        parent.add_value("items", Value::NvListArray(items)).unwrap();
        match parent.get_value("items", ValueKind::NvListArray) {
            Ok(Value::NvListArray(items)) => {
                for (i, item) in items.iter().enumerate() {
                    assert_eq!(item.parent().and_then(|p| p.index), Some(i));
                }
            }
            other => panic!("Expected nvlist array, got {:?}", other),
        }
    }

    #[test]
    fn test_clone_is_detached_and_equal() {
        let mut parent = NvList::default();
        let mut child = NvList::default();
        child.add_value("n", Value::Number(9)).unwrap();
        parent.add_value("c", Value::from(child)).unwrap();
        let nested = match parent.get_value("c", ValueKind::NvList) {
            Ok(Value::NvList(child)) => (**child).clone(),
            other => panic!("Expected nested list, got {:?}", other),
        };
        assert_eq!(nested.parent(), None);
        assert_eq!(parent.clone(), parent);
    }

    #[test]
    fn test_descriptor_count_is_recursive() {
        let mut inner = NvList::default();
        inner.add_value("fd", Value::Descriptor(4)).unwrap();
        let mut outer = NvList::default();
        outer
            .add_value("fds", Value::DescriptorArray(vec![1, 2]))
            .unwrap();
        outer
            .add_value("list", Value::NvListArray(vec![inner.clone(), inner]))
            .unwrap();
        assert_eq!(outer.descriptor_count(), 4);
    }

    #[test]
    fn test_clear_keeps_flags() {
        let mut nvl = NvList::new(NvFlags::NO_UNIQUE);
        nvl.add_value("a", Value::Null).unwrap();
        nvl.add_value("a", Value::Null).unwrap();
        nvl.clear().unwrap();
        assert!(nvl.is_empty());
        assert!(!nvl.exists("a"));
        assert_eq!(nvl.flags(), NvFlags::NO_UNIQUE);
    }

    fn nested_mut<'a>(list: &'a mut NvList, name: &str) -> &'a mut NvList {
        let slot = list.front(name, ValueKind::NvList).unwrap();
        match list.node_mut(slot).map(|node| &mut node.value) {
            Some(Value::NvList(child)) => &mut **child,
            _ => panic!("Expected nested list under {:?}", name),
        }
    }

    fn deep_chain(depth: usize) -> NvList {
        let mut nvl = NvList::default();
        nvl.add_value("leaf", Value::Number(depth as u64)).unwrap();
        for _ in 1..depth {
            let mut parent = NvList::default();
            parent.add_value("a", Value::from(nvl)).unwrap();
            nvl = parent;
        }
        nvl
    }

    #[test]
    fn test_child_in_error_state_is_refused() {
        let mut child = NvList::default();
        child.set_error(ErrorKind::OutOfMemory);

        let mut parent = NvList::default();
        assert_eq!(parent.add_nvlist("c", &child), Err(ErrorKind::OutOfMemory));
        assert_eq!(parent.error(), Some(ErrorKind::OutOfMemory));
        assert!(parent.is_empty());

        let mut parent = NvList::default();
        assert_eq!(parent.move_nvlist("c", child.clone()), Err(ErrorKind::OutOfMemory));
        assert_eq!(parent.error(), Some(ErrorKind::OutOfMemory));

        let mut parent = NvList::default();
        let items = vec![NvList::default(), child];
        assert_eq!(
            parent.move_nvlist_array("items", items),
            Err(ErrorKind::OutOfMemory)
        );
        assert_eq!(parent.error(), Some(ErrorKind::OutOfMemory));
        assert!(!parent.exists("items"));
    }

    #[test]
    fn test_nested_error_blocks_encoding() {
        let mut parent = NvList::default();
        parent.add_value("c", Value::from(NvList::default())).unwrap();
        assert_eq!(parent.tree_error(), None);

        nested_mut(&mut parent, "c").set_error(ErrorKind::InvalidInput);
        assert_eq!(parent.error(), None);
        assert_eq!(parent.tree_error(), Some(ErrorKind::InvalidInput));
        assert_eq!(crate::encode_to_vec(&parent), Err(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_try_clone_keeps_error_state() {
        let mut nvl = NvList::default();
        nvl.add_value("n", Value::Number(1)).unwrap();
        nvl.set_error(ErrorKind::Exists);

        let copy = nvl.try_clone().unwrap();
        assert_eq!(copy.error(), Some(ErrorKind::Exists));
        assert_eq!(copy.get_value("n", ValueKind::Number), Ok(&Value::Number(1)));
        assert_eq!(copy, nvl);
        assert_eq!(nvl.clone(), nvl);
    }

    #[test]
    fn test_try_clone_copies_arrays_of_lists() {
        let mut item = NvList::new(NvFlags::NO_UNIQUE);
        item.add_value("k", Value::Null).unwrap();
        item.add_value("k", Value::Null).unwrap();
        let mut nvl = NvList::default();
        nvl.add_value("items", Value::NvListArray(vec![item.clone(), item]))
            .unwrap();
        nvl.add_value("after", Value::Bool(true)).unwrap();

        let copy = nvl.try_clone().unwrap();
        assert_eq!(copy, nvl);
        assert_eq!(names(&copy), ["items", "after"]);
        match copy.get_value("items", ValueKind::NvListArray) {
            Ok(Value::NvListArray(items)) => {
                assert_eq!(items[1].flags(), NvFlags::NO_UNIQUE);
                assert_eq!(items[1].len(), 2);
                assert_eq!(items[1].parent().and_then(|link| link.index), Some(1));
            }
            other => panic!("Expected array of lists, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_tree_is_handled_without_recursion() {
        let depth = 100_000;
        let nvl = deep_chain(depth);
        let copy = nvl.try_clone().unwrap();
        assert!(copy == nvl);
        assert!(copy != deep_chain(depth - 1));
        drop(copy);
        drop(nvl);
    }
}
