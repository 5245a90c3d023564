use super::arena::NodeId;
use super::BPlusTreeMap;
use crate::Comparator;
use std::cmp::Ordering;
use std::fmt;

/// A detached position within a map's entries.
///
/// A cursor borrows nothing from its map: every operation takes the map as
/// an argument, and a version snapshot taken at creation makes any call
/// after a mutation fail with [`CursorError::Modified`] instead of yielding
/// entries from a tree that has changed shape underneath it. Exhaustion is
/// an error of its own, [`CursorError::Exhausted`], so `has_next` plus
/// `next` can be driven imperatively.
///
/// A cursor is only meaningful with the map it was created from.
///
/// # Examples
///
/// ```
/// use bptree_index::BPlusTreeMap;
/// use bptree_index::bptree::CursorError;
///
/// let mut map = BPlusTreeMap::new();
/// map.insert(1, "a");
///
/// let mut cursor = map.cursor();
/// assert_eq!(cursor.next(&map), Ok((&1, &["a"][..])));
/// assert_eq!(cursor.next(&map), Err(CursorError::Exhausted));
///
/// // Any mutation invalidates a live cursor.
/// let mut cursor = map.cursor();
/// map.insert(2, "b");
/// assert_eq!(cursor.next(&map), Err(CursorError::Modified));
/// ```
#[derive(Clone, Debug)]
pub struct Cursor<K> {
    // The leaf holding the next entry; `None` once the chain is exhausted.
    leaf: Option<NodeId>,

    // The position of the next entry within that leaf. Always points at an
    // existing entry while `leaf` is set.
    index: usize,

    // The exclusive upper bound, if any.
    high: Option<K>,

    // The map version this cursor was created at.
    expected_version: u64,
}

impl<K: Clone> Cursor<K> {
    /// Creates a cursor over the keys of `map` in `[low, high)`, with either
    /// bound optional.
    pub(crate) fn new<V, C>(map: &BPlusTreeMap<K, V, C>, low: Option<&K>, high: Option<K>) -> Self
    where
        C: Comparator<K>,
    {
        let position = match low {
            // Unbounded below: start at the head of the leaf chain.
            None => Some((map.first_leaf, 0)),
            Some(low) => Self::position_at(map, low),
        };
        let (leaf, index) = match position {
            Some((leaf, index)) => (Some(leaf), index),
            None => (None, 0),
        };
        Self {
            leaf,
            index,
            high,
            expected_version: map.version,
        }
    }

    /// Finds the position of the first key at or above `low`, if any.
    fn position_at<V, C>(map: &BPlusTreeMap<K, V, C>, low: &K) -> Option<(NodeId, usize)>
    where
        C: Comparator<K>,
    {
        let (mut id, mut leaf) = map.locate_leaf(low);
        // An empty leaf is only ever the root of an empty map.
        let max = leaf.keys.last()?;

        // The descent lands one leaf short when `low` falls in the gap
        // between this leaf's last key and the next leaf's first; hop once.
        if map.comparator.cmp(max, low) == Ordering::Less {
            id = leaf.next?;
            leaf = map.arena.leaf(id);
        }

        // Scan forward to the first key not below `low`.
        let mut index = 0;
        while index < leaf.keys.len()
            && map.comparator.cmp(&leaf.keys[index], low) == Ordering::Less
        {
            index += 1;
        }
        Some((id, index))
    }

    /// Returns `true` if a call to [`next`](Self::next) would yield an entry.
    ///
    /// Fails with [`CursorError::Modified`] if `map` has been mutated since
    /// this cursor was created.
    pub fn has_next<V, C>(&self, map: &BPlusTreeMap<K, V, C>) -> Result<bool, CursorError>
    where
        C: Comparator<K>,
    {
        self.check_unmodified(map)?;
        Ok(self.peek(map).is_some())
    }

    /// Yields the entry at the cursor's position and advances past it.
    ///
    /// Fails with [`CursorError::Modified`] if `map` has been mutated since
    /// this cursor was created, and with [`CursorError::Exhausted`] once no
    /// entries remain below the cursor's upper bound.
    pub fn next<'a, V, C>(
        &mut self,
        map: &'a BPlusTreeMap<K, V, C>,
    ) -> Result<(&'a K, &'a [V]), CursorError>
    where
        C: Comparator<K>,
    {
        self.check_unmodified(map)?;
        let entry = self.peek(map).ok_or(CursorError::Exhausted)?;

        // Advance, moving to the next leaf once this one is spent.
        self.index += 1;
        let leaf = map.arena.leaf(self.leaf.expect("the peeked entry came from a leaf"));
        if self.index >= leaf.keys.len() {
            self.leaf = leaf.next;
            self.index = 0;
        }

        Ok(entry)
    }

    /// The entry at the cursor's position, unless iteration is over or the
    /// entry falls outside the upper bound.
    fn peek<'a, V, C>(&self, map: &'a BPlusTreeMap<K, V, C>) -> Option<(&'a K, &'a [V])>
    where
        C: Comparator<K>,
    {
        let leaf = map.arena.leaf(self.leaf?);
        let key = leaf.keys.get(self.index)?;
        if let Some(high) = &self.high {
            if map.comparator.cmp(key, high) != Ordering::Less {
                return None;
            }
        }
        Some((key, leaf.values[self.index].as_slice()))
    }

    fn check_unmodified<V, C>(&self, map: &BPlusTreeMap<K, V, C>) -> Result<(), CursorError>
    where
        C: Comparator<K>,
    {
        if map.version == self.expected_version {
            Ok(())
        } else {
            Err(CursorError::Modified)
        }
    }
}

/// The ways a cursor operation can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorError {
    /// The map was mutated after the cursor was created.
    Modified,
    /// Every entry within the cursor's bounds has been yielded.
    Exhausted,
}

impl fmt::Display for CursorError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modified => write!(fmt, "the map was mutated while the cursor was live"),
            Self::Exhausted => write!(fmt, "the cursor has yielded every entry in its range"),
        }
    }
}

impl std::error::Error for CursorError {}

/// An iterator over the entries of a [`BPlusTreeMap`], ascending by key.
/// Each item pairs a key with the slice of all values inserted under it.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    // The map being iterated on.
    map: &'a BPlusTreeMap<K, V, C>,

    // The position of the next entry. The borrow of `map` above is what
    // keeps the cursor's version check from ever failing here.
    cursor: Cursor<K>,
}

impl<'a, K, V, C> Iter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    pub(crate) fn new(map: &'a BPlusTreeMap<K, V, C>) -> Self {
        Self {
            map,
            cursor: Cursor::new(map, None, None),
        }
    }

    pub(crate) fn new_in_range(
        map: &'a BPlusTreeMap<K, V, C>,
        low: Option<&K>,
        high: Option<K>,
    ) -> Self {
        Self {
            map,
            cursor: Cursor::new(map, low, high),
        }
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.next(self.map) {
            Ok(entry) => Some(entry),
            Err(CursorError::Exhausted) => None,
            Err(CursorError::Modified) => {
                unreachable!("the map cannot be mutated while an iterator borrows it")
            }
        }
    }
}

/// An iterator over the keys of a [`BPlusTreeMap`], ascending.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct KeysIter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> KeysIter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    pub(crate) fn new(inner: Iter<'a, K, V, C>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V, C> Iterator for KeysIter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// An iterator over the value lists of a [`BPlusTreeMap`], ascending by key.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesIter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> ValuesIter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    pub(crate) fn new(inner: Iter<'a, K, V, C>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V, C> Iterator for ValuesIter<'a, K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    type Item = &'a [V];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, values)| values)
    }
}
