//! This module implements an ordered key/value map as a B+ tree whose
//! leaves are linked into a single ascending chain.
//!
//! ```text
//!                      [ 20 | 40 ]                      <- guide node: routing keys
//!                     /     |     \
//!           [ 3, 7 ] <-> [ 20, 31 ] <-> [ 40, 47, 52 ]  <- leaf chain: entries
//! ```
//!
//! A guide's first child covers the keys below its first routing key, each
//! following child covers the keys from one routing key up to the next, and
//! the last child is unbounded above. The leaves hold the entries; every leaf
//! links to its neighbors, so ordered and range iteration never touch the
//! guides after the initial descent.
//!
//! Each distinct key keeps the list of every value inserted under it, in
//! insertion order. There is no deletion: nodes only ever split, and `clear`
//! rebuilds the map from scratch.

mod arena;
mod cursor;
mod node;
mod view;

use crate::{Comparator, NaturalOrder};
use arena::{NodeArena, NodeId};
pub use cursor::{Cursor, CursorError, Iter, KeysIter, ValuesIter};
use node::{GuideNode, LeafNode, Node};
use std::fmt;
pub use view::{OutOfRange, RangeView};

#[cfg(test)]
mod proptests;

// The split thresholds used by `new`.
const DEFAULT_ORDER: usize = 3;
const DEFAULT_LEAF_ORDER: usize = 3;

/// An ordered map from keys to the lists of values inserted under them.
///
/// The map is a B+ tree: guide nodes route lookups, leaf nodes store the
/// entries and link into one ascending chain. Inserting an existing key
/// appends to that key's value list instead of overwriting, so the map
/// doubles as a secondary index over non-unique fields. Keys can never be
/// removed individually; [`clear`](Self::clear) is the only way to shrink
/// the map.
///
/// # Examples
///
/// ```
/// use bptree_index::BPlusTreeMap;
///
/// let mut index = BPlusTreeMap::new();
/// index.insert("smith", 1001);
/// index.insert("jones", 1002);
/// index.insert("smith", 1003);
///
/// assert_eq!(index.get(&"smith"), Some(&[1001, 1003][..]));
/// assert_eq!(index.len(), 2);
/// assert_eq!(index.first_key(), Some(&"jones"));
/// ```
///
/// Keys are ordered by the key type's own [`Ord`] unless a comparator is
/// supplied at construction:
///
/// ```
/// use bptree_index::BPlusTreeMap;
///
/// let mut newest_first = BPlusTreeMap::with_comparator(|a: &u64, b: &u64| b.cmp(a));
/// newest_first.insert(170, "old");
/// newest_first.insert(920, "new");
/// assert_eq!(newest_first.first_key(), Some(&920));
/// ```
pub struct BPlusTreeMap<K, V, C = NaturalOrder>
where
    K: Clone,
    C: Comparator<K>,
{
    // Owns every node; nodes refer to each other by id.
    arena: NodeArena<K, V>,

    // The root node. Starts out as an empty leaf and is replaced wholesale
    // when it splits.
    root: NodeId,

    // The head of the ascending leaf chain. Only `clear` ever has to
    // re-point it: the leftmost leaf keeps its place when it splits.
    first_leaf: NodeId,

    // The number of distinct keys.
    length: usize,

    // Bumped on every mutation. Cursors snapshot it to detect writes that
    // happen after their creation.
    version: u64,

    // Split thresholds, fixed at construction: the maximum number of
    // children of a guide node and keys of a leaf node.
    order: usize,
    leaf_order: usize,

    comparator: C,
}

impl<K, V> BPlusTreeMap<K, V, NaturalOrder>
where
    K: Ord + Clone,
{
    /// Creates an empty map ordered by the key type's [`Ord`] instance.
    pub fn new() -> Self {
        Self::with_orders(DEFAULT_ORDER, DEFAULT_LEAF_ORDER)
    }

    /// Creates an empty map with the given split thresholds: a guide node
    /// splits when it exceeds `order` children, a leaf when it exceeds
    /// `leaf_order` keys.
    ///
    /// Panics if `order < 3` or `leaf_order < 1`.
    pub fn with_orders(order: usize, leaf_order: usize) -> Self {
        Self::with_orders_and_comparator(order, leaf_order, NaturalOrder)
    }
}

impl<K, V, C> BPlusTreeMap<K, V, C>
where
    K: Clone,
    C: Comparator<K>,
{
    /// Creates an empty map whose keys are ordered by `comparator`.
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_orders_and_comparator(DEFAULT_ORDER, DEFAULT_LEAF_ORDER, comparator)
    }

    /// Creates an empty map with the given split thresholds and comparator.
    ///
    /// Panics if `order < 3` or `leaf_order < 1`.
    pub fn with_orders_and_comparator(order: usize, leaf_order: usize, comparator: C) -> Self {
        assert!(order >= 3, "order must be at least 3");
        assert!(leaf_order >= 1, "leaf order must be at least 1");

        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::Leaf(LeafNode::new(leaf_order)));
        Self {
            arena,
            root,
            first_leaf: root,
            length: 0,
            version: 0,
            order,
            leaf_order,
            comparator,
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// A key that is already present accumulates the value at the end of its
    /// list; nothing is ever overwritten. Returns `true` if the key was not
    /// present before.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let (newly_inserted, split) = self.insert_into(self.root, key, value);

        if let Some((separator, right)) = split {
            // The root itself split. Introduce a new root with the old root
            // and its new sibling as the only children.
            let root = Node::Guide(GuideNode {
                keys: vec![separator],
                children: vec![self.root, right],
                prev: None,
                next: None,
            });
            self.root = self.arena.alloc(root);
        }

        if newly_inserted {
            self.length += 1;
        }
        // Accumulating under an existing key is a mutation like any other.
        self.version += 1;
        newly_inserted
    }

    /// Inserts into the subtree rooted at `node`. Returns whether the key
    /// was new, plus the separator key and id of the new right sibling if
    /// `node` had to split.
    fn insert_into(&mut self, node: NodeId, key: K, value: V) -> (bool, Option<(K, NodeId)>) {
        let routed = match self.arena.node(node) {
            Node::Guide(guide) => {
                let index = guide.child_index(&self.comparator, &key);
                Some((index, guide.children[index]))
            }
            Node::Leaf(_) => None,
        };

        match routed {
            Some((index, child)) => {
                let (newly_inserted, child_split) = self.insert_into(child, key, value);

                let mut split = None;
                if let Some((separator, new_child)) = child_split {
                    self.arena
                        .guide_mut(node)
                        .record_split(index, separator, new_child);
                    if self.arena.guide(node).is_overfull(self.order) {
                        split = Some(self.split_guide(node));
                    }
                }
                (newly_inserted, split)
            }
            None => {
                let newly_inserted =
                    self.arena
                        .leaf_mut(node)
                        .insert(&self.comparator, key, value);

                let split = if self.arena.leaf(node).is_overfull(self.leaf_order) {
                    Some(self.split_leaf(node))
                } else {
                    None
                };
                (newly_inserted, split)
            }
        }
    }

    /// Splits the overfull leaf `node`: the back half of its entries spill
    /// into a new right sibling, which is spliced into the leaf chain.
    /// Returns the new leaf's smallest key as the separator, and its id.
    fn split_leaf(&mut self, node: NodeId) -> (K, NodeId) {
        let leaf = self.arena.leaf_mut(node);
        let middle = leaf.keys.len() / 2;
        let spilled_keys = leaf.keys.split_off(middle);
        let spilled_values = leaf.values.split_off(middle);
        let old_next = leaf.next;

        let separator = spilled_keys[0].clone();
        let right = self.arena.alloc(Node::Leaf(LeafNode {
            keys: spilled_keys,
            values: spilled_values,
            prev: Some(node),
            next: old_next,
        }));

        self.arena.leaf_mut(node).next = Some(right);
        if let Some(successor) = old_next {
            self.arena.leaf_mut(successor).prev = Some(right);
        }

        (separator, right)
    }

    /// Splits the overfull guide `node`: the back half of its children move
    /// to a new right sibling. The routing key between the halves stops
    /// routing here and is returned as the separator for the parent.
    fn split_guide(&mut self, node: NodeId) -> (K, NodeId) {
        let guide = self.arena.guide_mut(node);
        let middle = guide.children.len() / 2;
        let spilled_keys = guide.keys.split_off(middle);
        let separator = guide
            .keys
            .pop()
            .expect("an overfull guide has routing keys on both sides of its midpoint");
        let spilled_children = guide.children.split_off(middle);
        let old_next = guide.next;

        let right = self.arena.alloc(Node::Guide(GuideNode {
            keys: spilled_keys,
            children: spilled_children,
            prev: Some(node),
            next: old_next,
        }));

        self.arena.guide_mut(node).next = Some(right);
        if let Some(successor) = old_next {
            self.arena.guide_mut(successor).prev = Some(right);
        }

        (separator, right)
    }

    /// Returns every value inserted under `key`, oldest first, or `None` if
    /// the key is not present.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        let (_, leaf) = self.locate_leaf(key);
        match leaf.search(&self.comparator, key) {
            Ok(index) => Some(leaf.values[index].as_slice()),
            Err(_) => None,
        }
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        let (_, leaf) = self.locate_leaf(key);
        leaf.search(&self.comparator, key).is_ok()
    }

    /// Descends from the root to the leaf whose key range covers `key`.
    fn locate_leaf(&self, key: &K) -> (NodeId, &LeafNode<K, V>) {
        let mut current = self.root;
        loop {
            match self.arena.node(current) {
                Node::Guide(guide) => {
                    current = guide.children[guide.child_index(&self.comparator, key)];
                }
                Node::Leaf(leaf) => return (current, leaf),
            }
        }
    }

    /// Returns the number of distinct keys in the map.
    ///
    /// Values do not count: inserting an existing key again grows its value
    /// list but not the map.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no keys.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every entry, resetting the map to a single empty leaf.
    pub fn clear(&mut self) {
        self.arena.clear();
        let root = self.arena.alloc(Node::Leaf(LeafNode::new(self.leaf_order)));
        self.root = root;
        self.first_leaf = root;
        self.length = 0;
        self.version += 1;
    }

    /// Returns the smallest key, or `None` if the map is empty.
    pub fn first_key(&self) -> Option<&K> {
        self.arena.leaf(self.first_leaf).keys.first()
    }

    /// Returns the largest key, or `None` if the map is empty.
    ///
    /// Walks the leaf chain to its tail, so the cost is linear in the number
    /// of leaves rather than logarithmic.
    pub fn last_key(&self) -> Option<&K> {
        let mut current = self.first_leaf;
        loop {
            let leaf = self.arena.leaf(current);
            match leaf.next {
                Some(next) => current = next,
                None => return leaf.keys.last(),
            }
        }
    }

    /// Returns the comparator ordering this map's keys, or `None` if the map
    /// uses the natural ordering of the key type.
    pub fn comparator(&self) -> Option<&C> {
        if C::IS_NATURAL {
            None
        } else {
            Some(&self.comparator)
        }
    }

    /// Returns a view of the keys in `[low, high)`.
    ///
    /// The view holds only its bounds; every operation on it takes the map
    /// as an argument. See [`RangeView`].
    pub fn sub_map(&self, low: K, high: K) -> RangeView<K> {
        RangeView::new(Some(low), Some(high))
    }

    /// Returns a view of the keys strictly below `high`.
    pub fn head_map(&self, high: K) -> RangeView<K> {
        RangeView::new(None, Some(high))
    }

    /// Returns a view of the keys at or above `low`.
    pub fn tail_map(&self, low: K) -> RangeView<K> {
        RangeView::new(Some(low), None)
    }

    /// Returns an iterator over the entries, ascending by key. Each item
    /// pairs a key with the slice of all its values.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(self)
    }

    /// Returns an iterator over the keys, ascending.
    pub fn keys(&self) -> KeysIter<'_, K, V, C> {
        KeysIter::new(Iter::new(self))
    }

    /// Returns an iterator over the value lists, ascending by key.
    pub fn values(&self) -> ValuesIter<'_, K, V, C> {
        ValuesIter::new(Iter::new(self))
    }

    /// Returns a detached cursor positioned before the first entry.
    ///
    /// Unlike [`iter`](Self::iter), a cursor borrows nothing: every call
    /// takes the map as an argument, and fails with
    /// [`CursorError::Modified`] once the map has been mutated after the
    /// cursor was created.
    pub fn cursor(&self) -> Cursor<K> {
        Cursor::new(self, None, None)
    }
}

impl<K, V> Default for BPlusTreeMap<K, V, NaturalOrder>
where
    K: Ord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> fmt::Debug for BPlusTreeMap<K, V, C>
where
    K: Clone + fmt::Debug,
    V: fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
