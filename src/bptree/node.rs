use super::arena::NodeId;
use crate::Comparator;
use std::cmp::Ordering;

/// A node of the tree.
///
/// Guide nodes route lookups toward the leaf level; leaf nodes hold the
/// entries themselves. A node is created as one kind and stays that kind.
pub enum Node<K, V> {
    Guide(GuideNode<K>),
    Leaf(LeafNode<K, V>),
}

/// An internal node: routing keys and the children they delimit.
///
/// `children[0]` covers keys below `keys[0]`; for `i > 0`, `children[i]`
/// covers keys in `[keys[i - 1], keys[i])`, with the last child unbounded
/// above. A guide node always has exactly one more child than routing keys.
pub struct GuideNode<K> {
    pub keys: Vec<K>,
    pub children: Vec<NodeId>,
    // Sibling links at this node's level, spliced on split like the leaf
    // chain. Routing never consults them.
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl<K> GuideNode<K> {
    /// Returns the index of the child covering `key`: the first child whose
    /// upper routing key exceeds `key`, or the last child if none does.
    pub fn child_index<C: Comparator<K>>(&self, comparator: &C, key: &K) -> usize {
        for (i, routing) in self.keys.iter().enumerate() {
            if comparator.cmp(key, routing) == Ordering::Less {
                return i;
            }
        }
        self.keys.len()
    }

    /// Records a split of the child at `index`: `child` becomes the new
    /// right sibling of `children[index]` and `separator` its lower bound.
    pub fn record_split(&mut self, index: usize, separator: K, child: NodeId) {
        self.keys.insert(index, separator);
        self.children.insert(index + 1, child);
    }

    pub fn is_overfull(&self, order: usize) -> bool {
        self.children.len() > order
    }
}

/// A leaf node: strictly ascending unique keys, each paired with the list of
/// values inserted under it, oldest first.
pub struct LeafNode<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<Vec<V>>,
    // The global ascending chain across all leaves of the tree.
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl<K, V> LeafNode<K, V> {
    pub fn new(leaf_order: usize) -> Self {
        // One slot of slack: a leaf overflows past `leaf_order` before it
        // splits.
        Self {
            keys: Vec::with_capacity(leaf_order + 1),
            values: Vec::with_capacity(leaf_order + 1),
            prev: None,
            next: None,
        }
    }

    /// Searches for `key`. Returns `Ok(i)` if `keys[i]` equals `key`, or
    /// `Err(i)` with the index where `key` would be inserted.
    pub fn search<C: Comparator<K>>(&self, comparator: &C, key: &K) -> Result<usize, usize> {
        for (i, probe) in self.keys.iter().enumerate() {
            match comparator.cmp(key, probe) {
                Ordering::Greater => continue,
                Ordering::Equal => return Ok(i),
                Ordering::Less => return Err(i),
            }
        }
        Err(self.keys.len())
    }

    /// Inserts `value` under `key`, keeping the keys ascending. An existing
    /// key accumulates the value at the end of its list. Returns `true` if
    /// the key was not present before.
    pub fn insert<C: Comparator<K>>(&mut self, comparator: &C, key: K, value: V) -> bool {
        match self.search(comparator, &key) {
            Ok(i) => {
                self.values[i].push(value);
                false
            }
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, vec![value]);
                true
            }
        }
    }

    pub fn is_overfull(&self, leaf_order: usize) -> bool {
        self.keys.len() > leaf_order
    }
}
