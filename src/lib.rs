#![doc = include_str!("../README.md")]
pub mod bptree;
pub use bptree::{BPlusTreeMap, Cursor, RangeView};
use std::cmp::Ordering;

/// A total order over keys, supplied at map construction time.
///
/// The natural ordering of a key type is expressed by [`NaturalOrder`], which
/// is the default. Any closure of type `Fn(&K, &K) -> Ordering` is also a
/// comparator, so an ad-hoc ordering does not need a named type:
///
/// ```
/// use bptree_index::BPlusTreeMap;
/// use std::cmp::Ordering;
///
/// // A map over descending integers.
/// let mut map = BPlusTreeMap::with_comparator(|a: &u32, b: &u32| b.cmp(a));
/// map.insert(1, ());
/// map.insert(2, ());
/// assert_eq!(map.first_key(), Some(&2));
/// ```
pub trait Comparator<K> {
    /// Set only by the comparator expressing the key type's own [`Ord`]
    /// instance. [`BPlusTreeMap::comparator`] uses this to report that no
    /// custom comparator is in play.
    const IS_NATURAL: bool = false;

    /// Returns the ordering of `a` relative to `b`.
    fn cmp(&self, a: &K, b: &K) -> Ordering;
}

/// The ordering a key type defines for itself through [`Ord`].
///
/// This is the comparator maps built with [`BPlusTreeMap::new`] and
/// [`BPlusTreeMap::with_orders`] use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    const IS_NATURAL: bool = true;

    fn cmp(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
