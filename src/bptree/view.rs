use super::cursor::{Cursor, Iter};
use super::BPlusTreeMap;
use crate::Comparator;
use std::cmp::Ordering;
use std::fmt;

/// A half-open window `[low, high)` over a [`BPlusTreeMap`].
///
/// A view stores only its bounds. Every operation takes the backing map as
/// an explicit argument, so a view never goes stale: it can outlive any
/// number of mutations and always reads the map's current contents. Lookups
/// outside the bounds answer `None` or `false`, insertion outside the bounds
/// is an [`OutOfRange`] error, and narrowing an existing view intersects the
/// bounds.
///
/// # Examples
///
/// ```
/// use bptree_index::BPlusTreeMap;
///
/// let mut map = BPlusTreeMap::new();
/// for key in [1, 2, 3, 5, 8] {
///     map.insert(key, ());
/// }
///
/// let view = map.sub_map(2, 8);
/// assert_eq!(view.first_key(&map), Some(&2));
/// assert_eq!(view.last_key(&map), Some(&5));
/// assert!(!view.contains_key(&map, &8));
///
/// // Views stay valid across mutations.
/// map.insert(4, ());
/// assert_eq!(view.len(&map), 4);
/// ```
#[derive(Clone, Debug)]
pub struct RangeView<K> {
    // Inclusive lower bound; `None` is unbounded below.
    low: Option<K>,
    // Exclusive upper bound; `None` is unbounded above.
    high: Option<K>,
}

impl<K: Clone> RangeView<K> {
    pub(crate) fn new(low: Option<K>, high: Option<K>) -> Self {
        Self { low, high }
    }

    /// The view over the whole map, with no bound on either side.
    pub fn all() -> Self {
        Self {
            low: None,
            high: None,
        }
    }

    /// The view's bounds: inclusive lower, exclusive upper. `None` means
    /// unbounded on that side.
    pub fn bounds(&self) -> (Option<&K>, Option<&K>) {
        (self.low.as_ref(), self.high.as_ref())
    }

    /// Returns `true` if the view has no bound on either side.
    pub fn is_unbounded(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    /// Returns `true` if `key` falls within the view's bounds, present in
    /// the map or not.
    pub fn in_bounds<V, C>(&self, map: &BPlusTreeMap<K, V, C>, key: &K) -> bool
    where
        C: Comparator<K>,
    {
        let above_low = match &self.low {
            None => true,
            Some(low) => map.comparator.cmp(key, low) != Ordering::Less,
        };
        let below_high = match &self.high {
            None => true,
            Some(high) => map.comparator.cmp(key, high) == Ordering::Less,
        };
        above_low && below_high
    }

    /// Returns the values under `key` if it is within bounds and present.
    pub fn get<'a, V, C>(&self, map: &'a BPlusTreeMap<K, V, C>, key: &K) -> Option<&'a [V]>
    where
        C: Comparator<K>,
    {
        if self.in_bounds(map, key) {
            map.get(key)
        } else {
            None
        }
    }

    /// Returns `true` if `key` is within bounds and present.
    pub fn contains_key<V, C>(&self, map: &BPlusTreeMap<K, V, C>, key: &K) -> bool
    where
        C: Comparator<K>,
    {
        self.in_bounds(map, key) && map.contains_key(key)
    }

    /// Inserts `value` under `key` through the view.
    ///
    /// Fails with [`OutOfRange`] if `key` is outside the view's bounds,
    /// leaving the map untouched. Otherwise behaves exactly like
    /// [`BPlusTreeMap::insert`], returning whether the key was new.
    pub fn insert<V, C>(
        &self,
        map: &mut BPlusTreeMap<K, V, C>,
        key: K,
        value: V,
    ) -> Result<bool, OutOfRange>
    where
        C: Comparator<K>,
    {
        if !self.in_bounds(map, &key) {
            return Err(OutOfRange);
        }
        Ok(map.insert(key, value))
    }

    /// Returns the smallest in-bounds key present in `map`.
    pub fn first_key<'a, V, C>(&self, map: &'a BPlusTreeMap<K, V, C>) -> Option<&'a K>
    where
        C: Comparator<K>,
    {
        self.entries(map).next().map(|(key, _)| key)
    }

    /// Returns the largest in-bounds key present in `map`.
    ///
    /// Scans the view's entries, so the cost is linear in the view's size.
    pub fn last_key<'a, V, C>(&self, map: &'a BPlusTreeMap<K, V, C>) -> Option<&'a K>
    where
        C: Comparator<K>,
    {
        self.entries(map).last().map(|(key, _)| key)
    }

    /// The number of distinct in-bounds keys, counted by iteration unless
    /// the view is unbounded.
    pub fn len<V, C>(&self, map: &BPlusTreeMap<K, V, C>) -> usize
    where
        C: Comparator<K>,
    {
        if self.is_unbounded() {
            map.len()
        } else {
            self.entries(map).count()
        }
    }

    /// Returns `true` if no key in the map falls within the view.
    pub fn is_empty<V, C>(&self, map: &BPlusTreeMap<K, V, C>) -> bool
    where
        C: Comparator<K>,
    {
        self.entries(map).next().is_none()
    }

    /// Narrows the view to `[low, high)` intersected with its own bounds: a
    /// nested view can never see a key its parent could not.
    pub fn sub_map<V, C>(&self, map: &BPlusTreeMap<K, V, C>, low: K, high: K) -> RangeView<K>
    where
        C: Comparator<K>,
    {
        RangeView {
            low: Some(self.clamp_low(map, low)),
            high: Some(self.clamp_high(map, high)),
        }
    }

    /// Narrows the view to the keys below `high`.
    pub fn head_map<V, C>(&self, map: &BPlusTreeMap<K, V, C>, high: K) -> RangeView<K>
    where
        C: Comparator<K>,
    {
        RangeView {
            low: self.low.clone(),
            high: Some(self.clamp_high(map, high)),
        }
    }

    /// Narrows the view to the keys at or above `low`.
    pub fn tail_map<V, C>(&self, map: &BPlusTreeMap<K, V, C>, low: K) -> RangeView<K>
    where
        C: Comparator<K>,
    {
        RangeView {
            low: Some(self.clamp_low(map, low)),
            high: self.high.clone(),
        }
    }

    /// Returns an iterator over the in-bounds entries, ascending by key.
    pub fn entries<'a, V, C>(&self, map: &'a BPlusTreeMap<K, V, C>) -> Iter<'a, K, V, C>
    where
        C: Comparator<K>,
    {
        Iter::new_in_range(map, self.low.as_ref(), self.high.clone())
    }

    /// Returns a detached cursor over the in-bounds entries. See [`Cursor`].
    pub fn cursor<V, C>(&self, map: &BPlusTreeMap<K, V, C>) -> Cursor<K>
    where
        C: Comparator<K>,
    {
        Cursor::new(map, self.low.as_ref(), self.high.clone())
    }

    /// Removes every entry from the backing map if the view is unbounded.
    ///
    /// A bounded view cannot be cleared, since that would require key
    /// removal: clearing a bounded view that contains keys panics, while a
    /// bounded view that is already empty is left as is.
    pub fn clear<V, C>(&self, map: &mut BPlusTreeMap<K, V, C>)
    where
        C: Comparator<K>,
    {
        if self.is_unbounded() {
            map.clear();
            return;
        }
        if self.entries(map).next().is_some() {
            panic!("cannot clear a bounded range view: the tree does not support key removal");
        }
    }

    // The larger of `candidate` and the view's lower bound.
    fn clamp_low<V, C>(&self, map: &BPlusTreeMap<K, V, C>, candidate: K) -> K
    where
        C: Comparator<K>,
    {
        match &self.low {
            Some(low) if map.comparator.cmp(&candidate, low) == Ordering::Less => low.clone(),
            _ => candidate,
        }
    }

    // The smaller of `candidate` and the view's upper bound.
    fn clamp_high<V, C>(&self, map: &BPlusTreeMap<K, V, C>, candidate: K) -> K
    where
        C: Comparator<K>,
    {
        match &self.high {
            Some(high) if map.comparator.cmp(&candidate, high) == Ordering::Greater => {
                high.clone()
            }
            _ => candidate,
        }
    }
}

/// The error returned when inserting through a view whose bounds exclude
/// the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "the key lies outside the bounds of the range view")
    }
}

impl std::error::Error for OutOfRange {}
