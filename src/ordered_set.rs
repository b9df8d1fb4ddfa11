// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! A set kept sorted by a caller-supplied comparator.
//!
//! The comparator does double duty: it orders the elements _and_ decides which elements are
//! the same. Two elements for which it returns [`Ordering::Equal`] are duplicates even if they
//! differ otherwise, and the set keeps whichever of them it saw first. This makes
//! [`OrderedSet::get_equal_value_or_add`] a natural way to intern values by some key.
//!
//! The comparator must be a total order; if it is not, the contents of the set are
//! unspecified.
use crate::{
    ops::{FilterShape, MapShape, collect_mapped, collect_retained},
    traverse::{Classify, SetEntries, Shape, Traverse, visit},
};
use std::{
    cmp::Ordering,
    collections::{VecDeque, vec_deque},
    fmt,
};

/// A sorted, deduplicating collection with a custom comparator.
///
/// Lookups are `O(log n)`, insertions `O(n)`, and both ends can be inspected and removed in
/// `O(1)`.
///
/// ```rust
/// # use shapewise::OrderedSet;
/// let mut set = OrderedSet::from([5, 3, 3, 1]);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 5]);
///
/// assert!(set.add(4));
/// assert!(!set.add(3));
/// assert_eq!(set.poll_first(), Some(1));
/// assert_eq!(set.last(), Some(&5));
/// ```
#[derive(Clone)]
pub struct OrderedSet<T, C = fn(&T, &T) -> Ordering> {
    elements: VecDeque<T>,
    comparator: C,
}

impl<T: Ord> OrderedSet<T> {
    /// Creates an empty set ordered by `T`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self::with_comparator(T::cmp)
    }
}

impl<T: Ord> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> OrderedSet<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty set ordered by `comparator`.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            elements: VecDeque::new(),
            comparator,
        }
    }

    /// Creates a set from `elements`, ordered by `comparator`.
    ///
    /// Elements that compare equal to an earlier one are discarded.
    pub fn from_elements<I>(elements: I, comparator: C) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut elements: Vec<T> = elements.into_iter().collect();
        let given = elements.len();
        // a stable sort keeps equal elements in input order, so dedup keeps the first one
        elements.sort_by(&comparator);
        elements.dedup_by(|later, earlier| comparator(later, earlier) == Ordering::Equal);
        if elements.len() < given {
            tracing::trace!(
                collapsed = given - elements.len(),
                "discarded duplicates while building ordered set"
            );
        }
        Self {
            elements: elements.into(),
            comparator,
        }
    }

    fn search(&self, value: &T) -> Result<usize, usize> {
        self.elements
            .binary_search_by(|probe| (self.comparator)(probe, value))
    }

    /// Returns the comparator that orders this set.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns `true` if the set holds an element equal to `value` under the comparator.
    pub fn contains(&self, value: &T) -> bool {
        self.search(value).is_ok()
    }

    /// Returns the stored element equal to `value` under the comparator, if any.
    ///
    /// The returned element may differ from `value` in ways the comparator ignores.
    pub fn get_equal_value(&self, value: &T) -> Option<&T> {
        self.search(value).ok().map(|index| &self.elements[index])
    }

    /// Inserts `value` in order, unless an equal element is already present.
    ///
    /// Returns `true` if `value` was inserted. On `false` the set is unchanged and `value` is
    /// dropped: the first inserted element always wins.
    pub fn add(&mut self, value: T) -> bool {
        match self.search(&value) {
            Ok(_) => false,
            Err(index) => {
                self.elements.insert(index, value);
                true
            }
        }
    }

    /// Returns the stored element equal to `value`, inserting `value` first if there is none.
    ///
    /// Calling this twice with equal values returns the same stored element both times.
    pub fn get_equal_value_or_add(&mut self, value: T) -> &T {
        let index = match self.search(&value) {
            Ok(index) => index,
            Err(index) => {
                self.elements.insert(index, value);
                index
            }
        };
        &self.elements[index]
    }

    /// [`add`](Self::add)s every element of `values`, in order.
    ///
    /// Returns how many of them were inserted.
    pub fn add_all<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .fold(0, |added, value| added + usize::from(self.add(value)))
    }

    /// [`add`](Self::add)s a clone of every element of `values`, in traversal order.
    ///
    /// `values` can be any [`Traverse`] container: a list, the values of a mapping, another
    /// set, or an absent `Option`. Returns how many elements were inserted.
    pub fn add_each<S>(&mut self, values: &S) -> usize
    where
        S: Traverse<Item = T> + ?Sized,
        T: Clone,
    {
        let mut added = 0;
        visit(values, |value, _| added += usize::from(self.add(value.clone())));
        added
    }

    /// Returns the smallest element.
    pub fn first(&self) -> Option<&T> {
        self.elements.front()
    }

    /// Returns the largest element.
    pub fn last(&self) -> Option<&T> {
        self.elements.back()
    }

    /// Removes and returns the smallest element.
    pub fn poll_first(&mut self) -> Option<T> {
        self.elements.pop_front()
    }

    /// Removes and returns the largest element.
    pub fn poll_last(&mut self) -> Option<T> {
        self.elements.pop_back()
    }

    /// Iterates over the elements in ascending order.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.elements.iter()
    }

    /// Returns the elements in ascending order.
    pub fn into_vec(self) -> Vec<T> {
        self.elements.into()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for OrderedSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.elements).finish()
    }
}

impl<T: PartialEq, C> PartialEq for OrderedSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<T: Ord> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_elements(iter, T::cmp)
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for OrderedSet<T> {
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl<T, C> Extend<T> for OrderedSet<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T, C> IntoIterator for OrderedSet<T, C> {
    type Item = T;
    type IntoIter = vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedSet<T, C> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T, C> Classify for OrderedSet<T, C> {
    fn shape(&self) -> Shape {
        Shape::Set
    }
}

impl<T, C> Traverse for OrderedSet<T, C> {
    type Item = T;
    type Key<'a>
        = &'a T
    where
        Self: 'a;
    type Entries<'a>
        = SetEntries<vec_deque::Iter<'a, T>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        SetEntries::new(self.elements.iter())
    }
}

impl<T: Clone, C> FilterShape for OrderedSet<T, C> {
    type Output = Vec<T>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        collect_retained(self, predicate)
    }
}

impl<T, C> MapShape for OrderedSet<T, C> {
    type Output<U> = Vec<U>;

    fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        collect_mapped(self, f)
    }
}

#[cfg(feature = "serde")]
mod serde {
    use super::OrderedSet;
    use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

    // the comparator cannot be serialized, so only the elements are written out
    impl<T: Serialize, C> Serialize for OrderedSet<T, C> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(&self.elements)
        }
    }

    impl<'de, T> Deserialize<'de> for OrderedSet<T>
    where
        T: Deserialize<'de> + Ord,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Vec::<T>::deserialize(deserializer).map(|elements| elements.into_iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{each, filter, map_to_list};
    use quickcheck::TestResult;

    fn by_key(a: &(u8, u8), b: &(u8, u8)) -> Ordering {
        a.0.cmp(&b.0)
    }

    #[test]
    fn builds_sorted_and_deduplicated() {
        let set = OrderedSet::from([5, 3, 3, 1]);
        assert_eq!(set.into_vec(), [1, 3, 5]);
    }

    #[test]
    fn first_inserted_wins() {
        let mut set = OrderedSet::from_elements([(1, 10), (2, 20), (1, 11)], by_key);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [(1, 10), (2, 20)]);

        assert!(!set.add((2, 21)));
        assert_eq!(set.get_equal_value(&(2, 0)), Some(&(2, 20)));
        assert!(set.contains(&(2, 99)));
        assert!(!set.contains(&(3, 20)));
    }

    #[test]
    fn get_equal_value_or_add_interns() {
        let mut set = OrderedSet::with_comparator(by_key);
        assert_eq!(*set.get_equal_value_or_add((4, 1)), (4, 1));
        assert_eq!(*set.get_equal_value_or_add((4, 2)), (4, 1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn both_ends() {
        let mut set: OrderedSet<_> = (1..=4).collect();
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&4));
        assert_eq!(set.poll_first(), Some(1));
        assert_eq!(set.poll_last(), Some(4));
        assert_eq!(set.into_vec(), [2, 3]);

        let mut empty = OrderedSet::<u8>::new();
        assert_eq!(empty.first(), None);
        assert_eq!(empty.poll_last(), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn custom_order() {
        let set = OrderedSet::from_elements(["bb", "a", "ccc"], |a: &&str, b: &&str| {
            b.len().cmp(&a.len())
        });
        assert_eq!(set.into_vec(), ["ccc", "bb", "a"]);
    }

    #[test]
    fn add_all_in_input_order() {
        let mut set = OrderedSet::with_comparator(by_key);
        assert_eq!(set.add_all([(2, 0), (1, 0), (2, 1)]), 2);
        assert_eq!(set.into_vec(), [(1, 0), (2, 0)]);

        let mut set = OrderedSet::from([3]);
        set.extend([1, 3, 2]);
        assert_eq!(set.into_vec(), [1, 2, 3]);
    }

    #[test]
    fn add_each_walks_any_shape() {
        let mut set = OrderedSet::from([2]);
        let stock = indexmap::IndexMap::from([("pear", 3), ("fig", 2), ("kiwi", 1)]);
        assert_eq!(set.add_each(&stock), 2);
        assert_eq!(set.add_each(&OrderedSet::from([4, 1])), 1);
        assert_eq!(set.add_each(&None::<Vec<i32>>), 0);
        assert_eq!(set.into_vec(), [1, 2, 3, 4]);
    }

    #[test]
    fn traverses_as_a_set() {
        let set = OrderedSet::from([2, 1]);
        assert_eq!(set.shape(), Shape::Set);

        let mut seen = Vec::new();
        each(&set, |element, key| seen.push((*key, *element)));
        assert_eq!(seen, [(1, 1), (2, 2)]);

        assert_eq!(filter(&set, |n, _| *n > 1), [2]);
        assert_eq!(map_to_list(&set, |n, _| n * 10), [10, 20]);
    }

    #[test]
    fn debug_lists_elements() {
        assert_eq!(format!("{:?}", OrderedSet::from([2, 1])), "{1, 2}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_a_sequence() {
        let set = OrderedSet::from([3, 1, 2]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[1,2,3]");
        let back: OrderedSet<i32> = serde_json::from_str("[2,2,1]").unwrap();
        assert_eq!(back, OrderedSet::from([1, 2]));
    }

    #[quickcheck]
    fn strictly_ascending(xs: Vec<i16>) -> bool {
        let set: OrderedSet<_> = xs.into_iter().collect();
        set.iter().zip(set.iter().skip(1)).all(|(a, b)| a < b)
    }

    #[quickcheck]
    fn keeps_first_of_each_key(xs: Vec<(u8, u8)>) -> bool {
        let set = OrderedSet::from_elements(xs.clone(), by_key);
        set.iter()
            .all(|kept| xs.iter().find(|x| x.0 == kept.0) == Some(kept))
    }

    #[quickcheck]
    fn add_matches_construction(xs: Vec<(u8, u8)>) -> bool {
        let mut added = OrderedSet::with_comparator(by_key);
        added.add_all(xs.clone());
        added == OrderedSet::from_elements(xs, by_key)
    }

    #[quickcheck]
    fn get_equal_value_or_add_is_idempotent(xs: Vec<u8>, x: u8) -> TestResult {
        let mut set: OrderedSet<_> = xs.into_iter().collect();
        let first = *set.get_equal_value_or_add(x);
        let len = set.len();
        let second = *set.get_equal_value_or_add(x);
        TestResult::from_bool(first == second && set.len() == len && set.contains(&x))
    }
}
