// (c) Copyright 2025 Helsing GmbH. All rights reserved.
/// Convenience macro for creating an [`OrderedSet`](crate::OrderedSet).
///
/// Without a comparator the elements' [`Ord`] implementation is used. Prefix the elements with
/// `by <comparator>;` to order them differently. Duplicates are collapsed to the first one, as
/// with [`OrderedSet::from_elements`](crate::OrderedSet::from_elements).
///
/// ```rust
/// # use shapewise::ordered_set;
/// let set = ordered_set![3, 1, 2, 1];
/// assert_eq!(set.into_vec(), [1, 2, 3]);
///
/// let by_len = ordered_set![by |a: &&str, b: &&str| a.len().cmp(&b.len()); "ccc", "a", "bb", "z"];
/// assert_eq!(by_len.into_vec(), ["a", "bb", "ccc"]);
/// ```
#[macro_export]
macro_rules! ordered_set {
    () => {
        $crate::OrderedSet::new()
    };
    (by $cmp:expr; $($element:expr),* $(,)?) => {
        $crate::OrderedSet::from_elements([$($element),*], $cmp)
    };
    ($($element:expr),+ $(,)?) => {
        <$crate::OrderedSet<_> as ::std::iter::FromIterator<_>>::from_iter([$($element),+])
    };
}

/// Convenience macro for creating a [`Buffer`](crate::traverse::Buffer).
///
/// Either list the elements, or give one element and a length like `vec!`.
///
/// ```rust
/// # use shapewise::buffer;
/// let samples = buffer![0.5f32, 1.5, 2.5];
/// assert_eq!(samples.byte_len(), 12);
///
/// let zeroes = buffer![0u16; 4];
/// assert_eq!(zeroes.as_slice(), [0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! buffer {
    ($element:expr; $len:expr) => {
        $crate::traverse::Buffer::from(::std::vec![$element; $len])
    };
    ($($element:expr),* $(,)?) => {
        $crate::traverse::Buffer::from([$($element),*])
    };
}
