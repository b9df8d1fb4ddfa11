// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Traversal for standard library and `indexmap` containers.

use super::{Classify, Shape, Traverse};
use crate::ops::{FilterShape, MapShape, collect_mapped, collect_retained};
use indexmap::{IndexMap, IndexSet};
use std::{
    collections::{
        BTreeMap, BTreeSet, HashMap, HashSet, VecDeque, btree_map, btree_set, hash_map, hash_set,
        vec_deque,
    },
    hash::{BuildHasher, Hash},
    iter::{Enumerate, Flatten},
    slice,
};

/// Entries of a set-shaped container: every element doubles as its own key.
#[derive(Debug, Clone)]
pub struct SetEntries<I> {
    inner: I,
}

impl<I> SetEntries<I> {
    pub(crate) fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<'a, T: 'a, I> Iterator for SetEntries<I>
where
    I: Iterator<Item = &'a T>,
{
    type Item = (&'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|element| (element, element))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// sequences

impl<T> Classify for [T] {
    fn shape(&self) -> Shape {
        Shape::Sequence
    }
}

impl<T> Traverse for [T] {
    type Item = T;
    type Key<'a>
        = usize
    where
        Self: 'a;
    type Entries<'a>
        = Enumerate<slice::Iter<'a, T>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter().enumerate()
    }
}

impl<T: Clone> FilterShape for [T] {
    type Output = Vec<T>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        collect_retained(self, predicate)
    }
}

impl<T> MapShape for [T] {
    type Output<U> = Vec<U>;

    fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        collect_mapped(self, f)
    }
}

impl<T> Classify for Vec<T> {
    fn shape(&self) -> Shape {
        Shape::Sequence
    }
}

impl<T> Traverse for Vec<T> {
    type Item = T;
    type Key<'a>
        = usize
    where
        Self: 'a;
    type Entries<'a>
        = Enumerate<slice::Iter<'a, T>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter().enumerate()
    }
}

impl<T: Clone> FilterShape for Vec<T> {
    type Output = Vec<T>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        collect_retained(self, predicate)
    }
}

impl<T> MapShape for Vec<T> {
    type Output<U> = Vec<U>;

    fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        collect_mapped(self, f)
    }
}

impl<T, const N: usize> Classify for [T; N] {
    fn shape(&self) -> Shape {
        Shape::Sequence
    }
}

impl<T, const N: usize> Traverse for [T; N] {
    type Item = T;
    type Key<'a>
        = usize
    where
        Self: 'a;
    type Entries<'a>
        = Enumerate<slice::Iter<'a, T>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter().enumerate()
    }
}

impl<T: Clone, const N: usize> FilterShape for [T; N] {
    // the length is part of the type, so a filtered array has to become a list
    type Output = Vec<T>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        collect_retained(self, predicate)
    }
}

impl<T, const N: usize> MapShape for [T; N] {
    type Output<U> = [U; N];

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        std::array::from_fn(|index| f(&self[index], index))
    }
}

impl<T> Classify for VecDeque<T> {
    fn shape(&self) -> Shape {
        Shape::Sequence
    }
}

impl<T> Traverse for VecDeque<T> {
    type Item = T;
    type Key<'a>
        = usize
    where
        Self: 'a;
    type Entries<'a>
        = Enumerate<vec_deque::Iter<'a, T>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter().enumerate()
    }
}

impl<T: Clone> FilterShape for VecDeque<T> {
    type Output = VecDeque<T>;

    fn filter_by<'a, P>(&'a self, mut predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        self.iter()
            .enumerate()
            .filter(|&(index, element)| predicate(element, index))
            .map(|(_, element)| element.clone())
            .collect()
    }
}

impl<T> MapShape for VecDeque<T> {
    type Output<U> = VecDeque<U>;

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        self.iter()
            .enumerate()
            .map(|(index, element)| f(element, index))
            .collect()
    }
}

// mappings

impl<K, V, S> Classify for HashMap<K, V, S> {
    fn shape(&self) -> Shape {
        Shape::Mapping
    }
}

impl<K, V, S> Traverse for HashMap<K, V, S> {
    type Item = V;
    type Key<'a>
        = &'a K
    where
        Self: 'a;
    type Entries<'a>
        = hash_map::Iter<'a, K, V>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }
}

impl<K, V, S> FilterShape for HashMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher + Clone,
{
    type Output = HashMap<K, V, S>;

    fn filter_by<'a, P>(&'a self, mut predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        let mut retained = HashMap::with_hasher(self.hasher().clone());
        for (key, value) in self {
            if predicate(value, key) {
                retained.insert(key.clone(), value.clone());
            }
        }
        retained
    }
}

impl<K, V, S> MapShape for HashMap<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher + Clone,
{
    type Output<U> = HashMap<K, U, S>;

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        let mut mapped = HashMap::with_capacity_and_hasher(self.len(), self.hasher().clone());
        for (key, value) in self {
            mapped.insert(key.clone(), f(value, key));
        }
        mapped
    }
}

impl<K, V, S> Classify for IndexMap<K, V, S> {
    fn shape(&self) -> Shape {
        Shape::Mapping
    }
}

impl<K, V, S> Traverse for IndexMap<K, V, S> {
    type Item = V;
    type Key<'a>
        = &'a K
    where
        Self: 'a;
    type Entries<'a>
        = indexmap::map::Iter<'a, K, V>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }
}

impl<K, V, S> FilterShape for IndexMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher + Clone,
{
    type Output = IndexMap<K, V, S>;

    fn filter_by<'a, P>(&'a self, mut predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        let mut retained = IndexMap::with_hasher(self.hasher().clone());
        for (key, value) in self {
            if predicate(value, key) {
                retained.insert(key.clone(), value.clone());
            }
        }
        retained
    }
}

impl<K, V, S> MapShape for IndexMap<K, V, S>
where
    K: Clone + Eq + Hash,
    S: BuildHasher + Clone,
{
    type Output<U> = IndexMap<K, U, S>;

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        let mut mapped = IndexMap::with_capacity_and_hasher(self.len(), self.hasher().clone());
        for (key, value) in self {
            mapped.insert(key.clone(), f(value, key));
        }
        mapped
    }
}

impl<K, V> Classify for BTreeMap<K, V> {
    fn shape(&self) -> Shape {
        Shape::Mapping
    }
}

impl<K, V> Traverse for BTreeMap<K, V> {
    type Item = V;
    type Key<'a>
        = &'a K
    where
        Self: 'a;
    type Entries<'a>
        = btree_map::Iter<'a, K, V>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.iter()
    }
}

impl<K: Clone + Ord, V: Clone> FilterShape for BTreeMap<K, V> {
    type Output = BTreeMap<K, V>;

    fn filter_by<'a, P>(&'a self, mut predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        self.iter()
            .filter(|&(key, value)| predicate(value, key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Clone + Ord, V> MapShape for BTreeMap<K, V> {
    type Output<U> = BTreeMap<K, U>;

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), f(value, key)))
            .collect()
    }
}

// sets

macro_rules! set_traversal {
    ($set:ident < T $(, $hasher:ident)? >, $($iter:ident)::+) => {
        impl<T $(, $hasher)?> Classify for $set<T $(, $hasher)?> {
            fn shape(&self) -> Shape {
                Shape::Set
            }
        }

        impl<T $(, $hasher)?> Traverse for $set<T $(, $hasher)?> {
            type Item = T;
            type Key<'a>
                = &'a T
            where
                Self: 'a;
            type Entries<'a>
                = SetEntries<$($iter)::+<'a, T>>
            where
                Self: 'a;

            fn entries(&self) -> Self::Entries<'_> {
                SetEntries::new(self.iter())
            }
        }

        impl<T: Clone $(, $hasher)?> FilterShape for $set<T $(, $hasher)?> {
            type Output = Vec<T>;

            fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
            where
                P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
            {
                collect_retained(self, predicate)
            }
        }

        impl<T $(, $hasher)?> MapShape for $set<T $(, $hasher)?> {
            type Output<U> = Vec<U>;

            fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
            where
                F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
            {
                collect_mapped(self, f)
            }
        }
    };
}

set_traversal!(HashSet<T, S>, hash_set::Iter);
set_traversal!(IndexSet<T, S>, indexmap::set::Iter);
set_traversal!(BTreeSet<T>, btree_set::Iter);

// absent containers

impl<C: Classify> Classify for Option<C> {
    fn shape(&self) -> Shape {
        match self {
            Some(container) => container.shape(),
            None => Shape::None,
        }
    }
}

impl<C: Traverse> Traverse for Option<C> {
    type Item = C::Item;
    type Key<'a>
        = C::Key<'a>
    where
        Self: 'a;
    type Entries<'a>
        = Flatten<std::option::IntoIter<C::Entries<'a>>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        self.as_ref()
            .map(|container| container.entries())
            .into_iter()
            .flatten()
    }
}

impl<C: FilterShape> FilterShape for Option<C> {
    type Output = Option<C::Output>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        self.as_ref().map(|container| container.filter_by(predicate))
    }
}

impl<C: MapShape> MapShape for Option<C> {
    type Output<U> = Option<C::Output<U>>;

    fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        self.as_ref().map(|container| container.map_by(f))
    }
}
