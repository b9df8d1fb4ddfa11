// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::{Classify, Shape, Traverse};
use crate::ops::{FilterShape, MapShape, collect_mapped, collect_retained};
use std::{iter::Enumerate, ops::Deref, vec};

/// An object that exposes its elements only through a single-argument visitor method.
///
/// Implement this for custom collections (linked structures, lazily materialized views, ...)
/// and wrap them in [`Visiting`] to make them traversable. Elements are keyed by the order in
/// which the visitor reports them.
pub trait Visitable {
    /// The element type.
    type Item;

    /// Calls `visitor` once for every element, in the object's own order.
    fn for_each_item<'a>(&'a self, visitor: &mut dyn FnMut(&'a Self::Item));
}

/// Makes a [`Visitable`] object traversable, as [`Shape::Visitable`].
///
/// The visitor method cannot be interrupted, so the object reports all of its elements up front
/// and early halting only skips the remaining visitor calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Visiting<V>(pub V);

impl<V> Visiting<V> {
    /// Unwraps the visited object.
    pub fn into_inner(self) -> V {
        self.0
    }
}

impl<V> Deref for Visiting<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<V> Classify for Visiting<V> {
    fn shape(&self) -> Shape {
        Shape::Visitable
    }
}

impl<V: Visitable> Traverse for Visiting<V> {
    type Item = V::Item;
    type Key<'a>
        = usize
    where
        Self: 'a;
    type Entries<'a>
        = Enumerate<vec::IntoIter<&'a V::Item>>
    where
        Self: 'a;

    fn entries(&self) -> Self::Entries<'_> {
        let mut reported = Vec::new();
        self.0.for_each_item(&mut |item| reported.push(item));
        reported.into_iter().enumerate()
    }
}

impl<V> FilterShape for Visiting<V>
where
    V: Visitable,
    V::Item: Clone,
{
    type Output = Vec<V::Item>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        collect_retained(self, predicate)
    }
}

impl<V: Visitable> MapShape for Visiting<V> {
    type Output<U> = Vec<U>;

    fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        collect_mapped(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A cons list that only knows how to walk itself.
    enum Chain {
        Link(&'static str, Box<Chain>),
        End,
    }

    impl Visitable for Chain {
        type Item = &'static str;

        fn for_each_item<'a>(&'a self, visitor: &mut dyn FnMut(&'a Self::Item)) {
            let mut cursor = self;
            while let Chain::Link(item, next) = cursor {
                visitor(item);
                cursor = &**next;
            }
        }
    }

    fn chain(items: &[&'static str]) -> Chain {
        items
            .iter()
            .rev()
            .fold(Chain::End, |next, item| Chain::Link(*item, Box::new(next)))
    }

    #[test]
    fn keyed_by_call_order() {
        let visiting = Visiting(chain(&["x", "y", "z"]));
        assert_eq!(visiting.shape(), Shape::Visitable);
        let entries: Vec<_> = visiting.entries().map(|(i, v)| (i, *v)).collect();
        assert_eq!(entries, [(0, "x"), (1, "y"), (2, "z")]);
    }

    #[test]
    fn empty_visitable() {
        assert_eq!(Visiting(Chain::End).entries().count(), 0);
    }
}
