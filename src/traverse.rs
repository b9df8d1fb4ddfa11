// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The traversal protocol.
//!
//! Every container this crate knows how to iterate reports a [`Shape`] through [`Classify`] and
//! exposes its elements through [`Traverse`]. The shape is resolved per call, so containers
//! whose shape depends on their contents (like `serde_json::Value` or `Option<C>`) are handled
//! the same way as statically shaped ones.
//!
//! The protocol never mutates the container it walks.

use std::{fmt, ops::ControlFlow};

mod buffer;
#[cfg(feature = "json")]
mod json;
mod std_impls;
mod visiting;

pub use buffer::{Buffer, Numeric};
#[cfg(feature = "json")]
pub use json::{JsonEntries, JsonKey, JsonMapped};
pub use std_impls::SetEntries;
pub use visiting::{Visitable, Visiting};

/// The structural kind of a container.
///
/// The shape decides the order in which elements are visited, which key accompanies each
/// element, and what [`filter`](crate::filter) and [`map`](crate::map) produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum Shape {
    /// A list of elements, keyed by their 0-based index.
    Sequence,
    /// Key-value pairs, keyed by the map key.
    Mapping,
    /// Unique elements, each keyed by itself.
    Set,
    /// A fixed-width numeric buffer, keyed by index.
    Buffer,
    /// An object that only exposes its elements through a visitor method; keyed by call order.
    Visitable,
    /// A plain record of named fields.
    Record,
    /// Not traversable: scalars and absent values.
    None,
}

impl Shape {
    /// Returns `true` for every shape except [`Shape::None`].
    pub fn is_traversable(self) -> bool {
        !matches!(self, Shape::None)
    }

    /// Returns `true` if [`filter`](crate::filter) and [`map`](crate::map) preserve keys for
    /// this shape rather than producing a list.
    pub fn preserves_keys(self) -> bool {
        matches!(self, Shape::Mapping | Shape::Record)
    }

    /// A short, lowercase name for the shape.
    pub fn name(self) -> &'static str {
        match self {
            Shape::Sequence => "sequence",
            Shape::Mapping => "mapping",
            Shape::Set => "set",
            Shape::Buffer => "buffer",
            Shape::Visitable => "visitable",
            Shape::Record => "record",
            Shape::None => "none",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The outcome of a visitor call, deciding whether traversal goes on.
///
/// `()` always continues, `bool` halts on `false` and [`ControlFlow`] halts on
/// [`Break`](ControlFlow::Break). Visitors that return nothing in particular therefore never
/// stop a traversal.
pub trait Flow {
    /// Returns `true` if traversal should stop after this element.
    fn is_halt(&self) -> bool;
}

impl Flow for () {
    fn is_halt(&self) -> bool {
        false
    }
}

impl Flow for bool {
    fn is_halt(&self) -> bool {
        !*self
    }
}

impl<B, C> Flow for ControlFlow<B, C> {
    fn is_halt(&self) -> bool {
        self.is_break()
    }
}

/// Reports the [`Shape`] of a value.
///
/// Implemented for every [`Traverse`] container, and for scalars (which are [`Shape::None`]) so
/// that [`supports_traversal`] can be asked about any of them.
pub trait Classify {
    /// The shape of `self`, as of now.
    fn shape(&self) -> Shape;
}

impl<T: Classify + ?Sized> Classify for &T {
    fn shape(&self) -> Shape {
        (**self).shape()
    }
}

macro_rules! scalar_shape {
    ($($t:ty),* $(,)?) => {
        $(
            impl Classify for $t {
                fn shape(&self) -> Shape {
                    Shape::None
                }
            }
        )*
    };
}

scalar_shape!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    str,
    String,
);

/// A container whose elements can be visited one by one, each with its key.
///
/// Implementors hand out their elements in the order their [`Shape`] prescribes:
///
/// - sequences and buffers in index order,
/// - mappings and sets in insertion order where the container remembers it (`IndexMap`,
///   `IndexSet`), in sorted order for sorted containers, and in the container's own iteration
///   order otherwise,
/// - records in field order,
/// - visitables in the order their visitor method reports elements.
///
/// A container classified as [`Shape::None`] yields no elements.
pub trait Traverse: Classify {
    /// The element type.
    type Item;

    /// The key handed out alongside each element.
    type Key<'a>
    where
        Self: 'a;

    /// The iterator behind [`Traverse::entries`].
    type Entries<'a>: Iterator<Item = (Self::Key<'a>, &'a Self::Item)>
    where
        Self: 'a;

    /// Iterates over `(key, element)` pairs in traversal order.
    fn entries(&self) -> Self::Entries<'_>;
}

/// Returns the [`Shape`] of `value`. Never fails: anything unsupported is [`Shape::None`].
pub fn classify<T: Classify + ?Sized>(value: &T) -> Shape {
    value.shape()
}

/// Returns `true` if `value` has elements that can be visited.
pub fn supports_traversal<T: Classify + ?Sized>(value: &T) -> bool {
    value.shape().is_traversable()
}

/// Calls `visitor(element, key)` for every element of `container`, in traversal order.
///
/// Traversal halts as soon as the visitor returns a halting [`Flow`], such as `false`. Returns
/// `container` so calls can be chained. Visiting a container of shape [`Shape::None`] does
/// nothing.
pub fn visit<'a, C, F, R>(container: &'a C, mut visitor: F) -> &'a C
where
    C: Traverse + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> R,
    R: Flow,
{
    match container.shape() {
        Shape::None => {}
        Shape::Sequence
        | Shape::Mapping
        | Shape::Set
        | Shape::Buffer
        | Shape::Visitable
        | Shape::Record => {
            for (key, element) in container.entries() {
                if visitor(element, key).is_halt() {
                    break;
                }
            }
        }
    }
    container
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{IndexMap, IndexSet};
    use std::collections::{BTreeMap, HashSet, VecDeque};

    #[test]
    fn classify_std_containers() {
        assert_eq!(classify(&vec![1, 2]), Shape::Sequence);
        assert_eq!(classify(&[1, 2][..]), Shape::Sequence);
        assert_eq!(classify(&VecDeque::<u8>::new()), Shape::Sequence);
        assert_eq!(classify(&BTreeMap::<u8, u8>::new()), Shape::Mapping);
        assert_eq!(classify(&IndexMap::<u8, u8>::new()), Shape::Mapping);
        assert_eq!(classify(&HashSet::<u8>::new()), Shape::Set);
        assert_eq!(classify(&IndexSet::<u8>::new()), Shape::Set);
        assert_eq!(classify(&Buffer::from(vec![1u8])), Shape::Buffer);
    }

    #[test]
    fn scalars_are_not_traversable() {
        assert!(!supports_traversal(&5));
        assert!(!supports_traversal(&1.5f32));
        assert!(!supports_traversal("text"));
        assert!(!supports_traversal(&String::from("text")));
        assert!(!supports_traversal(&None::<Vec<u8>>));
        assert!(supports_traversal(&Some(vec![1])));
        assert!(supports_traversal(&Vec::<u8>::new()));
    }

    #[test]
    fn visit_sequence_in_order_with_indices() {
        let mut seen = Vec::new();
        visit(&vec!['a', 'b', 'c'], |c, i| seen.push((i, *c)));
        assert_eq!(seen, [(0, 'a'), (1, 'b'), (2, 'c')]);
    }

    #[test]
    fn visit_halts_on_false_only() {
        let mut seen = Vec::new();
        visit(&[1, 2, 3], |n, _| {
            seen.push(*n);
            *n != 2
        });
        assert_eq!(seen, [1, 2]);

        let mut seen = Vec::new();
        visit(&[1, 2, 3], |n, _| seen.push(*n));
        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn visit_halts_on_break() {
        let mut seen = Vec::new();
        visit(&[1, 2, 3], |n, _| {
            seen.push(*n);
            if *n == 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, [1]);
    }

    #[test]
    fn visit_mapping_in_insertion_order() {
        let map: IndexMap<_, _> = [("b", 1), ("a", 2)].into_iter().collect();
        let mut seen = Vec::new();
        visit(&map, |v, k| seen.push((*k, *v)));
        assert_eq!(seen, [("b", 1), ("a", 2)]);
    }

    #[test]
    fn visit_set_keys_elements_by_themselves() {
        let set: IndexSet<_> = [10, 20].into_iter().collect();
        let mut seen = Vec::new();
        visit(&set, |v, k| seen.push((*k, *v)));
        assert_eq!(seen, [(10, 10), (20, 20)]);
    }

    #[test]
    fn visit_returns_the_container() {
        let list = vec![1, 2];
        let back = visit(&list, |_, _| ());
        assert!(std::ptr::eq(back, &list));
    }

    #[test]
    fn visit_on_none_is_a_no_op() {
        let mut calls = 0;
        visit(&None::<Vec<u8>>, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn shape_names() {
        assert_eq!(Shape::Record.to_string(), "record");
        assert!(Shape::Mapping.preserves_keys());
        assert!(!Shape::Set.preserves_keys());
        assert!(!Shape::None.is_traversable());
    }
}
