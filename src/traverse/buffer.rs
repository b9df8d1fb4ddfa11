// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::{Classify, Shape, Traverse};
use crate::ops::{FilterShape, MapShape, collect_mapped, collect_retained};
use std::{fmt, iter::Enumerate, ops::Deref, slice};

mod sealed {
    pub trait Sealed {}
}

/// Primitive numeric types that can back a [`Buffer`].
///
/// This trait is sealed.
pub trait Numeric: Copy + PartialOrd + Default + fmt::Debug + sealed::Sealed {
    /// Width of one element, in bytes.
    const WIDTH: usize = std::mem::size_of::<Self>();
}

macro_rules! numeric {
    ($($t:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl Numeric for $t {}
        )*
    };
}

numeric!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// A fixed-length buffer of fixed-width numbers.
///
/// Unlike a `Vec<T>`, a buffer cannot grow or shrink once created; its elements can only be
/// overwritten in place. It traverses as [`Shape::Buffer`]; [`filter`](crate::filter) and
/// [`map`](crate::map) turn it into a plain list, since neither is guaranteed to preserve
/// its length or element type.
#[derive(Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(::serde::Deserialize, ::serde::Serialize),
    serde(transparent)
)]
pub struct Buffer<T: Numeric> {
    elements: Box<[T]>,
}

impl<T: Numeric> Buffer<T> {
    /// Creates a buffer of `len` zeroes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            elements: vec![T::default(); len].into_boxed_slice(),
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the size of the buffer's contents, in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * T::WIDTH
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Returns the elements as a mutable slice, for overwriting in place.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements
    }

    /// Returns the element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<T> {
        self.elements.get(index).copied()
    }

    /// Overwrites the element at `index`, returning the previous one.
    ///
    /// Returns `None` and leaves the buffer untouched if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        self.elements
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }
}

impl<T: Numeric> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&&*self.elements).finish()
    }
}

impl<T: Numeric> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

impl<T: Numeric> From<Vec<T>> for Buffer<T> {
    fn from(elements: Vec<T>) -> Self {
        Self {
            elements: elements.into_boxed_slice(),
        }
    }
}

impl<T: Numeric, const N: usize> From<[T; N]> for Buffer<T> {
    fn from(elements: [T; N]) -> Self {
        Self {
            elements: Box::new(elements),
        }
    }
}

impl<T: Numeric> FromIterator<T> for Buffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<T: Numeric> Classify for Buffer<T> {
    fn shape(&self) -> Shape {
        Shape::Buffer
    }
}

impl<T: Numeric> Traverse for Buffer<T> {
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
        self.elements.iter().enumerate()
    }
}

impl<T: Numeric> FilterShape for Buffer<T> {
    type Output = Vec<T>;

    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        collect_retained(self, predicate)
    }
}

impl<T: Numeric> MapShape for Buffer<T> {
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

    #[test]
    fn widths() {
        assert_eq!(Buffer::from([1u8, 2, 3]).byte_len(), 3);
        assert_eq!(Buffer::from([1.0f64, 2.0]).byte_len(), 16);
        assert_eq!(<i32 as Numeric>::WIDTH, 4);
    }

    #[test]
    fn fixed_length_overwrite() {
        let mut buffer = Buffer::<u16>::zeroed(2);
        assert_eq!(buffer.set(1, 7), Some(0));
        assert_eq!(buffer.set(2, 7), None);
        assert_eq!(buffer.as_slice(), [0, 7]);
        buffer.as_mut_slice()[0] = 3;
        assert_eq!(buffer.get(0), Some(3));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn traverses_by_index() {
        let buffer: Buffer<i8> = [-1, 0, 1].into_iter().collect();
        let entries: Vec<_> = buffer.entries().map(|(i, v)| (i, *v)).collect();
        assert_eq!(entries, [(0, -1), (1, 0), (2, 1)]);
    }

    #[test]
    fn debug_lists_elements() {
        assert_eq!(format!("{:?}", Buffer::from([1u8, 2])), "Buffer([1, 2])");
    }
}
