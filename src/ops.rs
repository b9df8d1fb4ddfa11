// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Synchronous iteration over any [`Traverse`] container.
//!
//! Every operation here goes through the traversal protocol, so they all accept the same set
//! of containers and agree on visiting order and keys. None of them mutate their input.
//!
//! [`filter`] and [`map`] are the only operations whose result depends on the container's
//! [`Shape`](crate::Shape): mappings and records keep their keys, everything else becomes a
//! list. Containers opt into them through [`FilterShape`] and [`MapShape`].
use crate::traverse::{Flow, Traverse, visit};
use std::cmp::Ordering;

/// Containers that know which container [`filter`] should produce for them.
pub trait FilterShape: Traverse {
    /// The filtered container.
    type Output;

    /// Keeps the elements for which `predicate` returns `true`, in traversal order.
    fn filter_by<'a, P>(&'a self, predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool;
}

/// Containers that know which container [`map`] should produce for them.
pub trait MapShape: Traverse {
    /// The mapped container, holding `U`s in place of the original elements.
    type Output<U>;

    /// Replaces every element with `f(element, key)`.
    fn map_by<'a, U, F>(&'a self, f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U;
}

pub(crate) fn collect_retained<'a, C, P>(container: &'a C, mut predicate: P) -> Vec<C::Item>
where
    C: Traverse + ?Sized,
    C::Item: Clone,
    P: FnMut(&'a C::Item, C::Key<'a>) -> bool,
{
    container
        .entries()
        .filter_map(|(key, element)| predicate(element, key).then(|| element.clone()))
        .collect()
}

pub(crate) fn collect_mapped<'a, C, U, F>(container: &'a C, mut f: F) -> Vec<U>
where
    C: Traverse + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> U,
{
    container
        .entries()
        .map(|(key, element)| f(element, key))
        .collect()
}

/// Calls `f(element, key)` for every element of `container`, halting early if `f` returns a
/// halting [`Flow`] such as `false`.
///
/// Returns `container`.
///
/// ```rust
/// # use shapewise::each;
/// let mut sum = 0;
/// each(&[1, 2, 3, 4], |n, _| {
///     sum += n;
///     sum < 3
/// });
/// assert_eq!(sum, 3);
/// ```
pub fn each<'a, C, F, R>(container: &'a C, f: F) -> &'a C
where
    C: Traverse + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> R,
    R: Flow,
{
    visit(container, f)
}

/// Returns the elements of `container` for which `predicate` does not halt.
///
/// Only a halting outcome (`false`, [`Break`](std::ops::ControlFlow::Break)) drops an element;
/// a predicate returning `()` keeps everything. Unlike [`each`], a halting outcome never stops
/// the walk: every element is offered to `predicate`.
///
/// Lists, sets, buffers and visitables come back as a `Vec`; mappings and records come back as
/// a mapping of the same kind with the retained keys.
pub fn filter<'a, C, P, R>(container: &'a C, mut predicate: P) -> C::Output
where
    C: FilterShape + ?Sized,
    P: FnMut(&'a C::Item, C::Key<'a>) -> R,
    R: Flow,
{
    container.filter_by(|element, key| !predicate(element, key).is_halt())
}

/// Values with a notion of truthiness, used by [`filter_truthy`].
///
/// Zero, `NaN`, `false`, empty strings and `None` are falsy. JSON values follow JavaScript:
/// `null` is falsy and arrays and objects are truthy even when empty.
pub trait Truthy {
    /// Returns `true` if the value is truthy.
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

macro_rules! truthy_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Truthy for $t {
                fn is_truthy(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

truthy_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.is_some()
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

#[cfg(feature = "json")]
impl Truthy for serde_json::Value {
    fn is_truthy(&self) -> bool {
        use serde_json::Value;
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n.is_truthy()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// [`filter`] without a predicate: keeps the [`Truthy`] elements.
pub fn filter_truthy<C>(container: &C) -> C::Output
where
    C: FilterShape + ?Sized,
    C::Item: Truthy,
{
    container.filter_by(|element, _| element.is_truthy())
}

/// Replaces every element of `container` with `f(element, key)`.
///
/// The result has the container's shape: lists stay lists (arrays stay arrays of the same
/// length), mappings and records keep their keys, and sets, buffers and visitables become a
/// `Vec`.
///
/// ```rust
/// # use shapewise::map;
/// # use std::collections::BTreeMap;
/// let ages = BTreeMap::from([("ada", 36), ("alan", 41)]);
/// let next_year = map(&ages, |age, _| age + 1);
/// assert_eq!(next_year, BTreeMap::from([("ada", 37), ("alan", 42)]));
/// ```
pub fn map<'a, C, U, F>(container: &'a C, f: F) -> C::Output<U>
where
    C: MapShape + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> U,
{
    container.map_by(f)
}

/// [`map`] without a transform: a shape-preserving copy of `container`.
pub fn map_identity<C>(container: &C) -> C::Output<C::Item>
where
    C: MapShape + ?Sized,
    C::Item: Clone,
{
    container.map_by(|element, _| element.clone())
}

/// Collects `f(element, key)` for every element of `container` into a list, whatever its
/// shape.
pub fn map_to_list<'a, C, U, F>(container: &'a C, mut f: F) -> Vec<U>
where
    C: Traverse + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> U,
{
    let mut list = Vec::new();
    visit(container, |element, key| list.push(f(element, key)));
    list
}

fn sorted_entries<'a, C, S>(container: &'a C, mut cmp: S) -> Vec<(C::Key<'a>, &'a C::Item)>
where
    C: Traverse + ?Sized,
    S: FnMut(&C::Item, &C::Item) -> Ordering,
{
    let mut entries = map_to_list(container, |element, key| (key, element));
    // stable: elements comparing equal keep their traversal order
    entries.sort_by(|(_, a), (_, b)| cmp(*a, *b));
    entries
}

/// Returns the keys of `container`, ordered by comparing the elements they point at.
///
/// The sort is stable. Use [`cmp::compare`](crate::cmp::compare) for the natural order.
///
/// ```rust
/// # use shapewise::{cmp::compare, sorted_keys};
/// # use indexmap::IndexMap;
/// let stock = IndexMap::from([("pear", 5), ("fig", 2), ("kiwi", 5)]);
/// assert_eq!(sorted_keys(&stock, compare), [&"fig", &"pear", &"kiwi"]);
/// ```
pub fn sorted_keys<'a, C, S>(container: &'a C, cmp: S) -> Vec<C::Key<'a>>
where
    C: Traverse + ?Sized,
    S: FnMut(&C::Item, &C::Item) -> Ordering,
{
    sorted_entries(container, cmp)
        .into_iter()
        .map(|(key, _)| key)
        .collect()
}

/// Like [`map_to_list`], but visits the elements in the order given by [`sorted_keys`].
pub fn map_to_list_sorted<'a, C, S, U, F>(container: &'a C, cmp: S, mut f: F) -> Vec<U>
where
    C: Traverse + ?Sized,
    S: FnMut(&C::Item, &C::Item) -> Ordering,
    F: FnMut(&'a C::Item, C::Key<'a>) -> U,
{
    sorted_entries(container, cmp)
        .into_iter()
        .map(|(key, element)| f(element, key))
        .collect()
}

/// Returns the number of elements `container` would visit.
///
/// For records this is the number of fields.
pub fn count<C: Traverse + ?Sized>(container: &C) -> usize {
    let mut count = 0;
    visit(container, |_, _| count += 1);
    count
}

/// Returns `true` if `container` has no element to visit, looking at the first one at most.
///
/// Untraversable values are empty.
pub fn is_empty<C: Traverse + ?Sized>(container: &C) -> bool {
    let mut empty = true;
    visit(container, |_, _| {
        empty = false;
        false
    });
    empty
}

/// Collects the leaves of arbitrarily nested JSON arrays, depth first.
///
/// Anything that is not an array, objects included, is a leaf. A leaf passed directly comes
/// back as the only element.
///
/// ```rust
/// # use shapewise::ops::flatten;
/// # use serde_json::json;
/// let nested = json!([1, [2, [3, []]], {"k": [4]}]);
/// assert_eq!(flatten(&nested), [&json!(1), &json!(2), &json!(3), &json!({"k": [4]})]);
/// assert_eq!(flatten(&json!("x")), [&json!("x")]);
/// ```
#[cfg(feature = "json")]
pub fn flatten(value: &serde_json::Value) -> Vec<&serde_json::Value> {
    fn collect<'v>(value: &'v serde_json::Value, leaves: &mut Vec<&'v serde_json::Value>) {
        match value {
            serde_json::Value::Array(items) => items.iter().for_each(|item| collect(item, leaves)),
            leaf => leaves.push(leaf),
        }
    }

    let mut leaves = Vec::new();
    collect(value, &mut leaves);
    leaves
}

/// Returns `true` if some element of `container` equals `value`.
pub fn contains<C, Q>(container: &C, value: &Q) -> bool
where
    C: Traverse + ?Sized,
    C::Item: PartialEq<Q>,
    Q: ?Sized,
{
    let mut found = false;
    visit(container, |element, _| {
        found = element == value;
        !found
    });
    found
}

/// Returns `true` if every one of `values` is contained in `container`.
///
/// Trivially `true` for no values.
pub fn contains_all<'v, C, Q, I>(container: &C, values: I) -> bool
where
    C: Traverse + ?Sized,
    C::Item: PartialEq<Q>,
    Q: 'v + ?Sized,
    I: IntoIterator<Item = &'v Q>,
{
    values.into_iter().all(|value| contains(container, value))
}

/// Returns `true` if at least one of `values` is contained in `container`.
pub fn contains_any<'v, C, Q, I>(container: &C, values: I) -> bool
where
    C: Traverse + ?Sized,
    C::Item: PartialEq<Q>,
    Q: 'v + ?Sized,
    I: IntoIterator<Item = &'v Q>,
{
    values.into_iter().any(|value| contains(container, value))
}

/// Returns `true` if none of `values` is contained in `container`.
pub fn contains_none<'v, C, Q, I>(container: &C, values: I) -> bool
where
    C: Traverse + ?Sized,
    C::Item: PartialEq<Q>,
    Q: 'v + ?Sized,
    I: IntoIterator<Item = &'v Q>,
{
    !contains_any(container, values)
}
