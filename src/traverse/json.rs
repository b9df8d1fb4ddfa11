// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Traversal of JSON documents.
//!
//! A [`serde_json::Value`] has no fixed shape: arrays traverse as [`Shape::Sequence`], objects
//! as [`Shape::Record`], and every other variant is [`Shape::None`]. The shape is decided anew
//! on every call.
//!
//! Objects keep their field order (this crate enables `serde_json`'s `preserve_order`).
use super::{Classify, Shape, Traverse};
use crate::ops::{FilterShape, MapShape};
use indexmap::IndexMap;
use serde_json::{Map, Value, map};
use std::{fmt, iter::Enumerate, slice};

/// The key of an element inside a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonKey<'a> {
    /// Position inside an array.
    Index(usize),
    /// Field name inside an object.
    Field(&'a str),
}

impl<'a> JsonKey<'a> {
    /// Returns the array position, if this key is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            JsonKey::Index(index) => Some(*index),
            JsonKey::Field(_) => None,
        }
    }

    /// Returns the field name, if this key is one.
    pub fn as_field(&self) -> Option<&'a str> {
        match self {
            JsonKey::Index(_) => None,
            JsonKey::Field(name) => Some(name),
        }
    }
}

impl fmt::Display for JsonKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonKey::Index(index) => write!(f, "[{index}]"),
            JsonKey::Field(name) => write!(f, ".{name}"),
        }
    }
}

/// The entries of a JSON value.
#[derive(Default)]
pub enum JsonEntries<'a> {
    /// Elements of an array.
    Array(Enumerate<slice::Iter<'a, Value>>),
    /// Fields of an object.
    Object(map::Iter<'a>),
    /// A scalar, which has no entries.
    #[default]
    Empty,
}

impl<'a> Iterator for JsonEntries<'a> {
    type Item = (JsonKey<'a>, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            JsonEntries::Array(items) => items
                .next()
                .map(|(index, item)| (JsonKey::Index(index), item)),
            JsonEntries::Object(fields) => fields
                .next()
                .map(|(name, field)| (JsonKey::Field(name.as_str()), field)),
            JsonEntries::Empty => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            JsonEntries::Array(items) => items.size_hint(),
            JsonEntries::Object(fields) => fields.size_hint(),
            JsonEntries::Empty => (0, Some(0)),
        }
    }
}

/// The result of [`map`](crate::map)ping over a JSON value, whose shape is only known at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonMapped<U> {
    /// The value was an array.
    List(Vec<U>),
    /// The value was an object; field order is preserved.
    Record(IndexMap<String, U>),
    /// The value was a scalar and had nothing to map.
    Untraversable,
}

impl<U> JsonMapped<U> {
    /// Returns the mapped elements of an array.
    pub fn into_list(self) -> Option<Vec<U>> {
        match self {
            JsonMapped::List(list) => Some(list),
            _ => None,
        }
    }

    /// Returns the mapped fields of an object.
    pub fn into_record(self) -> Option<IndexMap<String, U>> {
        match self {
            JsonMapped::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl Classify for Value {
    fn shape(&self) -> Shape {
        match self {
            Value::Array(_) => Shape::Sequence,
            Value::Object(_) => Shape::Record,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Shape::None,
        }
    }
}

impl Traverse for Value {
    type Item = Value;
    type Key<'a> = JsonKey<'a>;
    type Entries<'a> = JsonEntries<'a>;

    fn entries(&self) -> Self::Entries<'_> {
        match self {
            Value::Array(items) => JsonEntries::Array(items.iter().enumerate()),
            Value::Object(fields) => fields.entries(),
            _ => JsonEntries::Empty,
        }
    }
}

impl FilterShape for Value {
    type Output = Value;

    fn filter_by<'a, P>(&'a self, mut predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        match self {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .filter(|&(index, item)| predicate(item, JsonKey::Index(index)))
                    .map(|(_, item)| item.clone())
                    .collect(),
            ),
            Value::Object(fields) => Value::Object(fields.filter_by(predicate)),
            scalar => scalar.clone(),
        }
    }
}

impl MapShape for Value {
    type Output<U> = JsonMapped<U>;

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        match self {
            Value::Array(items) => JsonMapped::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| f(item, JsonKey::Index(index)))
                    .collect(),
            ),
            Value::Object(fields) => JsonMapped::Record(fields.map_by(f)),
            _ => JsonMapped::Untraversable,
        }
    }
}

impl Classify for Map<String, Value> {
    fn shape(&self) -> Shape {
        Shape::Record
    }
}

impl Traverse for Map<String, Value> {
    type Item = Value;
    type Key<'a> = JsonKey<'a>;
    type Entries<'a> = JsonEntries<'a>;

    fn entries(&self) -> Self::Entries<'_> {
        JsonEntries::Object(self.iter())
    }
}

impl FilterShape for Map<String, Value> {
    type Output = Map<String, Value>;

    fn filter_by<'a, P>(&'a self, mut predicate: P) -> Self::Output
    where
        P: FnMut(&'a Self::Item, Self::Key<'a>) -> bool,
    {
        self.iter()
            .filter(|&(name, field)| predicate(field, JsonKey::Field(name)))
            .map(|(name, field)| (name.clone(), field.clone()))
            .collect()
    }
}

impl MapShape for Map<String, Value> {
    type Output<U> = IndexMap<String, U>;

    fn map_by<'a, U, F>(&'a self, mut f: F) -> Self::Output<U>
    where
        F: FnMut(&'a Self::Item, Self::Key<'a>) -> U,
    {
        self.iter()
            .map(|(name, field)| (name.clone(), f(field, JsonKey::Field(name))))
            .collect()
    }
}
