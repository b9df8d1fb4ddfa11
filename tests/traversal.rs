//! Tests for the traversal protocol across container shapes.
//!
//! Every shape must agree on visiting order, keys, early halting, and on what `filter` and
//! `map` hand back.

use indexmap::{IndexMap, IndexSet};
use shapewise::{
    OrderedSet, Shape, buffer, classify, each, filter, map, map_to_list, ordered_set,
    sorted_keys, supports_traversal,
    traverse::{Visitable, Visiting},
    visit,
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, VecDeque},
};

/// A ring that hands out its slots starting at an offset.
struct Ring {
    slots: Vec<char>,
    start: usize,
}

impl Visitable for Ring {
    type Item = char;

    fn for_each_item<'a>(&'a self, visitor: &mut dyn FnMut(&'a char)) {
        let (head, tail) = self.slots.split_at(self.start);
        tail.iter().chain(head).for_each(visitor);
    }
}

#[test]
fn every_shape_is_classified() {
    assert_eq!(classify(&vec![1]), Shape::Sequence);
    assert_eq!(classify(&[1u8; 4]), Shape::Sequence);
    assert_eq!(classify(&HashMap::<u8, u8>::new()), Shape::Mapping);
    assert_eq!(classify(&IndexSet::<u8>::new()), Shape::Set);
    assert_eq!(classify(&OrderedSet::<u8>::new()), Shape::Set);
    assert_eq!(classify(&buffer![1.0f64]), Shape::Buffer);
    assert_eq!(
        classify(&Visiting(Ring {
            slots: vec![],
            start: 0
        })),
        Shape::Visitable
    );
    assert_eq!(classify(&42u64), Shape::None);
    assert!(!supports_traversal("a string is a scalar"));
}

#[test]
fn visitables_are_keyed_by_call_order() {
    let ring = Visiting(Ring {
        slots: vec!['a', 'b', 'c', 'd'],
        start: 2,
    });
    let mut seen = Vec::new();
    visit(&ring, |c, i| seen.push((i, *c)));
    assert_eq!(seen, [(0, 'c'), (1, 'd'), (2, 'a'), (3, 'b')]);

    let upper: Vec<char> = map(&ring, |c, _| c.to_ascii_uppercase());
    assert_eq!(upper, ['C', 'D', 'A', 'B']);
}

#[test]
fn halting_works_for_every_shape() {
    fn visits_until_false<C>(container: &C) -> usize
    where
        C: shapewise::Traverse + ?Sized,
    {
        let mut calls = 0;
        each(container, |_, _| {
            calls += 1;
            calls < 2
        });
        calls
    }

    assert_eq!(visits_until_false(&vec![1, 2, 3]), 2);
    assert_eq!(visits_until_false(&VecDeque::from([1, 2, 3])), 2);
    assert_eq!(visits_until_false(&IndexMap::from([(1, 1), (2, 2), (3, 3)])), 2);
    assert_eq!(visits_until_false(&BTreeMap::from([(1, 1), (2, 2), (3, 3)])), 2);
    assert_eq!(visits_until_false(&ordered_set![1, 2, 3]), 2);
    assert_eq!(visits_until_false(&buffer![1u32, 2, 3]), 2);
}

#[test]
fn mappings_keep_keys_and_order() {
    let inventory = IndexMap::from([("zucchini", 0), ("apple", 4), ("mango", 2)]);

    let in_stock = filter(&inventory, |count, _| *count > 0);
    assert_eq!(
        in_stock.into_iter().collect::<Vec<_>>(),
        [("apple", 4), ("mango", 2)]
    );

    let doubled = map(&inventory, |count, _| count * 2);
    assert_eq!(doubled.keys().collect::<Vec<_>>(), [&"zucchini", &"apple", &"mango"]);
    assert_eq!(doubled["apple"], 8);
}

#[test]
fn sequences_buffers_and_sets_filter_to_lists() {
    let kept: Vec<u8> = filter(&buffer![1u8, 2, 3, 4], |n, _| n % 2 == 1);
    assert_eq!(kept, [1, 3]);

    let kept: Vec<&str> = filter(&IndexSet::from(["x", "y"]), |s, _| *s != "x");
    assert_eq!(kept, ["y"]);

    let kept: Vec<i32> = filter(&[3, 2, 1], |_, i| i != 1);
    assert_eq!(kept, [3, 1]);
}

#[test]
fn sorted_keys_is_stable_under_ties() {
    let ranks = IndexMap::from([("d", 2), ("a", 1), ("c", 2), ("b", 1)]);
    let keys = sorted_keys(&ranks, |a: &i32, b: &i32| a.cmp(b));
    assert_eq!(keys, [&"a", &"b", &"d", &"c"]);

    let reversed = sorted_keys(&ranks, |a: &i32, b: &i32| b.cmp(a));
    assert_eq!(reversed, [&"d", &"c", &"a", &"b"]);
}

#[test]
fn map_to_list_ignores_shape() {
    let set = ordered_set![by |a: &i32, b: &i32| b.cmp(a); 1, 3, 2];
    assert_eq!(map_to_list(&set, |n, k| n + k), [6, 4, 2]);

    let none: Option<BTreeMap<u8, u8>> = None;
    assert!(map_to_list(&none, |v, _| *v).is_empty());
}

#[test]
fn comparator_equivalence_defines_duplicates() {
    let case_insensitive =
        |a: &&str, b: &&str| -> Ordering { a.to_lowercase().cmp(&b.to_lowercase()) };
    let mut words = OrderedSet::from_elements(["Beta", "alpha", "ALPHA", "beta"], case_insensitive);
    assert_eq!(words.iter().copied().collect::<Vec<_>>(), ["alpha", "Beta"]);
    assert_eq!(*words.get_equal_value_or_add("BETA"), "Beta");
    assert_eq!(words.len(), 2);
}

#[cfg(feature = "json")]
mod json {
    use serde_json::json;
    use shapewise::{Shape, classify, each, filter, map, traverse::JsonMapped};

    #[test]
    fn json_shapes_are_resolved_per_value() {
        assert_eq!(classify(&json!([1])), Shape::Sequence);
        assert_eq!(classify(&json!({"a": 1})), Shape::Record);
        assert_eq!(classify(&json!(true)), Shape::None);
    }

    #[test]
    fn records_keep_field_names() {
        let doc = json!({"name": "ada", "born": 1815, "died": 1852});
        let numbers = filter(&doc, |v, _| v.is_number());
        assert_eq!(numbers, json!({"born": 1815, "died": 1852}));

        let mut fields = Vec::new();
        each(&doc, |_, key| fields.push(key.to_string()));
        assert_eq!(fields, [".name", ".born", ".died"]);
    }

    #[test]
    fn mapping_json_reports_its_shape() {
        let list = map(&json!([1, 2]), |v, _| v.as_i64().unwrap_or_default() * 10);
        assert_eq!(list, JsonMapped::List(vec![10, 20]));

        let scalar = map(&json!("text"), |_, _| ());
        assert_eq!(scalar, JsonMapped::Untraversable);
    }
}
