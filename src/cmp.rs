// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Ready-made comparators for [`OrderedSet`](crate::OrderedSet),
//! [`sorted_keys`](crate::sorted_keys) and [`map_to_list_sorted`](crate::map_to_list_sorted).

use std::cmp::Ordering;

/// Compares two values by their natural (partial) order.
///
/// Values that are not comparable, such as `NaN`, are treated as equal. Keep that in mind when
/// using this as the comparator of an [`OrderedSet`](crate::OrderedSet), where "equal" means
/// "the same element".
pub fn compare<T: PartialOrd + ?Sized>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Compares two strings holding non-negative integers of arbitrary length.
///
/// Surrounding whitespace is ignored. A shorter number sorts first; numbers of the same length
/// compare lexicographically, which for digits is numeric order. Leading zeros are significant.
pub fn compare_numeric_strings(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
