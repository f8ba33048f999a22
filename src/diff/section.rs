//! Per-section set differences
//!
//! Two flavours: value sections, where an item is either present or not,
//! and keyed sections, where an item with the same key on both sides is
//! "changed" when its contents differ. Output is sorted for stable reports.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// An item present on both sides with different contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Changed<T> {
    /// Identity of the item
    pub key: String,
    /// Contents in run A
    pub before: T,
    /// Contents in run B
    pub after: T,
}

/// Differences within one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDiff<T> {
    /// Present in B only
    pub added: Vec<T>,
    /// Present in A only
    pub removed: Vec<T>,
    /// Present in both, contents differ
    pub changed: Vec<Changed<T>>,
}

impl<T> Default for SectionDiff<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            changed: Vec::new(),
        }
    }
}

impl<T> SectionDiff<T> {
    /// True when the section is identical on both sides
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Number of reported differences
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Compare two sides by value. Duplicates and order are ignored.
pub fn diff_values<T>(a: &[T], b: &[T]) -> SectionDiff<T>
where
    T: Ord + Clone,
{
    let left: BTreeSet<&T> = a.iter().collect();
    let right: BTreeSet<&T> = b.iter().collect();

    SectionDiff {
        added: right.difference(&left).map(|item| (*item).clone()).collect(),
        removed: left.difference(&right).map(|item| (*item).clone()).collect(),
        changed: Vec::new(),
    }
}

fn index_by_key<'a, T, K>(items: &'a [T], key: &K) -> BTreeMap<String, &'a T>
where
    K: Fn(&T) -> String,
{
    let mut map = BTreeMap::new();
    for item in items {
        map.entry(key(item)).or_insert(item);
    }
    map
}

/// Compare two sides by key. When a key repeats, its first item counts.
pub fn diff_keyed<T, K>(a: &[T], b: &[T], key: K) -> SectionDiff<T>
where
    T: PartialEq + Clone,
    K: Fn(&T) -> String,
{
    let left = index_by_key(a, &key);
    let right = index_by_key(b, &key);

    let mut diff = SectionDiff::default();
    for (k, before) in &left {
        match right.get(k) {
            None => diff.removed.push((*before).clone()),
            Some(after) if after != before => diff.changed.push(Changed {
                key: k.clone(),
                before: (*before).clone(),
                after: (*after).clone(),
            }),
            Some(_) => {}
        }
    }
    for (k, after) in &right {
        if !left.contains_key(k) {
            diff.added.push((*after).clone());
        }
    }
    diff
}
