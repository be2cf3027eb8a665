//! Grouping: flat groups, nested result selectors, and dynamic group trees.
//!
//! Groups come out in the order their key first appears in the input, not
//! sorted. Apply an ordering downstream when a sorted order is wanted.

mod bracket;
mod tree;

pub use bracket::PriceBracket;
pub use tree::{group_tree, GroupChildren, GroupNode, KeyFn};

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

/// One partition: a key and every input element that produced it, in input
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group<K, T> {
    pub key: K,
    pub items: Vec<T>,
}

impl<K, T> Group<K, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_parts(self) -> (K, Vec<T>) {
        (self.key, self.items)
    }
}

/// Partition `input` by `key`, eagerly.
pub fn partition<I, K, F>(input: I, mut key: F) -> Vec<Group<K, I::Item>>
where
    I: IntoIterator,
    K: Eq + Hash + Clone,
    F: FnMut(&I::Item) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<K, I::Item>> = Vec::new();
    for item in input {
        let k = key(&item);
        match slots.get(&k) {
            Some(&slot) => groups[slot].items.push(item),
            None => {
                slots.insert(k.clone(), groups.len());
                groups.push(Group {
                    key: k,
                    items: vec![item],
                });
            }
        }
    }
    groups
}

/// Lazy flat grouping. See [`group_by`].
pub struct GroupBy<I: Iterator, K, F> {
    input: Option<I>,
    key: F,
    groups: std::vec::IntoIter<Group<K, I::Item>>,
}

/// Group `input` by `key`; the input is drained on the first `next()`.
pub fn group_by<I, K, F>(input: I, key: F) -> GroupBy<I::IntoIter, K, F>
where
    I: IntoIterator,
    K: Eq + Hash + Clone,
    F: FnMut(&I::Item) -> K,
{
    GroupBy {
        input: Some(input.into_iter()),
        key,
        groups: Vec::new().into_iter(),
    }
}

impl<I, K, F> Iterator for GroupBy<I, K, F>
where
    I: Iterator,
    K: Eq + Hash + Clone,
    F: FnMut(&I::Item) -> K,
{
    type Item = Group<K, I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(input) = self.input.take() {
            self.groups = partition(input, &mut self.key).into_iter();
        }
        self.groups.next()
    }
}

/// Group, then map each `(key, members)` through `selector`.
///
/// A selector that itself groups its members gives nested grouping.
pub fn group_by_with<I, K, F, S, R>(input: I, key: F, mut selector: S) -> impl Iterator<Item = R>
where
    I: IntoIterator,
    K: Eq + Hash + Clone,
    F: FnMut(&I::Item) -> K,
    S: FnMut(K, Vec<I::Item>) -> R,
{
    group_by(input, key).map(move |g| {
        let (k, items) = g.into_parts();
        selector(k, items)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn groups_follow_first_occurrence() {
        let groups: Vec<_> = group_by(vec!["bb", "a", "cc", "d", "eee"], |s| s.len()).collect();
        let keys: Vec<_> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![2, 1, 3]);
        assert_eq!(groups[0].items, vec!["bb", "cc"]);
        assert_eq!(groups[1].items, vec!["a", "d"]);
    }

    #[test]
    fn multi_field_keys_merge_by_value() {
        let dates = vec![(2021, 3, 5), (2021, 3, 9), (2021, 4, 1)];
        let groups: Vec<_> = group_by(dates, |d| (d.0, d.1)).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, (2021, 3));
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn flattening_groups_preserves_the_multiset() {
        let input = vec![5, 3, 5, 1, 3, 3, 8];
        let mut flat: Vec<_> = group_by(input.clone(), |x| x % 3)
            .flat_map(|g| g.items)
            .collect();
        let mut expected = input;
        flat.sort();
        expected.sort();
        assert_eq!(flat, expected);
    }

    #[test]
    fn nested_selector_builds_group_of_groups() {
        let rows = vec![("A", 1, 'p'), ("B", 2, 'q'), ("A", 2, 'r'), ("A", 1, 's')];
        let nested: Vec<(&str, Vec<(i32, usize)>)> = group_by_with(
            rows,
            |r| r.0,
            |cat, members| {
                let inner: Vec<(i32, usize)> =
                    group_by_with(members, |r| r.1, |units, ps| (units, ps.len())).collect();
                (cat, inner)
            },
        )
        .collect();
        assert_eq!(nested, vec![("A", vec![(1, 2), (2, 1)]), ("B", vec![(2, 1)])]);
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert_eq!(group_by(Vec::<i32>::new(), |x| *x).count(), 0);
    }

    #[test]
    fn grouping_is_lazy() {
        let pulled = Cell::new(0);
        let input = (0..4).inspect(|_| pulled.set(pulled.get() + 1));
        let mut groups = group_by(input, |x| x % 2);
        assert_eq!(pulled.get(), 0);
        assert!(groups.next().is_some());
        assert_eq!(pulled.get(), 4);
    }
}
