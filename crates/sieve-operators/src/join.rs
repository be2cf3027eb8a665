//! Hash join and set intersection.
//!
//! Both adaptors are lazy: the build side (join inner / intersect second) is
//! drained into a hash table on the first `next()`, then the outer side
//! streams through. Output order is outer order, so results are
//! deterministic without sorting.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Inner equality join. See [`hash_join`].
pub struct HashJoin<O, I, K, FO, FI, FC, R>
where
    O: Iterator,
    I: Iterator,
{
    outer: O,
    inner: Option<I>,
    index: HashMap<K, Vec<I::Item>>,
    outer_key: FO,
    inner_key: FI,
    combine: FC,
    pending: std::vec::IntoIter<R>,
}

/// Join `outer` with `inner` on structurally equal keys.
///
/// Every (outer, inner) pair with equal keys yields one `combine` result, so
/// N outer and M inner rows sharing a key give N×M rows. Unmatched rows on
/// either side yield nothing. Results follow outer order; for a single outer
/// row, matches follow inner order.
pub fn hash_join<O, I, K, FO, FI, FC, R>(
    outer: O,
    inner: I,
    outer_key: FO,
    inner_key: FI,
    combine: FC,
) -> HashJoin<O::IntoIter, I::IntoIter, K, FO, FI, FC, R>
where
    O: IntoIterator,
    I: IntoIterator,
    K: Eq + Hash,
    FO: FnMut(&O::Item) -> K,
    FI: FnMut(&I::Item) -> K,
    FC: FnMut(&O::Item, &I::Item) -> R,
{
    HashJoin {
        outer: outer.into_iter(),
        inner: Some(inner.into_iter()),
        index: HashMap::new(),
        outer_key,
        inner_key,
        combine,
        pending: Vec::new().into_iter(),
    }
}

impl<O, I, K, FO, FI, FC, R> Iterator for HashJoin<O, I, K, FO, FI, FC, R>
where
    O: Iterator,
    I: Iterator,
    K: Eq + Hash,
    FO: FnMut(&O::Item) -> K,
    FI: FnMut(&I::Item) -> K,
    FC: FnMut(&O::Item, &I::Item) -> R,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if let Some(inner) = self.inner.take() {
            for item in inner {
                let key = (self.inner_key)(&item);
                self.index.entry(key).or_default().push(item);
            }
        }

        loop {
            if let Some(row) = self.pending.next() {
                return Some(row);
            }
            let left = self.outer.next()?;
            let key = (self.outer_key)(&left);
            if let Some(matches) = self.index.get(&key) {
                let combine = &mut self.combine;
                self.pending = matches
                    .iter()
                    .map(|right| combine(&left, right))
                    .collect::<Vec<_>>()
                    .into_iter();
            }
        }
    }
}

/// Distinct values present in both inputs. See [`intersect`].
pub struct Intersect<A, B>
where
    A: Iterator,
{
    first: A,
    second: Option<B>,
    remaining: HashSet<A::Item>,
}

/// Each value found in both `first` and `second`, once, in the order it is
/// first seen in `first`.
pub fn intersect<A, B>(first: A, second: B) -> Intersect<A::IntoIter, B::IntoIter>
where
    A: IntoIterator,
    B: IntoIterator<Item = A::Item>,
    A::Item: Eq + Hash,
{
    Intersect {
        first: first.into_iter(),
        second: Some(second.into_iter()),
        remaining: HashSet::new(),
    }
}

impl<A, B> Iterator for Intersect<A, B>
where
    A: Iterator,
    B: Iterator<Item = A::Item>,
    A::Item: Eq + Hash,
{
    type Item = A::Item;

    fn next(&mut self) -> Option<A::Item> {
        if let Some(second) = self.second.take() {
            self.remaining.extend(second);
        }
        // Removing on emit makes each value come out once.
        self.first.by_ref().find(|item| self.remaining.remove(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn n_by_m_matches_yield_every_pair_in_outer_then_inner_order() {
        let outer = vec![("a", 1), ("b", 2), ("a", 3)];
        let inner = vec![("a", 'x'), ("c", 'y'), ("a", 'z')];
        let rows: Vec<_> = hash_join(
            outer,
            inner,
            |o| o.0,
            |i| i.0,
            |o, i| (o.1, i.1),
        )
        .collect();
        assert_eq!(rows, vec![(1, 'x'), (1, 'z'), (3, 'x'), (3, 'z')]);
    }

    #[test]
    fn disjoint_keys_yield_nothing() {
        let rows: Vec<(i32, i32)> =
            hash_join(vec![1, 2, 3], vec![4, 5], |o| *o, |i| *i, |o, i| (*o, *i)).collect();
        assert!(rows.is_empty());
    }

    #[test]
    fn composite_keys_compare_by_value() {
        let outer = vec![(String::from("Berlin"), String::from("Germany"))];
        let inner = vec![(String::from("Berlin"), String::from("Germany"))];
        let n = hash_join(outer, inner, |o| o.clone(), |i| i.clone(), |_, _| ()).count();
        assert_eq!(n, 1);
    }

    #[test]
    fn join_builds_nothing_until_polled() {
        let pulled = Cell::new(false);
        let inner = std::iter::once(1).inspect(|_| pulled.set(true));
        let mut join = hash_join(vec![1], inner, |o| *o, |i| *i, |o, i| o + i);
        assert!(!pulled.get());
        assert_eq!(join.next(), Some(2));
        assert!(pulled.get());
    }

    #[test]
    fn intersect_is_distinct_and_keeps_first_order() {
        let first = vec![3, 1, 3, 2, 1, 5];
        let second = vec![1, 2, 3, 3, 4];
        let out: Vec<_> = intersect(first, second).collect();
        assert_eq!(out, vec![3, 1, 2]);
    }

    #[test]
    fn intersect_with_empty_side_is_empty() {
        assert_eq!(intersect(vec![1, 2], Vec::new()).count(), 0);
        assert_eq!(intersect(Vec::<i32>::new(), vec![1]).count(), 0);
    }
}
