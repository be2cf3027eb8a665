//! Stable multi-key ordering.
//!
//! An `OrderBy` is a stack of comparison layers. Each layer has its own key
//! and direction and is consulted only when every earlier layer compares
//! equal; elements equal on every layer keep their input order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

pub struct OrderBy<'a, T> {
    layers: Vec<(Comparator<'a, T>, SortDirection)>,
}

impl<'a, T> OrderBy<'a, T> {
    /// Primary layer. Keys that do not compare (NaN) count as equal.
    pub fn by<K, F>(direction: SortDirection, key: F) -> Self
    where
        K: PartialOrd,
        F: Fn(&T) -> K + 'a,
    {
        Self { layers: Vec::new() }.then_by(direction, key)
    }

    pub fn asc<K: PartialOrd, F: Fn(&T) -> K + 'a>(key: F) -> Self {
        Self::by(SortDirection::Asc, key)
    }

    pub fn desc<K: PartialOrd, F: Fn(&T) -> K + 'a>(key: F) -> Self {
        Self::by(SortDirection::Desc, key)
    }

    /// Add a tie-break layer below the existing ones.
    pub fn then_by<K, F>(mut self, direction: SortDirection, key: F) -> Self
    where
        K: PartialOrd,
        F: Fn(&T) -> K + 'a,
    {
        let cmp = move |a: &T, b: &T| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
        self.layers.push((Box::new(cmp), direction));
        self
    }

    pub fn then_asc<K: PartialOrd, F: Fn(&T) -> K + 'a>(self, key: F) -> Self {
        self.then_by(SortDirection::Asc, key)
    }

    pub fn then_desc<K: PartialOrd, F: Fn(&T) -> K + 'a>(self, key: F) -> Self {
        self.then_by(SortDirection::Desc, key)
    }

    pub fn layers(&self) -> usize {
        self.layers.len()
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for (cmp, direction) in &self.layers {
            let ord = direction.apply(cmp(a, b));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort.
    pub fn sort(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }

    pub fn sorted(&self, mut items: Vec<T>) -> Vec<T> {
        self.sort(&mut items);
        items
    }
}

/// Lazy sort adaptor. See [`sorted`].
pub struct Sorted<'a, I: Iterator> {
    input: Option<I>,
    order: OrderBy<'a, I::Item>,
    buffer: std::vec::IntoIter<I::Item>,
}

/// Sort `input` by `order`; the input is buffered on the first `next()`.
pub fn sorted<'a, I>(input: I, order: OrderBy<'a, I::Item>) -> Sorted<'a, I::IntoIter>
where
    I: IntoIterator,
{
    Sorted {
        input: Some(input.into_iter()),
        order,
        buffer: Vec::new().into_iter(),
    }
}

impl<I: Iterator> Iterator for Sorted<'_, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if let Some(input) = self.input.take() {
            self.buffer = self.order.sorted(input.collect()).into_iter();
        }
        self.buffer.next()
    }
}
