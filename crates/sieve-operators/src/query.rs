//! Restartable lazy sequences.
//!
//! A `Query` stores how to build an iterator chain, never its output.
//! Building a `Query` pulls nothing; every `iter()` rebuilds the chain and
//! re-reads the source, so a second pass sees the source as it is then.

use std::fmt;
use std::rc::Rc;

use crate::traits::BoxIter;

pub struct Query<'a, T> {
    name: &'static str,
    factory: Rc<dyn Fn() -> BoxIter<'a, T> + 'a>,
}

impl<'a, T: 'a> Query<'a, T> {
    pub fn new<F, I>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: Iterator<Item = T> + 'a,
    {
        Self {
            name,
            factory: Rc::new(move || Box::new(factory()) as BoxIter<'a, T>),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start a fresh evaluation pass.
    pub fn iter(&self) -> BoxIter<'a, T> {
        (self.factory)()
    }

    /// Lazily project every element.
    pub fn map<U: 'a, F>(self, f: F) -> Query<'a, U>
    where
        F: Fn(T) -> U + 'a,
    {
        let Query { name, factory } = self;
        let f = Rc::new(f);
        Query::new(name, move || {
            let f = Rc::clone(&f);
            factory().map(move |item| f(item))
        })
    }

    /// Lazily keep elements matching `pred`.
    pub fn filter<P>(self, pred: P) -> Query<'a, T>
    where
        P: Fn(&T) -> bool + 'a,
    {
        let Query { name, factory } = self;
        let pred = Rc::new(pred);
        Query::new(name, move || {
            let pred = Rc::clone(&pred);
            factory().filter(move |item| pred(item))
        })
    }

    /// Run one full pass and collect it.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T> Clone for Query<'_, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("name", &self.name).finish()
    }
}

impl<'q, 'a, T: 'a> IntoIterator for &'q Query<'a, T> {
    type Item = T;
    type IntoIter = BoxIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
