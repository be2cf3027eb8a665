//! Recursive group-of-groups over runtime key functions.

use serde::Serialize;
use sieve_core::types::Key;

use super::partition;
use crate::sort::OrderBy;

pub type KeyFn<'k, T> = &'k dyn Fn(&T) -> Key;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode<T> {
    pub key: Key,
    pub children: GroupChildren<T>,
}

/// A node holds either leaf records (last key level) or child nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupChildren<T> {
    Leaves(Vec<T>),
    Groups(Vec<GroupNode<T>>),
}

impl<T> GroupNode<T> {
    /// Number of leaf records under this node.
    pub fn len(&self) -> usize {
        match &self.children {
            GroupChildren::Leaves(items) => items.len(),
            GroupChildren::Groups(nodes) => nodes.iter().map(GroupNode::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Levels below this node, counting the leaf level.
    pub fn depth(&self) -> usize {
        match &self.children {
            GroupChildren::Leaves(_) => 1,
            GroupChildren::Groups(nodes) => 1 + nodes.iter().map(GroupNode::depth).max().unwrap_or(0),
        }
    }

    /// Leaf records in tree order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s T>) {
        match &self.children {
            GroupChildren::Leaves(items) => out.extend(items.iter()),
            GroupChildren::Groups(nodes) => {
                for n in nodes {
                    n.collect_leaves(out);
                }
            }
        }
    }

    /// Consume the tree, returning leaf records in tree order.
    pub fn flatten(self) -> Vec<T> {
        match self.children {
            GroupChildren::Leaves(items) => items,
            GroupChildren::Groups(nodes) => nodes.into_iter().flat_map(GroupNode::flatten).collect(),
        }
    }

    /// Sort the leaf lists of every innermost group.
    pub fn sort_leaves(&mut self, order: &OrderBy<'_, T>) {
        match &mut self.children {
            GroupChildren::Leaves(items) => order.sort(items),
            GroupChildren::Groups(nodes) => {
                for n in nodes {
                    n.sort_leaves(order);
                }
            }
        }
    }
}

/// Group `items` by `keys[0]`, each group by `keys[1]`, and so on.
///
/// Every level keeps first-occurrence order. With no keys the whole input
/// becomes one `Key::Null` node (or nothing, for empty input).
pub fn group_tree<T>(items: impl IntoIterator<Item = T>, keys: &[KeyFn<'_, T>]) -> Vec<GroupNode<T>> {
    let items: Vec<T> = items.into_iter().collect();
    let Some((first, rest)) = keys.split_first() else {
        if items.is_empty() {
            return Vec::new();
        }
        return vec![GroupNode {
            key: Key::Null,
            children: GroupChildren::Leaves(items),
        }];
    };

    partition(items, |item| first(item))
        .into_iter()
        .map(|g| {
            let (key, members) = g.into_parts();
            let children = if rest.is_empty() {
                GroupChildren::Leaves(members)
            } else {
                GroupChildren::Groups(group_tree(members, rest))
            };
            GroupNode { key, children }
        })
        .collect()
}
