use itertools::Itertools;
use smol_str::SmolStr;

use super::{Entry, Node, SENTINEL};
use crate::types::Weight;

/// A read-only position in a [`Trie`](super::Trie): a node plus the search
/// key prefix spelled out to reach it.
///
/// Leaves may hold entries whose keys run deeper than the leaf itself, so a
/// traversal can sit "inside" a leaf; the prefix tells which of its entries
/// are still reachable.
#[derive(Clone, Debug)]
pub struct Traversal<'t> {
    node: &'t Node,
    prefix: SmolStr,
    depth: usize,
}

impl<'t> Traversal<'t> {
    pub(crate) fn new(root: &'t Node) -> Traversal<'t> {
        Traversal {
            node: root,
            prefix: SmolStr::default(),
            depth: 0,
        }
    }

    fn child(&self, node: &'t Node, ch: char) -> Traversal<'t> {
        let mut prefix = String::with_capacity(self.prefix.len() + ch.len_utf8());
        prefix.push_str(&self.prefix);
        prefix.push(ch);

        Traversal {
            node,
            prefix: prefix.into(),
            depth: self.depth + 1,
        }
    }

    /// The search key prefix leading here.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Highest entry weight still reachable from here.
    pub fn weight(&self) -> Weight {
        match self.node {
            Node::Internal { weight, .. } => *weight,
            Node::Leaf { .. } => self
                .leaf_entries()
                .iter()
                .map(|e| e.weight)
                .max()
                .unwrap_or(0),
        }
    }

    fn leaf_entries(&self) -> Vec<&'t Entry> {
        match self.node {
            Node::Leaf { entries, .. } => entries
                .iter()
                .filter(|e| e.key.starts_with(self.prefix.as_str()))
                .collect(),
            Node::Internal { .. } => vec![],
        }
    }

    /// Next characters and their continuations, in descending weight order.
    pub fn children(&self) -> Vec<(char, Traversal<'t>)> {
        match self.node {
            Node::Internal {
                values, children, ..
            } => values
                .iter()
                .filter(|&&ch| ch != SENTINEL)
                .filter_map(|ch| {
                    children
                        .get(ch)
                        .map(|node| (*ch, self.child(node, *ch)))
                })
                .collect(),
            // Entries are weight-sorted, so first appearance of a character
            // is also its heaviest.
            Node::Leaf { .. } => self
                .leaf_entries()
                .into_iter()
                .filter_map(|e| e.key.chars().nth(self.depth))
                .unique()
                .map(|ch| (ch, self.child(self.node, ch)))
                .collect(),
        }
    }

    /// Entries whose search key ends exactly here.
    pub fn entries(&self) -> Vec<&'t Entry> {
        let node = match self.node {
            Node::Internal { children, .. } => match children.get(&SENTINEL) {
                Some(node) => node,
                None => return vec![],
            },
            leaf => leaf,
        };

        match node {
            Node::Leaf { entries, .. } => entries
                .iter()
                .filter(|e| e.key.as_str() == self.prefix.as_str())
                .collect(),
            Node::Internal { .. } => vec![],
        }
    }

    /// The highest-weight entry whose key starts with this prefix, found by
    /// always following the heaviest child.
    pub fn best_entry(&self) -> Option<&'t Entry> {
        let mut node = self.node;

        loop {
            match node {
                Node::Internal {
                    values, children, ..
                } => node = children.get(values.first()?)?,
                Node::Leaf { entries, .. } => {
                    return entries
                        .iter()
                        .find(|e| e.key.starts_with(self.prefix.as_str()))
                }
            }
        }
    }
}
