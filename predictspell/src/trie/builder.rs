//! Building weighted tries from word lists.
//!
//! Nodes live in an arena while the trie is under construction. A node starts
//! as a leaf holding entries and is replaced by an internal node the first
//! time an entry has to be pushed further down than an existing one; the
//! leaf's entries are redistributed one level deeper at that point.
use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::{Entry, KeyFunction, Node, SearchKey, Trie, TrieError, SENTINEL};
use crate::types::Weight;
use crate::wordlist::WordList;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
enum BuildNode {
    Leaf {
        weight: Weight,
        entries: Vec<Entry>,
        unsorted: bool,
    },
    Internal {
        weight: Weight,
        values: Vec<char>,
        children: HashMap<char, NodeId>,
        unsorted: bool,
    },
}

impl BuildNode {
    fn leaf() -> BuildNode {
        BuildNode::Leaf {
            weight: 0,
            entries: vec![],
            unsorted: false,
        }
    }

    fn weight(&self) -> Weight {
        match self {
            BuildNode::Leaf { weight, .. } | BuildNode::Internal { weight, .. } => *weight,
        }
    }

    fn mark_unsorted(&mut self) {
        match self {
            BuildNode::Leaf { unsorted, .. } | BuildNode::Internal { unsorted, .. } => {
                *unsorted = true
            }
        }
    }
}

/// Incrementally builds a [`Trie`].
///
/// ```
/// use predictspell::trie::{default_search_key, TrieBuilder};
/// use predictspell::wordlist::WordList;
///
/// let words: WordList = vec![("Cat", 5), ("bat", 3)].into_iter().collect();
/// let trie = TrieBuilder::new()
///     .key_function(default_search_key)
///     .build(&words)
///     .unwrap();
/// assert_eq!(trie.total_weight, 8);
/// ```
pub struct TrieBuilder {
    key_function: Option<Box<KeyFunction>>,
    nodes: Vec<BuildNode>,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        TrieBuilder::new()
    }
}

impl TrieBuilder {
    pub fn new() -> TrieBuilder {
        TrieBuilder {
            key_function: None,
            nodes: vec![BuildNode::leaf()],
        }
    }

    pub fn key_function<F>(mut self, f: F) -> TrieBuilder
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.key_function = Some(Box::new(f));
        self
    }

    /// Adds a single word-form. Leaves the trie unsorted.
    pub fn add(&mut self, wordform: &str, weight: Weight) -> Result<(), TrieError> {
        let key = match &self.key_function {
            Some(f) => SearchKey::new(f(wordform)),
            None => return Err(TrieError::MissingKeyFunction),
        };

        let chars = key.chars().collect::<Vec<_>>();
        let entry = Entry {
            content: wordform.into(),
            key,
            weight,
        };

        self.add_unsorted(ROOT, entry, &chars, 0);
        Ok(())
    }

    pub fn add_wordlist(&mut self, wordlist: &WordList) -> Result<(), TrieError> {
        if self.key_function.is_none() {
            return Err(TrieError::MissingKeyFunction);
        }

        for (wordform, weight) in wordlist.iter() {
            self.add(wordform, weight)?;
        }

        Ok(())
    }

    /// Adds `wordlist` and exports the sorted trie.
    pub fn build(mut self, wordlist: &WordList) -> Result<Trie, TrieError> {
        self.add_wordlist(wordlist)?;
        Ok(self.to_trie())
    }

    /// Sorts the trie and exports it. More words may be added afterwards;
    /// the next export only re-sorts the subtrees they touched.
    pub fn to_trie(&mut self) -> Trie {
        self.sort();
        Trie::from_root(self.export(ROOT))
    }

    /// Orders every internal node's children and every leaf's entries by
    /// descending weight.
    pub fn sort(&mut self) {
        self.sort_node(ROOT);
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(BuildNode::leaf());
        self.nodes.len() - 1
    }

    fn child_for(&mut self, id: NodeId, ch: char) -> NodeId {
        if let BuildNode::Internal { children, .. } = &self.nodes[id] {
            if let Some(&child) = children.get(&ch) {
                return child;
            }
        }

        let child = self.push_node();
        if let BuildNode::Internal {
            values, children, ..
        } = &mut self.nodes[id]
        {
            values.push(ch);
            children.insert(ch, child);
        }
        child
    }

    fn add_unsorted(&mut self, id: NodeId, entry: Entry, key: &[char], index: usize) {
        let needs_conversion = match &mut self.nodes[id] {
            BuildNode::Leaf {
                weight, entries, ..
            } => {
                *weight = (*weight).max(entry.weight);
                index < key.len() && !entries.is_empty()
            }
            BuildNode::Internal { weight, .. } => {
                *weight = (*weight).max(entry.weight);
                false
            }
        };

        if needs_conversion {
            self.convert_leaf_to_internal(id, index);
        }

        let is_leaf = matches!(self.nodes[id], BuildNode::Leaf { .. });
        if is_leaf {
            if let BuildNode::Leaf { entries, .. } = &mut self.nodes[id] {
                entries.push(entry);
            }
        } else {
            let ch = key.get(index).copied().unwrap_or(SENTINEL);
            let child = self.child_for(id, ch);
            self.add_unsorted(child, entry, key, index + 1);
        }

        self.nodes[id].mark_unsorted();
    }

    /// Replaces the leaf at `id` with an internal node and pushes its entries
    /// one level down. Entries whose key ends at `depth` go under
    /// [`SENTINEL`].
    fn convert_leaf_to_internal(&mut self, id: NodeId, depth: usize) {
        let internal = BuildNode::Internal {
            weight: self.nodes[id].weight(),
            values: vec![],
            children: HashMap::new(),
            unsorted: true,
        };

        let entries = match std::mem::replace(&mut self.nodes[id], internal) {
            BuildNode::Leaf { entries, .. } => entries,
            internal => {
                self.nodes[id] = internal;
                return;
            }
        };

        for entry in entries {
            let key = entry.key.chars().collect::<Vec<_>>();
            let ch = key.get(depth).copied().unwrap_or(SENTINEL);
            let child = self.child_for(id, ch);
            self.add_unsorted(child, entry, &key, depth + 1);
        }
    }

    fn sort_node(&mut self, id: NodeId) {
        let child_ids = match &self.nodes[id] {
            BuildNode::Leaf { unsorted: false, .. } => return,
            BuildNode::Leaf { .. } => vec![],
            BuildNode::Internal {
                values, children, ..
            } => values.iter().map(|ch| children[ch]).collect::<Vec<_>>(),
        };

        // Children must be sorted whether or not this node was touched.
        for &child in &child_ids {
            self.sort_node(child);
        }

        let child_weights = child_ids
            .iter()
            .map(|&child| self.nodes[child].weight())
            .collect::<Vec<_>>();

        match &mut self.nodes[id] {
            BuildNode::Leaf {
                entries, unsorted, ..
            } => {
                entries.sort_by(|a, b| b.weight.cmp(&a.weight));
                *unsorted = false;
            }
            BuildNode::Internal {
                values, unsorted, ..
            } => {
                if !*unsorted {
                    return;
                }

                let mut ordered = values
                    .iter()
                    .copied()
                    .zip(child_weights)
                    .collect::<Vec<_>>();
                ordered.sort_by(|a, b| b.1.cmp(&a.1));
                *values = ordered.into_iter().map(|(ch, _)| ch).collect();
                *unsorted = false;
            }
        }
    }

    fn export(&self, id: NodeId) -> Node {
        match &self.nodes[id] {
            BuildNode::Leaf {
                weight, entries, ..
            } => Node::Leaf {
                weight: *weight,
                entries: entries.clone(),
            },
            BuildNode::Internal {
                weight,
                values,
                children,
                ..
            } => Node::Internal {
                weight: *weight,
                values: values.clone(),
                children: values
                    .iter()
                    .map(|ch| (*ch, self.export(children[ch])))
                    .collect::<BTreeMap<_, _>>(),
            },
        }
    }
}

/// Builds a sorted trie from `wordlist`, indexing each word-form under
/// `key_function(wordform)`.
pub fn build_trie<F>(wordlist: &WordList, key_function: F) -> Result<Trie, TrieError>
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    TrieBuilder::new().key_function(key_function).build(wordlist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{default_search_key, identity_search_key};

    fn check_invariants(node: &Node) -> Weight {
        match node {
            Node::Leaf { weight, entries } => {
                let max = entries.iter().map(|e| e.weight).max().unwrap_or(0);
                assert_eq!(*weight, max, "leaf weight must be its max entry");
                assert!(entries.windows(2).all(|w| w[0].weight >= w[1].weight));
                max
            }
            Node::Internal {
                weight,
                values,
                children,
            } => {
                assert_eq!(values.len(), children.len());
                let weights = values
                    .iter()
                    .map(|ch| check_invariants(&children[ch]))
                    .collect::<Vec<_>>();
                assert!(weights.windows(2).all(|w| w[0] >= w[1]));
                let max = weights.iter().copied().max().unwrap_or(0);
                assert_eq!(*weight, max, "internal weight must be its max descendant");
                max
            }
        }
    }

    fn all_entries(node: &Node, out: &mut Vec<Entry>) {
        match node {
            Node::Leaf { entries, .. } => out.extend(entries.iter().cloned()),
            Node::Internal { children, .. } => {
                children.values().for_each(|child| all_entries(child, out))
            }
        }
    }

    #[test]
    fn missing_key_function_fails_fast() {
        let words: WordList = vec![("cat", 1)].into_iter().collect();
        assert!(matches!(
            TrieBuilder::new().build(&words),
            Err(TrieError::MissingKeyFunction)
        ));
        assert!(matches!(
            TrieBuilder::new().add("cat", 1),
            Err(TrieError::MissingKeyFunction)
        ));
    }

    #[test]
    fn weights_and_ordering_hold() {
        let words: WordList = vec![
            ("the", 900),
            ("then", 120),
            ("there", 300),
            ("these", 80),
            ("they", 700),
            ("to", 800),
            ("a", 1000),
            ("an", 400),
            ("ant", 2),
            ("t", 1),
        ]
        .into_iter()
        .collect();

        let trie = build_trie(&words, identity_search_key).unwrap();
        assert_eq!(check_invariants(&trie.root), 1000);
    }

    #[test]
    fn total_weight_matches_entries_and_wordlist() {
        let words: WordList = vec![("Cat", 5), ("cat", 4), ("cot", 1), ("Cat", 2), ("c", 9)]
            .into_iter()
            .collect();
        let trie = build_trie(&words, default_search_key).unwrap();

        let mut entries = vec![];
        all_entries(&trie.root, &mut entries);

        assert_eq!(entries.len(), 4);
        assert_eq!(trie.total_weight, 21);
        assert_eq!(trie.total_weight, words.total_weight());
        assert_eq!(
            entries.iter().map(|e| e.weight).sum::<Weight>(),
            trie.total_weight
        );
    }

    #[test]
    fn exhausted_keys_sit_under_sentinel() {
        let words: WordList = vec![("ca", 1), ("cat", 5)].into_iter().collect();
        let trie = build_trie(&words, identity_search_key).unwrap();

        let ca = match &trie.root {
            Node::Internal { children, .. } => match &children[&'c'] {
                Node::Internal { children, .. } => children[&'a'].clone(),
                other => panic!("expected internal node, got {:?}", other),
            },
            other => panic!("expected internal node, got {:?}", other),
        };

        match ca {
            Node::Internal { values, children, .. } => {
                assert_eq!(values, vec!['t', SENTINEL]);
                assert!(matches!(&children[&SENTINEL], Node::Leaf { entries, .. } if entries[0].content == "ca"));
            }
            other => panic!("expected internal node, got {:?}", other),
        }
    }

    #[test]
    fn later_insertions_resort_touched_subtrees() {
        let mut builder = TrieBuilder::new().key_function(identity_search_key);
        builder.add("ab", 5).unwrap();
        builder.add("ac", 3).unwrap();
        builder.add("b", 4).unwrap();

        let first = builder.to_trie();
        check_invariants(&first.root);

        builder.add("ac", 10).unwrap();
        builder.add("c", 1).unwrap();
        let second = builder.to_trie();
        assert_eq!(check_invariants(&second.root), 10);

        match &second.root {
            Node::Internal { values, .. } => assert_eq!(values, &vec!['a', 'b', 'c']),
            other => panic!("expected internal node, got {:?}", other),
        }
        assert_eq!(second.total_weight, 23);
    }

    #[test]
    fn building_is_deterministic() {
        let words: WordList = vec![("aa", 1), ("ab", 1), ("ac", 1), ("b", 1), ("ba", 1)]
            .into_iter()
            .collect();
        let one = build_trie(&words, identity_search_key).unwrap();
        let two = build_trie(&words, identity_search_key).unwrap();
        assert_eq!(one.to_json().unwrap(), two.to_json().unwrap());
    }
}
