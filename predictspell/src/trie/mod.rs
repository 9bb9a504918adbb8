//! Weighted prefix tries over search keys.
//!
//! Every node records the highest weight found anywhere below it, and every
//! internal node keeps its children ordered by that weight. A traversal can
//! therefore walk towards the most frequent completions greedily, without
//! scanning whole subtrees.
//!
//! The [`Trie`] is the interchange form: it serializes to a JSON document
//! `{"totalWeight": …, "root": …}` with `"type"`-tagged nodes, so a model can
//! be built once by [`TrieBuilder`] and loaded by a separate process.
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::Weight;

mod builder;
pub mod error;
mod key;
mod traversal;

pub use self::builder::{build_trie, TrieBuilder};
pub use self::error::TrieError;
pub use self::key::{default_search_key, identity_search_key, KeyFunction, SearchKey};
pub use self::traversal::Traversal;

/// Child key for entries whose search key ends at an internal node.
///
/// U+FDD0 is a Unicode noncharacter, so it can never collide with a real
/// character of a search key.
pub const SENTINEL: char = '\u{FDD0}';

/// A word-form stored in the trie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// the word-form itself
    pub content: SmolStr,
    /// the search key it is indexed under
    pub key: SearchKey,
    pub weight: Weight,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Leaf {
        weight: Weight,
        /// sorted by descending weight
        entries: Vec<Entry>,
    },
    Internal {
        weight: Weight,
        /// child keys, sorted by descending child weight
        values: Vec<char>,
        children: BTreeMap<char, Node>,
    },
}

impl Node {
    /// Highest entry weight in this subtree.
    pub fn weight(&self) -> Weight {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    fn sum_weights(&self) -> Weight {
        match self {
            Node::Leaf { entries, .. } => entries.iter().map(|e| e.weight).sum(),
            Node::Internal { children, .. } => children.values().map(Node::sum_weights).sum(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trie {
    pub total_weight: Weight,
    pub root: Node,
}

/// Shape summary of a trie.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrieStats {
    pub internal_nodes: usize,
    pub leaves: usize,
    pub entries: usize,
    pub max_depth: usize,
}

/// Every trie level nests two JSON objects, so long shared prefixes run past
/// serde_json's default depth limit. Grow the stack instead.
fn read_trie<'de, R: serde_json::de::Read<'de>>(
    mut de: serde_json::Deserializer<R>,
) -> Result<Trie, serde_json::Error> {
    de.disable_recursion_limit();
    let trie = Trie::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(trie)
}

impl Trie {
    pub(crate) fn from_root(root: Node) -> Trie {
        Trie {
            total_weight: root.sum_weights(),
            root,
        }
    }

    /// Starting point for searches over this trie.
    pub fn traversal(&self) -> Traversal<'_> {
        Traversal::new(&self.root)
    }

    pub fn from_json(json: &str) -> Result<Trie, TrieError> {
        Ok(read_trie(serde_json::Deserializer::from_str(json))?)
    }

    pub fn to_json(&self) -> Result<String, TrieError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Trie, TrieError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| TrieError::Io(path.to_path_buf(), e))?;
        let reader = std::io::BufReader::new(file);
        Ok(read_trie(serde_json::Deserializer::from_reader(reader))?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TrieError> {
        let path = path.as_ref();
        let file =
            std::fs::File::create(path).map_err(|e| TrieError::Io(path.to_path_buf(), e))?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn stats(&self) -> TrieStats {
        fn walk(node: &Node, depth: usize, stats: &mut TrieStats) {
            stats.max_depth = stats.max_depth.max(depth);
            match node {
                Node::Leaf { entries, .. } => {
                    stats.leaves += 1;
                    stats.entries += entries.len();
                }
                Node::Internal { children, .. } => {
                    stats.internal_nodes += 1;
                    for child in children.values() {
                        walk(child, depth + 1, stats);
                    }
                }
            }
        }

        let mut stats = TrieStats::default();
        walk(&self.root, 0, &mut stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::WordList;

    fn trie() -> Trie {
        let words: WordList = vec![("cat", 5), ("cats", 2), ("bat", 3), ("ca", 1)]
            .into_iter()
            .collect();
        build_trie(&words, identity_search_key).unwrap()
    }

    #[test]
    fn json_round_trip() {
        let trie = trie();
        let json = trie.to_json().unwrap();
        let loaded = Trie::from_json(&json).unwrap();
        assert_eq!(trie, loaded);
    }

    #[test]
    fn interchange_document_shape() {
        let value: serde_json::Value = serde_json::from_str(&trie().to_json().unwrap()).unwrap();

        assert_eq!(value["totalWeight"], 11);
        assert_eq!(value["root"]["type"], "internal");
        assert_eq!(value["root"]["weight"], 5);
        assert_eq!(value["root"]["values"], serde_json::json!(["c", "b"]));
        assert_eq!(value["root"]["children"]["b"]["type"], "leaf");
        assert_eq!(
            value["root"]["children"]["b"]["entries"][0]["content"],
            "bat"
        );
    }

    #[test]
    fn loads_hand_written_document() {
        let json = r#"{
            "totalWeight": 4,
            "root": {
                "type": "internal",
                "weight": 3,
                "values": ["a"],
                "children": {
                    "a": {
                        "type": "leaf",
                        "weight": 3,
                        "entries": [
                            {"content": "An", "key": "an", "weight": 3},
                            {"content": "at", "key": "at", "weight": 1}
                        ]
                    }
                }
            }
        }"#;

        let trie = Trie::from_json(json).unwrap();
        assert_eq!(trie.total_weight, 4);
        assert_eq!(trie.root.weight(), 3);
    }

    #[test]
    fn long_shared_prefixes_load_back() {
        let long = "a".repeat(100);
        let words: WordList = vec![(long.clone(), 2), (format!("{}b", long), 1)]
            .into_iter()
            .collect();
        let trie = build_trie(&words, identity_search_key).unwrap();
        assert!(trie.stats().max_depth > 64);

        let loaded = Trie::from_json(&trie.to_json().unwrap()).unwrap();
        assert_eq!(loaded, trie);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.json");
        trie.save(&path).unwrap();
        assert_eq!(Trie::from_path(&path).unwrap(), trie);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let json = format!("{} x", trie().to_json().unwrap());
        assert!(matches!(Trie::from_json(&json), Err(TrieError::Json(..))));
    }

    #[test]
    fn save_and_load_file() {
        let trie = trie();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        trie.save(&path).unwrap();
        assert_eq!(Trie::from_path(&path).unwrap(), trie);
        assert!(matches!(
            Trie::from_path(dir.path().join("missing.json")),
            Err(TrieError::Io(..))
        ));
    }

    #[test]
    fn stats_count_every_entry() {
        let stats = trie().stats();
        assert_eq!(stats.entries, 4);
        assert!(stats.internal_nodes >= 3);
    }
}
