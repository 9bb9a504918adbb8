//! Word lists: word-forms paired with non-negative corpus counts.
//!
//! A [`WordList`] is the input of the trie builder. It keeps first-insertion
//! order so that building the same sources always yields the same trie.
use hashbrown::HashMap;
use smol_str::SmolStr;

use crate::types::Weight;

pub mod error;
mod parse;

pub use self::error::WordListError;
pub use self::parse::{
    decode, detect_encoding, parse_wordlist_bytes, parse_wordlist_file, parse_wordlist_str,
    Encoding,
};

#[derive(Debug, Clone, Default)]
pub struct WordList {
    entries: Vec<(SmolStr, Weight)>,
    index: HashMap<SmolStr, usize>,
}

impl WordList {
    pub fn new() -> WordList {
        WordList::default()
    }

    /// Adds `count` to the weight of `wordform`, creating it if needed.
    pub fn insert(&mut self, wordform: impl Into<SmolStr>, count: Weight) {
        let wordform = wordform.into();

        match self.index.get(&wordform) {
            Some(&i) => self.entries[i].1 += count,
            None => {
                self.index.insert(wordform.clone(), self.entries.len());
                self.entries.push((wordform, count));
            }
        }
    }

    pub fn get(&self, wordform: &str) -> Option<Weight> {
        self.index.get(wordform).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, wordform: &str) -> bool {
        self.index.contains_key(wordform)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Weight)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    pub fn total_weight(&self) -> Weight {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

impl<S: Into<SmolStr>> FromIterator<(S, Weight)> for WordList {
    fn from_iter<I: IntoIterator<Item = (S, Weight)>>(iter: I) -> Self {
        let mut list = WordList::new();
        for (wordform, count) in iter {
            list.insert(wordform, count);
        }
        list
    }
}
