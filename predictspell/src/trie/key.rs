//! Search keys: the normalized strings a trie is indexed by.
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use unic_char_range::CharRange;
use unicode_normalization::UnicodeNormalization;

/// A string used only as a path through the trie, never shown as a match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchKey(SmolStr);

impl SearchKey {
    pub fn new(key: impl Into<SmolStr>) -> SearchKey {
        SearchKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SearchKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts word-forms (or queries) into search keys.
pub type KeyFunction = dyn Fn(&str) -> String + Send + Sync;

/// A general-purpose key function: lowercases each character on its own
/// (ignoring context-sensitive casing), decomposes to NFKD and drops the
/// combining diacritics block.
///
/// Many orthographies need their own key function; this one only has to be
/// a reasonable start.
pub fn default_search_key(wordform: &str) -> String {
    let diacritics = CharRange::closed('\u{0300}', '\u{036F}');
    let lowered: String = wordform.chars().flat_map(char::to_lowercase).collect();

    lowered.nfkd().filter(|c| !diacritics.contains(*c)).collect()
}

/// A key function that indexes word-forms as they are.
pub fn identity_search_key(wordform: &str) -> String {
    wordform.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_folds_case_and_diacritics() {
        assert_eq!(default_search_key("Café"), "cafe");
        assert_eq!(default_search_key("NAÏVE"), "naive");
        assert_eq!(default_search_key("ｅ"), "e");
    }

    #[test]
    fn default_key_keeps_other_marks() {
        // U+0331 is stripped, U+1AB0 lies outside the block and survives.
        assert_eq!(default_search_key("a\u{0331}"), "a");
        assert_eq!(default_search_key("a\u{1AB0}"), "a\u{1AB0}");
    }
}
