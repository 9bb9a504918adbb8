/*! Fuzzy correction search for predictive text.

Compiles weighted word lists into a prefix trie indexed by search keys, and
searches it for the words that best match a sequence of ambiguous input
events, tolerating insertions, deletions, substitutions and transpositions.

# Usage examples

```
use predictspell::correction::{suggest_word, SearchConfig};
use predictspell::trie::{build_trie, default_search_key};
use predictspell::wordlist::WordList;

let words: WordList = vec![("cat", 5), ("bat", 3)].into_iter().collect();
let trie = build_trie(&words, default_search_key).unwrap();

let suggestions = suggest_word(&trie, "cot", &SearchConfig::default());
assert_eq!(suggestions[0].value(), "cat");
```

Input events that are not certain are pushed into a
[`SearchSpace`](correction::SearchSpace) as distributions of transforms; see
the [`correction`] module.

Further examples can be found in the [`predictspell-bin`] in the same
repository.

[`predictspell-bin`]: (https://github.com/divvun/divvunspell)

*/

pub mod correction;
pub mod distance;
pub mod trie;
pub mod types;
pub mod wordlist;
