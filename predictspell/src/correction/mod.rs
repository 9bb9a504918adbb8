//! Tiered best-first correction search.
//!
//! A [`SearchSpace`] keeps one tier per input event. Each tier queues edges
//! (candidate alignments of the input so far against lexicon paths) by cost,
//! where cost is the edit distance estimate plus a penalty of `1 - p` for
//! every input alternative taken. The space always expands the cheapest
//! edge of any tier; an edge confirmed in the most recent tier is a match.
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::distance::{Calculation, DEFAULT_MAX_DISTANCE};
use crate::trie::Trie;
use crate::types::{certain_insert, Cost};

mod node;
mod space;
pub mod suggestion;
mod tier;

pub use self::node::{MapKey, SearchEdge, SearchNode};
pub use self::space::{BestMatches, MatchBatch, MatchedPath, SearchSpace};
pub use self::suggestion::Suggestion;
pub use self::tier::SearchSpaceTier;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    pub n_best: Option<usize>,
    pub max_cost: Option<Cost>,
    pub max_edit_distance: u32,
    pub predict_completions: bool,
}

impl SearchConfig {
    pub const fn default() -> SearchConfig {
        SearchConfig {
            n_best: Some(10),
            max_cost: None,
            max_edit_distance: DEFAULT_MAX_DISTANCE,
            predict_completions: true,
        }
    }
}

fn keep_cheapest(best: &mut HashMap<SmolStr, Suggestion>, suggestion: Suggestion) {
    match best.get(&suggestion.value) {
        Some(existing) if existing.cost <= suggestion.cost => {}
        _ => {
            best.insert(suggestion.value.clone(), suggestion);
        }
    }
}

/// Pulls match batches from `space` and resolves them to word-forms.
///
/// A matched path yields the entries whose key it spells in full and, with
/// `predict_completions`, the most frequent entry it is a prefix of. Each
/// word-form is kept at the lowest cost it was reached at.
pub fn collect_suggestions<'t, C: Calculation<'t>>(
    space: &mut SearchSpace<'t, C>,
    config: &SearchConfig,
) -> Vec<Suggestion> {
    let n_best = config.n_best.unwrap_or(usize::MAX);
    let mut best: HashMap<SmolStr, Suggestion> = HashMap::new();

    for batch in space.get_best_matches() {
        if let Some(max_cost) = config.max_cost {
            if batch.cost > max_cost {
                break;
            }
        }

        for path in &batch.matches {
            for entry in path.traversal.entries() {
                let suggestion =
                    Suggestion::new(entry.content.clone(), batch.cost, entry.weight, Some(true));
                keep_cheapest(&mut best, suggestion);
            }

            if config.predict_completions {
                if let Some(entry) = path.traversal.best_entry() {
                    let completed = entry.key.as_str() == path.key.as_str();
                    let suggestion = Suggestion::new(
                        entry.content.clone(),
                        batch.cost,
                        entry.weight,
                        Some(completed),
                    );
                    keep_cheapest(&mut best, suggestion);
                }
            }
        }

        if best.len() >= n_best {
            break;
        }
    }

    let mut suggestions = best.into_iter().map(|(_, s)| s).collect::<Vec<_>>();
    suggestions.sort();
    suggestions.truncate(n_best);
    suggestions
}

/// Suggestions for `word` typed with certainty, one input event per
/// character. `word` must already be in the trie's search key form.
pub fn suggest_word(trie: &Trie, word: &str, config: &SearchConfig) -> Vec<Suggestion> {
    log::trace!("Beginning suggest for {:?}", word);

    let mut space = SearchSpace::with_config(trie.traversal(), config);
    for ch in word.chars() {
        space.add_input(certain_insert(ch.to_string()));
    }

    collect_suggestions(&mut space, config)
}
