use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use smol_str::SmolStr;

use super::node::{MapKey, SearchNode};
use super::tier::{SearchSpaceTier, TierRank};
use super::SearchConfig;
use crate::distance::{Calculation, ClassicalCalculation};
use crate::trie::Traversal;
use crate::types::{Cost, Distribution, Transform};

/// All search state for one word context.
///
/// Input events arrive through [`SearchSpace::add_input`]; each adds a tier.
/// Matches are pulled lazily with [`SearchSpace::get_best_matches`], which
/// may be called again after more input, or again at the same input to
/// replay what was found before.
#[derive(Debug)]
pub struct SearchSpace<'t, C = ClassicalCalculation<'t>> {
    root: Traversal<'t>,
    tiers: Vec<SearchSpaceTier<'t, C>>,
    selection_queue: BinaryHeap<TierRank>,
    input_sequence: Vec<Distribution<Transform>>,
    processed_edges: HashSet<MapKey>,
    completed_paths: Vec<SearchNode<'t, C>>,
    returned_index: HashMap<SmolStr, usize>,
    returned_values: Vec<SearchNode<'t, C>>,
}

impl<'t> SearchSpace<'t> {
    pub fn new(root: Traversal<'t>) -> SearchSpace<'t> {
        SearchSpace::with_config(root, &SearchConfig::default())
    }

    pub fn with_config(root: Traversal<'t>, config: &SearchConfig) -> SearchSpace<'t> {
        SearchSpace::with_max_distance(root, config.max_edit_distance)
    }
}

impl<'t, C: Calculation<'t>> SearchSpace<'t, C> {
    /// A space whose root calculation admits `max_distance` edits.
    pub fn with_max_distance(root: Traversal<'t>, max_distance: u32) -> SearchSpace<'t, C> {
        let root_node = SearchNode::root(root.clone(), max_distance);

        SearchSpace {
            root,
            tiers: vec![],
            selection_queue: BinaryHeap::new(),
            input_sequence: vec![],
            processed_edges: HashSet::new(),
            completed_paths: vec![root_node],
            returned_index: HashMap::new(),
            returned_values: vec![],
        }
    }

    pub fn tiers(&self) -> &[SearchSpaceTier<'t, C>] {
        &self.tiers
    }

    pub fn input_sequence(&self) -> &[Distribution<Transform>] {
        &self.input_sequence
    }

    /// Pushes a new input event, opening a tier with edges from every path
    /// that reached the end of the previous input.
    pub fn add_input(&mut self, distribution: Distribution<Transform>) {
        let mut edges = vec![];
        for node in &self.completed_paths {
            edges.extend(node.build_deletion_edges(&distribution));
            edges.extend(node.build_substitution_edges(&distribution));
        }

        self.input_sequence.push(distribution);
        self.completed_paths.clear();
        self.returned_index.clear();
        self.returned_values.clear();

        let index = self.tiers.len();
        log::debug!("Opening tier {} with {} edges", index, edges.len());

        let tier = SearchSpaceTier::new(index, edges);
        self.selection_queue.push(TierRank::of(&tier));
        self.tiers.push(tier);
    }

    pub fn increase_max_edit_distance(&mut self) {
        log::debug!("Widening edit distance on {} tiers", self.tiers.len());

        for tier in self.tiers.iter_mut() {
            tier.increase_max_edit_distance();
        }
        self.rebuild_selection_queue();
    }

    fn rebuild_selection_queue(&mut self) {
        self.selection_queue = self.tiers.iter().map(TierRank::of).collect();
    }

    fn has_next_match_entry(&self) -> bool {
        matches!(self.selection_queue.peek(), Some(rank) if rank.cost.is_some())
    }

    /// Runs the search until a node reaches the most recent tier.
    ///
    /// Returns `None` once every tier has run out of edges.
    pub fn find_next_match(&mut self) -> Option<SearchNode<'t, C>> {
        while self.has_next_match_entry() {
            let rank = self.selection_queue.pop()?;
            let index = rank.index;

            let edge = match self.tiers[index].pop() {
                Some(edge) => edge,
                None => {
                    self.selection_queue.push(rank);
                    break;
                }
            };

            // Edges leave the queues in cost order, so the earlier one was
            // no dearer.
            if !self.processed_edges.insert(edge.map_key()) {
                self.selection_queue.push(TierRank::of(&self.tiers[index]));
                continue;
            }

            let node = SearchNode::from_edge(edge, &self.root);
            log::trace!(
                "Tier {}: {:?} at cost {}",
                index,
                node.matched_path(),
                node.current_cost()
            );

            let insertions = node.build_insertion_edges();
            let tier = &mut self.tiers[index];
            tier.enqueue_all(insertions);
            tier.record(node.clone());

            if index == self.tiers.len() - 1 {
                self.completed_paths.push(node.clone());
                self.selection_queue.push(TierRank::of(&self.tiers[index]));
                return Some(node);
            }

            let next = index + 1;
            let edges = {
                let distribution = &self.input_sequence[next];
                let mut edges = node.build_deletion_edges(distribution);
                edges.extend(node.build_substitution_edges(distribution));
                edges
            };
            self.tiers[next].enqueue_all(edges);

            // The next tier's best cost may have dropped.
            self.rebuild_selection_queue();
        }

        None
    }

    fn remember(&mut self, key: SmolStr, node: SearchNode<'t, C>) {
        if !self.returned_index.contains_key(&key) {
            self.returned_index.insert(key, self.returned_values.len());
            self.returned_values.push(node);
        }
    }

    /// Lazily yields batches of matched paths in non-decreasing cost.
    ///
    /// Matches already found at the current input are replayed first, then
    /// the search resumes. Dropping the iterator suspends the search.
    pub fn get_best_matches(&mut self) -> BestMatches<'_, 't, C> {
        let mut cached = self.returned_values.clone();
        cached.sort_by(|a, b| {
            a.current_cost()
                .partial_cmp(&b.current_cost())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        BestMatches {
            space: self,
            stage: Stage::Cached,
            cached: cached.into_iter(),
            current_cost: None,
            entries: vec![],
            returned: HashSet::new(),
        }
    }
}

/// A lexicon path reached by the search.
#[derive(Clone, Debug)]
pub struct MatchedPath<'t> {
    /// the matched search key characters
    pub key: SmolStr,
    pub traversal: Traversal<'t>,
}

/// Matched paths sharing a single cost.
#[derive(Clone, Debug)]
pub struct MatchBatch<'t> {
    pub matches: Vec<MatchedPath<'t>>,
    pub cost: Cost,
}

impl<'t> MatchBatch<'t> {
    pub fn keys(&self) -> Vec<&str> {
        self.matches.iter().map(|path| path.key.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Cached,
    Searching,
    Done,
}

/// Iterator returned by [`SearchSpace::get_best_matches`].
pub struct BestMatches<'s, 't, C: Calculation<'t>> {
    space: &'s mut SearchSpace<'t, C>,
    stage: Stage,
    cached: std::vec::IntoIter<SearchNode<'t, C>>,
    current_cost: Option<Cost>,
    entries: Vec<MatchedPath<'t>>,
    returned: HashSet<SmolStr>,
}

impl<'s, 't, C: Calculation<'t>> BestMatches<'s, 't, C> {
    fn check_and_add(&mut self, node: SearchNode<'t, C>) -> Option<MatchBatch<'t>> {
        let cost = node.current_cost();
        let mut result = None;

        if self.current_cost.map_or(true, |current| cost > current) {
            result = self.try_finalize();
            self.current_cost = Some(cost);
        }

        // The same path may be reached through different input.
        let key = node.matched_path();
        if self.returned.insert(key.clone()) {
            self.entries.push(MatchedPath {
                key: key.clone(),
                traversal: node.current_traversal().clone(),
            });
        }
        self.space.remember(key, node);

        result
    }

    fn try_finalize(&mut self) -> Option<MatchBatch<'t>> {
        if self.entries.is_empty() {
            return None;
        }

        Some(MatchBatch {
            matches: std::mem::take(&mut self.entries),
            cost: self.current_cost.unwrap_or(0.0),
        })
    }
}

impl<'s, 't, C: Calculation<'t>> Iterator for BestMatches<'s, 't, C> {
    type Item = MatchBatch<'t>;

    fn next(&mut self) -> Option<MatchBatch<'t>> {
        loop {
            match self.stage {
                Stage::Cached => match self.cached.next() {
                    Some(node) => {
                        if let Some(batch) = self.check_and_add(node) {
                            return Some(batch);
                        }
                    }
                    None => {
                        self.stage = Stage::Searching;
                        if let Some(batch) = self.try_finalize() {
                            return Some(batch);
                        }
                    }
                },
                Stage::Searching => match self.space.find_next_match() {
                    Some(node) => {
                        if let Some(batch) = self.check_and_add(node) {
                            return Some(batch);
                        }
                    }
                    None => {
                        self.stage = Stage::Done;
                        return self.try_finalize();
                    }
                },
                Stage::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{build_trie, identity_search_key, Trie};
    use crate::types::{certain_insert, ProbabilityMass};
    use crate::wordlist::WordList;

    fn trie(words: &[(&str, u64)]) -> Trie {
        let list: WordList = words.iter().map(|(w, c)| (*w, *c)).collect();
        build_trie(&list, identity_search_key).unwrap()
    }

    fn type_word<'t>(trie: &'t Trie, word: &str) -> SearchSpace<'t> {
        let mut space = SearchSpace::new(trie.traversal());
        for ch in word.chars() {
            space.add_input(certain_insert(ch.to_string()));
        }
        space
    }

    fn batches(space: &mut SearchSpace<'_>) -> Vec<(Vec<String>, Cost)> {
        space
            .get_best_matches()
            .map(|batch| {
                let keys = batch.keys().into_iter().map(str::to_owned).collect();
                (keys, batch.cost)
            })
            .collect()
    }

    fn cost_of(batches: &[(Vec<String>, Cost)], key: &str) -> Option<Cost> {
        batches
            .iter()
            .find(|(keys, _)| keys.iter().any(|k| k == key))
            .map(|(_, cost)| *cost)
    }

    #[test]
    fn exact_match_comes_first() {
        let trie = trie(&[("cat", 5), ("bat", 3)]);
        let mut space = type_word(&trie, "cat");

        let first = space.get_best_matches().next().unwrap();
        assert_eq!(first.keys(), vec!["cat"]);
        assert_eq!(first.cost, 0.0);
    }

    #[test]
    fn single_substitution() {
        let trie = trie(&[("cat", 5), ("bat", 3)]);
        let mut space = type_word(&trie, "cot");
        let found = batches(&mut space);

        assert_eq!(cost_of(&found, "cat"), Some(1.0));
        assert_eq!(cost_of(&found, "bat"), Some(2.0));
        let cat = found.iter().position(|(k, _)| k.iter().any(|k| k == "cat"));
        let bat = found.iter().position(|(k, _)| k.iter().any(|k| k == "bat"));
        assert!(cat < bat);
    }

    #[test]
    fn only_exact_path_costs_nothing() {
        let trie = trie(&[("cat", 10), ("cap", 10)]);
        let mut space = type_word(&trie, "cat");
        let found = batches(&mut space);

        assert_eq!(found[0], (vec!["cat".to_string()], 0.0));
        assert!(cost_of(&found, "cap").unwrap() > 0.0);
    }

    #[test]
    fn ambiguous_input_prefers_likelier_key() {
        let trie = trie(&[("bat", 1), ("pat", 1)]);
        let mut space = SearchSpace::new(trie.traversal());
        space.add_input(vec![
            ProbabilityMass::new(Transform::insert("b"), 0.6),
            ProbabilityMass::new(Transform::insert("p"), 0.4),
        ]);
        space.add_input(certain_insert("a"));
        space.add_input(certain_insert("t"));

        let found = batches(&mut space);
        let bat = cost_of(&found, "bat").unwrap();
        let pat = cost_of(&found, "pat").unwrap();
        assert!((bat - 0.4).abs() < 1e-9);
        assert!((pat - 0.6).abs() < 1e-9);
        assert!(bat < pat);
    }

    #[test]
    fn costs_never_decrease_and_paths_never_repeat() {
        let trie = trie(&[("the", 9), ("then", 4), ("they", 6), ("tea", 2), ("ten", 3)]);
        let mut space = type_word(&trie, "tge");
        let found = batches(&mut space);

        assert!(!found.is_empty());
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));

        let mut seen = HashSet::new();
        for (keys, _) in &found {
            for key in keys {
                assert!(seen.insert(key.clone()), "{} returned twice", key);
            }
        }
    }

    #[test]
    fn path_reached_by_two_inputs_is_returned_once() {
        let trie = trie(&[("at", 1), ("bt", 1)]);
        let mut space = SearchSpace::new(trie.traversal());
        space.add_input(vec![
            ProbabilityMass::new(Transform::insert("a"), 0.7),
            ProbabilityMass::new(Transform::insert("b"), 0.3),
        ]);
        space.add_input(certain_insert("t"));

        let found = batches(&mut space);
        let at = found
            .iter()
            .flat_map(|(keys, _)| keys.iter())
            .filter(|k| *k == "at")
            .count();
        assert_eq!(at, 1);
        assert!((cost_of(&found, "at").unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn searches_are_deterministic() {
        let trie = trie(&[("cat", 5), ("cart", 2), ("bat", 3), ("act", 1)]);

        let first = batches(&mut type_word(&trie, "cta"));
        let second = batches(&mut type_word(&trie, "cta"));
        assert_eq!(first, second);
    }

    #[test]
    fn no_input_yields_nothing() {
        let trie = trie(&[("cat", 5)]);
        let mut space = SearchSpace::new(trie.traversal());

        assert!(space.find_next_match().is_none());
        assert!(space.get_best_matches().next().is_none());
    }

    #[test]
    fn replays_cached_matches() {
        let trie = trie(&[("cat", 5), ("bat", 3)]);
        let mut space = type_word(&trie, "cat");

        let first = batches(&mut space);
        let replay = batches(&mut space);

        assert_eq!(replay[0], first[0]);
        let keys = |found: &[(Vec<String>, Cost)]| {
            let mut keys = found
                .iter()
                .flat_map(|(k, _)| k.iter().cloned())
                .collect::<Vec<_>>();
            keys.sort();
            keys
        };
        assert_eq!(keys(&replay), keys(&first));
    }

    #[test]
    fn later_input_continues_the_search() {
        let trie = trie(&[("cat", 5), ("cart", 2)]);
        let mut space = type_word(&trie, "ca");

        let first = space.get_best_matches().next().unwrap();
        assert_eq!(first.keys(), vec!["ca"]);

        space.add_input(certain_insert("r"));
        let next = space.get_best_matches().next().unwrap();
        assert_eq!(next.keys(), vec!["car"]);
        assert_eq!(next.cost, 0.0);
    }

    #[test]
    fn delete_left_corrects_earlier_input() {
        let trie = trie(&[("cat", 5), ("bat", 3)]);
        let mut space = SearchSpace::new(trie.traversal());
        space.add_input(certain_insert("c"));
        space.add_input(certain_insert("x"));
        space.add_input(vec![ProbabilityMass::new(Transform::new("a", 1), 1.0)]);
        space.add_input(certain_insert("t"));

        let first = space.get_best_matches().next().unwrap();
        assert_eq!(first.keys(), vec!["cat"]);
        assert_eq!(first.cost, 0.0);
    }

    #[test]
    fn astral_input_is_one_character() {
        let trie = trie(&[("a\u{1F600}b", 1), ("ab", 1)]);
        let mut space = SearchSpace::new(trie.traversal());
        space.add_input(certain_insert("a"));
        space.add_input(certain_insert("\u{1F600}"));
        space.add_input(certain_insert("b"));

        let first = space.get_best_matches().next().unwrap();
        assert_eq!(first.keys(), vec!["a\u{1F600}b"]);
        assert_eq!(first.cost, 0.0);
    }

    #[test]
    fn word_costs_match_brute_force_distance() {
        let words = ["cat", "cart", "act", "coat", "at", "cast", "scat", "tact", "cot"];
        let trie = trie(&words.iter().map(|w| (*w, 1u64)).collect::<Vec<_>>());

        for typed in &words {
            let mut space = type_word(&trie, typed);
            let found = batches(&mut space);

            for word in &words {
                let distance = strsim::osa_distance(typed, word);
                if distance > 2 {
                    continue;
                }

                assert_eq!(
                    cost_of(&found, word),
                    Some(distance as Cost),
                    "{:?} typed, {:?} expected",
                    typed,
                    word
                );
            }
        }
    }

    #[test]
    fn widening_reaches_every_tier() {
        let trie = trie(&[("cat", 5), ("bat", 3)]);
        let mut space = type_word(&trie, "cat");
        space.increase_max_edit_distance();

        for tier in space.tiers() {
            assert!(tier
                .queued_edges()
                .all(|edge| edge.calculation().max_distance() == 3));
        }

        let first = space.get_best_matches().next().unwrap();
        assert_eq!(first.keys(), vec!["cat"]);
    }
}
