use std::cmp::Ordering;
use std::cmp::Ordering::Equal;
use std::collections::BinaryHeap;

use super::node::{SearchEdge, SearchNode};
use crate::distance::{Calculation, ClassicalCalculation};
use crate::types::Cost;

/// Heap entry ordering edges by ascending cost, then by arrival.
#[derive(Debug)]
pub(crate) struct QueuedEdge<C> {
    cost: Cost,
    seq: u64,
    pub(crate) edge: SearchEdge<C>,
}

impl<C> PartialEq for QueuedEdge<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Equal
    }
}

impl<C> Eq for QueuedEdge<C> {}

impl<C> PartialOrd for QueuedEdge<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for QueuedEdge<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest entry; the cheapest, oldest edge must
        // compare greatest.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The edges and nodes of the search that have consumed exactly `index + 1`
/// input events.
#[derive(Debug)]
pub struct SearchSpaceTier<'t, C = ClassicalCalculation<'t>> {
    index: usize,
    correction_queue: BinaryHeap<QueuedEdge<C>>,
    processed: Vec<SearchNode<'t, C>>,
    next_seq: u64,
}

impl<'t, C: Calculation<'t>> SearchSpaceTier<'t, C> {
    pub(crate) fn new(index: usize, edges: Vec<SearchEdge<C>>) -> SearchSpaceTier<'t, C> {
        let mut tier = SearchSpaceTier {
            index,
            correction_queue: BinaryHeap::with_capacity(edges.len()),
            processed: vec![],
            next_seq: 0,
        };
        tier.enqueue_all(edges);
        tier
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.correction_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correction_queue.is_empty()
    }

    /// Cost of the cheapest pending edge.
    pub fn best_cost(&self) -> Option<Cost> {
        self.correction_queue.peek().map(|queued| queued.cost)
    }

    /// Nodes confirmed in this tier so far.
    pub fn processed(&self) -> &[SearchNode<'t, C>] {
        &self.processed
    }

    pub(crate) fn enqueue_all(&mut self, edges: Vec<SearchEdge<C>>) {
        for edge in edges {
            let cost = edge.current_cost();
            self.correction_queue.push(QueuedEdge {
                cost,
                seq: self.next_seq,
                edge,
            });
            self.next_seq += 1;
        }
    }

    pub(crate) fn pop(&mut self) -> Option<SearchEdge<C>> {
        self.correction_queue.pop().map(|queued| queued.edge)
    }

    pub(crate) fn record(&mut self, node: SearchNode<'t, C>) {
        self.processed.push(node);
    }

    /// Widens every queued edge's calculation by one edit and re-heapifies.
    pub fn increase_max_edit_distance(&mut self) {
        let mut entries = std::mem::take(&mut self.correction_queue).into_vec();

        for queued in entries.iter_mut() {
            queued.edge.calculation = queued.edge.calculation.increase_max_distance();
            queued.cost = queued.edge.current_cost();
        }

        self.correction_queue = BinaryHeap::from(entries);
    }

    #[cfg(test)]
    pub(crate) fn queued_edges(&self) -> impl Iterator<Item = &SearchEdge<C>> {
        self.correction_queue.iter().map(|queued| &queued.edge)
    }
}

/// Selection queue entry for a tier, ranked by its cheapest pending edge.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TierRank {
    pub(crate) cost: Option<Cost>,
    pub(crate) index: usize,
}

impl TierRank {
    pub(crate) fn of<'t, C: Calculation<'t>>(tier: &SearchSpaceTier<'t, C>) -> TierRank {
        TierRank {
            cost: tier.best_cost(),
            index: tier.index,
        }
    }
}

impl PartialEq for TierRank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Equal
    }
}

impl Eq for TierRank {}

impl PartialOrd for TierRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TierRank {
    /// Tiers with pending edges outrank empty ones; cheaper outranks dearer;
    /// on equal cost the later tier wins, as it is closer to a result.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.cost, other.cost) {
            (Some(a), Some(b)) => b
                .partial_cmp(&a)
                .unwrap_or(Equal)
                .then_with(|| self.index.cmp(&other.index)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.index.cmp(&other.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{build_trie, identity_search_key};
    use crate::types::certain_insert;
    use crate::wordlist::WordList;

    #[test]
    fn pops_cheapest_first_then_oldest() {
        let words: WordList = vec![("ab", 2), ("b", 1)].into_iter().collect();
        let trie = build_trie(&words, identity_search_key).unwrap();
        let root: SearchNode<'_> = SearchNode::root(trie.traversal(), 2);

        let mut tier = SearchSpaceTier::new(0, root.build_substitution_edges(&certain_insert("b")));
        assert_eq!(tier.len(), 2);
        assert_eq!(tier.best_cost(), Some(0.0));

        let first = tier.pop().unwrap();
        assert_eq!(first.current_cost(), 0.0);
        let second = tier.pop().unwrap();
        assert_eq!(second.current_cost(), 1.0);
        assert!(tier.pop().is_none());
        assert_eq!(tier.best_cost(), None);
    }

    #[test]
    fn equal_costs_keep_arrival_order() {
        let words: WordList = vec![("x", 3), ("y", 2), ("z", 1)].into_iter().collect();
        let trie = build_trie(&words, identity_search_key).unwrap();
        let root: SearchNode<'_> = SearchNode::root(trie.traversal(), 2);

        let mut tier = SearchSpaceTier::new(0, root.build_insertion_edges());
        let order = std::iter::from_fn(|| tier.pop())
            .map(|edge| edge.map_key())
            .collect::<Vec<_>>();
        let expected = root
            .build_insertion_edges()
            .iter()
            .map(|edge| edge.map_key())
            .collect::<Vec<_>>();
        assert_eq!(order, expected);
    }

    #[test]
    fn widening_updates_every_edge() {
        let words: WordList = vec![("abc", 1)].into_iter().collect();
        let trie = build_trie(&words, identity_search_key).unwrap();
        let root: SearchNode<'_> = SearchNode::root(trie.traversal(), 1);

        let mut tier = SearchSpaceTier::new(0, root.build_deletion_edges(&certain_insert("abcd")));
        tier.increase_max_edit_distance();

        assert_eq!(tier.len(), 1);
        assert!(tier.queued_edges().all(|e| e.calculation().max_distance() == 2));
        assert_eq!(tier.best_cost(), Some(4.0));
    }

    #[test]
    fn tier_rank_ordering() {
        let mut heap = BinaryHeap::new();
        heap.push(TierRank { cost: None, index: 3 });
        heap.push(TierRank { cost: Some(1.0), index: 0 });
        heap.push(TierRank { cost: Some(1.0), index: 2 });
        heap.push(TierRank { cost: Some(0.5), index: 1 });

        let order = std::iter::from_fn(|| heap.pop())
            .map(|rank| rank.index)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }
}
