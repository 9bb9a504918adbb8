use smol_str::SmolStr;

use crate::distance::{Calculation, ClassicalCalculation, MatchToken};
use crate::trie::Traversal;
use crate::types::{Cost, Distribution, RealizedInput, Transform};

fn input_sampling_cost(input: &RealizedInput) -> Cost {
    input.iter().map(|mass| 1.0 - mass.p).sum()
}

fn matched_path<'t, C: Calculation<'t>>(calculation: &C) -> SmolStr {
    calculation
        .match_sequence()
        .iter()
        .map(|token| token.key)
        .collect::<String>()
        .into()
}

/// Identity of an edge for deduplication: the input realizations taken and
/// the lexicon characters matched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapKey {
    input: Vec<(SmolStr, u32)>,
    matched: SmolStr,
}

/// A transition to a node not yet confirmed by the search.
#[derive(Clone, Debug)]
pub struct SearchEdge<C> {
    pub(crate) calculation: C,
    pub(crate) optimal_input: RealizedInput,
}

impl<'t, C: Calculation<'t>> SearchEdge<C> {
    pub fn known_cost(&self) -> Cost {
        self.calculation.heuristic_final_cost() as Cost
    }

    pub fn input_sampling_cost(&self) -> Cost {
        input_sampling_cost(&self.optimal_input)
    }

    pub fn current_cost(&self) -> Cost {
        self.known_cost() + self.input_sampling_cost()
    }

    pub fn map_key(&self) -> MapKey {
        MapKey {
            input: self
                .optimal_input
                .iter()
                .map(|mass| (mass.sample.insert.clone(), mass.sample.delete_left))
                .collect(),
            matched: matched_path(&self.calculation),
        }
    }

    pub fn calculation(&self) -> &C {
        &self.calculation
    }

    pub fn optimal_input(&self) -> &RealizedInput {
        &self.optimal_input
    }
}

/// A confirmed vertex of the correction search graph.
#[derive(Clone, Debug)]
pub struct SearchNode<'t, C = ClassicalCalculation<'t>> {
    calculation: C,
    current_traversal: Traversal<'t>,
    prior_input: RealizedInput,
}

impl<'t, C: Calculation<'t>> SearchNode<'t, C> {
    pub fn root(root: Traversal<'t>, max_distance: u32) -> SearchNode<'t, C> {
        SearchNode {
            calculation: C::with_max_distance(max_distance),
            current_traversal: root,
            prior_input: vec![],
        }
    }

    pub(crate) fn from_edge(edge: SearchEdge<C>, root: &Traversal<'t>) -> SearchNode<'t, C> {
        let current_traversal = match edge.calculation.last_match_entry() {
            Some(token) => token.traversal.clone(),
            None => root.clone(),
        };

        SearchNode {
            calculation: edge.calculation,
            current_traversal,
            prior_input: edge.optimal_input,
        }
    }

    pub fn known_cost(&self) -> Cost {
        self.calculation.heuristic_final_cost() as Cost
    }

    pub fn input_sampling_cost(&self) -> Cost {
        input_sampling_cost(&self.prior_input)
    }

    pub fn current_cost(&self) -> Cost {
        self.known_cost() + self.input_sampling_cost()
    }

    /// The lexicon characters matched along this path.
    pub fn matched_path(&self) -> SmolStr {
        matched_path(&self.calculation)
    }

    pub fn calculation(&self) -> &C {
        &self.calculation
    }

    pub fn current_traversal(&self) -> &Traversal<'t> {
        &self.current_traversal
    }

    pub fn prior_input(&self) -> &RealizedInput {
        &self.prior_input
    }

    /// Edges that match one more lexicon character without consuming input.
    pub fn build_insertion_edges(&self) -> Vec<SearchEdge<C>> {
        self.current_traversal
            .children()
            .into_iter()
            .map(|(key, traversal)| SearchEdge {
                calculation: self
                    .calculation
                    .add_match_char(MatchToken::new(key, traversal)),
                optimal_input: self.prior_input.clone(),
            })
            .collect()
    }

    /// Edges that consume one input event without matching a character, one
    /// per alternative of `distribution`.
    pub fn build_deletion_edges(&self, distribution: &Distribution<Transform>) -> Vec<SearchEdge<C>> {
        distribution
            .iter()
            .map(|mass| {
                let transform = &mass.sample;
                let mut calculation = self.calculation.clone();

                if transform.delete_left > 0 {
                    let input_len = calculation
                        .input_sequence()
                        .len()
                        .saturating_sub(transform.delete_left as usize);
                    let match_len = calculation.match_sequence().len();
                    calculation = calculation.subset(input_len, match_len);
                }

                // Whole scalar values; astral characters are never split.
                for ch in transform.insert.chars() {
                    calculation = calculation.add_input_char(ch);
                }

                let mut optimal_input = self.prior_input.clone();
                optimal_input.push(mass.clone());

                SearchEdge {
                    calculation,
                    optimal_input,
                }
            })
            .collect()
    }

    /// Deletion edges further extended by every lexicon child. An input and a
    /// match taken together may align more cheaply than either alone.
    pub fn build_substitution_edges(
        &self,
        distribution: &Distribution<Transform>,
    ) -> Vec<SearchEdge<C>> {
        let intermediate = self.build_deletion_edges(distribution);
        let mut edges = vec![];

        for (key, traversal) in self.current_traversal.children() {
            for edge in &intermediate {
                edges.push(SearchEdge {
                    calculation: edge
                        .calculation
                        .add_match_char(MatchToken::new(key, traversal.clone())),
                    optimal_input: edge.optimal_input.clone(),
                });
            }
        }

        edges
    }
}
