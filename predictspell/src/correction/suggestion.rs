//! Suggestion for a correction or completion.
use crate::types::{Cost, Weight};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::cmp::Ordering;
use std::cmp::Ordering::Equal;

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Suggestion for a correction or completion
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// search cost at which the word-form was reached
    pub cost: Cost,
    /// lexicon weight of the word-form
    pub weight: Weight,
    /// whether the input matched the whole word or only a prefix of it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Suggestion {
    /// creates a suggestion
    pub fn new(value: SmolStr, cost: Cost, weight: Weight, completed: Option<bool>) -> Suggestion {
        Suggestion {
            value,
            cost,
            weight,
            completed,
        }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the search cost of the suggestion
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// gets the lexicon weight of the suggestion
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// returns whether this suggestion is a full match or a completion
    pub fn completed(&self) -> Option<bool> {
        self.completed
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        let x = self.cost.partial_cmp(&other.cost).unwrap_or(Equal);

        if let Equal = x {
            // More frequent words first
            return other
                .weight
                .cmp(&self.weight)
                .then_with(|| self.value.cmp(&other.value));
        }

        x
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.cost == other.cost && self.weight == other.weight
    }
}

impl Eq for Suggestion {}
