//! Primitive value types shared by the trie and the correction search.
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Lexicon frequency of a word-form.
pub type Weight = u64;

/// Search cost: edit operations plus input-sampling penalty.
pub type Cost = f64;

/// An edit to apply to a text buffer: delete `delete_left` characters left of
/// the caret, then insert `insert`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub insert: SmolStr,
    #[serde(default)]
    pub delete_left: u32,
}

impl Transform {
    pub fn new(insert: impl Into<SmolStr>, delete_left: u32) -> Transform {
        Transform {
            insert: insert.into(),
            delete_left,
        }
    }

    /// A plain insertion.
    pub fn insert(insert: impl Into<SmolStr>) -> Transform {
        Transform::new(insert, 0)
    }
}

/// One weighted realization of an ambiguous event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMass<T> {
    pub sample: T,
    pub p: f64,
}

impl<T> ProbabilityMass<T> {
    pub fn new(sample: T, p: f64) -> ProbabilityMass<T> {
        ProbabilityMass { sample, p }
    }
}

/// Mutually exclusive alternatives for a single input event.
pub type Distribution<T> = Vec<ProbabilityMass<T>>;

/// The masses chosen along one search path, one per input event consumed.
/// Not a [`Distribution`]: every element comes from a different event.
pub type RealizedInput = Vec<ProbabilityMass<Transform>>;

/// A distribution holding a single certain insertion.
pub fn certain_insert(text: impl Into<SmolStr>) -> Distribution<Transform> {
    vec![ProbabilityMass::new(Transform::insert(text), 1.0)]
}
