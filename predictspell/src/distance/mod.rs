//! Incremental edit-distance calculations between an input sequence and a
//! path through the lexicon.
//!
//! A calculation is persistent: every extension returns a new value and
//! leaves the original untouched, so the correction search can branch from
//! one state into many edges without copying by hand.
use crate::trie::Traversal;

mod classical;

pub use self::classical::ClassicalCalculation;

/// Default width of the band of admissible alignments.
pub const DEFAULT_MAX_DISTANCE: u32 = 2;

/// One lexicon-side character, together with the trie position it leads to.
#[derive(Clone, Debug)]
pub struct MatchToken<'t> {
    pub key: char,
    pub traversal: Traversal<'t>,
}

impl<'t> MatchToken<'t> {
    pub fn new(key: char, traversal: Traversal<'t>) -> MatchToken<'t> {
        MatchToken { key, traversal }
    }
}

/// Alignment state between the characters typed so far and the characters
/// matched in the lexicon so far.
pub trait Calculation<'t>: Clone {
    /// An empty calculation admitting alignments up to `max_distance` edits.
    fn with_max_distance(max_distance: u32) -> Self;

    fn add_match_char(&self, token: MatchToken<'t>) -> Self;

    fn add_input_char(&self, ch: char) -> Self;

    /// The calculation restricted to the first `input_len` input characters
    /// and the first `match_len` matched characters.
    fn subset(&self, input_len: usize, match_len: usize) -> Self;

    /// Best achievable cost of aligning the full input with the full match.
    ///
    /// Exact while the alignment stays within [`Calculation::max_distance`];
    /// an estimate beyond it.
    fn heuristic_final_cost(&self) -> u32;

    /// The same alignment with the band widened by one edit.
    fn increase_max_distance(&self) -> Self;

    fn max_distance(&self) -> u32;

    fn input_sequence(&self) -> &[char];

    fn match_sequence(&self) -> &[MatchToken<'t>];

    fn last_match_entry(&self) -> Option<&MatchToken<'t>> {
        self.match_sequence().last()
    }
}
