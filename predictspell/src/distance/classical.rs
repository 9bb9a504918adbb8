use super::{Calculation, MatchToken, DEFAULT_MAX_DISTANCE};

const UNREACHABLE: u32 = u32::MAX;

/// Banded Damerau-Levenshtein distance (optimal string alignment).
///
/// `rows[i][j]` holds the distance between the first `i` input characters and
/// the first `j` matched characters. Cells more than `max_distance` off the
/// diagonal are never reached by an alignment within the bound and are
/// stored as unreachable.
#[derive(Clone, Debug)]
pub struct ClassicalCalculation<'t> {
    input: Vec<char>,
    matched: Vec<MatchToken<'t>>,
    rows: Vec<Vec<u32>>,
    max_distance: u32,
}

impl<'t> Default for ClassicalCalculation<'t> {
    fn default() -> Self {
        ClassicalCalculation::with_max_distance(DEFAULT_MAX_DISTANCE)
    }
}

impl<'t> ClassicalCalculation<'t> {
    fn in_band(&self, i: usize, j: usize) -> bool {
        i.max(j) - i.min(j) <= self.max_distance as usize
    }

    /// Computes cell `(i, j)` from cells above and to the left of it.
    fn cell(&self, i: usize, j: usize) -> u32 {
        if !self.in_band(i, j) {
            return UNREACHABLE;
        }

        if i == 0 {
            return j as u32;
        }

        if j == 0 {
            return i as u32;
        }

        let substitution = if self.input[i - 1] == self.matched[j - 1].key {
            0
        } else {
            1
        };

        let mut best = self.rows[i - 1][j - 1]
            .saturating_add(substitution)
            .min(self.rows[i - 1][j].saturating_add(1))
            .min(self.rows[i][j - 1].saturating_add(1));

        if i > 1
            && j > 1
            && self.input[i - 1] == self.matched[j - 2].key
            && self.input[i - 2] == self.matched[j - 1].key
        {
            best = best.min(self.rows[i - 2][j - 2].saturating_add(1));
        }

        best
    }

    fn recompute(&mut self) {
        self.rows = Vec::with_capacity(self.input.len() + 1);

        for i in 0..=self.input.len() {
            self.rows.push(Vec::with_capacity(self.matched.len() + 1));
            for j in 0..=self.matched.len() {
                let value = self.cell(i, j);
                self.rows[i].push(value);
            }
        }
    }
}

impl<'t> Calculation<'t> for ClassicalCalculation<'t> {
    fn with_max_distance(max_distance: u32) -> Self {
        ClassicalCalculation {
            input: vec![],
            matched: vec![],
            rows: vec![vec![0]],
            max_distance,
        }
    }

    fn add_match_char(&self, token: MatchToken<'t>) -> Self {
        let mut next = self.clone();
        next.matched.push(token);

        let j = next.matched.len();
        for i in 0..next.rows.len() {
            let value = next.cell(i, j);
            next.rows[i].push(value);
        }

        next
    }

    fn add_input_char(&self, ch: char) -> Self {
        let mut next = self.clone();
        next.input.push(ch);

        let i = next.input.len();
        next.rows.push(Vec::with_capacity(next.matched.len() + 1));
        for j in 0..=next.matched.len() {
            let value = next.cell(i, j);
            next.rows[i].push(value);
        }

        next
    }

    fn subset(&self, input_len: usize, match_len: usize) -> Self {
        let input_len = input_len.min(self.input.len());
        let match_len = match_len.min(self.matched.len());

        ClassicalCalculation {
            input: self.input[..input_len].to_vec(),
            matched: self.matched[..match_len].to_vec(),
            rows: self.rows[..=input_len]
                .iter()
                .map(|row| row[..=match_len].to_vec())
                .collect(),
            max_distance: self.max_distance,
        }
    }

    fn heuristic_final_cost(&self) -> u32 {
        let n = self.input.len();
        let m = self.matched.len();
        let w = self.max_distance as usize;

        if self.in_band(n, m) {
            self.rows[n][m]
        } else if n > m {
            // Leftover input beyond the band costs one deletion each.
            self.rows[m + w][m].saturating_add((n - m - w) as u32)
        } else {
            self.rows[n][n + w].saturating_add((m - n - w) as u32)
        }
    }

    fn increase_max_distance(&self) -> Self {
        let mut next = self.clone();
        next.max_distance += 1;
        next.recompute();
        next
    }

    fn max_distance(&self) -> u32 {
        self.max_distance
    }

    fn input_sequence(&self) -> &[char] {
        &self.input
    }

    fn match_sequence(&self) -> &[MatchToken<'t>] {
        &self.matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::{build_trie, identity_search_key, Trie};
    use crate::wordlist::WordList;

    fn trie() -> Trie {
        let words: WordList = vec![("x", 1)].into_iter().collect();
        build_trie(&words, identity_search_key).unwrap()
    }

    fn calculation<'t>(
        trie: &'t Trie,
        input: &str,
        matched: &str,
        max_distance: u32,
    ) -> ClassicalCalculation<'t> {
        let mut calc = ClassicalCalculation::with_max_distance(max_distance);
        for ch in input.chars() {
            calc = calc.add_input_char(ch);
        }
        for ch in matched.chars() {
            calc = calc.add_match_char(MatchToken::new(ch, trie.traversal()));
        }
        calc
    }

    #[test]
    fn agrees_with_osa_distance() {
        let trie = trie();
        let words = [
            "", "a", "ab", "ba", "cat", "act", "cot", "coat", "kitten", "sitting", "abcd", "acbd",
            "tac", "tca",
        ];

        for a in &words {
            for b in &words {
                let calc = calculation(&trie, a, b, 8);
                assert_eq!(
                    calc.heuristic_final_cost() as usize,
                    strsim::osa_distance(a, b),
                    "{:?} vs {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn order_of_extension_does_not_matter() {
        let trie = trie();
        let mut calc = ClassicalCalculation::default();

        for (input, matched) in "cta".chars().zip("cat".chars()) {
            calc = calc
                .add_match_char(MatchToken::new(matched, trie.traversal()))
                .add_input_char(input);
        }

        assert_eq!(calc.heuristic_final_cost(), 1);
        assert_eq!(calc.rows, calculation(&trie, "cta", "cat", 2).rows);
    }

    #[test]
    fn subset_drops_trailing_characters() {
        let trie = trie();
        let full = calculation(&trie, "cart", "cat", 2);
        let subset = full.subset(2, 2);

        assert_eq!(subset.input_sequence(), &['c', 'a']);
        assert_eq!(subset.match_sequence().len(), 2);
        assert_eq!(subset.heuristic_final_cost(), 0);
        assert_eq!(subset.rows, calculation(&trie, "ca", "ca", 2).rows);
    }

    #[test]
    fn estimates_outside_the_band() {
        let trie = trie();

        assert_eq!(calculation(&trie, "abcd", "", 2).heuristic_final_cost(), 4);
        assert_eq!(calculation(&trie, "", "abcde", 1).heuristic_final_cost(), 5);
    }

    #[test]
    fn widening_recovers_exact_distance() {
        let trie = trie();
        let narrow = calculation(&trie, "kitten", "sitting", 1);
        assert!(narrow.heuristic_final_cost() >= 3);

        let wide = narrow.increase_max_distance().increase_max_distance();
        assert_eq!(wide.max_distance(), 3);
        assert_eq!(wide.heuristic_final_cost(), 3);
        assert_eq!(wide.rows, calculation(&trie, "kitten", "sitting", 3).rows);
    }

    #[test]
    fn extension_is_persistent() {
        let trie = trie();
        let base = calculation(&trie, "ca", "c", 2);
        let _ = base.add_match_char(MatchToken::new('a', trie.traversal()));
        let _ = base.add_input_char('t');

        assert_eq!(base.input_sequence().len(), 2);
        assert_eq!(base.match_sequence().len(), 1);
        assert!(base.last_match_entry().is_some());
    }
}
