//! Deterministic per-question option shuffling.
//!
//! The permutation depends only on the question identifier, so the same
//! question always shows its options in the same scrambled order:
//!
//! 1. Seed: fold the identifier's UTF-16 code units through
//!    `h = h * 31 + unit`, wrapping at 32 bits, starting from `h = 0`.
//! 2. Generator: `state = state * 1664525 + 1013904223 (mod 2^32)`; each draw
//!    steps the state first and returns it.
//! 3. Fisher–Yates from the last position down to 1, swapping position `i`
//!    with `j = floor(draw * (i + 1) / 2^32)`.
//!
//! Options are then relabelled `A, B, C, …` in their shuffled order.

use std::collections::BTreeSet;

use crate::model::{OptionLetter, OptionSet, Question};

/// Polynomial hash of a question identifier used as the shuffle seed.
#[must_use]
pub fn seed_for(id: &str) -> u32 {
    id.encode_utf16()
        .fold(0_u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// 32-bit linear congruential generator (Numerical Recipes constants).
#[derive(Debug, Clone)]
pub struct SeededLcg {
    state: u32,
}

impl SeededLcg {
    pub const MULTIPLIER: u32 = 1_664_525;
    pub const INCREMENT: u32 = 1_013_904_223;

    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        let scaled = (u64::from(self.next_u32()) * bound as u64) >> 32;
        usize::try_from(scaled).unwrap_or(0)
    }
}

/// Returns a copy of `question` with its options permuted and the correct
/// letters relabelled to follow their text.
///
/// Correct letters that name no option are dropped. Call this once per
/// question per run: the output carries new letters, so shuffling it again
/// produces a different order.
#[must_use]
pub fn shuffle_options(question: &Question) -> Question {
    let mut rng = SeededLcg::new(seed_for(question.id.as_str()));
    let mut pairs: Vec<(OptionLetter, &str)> = question.options.iter().collect();

    for i in (1..pairs.len()).rev() {
        let j = rng.below(i + 1);
        pairs.swap(i, j);
    }

    // Position in `pairs` is the new letter.
    let correct: BTreeSet<OptionLetter> = question
        .correct
        .iter()
        .filter_map(|old| {
            pairs
                .iter()
                .position(|(letter, _)| letter == old)
                .and_then(OptionLetter::from_index)
        })
        .collect();

    Question {
        options: OptionSet::from_texts(pairs.iter().map(|(_, text)| *text)),
        correct,
        ..question.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, QuestionKind};

    fn letter(c: char) -> OptionLetter {
        OptionLetter::from_char(c).unwrap()
    }

    fn build_question(id: &str, options: &[&str], correct: &[char]) -> Question {
        Question {
            id: QuestionId::new(id),
            stem: "stem".into(),
            kind: QuestionKind::SingleSelect,
            options: OptionSet::from_texts(options.iter().copied()),
            correct: correct.iter().map(|c| letter(*c)).collect(),
            rationale: "why".into(),
        }
    }

    #[test]
    fn seed_is_polynomial_hash() {
        assert_eq!(seed_for(""), 0);
        assert_eq!(seed_for("q1"), 113 * 31 + 49);
        assert_eq!(seed_for("abc"), 96_354);
    }

    #[test]
    fn seed_wraps_at_32_bits() {
        let long = "z".repeat(64);
        // Must not panic on overflow and must stay stable.
        assert_eq!(seed_for(&long), seed_for(&long));
    }

    #[test]
    fn known_permutation_is_stable() {
        let q = build_question("q1", &["w", "x", "y", "z"], &['B']);
        let shuffled = shuffle_options(&q);
        assert_eq!(shuffled.options.texts(), &["w", "z", "x", "y"]);
        assert_eq!(shuffled.correct.iter().copied().collect::<Vec<_>>(), vec![letter('C')]);

        let q = build_question("cardio-7", &["a", "b", "c", "d", "e"], &['A', 'E']);
        let shuffled = shuffle_options(&q);
        assert_eq!(shuffled.options.texts(), &["e", "c", "a", "b", "d"]);
        assert_eq!(
            shuffled.correct.iter().copied().collect::<Vec<_>>(),
            vec![letter('A'), letter('C')]
        );
    }

    #[test]
    fn shuffle_is_deterministic_per_id() {
        let q = build_question("pharm-12", &["1", "2", "3", "4", "5", "6"], &['D']);
        assert_eq!(shuffle_options(&q), shuffle_options(&q));
    }

    #[test]
    fn shuffle_preserves_texts_and_letter_range() {
        let texts = ["alpha", "beta", "gamma", "delta", "epsilon"];
        let q = build_question("mixed", &texts, &['A']);
        let shuffled = shuffle_options(&q);

        let mut before: Vec<_> = q.options.texts().to_vec();
        let mut after: Vec<_> = shuffled.options.texts().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        let letters: Vec<char> = shuffled.options.letters().map(OptionLetter::as_char).collect();
        assert_eq!(letters, vec!['A', 'B', 'C', 'D', 'E']);
    }

    #[test]
    fn correct_letters_follow_their_text() {
        let q = build_question("follow", &["p", "q", "r", "s"], &['B', 'D']);
        let shuffled = shuffle_options(&q);

        let mut texts: Vec<_> = shuffled
            .correct
            .iter()
            .map(|l| shuffled.options.get(*l).unwrap())
            .collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["q", "s"]);
    }

    #[test]
    fn unmatched_correct_letters_are_dropped() {
        let q = build_question("drop", &["p", "q"], &['A', 'F']);
        let shuffled = shuffle_options(&q);
        assert_eq!(shuffled.correct.len(), 1);
        let only = *shuffled.correct.iter().next().unwrap();
        assert_eq!(shuffled.options.get(only), Some("p"));
    }

    #[test]
    fn stem_and_rationale_are_untouched() {
        let q = build_question("keep", &["a", "b"], &['A']);
        let shuffled = shuffle_options(&q);
        assert_eq!(shuffled.id, q.id);
        assert_eq!(shuffled.stem, q.stem);
        assert_eq!(shuffled.rationale, q.rationale);
    }
}
