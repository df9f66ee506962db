use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::letters::{OptionLetter, OptionSet};

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// How answers to a question are collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one letter; choices are mutually exclusive.
    #[default]
    SingleSelect,
    /// Any number of letters; choices toggle independently.
    MultiSelect,
}

impl QuestionKind {
    /// Maps a bank type tag to a kind. Anything other than `multi_select`
    /// is treated as single select.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag == "multi_select" {
            Self::MultiSelect
        } else {
            Self::SingleSelect
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleSelect => "single_select",
            Self::MultiSelect => "multi_select",
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A normalized bank question.
///
/// `correct` is not guaranteed to be a subset of the option letters straight
/// out of the normalizer; the option shuffler drops unmatched letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub stem: String,
    pub kind: QuestionKind,
    pub options: OptionSet,
    pub correct: BTreeSet<OptionLetter>,
    pub rationale: String,
}

impl Question {
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.kind == QuestionKind::MultiSelect
    }

    /// Turns the set of picked letters into the submitted selection.
    ///
    /// Single-select questions keep only the first picked letter in option
    /// order; multi-select questions keep all of them, sorted.
    #[must_use]
    pub fn selection_from(&self, picked: &BTreeSet<OptionLetter>) -> Vec<OptionLetter> {
        match self.kind {
            QuestionKind::SingleSelect => picked.iter().take(1).copied().collect(),
            QuestionKind::MultiSelect => picked.iter().copied().collect(),
        }
    }

    /// A selection is correct when it equals the correct letters as a set.
    #[must_use]
    pub fn is_correct(&self, selection: &[OptionLetter]) -> bool {
        let mut sorted = selection.to_vec();
        sorted.sort_unstable();
        sorted.iter().eq(self.correct.iter())
    }

    /// One `"<letter>. <text>"` line per correct letter.
    #[must_use]
    pub fn correct_answer_lines(&self) -> Vec<String> {
        self.correct
            .iter()
            .map(|letter| format!("{letter}. {}", self.options.get(*letter).unwrap_or_default()))
            .collect()
    }
}
