use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on answer options per question (`A` through `Z`).
pub const MAX_OPTIONS: usize = 26;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LetterError {
    #[error("not an option letter: {0:?}")]
    Invalid(String),
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// Label of one answer option. Always within `A..=Z`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionLetter(u8);

impl OptionLetter {
    pub const A: Self = Self(0);

    /// Letter for a zero-based option position, `None` past `Z`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_OPTIONS {
            u8::try_from(index).ok().map(Self)
        } else {
            None
        }
    }

    /// Case-insensitive conversion from a single character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Self(upper as u8 - b'A'))
        } else {
            None
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        char::from(b'A' + self.0)
    }

    /// The first `count` letters in order, capped at `Z`.
    pub fn first(count: usize) -> impl Iterator<Item = OptionLetter> {
        (0..count.min(MAX_OPTIONS)).filter_map(Self::from_index)
    }
}

impl fmt::Debug for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionLetter({})", self.as_char())
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = LetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| LetterError::Invalid(s.to_string())),
            _ => Err(LetterError::Invalid(s.to_string())),
        }
    }
}

//
// ─── OPTION SET ────────────────────────────────────────────────────────────────
//

/// Ordered mapping from option letter to option text.
///
/// Letters are implied by position: the first entry is `A`, the second `B`,
/// and so on, so the key set is always exactly `A..A+len-1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    texts: Vec<String>,
}

impl OptionSet {
    /// Builds a set from option texts in display order. Entries past `Z` are dropped.
    #[must_use]
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().take(MAX_OPTIONS).map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    #[must_use]
    pub fn contains(&self, letter: OptionLetter) -> bool {
        letter.index() < self.texts.len()
    }

    #[must_use]
    pub fn get(&self, letter: OptionLetter) -> Option<&str> {
        self.texts.get(letter.index()).map(String::as_str)
    }

    pub fn letters(&self) -> impl Iterator<Item = OptionLetter> + '_ {
        OptionLetter::first(self.texts.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionLetter, &str)> + '_ {
        self.letters().zip(self.texts.iter().map(String::as_str))
    }

    /// Option texts in display order.
    #[must_use]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }
}
