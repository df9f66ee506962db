use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a question, unique within its bank.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier for questions that carry none.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a question bank: the bank file's stem, without `.json`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BankId(String);

impl BankId {
    const EXTENSION: &'static str = ".json";

    /// Returns the bank stem, e.g. `Module_1`.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.0
    }

    /// Returns the file name the bank is stored under, e.g. `Module_1.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, Self::EXTENSION)
    }

    /// Human-friendly label: the stem with underscores shown as spaces.
    #[must_use]
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BankId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for BankId {
    type Err = ParseIdError;

    /// Accepts `Module_1` as well as `Module_1.json` (extension matched
    /// case-insensitively).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed.len().saturating_sub(Self::EXTENSION.len());
        let stem = match (trimmed.get(..split), trimmed.get(split..)) {
            (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(Self::EXTENSION) => stem,
            _ => trimmed,
        };

        if stem.is_empty() {
            return Err(ParseIdError {
                kind: "BankId".to_string(),
            });
        }
        Ok(Self(stem.to_string()))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
