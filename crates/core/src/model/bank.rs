use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::ids::{BankId, QuestionId};
use crate::model::letters::{OptionLetter, OptionSet};
use crate::model::question::{Question, QuestionKind};

/// A named collection of questions loaded from one bank document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    pub name: String,
    pub questions: Vec<Question>,
}

impl Bank {
    /// Parses and normalizes a bank document.
    ///
    /// The bank takes its name from the document's `module` field, falling
    /// back to the identifier it was fetched under.
    ///
    /// # Errors
    ///
    /// Returns `Error::Document` only when the payload is not JSON at all.
    /// Every shape problem inside valid JSON is normalized away.
    pub fn parse(id: &BankId, text: &str) -> Result<Self, Error> {
        let doc: Value = serde_json::from_str(text)?;
        Ok(Self::from_document(id, &doc))
    }

    #[must_use]
    pub fn from_document(id: &BankId, doc: &Value) -> Self {
        let name = doc
            .get("module")
            .and_then(scalar_text)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.stem().to_string());
        Self {
            name,
            questions: normalize_questions(doc),
        }
    }
}

/// Accepted key spellings per field, in lookup order.
const ID_KEYS: &[&str] = &["id"];
const STEM_KEYS: &[&str] = &["stem", "question", "q"];
const KIND_KEYS: &[&str] = &["type"];
const OPTION_KEYS: &[&str] = &["options", "choices"];
const CORRECT_KEYS: &[&str] = &["correct", "answer", "answers"];
const RATIONALE_KEYS: &[&str] = &["rationale", "rational", "explanation"];

/// Letters accepted as standalone option fields (`"A": "..."`).
const LETTER_FIELDS: usize = 6;

/// Raw question entry as found in a bank document. Every field is optional
/// and loosely typed.
#[derive(Debug, Default)]
struct RawQuestion<'a> {
    id: Option<&'a Value>,
    stem: Option<&'a Value>,
    kind: Option<&'a Value>,
    options: Option<&'a Value>,
    letter_options: Vec<Option<&'a Value>>,
    correct: Option<&'a Value>,
    rationale: Option<&'a Value>,
}

impl<'a> RawQuestion<'a> {
    fn from_entry(entry: &'a Value) -> Self {
        let Some(map) = entry.as_object() else {
            return Self::default();
        };
        Self {
            id: lookup(map, ID_KEYS),
            stem: lookup(map, STEM_KEYS),
            kind: lookup(map, KIND_KEYS),
            options: lookup(map, OPTION_KEYS),
            letter_options: OptionLetter::first(LETTER_FIELDS)
                .map(|letter| {
                    let key = letter.as_char().to_string();
                    lookup(map, &[key.as_str()])
                })
                .collect(),
            correct: lookup(map, CORRECT_KEYS),
            rationale: lookup(map, RATIONALE_KEYS),
        }
    }
}

/// First non-null value under any of `keys`. An exact key match wins over a
/// case-insensitive one.
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        map.get(*key)
            .or_else(|| {
                map.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .filter(|v| !v.is_null())
    })
}

/// Converts a bank document into questions, substituting defaults for
/// anything missing or mistyped. A document without a `questions` array
/// yields no questions.
#[must_use]
pub fn normalize_questions(doc: &Value) -> Vec<Question> {
    let Some(entries) = doc.get("questions").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| normalize_question(&RawQuestion::from_entry(entry)))
        .collect()
}

fn normalize_question(raw: &RawQuestion<'_>) -> Question {
    let id = raw
        .id
        .and_then(scalar_text)
        .map_or_else(QuestionId::generate, QuestionId::new);

    let options = if let Some(last) = raw.letter_options.iter().rposition(|v| has_text(*v)) {
        // Letter-keyed fields keep their letters, so gaps stay as blank options.
        OptionSet::from_texts(
            raw.letter_options[..=last]
                .iter()
                .map(|&v| v.map(option_text).unwrap_or_default()),
        )
    } else {
        match raw.options {
            Some(Value::Array(items)) => OptionSet::from_texts(items.iter().map(option_text)),
            _ => OptionSet::default(),
        }
    };

    Question {
        stem: raw.stem.and_then(scalar_text).unwrap_or_default(),
        kind: raw
            .kind
            .and_then(scalar_text)
            .map_or(QuestionKind::SingleSelect, |tag| QuestionKind::from_tag(&tag)),
        correct: correct_letters(&id, raw.correct),
        rationale: raw.rationale.and_then(scalar_text).unwrap_or_default(),
        options,
        id,
    }
}

fn has_text(value: Option<&Value>) -> bool {
    value
        .and_then(scalar_text)
        .is_some_and(|text| !text.is_empty())
}

/// Stringifies a scalar the way a loosely typed source would. `null` counts as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn option_text(item: &Value) -> String {
    item.get("text")
        .and_then(scalar_text)
        .or_else(|| scalar_text(item))
        .unwrap_or_default()
}

fn correct_letters(id: &QuestionId, raw: Option<&Value>) -> BTreeSet<OptionLetter> {
    let tokens: Vec<String> = match raw {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Number(n)) => {
            return n
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(OptionLetter::from_index)
                .into_iter()
                .collect();
        }
        _ => Vec::new(),
    };

    tokens
        .iter()
        .filter_map(|token| match token.parse::<OptionLetter>() {
            Ok(letter) => Some(letter),
            Err(_) => {
                tracing::warn!(question = %id, value = %token, "dropping unrecognised correct letter");
                None
            }
        })
        .collect()
}
