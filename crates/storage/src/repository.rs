use async_trait::async_trait;
use quiz_core::model::{Bank, BankId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by bank sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("invalid bank name: {0}")]
    InvalidName(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("bank server responded with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("invalid bank server url: {0}")]
    InvalidUrl(String),
}

impl From<quiz_core::Error> for StorageError {
    fn from(err: quiz_core::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// One selectable bank in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankEntry {
    /// File name, e.g. `Module_1.json`.
    pub file: String,
    /// Display label, e.g. `Module 1`.
    pub label: String,
}

impl BankEntry {
    #[must_use]
    pub fn from_id(id: &BankId) -> Self {
        Self {
            file: id.file_name(),
            label: id.label(),
        }
    }

    /// Identifier to fetch this bank with.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidName` if the file name is empty.
    pub fn id(&self) -> Result<BankId, StorageError> {
        self.file
            .parse()
            .map_err(|_| StorageError::InvalidName(self.file.clone()))
    }
}

/// Reads a bank listing payload.
///
/// Accepts a plain array or a `{ "modules": [...] }` wrapper, where items are
/// either bank names or `{ file, label }` objects. Unusable items are skipped.
#[must_use]
pub fn parse_listing(payload: &Value) -> Vec<BankEntry> {
    let items: &[Value] = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("modules") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let name = match item {
                Value::String(name) => name.as_str(),
                Value::Object(map) => map.get("file").and_then(Value::as_str)?,
                _ => return None,
            };
            let id: BankId = name.parse().ok()?;
            let mut entry = BankEntry::from_id(&id);
            if let Some(label) = item.get("label").and_then(Value::as_str) {
                entry.label = label.to_string();
            }
            Some(entry)
        })
        .collect()
}

/// Source of question banks.
#[async_trait]
pub trait BankRepository: Send + Sync {
    /// List the banks this source can serve.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing cannot be produced.
    async fn list_banks(&self) -> Result<Vec<BankEntry>, StorageError>;

    /// Fetch and normalize a bank document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the bank is not served here, or
    /// other storage errors on transport or parse failure.
    async fn fetch_bank(&self, id: &BankId) -> Result<Bank, StorageError>;

    /// Check that a bank can be fetched without downloading it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the check itself fails.
    async fn bank_exists(&self, id: &BankId) -> Result<bool, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Documents are kept as raw JSON text and normalized on every fetch.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<BTreeMap<BankId, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Store or replace a bank document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_document(&self, id: BankId, document: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, document.into());
        Ok(())
    }
}

#[async_trait]
impl BankRepository for InMemoryRepository {
    async fn list_banks(&self) -> Result<Vec<BankEntry>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().map(BankEntry::from_id).collect())
    }

    async fn fetch_bank(&self, id: &BankId) -> Result<Bank, StorageError> {
        let text = {
            let guard = self
                .documents
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(id).cloned().ok_or(StorageError::NotFound)?
        };
        Ok(Bank::parse(id, &text)?)
    }

    async fn bank_exists(&self, id: &BankId) -> Result<bool, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bank_id(name: &str) -> BankId {
        name.parse().unwrap()
    }

    #[test]
    fn listing_accepts_plain_names() {
        let entries = parse_listing(&json!(["Module_1", "Pharm_Quiz_HESI.json"]));
        assert_eq!(
            entries,
            vec![
                BankEntry {
                    file: "Module_1.json".into(),
                    label: "Module 1".into()
                },
                BankEntry {
                    file: "Pharm_Quiz_HESI.json".into(),
                    label: "Pharm Quiz HESI".into()
                },
            ]
        );
    }

    #[test]
    fn listing_accepts_file_label_objects_and_modules_wrapper() {
        let wrapped = json!({ "modules": [{ "file": "Module_2.json", "label": "Second" }] });
        let entries = parse_listing(&wrapped);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file, "Module_2.json");
        assert_eq!(entries[0].label, "Second");
        assert_eq!(entries[0].id().unwrap(), bank_id("Module_2"));
    }

    #[test]
    fn listing_skips_unusable_items() {
        assert!(parse_listing(&json!({ "modules": "nope" })).is_empty());
        assert!(parse_listing(&json!(42)).is_empty());
        let entries = parse_listing(&json!(["", 7, { "label": "no file" }, "Module_3"]));
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn in_memory_round_trips_documents() {
        let repo = InMemoryRepository::new();
        let doc = json!({ "module": "Demo", "questions": [{ "id": "q1", "options": ["a"] }] });
        repo.insert_document(bank_id("Module_1"), doc.to_string())
            .unwrap();

        let listed = repo.list_banks().await.unwrap();
        assert_eq!(listed, vec![BankEntry::from_id(&bank_id("Module_1"))]);
        assert!(repo.bank_exists(&bank_id("Module_1")).await.unwrap());
        assert!(!repo.bank_exists(&bank_id("Module_9")).await.unwrap());

        let bank = repo.fetch_bank(&bank_id("Module_1")).await.unwrap();
        assert_eq!(bank.name, "Demo");
        assert_eq!(bank.questions.len(), 1);
    }

    #[tokio::test]
    async fn in_memory_missing_bank_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.fetch_bank(&bank_id("Module_1")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn in_memory_non_json_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.insert_document(bank_id("Broken"), "{ not json").unwrap();
        let err = repo.fetch_bank(&bank_id("Broken")).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
