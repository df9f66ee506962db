use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use quiz_core::model::{Bank, BankId};
use regex::Regex;

use crate::repository::{BankEntry, BankRepository, StorageError};

/// File name patterns a directory is allowed to serve as banks.
const BANK_PATTERNS: [&str; 4] = [
    r"^Module_.*\.json$",
    r"^Learning_.*\.json$",
    r"^Pharm_.*\.json$",
    r"^.*_Quiz_.*\.json$",
];

static BANK_FILES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BANK_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

/// Returns true when `file_name` is a plain file name matching a bank pattern.
#[must_use]
pub fn is_bank_file(file_name: &str) -> bool {
    BANK_FILES.iter().any(|re| re.is_match(file_name))
}

/// Serves bank documents from a single directory.
///
/// Only files matching the bank patterns are listed or served, and bank
/// identifiers that try to reach outside the directory are rejected.
#[derive(Debug, Clone)]
pub struct FsBankRepository {
    root: PathBuf,
}

impl FsBankRepository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bank file names present in the directory, deduplicated and sorted.
    async fn discover(&self) -> Result<BTreeSet<String>, StorageError> {
        let mut found = BTreeSet::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_bank_file(name) {
                    found.insert(name.to_string());
                }
            }
        }
        Ok(found)
    }

    /// Resolves a bank id to a file name inside the root, or rejects it.
    fn safe_file_name(id: &BankId) -> Result<String, StorageError> {
        let file = id.file_name();
        let escapes = file.contains(['/', '\\'])
            || file.starts_with('.')
            || Path::new(&file).file_name().and_then(|n| n.to_str()) != Some(file.as_str());
        if escapes {
            tracing::warn!(bank = %id, "rejected bank name outside the bank directory");
            return Err(StorageError::InvalidName(file));
        }
        Ok(file)
    }
}

#[async_trait]
impl BankRepository for FsBankRepository {
    async fn list_banks(&self) -> Result<Vec<BankEntry>, StorageError> {
        let files = self.discover().await?;
        Ok(files
            .iter()
            .filter_map(|file| file.parse::<BankId>().ok())
            .map(|id| BankEntry::from_id(&id))
            .collect())
    }

    async fn fetch_bank(&self, id: &BankId) -> Result<Bank, StorageError> {
        let file = Self::safe_file_name(id)?;
        if !self.discover().await?.contains(&file) {
            return Err(StorageError::NotFound);
        }
        let text = tokio::fs::read_to_string(self.root.join(&file)).await?;
        tracing::debug!(bank = %id, bytes = text.len(), "read bank document");
        Ok(Bank::parse(id, &text)?)
    }

    async fn bank_exists(&self, id: &BankId) -> Result<bool, StorageError> {
        let file = Self::safe_file_name(id)?;
        Ok(self.discover().await?.contains(&file))
    }
}
