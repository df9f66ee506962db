use std::sync::Arc;

use quiz_core::model::BankId;
use storage::repository::{BankEntry, BankRepository};

use crate::error::CatalogError;

/// Banks offered when the source cannot produce a listing.
pub const FALLBACK_BANKS: [&str; 10] = [
    "Module_1",
    "Module_2",
    "Module_3",
    "Module_4",
    "Pharm_Quiz_HESI",
    "Learning_Questions_Module_1_2",
    "Learning_Questions_Module_3_4_",
    "Pharmacology_1",
    "Pharmacology_2",
    "Pharmacology_3",
];

/// Selectable banks, loaded from a bank source.
#[derive(Clone)]
pub struct BankCatalog {
    banks: Arc<dyn BankRepository>,
    entries: Vec<BankEntry>,
}

impl BankCatalog {
    #[must_use]
    pub fn new(banks: Arc<dyn BankRepository>) -> Self {
        Self {
            banks,
            entries: Vec::new(),
        }
    }

    /// Replace the entries with the source listing.
    ///
    /// A failed listing is not an error: the built-in fallback list is used.
    pub async fn load(&mut self) -> &[BankEntry] {
        self.entries = match self.banks.list_banks().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "bank listing failed, using built-in list");
                fallback_entries()
            }
        };
        &self.entries
    }

    #[must_use]
    pub fn entries(&self) -> &[BankEntry] {
        &self.entries
    }

    /// First entry, the default selection.
    #[must_use]
    pub fn default_entry(&self) -> Option<&BankEntry> {
        self.entries.first()
    }

    /// Add a user-typed bank name after checking that the source serves it.
    ///
    /// Adding a bank that is already listed returns the existing entry.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidName` for blank names,
    /// `CatalogError::UnknownBank` if the source does not have it, or
    /// `CatalogError::Storage` if the check itself fails.
    pub async fn add_custom(&mut self, raw: &str) -> Result<BankEntry, CatalogError> {
        let id: BankId = raw
            .trim()
            .parse()
            .map_err(|_| CatalogError::InvalidName(raw.to_string()))?;

        if let Some(existing) = self.entries.iter().find(|e| e.file == id.file_name()) {
            return Ok(existing.clone());
        }

        if !self.banks.bank_exists(&id).await? {
            return Err(CatalogError::UnknownBank(id.file_name()));
        }

        let entry = BankEntry::from_id(&id);
        tracing::debug!(file = %entry.file, "custom bank added");
        self.entries.push(entry.clone());
        Ok(entry)
    }
}

fn fallback_entries() -> Vec<BankEntry> {
    FALLBACK_BANKS
        .iter()
        .filter_map(|name| name.parse::<BankId>().ok())
        .map(|id| BankEntry::from_id(&id))
        .collect()
}
