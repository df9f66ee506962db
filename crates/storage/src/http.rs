use async_trait::async_trait;
use quiz_core::model::{Bank, BankId};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::repository::{BankEntry, BankRepository, StorageError, parse_listing};

/// Fetches banks from a study-guide server.
///
/// - `GET {base}/modules` lists banks.
/// - `GET {base}/{stem}.json` returns a bank document.
/// - `HEAD {base}/{stem}.json` checks that a bank exists.
#[derive(Debug, Clone)]
pub struct HttpBankRepository {
    client: Client,
    base_url: Url,
}

impl HttpBankRepository {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidUrl` if `base_url` is not an absolute
    /// URL that can carry a path.
    pub fn new(base_url: &str) -> Result<Self, StorageError> {
        Self::with_client(Client::new(), base_url)
    }

    /// # Errors
    ///
    /// Returns `StorageError::InvalidUrl` if `base_url` is not an absolute
    /// URL that can carry a path.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| StorageError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with one more path segment, percent-encoded.
    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }

    fn listing_url(&self) -> Url {
        self.endpoint("modules")
    }

    fn bank_url(&self, id: &BankId) -> Url {
        self.endpoint(&id.file_name())
    }
}

#[async_trait]
impl BankRepository for HttpBankRepository {
    async fn list_banks(&self) -> Result<Vec<BankEntry>, StorageError> {
        let response = self
            .client
            .get(self.listing_url())
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StorageError::HttpStatus(response.status()));
        }
        let payload: Value = response.json().await?;
        Ok(parse_listing(&payload))
    }

    async fn fetch_bank(&self, id: &BankId) -> Result<Bank, StorageError> {
        let response = self
            .client
            .get(self.bank_url(id))
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(StorageError::NotFound),
            status if !status.is_success() => return Err(StorageError::HttpStatus(status)),
            _ => {}
        }
        let text = response.text().await?;
        tracing::debug!(bank = %id, bytes = text.len(), "downloaded bank document");
        Ok(Bank::parse(id, &text)?)
    }

    async fn bank_exists(&self, id: &BankId) -> Result<bool, StorageError> {
        let response = self
            .client
            .head(self.bank_url(id))
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StorageError::HttpStatus(status)),
        }
    }
}
