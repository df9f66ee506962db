#![forbid(unsafe_code)]

pub mod fs;
pub mod http;
pub mod repository;

pub use fs::FsBankRepository;
pub use http::HttpBankRepository;
pub use repository::{BankEntry, BankRepository, InMemoryRepository, StorageError, parse_listing};
