#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod sampler;
pub mod shuffle;
pub mod validate;

pub use error::Error;
pub use sampler::{LENGTH_CHOICES, SampleSize, sample};
pub use shuffle::{SeededLcg, seed_for, shuffle_options};
pub use validate::{BankIssue, validate_bank};
