use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("bank document is not valid JSON: {0}")]
    Document(#[from] serde_json::Error),
    #[error("invalid run length: {0:?}")]
    SampleSize(String),
}
