#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod sessions;

pub use sessions as session;

pub use catalog::{BankCatalog, FALLBACK_BANKS};
pub use error::{CatalogError, SessionError};

pub use sessions::{
    Counters, Feedback, FirstTryStats, QuizController, QuizRenderer, QuizSession, ReviewItem,
    RunPlan, RunSummary, SessionPhase, SessionProgress, SessionStep,
};
