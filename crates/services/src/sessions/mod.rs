mod plan;
mod progress;
mod service;
mod summary;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{RunPlan, redeploy_threshold};
pub use progress::{Counters, SessionProgress};
pub use service::{AnswerRecord, QuizSession};
pub use summary::{FirstTryStats, ReviewItem, RunSummary, rounded_percent};
pub use view::{Feedback, SessionPhase, SessionStep};
pub use workflow::{QuizController, QuizRenderer};
