use std::sync::Arc;

use quiz_core::model::{OptionLetter, Question, QuestionId};

use super::summary::RunSummary;

/// Where a session stands between user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Inputs enabled; waiting for a selection to submit.
    AwaitingAnswer,
    /// Inputs locked; correctness and rationale are on screen.
    ShowingFeedback,
    /// Every master pool question has been answered correctly.
    Complete,
}

impl SessionPhase {
    /// Caption for the single action control, if it is shown at all.
    #[must_use]
    pub fn action_label(self) -> Option<&'static str> {
        match self {
            Self::AwaitingAnswer => Some("Submit"),
            Self::ShowingFeedback => Some("Next"),
            Self::Complete => None,
        }
    }
}

/// Result of submitting an answer, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub question_id: QuestionId,
    pub correct: bool,
    /// Letters as judged, after single-select capping.
    pub selection: Vec<OptionLetter>,
    /// One `"<letter>. <text>"` line per correct letter.
    pub correct_answer: Vec<String>,
    pub rationale: String,
    /// Questions re-queued right after this one by the submission.
    pub redeployed: usize,
}

/// What to show after advancing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    Question(Arc<Question>),
    Complete(RunSummary),
}
