use std::sync::Arc;

use quiz_core::{SampleSize, validate_bank};
use quiz_core::model::{BankId, OptionLetter, Question};
use storage::repository::BankRepository;

use super::plan::RunPlan;
use super::progress::Counters;
use super::service::QuizSession;
use super::summary::RunSummary;
use super::view::{Feedback, SessionStep};
use crate::error::SessionError;

/// Presentation hooks driven by `QuizController`.
pub trait QuizRenderer {
    /// Show a question with its answer inputs enabled.
    fn render_question(&mut self, question: &Question);

    /// Lock the inputs and show the outcome of a submission.
    fn render_feedback(&mut self, feedback: &Feedback);

    fn render_summary(&mut self, summary: &RunSummary);

    fn update_counters(&mut self, counters: Counters);

    /// User-visible notice, e.g. a failed bank load.
    fn notify(&mut self, message: &str);
}

/// Owns the active run and routes user actions to it.
///
/// Starting a quiz always replaces the previous run.
pub struct QuizController<R> {
    banks: Arc<dyn BankRepository>,
    renderer: R,
    session: Option<QuizSession>,
}

impl<R: QuizRenderer> QuizController<R> {
    #[must_use]
    pub fn new(banks: Arc<dyn BankRepository>, renderer: R) -> Self {
        Self {
            banks,
            renderer,
            session: None,
        }
    }

    /// Fetch a bank, build a run and render its first question.
    ///
    /// Sampled questions left without a correct option can never be
    /// mastered; the renderer is told how many there are.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank cannot be loaded, after
    /// notifying the renderer, or `SessionError::Empty` if it has no
    /// questions.
    pub async fn start_quiz(
        &mut self,
        bank_id: &BankId,
        request: SampleSize,
    ) -> Result<(), SessionError> {
        self.session = None;

        let bank = match self.banks.fetch_bank(bank_id).await {
            Ok(bank) => bank,
            Err(err) => {
                tracing::warn!(bank = %bank_id, error = %err, "bank fetch failed");
                self.renderer
                    .notify(&format!("Could not load {}", bank_id.file_name()));
                return Err(err.into());
            }
        };

        for issue in validate_bank(&bank.questions) {
            tracing::warn!(bank = %bank_id, %issue, "bank issue");
        }

        let plan = RunPlan::build(bank.name, &bank.questions, request, &mut rand::rng());
        let unanswerable = plan
            .questions()
            .iter()
            .filter(|q| q.correct.is_empty())
            .count();
        if unanswerable > 0 {
            tracing::warn!(bank = %bank_id, unanswerable, "run holds questions without a correct option");
            self.renderer.notify(&format!(
                "{unanswerable} question(s) in this run have no valid correct answer and cannot be mastered"
            ));
        }
        let session = QuizSession::start(plan)?;
        if let Some(question) = session.current_question() {
            self.renderer.render_question(question);
        }
        self.renderer.update_counters(session.counters());
        self.session = Some(session);
        Ok(())
    }

    /// Submit the checked options for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` before a quiz is started, or
    /// any error from `QuizSession::submit`.
    pub fn submit<I>(&mut self, picked: I) -> Result<Feedback, SessionError>
    where
        I: IntoIterator<Item = OptionLetter>,
    {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let feedback = session.submit(picked)?;
        self.renderer.render_feedback(&feedback);
        self.renderer.update_counters(session.counters());
        Ok(feedback)
    }

    /// Move on to the next question, or render the summary when done.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` before a quiz is started, or
    /// any error from `QuizSession::advance`.
    pub fn advance(&mut self) -> Result<SessionStep, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        let step = session.advance()?;
        match &step {
            SessionStep::Question(question) => self.renderer.render_question(question),
            SessionStep::Complete(summary) => self.renderer.render_summary(summary),
        }
        self.renderer.update_counters(session.counters());
        Ok(step)
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
