use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use quiz_core::SampleSize;
use quiz_core::model::{OptionLetter, Question, QuestionId};

use super::plan::{RunPlan, redeploy_threshold};
use super::progress::{Counters, SessionProgress};
use super::summary::{RunSummary, rounded_percent};
use super::view::{Feedback, SessionPhase, SessionStep};
use crate::error::SessionError;

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Answer history for one distinct question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// Outcome of the very first recorded answer. Never changes afterwards.
    pub first_try_correct: bool,
    /// Outcome of the most recent answer.
    pub correct: bool,
    /// Most recent submitted selection.
    pub selection: Vec<OptionLetter>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A single mastery run over a sampled set of questions.
///
/// The run ends only when every question in the master pool has been
/// answered correctly. Wrong answers are collected and, once enough pile up,
/// re-queued right after the current question. At the end of each pass the
/// questions still unmastered are appended for another pass.
pub struct QuizSession {
    bank: String,
    request: SampleSize,
    order: Vec<Arc<Question>>,
    master_pool: Vec<Arc<Question>>,
    cursor: usize,
    answered: HashMap<QuestionId, AnswerRecord>,
    unique_seen: HashSet<QuestionId>,
    threshold: usize,
    wrong_since_last: Vec<Arc<Question>>,
    phase: SessionPhase,
    pass: usize,
}

impl QuizSession {
    /// Start a run from a plan and present its first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the plan holds no questions.
    pub fn start(plan: RunPlan) -> Result<Self, SessionError> {
        let (bank, questions, request) = plan.into_parts();
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let order: Vec<Arc<Question>> = questions.into_iter().map(Arc::new).collect();
        let mut pool_ids = HashSet::new();
        let master_pool: Vec<Arc<Question>> = order
            .iter()
            .filter(|q| pool_ids.insert(q.id.clone()))
            .cloned()
            .collect();
        let threshold = redeploy_threshold(master_pool.len(), request);

        let mut session = Self {
            bank,
            request,
            order,
            master_pool,
            cursor: 0,
            answered: HashMap::new(),
            unique_seen: HashSet::new(),
            threshold,
            wrong_since_last: Vec::new(),
            phase: SessionPhase::AwaitingAnswer,
            pass: 1,
        };
        session.present();

        tracing::info!(
            bank = %session.bank,
            questions = session.master_pool.len(),
            %request,
            threshold,
            "quiz run started"
        );
        Ok(session)
    }

    #[must_use]
    pub fn bank(&self) -> &str {
        &self.bank
    }

    #[must_use]
    pub fn request(&self) -> SampleSize {
        self.request
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Wrong answers needed before a redeployment batch is re-queued.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Full presentation queue, including re-queued duplicates.
    #[must_use]
    pub fn order(&self) -> &[Arc<Question>] {
        &self.order
    }

    /// Distinct questions that must all be answered correctly.
    #[must_use]
    pub fn master_pool(&self) -> &[Arc<Question>] {
        &self.master_pool
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn answered(&self) -> &HashMap<QuestionId, AnswerRecord> {
        &self.answered
    }

    #[must_use]
    pub fn answer_for(&self, id: &QuestionId) -> Option<&AnswerRecord> {
        self.answered.get(id)
    }

    /// Wrong answers collected since the last redeployment or pass boundary.
    #[must_use]
    pub fn wrong_since_last(&self) -> &[Arc<Question>] {
        &self.wrong_since_last
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.order.get(self.cursor).map(AsRef::as_ref)
    }

    fn is_mastered(&self, id: &QuestionId) -> bool {
        self.answered.get(id).is_some_and(|a| a.correct)
    }

    #[must_use]
    pub fn counters(&self) -> Counters {
        Counters {
            seen: self.unique_seen.len(),
            remaining: self
                .master_pool
                .iter()
                .filter(|q| !self.is_mastered(&q.id))
                .count(),
        }
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let Counters { seen, remaining } = self.counters();
        let pool_size = self.master_pool.len();
        let mastered = pool_size - remaining;
        SessionProgress {
            seen,
            remaining,
            mastered,
            pool_size,
            percent_mastered: rounded_percent(mastered, pool_size),
            pass: self.pass,
            phase: self.phase,
        }
    }

    /// Summary over everything presented so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::build(&self.bank, &self.order, &self.answered)
    }

    /// Judge and record an answer to the current question.
    ///
    /// `picked` is the set of checked options. Single-select questions keep
    /// only the first of them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` if nothing was picked,
    /// `SessionError::NotAwaitingAnswer` if feedback is already showing, or
    /// `SessionError::Completed` once the run is over.
    pub fn submit<I>(&mut self, picked: I) -> Result<Feedback, SessionError>
    where
        I: IntoIterator<Item = OptionLetter>,
    {
        self.expect_phase(SessionPhase::AwaitingAnswer)?;
        let question = self
            .order
            .get(self.cursor)
            .cloned()
            .ok_or(SessionError::Completed)?;

        let picked: BTreeSet<OptionLetter> = picked.into_iter().collect();
        if picked.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let selection = question.selection_from(&picked);
        let correct = question.is_correct(&selection);
        self.record_answer(&question.id, &selection, correct);

        let mut redeployed = 0;
        if !correct {
            self.wrong_since_last.push(Arc::clone(&question));
            if self.wrong_since_last.len() >= self.threshold {
                redeployed = self.redeploy_wrong();
            }
        }
        self.phase = SessionPhase::ShowingFeedback;

        tracing::debug!(
            question = %question.id,
            correct,
            pending_wrong = self.wrong_since_last.len(),
            redeployed,
            "answer recorded"
        );

        Ok(Feedback {
            question_id: question.id.clone(),
            correct,
            selection,
            correct_answer: question.correct_answer_lines(),
            rationale: question.rationale.clone(),
            redeployed,
        })
    }

    /// Move past the feedback to the next question, or finish the run.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotShowingFeedback` if the current question has
    /// not been answered, or `SessionError::Completed` once the run is over.
    pub fn advance(&mut self) -> Result<SessionStep, SessionError> {
        self.expect_phase(SessionPhase::ShowingFeedback)?;
        self.cursor += 1;

        if self.cursor >= self.order.len() {
            let unmastered: Vec<Arc<Question>> = self
                .master_pool
                .iter()
                .filter(|q| !self.is_mastered(&q.id))
                .cloned()
                .collect();

            if unmastered.is_empty() {
                self.phase = SessionPhase::Complete;
                let summary = self.summary();
                tracing::info!(
                    bank = %self.bank,
                    presented = self.order.len(),
                    first_try_percent = summary.first_try.map(|s| s.percent),
                    "quiz run complete"
                );
                return Ok(SessionStep::Complete(summary));
            }

            self.wrong_since_last.clear();
            self.pass += 1;
            tracing::debug!(pass = self.pass, unmastered = unmastered.len(), "starting new pass");
            self.order.extend(unmastered);
        }

        Ok(SessionStep::Question(self.present()))
    }

    fn expect_phase(&self, wanted: SessionPhase) -> Result<(), SessionError> {
        match (self.phase, wanted) {
            (current, wanted) if current == wanted => Ok(()),
            (SessionPhase::Complete, _) => Err(SessionError::Completed),
            (_, SessionPhase::AwaitingAnswer) => Err(SessionError::NotAwaitingAnswer),
            _ => Err(SessionError::NotShowingFeedback),
        }
    }

    fn present(&mut self) -> Arc<Question> {
        let question = Arc::clone(&self.order[self.cursor]);
        self.unique_seen.insert(question.id.clone());
        self.phase = SessionPhase::AwaitingAnswer;
        question
    }

    fn record_answer(&mut self, id: &QuestionId, selection: &[OptionLetter], correct: bool) {
        match self.answered.entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.correct = correct;
                record.selection = selection.to_vec();
            }
            Entry::Vacant(entry) => {
                entry.insert(AnswerRecord {
                    first_try_correct: correct,
                    correct,
                    selection: selection.to_vec(),
                });
            }
        }
    }

    /// Re-queue the collected wrong answers right after the current
    /// question, once each, in the order they were missed.
    fn redeploy_wrong(&mut self) -> usize {
        let mut ids = HashSet::new();
        let batch: Vec<Arc<Question>> = self
            .wrong_since_last
            .drain(..)
            .filter(|q| ids.insert(q.id.clone()))
            .collect();
        let count = batch.len();

        let tail = self.order.split_off(self.cursor + 1);
        self.order.extend(batch);
        self.order.extend(tail);
        count
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("bank", &self.bank)
            .field("order_len", &self.order.len())
            .field("pool_len", &self.master_pool.len())
            .field("cursor", &self.cursor)
            .field("answered_len", &self.answered.len())
            .field("threshold", &self.threshold)
            .field("pending_wrong", &self.wrong_since_last.len())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
