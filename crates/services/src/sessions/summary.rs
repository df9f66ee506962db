use std::collections::HashMap;
use std::sync::Arc;

use quiz_core::model::{OptionLetter, Question, QuestionId};

use super::service::AnswerRecord;

/// First-try accuracy over distinct answered questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstTryStats {
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
}

/// One row of the end-of-run review, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question_id: QuestionId,
    pub stem: String,
    /// Most recent recorded outcome for this question.
    pub correct: bool,
    pub correct_answer: Vec<String>,
    pub rationale: String,
    pub last_selection: Vec<OptionLetter>,
}

/// Aggregate summary for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub bank: String,
    /// `None` when nothing was answered.
    pub first_try: Option<FirstTryStats>,
    /// Every presented entry, redeployed duplicates included.
    pub review: Vec<ReviewItem>,
}

impl RunSummary {
    #[must_use]
    pub fn build(
        bank: &str,
        order: &[Arc<Question>],
        answered: &HashMap<QuestionId, AnswerRecord>,
    ) -> Self {
        let total = answered.len();
        let first_try = (total > 0).then(|| {
            let correct = answered.values().filter(|a| a.first_try_correct).count();
            FirstTryStats {
                correct,
                total,
                percent: rounded_percent(correct, total),
            }
        });

        let review = order
            .iter()
            .map(|q| {
                let record = answered.get(&q.id);
                ReviewItem {
                    question_id: q.id.clone(),
                    stem: q.stem.clone(),
                    correct: record.is_some_and(|a| a.correct),
                    correct_answer: q.correct_answer_lines(),
                    rationale: q.rationale.clone(),
                    last_selection: record.map(|a| a.selection.clone()).unwrap_or_default(),
                }
            })
            .collect();

        Self {
            bank: bank.to_string(),
            first_try,
            review,
        }
    }

    /// Review rows whose final outcome was incorrect.
    pub fn missed(&self) -> impl Iterator<Item = &ReviewItem> {
        self.review.iter().filter(|item| !item.correct)
    }
}

/// `part / total` as a percentage, rounded half up. Zero when `total` is zero.
#[must_use]
pub fn rounded_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (part * 200 + total) / (2 * total);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
