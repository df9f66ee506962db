use rand::Rng;

use quiz_core::model::Question;
use quiz_core::{SampleSize, sample, shuffle_options};

/// Share of the master pool, in percent, that triggers a redeployment batch.
const SMALL_RUN_BATCH_PERCENT: usize = 15;
const LARGE_RUN_BATCH_PERCENT: usize = 5;

/// Questions selected for one run, with options already shuffled.
///
/// The only way to obtain a plan is through the constructors below, so every
/// question in it has been shuffled exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    bank: String,
    questions: Vec<Question>,
    request: SampleSize,
}

impl RunPlan {
    /// Samples `request` questions from the bank and shuffles their options.
    pub fn build<R: Rng>(
        bank: impl Into<String>,
        all: &[Question],
        request: SampleSize,
        rng: &mut R,
    ) -> Self {
        Self::from_sampled(bank, sample(all, request, rng), request)
    }

    /// Uses `questions` as the run order as-is and shuffles their options.
    #[must_use]
    pub fn from_sampled(
        bank: impl Into<String>,
        questions: Vec<Question>,
        request: SampleSize,
    ) -> Self {
        Self {
            bank: bank.into(),
            questions: questions.iter().map(shuffle_options).collect(),
            request,
        }
    }

    #[must_use]
    pub fn bank(&self) -> &str {
        &self.bank
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn request(&self) -> SampleSize {
        self.request
    }

    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Question>, SampleSize) {
        (self.bank, self.questions, self.request)
    }
}

/// Number of wrong answers collected before they are re-queued.
///
/// `max(1, ceil(pool_size * share))`, with a 5% share for full or large
/// runs and 15% otherwise.
#[must_use]
pub fn redeploy_threshold(pool_size: usize, request: SampleSize) -> usize {
    let percent = if request.is_large() {
        LARGE_RUN_BATCH_PERCENT
    } else {
        SMALL_RUN_BATCH_PERCENT
    };
    (pool_size * percent).div_ceil(100).max(1)
}
