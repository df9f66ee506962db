use super::view::SessionPhase;

/// Display counters for the quiz header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    /// Distinct questions presented at least once.
    pub seen: usize,
    /// Master pool questions not yet answered correctly.
    pub remaining: usize,
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub seen: usize,
    pub remaining: usize,
    pub mastered: usize,
    pub pool_size: usize,
    /// Mastered share of the pool, rounded to a whole percent.
    pub percent_mastered: u32,
    /// 1 for the first pass over the sampled questions, +1 per re-queue of unmastered ones.
    pub pass: usize,
    pub phase: SessionPhase,
}
