use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::Error;

/// Run lengths offered to the user, besides the full bank.
pub const LENGTH_CHOICES: [usize; 4] = [10, 25, 50, 100];

/// Requests at or above this size are considered large runs.
pub const LARGE_RUN: usize = 100;

/// Requested number of questions for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    Full,
    Count(usize),
}

impl SampleSize {
    /// True for full-bank runs and counts of at least [`LARGE_RUN`].
    #[must_use]
    pub fn is_large(self) -> bool {
        match self {
            Self::Full => true,
            Self::Count(n) => n >= LARGE_RUN,
        }
    }
}

impl Default for SampleSize {
    fn default() -> Self {
        Self::Count(LENGTH_CHOICES[0])
    }
}

impl fmt::Display for SampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SampleSize {
    type Err = Error;

    /// Accepts `full` (any case), `-1` as an alias for full, or a positive count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("full") || trimmed == "-1" {
            return Ok(Self::Full);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::Count(n)),
            _ => Err(Error::SampleSize(s.to_string())),
        }
    }
}

/// Picks the questions for one run.
///
/// Full requests, and counts covering the whole bank, return every item in
/// a uniformly random order. Smaller counts take a partial Fisher–Yates
/// sample without replacement.
pub fn sample<T, R>(items: &[T], size: SampleSize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng,
{
    let mut pool = items.to_vec();
    let take = match size {
        SampleSize::Count(n) if n < pool.len() => n,
        _ => {
            pool.shuffle(rng);
            return pool;
        }
    };

    for i in 0..take {
        let j = rng.random_range(i..pool.len());
        pool.swap(i, j);
    }
    pool.truncate(take);
    pool
}
