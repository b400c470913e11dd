//! Random id selection with exclusion.
//!
//! Ids are drawn uniformly from an inclusive range and rejected while they
//! are already in the requested set.  Each accepted id is inserted into the
//! set before it is handed out, so an id is never in flight twice and never
//! delivered twice in one session.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::FetchError;

/// Owns the valid id range, the requested-id set and the RNG.
#[derive(Debug)]
pub struct IdSampler {
    min: u32,
    max: u32,
    /// Grows by one on every successful draw; never shrinks.
    requested: HashSet<u32>,
    rng: StdRng,
}

impl IdSampler {
    /// Sampler over `range`, seeded from the operating system.
    pub fn new(range: RangeInclusive<u32>) -> Self {
        Self::with_rng(range, StdRng::from_os_rng())
    }

    /// Sampler with an explicit RNG, for reproducible draws.
    pub fn with_rng(range: RangeInclusive<u32>, rng: StdRng) -> Self {
        let (min, max) = range.into_inner();
        Self {
            min,
            max,
            requested: HashSet::new(),
            rng,
        }
    }

    pub fn requested(&self) -> &HashSet<u32> {
        &self.requested
    }

    /// Number of ids that can still be drawn.
    pub fn remaining(&self) -> u64 {
        self.range_len() - self.requested.len() as u64
    }

    /// Draw an id not yet requested and mark it as requested.
    ///
    /// Fails with [`FetchError::ExhaustedRange`] once every id in the range
    /// has been handed out; otherwise rejection sampling terminates because
    /// at least one id is still free.
    pub fn draw(&mut self) -> Result<u32, FetchError> {
        if self.remaining() == 0 {
            return Err(FetchError::ExhaustedRange {
                min: self.min,
                max: self.max,
            });
        }

        let id = loop {
            let candidate = self.rng.random_range(self.min..=self.max);
            if !self.requested.contains(&candidate) {
                break candidate;
            }
            tracing::trace!(candidate, "resampling already-requested id");
        };

        self.requested.insert(id);
        Ok(id)
    }

    fn range_len(&self) -> u64 {
        if self.max < self.min {
            0
        } else {
            u64::from(self.max - self.min) + 1
        }
    }
}
