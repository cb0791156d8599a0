//! Route sampling.
//!
//! `step = max(min_step, floor(N / target_samples))`; every index that is a
//! multiple of `step` is emitted, index 0 included. The probe count stays
//! near `target_samples` on long routes and never exceeds one probe per
//! `min_step` vertices on short ones.

use std::iter::{Copied, StepBy};
use std::slice::Iter;

use crate::geo::Coordinate;

/// Minimum number of geometry vertices between two probes.
pub const MIN_STEP: usize = 15;

/// Desired number of probes on a long route.
pub const TARGET_SAMPLES: usize = 15;

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    min_step: usize,
    target_samples: usize,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(MIN_STEP, TARGET_SAMPLES)
    }
}

impl Sampler {
    /// Zero values are clamped to 1.
    pub fn new(min_step: usize, target_samples: usize) -> Self {
        Self {
            min_step: min_step.max(1),
            target_samples: target_samples.max(1),
        }
    }

    /// Stride used for a geometry of `len` vertices.
    pub fn step_for(&self, len: usize) -> usize {
        self.min_step.max(len / self.target_samples)
    }

    /// Lazily sample `geometry`. Clone the iterator before consuming it to
    /// walk the same points twice.
    pub fn sample<'a>(&self, geometry: &'a [Coordinate]) -> SamplePoints<'a> {
        let step = self.step_for(geometry.len());
        SamplePoints {
            inner: geometry.iter().step_by(step).copied(),
        }
    }
}

/// Finite, lazy sequence of sample coordinates.
#[derive(Debug, Clone)]
pub struct SamplePoints<'a> {
    inner: Copied<StepBy<Iter<'a, Coordinate>>>,
}

impl Iterator for SamplePoints<'_> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SamplePoints<'_> {}
