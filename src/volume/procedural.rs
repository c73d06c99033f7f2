use super::{Interval, Sample, Volume};
use crate::error::Result;
use derive_more::Debug;

/// Read-only volume computing each element from its position.
#[derive(Debug)]
pub struct FnVolume<F> {
    interval: Interval,
    #[debug(skip)]
    f: F,
}
impl<S, F> FnVolume<F>
where
    S: Sample,
    F: Fn(&[i64]) -> S + Sync,
{
    pub fn new(interval: Interval, f: F) -> Self {
        Self { interval, f }
    }
    pub fn zero_based(dims: Vec<usize>, f: F) -> Result<Self> {
        Ok(Self::new(Interval::zero_based(dims)?, f))
    }
}

impl<S, F> Volume for FnVolume<F>
where
    S: Sample,
    F: Fn(&[i64]) -> S + Sync,
{
    type Sample = S;

    fn interval(&self) -> &Interval {
        &self.interval
    }
    fn get(&self, pos: &[i64]) -> S {
        (self.f)(pos)
    }
}
