use super::{flat_index, Interval, Sample, Volume, VolumeMut};
use crate::error::{Result, StackError};

/// Dense in-memory volume, dimension 0 varying fastest.
#[derive(Debug, Clone)]
pub struct ArrayVolume<S> {
    interval: Interval,
    data: Vec<S>,
}
impl<S: Sample> ArrayVolume<S> {
    pub fn new(dims: Vec<usize>, data: Vec<S>) -> Result<Self> {
        let interval = Interval::zero_based(dims)?;
        if interval.len() != data.len() {
            return Err(StackError::InvalidShape {
                shape: interval.dims().to_vec(),
                reason: format!("expected {} elements, got {}", interval.len(), data.len()),
            });
        }
        Ok(Self { interval, data })
    }

    /// Fills a zero-based volume by evaluating `f` at every position in flat order.
    pub fn from_fn(dims: Vec<usize>, mut f: impl FnMut(&[i64]) -> S) -> Result<Self> {
        let interval = Interval::zero_based(dims)?;
        let mut data = Vec::with_capacity(interval.len());
        interval.for_each_position(|pos| data.push(f(pos)));
        Ok(Self { interval, data })
    }

    /// Moves the bounding box so that it starts at `min`. Data is untouched.
    pub fn with_min(self, min: Vec<i64>) -> Result<Self> {
        let interval = Interval::new(min, self.interval.dims().to_vec())?;
        Ok(Self {
            interval,
            data: self.data,
        })
    }

    pub fn data(&self) -> &[S] {
        &self.data
    }
    pub fn into_data(self) -> Vec<S> {
        self.data
    }

    fn offset(&self, pos: &[i64]) -> usize {
        debug_assert!(self.interval.contains(pos), "{:?} outside {:?}", pos, self.interval);
        flat_index(pos, self.interval.mins(), self.interval.dims())
    }
}

impl<S: Sample> Volume for ArrayVolume<S> {
    type Sample = S;

    fn interval(&self) -> &Interval {
        &self.interval
    }
    fn get(&self, pos: &[i64]) -> S {
        self.data[self.offset(pos)]
    }
}
impl<S: Sample> VolumeMut for ArrayVolume<S> {
    fn set(&mut self, pos: &[i64], value: S) {
        let off = self.offset(pos);
        self.data[off] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_matches_flat_order() {
        let v = ArrayVolume::from_fn(vec![2, 3], |p| (p[0] + 10 * p[1]) as u16).unwrap();
        assert_eq!(v.data(), &[0, 1, 10, 11, 20, 21]);
        assert_eq!(v.get(&[1, 2]), 21);
    }

    #[test]
    fn test_with_min_translates_access() {
        let mut v = ArrayVolume::new(vec![2, 2], vec![1u8, 2, 3, 4])
            .unwrap()
            .with_min(vec![-1, 5])
            .unwrap();
        assert_eq!(v.get(&[-1, 5]), 1);
        assert_eq!(v.get(&[0, 6]), 4);
        v.set(&[0, 5], 9);
        assert_eq!(v.data(), &[1, 9, 3, 4]);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            ArrayVolume::new(vec![2, 2], vec![0u8; 3]),
            Err(StackError::InvalidShape { .. })
        ));
    }
}
