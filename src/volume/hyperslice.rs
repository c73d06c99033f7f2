use super::{Interval, Volume, VolumeMut, MAX_DIMENSIONS};
use crate::error::{Result, StackError};

/// A volume with some of its dimensions pinned to a fixed position.
///
/// Each `slice` call removes one dimension of the view. The source is held by value, so
/// a `HyperSlice<&V>` is a read-only plane and a `HyperSlice<&mut V>` a writable one.
#[derive(Debug, Clone)]
pub struct HyperSlice<V> {
    source: V,
    interval: Interval,
    /// One entry per source dimension, `Some` where pinned.
    fixed: Vec<Option<i64>>,
}
impl<V: Volume> HyperSlice<V> {
    /// Unpinned view of the whole source.
    pub fn new(source: V) -> Self {
        let interval = source.interval().clone();
        let fixed = vec![None; interval.num_dims()];
        Self {
            source,
            interval,
            fixed,
        }
    }

    /// Pins view dimension `d` at `pos`, dropping it from the view.
    pub fn slice(mut self, d: usize, pos: i64) -> Result<Self> {
        if d >= self.interval.num_dims() || pos < self.interval.min(d) || pos > self.interval.max(d) {
            return Err(StackError::OutOfRange {
                index: pos,
                len: self.interval.dims().get(d).copied().unwrap_or(0),
            });
        }
        let source_dim = self
            .fixed
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_none())
            .nth(d)
            .map(|(i, _)| i)
            .ok_or(StackError::TooFewDimensions(self.interval.num_dims()))?;
        self.fixed[source_dim] = Some(pos);
        self.interval = self.interval.without(d);
        Ok(self)
    }

    pub fn fixed(&self) -> &[Option<i64>] {
        &self.fixed
    }

    fn source_position(&self, pos: &[i64]) -> [i64; MAX_DIMENSIONS] {
        let mut abs = [0i64; MAX_DIMENSIONS];
        let mut free = pos.iter();
        for (d, f) in self.fixed.iter().enumerate() {
            abs[d] = match f {
                Some(p) => *p,
                None => free.next().copied().unwrap_or_default(),
            };
        }
        abs
    }
}

impl<V: Volume> Volume for HyperSlice<V> {
    type Sample = V::Sample;

    fn interval(&self) -> &Interval {
        &self.interval
    }
    fn get(&self, pos: &[i64]) -> V::Sample {
        let abs = self.source_position(pos);
        self.source.get(&abs[..self.fixed.len()])
    }
}
impl<V: VolumeMut> VolumeMut for HyperSlice<V> {
    fn set(&mut self, pos: &[i64], value: V::Sample) {
        let abs = self.source_position(pos);
        let n = self.fixed.len();
        self.source.set(&abs[..n], value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::ArrayVolume;

    fn volume() -> ArrayVolume<i64> {
        ArrayVolume::from_fn(vec![4, 3, 5, 2], |p| p[0] + 10 * p[1] + 100 * p[2] + 1000 * p[3]).unwrap()
    }

    #[test]
    fn test_repeated_slicing_at_dimension_two() {
        let v = volume();
        let plane = HyperSlice::new(&v).slice(2, 3).unwrap().slice(2, 1).unwrap();
        assert_eq!(plane.interval().dims(), &[4, 3]);
        assert_eq!(plane.fixed(), &[None, None, Some(3), Some(1)]);
        assert_eq!(plane.get(&[2, 1]), 2 + 10 + 300 + 1000);
    }

    #[test]
    fn test_slicing_a_middle_dimension() {
        let v = volume();
        let view = HyperSlice::new(&v).slice(1, 2).unwrap();
        assert_eq!(view.interval().dims(), &[4, 5, 2]);
        assert_eq!(view.get(&[1, 4, 1]), 1 + 20 + 400 + 1000);
    }

    #[test]
    fn test_writes_go_to_the_pinned_plane() {
        let mut v = volume();
        {
            let mut plane = HyperSlice::new(&mut v).slice(2, 4).unwrap().slice(2, 0).unwrap();
            plane.set(&[3, 2], -7);
        }
        assert_eq!(v.get(&[3, 2, 4, 0]), -7);
        assert_eq!(v.get(&[3, 2, 4, 1]), 3 + 20 + 400 + 1000);
    }

    #[test]
    fn test_out_of_range_pin() {
        let v = volume();
        assert!(matches!(
            HyperSlice::new(&v).slice(2, 5),
            Err(StackError::OutOfRange { index: 5, len: 5 })
        ));
        assert!(HyperSlice::new(&v).slice(4, 0).is_err());
    }
}
