use super::{flat_index, Interval, Sample, Volume, VolumeMut};
use crate::error::{Result, StackError};

/// Volume stored as one contiguous `width * height` plane per slice, the layout of
/// classic image stacks. Dimensions beyond the first two are flattened over the
/// planes, dimension 2 varying fastest.
#[derive(Debug, Clone)]
pub struct PlanarVolume<S> {
    interval: Interval,
    planes: Vec<Vec<S>>,
}
impl<S: Sample> PlanarVolume<S> {
    pub fn new(dims: Vec<usize>, planes: Vec<Vec<S>>) -> Result<Self> {
        if dims.len() < 2 {
            return Err(StackError::TooFewDimensions(dims.len()));
        }
        let interval = Interval::zero_based(dims)?;
        let plane_len = interval.dim(0) * interval.dim(1);
        let plane_count: usize = interval.dims()[2..].iter().product();
        if planes.len() != plane_count {
            return Err(StackError::InvalidShape {
                shape: interval.dims().to_vec(),
                reason: format!("expected {} planes, got {}", plane_count, planes.len()),
            });
        }
        if let Some((i, p)) = planes.iter().enumerate().find(|(_, p)| p.len() != plane_len) {
            return Err(StackError::InvalidShape {
                shape: interval.dims().to_vec(),
                reason: format!("plane {} has {} elements, expected {}", i, p.len(), plane_len),
            });
        }
        Ok(Self { interval, planes })
    }

    /// Reinterprets the planes under a different shape with the same plane size and count.
    pub fn reshape(self, dims: Vec<usize>) -> Result<Self> {
        Self::new(dims, self.planes)
    }

    pub fn planes(&self) -> &[Vec<S>] {
        &self.planes
    }

    fn locate(&self, pos: &[i64]) -> (usize, usize) {
        debug_assert!(self.interval.contains(pos), "{:?} outside {:?}", pos, self.interval);
        let dims = self.interval.dims();
        let plane = flat_index(&pos[2..], &self.interval.mins()[2..], &dims[2..]);
        let offset = pos[1] as usize * dims[0] + pos[0] as usize;
        (plane, offset)
    }
}

impl<S: Sample> Volume for PlanarVolume<S> {
    type Sample = S;

    fn interval(&self) -> &Interval {
        &self.interval
    }
    fn get(&self, pos: &[i64]) -> S {
        let (plane, offset) = self.locate(pos);
        self.planes[plane][offset]
    }
}
impl<S: Sample> VolumeMut for PlanarVolume<S> {
    fn set(&mut self, pos: &[i64], value: S) {
        let (plane, offset) = self.locate(pos);
        self.planes[plane][offset] = value;
    }
}
