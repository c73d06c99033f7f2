mod array;
mod hyperslice;
mod planar;
mod procedural;
mod zero_min;

pub use array::ArrayVolume;
pub use hyperslice::HyperSlice;
pub use planar::PlanarVolume;
pub use procedural::FnVolume;
pub use zero_min::{zero_min, ZeroMin};

use crate::error::{Result, StackError};

/// Upper bound on the dimensionality of a volume. Views assemble positions on the stack.
pub const MAX_DIMENSIONS: usize = 16;

/// Bounding box of a volume: per-dimension minimum and extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    min: Vec<i64>,
    dims: Vec<usize>,
}
impl Interval {
    pub fn new(min: Vec<i64>, dims: Vec<usize>) -> Result<Self> {
        if min.len() != dims.len() {
            return Err(StackError::InvalidShape {
                shape: dims,
                reason: format!("{} minimum coordinates given", min.len()),
            });
        }
        if dims.len() > MAX_DIMENSIONS {
            return Err(StackError::TooManyDimensions(dims.len()));
        }
        // `len` multiplies in this order, so it cannot overflow afterwards
        if dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).is_none() {
            return Err(StackError::InvalidShape {
                shape: dims,
                reason: "element count overflows usize".into(),
            });
        }
        Ok(Self { min, dims })
    }
    pub fn zero_based(dims: Vec<usize>) -> Result<Self> {
        Self::new(vec![0; dims.len()], dims)
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }
    pub fn min(&self, d: usize) -> i64 {
        self.min[d]
    }
    pub fn max(&self, d: usize) -> i64 {
        self.min[d] + self.dims[d] as i64 - 1
    }
    pub fn dim(&self, d: usize) -> usize {
        self.dims[d]
    }
    pub fn mins(&self) -> &[i64] {
        &self.min
    }
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
    pub fn is_zero_min(&self) -> bool {
        self.min.iter().all(|&m| m == 0)
    }
    /// Number of elements in the box.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn contains(&self, pos: &[i64]) -> bool {
        pos.len() == self.num_dims() && (0..self.num_dims()).all(|d| pos[d] >= self.min(d) && pos[d] <= self.max(d))
    }

    /// Same extents, minimum moved to the origin.
    pub fn at_origin(&self) -> Self {
        Self {
            min: vec![0; self.num_dims()],
            dims: self.dims.clone(),
        }
    }

    /// Interval with dimension `d` removed.
    pub fn without(&self, d: usize) -> Self {
        let mut min = self.min.clone();
        let mut dims = self.dims.clone();
        min.remove(d);
        dims.remove(d);
        Self { min, dims }
    }

    /// Visits every position in flat order, dimension 0 varying fastest.
    pub fn for_each_position(&self, mut f: impl FnMut(&[i64])) {
        if self.is_empty() {
            return;
        }
        let n = self.num_dims();
        let mut pos = self.min.clone();
        loop {
            f(&pos);

            let mut d = 0;
            loop {
                if d == n {
                    return;
                }
                if pos[d] < self.max(d) {
                    pos[d] += 1;
                    break;
                }
                pos[d] = self.min[d];
                d += 1;
            }
        }
    }
}

/// Element type of a volume.
///
/// Real-valued scalars can be read and written as `f64`; compound samples like RGB
/// report `REAL == false` and return `None` from both conversions.
pub trait Sample: Copy + Send + Sync + 'static {
    const REAL: bool;

    fn to_real(self) -> Option<f64>;
    /// Integer samples round and saturate, float samples cast.
    fn from_real(value: f64) -> Option<Self>;
}

macro_rules! integer_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            const REAL: bool = true;
            fn to_real(self) -> Option<f64> {
                Some(self as f64)
            }
            fn from_real(value: f64) -> Option<Self> {
                Some(value.round() as $t)
            }
        }
    )*};
}
integer_sample!(u8, i8, u16, i16, u32, i32, u64, i64);

macro_rules! float_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            const REAL: bool = true;
            fn to_real(self) -> Option<f64> {
                Some(self as f64)
            }
            fn from_real(value: f64) -> Option<Self> {
                Some(value as $t)
            }
        }
    )*};
}
float_sample!(f32, f64);

/// Packed colour samples (RGB and RGBA).
impl<const N: usize> Sample for [u8; N] {
    const REAL: bool = false;
    fn to_real(self) -> Option<f64> {
        None
    }
    fn from_real(_value: f64) -> Option<Self> {
        None
    }
}

/// N-dimensional random access source.
///
/// `get` is called with positions inside `interval()`; anything else is a programming
/// error and implementations may panic.
pub trait Volume: Sync {
    type Sample: Sample;

    fn interval(&self) -> &Interval;
    fn get(&self, pos: &[i64]) -> Self::Sample;

    fn num_dims(&self) -> usize {
        self.interval().num_dims()
    }
}

pub trait VolumeMut: Volume {
    fn set(&mut self, pos: &[i64], value: Self::Sample);
}

impl<V: Volume + ?Sized> Volume for &V {
    type Sample = V::Sample;
    fn interval(&self) -> &Interval {
        (**self).interval()
    }
    fn get(&self, pos: &[i64]) -> Self::Sample {
        (**self).get(pos)
    }
}
impl<V: Volume + ?Sized> Volume for &mut V {
    type Sample = V::Sample;
    fn interval(&self) -> &Interval {
        (**self).interval()
    }
    fn get(&self, pos: &[i64]) -> Self::Sample {
        (**self).get(pos)
    }
}
impl<V: VolumeMut + ?Sized> VolumeMut for &mut V {
    fn set(&mut self, pos: &[i64], value: Self::Sample) {
        (**self).set(pos, value)
    }
}

/// Flat offset of `pos` in a dense box of `dims` starting at `min`, dimension 0 fastest.
pub(crate) fn flat_index(pos: &[i64], min: &[i64], dims: &[usize]) -> usize {
    pos.iter()
        .zip(min)
        .zip(dims)
        .rev()
        .fold(0, |acc, ((&p, &m), &d)| acc * d + (p - m) as usize)
}
