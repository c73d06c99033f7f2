mod coords;
mod executor;
mod projector;

pub use coords::{slice_count, to_coordinate, to_index};
pub use executor::{thread_pool, Executor, Job, Sequential};
pub use projector::{plane, render, scatter};

use coords::checked_slice_count;

use derive_more::Debug;
use log::debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::converter::Converter;
use crate::error::{Result, StackError};
use crate::pixels::{PixelBuffer, PixelKind, PixelType};
use crate::volume::{zero_min, Sample, Volume, VolumeMut, ZeroMin};

/// Host-side view of a stack of equally sized planes. Slice numbers are 1-based.
pub trait ImageStack {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Number of slices.
    fn size(&self) -> usize;
    fn bit_depth(&self) -> u8;
    fn pixels(&self, n: usize) -> Result<PixelBuffer>;
}

pub trait ImageStackMut: ImageStack {
    fn set_pixels(&mut self, n: usize, pixels: &PixelBuffer) -> Result<()>;
}

/// What a call to [`VirtualStack::write_slice`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The plane was overwritten with this many values.
    Written(usize),
    /// The stack is read-only; nothing happened.
    ReadOnly,
    /// Source or target samples are not real-valued scalars; nothing happened.
    Ineligible,
}

/// Presents an N-dimensional volume as a sequence of lazily rendered 2-D slices.
///
/// Dimensions 0 and 1 span each slice; all further dimensions are enumerated by the
/// slice index, dimension 2 varying fastest. Nothing is cached: every read renders the
/// plane from the source through the converter.
#[derive(Debug)]
pub struct VirtualStack<V, T, C> {
    source: ZeroMin<V>,
    higher_dims: Box<[usize]>,
    len: usize,
    #[debug(skip)]
    converter: C,
    #[debug(skip)]
    executor: Arc<dyn Executor>,
    writable: bool,
    #[debug(skip)]
    pixel: PhantomData<fn() -> T>,
}

impl<V, T, C> VirtualStack<V, T, C>
where
    V: Volume,
    T: PixelType,
    C: Converter<V::Sample, T>,
{
    /// Creates a read-only stack rendering on the calling thread.
    pub fn new(source: V, converter: C) -> Result<Self> {
        let n = source.num_dims();
        if n < 2 {
            return Err(StackError::TooFewDimensions(n));
        }
        let source = zero_min(source);
        let higher_dims: Box<[usize]> = source.interval().dims()[2..].into();
        let len = checked_slice_count(&higher_dims)?;
        debug!(
            "Virtual stack over {:?} (translated: {}): {} slices of {:?}",
            source.interval().dims(),
            source.is_translated(),
            len,
            T::KIND
        );

        Ok(Self {
            source,
            higher_dims,
            len,
            converter,
            executor: Arc::new(Sequential),
            writable: false,
            pixel: PhantomData,
        })
    }

    /// Renders slices on `executor`, split into row bands.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        debug!("Rendering with parallelism {}", executor.parallelism());
        self.executor = executor;
        self
    }

    pub fn width(&self) -> usize {
        self.source.interval().dim(0)
    }
    pub fn height(&self) -> usize {
        self.source.interval().dim(1)
    }
    /// Number of slices, the product of all dimensions beyond the plane.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn higher_dims(&self) -> &[usize] {
        &self.higher_dims
    }
    pub fn pixel_kind(&self) -> PixelKind {
        T::KIND
    }
    pub fn bit_depth(&self) -> u8 {
        T::KIND.bit_depth()
    }

    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }
    /// Whether [`write_slice`](Self::write_slice) will attempt to persist changes.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn source(&self) -> &V {
        self.source.source()
    }
    pub fn into_source(self) -> V {
        self.source.into_inner()
    }

    /// Position in the dimensions beyond the plane addressed by a zero-based `index`.
    pub fn coordinate(&self, index: i64) -> Result<Vec<i64>> {
        let len = self.len();
        let index = usize::try_from(index).map_err(|_| StackError::OutOfRange { index, len })?;
        to_coordinate(index, &self.higher_dims)
    }

    /// Zero-based index of the 1-based host slice number `n`.
    fn host_index(&self, n: usize) -> Result<i64> {
        i64::try_from(n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or(StackError::OutOfRange {
                index: i64::MAX,
                len: self.len,
            })
    }

    /// Renders the slice at zero-based `index`.
    pub fn read_slice(&self, index: i64) -> Result<PixelBuffer> {
        let coordinate = self.coordinate(index)?;
        let pixels = render::<_, T, _>(&self.source, &coordinate, &self.converter, &*self.executor);
        Ok(T::into_buffer(pixels))
    }
}

impl<V, T, C> VirtualStack<V, T, C>
where
    V: VolumeMut,
    T: PixelType,
    C: Converter<V::Sample, T>,
{
    /// Overwrites the slice at zero-based `index` with the real values of `pixels`.
    ///
    /// A read-only stack, or one whose source or target samples are not real-valued,
    /// ignores the call and reports why through the returned [`WriteOutcome`].
    pub fn write_slice(&mut self, index: i64, pixels: &PixelBuffer) -> Result<WriteOutcome> {
        if !self.writable {
            debug!("Ignoring write to slice {}: stack is read-only", index);
            return Ok(WriteOutcome::ReadOnly);
        }
        if !(<V::Sample as Sample>::REAL && <T as Sample>::REAL) {
            debug!("Ignoring write to slice {}: samples are not real-valued", index);
            return Ok(WriteOutcome::Ineligible);
        }

        let coordinate = self.coordinate(index)?;
        let gray = pixels.gray()?;
        let written = scatter(gray, &mut self.source, &coordinate)?;
        Ok(WriteOutcome::Written(written))
    }
}

impl<V, T, C> ImageStack for VirtualStack<V, T, C>
where
    V: Volume,
    T: PixelType,
    C: Converter<V::Sample, T>,
{
    fn width(&self) -> usize {
        VirtualStack::width(self)
    }
    fn height(&self) -> usize {
        VirtualStack::height(self)
    }
    fn size(&self) -> usize {
        self.len()
    }
    fn bit_depth(&self) -> u8 {
        VirtualStack::bit_depth(self)
    }
    fn pixels(&self, n: usize) -> Result<PixelBuffer> {
        self.read_slice(self.host_index(n)?)
    }
}

impl<V, T, C> ImageStackMut for VirtualStack<V, T, C>
where
    V: VolumeMut,
    T: PixelType,
    C: Converter<V::Sample, T>,
{
    fn set_pixels(&mut self, n: usize, pixels: &PixelBuffer) -> Result<()> {
        let index = self.host_index(n)?;
        self.write_slice(index, pixels).map(|_| ())
    }
}
