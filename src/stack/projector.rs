//! Rendering planes of a volume into dense buffers, and scattering them back.
//!
//! Both directions expect a zero-based volume whose plane spans dimensions 0 and 1.

use log::trace;

use super::executor::{Executor, Job};
use crate::converter::Converter;
use crate::error::{Result, StackError};
use crate::pixels::{GrayPixels, PixelType};
use crate::volume::{HyperSlice, Sample, Volume, VolumeMut};

/// Converts the plane at `coordinate` (one entry per dimension beyond 1) into a row-major
/// buffer. Rows are split into contiguous bands, one job per band.
pub fn render<V, T, C>(volume: &V, coordinate: &[i64], converter: &C, executor: &dyn Executor) -> Vec<T>
where
    V: Volume,
    T: PixelType,
    C: Converter<V::Sample, T>,
{
    let width = volume.interval().dim(0);
    let height = volume.interval().dim(1);
    let mut pixels = vec![T::default(); width * height];
    if pixels.is_empty() {
        return pixels;
    }

    let bands = executor.parallelism().clamp(1, height);
    let rows_per_band = (height + bands - 1) / bands;
    trace!(
        "Rendering plane {:?} ({}x{}) in {} bands of {} rows",
        coordinate,
        width,
        height,
        bands,
        rows_per_band
    );

    let jobs = pixels
        .chunks_mut(rows_per_band * width)
        .enumerate()
        .map(|(band, chunk)| {
            let first_row = band * rows_per_band;
            Box::new(move || render_band(volume, coordinate, converter, width, first_row, chunk)) as Job<'_>
        })
        .collect::<Vec<_>>();
    executor.execute(jobs);

    pixels
}

fn render_band<V, T, C>(volume: &V, coordinate: &[i64], converter: &C, width: usize, first_row: usize, out: &mut [T])
where
    V: Volume,
    C: Converter<V::Sample, T>,
{
    let mut pos = vec![0i64; 2 + coordinate.len()];
    pos[2..].copy_from_slice(coordinate);

    for (row, line) in out.chunks_mut(width).enumerate() {
        pos[1] = (first_row + row) as i64;
        for (x, px) in line.iter_mut().enumerate() {
            pos[0] = x as i64;
            *px = converter.convert(volume.get(&pos));
        }
    }
}

/// Pins every dimension beyond 1 by slicing dimension 2 once per coordinate component.
pub fn plane<V: Volume>(volume: V, coordinate: &[i64]) -> Result<HyperSlice<V>> {
    coordinate
        .iter()
        .try_fold(HyperSlice::new(volume), |view, &c| view.slice(2, c))
}

/// Overwrites the plane at `coordinate` with the real values of `pixels`.
///
/// The plane is walked in its own flat order in lockstep with the buffer's row-major
/// order. Returns the number of elements written, which is 0 for volumes whose samples
/// are not real-valued.
pub fn scatter<V: VolumeMut>(pixels: GrayPixels<'_>, volume: V, coordinate: &[i64]) -> Result<usize> {
    let mut target = plane(volume, coordinate)?;
    let interval = target.interval().clone();
    if interval.len() != pixels.len() {
        return Err(StackError::LengthMismatch {
            expected: interval.len(),
            actual: pixels.len(),
        });
    }

    if !<V::Sample as Sample>::REAL {
        trace!("Plane {:?} holds non-real samples, nothing scattered", coordinate);
        return Ok(0);
    }

    let (mut i, mut written) = (0, 0);
    interval.for_each_position(|pos| {
        if let Some(value) = <V::Sample as Sample>::from_real(pixels.real(i)) {
            target.set(pos, value);
            written += 1;
        }
        i += 1;
    });
    trace!("Scattered {} values into plane {:?}", written, coordinate);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Clamp;
    use crate::stack::executor::{thread_pool, Sequential};
    use crate::volume::{ArrayVolume, FnVolume};

    fn volume() -> ArrayVolume<i32> {
        ArrayVolume::from_fn(vec![4, 3, 5], |p| (p[0] + 10 * p[1] + 100 * p[2]) as i32).unwrap()
    }

    #[test]
    fn test_render_row_major() {
        let v = volume();
        let pixels: Vec<u16> = render(&v, &[2], &Clamp, &Sequential);
        let expected = (0..3)
            .flat_map(|y| (0..4).map(move |x| (x + 10 * y + 200) as u16))
            .collect::<Vec<_>>();
        assert_eq!(pixels, expected);
    }

    #[test]
    fn test_render_is_independent_of_band_count() {
        let v = FnVolume::zero_based(vec![17, 13, 3], |p: &[i64]| (p[0] * 31 + p[1] * 7 + p[2]) as f64 / 3.0).unwrap();
        let reference: Vec<f32> = render(&v, &[1], &Clamp, &Sequential);
        for threads in [1, 2, 4, 16] {
            let pool = thread_pool(threads).unwrap();
            let pixels: Vec<f32> = render(&v, &[1], &Clamp, &pool);
            assert_eq!(
                pixels.iter().map(|p| p.to_bits()).collect::<Vec<_>>(),
                reference.iter().map(|p| p.to_bits()).collect::<Vec<_>>(),
                "{} threads",
                threads
            );
        }
    }

    #[test]
    fn test_render_empty_plane() {
        let v = ArrayVolume::<u8>::new(vec![0, 3], vec![]).unwrap();
        let pixels: Vec<u8> = render(&v, &[], &Clamp, &Sequential);
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_scatter_writes_only_the_addressed_plane() {
        let mut v = volume();
        let pixels = (0..12u16).collect::<Vec<_>>();
        let written = scatter(GrayPixels::U16(&pixels), &mut v, &[3]).unwrap();
        assert_eq!(written, 12);
        assert_eq!(v.get(&[1, 2, 3]), 9);
        assert_eq!(v.get(&[1, 2, 2]), 221);
        assert_eq!(v.get(&[1, 2, 4]), 421);
    }

    #[test]
    fn test_scatter_into_colour_volume_writes_nothing() {
        let mut v = ArrayVolume::new(vec![2, 1, 2], vec![[1u8, 2, 3]; 4]).unwrap();
        let pixels = [9u8, 9];
        assert_eq!(scatter(GrayPixels::U8(&pixels), &mut v, &[1]).unwrap(), 0);
        assert_eq!(v.data(), &[[1u8, 2, 3]; 4]);
    }

    #[test]
    fn test_scatter_length_mismatch() {
        let mut v = volume();
        let before = v.clone();
        let pixels = [0u8; 11];
        assert!(matches!(
            scatter(GrayPixels::U8(&pixels), &mut v, &[0]),
            Err(StackError::LengthMismatch {
                expected: 12,
                actual: 11
            })
        ));
        assert_eq!(v.data(), before.data());
    }
}
