use crate::pixels::PixelType;
use crate::volume::Sample;

/// Maps a source sample to a target pixel. Shared across render bands, so `Sync`.
pub trait Converter<S, T>: Sync {
    fn convert(&self, input: S) -> T;
}

impl<S, T, F> Converter<S, T> for F
where
    F: Fn(S) -> T + Sync,
{
    fn convert(&self, input: S) -> T {
        self(input)
    }
}

/// Identity on real values, rounded and saturated into the target range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clamp;

impl<S: Sample, T: PixelType> Converter<S, T> for Clamp {
    fn convert(&self, input: S) -> T {
        input.to_real().and_then(T::from_real).unwrap_or_default()
    }
}

/// Maps the display range `[min, max]` linearly onto the full scale of the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRange {
    pub min: f64,
    pub max: f64,
}
impl LinearRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn fraction(&self, v: f64) -> f64 {
        if self.max <= self.min {
            if v >= self.max {
                1.0
            } else {
                0.0
            }
        } else {
            ((v - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }
}

impl<S: Sample, T: PixelType> Converter<S, T> for LinearRange {
    fn convert(&self, input: S) -> T {
        input
            .to_real()
            .and_then(|v| T::from_real(self.fraction(v) * T::FULL_SCALE))
            .unwrap_or_default()
    }
}

/// Gray value of an RGB(A) sample (Rec. 601 weights); alpha is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Luminance;

impl<const N: usize, T: PixelType> Converter<[u8; N], T> for Luminance {
    fn convert(&self, input: [u8; N]) -> T {
        if N < 3 {
            return T::default();
        }
        let luma = 0.299 * input[0] as f64 + 0.587 * input[1] as f64 + 0.114 * input[2] as f64;
        T::from_real(luma * T::FULL_SCALE / 255.0).unwrap_or_default()
    }
}
