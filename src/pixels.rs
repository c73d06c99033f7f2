use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StackError};
use crate::volume::Sample;

/// Storage kind of a dense plane buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelKind {
    U8,
    U16,
    F32,
    /// Packed `0x00RRGGBB` colour, as held by colour stacks. Never produced by rendering.
    Rgb,
}
impl PixelKind {
    pub fn bit_depth(self) -> u8 {
        match self {
            PixelKind::U8 => 8,
            PixelKind::U16 => 16,
            PixelKind::F32 => 32,
            PixelKind::Rgb => 24,
        }
    }
}

/// One plane in row-major order, dimension 0 varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    Rgb(Vec<u32>),
}

/// Borrowed view of a buffer in one of the three real-valued storage kinds.
#[derive(Debug, Clone, Copy)]
pub enum GrayPixels<'a> {
    U8(&'a [u8]),
    U16(&'a [u16]),
    F32(&'a [f32]),
}
impl GrayPixels<'_> {
    pub fn len(&self) -> usize {
        match self {
            GrayPixels::U8(p) => p.len(),
            GrayPixels::U16(p) => p.len(),
            GrayPixels::F32(p) => p.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Real value at `i`; integer storage is read as unsigned.
    pub fn real(&self, i: usize) -> f64 {
        match self {
            GrayPixels::U8(p) => p[i] as f64,
            GrayPixels::U16(p) => p[i] as f64,
            GrayPixels::F32(p) => p[i] as f64,
        }
    }
}

impl PixelBuffer {
    pub fn kind(&self) -> PixelKind {
        match self {
            PixelBuffer::U8(_) => PixelKind::U8,
            PixelBuffer::U16(_) => PixelKind::U16,
            PixelBuffer::F32(_) => PixelKind::F32,
            PixelBuffer::Rgb(_) => PixelKind::Rgb,
        }
    }
    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(p) => p.len(),
            PixelBuffer::U16(p) => p.len(),
            PixelBuffer::F32(p) => p.len(),
            PixelBuffer::Rgb(p) => p.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interprets the buffer as real values, failing for any kind but u8, u16 and f32.
    pub fn gray(&self) -> Result<GrayPixels<'_>> {
        match self {
            PixelBuffer::U8(p) => Ok(GrayPixels::U8(p)),
            PixelBuffer::U16(p) => Ok(GrayPixels::U16(p)),
            PixelBuffer::F32(p) => Ok(GrayPixels::F32(p)),
            PixelBuffer::Rgb(_) => Err(StackError::UnsupportedPixelKind(PixelKind::Rgb)),
        }
    }

    /// Converts to an `image` buffer. Float planes have no lossless 8/16 bit
    /// representation and yield `None`, as does a size mismatch.
    pub fn to_image(&self, width: u32, height: u32) -> Option<DynamicImage> {
        match self {
            PixelBuffer::U8(p) => GrayImage::from_raw(width, height, p.clone()).map(DynamicImage::ImageLuma8),
            PixelBuffer::U16(p) => ImageBuffer::<Luma<u16>, _>::from_raw(width, height, p.clone())
                .map(DynamicImage::ImageLuma16),
            PixelBuffer::F32(_) => None,
            PixelBuffer::Rgb(p) => {
                let bytes = p
                    .iter()
                    .flat_map(|c| [(c >> 16) as u8, (c >> 8) as u8, *c as u8])
                    .collect::<Vec<_>>();
                RgbImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgb8)
            }
        }
    }

    /// Converts from an `image` buffer; unknown layouts are converted to float gray.
    pub fn from_image(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(i) => PixelBuffer::U8(i.as_raw().clone()),
            DynamicImage::ImageLuma16(i) => PixelBuffer::U16(i.as_raw().clone()),
            DynamicImage::ImageRgb8(i) => PixelBuffer::Rgb(
                i.pixels()
                    .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
                    .collect(),
            ),
            other => PixelBuffer::F32(other.to_luma32f().into_raw()),
        }
    }
}

/// Target element type of rendered planes.
pub trait PixelType: Sample + Default {
    const KIND: PixelKind;
    /// Real value of full intensity: the type maximum for integers, 1.0 for floats.
    const FULL_SCALE: f64;

    fn into_buffer(pixels: Vec<Self>) -> PixelBuffer;
}
impl PixelType for u8 {
    const FULL_SCALE: f64 = 255.0;
    const KIND: PixelKind = PixelKind::U8;
    fn into_buffer(pixels: Vec<Self>) -> PixelBuffer {
        PixelBuffer::U8(pixels)
    }
}
impl PixelType for u16 {
    const FULL_SCALE: f64 = 65535.0;
    const KIND: PixelKind = PixelKind::U16;
    fn into_buffer(pixels: Vec<Self>) -> PixelBuffer {
        PixelBuffer::U16(pixels)
    }
}
impl PixelType for f32 {
    const FULL_SCALE: f64 = 1.0;
    const KIND: PixelKind = PixelKind::F32;
    fn into_buffer(pixels: Vec<Self>) -> PixelBuffer {
        PixelBuffer::F32(pixels)
    }
}
