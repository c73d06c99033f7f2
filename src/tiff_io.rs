//! Multi-page grayscale TIFF stacks: one page per slice.

use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;

use crate::error::{Result, StackError};
use crate::pixels::{PixelBuffer, PixelKind};
use crate::stack::ImageStack;
use crate::volume::{PlanarVolume, Volume};

/// A stack loaded from disk, typed by the storage of its pages.
#[derive(Debug, Clone)]
pub enum TiffVolume {
    U8(PlanarVolume<u8>),
    U16(PlanarVolume<u16>),
    F32(PlanarVolume<f32>),
}
impl TiffVolume {
    pub fn pixel_kind(&self) -> PixelKind {
        match self {
            TiffVolume::U8(_) => PixelKind::U8,
            TiffVolume::U16(_) => PixelKind::U16,
            TiffVolume::F32(_) => PixelKind::F32,
        }
    }
    pub fn dims(&self) -> &[usize] {
        match self {
            TiffVolume::U8(v) => v.interval().dims(),
            TiffVolume::U16(v) => v.interval().dims(),
            TiffVolume::F32(v) => v.interval().dims(),
        }
    }
}

enum Pages {
    U8(Vec<Vec<u8>>),
    U16(Vec<Vec<u16>>),
    F32(Vec<Vec<f32>>),
}

/// Reads every page of `path`. The page axis becomes dimension 2, or is split into
/// `higher_dims` (dimension 2 fastest) when given.
pub fn read_stack(path: &Path, higher_dims: Option<&[usize]>) -> Result<TiffVolume> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let (width, height) = decoder.dimensions()?;
    let mut pages: Option<Pages> = None;

    loop {
        if decoder.dimensions()? != (width, height) {
            return Err(StackError::UnsupportedTiff(format!(
                "page size {:?} differs from first page {}x{}",
                decoder.dimensions()?,
                width,
                height
            )));
        }
        match decoder.colortype()? {
            ColorType::Gray(_) => {}
            other => return Err(StackError::UnsupportedTiff(format!("colour type {:?}", other))),
        }

        let page = decoder.read_image()?;
        pages = Some(match (pages.take(), page) {
            (None, DecodingResult::U8(p)) => Pages::U8(vec![p]),
            (None, DecodingResult::U16(p)) => Pages::U16(vec![p]),
            (None, DecodingResult::F32(p)) => Pages::F32(vec![p]),
            (Some(Pages::U8(mut all)), DecodingResult::U8(p)) => {
                all.push(p);
                Pages::U8(all)
            }
            (Some(Pages::U16(mut all)), DecodingResult::U16(p)) => {
                all.push(p);
                Pages::U16(all)
            }
            (Some(Pages::F32(mut all)), DecodingResult::F32(p)) => {
                all.push(p);
                Pages::F32(all)
            }
            (None, _) => return Err(StackError::UnsupportedTiff("sample format".into())),
            (Some(_), _) => return Err(StackError::UnsupportedTiff("pages differ in sample format".into())),
        });

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let pages = pages.ok_or_else(|| StackError::UnsupportedTiff("no pages".into()))?;
    let count = match &pages {
        Pages::U8(p) => p.len(),
        Pages::U16(p) => p.len(),
        Pages::F32(p) => p.len(),
    };
    let mut dims = vec![width as usize, height as usize];
    match higher_dims {
        Some(higher) => dims.extend_from_slice(higher),
        None => dims.push(count),
    }
    info!("Read {} pages of {}x{} from {}, shape {:?}", count, width, height, path.display(), dims);

    Ok(match pages {
        Pages::U8(p) => TiffVolume::U8(PlanarVolume::new(dims, p)?),
        Pages::U16(p) => TiffVolume::U16(PlanarVolume::new(dims, p)?),
        Pages::F32(p) => TiffVolume::F32(PlanarVolume::new(dims, p)?),
    })
}

/// Writes `pages` of `width` x `height` pixels as a multi-page TIFF.
pub fn write_pages<I>(path: &Path, width: usize, height: usize, pages: I) -> Result<usize>
where
    I: IntoIterator<Item = PixelBuffer>,
{
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    let (w, h) = (width as u32, height as u32);
    let mut count = 0;
    for page in pages {
        if page.len() != width * height {
            return Err(StackError::LengthMismatch {
                expected: width * height,
                actual: page.len(),
            });
        }
        match &page {
            PixelBuffer::U8(p) => encoder.write_image::<colortype::Gray8>(w, h, p)?,
            PixelBuffer::U16(p) => encoder.write_image::<colortype::Gray16>(w, h, p)?,
            PixelBuffer::F32(p) => encoder.write_image::<colortype::Gray32Float>(w, h, p)?,
            PixelBuffer::Rgb(p) => {
                let bytes = p
                    .iter()
                    .flat_map(|c| [(c >> 16) as u8, (c >> 8) as u8, *c as u8])
                    .collect::<Vec<_>>();
                encoder.write_image::<colortype::RGB8>(w, h, &bytes)?
            }
        }
        count += 1;
    }
    debug!("Wrote {} pages to {}", count, path.display());
    Ok(count)
}

/// Renders every slice of `stack` in order and writes them as a multi-page TIFF.
pub fn write_stack(path: &Path, stack: &dyn ImageStack) -> Result<usize> {
    let pages = (1..=stack.size()).map(|n| stack.pixels(n)).collect::<Result<Vec<_>>>()?;
    write_pages(path, stack.width(), stack.height(), pages)
}
