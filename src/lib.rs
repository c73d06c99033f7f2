#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod converter;
pub mod error;
pub mod pixels;
pub mod stack;
pub mod tiff_io;
pub mod volume;

pub use config::RenderConfig;
pub use error::{Result, StackError};
pub use pixels::{PixelBuffer, PixelKind, PixelType};
pub use stack::{ImageStack, ImageStackMut, VirtualStack, WriteOutcome};
