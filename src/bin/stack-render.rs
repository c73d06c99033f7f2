use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ParallelProgressIterator, ProgressStyle};
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use virtual_stack::converter::{Clamp, Converter, LinearRange};
use virtual_stack::stack::slice_count;
use virtual_stack::tiff_io::{self, TiffVolume};
use virtual_stack::volume::{FnVolume, Volume};
use virtual_stack::{PixelKind, PixelType, RenderConfig, VirtualStack};

#[derive(Parser, Debug)]
#[command(name = "stack-render", about = "Render slices of N-dimensional volumes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print shape and slice count of a volume
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Render slices into a multi-page TIFF, or a single slice into a PNG
    Render {
        #[command(flatten)]
        source: SourceArgs,
        /// Output file; `.png` requires --slice and 8 or 16 bit pixels
        output: PathBuf,
        /// Only render this zero-based slice
        #[arg(long)]
        slice: Option<i64>,
        /// Render config as inline JSON or path to a JSON file
        #[arg(long)]
        config: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<Kind>,
        /// Display range mapped onto the full pixel scale, e.g. `--range 0 4096`
        #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
        range: Option<Vec<f64>>,
        /// Worker threads per slice, 0 for one per core
        #[arg(long)]
        threads: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Multi-page grayscale TIFF
    #[arg(short, long, required_unless_present = "synthetic")]
    input: Option<PathBuf>,
    /// Generate a volume of this shape instead, e.g. `256x256x10x3`
    #[arg(long, conflicts_with = "input")]
    synthetic: Option<String>,
    /// Split the TIFF page axis into these dimensions, e.g. `10x3`
    #[arg(long, requires = "input")]
    shape: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    U8,
    U16,
    F32,
}
impl From<Kind> for PixelKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::U8 => PixelKind::U8,
            Kind::U16 => PixelKind::U16,
            Kind::F32 => PixelKind::F32,
        }
    }
}

struct Output<'a> {
    path: &'a Path,
    slice: Option<i64>,
}

fn parse_shape(shape: &str) -> Result<Vec<usize>> {
    shape
        .split('x')
        .map(|d| d.trim().parse::<usize>().with_context(|| format!("Invalid extent '{}' in shape '{}'", d, shape)))
        .collect()
}

/// Sum of `coordinate[d] * 10^d`, so every digit tells one coordinate.
fn synthetic(dims: Vec<usize>) -> Result<FnVolume<impl Fn(&[i64]) -> f64 + Sync>> {
    let f = |p: &[i64]| {
        p.iter()
            .enumerate()
            .map(|(d, &c)| c as f64 * 10f64.powi(d as i32))
            .sum::<f64>()
    };
    Ok(FnVolume::zero_based(dims, f)?)
}

fn load(source: &SourceArgs) -> Result<Loaded> {
    if let Some(shape) = &source.synthetic {
        return Ok(Loaded::Synthetic(parse_shape(shape)?));
    }
    let Some(input) = &source.input else {
        bail!("Either --input or --synthetic is required");
    };
    let higher = source.shape.as_deref().map(parse_shape).transpose()?;
    let volume = tiff_io::read_stack(input, higher.as_deref())
        .with_context(|| format!("Failed to read stack from {}", input.display()))?;
    Ok(Loaded::Tiff(volume))
}

enum Loaded {
    Synthetic(Vec<usize>),
    Tiff(TiffVolume),
}

fn export<V, T, C>(volume: V, converter: C, config: &RenderConfig, output: &Output<'_>) -> Result<()>
where
    V: Volume,
    T: PixelType,
    C: Converter<V::Sample, T>,
{
    let stack = VirtualStack::<_, T, _>::new(volume, converter)?.with_executor(config.executor()?);
    let (width, height) = (stack.width(), stack.height());

    if let Some(index) = output.slice {
        let pixels = stack.read_slice(index)?;
        if output.path.extension().is_some_and(|e| e.eq_ignore_ascii_case("png")) {
            let image = pixels
                .to_image(width as u32, height as u32)
                .with_context(|| format!("{:?} slices cannot be saved as PNG", stack.pixel_kind()))?;
            image
                .save(output.path)
                .with_context(|| format!("Failed to write {}", output.path.display()))?;
        } else {
            tiff_io::write_pages(output.path, width, height, [pixels])?;
        }
        info!("Wrote slice {} to {}", index, output.path.display());
        return Ok(());
    }

    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:80.cyan/blue} {pos}/{len} ({eta}) {msg}")?;
    let pages = (0..stack.len())
        .into_par_iter()
        .progress_with_style(style)
        .with_message("Rendering slices")
        .map(|i| stack.read_slice(i as i64))
        .collect::<Result<Vec<_>, _>>()?;
    let count = tiff_io::write_pages(output.path, width, height, pages)
        .with_context(|| format!("Failed to write {}", output.path.display()))?;
    info!("Wrote {} slices of {}x{} to {}", count, width, height, output.path.display());
    Ok(())
}

fn render<V: Volume>(volume: V, config: &RenderConfig, output: &Output<'_>) -> Result<()> {
    let range = config.range.map(|[min, max]| LinearRange::new(min, max));
    match (config.pixel_kind, range) {
        (PixelKind::U8, None) => export::<_, u8, _>(volume, Clamp, config, output),
        (PixelKind::U8, Some(r)) => export::<_, u8, _>(volume, r, config, output),
        (PixelKind::U16, None) => export::<_, u16, _>(volume, Clamp, config, output),
        (PixelKind::U16, Some(r)) => export::<_, u16, _>(volume, r, config, output),
        (PixelKind::F32, None) => export::<_, f32, _>(volume, Clamp, config, output),
        (PixelKind::F32, Some(r)) => export::<_, f32, _>(volume, r, config, output),
        (PixelKind::Rgb, _) => bail!("RGB slices cannot be rendered"),
    }
}

fn print_info(dims: &[usize], kind: &str) -> Result<()> {
    if dims.len() < 2 {
        bail!("Shape {} has fewer than 2 dimensions", dims.iter().join("x"));
    }
    let slices = slice_count(&dims[2..]).context("Slice count overflows")?;
    println!("shape:  {}", dims.iter().join("x"));
    println!("slices: {} of {}x{}", slices, dims[0], dims[1]);
    println!("source: {}", kind);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Info { source } => match load(&source)? {
            Loaded::Synthetic(dims) => print_info(&dims, "synthetic f64")?,
            Loaded::Tiff(volume) => print_info(volume.dims(), &format!("{:?}", volume.pixel_kind()))?,
        },
        Command::Render {
            source,
            output,
            slice,
            config,
            kind,
            range,
            threads,
        } => {
            let mut config = match config {
                Some(c) => RenderConfig::from_json_or_path(&c).context("Failed to load render config")?,
                None => RenderConfig::default(),
            };
            if let Some(kind) = kind {
                config.pixel_kind = kind.into();
            }
            if let Some(range) = range {
                config.range = Some([range[0], range[1]]);
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            info!("Render config: {:?}", config);

            let output = Output { path: &output, slice };
            match load(&source)? {
                Loaded::Synthetic(dims) => render(synthetic(dims)?, &config, &output)?,
                Loaded::Tiff(TiffVolume::U8(v)) => render(v, &config, &output)?,
                Loaded::Tiff(TiffVolume::U16(v)) => render(v, &config, &output)?,
                Loaded::Tiff(TiffVolume::F32(v)) => render(v, &config, &output)?,
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    run(Cli::parse())
}
