use std::error::Error as StdError;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use raquet_stats::adapter::{summary_stats, summary_stats_for_band, summary_stats_with_metadata};
use raquet_stats::io::{read_descriptor, BandFile};
use raquet_stats::{
    BandBuffer, Compression, DecodedBand, Dimensions, Error, PixelType, RasterMetadata, StatsConfig,
};

/// Summary statistics for a single raster band payload
#[derive(Parser, Debug)]
#[command(name = "raquet-stats", version, about = "Decode a raster band and print its statistics")]
struct Args {
    /// Path to the raw or gzip-compressed band payload
    band: PathBuf,

    /// Descriptor file supplying pixel type, block size, compression and nodata
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Band to use from the descriptor's band list (defaults to the first)
    #[arg(short, long, allow_hyphen_values = true)]
    band_index: Option<i32>,

    /// Pixel type when no descriptor is given
    #[arg(long, default_value = "uint8")]
    pixel_type: String,

    /// Block width when no descriptor is given
    #[arg(long)]
    width: Option<i32>,

    /// Block height when no descriptor is given
    #[arg(long)]
    height: Option<i32>,

    /// Compression when no descriptor is given
    #[arg(long, default_value = "none")]
    compression: String,

    /// Nodata sentinel when no descriptor is given ("nan" allowed)
    #[arg(long, allow_hyphen_values = true)]
    nodata: Option<f64>,

    /// Print the single pixel at X,Y instead of statistics
    #[arg(long, value_parser = parse_pixel)]
    pixel: Option<(u32, u32)>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn parse_pixel(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad X '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y '{}': {}", y, e))?;
    Ok((x, y))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the band configuration the same way the row-wise overloads do
fn resolve_config(args: &Args, descriptor: Option<&str>) -> Result<StatsConfig, Error> {
    match descriptor {
        Some(text) => {
            let meta = RasterMetadata::parse(text);
            match args.band_index {
                Some(index) => {
                    let index = usize::try_from(index).map_err(|_| {
                        Error::InvalidInput(format!("band index {} is negative", index))
                    })?;
                    StatsConfig::for_band(&meta, index)
                }
                None => StatsConfig::from_metadata(&meta),
            }
        }
        None => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err(Error::InvalidInput(
                    "--width and --height are required without --metadata".to_string(),
                ));
            };
            Ok(StatsConfig::new(
                PixelType::parse(&args.pixel_type)?,
                Dimensions::from_signed(width.into(), height.into())?,
                Compression::from_name(&args.compression),
                args.nodata,
            ))
        }
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let band = BandFile::open(&args.band)?;
    let descriptor = args.metadata.as_ref().map(read_descriptor).transpose()?;

    if let Some((x, y)) = args.pixel {
        let config = resolve_config(&args, descriptor.as_deref())?;
        let buffer = BandBuffer::new(band.bytes(), config.compression);
        let decoded = DecodedBand::decode(&buffer, config.pixel_type, config.dimensions)?;
        println!("{}", serde_json::to_string(&decoded.pixel(x, y)?)?);
        return Ok(());
    }

    let stats = match (descriptor.as_deref(), args.band_index) {
        (Some(text), Some(index)) => summary_stats_for_band(Some(band.bytes()), text, index)?,
        (Some(text), None) => summary_stats_with_metadata(Some(band.bytes()), text),
        (None, _) => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                return Err("--width and --height are required without --metadata".into());
            };
            summary_stats(
                Some(band.bytes()),
                &args.pixel_type,
                width,
                height,
                &args.compression,
                args.nodata,
            )
        }
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
