//! raquet-stats - band decoding and summary statistics for raster tiles
//!
//! raquet-stats decodes raster band payloads stored as raw or gzip-compressed
//! blobs, one tile per row, and computes count/sum/mean/min/max/stddev over
//! the decoded grid with optional nodata exclusion.
//!
//! # Examples
//!
//! ## Explicit arguments
//!
//! ```
//! use raquet_stats::compute_stats;
//!
//! let stats = compute_stats(&[1, 2, 3, 4], "uint8", 2, 2, false, None)?;
//! assert_eq!(stats.count, 4);
//! assert_eq!(stats.mean, Some(2.5));
//! # Ok::<(), raquet_stats::Error>(())
//! ```
//!
//! ## Configuration from a descriptor
//!
//! ```
//! use raquet_stats::{RasterMetadata, StatsConfig, summarize};
//!
//! let meta = RasterMetadata::parse(
//!     r#"{"tiling":{"block_width":2,"block_height":1},"bands":[{"name":"dem","type":"int16","nodata":-1}]}"#,
//! );
//! let config = StatsConfig::for_band(&meta, 0)?;
//!
//! let band: Vec<u8> = [-1i16, 12].iter().flat_map(|v| v.to_le_bytes()).collect();
//! let stats = summarize(&band, &config)?;
//! assert_eq!(stats.count, 1);
//! assert_eq!(stats.max, Some(12.0));
//! # Ok::<(), raquet_stats::Error>(())
//! ```
//!
//! ## Row-wise evaluation
//!
//! ```
//! use raquet_stats::adapter::summary_stats_with_metadata;
//!
//! // A null or undecodable row is None rather than an error.
//! assert!(summary_stats_with_metadata(None, "{}").is_none());
//! ```

pub mod adapter;
pub mod band;
pub mod compression;
pub mod error;
pub mod io;
pub mod metadata;
pub mod stats;
pub mod types;

pub use band::{decode_band, decode_pixel, BandBuffer, DecodedBand, PixelGrid};
pub use compression::Compression;
pub use error::{Error, Result};
pub use metadata::{BandDescriptor, BandInfo, RasterMetadata};
pub use stats::{compute_stats, summarize, BandStats, Nodata, StatsConfig};
pub use types::{Dimensions, PixelType};
