//! Row-wise entry points for a host query engine.
//!
//! Each function evaluates one row. A null or empty band, and any decode
//! failure inside the row, yields `None` for that row. Only a violated call
//! contract (an explicit band index past the declared bands) is an error.

use rayon::prelude::*;
use tracing::warn;

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::metadata::RasterMetadata;
use crate::stats::{summarize, BandStats, StatsConfig};
use crate::types::{Dimensions, PixelType};

/// Stats for a band described by explicit arguments.
///
/// `nodata` of None disables filtering; NaN skips NaN samples.
pub fn summary_stats(
    band: Option<&[u8]>,
    pixel_type: &str,
    width: i32,
    height: i32,
    compression: &str,
    nodata: Option<f64>,
) -> Option<BandStats> {
    let band = non_empty(band)?;
    row_result(
        explicit_config(pixel_type, width, height, compression, nodata)
            .and_then(|config| summarize(band, &config)),
    )
}

/// Stats for a band described by explicit arguments, without nodata filtering
pub fn summary_stats_simple(
    band: Option<&[u8]>,
    pixel_type: &str,
    width: i32,
    height: i32,
    compression: &str,
) -> Option<BandStats> {
    summary_stats(band, pixel_type, width, height, compression, None)
}

/// Stats for the first band declared in `metadata`
pub fn summary_stats_with_metadata(band: Option<&[u8]>, metadata: &str) -> Option<BandStats> {
    let band = non_empty(band)?;
    let meta = RasterMetadata::parse(metadata);
    row_result(StatsConfig::from_metadata(&meta).and_then(|config| summarize(band, &config)))
}

/// Stats for the band at `band_index` of `metadata`.
///
/// A negative index yields `None`; an index past the declared bands is an
/// [`Error::InvalidInput`].
pub fn summary_stats_for_band(
    band: Option<&[u8]>,
    metadata: &str,
    band_index: i32,
) -> Result<Option<BandStats>> {
    let (Some(band), Ok(index)) = (non_empty(band), usize::try_from(band_index)) else {
        return Ok(None);
    };

    let meta = RasterMetadata::parse(metadata);
    if index >= meta.bands.len() {
        return Err(Error::InvalidInput(format!(
            "band index {} out of range for {} declared bands",
            band_index,
            meta.bands.len()
        )));
    }

    Ok(row_result(
        StatsConfig::for_band(&meta, index).and_then(|config| summarize(band, &config)),
    ))
}

/// Arguments selecting one of the row-wise overloads
#[derive(Debug, Clone, PartialEq)]
pub enum StatsRequest {
    Explicit {
        pixel_type: String,
        width: i32,
        height: i32,
        compression: String,
        nodata: Option<f64>,
    },
    Metadata {
        metadata: String,
    },
    MetadataBand {
        metadata: String,
        band_index: i32,
    },
}

/// One input row: a band payload plus the request describing it
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    pub band: Option<Vec<u8>>,
    pub request: StatsRequest,
}

impl StatsRow {
    pub fn evaluate(&self) -> Result<Option<BandStats>> {
        let band = self.band.as_deref();
        match &self.request {
            StatsRequest::Explicit {
                pixel_type,
                width,
                height,
                compression,
                nodata,
            } => Ok(summary_stats(band, pixel_type, *width, *height, compression, *nodata)),
            StatsRequest::Metadata { metadata } => Ok(summary_stats_with_metadata(band, metadata)),
            StatsRequest::MetadataBand {
                metadata,
                band_index,
            } => summary_stats_for_band(band, metadata, *band_index),
        }
    }
}

/// Evaluates every row in parallel, preserving row order
pub fn summarize_rows(rows: &[StatsRow]) -> Result<Vec<Option<BandStats>>> {
    rows.par_iter().map(StatsRow::evaluate).collect()
}

fn explicit_config(
    pixel_type: &str,
    width: i32,
    height: i32,
    compression: &str,
    nodata: Option<f64>,
) -> Result<StatsConfig> {
    Ok(StatsConfig::new(
        PixelType::parse(pixel_type)?,
        Dimensions::from_signed(width.into(), height.into())?,
        Compression::from_name(compression),
        nodata,
    ))
}

fn non_empty(band: Option<&[u8]>) -> Option<&[u8]> {
    band.filter(|bytes| !bytes.is_empty())
}

fn row_result(result: Result<BandStats>) -> Option<BandStats> {
    match result {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!(error = %e, "band stats row is null");
            None
        }
    }
}
