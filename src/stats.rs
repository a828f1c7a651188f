//! Streaming band statistics
//!
//! Samples are read straight out of the decompressed byte buffer and folded
//! into a running accumulator; no f64 grid is materialized. Variance uses
//! Welford's online update.

use serde::{Deserialize, Serialize};

use crate::band::{BandBuffer, DecodedBand};
use crate::compression::Compression;
use crate::error::Result;
use crate::metadata::RasterMetadata;
use crate::types::{Dimensions, PixelType};

/// Summary statistics over the non-nodata samples of one band.
///
/// `mean`, `min`, `max` and `stddev` are None when `count` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStats {
    pub count: u64,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub stddev: Option<f64>,
}

/// Nodata filter applied before a sample is counted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Nodata {
    /// Every sample is counted
    #[default]
    Disabled,
    /// Samples exactly equal to the sentinel are skipped
    Value(f64),
    /// NaN sentinel: every NaN sample is skipped
    NaN,
}

impl Nodata {
    pub fn from_option(nodata: Option<f64>) -> Self {
        match nodata {
            None => Nodata::Disabled,
            Some(value) if value.is_nan() => Nodata::NaN,
            Some(value) => Nodata::Value(value),
        }
    }

    /// True when `value` is nodata under this filter
    #[inline]
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Nodata::Disabled => false,
            Nodata::Value(sentinel) => value == sentinel,
            Nodata::NaN => value.is_nan(),
        }
    }
}

/// Running count, sum, extrema and second moment
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAccumulator {
    count: u64,
    sum: f64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: f64) {
        // NaN sticks in both extrema regardless of where it appears.
        if self.count == 0 || value.is_nan() {
            self.min = value;
            self.max = value;
        } else {
            if value < self.min {
                self.min = value;
            }
            if value > self.max {
                self.max = value;
            }
        }

        self.count += 1;
        self.sum += value;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn finish(&self) -> BandStats {
        if self.count == 0 {
            return BandStats {
                count: 0,
                sum: 0.0,
                mean: None,
                min: None,
                max: None,
                stddev: None,
            };
        }

        let n = self.count as f64;
        let variance = self.m2 / n;
        let stddev = if variance.is_nan() {
            f64::NAN
        } else {
            variance.max(0.0).sqrt()
        };
        BandStats {
            count: self.count,
            sum: self.sum,
            mean: Some(self.sum / n),
            min: Some(self.min),
            max: Some(self.max),
            stddev: Some(stddev),
        }
    }
}

impl Extend<f64> for StatsAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

/// Everything needed to summarize one band buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsConfig {
    pub pixel_type: PixelType,
    pub dimensions: Dimensions,
    pub compression: Compression,
    pub nodata: Nodata,
}

impl StatsConfig {
    pub fn new(
        pixel_type: PixelType,
        dimensions: Dimensions,
        compression: Compression,
        nodata: Option<f64>,
    ) -> Self {
        Self {
            pixel_type,
            dimensions,
            compression,
            nodata: Nodata::from_option(nodata),
        }
    }

    /// Config for the first declared band, `uint8` when none is declared
    pub fn from_metadata(meta: &RasterMetadata) -> Result<Self> {
        if meta.bands.is_empty() {
            return Ok(Self::new(
                PixelType::Uint8,
                meta.dimensions()?,
                meta.compression,
                None,
            ));
        }
        Self::for_band(meta, 0)
    }

    /// Config for the band at `index`
    pub fn for_band(meta: &RasterMetadata, index: usize) -> Result<Self> {
        let pixel_type = PixelType::parse(meta.band_type(index)?)?;
        Ok(Self::new(
            pixel_type,
            meta.dimensions()?,
            meta.compression,
            meta.nodata(index),
        ))
    }
}

/// Summarizes `band` as configured.
///
/// The payload is decompressed once; samples are then visited row-major.
pub fn summarize(band: &[u8], config: &StatsConfig) -> Result<BandStats> {
    let buffer = BandBuffer::new(band, config.compression);
    let decoded = DecodedBand::decode(&buffer, config.pixel_type, config.dimensions)?;

    let mut acc = StatsAccumulator::new();
    acc.extend(decoded.grid().values().filter(|v| !config.nodata.matches(*v)));
    Ok(acc.finish())
}

/// Computes band statistics from loosely typed arguments.
///
/// `nodata` of None disables filtering; a NaN sentinel skips NaN samples.
pub fn compute_stats(
    band: &[u8],
    pixel_type: &str,
    width: i32,
    height: i32,
    compressed: bool,
    nodata: Option<f64>,
) -> Result<BandStats> {
    let config = StatsConfig::new(
        PixelType::parse(pixel_type)?,
        Dimensions::from_signed(width.into(), height.into())?,
        Compression::from_flag(compressed),
        nodata,
    );
    summarize(band, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::decode_band;
    use crate::error::Error;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn f64_bytes(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Deterministic pseudo-random samples in [-500, 500)
    fn noise(n: usize) -> Vec<f32> {
        let mut state = 0x2545_f491_u32;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 100_000) as f32 / 100.0 - 500.0
            })
            .collect()
    }

    #[test]
    fn test_uint8_2x2() {
        let stats = compute_stats(&[1, 2, 3, 4], "uint8", 2, 2, false, None).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.sum, 10.0);
        assert_eq!(stats.mean, Some(2.5));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(4.0));
        assert!((stats.stddev.unwrap() - 1.118_034).abs() < 1e-6);
    }

    #[test]
    fn test_all_nodata() {
        let stats = compute_stats(&[7, 7, 7, 7], "uint8", 2, 2, false, Some(7.0)).unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.sum, 0.0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.stddev, None);
    }

    #[test]
    fn test_nodata_exact_match() {
        let data = f64_bytes(&[-9999.0, 1.0, -9999.000001, 3.0]);
        let stats = compute_stats(&data, "float64", 4, 1, false, Some(-9999.0)).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, Some(-9999.000001));
    }

    #[test]
    fn test_nan_nodata() {
        let data = f32_bytes(&[f32::NAN, 2.0, f32::NAN, 4.0]);
        let stats = compute_stats(&data, "float32", 2, 2, false, Some(f64::NAN)).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.sum, 6.0);
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.stddev, Some(1.0));
    }

    #[test]
    fn test_nan_counted_without_filter() {
        let data = f32_bytes(&[f32::NAN, 2.0]);
        let stats = compute_stats(&data, "float32", 2, 1, false, None).unwrap();
        assert_eq!(stats.count, 2);
        assert!(stats.sum.is_nan());
    }

    #[test]
    fn test_leading_nan_propagates() {
        let data = f64_bytes(&[f64::NAN, 2.0]);
        let stats = compute_stats(&data, "float64", 2, 1, false, None).unwrap();
        assert_eq!(stats.count, 2);
        assert!(stats.mean.unwrap().is_nan());
        assert!(stats.min.unwrap().is_nan());
        assert!(stats.max.unwrap().is_nan());
        assert!(stats.stddev.unwrap().is_nan());
    }

    #[test]
    fn test_inner_nan_propagates() {
        let data = f64_bytes(&[2.0, f64::NAN, 1.0]);
        let stats = compute_stats(&data, "float64", 3, 1, false, None).unwrap();
        assert_eq!(stats.count, 3);
        assert!(stats.min.unwrap().is_nan());
        assert!(stats.max.unwrap().is_nan());
        assert!(stats.stddev.unwrap().is_nan());
    }

    #[test]
    fn test_infinite_sample() {
        let data = f64_bytes(&[f64::INFINITY, 1.0]);
        let stats = compute_stats(&data, "float64", 2, 1, false, None).unwrap();
        assert_eq!(stats.mean, Some(f64::INFINITY));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(f64::INFINITY));
        assert!(stats.stddev.unwrap().is_nan());

        // Two-pass gives NaN as well: (inf - inf)^2.
        let mean = f64::INFINITY;
        let two_pass = (((f64::INFINITY - mean).powi(2) + (1.0 - mean).powi(2)) / 2.0).sqrt();
        assert!(two_pass.is_nan());
    }

    #[test]
    fn test_matches_two_pass() {
        let samples = noise(64 * 64);
        let data = gzip(&f32_bytes(&samples));

        let stats = compute_stats(&data, "float32", 64, 64, true, Some(0.0)).unwrap();

        let grid = decode_band(&data, "float32", 64, 64, true).unwrap();
        let kept: Vec<f64> = grid.into_iter().filter(|v| *v != 0.0).collect();
        let n = kept.len() as f64;
        let sum: f64 = kept.iter().sum();
        let mean = sum / n;
        let min = kept.iter().copied().fold(f64::INFINITY, f64::min);
        let max = kept.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = kept.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        assert_eq!(stats.count, kept.len() as u64);
        assert_eq!(stats.sum, sum);
        assert_eq!(stats.mean, Some(mean));
        assert_eq!(stats.min, Some(min));
        assert_eq!(stats.max, Some(max));
        assert!((stats.stddev.unwrap() - variance.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_stable_with_large_offset() {
        let data = f64_bytes(&[1e9 + 1.0, 1e9 + 2.0, 1e9 + 3.0, 1e9 + 4.0]);
        let stats = compute_stats(&data, "float64", 2, 2, false, None).unwrap();
        assert!((stats.stddev.unwrap() - 1.25f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_corrupt_stream_fails() {
        let err = compute_stats(&[1, 2, 3, 4], "uint8", 2, 2, true, None).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
    }

    #[test]
    fn test_short_buffer_fails() {
        let err = compute_stats(&[1, 2, 3], "uint8", 2, 2, false, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_nodata_filter() {
        assert!(!Nodata::from_option(None).matches(f64::NAN));
        assert!(Nodata::from_option(Some(f64::NAN)).matches(f64::NAN));
        assert!(!Nodata::from_option(Some(f64::NAN)).matches(0.0));
        assert!(Nodata::from_option(Some(0.0)).matches(-0.0));
        assert!(!Nodata::from_option(Some(1.0)).matches(f64::NAN));
    }

    #[test]
    fn test_config_from_metadata() {
        let meta = RasterMetadata::parse(
            r#"{"compression":"gzip","tiling":{"block_width":4,"block_height":2},
                "bands":[{"name":"a","type":"int16"},{"name":"b","type":"float32","nodata":"nan"}]}"#,
        );
        let first = StatsConfig::from_metadata(&meta).unwrap();
        assert_eq!(first.pixel_type, PixelType::Int16);
        assert_eq!(first.dimensions, Dimensions::new(4, 2));
        assert_eq!(first.compression, Compression::Gzip);
        assert_eq!(first.nodata, Nodata::Disabled);

        let second = StatsConfig::for_band(&meta, 1).unwrap();
        assert_eq!(second.nodata, Nodata::NaN);
        assert!(StatsConfig::for_band(&meta, 2).is_err());
    }

    #[test]
    fn test_config_without_bands() {
        let config = StatsConfig::from_metadata(&RasterMetadata::default()).unwrap();
        assert_eq!(config.pixel_type, PixelType::Uint8);
        assert_eq!(config.dimensions, Dimensions::new(256, 256));
    }
}
