//! Raster descriptor parsing
//!
//! A descriptor is the small JSON-like string stored next to each tile. It
//! carries the compression, the tiling parameters and the band list:
//!
//! ```text
//! {"compression":"gzip",
//!  "tiling":{"min_zoom":0,"max_zoom":10,"block_width":512,"block_height":512,"scheme":"quadbin"},
//!  "crs":"EPSG:3857",
//!  "bands":[{"name":"elevation","type":"float32","nodata":-9999}]}
//! ```
//!
//! Parsing never fails. Well-formed JSON is read structurally; anything else
//! goes through the [`scan`] extractor. Absent or unparseable fields take
//! their defaults.

pub mod document;
pub mod scan;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::types::Dimensions;

use document::Document;
use scan::Scanner;

pub const DEFAULT_BLOCK_SIZE: u32 = 256;
pub const DEFAULT_MIN_ZOOM: i32 = 0;
pub const DEFAULT_MAX_ZOOM: i32 = 26;
pub const DEFAULT_PIXEL_ZOOM: i32 = 0;
pub const DEFAULT_SCHEME: &str = "quadbin";

/// One declared band: its name and pixel type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Per-band extras, index-aligned with [`RasterMetadata::bands`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandInfo {
    /// Declared nodata sentinel, NaN allowed
    pub nodata: Option<f64>,
}

/// Parsed raster descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    pub compression: Compression,
    pub block_width: u32,
    pub block_height: u32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    pub pixel_zoom: i32,
    pub num_blocks: u64,
    pub scheme: String,
    pub crs: Option<String>,
    pub bands: Vec<BandDescriptor>,
    pub band_info: Vec<BandInfo>,
}

impl Default for RasterMetadata {
    fn default() -> Self {
        Self {
            compression: Compression::None,
            block_width: DEFAULT_BLOCK_SIZE,
            block_height: DEFAULT_BLOCK_SIZE,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            pixel_zoom: DEFAULT_PIXEL_ZOOM,
            num_blocks: 0,
            scheme: DEFAULT_SCHEME.to_string(),
            crs: None,
            bands: Vec::new(),
            band_info: Vec::new(),
        }
    }
}

impl RasterMetadata {
    /// Parses a descriptor string, falling back to defaults field by field
    pub fn parse(descriptor: &str) -> Self {
        match Document::parse(descriptor) {
            Some(document) => Self::from_source(&document),
            None => {
                debug!(len = descriptor.len(), "descriptor is not a JSON object, scanning fields");
                Self::from_source(&Scanner::new(descriptor))
            }
        }
    }

    fn from_source<S: DescriptorSource>(source: &S) -> Self {
        let mut meta = RasterMetadata {
            compression: source
                .string("compression")
                .map(|name| Compression::from_name(&name))
                .unwrap_or_default(),
            crs: source.string("crs"),
            ..RasterMetadata::default()
        };

        if let Some(tiling) = source.object("tiling") {
            meta.min_zoom = tiling.int("min_zoom").unwrap_or(DEFAULT_MIN_ZOOM);
            meta.max_zoom = tiling.int("max_zoom").unwrap_or(DEFAULT_MAX_ZOOM);
            meta.pixel_zoom = tiling.int("pixel_zoom").unwrap_or(DEFAULT_PIXEL_ZOOM);
            meta.num_blocks = tiling.int("num_blocks").unwrap_or(0);
            meta.block_width = tiling.block_side("block_width");
            meta.block_height = tiling.block_side("block_height");
            if let Some(scheme) = tiling.string("scheme") {
                meta.scheme = scheme;
            }
        }

        for entry in source.band_entries() {
            let (Some(name), Some(data_type)) = (entry.name, entry.data_type) else {
                continue;
            };
            meta.bands.push(BandDescriptor { name, data_type });
            meta.band_info.push(BandInfo {
                nodata: entry.nodata.as_deref().and_then(parse_nodata),
            });
        }

        meta
    }

    pub fn is_compressed(&self) -> bool {
        self.compression.is_compressed()
    }

    /// Block dimensions, if both sides are positive
    pub fn dimensions(&self) -> Result<Dimensions> {
        Dimensions::from_signed(self.block_width.into(), self.block_height.into())
    }

    /// Pixel type name of the band at `index`
    pub fn band_type(&self, index: usize) -> Result<&str> {
        self.bands
            .get(index)
            .map(|band| band.data_type.as_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "band index {} out of range for {} bands",
                    index,
                    self.bands.len()
                ))
            })
    }

    /// Pixel type name of the first band called `name`
    pub fn band_type_by_name(&self, name: &str) -> Result<&str> {
        let index = self
            .band_index(name)
            .ok_or_else(|| Error::InvalidInput(format!("band not found: {}", name)))?;
        self.band_type(index)
    }

    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.bands.iter().position(|band| band.name == name)
    }

    /// Declared nodata of the band at `index`; None when absent
    pub fn nodata(&self, index: usize) -> Option<f64> {
        self.band_info.get(index).and_then(|info| info.nodata)
    }
}

/// Parses a descriptor string, see [`RasterMetadata::parse`]
pub fn parse(descriptor: &str) -> RasterMetadata {
    RasterMetadata::parse(descriptor)
}

/// One raw band entry as found in the descriptor
#[derive(Debug, Clone, Default)]
pub struct BandEntry {
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub nodata: Option<String>,
}

/// Key lookup over a descriptor, shared by the structured and scanning paths
pub trait DescriptorSource: Sized {
    /// Scalar value of `key` as text; None when absent or empty
    fn string(&self, key: &str) -> Option<String>;

    /// Nested object under `key`
    fn object(&self, key: &str) -> Option<Self>;

    /// Entries of the `bands` list
    fn band_entries(&self) -> Vec<BandEntry>;

    /// Integer value of `key`; None when absent, unparseable or out of range
    fn int<T: TryFrom<i64>>(&self, key: &str) -> Option<T> {
        self.string(key)
            .and_then(|text| parse_int(&text))
            .and_then(|value| T::try_from(value).ok())
    }

    /// Positive block size under `key`, else the default
    fn block_side(&self, key: &str) -> u32 {
        self.int::<u32>(key)
            .filter(|side| *side > 0)
            .unwrap_or(DEFAULT_BLOCK_SIZE)
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.abs() < i64::MAX as f64)
        .map(|value| value.trunc() as i64)
}

fn parse_nodata(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
