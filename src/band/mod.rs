//! Band buffers and pixel decoding

pub mod decoder;
pub mod pixels;

use std::borrow::Cow;

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::types::{Dimensions, PixelType};

pub use decoder::{decode_band, decode_band_interleaved, decode_pixel, decode_pixel_interleaved};
pub use pixels::PixelGrid;

/// Raw band bytes as handed over by the caller.
///
/// The buffer is only ever borrowed; decompression allocates a fresh one.
#[derive(Debug, Clone, Copy)]
pub struct BandBuffer<'a> {
    data: Option<&'a [u8]>,
    declared_len: usize,
    compression: Compression,
}

impl<'a> BandBuffer<'a> {
    pub fn new(data: &'a [u8], compression: Compression) -> Self {
        Self {
            data: Some(data),
            declared_len: data.len(),
            compression,
        }
    }

    /// Creates a buffer from a possibly absent pointer and a declared size
    pub fn from_raw_parts(data: Option<&'a [u8]>, declared_len: usize, compression: Compression) -> Self {
        Self {
            data,
            declared_len,
            compression,
        }
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn is_compressed(&self) -> bool {
        self.compression.is_compressed()
    }

    /// Declared length in bytes
    pub fn len(&self) -> usize {
        self.declared_len
    }

    pub fn is_empty(&self) -> bool {
        self.declared_len == 0
    }

    /// Returns the declared bytes
    pub fn bytes(&self) -> Result<&'a [u8]> {
        match self.data {
            None if self.declared_len == 0 => Ok(&[]),
            None => Err(Error::InvalidInput(format!(
                "absent band buffer with {} declared bytes",
                self.declared_len
            ))),
            Some(data) if data.len() < self.declared_len => Err(Error::InvalidInput(format!(
                "band buffer holds {} bytes, {} declared",
                data.len(),
                self.declared_len
            ))),
            Some(data) => Ok(&data[..self.declared_len]),
        }
    }

    /// Returns the uncompressed payload
    pub fn decompress(&self) -> Result<Cow<'a, [u8]>> {
        self.compression.decompress(self.bytes()?)
    }
}

/// A decompressed band whose length has been checked against its grid
#[derive(Debug)]
pub struct DecodedBand<'a> {
    bytes: Cow<'a, [u8]>,
    pixel_type: PixelType,
    dims: Dimensions,
}

impl<'a> DecodedBand<'a> {
    /// Decompresses `buffer` once and validates it holds `dims` samples
    pub fn decode(buffer: &BandBuffer<'a>, pixel_type: PixelType, dims: Dimensions) -> Result<Self> {
        let bytes = buffer.decompress()?;
        PixelGrid::new(&bytes, pixel_type, dims.pixel_count())?;
        Ok(Self {
            bytes,
            pixel_type,
            dims,
        })
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Row-major view over every sample
    pub fn grid(&self) -> PixelGrid<'_> {
        PixelGrid::new_unchecked(&self.bytes, self.pixel_type, self.dims.pixel_count(), 0, 1)
    }

    /// Value at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Result<f64> {
        let offset = self.dims.offset(x, y).ok_or_else(|| {
            Error::InvalidInput(format!("pixel ({}, {}) outside {} grid", x, y, self.dims))
        })?;
        Ok(self.pixel_type.read_value(&self.bytes, offset))
    }

    /// Materializes the grid as f64 samples
    pub fn to_vec(&self) -> Vec<f64> {
        self.grid().values().collect()
    }
}
