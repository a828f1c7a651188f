//! Bounds-checked views over decoded pixel buffers

use crate::error::{Error, Result};
use crate::types::PixelType;

/// A sequence of `len` samples inside a byte buffer.
///
/// Sample `i` lives at element offset `start + i * stride`. Construction
/// checks the last sample fits in `data`, so reads never go out of bounds.
#[derive(Debug, Clone, Copy)]
pub struct PixelGrid<'a> {
    data: &'a [u8],
    pixel_type: PixelType,
    len: usize,
    start: usize,
    stride: usize,
}

impl<'a> PixelGrid<'a> {
    /// Contiguous samples starting at element 0
    pub fn new(data: &'a [u8], pixel_type: PixelType, len: usize) -> Result<Self> {
        Self::strided(data, pixel_type, len, 0, 1)
    }

    /// Samples spaced `stride` elements apart, starting at element `start`
    pub fn strided(
        data: &'a [u8],
        pixel_type: PixelType,
        len: usize,
        start: usize,
        stride: usize,
    ) -> Result<Self> {
        if stride == 0 {
            return Err(Error::InvalidInput("pixel stride must be positive".to_string()));
        }

        let available = pixel_type.elements_in(data.len());
        let required = match len {
            0 => Some(0),
            _ => (len - 1)
                .checked_mul(stride)
                .and_then(|last| last.checked_add(start))
                .and_then(|last| last.checked_add(1)),
        };

        match required {
            Some(required) if required <= available => {
                Ok(Self::new_unchecked(data, pixel_type, len, start, stride))
            }
            _ => Err(Error::InvalidInput(format!(
                "{} {} samples do not fit in {} bytes",
                len,
                pixel_type,
                data.len()
            ))),
        }
    }

    pub(crate) fn new_unchecked(
        data: &'a [u8],
        pixel_type: PixelType,
        len: usize,
        start: usize,
        stride: usize,
    ) -> Self {
        Self {
            data,
            pixel_type,
            len,
            start,
            stride,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Sample `index`, or None past the end
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len {
            return None;
        }
        Some(self.pixel_type.read_value(self.data, self.start + index * self.stride))
    }

    /// Iterates every sample in order
    pub fn values(&self) -> impl Iterator<Item = f64> + 'a {
        let PixelGrid {
            data,
            pixel_type,
            len,
            start,
            stride,
        } = *self;
        (0..len).map(move |i| pixel_type.read_value(data, start + i * stride))
    }
}
