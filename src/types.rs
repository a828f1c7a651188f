//! Core data types for raquet-stats

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Represents band pixel encodings.
///
/// All multi-byte encodings are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    /// Unsigned 8-bit integer
    Uint8,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 16-bit integer
    Uint16,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 32-bit integer
    Uint32,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 64-bit integer
    Uint64,
    /// Signed 64-bit integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
}

impl PixelType {
    pub const ALL: [PixelType; 10] = [
        PixelType::Uint8,
        PixelType::Int8,
        PixelType::Uint16,
        PixelType::Int16,
        PixelType::Uint32,
        PixelType::Int32,
        PixelType::Uint64,
        PixelType::Int64,
        PixelType::Float32,
        PixelType::Float64,
    ];

    /// Looks up a pixel type by its descriptor name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownPixelType(name.to_string()))
    }

    /// Returns the size in bytes for this pixel type
    pub fn size(&self) -> usize {
        match self {
            PixelType::Uint8 | PixelType::Int8 => 1,
            PixelType::Uint16 | PixelType::Int16 => 2,
            PixelType::Uint32 | PixelType::Int32 | PixelType::Float32 => 4,
            PixelType::Uint64 | PixelType::Int64 | PixelType::Float64 => 8,
        }
    }

    /// Returns the descriptor name of this pixel type
    pub fn name(&self) -> &'static str {
        match self {
            PixelType::Uint8 => "uint8",
            PixelType::Int8 => "int8",
            PixelType::Uint16 => "uint16",
            PixelType::Int16 => "int16",
            PixelType::Uint32 => "uint32",
            PixelType::Int32 => "int32",
            PixelType::Uint64 => "uint64",
            PixelType::Int64 => "int64",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, PixelType::Float32 | PixelType::Float64)
    }

    pub fn is_signed(&self) -> bool {
        !matches!(
            self,
            PixelType::Uint8 | PixelType::Uint16 | PixelType::Uint32 | PixelType::Uint64
        )
    }

    /// Number of whole elements of this type held by `byte_len` bytes
    pub fn elements_in(&self, byte_len: usize) -> usize {
        byte_len / self.size()
    }

    /// Reads the element at `offset` (in elements, not bytes) widened to f64.
    ///
    /// The caller guarantees `(offset + 1) * self.size() <= data.len()`;
    /// a violation panics on the slice bound rather than reading past `data`.
    #[inline]
    pub fn read_value(&self, data: &[u8], offset: usize) -> f64 {
        match self {
            PixelType::Uint8 => data[offset] as f64,
            PixelType::Int8 => data[offset] as i8 as f64,
            PixelType::Uint16 => u16::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Int16 => i16::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Uint32 => u32::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Int32 => i32::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Uint64 => u64::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Int64 => i64::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Float32 => f32::from_le_bytes(read_le(data, offset)) as f64,
            PixelType::Float64 => f64::from_le_bytes(read_le(data, offset)),
        }
    }
}

/// Copies the N bytes of element `index` out of `data`
#[inline]
fn read_le<const N: usize>(data: &[u8], index: usize) -> [u8; N] {
    let start = index * N;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[start..start + N]);
    bytes
}

impl FromStr for PixelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents band grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Creates dimensions from host-side signed integers.
    ///
    /// Both sides must be strictly positive.
    pub fn from_signed(width: i64, height: i64) -> Result<Self> {
        let side = |value: i64, label: &str| -> Result<u32> {
            u32::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| Error::InvalidInput(format!("{} must be positive, got {}", label, value)))
        };
        Ok(Self::new(side(width, "width")?, side(height, "height")?))
    }

    /// Returns the total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major element offset of `(x, y)`, or None outside the grid
    pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}
