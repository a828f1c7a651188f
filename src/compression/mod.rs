//! Band payload compression

pub mod gzip;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Compression types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression
    #[default]
    None,
    /// Gzip-wrapped deflate
    Gzip,
}

impl Compression {
    /// Creates compression from a descriptor name.
    ///
    /// Only the exact name `gzip` selects the codec; any other name reads
    /// as uncompressed.
    pub fn from_name(name: &str) -> Self {
        if name == "gzip" {
            Compression::Gzip
        } else {
            Compression::None
        }
    }

    /// Creates compression from a boolean `compressed` flag
    pub fn from_flag(compressed: bool) -> Self {
        if compressed {
            Compression::Gzip
        } else {
            Compression::None
        }
    }

    /// Returns the descriptor name of this compression type
    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
        }
    }

    pub fn is_compressed(&self) -> bool {
        *self != Compression::None
    }

    /// Decompresses data, borrowing the input when it is not compressed
    pub fn decompress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        match self {
            Compression::None => Ok(Cow::Borrowed(data)),
            Compression::Gzip => gzip::decompress(data).map(Cow::Owned),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
