//! Pixel and band decoding from raw band payloads

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::types::{Dimensions, PixelType};

use super::{BandBuffer, DecodedBand, PixelGrid};

/// Decodes the pixel at `(x, y)` of a row-major band `width` pixels wide.
///
/// The grid height is however many full rows the payload holds.
pub fn decode_pixel(
    band: &[u8],
    pixel_type: &str,
    x: i32,
    y: i32,
    width: i32,
    compressed: bool,
) -> Result<f64> {
    decode_pixel_interleaved(band, pixel_type, x, y, width, 0, 1, compressed)
}

/// Decodes a full `width x height` band into f64 samples, row-major
pub fn decode_band(
    band: &[u8],
    pixel_type: &str,
    width: i32,
    height: i32,
    compressed: bool,
) -> Result<Vec<f64>> {
    let pixel_type = PixelType::parse(pixel_type)?;
    let dims = Dimensions::from_signed(width.into(), height.into())?;
    let buffer = BandBuffer::new(band, Compression::from_flag(compressed));
    Ok(DecodedBand::decode(&buffer, pixel_type, dims)?.to_vec())
}

/// Decodes one band's pixel from a band-interleaved-by-pixel payload
#[allow(clippy::too_many_arguments)]
pub fn decode_pixel_interleaved(
    pixels: &[u8],
    pixel_type: &str,
    x: i32,
    y: i32,
    width: i32,
    band_index: usize,
    num_bands: usize,
    compressed: bool,
) -> Result<f64> {
    let pixel_type = PixelType::parse(pixel_type)?;
    check_band_index(band_index, num_bands)?;
    if width <= 0 {
        return Err(Error::InvalidInput(format!("width must be positive, got {}", width)));
    }
    let (x, y) = match (u32::try_from(x), u32::try_from(y)) {
        (Ok(x), Ok(y)) => (x, y),
        _ => {
            return Err(Error::InvalidInput(format!("pixel ({}, {}) is negative", x, y)));
        }
    };

    let data = Compression::from_flag(compressed).decompress(pixels)?;
    let width = width as u32;
    let pixels_held = pixel_type.elements_in(data.len()) / num_bands;
    let rows = u32::try_from(pixels_held / width as usize).unwrap_or(u32::MAX);
    let dims = Dimensions::new(width, rows);

    let offset = dims.offset(x, y).ok_or_else(|| {
        Error::InvalidInput(format!("pixel ({}, {}) outside {} grid", x, y, dims))
    })?;
    Ok(pixel_type.read_value(&data, offset * num_bands + band_index))
}

/// Decodes one band of a band-interleaved-by-pixel payload into f64 samples
pub fn decode_band_interleaved(
    pixels: &[u8],
    pixel_type: &str,
    width: i32,
    height: i32,
    band_index: usize,
    num_bands: usize,
    compressed: bool,
) -> Result<Vec<f64>> {
    let pixel_type = PixelType::parse(pixel_type)?;
    check_band_index(band_index, num_bands)?;
    let dims = Dimensions::from_signed(width.into(), height.into())?;

    let data = Compression::from_flag(compressed).decompress(pixels)?;
    let grid = PixelGrid::strided(&data, pixel_type, dims.pixel_count(), band_index, num_bands)?;
    Ok(grid.values().collect())
}

fn check_band_index(band_index: usize, num_bands: usize) -> Result<()> {
    if band_index >= num_bands {
        return Err(Error::InvalidInput(format!(
            "band index {} out of range for {} interleaved bands",
            band_index, num_bands
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_pixel_row_major() {
        let data = vec![1u8, 2, 3, 4, 5, 6];
        assert_eq!(decode_pixel(&data, "uint8", 0, 0, 3, false).unwrap(), 1.0);
        assert_eq!(decode_pixel(&data, "uint8", 2, 0, 3, false).unwrap(), 3.0);
        assert_eq!(decode_pixel(&data, "uint8", 1, 1, 3, false).unwrap(), 5.0);
    }

    #[test]
    fn test_decode_pixel_compressed() {
        let data = f32_bytes(&[0.5, 1.5, 2.5, 3.5]);
        let compressed = gzip(&data);
        assert_eq!(decode_pixel(&compressed, "float32", 1, 1, 2, true).unwrap(), 3.5);
    }

    #[test]
    fn test_decode_pixel_out_of_range() {
        let data = vec![1u8, 2, 3, 4];
        assert!(matches!(
            decode_pixel(&data, "uint8", 2, 0, 2, false),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            decode_pixel(&data, "uint8", 0, 2, 2, false),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            decode_pixel(&data, "uint8", -1, 0, 2, false),
            Err(Error::InvalidInput(_))
        ));
        assert!(decode_pixel(&data, "uint8", 0, 0, 0, false).is_err());
    }

    #[test]
    fn test_decode_pixel_unknown_type() {
        let data = vec![1u8, 2, 3, 4];
        assert!(matches!(
            decode_pixel(&data, "bogus", 0, 0, 2, false),
            Err(Error::UnknownPixelType(_))
        ));
    }

    #[test]
    fn test_decode_pixel_corrupt_stream() {
        let data = vec![0x1f, 0x8b, 0x00, 0x00];
        assert!(matches!(
            decode_pixel(&data, "uint8", 0, 0, 2, true),
            Err(Error::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_decode_band() {
        let data: Vec<u8> = [-1i16, 0, 1, 300].iter().flat_map(|v| v.to_le_bytes()).collect();
        let values = decode_band(&gzip(&data), "int16", 2, 2, true).unwrap();
        assert_eq!(values, vec![-1.0, 0.0, 1.0, 300.0]);
    }

    #[test]
    fn test_decode_band_short_buffer() {
        let data = vec![1u8, 2, 3];
        assert!(matches!(
            decode_band(&data, "uint8", 2, 2, false),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decode_interleaved() {
        // Two bands, 2x1 pixels: (10, 20), (11, 21)
        let data = vec![10u8, 20, 11, 21];
        assert_eq!(decode_pixel_interleaved(&data, "uint8", 1, 0, 2, 1, 2, false).unwrap(), 21.0);
        assert_eq!(decode_band_interleaved(&data, "uint8", 2, 1, 0, 2, false).unwrap(), vec![10.0, 11.0]);
        assert_eq!(decode_band_interleaved(&data, "uint8", 2, 1, 1, 2, false).unwrap(), vec![20.0, 21.0]);
    }

    #[test]
    fn test_decode_interleaved_bad_band() {
        let data = vec![10u8, 20, 11, 21];
        assert!(decode_band_interleaved(&data, "uint8", 2, 1, 2, 2, false).is_err());
        assert!(decode_pixel_interleaved(&data, "uint8", 0, 0, 2, 0, 0, false).is_err());
    }
}
