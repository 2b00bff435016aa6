//! Bitmap encoding
//!
//! Serializes a finished canvas to PNG. The output is deterministic for
//! identical pixel content: the encoder writes no timestamps or other
//! varying ancillary chunks, so repeated renders of the same request are
//! byte-identical.

use std::io::Cursor;

use image::{DynamicImage, RgbaImage};

use crate::error::{RasterError, RasterResult};
use crate::raster::RasterCanvas;

/// Encode a finished canvas as a PNG byte stream
pub fn encode_png(canvas: RasterCanvas) -> RasterResult<Vec<u8>> {
    let (width, height, rgba) = canvas.into_rgba();

    let img = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| RasterError::EncodeFailed("pixel buffer size mismatch".into()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| RasterError::EncodeFailed(e.to_string()))?;

    Ok(output)
}
