//! Rasterization
//!
//! The device-space transform, the white-backed canvas, the content-stream
//! interpreter that paints into it, and the PNG encoder.

mod canvas;
mod encoder;
mod interpreter;
mod transform;

pub use canvas::RasterCanvas;
pub use encoder::encode_png;
pub use transform::build_transform;
