//! Raster canvas
//!
//! An RGBA8 pixel buffer owned by a single render operation. The canvas is
//! filled with opaque white before any drawing: transparent PDF regions
//! deliberately come out white, never transparent. Everything painted
//! outside the buffer's bounds is discarded by the rasterizer.

use tiny_skia::{Color, Pixmap, Transform};

use crate::document::Page;
use crate::error::{RasterError, RasterResult};
use crate::raster::interpreter::ContentInterpreter;

/// A width x height RGBA8 pixel buffer for one render operation
#[derive(Debug)]
pub struct RasterCanvas {
    pixmap: Pixmap,
}

impl RasterCanvas {
    /// Allocate a canvas and fill it with opaque white
    ///
    /// Dimensions must be at least one pixel; callers derive them from a
    /// validated render spec.
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RasterError::InvalidArgument(format!("canvas size {width}x{height}"))
        })?;
        pixmap.fill(Color::WHITE);
        Ok(Self { pixmap })
    }

    /// Paint a page's content stream with the given transform
    ///
    /// Fails with [`RasterError::RenderFailed`] if the content stream
    /// cannot be interpreted; nothing painted so far is rolled back, but
    /// the caller discards the canvas on error so partial output never
    /// escapes.
    pub fn draw_page(&mut self, page: &Page, transform: Transform) -> RasterResult<()> {
        let mut interpreter = ContentInterpreter::new(&mut self.pixmap, transform, page.index);
        interpreter.run(&page.content)
    }

    /// Canvas width in pixels
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Canvas height in pixels
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Consume the canvas into straight-alpha RGBA8 bytes
    ///
    /// tiny-skia stores premultiplied alpha internally; demultiply so the
    /// encoder sees conventional RGBA.
    pub fn into_rgba(self) -> (u32, u32, Vec<u8>) {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        (width, height, rgba)
    }
}
