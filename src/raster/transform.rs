//! User-space to device-space transform
//!
//! PDF user space has its origin at the media-box lower-left corner with Y
//! increasing upward; device space has its origin at the canvas top-left
//! with Y increasing downward. The transform built here scales user-space
//! units uniformly by `scale`, flips the Y axis, folds in the page's
//! quarter-turn rotation, and translates by the caller's viewport offset.
//!
//! Offsets are post-scale device pixels ("scroll position" semantics): the
//! displayed page top-left lands at `(-x_offset, -y_offset)` on the canvas.
//!
//! Building a transform is pure: the same geometry and spec always produce
//! the same matrix.

use tiny_skia::Transform;

use crate::document::PageGeometry;

/// Build the affine transform mapping user space to device pixels
///
/// The matrix is in PDF `[a b c d e f]` order: `dev_x = a·x + c·y + e`,
/// `dev_y = b·x + d·y + f`.
pub fn build_transform(
    geometry: &PageGeometry,
    scale: f32,
    x_offset: i32,
    y_offset: i32,
) -> Transform {
    let s = scale;
    let (ox, oy) = (geometry.origin_x, geometry.origin_y);
    let (w, h) = (geometry.width, geometry.height);
    let (dx, dy) = (x_offset as f32, y_offset as f32);

    // Each arm maps the displayed page top-left to the canvas origin
    // before the offset translation is applied.
    let (sx, ky, kx, sy, tx, ty) = match geometry.rotation {
        90 => (0.0, s, s, 0.0, -oy * s - dx, -ox * s - dy),
        180 => (-s, 0.0, 0.0, s, (ox + w) * s - dx, -oy * s - dy),
        270 => (0.0, -s, -s, 0.0, (oy + h) * s - dx, (ox + w) * s - dy),
        _ => (s, 0.0, 0.0, -s, -ox * s - dx, (oy + h) * s - dy),
    };

    Transform::from_row(sx, ky, kx, sy, tx, ty)
}
