//! Document access
//!
//! Opening PDF byte sources and resolving pages to immutable metadata:
//! media-box geometry, rotation, and decoded content-stream bytes.

mod geometry;
mod handle;
mod source;

pub use geometry::PageGeometry;
pub use handle::{Page, PdfDocument};
pub use source::DocumentSource;
