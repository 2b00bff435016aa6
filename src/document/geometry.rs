//! Page geometry resolution
//!
//! Extracts a page's media box (origin + size in user-space units) and its
//! `/Rotate` attribute. Both are inheritable page attributes, so the lookup
//! walks the `/Parent` chain of the page tree. Resolution never fails for a
//! validly opened page: a missing media box falls back to US Letter and
//! unusable values are normalized.

use lopdf::{Dictionary, Document, Object};
use serde::Serialize;
use tracing::warn;

/// US Letter in points, the conventional fallback for a missing media box.
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Parent-chain and reference-chain traversal cap, guards cyclic documents.
const MAX_CHAIN_DEPTH: usize = 32;

/// Immutable page geometry in PDF user-space units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    /// Media-box lower-left x
    pub origin_x: f32,
    /// Media-box lower-left y
    pub origin_y: f32,
    /// Media-box width, always non-negative
    pub width: f32,
    /// Media-box height, always non-negative
    pub height: f32,
    /// Normalized page rotation: 0, 90, 180, or 270 degrees
    pub rotation: u16,
}

impl PageGeometry {
    /// Width as displayed, with 90/270 rotation swapping the axes
    pub fn display_width(&self) -> f32 {
        match self.rotation {
            90 | 270 => self.height,
            _ => self.width,
        }
    }

    /// Height as displayed, with 90/270 rotation swapping the axes
    pub fn display_height(&self) -> f32 {
        match self.rotation {
            90 | 270 => self.width,
            _ => self.height,
        }
    }
}

/// Resolve the geometry of a page dictionary
pub(crate) fn resolve(doc: &Document, page: &Dictionary) -> PageGeometry {
    let corners = inherited(doc, page, b"MediaBox")
        .and_then(media_box_corners)
        .unwrap_or_else(|| {
            warn!("media box missing or malformed, falling back to US Letter");
            FALLBACK_MEDIA_BOX
        });

    let [x0, y0, x1, y1] = corners;
    let rotation = inherited(doc, page, b"Rotate")
        .and_then(|obj| match obj {
            Object::Integer(deg) => Some(normalize_rotation(*deg)),
            _ => None,
        })
        .unwrap_or(0);

    // Corners may be stored in any order; normalize to origin + size.
    PageGeometry {
        origin_x: x0.min(x1),
        origin_y: y0.min(y1),
        width: (x1 - x0).abs(),
        height: (y1 - y0).abs(),
        rotation,
    }
}

/// Extract the four corners of a media-box array
fn media_box_corners(obj: &Object) -> Option<[f32; 4]> {
    let array = match obj {
        Object::Array(array) if array.len() >= 4 => array,
        _ => return None,
    };
    Some([
        number(&array[0])?,
        number(&array[1])?,
        number(&array[2])?,
        number(&array[3])?,
    ])
}

/// Look up an inheritable page attribute, walking the parent chain
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut dict = page;
    for _ in 0..MAX_CHAIN_DEPTH {
        if let Ok(obj) = dict.get(key) {
            return deref(doc, obj);
        }
        let parent = dict.get(b"Parent").ok().and_then(|obj| deref(doc, obj))?;
        dict = match parent {
            Object::Dictionary(parent) => parent,
            _ => return None,
        };
    }
    None
}

/// Follow indirect references to the underlying object
fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_CHAIN_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Numeric value of an integer or real object
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Clamp `/Rotate` to a quarter-turn; the spec allows only multiples of 90
fn normalize_rotation(degrees: i64) -> u16 {
    match degrees.rem_euclid(360) {
        90 => 90,
        180 => 180,
        270 => 270,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn geometry_of(doc: &Document, page: Dictionary) -> PageGeometry {
        resolve(doc, &page)
    }

    #[test]
    fn test_media_box_direct() {
        let doc = Document::with_version("1.7");
        let page = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
        };
        let geom = geometry_of(&doc, page);
        assert_eq!(geom.origin_x, 0.0);
        assert_eq!(geom.width, 200.0);
        assert_eq!(geom.height, 100.0);
        assert_eq!(geom.rotation, 0);
    }

    #[test]
    fn test_media_box_reversed_corners() {
        let doc = Document::with_version("1.7");
        let page = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![300.into(), 400.into(), 100.into(), 50.into()],
        };
        let geom = geometry_of(&doc, page);
        assert_eq!(geom.origin_x, 100.0);
        assert_eq!(geom.origin_y, 50.0);
        assert_eq!(geom.width, 200.0);
        assert_eq!(geom.height, 350.0);
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let mut doc = Document::with_version("1.7");
        let parent_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "MediaBox" => vec![0.into(), 0.into(), 300.into(), 600.into()],
        });
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => parent_id,
        };
        let geom = geometry_of(&doc, page);
        assert_eq!(geom.width, 300.0);
        assert_eq!(geom.height, 600.0);
    }

    #[test]
    fn test_missing_media_box_falls_back_to_letter() {
        let doc = Document::with_version("1.7");
        let page = dictionary! { "Type" => "Page" };
        let geom = geometry_of(&doc, page);
        assert_eq!(geom.width, 612.0);
        assert_eq!(geom.height, 792.0);
    }

    #[test]
    fn test_rotation_normalization() {
        assert_eq!(normalize_rotation(0), 0);
        assert_eq!(normalize_rotation(90), 90);
        assert_eq!(normalize_rotation(-90), 270);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(45), 0);
    }

    #[test]
    fn test_rotation_swaps_display_dimensions() {
        let geom = PageGeometry {
            origin_x: 0.0,
            origin_y: 0.0,
            width: 200.0,
            height: 100.0,
            rotation: 90,
        };
        assert_eq!(geom.display_width(), 100.0);
        assert_eq!(geom.display_height(), 200.0);
    }

    #[test]
    fn test_zero_area_media_box_is_legal() {
        let doc = Document::with_version("1.7");
        let page = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 0.into(), 0.into()],
        };
        let geom = geometry_of(&doc, page);
        assert_eq!(geom.width, 0.0);
        assert_eq!(geom.height, 0.0);
    }
}
