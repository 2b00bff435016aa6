//! Test fixtures: minimal PDFs built in memory with lopdf.

use lopdf::{dictionary, Document, Object, Stream};

/// One page of a fixture document
pub struct FixturePage {
    /// Media-box corners `[x0, y0, x1, y1]` in points
    pub media_box: [f32; 4],
    /// Optional `/Rotate` value
    pub rotate: Option<i64>,
    /// Raw content-stream text, empty for a blank page
    pub content: &'static str,
}

impl Default for FixturePage {
    fn default() -> Self {
        Self {
            media_box: [0.0, 0.0, 200.0, 100.0],
            rotate: None,
            content: "",
        }
    }
}

/// Serialize a complete single- or multi-page PDF
pub fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => page
                .media_box
                .iter()
                .map(|&v| Object::Real(v))
                .collect::<Vec<Object>>(),
        };
        if let Some(rotate) = page.rotate {
            page_dict.set("Rotate", rotate);
        }
        if !page.content.is_empty() {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                page.content.as_bytes().to_vec(),
            ));
            page_dict.set("Contents", content_id);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialize fixture pdf");
    buf
}

/// A one-page document with the given media box and content stream
pub fn single_page(media_box: [f32; 4], content: &'static str) -> Vec<u8> {
    build_pdf(&[FixturePage {
        media_box,
        content,
        ..Default::default()
    }])
}

/// Decode a PNG into (width, height, rgba bytes)
pub fn decode_png(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let img = image::load_from_memory(bytes).expect("decode png").to_rgba8();
    let (width, height) = img.dimensions();
    (width, height, img.into_raw())
}

/// RGB of one pixel in a decoded RGBA buffer
pub fn pixel(rgba: &[u8], width: u32, x: u32, y: u32) -> (u8, u8, u8) {
    let i = ((y * width + x) * 4) as usize;
    (rgba[i], rgba[i + 1], rgba[i + 2])
}

/// True if every pixel is opaque white
pub fn all_white(rgba: &[u8]) -> bool {
    rgba.iter().all(|&b| b == 255)
}
