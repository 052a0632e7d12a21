//! Image decoding for the product image panel.

use image::GenericImageView;

const MAX_PREVIEW_DIMENSION: u32 = 480;
const PLACEHOLDER_SIZE: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreviewImage {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) rgba: Vec<u8>,
}

pub(crate) fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (width, height) = dynamic.dimensions();
    let fitted = if width > MAX_PREVIEW_DIMENSION || height > MAX_PREVIEW_DIMENSION {
        dynamic.thumbnail(MAX_PREVIEW_DIMENSION, MAX_PREVIEW_DIMENSION)
    } else {
        dynamic
    };
    let resized = fitted.to_rgba8();
    Ok(PreviewImage {
        width: resized.width() as usize,
        height: resized.height() as usize,
        rgba: resized.into_raw(),
    })
}

/// Built-in stand-in for product images that fail to load: a light tile with
/// a darker frame and cross.
pub(crate) fn placeholder_image() -> PreviewImage {
    let size = PLACEHOLDER_SIZE;
    let mut rgba = Vec::with_capacity(size * size * 4);
    for y in 0..size {
        for x in 0..size {
            let frame = x < 2 || y < 2 || x >= size - 2 || y >= size - 2;
            let cross = x.abs_diff(y) <= 1 || (x + y).abs_diff(size - 1) <= 1;
            let shade = if frame || cross { 0xB0 } else { 0xE6 };
            rgba.extend_from_slice(&[shade, shade, shade, 0xFF]);
        }
    }
    PreviewImage {
        width: size,
        height: size,
        rgba,
    }
}
