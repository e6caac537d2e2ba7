use anyhow::Context;

use crate::foundation::core::Bitmap;
use crate::foundation::error::AnnotateResult;
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decode any supported raster format into a premultiplied bitmap at its natural size.
pub fn decode_image(bytes: &[u8]) -> AnnotateResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Bitmap::from_premul(width, height, rgba8_premul)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
