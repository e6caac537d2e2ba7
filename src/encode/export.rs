//! Canonical-resolution export of a composite.
//!
//! The live bitmap's size depends on the container and the device pixel ratio. Exports are
//! resampled to a fixed box fitted to the session's aspect ratio so a reload at another size sees
//! the same artifact.

use std::io::Cursor;

use anyhow::Context as _;
use base64::Engine as _;

use crate::assets::decode::decode_image;
use crate::config::ExportConfig;
use crate::foundation::core::{Bitmap, PixelSize};
use crate::foundation::error::{AnnotateError, AnnotateResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::geometry::layout::fit_to_container;

/// Prefix of the data URLs produced by [`EncodedImage::from_png`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// An encoded composite as stored by the host: a `data:` URL, or bare base64.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap PNG bytes as a `data:image/png;base64,` URL.
    pub fn from_png(png: &[u8]) -> Self {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png);
        Self(format!("{PNG_DATA_URL_PREFIX}{b64}"))
    }

    /// Adopt a string received from a store. Blank input means "no annotation".
    pub fn from_stored(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Stored form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the stored form.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Raw image bytes behind the URL or base64 payload.
    pub fn to_bytes(&self) -> AnnotateResult<Vec<u8>> {
        let s = self.0.trim();
        let payload = match s.strip_prefix("data:") {
            Some(rest) => {
                let (meta, data) = rest
                    .split_once(',')
                    .ok_or_else(|| AnnotateError::decode("data URL has no payload separator"))?;
                if !meta.ends_with(";base64") {
                    return Err(AnnotateError::decode(format!(
                        "unsupported data URL encoding '{meta}'"
                    )));
                }
                data
            }
            None => s,
        };
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| AnnotateError::decode(format!("base64: {e}")))
    }

    /// Decode into a premultiplied bitmap.
    pub fn decode(&self) -> AnnotateResult<Bitmap> {
        decode_image(&self.to_bytes()?)
    }
}

impl std::fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Largest size of the given aspect ratio that fits the export box.
pub fn canonical_size(config: ExportConfig, aspect: f64) -> AnnotateResult<PixelSize> {
    let fitted = fit_to_container(
        aspect,
        f64::from(config.width),
        f64::from(config.height),
        None,
    )
    .ok_or_else(|| AnnotateError::encode(format!("cannot fit aspect {aspect} into export box")))?;
    Ok(PixelSize {
        width: (fitted.width.round() as u32).clamp(1, config.width),
        height: (fitted.height.round() as u32).clamp(1, config.height),
    })
}

/// Resample premultiplied pixels with a Catmull-Rom filter.
///
/// The filter can ring past the alpha bound, so color channels are clamped back under alpha.
pub fn resample(bitmap: &Bitmap, target: PixelSize) -> AnnotateResult<Bitmap> {
    if bitmap.size() == target {
        return Ok(bitmap.clone());
    }
    let src = image::RgbaImage::from_raw(bitmap.width, bitmap.height, bitmap.data.clone())
        .ok_or_else(|| AnnotateError::encode("bitmap byte len mismatch"))?;
    let resized = image::imageops::resize(
        &src,
        target.width,
        target.height,
        image::imageops::FilterType::CatmullRom,
    );
    let mut data = resized.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
    Bitmap::from_premul(target.width, target.height, data)
}

/// Lossless PNG of a premultiplied bitmap (stored straight-alpha).
pub fn encode_png(bitmap: &Bitmap) -> AnnotateResult<Vec<u8>> {
    let mut straight = bitmap.data.clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(bitmap.width, bitmap.height, straight)
        .ok_or_else(|| AnnotateError::encode("bitmap byte len mismatch"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode PNG")
        .map_err(|e| AnnotateError::encode(format!("{e:#}")))?;
    Ok(out)
}

/// Export a composite at the canonical resolution for `aspect`.
#[tracing::instrument(skip(bitmap), fields(src_w = bitmap.width, src_h = bitmap.height))]
pub fn export_bitmap(
    bitmap: &Bitmap,
    aspect: f64,
    config: ExportConfig,
) -> AnnotateResult<EncodedImage> {
    let target = canonical_size(config, aspect)?;
    let resampled = resample(bitmap, target)?;
    let png = encode_png(&resampled)?;
    tracing::debug!(
        width = target.width,
        height = target.height,
        bytes = png.len(),
        "exported composite"
    );
    Ok(EncodedImage::from_png(&png))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
