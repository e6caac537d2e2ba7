use crate::foundation::error::{AnnotateError, AnnotateResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Size in canvas-logical units (the space all drawing math happens in).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogicalSize {
    /// Width in logical units.
    pub width: f64,
    /// Height in logical units.
    pub height: f64,
}

impl LogicalSize {
    /// Create a validated size with finite, strictly positive dimensions.
    pub fn new(width: f64, height: f64) -> AnnotateResult<Self> {
        if !width.is_finite() || !height.is_finite() {
            return Err(AnnotateError::validation("logical size must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(AnnotateError::validation("logical size must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// `width / height`.
    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    /// Clamp a point into `[0, width] x [0, height]`.
    pub fn clamp_point(self, p: Point) -> Point {
        Point::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}

/// Size in physical bitmap pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Physical allocation for a logical size at a device pixel ratio.
    ///
    /// Rounds up so the bitmap never undersamples the logical area; never returns a zero axis.
    pub fn from_logical(logical: LogicalSize, device_pixel_ratio: f64) -> Self {
        let w = (logical.width * device_pixel_ratio).ceil().max(1.0);
        let h = (logical.height * device_pixel_ratio).ceil().max(1.0);
        Self {
            width: w.min(f64::from(u32::MAX)) as u32,
            height: h.min(f64::from(u32::MAX)) as u32,
        }
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a16 = u16::from(a);
        let premul = |c: u8| crate::foundation::math::mul_div255_u8(u16::from(c), a16);
        Self {
            r: premul(r),
            g: premul(g),
            b: premul(b),
            a,
        }
    }

    /// Channels as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A raster surface as premultiplied RGBA8 pixels, row-major and tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn transparent(size: PixelSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.byte_len()],
        }
    }

    /// Wrap premultiplied bytes, checking the length against `width * height * 4`.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> AnnotateResult<Self> {
        let expected = PixelSize { width, height }.byte_len();
        if data.len() != expected {
            return Err(AnnotateError::validation(format!(
                "bitmap byte len mismatch: expected {expected}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Pixel dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some(Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }

    /// Return `true` when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
