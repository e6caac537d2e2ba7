//! Device-pixel-ratio aware raster surface.
//!
//! Callers work in logical units only. The surface owns a physical bitmap of
//! `ceil(logical * dpr)` pixels and applies a uniform `scale(dpr)` to every draw. Rasterization
//! goes through `vello_cpu`; results are composited into the bitmap with premultiplied
//! source-over.

use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Bitmap, LogicalSize, PixelSize, Rect};
use crate::foundation::error::{AnnotateError, AnnotateResult};
use crate::render::composite::over_at;
use crate::render::stroke::{StrokeSegment, StrokeStyle};

/// Raster surface in logical units backed by a physical premultiplied bitmap.
pub struct RasterSurface {
    logical: LogicalSize,
    device_pixel_ratio: f64,
    bitmap: Bitmap,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("logical", &self.logical)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("physical", &self.bitmap.size())
            .finish()
    }
}

impl RasterSurface {
    /// Allocate a transparent surface.
    pub fn new(logical: LogicalSize, device_pixel_ratio: f64) -> AnnotateResult<Self> {
        if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
            return Err(AnnotateError::validation(
                "device pixel ratio must be finite and > 0",
            ));
        }
        let physical = PixelSize::from_logical(logical, device_pixel_ratio);
        to_u16(physical.width, "surface width")?;
        to_u16(physical.height, "surface height")?;
        Ok(Self {
            logical,
            device_pixel_ratio,
            bitmap: Bitmap::transparent(physical),
            ctx: None,
        })
    }

    /// Logical size.
    pub fn logical(&self) -> LogicalSize {
        self.logical
    }

    /// Device pixel ratio fixed at allocation.
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Physical pixel size.
    pub fn physical(&self) -> PixelSize {
        self.bitmap.size()
    }

    /// Current pixels.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Replace the pixels wholesale (history restore). Sizes must match.
    pub fn restore(&mut self, bitmap: &Bitmap) -> AnnotateResult<()> {
        if bitmap.size() != self.bitmap.size() {
            return Err(AnnotateError::validation(format!(
                "restore size mismatch: surface {:?}, snapshot {:?}",
                self.bitmap.size(),
                bitmap.size()
            )));
        }
        self.bitmap.data.copy_from_slice(&bitmap.data);
        Ok(())
    }

    /// Redraw the whole surface from scratch: each layer stretched over the logical area, in order.
    ///
    /// An empty layer list leaves the surface transparent.
    pub fn paint_layers(&mut self, layers: &[&Bitmap]) -> AnnotateResult<()> {
        let physical = self.bitmap.size();
        let w = to_u16(physical.width, "surface width")?;
        let h = to_u16(physical.height, "surface height")?;

        let mut paints = Vec::with_capacity(layers.len());
        for layer in layers {
            paints.push((image_paint(layer)?, layer.width, layer.height));
        }

        let base = Affine::scale(self.device_pixel_ratio);
        let logical = self.logical;
        let rendered = self.with_ctx_mut(w, h, |ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            for (paint, iw, ih) in paints {
                let fit = Affine::scale_non_uniform(
                    logical.width / f64::from(iw),
                    logical.height / f64::from(ih),
                );
                ctx.set_transform(affine_to_cpu(base * fit));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(iw),
                    f64::from(ih),
                ));
            }
        })?;
        self.bitmap = rendered;
        Ok(())
    }

    /// Rasterize one smoothed segment onto the live pixels.
    ///
    /// Only the segment's physical bounding region is rendered, then composited in place.
    pub fn stroke_segment(
        &mut self,
        segment: &StrokeSegment,
        style: StrokeStyle,
    ) -> AnnotateResult<()> {
        let logical_bounds = segment.paint_bounds(style.width());
        let Some((x0, y0, rw, rh)) = self.physical_region(logical_bounds) else {
            return Ok(());
        };
        let w = to_u16(rw, "stroke region width")?;
        let h = to_u16(rh, "stroke region height")?;

        let path = bezpath_to_cpu(&segment.to_path());
        let transform = Affine::translate((-f64::from(x0), -f64::from(y0)))
            * Affine::scale(self.device_pixel_ratio);
        let [r, g, b, a] = style.color.rgba8();

        let mut stroke = vello_cpu::kurbo::Stroke::new(style.width());
        stroke.join = vello_cpu::kurbo::Join::Round;
        stroke.start_cap = vello_cpu::kurbo::Cap::Round;
        stroke.end_cap = vello_cpu::kurbo::Cap::Round;

        let region = self.with_ctx_mut(w, h, |ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.set_stroke(stroke);
            ctx.stroke_path(&path);
        })?;

        over_at(&mut self.bitmap, &region, x0, y0);
        Ok(())
    }

    /// Physical pixel region covering a logical rectangle, clipped to the bitmap.
    fn physical_region(&self, logical: Rect) -> Option<(u32, u32, u32, u32)> {
        let s = self.device_pixel_ratio;
        let size = self.bitmap.size();
        let clip = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;

        let x0 = clip((logical.x0 * s).floor(), size.width);
        let y0 = clip((logical.y0 * s).floor(), size.height);
        let x1 = clip((logical.x1 * s).ceil(), size.width);
        let y1 = clip((logical.y1 * s).ceil(), size.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }

    fn with_ctx_mut(
        &mut self,
        width: u16,
        height: u16,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> AnnotateResult<Bitmap> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        draw(&mut ctx);
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Bitmap::from_premul(
            u32::from(width),
            u32::from(height),
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

fn to_u16(v: u32, what: &str) -> AnnotateResult<u16> {
    v.try_into()
        .map_err(|_| AnnotateError::validation(format!("{what} exceeds u16: {v}")))
}

fn image_paint(bitmap: &Bitmap) -> AnnotateResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&bitmap.data, bitmap.width, bitmap.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler {
            quality: vello_cpu::peniko::ImageQuality::High,
            ..vello_cpu::peniko::ImageSampler::default()
        },
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> AnnotateResult<vello_cpu::Pixmap> {
    let w = to_u16(width, "pixmap width")?;
    let h = to_u16(height, "pixmap height")?;
    let expected = PixelSize { width, height }.byte_len();
    if bytes.len() != expected {
        return Err(AnnotateError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
