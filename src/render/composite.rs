use crate::foundation::core::Bitmap;
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Composite `src` over `dst` with `src`'s top-left corner at `(x, y)` in `dst`.
///
/// Parts of `src` falling outside `dst` are ignored.
pub fn over_at(dst: &mut Bitmap, src: &Bitmap, x: u32, y: u32) {
    if x >= dst.width || y >= dst.height {
        return;
    }
    let cols = src.width.min(dst.width - x) as usize;
    let rows = src.height.min(dst.height - y);
    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;

    for row in 0..rows {
        let d0 = (y + row) as usize * dst_stride + x as usize * 4;
        let s0 = row as usize * src_stride;
        let d = &mut dst.data[d0..d0 + cols * 4];
        let s = &src.data[s0..s0 + cols * 4];
        for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
            if sp[3] == 0 {
                continue;
            }
            let out = over([dp[0], dp[1], dp[2], dp[3]], [sp[0], sp[1], sp[2], sp[3]]);
            dp.copy_from_slice(&out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
