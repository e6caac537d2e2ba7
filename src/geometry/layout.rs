use crate::foundation::core::LogicalSize;

/// Rendered box of the element hosting the canvas, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerBox {
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl ContainerBox {
    /// Container of the given rendered size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Space left for the canvas once the padding allowance is taken off both axes.
    ///
    /// Saturates at zero; non-finite dimensions count as zero.
    pub fn available(self, padding: f64) -> (f64, f64) {
        let sub = |v: f64| {
            if v.is_finite() {
                (v - padding).max(0.0)
            } else {
                0.0
            }
        };
        (sub(self.width), sub(self.height))
    }
}

/// Upper bound on the logical size regardless of container size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaxSize {
    /// Maximum logical width.
    pub width: f64,
    /// Maximum logical height.
    pub height: f64,
}

/// Fit a box of aspect ratio `aspect` (`w / h`) into the available area.
///
/// The first pass constrains by whichever axis binds against the (optionally capped) target box;
/// the second pass re-clamps both axes against the available area to absorb floating-point
/// overshoot. Returns `None` when nothing can be fitted (zero-area availability or an unusable
/// aspect ratio).
pub fn fit_to_container(
    aspect: f64,
    available_width: f64,
    available_height: f64,
    max: Option<MaxSize>,
) -> Option<LogicalSize> {
    if !aspect.is_finite() || aspect <= 0.0 {
        return None;
    }
    if available_width <= 0.0 || available_height <= 0.0 {
        return None;
    }

    let (target_w, target_h) = match max {
        Some(m) => (m.width.min(available_width), m.height.min(available_height)),
        None => (available_width, available_height),
    };

    let (mut w, mut h) = if aspect > target_w / target_h {
        (target_w, target_w / aspect)
    } else {
        (target_h * aspect, target_h)
    };

    if h > available_height {
        h = available_height;
        w = available_height * aspect;
    }
    if w > available_width {
        w = available_width;
        h = available_width / aspect;
    }

    LogicalSize::new(w, h).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/layout.rs"]
mod tests;
