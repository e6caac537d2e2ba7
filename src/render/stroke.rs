//! Freehand gesture capture and smoothing.
//!
//! Raw pointer samples are joined with quadratic segments whose control point is the previous
//! sample and whose end point is the midpoint between the previous and current samples. Consecutive
//! segments therefore share tangents at the midpoints, which hides the facets a plain polyline over
//! discrete samples would show.

use crate::foundation::core::{BezPath, Point, Rect};

/// Thinnest stroke accepted.
pub const THICKNESS_MIN: u32 = 1;
/// Thickest stroke accepted.
pub const THICKNESS_MAX: u32 = 30;

/// The fixed annotation palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeColor {
    /// `#0000FF`
    #[default]
    Blue,
    /// `#FF0000`
    Red,
    /// `#00FF00`
    Green,
}

impl StrokeColor {
    /// Every palette entry, in display order.
    pub const ALL: [StrokeColor; 3] = [StrokeColor::Blue, StrokeColor::Red, StrokeColor::Green];

    /// Straight-alpha RGBA8.
    pub fn rgba8(self) -> [u8; 4] {
        match self {
            Self::Blue => [0, 0, 255, 255],
            Self::Red => [255, 0, 0, 255],
            Self::Green => [0, 255, 0, 255],
        }
    }

    /// `#RRGGBB` form.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#0000FF",
            Self::Red => "#FF0000",
            Self::Green => "#00FF00",
        }
    }

    /// Parse a `#RRGGBB` string (case-insensitive) into a palette entry.
    pub fn from_hex(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(s.trim()))
    }
}

/// Session-scoped brush settings. Not versioned by history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// Palette color.
    pub color: StrokeColor,
    /// Line width in logical units, within `THICKNESS_MIN..=THICKNESS_MAX`.
    pub thickness: u32,
}

impl StrokeStyle {
    /// Style with the thickness clamped into the accepted range.
    pub fn new(color: StrokeColor, thickness: u32) -> Self {
        Self {
            color,
            thickness: clamp_thickness(thickness),
        }
    }

    /// Line width as used by the rasterizer.
    pub fn width(self) -> f64 {
        f64::from(self.thickness)
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(StrokeColor::default(), 8)
    }
}

/// Clamp a requested thickness into `THICKNESS_MIN..=THICKNESS_MAX`.
pub fn clamp_thickness(thickness: u32) -> u32 {
    thickness.clamp(THICKNESS_MIN, THICKNESS_MAX)
}

/// One smoothed piece of a gesture, ready to rasterize.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeSegment {
    /// Where the previous segment ended (or the gesture origin).
    pub start: Point,
    /// Quadratic control point: the previous raw sample.
    pub control: Point,
    /// Midpoint between the previous and current raw samples.
    pub end: Point,
}

impl StrokeSegment {
    /// Segment as a path.
    pub fn to_path(&self) -> BezPath {
        let mut p = BezPath::new();
        p.move_to(self.start);
        p.quad_to(self.control, self.end);
        p
    }

    /// Conservative bounds of the painted area for a given line width.
    ///
    /// A quadratic lies inside the hull of its three points; round caps add half the width.
    pub fn paint_bounds(&self, width: f64) -> Rect {
        let half = width / 2.0 + 1.0;
        let x0 = self.start.x.min(self.control.x).min(self.end.x) - half;
        let y0 = self.start.y.min(self.control.y).min(self.end.y) - half;
        let x1 = self.start.x.max(self.control.x).max(self.end.x) + half;
        let y1 = self.start.y.max(self.control.y).max(self.end.y) + half;
        Rect::new(x0, y0, x1, y1)
    }
}

/// Per-gesture state of the stroke recorder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeRecorder {
    drawing: bool,
    /// Last raw sample of the gesture in progress.
    origin: Option<Point>,
    /// Where the next segment starts.
    pen: Option<Point>,
    segments: usize,
}

impl StrokeRecorder {
    /// Idle recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Last raw sample of the gesture in progress.
    pub fn active_origin(&self) -> Option<Point> {
        self.origin
    }

    /// Segments emitted by the current (or last) gesture.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Start a gesture. Returns `false` (and changes nothing) if one is already in progress.
    pub fn begin(&mut self, point: Point) -> bool {
        if self.drawing {
            return false;
        }
        self.drawing = true;
        self.origin = Some(point);
        self.pen = Some(point);
        self.segments = 0;
        true
    }

    /// Feed one pointer sample. Returns the segment to paint, or `None` when idle.
    pub fn extend(&mut self, point: Point) -> Option<StrokeSegment> {
        if !self.drawing {
            return None;
        }
        let origin = self.origin?;
        let start = self.pen.unwrap_or(origin);
        let end = origin.midpoint(point);

        self.origin = Some(point);
        self.pen = Some(end);
        self.segments += 1;
        Some(StrokeSegment {
            start,
            control: origin,
            end,
        })
    }

    /// Finish the gesture. Returns `false` when there was none.
    pub fn end(&mut self) -> bool {
        if !self.drawing {
            return false;
        }
        self.drawing = false;
        self.origin = None;
        self.pen = None;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stroke.rs"]
mod tests;
