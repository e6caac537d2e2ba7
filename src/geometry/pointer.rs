//! Pointer-to-canvas coordinate mapping.
//!
//! Hosts hand over raw client-space pointer positions and the canvas element's current on-screen
//! box. Both change between events (scrolling, responsive resizes), so nothing here is cached.

use crate::foundation::core::{LogicalSize, Point, Rect, Vec2};

/// One touch contact in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TouchPoint {
    /// Client-space X.
    pub client_x: f64,
    /// Client-space Y.
    pub client_y: f64,
}

/// A pointer event in the two shapes hosts produce.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Mouse (or pen) pointer.
    Mouse {
        /// Client-space X.
        client_x: f64,
        /// Client-space Y.
        client_y: f64,
    },
    /// Touch event carrying the active contacts and the contacts that changed.
    Touch {
        /// Contacts currently on the surface.
        #[serde(default)]
        touches: Vec<TouchPoint>,
        /// Contacts that changed in this event (the lifted finger on touch-end).
        #[serde(default)]
        changed_touches: Vec<TouchPoint>,
    },
}

impl PointerEvent {
    /// Mouse event at a client position.
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self::Mouse { client_x, client_y }
    }

    /// Single-contact touch event at a client position.
    pub fn touch(client_x: f64, client_y: f64) -> Self {
        Self::Touch {
            touches: vec![TouchPoint { client_x, client_y }],
            changed_touches: Vec::new(),
        }
    }

    /// Client-space position of the primary pointer.
    ///
    /// For touch, the primary contact is the first active touch, falling back to the first changed
    /// touch. Returns `None` for a touch event without any contact.
    pub fn primary_client_point(&self) -> Option<Point> {
        match self {
            Self::Mouse { client_x, client_y } => Some(Point::new(*client_x, *client_y)),
            Self::Touch {
                touches,
                changed_touches,
            } => touches
                .first()
                .or_else(|| changed_touches.first())
                .map(|t| Point::new(t.client_x, t.client_y)),
        }
    }
}

/// On-screen bounding box of the canvas element, in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementBox {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Displayed width (CSS pixels).
    pub width: f64,
    /// Displayed height (CSS pixels).
    pub height: f64,
}

impl ElementBox {
    /// Box from a client-space rectangle.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Box from a page-space (document) rectangle and the current scroll offset.
    pub fn from_page_rect(page: Rect, scroll: Vec2) -> Self {
        Self {
            left: page.x0 - scroll.x,
            top: page.y0 - scroll.y,
            width: page.width(),
            height: page.height(),
        }
    }

    /// Box displayed at exactly the logical size, positioned at `origin`.
    pub fn unscaled(origin: Point, logical: LogicalSize) -> Self {
        Self::new(origin.x, origin.y, logical.width, logical.height)
    }

    /// Client-space center of the box.
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Map an event's primary pointer into logical canvas coordinates.
///
/// The result is clamped to `[0, logical.width] x [0, logical.height]`. The device pixel ratio
/// plays no part: drawing happens in logical units under a device-pixel-ratio transform.
pub fn map_pointer_to_logical(
    event: &PointerEvent,
    element: &ElementBox,
    logical: LogicalSize,
) -> Option<Point> {
    let client = event.primary_client_point()?;
    Some(map_client_to_logical(client, element, logical))
}

/// Map a client-space point into logical canvas coordinates (clamped).
pub fn map_client_to_logical(client: Point, element: &ElementBox, logical: LogicalSize) -> Point {
    let rel_x = client.x - element.left;
    let rel_y = client.y - element.top;

    // A collapsed element has no meaningful scale; pin to the origin side.
    let scale_x = axis_scale(logical.width, element.width);
    let scale_y = axis_scale(logical.height, element.height);

    let x = rel_x * scale_x;
    let y = rel_y * scale_y;
    logical.clamp_point(Point::new(
        if x.is_finite() { x } else { 0.0 },
        if y.is_finite() { y } else { 0.0 },
    ))
}

fn axis_scale(logical: f64, displayed: f64) -> f64 {
    if displayed.is_finite() && displayed > 0.0 {
        logical / displayed
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/pointer.rs"]
mod tests;
