//! One annotation canvas: layout, gesture capture, history and export for a single entity.
//!
//! A session starts `Pending` with its base image already resolved. `mount` supplies the container
//! and device pixel ratio, allocates the surface and replays any pointer input that arrived early.
//! Every history mutation queues an [`AnnotationUpdate`]; the owner drains them with
//! [`CanvasSession::take_updates`].

use std::collections::VecDeque;

use crate::chart::tooth::EntityKey;
use crate::config::{ExportConfig, HostProfile};
use crate::encode::export::{EncodedImage, export_bitmap};
use crate::encode::sink::AnnotationUpdate;
use crate::foundation::core::{Bitmap, LogicalSize, Point};
use crate::foundation::error::{AnnotateError, AnnotateResult};
use crate::geometry::layout::{ContainerBox, fit_to_container};
use crate::geometry::pointer::{ElementBox, PointerEvent, map_pointer_to_logical};
use crate::history::HistoryStack;
use crate::render::stroke::{StrokeRecorder, StrokeStyle};
use crate::render::surface::RasterSurface;

/// Kind of pointer input, as delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer left the element. Ends the gesture like `Up`.
    Leave,
    /// Input was cancelled by the platform. Ends the gesture like `Up`.
    Cancel,
}

/// Per-session settings fixed at open.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOptions {
    /// Layout and brush defaults of the host view.
    pub profile: HostProfile,
    /// Canonical export box.
    pub export: ExportConfig,
    /// Initial brush.
    pub style: StrokeStyle,
    /// Snapshot cap, floor included.
    pub history_limit: usize,
    /// Bound on pointer events held while pending.
    pub pending_input_limit: usize,
    /// Ignore drawing, undo and clear (e.g. an extracted tooth).
    pub read_only: bool,
}

impl SessionOptions {
    /// Options for a host profile with the engine defaults for everything else.
    pub fn for_profile(profile: HostProfile) -> Self {
        let cfg = crate::config::EngineConfig::default();
        Self {
            profile,
            export: cfg.export,
            style: profile.default_style(cfg.default_color),
            history_limit: cfg.history_limit,
            pending_input_limit: cfg.pending_input_limit,
            read_only: false,
        }
    }
}

#[derive(Debug)]
struct ReadyCanvas {
    surface: RasterSurface,
    history: HistoryStack,
    /// Whether `history[0]` carries an annotation (a persisted composite was loaded).
    floor_annotated: bool,
}

#[derive(Debug)]
enum CanvasState {
    Pending {
        queue: VecDeque<(PointerPhase, PointerEvent)>,
        dropped: usize,
    },
    Ready(Box<ReadyCanvas>),
}

/// Editing state for one entity key.
#[derive(Debug)]
pub struct CanvasSession {
    key: EntityKey,
    options: SessionOptions,
    style: StrokeStyle,
    recorder: StrokeRecorder,
    base: Option<Bitmap>,
    persisted: Option<EncodedImage>,
    /// Host-supplied on-screen box; kept across the pending state so queued input maps correctly.
    element: Option<ElementBox>,
    state: CanvasState,
    updates: Vec<AnnotationUpdate>,
}

impl CanvasSession {
    /// Pending session. `base` is `None` when the base image could not be loaded.
    pub fn new(
        key: EntityKey,
        base: Option<Bitmap>,
        persisted: Option<EncodedImage>,
        options: SessionOptions,
    ) -> Self {
        Self {
            key,
            style: options.style,
            options,
            recorder: StrokeRecorder::new(),
            base,
            persisted,
            element: None,
            state: CanvasState::Pending {
                queue: VecDeque::new(),
                dropped: 0,
            },
            updates: Vec::new(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether the surface has been allocated.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, CanvasState::Ready(_))
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.recorder.is_drawing()
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Change the brush for subsequent segments. Not recorded in history.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = StrokeStyle::new(style.color, style.thickness);
    }

    /// Natural-size base image, when it loaded.
    pub fn base_image(&self) -> Option<&Bitmap> {
        self.base.as_ref()
    }

    /// Pointer events waiting for the surface.
    pub fn pending_input(&self) -> usize {
        match &self.state {
            CanvasState::Pending { queue, .. } => queue.len(),
            CanvasState::Ready(_) => 0,
        }
    }

    /// Logical working size, once ready.
    pub fn logical_size(&self) -> Option<LogicalSize> {
        self.ready().map(|r| r.surface.logical())
    }

    /// Live pixels, once ready.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.ready().map(|r| r.surface.bitmap())
    }

    /// History, once ready.
    pub fn history(&self) -> Option<&HistoryStack> {
        self.ready().map(|r| &r.history)
    }

    /// On-screen box used to map pointer input, once set by the host or by mounting.
    pub fn element_box(&self) -> Option<ElementBox> {
        self.element
    }

    /// Update the on-screen box of the canvas element (scrolling, CSS scaling).
    ///
    /// Accepted while pending too; queued input is mapped against it on mount.
    pub fn set_element_box(&mut self, element: ElementBox) {
        self.element = Some(element);
    }

    /// Drain the updates produced since the last call, oldest first.
    pub fn take_updates(&mut self) -> Vec<AnnotationUpdate> {
        std::mem::take(&mut self.updates)
    }

    /// Allocate the surface for `container` and replay queued input.
    ///
    /// Without a host-supplied element box the canvas is assumed unscaled at the client origin.
    /// Hosts that display it elsewhere call [`CanvasSession::set_element_box`], before mounting
    /// when input may already be queued. Mounting a ready session behaves like
    /// [`CanvasSession::resize`].
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn mount(
        &mut self,
        container: ContainerBox,
        device_pixel_ratio: f64,
    ) -> AnnotateResult<()> {
        if self.is_ready() {
            return self.resize(container, device_pixel_ratio);
        }

        let logical = self.layout(container);
        let mut surface = RasterSurface::new(logical, device_pixel_ratio)?;

        let overlay = self.persisted.take().and_then(|img| match img.decode() {
            Ok(bm) => Some(bm),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "discarding unreadable persisted annotation"
                );
                None
            }
        });
        let layers: Vec<&Bitmap> = self.base.iter().chain(overlay.iter()).collect();
        surface.paint_layers(&layers)?;

        let history = HistoryStack::new(surface.bitmap().clone(), self.options.history_limit);
        self.element.get_or_insert_with(|| ElementBox::unscaled(Point::ORIGIN, logical));
        let ready = ReadyCanvas {
            surface,
            history,
            floor_annotated: overlay.is_some(),
        };

        let prev = std::mem::replace(&mut self.state, CanvasState::Ready(Box::new(ready)));
        tracing::debug!(width = logical.width, height = logical.height, "canvas ready");

        if let CanvasState::Pending { queue, dropped } = prev {
            if dropped > 0 {
                tracing::warn!(key = %self.key, dropped, "pointer input dropped while pending");
            }
            for (phase, event) in queue {
                self.pointer(phase, &event)?;
            }
        }
        Ok(())
    }

    /// Re-derive the layout for a new container.
    ///
    /// The current content is redrawn at the new size over the base image and becomes the new
    /// undo floor. A gesture in progress is committed first. No-op while pending.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn resize(
        &mut self,
        container: ContainerBox,
        device_pixel_ratio: f64,
    ) -> AnnotateResult<()> {
        if !self.is_ready() {
            return Ok(());
        }
        if self.recorder.is_drawing() {
            self.end_stroke()?;
        }

        let logical = self.layout(container);
        let base = self.base.as_ref();
        let CanvasState::Ready(r) = &mut self.state else {
            return Ok(());
        };
        if r.surface.logical() == logical && r.surface.device_pixel_ratio() == device_pixel_ratio {
            return Ok(());
        }

        let annotated = r.floor_annotated || r.history.can_undo();
        let current = r.surface.bitmap().clone();
        let mut surface = RasterSurface::new(logical, device_pixel_ratio)?;
        let layers: Vec<&Bitmap> = base.into_iter().chain(std::iter::once(&current)).collect();
        surface.paint_layers(&layers)?;

        let floor = surface.bitmap().clone();
        r.history.reset(floor);
        r.surface = surface;
        r.floor_annotated = annotated;
        let origin = self.element.map_or(Point::ORIGIN, |e| Point::new(e.left, e.top));
        self.element = Some(ElementBox::unscaled(origin, logical));
        tracing::debug!(width = logical.width, height = logical.height, "canvas resized");
        Ok(())
    }

    /// Route one pointer event.
    ///
    /// While pending, events are queued up to the configured bound. Read-only sessions ignore
    /// input entirely.
    pub fn pointer(&mut self, phase: PointerPhase, event: &PointerEvent) -> AnnotateResult<()> {
        if self.options.read_only {
            return Ok(());
        }
        let limit = self.options.pending_input_limit;
        let logical = match &mut self.state {
            CanvasState::Pending { queue, dropped } => {
                if queue.len() < limit {
                    queue.push_back((phase, event.clone()));
                } else {
                    *dropped += 1;
                }
                return Ok(());
            }
            CanvasState::Ready(r) => r.surface.logical(),
        };
        let element = self
            .element
            .unwrap_or_else(|| ElementBox::unscaled(Point::ORIGIN, logical));

        match phase {
            PointerPhase::Down => {
                if let Some(p) = map_pointer_to_logical(event, &element, logical) {
                    self.begin_stroke(p);
                }
                Ok(())
            }
            PointerPhase::Move => {
                if !self.recorder.is_drawing() {
                    return Ok(());
                }
                match map_pointer_to_logical(event, &element, logical) {
                    Some(p) => self.extend_stroke(p),
                    None => Ok(()),
                }
            }
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => self.end_stroke(),
        }
    }

    /// Start a gesture at a logical point. No-op when not ready, read-only or already drawing.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if self.options.read_only || !self.is_ready() {
            return false;
        }
        self.recorder.begin(point)
    }

    /// Extend the gesture to a logical point and paint the smoothed segment.
    pub fn extend_stroke(&mut self, point: Point) -> AnnotateResult<()> {
        let CanvasState::Ready(r) = &mut self.state else {
            return Ok(());
        };
        if let Some(segment) = self.recorder.extend(point) {
            r.surface.stroke_segment(&segment, self.style)?;
        }
        Ok(())
    }

    /// Finish the gesture: snapshot into history and export.
    pub fn end_stroke(&mut self) -> AnnotateResult<()> {
        if !self.recorder.end() {
            return Ok(());
        }
        let CanvasState::Ready(r) = &mut self.state else {
            return Ok(());
        };
        let snapshot = r.surface.bitmap().clone();
        r.history.push(snapshot);
        tracing::debug!(
            key = %self.key,
            len = r.history.len(),
            pointer = r.history.pointer(),
            "stroke committed"
        );
        self.persist_current()
    }

    /// Step back one snapshot and export the restored state. Returns whether anything changed.
    pub fn undo(&mut self) -> AnnotateResult<bool> {
        if self.options.read_only || self.recorder.is_drawing() {
            return Ok(false);
        }
        let CanvasState::Ready(r) = &mut self.state else {
            return Ok(false);
        };
        let Some(restored) = r.history.undo().cloned() else {
            return Ok(false);
        };
        r.surface.restore(&restored)?;
        tracing::debug!(key = %self.key, pointer = r.history.pointer(), "undo");
        self.persist_current()?;
        Ok(true)
    }

    /// Reset to the base image alone. History collapses to that state; the drawing is gone for
    /// good.
    pub fn clear(&mut self) -> AnnotateResult<()> {
        if self.options.read_only {
            return Ok(());
        }
        self.recorder.end();
        let base = self.base.as_ref();
        let CanvasState::Ready(r) = &mut self.state else {
            return Ok(());
        };
        let layers: Vec<&Bitmap> = base.into_iter().collect();
        r.surface.paint_layers(&layers)?;
        let floor = r.surface.bitmap().clone();
        r.history.reset(floor);
        r.floor_annotated = false;
        tracing::debug!(key = %self.key, "cleared");
        self.updates.push(AnnotationUpdate::Cleared);
        Ok(())
    }

    /// Encode the live composite at the canonical resolution.
    pub fn export(&self) -> AnnotateResult<EncodedImage> {
        let r = self
            .ready()
            .ok_or_else(|| AnnotateError::validation("cannot export a session that is not ready"))?;
        export_bitmap(
            r.surface.bitmap(),
            r.surface.logical().aspect_ratio(),
            self.options.export,
        )
    }

    /// Final flush before the session is dropped. A gesture in progress is committed.
    ///
    /// Pending sessions have nothing to flush.
    pub fn close(&mut self) -> AnnotateResult<()> {
        if !self.is_ready() {
            return Ok(());
        }
        if self.recorder.is_drawing() {
            self.end_stroke()?;
        }
        self.persist_current()
    }

    fn persist_current(&mut self) -> AnnotateResult<()> {
        let annotated = match self.ready() {
            Some(r) => r.floor_annotated || r.history.can_undo(),
            None => return Ok(()),
        };
        let update = if annotated {
            AnnotationUpdate::Composite(self.export()?)
        } else {
            AnnotationUpdate::Cleared
        };
        self.updates.push(update);
        Ok(())
    }

    fn layout(&self, container: ContainerBox) -> LogicalSize {
        let profile = &self.options.profile;
        let Some(base) = &self.base else {
            tracing::warn!(key = %self.key, "base image unavailable, using fallback size");
            return profile.fallback_size;
        };
        let aspect = f64::from(base.width) / f64::from(base.height);
        let (aw, ah) = container.available(profile.padding);
        fit_to_container(aspect, aw, ah, profile.max_size)
            .or_else(|| {
                tracing::warn!(
                    key = %self.key,
                    "container has no room, fitting into fallback size"
                );
                fit_to_container(
                    aspect,
                    profile.fallback_size.width,
                    profile.fallback_size.height,
                    None,
                )
            })
            .unwrap_or(profile.fallback_size)
    }

    fn ready(&self) -> Option<&ReadyCanvas> {
        match &self.state {
            CanvasState::Ready(r) => Some(r),
            CanvasState::Pending { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/canvas.rs"]
mod tests;
