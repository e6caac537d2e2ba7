//! Handle-based front end over [`CanvasSession`]s.
//!
//! The engine resolves base images, owns every open session and forwards each export to the
//! sinks registered for that session. All calls are synchronous; the only state shared between
//! sessions is whatever the sinks write to.

use std::collections::BTreeMap;

use crate::assets::decode::decode_image;
use crate::assets::source::ImageSource;
use crate::chart::tooth::EntityKey;
use crate::config::{EngineConfig, HostKind};
use crate::encode::export::EncodedImage;
use crate::encode::sink::{AnnotationUpdate, CallbackSink, PersistSink};
use crate::foundation::core::Bitmap;
use crate::foundation::error::{AnnotateError, AnnotateResult};
use crate::geometry::layout::ContainerBox;
use crate::geometry::pointer::{ElementBox, PointerEvent};
use crate::render::stroke::StrokeStyle;
use crate::session::canvas::{CanvasSession, PointerPhase, SessionOptions};

/// Opaque session identifier. Never reused within one engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Everything needed to open a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    /// Identity the exports are keyed by.
    pub key: EntityKey,
    /// Base image reference handed to the [`ImageSource`].
    pub base_image: String,
    /// Previously persisted composite, if any.
    pub persisted: Option<EncodedImage>,
    /// Host view the canvas is shown in.
    pub host: HostKind,
    /// Open for viewing only.
    pub read_only: bool,
}

impl SessionRequest {
    /// Editable dialog session.
    pub fn new(key: EntityKey, base_image: impl Into<String>) -> Self {
        Self {
            key,
            base_image: base_image.into(),
            persisted: None,
            host: HostKind::default(),
            read_only: false,
        }
    }

    /// Attach a stored annotation. Blank strings count as absent.
    pub fn with_persisted(mut self, stored: impl Into<String>) -> Self {
        self.persisted = EncodedImage::from_stored(stored);
        self
    }

    pub fn with_host(mut self, host: HostKind) -> Self {
        self.host = host;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

struct SessionEntry {
    canvas: CanvasSession,
    sinks: Vec<Box<dyn PersistSink>>,
}

/// Owner of all open annotation sessions.
pub struct AnnotationEngine {
    config: EngineConfig,
    images: Box<dyn ImageSource>,
    sessions: BTreeMap<SessionHandle, SessionEntry>,
    next_handle: u64,
}

impl std::fmt::Debug for AnnotationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationEngine")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl AnnotationEngine {
    /// Engine resolving base images through `images`. The configuration is validated.
    pub fn new(config: EngineConfig, images: impl ImageSource + 'static) -> AnnotateResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            images: Box::new(images),
            sessions: BTreeMap::new(),
            next_handle: 1,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open an editable dialog session. See [`AnnotationEngine::open`].
    pub fn open_session(
        &mut self,
        key: EntityKey,
        base_image: &str,
        persisted: Option<&str>,
    ) -> SessionHandle {
        let mut req = SessionRequest::new(key, base_image);
        if let Some(stored) = persisted {
            req = req.with_persisted(stored);
        }
        self.open(req)
    }

    /// Open a session in the `Pending` state.
    ///
    /// The base image is resolved now; a failure is logged and the session falls back to a blank
    /// surface of the host's fallback size once mounted.
    pub fn open(&mut self, req: SessionRequest) -> SessionHandle {
        let profile = *self.config.profile(req.host);
        let options = SessionOptions {
            profile,
            export: self.config.export,
            style: profile.default_style(self.config.default_color),
            history_limit: self.config.history_limit,
            pending_input_limit: self.config.pending_input_limit,
            read_only: req.read_only,
        };
        let base = self.load_base(&req.key, &req.base_image);
        let canvas = CanvasSession::new(req.key, base, req.persisted, options);

        let handle = SessionHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(handle = handle.0, key = %canvas.key(), "session opened");
        self.sessions.insert(
            handle,
            SessionEntry {
                canvas,
                sinks: Vec::new(),
            },
        );
        handle
    }

    /// Supply the container and device pixel ratio; the session becomes ready.
    pub fn mount(
        &mut self,
        handle: SessionHandle,
        container: ContainerBox,
        device_pixel_ratio: f64,
    ) -> AnnotateResult<()> {
        self.with_session(handle, |c| c.mount(container, device_pixel_ratio))
    }

    /// Re-derive the layout after the container changed.
    pub fn resize(
        &mut self,
        handle: SessionHandle,
        container: ContainerBox,
        device_pixel_ratio: f64,
    ) -> AnnotateResult<()> {
        self.with_session(handle, |c| c.resize(container, device_pixel_ratio))
    }

    /// Tell the session where its canvas element currently sits on screen.
    pub fn set_element_box(
        &mut self,
        handle: SessionHandle,
        element: ElementBox,
    ) -> AnnotateResult<()> {
        self.with_session(handle, |c| {
            c.set_element_box(element);
            Ok(())
        })
    }

    pub fn pointer_down(
        &mut self,
        handle: SessionHandle,
        event: &PointerEvent,
    ) -> AnnotateResult<()> {
        self.pointer(handle, PointerPhase::Down, event)
    }

    pub fn pointer_move(
        &mut self,
        handle: SessionHandle,
        event: &PointerEvent,
    ) -> AnnotateResult<()> {
        self.pointer(handle, PointerPhase::Move, event)
    }

    pub fn pointer_up(
        &mut self,
        handle: SessionHandle,
        event: &PointerEvent,
    ) -> AnnotateResult<()> {
        self.pointer(handle, PointerPhase::Up, event)
    }

    pub fn pointer_leave(
        &mut self,
        handle: SessionHandle,
        event: &PointerEvent,
    ) -> AnnotateResult<()> {
        self.pointer(handle, PointerPhase::Leave, event)
    }

    pub fn pointer_cancel(
        &mut self,
        handle: SessionHandle,
        event: &PointerEvent,
    ) -> AnnotateResult<()> {
        self.pointer(handle, PointerPhase::Cancel, event)
    }

    /// Route a pointer event of any phase.
    pub fn pointer(
        &mut self,
        handle: SessionHandle,
        phase: PointerPhase,
        event: &PointerEvent,
    ) -> AnnotateResult<()> {
        self.with_session(handle, |c| c.pointer(phase, event))
    }

    /// Undo the last gesture. Returns whether anything changed.
    pub fn undo(&mut self, handle: SessionHandle) -> AnnotateResult<bool> {
        self.with_session(handle, CanvasSession::undo)
    }

    /// Destructively reset to the base image.
    pub fn clear(&mut self, handle: SessionHandle) -> AnnotateResult<()> {
        self.with_session(handle, CanvasSession::clear)
    }

    pub fn set_style(&mut self, handle: SessionHandle, style: StrokeStyle) -> AnnotateResult<()> {
        self.with_session(handle, |c| {
            c.set_style(style);
            Ok(())
        })
    }

    /// Register a callback for every export of this session.
    pub fn on_persist<F>(&mut self, handle: SessionHandle, callback: F) -> AnnotateResult<()>
    where
        F: FnMut(&EntityKey, &AnnotationUpdate) -> AnnotateResult<()> + 'static,
    {
        self.add_sink(handle, CallbackSink(callback))
    }

    /// Register a sink for every export of this session.
    pub fn add_sink(
        &mut self,
        handle: SessionHandle,
        sink: impl PersistSink + 'static,
    ) -> AnnotateResult<()> {
        let entry = self.entry_mut(handle)?;
        entry.sinks.push(Box::new(sink));
        Ok(())
    }

    /// Final export, then drop the session.
    ///
    /// The session is released even when the export or a sink fails; the error is still
    /// returned so the host can warn the user.
    pub fn close_session(&mut self, handle: SessionHandle) -> AnnotateResult<()> {
        let mut entry = self
            .sessions
            .remove(&handle)
            .ok_or_else(|| unknown_handle(handle))?;
        let res = entry.canvas.close().and_then(|()| flush(&mut entry));
        tracing::debug!(handle = handle.0, key = %entry.canvas.key(), "session closed");
        res
    }

    /// Read-only view of an open session.
    pub fn session(&self, handle: SessionHandle) -> Option<&CanvasSession> {
        self.sessions.get(&handle).map(|e| &e.canvas)
    }

    /// Whether the session exists and has been mounted.
    pub fn is_ready(&self, handle: SessionHandle) -> bool {
        self.session(handle).is_some_and(CanvasSession::is_ready)
    }

    /// Handles of all open sessions, oldest first.
    pub fn handles(&self) -> impl Iterator<Item = SessionHandle> + '_ {
        self.sessions.keys().copied()
    }

    fn load_base(&self, key: &EntityKey, reference: &str) -> Option<Bitmap> {
        let loaded = self.images.load(reference).and_then(|bytes| decode_image(&bytes));
        match loaded {
            Ok(bm) if bm.width > 0 && bm.height > 0 => Some(bm),
            Ok(_) => {
                tracing::warn!(%key, reference, "base image is empty");
                None
            }
            Err(e) => {
                tracing::warn!(%key, reference, error = %e, "base image unavailable");
                None
            }
        }
    }

    fn entry_mut(&mut self, handle: SessionHandle) -> AnnotateResult<&mut SessionEntry> {
        self.sessions
            .get_mut(&handle)
            .ok_or_else(|| unknown_handle(handle))
    }

    /// Run `op` on the session, then hand its queued updates to the sinks.
    ///
    /// Updates produced before a failure are still delivered.
    fn with_session<T>(
        &mut self,
        handle: SessionHandle,
        op: impl FnOnce(&mut CanvasSession) -> AnnotateResult<T>,
    ) -> AnnotateResult<T> {
        let entry = self.entry_mut(handle)?;
        let res = op(&mut entry.canvas);
        let flushed = flush(entry);
        let out = res?;
        flushed?;
        Ok(out)
    }
}

fn flush(entry: &mut SessionEntry) -> AnnotateResult<()> {
    for update in entry.canvas.take_updates() {
        for sink in &mut entry.sinks {
            sink.persist(entry.canvas.key(), &update)?;
        }
    }
    Ok(())
}

fn unknown_handle(handle: SessionHandle) -> AnnotateError {
    AnnotateError::validation(format!("unknown session handle {}", handle.0))
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
