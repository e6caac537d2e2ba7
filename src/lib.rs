//! Toothsketch is a per-tooth freehand raster annotation engine for dental charting views.
//!
//! Each annotated structure (a tooth section of the chart) gets a canvas sized to its base
//! illustration. The public API is session-oriented:
//!
//! - Open a session on an [`AnnotationEngine`] for an [`EntityKey`]
//! - Mount it into a container, then feed it pointer events
//! - Receive every canonical-resolution export through a [`PersistSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Base-image resolution and decode.
pub mod assets;
/// Dental chart addressing.
pub mod chart;
/// Engine configuration.
pub mod config;
/// Export encoding and persistence sinks.
pub mod encode;
/// Pointer mapping and layout fitting.
pub mod geometry;
/// Snapshot undo history.
pub mod history;
/// Rasterization.
pub mod render;
/// Session-oriented annotation API.
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Bitmap, LogicalSize, PixelSize, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{AnnotateError, AnnotateResult};

pub use crate::assets::source::{FsImageSource, ImageSource, MemoryImageSource};
pub use crate::chart::tooth::{ArchPosition, EntityKey, ToothSection};
pub use crate::config::{EngineConfig, ExportConfig, HostKind, HostProfile};
pub use crate::encode::export::EncodedImage;
pub use crate::encode::sink::{AnnotationStore, AnnotationUpdate, CallbackSink, PersistSink};
pub use crate::geometry::layout::{ContainerBox, MaxSize, fit_to_container};
pub use crate::geometry::pointer::{ElementBox, PointerEvent, TouchPoint, map_pointer_to_logical};
pub use crate::history::HistoryStack;
pub use crate::render::stroke::{StrokeColor, StrokeStyle};
pub use crate::session::canvas::{CanvasSession, PointerPhase, SessionOptions};
pub use crate::session::engine::{AnnotationEngine, SessionHandle, SessionRequest};
