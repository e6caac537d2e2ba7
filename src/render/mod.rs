/// Premultiplied source-over compositing.
pub mod composite;
/// Freehand stroke smoothing and brush style.
pub mod stroke;
/// Device-pixel-ratio aware raster surface.
pub mod surface;
