/// Raster decode into premultiplied bitmaps.
pub mod decode;
/// Base-image resolution.
pub mod source;
