use super::*;
use crate::foundation::core::Point;
use crate::render::stroke::{StrokeColor, StrokeRecorder};

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Bitmap {
    Bitmap::from_premul(width, height, rgba.repeat((width * height) as usize)).unwrap()
}

#[test]
fn physical_size_follows_device_pixel_ratio() {
    let s = RasterSurface::new(LogicalSize::new(50.0, 100.0).unwrap(), 2.0).unwrap();
    assert_eq!(s.physical(), PixelSize {
        width: 100,
        height: 200
    });
    assert!(s.bitmap().is_blank());
}

#[test]
fn invalid_device_pixel_ratio_is_rejected() {
    let l = LogicalSize::new(10.0, 10.0).unwrap();
    assert!(RasterSurface::new(l, 0.0).is_err());
    assert!(RasterSurface::new(l, f64::NAN).is_err());
}

#[test]
fn oversized_surface_is_rejected() {
    let l = LogicalSize::new(70_000.0, 10.0).unwrap();
    assert!(RasterSurface::new(l, 1.0).is_err());
}

#[test]
fn base_layer_fills_entire_surface() {
    let mut s = RasterSurface::new(LogicalSize::new(20.0, 40.0).unwrap(), 1.5).unwrap();
    let base = solid(4, 8, [10, 200, 30, 255]);
    s.paint_layers(&[&base]).unwrap();

    let px = s.physical();
    for (x, y) in [(0, 0), (px.width / 2, px.height / 2), (px.width - 1, px.height - 1)] {
        let p = s.bitmap().pixel(x, y).unwrap();
        assert_eq!(p.a, 255, "pixel {x},{y} not opaque");
        assert!((i16::from(p.g) - 200).abs() <= 2);
    }
}

#[test]
fn stroke_segment_paints_only_near_the_path() {
    let mut s = RasterSurface::new(LogicalSize::new(100.0, 100.0).unwrap(), 2.0).unwrap();
    let mut rec = StrokeRecorder::new();
    rec.begin(Point::new(10.0, 50.0));
    rec.extend(Point::new(50.0, 50.0));
    let seg = rec.extend(Point::new(90.0, 50.0)).unwrap();

    s.stroke_segment(&seg, StrokeStyle::new(StrokeColor::Red, 6))
        .unwrap();

    // Segment runs from (30,50) through (50,50) to (70,50) in logical units.
    let on = s.bitmap().pixel(100, 100).unwrap();
    assert_eq!(on.a, 255);
    assert_eq!(on.r, 255);
    let off = s.bitmap().pixel(100, 20).unwrap();
    assert_eq!(off.a, 0);
}

#[test]
fn restore_checks_size() {
    let mut s = RasterSurface::new(LogicalSize::new(10.0, 10.0).unwrap(), 1.0).unwrap();
    assert!(s.restore(&solid(5, 5, [0, 0, 0, 255])).is_err());
    s.restore(&solid(10, 10, [1, 2, 3, 255])).unwrap();
    assert_eq!(s.bitmap().pixel(3, 3).unwrap().to_array(), [1, 2, 3, 255]);
}
