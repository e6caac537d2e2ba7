use super::*;

#[test]
fn logical_size_rejects_degenerate_input() {
    assert!(LogicalSize::new(0.0, 10.0).is_err());
    assert!(LogicalSize::new(10.0, -1.0).is_err());
    assert!(LogicalSize::new(f64::NAN, 10.0).is_err());
    assert!(LogicalSize::new(f64::INFINITY, 10.0).is_err());
    assert!(LogicalSize::new(10.0, 20.0).is_ok());
}

#[test]
fn clamp_point_stays_inside_bounds() {
    let s = LogicalSize::new(100.0, 200.0).unwrap();
    assert_eq!(s.clamp_point(Point::new(-5.0, 250.0)), Point::new(0.0, 200.0));
    assert_eq!(s.clamp_point(Point::new(50.0, 60.0)), Point::new(50.0, 60.0));
}

#[test]
fn pixel_size_rounds_up_and_never_zero() {
    let s = LogicalSize::new(100.5, 0.2).unwrap();
    let px = PixelSize::from_logical(s, 2.0);
    assert_eq!(px.width, 201);
    assert_eq!(px.height, 1);
    assert_eq!(px.byte_len(), 201 * 4);
}

#[test]
fn bitmap_length_is_validated() {
    assert!(Bitmap::from_premul(2, 2, vec![0; 15]).is_err());
    let bm = Bitmap::from_premul(2, 2, vec![0; 16]).unwrap();
    assert!(bm.is_blank());
    assert!(bm.pixel(2, 0).is_none());
}

#[test]
fn premul_conversion_matches_reference() {
    let c = Rgba8Premul::from_straight_rgba(255, 0, 0, 128);
    assert_eq!(c.to_array(), [128, 0, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}
