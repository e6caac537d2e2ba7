use super::*;

#[test]
fn extend_without_begin_is_a_no_op() {
    let mut r = StrokeRecorder::new();
    assert!(r.extend(Point::new(1.0, 1.0)).is_none());
    assert!(!r.end());
    assert!(!r.is_drawing());
}

#[test]
fn begin_twice_is_rejected() {
    let mut r = StrokeRecorder::new();
    assert!(r.begin(Point::new(0.0, 0.0)));
    assert!(!r.begin(Point::new(5.0, 5.0)));
    assert_eq!(r.active_origin(), Some(Point::new(0.0, 0.0)));
}

#[test]
fn segments_chain_through_midpoints() {
    let mut r = StrokeRecorder::new();
    r.begin(Point::new(0.0, 0.0));

    let a = r.extend(Point::new(10.0, 0.0)).unwrap();
    assert_eq!(a.start, Point::new(0.0, 0.0));
    assert_eq!(a.control, Point::new(0.0, 0.0));
    assert_eq!(a.end, Point::new(5.0, 0.0));

    let b = r.extend(Point::new(10.0, 10.0)).unwrap();
    assert_eq!(b.start, a.end);
    assert_eq!(b.control, Point::new(10.0, 0.0));
    assert_eq!(b.end, Point::new(10.0, 5.0));

    assert_eq!(r.active_origin(), Some(Point::new(10.0, 10.0)));
    assert_eq!(r.segment_count(), 2);
    assert!(r.end());
    assert!(!r.is_drawing());
    assert_eq!(r.active_origin(), None);
}

#[test]
fn paint_bounds_cover_hull_and_caps() {
    let seg = StrokeSegment {
        start: Point::new(10.0, 10.0),
        control: Point::new(20.0, 0.0),
        end: Point::new(30.0, 10.0),
    };
    let b = seg.paint_bounds(8.0);
    assert!(b.x0 <= 6.0 && b.y0 <= -4.0);
    assert!(b.x1 >= 34.0 && b.y1 >= 14.0);
    assert_eq!(seg.to_path().elements().len(), 2);
}

#[test]
fn thickness_is_clamped_and_palette_parses() {
    assert_eq!(StrokeStyle::new(StrokeColor::Red, 0).thickness, 1);
    assert_eq!(StrokeStyle::new(StrokeColor::Red, 99).thickness, 30);
    assert_eq!(StrokeColor::from_hex("#ff0000"), Some(StrokeColor::Red));
    assert_eq!(StrokeColor::from_hex("#123456"), None);
    assert_eq!(StrokeColor::Green.rgba8(), [0, 255, 0, 255]);
}
