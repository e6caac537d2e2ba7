use super::*;

fn assert_fits(aspect: f64, aw: f64, ah: f64, max: Option<MaxSize>) {
    let s = fit_to_container(aspect, aw, ah, max).unwrap();
    assert!(
        (s.aspect_ratio() - aspect).abs() <= 1e-9 * aspect.max(1.0),
        "aspect {aspect} got {}",
        s.aspect_ratio()
    );
    assert!(s.width <= aw + 1e-9, "width {} > {aw}", s.width);
    assert!(s.height <= ah + 1e-9, "height {} > {ah}", s.height);
    if let Some(m) = max {
        assert!(s.width <= m.width + 1e-9);
        assert!(s.height <= m.height + 1e-9);
    }
}

#[test]
fn aspect_is_preserved_across_a_grid_of_containers() {
    let aspects = [0.25, 0.5, 0.75, 1.0, 4.0 / 3.0, 2.0, 7.3];
    let sizes = [
        (100.0, 100.0),
        (1920.0, 1080.0),
        (320.0, 900.0),
        (17.0, 3.0),
        (1.0, 1000.0),
    ];
    for &a in &aspects {
        for &(w, h) in &sizes {
            assert_fits(a, w, h, None);
            assert_fits(
                a,
                w,
                h,
                Some(MaxSize {
                    width: 800.0,
                    height: 1000.0,
                }),
            );
        }
    }
}

#[test]
fn wide_image_binds_on_width() {
    let s = fit_to_container(2.0, 400.0, 400.0, None).unwrap();
    assert_eq!(s.width, 400.0);
    assert_eq!(s.height, 200.0);
}

#[test]
fn tall_image_binds_on_height() {
    let s = fit_to_container(0.5, 400.0, 400.0, None).unwrap();
    assert_eq!(s.width, 200.0);
    assert_eq!(s.height, 400.0);
}

#[test]
fn max_size_caps_a_large_container() {
    let s = fit_to_container(
        0.5,
        3000.0,
        3000.0,
        Some(MaxSize {
            width: 800.0,
            height: 1000.0,
        }),
    )
    .unwrap();
    assert_eq!(s.width, 500.0);
    assert_eq!(s.height, 1000.0);
}

#[test]
fn degenerate_inputs_do_not_fit() {
    assert!(fit_to_container(0.0, 100.0, 100.0, None).is_none());
    assert!(fit_to_container(f64::NAN, 100.0, 100.0, None).is_none());
    assert!(fit_to_container(1.0, 0.0, 100.0, None).is_none());
}

#[test]
fn padding_allowance_saturates() {
    let c = ContainerBox::new(300.0, 10.0);
    assert_eq!(c.available(16.0), (284.0, 0.0));
    assert_eq!(ContainerBox::new(f64::NAN, 50.0).available(0.0), (0.0, 50.0));
}
