use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::assets::source::MemoryImageSource;
use crate::encode::export::encode_png;
use crate::encode::sink::AnnotationStore;

fn png(width: u32, height: u32) -> Vec<u8> {
    let bm = Bitmap::from_premul(
        width,
        height,
        [200, 200, 200, 255].repeat((width * height) as usize),
    )
    .unwrap();
    encode_png(&bm).unwrap()
}

fn engine() -> AnnotationEngine {
    let cfg = EngineConfig {
        export: crate::config::ExportConfig {
            width: 40,
            height: 80,
        },
        ..EngineConfig::default()
    };
    let images = MemoryImageSource::new().with("teeth-image/18.png", png(10, 20));
    AnnotationEngine::new(cfg, images).unwrap()
}

fn stroke(e: &mut AnnotationEngine, h: SessionHandle) {
    e.pointer_down(h, &PointerEvent::mouse(10.0, 50.0)).unwrap();
    e.pointer_move(h, &PointerEvent::mouse(30.0, 50.0)).unwrap();
    e.pointer_move(h, &PointerEvent::mouse(50.0, 50.0)).unwrap();
    e.pointer_up(h, &PointerEvent::mouse(50.0, 50.0)).unwrap();
}

#[test]
fn handles_are_unique_and_unknown_ones_error() {
    let mut e = engine();
    let a = e.open_session(EntityKey::new("top-0"), "teeth-image/18.png", None);
    let b = e.open_session(EntityKey::new("top-1"), "teeth-image/17.png", None);
    assert_ne!(a, b);
    assert_eq!(e.handles().count(), 2);

    e.close_session(a).unwrap();
    assert!(e.session(a).is_none());
    assert!(matches!(e.undo(a), Err(AnnotateError::Validation(_))));
    assert!(e.close_session(a).is_err());
}

#[test]
fn missing_base_image_still_opens() {
    let mut e = engine();
    let h = e.open_session(EntityKey::new("top-1"), "teeth-image/17.png", None);
    assert!(e.session(h).unwrap().base_image().is_none());
    e.mount(h, ContainerBox::new(500.0, 500.0), 1.0).unwrap();
    assert!(e.is_ready(h));
    assert_eq!(
        e.session(h).unwrap().logical_size(),
        Some(e.config().dialog.fallback_size)
    );
}

#[test]
fn persist_callbacks_see_every_export_in_order() {
    let mut e = engine();
    let h = e.open_session(EntityKey::new("top-0"), "teeth-image/18.png", Some(""));
    let log = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&log);
    e.on_persist(h, move |k, u| {
        seen.borrow_mut()
            .push((k.to_string(), matches!(u, AnnotationUpdate::Composite(_))));
        Ok(())
    })
    .unwrap();

    assert!(!e.is_ready(h));
    e.mount(h, ContainerBox::new(120.0, 220.0), 1.0).unwrap();
    stroke(&mut e, h);
    assert!(e.undo(h).unwrap());
    stroke(&mut e, h);
    e.clear(h).unwrap();
    e.close_session(h).unwrap();

    let log = log.borrow();
    let kinds: Vec<bool> = log.iter().map(|(_, c)| *c).collect();
    assert_eq!(kinds, vec![true, false, true, false, false]);
    assert!(log.iter().all(|(k, _)| k == "top-0"));
}

#[test]
fn shared_store_tracks_latest_composite() {
    let mut e = engine();
    let store = Rc::new(RefCell::new(AnnotationStore::new()));
    let key = EntityKey::new("top-0");
    let h = e.open_session(key.clone(), "teeth-image/18.png", None);
    e.add_sink(h, Rc::clone(&store)).unwrap();
    e.mount(h, ContainerBox::new(120.0, 220.0), 1.0).unwrap();
    stroke(&mut e, h);

    let stored = store.borrow().get(&key).cloned().unwrap();
    let decoded = stored.decode().unwrap();
    assert_eq!((decoded.width, decoded.height), (40, 80));
}

#[test]
fn sink_failure_is_surfaced_and_close_still_releases() {
    let mut e = engine();
    let h = e.open_session(EntityKey::new("top-0"), "teeth-image/18.png", None);
    e.on_persist(h, |_, _| Err(AnnotateError::persist("store offline")))
        .unwrap();
    e.mount(h, ContainerBox::new(120.0, 220.0), 1.0).unwrap();

    e.pointer_down(h, &PointerEvent::mouse(10.0, 50.0)).unwrap();
    let err = e.pointer_up(h, &PointerEvent::mouse(10.0, 50.0)).unwrap_err();
    assert!(matches!(err, AnnotateError::Persist(_)));
    assert_eq!(e.session(h).unwrap().history().unwrap().len(), 2);

    assert!(e.close_session(h).is_err());
    assert!(e.session(h).is_none());
}

#[test]
fn style_and_element_box_are_forwarded() {
    let mut e = engine();
    let h = e.open_session(EntityKey::new("top-0"), "teeth-image/18.png", None);
    e.set_style(h, StrokeStyle::new(crate::render::stroke::StrokeColor::Green, 3))
        .unwrap();
    assert_eq!(e.session(h).unwrap().style().thickness, 3);

    e.mount(h, ContainerBox::new(120.0, 220.0), 1.0).unwrap();
    let b = ElementBox::new(5.0, 5.0, 50.0, 100.0);
    e.set_element_box(h, b).unwrap();
    assert_eq!(e.session(h).unwrap().element_box(), Some(b));
}

#[test]
fn read_only_requests_are_honored() {
    let mut e = engine();
    let h = e.open(
        SessionRequest::new(EntityKey::new("top-0"), "teeth-image/18.png")
            .with_host(HostKind::Modal)
            .read_only(true),
    );
    e.mount(h, ContainerBox::new(120.0, 220.0), 1.0).unwrap();
    stroke(&mut e, h);
    let s = e.session(h).unwrap();
    assert!(s.is_read_only());
    assert_eq!(s.style().thickness, e.config().modal.default_thickness);
    assert_eq!(s.history().unwrap().len(), 1);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = EngineConfig {
        history_limit: 0,
        ..EngineConfig::default()
    };
    assert!(AnnotationEngine::new(cfg, MemoryImageSource::new()).is_err());
}
