use super::*;

fn bm(tag: u8) -> Bitmap {
    Bitmap::from_premul(1, 1, vec![tag, 0, 0, 255]).unwrap()
}

fn tag(b: &Bitmap) -> u8 {
    b.data[0]
}

#[test]
fn undo_walks_back_to_floor_then_stops() {
    let mut h = HistoryStack::new(bm(0), DEFAULT_MAX_ENTRIES);
    for i in 1..=5 {
        h.push(bm(i));
    }
    assert_eq!(h.len(), 6);
    assert_eq!(h.pointer(), 5);

    for expected in (0..5).rev() {
        let restored = h.undo().unwrap();
        assert_eq!(tag(restored), expected);
    }
    assert_eq!(h.pointer(), 0);
    assert!(h.undo().is_none());
    assert_eq!(tag(h.current()), 0);
}

#[test]
fn push_after_undo_truncates_redo_tail() {
    let mut h = HistoryStack::new(bm(0), DEFAULT_MAX_ENTRIES);
    h.push(bm(1));
    h.undo();
    h.push(bm(2));

    assert_eq!(h.len(), 2);
    assert_eq!(h.pointer(), 1);
    assert_eq!(tag(h.current()), 2);
    assert_eq!(tag(h.undo().unwrap()), 0);
    assert!((0..h.len()).all(|i| tag(h.get(i).unwrap()) != 1));
}

#[test]
fn capacity_evicts_oldest_but_keeps_floor() {
    let mut h = HistoryStack::new(bm(0), 3);
    for i in 1..=4 {
        h.push(bm(i));
    }
    assert_eq!(h.len(), 3);
    assert_eq!(tag(h.floor()), 0);
    assert_eq!(tag(h.get(1).unwrap()), 3);
    assert_eq!(tag(h.current()), 4);
}

#[test]
fn reset_collapses_to_single_entry() {
    let mut h = HistoryStack::new(bm(0), DEFAULT_MAX_ENTRIES);
    h.push(bm(1));
    h.push(bm(2));
    h.reset(bm(9));
    assert_eq!(h.len(), 1);
    assert_eq!(h.pointer(), 0);
    assert!(!h.can_undo());
    assert_eq!(tag(h.floor()), 9);
}
