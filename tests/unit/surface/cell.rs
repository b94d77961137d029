use super::*;

#[test]
fn arena_indexes_row_major() {
    let arena = CellArena::new(3, 2);
    assert_eq!(arena.len(), 6);
    assert_eq!(arena.index_of(CellCoord::new(2, 1)), Some(5));
    assert_eq!(arena.index_of(CellCoord::new(3, 0)), None);

    let order: Vec<_> = arena.iter().map(|(c, _)| c).collect();
    assert_eq!(order, coords(3, 2).collect::<Vec<_>>());
}

#[test]
fn cells_are_addressed_by_coordinate() {
    let mut arena = CellArena::new(4, 4);
    arena.get_mut(CellCoord::new(1, 2)).unwrap().zone = Some(3);
    assert_eq!(arena.get(CellCoord::new(1, 2)).unwrap().zone, Some(3));
    assert_eq!(arena.get(CellCoord::new(2, 1)).unwrap().zone, None);
    arena.reset();
    assert_eq!(arena.get(CellCoord::new(1, 2)).unwrap().zone, None);
}

#[test]
fn pulse_fades_and_flash_stays_full() {
    let pulse = CellAnim {
        kind: AnimKind::Pulse,
        started_ms: 1000.0,
        duration_ms: 500.0,
        color: Color::WHITE,
    };
    assert_eq!(pulse.intensity(1000.0), 1.0);
    assert!((pulse.intensity(1250.0) - 0.5).abs() < 1e-9);
    assert_eq!(pulse.intensity(1500.0), 0.0);
    assert_eq!(pulse.intensity(999.0), 0.0);

    let flash = CellAnim {
        kind: AnimKind::Flash,
        ..pulse
    };
    assert_eq!(flash.intensity(1499.0), 1.0);
    assert_eq!(flash.intensity(1500.0), 0.0);
}

#[test]
fn hold_expires_at_deadline() {
    let mut paint = CellPaint {
        hold: Some(HoldState {
            until_ms: 2000.0,
            color: Some(Color::WHITE),
            shadow: None,
        }),
        ..CellPaint::default()
    };
    assert!(paint.hold_at(1999.9).is_some());
    assert!(paint.hold_at(2000.0).is_none());

    paint.restart(CellAnim {
        kind: AnimKind::Flash,
        started_ms: 0.0,
        duration_ms: 10.0,
        color: Color::WHITE,
    });
    assert!(paint.hold.is_none());
}

#[test]
fn unmark_only_touches_own_cells() {
    let mut paint = CellPaint::default();
    paint.mark(ProgramTag::Ring);
    assert!(paint.is_marked());
    assert!(!paint.unmark(ProgramTag::PixelWriter));
    assert!(paint.is_marked());
    assert!(paint.unmark(ProgramTag::Ring));
    assert!(!paint.is_marked());
}
