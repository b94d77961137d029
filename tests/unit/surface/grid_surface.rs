use super::*;
use crate::clock::scheduler::ClockHandle;
use crate::surface::ProgramTag;

#[test]
fn unmounted_surface_has_no_cells() {
    let surface = GridSurface::default();
    assert_eq!(surface.target_cells(), DEFAULT_TARGET_CELLS);
    assert!(surface.grid().is_none());
    assert!(surface.cell(Layer::Fine, CellCoord::new(0, 0)).is_none());
    assert!(surface.layer_coords(Layer::Coarse).is_empty());
}

#[test]
fn mount_builds_both_layers() {
    let mut surface = GridSurface::new(160);
    let grid = surface.mount(Viewport::new(1600.0, 900.0));
    assert_eq!(surface.coarse().len(), grid.coarse_count());
    assert_eq!(surface.fine().len(), grid.fine_count());
    let dirty = surface.take_dirty();
    assert!(dirty.structure && dirty.resize);
    assert!(!surface.take_dirty().any());
}

#[test]
fn resize_keeps_cells_when_shape_is_unchanged() {
    let mut surface = GridSurface::new(160);
    surface.mount(Viewport::new(800.0, 600.0));
    surface.take_dirty();
    surface
        .cell_mut(Layer::Fine, CellCoord::new(1, 1))
        .unwrap()
        .mark(ProgramTag::Ring);

    let grid = surface.resize(Viewport::new(1600.0, 1200.0));
    assert!(grid.cell_px > 0.0);
    let dirty = surface.take_dirty();
    assert!(dirty.resize && !dirty.structure);
    assert!(
        surface
            .cell(Layer::Fine, CellCoord::new(1, 1))
            .unwrap()
            .is_marked()
    );

    surface.resize(Viewport::new(1600.0, 300.0));
    let dirty = surface.take_dirty();
    assert!(dirty.structure && dirty.resize);
    assert!(surface.marked_cells().is_empty());
}

#[test]
fn unmount_destroys_cells() {
    let mut surface = GridSurface::default();
    surface.mount(Viewport::new(640.0, 480.0));
    surface.take_dirty();
    surface.unmount();
    assert!(!surface.is_mounted());
    assert!(surface.take_dirty().structure);
    surface.unmount();
    assert!(!surface.take_dirty().any());
}

#[test]
fn only_one_clock_may_claim() {
    let a = ClockHandle::new(Some(1));
    let b = ClockHandle::new(Some(2));
    let mut surface = GridSurface::default();
    surface.claim(a.id()).unwrap();
    surface.claim(a.id()).unwrap();
    assert!(surface.claim(b.id()).is_err());
    surface.release(b.id());
    assert_eq!(surface.owner(), Some(a.id()));
    surface.release(a.id());
    surface.claim(b.id()).unwrap();
}

#[test]
fn frame_requests_collapse() {
    let mut surface = GridSurface::default();
    assert!(surface.request_frame());
    assert!(!surface.request_frame());
    assert!(surface.take_frame_request());
    assert!(surface.request_frame());
    surface.cancel_frame();
    assert!(!surface.frame_requested());
}

#[test]
fn notices_are_drained_in_order() {
    let mut surface = GridSurface::default();
    surface.notify(Notice::ZoneCount(3));
    surface.notify(Notice::ZoneCount(5));
    assert_eq!(
        surface.drain_notices(),
        vec![Notice::ZoneCount(3), Notice::ZoneCount(5)]
    );
    assert!(surface.drain_notices().is_empty());
}

#[test]
fn notice_queue_keeps_only_the_latest() {
    let mut surface = GridSurface::default();
    let total = NOTICE_CAPACITY as u32 + 10;
    for n in 0..total {
        surface.notify(Notice::ZoneCount(n));
    }
    let notices = surface.drain_notices();
    assert_eq!(notices.len(), NOTICE_CAPACITY);
    assert_eq!(notices.first(), Some(&Notice::ZoneCount(10)));
    assert_eq!(notices.last(), Some(&Notice::ZoneCount(total - 1)));
}

#[test]
fn host_structure_changes_are_reported() {
    let mut surface = GridSurface::default();
    surface.mount(Viewport::new(640.0, 480.0));
    surface.take_dirty();
    surface.mark_structure_changed();
    let dirty = surface.take_dirty();
    assert!(dirty.structure && !dirty.resize);
}
