use super::*;
use crate::foundation::core::Viewport;
use crate::surface::{GridSurface, ProgramTag};

fn surface() -> GridSurface {
    let mut s = GridSurface::new(16);
    s.mount(Viewport::new(400.0, 400.0));
    s
}

fn ctx_at(sub_beat: u32, now_ms: f64) -> DispatchCtx {
    let meter = MeterConfig::new(120, 4, 4).unwrap();
    DispatchCtx {
        position: MusicalPosition {
            bar: 1,
            beat: (sub_beat - 1) / 4 + 1,
            sub_beat,
        },
        meter,
        now_ms,
        pulse: PulseStyle::of(Color::rgb(10, 20, 30)),
    }
}

fn act(src: &str) -> Action {
    Action::parse(src).unwrap()
}

fn animated(s: &GridSurface, started_ms: f64) -> Vec<CellCoord> {
    s.fine()
        .iter()
        .filter(|(_, p)| p.anim.is_some_and(|a| a.started_ms == started_ms))
        .map(|(c, _)| c)
        .collect()
}

#[test]
fn every_action_is_a_noop_without_a_grid() {
    let mut s = GridSurface::default();
    let mut d = Dispatcher::new(Some(1));
    for src in [
        "pixel-write:HI",
        "m-s-zones@count=2",
        "m-s-beatpulse",
        "i-s-beatflash",
        "i-s-beathold",
        "random-pixel@count=4",
        "pixel-ring",
        "clear-all",
    ] {
        assert_eq!(
            d.dispatch(&act(src), &ctx_at(1, 0.0), &mut s),
            DispatchOutcome::default(),
            "{src}"
        );
    }
    assert!(s.drain_notices().is_empty());
}

#[test]
fn matrix_pulse_hits_coarse_cells_and_the_marked_halo() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    assert_eq!(
        d.dispatch(&act("m-s-beatpulse"), &ctx_at(1, 100.0), &mut s)
            .touched,
        16
    );
    let anim = s.coarse().get(CellCoord::new(0, 0)).unwrap().anim.unwrap();
    assert_eq!(anim.kind, AnimKind::Pulse);
    assert_eq!(anim.duration_ms, 2000.0);
    assert_eq!(anim.color, Color::rgb(10, 20, 30));

    s.cell_mut(Layer::Fine, CellCoord::new(3, 3))
        .unwrap()
        .mark(ProgramTag::PixelWriter);
    s.cell_mut(Layer::Fine, CellCoord::new(4, 3))
        .unwrap()
        .mark(ProgramTag::PixelWriter);
    let out = d.dispatch(&act("m-s-beatflash"), &ctx_at(5, 200.0), &mut s);
    assert_eq!(out.touched, 16 + 6);
    let halo = animated(&s, 200.0);
    assert_eq!(halo.len(), 6);
    assert!(!halo.contains(&CellCoord::new(3, 3)));
    assert!(halo.contains(&CellCoord::new(2, 3)));
    assert!(halo.contains(&CellCoord::new(5, 3)));
}

#[test]
fn pulse_length_follows_the_boundary() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    for (sub, expected) in [(1, 2000.0), (5, 500.0), (3, 250.0), (2, 125.0)] {
        d.dispatch(&act("i-s-beatpulse"), &ctx_at(sub, 0.0), &mut s);
        let anim = s.fine().get(CellCoord::new(0, 0)).unwrap().anim.unwrap();
        assert_eq!(anim.duration_ms, expected, "sub-beat {sub}");
    }
}

#[test]
fn fine_flash_uses_the_flash_ratio_and_skips_marked_cells() {
    let mut s = surface();
    s.cell_mut(Layer::Fine, CellCoord::new(1, 1))
        .unwrap()
        .mark(ProgramTag::Ring);
    let mut d = Dispatcher::new(Some(1));
    let out = d.dispatch(&act("s-i-beatflash"), &ctx_at(2, 50.0), &mut s);
    assert_eq!(out.touched, 63);
    let anim = s.fine().get(CellCoord::new(0, 0)).unwrap().anim.unwrap();
    assert_eq!(anim.kind, AnimKind::Flash);
    assert!((anim.duration_ms - 180.0).abs() < 1e-9);
    assert!(s.fine().get(CellCoord::new(1, 1)).unwrap().anim.is_none());

    let mut d = Dispatcher::new(Some(1)).with_flash_ratio(0.5);
    d.dispatch(&act("i-s-beatflash"), &ctx_at(2, 60.0), &mut s);
    let anim = s.fine().get(CellCoord::new(0, 0)).unwrap().anim.unwrap();
    assert_eq!(anim.duration_ms, 250.0);
}

#[test]
fn holds_last_bars_on_a_downbeat_and_a_beat_otherwise() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    d.dispatch(&act("i-s-beathold@bars=2"), &ctx_at(1, 1000.0), &mut s);
    let cell = s.fine().get(CellCoord::new(2, 2)).unwrap();
    let hold = cell.hold.unwrap();
    assert_eq!(hold.until_ms, 5000.0);
    assert_eq!(hold.color, Some(Color::rgb(10, 20, 30)));
    assert!(hold.shadow.is_some());
    assert!(cell.hold_at(4999.0).is_some());
    assert!(cell.hold_at(5000.1).is_none());

    d.dispatch(&act("m-s-beathold@bars=2"), &ctx_at(6, 1000.0), &mut s);
    let coarse = s.coarse().get(CellCoord::new(0, 0)).unwrap();
    assert_eq!(coarse.hold.unwrap().until_ms, 1500.0);
}

#[test]
fn pulse_replaces_a_hold() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    d.dispatch(&act("i-s-beathold"), &ctx_at(1, 0.0), &mut s);
    d.dispatch(&act("i-s-beatpulse"), &ctx_at(2, 10.0), &mut s);
    assert!(s.fine().iter().all(|(_, p)| p.hold.is_none()));
}

#[test]
fn random_pixels_never_exceed_eligible_or_repeat() {
    let mut s = surface();
    for x in 0..8 {
        s.cell_mut(Layer::Fine, CellCoord::new(x, 0))
            .unwrap()
            .mark(ProgramTag::PixelWriter);
    }
    let mut d = Dispatcher::new(Some(7));
    for run in 0..20 {
        let now = f64::from(run) * 10.0;
        let out = d.dispatch(&act("random-pixel@count=100"), &ctx_at(2, now), &mut s);
        assert_eq!(out.touched, 56);
        let hit = animated(&s, now);
        assert_eq!(hit.len(), 56);
        assert!(hit.iter().all(|c| c.y != 0));
    }

    for run in 0..20 {
        let now = 1000.0 + f64::from(run);
        let out = d.dispatch(&act("random-pixel-flash@count=5"), &ctx_at(2, now), &mut s);
        assert_eq!(out.touched, 5);
        let hit = animated(&s, now);
        assert_eq!(hit.len(), 5);
        assert!(hit.iter().all(|c| {
            s.fine().get(*c).unwrap().anim.unwrap().kind == AnimKind::Flash
        }));
    }
}

#[test]
fn random_pixels_with_nothing_eligible() {
    let mut s = surface();
    for at in s.layer_coords(Layer::Fine) {
        s.cell_mut(Layer::Fine, at).unwrap().mark(ProgramTag::Ring);
    }
    let mut d = Dispatcher::new(Some(7));
    let out = d.dispatch(&act("random-pixel@count=3"), &ctx_at(1, 0.0), &mut s);
    assert_eq!(out.touched, 0);
}

#[test]
fn seeded_random_pixels_are_reproducible() {
    let pick = |seed| {
        let mut s = surface();
        let mut d = Dispatcher::new(Some(seed));
        d.dispatch(&act("random-pixel@count=6"), &ctx_at(1, 0.0), &mut s);
        animated(&s, 0.0)
    };
    assert_eq!(pick(42), pick(42));
}

#[test]
fn zones_split_coarse_cells_into_contiguous_runs() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    let out = d.dispatch(
        &act("m-s-zones@count=3,colors=#ff0000|#00ff00"),
        &ctx_at(1, 0.0),
        &mut s,
    );
    assert_eq!(out.touched, 16);
    let zones: Vec<u32> = s.coarse().iter().map(|(_, p)| p.zone.unwrap()).collect();
    assert_eq!(
        zones,
        vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2]
    );
    let last = s.coarse().get(CellCoord::new(3, 3)).unwrap();
    assert_eq!(last.color, Some(Color::rgb(255, 0, 0)));
    assert_eq!(s.drain_notices(), vec![Notice::ZoneCount(3)]);
    assert_eq!(s.globals().zones.as_ref().unwrap().count, 3);

    d.dispatch(&act("m-s-zones@count=2"), &ctx_at(1, 0.0), &mut s);
    assert_eq!(
        s.globals().zones.as_ref().unwrap().colors,
        DEFAULT_ZONE_COLORS.to_vec()
    );
}

#[test]
fn zone_partition_helper() {
    assert_eq!(zone_of(0, 0, 3), 0);
    assert_eq!(zone_of(15, 16, 1), 0);
    assert_eq!(zone_of(3, 4, 8), 6);
}

#[test]
fn clear_all_keeps_program_marks() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    d.dispatch(&act("pixel-write:A"), &ctx_at(1, 0.0), &mut s);
    let marked = s.marked_cells();
    assert!(!marked.is_empty());
    d.dispatch(&act("m-s-zones@count=2"), &ctx_at(1, 0.0), &mut s);
    d.dispatch(&act("i-s-beathold"), &ctx_at(1, 0.0), &mut s);
    d.dispatch(&act("m-s-beatpulse"), &ctx_at(1, 0.0), &mut s);

    d.dispatch(&act("clear-all"), &ctx_at(1, 0.0), &mut s);
    assert!(s.fine().iter().all(|(_, p)| p.anim.is_none() && p.hold.is_none()));
    assert!(s.coarse().iter().all(|(_, p)| p.zone.is_none() && p.anim.is_none()));
    assert!(s.globals().zones.is_none());
    assert_eq!(s.marked_cells(), marked);
}

#[test]
fn pixel_write_and_clear_through_dispatch() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    let out = d.dispatch(&act("pixel-write:8"), &ctx_at(1, 0.0), &mut s);
    assert_eq!(out.touched, s.marked_cells().len());
    assert_eq!(d.writer().text(), Some("8"));
    d.dispatch(&act("pixel-clear"), &ctx_at(1, 0.0), &mut s);
    assert!(s.marked_cells().is_empty());
}

#[test]
fn ring_routes_around_writer_after_redraw() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    let ring = d.dispatch(&act("pixel-ring"), &ctx_at(1, 0.0), &mut s).touched;
    assert_eq!(ring, 28);
    d.dispatch(&act("pixel-write:HI-t-l"), &ctx_at(1, 0.0), &mut s);
    assert!(d.run_pending(&mut s));
    assert!(!d.run_pending(&mut s));

    let cleared = d.dispatch(&act("pixel-ring-clear"), &ctx_at(1, 0.0), &mut s).touched;
    assert!(cleared > 0);
    assert!(
        s.fine()
            .iter()
            .all(|(_, p)| p.owner != Some(ProgramTag::Ring))
    );
}

#[test]
fn unknown_actions_do_nothing() {
    let mut s = surface();
    let mut d = Dispatcher::new(Some(1));
    let out = d.dispatch(&act("laser-show@power=11"), &ctx_at(1, 0.0), &mut s);
    assert_eq!(out, DispatchOutcome::default());
    assert!(s.fine().iter().all(|(_, p)| p.anim.is_none()));
}
