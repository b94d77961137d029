use super::*;

fn meter() -> MeterConfig {
    MeterConfig::new(120, 4, 4).unwrap()
}

#[test]
fn stopped_clock_does_not_tick() {
    let mut clock = ClockHandle::new(Some(1));
    assert!(clock.tick(100.0).is_none());
    assert!(!clock.request_frame());
}

#[test]
fn first_tick_records_start() {
    let mut clock = ClockHandle::new(Some(1));
    assert!(clock.start(meter(), StartOpts::default()));
    let first = clock.tick(10_000.0).unwrap();
    assert_eq!(first.state.position, MusicalPosition::START);
    assert!(first.bar_changed && first.beat_changed && first.sub_beat_changed);

    let later = clock.tick(10_500.0).unwrap();
    assert_eq!(later.state.position.beat, 2);
    assert_eq!(later.state.position.sub_beat, 5);
    assert!(!later.bar_changed);
    assert!(later.beat_changed);
}

#[test]
fn start_offset_shifts_first_position() {
    let mut clock = ClockHandle::new(Some(1));
    clock.start(
        meter(),
        StartOpts {
            palette: PaletteMode::White,
            start_at_secs: Some(4.5),
        },
    );
    let update = clock.tick(0.0).unwrap();
    assert_eq!(update.state.position.bar, 3);
    assert_eq!(update.state.position.beat, 2);
    assert!((update.state.elapsed_secs - 4.5).abs() < 1e-9);
}

#[test]
fn second_start_only_reconfigures() {
    let mut clock = ClockHandle::new(Some(1));
    assert!(clock.start(meter(), StartOpts::default()));
    clock.tick(0.0).unwrap();
    clock.tick(600.0).unwrap();

    let other = MeterConfig::new(60, 3, 2).unwrap();
    let armed = clock.start(
        other,
        StartOpts {
            palette: PaletteMode::Random,
            start_at_secs: None,
        },
    );
    assert!(!armed);
    assert_eq!(clock.meter(), &meter());
    assert_eq!(clock.palette_mode(), PaletteMode::Random);

    // Timeline continues from the original start.
    let update = clock.tick(1_000.0).unwrap();
    assert_eq!(update.state.position.beat, 3);
}

#[test]
fn second_start_with_offset_reanchors() {
    let mut clock = ClockHandle::new(Some(1));
    clock.start(meter(), StartOpts::default());
    clock.tick(0.0).unwrap();
    clock.start(
        meter(),
        StartOpts {
            palette: PaletteMode::White,
            start_at_secs: Some(2.0),
        },
    );
    let update = clock.tick(5_000.0).unwrap();
    assert_eq!(update.state.position.bar, 2);
    assert_eq!(update.state.position.sub_beat, 1);
}

#[test]
fn palette_change_does_not_restart() {
    let mut clock = ClockHandle::new(Some(3));
    clock.start(meter(), StartOpts::default());
    clock.tick(0.0).unwrap();
    clock.tick(2_100.0).unwrap();
    clock.set_palette_mode(PaletteMode::Random);
    assert_eq!(clock.state().unwrap().palette, PaletteMode::Random);
    let update = clock.tick(2_200.0).unwrap();
    assert_eq!(update.state.position.bar, 2);
}

#[test]
fn pulse_changes_only_on_sub_beat_boundaries() {
    let mut clock = ClockHandle::new(Some(9));
    clock.start(
        meter(),
        StartOpts {
            palette: PaletteMode::Random,
            start_at_secs: None,
        },
    );
    let a = clock.tick(0.0).unwrap();
    let b = clock.tick(50.0).unwrap();
    assert!(!b.sub_beat_changed);
    assert_eq!(a.state.pulse, b.state.pulse);

    let c = clock.tick(130.0).unwrap();
    assert!(c.sub_beat_changed);
    assert_ne!(b.state.pulse.color, c.state.pulse.color);
}

#[test]
fn stop_is_idempotent_and_clears_state() {
    let mut clock = ClockHandle::new(Some(1));
    clock.start(meter(), StartOpts::default());
    clock.tick(0.0).unwrap();
    assert!(clock.request_frame());
    clock.stop();
    clock.stop();
    assert!(!clock.is_running());
    assert!(clock.state().is_none());
    assert!(!clock.frame_pending());
    assert!(clock.tick(1_000.0).is_none());
}

#[test]
fn frame_requests_collapse() {
    let mut clock = ClockHandle::new(Some(1));
    clock.start(meter(), StartOpts::default());
    assert!(clock.request_frame());
    assert!(!clock.request_frame());
    clock.tick(0.0).unwrap();
    assert!(!clock.frame_pending());
    assert!(clock.request_frame());
}

#[test]
fn restart_after_stop_uses_new_meter() {
    let mut clock = ClockHandle::new(Some(1));
    clock.start(meter(), StartOpts::default());
    clock.tick(0.0).unwrap();
    clock.stop();
    let slow = MeterConfig::new(60, 4, 4).unwrap();
    assert!(clock.start(slow, StartOpts::default()));
    clock.tick(50_000.0).unwrap();
    let update = clock.tick(51_000.0).unwrap();
    assert_eq!(update.state.position.beat, 2);
}

#[test]
fn handles_have_distinct_ids() {
    let a = ClockHandle::new(Some(1));
    let b = ClockHandle::new(Some(1));
    assert_ne!(a.id(), b.id());
}
