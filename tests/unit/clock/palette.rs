use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn white_mode_is_fixed() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut palette = Palette::new(PaletteMode::White);
    for _ in 0..8 {
        assert_eq!(palette.next_pulse(&mut rng).color, Color::WHITE);
    }
}

#[test]
fn random_mode_never_repeats_back_to_back() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut palette = Palette::new(PaletteMode::Random);
    let mut prev = palette.next_pulse(&mut rng).color;
    for _ in 0..200 {
        let next = palette.next_pulse(&mut rng).color;
        assert_ne!(next, prev);
        assert!(RANDOM_PALETTE.contains(&next));
        prev = next;
    }
}

#[test]
fn random_mode_is_seed_deterministic() {
    let picks = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut palette = Palette::new(PaletteMode::Random);
        (0..16)
            .map(|_| palette.next_pulse(&mut rng).color)
            .collect::<Vec<_>>()
    };
    assert_eq!(picks(42), picks(42));
}

#[test]
fn pulse_shadow_follows_color() {
    let style = PulseStyle::of(Color::rgb(1, 2, 3));
    assert_eq!(style.shadow.color, Color::rgb(1, 2, 3));
    assert_eq!(style.shadow.blur_px, PULSE_GLOW_PX);
}

#[test]
fn mode_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&PaletteMode::Random).unwrap(),
        "\"random\""
    );
    let m: PaletteMode = serde_json::from_str("\"white\"").unwrap();
    assert_eq!(m, PaletteMode::White);
    assert_eq!(PaletteMode::Random.name(), "random");
}
