use super::*;
use crate::action::grammar::Action;

#[test]
fn range_form_is_a_cross_product() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 2, "beatsPerBar": 4, "subBeatsPerBeat": 4,
             "program": { "bar-1-2": { "beat-1-2": { "subbeat-1-1": "m-s-beatpulse" } } } }"#,
    )
    .unwrap();
    let at: Vec<_> = sheet.events().iter().map(|e| e.at).collect();
    assert_eq!(
        at,
        vec![
            SubBeatPos::new(1, 1),
            SubBeatPos::new(1, 5),
            SubBeatPos::new(2, 1),
            SubBeatPos::new(2, 5),
        ]
    );
    let ids: Vec<_> = sheet.events().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["sheet-0", "sheet-1", "sheet-2", "sheet-3"]);
}

#[test]
fn documented_example_expands_full_ranges() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 8, "beatsPerBar": 4, "subBeatsPerBeat": 4,
             "program": { "bar-1-2": { "beat-1-4": { "subbeat-1-4": "m-s-beatpulse" } } },
             "events":  { "bar-1-1": "pixel-write:HI" } }"#,
    )
    .unwrap();
    assert_eq!(sheet.len(), 2 * 4 * 4);
    assert!(sheet.events().iter().all(|e| e.action == Action::MatrixPulse));
}

#[test]
fn descending_ranges_are_normalized() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 90, "bars": 4,
             "program": { "bar-3-2": { "beat-3-1": { "subbeat-2": "i-s-beatflash" } } } }"#,
    )
    .unwrap();
    assert_eq!(sheet.len(), 2 * 3);
    assert_eq!(sheet.events()[0].at, SubBeatPos::new(2, 2));
    assert_eq!(sheet.events()[5].at, SubBeatPos::new(3, 10));
}

#[test]
fn bars_zero_is_a_range_error() {
    let err = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 0,
             "program": { "bar-1-1": { "beat-1": { "subbeat-1": "m-s-beatpulse" } } } }"#,
    )
    .unwrap_err();
    assert!(err.is_range(), "{err}");
}

#[test]
fn out_of_bounds_beat_and_sub_beat_fail() {
    let beat = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 1, "beatsPerBar": 3,
             "program": { "bar-1": { "beat-1-4": { "subbeat-1": "m-s-beatpulse" } } } }"#,
    )
    .unwrap_err();
    assert!(beat.is_range());

    let sub = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 1, "subBeatsPerBeat": 2,
             "program": { "bar-1": { "beat-1": { "subbeat-3": "m-s-beatpulse" } } } }"#,
    )
    .unwrap_err();
    assert!(sub.is_range());
}

#[test]
fn flat_events_forms() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 2,
             "events": {
               "bar-1": { "1": "pixel-write:HI", "subbeat-9": "m-s-beatflash" },
               "bar-2-3": ["i-s-beatpulse", "random-pixel@count=3"],
               "bar-2": "clear-all"
             } }"#,
    )
    .unwrap();
    let got: Vec<_> = sheet
        .events()
        .iter()
        .map(|e| (e.at, e.source.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (SubBeatPos::new(1, 1), "pixel-write:HI"),
            (SubBeatPos::new(1, 9), "m-s-beatflash"),
            (SubBeatPos::new(2, 3), "i-s-beatpulse"),
            (SubBeatPos::new(2, 3), "random-pixel@count=3"),
            (SubBeatPos::new(2, 1), "clear-all"),
        ]
    );
}

#[test]
fn flat_positions_are_range_checked() {
    let err = parse_sheet_json(r#"{ "bpm": 120, "bars": 1, "events": { "bar-1-17": "clear-all" } }"#)
        .unwrap_err();
    assert!(err.is_range());
    let err = parse_sheet_json(r#"{ "bpm": 120, "bars": 1, "events": { "bar-2": "clear-all" } }"#)
        .unwrap_err();
    assert!(err.is_range());
}

#[test]
fn program_wins_over_events() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 1,
             "program": { "bar-1": { "beat-1": { "subbeat-1": "m-s-beatflash" } } },
             "events": { "bar-1": "pixel-write:IGNORED" } }"#,
    )
    .unwrap();
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet.events()[0].action, Action::MatrixFlash);
}

#[test]
fn overlapping_ranges_keep_document_order() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 4,
             "program": {
               "bar-1-4": { "beat-1": { "subbeat-1": "m-s-zones@count=2" } },
               "bar-2": { "beat-1": { "subbeat-1": "m-s-zones@count=5" } }
             } }"#,
    )
    .unwrap();
    let at_bar2: Vec<_> = sheet
        .events_at(SubBeatPos::new(2, 1))
        .map(|e| e.source.as_str())
        .collect();
    assert_eq!(at_bar2, vec!["m-s-zones@count=2", "m-s-zones@count=5"]);
}

#[test]
fn malformed_documents_are_parse_errors() {
    for json in [
        "{ not json",
        r#"{ "bars": 1 }"#,
        r#"{ "bpm": 120, "bars": 1, "program": { "bars-1": {} } }"#,
        r#"{ "bpm": 120, "bars": 1, "program": { "bar-x": {} } }"#,
        r#"{ "bpm": 120, "bars": 1, "program": { "bar-1-2-3": {} } }"#,
        r#"{ "bpm": 120, "bars": 1, "program": { "bar-1": "m-s-beatpulse" } }"#,
        r#"{ "bpm": 120, "bars": 1, "program": { "bar-1": { "beat-1": { "subbeat-1": 5 } } } }"#,
        r#"{ "bpm": 120, "bars": 1, "events": { "measure-1": "clear-all" } }"#,
    ] {
        let err = parse_sheet_json(json).unwrap_err();
        assert!(
            matches!(err, PulseError::Parse(_)),
            "expected parse error for {json}, got {err}"
        );
    }
}

#[test]
fn zero_bpm_is_a_validation_error() {
    let err = parse_sheet_json(r#"{ "bpm": 0, "bars": 1 }"#).unwrap_err();
    assert!(matches!(err, PulseError::Validation(_)));
}

#[test]
fn overflowing_meter_is_a_validation_error() {
    let err = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 1, "beatsPerBar": 65536, "subBeatsPerBeat": 65536,
             "events": { "bar-1": "clear-all" } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::Validation(_)), "{err}");
}

#[test]
fn bad_action_params_fail_the_load() {
    let err = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 1,
             "program": { "bar-1": { "beat-1": { "subbeat-1": "i-s-beathold@bars=x" } } } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::Action(_)));
}

#[test]
fn unknown_actions_load_as_noops() {
    let sheet = parse_sheet_json(
        r#"{ "bpm": 120, "bars": 1, "events": { "bar-1": "laser-show@power=11" } }"#,
    )
    .unwrap();
    assert!(matches!(sheet.events()[0].action, Action::Unknown { .. }));
}

#[test]
fn range_keys() {
    assert_eq!(
        parse_range_key("beat-4-2", "beat").unwrap(),
        KeyRange { start: 2, end: 4 }
    );
    assert_eq!(
        parse_range_key("subbeat-3", "subbeat").unwrap(),
        KeyRange { start: 3, end: 3 }
    );
    assert!(parse_range_key("beat-", "beat").is_err());
    assert!(parse_range_key("beat--1", "beat").is_err());
    assert!(parse_range_key("beat1", "beat").is_err());
}
