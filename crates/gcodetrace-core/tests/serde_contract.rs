use gcodetrace_core::{GcodeError, Position, Rgba, ThemeColors};

#[test]
fn test_theme_colors_partial_json_uses_defaults() {
    let theme: ThemeColors =
        serde_json::from_str(r#"{"rapid": {"r": 1.0, "g": 0.0, "b": 0.0}}"#).unwrap();

    assert_eq!(theme.rapid, Rgba::rgb(1.0, 0.0, 0.0));
    assert_eq!(theme.linear, ThemeColors::default().linear);
    assert!(theme.is_valid());
}

#[test]
fn test_theme_colors_camel_case_keys() {
    let json = serde_json::to_value(ThemeColors::default()).unwrap();
    assert!(json.get("arcCw").is_some());
    assert!(json.get("laserOff").is_some());
}

#[test]
fn test_gcode_error_is_tagged() {
    let err = GcodeError::InvalidTokens { line_number: 4 };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["kind"], "invalidTokens");
    assert_eq!(json["lineNumber"], 4);
    assert!(json.get("line_number").is_none());

    let err = GcodeError::ChecksumMismatch {
        line_number: 7,
        expected: 80,
        computed: 81,
    };
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["kind"], "checksumMismatch");
    assert_eq!(json["lineNumber"], 7);
    let back: GcodeError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}

#[test]
fn test_position_roundtrip_keeps_rotary_axes() {
    let pos = Position::with_a(1.0, 2.0, 3.0, 45.0);
    let text = serde_json::to_string(&pos).unwrap();
    let back: Position = serde_json::from_str(&text).unwrap();
    assert_eq!(back, pos);
}
