use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    assert_eq!(parse_css_color("#fff"), Some(Color::WHITE));
    assert_eq!(parse_css_color("#FF0000"), Some(Color::rgb(255, 0, 0)));
    let c = parse_css_color("#0000ff80").unwrap();
    assert_eq!(c.channels(), [0, 0, 255]);
    assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
    assert_eq!(parse_css_color("#12"), None);
    assert_eq!(parse_css_color("#zzzzzz"), None);
}

#[test]
fn parses_rgb_functions_and_keywords() {
    assert_eq!(parse_css_color("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
    let c = parse_css_color("rgba(10,20,30,0.25)").unwrap();
    assert_eq!(c.channels(), [10, 20, 30]);
    assert!((c.a - 0.25).abs() < 1e-9);
    let c = parse_css_color("rgb(255 0 0 / 50%)").unwrap();
    assert!((c.a - 0.5).abs() < 1e-9);
    assert_eq!(parse_css_color("transparent"), Some(Color::TRANSPARENT));
    assert_eq!(parse_css_color("Black"), Some(Color::BLACK));
}

#[test]
fn object_channels_detect_unit_range() {
    let unit = color_from_value(&json!({"r": 1.0, "g": 0.5, "b": 0.0})).unwrap();
    assert_eq!(unit.channels(), [255, 128, 0]);
    let bytes = color_from_value(&json!({"r": 200, "g": 100, "b": 0, "a": 0.5})).unwrap();
    assert_eq!(bytes.channels(), [200, 100, 0]);
    assert!((bytes.a - 0.5).abs() < 1e-9);
}

#[test]
fn solid_paint_multiplies_opacity() {
    let c = paint_color(&json!({
        "type": "SOLID",
        "color": {"r": 0.0, "g": 0.0, "b": 0.0, "a": 0.8},
        "opacity": 0.5
    }))
    .unwrap();
    assert!((c.a - 0.4).abs() < 1e-9);
}

#[test]
fn hidden_and_gradient_paints_are_ignored() {
    assert!(paint_color(&json!({"type": "SOLID", "visible": false, "color": "#000"})).is_none());
    assert!(paint_color(&json!({"type": "GRADIENT_LINEAR", "gradientStops": []})).is_none());
    assert_eq!(paint_color(&json!("#ffffff")), Some(Color::WHITE));
}
