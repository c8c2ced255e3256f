use super::*;
use serde_json::json;

fn palette(entries: &[(&str, Color)]) -> TokenPalette {
    let mut p = TokenPalette::new();
    for (name, c) in entries {
        p.insert(*name, *c);
    }
    p
}

fn house_palette() -> TokenPalette {
    palette(&[
        ("ink", Color::rgb(0x11, 0x11, 0x11)),
        ("gray", Color::rgb(0x77, 0x77, 0x77)),
        ("mist", Color::rgb(0xee, 0xee, 0xee)),
        ("paper", Color::WHITE),
        ("veil", Color::rgba(0, 0, 0, 0.5)),
    ])
}

#[test]
fn finds_foreground_background_and_pair() {
    let fg = Color::rgb(0x99, 0x99, 0x99);
    let rec = recommend(&house_palette(), fg, Color::WHITE, 4.5);

    let f = rec.foreground.found().expect("foreground");
    assert_eq!(f.token, "ink");
    assert!(f.ratio >= 4.5);

    let b = rec.background.found().expect("background");
    assert_eq!(b.token, "ink");

    let p = rec.pair.found().expect("pair");
    assert_eq!((p.foreground_token.as_str(), p.background_token.as_str()), ("ink", "paper"));
    assert!(p.ratio >= 4.5);
}

#[test]
fn absent_candidates_are_reported_explicitly() {
    let p = palette(&[("mist", Color::rgb(0xee, 0xee, 0xee)), ("paper", Color::WHITE)]);
    let rec = recommend(&p, Color::rgb(0x99, 0x99, 0x99), Color::WHITE, 4.5);
    assert_eq!(rec.foreground, Suggestion::NoCandidate);
    assert_eq!(rec.background, Suggestion::NoCandidate);
    assert_eq!(rec.pair, Suggestion::NoCandidate);

    let v = serde_json::to_value(&rec).unwrap();
    assert_eq!(v["pair"], json!({ "status": "no-candidate" }));
}

#[test]
fn equal_distance_prefers_higher_ratio_over_name_order() {
    let fg = Color::rgb(160, 160, 160);
    let p = palette(&[
        ("aa", Color::rgb(160, 160, 165)),
        ("zz", Color::rgb(163, 164, 160)),
    ]);
    let best = best_foreground(&p, fg, Color::BLACK, 7.0).expect("candidate");
    assert_eq!(best.distance, 5.0);
    assert_eq!(best.token, "zz");
}

#[test]
fn translucent_tokens_are_foreground_only() {
    let p = palette(&[("veil", Color::rgba(0, 0, 0, 0.5))]);
    let fg = Color::rgb(0x99, 0x99, 0x99);

    let f = best_foreground(&p, fg, Color::WHITE, 3.0).expect("veil passes");
    assert!(f.ratio > 3.9 && f.ratio < 4.0);
    assert_eq!(best_background(&p, fg, Color::WHITE, 3.0), None);
    assert_eq!(best_pair(&p, fg, Color::WHITE, 3.0), None);
}

#[test]
fn found_slots_serialize_with_status() {
    let rec = recommend(&house_palette(), Color::rgb(0x99, 0x99, 0x99), Color::WHITE, 4.5);
    let v = serde_json::to_value(&rec).unwrap();
    assert_eq!(v["foreground"]["status"], "found");
    assert_eq!(v["foreground"]["token"], "ink");
    assert_eq!(v["foreground"]["color"], "#111111");
}
