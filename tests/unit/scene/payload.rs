use super::*;
use serde_json::json;

#[test]
fn sniff_unwraps_rest_envelopes() {
    let p = RawPayload::sniff(json!({
        "name": "file",
        "nodes": { "1:2": { "document": { "id": "1:2", "type": "FRAME" } } }
    }))
    .unwrap();
    assert_eq!(p, RawPayload::Tree(json!({ "id": "1:2", "type": "FRAME" })));

    let p = RawPayload::sniff(json!({ "document": { "id": "0:1", "type": "DOCUMENT" } })).unwrap();
    assert_eq!(p, RawPayload::Tree(json!({ "id": "0:1", "type": "DOCUMENT" })));
}

#[test]
fn sniff_distinguishes_text_shapes() {
    let meta = RawPayload::sniff(json!("<frame id=\"1:2\" name=\"Card\" />")).unwrap();
    assert!(matches!(meta, RawPayload::Metadata(_)));

    let code = RawPayload::sniff(json!("<div data-node-id=\"1:2\" className=\"bg-[#fff]\" />")).unwrap();
    assert!(matches!(code, RawPayload::CodeSnippet(_)));

    let nested = RawPayload::sniff_text("{\"id\": \"1\", \"type\": \"FRAME\"}".to_string()).unwrap();
    assert!(matches!(nested, RawPayload::Tree(_)));

    assert!(RawPayload::sniff(json!(42)).is_err());
    assert!(RawPayload::sniff_text("plain words".to_string()).is_err());
}

#[test]
fn style_hints_absorb_keeps_existing_entries() {
    let mut a = StyleHints::default();
    a.fills.insert("1".into(), vec![Color::WHITE]);
    let mut b = StyleHints::default();
    b.fills.insert("1".into(), vec![Color::BLACK]);
    b.strokes.insert("2".into(), vec![Color::BLACK]);
    a.absorb(b);
    assert_eq!(a.fills["1"], vec![Color::WHITE]);
    assert_eq!(a.strokes["2"], vec![Color::BLACK]);
}

#[test]
fn style_hints_deserialize_from_camel_case() {
    let h: StyleHints = serde_json::from_value(json!({
        "textFills": { "1:3": ["#222222"] }
    }))
    .unwrap();
    assert_eq!(h.text_fills["1:3"], vec![Color::rgb(0x22, 0x22, 0x22)]);
    assert!(h.fills.is_empty());
}
