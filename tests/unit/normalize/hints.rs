use super::*;
use crate::normalize::record::NodeRecord;

#[test]
fn utility_classes_and_inline_styles_are_bucketed() {
    let hints = hints_from_code(
        r##"<div data-node-id="1:2" className="flex bg-[#0055cc] text-[#ffffff] border-[#cccccc] p-4">
              <span data-node-id="1:3" style="color: rgba(0, 0, 0, 0.8); background-color: #fafafa">Hi</span>
              <button data-node-id="1:4" style={{ backgroundColor: '#111111', border: '1px solid #222222' }} />
              <p data-node-id="1:5" className="text-[14px] text-white">x</p>
            </div>"##,
    );
    assert_eq!(hints.fills["1:2"], vec![Color::rgb(0x00, 0x55, 0xcc)]);
    assert_eq!(hints.text_fills["1:2"], vec![Color::WHITE]);
    assert_eq!(hints.strokes["1:2"], vec![Color::rgb(0xcc, 0xcc, 0xcc)]);

    let t = hints.text_fills["1:3"][0];
    assert_eq!(t.channels(), [0, 0, 0]);
    assert!((t.a - 0.8).abs() < 1e-9);
    assert_eq!(hints.fills["1:3"], vec![Color::rgb(0xfa, 0xfa, 0xfa)]);

    assert_eq!(hints.fills["1:4"], vec![Color::rgb(0x11, 0x11, 0x11)]);
    assert_eq!(hints.strokes["1:4"], vec![Color::rgb(0x22, 0x22, 0x22)]);

    assert_eq!(hints.text_fills["1:5"], vec![Color::WHITE]);
}

#[test]
fn tags_without_node_id_contribute_nothing() {
    let hints = hints_from_code(r##"<div className="bg-[#000000]"></div>"##);
    assert!(hints.is_empty());
}

#[test]
fn hints_only_fill_empty_paint_lists() {
    let mut set = RecordSet::default();
    let mut painted = NodeRecord {
        id: "a".into(),
        node_type: "RECTANGLE".into(),
        ..NodeRecord::default()
    };
    painted.fills.push(Color::BLACK);
    set.upsert(painted);
    set.upsert(NodeRecord {
        id: "b".into(),
        node_type: "RECTANGLE".into(),
        ..NodeRecord::default()
    });
    set.upsert(NodeRecord {
        id: "t".into(),
        node_type: "TEXT".into(),
        ..NodeRecord::default()
    });

    let mut hints = StyleHints::default();
    hints.fills.insert("a".into(), vec![Color::WHITE]);
    hints.fills.insert("b".into(), vec![Color::WHITE]);
    hints.fills.insert("t".into(), vec![Color::WHITE]);
    hints.text_fills.insert("t".into(), vec![Color::rgb(0x33, 0x33, 0x33)]);
    hints.strokes.insert("a".into(), vec![Color::rgb(1, 2, 3)]);

    apply_hints(&mut set, &hints);

    assert_eq!(set.get_mut("a").unwrap().fills.as_slice(), &[Color::BLACK]);
    assert_eq!(set.get_mut("a").unwrap().strokes.as_slice(), &[Color::rgb(1, 2, 3)]);
    assert_eq!(set.get_mut("b").unwrap().fills.as_slice(), &[Color::WHITE]);
    assert_eq!(
        set.get_mut("t").unwrap().fills.as_slice(),
        &[Color::rgb(0x33, 0x33, 0x33)]
    );
}
