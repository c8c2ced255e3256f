use super::*;

#[test]
fn severity_parses_and_displays() {
    assert_eq!("Blocker".parse::<Severity>().unwrap(), Severity::Blocker);
    assert_eq!(" info ".parse::<Severity>().unwrap(), Severity::Info);
    assert!("urgent".parse::<Severity>().is_err());
    assert_eq!(Severity::Major.to_string(), "major");
    assert!(Severity::Blocker < Severity::Minor);
}

#[test]
fn finding_ids_depend_on_rounded_measures() {
    let a = finding_id("text-contrast", "home", Some("1:2"), &[3.214]);
    let b = finding_id("text-contrast", "home", Some("1:2"), &[3.2149]);
    let c = finding_id("text-contrast", "home", Some("1:2"), &[3.22]);
    let d = finding_id("text-contrast", "home", None, &[3.214]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert!(a.starts_with("f-") && a.len() == 18);
}

#[test]
fn finding_serializes_camel_case_and_skips_empty_fields() {
    let f = Finding {
        id: "f-1".to_owned(),
        rule_id: "text-contrast".to_owned(),
        criterion: "1.4.3".to_owned(),
        severity: Severity::Critical,
        status: Status::NeedsManualReview,
        message: "m".to_owned(),
        recommendation: None,
        evidence: Some(Evidence {
            foreground: Some(Color::rgb(0x12, 0x34, 0x56)),
            required_ratio: Some(4.5),
            ..Evidence::default()
        }),
        target: TargetRef {
            target_id: "home".to_owned(),
            node_id: Some("1:2".to_owned()),
            node_name: None,
        },
        suppressed: None,
    };
    let v = serde_json::to_value(&f).unwrap();
    assert_eq!(v["ruleId"], "text-contrast");
    assert_eq!(v["status"], "needs-manual-review");
    assert_eq!(v["severity"], "critical");
    assert_eq!(v["evidence"]["foreground"], "#123456");
    assert_eq!(v["evidence"]["requiredRatio"], 4.5);
    assert_eq!(v["target"]["targetId"], "home");
    assert!(v.get("suppressed").is_none());
    assert!(v["target"].get("nodeName").is_none());
    assert!(!f.is_active_failure());
}
