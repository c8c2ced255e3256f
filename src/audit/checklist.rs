use serde::Serialize;

use crate::audit::finding::TargetRef;
use crate::foundation::math::StableHasher;

/// A check that cannot be automated from design data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManualCheck {
    /// Stable check id.
    pub id: &'static str,
    /// WCAG success criterion.
    pub criterion: &'static str,
    /// Reviewer-facing prompt.
    pub title: &'static str,
}

/// Static catalog instantiated once per target.
pub const CATALOG: &[ManualCheck] = &[
    ManualCheck {
        id: "alt-text",
        criterion: "1.1.1",
        title: "Images and icons that convey meaning have text alternatives",
    },
    ManualCheck {
        id: "color-alone",
        criterion: "1.4.1",
        title: "Color is not the only means of conveying information",
    },
    ManualCheck {
        id: "error-identification",
        criterion: "3.3.1",
        title: "Input errors are identified and described in text",
    },
    ManualCheck {
        id: "focus-order",
        criterion: "2.4.3",
        title: "Focus order follows a meaningful sequence",
    },
    ManualCheck {
        id: "focus-visible",
        criterion: "2.4.7",
        title: "Every focusable element has a visible focus indicator",
    },
    ManualCheck {
        id: "heading-structure",
        criterion: "1.3.1",
        title: "Headings reflect the visual hierarchy",
    },
    ManualCheck {
        id: "keyboard-access",
        criterion: "2.1.1",
        title: "All functionality is operable from a keyboard",
    },
    ManualCheck {
        id: "motion",
        criterion: "2.2.2",
        title: "Moving or auto-updating content can be paused, stopped, or hidden",
    },
    ManualCheck {
        id: "reading-order",
        criterion: "1.3.2",
        title: "Reading order matches the visual order",
    },
];

/// One manual check stamped onto one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Stable id derived from check id and target id (`c-<16 hex>`).
    pub id: String,
    /// Catalog check id.
    pub check_id: String,
    /// WCAG success criterion.
    pub criterion: String,
    /// Reviewer-facing prompt.
    pub title: String,
    /// Target the item belongs to.
    pub target: TargetRef,
}

fn checklist_id(check_id: &str, target_id: &str) -> String {
    let mut h = StableHasher::new();
    h.write_str(check_id);
    h.write_str(target_id);
    h.finish_id("c")
}

/// Instantiate the catalog for one target.
pub fn checklist_for(target_id: &str) -> Vec<ChecklistItem> {
    CATALOG
        .iter()
        .map(|c| ChecklistItem {
            id: checklist_id(c.id, target_id),
            check_id: c.id.to_owned(),
            criterion: c.criterion.to_owned(),
            title: c.title.to_owned(),
            target: TargetRef {
                target_id: target_id.to_owned(),
                node_id: None,
                node_name: None,
            },
        })
        .collect()
}
