use std::sync::LazyLock;

use regex::Regex;

const INTERACTIVE_TYPES: &[&str] = &[
    "BUTTON",
    "LINK",
    "INPUT",
    "TEXT_INPUT",
    "TEXT_FIELD",
    "CHECKBOX",
    "RADIO",
    "SWITCH",
    "TOGGLE",
    "SLIDER",
    "SELECT",
    "DROPDOWN",
    "TAB",
    "MENU_ITEM",
];

static INTERACTIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|[^a-z])(button|btn|cta|link|checkbox|check box|radio|toggle|switch|slider|input|text ?field|textbox|search ?bar|select|dropdown|combo ?box|tab|menu ?item|chip|stepper|icon ?button|close|submit)(?:$|[^a-z])",
    )
    .expect("interactive name pattern is valid")
});

static INTERACTIVE_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(button|link|checkbox|radio|switch|slider|spinbutton|textbox|searchbox|combobox|listbox|option|menuitem|menuitemcheckbox|menuitemradio|tab|treeitem)\s*$",
    )
    .expect("interactive role pattern is valid")
});

/// Signals gathered for one node; any single one marks the node interactive.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InteractivitySignals<'a> {
    pub(crate) node_type: &'a str,
    pub(crate) name: &'a str,
    pub(crate) has_interaction_marker: bool,
    pub(crate) role: Option<&'a str>,
}

impl InteractivitySignals<'_> {
    pub(crate) fn is_interactive(&self) -> bool {
        self.has_interaction_marker
            || INTERACTIVE_TYPES.contains(&self.node_type)
            || INTERACTIVE_NAME.is_match(self.name)
            || self.role.is_some_and(|r| INTERACTIVE_ROLE.is_match(r))
    }
}

/// Canonical type tag: upper-case with `-` and spaces folded to `_`.
pub(crate) fn canonical_type(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/interactive.rs"]
mod tests;
