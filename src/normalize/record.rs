use std::collections::{HashMap, HashSet};

use crate::foundation::core::{Bounds, NodeIdx};
use crate::scene::model::{Node, PaintStack};

/// A node as seen by one payload, before merging and arena assignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct NodeRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) node_type: String,
    pub(crate) parent_id: Option<String>,
    pub(crate) bounds: Option<Bounds>,
    pub(crate) fills: PaintStack,
    pub(crate) strokes: PaintStack,
    pub(crate) text: Option<String>,
    pub(crate) font_size: Option<f64>,
    pub(crate) font_weight: Option<f64>,
    pub(crate) line_height: Option<f64>,
    pub(crate) is_interactive: bool,
}

impl NodeRecord {
    /// Fold a later, possibly partial, record for the same id into this one.
    ///
    /// Known parent/bounds stay; non-empty paint lists win over empty ones; the longer non-empty
    /// name and type win; interactivity is OR-ed.
    pub(crate) fn merge(&mut self, other: NodeRecord) {
        prefer_longer(&mut self.name, other.name);
        prefer_longer(&mut self.node_type, other.node_type);
        if self.parent_id.is_none() {
            self.parent_id = other.parent_id;
        }
        if self.bounds.is_none() {
            self.bounds = other.bounds;
        }
        if self.fills.is_empty() {
            self.fills = other.fills;
        }
        if self.strokes.is_empty() {
            self.strokes = other.strokes;
        }
        if self.text.as_deref().is_none_or(str::is_empty) {
            self.text = other.text.or(self.text.take());
        }
        self.font_size = self.font_size.or(other.font_size);
        self.font_weight = self.font_weight.or(other.font_weight);
        self.line_height = self.line_height.or(other.line_height);
        self.is_interactive |= other.is_interactive;
    }
}

fn prefer_longer(slot: &mut String, candidate: String) {
    if candidate.trim().len() > slot.trim().len() {
        *slot = candidate;
    }
}

/// Accumulates records from every payload of one target.
#[derive(Debug, Default)]
pub(crate) struct RecordSet {
    records: Vec<NodeRecord>,
    by_id: HashMap<String, usize>,
    pruned: HashSet<String>,
    pub(crate) malformed: usize,
    pub(crate) saw_absolute_bounds: bool,
    pub(crate) saw_relative_bounds: bool,
}

impl RecordSet {
    pub(crate) fn upsert(&mut self, rec: NodeRecord) {
        if self.pruned.contains(&rec.id) {
            return;
        }
        match self.by_id.get(&rec.id) {
            Some(&i) => self.records[i].merge(rec),
            None => {
                self.by_id.insert(rec.id.clone(), self.records.len());
                self.records.push(rec);
            }
        }
    }

    /// Remember a hidden node so later payloads cannot resurrect it or its expansions.
    pub(crate) fn mark_pruned(&mut self, id: &str) {
        self.pruned.insert(id.to_owned());
    }

    pub(crate) fn is_pruned(&self, id: &str) -> bool {
        self.pruned.contains(id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut NodeRecord> {
        let i = *self.by_id.get(id)?;
        self.records.get_mut(i)
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut NodeRecord> {
        self.records.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Resolve string parent ids to arena indices.
    ///
    /// Walkers already attach children of dropped nodes to the nearest kept ancestor, so a parent
    /// id that still does not resolve to a record (or points at itself) is simply cleared.
    pub(crate) fn into_nodes(self) -> Vec<Node> {
        let RecordSet {
            records, by_id, ..
        } = self;
        let parent_ids: Vec<Option<String>> = records.iter().map(|r| r.parent_id.clone()).collect();

        records
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let parent = parent_ids[i]
                    .as_deref()
                    .and_then(|pid| by_id.get(pid).copied())
                    .filter(|&p| p != i)
                    .map(|p| NodeIdx(p as u32));
                Node {
                    id: r.id,
                    name: r.name,
                    node_type: r.node_type,
                    parent,
                    bounds: r.bounds,
                    fills: r.fills,
                    strokes: r.strokes,
                    text: r.text,
                    font_size: r.font_size,
                    font_weight: r.font_weight,
                    line_height: r.line_height,
                    is_interactive: r.is_interactive,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/record.rs"]
mod tests;
