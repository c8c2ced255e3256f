use std::collections::{HashMap, HashSet};

use serde::Serialize;
use smallvec::SmallVec;

use crate::color::contrast::blend_over;
use crate::foundation::core::{Bounds, Color, NodeIdx, Vec2};

/// Ordered paint stack; index 0 is the topmost (primary) paint.
pub type PaintStack = SmallVec<[Color; 2]>;

const ICON_TYPES: &[&str] = &[
    "VECTOR",
    "BOOLEAN_OPERATION",
    "STAR",
    "POLYGON",
    "ELLIPSE",
    "LINE",
    "ICON",
];

/// How a target's node bounds should be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextSource {
    /// Nested design tree with absolute, geometrically precise bounds.
    #[default]
    DesignTree,
    /// Tag-metadata fallback: bounds are relative to the parent node.
    MetadataFallback,
}

impl ContextSource {
    /// Return `true` when raw bounds are parent-relative and must be accumulated to compare
    /// nodes from different branches.
    pub fn is_parent_relative(self) -> bool {
        matches!(self, Self::MetadataFallback)
    }
}

/// Canonical design node.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Identifier, unique within its target.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Upper-case type tag (`FRAME`, `TEXT`, `RECTANGLE`, ...).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Weak back-reference to the parent's arena slot.
    pub parent: Option<NodeIdx>,
    /// Raw bounds in the target's coordinate space.
    pub bounds: Option<Bounds>,
    /// Fill paint stack, topmost first.
    pub fills: PaintStack,
    /// Stroke paint stack, topmost first.
    pub strokes: PaintStack,
    /// Raw text content for text nodes.
    pub text: Option<String>,
    /// Font size in px.
    pub font_size: Option<f64>,
    /// Numeric font weight (400 regular, 700 bold).
    pub font_weight: Option<f64>,
    /// Line height in px.
    pub line_height: Option<f64>,
    /// Whether any interactivity signal matched.
    pub is_interactive: bool,
}

impl Node {
    /// Text nodes never act as backgrounds and are the subjects of text contrast.
    pub fn is_text_like(&self) -> bool {
        self.node_type == "TEXT" || self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Vector-ish nodes and nodes named like icons.
    pub fn is_icon_like(&self) -> bool {
        ICON_TYPES.contains(&self.node_type.as_str())
            || self.name.to_ascii_lowercase().contains("icon")
    }

    /// Flatten the fill stack bottom-to-top into one color.
    ///
    /// Returns `None` when there are no fills or the result is fully transparent.
    pub fn effective_fill(&self) -> Option<Color> {
        flatten_stack(&self.fills)
    }

    /// Flatten the stroke stack bottom-to-top into one color.
    pub fn effective_stroke(&self) -> Option<Color> {
        flatten_stack(&self.strokes)
    }
}

fn flatten_stack(stack: &[Color]) -> Option<Color> {
    let mut it = stack.iter().rev();
    let mut acc = *it.next()?;
    for &c in it {
        acc = blend_over(c, acc);
    }
    (!acc.is_transparent()).then_some(acc)
}

/// The root audit unit: every node reachable from one audited URL or node, normalized into an
/// arena with index-based parent links.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Target identifier (usually the audited node id or URL).
    pub id: String,
    /// Coordinate semantics of the raw bounds.
    pub context_source: ContextSource,
    /// Document-level background used when no structural background can be found.
    pub fallback_background: Option<Color>,
    /// Normalization warnings (e.g. no traversable nodes).
    pub warnings: Vec<String>,
    nodes: Vec<Node>,
    #[serde(skip)]
    index: HashMap<String, NodeIdx>,
    #[serde(skip)]
    children: Vec<Vec<NodeIdx>>,
    #[serde(skip)]
    absolute: Vec<Option<Bounds>>,
}

impl Target {
    /// Assemble a target from arena-ordered nodes whose `parent` fields already index into `nodes`.
    ///
    /// Parent links that point outside the arena are cleared. Children lists follow arena order,
    /// which is paint order (earlier entries paint behind later ones).
    pub fn from_nodes(
        id: impl Into<String>,
        mut nodes: Vec<Node>,
        context_source: ContextSource,
        fallback_background: Option<Color>,
        warnings: Vec<String>,
    ) -> Self {
        let n = nodes.len();
        for node in &mut nodes {
            if node.parent.is_some_and(|p| p.index() >= n) {
                node.parent = None;
            }
        }

        let mut index = HashMap::with_capacity(n);
        let mut children = vec![Vec::new(); n];
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(NodeIdx(i as u32));
            if let Some(p) = node.parent {
                children[p.index()].push(NodeIdx(i as u32));
            }
        }

        let mut target = Self {
            id: id.into(),
            context_source,
            fallback_background,
            warnings,
            nodes,
            index,
            children,
            absolute: Vec::new(),
        };
        target.absolute = (0..n)
            .map(|i| target.compute_absolute(NodeIdx(i as u32)))
            .collect();
        target
    }

    fn compute_absolute(&self, idx: NodeIdx) -> Option<Bounds> {
        let own = self.nodes[idx.index()].bounds?;
        if !self.context_source.is_parent_relative() {
            return Some(own);
        }
        let mut offset = Vec2::ZERO;
        for a in self.ancestors(idx) {
            if let Some(b) = self.nodes[a.index()].bounds {
                offset += Vec2::new(b.x, b.y);
            }
        }
        Some(own.translate(offset))
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return `true` when normalization produced no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at an arena index.
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.index()]
    }

    /// Look a node up by id.
    pub fn find(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    /// Arena indices in order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (0..self.nodes.len()).map(|i| NodeIdx(i as u32))
    }

    /// Parent of `idx`, if any.
    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.nodes.get(idx.index()).and_then(|n| n.parent)
    }

    /// Children of `idx` in paint order (back to front).
    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        self.children
            .get(idx.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes without a parent, in arena order.
    pub fn roots(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.indices().filter(|&i| self.parent(i).is_none())
    }

    /// Ancestors from nearest to furthest. Stops at the first repeated node, so a malformed
    /// cyclic parent chain terminates.
    pub fn ancestors(&self, idx: NodeIdx) -> Ancestors<'_> {
        let mut visited = HashSet::new();
        visited.insert(idx);
        Ancestors {
            target: self,
            current: idx,
            visited,
        }
    }

    /// Bounds in root-accumulated space (equal to raw bounds for design-tree targets).
    pub fn absolute_bounds(&self, idx: NodeIdx) -> Option<Bounds> {
        self.absolute.get(idx.index()).copied().flatten()
    }

    /// Absolute bounds of the first root that has bounds; the origin of screenshot space.
    pub fn root_bounds(&self) -> Option<Bounds> {
        self.roots().find_map(|r| self.absolute_bounds(r))
    }
}

/// Iterator returned by [`Target::ancestors`].
pub struct Ancestors<'a> {
    target: &'a Target,
    current: NodeIdx,
    visited: HashSet<NodeIdx>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIdx;

    fn next(&mut self) -> Option<NodeIdx> {
        let p = self.target.parent(self.current)?;
        if !self.visited.insert(p) {
            return None;
        }
        self.current = p;
        Some(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
