use std::collections::HashSet;

/// Stable node identifier, never reused within a session.
pub type NodeId = u32;

#[derive(Clone, Debug)]
pub struct GraphNode {
	pub id: NodeId,
	pub name: String,
	/// Distance from the root of the hierarchy.
	pub depth: u32,
	/// Ordered child ids; the count drives the visual radius.
	pub children: Vec<NodeId>,
}

/// Directed pair of node ids. Used both for parent → child edges and for cross-links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphLink {
	pub source: NodeId,
	pub target: NodeId,
}

impl GraphLink {
	pub fn new(source: NodeId, target: NodeId) -> Self {
		Self { source, target }
	}

	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}
}

#[derive(Clone, Debug, Default)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// Per-frame state owned by the application, read-only to the engine.
#[derive(Clone, Debug, Default)]
pub struct UiState {
	pub selected: Option<NodeId>,
	pub hovered: Option<NodeId>,
	pub flagged: HashSet<NodeId>,
	pub cross_links: Vec<GraphLink>,
}

impl UiState {
	/// Whether anything on screen animates on wall-clock time.
	pub fn is_animating(&self) -> bool {
		self.selected.is_some()
			|| self.hovered.is_some()
			|| !self.flagged.is_empty()
			|| !self.cross_links.is_empty()
	}

	pub fn is_cross_linked(&self, id: NodeId) -> bool {
		self.cross_links.iter().any(|link| link.touches(id))
	}
}
