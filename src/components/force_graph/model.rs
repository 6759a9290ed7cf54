use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::warn;

use super::scale::RadiusScale;
use super::surface::Point;
use super::types::{GraphData, GraphLink, NodeId};

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct SimNode {
	pub id: NodeId,
	pub name: String,
	pub depth: u32,
	pub children: Vec<NodeId>,
	pub radius: f64,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl SimNode {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	#[cfg(test)]
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// Positions and velocities of one loaded topology. Hierarchical edges are
/// stored as index pairs into `nodes`; parents are an id lookup, never a reference.
#[derive(Clone, Debug, Default)]
pub struct SpatialModel {
	nodes: Vec<SimNode>,
	index: HashMap<NodeId, usize>,
	links: Vec<(usize, usize)>,
	parents: HashMap<NodeId, NodeId>,
}

impl SpatialModel {
	pub fn new(data: &GraphData, center: Point, min_radius: f64, max_radius: f64) -> Self {
		let max_children = data
			.nodes
			.iter()
			.map(|n| n.children.len())
			.max()
			.unwrap_or(0);
		let scale = RadiusScale::new(max_children, min_radius, max_radius);

		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut index = HashMap::with_capacity(data.nodes.len());
		for node in &data.nodes {
			if index.contains_key(&node.id) {
				warn!("duplicate node id {} ignored", node.id);
				continue;
			}
			let i = nodes.len();
			let start = phyllotaxis(i, center);
			index.insert(node.id, i);
			nodes.push(SimNode {
				id: node.id,
				name: node.name.clone(),
				depth: node.depth,
				children: node.children.clone(),
				radius: scale.radius(node.children.len()),
				x: start.x,
				y: start.y,
				vx: 0.0,
				vy: 0.0,
				fx: None,
				fy: None,
			});
		}

		let mut links = Vec::with_capacity(data.links.len());
		let mut parents = HashMap::new();
		let mut reported: HashSet<GraphLink> = HashSet::new();
		for link in &data.links {
			match (index.get(&link.source), index.get(&link.target)) {
				(Some(&s), Some(&t)) if s != t => {
					links.push((s, t));
					parents.entry(link.target).or_insert(link.source);
				}
				(Some(_), Some(_)) => {}
				_ => {
					if reported.insert(*link) {
						warn!(
							"skipping edge {} -> {}: unknown node id",
							link.source, link.target
						);
					}
				}
			}
		}
		for node in &nodes {
			for child in &node.children {
				if index.contains_key(child) && *child != node.id {
					parents.entry(*child).or_insert(node.id);
				}
			}
		}

		Self {
			nodes,
			index,
			links,
			parents,
		}
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub(super) fn nodes_mut(&mut self) -> &mut [SimNode] {
		&mut self.nodes
	}

	/// Hierarchical edges as (source, target) indices into `nodes()`.
	pub fn links(&self) -> &[(usize, usize)] {
		&self.links
	}

	pub fn index_of(&self, id: NodeId) -> Option<usize> {
		self.index.get(&id).copied()
	}

	pub fn get(&self, id: NodeId) -> Option<&SimNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	pub fn position(&self, id: NodeId) -> Option<Point> {
		self.get(id).map(SimNode::position)
	}

	pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
		self.parents.get(&id).copied()
	}

	/// Holds a node at `at` until unpinned. Returns false for unknown ids.
	pub fn pin(&mut self, id: NodeId, at: Point) -> bool {
		let Some(i) = self.index_of(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.fx = Some(at.x);
		node.fy = Some(at.y);
		node.x = at.x;
		node.y = at.y;
		node.vx = 0.0;
		node.vy = 0.0;
		true
	}

	pub fn unpin(&mut self, id: NodeId) {
		if let Some(i) = self.index_of(id) {
			self.nodes[i].fx = None;
			self.nodes[i].fy = None;
		}
	}

	#[cfg(test)]
	/// Sum of speeds over all nodes.
	pub fn kinetic_energy(&self) -> f64 {
		self.nodes.iter().map(|n| n.vx.hypot(n.vy)).sum()
	}
}

/// Deterministic spiral start so no two nodes share a position.
fn phyllotaxis(i: usize, center: Point) -> Point {
	let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
	let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
	Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}
