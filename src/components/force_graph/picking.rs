use super::model::SpatialModel;
use super::surface::Point;
use super::types::NodeId;

/// Nearest-node lookup in world space with a zoom-independent screen tolerance.
#[derive(Clone, Copy, Debug)]
pub struct Picker {
	pub tolerance_px: f64,
}

impl Picker {
	pub fn new(tolerance_px: f64) -> Self {
		Self {
			tolerance_px: tolerance_px.max(0.0),
		}
	}

	/// Closest node whose radius plus tolerance (converted at scale `k`) covers `world`.
	pub fn nearest_node(&self, model: &SpatialModel, world: Point, k: f64) -> Option<NodeId> {
		let slack = if k > 0.0 { self.tolerance_px / k } else { 0.0 };
		let mut best: Option<(NodeId, f64)> = None;
		for node in model.nodes() {
			let distance = node.position().distance(world);
			if distance > node.radius + slack {
				continue;
			}
			if best.is_none_or(|(_, d)| distance < d) {
				best = Some((node.id, distance));
			}
		}
		best.map(|(id, _)| id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::tests::{node, small_tree};
	use crate::components::force_graph::types::GraphData;

	fn spread_model() -> SpatialModel {
		let mut model = SpatialModel::new(&small_tree(), Point::default(), 6.0, 24.0);
		model.pin(1, Point::new(0.0, 0.0));
		model.pin(2, Point::new(100.0, 0.0));
		model.pin(3, Point::new(0.0, 100.0));
		model
	}

	#[test]
	fn center_hit_with_zero_tolerance() {
		let model = spread_model();
		let picker = Picker::new(0.0);
		assert_eq!(picker.nearest_node(&model, Point::new(100.0, 0.0), 1.0), Some(2));
		assert_eq!(picker.nearest_node(&model, Point::new(0.0, 0.0), 7.5), Some(1));
	}

	#[test]
	fn miss_outside_every_radius() {
		let model = spread_model();
		let picker = Picker::new(4.0);
		assert_eq!(picker.nearest_node(&model, Point::new(50.0, 50.0), 1.0), None);
		// child radius 6 + 4px tolerance at k = 1
		assert_eq!(picker.nearest_node(&model, Point::new(111.0, 0.0), 1.0), None);
		assert_eq!(picker.nearest_node(&model, Point::new(109.0, 0.0), 1.0), Some(2));
	}

	#[test]
	fn tolerance_shrinks_in_world_units_as_zoom_grows() {
		let model = spread_model();
		let picker = Picker::new(8.0);
		let probe = Point::new(112.0, 0.0);
		assert_eq!(picker.nearest_node(&model, probe, 1.0), Some(2));
		assert_eq!(picker.nearest_node(&model, probe, 4.0), None);
		assert_eq!(picker.nearest_node(&model, Point::new(116.0, 0.0), 0.5), Some(2));
	}

	#[test]
	fn closest_of_overlapping_candidates_wins() {
		let data = GraphData {
			nodes: vec![node(1, 0, &[]), node(2, 0, &[])],
			links: Vec::new(),
		};
		let mut model = SpatialModel::new(&data, Point::default(), 6.0, 24.0);
		model.pin(1, Point::new(0.0, 0.0));
		model.pin(2, Point::new(8.0, 0.0));
		let picker = Picker::new(0.0);
		assert_eq!(picker.nearest_node(&model, Point::new(5.0, 0.0), 1.0), Some(2));
		assert_eq!(picker.nearest_node(&model, Point::new(3.0, 0.0), 1.0), Some(1));
	}

	#[test]
	fn empty_model_picks_nothing() {
		let model = SpatialModel::new(&GraphData::default(), Point::default(), 6.0, 24.0);
		assert_eq!(Picker::new(4.0).nearest_node(&model, Point::default(), 1.0), None);
	}
}
