//! Pointer, wheel and pinch handling as an explicit gesture state machine.
//!
//! Every gesture ends on pointer-up or cancel no matter how it started, so a
//! pinned node can never outlive the gesture that pinned it.

use super::config::InteractionConfig;
use super::model::SpatialModel;
use super::picking::Picker;
use super::simulation::Simulation;
use super::surface::Point;
use super::transform::Viewport;
use super::types::NodeId;

/// Notifications for the owner of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
	SelectionChanged(Option<NodeId>),
	HoverChanged(Option<NodeId>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Dragging {
		node: NodeId,
		origin: Point,
		moved: bool,
	},
	Panning {
		origin: Point,
		last: Point,
		moved: bool,
	},
	Pinching {
		distance: f64,
		centroid: Point,
	},
}

/// Mutable engine parts a gesture may touch.
pub struct Scene<'a> {
	pub model: &'a mut SpatialModel,
	pub simulation: &'a mut Simulation,
	pub viewport: &'a mut Viewport,
	pub picker: &'a Picker,
}

impl Scene<'_> {
	fn pick(&self, screen: Point, now: f64) -> Option<NodeId> {
		let transform = self.viewport.current(now);
		self.picker
			.nearest_node(&*self.model, transform.screen_to_world(screen), transform.k)
	}

	fn to_world(&self, screen: Point, now: f64) -> Point {
		self.viewport.current(now).screen_to_world(screen)
	}
}

pub struct InteractionController {
	gesture: Gesture,
	hover: Option<NodeId>,
	config: InteractionConfig,
	drag_alpha_target: f64,
}

impl InteractionController {
	pub fn new(config: InteractionConfig, drag_alpha_target: f64) -> Self {
		Self {
			gesture: Gesture::Idle,
			hover: None,
			config,
			drag_alpha_target,
		}
	}

	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	#[cfg(test)]
	pub fn dragged_node(&self) -> Option<NodeId> {
		match self.gesture {
			Gesture::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	pub fn pointer_down(&mut self, scene: &mut Scene, screen: Point, now: f64) {
		self.release(scene);
		self.gesture = match scene.pick(screen, now) {
			Some(node) => {
				let world = scene.to_world(screen, now);
				scene.model.pin(node, world);
				scene.simulation.set_alpha_target(self.drag_alpha_target);
				Gesture::Dragging {
					node,
					origin: screen,
					moved: false,
				}
			}
			None => Gesture::Panning {
				origin: screen,
				last: screen,
				moved: false,
			},
		};
	}

	pub fn pointer_move(
		&mut self,
		scene: &mut Scene,
		screen: Point,
		now: f64,
	) -> Option<InteractionEvent> {
		let tolerance = self.config.click_tolerance_px;
		match &mut self.gesture {
			Gesture::Dragging {
				node,
				origin,
				moved,
			} => {
				*moved |= screen.distance(*origin) > tolerance;
				let world = scene.to_world(screen, now);
				scene.model.pin(*node, world);
				None
			}
			Gesture::Panning {
				origin,
				last,
				moved,
			} => {
				*moved |= screen.distance(*origin) > tolerance;
				if *moved {
					scene
						.viewport
						.pan_by(screen.x - last.x, screen.y - last.y, now);
					*last = screen;
				}
				None
			}
			Gesture::Pinching { .. } => None,
			Gesture::Idle => {
				let hit = scene.pick(screen, now);
				self.set_hover(hit)
			}
		}
	}

	/// Ends whatever gesture is in progress. A press that never moved is a click.
	pub fn pointer_up(&mut self, scene: &mut Scene) -> Option<InteractionEvent> {
		let event = match &self.gesture {
			Gesture::Dragging { node, moved, .. } if !moved => {
				Some(InteractionEvent::SelectionChanged(Some(*node)))
			}
			Gesture::Panning { moved, .. } if !moved => {
				Some(InteractionEvent::SelectionChanged(None))
			}
			_ => None,
		};
		self.release(scene);
		event
	}

	/// Pointer left the surface or the platform cancelled the gesture.
	pub fn pointer_cancel(&mut self, scene: &mut Scene) -> Option<InteractionEvent> {
		self.release(scene);
		self.set_hover(None)
	}

	pub fn wheel(&mut self, scene: &mut Scene, screen: Point, delta_y: f64, now: f64) {
		scene.viewport.wheel_zoom(screen, delta_y, now);
	}

	pub fn pinch_start(&mut self, scene: &mut Scene, a: Point, b: Point) {
		self.release(scene);
		self.gesture = Gesture::Pinching {
			distance: a.distance(b),
			centroid: a.midpoint(b),
		};
	}

	/// Zooms by the change in finger spread about the centroid, panning with it.
	pub fn pinch_move(&mut self, scene: &mut Scene, a: Point, b: Point, now: f64) {
		let Gesture::Pinching { distance, centroid } = &mut self.gesture else {
			return;
		};
		let (next_distance, next_centroid) = (a.distance(b), a.midpoint(b));
		scene.viewport.pan_by(
			next_centroid.x - centroid.x,
			next_centroid.y - centroid.y,
			now,
		);
		if *distance > 0.0 && next_distance > 0.0 {
			scene
				.viewport
				.zoom_at(next_centroid, next_distance / *distance, now);
		}
		*distance = next_distance;
		*centroid = next_centroid;
	}

	/// New viewport size: recentre the layout and let it settle again.
	pub fn resize(&mut self, scene: &mut Scene, width: f64, height: f64, reheat: f64) {
		scene.viewport.resize(width, height);
		scene.simulation.set_center(scene.viewport.center());
		scene.simulation.reheat(reheat);
	}

	fn set_hover(&mut self, hit: Option<NodeId>) -> Option<InteractionEvent> {
		if self.hover == hit {
			return None;
		}
		self.hover = hit;
		Some(InteractionEvent::HoverChanged(hit))
	}

	fn release(&mut self, scene: &mut Scene) {
		if let Gesture::Dragging { node, .. } = std::mem::take(&mut self.gesture) {
			scene.model.unpin(node);
			scene.simulation.set_alpha_target(0.0);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::{
		InteractionConfig, SimulationConfig, ViewportConfig,
	};
	use crate::components::force_graph::model::tests::small_tree;

	struct Rig {
		model: SpatialModel,
		simulation: Simulation,
		viewport: Viewport,
		picker: Picker,
		controller: InteractionController,
	}

	impl Rig {
		fn new() -> Self {
			let mut model = SpatialModel::new(&small_tree(), Point::default(), 6.0, 24.0);
			model.pin(1, Point::new(0.0, 0.0));
			model.pin(2, Point::new(100.0, 0.0));
			model.pin(3, Point::new(0.0, 100.0));
			for id in 1..=3 {
				model.unpin(id);
			}
			let simulation =
				Simulation::new(SimulationConfig::default(), &model, Point::new(0.0, 0.0));
			Self {
				model,
				simulation,
				viewport: Viewport::new(800.0, 600.0, ViewportConfig::default()),
				picker: Picker::new(4.0),
				controller: InteractionController::new(InteractionConfig::default(), 0.3),
			}
		}

		fn with<R>(&mut self, f: impl FnOnce(&mut InteractionController, &mut Scene) -> R) -> R {
			let mut scene = Scene {
				model: &mut self.model,
				simulation: &mut self.simulation,
				viewport: &mut self.viewport,
				picker: &self.picker,
			};
			f(&mut self.controller, &mut scene)
		}
	}

	#[test]
	fn click_on_node_selects_it() {
		let mut rig = Rig::new();
		rig.with(|c, s| c.pointer_down(s, Point::new(101.0, 1.0), 0.0));
		assert_eq!(rig.controller.dragged_node(), Some(2));
		let event = rig.with(|c, s| c.pointer_up(s));
		assert_eq!(event, Some(InteractionEvent::SelectionChanged(Some(2))));
		assert_eq!(rig.controller.gesture(), &Gesture::Idle);
		assert!(!rig.model.get(2).is_some_and(|n| n.is_pinned()));
	}

	#[test]
	fn click_on_empty_space_clears_selection() {
		let mut rig = Rig::new();
		rig.with(|c, s| c.pointer_down(s, Point::new(300.0, 300.0), 0.0));
		let event = rig.with(|c, s| c.pointer_up(s));
		assert_eq!(event, Some(InteractionEvent::SelectionChanged(None)));
	}

	#[test]
	fn drag_pins_to_pointer_and_warms_layout() {
		let mut rig = Rig::new();
		rig.with(|c, s| c.pointer_down(s, Point::new(100.0, 0.0), 0.0));
		assert_eq!(rig.simulation.alpha_target(), 0.3);
		rig.with(|c, s| c.pointer_move(s, Point::new(100.0, 100.0), 0.0));
		for _ in 0..5 {
			rig.simulation.tick(&mut rig.model);
			assert_eq!(rig.model.position(2), Some(Point::new(100.0, 100.0)));
		}
		let event = rig.with(|c, s| c.pointer_up(s));
		assert_eq!(event, None);
		assert_eq!(rig.simulation.alpha_target(), 0.0);
		assert!(!rig.model.get(2).is_some_and(|n| n.is_pinned()));
	}

	#[test]
	fn drag_follows_pointer_under_zoom() {
		let mut rig = Rig::new();
		rig.viewport.zoom_at(Point::new(0.0, 0.0), 2.0, 0.0);
		rig.with(|c, s| c.pointer_down(s, Point::new(200.0, 0.0), 0.0));
		assert_eq!(rig.controller.dragged_node(), Some(2));
		rig.with(|c, s| c.pointer_move(s, Point::new(300.0, 50.0), 0.0));
		assert_eq!(rig.model.position(2), Some(Point::new(150.0, 25.0)));
	}

	#[test]
	fn leaving_the_surface_never_leaves_a_stuck_pin() {
		let mut rig = Rig::new();
		rig.with(|c, s| c.pointer_down(s, Point::new(0.0, 100.0), 0.0));
		rig.with(|c, s| c.pointer_move(s, Point::new(40.0, 140.0), 0.0));
		rig.with(|c, s| c.pointer_cancel(s));
		assert_eq!(rig.controller.gesture(), &Gesture::Idle);
		assert!(!rig.model.get(3).is_some_and(|n| n.is_pinned()));
		assert_eq!(rig.simulation.alpha_target(), 0.0);
		assert_eq!(rig.with(|c, s| c.pointer_up(s)), None);
	}

	#[test]
	fn background_drag_pans_without_selecting() {
		let mut rig = Rig::new();
		rig.with(|c, s| c.pointer_down(s, Point::new(300.0, 300.0), 0.0));
		rig.with(|c, s| c.pointer_move(s, Point::new(320.0, 290.0), 0.0));
		rig.with(|c, s| c.pointer_move(s, Point::new(350.0, 300.0), 0.0));
		assert_eq!(rig.with(|c, s| c.pointer_up(s)), None);
		let t = rig.viewport.current(0.0);
		assert_eq!((t.x, t.y, t.k), (50.0, 0.0, 1.0));
	}

	#[test]
	fn small_jitter_still_counts_as_click() {
		let mut rig = Rig::new();
		rig.with(|c, s| c.pointer_down(s, Point::new(100.0, 0.0), 0.0));
		rig.with(|c, s| c.pointer_move(s, Point::new(101.5, 1.0), 0.0));
		assert_eq!(
			rig.with(|c, s| c.pointer_up(s)),
			Some(InteractionEvent::SelectionChanged(Some(2)))
		);
	}

	#[test]
	fn hover_reports_only_changes() {
		let mut rig = Rig::new();
		let events: Vec<_> = [
			Point::new(100.0, 0.0),
			Point::new(102.0, 0.0),
			Point::new(400.0, 400.0),
			Point::new(0.0, 0.0),
		]
		.into_iter()
		.map(|p| rig.with(|c, s| c.pointer_move(s, p, 0.0)))
		.collect();
		assert_eq!(
			events,
			vec![
				Some(InteractionEvent::HoverChanged(Some(2))),
				None,
				Some(InteractionEvent::HoverChanged(None)),
				Some(InteractionEvent::HoverChanged(Some(1))),
			]
		);
		assert_eq!(
			rig.with(|c, s| c.pointer_cancel(s)),
			Some(InteractionEvent::HoverChanged(None))
		);
	}

	#[test]
	fn wheel_zoom_leaves_model_alone() {
		let mut rig = Rig::new();
		let before: Vec<Point> = rig.model.nodes().iter().map(|n| n.position()).collect();
		rig.with(|c, s| c.wheel(s, Point::new(250.0, 120.0), -300.0, 0.0));
		let after: Vec<Point> = rig.model.nodes().iter().map(|n| n.position()).collect();
		assert_eq!(before, after);
		assert!(rig.viewport.current(0.0).k > 1.0);
	}

	#[test]
	fn pinch_zooms_about_centroid() {
		let mut rig = Rig::new();
		let (a, b) = (Point::new(300.0, 300.0), Point::new(400.0, 300.0));
		let focus = a.midpoint(b);
		let world = rig.viewport.current(0.0).screen_to_world(focus);
		rig.with(|c, s| c.pinch_start(s, a, b));
		rig.with(|c, s| c.pinch_move(s, Point::new(250.0, 300.0), Point::new(450.0, 300.0), 0.0));
		let t = rig.viewport.current(0.0);
		assert!((t.k - 2.0).abs() < 1e-9);
		let still = t.screen_to_world(focus);
		assert!(still.distance(world) < 1e-9);
		assert_eq!(rig.with(|c, s| c.pointer_up(s)), None);
	}

	#[test]
	fn pick_uses_in_flight_transform() {
		let mut rig = Rig::new();
		rig.viewport.focus_on(Point::new(100.0, 0.0), 0.0);
		let done = ViewportConfig::default().focus_duration_ms;
		// halfway through the move node 2 is no longer under its old screen spot
		let mid = rig.viewport.current(done / 2.0);
		let under = mid.world_to_screen(Point::new(100.0, 0.0));
		rig.with(|c, s| c.pointer_down(s, under, done / 2.0));
		assert_eq!(rig.controller.dragged_node(), Some(2));
	}

	#[test]
	fn resize_recentres_and_reheats() {
		let mut rig = Rig::new();
		while rig.simulation.tick(&mut rig.model) {}
		rig.with(|c, s| c.resize(s, 0.0, 500.0, 0.3));
		assert_eq!(rig.simulation.center(), Point::new(0.5, 250.0));
		assert!(rig.simulation.is_active());
		assert!(rig.simulation.alpha() >= 0.3);
	}
}
