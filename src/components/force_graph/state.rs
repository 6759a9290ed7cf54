use log::{debug, info};

use super::config::EngineConfig;
use super::interaction::{Gesture, InteractionController, InteractionEvent, Scene};
use super::model::SpatialModel;
use super::picking::Picker;
use super::render::{Frame, Renderer};
use super::scheduler::FrameScheduler;
use super::simulation::Simulation;
use super::surface::{Point, Surface};
use super::transform::{ViewTransform, Viewport};
use super::types::{GraphData, NodeId, UiState};

/// One live view of a graph: layout, camera, input and frame pacing.
///
/// The host feeds it wall-clock timestamps and input in canvas pixels, and
/// hands it a [`Surface`] once per animation frame. After [`teardown`] every
/// call is a no-op.
///
/// [`teardown`]: GraphEngine::teardown
pub struct GraphEngine {
	model: SpatialModel,
	simulation: Simulation,
	viewport: Viewport,
	renderer: Renderer,
	picker: Picker,
	controller: InteractionController,
	scheduler: FrameScheduler,
	ui: UiState,
	resize_alpha: f64,
	torn_down: bool,
}

impl GraphEngine {
	pub fn new(data: &GraphData, width: f64, height: f64, config: EngineConfig) -> Self {
		let EngineConfig {
			simulation,
			viewport,
			render,
			interaction,
		} = config;
		let viewport = Viewport::new(width, height, viewport);
		let center = viewport.center();
		let model = SpatialModel::new(data, center, render.min_radius, render.max_radius);
		let picker = Picker::new(interaction.pick_tolerance_px);
		let controller = InteractionController::new(interaction, simulation.drag_alpha_target);
		let resize_alpha = simulation.resize_alpha;
		let simulation = Simulation::new(simulation, &model, center);
		debug!(
			"graph engine ready: {} nodes, {} links, {}x{}",
			model.len(),
			model.links().len(),
			viewport.width,
			viewport.height
		);
		Self {
			model,
			simulation,
			viewport,
			renderer: Renderer::new(render),
			picker,
			controller,
			scheduler: FrameScheduler::new(),
			ui: UiState::default(),
			resize_alpha,
			torn_down: false,
		}
	}

	#[cfg(test)]
	pub fn model(&self) -> &SpatialModel {
		&self.model
	}

	#[cfg(test)]
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub fn gesture(&self) -> &Gesture {
		self.controller.gesture()
	}

	#[cfg(test)]
	pub fn transform(&self, now: f64) -> ViewTransform {
		self.viewport.current(now)
	}

	#[cfg(test)]
	pub fn size(&self) -> (f64, f64) {
		(self.viewport.width, self.viewport.height)
	}

	pub fn is_live(&self) -> bool {
		!self.torn_down
	}

	/// Replaces the owner-controlled state read by the next frame.
	pub fn set_ui_state(&mut self, ui: UiState) {
		self.ui = ui;
	}

	/// Runs one animation frame. Returns whether anything was drawn.
	pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S, now: f64) -> bool {
		if self.torn_down {
			return false;
		}
		let animating = self.ui.is_animating() || self.viewport.in_transition();
		let plan = self
			.scheduler
			.plan(now, self.simulation.is_active(), animating);
		if plan.tick {
			self.simulation.tick(&mut self.model);
		}
		let transform = self.viewport.current(now);
		self.viewport.advance(now);
		if plan.draw {
			self.renderer.render(
				surface,
				&Frame {
					model: &self.model,
					transform: &transform,
					ui: &self.ui,
					width: self.viewport.width,
					height: self.viewport.height,
					now,
				},
			);
		}
		plan.draw
	}

	fn scene(&mut self) -> (&mut InteractionController, Scene<'_>) {
		self.scheduler.request_redraw();
		(
			&mut self.controller,
			Scene {
				model: &mut self.model,
				simulation: &mut self.simulation,
				viewport: &mut self.viewport,
				picker: &self.picker,
			},
		)
	}

	pub fn pointer_down(&mut self, screen: Point, now: f64) {
		if self.torn_down {
			return;
		}
		let (controller, mut scene) = self.scene();
		controller.pointer_down(&mut scene, screen, now);
	}

	pub fn pointer_move(&mut self, screen: Point, now: f64) -> Option<InteractionEvent> {
		if self.torn_down {
			return None;
		}
		let (controller, mut scene) = self.scene();
		controller.pointer_move(&mut scene, screen, now)
	}

	pub fn pointer_up(&mut self) -> Option<InteractionEvent> {
		if self.torn_down {
			return None;
		}
		let (controller, mut scene) = self.scene();
		controller.pointer_up(&mut scene)
	}

	pub fn pointer_cancel(&mut self) -> Option<InteractionEvent> {
		if self.torn_down {
			return None;
		}
		let (controller, mut scene) = self.scene();
		controller.pointer_cancel(&mut scene)
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64, now: f64) {
		if self.torn_down {
			return;
		}
		let (controller, mut scene) = self.scene();
		controller.wheel(&mut scene, screen, delta_y, now);
	}

	pub fn pinch_start(&mut self, a: Point, b: Point) {
		if self.torn_down {
			return;
		}
		let (controller, mut scene) = self.scene();
		controller.pinch_start(&mut scene, a, b);
	}

	pub fn pinch_move(&mut self, a: Point, b: Point, now: f64) {
		if self.torn_down {
			return;
		}
		let (controller, mut scene) = self.scene();
		controller.pinch_move(&mut scene, a, b, now);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		if self.torn_down {
			return;
		}
		let reheat = self.resize_alpha;
		let (controller, mut scene) = self.scene();
		controller.resize(&mut scene, width, height, reheat);
	}

	/// Eases the camera onto `id`. Returns false for unknown ids.
	pub fn focus_on(&mut self, id: NodeId, now: f64) -> bool {
		if self.torn_down {
			return false;
		}
		let Some(target) = self.model.position(id) else {
			debug!("focus on unknown node {}", id);
			return false;
		};
		self.viewport.focus_on(target, now);
		self.scheduler.request_redraw();
		true
	}

	/// Stops the layout and frame pacing for good and drops any held gesture.
	pub fn teardown(&mut self) {
		if self.torn_down {
			return;
		}
		let (controller, mut scene) = self.scene();
		controller.pointer_cancel(&mut scene);
		self.simulation.stop();
		self.scheduler.cancel();
		self.torn_down = true;
		info!("graph engine torn down");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::model::tests::small_tree;
	use crate::components::force_graph::surface::recording::{Command, Recorder};

	fn engine() -> GraphEngine {
		GraphEngine::new(&small_tree(), 800.0, 600.0, EngineConfig::default())
	}

	fn cool(engine: &mut GraphEngine, recorder: &mut Recorder) -> f64 {
		let mut now = 0.0;
		while engine.simulation().is_active() {
			now += 16.0;
			engine.frame(recorder, now);
		}
		now
	}

	fn views(recorder: &Recorder) -> Vec<ViewTransform> {
		recorder
			.commands
			.iter()
			.filter_map(|c| match c {
				Command::SetView(t) => Some(t.clone()),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn at_most_one_draw_per_timestamp() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		assert!(engine.frame(&mut recorder, 16.0));
		engine.pointer_move(Point::new(1.0, 1.0), 16.0);
		assert!(!engine.frame(&mut recorder, 16.0));
		let clears = recorder
			.commands
			.iter()
			.filter(|c| **c == Command::Clear)
			.count();
		assert_eq!(clears, 1);
	}

	#[test]
	fn cooled_static_graph_stops_drawing() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		let now = cool(&mut engine, &mut recorder);
		assert!(!engine.frame(&mut recorder, now + 16.0));
		assert!(!engine.frame(&mut recorder, now + 32.0));
	}

	#[test]
	fn animated_ui_redraws_without_ticks() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		let now = cool(&mut engine, &mut recorder);
		engine.set_ui_state(UiState {
			flagged: [2].into_iter().collect(),
			..UiState::default()
		});
		for frame in 1..=5 {
			assert!(engine.frame(&mut recorder, now + frame as f64 * 16.0));
		}
		assert!(!engine.simulation().is_active());
	}

	#[test]
	fn input_requests_a_single_redraw() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		let now = cool(&mut engine, &mut recorder);
		engine.wheel(Point::new(400.0, 300.0), -120.0, now + 1.0);
		assert!(engine.frame(&mut recorder, now + 16.0));
		assert!(!engine.frame(&mut recorder, now + 32.0));
	}

	#[test]
	fn drag_wakes_the_layout() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		let now = cool(&mut engine, &mut recorder);
		let Some(root) = engine.model().position(1) else {
			panic!("root missing");
		};
		engine.pointer_down(root, now);
		assert_eq!(engine.simulation().alpha_target(), 0.3);
		assert!(engine.simulation().is_active());
		engine.pointer_move(Point::new(root.x + 40.0, root.y), now + 8.0);
		engine.frame(&mut recorder, now + 16.0);
		assert_eq!(engine.model().position(1), Some(Point::new(root.x + 40.0, root.y)));
		assert_eq!(engine.pointer_up(), None);
		assert_eq!(engine.simulation().alpha_target(), 0.0);
	}

	#[test]
	fn focus_draws_interpolated_transform() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		let now = cool(&mut engine, &mut recorder);
		assert!(!engine.focus_on(99, now));
		assert!(engine.focus_on(2, now));

		let half = now + EngineConfig::default().viewport.focus_duration_ms / 2.0;
		let expected = engine.transform(half);
		recorder.commands.clear();
		assert!(engine.frame(&mut recorder, half));
		assert_eq!(views(&recorder), vec![expected.clone()]);
		assert!(expected.k > 1.0);

		let done = now + 10_000.0;
		assert!(engine.frame(&mut recorder, done));
		let Some(target) = engine.model().position(2) else {
			panic!("node missing");
		};
		let landed = engine.transform(done).world_to_screen(target);
		assert!((landed.x - 400.0).abs() < 1e-6 && (landed.y - 300.0).abs() < 1e-6);
		assert!(!engine.frame(&mut recorder, done + 16.0));
	}

	#[test]
	fn resize_recenters_and_reheats() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		cool(&mut engine, &mut recorder);
		engine.resize(0.0, 400.0);
		assert_eq!(engine.size(), (1.0, 400.0));
		assert_eq!(engine.simulation().center(), Point::new(0.5, 200.0));
		assert!(engine.simulation().is_active());
	}

	#[test]
	fn nothing_happens_after_teardown() {
		let mut engine = engine();
		let mut recorder = Recorder::default();
		engine.frame(&mut recorder, 16.0);
		let Some(root) = engine.model().position(1) else {
			panic!("root missing");
		};
		engine.pointer_down(root, 20.0);
		engine.teardown();
		assert!(!engine.is_live());
		assert_eq!(*engine.gesture(), Gesture::Idle);
		assert!(engine.model().nodes().iter().all(|n| !n.is_pinned()));

		recorder.commands.clear();
		engine.set_ui_state(UiState {
			selected: Some(1),
			..UiState::default()
		});
		assert!(!engine.frame(&mut recorder, 32.0));
		assert_eq!(engine.pointer_move(root, 40.0), None);
		assert_eq!(engine.pointer_up(), None);
		assert!(!engine.focus_on(1, 48.0));
		assert!(recorder.commands.is_empty());
	}

	#[test]
	fn empty_graph_still_frames() {
		let mut engine = GraphEngine::new(&GraphData::default(), 800.0, 600.0, EngineConfig::default());
		let mut recorder = Recorder::default();
		assert!(engine.frame(&mut recorder, 16.0));
		assert_eq!(
			recorder.commands,
			vec![
				Command::Clear,
				Command::SetView(ViewTransform::default()),
				Command::ResetView
			]
		);
		engine.pointer_down(Point::new(400.0, 300.0), 20.0);
		assert_eq!(engine.pointer_up(), Some(InteractionEvent::SelectionChanged(None)));
	}
}
