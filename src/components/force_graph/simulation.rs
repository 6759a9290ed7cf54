//! Force-directed layout: link springs, radius-weighted repulsion, centering
//! and axis gravity, integrated with velocity decay under a cooling alpha.

use log::debug;

use super::config::SimulationConfig;
use super::model::{SimNode, SpatialModel};
use super::surface::Point;

/// Tiny deterministic offset used when two nodes sit exactly on top of each other.
fn jiggle(seed: usize) -> f64 {
	let golden = (seed as f64 * 0.618_033_988_75).fract();
	(golden - 0.5) * 1e-6
}

pub struct Simulation {
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	center: Point,
	stopped: bool,
	degree: Vec<usize>,
}

impl Simulation {
	pub fn new(config: SimulationConfig, model: &SpatialModel, center: Point) -> Self {
		let mut degree = vec![0; model.len()];
		for &(s, t) in model.links() {
			degree[s] += 1;
			degree[t] += 1;
		}
		Self {
			alpha: config.alpha,
			alpha_target: 0.0,
			config,
			center,
			stopped: false,
			degree,
		}
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	#[cfg(test)]
	pub fn center(&self) -> Point {
		self.center
	}

	/// Whether another tick would still move anything.
	pub fn is_active(&self) -> bool {
		!self.stopped
			&& (self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min)
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Raises alpha to at least `alpha`, waking a cooled layout.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
	}

	pub fn set_center(&mut self, center: Point) {
		self.center = center;
	}

	/// Permanent: a stopped simulation never ticks again.
	pub fn stop(&mut self) {
		self.stopped = true;
	}

	/// Advances one step if the layout is still warm. Returns whether it ran.
	pub fn tick(&mut self, model: &mut SpatialModel) -> bool {
		if !self.is_active() || model.is_empty() {
			return false;
		}
		self.step(model);
		if !self.is_active() {
			debug!("simulation cooled at alpha {:.5}", self.alpha);
		}
		true
	}

	/// One integration step regardless of temperature.
	pub fn step(&mut self, model: &mut SpatialModel) {
		if model.is_empty() {
			return;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(model, alpha);
		self.apply_many_body(model.nodes_mut(), alpha);
		self.apply_axis_gravity(model.nodes_mut(), alpha);
		self.apply_center(model.nodes_mut());

		let keep = 1.0 - self.config.velocity_decay;
		for node in model.nodes_mut() {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	/// Rest length shrinks with the target's depth.
	fn link_distance(&self, target_depth: u32) -> f64 {
		(self.config.link_distance - self.config.link_distance_step * target_depth as f64)
			.max(self.config.link_distance_min)
	}

	fn apply_links(&self, model: &mut SpatialModel, alpha: f64) {
		let links = model.links().to_vec();
		let nodes = model.nodes_mut();
		for (i, (s, t)) in links.into_iter().enumerate() {
			let (source, target) = (&nodes[s], &nodes[t]);
			let mut x = target.x + target.vx - source.x - source.vx;
			let mut y = target.y + target.vy - source.y - source.vy;
			if x == 0.0 {
				x = jiggle(i);
			}
			if y == 0.0 {
				y = jiggle(i + 1);
			}
			let len = x.hypot(y);
			let rest = self.link_distance(target.depth);
			let pull = (len - rest) / len * alpha * self.config.link_strength;
			x *= pull;
			y *= pull;

			let (ds, dt) = (self.degree[s] as f64, self.degree[t] as f64);
			let bias = ds / (ds + dt);
			nodes[t].vx -= x * bias;
			nodes[t].vy -= y * bias;
			nodes[s].vx += x * (1.0 - bias);
			nodes[s].vy += y * (1.0 - bias);
		}
	}

	/// Every node is pushed by every other, scaled by the pusher's radius.
	fn apply_many_body(&self, nodes: &mut [SimNode], alpha: f64) {
		let snapshot: Vec<(f64, f64, f64)> = nodes
			.iter()
			.map(|n| (n.x, n.y, -self.config.charge_per_radius * n.radius))
			.collect();
		let min2 = self.config.charge_distance_min2;
		for (i, node) in nodes.iter_mut().enumerate() {
			for (j, &(ox, oy, strength)) in snapshot.iter().enumerate() {
				if i == j {
					continue;
				}
				let mut x = ox - node.x;
				let mut y = oy - node.y;
				if x == 0.0 {
					x = jiggle(i * 31 + j);
				}
				if y == 0.0 {
					y = jiggle(j * 31 + i);
				}
				let mut l = x * x + y * y;
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength * alpha / l;
				node.vx += x * w;
				node.vy += y * w;
			}
		}
	}

	fn apply_axis_gravity(&self, nodes: &mut [SimNode], alpha: f64) {
		let k = self.config.axis_strength * alpha;
		for node in nodes {
			node.vx += (self.center.x - node.x) * k;
			node.vy += (self.center.y - node.y) * k;
		}
	}

	/// Translates every node so the centroid moves onto the center point.
	fn apply_center(&self, nodes: &mut [SimNode]) {
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let dx = (sx / n - self.center.x) * self.config.center_strength;
		let dy = (sy / n - self.center.y) * self.config.center_strength;
		for node in nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}
