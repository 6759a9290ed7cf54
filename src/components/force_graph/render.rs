use std::collections::HashSet;
use std::f64::consts::TAU;

use log::warn;

use super::config::RenderConfig;
use super::model::{SimNode, SpatialModel};
use super::surface::{GradientStop, Glow, Paint, Point, Rgba, StrokeStyle, Surface};
use super::transform::ViewTransform;
use super::types::{GraphLink, NodeId, UiState};

/// Below this length an edge has no usable direction.
const DEGENERATE: f64 = 1e-6;

fn is_degenerate(length: f64) -> bool {
	length.is_nan() || length <= DEGENERATE
}

/// Everything one frame is drawn from.
pub struct Frame<'a> {
	pub model: &'a SpatialModel,
	pub transform: &'a ViewTransform,
	pub ui: &'a UiState,
	pub width: f64,
	pub height: f64,
	/// Wall-clock milliseconds; all animation phases derive from it.
	pub now: f64,
}

/// Position in `[0, 1)` of a repeating animation with the given period.
pub fn cycle_phase(now: f64, period: f64) -> f64 {
	if period <= 0.0 || !now.is_finite() {
		return 0.0;
	}
	now.rem_euclid(period) / period
}

/// Radius and opacity of a flagged node's halo ring at time `now`.
pub fn halo_pulse(now: f64, period: f64, max_radius: f64, max_opacity: f64) -> (f64, f64) {
	let phase = cycle_phase(now, period);
	(phase * max_radius, max_opacity * (1.0 - phase))
}

/// Gradient stops for a bright head at `phase` trailing `length` behind it.
fn sweep_stops(phase: f64, length: f64, base: Rgba, head: Rgba) -> Vec<GradientStop> {
	let tail = (phase - length).max(0.0);
	let front = (phase + 0.04).min(1.0);
	vec![
		GradientStop {
			offset: 0.0,
			color: base,
		},
		GradientStop {
			offset: tail,
			color: base,
		},
		GradientStop {
			offset: phase,
			color: head,
		},
		GradientStop {
			offset: front,
			color: base,
		},
		GradientStop {
			offset: 1.0,
			color: base,
		},
	]
}

/// Control point of a bowed curve; the midpoint itself when the ends coincide.
fn curve_control(from: Point, to: Point, bend: f64) -> Point {
	let mid = from.midpoint(to);
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let len = dx.hypot(dy);
	if is_degenerate(len) {
		return mid;
	}
	Point::new(mid.x - dy * bend, mid.y + dx * bend)
}

pub struct Renderer {
	config: RenderConfig,
	reported: HashSet<GraphLink>,
}

impl Renderer {
	pub fn new(config: RenderConfig) -> Self {
		Self {
			config,
			reported: HashSet::new(),
		}
	}

	/// Draws one frame back to front: edges, cross-links, halos, nodes, labels.
	pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S, frame: &Frame) {
		surface.clear(frame.width, frame.height, self.config.background);
		surface.set_view(frame.transform);
		if !frame.model.is_empty() {
			self.draw_edges(surface, frame);
			self.draw_cross_links(surface, frame);
			self.draw_halos(surface, frame);
			self.draw_nodes(surface, frame);
			self.draw_labels(surface, frame);
		}
		surface.reset_view();
	}

	fn draw_edges<S: Surface + ?Sized>(&self, surface: &mut S, frame: &Frame) {
		let cfg = &self.config;
		let k = frame.transform.k;
		let nodes = frame.model.nodes();
		let selected = frame.ui.selected;
		let trail_phase = cycle_phase(frame.now, cfg.trail_period_ms);

		for &(s, t) in frame.model.links() {
			let (source, target) = (&nodes[s], &nodes[t]);
			let (from, to) = (source.position(), target.position());
			if is_degenerate(from.distance(to)) {
				continue;
			}

			let outgoing = selected == Some(source.id);
			let incoming = selected == Some(target.id)
				&& frame.model.parent_of(target.id) == Some(source.id);
			let (color, width) = if outgoing {
				(cfg.edge_child_color, cfg.edge_width * 1.5)
			} else if incoming {
				(cfg.edge_parent_color, cfg.edge_width * 1.5)
			} else {
				(cfg.edge_color, cfg.edge_width)
			};
			surface.stroke_line(from, to, &StrokeStyle::solid(color, width / k));

			if outgoing || selected == Some(target.id) {
				let trail = StrokeStyle {
					paint: Paint::Gradient(sweep_stops(
						trail_phase,
						cfg.trail_length,
						Rgba::TRANSPARENT,
						cfg.trail_color,
					)),
					width: width * 1.6 / k,
					dash: None,
				};
				surface.stroke_line(from, to, &trail);
			}
		}
	}

	fn draw_cross_links<S: Surface + ?Sized>(&mut self, surface: &mut S, frame: &Frame) {
		let k = frame.transform.k;
		let phase = cycle_phase(frame.now, self.config.cross_link_period_ms);
		let ui = frame.ui;
		if !self.reported.is_empty() {
			self.reported.retain(|link| ui.cross_links.contains(link));
		}

		for link in &ui.cross_links {
			let (Some(from), Some(to)) = (
				frame.model.position(link.source),
				frame.model.position(link.target),
			) else {
				if self.reported.insert(*link) {
					warn!(
						"skipping cross-link {} -> {}: unknown node id",
						link.source, link.target
					);
				}
				continue;
			};
			let cfg = &self.config;
			let control = curve_control(from, to, cfg.cross_link_bend);

			let active = matches!(
				(ui.selected, ui.hovered),
				(Some(sel), Some(hov)) if (link.source == sel && link.target == hov)
					|| (link.source == hov && link.target == sel)
			);
			let style = if active {
				StrokeStyle::solid(cfg.cross_link_active_color, cfg.edge_width * 2.0 / k)
			} else if is_degenerate(from.distance(to)) {
				StrokeStyle::solid(cfg.cross_link_color.with_alpha(0.35), cfg.edge_width / k)
			} else {
				StrokeStyle {
					paint: Paint::Gradient(sweep_stops(
						phase,
						0.35,
						cfg.cross_link_color.with_alpha(0.25),
						cfg.cross_link_color,
					)),
					width: cfg.edge_width * 1.2 / k,
					dash: Some((6.0 / k, 4.0 / k)),
				}
			};
			surface.stroke_curve(from, control, to, &style);
		}
	}

	fn draw_halos<S: Surface + ?Sized>(&self, surface: &mut S, frame: &Frame) {
		let cfg = &self.config;
		let (radius, opacity) = halo_pulse(
			frame.now,
			cfg.halo_period_ms,
			cfg.max_halo_radius,
			cfg.max_halo_opacity,
		);
		let mut flagged: Vec<NodeId> = frame.ui.flagged.iter().copied().collect();
		flagged.sort_unstable();
		for id in flagged {
			let Some(center) = frame.model.position(id) else {
				continue;
			};
			surface.stroke_circle(
				center,
				radius,
				cfg.halo_color.with_alpha(opacity),
				2.0 / frame.transform.k,
			);
		}
	}

	/// Fill by precedence: flagged, hovered, selected, cross-linked, then depth.
	fn node_fill(&self, node: &SimNode, ui: &UiState) -> (Rgba, bool) {
		let cfg = &self.config;
		if ui.flagged.contains(&node.id) {
			(cfg.flagged_color, true)
		} else if ui.hovered == Some(node.id) {
			(cfg.hovered_color, true)
		} else if ui.selected == Some(node.id) {
			(cfg.selected_color, true)
		} else if ui.is_cross_linked(node.id) {
			(cfg.cross_linked_color, true)
		} else {
			let palette = &cfg.depth_palette;
			let color = if palette.is_empty() {
				cfg.edge_color.with_alpha(1.0)
			} else {
				palette[node.depth as usize % palette.len()]
			};
			(color, false)
		}
	}

	fn draw_nodes<S: Surface + ?Sized>(&self, surface: &mut S, frame: &Frame) {
		let cfg = &self.config;
		let pulse = 0.5 + 0.5 * (cycle_phase(frame.now, cfg.glow_period_ms) * TAU).sin();
		let blur = cfg.glow_min_blur + (cfg.glow_max_blur - cfg.glow_min_blur) * pulse;

		for node in frame.model.nodes() {
			let (fill, highlighted) = self.node_fill(node, frame.ui);
			let glow = highlighted.then(|| Glow {
				color: fill.with_alpha(0.8),
				blur,
			});
			surface.fill_circle(node.position(), node.radius, fill, glow);
		}
	}

	fn draw_labels<S: Surface + ?Sized>(&self, surface: &mut S, frame: &Frame) {
		let cfg = &self.config;
		let k = frame.transform.k;
		let font = cfg.label_font_px / k;
		for node in frame.model.nodes() {
			let legible = node.radius * k > cfg.label_threshold_px;
			if !legible && frame.ui.hovered != Some(node.id) {
				continue;
			}
			let at = Point::new(node.x, node.y + node.radius + font);
			surface.draw_text(&node.name, at, font, cfg.label_color);
		}
	}
}
