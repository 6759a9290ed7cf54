//! Tunable constants for the engine, grouped by the part that reads them.

use super::surface::Rgba;

/// d3's default palette, indexed by node depth.
pub const DEPTH_PALETTE: [Rgba; 10] = [
	Rgba::rgb(0x1f, 0x77, 0xb4),
	Rgba::rgb(0xff, 0x7f, 0x0e),
	Rgba::rgb(0x2c, 0xa0, 0x2c),
	Rgba::rgb(0xd6, 0x27, 0x28),
	Rgba::rgb(0x94, 0x67, 0xbd),
	Rgba::rgb(0x8c, 0x56, 0x4b),
	Rgba::rgb(0xe3, 0x77, 0xc2),
	Rgba::rgb(0x7f, 0x7f, 0x7f),
	Rgba::rgb(0xbc, 0xbd, 0x22),
	Rgba::rgb(0x17, 0xbe, 0xcf),
];

#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
	pub simulation: SimulationConfig,
	pub viewport: ViewportConfig,
	pub render: RenderConfig,
	pub interaction: InteractionConfig,
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
	pub alpha: f64,
	pub alpha_min: f64,
	/// Fraction of the gap to alpha target closed each tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Rest length of a link whose target is at depth 0.
	pub link_distance: f64,
	/// Rest length lost per level of target depth.
	pub link_distance_step: f64,
	pub link_distance_min: f64,
	pub link_strength: f64,
	/// Repulsion per unit of the repelling node's radius.
	pub charge_per_radius: f64,
	/// Squared distance below which repulsion stops growing.
	pub charge_distance_min2: f64,
	pub center_strength: f64,
	/// Pull toward the center on each axis. Much above 0.03 the children of a
	/// heavy root fold onto one side of it.
	pub axis_strength: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Alpha injected after a viewport resize.
	pub resize_alpha: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			alpha: 1.0,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			link_distance: 120.0,
			link_distance_step: 20.0,
			link_distance_min: 40.0,
			link_strength: 0.3,
			charge_per_radius: 12.0,
			charge_distance_min2: 1.0,
			center_strength: 1.0,
			axis_strength: 0.01,
			drag_alpha_target: 0.3,
			resize_alpha: 0.3,
		}
	}
}

#[derive(Clone, Debug)]
pub struct ViewportConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	pub focus_scale: f64,
	pub focus_duration_ms: f64,
	pub wheel_sensitivity: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 10.0,
			focus_scale: 2.0,
			focus_duration_ms: 750.0,
			wheel_sensitivity: 0.002,
		}
	}
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
	pub min_radius: f64,
	pub max_radius: f64,
	pub background: Rgba,

	pub edge_color: Rgba,
	pub edge_child_color: Rgba,
	pub edge_parent_color: Rgba,
	pub edge_width: f64,
	pub trail_color: Rgba,
	pub trail_period_ms: f64,
	/// Length of the bright part of a trail, as a fraction of the edge.
	pub trail_length: f64,

	pub cross_link_color: Rgba,
	pub cross_link_active_color: Rgba,
	pub cross_link_period_ms: f64,
	/// Bow of the cross-link curve relative to its chord length.
	pub cross_link_bend: f64,

	pub halo_color: Rgba,
	pub halo_period_ms: f64,
	pub max_halo_radius: f64,
	pub max_halo_opacity: f64,

	pub flagged_color: Rgba,
	pub hovered_color: Rgba,
	pub selected_color: Rgba,
	pub cross_linked_color: Rgba,
	pub depth_palette: Vec<Rgba>,
	pub glow_period_ms: f64,
	pub glow_min_blur: f64,
	pub glow_max_blur: f64,

	/// Screen-space radius a node needs before its label is drawn.
	pub label_threshold_px: f64,
	pub label_font_px: f64,
	pub label_color: Rgba,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			min_radius: 6.0,
			max_radius: 24.0,
			background: Rgba::rgb(0x1a, 0x1a, 0x2e),

			edge_color: Rgba::rgb(100, 180, 255).with_alpha(0.25),
			edge_child_color: Rgba::rgb(120, 230, 160).with_alpha(0.9),
			edge_parent_color: Rgba::rgb(255, 190, 90).with_alpha(0.9),
			edge_width: 1.5,
			trail_color: Rgba::rgb(255, 255, 255),
			trail_period_ms: 1600.0,
			trail_length: 0.25,

			cross_link_color: Rgba::rgb(220, 90, 255),
			cross_link_active_color: Rgba::rgb(255, 140, 255),
			cross_link_period_ms: 2400.0,
			cross_link_bend: 0.2,

			halo_color: Rgba::rgb(255, 80, 80),
			halo_period_ms: 2000.0,
			max_halo_radius: 48.0,
			max_halo_opacity: 0.6,

			flagged_color: Rgba::rgb(255, 80, 80),
			hovered_color: Rgba::rgb(255, 255, 255),
			selected_color: Rgba::rgb(255, 215, 0),
			cross_linked_color: Rgba::rgb(220, 90, 255),
			depth_palette: DEPTH_PALETTE.to_vec(),
			glow_period_ms: 900.0,
			glow_min_blur: 6.0,
			glow_max_blur: 18.0,

			label_threshold_px: 10.0,
			label_font_px: 12.0,
			label_color: Rgba::rgb(255, 255, 255).with_alpha(0.85),
		}
	}
}

#[derive(Clone, Debug)]
pub struct InteractionConfig {
	/// Extra pick radius in screen pixels, independent of zoom.
	pub pick_tolerance_px: f64,
	/// Pointer travel (screen pixels) below which a press still counts as a click.
	pub click_tolerance_px: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			pick_tolerance_px: 4.0,
			click_tolerance_px: 3.0,
		}
	}
}
