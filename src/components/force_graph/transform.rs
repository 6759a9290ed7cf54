use super::config::ViewportConfig;
use super::surface::Point;

/// Smallest viewport edge, so the mapping never degenerates.
pub const MIN_VIEWPORT: f64 = 1.0;

pub fn ease_in_out_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Translate-then-scale mapping from world to screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	#[cfg(test)]
	pub fn world_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	pub fn screen_to_world(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	/// Rescales about `focus` (screen space), keeping the world point under it fixed.
	pub fn zoom_about(&self, focus: Point, k: f64) -> Self {
		let world = self.screen_to_world(focus);
		Self {
			x: focus.x - world.x * k,
			y: focus.y - world.y * k,
			k,
		}
	}

	pub fn lerp(&self, to: &ViewTransform, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

#[derive(Clone, Debug)]
struct FocusTransition {
	from: ViewTransform,
	to: ViewTransform,
	start: f64,
}

/// Pan/zoom state of one canvas plus any in-flight focus animation.
#[derive(Clone, Debug)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	transform: ViewTransform,
	transition: Option<FocusTransition>,
	config: ViewportConfig,
}

impl Viewport {
	pub fn new(width: f64, height: f64, config: ViewportConfig) -> Self {
		Self {
			width: width.max(MIN_VIEWPORT),
			height: height.max(MIN_VIEWPORT),
			transform: ViewTransform::default(),
			transition: None,
			config,
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(MIN_VIEWPORT);
		self.height = height.max(MIN_VIEWPORT);
	}

	pub fn clamp_scale(&self, k: f64) -> f64 {
		if k.is_finite() {
			k.clamp(self.config.min_scale, self.config.max_scale)
		} else {
			self.transform.k
		}
	}

	/// Transform to draw and pick with at wall-clock time `now` (ms).
	pub fn current(&self, now: f64) -> ViewTransform {
		match &self.transition {
			Some(transition) => {
				let t = self.progress(transition, now);
				transition.from.lerp(&transition.to, ease_in_out_cubic(t))
			}
			None => self.transform.clone(),
		}
	}

	pub fn in_transition(&self) -> bool {
		self.transition.is_some()
	}

	/// Commits a finished transition. Returns true while one is still running.
	pub fn advance(&mut self, now: f64) -> bool {
		let Some(transition) = &self.transition else {
			return false;
		};
		if self.progress(transition, now) >= 1.0 {
			self.transform = transition.to.clone();
			self.transition = None;
			return false;
		}
		true
	}

	/// Freezes any running transition where it currently is.
	fn interrupt(&mut self, now: f64) {
		if self.transition.is_some() {
			self.transform = self.current(now);
			self.transition = None;
		}
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64, now: f64) {
		self.interrupt(now);
		self.transform.x += dx;
		self.transform.y += dy;
	}

	pub fn zoom_at(&mut self, focus: Point, factor: f64, now: f64) {
		self.interrupt(now);
		let k = self.clamp_scale(self.transform.k * factor);
		self.transform = self.transform.zoom_about(focus, k);
	}

	/// Wheel deltas map exponentially to scale so trackpads and wheels feel alike.
	pub fn wheel_zoom(&mut self, focus: Point, delta_y: f64, now: f64) {
		let factor = 2f64.powf(-delta_y * self.config.wheel_sensitivity);
		self.zoom_at(focus, factor, now);
	}

	/// Starts an eased move that centers `target` (world space) at the focused scale.
	pub fn focus_on(&mut self, target: Point, now: f64) {
		let from = self.current(now);
		let k = self.clamp_scale(self.config.focus_scale);
		let center = self.center();
		let to = ViewTransform {
			x: center.x - target.x * k,
			y: center.y - target.y * k,
			k,
		};
		self.transform = from.clone();
		self.transition = Some(FocusTransition {
			from,
			to,
			start: now,
		});
	}

	fn progress(&self, transition: &FocusTransition, now: f64) -> f64 {
		if self.config.focus_duration_ms <= 0.0 {
			return 1.0;
		}
		((now - transition.start) / self.config.focus_duration_ms).clamp(0.0, 1.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn screen_world_round_trip() {
		let transforms = [
			ViewTransform::default(),
			ViewTransform { x: 120.5, y: -40.0, k: 0.1 },
			ViewTransform { x: -3.0, y: 999.0, k: 10.0 },
			ViewTransform { x: 0.25, y: 0.75, k: 2.5 },
		];
		let points = [
			Point::new(0.0, 0.0),
			Point::new(-250.0, 13.5),
			Point::new(1e4, -1e4),
		];
		for t in &transforms {
			for &p in &points {
				assert!(close(t.screen_to_world(t.world_to_screen(p)), p));
			}
		}
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut viewport = Viewport::new(800.0, 600.0, ViewportConfig::default());
		viewport.pan_by(37.0, -12.0, 0.0);
		let cursor = Point::new(310.0, 205.0);
		let before = viewport.current(0.0).screen_to_world(cursor);
		viewport.zoom_at(cursor, 1.7, 0.0);
		viewport.wheel_zoom(cursor, -240.0, 0.0);
		let after = viewport.current(0.0).screen_to_world(cursor);
		assert!(close(before, after));
	}

	#[test]
	fn scale_is_clamped() {
		let config = ViewportConfig::default();
		let mut viewport = Viewport::new(800.0, 600.0, config.clone());
		for _ in 0..100 {
			viewport.zoom_at(Point::new(10.0, 10.0), 3.0, 0.0);
		}
		assert_eq!(viewport.current(0.0).k, config.max_scale);
		for _ in 0..100 {
			viewport.zoom_at(Point::new(10.0, 10.0), 0.2, 0.0);
		}
		assert_eq!(viewport.current(0.0).k, config.min_scale);
	}

	#[test]
	fn focus_transition_interpolates_then_lands() {
		let config = ViewportConfig::default();
		let mut viewport = Viewport::new(800.0, 600.0, config.clone());
		let target = Point::new(50.0, -20.0);
		viewport.focus_on(target, 1000.0);

		let start = viewport.current(1000.0);
		assert_eq!(start, ViewTransform::default());

		let middle = viewport.current(1000.0 + config.focus_duration_ms / 2.0);
		assert!(middle.k > 1.0 && middle.k < config.focus_scale);
		assert!(viewport.advance(1000.0 + config.focus_duration_ms / 2.0));

		let end = 1000.0 + config.focus_duration_ms;
		assert!(!viewport.advance(end));
		assert!(!viewport.in_transition());
		let landed = viewport.current(end);
		assert_eq!(landed.k, config.focus_scale);
		assert!(close(landed.world_to_screen(target), viewport.center()));
	}

	#[test]
	fn panning_interrupts_focus_at_current_frame() {
		let config = ViewportConfig::default();
		let mut viewport = Viewport::new(800.0, 600.0, config.clone());
		viewport.focus_on(Point::new(200.0, 200.0), 0.0);
		let mid = config.focus_duration_ms / 3.0;
		let frozen = viewport.current(mid);
		viewport.pan_by(10.0, 0.0, mid);
		assert!(!viewport.in_transition());
		let now = viewport.current(mid + 10_000.0);
		assert!((now.x - (frozen.x + 10.0)).abs() < 1e-9);
		assert_eq!(now.k, frozen.k);
	}

	#[test]
	fn zero_area_resize_is_clamped() {
		let mut viewport = Viewport::new(0.0, 0.0, ViewportConfig::default());
		assert_eq!((viewport.width, viewport.height), (1.0, 1.0));
		viewport.resize(-5.0, 300.0);
		assert_eq!((viewport.width, viewport.height), (1.0, 300.0));
	}
}
