/// What a single animation frame should do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FramePlan {
	pub tick: bool,
	pub draw: bool,
}

/// Decides, once per animation frame, whether the simulation steps and whether
/// anything is drawn. At most one draw is planned per frame timestamp.
#[derive(Debug)]
pub struct FrameScheduler {
	registered: bool,
	dirty: bool,
	last_frame: Option<f64>,
}

impl Default for FrameScheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl FrameScheduler {
	pub fn new() -> Self {
		Self {
			registered: true,
			dirty: true,
			last_frame: None,
		}
	}

	#[cfg(test)]
	pub fn is_registered(&self) -> bool {
		self.registered
	}

	/// Asks for one draw on the next frame even if nothing animates.
	pub fn request_redraw(&mut self) {
		self.dirty = true;
	}

	pub fn plan(&mut self, now: f64, simulation_active: bool, animating: bool) -> FramePlan {
		if !self.registered || self.last_frame == Some(now) {
			return FramePlan::default();
		}
		self.last_frame = Some(now);
		let draw = simulation_active || animating || self.dirty;
		self.dirty = false;
		FramePlan {
			tick: simulation_active,
			draw,
		}
	}

	/// After this no frame is ever planned again.
	pub fn cancel(&mut self) {
		self.registered = false;
		self.dirty = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_frame_always_draws() {
		let mut scheduler = FrameScheduler::new();
		assert_eq!(
			scheduler.plan(16.0, false, false),
			FramePlan {
				tick: false,
				draw: true
			}
		);
		assert_eq!(scheduler.plan(32.0, false, false), FramePlan::default());
	}

	#[test]
	fn ticks_drive_draws_when_static() {
		let mut scheduler = FrameScheduler::new();
		scheduler.plan(0.0, true, false);
		let plan = scheduler.plan(16.0, true, false);
		assert!(plan.tick && plan.draw);
		let plan = scheduler.plan(32.0, false, false);
		assert!(!plan.tick && !plan.draw);
	}

	#[test]
	fn animation_draws_every_frame_after_cooling() {
		let mut scheduler = FrameScheduler::new();
		for frame in 1..=10 {
			let plan = scheduler.plan(frame as f64 * 16.0, false, true);
			assert_eq!(
				plan,
				FramePlan {
					tick: false,
					draw: true
				}
			);
		}
	}

	#[test]
	fn one_draw_per_timestamp() {
		let mut scheduler = FrameScheduler::new();
		assert!(scheduler.plan(16.0, true, true).draw);
		scheduler.request_redraw();
		assert_eq!(scheduler.plan(16.0, true, true), FramePlan::default());
		assert!(scheduler.plan(33.0, false, false).draw);
	}

	#[test]
	fn cancelled_scheduler_stays_silent() {
		let mut scheduler = FrameScheduler::new();
		scheduler.cancel();
		scheduler.request_redraw();
		assert!(!scheduler.is_registered());
		assert_eq!(scheduler.plan(16.0, true, true), FramePlan::default());
	}
}
