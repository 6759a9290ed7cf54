/// Square-root scale from child count to node radius, clamped to its range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusScale {
	max_children: f64,
	min_radius: f64,
	max_radius: f64,
}

impl RadiusScale {
	pub fn new(max_children: usize, min_radius: f64, max_radius: f64) -> Self {
		let (min_radius, max_radius) = if min_radius <= max_radius {
			(min_radius, max_radius)
		} else {
			(max_radius, min_radius)
		};
		Self {
			max_children: max_children as f64,
			min_radius,
			max_radius,
		}
	}

	pub fn radius(&self, children: usize) -> f64 {
		if self.max_children <= 0.0 {
			return self.min_radius;
		}
		let t = (children as f64 / self.max_children).sqrt().min(1.0);
		self.min_radius + (self.max_radius - self.min_radius) * t
	}
}
