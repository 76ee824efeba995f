use super::transform::Point;

pub fn ease_out_quart(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	1.0 - (1.0 - t).powi(4)
}

/// Eased interpolation of the pan offset between two values. Owns nothing else:
/// cancelling a pan means dropping the task.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanAnimation {
	pub start_ms: f64,
	pub duration_ms: f64,
	pub from: Point,
	pub to: Point,
}

impl PanAnimation {
	pub fn new(from: Point, to: Point, start_ms: f64, duration_ms: f64) -> Self {
		Self {
			start_ms,
			duration_ms,
			from,
			to,
		}
	}

	pub fn progress(&self, now_ms: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			return 1.0;
		}
		((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
	}

	pub fn sample(&self, now_ms: f64) -> Point {
		let t = ease_out_quart(self.progress(now_ms));
		self.from + (self.to - self.from) * t
	}

	pub fn is_finished(&self, now_ms: f64) -> bool {
		self.progress(now_ms) >= 1.0
	}
}
