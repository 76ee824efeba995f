use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, k: f64) -> Point {
		Point::new(self.x * k, self.y * k)
	}
}

impl Div<f64> for Point {
	type Output = Point;

	fn div(self, k: f64) -> Point {
		Point::new(self.x / k, self.y / k)
	}
}

pub fn screen_to_canvas(screen: Point, offset: Point, scale: f64) -> Point {
	(screen - offset) / scale
}

pub fn canvas_to_screen(canvas: Point, offset: Point, scale: f64) -> Point {
	canvas * scale + offset
}

/// Pan offset (screen pixels) and zoom scale of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub offset: Point,
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			offset: Point::default(),
			scale: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn to_canvas(&self, screen: Point) -> Point {
		screen_to_canvas(screen, self.offset, self.scale)
	}

	pub fn to_screen(&self, canvas: Point) -> Point {
		canvas_to_screen(canvas, self.offset, self.scale)
	}

	/// Change scale while keeping the canvas point under `anchor` fixed on screen.
	pub fn zoom_about(&mut self, new_scale: f64, anchor: Point) {
		let offset = anchor - (anchor - self.offset) / self.scale * new_scale;
		*self = Self {
			offset,
			scale: new_scale,
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn screen_canvas_round_trip() {
		let cases = [
			(Point::new(0.0, 0.0), Point::new(0.0, 0.0), 1.0),
			(Point::new(640.5, 12.25), Point::new(-300.0, 45.0), 0.1),
			(Point::new(-20.0, 999.0), Point::new(120.0, -80.0), 5.0),
			(Point::new(333.3, 777.7), Point::new(13.0, 17.0), 1.37),
		];
		for (screen, offset, scale) in cases {
			let canvas = screen_to_canvas(screen, offset, scale);
			assert!(close(canvas_to_screen(canvas, offset, scale), screen));
		}
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut view = ViewTransform {
			offset: Point::new(40.0, -25.0),
			scale: 0.8,
		};
		let anchor = Point::new(512.0, 300.0);
		let before = view.to_canvas(anchor);
		view.zoom_about(2.4, anchor);
		assert_eq!(view.scale, 2.4);
		assert!(close(view.to_canvas(anchor), before));

		view.zoom_about(0.1, Point::new(3.0, 4.0));
		let again = view.to_canvas(Point::new(3.0, 4.0));
		view.zoom_about(5.0, Point::new(3.0, 4.0));
		assert!(close(view.to_canvas(Point::new(3.0, 4.0)), again));
	}
}
