use super::transform::Point;
use super::types::{Node, NodeData};

pub const TEXT_WIDTH: f64 = 320.0;
pub const IMAGE_WIDTH: f64 = 320.0;
pub const IMAGE_WIDE_WIDTH: f64 = 420.0;
pub const VIDEO_WIDTH: f64 = 400.0;
pub const VIDEO_WIDE_WIDTH: f64 = 480.0;
pub const AUDIO_WIDTH: f64 = 320.0;
pub const AUDIO_HEIGHT: f64 = 120.0;

/// Aspect ratios wider than this get the wide node width.
const WIDE_ASPECT: f64 = 1.5;
const MIN_CONTROL_OFFSET: f64 = 60.0;
const CURVE_SAMPLES: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Normalized rectangle spanned by two corners in any order.
	pub fn from_corners(a: Point, b: Point) -> Self {
		let (x, y) = (a.x.min(b.x), a.y.min(b.y));
		Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
	}

	/// Inclusive overlap: touching edges count.
	pub fn intersects(&self, other: &Rect) -> bool {
		self.x <= other.right()
			&& other.x <= self.right()
			&& self.y <= other.bottom()
			&& other.y <= self.bottom()
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let (x, y) = (self.x.min(other.x), self.y.min(other.y));
		Rect::new(
			x,
			y,
			self.right().max(other.right()) - x,
			self.bottom().max(other.bottom()) - y,
		)
	}

	pub fn inflate(&self, by: f64) -> Rect {
		Rect::new(
			self.x - by,
			self.y - by,
			self.width + 2.0 * by,
			self.height + 2.0 * by,
		)
	}
}

/// Parses `"16:9"`-style ratios into width / height.
pub fn parse_aspect_ratio(ratio: &str) -> Option<f64> {
	let (w, h) = ratio.split_once(':')?;
	let (w, h) = (w.trim().parse::<f64>().ok()?, h.trim().parse::<f64>().ok()?);
	(w > 0.0 && h > 0.0).then(|| w / h)
}

fn media_size(aspect_ratio: &str, base: f64, wide: f64) -> (f64, f64) {
	let ratio = parse_aspect_ratio(aspect_ratio).unwrap_or(1.0);
	let width = if ratio > WIDE_ASPECT { wide } else { base };
	(width, width / ratio)
}

pub fn data_size(data: &NodeData) -> (f64, f64) {
	match data {
		NodeData::Text(d) => (TEXT_WIDTH, d.height),
		NodeData::Image(d) => media_size(&d.aspect_ratio, IMAGE_WIDTH, IMAGE_WIDE_WIDTH),
		NodeData::Video(d) => media_size(&d.aspect_ratio, VIDEO_WIDTH, VIDEO_WIDE_WIDTH),
		NodeData::Audio(_) => (AUDIO_WIDTH, AUDIO_HEIGHT),
	}
}

pub fn node_size(node: &Node) -> (f64, f64) {
	data_size(&node.data)
}

pub fn node_rect(node: &Node) -> Rect {
	let (width, height) = node_size(node);
	Rect::new(node.x, node.y, width, height)
}

/// Left-middle anchor accepting connections.
pub fn input_handle(node: &Node) -> Point {
	let r = node_rect(node);
	Point::new(r.x, r.y + r.height / 2.0)
}

/// Right-middle anchor starting connections.
pub fn output_handle(node: &Node) -> Point {
	let r = node_rect(node);
	Point::new(r.right(), r.y + r.height / 2.0)
}

pub fn delete_button(node: &Node) -> Point {
	let r = node_rect(node);
	Point::new(r.right(), r.y)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
	pub from: Point,
	pub c1: Point,
	pub c2: Point,
	pub to: Point,
}

impl EdgeCurve {
	pub fn between(from: Point, to: Point) -> Self {
		let offset = ((to.x - from.x).abs() * 0.5).max(MIN_CONTROL_OFFSET);
		Self {
			from,
			c1: Point::new(from.x + offset, from.y),
			c2: Point::new(to.x - offset, to.y),
			to,
		}
	}

	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		self.from * (u * u * u)
			+ self.c1 * (3.0 * u * u * t)
			+ self.c2 * (3.0 * u * t * t)
			+ self.to * (t * t * t)
	}

	/// Distance from `p` to the curve, approximated by a sampled polyline.
	pub fn distance_to(&self, p: Point) -> f64 {
		let mut best = f64::INFINITY;
		let mut prev = self.from;
		for i in 1..=CURVE_SAMPLES {
			let next = self.point_at(i as f64 / CURVE_SAMPLES as f64);
			best = best.min(segment_distance(p, prev, next));
			prev = next;
		}
		best
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let ab = b - a;
	let len_sq = ab.x * ab.x + ab.y * ab.y;
	if len_sq < f64::EPSILON {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len_sq).clamp(0.0, 1.0);
	p.distance(a + ab * t)
}

pub fn edge_curve(source: &Node, target: &Node) -> EdgeCurve {
	EdgeCurve::between(output_handle(source), input_handle(target))
}
