use super::config::MiniMapConfig;
use super::geometry::{Rect, node_rect};
use super::transform::{Point, ViewTransform};
use super::types::{Node, NodeId};

/// Offset that puts `canvas` at the centre of a `viewport`-sized screen at `scale`.
pub fn center_offset(canvas: Point, scale: f64, viewport: (f64, f64)) -> Point {
	Point::new(viewport.0 / 2.0 - canvas.x * scale, viewport.1 / 2.0 - canvas.y * scale)
}

/// Nudges one axis of `offset` so the span `[start, start + size]` stays on screen.
/// Spans larger than the screen are pinned to its leading edge.
fn clamp_axis(offset: f64, start: f64, size: f64, scale: f64, view: f64) -> f64 {
	let lo = start * scale + offset;
	let hi = lo + size * scale;
	if size * scale >= view || lo < 0.0 {
		offset - lo
	} else if hi > view {
		offset - (hi - view)
	} else {
		offset
	}
}

pub fn content_bounds(nodes: &[Node]) -> Option<Rect> {
	nodes
		.iter()
		.map(node_rect)
		.reduce(|acc, r| acc.union(&r))
}

/// Scaled overview of every node, anchored at the viewport's bottom-right corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MiniMap {
	/// Screen-space frame of the whole mini-map.
	pub frame: Rect,
	/// Canvas-space bounds being shown.
	pub content: Rect,
	pub scale: f64,
	/// Screen position of canvas origin inside the map.
	pub origin: Point,
}

impl MiniMap {
	/// `None` when there is nothing to show.
	pub fn compute(nodes: &[Node], viewport: (f64, f64), config: &MiniMapConfig) -> Option<Self> {
		let mut content = content_bounds(nodes)?;
		let min = config.min_content.max(1.0);
		if content.width < min {
			content.x -= (min - content.width) / 2.0;
			content.width = min;
		}
		if content.height < min {
			content.y -= (min - content.height) / 2.0;
			content.height = min;
		}

		let frame = Rect::new(
			viewport.0 - config.margin - config.width,
			viewport.1 - config.margin - config.height,
			config.width,
			config.height,
		);
		let inner = frame.inflate(-config.padding);
		let scale = (inner.width / content.width)
			.min(inner.height / content.height)
			.min(config.max_scale);
		let origin = Point::new(
			inner.x + (inner.width - content.width * scale) / 2.0 - content.x * scale,
			inner.y + (inner.height - content.height * scale) / 2.0 - content.y * scale,
		);

		Some(Self {
			frame,
			content,
			scale,
			origin,
		})
	}

	pub fn contains(&self, screen: Point) -> bool {
		self.frame.contains(screen)
	}

	pub fn to_map(&self, canvas: Point) -> Point {
		self.origin + canvas * self.scale
	}

	pub fn to_canvas(&self, map: Point) -> Point {
		(map - self.origin) / self.scale
	}

	pub fn map_rect(&self, rect: &Rect) -> Rect {
		let at = self.to_map(Point::new(rect.x, rect.y));
		Rect::new(at.x, at.y, rect.width * self.scale, rect.height * self.scale)
	}

	/// The visible part of the canvas, drawn as a rectangle inside the map.
	pub fn viewport_rect(&self, view: &ViewTransform, viewport: (f64, f64)) -> Rect {
		let top_left = view.to_canvas(Point::default());
		self.map_rect(&Rect::new(
			top_left.x,
			top_left.y,
			viewport.0 / view.scale,
			viewport.1 / view.scale,
		))
	}

	/// Node under a map click, with tolerance; overlaps resolve to the nearest centre.
	pub fn hit_node(&self, nodes: &[Node], map: Point, tolerance: f64) -> Option<NodeId> {
		nodes
			.iter()
			.map(|n| (n.id, self.map_rect(&node_rect(n))))
			.filter(|(_, r)| r.inflate(tolerance).contains(map))
			.min_by(|(_, a), (_, b)| a.center().distance(map).total_cmp(&b.center().distance(map)))
			.map(|(id, _)| id)
	}

	/// Pan offset, at the current zoom, that brings the clicked node (or map
	/// point) to the centre of the viewport.
	pub fn navigation_target(
		&self,
		nodes: &[Node],
		map: Point,
		view: &ViewTransform,
		viewport: (f64, f64),
		tolerance: f64,
	) -> Point {
		let hit = self
			.hit_node(nodes, map, tolerance)
			.and_then(|id| nodes.iter().find(|n| n.id == id));
		match hit {
			Some(node) => {
				let rect = node_rect(node);
				let offset = center_offset(rect.center(), view.scale, viewport);
				Point::new(
					clamp_axis(offset.x, rect.x, rect.width, view.scale, viewport.0),
					clamp_axis(offset.y, rect.y, rect.height, view.scale, viewport.1),
				)
			}
			None => center_offset(self.to_canvas(map), view.scale, viewport),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::node_canvas::types::{NodeData, NodeKind, TextNodeData};

	const VIEWPORT: (f64, f64) = (1200.0, 800.0);

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
	}

	fn spread() -> Vec<Node> {
		vec![
			Node::new(1, 0.0, 0.0, NodeData::new(NodeKind::Audio)),
			Node::new(2, 3000.0, 1500.0, NodeData::new(NodeKind::Image)),
			Node::new(3, -800.0, 2200.0, NodeData::new(NodeKind::Text)),
		]
	}

	#[test]
	fn empty_graph_has_no_map() {
		assert!(MiniMap::compute(&[], VIEWPORT, &MiniMapConfig::default()).is_none());
	}

	#[test]
	fn small_content_never_upscales_past_ceiling() {
		let config = MiniMapConfig::default();
		let nodes = [Node::new(1, 0.0, 0.0, NodeData::new(NodeKind::Audio))];
		let map = MiniMap::compute(&nodes, VIEWPORT, &config).unwrap();
		assert_eq!(map.scale, config.max_scale);
		assert!(map.content.width >= config.min_content);
	}

	#[test]
	fn large_content_fits_inside_frame() {
		let map = MiniMap::compute(&spread(), VIEWPORT, &MiniMapConfig::default()).unwrap();
		let inner = map.frame.inflate(-MiniMapConfig::default().padding);
		let drawn = map.map_rect(&map.content);
		assert!(drawn.x >= inner.x - 1e-6 && drawn.right() <= inner.right() + 1e-6);
		assert!(drawn.y >= inner.y - 1e-6 && drawn.bottom() <= inner.bottom() + 1e-6);
		assert!(close(map.to_canvas(map.to_map(Point::new(12.0, 34.0))), Point::new(12.0, 34.0)));
	}

	#[test]
	fn viewport_rect_tracks_pan_and_zoom() {
		let map = MiniMap::compute(&spread(), VIEWPORT, &MiniMapConfig::default()).unwrap();
		let view = ViewTransform {
			offset: Point::new(-200.0, -100.0),
			scale: 2.0,
		};
		let rect = map.viewport_rect(&view, VIEWPORT);
		assert!(close(Point::new(rect.x, rect.y), map.to_map(Point::new(100.0, 50.0))));
		assert!((rect.width - 600.0 * map.scale).abs() < 1e-9);
	}

	#[test]
	fn clicking_a_node_centres_it() {
		let nodes = spread();
		let map = MiniMap::compute(&nodes, VIEWPORT, &MiniMapConfig::default()).unwrap();
		let view = ViewTransform {
			offset: Point::new(37.0, -12.0),
			scale: 0.75,
		};
		let target = &nodes[1];
		let click = map.map_rect(&node_rect(target)).center();
		let offset = map.navigation_target(&nodes, click, &view, VIEWPORT, 4.0);

		let after = ViewTransform {
			offset,
			scale: view.scale,
		};
		let centre = after.to_screen(node_rect(target).center());
		assert!(close(centre, Point::new(VIEWPORT.0 / 2.0, VIEWPORT.1 / 2.0)));
	}

	#[test]
	fn clicking_empty_map_centres_that_point() {
		let nodes = spread();
		let map = MiniMap::compute(&nodes, VIEWPORT, &MiniMapConfig::default()).unwrap();
		let view = ViewTransform::default();
		let click = map.to_map(Point::new(1500.0, 200.0));
		assert_eq!(map.hit_node(&nodes, click, 4.0), None);

		let offset = map.navigation_target(&nodes, click, &view, VIEWPORT, 4.0);
		let after = ViewTransform { offset, scale: 1.0 };
		assert!(close(after.to_screen(Point::new(1500.0, 200.0)), Point::new(600.0, 400.0)));
	}

	#[test]
	fn overlapping_hits_pick_nearest_centre() {
		let nodes = vec![
			Node::new(1, 0.0, 0.0, NodeData::new(NodeKind::Audio)),
			Node::new(2, 200.0, 0.0, NodeData::new(NodeKind::Audio)),
		];
		let map = MiniMap::compute(&nodes, VIEWPORT, &MiniMapConfig::default()).unwrap();
		let near_second = map.to_map(Point::new(300.0, 60.0));
		assert_eq!(map.hit_node(&nodes, near_second, 4.0), Some(2));
		let near_first = map.to_map(Point::new(210.0, 60.0));
		assert_eq!(map.hit_node(&nodes, near_first, 4.0), Some(1));
	}

	#[test]
	fn oversized_node_is_pinned_to_viewport_edge() {
		let tall = NodeData::Text(TextNodeData {
			height: 5000.0,
			..Default::default()
		});
		let nodes = vec![Node::new(1, 0.0, 0.0, tall)];
		let map = MiniMap::compute(&nodes, VIEWPORT, &MiniMapConfig::default()).unwrap();
		let view = ViewTransform::default();
		let click = map.map_rect(&node_rect(&nodes[0])).center();
		let offset = map.navigation_target(&nodes, click, &view, VIEWPORT, 4.0);
		assert_eq!(offset.y, 0.0);
		assert_eq!(offset.x, VIEWPORT.0 / 2.0 - 160.0);
	}
}
