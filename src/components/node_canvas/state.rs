use std::collections::BTreeSet;

use log::{debug, info};

use super::animation::PanAnimation;
use super::batch::{self, BatchTracker};
use super::config::CanvasConfig;
use super::geometry::{EdgeCurve, Rect, delete_button, edge_curve, input_handle, node_rect, output_handle};
use super::gesture::{Button, Gesture, Modifiers};
use super::graph::{ConnectOutcome, GraphModel};
use super::layout;
use super::minimap::MiniMap;
use super::transform::{Point, ViewTransform};
use super::types::{Edge, GenerationRequest, GraphSnapshot, NodeId, NodeKind, NodePatch};

/// What a pointer-down landed on, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	DeleteButton(NodeId),
	OutputHandle(NodeId),
	InputHandle(NodeId),
	Body(NodeId),
	Background,
}

/// Node-creation menu anchored at a canvas position. A remembered source is
/// wired to whatever node gets created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreationMenu {
	pub at: Point,
	pub source: Option<NodeId>,
}

/// Effects the host reacts to after an event has been applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	SelectionChanged,
	NodesMoved,
	NodeCreated(NodeId),
	NodeUpdated(NodeId),
	NodesDeleted(Vec<NodeId>),
	EdgeCreated(Edge),
	EdgeDeleted(String),
	MenuOpened(CreationMenu),
	MenuClosed,
	GraphReplaced,
	Generate(GenerationRequest),
	NavigationStarted(Point),
}

pub struct CanvasState {
	pub config: CanvasConfig,
	pub graph: GraphModel,
	pub view: ViewTransform,
	pub selection: BTreeSet<NodeId>,
	pub gesture: Gesture,
	pub hovered: Option<NodeId>,
	pub menu: Option<CreationMenu>,
	pub animation: Option<PanAnimation>,
	pub batches: BatchTracker,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(config: CanvasConfig, snapshot: GraphSnapshot, width: f64, height: f64) -> Self {
		Self {
			config,
			graph: GraphModel::from_snapshot(snapshot),
			view: ViewTransform::default(),
			selection: BTreeSet::new(),
			gesture: Gesture::Idle,
			hovered: None,
			menu: None,
			animation: None,
			batches: BatchTracker::default(),
			width,
			height,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn minimap(&self) -> Option<MiniMap> {
		MiniMap::compute(&self.graph.nodes, self.viewport(), &self.config.minimap)
	}

	pub fn delete_button_active(&self, id: NodeId) -> bool {
		self.hovered == Some(id) || self.selection.contains(&id)
	}

	pub fn hit_test(&self, screen: Point) -> Hit {
		let p = self.view.to_canvas(screen);
		let delete_reach = self.config.delete_button_radius / self.view.scale;
		let handle_reach = self.config.handle_radius / self.view.scale;
		let nodes = || self.graph.nodes.iter().rev();

		if let Some(node) = nodes()
			.filter(|n| self.delete_button_active(n.id))
			.find(|n| delete_button(n).distance(p) <= delete_reach)
		{
			return Hit::DeleteButton(node.id);
		}
		for node in nodes() {
			if output_handle(node).distance(p) <= handle_reach {
				return Hit::OutputHandle(node.id);
			}
			if input_handle(node).distance(p) <= handle_reach {
				return Hit::InputHandle(node.id);
			}
		}
		match self.graph.node_at(p, None) {
			Some(id) => Hit::Body(id),
			None => Hit::Background,
		}
	}

	/// Topmost edge whose wide invisible band contains the screen point.
	pub fn edge_at(&self, screen: Point) -> Option<&Edge> {
		let p = self.view.to_canvas(screen);
		let reach = self.config.edge_hit_width / 2.0 / self.view.scale;
		self.graph.edges.iter().rev().find(|edge| {
			self.edge_geometry(edge)
				.is_some_and(|curve| curve.distance_to(p) <= reach)
		})
	}

	/// Curve for an edge; `None` when an endpoint no longer exists.
	pub fn edge_geometry(&self, edge: &Edge) -> Option<EdgeCurve> {
		let source = self.graph.node(edge.source)?;
		let target = self.graph.node(edge.target)?;
		Some(edge_curve(source, target))
	}

	pub fn connection_preview(&self) -> Option<EdgeCurve> {
		let Gesture::Connecting { source, pointer } = &self.gesture else {
			return None;
		};
		let node = self.graph.node(*source)?;
		Some(EdgeCurve::between(output_handle(node), *pointer))
	}

	/// Screen-space rubber band, while one is being drawn.
	pub fn rubber_band(&self) -> Option<Rect> {
		match &self.gesture {
			Gesture::RubberBandSelecting { start, current } => Some(Rect::from_corners(*start, *current)),
			_ => None,
		}
	}

	// --- Pointer events ---

	pub fn on_pointer_down(
		&mut self,
		screen: Point,
		button: Button,
		modifiers: Modifiers,
		now_ms: f64,
	) -> Vec<Action> {
		let mut actions = Vec::new();
		if self.menu.take().is_some() {
			actions.push(Action::MenuClosed);
		}

		if button == Button::Primary && self.minimap().is_some_and(|map| map.contains(screen)) {
			actions.extend(self.navigate_minimap(screen, now_ms));
			return actions;
		}

		match button {
			Button::Middle => {
				self.animation = None;
				self.gesture = Gesture::Panning {
					start: screen,
					initial_offset: self.view.offset,
				};
			}
			Button::Primary => {
				self.animation = None;
				self.primary_down(screen, modifiers, &mut actions);
			}
			Button::Secondary | Button::Other => {}
		}
		actions
	}

	fn primary_down(&mut self, screen: Point, modifiers: Modifiers, actions: &mut Vec<Action>) {
		match self.hit_test(screen) {
			Hit::DeleteButton(id) => actions.extend(self.delete_nodes(&[id])),
			Hit::OutputHandle(source) => {
				self.gesture = Gesture::Connecting {
					source,
					pointer: self.view.to_canvas(screen),
				};
			}
			Hit::InputHandle(_) => {}
			Hit::Body(id) => {
				if modifiers.multi_select() {
					if self.selection.insert(id) {
						actions.push(Action::SelectionChanged);
					}
				} else if !self.selection.contains(&id) {
					self.selection = BTreeSet::from([id]);
					actions.push(Action::SelectionChanged);
				}
				let initial_positions = self
					.selection
					.iter()
					.filter_map(|id| self.graph.node(*id))
					.map(|n| (n.id, Point::new(n.x, n.y)))
					.collect();
				self.gesture = Gesture::DraggingNodes {
					start: screen,
					initial_positions,
				};
			}
			Hit::Background if modifiers.multi_select() => {
				self.gesture = Gesture::RubberBandSelecting {
					start: screen,
					current: screen,
				};
			}
			Hit::Background => {
				if !self.selection.is_empty() {
					self.selection.clear();
					actions.push(Action::SelectionChanged);
				}
				self.gesture = Gesture::Panning {
					start: screen,
					initial_offset: self.view.offset,
				};
			}
		}
	}

	/// The hovered node keeps its hover while the pointer is over its delete
	/// button, which sticks out past the node's corner.
	fn hover_target(&self, screen: Point) -> Option<NodeId> {
		let p = self.view.to_canvas(screen);
		let reach = self.config.delete_button_radius / self.view.scale;
		let on_button = |id: &NodeId| {
			self.graph
				.node(*id)
				.is_some_and(|n| delete_button(n).distance(p) <= reach)
		};
		self.hovered
			.filter(on_button)
			.or_else(|| self.graph.node_at(p, None))
	}

	pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
		let mut gesture = std::mem::take(&mut self.gesture);
		match &mut gesture {
			Gesture::Idle => self.hovered = self.hover_target(screen),
			Gesture::Panning {
				start,
				initial_offset,
			} => {
				self.view.offset = *initial_offset + (screen - *start);
			}
			Gesture::RubberBandSelecting { current, .. } => *current = screen,
			Gesture::DraggingNodes {
				start,
				initial_positions,
			} => {
				let delta = (screen - *start) / self.view.scale;
				for (id, initial) in initial_positions.iter() {
					self.graph.move_node(*id, *initial + delta);
				}
			}
			Gesture::Connecting { pointer, .. } => *pointer = self.view.to_canvas(screen),
		}
		self.gesture = gesture;
		Vec::new()
	}

	/// Resolves whatever gesture is active. Always leaves the machine idle.
	pub fn on_pointer_up(&mut self, screen: Point, now_ms: f64) -> Vec<Action> {
		let mut actions = Vec::new();
		match std::mem::take(&mut self.gesture) {
			Gesture::Idle | Gesture::Panning { .. } => {}
			Gesture::RubberBandSelecting { start, current } => {
				let area = Rect::from_corners(self.view.to_canvas(start), self.view.to_canvas(current));
				let hits = self
					.graph
					.nodes
					.iter()
					.filter(|n| node_rect(n).intersects(&area))
					.map(|n| n.id);
				let before = self.selection.len();
				self.selection.extend(hits);
				if self.selection.len() != before {
					actions.push(Action::SelectionChanged);
				}
			}
			Gesture::DraggingNodes {
				initial_positions, ..
			} => {
				let moved = initial_positions.iter().any(|(id, initial)| {
					self.graph
						.node(*id)
						.is_some_and(|n| n.x != initial.x || n.y != initial.y)
				});
				if moved {
					actions.push(Action::NodesMoved);
				}
			}
			Gesture::Connecting { source, .. } => {
				actions.extend(self.finish_connection(source, self.view.to_canvas(screen), now_ms));
			}
		}
		actions
	}

	fn finish_connection(&mut self, source: NodeId, at: Point, now_ms: f64) -> Vec<Action> {
		let Some(source_rect) = self.graph.node(source).map(node_rect) else {
			return Vec::new();
		};
		match self.graph.node_at(at, Some(source)) {
			Some(target) => self.connect(source, target, now_ms),
			// Dropping back onto the source abandons the drag; no menu for a self-loop.
			None if source_rect.contains(at) => Vec::new(),
			None => {
				let menu = CreationMenu {
					at,
					source: Some(source),
				};
				self.menu = Some(menu);
				vec![Action::MenuOpened(menu)]
			}
		}
	}

	pub fn on_pointer_leave(&mut self) {
		self.hovered = None;
	}

	pub fn on_wheel(&mut self, screen: Point, delta_y: f64) -> Vec<Action> {
		if delta_y == 0.0 {
			return Vec::new();
		}
		self.animation = None;
		let step = self.config.wheel_zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		let scale = (self.view.scale * factor).clamp(self.config.min_scale, self.config.max_scale);
		self.view.zoom_about(scale, screen);
		Vec::new()
	}

	/// Removes an edge under the pointer, or opens the creation menu on empty canvas.
	pub fn on_double_click(&mut self, screen: Point) -> Vec<Action> {
		if self.minimap().is_some_and(|map| map.contains(screen)) {
			return Vec::new();
		}
		if self.hit_test(screen) != Hit::Background {
			return Vec::new();
		}
		if let Some(edge_id) = self.edge_at(screen).map(|e| e.id.clone()) {
			self.graph.delete_edge(&edge_id);
			return vec![Action::EdgeDeleted(edge_id)];
		}
		let menu = CreationMenu {
			at: self.view.to_canvas(screen),
			source: None,
		};
		self.menu = Some(menu);
		vec![Action::MenuOpened(menu)]
	}

	pub fn on_key_down(&mut self, key: &str) -> Vec<Action> {
		match key {
			"Delete" | "Backspace" => {
				let selected: Vec<_> = self.selection.iter().copied().collect();
				self.delete_nodes(&selected)
			}
			"Escape" => {
				let mut actions = Vec::new();
				if self.menu.take().is_some() {
					actions.push(Action::MenuClosed);
				}
				if !self.selection.is_empty() {
					self.selection.clear();
					actions.push(Action::SelectionChanged);
				}
				actions
			}
			_ => Vec::new(),
		}
	}

	// --- Commands ---

	pub fn close_menu(&mut self) -> Vec<Action> {
		match self.menu.take() {
			Some(_) => vec![Action::MenuClosed],
			None => Vec::new(),
		}
	}

	/// Creates a node at the open menu's anchor and wires the remembered source to it.
	pub fn create_from_menu(&mut self, kind: NodeKind, now_ms: f64) -> Vec<Action> {
		let Some(menu) = self.menu.take() else {
			return Vec::new();
		};
		let id = self.graph.add_node(kind, menu.at, now_ms);
		let mut actions = vec![Action::MenuClosed, Action::NodeCreated(id)];
		if let Some(source) = menu.source {
			actions.extend(self.connect(source, id, now_ms));
		}
		self.selection = BTreeSet::from([id]);
		actions.push(Action::SelectionChanged);
		actions
	}

	/// Duplicates, self-loops and unknown endpoints yield no action.
	pub fn connect(&mut self, source: NodeId, target: NodeId, now_ms: f64) -> Vec<Action> {
		match self.graph.connect(source, target, now_ms) {
			ConnectOutcome::Created(edge) => vec![Action::EdgeCreated(edge)],
			_ => Vec::new(),
		}
	}

	pub fn delete_nodes(&mut self, ids: &[NodeId]) -> Vec<Action> {
		let removed = self.graph.delete_nodes(ids);
		if removed.is_empty() {
			return Vec::new();
		}
		let mut actions = Vec::new();
		for id in &removed {
			self.selection.remove(id);
			if self.hovered == Some(*id) {
				self.hovered = None;
			}
			if let Some(source) = self.batches.forget(*id) {
				actions.extend(self.finish_batch(source));
			}
		}
		actions.push(Action::NodesDeleted(removed));
		actions.push(Action::SelectionChanged);
		actions
	}

	/// Merges a patch, typically a generation result arriving at some later frame.
	pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> Vec<Action> {
		if !self.graph.update_node(id, patch) {
			debug!("ignoring update for missing node {id}");
			return Vec::new();
		}
		let mut actions = vec![Action::NodeUpdated(id)];
		if patch.generating == Some(false) {
			if let Some(source) = self.batches.settle(id) {
				actions.extend(self.finish_batch(source));
			}
		}
		actions
	}

	fn finish_batch(&mut self, source: NodeId) -> Vec<Action> {
		match self.graph.node_mut(source) {
			Some(node) => {
				node.data.set_generating(false);
				vec![Action::NodeUpdated(source)]
			}
			None => Vec::new(),
		}
	}

	pub fn auto_layout(&mut self) -> Vec<Action> {
		if self.graph.nodes.is_empty() {
			return Vec::new();
		}
		let nodes = layout::auto_layout(&self.graph.nodes, &self.graph.edges, &self.config.layout);
		self.graph.replace_nodes(nodes);
		vec![Action::GraphReplaced]
	}

	/// Spawns `count` siblings of `source` and asks for each one to be generated.
	pub fn spawn_batch(
		&mut self,
		source: NodeId,
		count: usize,
		reference_image: Option<&str>,
		now_ms: f64,
	) -> Vec<Action> {
		let Some(node) = self.graph.node(source).cloned() else {
			return Vec::new();
		};
		if count == 0 {
			return Vec::new();
		}
		let spawned = batch::spawn_batch(
			&node,
			count,
			reference_image,
			&self.config.spawn,
			&mut self.graph.ids,
			now_ms,
		);
		self.batches.register(source, spawned.nodes.iter().map(|n| n.id));
		if let Some(node) = self.graph.node_mut(source) {
			node.data.set_generating(true);
		}

		let mut actions: Vec<_> = spawned
			.nodes
			.iter()
			.map(|n| Action::NodeCreated(n.id))
			.collect();
		actions.extend(spawned.edges.iter().cloned().map(Action::EdgeCreated));
		actions.extend(spawned.requests.into_iter().map(Action::Generate));
		self.graph.insert(spawned.nodes, spawned.edges);
		actions
	}

	/// Marks the nodes generating and emits one request per node not already busy.
	pub fn generate(&mut self, ids: &[NodeId]) -> Vec<Action> {
		ids.iter()
			.filter_map(|id| {
				let node = self.graph.node_mut(*id)?;
				if node.data.is_generating() {
					return None;
				}
				node.data.set_generating(true);
				Some(Action::Generate(GenerationRequest::for_node(node)))
			})
			.collect()
	}

	pub fn navigate_minimap(&mut self, screen: Point, now_ms: f64) -> Vec<Action> {
		let Some(map) = self.minimap() else {
			return Vec::new();
		};
		let target = map.navigation_target(
			&self.graph.nodes,
			screen,
			&self.view,
			self.viewport(),
			self.config.minimap.hit_tolerance,
		);
		debug!("mini-map navigating to offset ({:.1}, {:.1})", target.x, target.y);
		self.animation = Some(PanAnimation::new(
			self.view.offset,
			target,
			now_ms,
			self.config.minimap.animation_ms,
		));
		vec![Action::NavigationStarted(target)]
	}

	/// Advances the pan animation. Returns whether one was running.
	pub fn tick(&mut self, now_ms: f64) -> bool {
		let Some(animation) = self.animation else {
			return false;
		};
		self.view.offset = animation.sample(now_ms);
		if animation.is_finished(now_ms) {
			self.animation = None;
		}
		true
	}

	pub fn snapshot(&self) -> GraphSnapshot {
		self.graph.snapshot()
	}

	/// Replaces the whole graph and resets every piece of interaction state.
	pub fn load(&mut self, snapshot: GraphSnapshot) -> Vec<Action> {
		info!(
			"loading graph with {} nodes and {} edges",
			snapshot.nodes.len(),
			snapshot.edges.len()
		);
		self.graph = GraphModel::from_snapshot(snapshot);
		self.selection.clear();
		self.gesture = Gesture::Idle;
		self.hovered = None;
		self.menu = None;
		self.animation = None;
		self.batches = BatchTracker::default();
		vec![Action::GraphReplaced, Action::SelectionChanged]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::node_canvas::graph::REVERSE_PROMPT_INSTRUCTION;
	use crate::components::node_canvas::types::{Node, NodeData, TextNodeData};

	const SHIFT: Modifiers = Modifiers {
		shift: true,
		ctrl: false,
		meta: false,
		alt: false,
	};
	const NONE: Modifiers = Modifiers {
		shift: false,
		ctrl: false,
		meta: false,
		alt: false,
	};

	fn p(x: f64, y: f64) -> Point {
		Point::new(x, y)
	}

	fn node(id: NodeId, kind: NodeKind, x: f64, y: f64) -> Node {
		Node::new(id, x, y, NodeData::new(kind))
	}

	fn state(nodes: Vec<Node>) -> CanvasState {
		CanvasState::new(
			CanvasConfig::default(),
			GraphSnapshot {
				nodes,
				edges: Vec::new(),
			},
			1200.0,
			800.0,
		)
	}

	fn pos(s: &CanvasState, id: NodeId) -> Point {
		let n = s.graph.node(id).unwrap();
		p(n.x, n.y)
	}

	fn drag(s: &mut CanvasState, from: Point, to: Point, modifiers: Modifiers) -> Vec<Action> {
		let mut actions = s.on_pointer_down(from, Button::Primary, modifiers, 1000.0);
		actions.extend(s.on_pointer_move(to));
		actions.extend(s.on_pointer_up(to, 2000.0));
		actions
	}

	#[test]
	fn background_drag_pans_and_clears_selection() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		s.selection.insert(1);
		s.on_pointer_down(p(500.0, 500.0), Button::Primary, NONE, 0.0);
		assert!(s.selection.is_empty());
		s.on_pointer_move(p(530.0, 480.0));
		assert_eq!(s.view.offset, p(30.0, -20.0));
		s.on_pointer_up(p(530.0, 480.0), 0.0);
		assert_eq!(s.gesture, Gesture::Idle);
	}

	#[test]
	fn middle_button_pans_even_over_a_node() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		s.on_pointer_down(p(50.0, 50.0), Button::Middle, NONE, 0.0);
		assert!(matches!(s.gesture, Gesture::Panning { .. }));
		s.on_pointer_move(p(60.0, 50.0));
		assert_eq!(pos(&s, 1), p(0.0, 0.0));
		assert_eq!(s.view.offset, p(10.0, 0.0));
	}

	#[test]
	fn rubber_band_selects_intersecting_nodes() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 2000.0, 2000.0),
			node(3, NodeKind::Audio, 450.0, 250.0),
		]);
		s.view.offset = p(20.0, 20.0);
		drag(&mut s, p(10.0, 10.0), p(520.0, 320.0), SHIFT);
		assert_eq!(s.selection, BTreeSet::from([1, 3]));
		assert_eq!(s.gesture, Gesture::Idle);
	}

	#[test]
	fn rubber_band_respects_zoom() {
		let mut s = state(vec![node(1, NodeKind::Audio, 1000.0, 1000.0)]);
		s.view.scale = 0.5;
		drag(&mut s, p(400.0, 400.0), p(480.0, 480.0), SHIFT);
		assert!(s.selection.is_empty());
		drag(&mut s, p(400.0, 400.0), p(520.0, 520.0), SHIFT);
		assert_eq!(s.selection, BTreeSet::from([1]));
	}

	#[test]
	fn dragging_a_selected_node_moves_the_whole_selection() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 0.0, 400.0),
			node(3, NodeKind::Audio, 600.0, 0.0),
		]);
		s.view.scale = 2.0;
		s.selection = BTreeSet::from([1, 2]);
		let actions = drag(&mut s, p(100.0, 100.0), p(140.0, 60.0), NONE);

		assert_eq!(pos(&s, 1), p(20.0, -20.0));
		assert_eq!(pos(&s, 2), p(20.0, 380.0));
		assert_eq!(pos(&s, 3), p(600.0, 0.0));
		assert!(actions.contains(&Action::NodesMoved));
		assert_eq!(s.selection, BTreeSet::from([1, 2]));
	}

	#[test]
	fn dragging_an_unselected_node_replaces_selection() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 0.0, 400.0),
		]);
		s.selection.insert(1);
		drag(&mut s, p(50.0, 450.0), p(70.0, 470.0), NONE);
		assert_eq!(s.selection, BTreeSet::from([2]));
		assert_eq!(pos(&s, 1), p(0.0, 0.0));
		assert_eq!(pos(&s, 2), p(20.0, 420.0));
	}

	#[test]
	fn modifier_click_extends_selection() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 0.0, 400.0),
		]);
		s.selection.insert(1);
		drag(&mut s, p(50.0, 450.0), p(50.0, 450.0), SHIFT);
		assert_eq!(s.selection, BTreeSet::from([1, 2]));
	}

	#[test]
	fn hit_priority_is_delete_then_handle_then_body() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		let near_corner = p(317.0, 3.0);
		assert_eq!(s.hit_test(near_corner), Hit::Body(1));
		s.selection.insert(1);
		assert_eq!(s.hit_test(near_corner), Hit::DeleteButton(1));
		assert_eq!(s.hit_test(p(318.0, 60.0)), Hit::OutputHandle(1));
		assert_eq!(s.hit_test(p(2.0, 60.0)), Hit::InputHandle(1));
		assert_eq!(s.hit_test(p(160.0, 60.0)), Hit::Body(1));
		assert_eq!(s.hit_test(p(700.0, 60.0)), Hit::Background);
	}

	#[test]
	fn idle_moves_track_hover_until_the_pointer_leaves() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		assert!(s.on_pointer_move(p(160.0, 60.0)).is_empty());
		assert_eq!(s.hovered, Some(1));
		assert!(s.delete_button_active(1));

		s.on_pointer_move(p(700.0, 400.0));
		assert_eq!(s.hovered, None);

		s.on_pointer_move(p(160.0, 60.0));
		s.on_pointer_leave();
		assert_eq!(s.hovered, None);
		assert!(!s.delete_button_active(1));
	}

	#[test]
	fn hover_alone_arms_the_delete_button_past_the_corner() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		s.on_pointer_move(p(160.0, 60.0));
		s.on_pointer_move(p(325.0, -4.0));
		assert_eq!(s.hovered, Some(1));
		assert_eq!(s.hit_test(p(325.0, -4.0)), Hit::DeleteButton(1));

		let actions = s.on_pointer_down(p(325.0, -4.0), Button::Primary, NONE, 0.0);
		assert!(actions.contains(&Action::NodesDeleted(vec![1])));
		assert!(s.graph.nodes.is_empty());
		assert_eq!(s.gesture, Gesture::Idle);
		assert_eq!(s.hovered, None);
	}

	#[test]
	fn arriving_outside_the_node_does_not_arm_its_button() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		s.on_pointer_move(p(325.0, -4.0));
		assert_eq!(s.hovered, None);
		assert_eq!(s.hit_test(p(325.0, -4.0)), Hit::Background);
	}

	#[test]
	fn delete_button_removes_node_and_edges() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 500.0, 0.0),
		]);
		s.graph.connect(1, 2, 0.0);
		s.selection.insert(1);
		let actions = s.on_pointer_down(p(320.0, 0.0), Button::Primary, NONE, 0.0);
		s.on_pointer_up(p(320.0, 0.0), 0.0);

		assert!(actions.contains(&Action::NodesDeleted(vec![1])));
		assert!(s.graph.node(1).is_none());
		assert!(s.graph.edges.is_empty());
		assert!(s.selection.is_empty());
		assert_eq!(s.gesture, Gesture::Idle);
	}

	#[test]
	fn releasing_on_a_node_connects_directly_once() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 500.0, 0.0),
		]);
		let first = drag(&mut s, p(320.0, 60.0), p(600.0, 100.0), NONE);
		assert!(matches!(first.as_slice(), [Action::EdgeCreated(e)] if e.source == 1 && e.target == 2));
		assert!(s.menu.is_none());

		let second = drag(&mut s, p(320.0, 60.0), p(550.0, 20.0), NONE);
		assert!(second.is_empty());
		assert_eq!(s.graph.edges.len(), 1);
	}

	#[test]
	fn direct_connect_reports_only_new_edges() {
		let mut s = state(vec![
			node(1, NodeKind::Image, 0.0, 0.0),
			node(2, NodeKind::Text, 500.0, 0.0),
		]);
		let created = s.connect(1, 2, 5.0);
		assert!(matches!(created.as_slice(), [Action::EdgeCreated(e)] if e.source == 1 && e.target == 2));
		assert_eq!(
			s.graph.node(2).unwrap().data,
			NodeData::Text(TextNodeData {
				role_prompt: Some(REVERSE_PROMPT_INSTRUCTION.into()),
				..Default::default()
			})
		);
		assert!(s.connect(1, 2, 6.0).is_empty());
		assert!(s.connect(2, 2, 6.0).is_empty());
		assert!(s.connect(2, 99, 6.0).is_empty());
		assert_eq!(s.graph.edges.len(), 1);
	}

	#[test]
	fn connection_preview_follows_pointer() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		s.view.offset = p(100.0, 0.0);
		s.on_pointer_down(p(420.0, 60.0), Button::Primary, NONE, 0.0);
		s.on_pointer_move(p(700.0, 300.0));
		let curve = s.connection_preview().unwrap();
		assert_eq!(curve.from, p(320.0, 60.0));
		assert_eq!(curve.to, p(600.0, 300.0));
		s.on_pointer_up(p(700.0, 300.0), 0.0);
		assert!(s.connection_preview().is_none());
	}

	#[test]
	fn releasing_on_empty_canvas_opens_menu_that_autowires() {
		let mut s = state(vec![node(1, NodeKind::Image, 0.0, 0.0)]);
		let actions = drag(&mut s, p(320.0, 160.0), p(700.0, 200.0), NONE);
		let menu = CreationMenu {
			at: p(700.0, 200.0),
			source: Some(1),
		};
		assert_eq!(actions, vec![Action::MenuOpened(menu)]);
		assert!(s.graph.edges.is_empty());

		let actions = s.create_from_menu(NodeKind::Text, 5000.0);
		let created = s.graph.nodes.last().unwrap().clone();
		assert_eq!((created.x, created.y), (700.0, 200.0));
		assert!(actions.contains(&Action::NodeCreated(created.id)));
		assert_eq!(s.graph.edges.len(), 1);
		assert_eq!((s.graph.edges[0].source, s.graph.edges[0].target), (1, created.id));
		let NodeData::Text(text) = &created.data else {
			panic!("expected text node");
		};
		assert_eq!(text.role_prompt.as_deref(), Some(REVERSE_PROMPT_INSTRUCTION));
		assert!(s.menu.is_none());
	}

	#[test]
	fn releasing_on_the_source_cancels() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		let actions = drag(&mut s, p(320.0, 60.0), p(200.0, 60.0), NONE);
		assert!(actions.is_empty());
		assert!(s.menu.is_none());
		assert_eq!(s.gesture, Gesture::Idle);
	}

	#[test]
	fn pointer_up_without_gesture_is_a_no_op() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		assert!(s.on_pointer_up(p(10.0, 10.0), 0.0).is_empty());
		assert_eq!(s.gesture, Gesture::Idle);
		assert_eq!(pos(&s, 1), p(0.0, 0.0));
	}

	#[test]
	fn wheel_zoom_is_anchored_and_clamped() {
		let mut s = state(Vec::new());
		let anchor = p(300.0, 200.0);
		let before = s.view.to_canvas(anchor);
		s.on_wheel(anchor, -1.0);
		assert!(s.view.scale > 1.0);
		let after = s.view.to_canvas(anchor);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);

		for _ in 0..200 {
			s.on_wheel(anchor, 1.0);
		}
		assert_eq!(s.view.scale, s.config.min_scale);
		for _ in 0..200 {
			s.on_wheel(anchor, -1.0);
		}
		assert_eq!(s.view.scale, s.config.max_scale);
	}

	#[test]
	fn double_click_deletes_edge_or_opens_menu() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 800.0, 0.0),
		]);
		s.graph.connect(1, 2, 0.0);
		let edge_id = s.graph.edges[0].id.clone();

		assert_eq!(s.on_double_click(p(560.0, 64.0)), vec![Action::EdgeDeleted(edge_id)]);
		assert!(s.graph.edges.is_empty());

		let actions = s.on_double_click(p(560.0, 500.0));
		assert!(matches!(actions.as_slice(), [Action::MenuOpened(CreationMenu { source: None, .. })]));
		assert!(s.on_double_click(p(100.0, 60.0)).is_empty());
	}

	#[test]
	fn keyboard_deletes_selection_and_escape_clears() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 500.0, 0.0),
			node(3, NodeKind::Audio, 0.0, 500.0),
		]);
		s.selection = BTreeSet::from([1, 2]);
		s.on_key_down("Delete");
		assert_eq!(s.graph.nodes.len(), 1);

		s.selection.insert(3);
		s.menu = Some(CreationMenu {
			at: p(0.0, 0.0),
			source: None,
		});
		let actions = s.on_key_down("Escape");
		assert_eq!(actions, vec![Action::MenuClosed, Action::SelectionChanged]);
		assert_eq!(s.graph.nodes.len(), 1);
	}

	#[test]
	fn minimap_click_animates_node_into_centre() {
		let mut s = state(vec![
			node(1, NodeKind::Audio, 0.0, 0.0),
			node(2, NodeKind::Audio, 4000.0, 3000.0),
		]);
		let map = s.minimap().unwrap();
		let target = s.graph.node(2).unwrap().clone();
		let click = map.map_rect(&node_rect(&target)).center();

		let actions = s.on_pointer_down(click, Button::Primary, NONE, 1000.0);
		assert!(matches!(actions.as_slice(), [Action::NavigationStarted(_)]));
		assert_eq!(s.gesture, Gesture::Idle);

		assert!(s.tick(1100.0));
		assert!(s.animation.is_some());
		assert!(s.tick(1000.0 + s.config.minimap.animation_ms));
		assert!(s.animation.is_none());
		assert!(!s.tick(5000.0));

		let centre = s.view.to_screen(node_rect(&target).center());
		assert!((centre.x - 600.0).abs() < 1e-6 && (centre.y - 400.0).abs() < 1e-6);
	}

	#[test]
	fn starting_a_pan_drops_the_animation() {
		let mut s = state(vec![node(1, NodeKind::Audio, 4000.0, 3000.0)]);
		s.navigate_minimap(p(1000.0, 700.0), 0.0);
		assert!(s.animation.is_some());
		s.on_pointer_down(p(100.0, 100.0), Button::Primary, NONE, 10.0);
		assert!(s.animation.is_none());
	}

	#[test]
	fn batch_resets_source_once_every_child_settles() {
		let mut s = state(vec![node(1, NodeKind::Image, 0.0, 0.0)]);
		let actions = s.spawn_batch(1, 3, Some("ref.png"), 10_000.0);
		let requests: Vec<_> = actions
			.iter()
			.filter_map(|a| match a {
				Action::Generate(r) => Some(r.node_id),
				_ => None,
			})
			.collect();
		assert_eq!(requests.len(), 3);
		assert_eq!(s.graph.nodes.len(), 4);
		assert_eq!(s.graph.edges.len(), 3);
		assert!(s.graph.node(1).unwrap().data.is_generating());

		let done = NodePatch {
			url: Some("out.png".into()),
			generating: Some(false),
			..Default::default()
		};
		s.update_node(requests[0], &done);
		s.delete_nodes(&[requests[1]]);
		assert!(s.graph.node(1).unwrap().data.is_generating());

		let actions = s.update_node(requests[2], &done);
		assert_eq!(actions, vec![Action::NodeUpdated(requests[2]), Action::NodeUpdated(1)]);
		assert!(!s.graph.node(1).unwrap().data.is_generating());
	}

	#[test]
	fn generate_skips_busy_nodes() {
		let mut s = state(vec![
			node(1, NodeKind::Text, 0.0, 0.0),
			node(2, NodeKind::Video, 500.0, 0.0),
		]);
		assert_eq!(s.generate(&[1, 2, 99]).len(), 2);
		assert!(s.generate(&[1, 2]).is_empty());
	}

	#[test]
	fn auto_layout_replaces_positions() {
		let mut s = state(vec![
			node(1, NodeKind::Text, -500.0, 900.0),
			node(2, NodeKind::Image, 3000.0, -40.0),
		]);
		s.graph.connect(1, 2, 0.0);
		assert_eq!(s.auto_layout(), vec![Action::GraphReplaced]);
		let (a, b) = (pos(&s, 1), pos(&s, 2));
		assert_eq!(a, p(100.0, 100.0));
		assert_eq!(b.x, a.x);
		assert!(b.y > a.y);
		assert!(state(Vec::new()).auto_layout().is_empty());
	}

	#[test]
	fn load_resets_interaction_state() {
		let mut s = state(vec![node(1, NodeKind::Audio, 0.0, 0.0)]);
		s.selection.insert(1);
		s.on_pointer_down(p(50.0, 50.0), Button::Primary, NONE, 0.0);
		s.load(GraphSnapshot::default());
		assert!(s.selection.is_empty());
		assert_eq!(s.gesture, Gesture::Idle);
		assert!(s.graph.nodes.is_empty());
	}
}
