use leptos::prelude::*;
use log::{debug, warn};

use super::config::CanvasConfig;
use super::error::CanvasError;
use super::gesture::{Button, Modifiers};
use super::persistence;
use super::state::{Action, CanvasState};
use super::transform::Point;
use super::types::{GenerationRequest, GraphSnapshot, NodeId, NodeKind, NodePatch};

/// Shared handle to one canvas' state.
///
/// Provided through context so the canvas, the toolbar and any generation
/// collaborator all talk to the same engine. Every mutation bumps a revision
/// signal that views subscribe to with [`CanvasController::track`].
#[derive(Clone, Copy)]
pub struct CanvasController {
	state: StoredValue<CanvasState>,
	revision: RwSignal<u64>,
	generator: StoredValue<Option<Callback<GenerationRequest>>>,
}

fn now_ms() -> f64 {
	js_sys::Date::now()
}

impl CanvasController {
	pub fn new(config: CanvasConfig, snapshot: GraphSnapshot) -> Self {
		Self {
			state: StoredValue::new(CanvasState::new(config, snapshot, 800.0, 600.0)),
			revision: RwSignal::new(0),
			generator: StoredValue::new(None),
		}
	}

	/// Registers who fulfils [`GenerationRequest`]s.
	pub fn set_generator(&self, generator: Callback<GenerationRequest>) {
		self.generator.set_value(Some(generator));
	}

	/// Subscribes the running reactive scope to state changes.
	pub fn track(&self) {
		self.revision.track();
	}

	pub fn read<R>(&self, f: impl FnOnce(&CanvasState) -> R) -> Option<R> {
		self.state.try_with_value(f)
	}

	fn bump(&self) {
		self.revision.update(|r| *r += 1);
	}

	fn apply(&self, f: impl FnOnce(&mut CanvasState) -> Vec<Action>) {
		if let Some(actions) = self.state.try_update_value(f) {
			self.dispatch(actions);
		}
	}

	fn dispatch(&self, actions: Vec<Action>) {
		if actions.is_empty() {
			return;
		}
		let mut requests = Vec::new();
		for action in actions {
			match action {
				Action::Generate(request) => requests.push(request),
				other => debug!("canvas: {other:?}"),
			}
		}
		self.bump();

		if requests.is_empty() {
			return;
		}
		match self.generator.get_value() {
			Some(generator) => requests.into_iter().for_each(|r| generator.run(r)),
			None => warn!("no generator registered, dropping {} requests", requests.len()),
		}
	}

	// --- Pointer input, in canvas-element pixels ---

	pub fn pointer_down(&self, screen: Point, button: Button, modifiers: Modifiers) {
		self.apply(|s| s.on_pointer_down(screen, button, modifiers, now_ms()));
	}

	/// Moves are frequent; only gesture transitions bump the revision.
	pub fn pointer_move(&self, screen: Point) {
		self.apply(|s| s.on_pointer_move(screen));
	}

	pub fn pointer_up(&self, screen: Point) {
		self.apply(|s| s.on_pointer_up(screen, now_ms()));
	}

	pub fn pointer_leave(&self) {
		self.state.update_value(CanvasState::on_pointer_leave);
	}

	/// Zooming moves an open creation menu, so it still re-renders views.
	pub fn wheel(&self, screen: Point, delta_y: f64) {
		self.apply(|s| s.on_wheel(screen, delta_y));
		if self.menu_anchor().is_some() {
			self.bump();
		}
	}

	pub fn double_click(&self, screen: Point) {
		self.apply(|s| s.on_double_click(screen));
	}

	pub fn key_down(&self, key: &str) {
		self.apply(|s| s.on_key_down(key));
	}

	// --- Commands ---

	pub fn create_from_menu(&self, kind: NodeKind) {
		self.apply(|s| s.create_from_menu(kind, now_ms()));
	}

	pub fn close_menu(&self) {
		self.apply(CanvasState::close_menu);
	}

	/// Screen position of the open creation menu.
	pub fn menu_anchor(&self) -> Option<Point> {
		self.read(|s| s.menu.map(|m| s.view.to_screen(m.at))).flatten()
	}

	pub fn auto_layout(&self) {
		self.apply(CanvasState::auto_layout);
	}

	pub fn single_selection(&self) -> Option<NodeId> {
		self.read(|s| match s.selection.len() {
			1 => s.selection.first().copied(),
			_ => None,
		})
		.flatten()
	}

	/// Spawns `count` siblings of the one selected node.
	pub fn spawn_from_selection(&self, count: usize) {
		let Some(source) = self.single_selection() else {
			debug!("batch spawn needs exactly one selected node");
			return;
		};
		self.apply(|s| {
			let reference = s
				.graph
				.node(source)
				.and_then(|n| n.data.reference_image())
				.map(str::to_owned);
			s.spawn_batch(source, count, reference.as_deref(), now_ms())
		});
	}

	pub fn generate_selection(&self) {
		self.apply(|s| {
			let ids: Vec<_> = s.selection.iter().copied().collect();
			s.generate(&ids)
		});
	}

	/// Selected ids, oldest first.
	pub fn selected(&self) -> Vec<NodeId> {
		self.read(|s| s.selection.iter().copied().collect())
			.unwrap_or_default()
	}

	/// Removes a node and every edge touching it.
	pub fn delete_node(&self, id: NodeId) {
		self.apply(|s| s.delete_nodes(&[id]));
	}

	pub fn add_edge(&self, source: NodeId, target: NodeId) {
		self.apply(|s| s.connect(source, target, now_ms()));
	}

	/// Entry point for generation results.
	pub fn update_node(&self, id: NodeId, patch: NodePatch) {
		self.apply(|s| s.update_node(id, &patch));
	}

	/// `(nodes, edges, selected)`
	pub fn counts(&self) -> (usize, usize, usize) {
		self.read(|s| (s.graph.nodes.len(), s.graph.edges.len(), s.selection.len()))
			.unwrap_or_default()
	}

	pub fn save(&self) -> Result<(), CanvasError> {
		let snapshot = self.read(CanvasState::snapshot).unwrap_or_default();
		persistence::save_to_local_storage(&snapshot)
	}

	/// Returns whether a saved graph was found.
	pub fn load(&self) -> Result<bool, CanvasError> {
		match persistence::load_from_local_storage()? {
			Some(snapshot) => {
				self.apply(|s| s.load(snapshot));
				Ok(true)
			}
			None => Ok(false),
		}
	}

	// --- Frame loop ---

	pub fn resize(&self, width: f64, height: f64) {
		self.state.update_value(|s| s.resize(width, height));
	}

	/// Advances the pan animation; bumps the revision when it lands.
	pub fn tick(&self, now_ms: f64) {
		let finished = self
			.state
			.try_update_value(|s| s.tick(now_ms) && s.animation.is_none())
			.unwrap_or(false);
		if finished {
			self.bump();
		}
	}

	pub fn cursor(&self) -> &'static str {
		self.read(|s| s.gesture.cursor()).unwrap_or("default")
	}
}
