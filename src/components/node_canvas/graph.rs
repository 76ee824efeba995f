use std::collections::HashSet;

use log::debug;

use super::geometry::node_rect;
use super::transform::Point;
use super::types::{Edge, GraphSnapshot, Node, NodeData, NodeId, NodeKind, NodePatch};

/// Role prompt given to a text node that receives an image connection.
pub const REVERSE_PROMPT_INSTRUCTION: &str = "Reverse-engineer a generation prompt from the connected image. \
	Describe subject, composition, lighting, palette, style and camera so the image could be recreated from text alone.";

/// Hands out creation-time derived node ids and collision-resistant edge ids.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
	last_node: NodeId,
	edge_seq: u64,
}

impl IdAllocator {
	/// Millisecond timestamp, bumped past the last id when two nodes share a tick.
	pub fn node_id(&mut self, now_ms: f64) -> NodeId {
		let stamp = now_ms.max(0.0) as NodeId;
		let id = stamp.max(self.last_node + 1);
		self.last_node = id;
		id
	}

	pub fn edge_id(&mut self, source: NodeId, target: NodeId, now_ms: f64) -> String {
		self.edge_seq += 1;
		format!(
			"edge-{source}-{target}-{}-{}",
			now_ms.max(0.0) as u64,
			self.edge_seq
		)
	}

	pub fn observe(&mut self, id: NodeId) {
		self.last_node = self.last_node.max(id);
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConnectOutcome {
	Created(Edge),
	Duplicate,
	SelfLoop,
	MissingEndpoint,
}

#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub ids: IdAllocator,
}

impl GraphModel {
	pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
		let mut ids = IdAllocator::default();
		for node in &snapshot.nodes {
			ids.observe(node.id);
		}
		Self {
			nodes: snapshot.nodes,
			edges: snapshot.edges,
			ids,
		}
	}

	pub fn snapshot(&self) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.node(id).is_some()
	}

	pub fn add_node(&mut self, kind: NodeKind, at: Point, now_ms: f64) -> NodeId {
		let id = self.ids.node_id(now_ms);
		self.nodes.push(Node::new(id, at.x, at.y, NodeData::new(kind)));
		id
	}

	pub fn insert(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		for node in &nodes {
			self.ids.observe(node.id);
		}
		self.nodes.extend(nodes);
		self.edges.extend(edges);
	}

	/// Replaces every node wholesale, e.g. after auto-layout.
	pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
		self.nodes = nodes;
	}

	pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
		match self.node_mut(id) {
			Some(node) => {
				patch.apply(&mut node.data);
				true
			}
			None => false,
		}
	}

	pub fn move_node(&mut self, id: NodeId, to: Point) {
		if let Some(node) = self.node_mut(id) {
			node.x = to.x;
			node.y = to.y;
		}
	}

	/// Removes the nodes and every edge touching them. Returns the ids actually removed.
	pub fn delete_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
		let doomed: HashSet<NodeId> = ids.iter().copied().filter(|id| self.contains(*id)).collect();
		if doomed.is_empty() {
			return Vec::new();
		}
		self.nodes.retain(|n| !doomed.contains(&n.id));
		self.edges
			.retain(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target));
		debug!("deleted nodes {doomed:?} with their edges");
		ids.iter().copied().filter(|id| doomed.contains(id)).collect()
	}

	pub fn delete_edge(&mut self, edge_id: &str) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| e.id != edge_id);
		let removed = self.edges.len() != before;
		if removed {
			debug!("deleted edge {edge_id}");
		}
		removed
	}

	pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
		self.edges
			.iter()
			.any(|e| e.source == source && e.target == target)
	}

	/// Adds `source -> target` unless it already exists. Connecting an image into a
	/// text node without a role prompt gives it the reverse-prompt instruction.
	pub fn connect(&mut self, source: NodeId, target: NodeId, now_ms: f64) -> ConnectOutcome {
		if source == target {
			debug!("rejected self-connection on node {source}");
			return ConnectOutcome::SelfLoop;
		}
		let (Some(source_kind), Some(target_kind)) = (
			self.node(source).map(Node::kind),
			self.node(target).map(Node::kind),
		) else {
			return ConnectOutcome::MissingEndpoint;
		};
		if self.has_edge(source, target) {
			debug!("dropped duplicate connection {source} -> {target}");
			return ConnectOutcome::Duplicate;
		}

		if source_kind == NodeKind::Image && target_kind == NodeKind::Text {
			if let Some(Node {
				data: NodeData::Text(text),
				..
			}) = self.node_mut(target)
			{
				let unset = text.role_prompt.as_deref().is_none_or(|p| p.trim().is_empty());
				if unset {
					text.role_prompt = Some(REVERSE_PROMPT_INSTRUCTION.to_owned());
				}
			}
		}

		let edge = Edge {
			id: self.ids.edge_id(source, target, now_ms),
			source,
			target,
		};
		self.edges.push(edge.clone());
		ConnectOutcome::Created(edge)
	}

	/// Topmost node whose bounds contain `p`, skipping `exclude`.
	pub fn node_at(&self, p: Point, exclude: Option<NodeId>) -> Option<NodeId> {
		self.nodes
			.iter()
			.rev()
			.filter(|n| Some(n.id) != exclude)
			.find(|n| node_rect(n).contains(p))
			.map(|n| n.id)
	}
}
