use std::collections::{BTreeSet, HashMap};

use log::{debug, info};

use super::config::SpawnConfig;
use super::geometry::node_size;
use super::graph::IdAllocator;
use super::types::{Edge, GenerationRequest, Node, NodeId};

/// New siblings of a source node, ready for the caller to insert.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSpawn {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub requests: Vec<GenerationRequest>,
}

/// Lays out `count` copies of `source` in a grid to its right, each wired back to
/// the source and marked generating. Performs no generation itself.
pub fn spawn_batch(
	source: &Node,
	count: usize,
	reference_image: Option<&str>,
	config: &SpawnConfig,
	ids: &mut IdAllocator,
	now_ms: f64,
) -> BatchSpawn {
	let columns = config.columns.max(1);
	let (width, height) = node_size(source);
	let mut batch = BatchSpawn::default();

	for i in 0..count {
		let (col, row) = ((i % columns) as f64, (i / columns) as f64);
		let node = Node::new(
			ids.node_id(now_ms),
			source.x + (col + 1.0) * (width + config.gap),
			source.y + row * (height + config.gap),
			source.data.sibling(reference_image),
		);
		batch.edges.push(Edge {
			id: ids.edge_id(source.id, node.id, now_ms),
			source: source.id,
			target: node.id,
		});
		batch.requests.push(GenerationRequest::for_node(&node));
		batch.nodes.push(node);
	}
	info!("spawned {count} siblings of node {}", source.id);
	batch
}

/// Tracks which spawned children are still outstanding per source node, so the
/// source's generating flag is cleared once the last original request settles.
#[derive(Clone, Debug, Default)]
pub struct BatchTracker {
	pending: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl BatchTracker {
	pub fn register(&mut self, source: NodeId, children: impl IntoIterator<Item = NodeId>) {
		self.pending.entry(source).or_default().extend(children);
	}

	/// Marks `child` settled. Returns the source whose batch just completed, if any.
	pub fn settle(&mut self, child: NodeId) -> Option<NodeId> {
		let source = self
			.pending
			.iter_mut()
			.find_map(|(source, children)| children.remove(&child).then_some(*source))?;
		if self.pending.get(&source).is_some_and(BTreeSet::is_empty) {
			self.pending.remove(&source);
			debug!("batch from node {source} settled");
			return Some(source);
		}
		None
	}

	/// Drops a deleted node: a source loses its batch, a child counts as settled.
	pub fn forget(&mut self, node: NodeId) -> Option<NodeId> {
		self.pending.remove(&node);
		self.settle(node)
	}
}
