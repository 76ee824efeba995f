use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use log::{debug, info};

use super::config::LayoutConfig;
use super::geometry::node_size;
use super::types::{Edge, Node};

/// Row-wrapping cursor shared by the connected levels and the isolated tail.
struct RowPacker<'a> {
	config: &'a LayoutConfig,
	x: f64,
	y: f64,
	row_height: f64,
	row_used: bool,
	placed_any: bool,
}

impl<'a> RowPacker<'a> {
	fn new(config: &'a LayoutConfig) -> Self {
		Self {
			config,
			x: config.start_x,
			y: config.start_y,
			row_height: 0.0,
			row_used: false,
			placed_any: false,
		}
	}

	fn new_row(&mut self) {
		if self.row_used {
			self.y += self.row_height + self.config.row_gap;
		}
		self.x = self.config.start_x;
		self.row_height = 0.0;
		self.row_used = false;
	}

	fn place(&mut self, width: f64, height: f64) -> (f64, f64) {
		if self.row_used && self.x + width > self.config.start_x + self.config.width_budget {
			self.new_row();
		}
		let at = (self.x, self.y);
		self.x += width + self.config.column_gap;
		self.row_height = self.row_height.max(height);
		self.row_used = true;
		self.placed_any = true;
		at
	}
}

/// Breadth-first levels over the connected nodes. Nodes unreachable from any
/// in-degree-0 root (cycles) seed a fresh traversal at level 0.
fn levels(connected: &[usize], adjacency: &[Vec<usize>], in_degree: &[usize]) -> Vec<Vec<usize>> {
	let mut level_of: HashMap<usize, usize> = HashMap::new();
	let mut levels: Vec<Vec<usize>> = Vec::new();
	let mut queue = VecDeque::new();

	for &idx in connected.iter().filter(|&&idx| in_degree[idx] == 0) {
		level_of.insert(idx, 0);
		queue.push_back(idx);
	}

	let mut fallback = connected.iter();
	loop {
		while let Some(idx) = queue.pop_front() {
			let level = level_of[&idx];
			if levels.len() <= level {
				levels.resize_with(level + 1, Vec::new);
			}
			levels[level].push(idx);
			for &child in &adjacency[idx] {
				if let Entry::Vacant(slot) = level_of.entry(child) {
					slot.insert(level + 1);
					queue.push_back(child);
				}
			}
		}
		match fallback.find(|idx| !level_of.contains_key(idx)) {
			Some(&seed) => {
				debug!("layout seeding cycle from node index {seed}");
				level_of.insert(seed, 0);
				queue.push_back(seed);
			}
			None => break,
		}
	}
	levels
}

/// Recomputes every node position: connected nodes by topological level, one
/// level per row group, then isolated nodes packed below.
pub fn auto_layout(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
	if nodes.is_empty() {
		return Vec::new();
	}

	let index: HashMap<_, _> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
	let mut adjacency = vec![Vec::new(); nodes.len()];
	let mut in_degree = vec![0usize; nodes.len()];
	let mut out_degree = vec![0usize; nodes.len()];

	for edge in edges {
		let (Some(&src), Some(&tgt)) = (index.get(&edge.source), index.get(&edge.target)) else {
			debug!("layout skipping dangling edge {}", edge.id);
			continue;
		};
		if src == tgt {
			continue;
		}
		adjacency[src].push(tgt);
		out_degree[src] += 1;
		in_degree[tgt] += 1;
	}

	let (connected, isolated): (Vec<usize>, Vec<usize>) =
		(0..nodes.len()).partition(|&i| in_degree[i] > 0 || out_degree[i] > 0);

	let mut out = nodes.to_vec();
	let mut packer = RowPacker::new(config);
	let mut place = |packer: &mut RowPacker, idx: usize| {
		let (w, h) = node_size(&out[idx]);
		let (x, y) = packer.place(w, h);
		out[idx].x = x;
		out[idx].y = y;
	};

	for level in levels(&connected, &adjacency, &in_degree) {
		packer.new_row();
		for idx in level {
			place(&mut packer, idx);
		}
	}
	if packer.placed_any {
		packer.new_row();
	}
	for &idx in &isolated {
		place(&mut packer, idx);
	}

	info!(
		"auto-layout placed {} connected and {} isolated nodes",
		connected.len(),
		isolated.len()
	);
	out
}
