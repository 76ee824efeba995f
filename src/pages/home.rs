use std::time::Duration;

use leptos::prelude::*;
use log::{info, warn};

use crate::components::node_canvas::{
	AudioNodeData, CanvasConfig, CanvasController, Edge, GenerationRequest, GraphSnapshot,
	ImageNodeData, Node, NodeCanvas, NodeData, NodeId, NodeKind, NodePatch, TextNodeData, Toolbar,
	persistence,
};

/// A small storyboard pipeline to start from.
fn sample_graph() -> GraphSnapshot {
	let text = |prompt: &str| {
		NodeData::Text(TextNodeData {
			prompt: prompt.to_owned(),
			..Default::default()
		})
	};
	let nodes = vec![
		Node::new(
			1,
			100.0,
			100.0,
			NodeData::Image(ImageNodeData {
				prompt: "A lighthouse on a cliff at dusk".to_owned(),
				..Default::default()
			}),
		),
		Node::new(2, 520.0, 80.0, text("Describe the scene as an opening shot")),
		Node::new(3, 520.0, 380.0, text("Write a two-line voice-over")),
		Node::new(
			4,
			940.0,
			380.0,
			NodeData::Audio(AudioNodeData {
				prompt: "Calm narrator, sea wind in the background".to_owned(),
				..Default::default()
			}),
		),
		Node::new(5, 100.0, 520.0, NodeData::new(NodeKind::Video)),
	];
	let edge = |source: NodeId, target: NodeId| Edge {
		id: format!("edge-{source}-{target}-sample"),
		source,
		target,
	};
	GraphSnapshot {
		nodes,
		edges: vec![edge(1, 2), edge(2, 3), edge(3, 4)],
	}
}

/// Stand-in generation collaborator: answers every request after a short delay.
fn placeholder_generate(controller: CanvasController, request: GenerationRequest) {
	info!("generating {:?} node {}", request.kind, request.node_id);
	let delay = Duration::from_millis(900 + 300 * (request.node_id % 4));
	set_timeout(
		move || {
			let patch = match request.kind {
				NodeKind::Text => NodePatch {
					content: Some(format!("Draft for \"{}\"", request.prompt)),
					generating: Some(false),
					..Default::default()
				},
				kind => NodePatch {
					url: Some(format!(
						"placeholder://{}/{}",
						kind.label().to_lowercase(),
						request.node_id
					)),
					generating: Some(false),
					..Default::default()
				},
			};
			controller.update_node(request.node_id, patch);
		},
		delay,
	);
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let snapshot = match persistence::load_from_local_storage() {
		Ok(Some(saved)) => saved,
		Ok(None) => sample_graph(),
		Err(e) => {
			warn!("ignoring saved graph: {e}");
			sample_graph()
		}
	};
	let config = persistence::load_config_from_local_storage().unwrap_or_else(|e| {
		warn!("ignoring stored config: {e}");
		CanvasConfig::default()
	});
	let controller = CanvasController::new(config, snapshot);
	controller.set_generator(Callback::new(move |request: GenerationRequest| {
		placeholder_generate(controller, request)
	}));
	provide_context(controller);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-canvas">
				<NodeCanvas fullscreen=true />
				<div class="canvas-overlay">
					<Toolbar />
					<p class="subtitle">
						"Drag from a right handle to connect. Shift-drag to select. Double-click an edge to remove it."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
