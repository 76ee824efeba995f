use leptos::prelude::*;
use log::warn;

use super::controller::CanvasController;

const MAX_BATCH: usize = 12;

/// Graph-wide commands for the canvas in context.
#[component]
pub fn Toolbar() -> impl IntoView {
	let controller = expect_context::<CanvasController>();
	let batch_size = RwSignal::new(4usize);
	let status = RwSignal::new(String::new());

	let no_single = move || {
		controller.track();
		controller.single_selection().is_none()
	};
	let not_a_pair = move || {
		controller.track();
		controller.selected().len() != 2
	};
	// Ids grow with creation time, so the older node feeds the newer one.
	let connect = move |_| {
		if let [source, target] = controller.selected()[..] {
			controller.add_edge(source, target);
		}
	};
	let delete = move |_| {
		for id in controller.selected() {
			controller.delete_node(id);
		}
	};
	let stats = move || {
		controller.track();
		let (nodes, edges, selected) = controller.counts();
		format!("{nodes} nodes · {edges} edges · {selected} selected")
	};

	let save = move |_| {
		let message = match controller.save() {
			Ok(()) => "Saved".to_owned(),
			Err(e) => {
				warn!("save failed: {e}");
				format!("Save failed: {e}")
			}
		};
		status.set(message);
	};
	let load = move |_| {
		let message = match controller.load() {
			Ok(true) => "Loaded".to_owned(),
			Ok(false) => "Nothing saved yet".to_owned(),
			Err(e) => {
				warn!("load failed: {e}");
				format!("Load failed: {e}")
			}
		};
		status.set(message);
	};

	view! {
		<div class="canvas-toolbar">
			<button on:click=move |_| controller.auto_layout()>"Auto layout"</button>
			<label>
				"Batch "
				<input
					type="number"
					min="1"
					max=MAX_BATCH.to_string()
					prop:value=move || batch_size.get().to_string()
					on:input=move |ev| {
						if let Ok(n) = event_target_value(&ev).parse::<usize>() {
							batch_size.set(n.clamp(1, MAX_BATCH));
						}
					}
				/>
			</label>
			<button
				disabled=no_single
				on:click=move |_| controller.spawn_from_selection(batch_size.get_untracked())
			>
				"Spawn batch"
			</button>
			<button on:click=move |_| controller.generate_selection()>"Generate"</button>
			<button disabled=not_a_pair on:click=connect>"Connect"</button>
			<button on:click=delete>"Delete"</button>
			<button on:click=save>"Save"</button>
			<button on:click=load>"Load"</button>
			<span class="canvas-stats">{stats}</span>
			<span class="canvas-status">{move || status.get()}</span>
		</div>
	}
}
