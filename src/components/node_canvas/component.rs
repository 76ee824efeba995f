use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent,
	Window,
};

use super::controller::CanvasController;
use super::gesture::{Button, Modifiers};
use super::render;
use super::transform::Point;
use super::types::NodeKind;

type Listener<E> = Rc<RefCell<Option<Closure<dyn FnMut(E)>>>>;

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn modifiers(ev: &MouseEvent) -> Modifiers {
	Modifiers {
		shift: ev.shift_key(),
		ctrl: ev.ctrl_key(),
		meta: ev.meta_key(),
		alt: ev.alt_key(),
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Keys typed into form fields belong to the field, not the canvas.
fn is_text_input(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

fn listen<E: FromWasmAbi + 'static>(
	window: &Window,
	event: &str,
	slot: &Listener<E>,
	handler: impl FnMut(E) + 'static,
) {
	let cb = Closure::<dyn FnMut(E)>::new(handler);
	if window
		.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
		.is_err()
	{
		error!("could not listen for {event}");
	}
	*slot.borrow_mut() = Some(cb);
}

/// Interactive node-graph canvas driven by the [`CanvasController`] in context.
#[component]
pub fn NodeCanvas(
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let controller = expect_context::<CanvasController>();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Listener<web_sys::Event> = Rc::new(RefCell::new(None));
	let move_cb: Listener<MouseEvent> = Rc::new(RefCell::new(None));
	let up_cb: Listener<MouseEvent> = Rc::new(RefCell::new(None));
	let key_cb: Listener<KeyboardEvent> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, canvas stays blank");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		controller.resize(w, h);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>(),
			_ => {
				error!("2d context unavailable");
				return;
			}
		};
		let Ok(ctx) = ctx else {
			error!("2d context has an unexpected type");
			return;
		};
		info!("node canvas mounted at {w}x{h}");

		if fullscreen {
			let canvas_resize = canvas.clone();
			listen(&window, "resize", &resize_cb, move |_: web_sys::Event| {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				controller.resize(nw, nh);
			});
		}

		// Gestures keep tracking after the pointer leaves the canvas.
		let canvas_move = canvas.clone();
		listen(&window, "mousemove", &move_cb, move |ev: MouseEvent| {
			controller.pointer_move(local_point(&canvas_move, &ev));
		});
		let canvas_up = canvas.clone();
		listen(&window, "mouseup", &up_cb, move |ev: MouseEvent| {
			controller.pointer_up(local_point(&canvas_up, &ev));
		});
		listen(&window, "keydown", &key_cb, move |ev: KeyboardEvent| {
			if is_text_input(&ev) {
				return;
			}
			let key = ev.key();
			if matches!(key.as_str(), "Delete" | "Backspace") {
				ev.prevent_default();
			}
			controller.key_down(&key);
		});

		let (animate_inner, canvas_frame) = (animate.clone(), canvas.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			controller.tick(js_sys::Date::now());
			controller.read(|s| render::render(s, &ctx));
			let _ = web_sys::HtmlElement::style(&canvas_frame).set_property("cursor", controller.cursor());
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let point = move |ev: &MouseEvent| {
		canvas_ref
			.get_untracked()
			.map(|canvas| local_point(&canvas, ev))
	};

	let on_mousedown = move |ev: MouseEvent| {
		let button = Button::from_dom(ev.button());
		if button == Button::Middle {
			ev.prevent_default();
		}
		if let Some(p) = point(&ev) {
			controller.pointer_down(p, button, modifiers(&ev));
		}
	};

	let on_dblclick = move |ev: MouseEvent| {
		if let Some(p) = point(&ev) {
			controller.double_click(p);
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		if let Some(p) = point(mouse) {
			controller.wheel(p, ev.delta_y());
		}
	};

	let menu = move || {
		controller.track();
		controller.menu_anchor().map(|at| {
			let style = format!("position: absolute; left: {}px; top: {}px;", at.x, at.y);
			view! {
				<div class="creation-menu" style=style>
					{NodeKind::ALL
						.into_iter()
						.map(|kind| {
							view! {
								<button on:click=move |_| controller.create_from_menu(kind)>
									{kind.label()}
								</button>
							}
						})
						.collect_view()}
					<button class="creation-menu-cancel" on:click=move |_| controller.close_menu()>
						"Cancel"
					</button>
				</div>
			}
		})
	};

	view! {
		<div class="node-canvas" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="node-canvas-surface"
				on:mousedown=on_mousedown
				on:mouseleave=move |_| controller.pointer_leave()
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				on:contextmenu=|ev: MouseEvent| ev.prevent_default()
				style="display: block;"
			/>
			{menu}
		</div>
	}
}
