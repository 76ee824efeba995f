use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{EdgeCurve, delete_button, input_handle, node_rect, output_handle};
use super::state::CanvasState;
use super::types::{Node, NodeKind};

const GRID_STEP: f64 = 40.0;

fn kind_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Text => "#4c8bf5",
		NodeKind::Image => "#2ca02c",
		NodeKind::Video => "#d62728",
		NodeKind::Audio => "#9467bd",
	}
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_grid(state, ctx);

	ctx.save();
	let _ = ctx.translate(state.view.offset.x, state.view.offset.y);
	let _ = ctx.scale(state.view.scale, state.view.scale);
	draw_edges(state, ctx);
	draw_connection_preview(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();

	draw_rubber_band(state, ctx);
	draw_minimap(state, ctx);
}

fn draw_grid(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let step = GRID_STEP * state.view.scale;
	if step < 8.0 {
		return;
	}
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.06)");
	let (ox, oy) = (
		state.view.offset.x.rem_euclid(step),
		state.view.offset.y.rem_euclid(step),
	);
	let mut x = ox;
	while x < state.width {
		let mut y = oy;
		while y < state.height {
			ctx.fill_rect(x, y, 1.5, 1.5);
			y += step;
		}
		x += step;
	}
}

fn trace_curve(ctx: &CanvasRenderingContext2d, curve: &EdgeCurve) {
	ctx.begin_path();
	ctx.move_to(curve.from.x, curve.from.y);
	ctx.bezier_curve_to(
		curve.c1.x, curve.c1.y, curve.c2.x, curve.c2.y, curve.to.x, curve.to.y,
	);
	ctx.stroke();
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.view.scale;
	for edge in &state.graph.edges {
		let Some(curve) = state.edge_geometry(edge) else {
			continue;
		};
		let lit = state.selection.contains(&edge.source) || state.selection.contains(&edge.target);
		let alpha = if lit { 0.95 } else { 0.6 };
		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", alpha));
		ctx.set_line_width(2.0 / k);
		trace_curve(ctx, &curve);
	}
}

fn draw_connection_preview(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(curve) = state.connection_preview() else {
		return;
	};
	let k = state.view.scale;
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_line_width(2.0 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	trace_curve(ctx, &curve);
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, fill: &str) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(fill);
	ctx.fill();
}

fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_owned();
	}
	let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
	cut.push('…');
	cut
}

fn draw_node(state: &CanvasState, node: &Node, ctx: &CanvasRenderingContext2d) {
	let k = state.view.scale;
	let r = node_rect(node);
	let color = kind_color(node.kind());
	let selected = state.selection.contains(&node.id);

	ctx.set_fill_style_str("#24243e");
	ctx.fill_rect(r.x, r.y, r.width, r.height);
	ctx.set_fill_style_str(color);
	ctx.fill_rect(r.x, r.y, r.width, 24.0);

	ctx.set_stroke_style_str(if selected { "#ffffff" } else { color });
	ctx.set_line_width(if selected { 2.5 / k } else { 1.0 / k });
	ctx.stroke_rect(r.x, r.y, r.width, r.height);

	ctx.set_fill_style_str("white");
	ctx.set_font("13px sans-serif");
	let _ = ctx.fill_text(node.kind().label(), r.x + 8.0, r.y + 16.0);

	let body = if node.data.is_generating() {
		"Generating…".to_owned()
	} else {
		truncate(node.data.summary(), 42)
	};
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.75)");
	let _ = ctx.fill_text(&body, r.x + 8.0, r.y + 48.0);

	let handle = state.config.handle_radius / k;
	let (inp, out) = (input_handle(node), output_handle(node));
	draw_circle(ctx, inp.x, inp.y, handle, "#cfd8e3");
	draw_circle(ctx, out.x, out.y, handle, color);

	if state.delete_button_active(node.id) {
		let del = delete_button(node);
		let radius = state.config.delete_button_radius / k;
		draw_circle(ctx, del.x, del.y, radius, "#e5484d");
		ctx.set_stroke_style_str("white");
		ctx.set_line_width(1.5 / k);
		let arm = radius * 0.45;
		ctx.begin_path();
		ctx.move_to(del.x - arm, del.y - arm);
		ctx.line_to(del.x + arm, del.y + arm);
		ctx.move_to(del.x + arm, del.y - arm);
		ctx.line_to(del.x - arm, del.y + arm);
		ctx.stroke();
	}
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	for node in &state.graph.nodes {
		draw_node(state, node, ctx);
	}
}

fn draw_rubber_band(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(band) = state.rubber_band() else {
		return;
	};
	ctx.set_fill_style_str("rgba(100, 180, 255, 0.12)");
	ctx.fill_rect(band.x, band.y, band.width, band.height);
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.8)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(band.x, band.y, band.width, band.height);
}

fn draw_minimap(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(map) = state.minimap() else {
		return;
	};
	let frame = map.frame;
	ctx.set_fill_style_str("rgba(10, 10, 25, 0.85)");
	ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.25)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);

	ctx.save();
	ctx.begin_path();
	ctx.rect(frame.x, frame.y, frame.width, frame.height);
	ctx.clip();

	for node in &state.graph.nodes {
		let r = map.map_rect(&node_rect(node));
		ctx.set_fill_style_str(kind_color(node.kind()));
		ctx.fill_rect(r.x, r.y, r.width.max(1.0), r.height.max(1.0));
	}

	let view = map.viewport_rect(&state.view, state.viewport());
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.9)");
	ctx.stroke_rect(view.x, view.y, view.width, view.height);
	ctx.restore();
}
