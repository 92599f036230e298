//! Canvas rendering for the knowledge graph scene.
//!
//! Everything is drawn in screen space after projection. Passes:
//! 1. Background gradient and vignette
//! 2. Links, dimmed unless they touch the highlight
//! 3. Nodes back to front, then rings and labels for highlighted nodes

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::ScaleConfig;
use super::scene::{Projected, SceneState};
use super::theme::Theme;
use super::types::{GraphNode, NodeCategory};

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete scene. An empty scene shows `empty_message` instead
/// of a graph.
pub fn render(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	empty_message: &str,
) {
	draw_background(state, ctx, theme);

	if state.is_empty() {
		draw_empty_state(state, ctx, theme, empty_message);
		return;
	}

	let order = state.depth_order();
	let mut projected: Vec<Option<Projected>> = vec![None; state.graph.nodes.len()];
	for (i, p) in &order {
		projected[*i] = Some(*p);
	}

	draw_links(state, ctx, config, theme, &projected);
	draw_nodes(state, ctx, config, theme, &order);
}

fn draw_background(state: &SceneState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.width, state.height);
	match ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_center.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);

	if theme.background.vignette > 0.0 {
		if let Ok(gradient) = ctx.create_radial_gradient(
			w / 2.0,
			h / 2.0,
			w.min(h) * 0.3,
			w / 2.0,
			h / 2.0,
			w.max(h) * 0.7,
		) {
			let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
			let _ = gradient.add_color_stop(
				1.0,
				&format!("rgba(0, 0, 0, {})", theme.background.vignette),
			);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill_rect(0.0, 0.0, w, h);
		}
	}
}

fn draw_empty_state(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	message: &str,
) {
	ctx.set_fill_style_str(&theme.background.text.to_css());
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	let _ = ctx.fill_text(message, state.width / 2.0, state.height / 2.0);
	ctx.set_text_align("start");
}

fn draw_links(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	projected: &[Option<Projected>],
) {
	let max_t = smooth_step(state.highlight.max_intensity());

	for link in &state.links {
		let (Some(a), Some(b)) = (projected[link.source], projected[link.target]) else {
			continue;
		};
		let kind = state.graph.links[link.link].kind;
		let base = theme.link_color(kind);

		let link_t = smooth_step(state.highlight.link_intensity(link.source, link.target));
		let alpha = if link_t > 0.01 {
			base.a + (1.0 - base.a) * link_t
		} else if max_t > 0.01 {
			base.a + (theme.link.dimmed_alpha - base.a) * max_t
		} else {
			base.a
		};

		let k = (a.k + b.k) / 2.0;
		let width = config.link_width(link.weight, k) * (1.0 + 0.5 * link_t);

		ctx.set_stroke_style_str(&base.with_alpha(alpha).to_css());
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	order: &[(usize, Projected)],
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let has_highlight = max_t > 0.01;

	for &(idx, p) in order {
		let node = &state.graph.nodes[idx];
		let node_t = smooth_step(state.highlight.node_intensity(idx));

		let dim = if has_highlight { 1.0 - 0.65 * max_t } else { 1.0 };
		let alpha = dim + (1.0 - dim) * node_t;
		let radius = config.node_radius(node.size, p.k) * (1.0 + 0.3 * node_t);

		draw_node(ctx, node, theme, &p, radius, alpha);

		let hovered = state.highlight.hovered() == Some(idx);
		let selected = state.selected == Some(idx);
		if hovered || selected {
			let ring_alpha = if selected { 0.9 } else { 0.6 * node_t.max(0.3) };
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius + config.ring.offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.node.selected_ring.with_alpha(ring_alpha).to_css());
			ctx.set_line_width(config.ring.width);
			ctx.stroke();
		}

		let show_label = node_t > 0.05 || selected || node.category == NodeCategory::Concept;
		if show_label {
			ctx.set_global_alpha(alpha.max(node_t));
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
			ctx.set_font(&config.label_font(p.k));
			let _ = ctx.fill_text(&node.label, p.x + radius + 4.0, p.y + 3.0);
			ctx.set_global_alpha(1.0);
		}
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &GraphNode,
	theme: &Theme,
	p: &Projected,
	radius: f64,
	alpha: f64,
) {
	let color = theme.node_color(node.category, node.sentiment);
	ctx.set_global_alpha(alpha);

	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
	let gradient = theme
		.node
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				p.x - radius * 0.3,
				p.y - radius * 0.3,
				0.0,
				p.x,
				p.y,
				radius,
			)
			.ok()
		})
		.flatten();
	match gradient {
		Some(g) => {
			let _ = g.add_color_stop(0.0, &color.lighten(0.4).to_css());
			let _ = g.add_color_stop(0.7, &color.to_css());
			let _ = g.add_color_stop(1.0, &color.darken(0.25).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&g);
		}
		None => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.fill();

	ctx.set_global_alpha(1.0);
}
