//! Leptos component wrapping the knowledge graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for hover, orbiting, zooming and selection. An animation loop runs
//! via `requestAnimationFrame`, advancing highlight fades and redrawing each frame.
//! The graph handed in must already be laid out.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use leptos::ev;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::scale::ScaleConfig;
use super::scene::SceneState;
use super::theme::Theme;
use super::types::{GraphData, GraphNode};

/// Bundles scene state with visual configuration.
struct GraphContext {
	scene: SceneState,
	scale: ScaleConfig,
	theme: Theme,
}

/// Owner of a self-rescheduling frame callback.
///
/// The callback reaches itself through a [`Weak`] handle, so dropping the
/// slot frees it even while it is still scheduled.
struct FrameSlot<F>(Rc<RefCell<Option<F>>>);

impl<F> FrameSlot<F> {
	fn new() -> Self {
		Self(Rc::new(RefCell::new(None)))
	}

	fn handle(&self) -> Weak<RefCell<Option<F>>> {
		Rc::downgrade(&self.0)
	}

	fn set(&self, callback: F) {
		*self.0.borrow_mut() = Some(callback);
	}
}

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn canvas_context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive 3D knowledge graph on a canvas element.
///
/// The canvas sizes itself to its parent and follows window resizes. Clicking
/// a node selects it and reports it through `on_select`; clicking empty space
/// clears the selection. Dragging orbits the camera, the wheel zooms.
///
/// Unmounting stops the frame loop, cancels the pending frame and removes the
/// resize listener.
#[component]
pub fn KnowledgeGraph(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] empty_message: Signal<String>,
	#[prop(optional)] on_select: Option<Callback<GraphNode>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let stopped = Arc::new(AtomicBool::new(false));
	// 0 while no frame is pending.
	let pending_frame = Arc::new(AtomicI32::new(0));
	let resized = RwSignal::new(0u32);

	let resize_listener = window_event_listener(ev::resize, move |_| {
		resized.update(|n| *n = n.wrapping_add(1));
	});
	{
		let (stopped, pending_frame) = (stopped.clone(), pending_frame.clone());
		on_cleanup(move || {
			stopped.store(true, Ordering::Relaxed);
			resize_listener.remove();
			let frame = pending_frame.swap(0, Ordering::Relaxed);
			if frame != 0 {
				if let Some(window) = web_sys::window() {
					let _ = window.cancel_animation_frame(frame);
				}
			}
		});
	}

	// Canvas setup and the frame loop run once, when the canvas mounts. The
	// effect holds the only strong reference to the frame callback.
	let context_init = context.clone();
	let animate = FrameSlot::<Closure<dyn FnMut()>>::new();
	Effect::new(move |started: Option<bool>| {
		if started == Some(true) {
			return true;
		}
		let Some(canvas) = canvas_ref.get() else {
			return false;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return false;
		};
		let Some(ctx) = canvas_context(&canvas) else {
			warn!("focus-lab: 2d canvas context unavailable");
			return false;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		*context_init.borrow_mut() = Some(GraphContext {
			scene: SceneState::new(&data.get_untracked(), w, h),
			scale: ScaleConfig::default(),
			theme: Theme::default(),
		});

		let (context_anim, this_frame) = (context_init.clone(), animate.handle());
		let (stopped, pending) = (stopped.clone(), pending_frame.clone());
		animate.set(Closure::new(move || {
			pending.store(0, Ordering::Relaxed);
			if stopped.load(Ordering::Relaxed) {
				context_anim.borrow_mut().take();
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.scene.tick(0.016);
				empty_message.with_untracked(|msg| {
					render::render(&c.scene, &ctx, &c.scale, &c.theme, msg)
				});
			}
			let Some(slot) = this_frame.upgrade() else {
				return;
			};
			if let (Some(cb), Some(win)) = (slot.borrow().as_ref(), web_sys::window()) {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					pending.store(id, Ordering::Relaxed);
				}
			}
		}));
		if let Some(cb) = animate.0.borrow().as_ref() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				pending_frame.store(id, Ordering::Relaxed);
			}
		}
		true
	});

	let context_resize = context.clone();
	Effect::new(move |_| {
		resized.track();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		if let Some(ref mut c) = *context_resize.borrow_mut() {
			c.scene.resize(w, h);
		}
	});

	// New data replaces the scene but keeps the camera.
	let context_data = context.clone();
	Effect::new(move |_| {
		let graph = data.get();
		if let Some(ref mut c) = *context_data.borrow_mut() {
			let camera = c.scene.camera.clone();
			c.scene = SceneState::new(&graph, c.scene.width, c.scene.height);
			c.scene.camera = camera;
			debug!("focus-lab: scene rebuilt with {} nodes", graph.nodes.len());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.scene.begin_drag(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.scene.drag.active {
				c.scene.drag_to(x, y);
			} else {
				let hovered = c.scene.node_at_position(x, y, &c.scale);
				c.scene.set_hover(hovered);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		// The context borrow must end before `on_select` runs.
		let selected = {
			let mut guard = context_mu.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			if !c.scene.end_drag() {
				return;
			}
			c.scene.click(x, y, &c.scale).cloned()
		};
		if let (Some(node), Some(cb)) = (selected, on_select) {
			cb.run(node);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.scene.end_drag();
			c.scene.set_hover(None);
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.scene.camera.zoom_by(factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	#[test]
	fn frame_slot_frees_a_callback_that_reschedules_itself() {
		let calls = Rc::new(Cell::new(0));
		let slot = FrameSlot::<Box<dyn FnMut()>>::new();
		let (this_frame, seen) = (slot.handle(), calls.clone());
		slot.set(Box::new(move || {
			seen.set(seen.get() + 1);
			assert!(this_frame.upgrade().is_some());
		}));

		if let Some(cb) = slot.0.borrow_mut().as_mut() {
			cb();
		}
		assert_eq!(calls.get(), 1);

		let watcher = slot.handle();
		drop(slot);
		assert!(watcher.upgrade().is_none());
		assert_eq!(Rc::strong_count(&calls), 1);
	}
}
