//! Draggable panel shell.

use leptos::ev;
use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::i18n::I18n;
use crate::state::{EntityStore, PanelId, PanelSize, PanelStore, Viewport};

/// Size assumed before the panel has been measured.
const FALLBACK_SIZE: PanelSize = PanelSize {
	width: 420.0,
	height: 520.0,
};

fn measure(node: NodeRef<leptos::html::Div>) -> PanelSize {
	node.get_untracked()
		.map(|el| {
			let rect = el.get_bounding_client_rect();
			PanelSize {
				width: rect.width(),
				height: rect.height(),
			}
		})
		.filter(|s| s.width > 0.0 && s.height > 0.0)
		.unwrap_or(FALLBACK_SIZE)
}

/// A panel that floats over the workspace. Visible while it is the active
/// panel; its title bar drags it around, always inside the viewport.
#[component]
pub fn FloatingPanel(id: PanelId, children: ChildrenFn) -> impl IntoView {
	let entities = EntityStore::use_store();
	let panels = PanelStore::use_store();
	let i18n = I18n::use_i18n();
	let panel_ref = NodeRef::<leptos::html::Div>::new();
	let viewport = RwSignal::new(Viewport::current());

	let open = Memo::new(move |_| entities.0.with(|s| s.active_panel == Some(id)));

	let resize = window_event_listener(ev::resize, move |_| viewport.set(Viewport::current()));
	let mousemove = window_event_listener(ev::mousemove, move |ev: MouseEvent| {
		if panels.0.with_untracked(|l| l.dragging()) != Some(id) {
			return;
		}
		let Some(vp) = viewport.get_untracked() else {
			return;
		};
		let size = measure(panel_ref);
		panels.0.update(|l| {
			l.drag_to(ev.client_x() as f64, ev.client_y() as f64, vp, size);
		});
	});
	let mouseup = window_event_listener(ev::mouseup, move |_| {
		if panels.0.with_untracked(|l| l.dragging()) == Some(id) {
			panels.0.update(|l| l.end_drag());
		}
	});
	on_cleanup(move || {
		resize.remove();
		mousemove.remove();
		mouseup.remove();
	});

	// Re-clamp on open and on every viewport change; the store keeps the
	// corrected position.
	Effect::new(move |_| {
		if !open.get() {
			return;
		}
		let Some(vp) = viewport.get() else {
			return;
		};
		let size = measure(panel_ref);
		panels.0.update(|l| {
			l.resolve_panel_position(id, vp, size);
		});
	});

	let style = move || {
		let pos = panels.0.with(|l| l.panel_position(id));
		format!("position: fixed; left: {}px; top: {}px;", pos.x, pos.y)
	};

	let on_grab = move |ev: MouseEvent| {
		ev.prevent_default();
		panels
			.0
			.update(|l| l.begin_drag(id, ev.client_x() as f64, ev.client_y() as f64));
	};

	view! {
		<Show when=move || open.get()>
			<div class="floating-panel" node_ref=panel_ref style=style>
				<header class="floating-panel__bar" on:mousedown=on_grab>
					<h2>{move || i18n.t(id.title_key())}</h2>
					<button
						class="floating-panel__close"
						aria-label=move || i18n.t("action.close")
						on:mousedown=|ev: MouseEvent| ev.stop_propagation()
						on:click=move |_| entities.set_active_panel(None)
					>
						"×"
					</button>
				</header>
				<div class="floating-panel__body">{children()}</div>
			</div>
		</Show>
	}
}
