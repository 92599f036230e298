use leptos::prelude::*;

use crate::i18n::I18n;
use crate::state::{Toast, Toaster};

/// Stack of live toasts, newest at the bottom.
#[component]
pub fn ToastViewport() -> impl IntoView {
	let toaster = Toaster::use_toaster();

	view! {
		<div class="toast-viewport" aria-live="polite">
			<For
				each=move || toaster.queue.with(|q| q.toasts().cloned().collect::<Vec<_>>())
				key=|toast| toast.id
				children=move |toast| view! { <ToastCard toast=toast /> }
			/>
		</div>
	}
}

#[component]
fn ToastCard(toast: Toast) -> impl IntoView {
	let toaster = Toaster::use_toaster();
	let i18n = I18n::use_i18n();
	let id = toast.id;

	let action = toast.action.map(|action| {
		let label = action.label.clone();
		view! {
			<button
				class="btn btn--small"
				on:click=move |_| {
					action.run();
					toaster.dismiss(id);
				}
			>
				{label}
			</button>
		}
	});

	view! {
		<div class=format!("toast {}", toast.kind.class()) role="status">
			<div class="toast__content">
				<strong>{toast.title}</strong>
				{toast.message.map(|m| view! { <p>{m}</p> })}
			</div>
			{action}
			<button
				class="toast__close"
				aria-label=move || i18n.t("action.close")
				on:click=move |_| toaster.dismiss(id)
			>
				"×"
			</button>
		</div>
	}
}
