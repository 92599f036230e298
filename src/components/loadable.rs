//! Request state for a section of the UI.
//!
//! There are no automatic retries. A failed section shows the error and a
//! retry button that re-issues the request.

use std::future::Future;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen_futures::spawn_local;

use crate::error::ApiError;
use crate::i18n::I18n;

/// Lifecycle of one fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Loadable<T> {
	/// Nothing requested yet.
	#[default]
	Idle,
	Loading,
	Ready(T),
	Failed(ApiError),
}

impl<T> Loadable<T> {
	pub fn is_loading(&self) -> bool {
		matches!(self, Loadable::Loading)
	}

	pub fn ready(&self) -> Option<&T> {
		match self {
			Loadable::Ready(v) => Some(v),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&ApiError> {
		match self {
			Loadable::Failed(e) => Some(e),
			_ => None,
		}
	}
}

impl<T> From<Result<T, ApiError>> for Loadable<T> {
	fn from(result: Result<T, ApiError>) -> Self {
		match result {
			Ok(v) => Loadable::Ready(v),
			Err(e) => Loadable::Failed(e),
		}
	}
}

/// Mark `target` as loading and fill it with the outcome of `fut`.
pub fn load_into<T, F>(target: RwSignal<Loadable<T>>, fut: F)
where
	T: Send + Sync + 'static,
	F: Future<Output = Result<T, ApiError>> + 'static,
{
	target.set(Loadable::Loading);
	spawn_local(async move {
		let result = fut.await;
		if let Err(err) = &result {
			warn!("focus-lab: load failed: {err}");
		}
		// The section may have been unmounted while the request was in flight.
		let _ = target.try_set(Loadable::from(result));
	});
}

/// Inline error with a retry button.
#[component]
pub fn ErrorPanel(error: ApiError, #[prop(into)] on_retry: Callback<()>) -> impl IntoView {
	let i18n = I18n::use_i18n();
	let message = move || error.user_message(i18n.locale());

	view! {
		<div class="error-panel" role="alert">
			<p>{message}</p>
			<button class="btn btn--secondary" on:click=move |_| on_retry.run(())>
				{move || i18n.t("action.retry")}
			</button>
		</div>
	}
}

/// Loading line shown while a request is outstanding.
#[component]
pub fn LoadingLine() -> impl IntoView {
	let i18n = I18n::use_i18n();
	view! { <p class="muted loading">{move || i18n.t("state.loading")}</p> }
}

/// Placeholder for an empty list.
#[component]
pub fn EmptyState(#[prop(optional)] key: Option<&'static str>) -> impl IntoView {
	let i18n = I18n::use_i18n();
	let key = key.unwrap_or("state.empty");
	view! { <p class="muted empty">{move || i18n.t(key)}</p> }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn result_maps_onto_state() {
		let ok: Loadable<u32> = Ok(3).into();
		assert_eq!(ok.ready(), Some(&3));
		assert!(ok.error().is_none());

		let err: Loadable<u32> = Err(ApiError::Network("down".into())).into();
		assert_eq!(err.error(), Some(&ApiError::Network("down".into())));
		assert!(err.ready().is_none());
	}

	#[test]
	fn default_is_idle() {
		let state: Loadable<Vec<u8>> = Loadable::default();
		assert_eq!(state, Loadable::Idle);
		assert!(!state.is_loading());
		assert!(Loadable::<u8>::Loading.is_loading());
	}
}
