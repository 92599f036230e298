//! Persona list and generation with progress estimate.

use leptos::prelude::*;
use log::warn;
use wasm_bindgen_futures::spawn_local;

use super::loadable::{EmptyState, ErrorPanel, Loadable, LoadingLine, load_into};
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::i18n::I18n;
use crate::models::{GeneratePersonasRequest, Persona};
use crate::polling::{GenerationProgress, poll_personas};
use crate::state::{EntityStore, Toast, ToastKind, Toaster};

/// How often the progress bar advances.
const PROGRESS_TICK: std::time::Duration = std::time::Duration::from_millis(500);

/// Persona count to compare polls against, when the list on screen is
/// trustworthy. `None` means it has to be fetched first.
fn known_baseline(list: &Loadable<Vec<Persona>>) -> Option<usize> {
	list.ready().map(Vec::len)
}

#[component]
pub fn PersonasPanel() -> impl IntoView {
	let entities = EntityStore::use_store();

	view! {
		{move || match entities.project_id() {
			None => view! { <EmptyState key="state.no_project" /> }.into_any(),
			Some(project_id) => view! { <ProjectPersonas project_id=project_id /> }.into_any(),
		}}
	}
}

#[component]
fn ProjectPersonas(project_id: String) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let config = expect_context::<AppConfig>();
	let entities = EntityStore::use_store();
	let toaster = Toaster::use_toaster();
	let i18n = I18n::use_i18n();

	let personas = RwSignal::new(Loadable::<Vec<Persona>>::Idle);
	let count = RwSignal::new(10usize);
	let adversarial = RwSignal::new(false);
	let progress = RwSignal::new(None::<GenerationProgress>);
	let now = RwSignal::new(js_sys::Date::now());

	let reload = {
		let (client, project_id) = (client.clone(), project_id.clone());
		Callback::new(move |_: ()| {
			let (client, project_id) = (client.clone(), project_id.clone());
			load_into(personas, async move { client.list_personas(&project_id).await });
		})
	};
	reload.run(());

	match set_interval_with_handle(move || now.set(js_sys::Date::now()), PROGRESS_TICK) {
		Ok(handle) => on_cleanup(move || handle.clear()),
		Err(err) => warn!("focus-lab: progress clock unavailable: {err:?}"),
	}

	let generate = {
		let (client, project_id) = (client.clone(), project_id.clone());
		let interval = config.persona_poll_interval;
		move |_: web_sys::MouseEvent| {
			let request = match GeneratePersonasRequest::new(count.get(), adversarial.get()) {
				Ok(r) => r,
				Err(err) => {
					toaster.push(
						Toast::new(ToastKind::Error, i18n.t("toast.validation"))
							.with_message(err.to_string()),
					);
					return;
				}
			};
			let known = personas.with_untracked(known_baseline);
			progress.set(Some(GenerationProgress::start(
				request.num_personas as u32,
				js_sys::Date::now(),
			)));

			let (client, project_id) = (client.clone(), project_id.clone());
			// Polling registers its cleanup on this component, not on the task.
			let owner = Owner::current();
			spawn_local(async move {
				let baseline = match known {
					Some(n) => n,
					None => match client.list_personas(&project_id).await {
						Ok(list) => list.len(),
						Err(err) => {
							let _ = progress.try_set(None);
							toaster.error(
								i18n.t("toast.request_failed"),
								Some(err.user_message(i18n.locale())),
							);
							return;
						}
					},
				};
				if let Err(err) = client.generate_personas(&project_id, &request).await {
					let _ = progress.try_set(None);
					toaster.error(
						i18n.t("toast.request_failed"),
						Some(err.user_message(i18n.locale())),
					);
					return;
				}
				toaster.info(i18n.t("toast.generation_started"));
				let start = move || {
					poll_personas(client, project_id, baseline, interval, move |list| {
						let _ = progress.try_update(|p| {
							if let Some(p) = p {
								p.complete();
							}
						});
						let _ = personas.try_set(Loadable::Ready(list));
						toaster.success(i18n.t("toast.generation_done"));
					})
				};
				match owner {
					Some(owner) => owner.with(start),
					None => start(),
				}
			});
		}
	};

	let delete = {
		let client = client.clone();
		move |id: String| {
			let client = client.clone();
			spawn_local(async move {
				match client.delete_persona(&id).await {
					Ok(()) => reload.run(()),
					Err(err) => {
						toaster.error(
							i18n.t("toast.request_failed"),
							Some(err.user_message(i18n.locale())),
						);
					}
				}
			});
		}
	};

	let percent = move || {
		progress
			.get()
			.map(|p| p.percent(now.get()))
			.filter(|pct| *pct < 100.0)
	};

	let row = move |persona: Persona| {
		let id = persona.id.clone();
		let selected = {
			let id = id.clone();
			move || entities.0.with(|s| s.selected_persona.as_ref().map(|p| p.id == id)) == Some(true)
		};
		let delete = delete.clone();
		let pick = persona.clone();
		view! {
			<li class="list-row" class:selected=selected>
				<button class="list-row__main" on:click=move |_| entities.select_persona(Some(pick.clone()))>
					<strong>{persona.display_name()}</strong>
					{persona.location.clone().map(|line| view! { <span class="muted">{line}</span> })}
				</button>
				<button class="btn btn--ghost" on:click=move |_| delete(id.clone())>
					{move || i18n.t("action.delete")}
				</button>
			</li>
		}
	};

	view! {
		<section class="personas">
			<div class="form form--inline">
				<label>
					{move || i18n.t("field.num_personas")}
					<input
						type="number"
						min="1"
						max="100"
						prop:value=move || count.get().to_string()
						on:input=move |ev| {
							if let Ok(n) = event_target_value(&ev).parse() {
								count.set(n);
							}
						}
					/>
				</label>
				<label class="checkbox">
					<input
						type="checkbox"
						prop:checked=adversarial
						on:change=move |ev| adversarial.set(event_target_checked(&ev))
					/>
					{move || i18n.t("field.adversarial")}
				</label>
				<button class="btn btn--primary" disabled=move || percent().is_some() on:click=generate>
					{move || i18n.t("action.generate")}
				</button>
			</div>
			{move || {
				percent()
					.map(|pct| {
						view! {
							<div class="progress" role="progressbar" aria-valuenow=format!("{pct:.0}")>
								<div class="progress__bar" style=format!("width: {pct:.1}%")></div>
								<span>{move || i18n.t("state.generating")} " " {format!("{pct:.0}%")}</span>
							</div>
						}
					})
			}}
			{move || match personas.get() {
				Loadable::Idle | Loadable::Loading => view! { <LoadingLine /> }.into_any(),
				Loadable::Failed(error) => view! { <ErrorPanel error=error on_retry=reload /> }.into_any(),
				Loadable::Ready(list) if list.is_empty() => view! { <EmptyState /> }.into_any(),
				Loadable::Ready(list) => {
					let row = row.clone();
					view! { <ul class="list">{list.into_iter().map(row).collect_view()}</ul> }.into_any()
				}
			}}
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ApiError;

	#[test]
	fn baseline_is_known_only_for_a_loaded_list() {
		assert_eq!(known_baseline(&Loadable::Ready(Vec::new())), Some(0));
		assert_eq!(known_baseline(&Loadable::Loading), None);
		assert_eq!(known_baseline(&Loadable::Idle), None);
		let failed = Loadable::Failed(ApiError::Network("offline".into()));
		assert_eq!(known_baseline(&failed), None);
	}
}
