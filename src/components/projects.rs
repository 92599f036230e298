//! Project list, creation form and two-step deletion.

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::loadable::{EmptyState, ErrorPanel, Loadable, LoadingLine, load_into};
use crate::api::ApiClient;
use crate::i18n::I18n;
use crate::models::{NewProject, Project};
use crate::state::{EntityStore, Toast, ToastKind, Toaster};

#[component]
pub fn ProjectsPanel() -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let entities = EntityStore::use_store();
	let toaster = Toaster::use_toaster();
	let i18n = I18n::use_i18n();

	let projects = RwSignal::new(Loadable::<Vec<Project>>::Idle);
	let confirming = RwSignal::new(None::<String>);

	let reload = {
		let client = client.clone();
		Callback::new(move |_: ()| {
			let client = client.clone();
			load_into(projects, async move { client.list_projects().await });
		})
	};
	reload.run(());

	let on_created = Callback::new(move |project: Project| {
		toaster.success(i18n.t("toast.project_created"));
		entities.select_project(Some(project));
		reload.run(());
	});

	let delete = {
		let client = client.clone();
		move |id: String| {
			let client = client.clone();
			confirming.set(None);
			spawn_local(async move {
				match client.delete_project(&id).await {
					Ok(()) => {
						if entities.project_id().as_deref() == Some(id.as_str()) {
							entities.select_project(None);
						}
						toaster.success(i18n.t("toast.project_deleted"));
						reload.run(());
					}
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

	let row = move |project: Project| {
		let id = project.id.clone();
		let selected = move || entities.project_id().as_deref() == Some(id.as_str());
		let pick = project.clone();
		let (ask_id, confirm_id) = (project.id.clone(), project.id.clone());
		let is_confirming = {
			let id = project.id.clone();
			move || confirming.get().as_deref() == Some(id.as_str())
		};
		let delete = delete.clone();
		view! {
			<li class="list-row" class:selected=selected>
				<button class="list-row__main" on:click=move |_| entities.select_project(Some(pick.clone()))>
					<strong>{project.name.clone()}</strong>
					{project.description.clone().map(|d| view! { <span class="muted">{d}</span> })}
				</button>
				<Show
					when=is_confirming
					fallback=move || {
						let ask_id = ask_id.clone();
						view! {
							<button class="btn btn--ghost" on:click=move |_| confirming.set(Some(ask_id.clone()))>
								{move || i18n.t("action.delete")}
							</button>
						}
					}
				>
					{
						let confirm_id = confirm_id.clone();
						let delete = delete.clone();
						view! {
							<button class="btn btn--danger" on:click=move |_| delete(confirm_id.clone())>
								{move || i18n.t("action.confirm_delete")}
							</button>
							<button class="btn btn--ghost" on:click=move |_| confirming.set(None)>
								{move || i18n.t("action.cancel")}
							</button>
						}
					}
				</Show>
			</li>
		}
	};

	view! {
		<section class="projects">
			<CreateProjectForm on_created=on_created />
			{move || match projects.get() {
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

#[component]
fn CreateProjectForm(on_created: Callback<Project>) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let toaster = Toaster::use_toaster();
	let i18n = I18n::use_i18n();

	let name = RwSignal::new(String::new());
	let description = RwSignal::new(String::new());
	let sample_size = RwSignal::new(100u32);
	let busy = RwSignal::new(false);

	let submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let payload = match NewProject::new(&name.get(), &description.get(), sample_size.get()) {
			Ok(p) => p,
			Err(err) => {
				toaster.push(
					Toast::new(ToastKind::Error, i18n.t("toast.validation")).with_message(err.to_string()),
				);
				return;
			}
		};
		busy.set(true);
		let client = client.clone();
		spawn_local(async move {
			let result = client.create_project(&payload).await;
			let _ = busy.try_set(false);
			match result {
				Ok(project) => {
					name.set(String::new());
					description.set(String::new());
					on_created.run(project);
				}
				Err(err) => {
					toaster.error(
						i18n.t("toast.request_failed"),
						Some(err.user_message(i18n.locale())),
					);
				}
			}
		});
	};

	view! {
		<form class="form" on:submit=submit>
			<label>
				{move || i18n.t("field.name")}
				<input type="text" prop:value=name on:input=move |ev| name.set(event_target_value(&ev)) />
			</label>
			<label>
				{move || i18n.t("field.description")}
				<textarea
					prop:value=description
					on:input=move |ev| description.set(event_target_value(&ev))
				></textarea>
			</label>
			<label>
				{move || i18n.t("field.sample_size")}
				<input
					type="number"
					min="1"
					prop:value=move || sample_size.get().to_string()
					on:input=move |ev| {
						if let Ok(n) = event_target_value(&ev).parse() {
							sample_size.set(n);
						}
					}
				/>
			</label>
			<button class="btn btn--primary" type="submit" disabled=busy>
				{move || i18n.t("action.create")}
			</button>
		</form>
	}
}
