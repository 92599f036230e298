//! Focus group builder, launch and transcript view.
//!
//! A draft is launched only when it has at least two distinct personas and one
//! non-empty question. Anything short of that is reported as a validation
//! toast and never reaches the server.
//!
//! Launching is two requests: create, then run. A group that was created but
//! did not start stays in the list as pending and is started again from there,
//! never re-created.

use leptos::prelude::*;
use log::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::MouseEvent;

use super::loadable::{EmptyState, ErrorPanel, Loadable, LoadingLine, load_into};
use crate::api::ApiClient;
use crate::i18n::I18n;
use crate::models::{FocusGroup, FocusGroupDraft, FocusGroupMode, FocusGroupStatus, Persona};
use crate::state::{EntityStore, Toast, ToastAction, ToastDuration, ToastKind, Toaster};

fn status_label(status: FocusGroupStatus) -> &'static str {
	match status {
		FocusGroupStatus::Pending => "pending",
		FocusGroupStatus::Running => "running",
		FocusGroupStatus::Completed => "completed",
		FocusGroupStatus::Failed => "failed",
	}
}

/// Whether a group can be (re)started.
fn can_run(status: FocusGroupStatus) -> bool {
	matches!(status, FocusGroupStatus::Pending | FocusGroupStatus::Failed)
}

/// Display name of a transcript speaker, or the raw id when the persona is
/// not in the list.
fn speaker_name(personas: &[Persona], persona_id: &str) -> String {
	personas
		.iter()
		.find(|p| p.id == persona_id)
		.map(Persona::display_name)
		.unwrap_or_else(|| persona_id.to_string())
}

/// Reactive handles a run needs once its request settles.
#[derive(Clone, Copy)]
struct RunTargets {
	groups: RwSignal<Loadable<Vec<FocusGroup>>>,
	entities: EntityStore,
	toaster: Toaster,
	i18n: I18n,
}

/// Start the discussion of an existing group, then refresh the list. On
/// failure the group stays pending and the error toast offers a retry.
fn start_run(client: ApiClient, project_id: String, group_id: String, targets: RunTargets) {
	let RunTargets {
		groups,
		entities,
		toaster,
		i18n,
	} = targets;
	spawn_local(async move {
		match client.run_focus_group(&group_id).await {
			Ok(group) => {
				toaster.success(i18n.t("toast.focus_group_launched"));
				let _ = entities.0.try_update(|s| s.set_selected_focus_group(Some(group)));
			}
			Err(err) => {
				warn!("focus-lab: focus group {group_id} did not start: {err}");
				let retry = {
					let (client, project_id, group_id) =
						(client.clone(), project_id.clone(), group_id.clone());
					ToastAction::new(i18n.t("action.retry"), move || {
						start_run(client.clone(), project_id.clone(), group_id.clone(), targets)
					})
				};
				toaster.push(
					Toast::new(ToastKind::Error, i18n.t("toast.run_failed"))
						.with_message(err.user_message(i18n.locale()))
						.with_action(retry)
						.with_duration(ToastDuration::Infinite),
				);
			}
		}
		match client.list_focus_groups(&project_id).await {
			Ok(list) => {
				let _ = groups.try_set(Loadable::Ready(list));
			}
			Err(err) => warn!("focus-lab: focus group refresh failed: {err}"),
		}
	});
}

#[component]
pub fn FocusGroupsPanel() -> impl IntoView {
	let entities = EntityStore::use_store();

	view! {
		{move || match entities.project_id() {
			None => view! { <EmptyState key="state.no_project" /> }.into_any(),
			Some(project_id) => view! { <ProjectFocusGroups project_id=project_id /> }.into_any(),
		}}
	}
}

#[component]
fn ProjectFocusGroups(project_id: String) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let entities = EntityStore::use_store();
	let toaster = Toaster::use_toaster();
	let i18n = I18n::use_i18n();

	let groups = RwSignal::new(Loadable::<Vec<FocusGroup>>::Idle);
	let personas = RwSignal::new(Loadable::<Vec<Persona>>::Idle);
	let draft = RwSignal::new(FocusGroupDraft {
		questions: vec![String::new()],
		..FocusGroupDraft::default()
	});
	let busy = RwSignal::new(false);

	let reload = {
		let (client, project_id) = (client.clone(), project_id.clone());
		Callback::new(move |_: ()| {
			let (c1, c2) = (client.clone(), client.clone());
			let (p1, p2) = (project_id.clone(), project_id.clone());
			load_into(groups, async move { c1.list_focus_groups(&p1).await });
			load_into(personas, async move { c2.list_personas(&p2).await });
		})
	};
	reload.run(());

	let targets = RunTargets {
		groups,
		entities,
		toaster,
		i18n,
	};

	let launch = {
		let (client, project_id) = (client.clone(), project_id.clone());
		move |_: MouseEvent| {
			let current = draft.get();
			if let Err(err) = current.validate() {
				toaster.push(
					Toast::new(ToastKind::Error, i18n.t("toast.validation"))
						.with_message(err.to_string()),
				);
				return;
			}
			busy.set(true);
			let (client, project_id) = (client.clone(), project_id.clone());
			spawn_local(async move {
				let created = client.create_focus_group(&project_id, &current).await;
				let _ = busy.try_set(false);
				match created {
					Ok(group) => {
						let _ = draft.try_set(FocusGroupDraft {
							questions: vec![String::new()],
							..FocusGroupDraft::default()
						});
						let group_id = group.id.clone();
						let _ = entities.0.try_update(|s| s.set_selected_focus_group(Some(group)));
						start_run(client, project_id, group_id, targets);
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

	let persona_picker = move || match personas.get() {
		Loadable::Idle | Loadable::Loading => view! { <LoadingLine /> }.into_any(),
		Loadable::Failed(error) => view! { <ErrorPanel error=error on_retry=reload /> }.into_any(),
		Loadable::Ready(list) if list.is_empty() => view! { <EmptyState /> }.into_any(),
		Loadable::Ready(list) => list
			.into_iter()
			.map(|persona| {
				let (id, toggle_id) = (persona.id.clone(), persona.id.clone());
				let checked = move || draft.with(|d| d.persona_ids.contains(&id));
				view! {
					<label class="checkbox">
						<input
							type="checkbox"
							prop:checked=checked
							on:change=move |_| draft.update(|d| d.toggle_persona(&toggle_id))
						/>
						{persona.display_name()}
					</label>
				}
			})
			.collect_view()
			.into_any(),
	};

	let question_count = Memo::new(move |_| draft.with(|d| d.questions.len()));
	let question_inputs = move || {
		(0..question_count.get())
			.map(|i| {
				let value = move || draft.with(|d| d.questions.get(i).cloned().unwrap_or_default());
				view! {
					<div class="question-row">
						<input
							type="text"
							placeholder=move || i18n.t("field.question")
							prop:value=value
							on:input=move |ev| {
								let text = event_target_value(&ev);
								draft.update(|d| {
									if let Some(q) = d.questions.get_mut(i) {
										*q = text;
									}
								});
							}
						/>
						<button
							class="btn btn--ghost"
							on:click=move |_| draft.update(|d| {
								if i < d.questions.len() {
									d.questions.remove(i);
								}
							})
						>
							"×"
						</button>
					</div>
				}
			})
			.collect_view()
	};

	let ready = move || draft.with(FocusGroupDraft::is_launch_ready);

	view! {
		<section class="focus-groups">
			<div class="form">
				<label>
					{move || i18n.t("field.name")}
					<input
						type="text"
						prop:value=move || draft.with(|d| d.name.clone())
						on:input=move |ev| {
							let name = event_target_value(&ev);
							draft.update(|d| d.name = name);
						}
					/>
				</label>
				<fieldset>
					<legend>{move || i18n.t("field.question")}</legend>
					{question_inputs}
					<button
						class="btn btn--secondary"
						on:click=move |_| draft.update(|d| d.questions.push(String::new()))
					>
						{move || i18n.t("action.add_question")}
					</button>
				</fieldset>
				<fieldset>
					<legend>
						{move || i18n.t("field.participants")}
						" (" {move || draft.with(FocusGroupDraft::distinct_personas)} ")"
					</legend>
					{persona_picker}
				</fieldset>
				<label class="checkbox">
					<input
						type="checkbox"
						prop:checked=move || draft.with(|d| d.mode == FocusGroupMode::Adversarial)
						on:change=move |ev| {
							let mode = if event_target_checked(&ev) {
								FocusGroupMode::Adversarial
							} else {
								FocusGroupMode::Normal
							};
							draft.update(|d| d.mode = mode);
						}
					/>
					{move || i18n.t("field.adversarial")}
				</label>
				<Show when=move || !ready()>
					<p class="muted hint">{move || i18n.t("state.not_ready")}</p>
				</Show>
				<button
					class=move || {
						if ready() { "btn btn--primary" } else { "btn btn--primary btn--disabled" }
					}
					disabled=busy
					on:click=launch
				>
					{move || i18n.t("action.launch")}
				</button>
			</div>
			{move || match groups.get() {
				Loadable::Idle | Loadable::Loading => view! { <LoadingLine /> }.into_any(),
				Loadable::Failed(error) => view! { <ErrorPanel error=error on_retry=reload /> }.into_any(),
				Loadable::Ready(list) if list.is_empty() => view! { <EmptyState /> }.into_any(),
				Loadable::Ready(list) => view! {
					<ul class="list">
						{list
							.into_iter()
							.map(|group| {
								let label = format!("{} ({})", group.name, status_label(group.status));
								view! {
									<li class="list-row">
										<button
											class="list-row__main"
											on:click=move |_| entities.select_focus_group(Some(group.clone()))
										>
											{label}
										</button>
									</li>
								}
							})
							.collect_view()}
					</ul>
				}
				.into_any(),
			}}
			<FocusGroupDetail
				project_id=project_id
				personas=personas
				targets=targets
				on_changed=reload
			/>
		</section>
	}
}

/// Transcript and summary of the selected focus group.
#[component]
fn FocusGroupDetail(
	project_id: String,
	personas: RwSignal<Loadable<Vec<Persona>>>,
	targets: RunTargets,
	on_changed: Callback<()>,
) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let entities = EntityStore::use_store();
	let toaster = Toaster::use_toaster();
	let i18n = I18n::use_i18n();

	let selected = move || entities.0.with(|s| s.selected_focus_group.clone());

	let summarize = {
		let client = client.clone();
		move |id: String| {
			let client = client.clone();
			spawn_local(async move {
				match client.generate_summary(&id).await {
					Ok(group) => entities.select_focus_group(Some(group)),
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

	let run = {
		let client = client.clone();
		move |id: String| start_run(client.clone(), project_id.clone(), id, targets)
	};

	let delete = move |id: String| {
		let client = client.clone();
		spawn_local(async move {
			match client.delete_focus_group(&id).await {
				Ok(()) => {
					entities.select_focus_group(None);
					on_changed.run(());
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

	move || {
		selected().map(|group| {
			let (summary_id, delete_id, run_id) = (group.id.clone(), group.id.clone(), group.id.clone());
			let (summarize, delete, run) = (summarize.clone(), delete.clone(), run.clone());
			let runnable = can_run(group.status);
			view! {
				<article class="focus-group-detail">
					<h3>{group.name.clone()}</h3>
					<ol class="transcript">
						{group
							.discussion
							.iter()
							.map(|turn| {
								let speaker = personas.with(|p| {
									let known = p.ready().map_or(&[][..], Vec::as_slice);
									speaker_name(known, &turn.persona_id)
								});
								view! {
									<li>
										<span class="speaker">{speaker}</span>
										<p>{turn.content.clone()}</p>
									</li>
								}
							})
							.collect_view()}
					</ol>
					{group.summary.clone().map(|s| view! { <blockquote class="summary">{s}</blockquote> })}
					<div class="actions">
						{runnable.then(|| view! {
							<button class="btn btn--primary" on:click=move |_| run(run_id.clone())>
								{move || i18n.t("action.run")}
							</button>
						})}
						<button class="btn btn--secondary" on:click=move |_| summarize(summary_id.clone())>
							{move || i18n.t("action.summarize")}
						</button>
						<button class="btn btn--ghost" on:click=move |_| delete(delete_id.clone())>
							{move || i18n.t("action.delete")}
						</button>
					</div>
				</article>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::PersonalityScores;

	fn persona(id: &str, name: Option<&str>) -> Persona {
		Persona {
			id: id.into(),
			project_id: "proj".into(),
			full_name: name.map(Into::into),
			age: None,
			gender: None,
			location: None,
			education: None,
			income: None,
			personality: PersonalityScores::default(),
			background_story: None,
			values: vec![],
			interests: vec![],
		}
	}

	#[test]
	fn only_pending_or_failed_groups_can_run() {
		assert!(can_run(FocusGroupStatus::Pending));
		assert!(can_run(FocusGroupStatus::Failed));
		assert!(!can_run(FocusGroupStatus::Running));
		assert!(!can_run(FocusGroupStatus::Completed));
	}

	#[test]
	fn speakers_resolve_to_persona_names() {
		let personas = [persona("p1", Some("Anna Kowalska")), persona("p2", None)];
		assert_eq!(speaker_name(&personas, "p1"), "Anna Kowalska");
		assert_eq!(speaker_name(&personas, "p9"), "p9");
	}
}
