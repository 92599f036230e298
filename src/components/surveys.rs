//! Survey list and aggregated results.

use leptos::prelude::*;

use super::loadable::{EmptyState, ErrorPanel, Loadable, LoadingLine, load_into};
use crate::api::ApiClient;
use crate::i18n::I18n;
use crate::models::{Survey, SurveyResults};
use crate::state::EntityStore;

#[component]
pub fn SurveysPanel() -> impl IntoView {
	let entities = EntityStore::use_store();

	view! {
		{move || match entities.project_id() {
			None => view! { <EmptyState key="state.no_project" /> }.into_any(),
			Some(project_id) => view! { <ProjectSurveys project_id=project_id /> }.into_any(),
		}}
	}
}

#[component]
fn ProjectSurveys(project_id: String) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let i18n = I18n::use_i18n();

	let surveys = RwSignal::new(Loadable::<Vec<Survey>>::Idle);
	let results = RwSignal::new(Loadable::<SurveyResults>::Idle);
	let open_survey = RwSignal::new(None::<Survey>);

	let reload = {
		let client = client.clone();
		Callback::new(move |_: ()| {
			let (client, project_id) = (client.clone(), project_id.clone());
			load_into(surveys, async move { client.list_surveys(&project_id).await });
		})
	};
	reload.run(());

	let load_results = Callback::new(move |survey: Survey| {
		let (client, id) = (client.clone(), survey.id.clone());
		open_survey.set(Some(survey));
		load_into(results, async move { client.survey_results(&id).await });
	});
	let retry_results = Callback::new(move |_: ()| {
		if let Some(survey) = open_survey.get_untracked() {
			load_results.run(survey);
		}
	});

	let results_view = move || {
		let survey = open_survey.get()?;
		Some(match results.get() {
			Loadable::Idle | Loadable::Loading => view! { <LoadingLine /> }.into_any(),
			Loadable::Failed(error) => {
				view! { <ErrorPanel error=error on_retry=retry_results /> }.into_any()
			}
			Loadable::Ready(res) => view! {
				<article class="survey-results">
					<h3>{survey.title.clone()}</h3>
					<p class="muted">
						{move || i18n.t("field.responses")} ": " {res.response_count}
					</p>
					<ul>
						{survey
							.questions
							.iter()
							.map(|q| {
								let top = res
									.top_answer(&q.id)
									.map(|(answer, n)| format!("{answer} ({n})"))
									.unwrap_or_else(|| "—".to_string());
								view! {
									<li>
										<span>{q.text.clone()}</span>
										<strong>{top}</strong>
									</li>
								}
							})
							.collect_view()}
					</ul>
				</article>
			}
			.into_any(),
		})
	};

	view! {
		<section class="surveys">
			{move || match surveys.get() {
				Loadable::Idle | Loadable::Loading => view! { <LoadingLine /> }.into_any(),
				Loadable::Failed(error) => view! { <ErrorPanel error=error on_retry=reload /> }.into_any(),
				Loadable::Ready(list) if list.is_empty() => view! { <EmptyState /> }.into_any(),
				Loadable::Ready(list) => view! {
					<ul class="list">
						{list
							.into_iter()
							.map(|survey| {
								let title = format!("{} ({})", survey.title, survey.response_count);
								view! {
									<li class="list-row">
										<span>{title}</span>
										<button
											class="btn btn--secondary"
											on:click=move |_| load_results.run(survey.clone())
										>
											{move || i18n.t("action.results")}
										</button>
									</li>
								}
							})
							.collect_view()}
					</ul>
				}
				.into_any(),
			}}
			{results_view}
		</section>
	}
}
