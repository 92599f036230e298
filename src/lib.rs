//! focus-lab: market-research workspace in the browser.
//!
//! Projects, synthetic personas, focus groups and surveys live on a REST
//! backend; this crate is the client. Each area opens as a floating panel, and
//! a 3D knowledge graph ties personas to the concepts and emotions mined from
//! their discussions.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MouseEvent};

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod i18n;
pub mod models;
pub mod polling;
pub mod state;

use api::ApiClient;
use components::dashboard::AnalysisPanel;
use components::floating_panel::FloatingPanel;
use components::focus_groups::FocusGroupsPanel;
use components::graph_panel::GraphPanel;
use components::personas::PersonasPanel;
use components::projects::ProjectsPanel;
use components::surveys::SurveysPanel;
use components::toasts::ToastViewport;
use config::AppConfig;
use i18n::{I18n, Locale};
use state::{EntityStore, PanelId, PanelPosition, PanelStore, Toaster};

pub use components::knowledge_graph::{GraphData, GraphLink, GraphNode, KnowledgeGraph};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("focus-lab: logging initialized");
}

fn panel_body(id: PanelId) -> AnyView {
	match id {
		PanelId::Projects => view! { <ProjectsPanel /> }.into_any(),
		PanelId::Personas => view! { <PersonasPanel /> }.into_any(),
		PanelId::FocusGroups => view! { <FocusGroupsPanel /> }.into_any(),
		PanelId::Surveys => view! { <SurveysPanel /> }.into_any(),
		PanelId::Analysis => view! { <AnalysisPanel /> }.into_any(),
		PanelId::Graph => view! { <GraphPanel /> }.into_any(),
	}
}

/// Row of buttons opening the panels.
#[component]
fn PanelDock() -> impl IntoView {
	let entities = EntityStore::use_store();
	let panels = PanelStore::use_store();
	let i18n = I18n::use_i18n();

	let on_trigger = move |id: PanelId, ev: MouseEvent| {
		if let Some(el) = ev
			.current_target()
			.and_then(|t| t.dyn_into::<HtmlElement>().ok())
		{
			let rect = el.get_bounding_client_rect();
			panels.0.update(|l| {
				l.set_trigger_position(
					id,
					PanelPosition {
						x: rect.left(),
						y: rect.top(),
					},
				)
			});
		}
		entities.toggle_panel(id);
	};

	view! {
		<nav class="dock">
			{PanelId::ALL
				.into_iter()
				.map(|id| {
					let active = move || entities.0.with(|s| s.active_panel == Some(id));
					view! {
						<button
							class="dock__trigger"
							class:active=active
							on:click=move |ev| on_trigger(id, ev)
						>
							{move || i18n.t(id.title_key())}
						</button>
					}
				})
				.collect_view()}
		</nav>
	}
}

#[component]
fn LanguageSwitch() -> impl IntoView {
	let i18n = I18n::use_i18n();

	view! {
		<label class="language-switch">
			{move || i18n.t("field.language")}
			<select on:change=move |ev| {
				if let Some(locale) = Locale::from_code(&event_target_value(&ev)) {
					i18n.set_locale(locale);
				}
			}>
				{Locale::ALL
					.into_iter()
					.map(|locale| {
						view! {
							<option value=locale.code() selected=move || i18n.locale() == locale>
								{locale.code().to_uppercase()}
							</option>
						}
					})
					.collect_view()}
			</select>
		</label>
	}
}

/// Main application component.
/// Provides shared stores and renders the dock, panels and toasts.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = AppConfig::from_env();
	info!("focus-lab: API at {}", config.api_base_url);
	provide_context(ApiClient::from_config(&config));
	Toaster::provide(config.toast_duration);
	provide_context(config);

	let entities = EntityStore::provide();
	PanelStore::provide();
	let i18n = I18n::provide();

	let project_name = move || {
		entities
			.0
			.with(|s| s.selected_project.as_ref().map(|p| p.name.clone()))
			.unwrap_or_else(|| i18n.t("state.no_project").to_string())
	};

	view! {
		<Html attr:lang=move || i18n.locale().code() attr:data-theme="dark" />
		<Title text="focus-lab" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="workspace">
			<header class="workspace__header">
				<h1>"focus-lab"</h1>
				<span class="workspace__project">{project_name}</span>
				<LanguageSwitch />
			</header>
			<PanelDock />
			{PanelId::ALL
				.into_iter()
				.map(|id| view! { <FloatingPanel id=id>{move || panel_body(id)}</FloatingPanel> })
				.collect_view()}
			<ToastViewport />
		</div>
	}
}
