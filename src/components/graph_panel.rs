//! Knowledge graph panel: fetch, transform, lay out, render.

use leptos::prelude::*;
use log::{debug, warn};

use super::knowledge_graph::{
	GraphData, GraphNode, KnowledgeGraph, NodeCategory, build_graph, layout_graph,
};
use super::loadable::{EmptyState, ErrorPanel, Loadable, LoadingLine, load_into};
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::i18n::I18n;
use crate::models::Persona;
use crate::state::EntityStore;

/// Graph ready for display together with the personas it was built from.
#[derive(Clone, Debug, Default, PartialEq)]
struct LoadedGraph {
	data: GraphData,
	personas: Vec<Persona>,
}

async fn fetch_graph(
	client: ApiClient,
	project_id: String,
	config: AppConfig,
) -> Result<LoadedGraph, ApiError> {
	let personas = client.list_personas(&project_id).await?;
	// The graph still shows personas when insight mining is unavailable.
	let insights = match client.graph_insights(&project_id).await {
		Ok(insights) => Some(insights),
		Err(err) => {
			warn!("focus-lab: graph insights for {project_id} unavailable: {err}");
			None
		}
	};
	let raw = build_graph(&personas, insights.as_ref());
	let data = layout_graph(
		&raw,
		config.layout.engine().as_ref(),
		config.link_cap,
		config.layout_iterations,
	);
	Ok(LoadedGraph { data, personas })
}

#[component]
pub fn GraphPanel() -> impl IntoView {
	let entities = EntityStore::use_store();

	view! {
		{move || match entities.project_id() {
			None => view! { <EmptyState key="state.no_project" /> }.into_any(),
			Some(project_id) => view! { <ProjectGraph project_id=project_id /> }.into_any(),
		}}
	}
}

#[component]
fn ProjectGraph(project_id: String) -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let config = expect_context::<AppConfig>();
	let entities = EntityStore::use_store();
	let i18n = I18n::use_i18n();

	let graph = RwSignal::new(Loadable::<LoadedGraph>::Idle);
	let reload = Callback::new(move |_: ()| {
		let fut = fetch_graph(client.clone(), project_id.clone(), config.clone());
		load_into(graph, fut);
	});
	reload.run(());

	let data = Signal::derive(move || {
		graph.with(|g| g.ready().map(|l| l.data.clone()).unwrap_or_default())
	});
	let empty_message = Signal::derive(move || i18n.t("state.graph_empty").to_string());

	let on_select = Callback::new(move |node: GraphNode| {
		if node.category != NodeCategory::Persona {
			debug!("focus-lab: selected {:?} node {}", node.category, node.id);
			return;
		}
		let persona = graph.with_untracked(|g| {
			g.ready()
				.and_then(|l| l.personas.iter().find(|p| p.id == node.id).cloned())
		});
		entities.select_persona(persona);
	});

	view! {
		<section class="graph-panel">
			{move || match graph.get() {
				Loadable::Idle | Loadable::Loading => Some(view! { <LoadingLine /> }.into_any()),
				Loadable::Failed(error) => {
					Some(view! { <ErrorPanel error=error on_retry=reload /> }.into_any())
				}
				Loadable::Ready(_) => None,
			}}
			<div class="graph-panel__canvas">
				<KnowledgeGraph data=data empty_message=empty_message on_select=on_select />
			</div>
		</section>
	}
}
