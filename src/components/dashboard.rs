//! Analysis dashboard. Each section loads and fails on its own.

use std::future::Future;

use leptos::prelude::*;

use super::loadable::{EmptyState, ErrorPanel, Loadable, LoadingLine, load_into};
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::i18n::I18n;
use crate::models::{
	BusinessMetric, HealthStatus, Insight, Notification, SentimentBreakdown, UsageSummary,
};

/// Section state plus the callback that (re)loads it.
fn loader<T, F, Fut>(fetch: F) -> (RwSignal<Loadable<T>>, Callback<()>)
where
	T: Send + Sync + 'static,
	F: Fn() -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<T, ApiError>> + 'static,
{
	let state = RwSignal::new(Loadable::Idle);
	let reload = Callback::new(move |_: ()| load_into(state, fetch()));
	reload.run(());
	(state, reload)
}

fn section<T>(
	title_key: &'static str,
	state: RwSignal<Loadable<T>>,
	retry: Callback<()>,
	body: impl Fn(T) -> AnyView + Send + Sync + 'static,
) -> impl IntoView
where
	T: Clone + Send + Sync + 'static,
{
	let i18n = I18n::use_i18n();
	view! {
		<section class="dashboard-section">
			<h3>{move || i18n.t(title_key)}</h3>
			{move || match state.get() {
				Loadable::Idle | Loadable::Loading => view! { <LoadingLine /> }.into_any(),
				Loadable::Failed(error) => view! { <ErrorPanel error=error on_retry=retry /> }.into_any(),
				Loadable::Ready(value) => body(value),
			}}
		</section>
	}
}

fn percent(ratio: f64) -> String {
	format!("{:.0}%", ratio * 100.0)
}

#[component]
pub fn AnalysisPanel() -> impl IntoView {
	let client = expect_context::<ApiClient>();
	let i18n = I18n::use_i18n();

	let c = client.clone();
	let (health, retry_health) = loader::<HealthStatus, _, _>(move || {
		let c = c.clone();
		async move { c.health().await }
	});
	let c = client.clone();
	let (usage, retry_usage) = loader::<UsageSummary, _, _>(move || {
		let c = c.clone();
		async move { c.usage().await }
	});
	let c = client.clone();
	let (insights, retry_insights) = loader::<Vec<Insight>, _, _>(move || {
		let c = c.clone();
		async move { c.insights().await }
	});
	let c = client.clone();
	let (metrics, retry_metrics) = loader::<Vec<BusinessMetric>, _, _>(move || {
		let c = c.clone();
		async move { c.business_metrics().await }
	});
	let c = client.clone();
	let (sentiment, retry_sentiment) = loader::<SentimentBreakdown, _, _>(move || {
		let c = c.clone();
		async move { c.sentiment().await }
	});
	let c = client;
	let (notifications, retry_notifications) = loader::<Vec<Notification>, _, _>(move || {
		let c = c.clone();
		async move { c.notifications().await }
	});

	view! {
		<div class="dashboard">
			{section("dashboard.health", health, retry_health, move |h: HealthStatus| {
				let (key, class) = if h.is_healthy() {
					("dashboard.healthy", "status status--ok")
				} else {
					("dashboard.degraded", "status status--bad")
				};
				view! {
					<p class=class>
						{move || i18n.t(key)}
					</p>
					<ul class="muted">
						{h.services
							.into_iter()
							.map(|(name, state)| view! { <li>{name} ": " {state}</li> })
							.collect_view()}
					</ul>
				}
				.into_any()
			})}
			{section("dashboard.usage", usage, retry_usage, move |u: UsageSummary| {
				let budget = u.budget_ratio().map(percent);
				view! {
					<p>{u.total_tokens} " tokens · $" {format!("{:.2}", u.total_cost)}</p>
					{budget.map(|b| view! { <p>{move || i18n.t("dashboard.budget")} ": " {b.clone()}</p> })}
				}
				.into_any()
			})}
			{section("dashboard.sentiment", sentiment, retry_sentiment, |s: SentimentBreakdown| {
				let s = s.normalized();
				view! {
					<div class="sentiment-bar">
						<span class="positive" style=format!("flex: {}", s.positive)>{percent(s.positive)}</span>
						<span class="neutral" style=format!("flex: {}", s.neutral)>{percent(s.neutral)}</span>
						<span class="negative" style=format!("flex: {}", s.negative)>{percent(s.negative)}</span>
					</div>
				}
				.into_any()
			})}
			{section("dashboard.metrics", metrics, retry_metrics, |list: Vec<BusinessMetric>| {
				if list.is_empty() {
					return view! { <EmptyState /> }.into_any();
				}
				view! {
					<dl class="metrics">
						{list
							.into_iter()
							.map(|m| {
								let value = match m.unit {
									Some(unit) => format!("{} {unit}", m.value),
									None => m.value.to_string(),
								};
								view! { <dt>{m.name}</dt> <dd>{value}</dd> }
							})
							.collect_view()}
					</dl>
				}
				.into_any()
			})}
			{section("dashboard.insights", insights, retry_insights, |list: Vec<Insight>| {
				if list.is_empty() {
					return view! { <EmptyState /> }.into_any();
				}
				view! {
					<ul class="insights">
						{list
							.into_iter()
							.map(|i| view! { <li><strong>{i.title}</strong> <p>{i.body}</p></li> })
							.collect_view()}
					</ul>
				}
				.into_any()
			})}
			{section("dashboard.notifications", notifications, retry_notifications, |list: Vec<Notification>| {
				if list.is_empty() {
					return view! { <EmptyState /> }.into_any();
				}
				view! {
					<ul class="notifications">
						{list
							.into_iter()
							.map(|n| view! { <li class:unread=!n.read>{n.message}</li> })
							.collect_view()}
					</ul>
				}
				.into_any()
			})}
		</div>
	}
}
