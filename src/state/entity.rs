//! What the user is currently looking at.
//!
//! Every setter is total: the store records selection and UI flags, it does
//! not judge domain validity.

use leptos::prelude::*;

use super::panels::PanelId;
use crate::models::{FocusGroup, Persona, Project};

/// Current selection and UI flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityState {
	pub selected_project: Option<Project>,
	pub selected_persona: Option<Persona>,
	pub selected_focus_group: Option<FocusGroup>,
	pub active_panel: Option<PanelId>,
	pub is_loading: bool,
	pub error: Option<String>,
}

impl EntityState {
	/// Select a project.
	///
	/// Persona and focus-group selections are left untouched, so they may
	/// still refer to the previously selected project.
	pub fn set_selected_project(&mut self, project: Option<Project>) {
		self.selected_project = project;
	}

	pub fn set_selected_persona(&mut self, persona: Option<Persona>) {
		self.selected_persona = persona;
	}

	pub fn set_selected_focus_group(&mut self, focus_group: Option<FocusGroup>) {
		self.selected_focus_group = focus_group;
	}

	pub fn set_active_panel(&mut self, panel: Option<PanelId>) {
		self.active_panel = panel;
	}

	/// Open `panel`, or close it when it is already the active one.
	pub fn toggle_panel(&mut self, panel: PanelId) {
		self.active_panel = if self.active_panel == Some(panel) {
			None
		} else {
			Some(panel)
		};
	}

	pub fn set_loading(&mut self, loading: bool) {
		self.is_loading = loading;
	}

	pub fn set_error(&mut self, error: Option<String>) {
		self.error = error;
	}

	/// Project id the views should load data for.
	pub fn project_id(&self) -> Option<&str> {
		self.selected_project.as_ref().map(|p| p.id.as_str())
	}
}

/// Reactive handle to the shared [`EntityState`], passed down via context.
#[derive(Clone, Copy, Debug)]
pub struct EntityStore(pub RwSignal<EntityState>);

impl EntityStore {
	pub fn new() -> Self {
		Self(RwSignal::new(EntityState::default()))
	}

	/// Create a store and provide it to the current component subtree.
	pub fn provide() -> Self {
		let store = Self::new();
		provide_context(store);
		store
	}

	/// Store provided by an ancestor.
	pub fn use_store() -> Self {
		expect_context::<EntityStore>()
	}

	pub fn select_project(&self, project: Option<Project>) {
		self.0.update(|s| s.set_selected_project(project));
	}

	pub fn select_persona(&self, persona: Option<Persona>) {
		self.0.update(|s| s.set_selected_persona(persona));
	}

	pub fn select_focus_group(&self, focus_group: Option<FocusGroup>) {
		self.0.update(|s| s.set_selected_focus_group(focus_group));
	}

	pub fn toggle_panel(&self, panel: PanelId) {
		self.0.update(|s| s.toggle_panel(panel));
	}

	pub fn set_active_panel(&self, panel: Option<PanelId>) {
		self.0.update(|s| s.set_active_panel(panel));
	}

	pub fn set_loading(&self, loading: bool) {
		self.0.update(|s| s.set_loading(loading));
	}

	pub fn set_error(&self, error: Option<String>) {
		self.0.update(|s| s.set_error(error));
	}

	/// Tracked read of the selected project id.
	pub fn project_id(&self) -> Option<String> {
		self.0.with(|s| s.project_id().map(str::to_string))
	}
}

impl Default for EntityStore {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::PersonalityScores;

	fn project(id: &str) -> Project {
		Project {
			id: id.into(),
			name: format!("Project {id}"),
			description: None,
			target_sample_size: Some(100),
			is_statistically_valid: false,
		}
	}

	fn persona(id: &str, project_id: &str) -> Persona {
		Persona {
			id: id.into(),
			project_id: project_id.into(),
			full_name: None,
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
	fn selecting_project_keeps_other_selections() {
		let mut state = EntityState::default();
		state.set_selected_project(Some(project("a")));
		state.set_selected_persona(Some(persona("p1", "a")));

		state.set_selected_project(Some(project("b")));
		assert_eq!(state.project_id(), Some("b"));
		assert_eq!(
			state.selected_persona.as_ref().map(|p| p.project_id.as_str()),
			Some("a")
		);
	}

	#[test]
	fn toggle_panel_opens_then_closes() {
		let mut state = EntityState::default();
		state.toggle_panel(PanelId::Personas);
		assert_eq!(state.active_panel, Some(PanelId::Personas));
		state.toggle_panel(PanelId::Projects);
		assert_eq!(state.active_panel, Some(PanelId::Projects));
		state.toggle_panel(PanelId::Projects);
		assert_eq!(state.active_panel, None);
	}

	#[test]
	fn flags_are_plain_setters() {
		let mut state = EntityState::default();
		state.set_loading(true);
		state.set_error(Some("boom".into()));
		assert!(state.is_loading);
		assert_eq!(state.error.as_deref(), Some("boom"));
		state.set_error(None);
		state.set_selected_project(None);
		assert_eq!(state.error, None);
		assert_eq!(state.project_id(), None);
	}
}
