//! Locale selection and the UI message catalog.
//!
//! Two locales ship: Polish (default) and English. The chosen locale is the
//! only piece of client state persisted across reloads.

use leptos::prelude::*;
use log::warn;

/// localStorage key holding the language preference.
pub const LANGUAGE_STORAGE_KEY: &str = "focus-lab.language";

/// Supported UI languages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locale {
	/// Polish.
	#[default]
	Pl,
	/// English.
	En,
}

impl Locale {
	/// All locales in display order.
	pub const ALL: [Locale; 2] = [Locale::Pl, Locale::En];

	/// Two-letter language code.
	pub fn code(self) -> &'static str {
		match self {
			Locale::Pl => "pl",
			Locale::En => "en",
		}
	}

	/// Parse a language code, accepting region suffixes like `en-US`.
	pub fn from_code(code: &str) -> Option<Self> {
		let primary = code.trim().split(['-', '_']).next()?.to_ascii_lowercase();
		match primary.as_str() {
			"pl" => Some(Locale::Pl),
			"en" => Some(Locale::En),
			_ => None,
		}
	}
}

fn local_storage() -> Option<web_sys::Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

/// Read the persisted locale, defaulting to Polish.
pub fn load_locale() -> Locale {
	local_storage()
		.and_then(|s| s.get_item(LANGUAGE_STORAGE_KEY).ok().flatten())
		.and_then(|code| Locale::from_code(&code))
		.unwrap_or_default()
}

/// Persist the locale. Failures (private mode, quota) are logged and ignored.
pub fn save_locale(locale: Locale) {
	let Some(storage) = local_storage() else {
		warn!("focus-lab: localStorage unavailable, language not persisted");
		return;
	};
	if storage.set_item(LANGUAGE_STORAGE_KEY, locale.code()).is_err() {
		warn!("focus-lab: failed to persist language preference");
	}
}

/// Reactive locale shared through context.
#[derive(Clone, Copy, Debug)]
pub struct I18n(pub RwSignal<Locale>);

impl I18n {
	/// Load the persisted locale and provide it to the component subtree.
	pub fn provide() -> Self {
		let i18n = Self(RwSignal::new(load_locale()));
		provide_context(i18n);
		i18n
	}

	pub fn use_i18n() -> Self {
		expect_context::<I18n>()
	}

	/// Tracked lookup in the current locale.
	pub fn t(&self, key: &'static str) -> &'static str {
		tr(self.0.get(), key)
	}

	pub fn locale(&self) -> Locale {
		self.0.get()
	}

	/// Switch language and remember the choice.
	pub fn set_locale(&self, locale: Locale) {
		save_locale(locale);
		self.0.set(locale);
	}
}

/// Look up a UI string. Unknown keys come back unchanged.
pub fn tr(locale: Locale, key: &'static str) -> &'static str {
	let entry = CATALOG.iter().find(|(k, _, _)| *k == key);
	match (entry, locale) {
		(Some((_, pl, _)), Locale::Pl) => pl,
		(Some((_, _, en)), Locale::En) => en,
		(None, _) => key,
	}
}

/// `(key, pl, en)` triples.
const CATALOG: &[(&str, &str, &str)] = &[
	("panel.projects", "Projekty", "Projects"),
	("panel.personas", "Persony", "Personas"),
	("panel.focus_groups", "Grupy fokusowe", "Focus groups"),
	("panel.surveys", "Ankiety", "Surveys"),
	("panel.analysis", "Analiza", "Analysis"),
	("panel.graph", "Graf wiedzy", "Knowledge graph"),
	("action.retry", "Spróbuj ponownie", "Try again"),
	("action.create", "Utwórz", "Create"),
	("action.delete", "Usuń", "Delete"),
	("action.confirm_delete", "Potwierdź usunięcie", "Confirm delete"),
	("action.cancel", "Anuluj", "Cancel"),
	("action.generate", "Generuj persony", "Generate personas"),
	("action.launch", "Uruchom dyskusję", "Launch discussion"),
	("action.summarize", "Generuj podsumowanie", "Generate summary"),
	("action.add_question", "Dodaj pytanie", "Add question"),
	("action.close", "Zamknij", "Close"),
	("action.results", "Wyniki", "Results"),
	("action.run", "Uruchom dyskusję", "Start discussion"),
	("state.loading", "Ładowanie…", "Loading…"),
	("state.empty", "Brak danych", "Nothing here yet"),
	("state.no_project", "Wybierz projekt", "Select a project"),
	("state.graph_empty", "Brak danych do wyświetlenia", "Nothing to display"),
	("state.generating", "Generowanie person…", "Generating personas…"),
	("state.not_ready", "Wybierz co najmniej 2 persony i dodaj pytanie", "Pick at least 2 personas and add a question"),
	("field.name", "Nazwa", "Name"),
	("field.description", "Opis", "Description"),
	("field.sample_size", "Docelowa liczebność próby", "Target sample size"),
	("field.num_personas", "Liczba person", "Number of personas"),
	("field.adversarial", "Tryb kontrariański", "Adversarial mode"),
	("field.question", "Pytanie", "Question"),
	("field.participants", "Uczestnicy", "Participants"),
	("field.responses", "Odpowiedzi", "Responses"),
	("field.language", "Język", "Language"),
	("toast.project_created", "Projekt utworzony", "Project created"),
	("toast.project_deleted", "Projekt usunięty", "Project deleted"),
	("toast.generation_started", "Generowanie person rozpoczęte", "Persona generation started"),
	("toast.generation_done", "Persony gotowe", "Personas ready"),
	("toast.focus_group_launched", "Dyskusja uruchomiona", "Discussion launched"),
	("toast.run_failed", "Grupa utworzona, ale dyskusja nie wystartowała", "Focus group created but the discussion did not start"),
	("toast.validation", "Nie można kontynuować", "Cannot continue"),
	("toast.request_failed", "Żądanie nie powiodło się", "Request failed"),
	("error.network", "Brak połączenia z serwerem", "Cannot reach the server"),
	("error.http", "Serwer zwrócił błąd", "The server returned an error"),
	("error.decode", "Nieprawidłowa odpowiedź serwera", "Unexpected server response"),
	("dashboard.health", "Stan systemu", "System health"),
	("dashboard.usage", "Zużycie i budżet", "Usage and budget"),
	("dashboard.insights", "Wnioski", "Insights"),
	("dashboard.notifications", "Powiadomienia", "Notifications"),
	("dashboard.metrics", "Metryki biznesowe", "Business metrics"),
	("dashboard.sentiment", "Sentyment", "Sentiment"),
	("dashboard.healthy", "Działa poprawnie", "Operational"),
	("dashboard.degraded", "Problemy z działaniem", "Degraded"),
	("dashboard.budget", "Wykorzystanie budżetu", "Budget used"),
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_codes_with_region() {
		assert_eq!(Locale::from_code("en-US"), Some(Locale::En));
		assert_eq!(Locale::from_code("PL"), Some(Locale::Pl));
		assert_eq!(Locale::from_code("de"), None);
		assert_eq!(Locale::from_code(""), None);
	}

	#[test]
	fn default_locale_is_polish() {
		assert_eq!(Locale::default(), Locale::Pl);
	}

	#[test]
	fn lookup_falls_back_to_key() {
		assert_eq!(tr(Locale::En, "action.retry"), "Try again");
		assert_eq!(tr(Locale::Pl, "action.retry"), "Spróbuj ponownie");
		assert_eq!(tr(Locale::En, "missing.key"), "missing.key");
	}

	#[test]
	fn catalog_keys_are_unique() {
		let mut keys: Vec<_> = CATALOG.iter().map(|(k, _, _)| *k).collect();
		keys.sort_unstable();
		keys.dedup();
		assert_eq!(keys.len(), CATALOG.len());
	}

	#[test]
	fn every_key_has_both_translations() {
		for (key, pl, en) in CATALOG {
			assert!(!pl.is_empty() && !en.is_empty(), "{key} is missing a translation");
		}
	}
}
