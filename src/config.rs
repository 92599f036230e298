//! Build-time application configuration.
//!
//! Environment inputs are baked in at compile time: the API base URL through
//! `FOCUS_LAB_API_URL` and the graph layout engine through `FOCUS_LAB_LAYOUT`.
//! Everything else is a typed constant so that tests and the browser build
//! agree.

use std::time::Duration;

use crate::components::knowledge_graph::LayoutKind;

/// API base URL used when `FOCUS_LAB_API_URL` is not set at build time.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Runtime configuration shared through the component tree via context.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Base URL of the REST API, without a trailing slash.
	pub api_base_url: String,
	/// Fixed interval between persona list refetches while generation runs.
	pub persona_poll_interval: Duration,
	/// Maximum number of links handed to the layout and renderer.
	pub link_cap: usize,
	/// Number of simulation ticks run before a layout is considered settled.
	pub layout_iterations: usize,
	/// Lifetime of a toast unless it asks for a different duration.
	pub toast_duration: Duration,
	/// Engine that places the knowledge graph.
	pub layout: LayoutKind,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: DEFAULT_API_URL.to_string(),
			persona_poll_interval: Duration::from_millis(3000),
			link_cap: 100,
			layout_iterations: 300,
			toast_duration: Duration::from_millis(5000),
			layout: LayoutKind::Force3d,
		}
	}
}

impl AppConfig {
	/// Build the configuration from compile-time environment variables.
	pub fn from_env() -> Self {
		Self::with_api_url(option_env!("FOCUS_LAB_API_URL"))
			.with_layout(option_env!("FOCUS_LAB_LAYOUT"))
	}

	/// Pick the layout engine by name. Unknown or missing names keep the
	/// current one.
	pub fn with_layout(mut self, code: Option<&str>) -> Self {
		if let Some(kind) = code.and_then(LayoutKind::from_code) {
			self.layout = kind;
		}
		self
	}

	/// Default configuration with an optional API URL override.
	///
	/// Blank overrides are ignored and a trailing `/` is trimmed.
	pub fn with_api_url(url: Option<&str>) -> Self {
		let api_base_url = url
			.map(str::trim)
			.filter(|u| !u.is_empty())
			.map(|u| u.trim_end_matches('/').to_string())
			.unwrap_or_else(|| DEFAULT_API_URL.to_string());

		Self {
			api_base_url,
			..Self::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_documented_constants() {
		let config = AppConfig::default();
		assert_eq!(config.api_base_url, DEFAULT_API_URL);
		assert_eq!(config.persona_poll_interval, Duration::from_secs(3));
		assert_eq!(config.link_cap, 100);
		assert_eq!(config.toast_duration, Duration::from_millis(5000));
	}

	#[test]
	fn layout_override_accepts_known_names_only() {
		let planar = AppConfig::default().with_layout(Some("planar"));
		assert_eq!(planar.layout, LayoutKind::Planar);
		assert_eq!(planar.clone().with_layout(Some("spiral")).layout, LayoutKind::Planar);
		assert_eq!(AppConfig::default().with_layout(None).layout, LayoutKind::Force3d);
	}

	#[test]
	fn override_trims_trailing_slash() {
		let config = AppConfig::with_api_url(Some("https://api.example.com/v2/"));
		assert_eq!(config.api_base_url, "https://api.example.com/v2");
	}

	#[test]
	fn blank_override_falls_back_to_default() {
		assert_eq!(AppConfig::with_api_url(Some("   ")).api_base_url, DEFAULT_API_URL);
		assert_eq!(AppConfig::with_api_url(None).api_base_url, DEFAULT_API_URL);
	}
}
