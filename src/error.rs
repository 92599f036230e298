//! Error types for the request boundary and client-side validation.
//!
//! API errors never travel past the component that issued the request: they
//! are turned into a user-facing string with [`ApiError::user_message`] and
//! shown inline or as a toast.

use serde_json::Value;
use thiserror::Error;

use crate::i18n::{Locale, tr};

/// Failure talking to the backend API.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("network error: {0}")]
	Network(String),
	/// The server answered with a non-success status.
	#[error("HTTP {status}{}", detail_suffix(.detail))]
	Http {
		/// Response status code.
		status: u16,
		/// Human-readable message extracted from the response body.
		detail: Option<String>,
	},
	/// The response body did not match the expected shape.
	#[error("failed to decode response: {0}")]
	Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
	detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ApiError {
	/// Build an HTTP error from a status code and raw response body.
	pub fn from_response(status: u16, body: &str) -> Self {
		ApiError::Http {
			status,
			detail: extract_detail(body),
		}
	}

	/// Message suitable for display: the server's own explanation when it
	/// sent one, otherwise a generic localized fallback.
	pub fn user_message(&self, locale: Locale) -> String {
		match self {
			ApiError::Http {
				detail: Some(detail),
				..
			} => detail.clone(),
			ApiError::Http { status, .. } => format!("{} ({status})", tr(locale, "error.http")),
			ApiError::Network(_) => tr(locale, "error.network").to_string(),
			ApiError::Decode(_) => tr(locale, "error.decode").to_string(),
		}
	}
}

impl From<gloo_net::Error> for ApiError {
	fn from(err: gloo_net::Error) -> Self {
		match err {
			gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
			other => ApiError::Network(other.to_string()),
		}
	}
}

/// Pull a readable message out of a JSON error body.
///
/// Understands `{"detail": "..."}`, `{"detail": [{"msg": "..."}, ...]}`,
/// `{"message": "..."}` and `{"error": "..."}`.
pub fn extract_detail(body: &str) -> Option<String> {
	let value: Value = serde_json::from_str(body).ok()?;
	let obj = value.as_object()?;

	if let Some(detail) = obj.get("detail") {
		match detail {
			Value::String(s) if !s.trim().is_empty() => return Some(s.trim().to_string()),
			Value::Array(items) => {
				let msgs: Vec<&str> = items
					.iter()
					.filter_map(|i| i.get("msg").and_then(Value::as_str))
					.collect();
				if !msgs.is_empty() {
					return Some(msgs.join("; "));
				}
			}
			_ => {}
		}
	}

	["message", "error"]
		.iter()
		.filter_map(|k| obj.get(*k).and_then(Value::as_str))
		.map(str::trim)
		.find(|s| !s.is_empty())
		.map(str::to_string)
}

/// A request that was refused on the client before reaching the server.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	/// Focus groups need at least two distinct participants.
	#[error("a focus group needs at least 2 personas, {found} selected")]
	TooFewPersonas {
		/// Distinct personas currently selected.
		found: usize,
	},
	/// Focus groups need at least one non-empty question.
	#[error("a focus group needs at least one question")]
	NoQuestions,
	/// A required name field was blank.
	#[error("name must not be empty")]
	EmptyName,
	/// Persona generation count outside the accepted range.
	#[error("can generate between 1 and 100 personas, {requested} requested")]
	PersonaCountOutOfRange {
		/// Count the user asked for.
		requested: usize,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_string_detail() {
		assert_eq!(
			extract_detail(r#"{"detail": "Project not found"}"#).as_deref(),
			Some("Project not found")
		);
	}

	#[test]
	fn joins_validation_list_detail() {
		let body = r#"{"detail": [{"loc": ["body", "name"], "msg": "field required"},
			{"msg": "value too long"}]}"#;
		assert_eq!(
			extract_detail(body).as_deref(),
			Some("field required; value too long")
		);
	}

	#[test]
	fn falls_back_to_message_then_error_keys() {
		assert_eq!(extract_detail(r#"{"message": "quota"}"#).as_deref(), Some("quota"));
		assert_eq!(extract_detail(r#"{"error": "boom"}"#).as_deref(), Some("boom"));
		assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
	}

	#[test]
	fn non_json_body_has_no_detail() {
		assert_eq!(extract_detail("<html>502 Bad Gateway</html>"), None);
		assert_eq!(extract_detail(""), None);
	}

	#[test]
	fn user_message_prefers_server_detail() {
		let err = ApiError::from_response(409, r#"{"detail": "Name already taken"}"#);
		assert_eq!(err.user_message(Locale::En), "Name already taken");

		let err = ApiError::from_response(500, "oops");
		assert_eq!(
			err.user_message(Locale::En),
			"The server returned an error (500)"
		);
		assert_eq!(
			ApiError::Network("offline".into()).user_message(Locale::En),
			"Cannot reach the server"
		);
	}

	#[test]
	fn http_error_display_includes_detail() {
		let err = ApiError::from_response(404, r#"{"detail": "missing"}"#);
		assert_eq!(err.to_string(), "HTTP 404: missing");
		let err = ApiError::from_response(404, "");
		assert_eq!(err.to_string(), "HTTP 404");
	}
}
