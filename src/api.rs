//! Thin REST client for the research backend.
//!
//! Every call returns `Result<_, ApiError>`. Non-2xx responses carry the
//! server's own explanation when the body has one.

use gloo_net::http::{Request, Response};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
	BusinessMetric, FocusGroup, FocusGroupDraft, GeneratePersonasRequest, GraphInsights,
	HealthStatus, Insight, NewProject, Notification, Persona, Project, SentimentBreakdown, Survey,
	SurveyResults, UsageSummary,
};

/// Client bound to one API base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
	base_url: String,
}

/// Map a status code to an error, `None` for 2xx.
pub fn status_error(status: u16, body: &str) -> Option<ApiError> {
	(!(200..300).contains(&status)).then(|| ApiError::from_response(status, body))
}

async fn ensure_ok(response: Response) -> Result<Response, ApiError> {
	if response.ok() {
		return Ok(response);
	}
	let status = response.status();
	let body = response.text().await.unwrap_or_default();
	let err = status_error(status, &body).unwrap_or(ApiError::Http {
		status,
		detail: None,
	});
	warn!("focus-lab: {} {}", response.url(), err);
	Err(err)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
	let response = ensure_ok(response).await?;
	Ok(response.json::<T>().await?)
}

impl ApiClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	pub fn from_config(config: &AppConfig) -> Self {
		Self::new(config.api_base_url.clone())
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Absolute URL for an API path.
	pub fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let url = self.url(path);
		debug!("focus-lab: GET {url}");
		read_json(Request::get(&url).send().await?).await
	}

	async fn post<B: Serialize, T: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<T, ApiError> {
		let url = self.url(path);
		debug!("focus-lab: POST {url}");
		let request = Request::post(&url).json(body)?;
		read_json(request.send().await?).await
	}

	async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let url = self.url(path);
		debug!("focus-lab: POST {url}");
		read_json(Request::post(&url).send().await?).await
	}

	async fn delete(&self, path: &str) -> Result<(), ApiError> {
		let url = self.url(path);
		debug!("focus-lab: DELETE {url}");
		ensure_ok(Request::delete(&url).send().await?).await?;
		Ok(())
	}

	pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
		self.get("projects").await
	}

	pub async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
		self.get(&format!("projects/{id}")).await
	}

	pub async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
		self.post("projects", project).await
	}

	pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
		self.delete(&format!("projects/{id}")).await
	}

	/// Personas of a project. Out-of-range personality scores are clamped.
	pub async fn list_personas(&self, project_id: &str) -> Result<Vec<Persona>, ApiError> {
		let personas: Vec<Persona> = self.get(&format!("projects/{project_id}/personas")).await?;
		Ok(personas.into_iter().map(sanitize_persona).collect())
	}

	/// Start server-side generation. Completion is detected by polling
	/// [`ApiClient::list_personas`].
	pub async fn generate_personas(
		&self,
		project_id: &str,
		request: &GeneratePersonasRequest,
	) -> Result<serde_json::Value, ApiError> {
		self.post(&format!("projects/{project_id}/personas/generate"), request)
			.await
	}

	pub async fn delete_persona(&self, id: &str) -> Result<(), ApiError> {
		self.delete(&format!("personas/{id}")).await
	}

	pub async fn list_focus_groups(&self, project_id: &str) -> Result<Vec<FocusGroup>, ApiError> {
		self.get(&format!("projects/{project_id}/focus-groups")).await
	}

	pub async fn create_focus_group(
		&self,
		project_id: &str,
		draft: &FocusGroupDraft,
	) -> Result<FocusGroup, ApiError> {
		self.post(
			&format!("projects/{project_id}/focus-groups"),
			&draft.to_payload(),
		)
		.await
	}

	pub async fn run_focus_group(&self, id: &str) -> Result<FocusGroup, ApiError> {
		self.post_empty(&format!("focus-groups/{id}/run")).await
	}

	pub async fn generate_summary(&self, id: &str) -> Result<FocusGroup, ApiError> {
		self.post_empty(&format!("focus-groups/{id}/ai-summary"))
			.await
	}

	pub async fn delete_focus_group(&self, id: &str) -> Result<(), ApiError> {
		self.delete(&format!("focus-groups/{id}")).await
	}

	pub async fn list_surveys(&self, project_id: &str) -> Result<Vec<Survey>, ApiError> {
		self.get(&format!("projects/{project_id}/surveys")).await
	}

	pub async fn survey_results(&self, survey_id: &str) -> Result<SurveyResults, ApiError> {
		self.get(&format!("surveys/{survey_id}/results")).await
	}

	pub async fn health(&self) -> Result<HealthStatus, ApiError> {
		self.get("health").await
	}

	pub async fn usage(&self) -> Result<UsageSummary, ApiError> {
		self.get("usage/summary").await
	}

	pub async fn insights(&self) -> Result<Vec<Insight>, ApiError> {
		self.get("dashboard/insights").await
	}

	pub async fn business_metrics(&self) -> Result<Vec<BusinessMetric>, ApiError> {
		self.get("dashboard/business-metrics").await
	}

	pub async fn sentiment(&self) -> Result<SentimentBreakdown, ApiError> {
		self.get("dashboard/sentiment").await
	}

	pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
		self.get("dashboard/notifications").await
	}

	/// Concepts, emotions and relations mined from a project's discussions.
	pub async fn graph_insights(&self, project_id: &str) -> Result<GraphInsights, ApiError> {
		self.get(&format!("projects/{project_id}/graph")).await
	}
}

fn sanitize_persona(mut persona: Persona) -> Persona {
	if !persona.personality.is_valid() {
		warn!(
			"focus-lab: persona {} has out-of-range personality scores",
			persona.id
		);
		persona.personality = persona.personality.clamped();
	}
	persona
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::PersonalityScores;

	#[test]
	fn url_joins_with_single_slash() {
		let client = ApiClient::new("http://api.test/v1/");
		assert_eq!(client.base_url(), "http://api.test/v1");
		assert_eq!(client.url("projects"), "http://api.test/v1/projects");
		assert_eq!(client.url("/projects/7"), "http://api.test/v1/projects/7");
	}

	#[test]
	fn client_uses_configured_base() {
		let config = AppConfig::with_api_url(Some("https://example.org/api/"));
		assert_eq!(
			ApiClient::from_config(&config).url("health"),
			"https://example.org/api/health"
		);
	}

	#[test]
	fn only_non_success_statuses_are_errors() {
		assert_eq!(status_error(200, ""), None);
		assert_eq!(status_error(204, ""), None);
		assert_eq!(
			status_error(404, r#"{"detail": "Project not found"}"#),
			Some(ApiError::Http {
				status: 404,
				detail: Some("Project not found".into()),
			})
		);
		assert_eq!(
			status_error(500, "<html>oops</html>"),
			Some(ApiError::Http {
				status: 500,
				detail: None,
			})
		);
	}

	#[test]
	fn sanitize_clamps_personality_scores() {
		let persona = Persona {
			id: "p".into(),
			project_id: "x".into(),
			full_name: None,
			age: None,
			gender: None,
			location: None,
			education: None,
			income: None,
			personality: PersonalityScores {
				openness: Some(1.7),
				..PersonalityScores::default()
			},
			background_story: None,
			values: vec![],
			interests: vec![],
		};
		let fixed = sanitize_persona(persona);
		assert!(fixed.personality.is_valid());
	}
}
