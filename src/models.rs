//! Domain entities exchanged with the backend API.
//!
//! Shapes mirror the JSON the server sends. Optional fields default so that
//! older payloads still decode.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::components::knowledge_graph::LinkKind;
use crate::error::ValidationError;

/// Smallest number of personas a single generation request may ask for.
pub const MIN_GENERATED_PERSONAS: usize = 1;
/// Largest number of personas a single generation request may ask for.
pub const MAX_GENERATED_PERSONAS: usize = 100;

/// A research project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub target_sample_size: Option<u32>,
	#[serde(default)]
	pub is_statistically_valid: bool,
}

/// Payload for creating a project.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewProject {
	pub name: String,
	pub description: Option<String>,
	pub target_sample_size: u32,
}

impl NewProject {
	/// Validate a creation form; blank names are rejected.
	pub fn new(
		name: &str,
		description: &str,
		target_sample_size: u32,
	) -> Result<Self, ValidationError> {
		let name = name.trim();
		if name.is_empty() {
			return Err(ValidationError::EmptyName);
		}
		let description = Some(description.trim())
			.filter(|d| !d.is_empty())
			.map(str::to_string);
		Ok(Self {
			name: name.to_string(),
			description,
			target_sample_size,
		})
	}
}

/// Big-Five personality scores, each normalized to `[0, 1]` when present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalityScores {
	#[serde(default)]
	pub openness: Option<f64>,
	#[serde(default)]
	pub conscientiousness: Option<f64>,
	#[serde(default)]
	pub extraversion: Option<f64>,
	#[serde(default)]
	pub agreeableness: Option<f64>,
	#[serde(default)]
	pub neuroticism: Option<f64>,
}

impl PersonalityScores {
	fn scores(&self) -> [Option<f64>; 5] {
		[
			self.openness,
			self.conscientiousness,
			self.extraversion,
			self.agreeableness,
			self.neuroticism,
		]
	}

	/// True when every present score lies in `[0, 1]`.
	pub fn is_valid(&self) -> bool {
		self.scores()
			.iter()
			.flatten()
			.all(|s| (0.0..=1.0).contains(s))
	}

	/// Copy with every present score clamped into `[0, 1]`. NaN becomes absent.
	pub fn clamped(&self) -> Self {
		let fix = |s: Option<f64>| s.filter(|v| !v.is_nan()).map(|v| v.clamp(0.0, 1.0));
		Self {
			openness: fix(self.openness),
			conscientiousness: fix(self.conscientiousness),
			extraversion: fix(self.extraversion),
			agreeableness: fix(self.agreeableness),
			neuroticism: fix(self.neuroticism),
		}
	}
}

/// A synthetic respondent generated for a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Persona {
	pub id: String,
	pub project_id: String,
	#[serde(default)]
	pub full_name: Option<String>,
	#[serde(default)]
	pub age: Option<u32>,
	#[serde(default)]
	pub gender: Option<String>,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub education: Option<String>,
	#[serde(default)]
	pub income: Option<String>,
	#[serde(flatten)]
	pub personality: PersonalityScores,
	#[serde(default)]
	pub background_story: Option<String>,
	#[serde(default)]
	pub values: Vec<String>,
	#[serde(default)]
	pub interests: Vec<String>,
}

impl Persona {
	/// Short display label: the name if known, otherwise demographics.
	pub fn display_name(&self) -> String {
		if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
			return name.trim().to_string();
		}
		let parts: Vec<String> = [
			self.gender.clone(),
			self.age.map(|a| a.to_string()),
			self.location.clone(),
		]
		.into_iter()
		.flatten()
		.collect();
		if parts.is_empty() {
			format!("Persona {}", short_id(&self.id))
		} else {
			parts.join(", ")
		}
	}
}

fn short_id(id: &str) -> &str {
	id.get(..8).unwrap_or(id)
}

/// Body of `POST /projects/{id}/personas/generate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratePersonasRequest {
	pub num_personas: usize,
	pub adversarial_mode: bool,
}

impl GeneratePersonasRequest {
	/// Validate the requested count.
	pub fn new(num_personas: usize, adversarial_mode: bool) -> Result<Self, ValidationError> {
		if !(MIN_GENERATED_PERSONAS..=MAX_GENERATED_PERSONAS).contains(&num_personas) {
			return Err(ValidationError::PersonaCountOutOfRange {
				requested: num_personas,
			});
		}
		Ok(Self {
			num_personas,
			adversarial_mode,
		})
	}
}

/// How participants are instructed to behave in a discussion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusGroupMode {
	/// Cooperative discussion.
	#[default]
	Normal,
	/// Participants challenge each other's claims.
	Adversarial,
}

/// Server-side lifecycle of a focus group run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusGroupStatus {
	/// Created, not launched.
	#[default]
	Pending,
	/// Discussion is being generated.
	Running,
	/// Transcript is available.
	Completed,
	/// Generation failed server-side.
	Failed,
}

/// One utterance in a generated discussion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscussionTurn {
	pub persona_id: String,
	#[serde(default)]
	pub question_index: Option<usize>,
	pub content: String,
	#[serde(default)]
	pub sentiment: Option<f64>,
}

/// A simulated discussion among personas over a fixed question set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusGroup {
	pub id: String,
	pub project_id: String,
	pub name: String,
	#[serde(default)]
	pub questions: Vec<String>,
	#[serde(default)]
	pub persona_ids: Vec<String>,
	#[serde(default)]
	pub mode: FocusGroupMode,
	#[serde(default)]
	pub status: FocusGroupStatus,
	#[serde(default)]
	pub discussion: Vec<DiscussionTurn>,
	#[serde(default)]
	pub summary: Option<String>,
}

/// Focus group being assembled in the builder form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FocusGroupDraft {
	pub name: String,
	pub questions: Vec<String>,
	pub persona_ids: Vec<String>,
	pub mode: FocusGroupMode,
}

impl FocusGroupDraft {
	/// Number of distinct persona ids.
	pub fn distinct_personas(&self) -> usize {
		self.persona_ids.iter().collect::<HashSet<_>>().len()
	}

	/// Questions with surrounding whitespace removed, blanks dropped.
	pub fn non_empty_questions(&self) -> Vec<String> {
		self.questions
			.iter()
			.map(|q| q.trim())
			.filter(|q| !q.is_empty())
			.map(str::to_string)
			.collect()
	}

	/// At least two distinct personas and one non-empty question.
	pub fn is_launch_ready(&self) -> bool {
		self.distinct_personas() >= 2 && !self.non_empty_questions().is_empty()
	}

	/// First reason the draft cannot be launched, if any.
	pub fn validate_launch(&self) -> Result<(), ValidationError> {
		let found = self.distinct_personas();
		if found < 2 {
			return Err(ValidationError::TooFewPersonas { found });
		}
		if self.non_empty_questions().is_empty() {
			return Err(ValidationError::NoQuestions);
		}
		Ok(())
	}

	/// Full check before creating: launch rules plus a non-blank name.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.name.trim().is_empty() {
			return Err(ValidationError::EmptyName);
		}
		self.validate_launch()
	}

	/// Payload sent to the server: trimmed name, clean questions, deduplicated
	/// persona ids in selection order.
	pub fn to_payload(&self) -> Self {
		let mut seen = HashSet::new();
		Self {
			name: self.name.trim().to_string(),
			questions: self.non_empty_questions(),
			persona_ids: self
				.persona_ids
				.iter()
				.filter(|id| seen.insert(id.as_str()))
				.cloned()
				.collect(),
			mode: self.mode,
		}
	}

	/// Add the persona if absent, remove it otherwise.
	pub fn toggle_persona(&mut self, id: &str) {
		if let Some(pos) = self.persona_ids.iter().position(|p| p == id) {
			self.persona_ids.remove(pos);
		} else {
			self.persona_ids.push(id.to_string());
		}
	}
}

/// A survey attached to a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Survey {
	pub id: String,
	pub project_id: String,
	pub title: String,
	#[serde(default)]
	pub questions: Vec<SurveyQuestion>,
	#[serde(default)]
	pub response_count: usize,
}

/// One survey question with its answer options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyQuestion {
	pub id: String,
	pub text: String,
	#[serde(default)]
	pub options: Vec<String>,
}

/// Aggregated answers for a survey.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyResults {
	pub survey_id: String,
	#[serde(default)]
	pub response_count: usize,
	/// question id -> option -> count
	#[serde(default)]
	pub answers: BTreeMap<String, BTreeMap<String, usize>>,
}

impl SurveyResults {
	/// Most frequent answer for a question, ties resolved alphabetically.
	pub fn top_answer(&self, question_id: &str) -> Option<(&str, usize)> {
		self.answers
			.get(question_id)?
			.iter()
			.max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
			.map(|(k, v)| (k.as_str(), *v))
	}
}

/// Backend health snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
	pub status: String,
	#[serde(default)]
	pub services: BTreeMap<String, String>,
}

impl HealthStatus {
	/// Whether the overall status reads as healthy.
	pub fn is_healthy(&self) -> bool {
		matches!(self.status.to_ascii_lowercase().as_str(), "ok" | "healthy")
	}
}

/// Token usage and spend against the configured budget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
	#[serde(default)]
	pub total_tokens: u64,
	#[serde(default)]
	pub total_cost: f64,
	#[serde(default)]
	pub budget_limit: Option<f64>,
}

impl UsageSummary {
	/// Spend as a fraction of the budget; `None` without a positive limit.
	pub fn budget_ratio(&self) -> Option<f64> {
		self.budget_limit
			.filter(|limit| *limit > 0.0)
			.map(|limit| self.total_cost / limit)
	}
}

/// An AI-generated finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub body: String,
	#[serde(default)]
	pub kind: Option<String>,
	#[serde(default)]
	pub confidence: Option<f64>,
	#[serde(default)]
	pub sentiment: Option<f64>,
}

/// A headline business metric derived from the analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetric {
	pub name: String,
	pub value: f64,
	#[serde(default)]
	pub unit: Option<String>,
}

/// Share of positive, neutral and negative statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
	#[serde(default)]
	pub positive: f64,
	#[serde(default)]
	pub neutral: f64,
	#[serde(default)]
	pub negative: f64,
}

impl SentimentBreakdown {
	/// Shares rescaled to sum to 1; all zero when there is no data.
	pub fn normalized(&self) -> Self {
		let total = self.positive + self.neutral + self.negative;
		if total <= 0.0 {
			return Self::default();
		}
		Self {
			positive: self.positive / total,
			neutral: self.neutral / total,
			negative: self.negative / total,
		}
	}
}

/// A dashboard notification from the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
	pub id: String,
	pub message: String,
	#[serde(default)]
	pub read: bool,
}

/// A theme extracted from discussions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Concept {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub frequency: u32,
	#[serde(default)]
	pub sentiment: Option<f64>,
}

/// An emotion detected in discussions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub intensity: f64,
	#[serde(default)]
	pub sentiment: Option<f64>,
}

/// A weighted relation between two analysis entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
	pub source: String,
	pub target: String,
	pub kind: LinkKind,
	#[serde(default = "default_strength")]
	pub strength: f64,
}

fn default_strength() -> f64 {
	1.0
}

/// Analysis output used to enrich the knowledge graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInsights {
	#[serde(default)]
	pub concepts: Vec<Concept>,
	#[serde(default)]
	pub emotions: Vec<Emotion>,
	#[serde(default)]
	pub relations: Vec<Relation>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn draft(personas: &[&str], questions: &[&str]) -> FocusGroupDraft {
		FocusGroupDraft {
			name: "Pricing".into(),
			questions: questions.iter().map(|q| q.to_string()).collect(),
			persona_ids: personas.iter().map(|p| p.to_string()).collect(),
			mode: FocusGroupMode::Normal,
		}
	}

	#[test]
	fn launch_ready_at_exact_minimum() {
		let d = draft(&["a", "b"], &["What do you pay for coffee?"]);
		assert!(d.is_launch_ready());
		assert_eq!(d.validate_launch(), Ok(()));
	}

	#[test]
	fn one_persona_is_not_launch_ready() {
		let d = draft(&["a"], &["Q1"]);
		assert!(!d.is_launch_ready());
		assert_eq!(
			d.validate_launch(),
			Err(ValidationError::TooFewPersonas { found: 1 })
		);
	}

	#[test]
	fn zero_questions_is_not_launch_ready() {
		let d = draft(&["a", "b", "c"], &[]);
		assert!(!d.is_launch_ready());
		assert_eq!(d.validate_launch(), Err(ValidationError::NoQuestions));

		let blank = draft(&["a", "b"], &["", "   "]);
		assert!(!blank.is_launch_ready());
	}

	#[test]
	fn duplicate_personas_count_once() {
		let d = draft(&["a", "a"], &["Q1"]);
		assert!(!d.is_launch_ready());
		assert_eq!(d.to_payload().persona_ids, vec!["a".to_string()]);
	}

	#[test]
	fn create_requires_name() {
		let mut d = draft(&["a", "b"], &["Q1"]);
		d.name = "  ".into();
		assert_eq!(d.validate(), Err(ValidationError::EmptyName));
	}

	#[test]
	fn toggle_persona_adds_and_removes() {
		let mut d = FocusGroupDraft::default();
		d.toggle_persona("p1");
		d.toggle_persona("p2");
		d.toggle_persona("p1");
		assert_eq!(d.persona_ids, vec!["p2".to_string()]);
	}

	#[test]
	fn generation_count_bounds() {
		assert!(GeneratePersonasRequest::new(10, false).is_ok());
		assert!(GeneratePersonasRequest::new(100, true).is_ok());
		assert_eq!(
			GeneratePersonasRequest::new(0, false),
			Err(ValidationError::PersonaCountOutOfRange { requested: 0 })
		);
		assert!(GeneratePersonasRequest::new(101, false).is_err());
	}

	#[test]
	fn personality_clamps_out_of_range_scores() {
		let scores = PersonalityScores {
			openness: Some(1.4),
			neuroticism: Some(-0.2),
			extraversion: Some(f64::NAN),
			agreeableness: Some(0.5),
			conscientiousness: None,
		};
		assert!(!scores.is_valid());
		let fixed = scores.clamped();
		assert!(fixed.is_valid());
		assert_eq!(fixed.openness, Some(1.0));
		assert_eq!(fixed.neuroticism, Some(0.0));
		assert_eq!(fixed.extraversion, None);
		assert_eq!(fixed.agreeableness, Some(0.5));
	}

	#[test]
	fn persona_decodes_flat_personality() {
		let json = r#"{
			"id": "p-1", "project_id": "proj", "age": 34, "gender": "female",
			"location": "Kraków", "openness": 0.7, "neuroticism": 0.2,
			"values": ["family"], "interests": ["cycling"]
		}"#;
		let persona: Persona = serde_json::from_str(json).unwrap();
		assert_eq!(persona.personality.openness, Some(0.7));
		assert_eq!(persona.personality.extraversion, None);
		assert_eq!(persona.display_name(), "female, 34, Kraków");
	}

	#[test]
	fn focus_group_mode_is_lowercase_on_the_wire() {
		let json = serde_json::to_string(&FocusGroupMode::Adversarial).unwrap();
		assert_eq!(json, "\"adversarial\"");
		let fg: FocusGroup =
			serde_json::from_str(r#"{"id":"f","project_id":"p","name":"n","status":"running"}"#)
				.unwrap();
		assert_eq!(fg.status, FocusGroupStatus::Running);
		assert_eq!(fg.mode, FocusGroupMode::Normal);
	}

	#[test]
	fn new_project_trims_fields() {
		let p = NewProject::new("  Coffee  ", "   ", 200).unwrap();
		assert_eq!(p.name, "Coffee");
		assert_eq!(p.description, None);
		assert_eq!(NewProject::new(" ", "", 10), Err(ValidationError::EmptyName));
	}

	#[test]
	fn budget_ratio_needs_positive_limit() {
		let usage = UsageSummary {
			total_tokens: 1000,
			total_cost: 25.0,
			budget_limit: Some(100.0),
		};
		assert_eq!(usage.budget_ratio(), Some(0.25));
		let unlimited = UsageSummary {
			budget_limit: Some(0.0),
			..usage
		};
		assert_eq!(unlimited.budget_ratio(), None);
	}

	#[test]
	fn survey_top_answer_breaks_ties_alphabetically() {
		let mut results = SurveyResults::default();
		results.answers.insert(
			"q1".into(),
			[("yes".to_string(), 4), ("no".to_string(), 4), ("maybe".to_string(), 1)]
				.into_iter()
				.collect(),
		);
		assert_eq!(results.top_answer("q1"), Some(("no", 4)));
		assert_eq!(results.top_answer("q2"), None);
	}

	#[test]
	fn sentiment_normalizes_to_unit_sum() {
		let s = SentimentBreakdown {
			positive: 2.0,
			neutral: 1.0,
			negative: 1.0,
		}
		.normalized();
		assert!((s.positive - 0.5).abs() < 1e-9);
		assert_eq!(SentimentBreakdown::default().normalized(), SentimentBreakdown::default());
	}
}
