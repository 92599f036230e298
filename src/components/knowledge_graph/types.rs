//! Graph data structures produced by the transformer and consumed by the
//! layout and the scene.

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Point or vector in graph world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vec3 {
	/// Origin.
	pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	pub fn length_squared(self) -> f64 {
		self.x * self.x + self.y * self.y + self.z * self.z
	}

	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}
}

impl Add for Vec3 {
	type Output = Vec3;
	fn add(self, o: Vec3) -> Vec3 {
		Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
	}
}

impl Sub for Vec3 {
	type Output = Vec3;
	fn sub(self, o: Vec3) -> Vec3 {
		Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
	}
}

impl Mul<f64> for Vec3 {
	type Output = Vec3;
	fn mul(self, k: f64) -> Vec3 {
		Vec3::new(self.x * k, self.y * k, self.z * k)
	}
}

impl AddAssign for Vec3 {
	fn add_assign(&mut self, o: Vec3) {
		*self = *self + o;
	}
}

impl SubAssign for Vec3 {
	fn sub_assign(&mut self, o: Vec3) {
		*self = *self - o;
	}
}

/// What kind of entity a node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
	/// A generated persona.
	Persona,
	/// A concept extracted from discussions.
	Concept,
	/// An emotion detected in discussions.
	Emotion,
}

impl NodeCategory {
	/// All categories in band order.
	pub const ALL: [NodeCategory; 3] = [
		NodeCategory::Persona,
		NodeCategory::Concept,
		NodeCategory::Emotion,
	];

	/// Index of the band this category occupies on the primary axis.
	pub fn band(self) -> usize {
		match self {
			NodeCategory::Persona => 0,
			NodeCategory::Concept => 1,
			NodeCategory::Emotion => 2,
		}
	}
}

/// Relationship carried by a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
	/// Two personas agree.
	Agrees,
	/// Two personas disagree.
	Disagrees,
	/// A persona mentions a concept.
	Mentions,
	/// A persona expresses an emotion.
	Feels,
}

/// A node in the knowledge graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Stable identifier, unique within a graph. Referenced by links.
	pub id: String,
	pub label: String,
	pub category: NodeCategory,
	/// Size multiplier (1.0 = normal).
	pub size: f64,
	/// Sentiment in `[-1, 1]` for concepts and emotions.
	pub sentiment: Option<f64>,
	/// Normalized starting position in `[0, 1] x [0, 1]`.
	pub initial: (f64, f64),
	/// World position, set only by the layout step.
	pub position: Option<Vec3>,
}

/// A weighted, typed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	pub kind: LinkKind,
	/// Weight used for line thickness and for pruning.
	pub strength: f64,
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Nothing to display.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// True once every node carries a world position.
	pub fn is_positioned(&self) -> bool {
		self.nodes.iter().all(|n| n.position.is_some())
	}
}
