//! Turns personas and analysis entities into a node/link graph.
//!
//! Nodes get a normalized starting position: each category owns a horizontal
//! band on the y axis, and nodes inside a category are spread evenly along x.
//! This gives the simulation a non-degenerate start without randomness.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::types::{GraphData, GraphLink, GraphNode, NodeCategory};
use crate::models::{GraphInsights, Persona};

/// Number of category bands on the primary axis.
const BANDS: f64 = NodeCategory::ALL.len() as f64;

struct Seed {
	id: String,
	label: String,
	category: NodeCategory,
	base_size: f64,
	sentiment: Option<f64>,
}

/// Normalized starting position for the `index`-th of `count` nodes in a
/// category. Both coordinates lie strictly inside `(0, 1)`.
pub fn initial_position(category: NodeCategory, index: usize, count: usize) -> (f64, f64) {
	let x = (index as f64 + 1.0) / (count.max(index + 1) as f64 + 1.0);
	let y = (category.band() as f64 + 0.5) / BANDS;
	(x, y)
}

/// The `[low, high)` slice of the y axis owned by a category.
pub fn band_bounds(category: NodeCategory) -> (f64, f64) {
	let b = category.band() as f64;
	(b / BANDS, (b + 1.0) / BANDS)
}

/// Build the knowledge graph for a set of personas and optional analysis.
///
/// Every returned link references two nodes present in the graph; relations
/// naming unknown entities are dropped. An empty input gives an empty graph.
pub fn build_graph(personas: &[Persona], insights: Option<&GraphInsights>) -> GraphData {
	let mut seen = HashSet::new();
	let mut seeds = Vec::new();
	let mut push = |seed: Seed| {
		if seen.insert(seed.id.clone()) {
			seeds.push(seed);
		} else {
			warn!("focus-lab: duplicate graph node id {:?}, skipped", seed.id);
		}
	};

	for persona in personas {
		push(Seed {
			id: persona.id.clone(),
			label: persona.display_name(),
			category: NodeCategory::Persona,
			base_size: 1.2,
			sentiment: None,
		});
	}

	if let Some(insights) = insights {
		let max_freq = insights
			.concepts
			.iter()
			.map(|c| c.frequency)
			.max()
			.unwrap_or(1)
			.max(1);
		for concept in &insights.concepts {
			let freq = f64::from(concept.frequency) / f64::from(max_freq);
			push(Seed {
				id: concept.id.clone(),
				label: concept.label.clone(),
				category: NodeCategory::Concept,
				base_size: 0.8 + 0.6 * freq.sqrt(),
				sentiment: concept.sentiment.map(clamp_sentiment),
			});
		}
		for emotion in &insights.emotions {
			push(Seed {
				id: emotion.id.clone(),
				label: emotion.label.clone(),
				category: NodeCategory::Emotion,
				base_size: 0.7 + 0.5 * emotion.intensity.clamp(0.0, 1.0),
				sentiment: emotion.sentiment.map(clamp_sentiment),
			});
		}
	}

	let links: Vec<GraphLink> = insights
		.map(|i| i.relations.as_slice())
		.unwrap_or_default()
		.iter()
		.filter(|r| {
			let known = seen.contains(&r.source) && seen.contains(&r.target);
			if !known {
				debug!(
					"focus-lab: dropping relation {} -> {} with unknown endpoint",
					r.source, r.target
				);
			}
			known && r.source != r.target && r.strength.is_finite()
		})
		.map(|r| GraphLink {
			source: r.source.clone(),
			target: r.target.clone(),
			kind: r.kind,
			strength: r.strength.max(0.0),
		})
		.collect();

	// Count edges per node for importance scaling
	let mut degree: HashMap<&str, usize> = HashMap::new();
	for link in &links {
		*degree.entry(link.source.as_str()).or_insert(0) += 1;
		*degree.entry(link.target.as_str()).or_insert(0) += 1;
	}
	let max_degree = degree.values().copied().max().unwrap_or(1).max(1);

	let mut per_category: HashMap<NodeCategory, usize> = HashMap::new();
	for seed in &seeds {
		*per_category.entry(seed.category).or_insert(0) += 1;
	}

	let mut cursor: HashMap<NodeCategory, usize> = HashMap::new();
	let nodes = seeds
		.into_iter()
		.map(|seed| {
			let index = cursor.entry(seed.category).or_insert(0);
			let initial = initial_position(seed.category, *index, per_category[&seed.category]);
			*index += 1;

			let node_degree = degree.get(seed.id.as_str()).copied().unwrap_or(0);
			let edge_factor = (node_degree as f64 / max_degree as f64).sqrt();

			GraphNode {
				size: seed.base_size * (0.8 + 0.4 * edge_factor),
				id: seed.id,
				label: seed.label,
				category: seed.category,
				sentiment: seed.sentiment,
				initial,
				position: None,
			}
		})
		.collect();

	GraphData { nodes, links }
}

fn clamp_sentiment(s: f64) -> f64 {
	if s.is_nan() { 0.0 } else { s.clamp(-1.0, 1.0) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::types::LinkKind;
	use crate::models::{Concept, Emotion, PersonalityScores, Relation};

	fn persona(id: &str) -> Persona {
		Persona {
			id: id.into(),
			project_id: "proj".into(),
			full_name: Some(format!("Person {id}")),
			age: Some(30),
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

	fn relation(source: &str, target: &str, kind: LinkKind, strength: f64) -> Relation {
		Relation {
			source: source.into(),
			target: target.into(),
			kind,
			strength,
		}
	}

	fn sample_insights() -> GraphInsights {
		GraphInsights {
			concepts: vec![
				Concept {
					id: "c-price".into(),
					label: "price".into(),
					frequency: 12,
					sentiment: Some(-0.4),
				},
				Concept {
					id: "c-taste".into(),
					label: "taste".into(),
					frequency: 3,
					sentiment: Some(2.0),
				},
			],
			emotions: vec![Emotion {
				id: "e-joy".into(),
				label: "joy".into(),
				intensity: 0.8,
				sentiment: Some(0.9),
			}],
			relations: vec![
				relation("p1", "c-price", LinkKind::Mentions, 0.9),
				relation("p2", "e-joy", LinkKind::Feels, 0.5),
				relation("p1", "p2", LinkKind::Disagrees, 0.3),
				relation("p1", "ghost", LinkKind::Mentions, 1.0),
			],
		}
	}

	#[test]
	fn three_personas_without_links() {
		let personas = [persona("p1"), persona("p2"), persona("p3")];
		let graph = build_graph(&personas, None);

		assert_eq!(graph.nodes.len(), 3);
		assert!(graph.links.is_empty());
		let (lo, hi) = band_bounds(NodeCategory::Persona);
		for node in &graph.nodes {
			assert_eq!(node.category, NodeCategory::Persona);
			assert!(node.initial.1 >= lo && node.initial.1 < hi);
			assert!(node.position.is_none());
		}
		let xs: Vec<f64> = graph.nodes.iter().map(|n| n.initial.0).collect();
		assert_eq!(xs, vec![0.25, 0.5, 0.75]);
	}

	#[test]
	fn empty_input_gives_empty_graph() {
		let graph = build_graph(&[], None);
		assert!(graph.is_empty());
		assert!(graph.links.is_empty());

		let graph = build_graph(&[], Some(&GraphInsights::default()));
		assert!(graph.is_empty());
	}

	#[test]
	fn every_position_in_unit_square_and_bands_disjoint() {
		let personas: Vec<_> = (0..7).map(|i| persona(&format!("p{i}"))).collect();
		let graph = build_graph(&personas, Some(&sample_insights()));

		let mut bands: HashMap<NodeCategory, Vec<f64>> = HashMap::new();
		for node in &graph.nodes {
			let (x, y) = node.initial;
			assert!((0.0..=1.0).contains(&x), "x out of range: {x}");
			assert!((0.0..=1.0).contains(&y), "y out of range: {y}");
			bands.entry(node.category).or_default().push(y);
		}
		for category in NodeCategory::ALL {
			let (lo, hi) = band_bounds(category);
			for other in NodeCategory::ALL.iter().filter(|c| **c != category) {
				for y in bands.get(other).into_iter().flatten() {
					assert!(!(lo..hi).contains(y), "{other:?} intrudes on {category:?} band");
				}
			}
		}
	}

	#[test]
	fn links_reference_existing_nodes_only() {
		let personas = [persona("p1"), persona("p2")];
		let graph = build_graph(&personas, Some(&sample_insights()));

		let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(graph.links.len(), 3);
		for link in &graph.links {
			assert!(ids.contains(link.source.as_str()));
			assert!(ids.contains(link.target.as_str()));
		}
	}

	#[test]
	fn duplicate_ids_are_skipped() {
		let personas = [persona("p1"), persona("p1")];
		let graph = build_graph(&personas, None);
		assert_eq!(graph.nodes.len(), 1);
	}

	#[test]
	fn sentiment_is_clamped_and_connected_nodes_grow() {
		let personas = [persona("p1"), persona("p2"), persona("p3")];
		let graph = build_graph(&personas, Some(&sample_insights()));

		let taste = graph.nodes.iter().find(|n| n.id == "c-taste").unwrap();
		assert_eq!(taste.sentiment, Some(1.0));

		let p1 = graph.nodes.iter().find(|n| n.id == "p1").unwrap();
		let p3 = graph.nodes.iter().find(|n| n.id == "p3").unwrap();
		assert!(p1.size > p3.size);
	}
}
