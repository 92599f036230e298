//! Force-directed layout behind a swappable [`LayoutEngine`] seam.
//!
//! Layout always runs a fixed number of ticks instead of iterating to
//! convergence, so the cost is bounded and known before the frame starts.
//! Nodes come back with `position` set; partial layouts are never returned.

use std::collections::HashMap;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::types::{GraphData, GraphLink, GraphNode, NodeCategory, Vec3};

/// Positions nodes in world space.
pub trait LayoutEngine {
	/// Return `nodes` in the same order with `position` populated, after
	/// exactly `iterations` simulation steps.
	fn layout(&self, nodes: &[GraphNode], links: &[GraphLink], iterations: usize)
	-> Vec<GraphNode>;
}

/// Which engine places the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutKind {
	/// [`ForceSimulation`] in three dimensions.
	#[default]
	Force3d,
	/// [`PlanarLayout`] on the `z = 0` plane.
	Planar,
}

impl LayoutKind {
	/// Parse `force3d`/`3d` or `planar`/`2d`, case-insensitively.
	pub fn from_code(code: &str) -> Option<Self> {
		match code.trim().to_ascii_lowercase().as_str() {
			"force3d" | "3d" => Some(LayoutKind::Force3d),
			"planar" | "2d" => Some(LayoutKind::Planar),
			_ => None,
		}
	}

	/// Engine with default parameters.
	pub fn engine(self) -> Box<dyn LayoutEngine> {
		match self {
			LayoutKind::Force3d => Box::new(ForceSimulation::default()),
			LayoutKind::Planar => Box::new(PlanarLayout::default()),
		}
	}
}

/// Keep at most `cap` links, preferring the strongest.
///
/// Selection is by strength descending; equal strengths keep the link that
/// came first. The kept links are returned in their original order.
pub fn prune_links(links: &[GraphLink], cap: usize) -> Vec<GraphLink> {
	if links.len() <= cap {
		return links.to_vec();
	}

	let mut order: Vec<usize> = (0..links.len()).collect();
	// sort_by is stable, so ties stay in input order
	order.sort_by(|&a, &b| links[b].strength.total_cmp(&links[a].strength));
	let mut keep = order[..cap].to_vec();
	keep.sort_unstable();

	debug!(
		"focus-lab: pruned links {} -> {}",
		links.len(),
		keep.len()
	);
	keep.into_iter().map(|i| links[i].clone()).collect()
}

/// Prune links, run the engine, and return a fully positioned graph.
pub fn layout_graph(
	data: &GraphData,
	engine: &dyn LayoutEngine,
	link_cap: usize,
	iterations: usize,
) -> GraphData {
	let links = prune_links(&data.links, link_cap);
	let nodes = engine.layout(&data.nodes, &links, iterations);
	debug!(
		"focus-lab: laid out {} nodes, {} links in {} ticks",
		nodes.len(),
		links.len(),
		iterations
	);
	GraphData { nodes, links }
}

/// Deterministic pseudo-random value in `[0, 1)`.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Small deterministic offset used to separate coincident points.
fn jiggle(a: usize, b: usize) -> Vec3 {
	let seed = (a * 31 + b * 17 + 1) as f64;
	Vec3::new(
		(pseudo_random(seed * 1.1) - 0.5) * 1e-3,
		(pseudo_random(seed * 2.3) - 0.5) * 1e-3,
		(pseudo_random(seed * 3.7) - 0.5) * 1e-3,
	)
}

/// Starting world position derived from the normalized initial position.
fn seed_position(node: &GraphNode, index: usize, spread: f64) -> Vec3 {
	let (nx, ny) = node.initial;
	let band_offset = node.category.band() as f64 - (NodeCategory::ALL.len() as f64 - 1.0) / 2.0;
	let z = band_offset * spread * 0.15 + (pseudo_random(index as f64 + 0.5) - 0.5) * spread * 0.1;
	Vec3::new((nx - 0.5) * spread, (ny - 0.5) * spread, z)
}

/// Tuning for [`ForceSimulation`].
#[derive(Clone, Debug)]
pub struct ForceParameters {
	/// Rest length of a link.
	pub link_distance: f64,
	/// Link spring coefficient, scaled per link by relative strength.
	pub link_strength: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Distance below which the many-body force stops growing.
	pub charge_distance_min: f64,
	/// Fraction of the centroid offset removed each tick.
	pub center_strength: f64,
	/// Collision radius per unit of node size.
	pub collide_radius: f64,
	/// How firmly overlaps are resolved, `0..=1`.
	pub collide_strength: f64,
	/// Velocity lost per tick, `0..=1`.
	pub velocity_decay: f64,
	/// Alpha reached after the last tick.
	pub alpha_min: f64,
	/// World-space extent of the starting configuration.
	pub spread: f64,
}

impl Default for ForceParameters {
	fn default() -> Self {
		Self {
			link_distance: 60.0,
			link_strength: 0.7,
			charge_strength: -120.0,
			charge_distance_min: 1.0,
			center_strength: 1.0,
			collide_radius: 8.0,
			collide_strength: 0.7,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			spread: 400.0,
		}
	}
}

/// 3D simulation combining link, many-body, centering and collision forces.
#[derive(Clone, Debug, Default)]
pub struct ForceSimulation {
	pub params: ForceParameters,
}

struct Edge {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

impl ForceSimulation {
	pub fn new(params: ForceParameters) -> Self {
		Self { params }
	}

	fn resolve_edges(&self, nodes: &[GraphNode], links: &[GraphLink]) -> Vec<Edge> {
		let index: HashMap<&str, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();

		let pairs: Vec<(usize, usize, f64)> = links
			.iter()
			.filter_map(|l| {
				let (&s, &t) = (index.get(l.source.as_str())?, index.get(l.target.as_str())?);
				(s != t).then_some((s, t, l.strength))
			})
			.collect();

		let mut count = vec![0usize; nodes.len()];
		for &(s, t, _) in &pairs {
			count[s] += 1;
			count[t] += 1;
		}
		let max_strength = pairs
			.iter()
			.map(|p| p.2)
			.fold(0.0_f64, f64::max)
			.max(f64::EPSILON);

		pairs
			.into_iter()
			.map(|(s, t, w)| {
				let weight = 0.25 + 0.75 * (w / max_strength).clamp(0.0, 1.0);
				Edge {
					source: s,
					target: t,
					strength: self.params.link_strength * weight
						/ count[s].min(count[t]).max(1) as f64,
					bias: count[s] as f64 / (count[s] + count[t]) as f64,
				}
			})
			.collect()
	}

	fn apply_links(&self, pos: &[Vec3], vel: &mut [Vec3], edges: &[Edge], alpha: f64) {
		for (k, e) in edges.iter().enumerate() {
			let mut d = (pos[e.target] + vel[e.target]) - (pos[e.source] + vel[e.source]);
			if d.length_squared() == 0.0 {
				d = jiggle(k, e.target);
			}
			let l = d.length();
			let d = d * ((l - self.params.link_distance) / l * alpha * e.strength);
			vel[e.target] -= d * e.bias;
			vel[e.source] += d * (1.0 - e.bias);
		}
	}

	fn apply_charge(&self, pos: &[Vec3], vel: &mut [Vec3], alpha: f64) {
		let dmin2 = self.params.charge_distance_min * self.params.charge_distance_min;
		for i in 0..pos.len() {
			for j in 0..pos.len() {
				if i == j {
					continue;
				}
				let mut d = pos[j] - pos[i];
				let mut l2 = d.length_squared();
				if l2 == 0.0 {
					d = jiggle(i, j);
					l2 = d.length_squared();
				}
				if l2 < dmin2 {
					l2 = (dmin2 * l2).sqrt();
				}
				vel[i] += d * (self.params.charge_strength * alpha / l2);
			}
		}
	}

	fn apply_collide(&self, pos: &[Vec3], vel: &mut [Vec3], radii: &[f64]) {
		for i in 0..pos.len() {
			for j in (i + 1)..pos.len() {
				let r = radii[i] + radii[j];
				let mut d = (pos[i] + vel[i]) - (pos[j] + vel[j]);
				let mut l2 = d.length_squared();
				if l2 >= r * r {
					continue;
				}
				if l2 == 0.0 {
					d = jiggle(i, j);
					l2 = d.length_squared();
				}
				let l = l2.sqrt();
				let d = d * ((r - l) / l * self.params.collide_strength);
				let (ri2, rj2) = (radii[i] * radii[i], radii[j] * radii[j]);
				let share = rj2 / (ri2 + rj2);
				vel[i] += d * share;
				vel[j] -= d * (1.0 - share);
			}
		}
	}

	fn apply_center(&self, pos: &mut [Vec3]) {
		if pos.is_empty() {
			return;
		}
		let sum = pos.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
		let shift = sum * (self.params.center_strength / pos.len() as f64);
		for p in pos.iter_mut() {
			*p -= shift;
		}
	}
}

impl LayoutEngine for ForceSimulation {
	fn layout(
		&self,
		nodes: &[GraphNode],
		links: &[GraphLink],
		iterations: usize,
	) -> Vec<GraphNode> {
		if nodes.is_empty() {
			return Vec::new();
		}

		let edges = self.resolve_edges(nodes, links);
		let radii: Vec<f64> = nodes
			.iter()
			.map(|n| self.params.collide_radius * n.size.max(0.1))
			.collect();
		let mut pos: Vec<Vec3> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| seed_position(n, i, self.params.spread))
			.collect();
		let mut vel = vec![Vec3::ZERO; nodes.len()];

		let mut alpha = 1.0;
		let alpha_decay = 1.0 - self.params.alpha_min.powf(1.0 / iterations.max(1) as f64);
		let keep = 1.0 - self.params.velocity_decay;

		for _ in 0..iterations {
			alpha += (0.0 - alpha) * alpha_decay;
			self.apply_links(&pos, &mut vel, &edges, alpha);
			self.apply_charge(&pos, &mut vel, alpha);
			self.apply_collide(&pos, &mut vel, &radii);
			for (p, v) in pos.iter_mut().zip(vel.iter_mut()) {
				*v = *v * keep;
				*p += *v;
			}
			self.apply_center(&mut pos);
		}

		nodes
			.iter()
			.zip(pos)
			.map(|(node, p)| GraphNode {
				position: Some(p),
				..node.clone()
			})
			.collect()
	}
}

/// Flat layout driven by the `force_graph` simulation; every node gets `z = 0`.
#[derive(Clone, Debug)]
pub struct PlanarLayout {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// Seconds advanced per tick.
	pub dt: f32,
	pub spread: f64,
}

impl Default for PlanarLayout {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			dt: 0.016,
			spread: 400.0,
		}
	}
}

impl LayoutEngine for PlanarLayout {
	fn layout(
		&self,
		nodes: &[GraphNode],
		links: &[GraphLink],
		iterations: usize,
	) -> Vec<GraphNode> {
		let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		});
		let mut id_to_idx = HashMap::new();

		for (i, node) in nodes.iter().enumerate() {
			let (nx, ny) = node.initial;
			let idx = graph.add_node(NodeData {
				x: ((nx - 0.5) * self.spread) as f32,
				y: ((ny - 0.5) * self.spread) as f32,
				mass: (10.0 * node.size.max(0.1)) as f32,
				is_anchor: false,
				user_data: i,
			});
			id_to_idx.insert(node.id.as_str(), idx);
		}

		for link in links {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		for _ in 0..iterations {
			graph.update(self.dt);
		}

		let mut positions = vec![Vec3::ZERO; nodes.len()];
		graph.visit_nodes(|node| {
			positions[node.data.user_data] = Vec3::new(node.x() as f64, node.y() as f64, 0.0);
		});

		nodes
			.iter()
			.zip(positions)
			.map(|(node, p)| GraphNode {
				position: Some(p),
				..node.clone()
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::transform::build_graph;
	use crate::components::knowledge_graph::types::LinkKind;
	use crate::models::{Concept, GraphInsights, Persona, PersonalityScores, Relation};

	fn link(i: usize, strength: f64) -> GraphLink {
		GraphLink {
			source: format!("s{i}"),
			target: format!("t{i}"),
			kind: LinkKind::Mentions,
			strength,
		}
	}

	fn node(id: &str, category: NodeCategory, initial: (f64, f64)) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.into(),
			category,
			size: 1.0,
			sentiment: None,
			initial,
			position: None,
		}
	}

	fn persona(id: &str) -> Persona {
		Persona {
			id: id.into(),
			project_id: "proj".into(),
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

	fn sample_graph() -> GraphData {
		let personas: Vec<_> = (0..6).map(|i| persona(&format!("p{i}"))).collect();
		let insights = GraphInsights {
			concepts: vec![Concept {
				id: "c".into(),
				label: "price".into(),
				frequency: 4,
				sentiment: None,
			}],
			emotions: vec![],
			relations: (0..6)
				.map(|i| Relation {
					source: format!("p{i}"),
					target: "c".into(),
					kind: LinkKind::Mentions,
					strength: 0.2 + 0.1 * i as f64,
				})
				.collect(),
		};
		build_graph(&personas, Some(&insights))
	}

	#[test]
	fn pruning_keeps_exactly_cap_strongest() {
		let links: Vec<_> = (0..150)
			.map(|i| link(i, ((i * 37) % 23) as f64 / 7.0))
			.collect();
		let kept = prune_links(&links, 100);
		assert_eq!(kept.len(), 100);

		let min_kept = kept.iter().map(|l| l.strength).fold(f64::INFINITY, f64::min);
		let max_dropped = links
			.iter()
			.filter(|l| !kept.contains(l))
			.map(|l| l.strength)
			.fold(f64::NEG_INFINITY, f64::max);
		assert!(min_kept >= max_dropped);
	}

	#[test]
	fn pruning_breaks_ties_by_original_order() {
		let links = vec![link(0, 0.5), link(1, 0.9), link(2, 0.5), link(3, 0.5)];
		let kept = prune_links(&links, 2);
		assert_eq!(kept, vec![link(0, 0.5), link(1, 0.9)]);
	}

	#[test]
	fn pruning_below_cap_is_identity() {
		let links: Vec<_> = (0..100).map(|i| link(i, 1.0)).collect();
		assert_eq!(prune_links(&links, 100), links);
		assert!(prune_links(&[], 100).is_empty());
	}

	#[test]
	fn simulation_positions_every_node_deterministically() {
		let graph = sample_graph();
		let engine = ForceSimulation::default();
		let a = layout_graph(&graph, &engine, 100, 120);
		let b = layout_graph(&graph, &engine, 100, 120);

		assert!(a.is_positioned());
		assert_eq!(a.nodes.len(), graph.nodes.len());
		for n in &a.nodes {
			assert!(n.position.unwrap().is_finite());
		}
		assert_eq!(a, b);
	}

	#[test]
	fn simulation_keeps_centroid_at_origin() {
		let graph = sample_graph();
		let laid = ForceSimulation::default().layout(&graph.nodes, &graph.links, 50);
		let sum = laid
			.iter()
			.fold(Vec3::ZERO, |acc, n| acc + n.position.unwrap());
		assert!((sum * (1.0 / laid.len() as f64)).length() < 1e-6);
	}

	#[test]
	fn coincident_nodes_are_pushed_apart() {
		let nodes: Vec<_> = (0..5)
			.map(|i| node(&format!("n{i}"), NodeCategory::Concept, (0.5, 0.5)))
			.collect();
		let laid = ForceSimulation::default().layout(&nodes, &[], 200);
		for i in 0..laid.len() {
			for j in (i + 1)..laid.len() {
				let d = laid[i].position.unwrap() - laid[j].position.unwrap();
				assert!(d.length() > 1.0, "nodes {i} and {j} overlap");
			}
		}
	}

	#[test]
	fn layout_of_empty_graph_is_empty() {
		let empty = GraphData::default();
		let laid = layout_graph(&empty, &ForceSimulation::default(), 100, 300);
		assert!(laid.is_empty());
		let laid = layout_graph(&empty, &PlanarLayout::default(), 100, 300);
		assert!(laid.is_empty());
	}

	#[test]
	fn links_without_nodes_do_not_break_layout() {
		let nodes = vec![node("a", NodeCategory::Persona, (0.5, 0.2))];
		let links = vec![link(0, 1.0)];
		let laid = ForceSimulation::default().layout(&nodes, &links, 10);
		assert_eq!(laid.len(), 1);
		assert!(laid[0].position.unwrap().is_finite());
	}

	#[test]
	fn planar_layout_is_flat_and_complete() {
		let graph = sample_graph();
		let laid = layout_graph(&graph, &PlanarLayout::default(), 100, 60);
		assert!(laid.is_positioned());
		for n in &laid.nodes {
			let p = n.position.unwrap();
			assert_eq!(p.z, 0.0);
			assert!(p.is_finite());
		}
	}

	#[test]
	fn layout_kind_parses_codes() {
		assert_eq!(LayoutKind::from_code("Planar"), Some(LayoutKind::Planar));
		assert_eq!(LayoutKind::from_code(" 3d "), Some(LayoutKind::Force3d));
		assert_eq!(LayoutKind::from_code("radial"), None);
		assert_eq!(LayoutKind::default(), LayoutKind::Force3d);
	}

	#[test]
	fn layout_kind_selects_engine() {
		let graph = sample_graph();
		let flat = layout_graph(&graph, LayoutKind::Planar.engine().as_ref(), 100, 60);
		assert!(flat.nodes.iter().all(|n| n.position.unwrap().z == 0.0));
		let deep = layout_graph(&graph, LayoutKind::Force3d.engine().as_ref(), 100, 60);
		assert!(deep.is_positioned());
		assert!(deep.nodes.iter().any(|n| n.position.unwrap().z != 0.0));
	}
}
